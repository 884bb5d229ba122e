pub mod config;
pub mod error;
pub mod fetcher;
#[cfg(test)]
pub(crate) mod mock;
pub mod provider;
pub mod routes;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use error::{Result, TranscriptError};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Complete transcript for a video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub is_generated: bool,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Assemble a transcript from a listed track and its downloaded segments
    pub fn from_track(
        list: &provider::TrackList,
        track: &provider::CaptionTrack,
        segments: Vec<Segment>,
    ) -> Self {
        Self {
            video_id: list.video_id.clone(),
            title: list.title.clone(),
            language: track.language_code.clone(),
            is_generated: track.is_generated,
            segments,
        }
    }

    /// Segment texts joined by single spaces, in provider order
    pub fn full_text(&self) -> String {
        join_segments(&self.segments)
    }
}

pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
}

// Priority order matters: the first pattern that captures wins.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"youtube\.com/watch\?(?:[^#\n]*?&)??v=([^&\n?#/]+)",
        r"youtu\.be/([^&\n?#/]+)",
        r"youtube\.com/embed/([^&\n?#/]+)",
        r"youtube\.com/shorts/([^&\n?#/]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("video URL pattern must compile"))
    .collect()
});

/// Extract video ID from various YouTube URL formats, or accept a bare 11-character ID
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for pattern in URL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(input) {
            return Some(caps[1].to_string());
        }
    }

    if input.chars().count() == 11 && !input.contains('/') {
        return Some(input.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=abcdefghijk&t=30"),
            Some("abcdefghijk".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_v_after_other_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url_with_query() {
        assert_eq!(
            extract_video_id("https://youtu.be/_NuH3D4SN-c?si=VSFea_rMwtaiR8Q7"),
            Some("_NuH3D4SN-c".to_string())
        );
    }

    #[test]
    fn test_trailing_slash_not_part_of_id() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ/"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ/"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_fragment_terminates_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ#t=5"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not-a-valid-id"), None);
        assert_eq!(extract_video_id("https://example.com/video"), None);
    }

    #[test]
    fn test_eleven_chars_with_slash_rejected() {
        assert_eq!(extract_video_id("abc/defghij"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("   "), None);
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_full_text_joins_in_order() {
        let transcript = Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: String::new(),
            language: "en".to_string(),
            is_generated: false,
            segments: vec![
                Segment {
                    text: "Hello world".to_string(),
                    start: 0.0,
                    duration: 1.5,
                },
                Segment {
                    text: "This is a test".to_string(),
                    start: 1.5,
                    duration: 2.0,
                },
            ],
        };
        assert_eq!(transcript.full_text(), "Hello world This is a test");
        assert_eq!(transcript.full_text(), transcript.full_text());
    }

    #[test]
    fn test_from_track() {
        let track = provider::CaptionTrack {
            language_code: "de".to_string(),
            name: "German".to_string(),
            is_generated: true,
            base_url: "https://example.com/de".to_string(),
        };
        let list = provider::TrackList {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Test Video".to_string(),
            tracks: vec![track.clone()],
            default_index: None,
        };
        let segments = vec![Segment {
            text: "Hallo".to_string(),
            start: 0.0,
            duration: 1.0,
        }];

        let transcript = Transcript::from_track(&list, &track, segments.clone());
        assert_eq!(transcript.video_id, "dQw4w9WgXcQ");
        assert_eq!(transcript.title, "Test Video");
        assert_eq!(transcript.language, "de");
        assert!(transcript.is_generated);
        assert_eq!(transcript.segments, segments);
    }

    #[test]
    fn test_join_segments_empty() {
        assert_eq!(join_segments(&[]), "");
    }
}
