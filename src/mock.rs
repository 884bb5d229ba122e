use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, TranscriptError};
use crate::provider::{CaptionProvider, CaptionTrack, TrackList};
use crate::{Segment, Transcript};

/// How every call on the mock behaves before looking at its tracks
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MockBehavior {
    Working,
    CaptionsDisabled,
    Transient,
    Slow(Duration),
    Panic,
}

/// Scripted provider that records which capabilities were exercised
#[derive(Debug)]
pub(crate) struct MockProvider {
    behavior: MockBehavior,
    tracks: Vec<CaptionTrack>,
    default_index: Option<usize>,
    fail_default: bool,
    broken_tracks: bool,
    calls: Mutex<Vec<String>>,
}

pub(crate) fn track(lang: &str, is_generated: bool) -> CaptionTrack {
    CaptionTrack {
        language_code: lang.to_string(),
        name: lang.to_string(),
        is_generated,
        base_url: format!("https://example.com/{lang}/{is_generated}"),
    }
}

impl MockProvider {
    pub(crate) fn new(tracks: Vec<CaptionTrack>) -> Self {
        Self {
            behavior: MockBehavior::Working,
            tracks,
            default_index: None,
            fail_default: false,
            broken_tracks: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn behaving(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::new(vec![track("en", false)])
        }
    }

    pub(crate) fn with_default(mut self, index: usize) -> Self {
        self.default_index = Some(index);
        self
    }

    /// Make the default-track capability fail transiently even when tracks exist
    pub(crate) fn failing_default(mut self) -> Self {
        self.fail_default = true;
        self
    }

    /// Make every track download fail transiently while listing still works
    pub(crate) fn broken_tracks(mut self) -> Self {
        self.broken_tracks = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::CaptionsDisabled => Err(TranscriptError::CaptionsDisabled("mock".to_string())),
            MockBehavior::Transient => Err(TranscriptError::Transient("mock provider unreachable".to_string())),
            MockBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            MockBehavior::Panic => panic!("mock provider exploded"),
        }
    }

    fn segments_for(track: &CaptionTrack) -> Vec<Segment> {
        vec![
            Segment {
                text: format!("hello {}", track.language_code),
                start: 0.0,
                duration: 1.25,
            },
            Segment {
                text: if track.is_generated { "auto".to_string() } else { "manual".to_string() },
                start: 1.25,
                duration: 2.5,
            },
        ]
    }

    fn list(&self, video_id: &str) -> TrackList {
        TrackList {
            video_id: video_id.to_string(),
            title: "Mock Video".to_string(),
            tracks: self.tracks.clone(),
            default_index: self.default_index,
        }
    }
}

#[async_trait]
impl CaptionProvider for MockProvider {
    async fn fetch_languages(&self, list: &TrackList, languages: &[String]) -> Result<Transcript> {
        self.enter(format!("languages:{}", languages.join(","))).await?;
        let track = list
            .find_language(languages)
            .ok_or_else(|| TranscriptError::no_track(&list.video_id, "no track in requested languages"))?;
        Ok(Transcript::from_track(list, track, Self::segments_for(track)))
    }

    async fn fetch_default(&self, list: &TrackList) -> Result<Transcript> {
        self.enter("default".to_string()).await?;
        if self.fail_default {
            return Err(TranscriptError::Transient("default track endpoint failed".to_string()));
        }
        let track = list
            .default_track()
            .ok_or_else(|| TranscriptError::no_track(&list.video_id, "no default track"))?;
        Ok(Transcript::from_track(list, track, Self::segments_for(track)))
    }

    async fn list_tracks(&self, video_id: &str) -> Result<TrackList> {
        self.enter("list".to_string()).await?;
        if self.tracks.is_empty() {
            return Err(TranscriptError::CaptionsDisabled(video_id.to_string()));
        }
        Ok(self.list(video_id))
    }

    async fn fetch_track(&self, _video_id: &str, track: &CaptionTrack) -> Result<Vec<Segment>> {
        self.enter(format!("track:{}", track.language_code)).await?;
        if self.broken_tracks {
            return Err(TranscriptError::Transient("caption download failed".to_string()));
        }
        Ok(Self::segments_for(track))
    }
}
