use async_trait::async_trait;

use crate::error::Result;
use crate::{Segment, Transcript};

/// One caption track a provider can serve for a video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub name: String,
    pub is_generated: bool,
    /// Provider handle used to download the track
    pub base_url: String,
}

/// Every caption track available for a video, in provider order
#[derive(Debug, Clone, PartialEq)]
pub struct TrackList {
    pub video_id: String,
    pub title: String,
    pub tracks: Vec<CaptionTrack>,
    pub default_index: Option<usize>,
}

impl TrackList {
    pub fn default_track(&self) -> Option<&CaptionTrack> {
        self.default_index.and_then(|i| self.tracks.get(i))
    }

    /// First manually created track, in provider order
    pub fn first_manual(&self) -> Option<&CaptionTrack> {
        self.tracks.iter().find(|t| !t.is_generated)
    }

    /// First track matching any of `languages`, walking the list in order.
    /// Within a language a manual track beats a generated one.
    pub fn find_language(&self, languages: &[String]) -> Option<&CaptionTrack> {
        languages.iter().find_map(|lang| {
            self.tracks
                .iter()
                .find(|t| !t.is_generated && t.language_code == *lang)
                .or_else(|| self.tracks.iter().find(|t| t.language_code == *lang))
        })
    }
}

/// A remote source of caption tracks.
///
/// The language and default capabilities choose from a listing the caller
/// already obtained, so one request enumerates a video's tracks only once.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Fetch the first track in `list` whose language appears in `languages`
    async fn fetch_languages(&self, list: &TrackList, languages: &[String]) -> Result<Transcript>;

    /// Fetch whatever track the provider treats as the video's primary one
    async fn fetch_default(&self, list: &TrackList) -> Result<Transcript>;

    async fn list_tracks(&self, video_id: &str) -> Result<TrackList>;

    async fn fetch_track(&self, video_id: &str, track: &CaptionTrack) -> Result<Vec<Segment>>;
}
