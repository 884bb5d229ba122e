use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::error::{Result, TranscriptError};
use crate::provider::{CaptionProvider, CaptionTrack, TrackList};
use crate::Transcript;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One way of asking the provider for captions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    PreferredLanguages(Vec<String>),
    DefaultTrack,
    ManualTrack,
    FirstAvailable,
}

impl Strategy {
    /// Ordered list of strategies to try for the given preferences
    pub fn plan(preferences: &[String]) -> Vec<Strategy> {
        let mut plan = Vec::with_capacity(4);
        if !preferences.is_empty() {
            plan.push(Strategy::PreferredLanguages(preferences.to_vec()));
        }
        plan.extend([Strategy::DefaultTrack, Strategy::ManualTrack, Strategy::FirstAvailable]);
        plan
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::PreferredLanguages(_) => "preferred-languages",
            Strategy::DefaultTrack => "default-track",
            Strategy::ManualTrack => "manual-track",
            Strategy::FirstAvailable => "first-available",
        }
    }
}

/// Runs the fallback chain against a captions provider
#[derive(Clone)]
pub struct TranscriptFetcher {
    provider: Arc<dyn CaptionProvider>,
    timeout: Duration,
}

impl TranscriptFetcher {
    pub fn new(provider: Arc<dyn CaptionProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Try each strategy in order and return the first transcript obtained.
    ///
    /// Individual strategy failures are logged and swallowed. Captions being
    /// disabled or the video being unavailable stop the chain at once, since
    /// no later strategy can get around them.
    pub async fn fetch(&self, video_id: &str, preferences: &[String]) -> Result<Transcript> {
        let mut listing: Option<Result<TrackList>> = None;
        let mut failures = Vec::new();

        for strategy in Strategy::plan(preferences) {
            debug!("Trying {} for video {video_id}", strategy.name());

            match self.attempt(&strategy, video_id, &mut listing).await {
                Ok(transcript) => {
                    info!(
                        "Fetched {} segments for {video_id} via {} (lang={}, generated={})",
                        transcript.segments.len(),
                        strategy.name(),
                        transcript.language,
                        transcript.is_generated,
                    );
                    return Ok(transcript);
                }
                Err(e) if e.is_terminal() => {
                    info!("Giving up on {video_id}: {e}");
                    return Err(e);
                }
                Err(e) => {
                    debug!("Strategy {} failed for {video_id}: {e}", strategy.name());
                    failures.push(e);
                }
            }
        }

        Err(exhausted(video_id, failures))
    }

    async fn attempt(
        &self,
        strategy: &Strategy,
        video_id: &str,
        listing: &mut Option<Result<TrackList>>,
    ) -> Result<Transcript> {
        let list = self.listing(video_id, listing).await?;
        match strategy {
            Strategy::PreferredLanguages(languages) => {
                self.bounded(self.provider.fetch_languages(&list, languages)).await
            }
            Strategy::DefaultTrack => self.bounded(self.provider.fetch_default(&list)).await,
            Strategy::ManualTrack => {
                let track = list
                    .first_manual()
                    .ok_or_else(|| TranscriptError::no_track(video_id, "no manually created caption track"))?;
                self.download(&list, track).await
            }
            Strategy::FirstAvailable => {
                let track = list
                    .tracks
                    .first()
                    .ok_or_else(|| TranscriptError::no_track(video_id, "video lists no caption tracks"))?;
                self.download(&list, track).await
            }
        }
    }

    /// Enumerate tracks once per fetch; every strategy shares the outcome
    async fn listing(&self, video_id: &str, listing: &mut Option<Result<TrackList>>) -> Result<TrackList> {
        if let Some(result) = listing {
            return result.clone();
        }
        let result = self.bounded(self.provider.list_tracks(video_id)).await;
        *listing = Some(result.clone());
        result
    }

    async fn download(&self, list: &TrackList, track: &CaptionTrack) -> Result<Transcript> {
        let segments = self.bounded(self.provider.fetch_track(&list.video_id, track)).await?;
        Ok(Transcript::from_track(list, track, segments))
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| TranscriptError::Transient(format!("captions provider timed out after {:?}", self.timeout)))?
    }
}

/// Error surfaced once every strategy has failed
fn exhausted(video_id: &str, failures: Vec<TranscriptError>) -> TranscriptError {
    let all_transient = !failures.is_empty() && failures.iter().all(|e| matches!(e, TranscriptError::Transient(_)));
    match failures.into_iter().last() {
        Some(last) if all_transient => last,
        _ => TranscriptError::no_track(video_id, "no caption track matched any strategy"),
    }
}
