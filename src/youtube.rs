use std::sync::LazyLock;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, TranscriptError};
use crate::provider::{CaptionProvider, CaptionTrack, TrackList};
use crate::{Segment, Transcript};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// The WEB client hands out caption URLs that demand a PO token; ANDROID does not.
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

static API_KEY_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("API key pattern must compile"),
        // Newer watch pages
        Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("API key pattern must compile"),
    ]
});

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
    #[serde(rename = "videoDetails")]
    video_details: Option<VideoDetails>,
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    #[serde(default)]
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<RawCaptionTrack>>,
    #[serde(rename = "audioTracks")]
    audio_tracks: Option<Vec<AudioTrack>>,
    #[serde(rename = "defaultAudioTrackIndex")]
    default_audio_track_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawCaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    kind: Option<String>,
    name: Option<TrackName>,
}

#[derive(Debug, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AudioTrack {
    #[serde(rename = "defaultCaptionTrackIndex")]
    default_caption_track_index: Option<usize>,
}

/// Captions provider backed by YouTube's InnerTube player API
#[derive(Debug, Clone)]
pub struct YouTubeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YouTubeProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: YOUTUBE_BASE_URL.to_string(),
        }
    }

    /// Point the watch page and player calls at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn player_response(&self, video_id: &str) -> Result<InnerTubePlayerResponse> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("{}/youtubei/v1/player?key={api_key}&prettyPrint=false", self.base_url);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp)
    }

    async fn download(&self, list: &TrackList, track: &CaptionTrack) -> Result<Transcript> {
        let segments = self.fetch_track(&list.video_id, track).await?;
        Ok(Transcript::from_track(list, track, segments))
    }
}

#[async_trait]
impl CaptionProvider for YouTubeProvider {
    async fn fetch_languages(&self, list: &TrackList, languages: &[String]) -> Result<Transcript> {
        let track = list.find_language(languages).ok_or_else(|| {
            TranscriptError::no_track(&list.video_id, format!("no caption track in [{}]", languages.join(", ")))
        })?;
        self.download(list, track).await
    }

    async fn fetch_default(&self, list: &TrackList) -> Result<Transcript> {
        let track = list
            .default_track()
            .ok_or_else(|| TranscriptError::no_track(&list.video_id, "video reports no default caption track"))?;
        self.download(list, track).await
    }

    async fn list_tracks(&self, video_id: &str) -> Result<TrackList> {
        let resp = self.player_response(video_id).await?;
        let list = track_list_from_response(video_id, resp)?;
        debug!(
            "Video {video_id} has {} caption tracks: [{}]",
            list.tracks.len(),
            list.tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(list)
    }

    async fn fetch_track(&self, video_id: &str, track: &CaptionTrack) -> Result<Vec<Segment>> {
        if track.base_url.contains("&exp=xpe") {
            return Err(TranscriptError::Transient(format!(
                "caption track for video {video_id} requires a PO token"
            )));
        }

        debug!("Fetching caption track: lang={} generated={}", track.language_code, track.is_generated);

        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

fn track_list_from_response(video_id: &str, resp: InnerTubePlayerResponse) -> Result<TrackList> {
    assert_playability(video_id, resp.playability_status.as_ref())?;

    let title = resp
        .video_details
        .as_ref()
        .and_then(|vd| vd.title.clone())
        .unwrap_or_default();

    let renderer = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or_else(|| TranscriptError::CaptionsDisabled(video_id.to_string()))?;

    let default_index = renderer.audio_tracks.as_ref().and_then(|audio| {
        audio
            .get(renderer.default_audio_track_index.unwrap_or(0))
            .and_then(|a| a.default_caption_track_index)
    });

    let tracks: Vec<CaptionTrack> = renderer
        .caption_tracks
        .unwrap_or_default()
        .into_iter()
        .map(|raw| {
            let name = raw
                .name
                .and_then(|n| n.simple_text.or_else(|| n.runs.and_then(|r| r.into_iter().next().map(|r| r.text))))
                .unwrap_or_else(|| raw.language_code.clone());
            CaptionTrack {
                is_generated: raw.kind.as_deref() == Some("asr"),
                base_url: raw.base_url.replace("&fmt=srv3", ""),
                language_code: raw.language_code,
                name,
            }
        })
        .collect();

    if tracks.is_empty() {
        return Err(TranscriptError::CaptionsDisabled(video_id.to_string()));
    }

    Ok(TrackList {
        video_id: video_id.to_string(),
        title,
        tracks,
        default_index,
    })
}

fn assert_playability(video_id: &str, status: Option<&PlayabilityStatus>) -> Result<()> {
    let Some(status) = status else {
        return Ok(());
    };
    let reason = status.reason.clone().unwrap_or_default();

    match status.status.as_str() {
        "" | "OK" => Ok(()),
        "LOGIN_REQUIRED" if reason.contains("not a bot") => Err(TranscriptError::Transient(format!(
            "YouTube blocked the request for video {video_id}: {reason}"
        ))),
        "LOGIN_REQUIRED" | "ERROR" | "UNPLAYABLE" => Err(TranscriptError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: if reason.is_empty() { status.status.clone() } else { reason },
        }),
        other => Err(TranscriptError::Transient(format!(
            "unexpected playability status {other} for video {video_id}"
        ))),
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(TranscriptError::Transient("YouTube answered with a reCAPTCHA challenge".to_string()));
    }

    API_KEY_PATTERNS
        .iter()
        .find_map(|re| re.captures(html).map(|caps| caps[1].to_string()))
        .ok_or_else(|| TranscriptError::Transient("could not extract InnerTube API key from watch page".to_string()))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                // Some tracks omit dur on the final cue
                current_dur = dur.or(Some(0.0));
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.trim().is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: dur,
                        });
                    }
                }
            }
            // An empty cue must not lend its timing to the whitespace after it
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TranscriptError::Transient(format!("error parsing caption XML: {e}")));
            }
            _ => {}
        }
    }

    Ok(segments)
}
