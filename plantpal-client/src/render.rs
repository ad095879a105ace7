//! Result Renderer
//!
//! Turns a relay reply into a [`ResultView`]. Pure: the same body always
//! yields the same view, and showing a view replaces whatever was shown
//! before, so repeated or out-of-order renders never accumulate.

use plantpal_common::api::ErrorBody;
use tracing::warn;

use crate::collection::CollectionRequest;
use crate::error::{ClientError, ClientResult};
use crate::model::{IdentificationResponse, Match};
use crate::transport::RelayReply;

/// Number of matches shown by default
pub const DEFAULT_MAX_MATCHES: usize = 3;

pub const PENDING: &str = "Identifying plant... Please wait.";
pub const NO_MATCH: &str = "No plant identified. Try a clearer image.";
pub const UPSTREAM_ERROR_PAGE: &str =
    "The identification service returned an error page. Please try again later.";
pub const INVALID_RESPONSE: &str = "Invalid response from the identification service.";
pub const TRANSPORT_FAILURE: &str =
    "Error identifying plant. Check the logs for details and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Error,
}

/// Content of the results region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Empty,
    Message { tone: Tone, text: String },
    Matches(Vec<MatchCard>),
}

/// One rendered match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    /// 1-based position in upstream order
    pub rank: usize,
    pub scientific_name: String,
    /// Percentage with two decimals, e.g. `87.34%`
    pub confidence: String,
    pub common_names: Vec<String>,
    pub image_urls: Vec<String>,
    pub action: CollectionRequest,
}

impl MatchCard {
    fn from_match(rank: usize, m: &Match) -> Self {
        let scientific_name = m.species.display_name().to_string();
        let common_names: Vec<String> = m
            .species
            .common_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            rank,
            confidence: m.confidence_percent(),
            image_urls: m.image_urls().into_iter().map(str::to_string).collect(),
            action: CollectionRequest {
                scientific_name: scientific_name.clone(),
                common_names: common_names.clone(),
            },
            scientific_name,
            common_names,
        }
    }

    /// Common names as a readable list
    pub fn common_names_joined(&self) -> String {
        self.common_names.join(", ")
    }
}

impl ResultView {
    pub fn info(text: impl Into<String>) -> Self {
        ResultView::Message {
            tone: Tone::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ResultView::Message {
            tone: Tone::Error,
            text: text.into(),
        }
    }

    pub fn pending() -> Self {
        Self::info(PENDING)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ResultView::Message {
                tone: Tone::Error,
                ..
            }
        )
    }

    pub fn cards(&self) -> &[MatchCard] {
        match self {
            ResultView::Matches(cards) => cards,
            _ => &[],
        }
    }
}

/// Body that is markup (an HTML error page) rather than JSON
pub fn looks_like_markup(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Render a successful response body
pub fn render_body(body: &str, max_matches: usize) -> ResultView {
    render_body_with(body, max_matches, IdentificationResponse::from_json)
}

/// Render a body with an explicit parser
///
/// Markup is rejected before `parse` is called.
pub fn render_body_with<P>(body: &str, max_matches: usize, parse: P) -> ResultView
where
    P: FnOnce(&str) -> ClientResult<IdentificationResponse>,
{
    if looks_like_markup(body) {
        warn!("Identification response is markup, not JSON");
        return ResultView::error(UPSTREAM_ERROR_PAGE);
    }

    let response = match parse(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("Identification response could not be parsed: {}", e);
            return ResultView::error(INVALID_RESPONSE);
        }
    };

    if response.results.is_empty() {
        return ResultView::info(NO_MATCH);
    }

    ResultView::Matches(
        response
            .results
            .iter()
            .take(max_matches.max(1))
            .enumerate()
            .map(|(i, m)| MatchCard::from_match(i + 1, m))
            .collect(),
    )
}

/// Render whatever the relay answered
///
/// A 500 carrying the relay's own `{error, detail}` body means upstream was
/// never reached; it is shown like any other transport failure. Other non-2xx
/// replies are shown with their status and the `error` field of a JSON body,
/// or the raw text when there is none.
pub fn render_reply(reply: &RelayReply, max_matches: usize) -> ResultView {
    if reply.is_success() {
        return render_body(&reply.body, max_matches);
    }

    if let Some(body) = relay_failure(reply) {
        warn!(
            status = reply.status,
            "Relay could not reach upstream: {}: {}",
            body.error,
            body.detail.as_deref().unwrap_or_default()
        );
        return ResultView::error(TRANSPORT_FAILURE);
    }

    warn!(status = reply.status, "Identification failed: {}", reply.body);

    if looks_like_markup(&reply.body) {
        return ResultView::error(UPSTREAM_ERROR_PAGE);
    }

    let text = error_text(&reply.body);
    if text.is_empty() {
        ResultView::error(format!("Identification failed (status {}).", reply.status))
    } else {
        ResultView::error(format!(
            "Identification failed (status {}): {}",
            reply.status, text
        ))
    }
}

/// The relay's own 500 body, when that is what `reply` carries
fn relay_failure(reply: &RelayReply) -> Option<ErrorBody> {
    if reply.status != 500 {
        return None;
    }
    serde_json::from_str::<ErrorBody>(&reply.body)
        .ok()
        .filter(|body| body.detail.is_some())
}

/// `error` string of a JSON body, else the trimmed raw text
fn error_text(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Render the end of one identification attempt
pub fn render_outcome(outcome: &ClientResult<RelayReply>, max_matches: usize) -> ResultView {
    match outcome {
        Ok(reply) => render_reply(reply, max_matches),
        Err(ClientError::Validation(message)) => ResultView::error(message.clone()),
        Err(e) => {
            warn!("Identification request failed: {}", e);
            ResultView::error(TRANSPORT_FAILURE)
        }
    }
}
