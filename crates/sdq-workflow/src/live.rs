//! Live regeneration while a description is being edited.
//!
//! Each accepted edit is answered immediately from local generation and
//! issues a [`RequestToken`] for the matching backend call. Only the
//! response carrying the latest token may replace the displayed text, so
//! a slow response to an older edit can never overwrite a newer one.

use sdq_client::{ClientError, CodeUpdate};
use sdq_generate::{Synthesis, fallback_generation, local_generation};
use sdq_parse::ParseOptions;
use serde::Serialize;
use tracing::{debug, warn};

/// Descriptions shorter than this are not regenerated.
pub const MIN_LIVE_LENGTH: usize = 20;

/// Shown when the backend answers with an empty query text.
pub const EMPTY_QUERY_TEXT: &str = "Find subjects meeting the specified validation criteria";

/// Shown when the backend answers with empty code.
pub const EMPTY_CODE: &str = "def check_validation_rule(df):\n    # Generated code\n    return df";

/// Identifies one backend request issued for an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

/// Where the displayed text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    Local,
    Backend,
    Fallback,
}

/// Text and code currently shown for the edited description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveState {
    pub description: String,
    pub query_text: String,
    pub code: String,
    pub source: UpdateSource,
}

/// Immediate result of an accepted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEdit {
    pub local: Synthesis,
    /// Pass back to [`LiveEditor::on_remote`] with the backend result.
    pub request: RequestToken,
}

/// What happened to a backend result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    Applied,
    /// The request failed; the keyword fallback was shown instead.
    FellBack,
    /// A newer edit superseded the request.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct LiveEditor {
    options: ParseOptions,
    issued: u64,
    latest: Option<RequestToken>,
    state: Option<LiveState>,
}

impl LiveEditor {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn state(&self) -> Option<&LiveState> {
        self.state.as_ref()
    }

    pub fn latest(&self) -> Option<RequestToken> {
        self.latest
    }

    /// Regenerate locally for `text` and issue a new request token.
    /// Returns `None` for descriptions too short to regenerate.
    pub fn on_edit(&mut self, text: &str) -> Option<LiveEdit> {
        let description = text.trim();
        if description.chars().count() < MIN_LIVE_LENGTH {
            return None;
        }

        let previous = self.state.as_ref().map(|s| s.query_text.as_str());
        let (_, local) = local_generation(description, &self.options, previous);

        self.issued += 1;
        let request = RequestToken(self.issued);
        self.latest = Some(request);
        self.state = Some(LiveState {
            description: description.to_string(),
            query_text: local.query_text.clone(),
            code: local.code.clone(),
            source: UpdateSource::Local,
        });
        debug!(token = request.0, changed = local.changed, "live edit regenerated locally");

        Some(LiveEdit { local, request })
    }

    /// Apply a backend result for `token`. Results for anything but the
    /// latest token are discarded.
    pub fn on_remote(
        &mut self,
        token: RequestToken,
        result: Result<CodeUpdate, ClientError>,
    ) -> RemoteOutcome {
        if self.latest != Some(token) {
            debug!(token = token.0, latest = ?self.latest.map(|t| t.0), "discarding stale backend result");
            return RemoteOutcome::Stale;
        }
        let Some(state) = self.state.as_mut() else {
            return RemoteOutcome::Stale;
        };

        match result {
            Ok(update) => {
                state.query_text = or_default(update.query_text, EMPTY_QUERY_TEXT);
                state.code = or_default(update.python_code, EMPTY_CODE);
                state.source = UpdateSource::Backend;
                RemoteOutcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "backend code update failed, using keyword fallback");
                let fallback = fallback_generation(&state.description);
                state.query_text = fallback.query_text;
                state.code = fallback.code;
                state.source = UpdateSource::Fallback;
                RemoteOutcome::FellBack
            }
        }
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}
