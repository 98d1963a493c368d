//! Blocking HTTP client for the scenario backend.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sdq_model::{Domain, Scenario};
use tracing::{debug, warn};
use url::Url;

use crate::api::{
    ChildSuggestion, ChildSuggestionRequest, ChildSuggestionsResponse, CodeUpdate,
    DOMAIN_ANALYSIS, DescriptionRequest, DomainAnalysis, GENERATE_METADATA, GET_OOTB_SCENARIOS,
    MODEL_THINKING, ModelThinking, OotbScenariosRequest, OotbScenariosResponse, OotbSuggestion,
    OotbSuggestionRequest, OotbSuggestionsResponse, SUGGEST_CHILD_SCENARIOS,
    SUGGEST_OOTB_SCENARIOS, ScenarioIdRequest, ScenarioMetadata, UPDATE_SCENARIO_CODE,
};
use crate::error::{ClientError, Result};

/// HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// Backend operations used by the workflow. Implemented over HTTP by
/// [`HttpScenarioApi`]; tests substitute in-memory fakes.
pub trait ScenarioApi {
    fn generate_metadata(&self, description: &str) -> Result<ScenarioMetadata>;

    fn suggest_child_scenarios(&self, name: &str, description: &str)
    -> Result<Vec<ChildSuggestion>>;

    fn update_scenario_code(&self, description: &str) -> Result<CodeUpdate>;

    fn suggest_ootb_scenarios(
        &self,
        domains: &[Domain],
        exclude_existing: &[String],
    ) -> Result<Vec<OotbSuggestion>>;

    fn get_ootb_scenarios(&self, scenario_ids: &[String]) -> Result<Vec<Scenario>>;

    fn domain_analysis(&self, scenario_id: &str) -> Result<DomainAnalysis>;

    fn model_thinking(&self, scenario_id: &str) -> Result<ModelThinking>;
}

/// [`ScenarioApi`] over blocking `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpScenarioApi {
    client: Client,
    base: Url,
}

/// Parse a backend base URL, making sure endpoint paths join below it.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Pull an error message out of a JSON error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

/// Decode a success body, turning `success: false` envelopes into
/// [`ClientError::Rejected`].
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request rejected")
            .to_string();
        return Err(ClientError::Rejected(reason));
    }
    Ok(serde_json::from_value(value)?)
}

impl HttpScenarioApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(endpoint = %url, "POST backend request");

        let response = self
            .client
            .post(url.clone())
            .header(USER_AGENT, format!("sdq/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .inspect_err(|e| warn!(endpoint = %url, error = %e, "backend request failed"))?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
            warn!(endpoint = %url, status = status.as_u16(), %message, "backend returned an error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        decode_body(&text)
    }
}

impl ScenarioApi for HttpScenarioApi {
    fn generate_metadata(&self, description: &str) -> Result<ScenarioMetadata> {
        self.post(GENERATE_METADATA, &DescriptionRequest { description })
    }

    fn suggest_child_scenarios(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Vec<ChildSuggestion>> {
        let response: ChildSuggestionsResponse = self.post(
            SUGGEST_CHILD_SCENARIOS,
            &ChildSuggestionRequest { name, description },
        )?;
        Ok(response.suggestions)
    }

    fn update_scenario_code(&self, description: &str) -> Result<CodeUpdate> {
        self.post(UPDATE_SCENARIO_CODE, &DescriptionRequest { description })
    }

    fn suggest_ootb_scenarios(
        &self,
        domains: &[Domain],
        exclude_existing: &[String],
    ) -> Result<Vec<OotbSuggestion>> {
        let request = OotbSuggestionRequest {
            domains: domains.iter().map(Domain::as_str).collect(),
            exclude_existing,
        };
        let response: OotbSuggestionsResponse = self.post(SUGGEST_OOTB_SCENARIOS, &request)?;
        Ok(response.suggestions)
    }

    fn get_ootb_scenarios(&self, scenario_ids: &[String]) -> Result<Vec<Scenario>> {
        let response: OotbScenariosResponse =
            self.post(GET_OOTB_SCENARIOS, &OotbScenariosRequest { scenario_ids })?;
        Ok(response.scenarios)
    }

    fn domain_analysis(&self, scenario_id: &str) -> Result<DomainAnalysis> {
        self.post(DOMAIN_ANALYSIS, &ScenarioIdRequest { scenario_id })
    }

    fn model_thinking(&self, scenario_id: &str) -> Result<ModelThinking> {
        self.post(MODEL_THINKING, &ScenarioIdRequest { scenario_id })
    }
}
