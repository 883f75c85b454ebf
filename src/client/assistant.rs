//! Essay and poem panels of the browser assistant

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::api_client::{ApiClient, ApiError, ApiOutcome};

/// Which panel the request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Essay,
    Poem,
}

impl Panel {
    fn noun(&self) -> &'static str {
        match self {
            Panel::Essay => "essay",
            Panel::Poem => "poem",
        }
    }
}

/// Backend picked in the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceChoice {
    OpenAI,
    Ollama,
}

/// Body posted by the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRequest {
    pub panel: Panel,
    pub service: ServiceChoice,
    #[serde(default)]
    pub topic: String,
}

/// Gateway call a panel request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    pub endpoint: &'static str,
    pub topic: String,
    pub notice: Option<String>,
}

/// What the page should do with a panel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelPlan {
    Call(PlannedCall),
    Warn(String),
}

/// Result shown under a panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PanelResponse {
    Ok {
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        info: Option<String>,
    },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        info: Option<String>,
    },
    Warning {
        warning: String,
    },
}

/// Resolve a panel request without touching the network.
///
/// The gateway serves essays from the cloud backend and poems from the local one,
/// so a mismatched selection is routed to the other endpoint with a notice.
pub fn plan(panel: Panel, service: ServiceChoice, topic: &str) -> PanelPlan {
    if topic.trim().is_empty() {
        return PanelPlan::Warn(format!("Please enter a topic for the {}", panel.noun()));
    }

    let call = match (panel, service) {
        (Panel::Essay, ServiceChoice::OpenAI) => PlannedCall {
            endpoint: "essay/invoke",
            topic: topic.to_string(),
            notice: None,
        },
        (Panel::Essay, ServiceChoice::Ollama) => PlannedCall {
            endpoint: "poem/invoke",
            topic: topic.to_string(),
            notice: Some("Ollama is served through the poem endpoint.".to_string()),
        },
        (Panel::Poem, ServiceChoice::OpenAI) => PlannedCall {
            endpoint: "essay/invoke",
            topic: format!("Write a poem about: {}", topic),
            notice: Some(
                "Poem generation is optimized for Ollama. Using essay endpoint instead.".to_string(),
            ),
        },
        (Panel::Poem, ServiceChoice::Ollama) => PlannedCall {
            endpoint: "poem/invoke",
            topic: topic.to_string(),
            notice: None,
        },
    };

    PanelPlan::Call(call)
}

/// Plan, call the gateway and shape the result for the page
pub async fn run_panel(client: &ApiClient, request: &PanelRequest) -> PanelResponse {
    let call = match plan(request.panel, request.service, &request.topic) {
        PanelPlan::Warn(warning) => return PanelResponse::Warning { warning },
        PanelPlan::Call(call) => call,
    };

    info!(panel = ?request.panel, service = ?request.service, endpoint = %call.endpoint, "Generating");

    let payload = json!({ "input": { "topic": call.topic } });
    let outcome = client.call(call.endpoint, &payload).await;

    match outcome {
        ApiOutcome::Success(body) => match extract_output(&body) {
            Some(output) => PanelResponse::Ok {
                output,
                info: call.notice,
            },
            None => PanelResponse::Error {
                error: ApiError::Unexpected("response has no output".to_string()).to_string(),
                info: call.notice,
            },
        },
        ApiOutcome::Failure(err) => PanelResponse::Error {
            error: err.to_string(),
            info: call.notice,
        },
    }
}

fn extract_output(body: &Value) -> Option<String> {
    match body.get("output")? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
