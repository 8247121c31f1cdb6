//! Gemini summarization client
//!
//! Thin typed wrapper over the `generateContent` endpoint, plus the model
//! listing endpoint used for diagnostics. Failures are classified here so
//! the pipeline's retry loop only has to look at the error variant.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

/// Model used for summarization.
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const SUMMARY_PROMPT: &str = "You are a professional meeting secretary. \
Summarize the following meeting transcript. \
Identify key decisions, action items, and open questions.";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    models: Option<Vec<ModelInfo>>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Summarize a transcript, returning the generated text trimmed.
    pub async fn summarize(&self, transcript: &str) -> Result<String> {
        let url = format!(
            "{API_BASE}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{SUMMARY_PROMPT}\n\nTranscript:\n{transcript}"),
                }],
            }],
        };

        debug!("Calling Gemini ({})", self.model);
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Service(format!("Gemini: malformed response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(AppError::Service(format!(
                "Gemini data error: {} ({})",
                error.message,
                error.status.unwrap_or_default()
            )));
        }

        let text = parsed
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AppError::Service("Gemini: no candidates returned".into()))?;

        Ok(text.trim().to_string())
    }

    /// List the model identifiers currently offered by the service.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{API_BASE}/models?key={}", self.api_key);
        let response = self.http.get(&url).send().await?;
        let parsed: ModelListResponse = response.json().await?;

        Ok(parsed
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.name)
            .collect())
    }
}

/// Map a non-success HTTP response to the error taxonomy.
///
/// 429 and `RESOURCE_EXHAUSTED` are the service's two ways of signalling
/// rate limiting; 404 means the model identifier did not resolve.
fn classify_failure(status: u16, body: &str) -> AppError {
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        AppError::QuotaExceeded(format!("Gemini API {status}: {body}"))
    } else if status == 404 {
        AppError::ModelUnresolvable(format!("Gemini API {status}: {body}"))
    } else {
        AppError::Service(format!("Gemini API {status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "prompt text".into(),
                }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"contents": [{"parts": [{"text": "prompt text"}]}]})
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "  the summary  "}]}}
            ]
        })
        .to_string();
        let parsed: GeminiResponse = serde_json::from_str(&body).unwrap();
        let text = parsed.candidates.unwrap()[0].content.parts[0].text.clone();
        assert_eq!(text.trim(), "the summary");
    }

    #[test]
    fn test_classify_quota() {
        assert!(matches!(
            classify_failure(429, "slow down"),
            AppError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(503, r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
            AppError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_classify_model_unresolvable() {
        assert!(matches!(
            classify_failure(404, "model not found"),
            AppError::ModelUnresolvable(_)
        ));
    }

    #[test]
    fn test_classify_other() {
        assert!(matches!(
            classify_failure(500, "boom"),
            AppError::Service(_)
        ));
    }

    #[test]
    fn test_model_list_parsing() {
        let body = json!({
            "models": [{"name": "models/gemini-pro"}, {"name": "models/gemini-flash"}]
        })
        .to_string();
        let parsed: ModelListResponse = serde_json::from_str(&body).unwrap();
        let names: Vec<String> = parsed.models.unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["models/gemini-pro", "models/gemini-flash"]);
    }
}
