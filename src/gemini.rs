//! Gemini API client for diagnosis completions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// The external diagnosis backend. Implemented by [`GeminiClient`];
/// tests substitute their own.
#[async_trait]
pub trait Diagnoser: Send + Sync {
    /// Send symptom text upstream and return the completion text.
    async fn diagnose(&self, symptoms: &str) -> Result<String, UpstreamError>;
}

/// The upstream AI API errored, timed out, or returned an unusable response.
#[derive(Debug)]
pub enum UpstreamError {
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Http(e) => write!(f, "HTTP error: {e}"),
            UpstreamError::Api(e) => write!(f, "API error: {e}"),
            UpstreamError::Parse(e) => write!(f, "Parse error: {e}"),
            UpstreamError::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for UpstreamError {}

pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

fn build_prompt(symptoms: &str) -> String {
    format!(
        "You are an AI assistant designed to provide general information about symptoms.\n\
         You are NOT a medical doctor and cannot give medical advice.\n\
         Always include a clear disclaimer at the beginning and end of your response stating this.\n\n\
         Based on the following symptoms, provide a brief, general explanation of what they might indicate,\n\
         and suggest common next steps (e.g., rest, hydration, or when to see a doctor).\n\
         Keep the response concise and suitable for a WhatsApp message.\n\n\
         Symptoms: {symptoms}"
    )
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }
}

#[async_trait]
impl Diagnoser for GeminiClient {
    async fn diagnose(&self, symptoms: &str) -> Result<String, UpstreamError> {
        info!("🩺 Requesting diagnosis for: \"{symptoms}\"");

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: build_prompt(symptoms),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 200,
            },
        };

        let url = format!("{}?key={}", GEMINI_API_URL, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            return Err(UpstreamError::Api(format!("{status}: {body}")));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Parse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(UpstreamError::Api(error.message));
        }

        let text = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(UpstreamError::Empty)?;

        info!("🩺 Diagnosis received ({} chars)", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_symptoms() {
        let prompt = build_prompt("fever and headache");
        assert!(prompt.contains("Symptoms: fever and headache"));
        assert!(prompt.contains("NOT a medical doctor"));
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Sounds like a cold."}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        let text = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);
        assert_eq!(text.as_deref(), Some("Sounds like a cold."));
    }

    #[test]
    fn test_error_response_parsing() {
        let body = r#"{"error": {"message": "API key not valid"}}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.unwrap().message, "API key not valid");
        assert!(parsed.candidates.is_none());
    }
}
