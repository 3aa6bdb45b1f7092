//! Impression drafting through a hosted text-generation API.
//!
//! The findings text of a [`crate::report::ReportForm`] is wrapped in a
//! fixed radiology-assistant prompt and sent to the configured
//! [`Provider`]. The returned text is used verbatim as the report's
//! impression.

mod settings;

pub use settings::{
    AiSettings, FileSettingsStore, MemorySettingsStore, SettingsStore, API_KEY_KEY, PROVIDER_KEY,
};

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Gemini `generateContent` endpoint.
pub const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// OpenAI chat completions endpoint.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Model requested from OpenAI.
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";

const OPENAI_TEMPERATURE: f64 = 0.7;

/// Text-generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl Provider {
    /// Settings value ("gemini", "openai").
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    /// Display name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(Error::InvalidProvider(other.to_string())),
        }
    }
}

/// Wrap findings in the impression prompt.
pub fn build_prompt(findings: &str) -> String {
    format!(
        "You are an expert radiologist assistant.\n\
         Based on the following MRI/CT findings, write a concise, professional \"Impression\" section for the report.\n\
         \n\
         Rules:\n\
         - Focus on the abnormal findings.\n\
         - Use standard radiological terminology.\n\
         - Do not repeat the detailed findings, just summarize the impression.\n\
         - If everything is normal, state \"No acute abnormality.\"\n\
         - Number the points if there are multiple distinct findings.\n\
         \n\
         Findings:\n\
         {}",
        findings
    )
}

/// Sends a prompt to a text-generation service.
pub trait ImpressionClient {
    /// Return the generated text for `prompt`.
    fn complete(&self, provider: Provider, api_key: &str, prompt: &str) -> Result<String>;
}

/// Draft an impression for `findings` with the configured provider.
///
/// Fails with [`Error::MissingCredential`] before any request when no API
/// key is set.
pub fn generate_impression(
    client: &dyn ImpressionClient,
    findings: &str,
    settings: &AiSettings,
) -> Result<String> {
    let api_key = settings.credential()?;
    let prompt = build_prompt(findings);
    log::info!("requesting impression from {}", settings.provider.name());
    let text = client.complete(settings.provider, api_key, &prompt)?;
    Ok(text.trim().to_string())
}

/// Blocking HTTP client for the Gemini and OpenAI APIs.
#[derive(Debug, Clone)]
pub struct HttpImpressionClient {
    client: Client,
    gemini_endpoint: String,
    openai_endpoint: String,
}

impl HttpImpressionClient {
    /// Create a client for the public endpoints.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            gemini_endpoint: GEMINI_ENDPOINT.to_string(),
            openai_endpoint: OPENAI_ENDPOINT.to_string(),
        })
    }

    /// Override the endpoints (self-hosted gateways).
    pub fn with_endpoints(
        mut self,
        gemini: impl Into<String>,
        openai: impl Into<String>,
    ) -> Self {
        self.gemini_endpoint = gemini.into();
        self.openai_endpoint = openai.into();
        self
    }

    fn post(&self, provider: Provider, request: reqwest::blocking::RequestBuilder, body: Value) -> Result<Value> {
        let response = request.json(&body).send()?;
        let status = response.status();
        let payload: Value = response.json().unwrap_or(Value::Null);
        if !status.is_success() {
            log::warn!("{} request failed with HTTP {}", provider.name(), status);
            return Err(provider_error(provider, &payload));
        }
        Ok(payload)
    }
}

impl ImpressionClient for HttpImpressionClient {
    fn complete(&self, provider: Provider, api_key: &str, prompt: &str) -> Result<String> {
        match provider {
            Provider::Gemini => {
                let request = self
                    .client
                    .post(self.gemini_endpoint.as_str())
                    .query(&[("key", api_key)]);
                let payload = self.post(provider, request, gemini_body(prompt))?;
                gemini_text(&payload)
            }
            Provider::OpenAi => {
                let request = self
                    .client
                    .post(self.openai_endpoint.as_str())
                    .bearer_auth(api_key);
                let payload = self.post(provider, request, openai_body(prompt))?;
                openai_text(&payload)
            }
        }
    }
}

/// Request body for Gemini `generateContent`.
pub fn gemini_body(prompt: &str) -> Value {
    json!({ "contents": [{ "parts": [{ "text": prompt }] }] })
}

/// Request body for OpenAI chat completions.
pub fn openai_body(prompt: &str) -> Value {
    json!({
        "model": OPENAI_MODEL,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": OPENAI_TEMPERATURE,
    })
}

/// Generated text from a Gemini response.
pub fn gemini_text(payload: &Value) -> Result<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| unexpected_response(Provider::Gemini))
}

/// Generated text from an OpenAI response.
pub fn openai_text(payload: &Value) -> Result<String> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| unexpected_response(Provider::OpenAi))
}

fn provider_error(provider: Provider, payload: &Value) -> Error {
    let message = payload
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Failed to fetch from {}", provider.name()));
    Error::Provider {
        provider: provider.name(),
        message,
    }
}

fn unexpected_response(provider: Provider) -> Error {
    Error::Provider {
        provider: provider.name(),
        message: "response did not contain generated text".into(),
    }
}
