//! Core `Translator` trait and `ApiTranslator` implementation.
//!
//! `ApiTranslator` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint — Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM, etc.
//! All connection details come from [`TranslateConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TranslateConfig;

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors that can occur during a live translation call.
///
/// The orchestrator treats all variants the same way (surface to the user,
/// no automatic retry); the distinction exists for logging.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse translation response: {0}")]
    Parse(String),

    /// The API returned a response with no usable text content.
    #[error("translation service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async trait for the live translation call.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn Translator>`).
///
/// # Arguments
/// * `text`        – Trimmed, non-empty source text.
/// * `source_lang` – ISO-639-1 code of the source language.
/// * `target_lang` – ISO-639-1 code of the target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError>;
}

// ---------------------------------------------------------------------------
// ApiTranslator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint with a
/// translation prompt.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`TranslateConfig`] passed to [`ApiTranslator::from_config`].
pub struct ApiTranslator {
    client: reqwest::Client,
    config: TranslateConfig,
}

impl ApiTranslator {
    /// Build an `ApiTranslator` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &TranslateConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn build_prompt(text: &str, source_lang: &str, target_lang: &str) -> (String, String) {
        let system = "You are a translation engine. Reply with the translated text only, \
                      no explanations and no quotation marks."
            .to_string();
        let user = format!(
            "Translate the following text from the language with code \"{source_lang}\" \
             to the language with code \"{target_lang}\":\n\n{text}"
        );
        (system, user)
    }
}

#[async_trait]
impl Translator for ApiTranslator {
    /// Send `text` to the configured OpenAI-compatible endpoint.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// Ollama and other local providers that require no authentication.
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError> {
        let (system_msg, user_msg) = Self::build_prompt(text, source_lang, target_lang);

        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  1024
        });

        let mut req = self.client.post(&url).json(&body);

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let translated = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(TranslateError::EmptyResponse)?
            .trim()
            .to_string();

        if translated.is_empty() {
            return Err(TranslateError::EmptyResponse);
        }

        Ok(translated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
