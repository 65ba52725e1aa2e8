use std::thread;
use std::time::Duration;

use amimi_contracts::collage::RawImageResponse;
use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::{ImageGenerator, Provider, TextGenerator};

/// Gemini `generateContent` transport for both reflection text and collage images.
pub struct GeminiProvider {
    api_base: String,
    api_key: String,
    text_model: String,
    image_model: String,
    timeout: Duration,
    transport_retries: usize,
    retry_backoff_s: f64,
    http: HttpClient,
}

impl GeminiProvider {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let Some(api_key) = config.api_key.clone() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY not set");
        };
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            timeout: Duration::from_secs_f64(config.request_timeout_s),
            transport_retries: config.transport_retries,
            retry_backoff_s: config.retry_backoff_s,
            http: HttpClient::new(),
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn text_payload(prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        })
    }

    fn image_payload(prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] },
        })
    }

    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        let endpoint = self.endpoint_for_model(model);
        let response = self.post_with_transport_retries(&endpoint, payload)?;
        response_json_or_error("Gemini", response)
    }

    fn post_with_transport_retries(&self, endpoint: &str, payload: &Value) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            let response = self
                .http
                .post(endpoint)
                .query(&[("key", self.api_key.as_str())])
                .timeout(self.timeout)
                .json(payload)
                .send();

            match response {
                Ok(ok) => return Ok(ok),
                Err(raw) => {
                    let err = anyhow::Error::new(raw)
                        .context(format!("Gemini request failed ({endpoint})"));
                    if !is_retryable_transport_error(&err) || attempt >= self.transport_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay_s = self.retry_backoff_s * attempt as f64;
                    thread::sleep(Duration::from_secs_f64(delay_s));
                }
            }
        }
    }

    /// First non-empty `text` part across candidates; empty when the model sent none.
    fn extract_text(response_payload: &Value) -> String {
        response_payload
            .get("candidates")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|candidate| {
                candidate
                    .get("content")
                    .and_then(|content| content.get("parts"))
                    .and_then(Value::as_array)
            })
            .flatten()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }
}

impl TextGenerator for GeminiProvider {
    fn generate_text(&self, prompt: &str) -> Result<String> {
        let payload = Self::text_payload(prompt);
        let response_payload = self
            .generate_content(&self.text_model, &payload)
            .context("Gemini text generation failed")?;
        Ok(Self::extract_text(&response_payload))
    }
}

impl ImageGenerator for GeminiProvider {
    fn generate_image(&self, prompt: &str) -> Result<RawImageResponse> {
        let payload = Self::image_payload(prompt);
        let response_payload = self
            .generate_content(&self.image_model, &payload)
            .context("Gemini image generation failed")?;
        Ok(RawImageResponse::new(response_payload))
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    serde_json::from_str(&body).with_context(|| format!("{provider} returned invalid JSON payload"))
}

fn is_retryable_transport_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .map(|reqwest_err| reqwest_err.is_timeout() || reqwest_err.is_connect())
            .unwrap_or(false)
    })
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::EngineConfig;

    use super::{truncate_text, GeminiProvider};

    fn provider() -> GeminiProvider {
        let config = EngineConfig {
            api_key: Some("test-key".to_string()),
            api_base: "http://localhost:1/v1beta/".to_string(),
            ..EngineConfig::default()
        };
        GeminiProvider::new(&config).unwrap()
    }

    #[test]
    fn missing_api_key_fails_construction() {
        let err = GeminiProvider::new(&EngineConfig::default())
            .err()
            .expect("construction should fail");
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn endpoint_accepts_bare_and_prefixed_models() {
        let provider = provider();
        assert_eq!(
            provider.endpoint_for_model("gemini-2.0-flash"),
            "http://localhost:1/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            provider.endpoint_for_model(" models/gemini-2.5-flash-image "),
            "http://localhost:1/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn payloads_request_json_text_and_image_modality() {
        let text = GeminiProvider::text_payload("hello");
        assert_eq!(text["contents"][0]["parts"][0]["text"], json!("hello"));
        assert_eq!(
            text["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        let image = GeminiProvider::image_payload("draw");
        assert_eq!(
            image["generationConfig"]["responseModalities"],
            json!(["IMAGE"])
        );
    }

    #[test]
    fn extract_text_skips_blank_and_non_text_parts() {
        let payload = json!({
            "candidates": [
                { "content": { "parts": [{ "inlineData": { "data": "x" } }, { "text": "  " }] } },
                { "content": { "parts": [{ "text": "{\"summary\": \"hi\"}" }] } }
            ]
        });
        assert_eq!(GeminiProvider::extract_text(&payload), "{\"summary\": \"hi\"}");
        assert_eq!(GeminiProvider::extract_text(&json!({"promptFeedback": {}})), "");
    }

    #[test]
    fn truncate_text_marks_cut_bodies() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc…");
    }
}
