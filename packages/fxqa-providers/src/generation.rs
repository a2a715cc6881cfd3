use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// How the model should sample for one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
	/// Temperature 0. Used by the planner and both judges.
	Deterministic,
	/// The configured temperature, or the provider default when none is configured.
	Default,
}

pub async fn generate(
	cfg: &fxqa_config::LlmProviderConfig,
	prompt: &str,
	sampling: Sampling,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = request_body(cfg, prompt, sampling);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	tracing::debug!(model = %cfg.model, ?sampling, "Generation call completed.");

	parse_completion_text(json)
}

fn request_body(cfg: &fxqa_config::LlmProviderConfig, prompt: &str, sampling: Sampling) -> Value {
	let mut body = serde_json::json!({
		"model": cfg.model,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let temperature = match sampling {
		Sampling::Deterministic => Some(0.0),
		Sampling::Default => cfg.temperature,
	};

	if let (Some(temperature), Some(map)) = (temperature, body.as_object_mut()) {
		map.insert("temperature".to_string(), serde_json::json!(temperature));
	}

	body
}

fn parse_completion_text(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})
}
