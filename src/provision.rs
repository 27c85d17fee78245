//! `voxline provision` — registers the scheduling assistant with the voice
//! platform so its call events land on this relay's /webhook endpoint.

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use voxline_core::PlatformConfig;

/// Build the assistant creation payload from config.
fn assistant_payload(config: &PlatformConfig) -> Value {
    json!({
        "name": config.assistant_name,
        "firstMessage": config.first_message,
        "endCallMessage": config.end_call_message,
        "model": {
            "provider": config.model_provider,
            "model": config.model,
            "temperature": config.temperature,
            "maxTokens": config.max_tokens,
        },
        "voice": {
            "provider": config.voice_provider,
            "voiceId": config.voice_id,
        },
        "transcriber": {
            "provider": config.transcriber_provider,
            "model": config.transcriber_model,
        },
        "server": config.webhook_url,
    })
}

pub async fn run(config: &PlatformConfig) -> Result<()> {
    let api_key = if config.api_key.is_empty() {
        std::env::var("VAPI_API_KEY")
            .context("platform API key missing: set [platform].api_key or VAPI_API_KEY")?
    } else {
        config.api_key.clone()
    };
    if config.webhook_url.is_empty() {
        bail!("[platform].webhook_url is required so the assistant knows where to send events");
    }

    let url = format!("{}/assistant", config.base_url);
    let response = reqwest::Client::new()
        .post(&url)
        .bearer_auth(&api_key)
        .json(&assistant_payload(config))
        .send()
        .await
        .context("assistant creation request failed")?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .context("assistant creation returned an unreadable body")?;
    if !status.is_success() {
        bail!("assistant creation failed ({status}): {body}");
    }

    let id = body["id"].as_str().unwrap_or("<unknown>");
    println!("✅ Assistant created:");
    println!("   Name:      {}", config.assistant_name);
    println!("   ID:        {id}");
    println!("   Events to: {}", config.webhook_url);
    println!("   Dashboard: https://dashboard.vapi.ai/assistants/{id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_mirrors_platform_config() {
        let mut config = PlatformConfig::default();
        config.webhook_url = "https://relay.example.com/webhook".into();
        let payload = assistant_payload(&config);

        assert_eq!(payload["name"], "Voice Scheduler");
        assert_eq!(payload["model"]["provider"], "openai");
        assert_eq!(payload["model"]["maxTokens"], 200);
        assert_eq!(payload["voice"]["voiceId"], "en-US-JennyNeural");
        assert_eq!(payload["transcriber"]["model"], "nova2");
        assert_eq!(payload["server"], "https://relay.example.com/webhook");
    }
}
