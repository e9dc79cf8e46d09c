use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
const API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage` sink.
#[derive(Clone)]
pub struct TelegramNotifier {
    token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            token: Some(token),
            chat_id: Some(chat_id),
            api_base: API_BASE.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }

    /// Reads the credentials from env; missing ones only fail at send time.
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            token: non_empty(ENV_BOT_TOKEN),
            chat_id: non_empty(ENV_CHAT_ID),
            ..Self::new(String::new(), String::new())
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// Point at another Bot API host (local test server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            return Err(anyhow!(
                "Telegram disabled: {ENV_BOT_TOKEN} and {ENV_CHAT_ID} must be set"
            ));
        };

        let url = self.endpoint(token);
        let payload = SendMessage::markdown(chat_id, text);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&url)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            // Never log `url`: it embeds the bot token.
            let err = match res {
                Ok(rsp) => {
                    let status = rsp.status();
                    if status.is_success() {
                        tracing::info!(target: "notify", %status, "telegram sent");
                        return Ok(());
                    }
                    if status.is_client_error() {
                        // Bad markup, bad chat id, revoked token: retrying cannot help.
                        let body = rsp.text().await.unwrap_or_default();
                        return Err(anyhow!("Telegram rejected message ({status}): {body}"));
                    }
                    anyhow!("Telegram HTTP error: {status}")
                }
                Err(e) => anyhow!("Telegram request failed: {}", e.without_url()),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::warn!(target: "notify", attempt, error = %err, "telegram send retry");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl<'a> SendMessage<'a> {
    fn markdown(chat_id: &'a str, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        }
    }
}
