//! Telegram channel adapter.
//!
//! Receives updates through `getUpdates` long polling and replies with
//! `sendMessage`, rendering each reply's menu as a reply keyboard.

use async_trait::async_trait;
use gymbot_config::TelegramSettings;
use gymbot_core::channel::{Channel, ChannelId, ChannelMessage, Reply};
use gymbot_core::error::ChannelError;
use gymbot_core::schedule::UserId;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Buttons per keyboard row.
const BUTTONS_PER_ROW: usize = 2;

/// Telegram channel configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Allowed user IDs. Empty = deny all, ["*"] = allow all.
    pub allowed_users: Vec<String>,
    /// Seconds a `getUpdates` call may wait for new updates.
    pub poll_timeout_secs: u64,
    /// Bot API base URL, without the `/bot<token>` suffix.
    pub api_base: String,
}

impl TelegramConfig {
    /// Build from the config file section. Returns `None` without a token.
    pub fn from_settings(settings: &TelegramSettings) -> Option<Self> {
        let bot_token = settings.bot_token.clone().filter(|t| !t.is_empty())?;
        Some(Self {
            bot_token,
            allowed_users: settings.allowed_users.clone(),
            poll_timeout_secs: settings.poll_timeout_secs,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("allowed_users", &self.allowed_users)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Telegram channel adapter.
pub struct TelegramChannel {
    config: TelegramConfig,
    channel_id: ChannelId,
    http: reqwest::Client,
    /// Sender for injecting test messages.
    inject_tx: Mutex<Option<mpsc::Sender<Result<ChannelMessage, ChannelError>>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self, ChannelError> {
        // Leave room above the long-poll timeout for the response itself
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .map_err(|e| {
                ChannelError::NotConfigured(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            config,
            channel_id: ChannelId("telegram".into()),
            http,
            inject_tx: Mutex::new(None),
            poller: Mutex::new(None),
        })
    }

    /// Inject a message as if it came from Telegram (for testing).
    pub async fn inject_message(&self, msg: ChannelMessage) -> Result<(), ChannelError> {
        let guard = self.inject_tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            tx.send(Ok(msg))
                .await
                .map_err(|_| ChannelError::ConnectionLost("Message channel closed".into()))
        } else {
            Err(ChannelError::ConnectionLost("Channel not started".into()))
        }
    }

    /// Start without the polling task; messages arrive only via
    /// [`inject_message`](Self::inject_message).
    pub async fn start_offline(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(64);
        *self.inject_tx.lock().await = Some(tx);
        Ok(rx)
    }

    async fn call(&self, method: &str, body: &Value) -> Result<Value, ChannelError> {
        let response = self
            .http
            .post(self.config.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| delivery_failed(format!("{method} request failed: {e}")))?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| delivery_failed(format!("{method} returned invalid JSON: {e}")))?;
        check_response(&payload)?;
        Ok(payload)
    }
}

fn delivery_failed(reason: String) -> ChannelError {
    ChannelError::DeliveryFailed {
        channel: "telegram".into(),
        reason,
    }
}

/// Check the `ok` flag of a Bot API response.
///
/// Failures look like `{"ok": false, "error_code": 400, "description": "..."}`.
pub fn check_response(payload: &Value) -> Result<(), ChannelError> {
    if payload.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(());
    }
    let code = payload
        .get("error_code")
        .and_then(Value::as_i64)
        .unwrap_or(-1);
    let description = payload
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Err(delivery_failed(format!(
        "Telegram API error (code {code}): {description}"
    )))
}

/// `ReplyKeyboardMarkup` for a menu, two buttons per row.
pub fn keyboard_markup(menu: &[String]) -> Value {
    let rows: Vec<Value> = menu
        .chunks(BUTTONS_PER_ROW)
        .map(|row| Value::Array(row.iter().map(|label| json!({ "text": label })).collect()))
        .collect();
    json!({
        "keyboard": rows,
        "resize_keyboard": true,
    })
}

/// `sendMessage` body for a reply. No `reply_markup` when the menu is empty.
pub fn send_message_body(chat_id: &str, reply: &Reply) -> Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": reply.text,
    });
    if !reply.menu.is_empty() {
        body["reply_markup"] = keyboard_markup(&reply.menu);
    }
    body
}

/// Convert one update into a message. Non-text updates yield `None`.
pub fn parse_update(update: &Value) -> Option<ChannelMessage> {
    let message = update.get("message")?;
    let content = message.get("text")?.as_str()?.to_string();
    let sender_id = message.pointer("/from/id")?.as_i64()?;
    let chat_id = message.pointer("/chat/id")?.as_i64()?;
    let sender_name = message
        .pointer("/from/username")
        .or_else(|| message.pointer("/from/first_name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let is_command = message
        .get("entities")
        .and_then(Value::as_array)
        .is_some_and(|entities| {
            entities.iter().any(|e| {
                e.get("type").and_then(Value::as_str) == Some("bot_command")
                    && e.get("offset").and_then(Value::as_i64) == Some(0)
            })
        });

    Some(ChannelMessage {
        channel_id: ChannelId("telegram".into()),
        sender_id: UserId(sender_id),
        sender_name,
        chat_id: chat_id.to_string(),
        content,
        is_command,
    })
}

/// Long-poll loop. Ends when the receiver side is dropped.
async fn poll_updates(
    http: reqwest::Client,
    config: TelegramConfig,
    tx: mpsc::Sender<Result<ChannelMessage, ChannelError>>,
) {
    let url = config.method_url("getUpdates");
    let mut offset: i64 = 0;

    loop {
        let body = json!({
            "offset": offset,
            "timeout": config.poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        let payload: Value = match http.post(&url).json(&body).send().await {
            Ok(resp) => match resp.json().await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Failed to parse Telegram response");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    continue;
                }
            },
            Err(e) => {
                warn!(error = %e, "Telegram poll failed, retrying");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        if let Err(e) = check_response(&payload) {
            warn!(error = %e, "getUpdates rejected");
            tokio::time::sleep(Duration::from_secs(5)).await;
            continue;
        }

        let updates = payload
            .get("result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for update in &updates {
            if let Some(id) = update.get("update_id").and_then(Value::as_i64) {
                offset = offset.max(id + 1);
            }
            let Some(msg) = parse_update(update) else {
                debug!("Skipping non-text update");
                continue;
            };
            if tx.send(Ok(msg)).await.is_err() {
                return;
            }
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn id(&self) -> &ChannelId {
        &self.channel_id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        if self.config.bot_token.is_empty() {
            return Err(ChannelError::NotConfigured(
                "Telegram bot token is missing".into(),
            ));
        }
        info!(timeout = self.config.poll_timeout_secs, "Telegram channel starting");
        let rx = self.start_offline().await?;
        let tx = self
            .inject_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| ChannelError::ConnectionLost("Channel not started".into()))?;
        let handle = tokio::spawn(poll_updates(self.http.clone(), self.config.clone(), tx));
        *self.poller.lock().await = Some(handle);
        Ok(rx)
    }

    async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
        debug!(
            chat_id = %chat_id,
            content_len = reply.text.len(),
            buttons = reply.menu.len(),
            "Telegram send"
        );
        self.call("sendMessage", &send_message_body(chat_id, reply))
            .await
            .map(|_| ())
    }

    fn is_allowed(&self, sender_id: UserId) -> bool {
        if self.config.allowed_users.is_empty() {
            return false;
        }
        if self.config.allowed_users.iter().any(|u| u == "*") {
            return true;
        }
        let id = sender_id.to_string();
        self.config.allowed_users.iter().any(|u| *u == id)
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        info!("Telegram channel stopping");
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
        }
        *self.inject_tx.lock().await = None;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        if self.config.bot_token.is_empty() {
            return Ok(false);
        }
        Ok(self.call("getMe", &json!({})).await.is_ok())
    }
}
