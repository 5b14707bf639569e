//! CLI channel: interactive terminal chat against the same bot logic.
//!
//! Reads lines from stdin and prints replies to stdout, with the offered
//! menu shown as a line of `[label]` buttons. Typing a label (with or
//! without its emoji) selects it.

use async_trait::async_trait;
use gymbot_core::channel::{Channel, ChannelId, ChannelMessage, Reply};
use gymbot_core::error::ChannelError;
use gymbot_core::schedule::UserId;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const CHAT_ID: &str = "cli_session";

/// Interactive CLI channel acting as a single local user.
pub struct CliChannel {
    id: ChannelId,
    user: UserId,
}

impl CliChannel {
    pub fn new(user: UserId) -> Self {
        Self {
            id: ChannelId("cli".into()),
            user,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new(UserId(1))
    }
}

/// Terminal rendering of a reply.
pub fn render(reply: &Reply) -> String {
    if reply.menu.is_empty() {
        return reply.text.clone();
    }
    let buttons: Vec<String> = reply.menu.iter().map(|label| format!("[{label}]")).collect();
    format!("{}\n{}", reply.text, buttons.join(" "))
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();
        let user = self.user;

        tokio::spawn(async move {
            let mut lines = BufReader::new(io::stdin()).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        if is_exit(&line) {
                            break;
                        }

                        let msg = ChannelMessage {
                            channel_id: channel_id.clone(),
                            sender_id: user,
                            sender_name: Some("local".into()),
                            chat_id: CHAT_ID.into(),
                            is_command: line.starts_with('/'),
                            content: line,
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, _chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
        println!("{}\n", render(reply));
        Ok(())
    }

    fn is_allowed(&self, _sender_id: UserId) -> bool {
        true // local user
    }
}
