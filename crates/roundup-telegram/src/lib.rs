// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat transport for the roundup survey bot.
//!
//! Implements [`ChatTransport`] for the Telegram Bot API via teloxide,
//! providing long polling, message and callback routing, prompt deletion,
//! and inline keyboard controls.

pub mod handler;
pub mod keyboard;

use std::sync::Arc;

use async_trait::async_trait;
use roundup_config::model::TelegramConfig;
use roundup_core::error::RoundupError;
use roundup_core::traits::{Adapter, ChatTransport};
use roundup_core::types::{
    AdapterType, ConversationId, DeleteOutcome, HealthStatus, InboundEvent, Keyboard, MessageId,
};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram chat transport implementing [`ChatTransport`].
///
/// Connects via long polling, filters updates by chat type and allowlist,
/// and forwards them to the engine as [`InboundEvent`]s.
pub struct TelegramTransport {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramTransport {
    /// Creates a new Telegram transport.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, RoundupError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RoundupError::Config("telegram.bot_token is required for the Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(RoundupError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Starts long polling, spawning the dispatcher task.
    pub fn connect(&mut self) {
        if self.polling_handle.is_some() {
            return; // Already connected
        }

        let bot = self.bot.clone();
        let allowed: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());

        info!("starting Telegram long polling");

        let message_tx = self.inbound_tx.clone();
        let message_allowed = allowed.clone();
        let message_branch = Update::filter_message().endpoint(move |msg: Message| {
            let tx = message_tx.clone();
            let allowed = message_allowed.clone();
            async move {
                // The survey is a DM flow; group chatter is not ours.
                if !handler::is_dm(&msg) {
                    debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                    return respond(());
                }

                if !handler::is_allowed(&msg, &allowed) {
                    debug!(chat_id = msg.chat.id.0, "ignoring user not on allowlist");
                    return respond(());
                }

                match handler::message_to_event(&msg) {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            warn!("inbound channel closed, dropping message");
                        }
                    }
                    None => {
                        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
                    }
                }

                respond(())
            }
        });

        let callback_tx = self.inbound_tx.clone();
        let callback_allowed = allowed.clone();
        let callback_branch =
            Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                let tx = callback_tx.clone();
                let allowed = callback_allowed.clone();
                async move {
                    // Stop the client-side spinner whatever happens next.
                    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                        debug!(error = %e, "failed to answer callback query");
                    }

                    if !handler::is_user_allowed(&query.from, &allowed) {
                        debug!(user_id = query.from.id.0, "ignoring press from user not on allowlist");
                        return respond(());
                    }

                    match handler::callback_to_event(&query) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping button press");
                            }
                        }
                        None => {
                            debug!("ignoring unknown or malformed callback data");
                        }
                    }

                    respond(())
                }
            });

        let handle = tokio::spawn(async move {
            let tree = dptree::entry().branch(message_branch).branch(callback_branch);
            Dispatcher::builder(bot, tree)
                .default_handler(|_| async {}) // Silently ignore other update kinds
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
    }
}

fn parse_chat(conversation: &ConversationId) -> Result<ChatId, RoundupError> {
    conversation
        .0
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| RoundupError::channel(format!("invalid conversation id {conversation}: {e}")))
}

fn parse_message_id(message: &MessageId) -> Result<teloxide::types::MessageId, RoundupError> {
    message
        .0
        .parse::<i32>()
        .map(teloxide::types::MessageId)
        .map_err(|e| RoundupError::channel(format!("invalid message id {message}: {e}")))
}

#[async_trait]
impl Adapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RoundupError> {
        // Check the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RoundupError> {
        debug!("Telegram transport shutting down");
        // The polling handle is aborted when TelegramTransport is dropped.
        // For graceful shutdown the survey loop stops calling next_event()
        // first.
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(
        &self,
        conversation: &ConversationId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, RoundupError> {
        let chat = parse_chat(conversation)?;

        let mut request = self.bot.send_message(Recipient::Id(chat), text);
        if let Some(ref kb) = keyboard {
            request = request.reply_markup(keyboard::to_markup(kb));
        }

        let sent = request.await.map_err(|e| RoundupError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn edit(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), RoundupError> {
        let chat = parse_chat(conversation)?;
        let msg_id = parse_message_id(message)?;

        let mut request = self.bot.edit_message_text(chat, msg_id, text);
        if let Some(ref kb) = keyboard {
            request = request.reply_markup(keyboard::to_markup(kb));
        }

        match request.await {
            Ok(_) => Ok(()),
            // Re-rendering identical content is not a failure.
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(RoundupError::Channel {
                message: format!("failed to edit message: {e}"),
                source: Some(Box::new(e)),
            }),
        }
    }

    async fn delete(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
    ) -> Result<DeleteOutcome, RoundupError> {
        let chat = parse_chat(conversation)?;
        let msg_id = parse_message_id(message)?;

        match self.bot.delete_message(chat, msg_id).await {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.to_string().contains("message to delete not found") => {
                Ok(DeleteOutcome::NotFound)
            }
            Err(e) => Err(RoundupError::Channel {
                message: format!("failed to delete message: {e}"),
                source: Some(Box::new(e)),
            }),
        }
    }

    async fn send_document(
        &self,
        conversation: &ConversationId,
        filename: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<(), RoundupError> {
        let chat = parse_chat(conversation)?;
        let file = InputFile::memory(bytes).file_name(filename.to_string());

        self.bot
            .send_document(Recipient::Id(chat), file)
            .caption(caption.to_string())
            .await
            .map_err(|e| RoundupError::Channel {
                message: format!("failed to send document: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(())
    }

    async fn next_event(&self) -> Result<InboundEvent, RoundupError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| RoundupError::channel("Telegram inbound channel closed"))
    }
}
