//! Single-writer event loop
//!
//! Every engine mutation happens here, one update at a time. The engine lock
//! is only held while deciding; sends and edits run after it is released.

use crate::commands::{Authorizer, Command, RedirectArgs};
use crate::messages;
use crate::rate_limit::{RateDecision, RateLimiter};
use parking_lot::Mutex;
use predictor::application::engine::seconds;
use predictor::{
    BotConfig, ChatId, Clock, EngineEffect, Heartbeat, PredictionEngine, ShutdownManager,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use telegram::{Incoming, MessageSender, Update};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub type SharedEngine = Arc<Mutex<PredictionEngine>>;

/// Update ids remembered to drop webhook redeliveries
const RECENT_UPDATES: usize = 256;

/// Users tracked by the rate limiter before idle ones are pruned
const PRUNE_THRESHOLD: usize = 1024;

pub struct Dispatcher {
    engine: SharedEngine,
    sender: Arc<dyn MessageSender>,
    clock: Arc<dyn Clock>,
    source_channel_id: ChatId,
    cooldown_min_secs: u64,
    cooldown_max_secs: u64,
    authorizer: Authorizer,
    limiter: RateLimiter,
    heartbeat: Heartbeat,
    bot_username: Option<String>,
    recent_updates: VecDeque<i64>,
}

impl Dispatcher {
    pub fn new(
        engine: SharedEngine,
        sender: Arc<dyn MessageSender>,
        config: &BotConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine,
            sender,
            source_channel_id: config.engine.source_channel_id,
            cooldown_min_secs: config.engine.cooldown_min_secs,
            cooldown_max_secs: config.engine.cooldown_max_secs,
            authorizer: Authorizer::new(config.telegram.admin_id, config.debug_mode),
            limiter: RateLimiter::new(
                config.telegram.rate_limit_max_messages,
                seconds(config.telegram.rate_limit_window_secs),
            ),
            heartbeat: Heartbeat::new(config.heartbeat_interval_secs, clock.clone()),
            clock,
            bot_username: None,
            recent_updates: VecDeque::with_capacity(RECENT_UPDATES),
        }
    }

    /// Ignore commands addressed to other bots (`/cmd@other_bot`)
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Consume updates until the queue closes or shutdown is requested.
    ///
    /// Updates already queued at shutdown are still handled.
    pub async fn run(mut self, mut updates: mpsc::Receiver<Update>, shutdown: ShutdownManager) {
        let mut heartbeat_check = tokio::time::interval(Duration::from_secs(30));

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(update) => self.handle_update(update).await,
                    None => break,
                },
                _ = heartbeat_check.tick() => self.log_heartbeat(),
                _ = shutdown.wait() => break,
            }
        }

        updates.close();
        while let Some(update) = updates.recv().await {
            self.handle_update(update).await;
        }

        info!("Dispatcher stopped");
    }

    fn log_heartbeat(&mut self) {
        if !self.heartbeat.tick() {
            return;
        }
        let summary = self.engine.lock().summary();
        info!(
            "Heartbeat: {} pending, {} correct, {} failed, cooldown {}s",
            summary.pending, summary.correct, summary.failed, summary.cooldown_secs
        );
    }

    pub async fn handle_update(&mut self, update: Update) {
        let update_id = update.update_id;
        if self.recent_updates.contains(&update_id) {
            debug!("Update {} already handled, dropping redelivery", update_id);
            return;
        }
        if self.recent_updates.len() == RECENT_UPDATES {
            self.recent_updates.pop_front();
        }
        self.recent_updates.push_back(update_id);

        match update.into_incoming() {
            Some(incoming) => self.handle(incoming).await,
            None => debug!("Update {} carries no text, ignoring", update_id),
        }
    }

    pub async fn handle(&mut self, incoming: Incoming) {
        if incoming.chat_kind == "private" {
            if let Some(user_id) = incoming.sender_id {
                let now = self.clock.now();
                if self.limiter.tracked_users() > PRUNE_THRESHOLD {
                    self.limiter.prune(now);
                }
                if let RateDecision::Limited { notify } = self.limiter.check(user_id, now) {
                    warn!("User {} is rate limited", user_id);
                    if notify {
                        self.reply(incoming.chat_id, messages::RATE_LIMITED).await;
                    }
                    return;
                }
            }
        }

        if incoming.is_command() {
            self.handle_command(&incoming).await;
            return;
        }

        if incoming.source_chat_id != self.source_channel_id {
            debug!("Ignoring message from chat {}", incoming.source_chat_id);
            return;
        }

        let effects = self.engine.lock().process(&incoming.to_event());
        for effect in effects {
            self.apply(effect).await;
        }
    }

    async fn apply(&mut self, effect: EngineEffect) {
        match effect {
            EngineEffect::Announce {
                target,
                destination,
                text,
            } => match self.sender.send_text(destination, &text).await {
                Ok(handle) => {
                    self.engine.lock().register_handle(target, handle);
                    info!(
                        "Prediction for game {} posted to {} (message {})",
                        target, destination, handle.message_id
                    );
                }
                Err(e) => warn!(
                    "Could not post prediction for game {}, it stays pending: {}",
                    target, e
                ),
            },
            EngineEffect::Edit {
                target,
                handle: None,
                ..
            } => warn!("No posted message for game {}, skipping edit", target),
            EngineEffect::Edit {
                target,
                handle: Some(handle),
                status,
                text,
            } => match self.sender.edit_text(handle, &text).await {
                Ok(()) => info!("Prediction for game {} marked {}", target, status.label()),
                Err(e) => warn!("Could not edit prediction for game {}: {}", target, e),
            },
        }
    }

    async fn handle_command(&mut self, incoming: &Incoming) {
        let authorized = self.authorizer.is_authorized(incoming.sender_id);

        let command = match Command::parse(&incoming.text, self.bot_username.as_deref()) {
            Ok(Some(command)) => command,
            Ok(None) => return,
            Err(e) => {
                debug!("Bad command from {:?}: {}", incoming.sender_id, e);
                if authorized {
                    self.reply(incoming.chat_id, &messages::usage_error(&e.to_string()))
                        .await;
                }
                return;
            }
        };

        if !authorized {
            warn!(
                "Unauthorized /{} from {:?} in chat {}",
                command.name(),
                incoming.sender_id,
                incoming.chat_id
            );
            if incoming.chat_kind == "private" {
                self.reply(incoming.chat_id, messages::UNAUTHORIZED).await;
            }
            return;
        }

        info!("Command /{} in chat {}", command.name(), incoming.chat_id);
        let reply = self.execute(command, incoming.chat_id).await;
        self.reply(incoming.chat_id, &reply).await;
    }

    async fn execute(&mut self, command: Command, chat_id: ChatId) -> String {
        match command {
            Command::Start => messages::WELCOME.to_string(),
            Command::Help => messages::HELP.to_string(),
            Command::About => messages::ABOUT.to_string(),
            Command::Dev => messages::DEV.to_string(),
            Command::Cooldown(None) => {
                let summary = self.engine.lock().summary();
                messages::cooldown_status(
                    summary.cooldown_secs,
                    summary.cooldown_remaining_secs,
                    self.cooldown_min_secs,
                    self.cooldown_max_secs,
                )
            }
            Command::Cooldown(Some(secs)) => {
                if !(self.cooldown_min_secs..=self.cooldown_max_secs).contains(&secs) {
                    return messages::cooldown_out_of_range(self.cooldown_min_secs, self.cooldown_max_secs);
                }
                self.engine.lock().set_cooldown(seconds(secs));
                messages::cooldown_updated(secs)
            }
            Command::Redirect(RedirectArgs::Set { source, destination }) => {
                self.engine.lock().redirects_mut().set(source, destination);
                info!("Redirect {} → {}", source, destination);
                messages::redirect_set(source, destination)
            }
            Command::Redirect(RedirectArgs::List) => {
                let (default_destination, routes) = {
                    let engine = self.engine.lock();
                    (engine.redirects().default_destination(), engine.redirects().routes())
                };
                messages::redirect_list(default_destination, &routes)
            }
            Command::Redirect(RedirectArgs::Clear) => {
                self.engine.lock().redirects_mut().clear();
                info!("Redirects cleared");
                messages::REDIRECTS_CLEARED.to_string()
            }
            Command::Redi => {
                let source = self.source_channel_id;
                self.engine.lock().redirects_mut().set(source, chat_id);
                info!("Redirect {} → {} (quick)", source, chat_id);
                messages::redirect_set(source, chat_id)
            }
            Command::Reset => {
                self.engine.lock().reset();
                messages::RESET_DONE.to_string()
            }
            Command::Announce(text) => {
                let destination = self.engine.lock().redirects().default_destination();
                let announcement = format!("📢 <b>ANNONCE OFFICIELLE</b> 📢\n\n{}", text);
                match self.sender.send_text(destination, &announcement).await {
                    Ok(_) => messages::ANNOUNCE_SENT.to_string(),
                    Err(e) => {
                        warn!("Announcement to {} failed: {}", destination, e);
                        messages::ANNOUNCE_FAILED.to_string()
                    }
                }
            }
            Command::Pred => {
                let engine = self.engine.lock();
                let text = messages::prediction_summary(&engine.summary(), engine.store().records());
                text
            }
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.sender.send_text(chat_id, text).await {
            warn!("Could not reply in chat {}: {}", chat_id, e);
        }
    }
}
