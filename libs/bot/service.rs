//! Service wiring: Telegram client, engine, dispatcher and webhook server

use crate::dispatcher::{Dispatcher, SharedEngine};
use crate::error::{Result, ServiceError};
use crate::server::{self, router, AppState};
use parking_lot::Mutex;
use predictor::{
    BotConfig, Clock, FileTimestampStore, PredictionEngine, ShutdownManager, SystemClock,
};
use std::sync::Arc;
use std::time::Duration;
use telegram::{MessageSender, TelegramClient};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct BotService {
    config: BotConfig,
    client: Arc<TelegramClient>,
    engine: SharedEngine,
    clock: Arc<dyn Clock>,
}

impl BotService {
    pub fn new(config: BotConfig) -> Result<Self> {
        let client = TelegramClient::new(
            &config.telegram.api_base_url,
            &config.bot_token,
            Duration::from_secs(config.telegram.request_timeout_secs),
        )?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let engine = PredictionEngine::from_config(
            &config.engine,
            Box::new(FileTimestampStore::new(&config.engine.timestamp_file)),
            clock.clone(),
        )?;

        Ok(Self {
            config,
            client: Arc::new(client),
            engine: Arc::new(Mutex::new(engine)),
            clock,
        })
    }

    pub fn engine(&self) -> SharedEngine {
        self.engine.clone()
    }

    /// Register the webhook, then serve until shutdown
    pub async fn run(self, shutdown: ShutdownManager) -> Result<()> {
        let bot_username = match self.client.get_me().await {
            Ok(me) => {
                info!("Connected as @{} (id {})", me.username.as_deref().unwrap_or("?"), me.id);
                me.username
            }
            Err(e) => {
                warn!("Could not identify bot, commands for other bots will not be filtered: {}", e);
                None
            }
        };

        match self.config.webhook_endpoint() {
            Some(url) => match self.client.set_webhook(&url).await {
                Ok(()) => info!("Webhook registered at {}", url),
                Err(e) => warn!("Webhook registration failed, keeping the previous one: {}", e),
            },
            None => warn!("WEBHOOK_URL not set, updates only arrive if a webhook is already registered"),
        }

        let (tx, rx) = mpsc::channel(self.config.server.queue_capacity);

        let sender: Arc<dyn MessageSender> = self.client.clone();
        let mut dispatcher = Dispatcher::new(self.engine.clone(), sender, &self.config, self.clock.clone());
        if let Some(username) = bot_username {
            dispatcher = dispatcher.with_bot_username(username);
        }
        let dispatcher_task = tokio::spawn(dispatcher.run(rx, shutdown.clone()));

        let listener = TcpListener::bind((self.config.server.host.as_str(), self.config.server.port)).await?;
        let app = router(&self.config.server.webhook_path, AppState { updates: tx });
        let served = server::serve(listener, app, shutdown.clone()).await;

        // a failed server must not leave the dispatcher running
        shutdown.trigger();
        dispatcher_task
            .await
            .map_err(|e| ServiceError::Dispatcher(e.to_string()))?;
        served?;

        let summary = self.engine.lock().summary();
        info!(
            "Final state: {} pending, {} correct, {} failed",
            summary.pending, summary.correct, summary.failed
        );
        Ok(())
    }
}
