use anyhow::{Context, Result};
use card_prediction_bot::bin_common::{load_config_from_env, BinaryRunner, ConfigType, RunConfig};
use card_prediction_bot::bot::BotService;
use card_prediction_bot::predictor::{init_tracing_with_level, BotConfig, ShutdownManager};

struct PredictionBot {
    run_config: RunConfig,
    service: Option<BotService>,
    shutdown: ShutdownManager,
}

impl BinaryRunner for PredictionBot {
    async fn run(&mut self) -> Result<Option<String>> {
        let service = self
            .service
            .take()
            .context("prediction bot already ran")?;
        let engine = service.engine();

        service.run(self.shutdown.clone()).await?;

        let summary = engine.lock().summary();
        Ok(Some(format!(
            "Predictions: {} pending, {} correct, {} failed",
            summary.pending, summary.correct, summary.failed
        )))
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = load_config_from_env(ConfigType::Bot);
    let config = BotConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    init_tracing_with_level(&config.log_level);
    config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut app = PredictionBot {
        run_config: RunConfig::new("Card Prediction Bot").with_heartbeat(config.heartbeat_interval_secs),
        service: Some(BotService::new(config)?),
        shutdown,
    };

    app.execute().await
}
