//! Run command implementation

use crate::buffer::RollingBuffer;
use crate::config::Config;
use crate::display;
use crate::feed::SessionSupervisor;
use crate::shutdown;
use crate::trade::Decoder;
use crate::ws::WsClient;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Ingest only; do not draw the trade list
    #[arg(long)]
    pub no_display: bool,

    /// Instrument to subscribe to, replacing the configured list (repeatable)
    #[arg(long = "instrument", value_name = "INST_ID")]
    pub instruments: Vec<String>,
}

impl RunArgs {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, mut config: Config) -> anyhow::Result<Config> {
        if !self.instruments.is_empty() {
            config.feed.instruments = self.instruments.clone();
            config.validate()?;
        }
        Ok(config)
    }

    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let config = self.apply(config)?;

        let buffer = Arc::new(RollingBuffer::new(config.buffer_capacity()?));
        let supervisor = SessionSupervisor::new(
            WsClient::new(config.ws_config()),
            config.feed.instruments.clone(),
            Decoder::new(&config.feed.exchange_tag),
            Arc::clone(&buffer),
            config.backoff(),
        );

        let (trigger, shutdown) = shutdown::channel();
        let feed_task = tokio::spawn(supervisor.run(shutdown.clone()));
        let display_task = if self.no_display {
            None
        } else {
            Some(tokio::spawn(display::run_display(
                Arc::clone(&buffer),
                config.display.clone(),
                shutdown.clone(),
            )))
        };

        tokio::signal::ctrl_c().await?;
        tracing::info!("Received shutdown signal");
        trigger.trigger();

        let report = feed_task.await?;
        if let Some(task) = display_task {
            task.await??;
        }

        tracing::info!(
            sessions = report.sessions_started,
            records = report.records_appended,
            decode_failures = report.decode_failures,
            retained = buffer.len(),
            "Trade feed stopped"
        );
        Ok(())
    }
}
