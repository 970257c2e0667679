use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::{error, info};

use common::config::Config;
use common::logger;
use market_data::remote::HttpQuoteClient;
use storage::StateStore;

use crate::notify::{AlertDispatcher, AlertSink, EmailSink, TelegramSink};
use crate::orchestrator::Orchestrator;

mod clock;
mod notify;
mod orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();

    let config = Config::from_env()?;
    config.require_any_sink()?;

    let mut sinks: Vec<Box<dyn AlertSink>> = Vec::new();
    if let (Some(token), Some(chat_id)) = (&config.telegram_bot_token, config.telegram_chat_id) {
        sinks.push(Box::new(TelegramSink::new(token, chat_id)));
        info!("telegram sink configured");
    }
    if let (Some(endpoint), Some(from), Some(to)) =
        (&config.mail_endpoint, &config.mail_from, &config.mail_to)
    {
        match EmailSink::new(endpoint, from, to) {
            Ok(sink) => {
                sinks.push(Box::new(sink));
                info!("email sink configured");
            }
            Err(e) => error!("{}: {}", e.kind(), e),
        }
    }
    let dispatcher = AlertDispatcher::new(sinks, Duration::from_secs(config.sink_deadline_secs));
    anyhow::ensure!(!dispatcher.is_empty(), "every configured sink failed to build");

    let store = StateStore::new(&config.data_dir)?;
    let provider = Arc::new(HttpQuoteClient::new(config.provider_base_url.clone()));
    let orchestrator = Orchestrator::new(config, provider, store, dispatcher);

    info!("alert engine starting");
    tokio::select! {
        _ = orchestrator.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}
