mod config;
mod forwarder;

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use config::Config;
use forwarder::{ForwarderEngine, GoogleDocsClient, InboundMessage, MessageKey, TokenProvider};

struct BotState {
    config: Config,
    engine: ForwarderEngine<GoogleDocsClient>,
}

impl BotState {
    async fn new(config: Config, bot: &Bot) -> Self {
        // Get bot info; self-authored messages are filtered by this id
        let bot_user_id = match bot.get_me().await {
            Ok(me) => {
                info!("Logged in as @{} ({})", me.username(), me.id);
                me.id.0 as i64
            }
            Err(e) => {
                warn!("Failed to get bot info: {e}");
                0
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let auth = TokenProvider::new(config.service_account.clone(), http.clone());
        let docs = GoogleDocsClient::new(auth, http);
        let engine = ForwarderEngine::new(bot_user_id, docs, config.google_doc_id.clone());

        Self { config, engine }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Missing or malformed configuration is fatal: fail fast instead of
    // listening in a degraded state.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("mombot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting mombot...");
    if config.enforce_channel_filter {
        info!("Watching {} channel(s)", config.channel_ids.len());
    } else if !config.channel_ids.is_empty() {
        info!(
            "CHANNEL_IDS set but not enforced (set ENFORCE_CHANNEL_FILTER=true to restrict)"
        );
    }
    match &config.google_doc_id {
        Some(id) => info!("Appending to existing document {id}"),
        None => info!("No document configured; one will be created on first match"),
    }

    let bot = Bot::new(&config.telegram_bot_token);
    let state = Arc::new(BotState::new(config, &bot).await);

    if let Err(e) = state.engine.start() {
        warn!("Not starting a second listener: {e}");
        return;
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_new_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_new_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if !state.config.is_watched_channel(msg.chat.id) {
        return Ok(());
    }

    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    state.engine.handle_message(telegram_to_inbound(&msg, text)).await;

    Ok(())
}

fn telegram_to_inbound(msg: &Message, text: &str) -> InboundMessage {
    let user = msg.from.as_ref();
    let author_id = user.map(|u| u.id.0 as i64).unwrap_or(0);
    let author_name = user
        .and_then(|u| u.username.as_deref())
        .unwrap_or_else(|| user.map(|u| u.first_name.as_str()).unwrap_or("unknown"))
        .to_string();

    InboundMessage {
        key: MessageKey { chat_id: msg.chat.id.0, message_id: msg.id.0 as i64 },
        author_id,
        author_name,
        text: text.to_string(),
    }
}
