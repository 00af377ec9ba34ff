use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

mod application;
mod domain;
mod infrastructure;

use application::messaging::Dispatcher;
use application::services::{register_org_commands, scheduler, CommandService, OrgContext};
use domain::traits::Outbound;
use infrastructure::adapters::console;
use infrastructure::adapters::telegram::TelegramAdapter;
use infrastructure::adapters::webhook;
use infrastructure::config::{Config, TransportMode};
use infrastructure::directory::DirectoryStore;
use infrastructure::orgdata::OrgDataStore;

/// Descriptions registered with Telegram's command menu.
const COMMAND_MENU: &[(&str, &str)] = &[
    ("start", "Greeting and a pointer to /help"),
    ("help", "List available commands"),
    ("company", "Company information"),
    ("team", "Team roster"),
    ("contacts", "Contact list"),
    ("events", "Upcoming events"),
    ("digest", "Event digest for the configured window"),
    ("departments", "Departments from the employee file"),
    ("staff", "List employees, optionally by department"),
    ("find", "Search employees"),
];

#[derive(Parser)]
#[command(name = "orgdesk-bot")]
#[command(about = "Organization assistant bot for Telegram", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config, cli.token);
        }
        Commands::Version => {
            println!("orgdesk-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config(&cli.config);
        }
    }
}

fn init_config(path: &str) {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => match std::fs::write(path, yaml) {
            Ok(()) => println!("Wrote default config to {}", path),
            Err(e) => eprintln!("Failed to write {}: {}", path, e),
        },
        Err(e) => eprintln!("Failed to render default config: {}", e),
    }
}

fn run_bot(config_path: String, token_override: Option<String>) {
    // Load config
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    tracing::info!("Starting orgdesk-bot: {}", config.bot.name);
    let tz = config.timezone();

    // Data sources are required at startup: serving with no directory
    // loaded is not allowed.
    let directory = match DirectoryStore::open(&config.data.employees) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to load employee directory: {}", e);
            std::process::exit(1);
        }
    };
    let org = match OrgDataStore::load(&config.data.profile, tz) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to load org profile: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = Arc::new(OrgContext {
        directory,
        org: Arc::clone(&org),
        timezone: tz,
        digest_days: config.digest.window_days,
        top_k: config.search.top_k,
    });

    let mut commands = CommandService::new(&config.bot.prefix);
    register_org_commands(&mut commands, ctx);
    let dispatcher = Arc::new(Dispatcher::new(config.bot.prefix.clone(), commands));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to build runtime: {}", e);
            std::process::exit(1);
        }
    };

    let token = token_override.or_else(|| config.transport.token.clone());
    match token {
        Some(token) => rt.block_on(async {
            let mut bot = TelegramAdapter::new(token);
            if let Err(e) = bot.fetch_bot_info().await {
                tracing::warn!("Failed to fetch bot info: {}", e);
            }
            if let Err(e) = bot.register_commands(COMMAND_MENU).await {
                tracing::warn!("Failed to register commands: {}", e);
            }
            let bot = Arc::new(bot);

            tokio::spawn(scheduler::run(
                Arc::clone(&bot) as Arc<dyn Outbound>,
                Arc::clone(&org),
                tz,
                config.digest.window_days,
            ));

            match config.transport.mode {
                TransportMode::Polling => run_polling(bot, dispatcher, &config).await,
                TransportMode::Webhook => run_webhook(bot, dispatcher, &config).await,
            }
        }),
        None => {
            tracing::warn!("No bot token configured, falling back to console mode");
            rt.block_on(console::run_console(dispatcher));
        }
    }
}

/// Pull mode: one sequential loop, FIFO per chat. Transient upstream
/// failures back off and retry forever; they never stop the process.
async fn run_polling(bot: Arc<TelegramAdapter>, dispatcher: Arc<Dispatcher>, config: &Config) {
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to clear webhook before polling: {}", e);
    }

    let timeout = config.transport.poll_timeout_seconds;
    let mut offset: i64 = 0;
    let mut backoff_secs: u64 = 1;

    tracing::info!("Starting update loop...");
    loop {
        match bot.get_updates(offset, timeout).await {
            Ok(updates) => {
                backoff_secs = 1;
                if !updates.is_empty() {
                    tracing::debug!(count = updates.len(), "received updates");
                }
                for update in &updates {
                    let Some((chat_id, text, sender)) = update.text_parts() else {
                        continue;
                    };
                    let Some(reply) =
                        dispatcher.handle(update.update_id, &chat_id, text, sender)
                    else {
                        continue;
                    };
                    if let Err(e) = bot.send_message(&chat_id, &reply).await {
                        tracing::error!(chat_id, error = %e, "failed to deliver reply");
                    }
                }
                // Acknowledge the whole batch only after processing it.
                offset = TelegramAdapter::next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            }
        }
    }
}

/// Push mode: register the webhook when a public URL is configured, then
/// serve the callback endpoint until shutdown.
async fn run_webhook(bot: Arc<TelegramAdapter>, dispatcher: Arc<Dispatcher>, config: &Config) {
    let webhook_cfg = &config.transport.webhook;
    match webhook_cfg.public_url.as_deref() {
        Some(base) => {
            let url = format!("{}{}", base.trim_end_matches('/'), webhook_cfg.path);
            if let Err(e) = bot.set_webhook(&url).await {
                tracing::error!("Failed to register webhook: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            tracing::warn!("No public-url configured; assuming webhook is registered externally");
        }
    }

    let addr: SocketAddr = match format!("{}:{}", webhook_cfg.listen, webhook_cfg.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid webhook listen address: {}", e);
            std::process::exit(1);
        }
    };

    let outbound: Arc<dyn Outbound> = bot;
    let state = webhook::WebhookState {
        dispatcher,
        outbound,
    };
    let router = webhook::build_router(&webhook_cfg.path, state);

    if let Err(e) = webhook::serve(addr, router).await {
        tracing::error!("Webhook server failed: {}", e);
        std::process::exit(1);
    }
}
