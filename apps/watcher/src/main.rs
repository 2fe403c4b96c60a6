//! Watcher: checks liquidity pool positions on an interval and reports them via Telegram.
//!
//! Subjects are read from Postgres when `DATABASE_URL` is set, otherwise a
//! single subject is built from `WATCH_TELEGRAM_USER_ID` and `WATCH_WALLETS`.
//! Every flag can be given through the environment or a `.env` file.

mod logger;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clients_postgres::SubjectRepository;
use clients_subgraph::{AerodromeSource, SubgraphClient, SubgraphConfig, UniswapV3Source};
use clients_telegrambot::{error_forwarding, TelegramBot, TelegramNotifier};
use domain::{PositionSource, Subject, SubjectStore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use watcher::{AggregatingSource, Dispatcher, WatchService, WatchServiceConfig};

const FORWARDER_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "watcher")]
#[command(about = "Notifies subjects about the range status of their LP positions", long_about = None)]
struct Args {
    /// Telegram bot token used for notifications and error reports
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_bot_token: String,

    /// Telegram chat receiving error level log records
    #[arg(long, env = "ERROR_RECEIVER_TELEGRAM_USER_ID")]
    error_receiver_telegram_user_id: Option<i64>,

    /// The Graph gateway API key
    #[arg(long, env = "THE_GRAPH_TOKEN", hide_env_values = true)]
    the_graph_token: String,

    /// Uniswap V3 (Base) subgraph id
    #[arg(long, env = "UNISWAP_SUBGRAPH_ID")]
    uniswap_subgraph_id: Option<String>,

    /// Aerodrome (Base) subgraph id
    #[arg(long, env = "AERODROME_SUBGRAPH_ID")]
    aerodrome_subgraph_id: Option<String>,

    /// Postgres DSN holding registered subjects
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Telegram chat of the single watched subject
    #[arg(long, env = "WATCH_TELEGRAM_USER_ID")]
    watch_telegram_user_id: Option<i64>,

    /// Wallets of the single watched subject, comma separated
    #[arg(long, env = "WATCH_WALLETS", value_delimiter = ',')]
    watch_wallets: Vec<String>,

    /// Seconds between checks of the single watched subject
    #[arg(long, env = "CHECK_INTERVAL_SECS", default_value_t = 300)]
    check_interval_secs: u64,

    /// Send one message per position instead of one report per subject
    #[arg(long, env = "PER_POSITION")]
    per_position: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let bot = TelegramBot::new(http.clone(), args.telegram_bot_token.clone());

    let forwarding = match args.error_receiver_telegram_user_id {
        Some(chat_id) => {
            let (layer, forwarder) = error_forwarding(bot.clone(), chat_id);
            logger::init(Some(layer));
            let stop = CancellationToken::new();
            let handle = tokio::spawn(forwarder.run(stop.clone().cancelled_owned()));
            Some((stop, handle))
        }
        None => {
            logger::init(None);
            None
        }
    };

    let result = run(args, http, bot).await;
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "watcher failed to start");
    }

    // Deliver queued error records before the runtime goes away.
    if let Some((stop, handle)) = forwarding {
        stop.cancel();
        if tokio::time::timeout(FORWARDER_FLUSH_TIMEOUT, handle).await.is_err() {
            warn!("error records were not flushed to telegram in time");
        }
    }
    result
}

async fn run(args: Args, http: reqwest::Client, bot: TelegramBot) -> Result<()> {
    let source = build_source(&args, &http)?;
    let subjects = load_subjects(&args).await?;

    let notifier = Arc::new(TelegramNotifier::new(bot));
    let dispatcher = if args.per_position {
        Dispatcher::PerPosition(notifier)
    } else {
        Dispatcher::Batched(notifier)
    };
    let service = WatchService::new(WatchServiceConfig { source, dispatcher });

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    info!(subjects = subjects.len(), "starting watcher");
    service.watch_all(subjects, shutdown).await;
    info!("watcher finished");
    Ok(())
}

fn build_source(args: &Args, http: &reqwest::Client) -> Result<Arc<dyn PositionSource>> {
    let mut sources: Vec<Arc<dyn PositionSource>> = Vec::new();
    if let Some(id) = &args.uniswap_subgraph_id {
        let config = SubgraphConfig::new(args.the_graph_token.clone(), id.clone())?;
        sources.push(Arc::new(UniswapV3Source::new(SubgraphClient::new(
            http.clone(),
            config,
        )?)));
    }
    if let Some(id) = &args.aerodrome_subgraph_id {
        let config = SubgraphConfig::new(args.the_graph_token.clone(), id.clone())?;
        sources.push(Arc::new(AerodromeSource::new(SubgraphClient::new(
            http.clone(),
            config,
        )?)));
    }

    match sources.len() {
        0 => bail!("no position source configured, set UNISWAP_SUBGRAPH_ID or AERODROME_SUBGRAPH_ID"),
        1 => Ok(sources.remove(0)),
        _ => Ok(Arc::new(AggregatingSource::new(sources))),
    }
}

async fn load_subjects(args: &Args) -> Result<Vec<Subject>> {
    let subjects = match &args.database_url {
        Some(url) => {
            let pool = clients_postgres::connect(url).await?;
            SubjectRepository::new(pool).get_all().await?
        }
        None => {
            let telegram_user_id = args
                .watch_telegram_user_id
                .context("WATCH_TELEGRAM_USER_ID is required without DATABASE_URL")?;
            let wallets = args
                .watch_wallets
                .iter()
                .map(|wallet| wallet.trim().to_string())
                .filter(|wallet| !wallet.is_empty())
                .collect();
            vec![Subject::new(
                telegram_user_id,
                wallets,
                Duration::from_secs(args.check_interval_secs),
            )?]
        }
    };

    if subjects.is_empty() {
        bail!("no subjects to watch");
    }
    Ok(subjects)
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("shutdown requested");
            shutdown.cancel();
        }
        Err(err) => error!(error = %err, "cannot listen for ctrl-c"),
    }
}
