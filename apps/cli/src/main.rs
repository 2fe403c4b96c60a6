//! Operator CLI for the subject store.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clients_postgres::SubjectRepository;
use domain::{Subject, SubjectStore};
use tracing::info;

#[derive(Parser)]
#[command(name = "watcher-cli")]
#[command(about = "Manage subjects watched by the position watcher", long_about = None)]
struct Cli {
    /// Postgres DSN
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Watched subjects
    Subjects {
        #[command(subcommand)]
        command: SubjectCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
}

#[derive(Subcommand)]
enum SubjectCommands {
    /// Add a subject, replacing any existing one with the same Telegram user id
    Add {
        #[arg(long)]
        telegram_user_id: i64,
        /// Wallet address, may be repeated
        #[arg(long = "wallet", required = true)]
        wallets: Vec<String>,
        #[arg(long, default_value_t = 300)]
        check_interval_secs: u64,
    },
    /// Print every stored subject
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let Some(database_url) = cli.database_url else {
        anyhow::bail!("--database-url or DATABASE_URL is required");
    };
    let pool = clients_postgres::connect(&database_url).await?;

    match cli.command {
        Commands::Db {
            command: DbCommands::Migrate,
        } => clients_postgres::migrate(&pool).await?,
        Commands::Subjects { command } => {
            let repository = SubjectRepository::new(pool);
            match command {
                SubjectCommands::Add {
                    telegram_user_id,
                    wallets,
                    check_interval_secs,
                } => {
                    let subject = Subject::new(
                        telegram_user_id,
                        wallets,
                        Duration::from_secs(check_interval_secs),
                    )?;
                    repository.add(&subject).await?;
                    info!(telegram_user_id, "subject saved");
                }
                SubjectCommands::List => {
                    for subject in repository.get_all().await? {
                        println!(
                            "{}\t{}s\t{}",
                            subject.telegram_user_id,
                            subject.check_interval.as_secs(),
                            subject.wallets.join(",")
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
