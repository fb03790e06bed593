use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::MigratorTrait;
use tracing::info;

use fuelhub_api::migrator::Migrator;

#[derive(Parser)]
#[command(name = "fuelhub-migrate", about = "Apply or inspect FuelHub schema migrations", version)]
struct Cli {
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://fuelhub.db?mode=rwc",
        help = "Database connection URL"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<MigrateCommand>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum MigrateCommand {
    /// Apply every pending migration (default)
    Up,
    /// Roll back the most recent migrations
    Down {
        #[arg(long, default_value_t = 1, help = "How many migrations to roll back")]
        steps: u32,
    },
    /// Print applied and pending migrations
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Connecting to database: {}", cli.database_url);

    let mut options = ConnectOptions::new(cli.database_url.clone());
    options
        .max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", cli.database_url))?;

    match cli.command.unwrap_or(MigrateCommand::Up) {
        MigrateCommand::Up => {
            Migrator::up(&db, None).await.context("migration up failed")?;
            info!("Migrations applied");
        }
        MigrateCommand::Down { steps } => {
            Migrator::down(&db, Some(steps))
                .await
                .context("migration down failed")?;
            info!(steps, "Migrations rolled back");
        }
        MigrateCommand::Status => {
            Migrator::status(&db).await.context("migration status failed")?;
        }
        MigrateCommand::Fresh => {
            Migrator::fresh(&db).await.context("migration fresh failed")?;
            info!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}
