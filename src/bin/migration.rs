use clap::{Parser, Subcommand};
use concesionario::{config, db, migrator::Migrator};
use sea_orm::DbErr;
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Apply or roll back the concesionario schema", version)]
struct Cli {
    /// Database URL; defaults to the configured `database_url`
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back the most recent migration
    Down,
    /// Drop everything and re-apply all migrations
    Fresh,
    /// Print applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let mut db_cfg = db::DbConfig::from(&cfg);
    if let Some(url) = cli.database_url {
        db_cfg.url = url;
    }
    info!("Connecting to database for migrations");
    let pool = db::establish_connection_with_config(&db_cfg).await?;

    let result: Result<(), DbErr> = match cli.command.unwrap_or(Command::Up) {
        Command::Up => db::run_migrations(&pool).await,
        Command::Down => Migrator::down(&pool, Some(1)).await,
        Command::Fresh => Migrator::fresh(&pool).await,
        Command::Status => Migrator::status(&pool).await,
    };
    result?;

    info!("Migration command completed successfully");
    db::close_pool(pool).await?;
    Ok(())
}
