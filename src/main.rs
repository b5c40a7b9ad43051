mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod rating;
mod routes;
mod seeder;
mod store;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{config::Config, store::MovieStore};

pub struct AppState {
    pub store: MovieStore,
}

#[derive(Debug, Parser)]
#[command(version, about = "Movie catalog and ratings API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default).
    Serve,
    /// Apply migrations, then wipe the catalog and load the sample data set.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movies_api=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url, config.db_max_connections)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Seed => {
            let fixture = seeder::seed(&db).await.context("seeding database")?;
            tracing::info!(
                users = fixture.users.len(),
                movies = fixture.movies.len(),
                ratings = fixture.ratings.len(),
                "seeded catalog"
            );
            Ok(())
        },
        Command::Serve => serve(&config, MovieStore::new(db)).await,
    }
}

async fn serve(config: &Config, store: MovieStore) -> anyhow::Result<()> {
    let app = routes::router(Arc::new(AppState { store }));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
