use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corsproxy::{app, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corsproxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match args.config_path {
        Some(path) => read_config(&path)?,
        None => Config::default(),
    };

    let listener = config.listener.parse()?;
    let router = app(config);

    tracing::info!("proxy listening on {}", listener);
    axum::Server::bind(&listener)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn read_config(config_path: &str) -> Result<Config> {
    let content = std::fs::read_to_string(config_path)?;
    Ok(toml::from_str(&content)?)
}
