use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;
use tutor_router::cli::{Args, Mode};
use tutor_router::config::Config;
use tutor_router::logging::setup_logging;
use tutor_router::server::{self, AppState};
use tutor_router::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine, the environment may already be set
    dotenv::dotenv().ok();

    let args = Args::parse();
    setup_logging(args.verbose);

    let config = Config::from_args(&args)?;

    match args.mode {
        Mode::Serve { bind } => {
            let engine = match Engine::from_config(&config) {
                Ok(engine) => Some(Arc::new(engine)),
                Err(e) => {
                    warn!("{}, model-backed endpoints will fail", e);
                    None
                }
            };
            server::serve(&bind, AppState::new(engine, config.redact_quiz_answers)).await
        }
        Mode::Ask { input } => {
            let engine = Engine::from_config(&config)?;
            let mut response = engine.route(&input).await?;
            if config.redact_quiz_answers {
                response = response.redact_answers();
            }
            print_json(&response)
        }
        Mode::Math { question } => {
            let engine = Engine::from_config(&config)?;
            print_json(&engine.solve_math(&question).await?)
        }
        Mode::Quiz { topic } => {
            let engine = Engine::from_config(&config)?;
            print_json(&engine.generate_quiz(&topic).await?)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}
