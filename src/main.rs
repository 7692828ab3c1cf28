mod config;
mod core;
mod editor;
mod engine;
mod jobs;
mod redis_manager;
mod server;
mod session;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::config::{PlaygroundConfig, RunMode};
use crate::engine::{LocalSandbox, PistonClient, RunDispatcher};
use crate::jobs::run::process_run_job;
use crate::jobs::WorkerJob;
use crate::redis_manager::RedisManager;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("playground=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    config::init_config()?;
    let config = config::get_config();

    let registry = crate::core::languages::init_languages(config.languages_path.as_deref())?;
    match &config.languages_path {
        Some(path) => info!("Loaded language configurations from {}", path.display()),
        None => info!("Loaded embedded language configurations"),
    }
    info!("Supported languages: {:?}", registry.supported_languages());

    let dispatcher = RunDispatcher::new(
        registry,
        LocalSandbox::new(config.sandbox_limits),
        Arc::new(PistonClient::new(config.piston_url.as_str())),
    );
    info!("Remote execution endpoint: {}", config.piston_url);

    match config.mode {
        RunMode::Server => {
            let state = server::AppState::new(dispatcher, config.session_limits);
            server::serve(config.bind_addr, state).await
        }
        RunMode::Worker => run_worker(config, dispatcher).await,
    }
}

/// Consume run jobs from Redis until the process is stopped
async fn run_worker(config: &PlaygroundConfig, dispatcher: RunDispatcher) -> Result<()> {
    info!("Starting Playground Worker...");

    let mut redis = RedisManager::with_url(&config.redis_url).await?;

    info!("Waiting for jobs...");

    loop {
        match redis.pop_job().await? {
            WorkerJob::Run(job) => {
                info!(
                    "Received run job: session_id={:?}, language={}",
                    job.session_id, job.language
                );

                let result = process_run_job(&job, &dispatcher).await;
                if let Err(e) = redis.store_run_result(&job.result_key, &result).await {
                    error!("Failed to store run result for {}: {}", job.result_key, e);
                }
            }
        }
    }
}
