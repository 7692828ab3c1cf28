//! Redis Manager - Queue connection for worker mode
//!
//! This module handles all Redis-related operations:
//! - Job queue operations (BLPOP)
//! - Result delivery (RPUSH to the job's result key)

use std::time::Duration;

use anyhow::{Context, Result};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::jobs::run::RunJobResult;
use crate::jobs::WorkerJob;

/// Redis key constants
pub mod keys {
    /// Run job queue key
    pub const PLAYGROUND_QUEUE: &str = "playground:queue";
}

/// Results nobody picked up expire after 5 minutes
const RESULT_EXPIRY_SECS: i64 = 300;

pub struct RedisManager {
    client: redis::Client,
    conn: MultiplexedConnection,
}

impl RedisManager {
    /// Connect to Redis at `redis_url`, retrying until it is reachable
    pub async fn with_url(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = get_connection_with_retry(&client).await?;
        info!("Connected to Redis at {}", redis_url);

        Ok(Self { client, conn })
    }

    /// Block and wait for the next job from the queue.
    ///
    /// Reconnects on connection failure; unparseable jobs are skipped.
    pub async fn pop_job(&mut self) -> Result<WorkerJob> {
        loop {
            let result: Option<(String, String)> =
                match self.conn.blpop(keys::PLAYGROUND_QUEUE, 0.0).await {
                    Ok(res) => res,
                    Err(e) => {
                        warn!("Redis BLPOP failed: {}. Reconnecting...", e);
                        self.reconnect().await?;
                        continue;
                    }
                };

            if let Some((_, job_data)) = result {
                match serde_json::from_str::<WorkerJob>(&job_data) {
                    Ok(job) => return Ok(job),
                    Err(e) => {
                        warn!("Failed to parse job data: {}. Data: {}", e, job_data);
                        continue;
                    }
                }
            }
        }
    }

    /// Push a run result to `key` for the caller's BLPOP
    pub async fn store_run_result(&mut self, key: &str, result: &RunJobResult) -> Result<()> {
        let json = serde_json::to_string(result)?;

        if let Err(e) = self.conn.rpush::<_, _, ()>(key, &json).await {
            warn!("Failed to push run result: {}. Reconnecting...", e);
            self.reconnect().await?;
            self.conn.rpush::<_, _, ()>(key, &json).await?;
        }

        // Ignore errors: the result is already delivered
        let _ = self.conn.expire::<_, ()>(key, RESULT_EXPIRY_SECS).await;

        Ok(())
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.conn = get_connection_with_retry(&self.client).await?;
        Ok(())
    }
}

/// Get a Redis connection with retry logic
async fn get_connection_with_retry(client: &redis::Client) -> Result<MultiplexedConnection> {
    loop {
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                warn!(
                    "Failed to connect to Redis: {}. Retrying in 3 seconds...",
                    e
                );
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}
