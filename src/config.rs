//! Playground configuration
//!
//! Loaded once from the environment (after `.env`), then read globally.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;

use crate::engine::remote::DEFAULT_PISTON_URL;
use crate::engine::SandboxLimits;
use crate::server::SessionLimits;

/// Which surface the process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP API with editor sessions
    Server,
    /// Redis queue consumer for stateless runs
    Worker,
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(RunMode::Server),
            "worker" => Ok(RunMode::Worker),
            other => anyhow::bail!("Unknown PLAYGROUND_MODE: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    pub mode: RunMode,
    /// HTTP listen address (server mode)
    pub bind_addr: SocketAddr,
    /// Remote execute endpoint
    pub piston_url: String,
    /// Redis connection URL (worker mode)
    pub redis_url: String,
    /// Languages TOML overriding the embedded table
    pub languages_path: Option<PathBuf>,
    pub sandbox_limits: SandboxLimits,
    /// Idle expiry and cap for server-mode sessions
    pub session_limits: SessionLimits,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Server,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            piston_url: DEFAULT_PISTON_URL.to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            languages_path: None,
            sandbox_limits: SandboxLimits::default(),
            session_limits: SessionLimits::default(),
        }
    }
}

impl PlaygroundConfig {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(mode) = lookup("PLAYGROUND_MODE") {
            config.mode = mode.parse()?;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid BIND_ADDR: {}", addr))?;
        }
        if let Some(url) = lookup("PISTON_URL") {
            config.piston_url = url;
        }
        if let Some(url) = lookup("REDIS_URL") {
            config.redis_url = url;
        }
        config.languages_path = lookup("LANGUAGES_CONFIG").map(PathBuf::from);

        if let Some(limit) = lookup("JS_LOOP_ITERATION_LIMIT") {
            config.sandbox_limits.loop_iteration_limit = Some(
                limit
                    .parse()
                    .with_context(|| format!("Invalid JS_LOOP_ITERATION_LIMIT: {}", limit))?,
            );
        }
        if let Some(limit) = lookup("JS_RECURSION_LIMIT") {
            config.sandbox_limits.recursion_limit = Some(
                limit
                    .parse()
                    .with_context(|| format!("Invalid JS_RECURSION_LIMIT: {}", limit))?,
            );
        }

        if let Some(secs) = lookup("SESSION_IDLE_TTL_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("Invalid SESSION_IDLE_TTL_SECS: {}", secs))?;
            config.session_limits.idle_ttl = Duration::from_secs(secs);
        }
        if let Some(max) = lookup("MAX_SESSIONS") {
            config.session_limits.max_sessions = max
                .parse()
                .with_context(|| format!("Invalid MAX_SESSIONS: {}", max))?;
        }

        Ok(config)
    }
}

/// Global playground configuration
static PLAYGROUND_CONFIG: OnceLock<PlaygroundConfig> = OnceLock::new();

/// Initialize configuration from the environment
pub fn init_config() -> anyhow::Result<()> {
    let config = PlaygroundConfig::from_env()?;

    PLAYGROUND_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Playground configuration already initialized"))?;

    Ok(())
}

/// Get playground configuration
pub fn get_config() -> &'static PlaygroundConfig {
    PLAYGROUND_CONFIG.get().unwrap_or_else(|| {
        static DEFAULT: OnceLock<PlaygroundConfig> = OnceLock::new();

        warn!("Playground configuration not initialized, using default");
        DEFAULT.get_or_init(PlaygroundConfig::default)
    })
}
