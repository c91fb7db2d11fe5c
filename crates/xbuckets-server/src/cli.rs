use std::net::SocketAddr;

use clap::Parser;

use crate::config::{AppConfig, DEFAULT_CONFIG_FILE, loader};

#[derive(Parser, Debug)]
#[command(name = "function-xbuckets")]
#[command(about = "Composition function that composes one S3 bucket per name on an XBuckets composite")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "XBUCKETS_CONFIG")]
    pub config: Option<String>,

    /// Address to listen on, overriding server.host and server.port
    #[arg(short, long)]
    pub address: Option<SocketAddr>,

    /// Emit debug logs
    #[arg(short, long)]
    pub debug: bool,
}

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// From --config or XBUCKETS_CONFIG
    Explicit,
    /// Default path (function-xbuckets.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "--config / XBUCKETS_CONFIG"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl Cli {
    pub fn config_path(&self) -> (Option<&str>, ConfigSource) {
        match self.config.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => (Some(path), ConfigSource::Explicit),
            None => (None, ConfigSource::Default),
        }
    }

    /// Human-readable config location for logs.
    pub fn config_display(&self) -> &str {
        self.config_path().0.unwrap_or(DEFAULT_CONFIG_FILE)
    }

    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(addr) = self.address {
            cfg.set_addr(addr);
        }
        if self.debug {
            cfg.logging.level = "debug".into();
        }
    }

    /// Load the configuration file and environment, apply flag overrides, then
    /// validate the result. Flags win, so `--address` can repair a bad host or
    /// port from the file.
    pub fn load_config(&self) -> Result<AppConfig, String> {
        let mut cfg = loader::load_config(self.config_path().0)?;
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }
}
