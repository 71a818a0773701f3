use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CALLBACK_ADDR: &str = "127.0.0.1:5173";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token_file: PathBuf,
    pub callback_addr: SocketAddr,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = var("SHOWTRACK_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let token_file = match var("SHOWTRACK_TOKEN_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_token_file(var("HOME")),
        };

        let callback_addr = var("SHOWTRACK_CALLBACK_ADDR")
            .unwrap_or_else(|| DEFAULT_CALLBACK_ADDR.to_string());
        let callback_addr: SocketAddr = callback_addr
            .parse()
            .with_context(|| format!("SHOWTRACK_CALLBACK_ADDR '{callback_addr}' is not host:port"))?;

        let timeout_secs = match var("SHOWTRACK_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("SHOWTRACK_TIMEOUT_SECS '{raw}' is not a number"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            token_file,
            callback_addr,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn default_token_file(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("showtrack")
            .join("token.json"),
        None => PathBuf::from(".showtrack").join("token.json"),
    }
}
