use anyhow::{Context, Result, ensure};
use clap::Parser;
use std::{env, path::PathBuf, str::FromStr};

use crate::services::paste_service::Limits;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub limits: Limits,
}

/// One-shot maintenance actions selected on the command line.
#[derive(Debug, Clone, Default)]
pub struct Actions {
    pub migrate: bool,
    pub purge_expired: bool,
    /// Write a gzipped tar of every live paste here, then exit.
    pub export: Option<PathBuf>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Anonymous text snippet sharing service")]
pub struct Args {
    /// Host to bind to (overrides SNIPPET_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SNIPPET_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides SNIPPET_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Paste size limit in bytes, exclusive (overrides SNIPPET_STORE_MAX_PASTE_SIZE)
    #[arg(long)]
    pub max_paste_size: Option<usize>,

    /// Rows per page of the recent feed (overrides SNIPPET_STORE_PAGE_SIZE)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Rows returned by an owner's history (overrides SNIPPET_STORE_HISTORY_LIMIT)
    #[arg(long)]
    pub history_limit: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Delete expired pastes and exit
    #[arg(long)]
    pub purge_expired: bool,

    /// Export every unexpired paste, listed or not, as a .tar.gz and exit
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the requested actions.
    pub fn from_env_and_args() -> Result<(Self, Actions)> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<(Self, Actions)> {
        let defaults = Limits::default();

        // --- Environment fallback ---
        let env_host = env::var("SNIPPET_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_or("SNIPPET_STORE_PORT", 3000u16)?;
        let env_db = env::var("SNIPPET_STORE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/snippets.db".into());
        let env_max_size = env_or("SNIPPET_STORE_MAX_PASTE_SIZE", defaults.max_paste_size)?;
        let env_page_size = env_or("SNIPPET_STORE_PAGE_SIZE", defaults.page_size)?;
        let env_history = env_or("SNIPPET_STORE_HISTORY_LIMIT", defaults.history_limit)?;

        // --- Merge ---
        let limits = Limits {
            max_paste_size: args.max_paste_size.unwrap_or(env_max_size),
            page_size: args.page_size.unwrap_or(env_page_size),
            history_limit: args.history_limit.unwrap_or(env_history),
        };
        ensure!(limits.max_paste_size >= 1, "max paste size must be at least 1");
        ensure!(limits.page_size >= 1, "page size must be at least 1");
        ensure!(limits.history_limit >= 1, "history limit must be at least 1");

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            limits,
        };
        let actions = Actions {
            migrate: args.migrate,
            purge_expired: args.purge_expired,
            export: args.export,
        };

        Ok((cfg, actions))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_defaults() {
        let args = Args::parse_from([
            "snippet-store",
            "--port",
            "8080",
            "--page-size",
            "10",
            "--purge-expired",
        ]);
        let (cfg, actions) = AppConfig::from_args(args).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.limits.page_size, 10);
        assert!(actions.purge_expired);
        assert!(!actions.migrate);
        assert!(actions.export.is_none());
    }

    #[test]
    fn export_takes_a_path() {
        let args = Args::parse_from(["snippet-store", "--export", "backup/pastes.tar.gz"]);
        let (_, actions) = AppConfig::from_args(args).unwrap();
        assert_eq!(
            actions.export.as_deref(),
            Some(std::path::Path::new("backup/pastes.tar.gz"))
        );
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let args = Args::parse_from(["snippet-store", "--page-size", "0"]);
        assert!(AppConfig::from_args(args).is_err());
    }
}
