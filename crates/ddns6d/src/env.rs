//! Environment configuration
//!
//! Values come from the process environment first, then from a `.env` file
//! in the working directory. Blank values count as unset.

use anyhow::{Context, Result};
use ddns6_core::config::{DomainName, ProviderConfig, SchedulerConfig, SyncConfig};
use ddns6_core::logging::parse_level;
use std::collections::HashMap;
use std::path::Path;
use tracing::Level;

pub const NETWORK_CARD_NAME: &str = "NETWORK_CARD_NAME";
pub const ACCESS_KEY_ID: &str = "ACCESS_KEY_ID";
pub const ACCESS_KEY_SECRET: &str = "ACCESS_KEY_SECRET";
pub const FULL_DOMAIN: &str = "FULL_DOMAIN";
pub const SYNC_INTERVAL_SECS: &str = "DDNS_SYNC_INTERVAL_SECS";
pub const PASS_TIMEOUT_SECS: &str = "DDNS_PASS_TIMEOUT_SECS";
pub const PROVIDER_ENDPOINT: &str = "DDNS_PROVIDER_ENDPOINT";
pub const HTTP_TIMEOUT_SECS: &str = "DDNS_HTTP_TIMEOUT_SECS";
pub const MODE: &str = "DDNS_MODE";
pub const LOG_LEVEL: &str = "DDNS_LOG_LEVEL";
pub const SKIP_DOTENV: &str = "DDNS_SKIP_DOTENV";

/// Variables read from a `.env` file
///
/// The file is parsed into a map instead of being exported into the
/// process environment.
#[derive(Debug, Default)]
pub struct DotEnv {
    vars: HashMap<String, String>,
}

impl DotEnv {
    /// Load `path`; a missing file yields an empty set
    pub fn load(path: &Path) -> Result<Self> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.with_context(|| format!("Malformed {}", path.display()))?;
            vars.insert(key, value);
        }

        Ok(Self { vars })
    }

    /// Number of variables loaded
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Look `key` up in the process environment, then in this file
    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.vars.get(key).cloned())
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub sync: SyncConfig,
    pub log_level: Level,
}

impl DaemonConfig {
    /// Build and validate the configuration from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let interface = required(&get, NETWORK_CARD_NAME, "eth0")?;
        let access_key_id = required(&get, ACCESS_KEY_ID, "your_access_key_id")?;
        let access_key_secret = required(&get, ACCESS_KEY_SECRET, "your_access_key_secret")?;
        let full_domain = required(&get, FULL_DOMAIN, "home.example.com")?;

        let domain = DomainName::parse(&full_domain)
            .with_context(|| format!("{} is not a valid domain name", FULL_DOMAIN))?;

        let mut provider = ProviderConfig::new(access_key_id.trim(), access_key_secret.trim());
        if let Some(endpoint) = get(PROVIDER_ENDPOINT) {
            provider = provider.with_endpoint(endpoint.trim());
        }
        if let Some(secs) = number(&get, HTTP_TIMEOUT_SECS)? {
            provider.http_timeout_secs = secs;
        }
        provider = provider.with_dry_run(dry_run(&get)?);

        let mut scheduler = SchedulerConfig::default();
        if let Some(secs) = number(&get, SYNC_INTERVAL_SECS)? {
            scheduler.interval_secs = secs;
        }
        if let Some(secs) = number(&get, PASS_TIMEOUT_SECS)? {
            scheduler.pass_timeout_secs = secs;
        }

        let log_level = match get(LOG_LEVEL) {
            Some(name) => parse_level(&name).with_context(|| {
                format!(
                    "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    LOG_LEVEL, name
                )
            })?,
            None => Level::INFO,
        };

        let mut sync = SyncConfig::new(interface.trim(), domain, provider);
        sync.scheduler = scheduler;
        sync.validate()?;

        Ok(Self { sync, log_level })
    }
}

fn required<F>(get: &F, key: &str, example: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).with_context(|| format!("{key} is required. Set it via: export {key}={example}"))
}

fn number<F>(get: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds. Got: {}", key, raw))
        })
        .transpose()
}

fn dry_run<F>(get: &F) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match get(MODE).as_deref().map(str::trim) {
        None | Some("live") => Ok(false),
        Some("dry-run") => Ok(true),
        Some(other) => anyhow::bail!(
            "{} '{}' is not supported. Supported modes: live, dry-run",
            MODE,
            other
        ),
    }
}
