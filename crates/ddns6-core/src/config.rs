//! Configuration types for ddns6
//!
//! All configuration is built once at startup and handed to the components
//! that need it. Nothing here is mutated after construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Host label the provider uses for the zone apex
pub const APEX_LABEL: &str = "@";

/// Leftmost host label of a wildcard record
pub const WILDCARD_LABEL: &str = "*";

/// Default Alidns API endpoint
pub const DEFAULT_ALIDNS_ENDPOINT: &str = "https://alidns.cn-shanghai.aliyuncs.com";

/// Main ddns6 configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Network interface to read the IPv6 address from (e.g., "eth0")
    pub interface: String,

    /// Domain whose AAAA record is kept in sync
    pub domain: DomainName,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl SyncConfig {
    /// Create a new configuration with default provider and scheduler settings
    pub fn new(interface: impl Into<String>, domain: DomainName, provider: ProviderConfig) -> Self {
        Self {
            interface: interface.into(),
            domain,
            provider,
            scheduler: SchedulerConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interface.trim().is_empty() {
            return Err(crate::Error::config("Network interface name cannot be empty"));
        }

        self.provider.validate()?;
        self.scheduler.validate()?;

        Ok(())
    }
}

/// A fully qualified domain split into host label and registrable domain
///
/// `home.example.com` becomes host label `home` and registrable domain
/// `example.com`. Everything left of the last two labels is the host label,
/// so `a.b.example.com` manages `a.b`. A bare two-label domain manages the
/// zone apex, which the provider addresses as `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName {
    host_label: String,
    registrable_domain: String,
}

impl DomainName {
    /// Parse and validate a fully qualified domain name
    ///
    /// Validation follows RFC 1035 loosely: at most 253 characters, at least
    /// two labels, each label 1–63 alphanumeric or hyphen characters and not
    /// starting or ending with a hyphen. Host labels may also carry
    /// underscores, and the leftmost one may be the wildcard `*`. A single
    /// trailing dot is accepted and the name is lowercased.
    pub fn parse(fqdn: &str) -> Result<Self, crate::Error> {
        let trimmed = fqdn.trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed).to_ascii_lowercase();

        if name.is_empty() {
            return Err(crate::Error::config("Domain name cannot be empty"));
        }

        if name.len() > 253 {
            return Err(crate::Error::config(format!(
                "Domain name too long: {} chars (max 253). Got: {}",
                name.len(),
                name
            )));
        }

        let labels: Vec<&str> = name.split('.').collect();
        let split = labels.len().saturating_sub(2);
        for (i, label) in labels.iter().enumerate() {
            if i == 0 && split > 0 && *label == WILDCARD_LABEL {
                continue;
            }
            validate_label(&name, label, i < split)?;
        }

        if labels.len() < 2 {
            return Err(crate::Error::config(format!(
                "Domain name must have at least two labels (e.g. example.com). Got: {}",
                name
            )));
        }

        let host_label = if split == 0 {
            APEX_LABEL.to_string()
        } else {
            labels[..split].join(".")
        };

        Ok(Self {
            host_label,
            registrable_domain: labels[split..].join("."),
        })
    }

    /// The subdomain part managed by the daemon (`@` for the apex)
    pub fn host_label(&self) -> &str {
        &self.host_label
    }

    /// The last two labels of the domain
    pub fn registrable_domain(&self) -> &str {
        &self.registrable_domain
    }

    /// Whether this name is the zone apex
    pub fn is_apex(&self) -> bool {
        self.host_label == APEX_LABEL
    }

    /// The fully qualified name, without the trailing dot
    pub fn fqdn(&self) -> String {
        if self.is_apex() {
            self.registrable_domain.clone()
        } else {
            format!("{}.{}", self.host_label, self.registrable_domain)
        }
    }
}

fn validate_label(domain: &str, label: &str, host: bool) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config(format!(
            "Domain name has empty label: '{}'",
            domain
        )));
    }

    if label.len() > 63 {
        return Err(crate::Error::config(format!(
            "Domain label too long: {} chars (max 63). Label: '{}'",
            label.len(),
            label
        )));
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || (host && c == '_'))
    {
        return Err(crate::Error::config(format!(
            "Domain label contains invalid characters. Label: '{}'. \
            Valid: alphanumeric and hyphen, plus underscore left of the registrable domain.",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(crate::Error::config(format!(
            "Domain label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn())
    }
}

impl std::str::FromStr for DomainName {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.fqdn()
    }
}

/// Alidns provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Access key id
    pub access_key_id: String,

    /// Access key secret
    /// ⚠️ NEVER log this value
    #[serde(skip_serializing)]
    pub access_key_secret: String,

    /// API endpoint, scheme included
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request HTTP timeout (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Perform lookups only, log mutations instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl ProviderConfig {
    /// Create a provider configuration with the default endpoint and timeout
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            endpoint: default_endpoint(),
            http_timeout_secs: default_http_timeout_secs(),
            dry_run: false,
        }
    }

    /// Override the API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Per-request HTTP timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.access_key_id.is_empty() {
            return Err(crate::Error::config("Access key id cannot be empty"));
        }
        if self.access_key_secret.is_empty() {
            return Err(crate::Error::config("Access key secret cannot be empty"));
        }
        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Provider endpoint must use HTTP or HTTPS scheme. Got: {}",
                self.endpoint
            )));
        }
        if !(1..=300).contains(&self.http_timeout_secs) {
            return Err(crate::Error::config(format!(
                "HTTP timeout must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            )));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the access key secret
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn default_endpoint() -> String {
    DEFAULT_ALIDNS_ENDPOINT.to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period between reconciliation passes (in seconds)
    ///
    /// The default of one second is far below any sensible DNS TTL. Each
    /// pass costs at least one provider API call, so production deployments
    /// usually raise it.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upper bound for a single pass (in seconds), 0 disables
    #[serde(default = "default_pass_timeout_secs")]
    pub pass_timeout_secs: u64,

    /// How long in-flight passes may keep running after shutdown (in seconds)
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl SchedulerConfig {
    /// Period between passes
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-pass timeout, if enabled
    pub fn pass_timeout(&self) -> Option<Duration> {
        (self.pass_timeout_secs > 0).then(|| Duration::from_secs(self.pass_timeout_secs))
    }

    /// Shutdown drain window
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    /// Validate the scheduler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(1..=86_400).contains(&self.interval_secs) {
            return Err(crate::Error::config(format!(
                "Sync interval must be between 1 and 86400 seconds. Got: {}",
                self.interval_secs
            )));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            pass_timeout_secs: default_pass_timeout_secs(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    1
}

fn default_pass_timeout_secs() -> u64 {
    30
}

fn default_drain_timeout_secs() -> u64 {
    5
}
