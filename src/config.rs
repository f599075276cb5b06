//! Defines the configuration settings for lead-refinery.

use anyhow::Context;
use clap::Args;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Region used for phone parsing when none (or an unknown one) is configured.
pub const FALLBACK_PHONE_REGION: &str = "ID";

/// Settings shared by every subcommand. Each flag can also come from the
/// environment or the TOML configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML format)
    #[arg(long, global = true, env = "LEAD_REFINERY_CONFIG")]
    pub config_file: Option<String>,

    /// Default region code used when parsing phone numbers (e.g. "ID", "US")
    #[arg(long, global = true, env = "LEAD_REFINERY_DEFAULT_REGION")]
    pub default_region: Option<String>,

    /// DNS resolution timeout in seconds
    #[arg(long, global = true, env = "LEAD_REFINERY_DNS_TIMEOUT")]
    pub dns_timeout: Option<u64>,

    /// Comma-separated list of DNS servers
    #[arg(long, global = true, env = "LEAD_REFINERY_DNS_SERVERS")]
    pub dns_servers: Option<String>,

    /// HTTP request timeout in seconds (covers HEAD and the GET fallback)
    #[arg(long, global = true, env = "LEAD_REFINERY_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// User agent string for liveness probes
    #[arg(long, global = true, env = "LEAD_REFINERY_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Comma-separated list of query-key prefixes stripped from URLs
    #[arg(long, global = true, env = "LEAD_REFINERY_TRACKING_PREFIXES")]
    pub tracking_prefixes: Option<String>,

    /// Comma-separated list of free-hosting root domains
    #[arg(long, global = true, env = "LEAD_REFINERY_FREE_HOSTING_DOMAINS")]
    pub free_hosting_domains: Option<String>,

    /// Maximum number of concurrent cleaning jobs
    #[arg(long, global = true, env = "LEAD_REFINERY_CONCURRENCY")]
    pub concurrency: Option<usize>,
}

/// TOML Configuration file structure
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ConfigFile {
    phone: Option<PhoneConfig>,
    dns: Option<DnsConfig>,
    network: Option<NetworkConfig>,
    sanitizing: Option<SanitizingConfig>,
    scoring: Option<ScoringConfig>,
    processing: Option<ProcessingConfig>,
}

#[derive(Deserialize, Debug, Default)]
struct PhoneConfig {
    default_region: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct DnsConfig {
    dns_timeout: Option<u64>,
    dns_servers: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct NetworkConfig {
    request_timeout: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct SanitizingConfig {
    tracking_prefixes: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct ScoringConfig {
    free_hosting_domains: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct ProcessingConfig {
    max_concurrency: Option<usize>,
}

/// Application configuration settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Region code seeding phone-number parsing.
    pub default_region: String,
    /// Upper bound for a single MX lookup.
    pub dns_timeout: Duration,
    /// DNS servers to use for resolution.
    pub dns_servers: Vec<String>,
    /// Timeout for each liveness probe request.
    pub request_timeout: Duration,
    /// User agent string to use for HTTP requests.
    pub user_agent: String,
    /// Lower-case query-key prefixes treated as tracking parameters.
    pub tracking_prefixes: Vec<String>,
    /// Root domains of free site builders and blog hosts.
    pub free_hosting_domains: Vec<String>,
    /// Maximum number of concurrent cleaning jobs in the CLI.
    pub max_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        let free_hosting_domains = [
            "wordpress.com",
            "blogspot.com",
            "wixsite.com",
            "weebly.com",
            "squarespace.com",
            "medium.com",
            "substack.com",
            "godaddysites.com",
            "notion.site",
            "googlepages.com",
        ];

        Config {
            default_region: FALLBACK_PHONE_REGION.to_string(),
            dns_timeout: Duration::from_secs(3),
            dns_servers: default_dns_servers(),
            request_timeout: Duration::from_secs(5),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string(),
            tracking_prefixes: vec!["utm_".to_string()],
            free_hosting_domains: free_hosting_domains.iter().map(|s| s.to_string()).collect(),
            max_concurrency: 8,
        }
    }
}

fn default_dns_servers() -> Vec<String> {
    vec![
        "8.8.8.8".to_string(),
        "8.8.4.4".to_string(),
        "1.1.1.1".to_string(),
        "1.0.0.1".to_string(),
    ]
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse the contents of a TOML configuration file.
pub(crate) fn parse_config_file(content: &str) -> crate::error::Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file
fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() {
        tracing::warn!("Configuration file {} not found, using defaults", file_path);
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config = parse_config_file(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::info!("Loaded configuration from {}", file_path);
    Ok(config)
}

pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    if let Some(region) = file_config
        .phone
        .as_ref()
        .and_then(|p| p.default_region.as_ref())
    {
        config.default_region = region.clone();
    }

    if let Some(dns) = &file_config.dns {
        if let Some(timeout) = dns.dns_timeout {
            config.dns_timeout = Duration::from_secs(timeout);
        }
        if let Some(servers) = &dns.dns_servers {
            config.dns_servers = servers.clone();
        }
    }

    if let Some(network) = &file_config.network {
        if let Some(timeout) = network.request_timeout {
            config.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(user_agent) = &network.user_agent {
            config.user_agent = user_agent.clone();
        }
    }

    if let Some(prefixes) = file_config
        .sanitizing
        .as_ref()
        .and_then(|s| s.tracking_prefixes.as_ref())
    {
        config.tracking_prefixes = prefixes.clone();
    }

    if let Some(domains) = file_config
        .scoring
        .as_ref()
        .and_then(|s| s.free_hosting_domains.as_ref())
    {
        config.free_hosting_domains = domains.clone();
    }

    if let Some(concurrency) = file_config
        .processing
        .as_ref()
        .and_then(|p| p.max_concurrency)
    {
        config.max_concurrency = concurrency;
    }
}

/// Apply command line arguments to the Config instance
pub(crate) fn apply_cli_args(config: &mut Config, args: &ConfigArgs) {
    if let Some(ref region) = args.default_region {
        config.default_region = region.clone();
    }

    if let Some(timeout) = args.dns_timeout {
        config.dns_timeout = Duration::from_secs(timeout);
    }

    if let Some(ref servers) = args.dns_servers {
        config.dns_servers = split_list(servers);
    }

    if let Some(timeout) = args.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }

    if let Some(ref agent) = args.user_agent {
        config.user_agent = agent.clone();
    }

    if let Some(ref prefixes) = args.tracking_prefixes {
        config.tracking_prefixes = split_list(prefixes);
    }

    if let Some(ref domains) = args.free_hosting_domains {
        config.free_hosting_domains = split_list(domains);
    }

    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }
}

pub(crate) fn validate_config(config: &mut Config) {
    let region = config.default_region.trim().to_uppercase();
    if region.is_empty() {
        tracing::warn!(
            "Default phone region was empty. Setting to {}.",
            FALLBACK_PHONE_REGION
        );
        config.default_region = FALLBACK_PHONE_REGION.to_string();
    } else {
        config.default_region = region;
    }

    if config.dns_servers.is_empty() {
        config.dns_servers = default_dns_servers();
        tracing::warn!("DNS servers list was empty. Setting to default public DNS servers.");
    }

    if config.dns_timeout.is_zero() {
        config.dns_timeout = Duration::from_secs(3);
        tracing::warn!("DNS timeout was zero. Setting to 3s.");
    }

    if config.request_timeout.is_zero() {
        config.request_timeout = Duration::from_secs(5);
        tracing::warn!("Request timeout was zero. Setting to 5s.");
    }

    config.tracking_prefixes = config
        .tracking_prefixes
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    config.free_hosting_domains = config
        .free_hosting_domains
        .iter()
        .map(|d| d.trim().trim_matches('.').to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();

    if config.max_concurrency == 0 {
        config.max_concurrency = 1;
        tracing::warn!("Concurrency was set to 0. Setting to 1.");
    }
}

/// Builds the final configuration: defaults, then the TOML file, then
/// command line / environment overrides, then validation.
pub fn build_config(args: &ConfigArgs) -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Some(ref file_path) = args.config_file {
        let file_config = load_config_file(file_path)?;
        apply_file_config(&mut config, &file_config);
    } else {
        for path in ["./lead-refinery.toml", "./config.toml"] {
            if Path::new(path).exists() {
                match load_config_file(path) {
                    Ok(file_config) => {
                        apply_file_config(&mut config, &file_config);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load configuration from {}: {}", path, e);
                    }
                }
            }
        }
    }

    apply_cli_args(&mut config, args);

    validate_config(&mut config);

    tracing::debug!("Final configuration: {:?}", config);

    Ok(config)
}
