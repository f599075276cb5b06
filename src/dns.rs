//! Functions for performing DNS MX lookups.

use crate::config::Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{
    LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
};

/// Represents a mail exchanger found for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailServer {
    /// The domain name of the mail server.
    pub exchange: String,
    /// The preference value (lower is more preferred).
    pub preference: u16,
}

/// Looks up mail exchangers for a domain. Implementations must not cache
/// across calls; the email cleaner memoizes within a single pass.
#[async_trait]
pub trait MxResolver: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MailServer>>;
}

/// Default resolver backed by trust-dns.
#[derive(Clone)]
pub struct SystemMxResolver {
    resolver: TokioAsyncResolver,
}

impl SystemMxResolver {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            resolver: create_resolver(config)?,
        })
    }
}

#[async_trait]
impl MxResolver for SystemMxResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MailServer>> {
        resolve_mail_servers(&self.resolver, domain).await
    }
}

/// Creates a configured DNS resolver instance.
pub fn create_resolver(config: &Config) -> Result<TokioAsyncResolver> {
    let mut resolver_config = ResolverConfig::new();

    for server_str in &config.dns_servers {
        let ip_addr = IpAddr::from_str(server_str).map_err(|e| {
            tracing::error!(
                "Invalid DNS server IP address in config: '{}' - {}",
                server_str,
                e
            );
            AppError::Config(format!("Invalid DNS server IP address: {}", server_str))
        })?;

        let socket_addr = SocketAddr::new(ip_addr, 53);
        for protocol in [Protocol::Udp, Protocol::Tcp] {
            resolver_config.add_name_server(NameServerConfig {
                socket_addr,
                protocol,
                tls_dns_name: None,
                trust_negative_responses: true,
                bind_addr: None,
            });
        }
    }

    let mut resolver_opts = ResolverOpts::default();
    resolver_opts.timeout = config.dns_timeout;
    resolver_opts.attempts = 1;
    resolver_opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

    let resolver = TokioAsyncResolver::tokio(resolver_config, resolver_opts);
    tracing::debug!(
        "DNS resolver configured with {} servers and {:?} timeout.",
        config.dns_servers.len(),
        config.dns_timeout
    );
    Ok(resolver)
}

/// Resolves the mail exchangers for a domain, most preferred first.
///
/// # Returns
/// * `Ok(Vec<MailServer>)` with at least one entry.
/// * `Err(AppError)` if resolution fails (NXDOMAIN, no records, timeout).
pub async fn resolve_mail_servers(
    resolver: &TokioAsyncResolver,
    domain: &str,
) -> Result<Vec<MailServer>> {
    tracing::debug!(target: "email_task", "Performing DNS MX lookup for {}", domain);

    match resolver.mx_lookup(domain).await {
        Ok(mx_response) => {
            let mut servers: Vec<MailServer> = mx_response
                .iter()
                .map(|mx| MailServer {
                    exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                    preference: mx.preference(),
                })
                .filter(|server| !server.exchange.is_empty())
                .collect();

            if servers.is_empty() {
                tracing::warn!(target: "email_task",
                    "MX lookup for {} succeeded but yielded no usable records.", domain
                );
                return Err(AppError::NoDnsRecords(domain.to_string()));
            }

            servers.sort_by_key(|s| s.preference);
            tracing::debug!(target: "email_task",
                "Found MX for {}: {} (Pref: {})",
                domain, servers[0].exchange, servers[0].preference
            );
            Ok(servers)
        }
        Err(e) => {
            let error_string = format!("{:?}", e.kind());

            if error_string.contains("NXDomain") || error_string.contains("Name does not exist") {
                tracing::debug!(target: "email_task", "Domain {} does not exist (NXDOMAIN)", domain);
                Err(AppError::NxDomain(domain.to_string()))
            } else if error_string.contains("NoRecordsFound") {
                tracing::debug!(target: "email_task", "No MX records found for {}", domain);
                Err(AppError::NoDnsRecords(domain.to_string()))
            } else if error_string.contains("Timeout") {
                tracing::warn!(target: "email_task", "DNS resolution timeout for {}", domain);
                Err(AppError::DnsTimeout(domain.to_string()))
            } else {
                tracing::warn!(target: "email_task", "Unexpected DNS resolution error for {}: {}", domain, e);
                Err(AppError::Dns(e))
            }
        }
    }
}
