//! Defines the custom error types for the lead-refinery crate.

use thiserror::Error;
use url::ParseError as UrlParseError;

/// The primary error type for cleaning and scoring operations.
///
/// Only a handful of variants ever reach callers of the data processor
/// (`InsufficientInput`, `Cancelled`). The rest describe why a single
/// candidate was dropped and are logged, not propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error parsing a TOML configuration file.
    #[error("TOML Error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Error parsing a URL.
    #[error("URL Parsing Error: {0}")]
    UrlParse(#[from] UrlParseError),

    /// Error making HTTP requests via reqwest.
    #[error("HTTP Request Error: {0}")]
    Request(#[from] reqwest::Error),

    /// Error during DNS resolution.
    #[error("DNS Resolution Error: {0}")]
    Dns(#[from] trust_dns_resolver::error::ResolveError),

    /// Specific DNS error indicating the domain does not exist.
    #[error("Domain Not Found (NXDOMAIN): {0}")]
    NxDomain(String),

    /// Specific DNS error indicating no MX records were found.
    #[error("No MX Records Found: {0}")]
    NoDnsRecords(String),

    /// DNS operation timed out.
    #[error("DNS Timeout for domain: {0}")]
    DnsTimeout(String),

    /// Required input is missing (e.g. a blank company identifier).
    #[error("Insufficient Input Data: {0}")]
    InsufficientInput(String),

    /// A URL parsed but carried no usable host.
    #[error("Failed to extract domain from URL: {0}")]
    DomainExtraction(String),

    /// The caller cancelled the operation before it finished.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// An underlying error that doesn't fit other categories, using anyhow.
    #[error("Generic Error: {0}")]
    Generic(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
