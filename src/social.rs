//! Social profile link canonicalization and liveness verification.

use crate::config::Config;
use crate::domain::{normalize_url, strip_tracking_params};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// The fixed set of social networks a cleaned record can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Facebook,
    Instagram,
    YouTube,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::LinkedIn,
        Platform::Facebook,
        Platform::Instagram,
        Platform::YouTube,
        Platform::TikTok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::TikTok => "tiktok",
        }
    }

    /// Maps the free-form labels scrapers emit ("LinkedIn", "linkedin_url",
    /// "ig", ...) onto a platform.
    pub fn from_label(label: &str) -> Option<Platform> {
        match label.trim().to_lowercase().as_str() {
            "linkedin" | "linkedin_url" => Some(Platform::LinkedIn),
            "facebook" | "facebook_url" => Some(Platform::Facebook),
            "instagram" | "instagram_url" | "ig" => Some(Platform::Instagram),
            "youtube" | "youtube_url" | "youtu" | "youtu_be" => Some(Platform::YouTube),
            "tiktok" | "tiktok_url" => Some(Platform::TikTok),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root domains accepted for each platform; subdomains match too.
const ALLOWED_SOCIAL_DOMAINS: &[(&str, Platform)] = &[
    ("linkedin.com", Platform::LinkedIn),
    ("facebook.com", Platform::Facebook),
    ("instagram.com", Platform::Instagram),
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("tiktok.com", Platform::TikTok),
];

/// Returns the platform owning `host`, if it is on the allow-list.
pub fn platform_for_host(host: &str) -> Option<Platform> {
    let host = host.trim().trim_matches('.').to_lowercase();
    if host.is_empty() {
        return None;
    }
    ALLOWED_SOCIAL_DOMAINS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{}", domain)))
        .map(|(_, platform)| *platform)
}

/// At most one verified URL per platform.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tiktok: Option<String>,
}

impl SocialLinks {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::LinkedIn => self.linkedin.as_deref(),
            Platform::Facebook => self.facebook.as_deref(),
            Platform::Instagram => self.instagram.as_deref(),
            Platform::YouTube => self.youtube.as_deref(),
            Platform::TikTok => self.tiktok.as_deref(),
        }
    }

    pub fn set(&mut self, platform: Platform, value: String) {
        let slot = match platform {
            Platform::LinkedIn => &mut self.linkedin,
            Platform::Facebook => &mut self.facebook,
            Platform::Instagram => &mut self.instagram,
            Platform::YouTube => &mut self.youtube,
            Platform::TikTok => &mut self.tiktok,
        };
        *slot = Some(value);
    }

    /// Populated platforms in fixed platform order.
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &str)> + '_ {
        Platform::ALL
            .into_iter()
            .filter_map(|platform| self.get(platform).map(|url| (platform, url)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Issues a single HTTP request and reports the response status.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn status(&self, method: Method, url: &Url) -> Result<StatusCode>;
}

/// Default probe backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                AppError::Generic(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn status(&self, method: Method, url: &Url) -> Result<StatusCode> {
        let response = self.client.request(method, url.clone()).send().await?;
        Ok(response.status())
    }
}

/// Resolves each platform to its first canonical, allow-listed, reachable URL.
#[derive(Clone)]
pub struct SocialSanitizer {
    prober: Arc<dyn HttpProbe>,
    tracking_prefixes: Vec<String>,
}

impl SocialSanitizer {
    pub fn new(prober: Arc<dyn HttpProbe>, tracking_prefixes: Vec<String>) -> Self {
        Self {
            prober,
            tracking_prefixes,
        }
    }

    /// Validates the label → candidates map. Labels are visited in key order;
    /// all candidates for one platform form a single queue that stops at the
    /// first verified URL. Platforms are resolved concurrently.
    pub async fn sanitize(&self, socials: &BTreeMap<String, Vec<String>>) -> SocialLinks {
        let mut queues: BTreeMap<Platform, Vec<&str>> = BTreeMap::new();
        for (label, candidates) in socials {
            let Some(platform) = Platform::from_label(label) else {
                tracing::debug!(target: "social_task", "Ignoring unknown social label '{}'", label);
                continue;
            };
            queues
                .entry(platform)
                .or_default()
                .extend(candidates.iter().map(String::as_str));
        }

        let resolved = join_all(
            queues
                .into_iter()
                .map(|(platform, candidates)| self.resolve_platform(platform, candidates)),
        )
        .await;

        let mut links = SocialLinks::default();
        for (platform, url) in resolved.into_iter().flatten() {
            links.set(platform, url);
        }
        links
    }

    async fn resolve_platform(
        &self,
        platform: Platform,
        candidates: Vec<&str>,
    ) -> Option<(Platform, String)> {
        for raw in candidates {
            if let Some(url) = self.clean_link(platform, raw).await {
                tracing::debug!(target: "social_task", "Verified {} link {}", platform, url);
                return Some((platform, url));
            }
        }
        tracing::debug!(target: "social_task", "No verified {} link", platform);
        None
    }

    /// Normalizes one candidate for `platform`, returning the canonical URL
    /// only when it is on the platform's allow-list and responds.
    pub async fn clean_link(&self, platform: Platform, raw: &str) -> Option<String> {
        let mut url = match normalize_url(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(target: "social_task", "Rejecting {} candidate '{}': {}", platform, raw, e);
                return None;
            }
        };

        let host_platform = url.host_str().and_then(platform_for_host);
        if host_platform != Some(platform) {
            tracing::debug!(target: "social_task",
                "Rejecting {} candidate '{}': host not allowed for platform", platform, raw
            );
            return None;
        }

        strip_tracking_params(&mut url, &self.tracking_prefixes);

        if !self.url_resolves(&url).await {
            return None;
        }
        Some(url.to_string())
    }

    /// One HEAD; a 405 earns a single GET. Only a 200 counts as alive, and a
    /// transport error on HEAD is final.
    pub async fn url_resolves(&self, url: &Url) -> bool {
        match self.prober.status(Method::HEAD, url).await {
            Ok(StatusCode::OK) => true,
            Ok(StatusCode::METHOD_NOT_ALLOWED) => {
                match self.prober.status(Method::GET, url).await {
                    Ok(status) => {
                        tracing::debug!(target: "social_task", "GET {} -> {}", url, status);
                        status == StatusCode::OK
                    }
                    Err(e) => {
                        tracing::debug!(target: "social_task", "GET {} failed: {}", url, e);
                        false
                    }
                }
            }
            Ok(status) => {
                tracing::debug!(target: "social_task", "HEAD {} -> {}", url, status);
                false
            }
            Err(e) => {
                tracing::debug!(target: "social_task", "HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}
