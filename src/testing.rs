//! Fake resolver and probe used by unit tests.

use crate::dns::{MailServer, MxResolver};
use crate::error::{AppError, Result};
use crate::social::HttpProbe;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Answers MX lookups from a fixed table and records every lookup.
#[derive(Default)]
pub(crate) struct StubResolver {
    mx: HashMap<String, bool>,
    delay: Option<Duration>,
    lookups: Mutex<Vec<String>>,
}

impl StubResolver {
    pub fn with_domains(domains: &[&str]) -> Self {
        Self {
            mx: domains.iter().map(|d| (d.to_string(), true)).collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration, domains: &[&str]) -> Self {
        Self {
            delay: Some(delay),
            ..Self::with_domains(domains)
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl MxResolver for StubResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MailServer>> {
        self.lookups.lock().unwrap().push(domain.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.mx.get(domain).copied().unwrap_or(false) {
            Ok(vec![MailServer {
                exchange: format!("mail.{}", domain),
                preference: 10,
            }])
        } else {
            Err(AppError::NoDnsRecords(domain.to_string()))
        }
    }
}

/// Answers probes from a "METHOD url" table; unknown URLs get 404.
/// URLs listed in `failing` produce a transport error instead.
#[derive(Default)]
pub(crate) struct StubProbe {
    responses: HashMap<String, u16>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl StubProbe {
    pub fn new(responses: &[(&str, u16)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpProbe for StubProbe {
    async fn status(&self, method: Method, url: &Url) -> Result<StatusCode> {
        let key = format!("{} {}", method, url);
        self.calls.lock().unwrap().push(key.clone());
        if self.failing.iter().any(|f| f == url.as_str()) {
            return Err(AppError::Generic(anyhow::anyhow!("connection refused")));
        }
        let code = self.responses.get(&key).copied().unwrap_or(404);
        Ok(StatusCode::from_u16(code).unwrap())
    }
}
