//! Runs one full cleaning pass over a raw enrichment payload.

use crate::address::select_best_address;
use crate::config::Config;
use crate::contact_form::sanitize_contact_form;
use crate::dns::{MxResolver, SystemMxResolver};
use crate::email::EmailCleaner;
use crate::error::{AppError, Result};
use crate::models::{CleanedData, ProcessingResult, RawEnrichedData};
use crate::phone::PhoneNormalizer;
use crate::social::{HttpProbe, ReqwestProbe, SocialSanitizer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Holds the cleaners and their shared network clients. Cheap to clone and
/// safe to share across tasks; no state survives between calls.
#[derive(Clone)]
pub struct DataProcessor {
    phones: PhoneNormalizer,
    emails: EmailCleaner,
    socials: SocialSanitizer,
    tracking_prefixes: Vec<String>,
}

impl DataProcessor {
    /// Creates a processor with the system DNS resolver and a reqwest client.
    pub fn new(config: &Config) -> Result<Self> {
        let resolver = Arc::new(SystemMxResolver::new(config)?);
        let prober = Arc::new(ReqwestProbe::new(config)?);
        Ok(Self::with_clients(config, resolver, prober))
    }

    /// Creates a processor around caller-supplied DNS and HTTP capabilities.
    pub fn with_clients(
        config: &Config,
        resolver: Arc<dyn MxResolver>,
        prober: Arc<dyn HttpProbe>,
    ) -> Self {
        Self {
            phones: PhoneNormalizer::new(&config.default_region),
            emails: EmailCleaner::new(resolver, config.dns_timeout),
            socials: SocialSanitizer::new(prober, config.tracking_prefixes.clone()),
            tracking_prefixes: config.tracking_prefixes.clone(),
        }
    }

    /// Cleans one payload. Only a blank company id is an error; every other
    /// problem just drops the offending candidate.
    pub async fn process(&self, input: &RawEnrichedData) -> Result<CleanedData> {
        let company_id = input.company_id.trim();
        if company_id.is_empty() {
            return Err(AppError::InsufficientInput(
                "company_id is required".to_string(),
            ));
        }

        tracing::info!(target: "process_record_task", "[{}] Starting cleaning pass.", company_id);

        let (emails, socials) = tokio::join!(
            self.emails.clean(&input.emails),
            self.socials.sanitize(&input.social_links),
        );
        let phones = self
            .phones
            .normalize_all(input.primary_phone.as_deref(), &input.secondary_phones);
        let address = select_best_address(&input.addresses);
        let contact_form_url = sanitize_contact_form(
            input.contact_form_url.as_deref().unwrap_or(""),
            &self.tracking_prefixes,
        );

        tracing::info!(target: "process_record_task",
            "[{}] Finished: {}/{} emails, {} phones, {} socials, address {}, contact form {}.",
            company_id,
            emails.len(),
            input.emails.len(),
            phones.len(),
            socials.len(),
            if address.is_empty() { "missing" } else { "found" },
            if contact_form_url.is_empty() { "missing" } else { "found" },
        );

        Ok(CleanedData {
            company_id: company_id.to_string(),
            emails,
            phones,
            socials,
            address,
            contact_form_url,
        })
    }

    /// Like [`DataProcessor::process`], but gives up as soon as `cancel`
    /// fires. In-flight DNS and HTTP requests are dropped and the call
    /// returns `AppError::Cancelled`; a partial record is never returned.
    pub async fn process_with_cancellation(
        &self,
        input: &RawEnrichedData,
        cancel: &CancellationToken,
    ) -> Result<CleanedData> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled(input.company_id.clone()));
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(target: "process_record_task",
                    "[{}] Cleaning cancelled before completion.", input.company_id
                );
                Err(AppError::Cancelled(input.company_id.clone()))
            }
            result = self.process(input) => result,
        }
    }
}

/// Cleans one payload for batch output, folding errors into the result.
pub async fn process_record(
    processor: Arc<DataProcessor>,
    record: RawEnrichedData,
    cancel: CancellationToken,
) -> ProcessingResult {
    match processor.process_with_cancellation(&record, &cancel).await {
        Ok(cleaned) => ProcessingResult {
            company_id: cleaned.company_id.clone(),
            cleaned: Some(cleaned),
            error: None,
        },
        Err(e) => {
            tracing::error!(target: "process_record_task",
                "[{}] Cleaning failed: {}", record.company_id, e
            );
            ProcessingResult {
                company_id: record.company_id,
                cleaned: None,
                error: Some(e.to_string()),
            }
        }
    }
}
