//! Cleans, verifies and scores contact data scraped from company websites.
//!
//! [`processor::DataProcessor`] turns a [`models::RawEnrichedData`] payload
//! into [`models::CleanedData`]; [`features::build_lead_features`] and
//! [`scoring::LeadScorer`] turn a stored record into a 0–100 lead score.

pub mod address;
pub mod config;
pub mod contact_form;
pub mod dns;
pub mod domain;
pub mod email;
pub mod error;
pub mod features;
pub mod models;
pub mod phone;
pub mod processor;
pub mod scoring;
pub mod social;

#[cfg(test)]
mod testing;
