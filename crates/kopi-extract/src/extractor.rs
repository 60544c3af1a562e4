//! The response extractor: an ordered chain of recovery strategies.

use crate::candidate::Candidate;
use crate::record::ComponentRecord;
use crate::strategy::{
    DirectParse, ExtractionTier, ManualFields, RecoveryStrategy, TruncationRebuild,
};

/// Length of the raw-response preview carried in errors and logs.
const PREVIEW_CHARS: usize = 200;

/// A successfully recovered record.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The complete record
    pub record: ComponentRecord,

    /// Strategy that produced it
    pub tier: ExtractionTier,

    /// Fields filled from defaults
    pub defaulted: Vec<&'static str>,
}

/// Errors that can occur during extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Model response is empty")]
    Empty,

    #[error("Could not extract structured data from model response: {preview}")]
    Unparseable { preview: String },
}

/// Recovers [`ComponentRecord`]s from raw model output.
///
/// Holds no state between calls.
pub struct ResponseExtractor {
    strategies: Vec<Box<dyn RecoveryStrategy>>,
}

impl ResponseExtractor {
    /// Create an extractor with the standard chain: direct parse, manual
    /// field matching, truncation rebuild.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(DirectParse),
            Box::new(ManualFields),
            Box::new(TruncationRebuild),
        ])
    }

    /// Create an extractor with a custom strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn RecoveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// Recover a record from `raw`.
    pub fn extract(&self, raw: &str) -> Result<Extraction, ExtractError> {
        if raw.trim().is_empty() {
            return Err(ExtractError::Empty);
        }

        let candidate = Candidate::prepare(raw);
        if candidate.had_reasoning {
            tracing::info!("Detected reasoning markup, extracting final answer");
        }

        for strategy in &self.strategies {
            let Some(partial) = strategy.recover(&candidate) else {
                tracing::debug!("Strategy {} did not apply", strategy.tier());
                continue;
            };

            let (record, defaulted) = partial.into_record(strategy.defaults());
            tracing::debug!("Extracted '{}' via {} strategy", record.title, strategy.tier());

            if !defaulted.is_empty() {
                tracing::warn!(
                    "Response for '{}' was missing {}; using defaults",
                    record.title,
                    defaulted.join(", ")
                );
            }

            return Ok(Extraction {
                record,
                tier: strategy.tier(),
                defaulted,
            });
        }

        let preview = preview(raw);
        tracing::warn!("Could not find JSON in model response: {}", preview);
        Err(ExtractError::Unparseable { preview })
    }
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First [`PREVIEW_CHARS`] characters of `raw`.
pub fn preview(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
