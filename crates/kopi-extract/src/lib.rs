//! Tolerant recovery of component records from language-model output.
//!
//! A text-generation model is asked for a JSON object describing a UI
//! component. What comes back may be wrapped in reasoning markup or markdown
//! fences, may be malformed, or may be cut off mid-object. This crate turns
//! that text into a fully populated [`ComponentRecord`] using an ordered chain
//! of recovery strategies, and derives URL slugs from record titles.

pub mod candidate;
pub mod extractor;
pub mod fields;
pub mod record;
pub mod slug;
pub mod strategy;

pub use candidate::Candidate;
pub use extractor::{preview, ExtractError, Extraction, ResponseExtractor};
pub use record::{ComponentRecord, FieldDefaults, PartialRecord};
pub use slug::slugify;
pub use strategy::{
    DirectParse, ExtractionTier, ManualFields, RecoveryStrategy, TruncationRebuild,
};
