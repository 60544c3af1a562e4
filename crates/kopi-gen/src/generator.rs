//! Turns prompts into component records.

use std::time::Duration;

use kopi_extract::{preview, ComponentRecord, ExtractionTier, ResponseExtractor};

use crate::client::{GenerateError, Requester};

/// Pause after each successful request.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(2000);

/// A record recovered from one model reply, with its slug.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedComponent {
    pub record: ComponentRecord,
    pub slug: String,
    pub tier: ExtractionTier,
}

/// Sends prompts through a [`Requester`] and extracts records from the replies.
pub struct ComponentGenerator<R: Requester> {
    requester: R,
    extractor: ResponseExtractor,
    request_delay: Duration,
}

impl<R: Requester> ComponentGenerator<R> {
    pub fn new(requester: R) -> Self {
        Self {
            requester,
            extractor: ResponseExtractor::new(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    /// Set the pause inserted after each successful request.
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Generate a single component.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedComponent, GenerateError> {
        let raw = self.requester.generate(prompt).await?;
        tracing::info!("AI response length: {} characters", raw.len());
        tracing::debug!("AI response preview: {}", preview(&raw));

        let extraction = self.extractor.extract(&raw)?;
        let slug = extraction.record.slug();

        Ok(GeneratedComponent {
            record: extraction.record,
            slug,
            tier: extraction.tier,
        })
    }

    /// Generate one component per prompt, in order.
    ///
    /// Requests run one at a time. A failed prompt is logged and skipped.
    pub async fn generate_many(&self, prompts: &[String]) -> Vec<GeneratedComponent> {
        let mut components = Vec::with_capacity(prompts.len());

        for (i, prompt) in prompts.iter().enumerate() {
            tracing::info!("Generating component {}/{}: {}", i + 1, prompts.len(), prompt);

            match self.generate(prompt).await {
                Ok(component) => {
                    tracing::info!(
                        "Generated '{}' ({} extraction)",
                        component.record.title,
                        component.tier
                    );
                    components.push(component);
                    tokio::time::sleep(self.request_delay).await;
                }
                Err(e) => {
                    tracing::error!("Failed to generate component for '{}': {}", prompt, e);
                }
            }
        }

        components
    }
}
