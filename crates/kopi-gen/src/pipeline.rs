//! Local generation run: generate, store, capture, enhance.

use std::time::Duration;

use crate::client::Requester;
use crate::enhance::{ComponentEnhancer, DEFAULT_WINDOW};
use crate::generator::ComponentGenerator;
use crate::prompts::unique_prompts;
use crate::screenshot::{capture_all, BatchReport, ComponentTarget, Renderer};
use crate::store::{LocalStore, Repository, SaveOutcome};

/// Counts from one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub generated: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed_saves: usize,
    pub screenshots: BatchReport,
    pub enhanced: usize,
}

/// Generates components into a [`LocalStore`] and post-processes them.
pub struct LocalPipeline<R: Requester> {
    generator: ComponentGenerator<R>,
    store: LocalStore,
    renderer: Option<Box<dyn Renderer>>,
    enhancer: ComponentEnhancer,
    enhance_window: Duration,
}

impl<R: Requester> LocalPipeline<R> {
    pub fn new(generator: ComponentGenerator<R>, store: LocalStore) -> Self {
        Self {
            generator,
            store,
            renderer: None,
            enhancer: ComponentEnhancer::new(),
            enhance_window: DEFAULT_WINDOW,
        }
    }

    /// Capture screenshots of saved entries with `renderer`.
    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn enhance_window(mut self, window: Duration) -> Self {
        self.enhance_window = window;
        self
    }

    /// Run with `count` random distinct prompts.
    pub async fn run(&self, count: usize) -> PipelineReport {
        let prompts = {
            let mut rng = rand::thread_rng();
            unique_prompts(count, &mut rng)
        };
        self.run_prompts(&prompts).await
    }

    /// Run with the given prompts.
    pub async fn run_prompts(&self, prompts: &[String]) -> PipelineReport {
        let mut report = PipelineReport::default();

        tracing::info!("Generating {} components", prompts.len());
        let components = self.generator.generate_many(prompts).await;
        report.generated = components.len();

        if components.is_empty() {
            tracing::warn!("No components were generated successfully");
            return report;
        }

        let mut targets = Vec::new();
        for component in &components {
            match self.store.save(component).await {
                Ok(SaveOutcome::Saved { .. }) => {
                    report.saved += 1;
                    let paths = self.store.paths(&component.slug);
                    targets.push(ComponentTarget::new(
                        &component.slug,
                        &component.record.title,
                        &paths,
                    ));
                }
                Ok(SaveOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!("Failed to save '{}': {}", component.record.title, e);
                    report.failed_saves += 1;
                }
            }
        }

        if let Some(renderer) = &self.renderer {
            tracing::info!("Capturing {} screenshots", targets.len());
            report.screenshots = capture_all(renderer.as_ref(), &targets).await;
        }

        report.enhanced = self
            .enhancer
            .enhance_recent(self.store.content_dir(), self.enhance_window);

        tracing::info!(
            "Pipeline finished: {} generated, {} saved, {} skipped, {} screenshots, {} enhanced",
            report.generated,
            report.saved,
            report.skipped,
            report.screenshots.captured,
            report.enhanced
        );

        report
    }
}
