//! Component generation command.

use std::path::Path;

use anyhow::Result;
use kopi_gen::{
    unique_prompts, ChromeRenderer, ComponentGenerator, GithubStore, LocalPipeline, LocalStore,
    Repository, SaveOutcome, WorkersAiClient,
};

use crate::config::{load_config, ConfigFile};

/// Run the generate command.
pub async fn run(config_path: &Path, count: Option<usize>, github: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let count = count.unwrap_or(config.generation.count);

    if count == 0 {
        tracing::warn!("Nothing to generate (count is 0)");
        return Ok(());
    }

    let generator = ComponentGenerator::new(WorkersAiClient::new(config.workers_ai()?))
        .request_delay(config.request_delay());

    if github {
        publish(&config, generator, count).await
    } else {
        generate_local(&config, generator, count).await
    }
}

async fn generate_local(
    config: &ConfigFile,
    generator: ComponentGenerator<WorkersAiClient>,
    count: usize,
) -> Result<()> {
    tracing::info!(
        "Generating {} components into {}",
        count,
        config.content.dir.display()
    );

    let mut pipeline = LocalPipeline::new(generator, LocalStore::new(&config.content.dir))
        .enhance_window(config.enhance_window(None));
    if config.screenshots.enabled {
        pipeline = pipeline.renderer(Box::new(ChromeRenderer::new(config.capture_settings())));
    }

    let report = pipeline.run(count).await;

    tracing::info!(
        "Generated {} components: {} saved, {} skipped, {} failed to save",
        report.generated,
        report.saved,
        report.skipped,
        report.failed_saves
    );
    if config.screenshots.enabled {
        tracing::info!(
            "Screenshots: {} captured, {} failed",
            report.screenshots.captured,
            report.screenshots.failed.len()
        );
    }
    tracing::info!("Enhanced {} components", report.enhanced);

    Ok(())
}

async fn publish(
    config: &ConfigFile,
    generator: ComponentGenerator<WorkersAiClient>,
    count: usize,
) -> Result<()> {
    let github = config.github()?;
    tracing::info!(
        "Generating {} components for {}/{}",
        count,
        github.owner,
        github.repo
    );
    let store = GithubStore::new(github);

    let prompts = {
        let mut rng = rand::thread_rng();
        unique_prompts(count, &mut rng)
    };
    let components = generator.generate_many(&prompts).await;

    if components.is_empty() {
        tracing::warn!("No components were generated successfully");
        return Ok(());
    }

    let mut saved = 0;
    for component in &components {
        match store.save(component).await {
            Ok(SaveOutcome::Saved { location }) => {
                tracing::info!("Committed {}", location);
                saved += 1;
            }
            Ok(SaveOutcome::Skipped) => {}
            Err(e) => {
                tracing::error!("Failed to publish '{}': {}", component.record.title, e);
            }
        }
    }

    tracing::info!(
        "Published {} of {} generated components",
        saved,
        components.len()
    );

    Ok(())
}
