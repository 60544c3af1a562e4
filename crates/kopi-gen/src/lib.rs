//! AI-generated Tailwind component pipeline.
//!
//! Sends generation prompts to a text-generation API, recovers component
//! records from the replies, stores them as content entries, captures
//! screenshots and applies the styling enhancement pass.

pub mod client;
pub mod enhance;
pub mod generator;
pub mod github;
pub mod metadata;
pub mod pipeline;
pub mod prompts;
pub mod screenshot;
pub mod store;
pub mod templates;

pub use client::{GenerateError, Requester, WorkersAiClient, WorkersAiConfig};
pub use enhance::ComponentEnhancer;
pub use generator::{ComponentGenerator, GeneratedComponent};
pub use github::{GithubConfig, GithubStore};
pub use metadata::{read_front_matter, ComponentMeta, MetadataError};
pub use pipeline::{LocalPipeline, PipelineReport};
pub use prompts::unique_prompts;
pub use screenshot::{
    capture_all, find_components, BatchReport, CaptureSettings, ChromeRenderer, ComponentTarget,
    Renderer, ScreenshotError,
};
pub use store::{ComponentPaths, LocalStore, Repository, SaveOutcome, StoreError};
pub use templates::DocumentTemplates;
