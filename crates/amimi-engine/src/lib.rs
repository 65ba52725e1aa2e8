mod config;
mod dryrun;
mod gemini;
mod orchestrator;
mod prompts;

use amimi_contracts::collage::RawImageResponse;
use anyhow::Result;

pub use config::{EngineConfig, ProviderChoice};
pub use dryrun::DryrunProvider;
pub use gemini::GeminiProvider;
pub use orchestrator::{GenerationKind, GenerationOrchestrator, GenerationPhase};
pub use prompts::{collage_prompt, reflection_prompt};

pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
}

/// Text side of a generative backend. Any failure is reported as-is; retry
/// policy belongs to the implementation, not the caller.
pub trait TextGenerator: Provider {
    fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// Image side of a generative backend. The response is returned untouched.
pub trait ImageGenerator: Provider {
    fn generate_image(&self, prompt: &str) -> Result<RawImageResponse>;
}
