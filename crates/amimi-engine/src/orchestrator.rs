use amimi_contracts::collage::validate_image_response;
use amimi_contracts::events::EventWriter;
use amimi_contracts::memory::MemoryStore;
use amimi_contracts::reflection::{parse_reflection_response, validate_reflection};
use amimi_contracts::MemoryError;
use serde_json::{json, Value};

use crate::prompts::{collage_prompt, reflection_prompt};
use crate::{ImageGenerator, TextGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Reflection,
    Collage,
}

impl GenerationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reflection => "reflection",
            Self::Collage => "collage",
        }
    }
}

/// Where the latest attempt of one generation kind ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    Requesting,
    Validating,
    Applied,
    Failed,
}

/// Runs prompt -> generate -> parse -> validate -> apply against a [`MemoryStore`].
///
/// A single attempt either replaces the store's entry/image with a fully
/// validated value or leaves the store untouched and returns the first
/// failing stage's error. Nothing is retried here.
pub struct GenerationOrchestrator<'a> {
    text: &'a dyn TextGenerator,
    image: &'a dyn ImageGenerator,
    events: Option<EventWriter>,
    reflection_phase: GenerationPhase,
    collage_phase: GenerationPhase,
}

impl<'a> GenerationOrchestrator<'a> {
    pub fn new(text: &'a dyn TextGenerator, image: &'a dyn ImageGenerator) -> Self {
        Self {
            text,
            image,
            events: None,
            reflection_phase: GenerationPhase::Idle,
            collage_phase: GenerationPhase::Idle,
        }
    }

    pub fn with_events(mut self, events: EventWriter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn phase(&self, kind: GenerationKind) -> GenerationPhase {
        match kind {
            GenerationKind::Reflection => self.reflection_phase,
            GenerationKind::Collage => self.collage_phase,
        }
    }

    pub fn generate_reflection(&mut self, store: &mut MemoryStore) -> Result<(), MemoryError> {
        let kind = GenerationKind::Reflection;
        let transcript = store.transcript().ok_or_else(|| {
            MemoryError::Precondition("cannot generate reflection: no transcript loaded".to_string())
        })?;
        let prompt = reflection_prompt(transcript);

        let text = self.text;
        self.start(kind, text.name(), &prompt);
        let raw = text
            .generate_text(&prompt)
            .map_err(|err| self.fail(kind, "provider", MemoryError::Provider(err)))?;

        self.set_phase(kind, GenerationPhase::Validating);
        let candidate =
            parse_reflection_response(&raw).map_err(|err| self.fail(kind, "parse", err))?;
        let entry = validate_reflection(&candidate)
            .map_err(|issues| self.fail(kind, "validate", MemoryError::Validation(issues)))?;

        let summary_chars = entry.summary().chars().count();
        store.apply_validated_entry(entry);
        self.finish(
            kind,
            json!({
                "response_chars": raw.chars().count(),
                "summary_chars": summary_chars,
            }),
        );
        Ok(())
    }

    pub fn generate_collage(&mut self, store: &mut MemoryStore) -> Result<(), MemoryError> {
        let kind = GenerationKind::Collage;
        let summary = store
            .entry()
            .map(|entry| entry.summary())
            .filter(|summary| !summary.is_empty())
            .ok_or_else(|| {
                MemoryError::Precondition(
                    "cannot generate collage: no memory entry with summary exists".to_string(),
                )
            })?;
        let prompt = collage_prompt(summary);

        let generator = self.image;
        self.start(kind, generator.name(), &prompt);
        let response = generator
            .generate_image(&prompt)
            .map_err(|err| self.fail(kind, "provider", MemoryError::Provider(err)))?;

        self.set_phase(kind, GenerationPhase::Validating);
        let image = validate_image_response(&response)
            .map_err(|issues| self.fail(kind, "validate", MemoryError::Validation(issues)))?;

        let payload = json!({
            "candidates": response.candidate_count(),
            "encoded_chars": image.content().len(),
            "format": image.format(),
        });
        store.apply_validated_image(image);
        self.finish(kind, payload);
        Ok(())
    }

    fn start(&mut self, kind: GenerationKind, provider: &str, prompt: &str) {
        self.set_phase(kind, GenerationPhase::Requesting);
        self.emit(
            kind,
            "requested",
            json!({
                "provider": provider,
                "prompt_chars": prompt.chars().count(),
            }),
        );
    }

    fn finish(&mut self, kind: GenerationKind, payload: Value) {
        self.set_phase(kind, GenerationPhase::Applied);
        self.emit(kind, "applied", payload);
    }

    fn fail(&mut self, kind: GenerationKind, stage: &str, err: MemoryError) -> MemoryError {
        self.set_phase(kind, GenerationPhase::Failed);
        let issues = err
            .issues()
            .map(|issues| json!(issues.as_slice()))
            .unwrap_or(Value::Null);
        self.emit(
            kind,
            "failed",
            json!({
                "stage": stage,
                "error": format!("{err:#}"),
                "issues": issues,
            }),
        );
        err
    }

    fn set_phase(&mut self, kind: GenerationKind, phase: GenerationPhase) {
        match kind {
            GenerationKind::Reflection => self.reflection_phase = phase,
            GenerationKind::Collage => self.collage_phase = phase,
        }
    }

    // Best effort: a broken event log must not change the generation outcome.
    fn emit(&self, kind: GenerationKind, suffix: &str, payload: Value) {
        if let Some(events) = &self.events {
            let _ = events.emit_value(&format!("{}_{suffix}", kind.as_str()), payload);
        }
    }
}
