use amimi_contracts::collage::RawImageResponse;
use amimi_contracts::events::EventWriter;
use amimi_contracts::memory::{export_memory, MemoryStore};
use amimi_contracts::MemoryError;
use amimi_engine::{
    DryrunProvider, GenerationKind, GenerationOrchestrator, GenerationPhase, ImageGenerator,
    Provider,
};
use serde_json::{json, Value};

struct CannedImage(Value);

impl Provider for CannedImage {
    fn name(&self) -> &str {
        "canned-image"
    }
}

impl ImageGenerator for CannedImage {
    fn generate_image(&self, _prompt: &str) -> anyhow::Result<RawImageResponse> {
        Ok(RawImageResponse::new(self.0.clone()))
    }
}

#[test]
fn dryrun_session_generates_and_exports_a_memory() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let events_path = temp.path().join("events.jsonl");
    let provider = DryrunProvider::new();
    let mut orchestrator = GenerationOrchestrator::new(&provider, &provider)
        .with_events(EventWriter::new(&events_path, "session-flow"));
    let mut store = MemoryStore::new();

    store.load_transcript("Amy: Hey! How was your day?\nJay: Long meeting. You?\nAmy: I miss you.")?;
    orchestrator.generate_reflection(&mut store)?;
    orchestrator.generate_collage(&mut store)?;

    assert_eq!(
        orchestrator.phase(GenerationKind::Reflection),
        GenerationPhase::Applied
    );
    let exported = export_memory(temp.path(), store.entry(), store.image())?;
    let image_path = exported.image_path.expect("collage exported");
    assert_eq!(&std::fs::read(image_path)?[1..4], b"PNG");

    let types: Vec<String> = std::fs::read_to_string(&events_path)?
        .lines()
        .map(|line| {
            serde_json::from_str::<Value>(line)
                .map(|event| event["type"].as_str().unwrap_or_default().to_string())
        })
        .collect::<Result<_, _>>()?;
    assert_eq!(
        types,
        [
            "reflection_requested",
            "reflection_applied",
            "collage_requested",
            "collage_applied"
        ]
    );
    Ok(())
}

#[test]
fn rejected_collage_keeps_the_manual_placeholder() -> anyhow::Result<()> {
    let text = DryrunProvider::new();
    let image = CannedImage(json!({
        "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "A".repeat(500) } }] } }]
    }));
    let mut orchestrator = GenerationOrchestrator::new(&text, &image);
    let mut store = MemoryStore::new();
    store.load_transcript("Amy: Hi\nJay: Hey")?;
    store.apply_manual_image(&["hearts".to_string()])?;

    orchestrator.generate_reflection(&mut store)?;
    let err = orchestrator
        .generate_collage(&mut store)
        .expect_err("small image must be rejected");

    match err {
        MemoryError::Validation(issues) => {
            assert_eq!(issues.len(), 1);
            assert!(issues.contains("suspiciously small"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.image().map(|image| image.is_manual_placeholder()).unwrap_or(false));
    assert_eq!(
        orchestrator.phase(GenerationKind::Collage),
        GenerationPhase::Failed
    );

    // A fresh attempt with a good response succeeds on re-invocation.
    let good = CannedImage(json!({
        "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "A".repeat(1500) } }] } }]
    }));
    let mut retry = GenerationOrchestrator::new(&text, &good);
    retry.generate_collage(&mut store)?;
    assert_eq!(store.image().map(|image| image.content().len()), Some(1500));
    Ok(())
}

#[test]
fn reading_twice_without_generation_is_stable() -> anyhow::Result<()> {
    let provider = DryrunProvider::new();
    let mut orchestrator = GenerationOrchestrator::new(&provider, &provider);
    let mut store = MemoryStore::new();
    store.load_transcript("Amy: Hi\nJay: Hey")?;
    orchestrator.generate_reflection(&mut store)?;

    let first = store.entry().cloned();
    assert_eq!(first.as_ref(), store.entry());
    assert_eq!(store.image(), None);
    assert_eq!(store.image(), None);
    Ok(())
}
