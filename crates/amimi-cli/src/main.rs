use std::fs;
use std::path::{Path, PathBuf};

use amimi_contracts::events::EventWriter;
use amimi_contracts::memory::{export_memory, render_memory, MemoryStore};
use amimi_contracts::MemoryError;
use amimi_engine::{
    DryrunProvider, EngineConfig, GeminiProvider, GenerationOrchestrator, ImageGenerator,
    ProviderChoice, TextGenerator,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

const EXIT_VALIDATION_FAILED: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "amimi",
    version,
    about = "Turn a couple's call transcript into a memory"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a memory from hand-written reflection fields and collage elements.
    Manual(ManualArgs),
    /// Generate the reflection and collage with a generative backend.
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
struct ManualArgs {
    #[arg(long)]
    transcript: PathBuf,
    #[arg(long)]
    summary: String,
    #[arg(long)]
    lovely_message: String,
    #[arg(long)]
    amy_feedback: String,
    #[arg(long)]
    jay_feedback: String,
    #[arg(long = "element", required = true)]
    elements: Vec<String>,
    #[arg(long, default_value = "output")]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[arg(long)]
    transcript: PathBuf,
    #[arg(long)]
    provider: Option<ProviderChoice>,
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "output")]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    skip_collage: bool,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if let Some(issues) = err
                .downcast_ref::<MemoryError>()
                .and_then(MemoryError::issues)
            {
                eprintln!("{issues}");
                std::process::exit(EXIT_VALIDATION_FAILED);
            }
            eprintln!("amimi error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Manual(args) => run_manual(args),
        Command::Generate(args) => run_generate(args),
    }
}

fn run_manual(args: ManualArgs) -> Result<i32> {
    let events = session_events(&args.out, args.events.as_deref());
    let mut store = MemoryStore::new();
    store.load_transcript(&read_transcript(&args.transcript)?)?;

    store.apply_manual_entry(
        &args.summary,
        &args.lovely_message,
        &args.amy_feedback,
        &args.jay_feedback,
    )?;
    events.emit_value("manual_entry_applied", serde_json::json!({}))?;
    let image = store.apply_manual_image(&args.elements)?;
    events.emit_value(
        "manual_image_applied",
        serde_json::json!({ "elements": image.description() }),
    )?;

    finish_session(&store, &args.out)
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let mut config = EngineConfig::load(args.config.as_deref())?;
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = args.text_model.clone() {
        config.text_model = model;
    }
    if let Some(model) = args.image_model.clone() {
        config.image_model = model;
    }

    match config.provider {
        ProviderChoice::Dryrun => generate_with(&DryrunProvider::new(), &args),
        ProviderChoice::Gemini => generate_with(&GeminiProvider::new(&config)?, &args),
    }
}

fn generate_with<P>(provider: &P, args: &GenerateArgs) -> Result<i32>
where
    P: TextGenerator + ImageGenerator,
{
    let events = session_events(&args.out, args.events.as_deref());
    let mut orchestrator = GenerationOrchestrator::new(provider, provider).with_events(events);
    let mut store = MemoryStore::new();
    store.load_transcript(&read_transcript(&args.transcript)?)?;

    eprintln!("Requesting reflection from {}...", provider.name());
    orchestrator.generate_reflection(&mut store)?;
    if !args.skip_collage {
        eprintln!("Requesting collage from {}...", provider.name());
        orchestrator.generate_collage(&mut store)?;
    }

    finish_session(&store, &args.out)
}

fn finish_session(store: &MemoryStore, out: &Path) -> Result<i32> {
    println!("{}", render_memory(store));
    let exported = export_memory(out, store.entry(), store.image())?;
    if let Some(path) = exported.entry_path {
        println!("Saved memory entry to {}", path.display());
    }
    if let Some(path) = exported.image_path {
        println!("Saved collage image to {}", path.display());
    }
    Ok(0)
}

fn session_events(out: &Path, events: Option<&Path>) -> EventWriter {
    let path = events
        .map(Path::to_path_buf)
        .unwrap_or_else(|| out.join("events.jsonl"));
    EventWriter::new(path, Uuid::new_v4().to_string())
}

fn read_transcript(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))
}
