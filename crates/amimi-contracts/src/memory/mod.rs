mod display;
mod export;
mod store;

pub use display::render_memory;
pub use export::{export_memory, ExportedMemory};
pub use store::MemoryStore;
