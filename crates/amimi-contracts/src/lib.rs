pub mod collage;
pub mod error;
pub mod events;
pub mod memory;
pub mod reflection;
pub mod transcript;

pub use error::{MemoryError, ValidationIssues};
