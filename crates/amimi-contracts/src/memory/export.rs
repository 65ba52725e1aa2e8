use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::collage::EncodedImage;
use crate::reflection::MemoryEntry;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportedMemory {
    pub entry_path: Option<PathBuf>,
    pub image_path: Option<PathBuf>,
    pub image_sha256: Option<String>,
}

/// Writes the entry as `memory_<stamp>.json` and the collage as
/// `collage_<stamp>.<format>`. The manual placeholder has no bytes and is skipped.
pub fn export_memory(
    out_dir: &Path,
    entry: Option<&MemoryEntry>,
    image: Option<&EncodedImage>,
) -> anyhow::Result<ExportedMemory> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let stamp = file_stamp();
    let mut exported = ExportedMemory::default();

    if let Some(entry) = entry {
        let path = out_dir.join(format!("memory_{stamp}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(entry)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        exported.entry_path = Some(path);
    }

    if let Some(image) = image {
        if let Some(bytes) = image.decode()? {
            let path = out_dir.join(format!("collage_{stamp}.{}", image.format()));
            std::fs::write(&path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            exported.image_sha256 = Some(hex::encode(Sha256::digest(&bytes)));
            exported.image_path = Some(path);
        }
    }

    Ok(exported)
}

fn file_stamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string()
}
