use std::io::Cursor;

use amimi_contracts::collage::RawImageResponse;
use amimi_contracts::transcript::Transcript;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::prompts::TRANSCRIPT_HEADING;
use crate::{ImageGenerator, Provider, TextGenerator};

const DRYRUN_IMAGE_SIZE: u32 = 128;

/// Offline provider with deterministic output, for demos and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryrunProvider;

impl DryrunProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for DryrunProvider {
    fn name(&self) -> &str {
        "dryrun"
    }
}

impl TextGenerator for DryrunProvider {
    fn generate_text(&self, prompt: &str) -> Result<String> {
        let transcript_text = prompt
            .rsplit_once(TRANSCRIPT_HEADING)
            .map(|(_, tail)| tail)
            .unwrap_or(prompt);
        let turns = Transcript::new(transcript_text)
            .map(|transcript| transcript.turns())
            .unwrap_or_default();
        let count_for = |speaker: &str| {
            turns
                .iter()
                .filter(|turn| turn.speaker.eq_ignore_ascii_case(speaker))
                .count()
        };

        let reflection = json!({
            "summary": format!(
                "Amy and Jay shared a {}-line call, with Amy speaking {} times and Jay {} times as they caught up and kept each other close.",
                turns.len(),
                count_for("Amy"),
                count_for("Jay"),
            ),
            "lovely_message": "Every call is another thread tying your two hearts together.",
            "amy_feedback": "Amy, you could share one small detail from your day that made you smile.",
            "jay_feedback": "Jay, try asking Amy a follow-up question about what she mentions first.",
        });
        Ok(format!(
            "Here is the reflection for this call:\n```json\n{}\n```",
            serde_json::to_string_pretty(&reflection)?
        ))
    }
}

impl ImageGenerator for DryrunProvider {
    fn generate_image(&self, prompt: &str) -> Result<RawImageResponse> {
        let png = render_noise_png(prompt)?;
        Ok(RawImageResponse::new(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Dryrun collage" },
                        { "inlineData": { "mimeType": "image/png", "data": BASE64.encode(png) } }
                    ]
                },
                "finishReason": "STOP"
            }]
        })))
    }
}

/// Prompt-seeded noise so every prompt gets a stable, non-trivial PNG.
fn render_noise_png(prompt: &str) -> Result<Vec<u8>> {
    let digest = Sha256::digest(prompt.as_bytes());
    let mut state = digest
        .iter()
        .take(8)
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
        | 1;

    let mut image = RgbImage::new(DRYRUN_IMAGE_SIZE, DRYRUN_IMAGE_SIZE);
    for pixel in image.pixels_mut() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let bytes = state.to_be_bytes();
        *pixel = Rgb([bytes[0], bytes[1], bytes[2]]);
    }

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("failed to encode dryrun collage")?;
    Ok(png)
}
