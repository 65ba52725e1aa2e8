use crate::error::MemoryError;

/// Raw call transcript. Guaranteed non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTurn {
    pub speaker: String,
    pub utterance: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Result<Self, MemoryError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MemoryError::Input(
                "transcript text cannot be empty".to_string(),
            ));
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Splits `speaker: utterance` lines. Lines without a colon are attributed to `Unknown`.
    pub fn turns(&self) -> Vec<TranscriptTurn> {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(':') {
                Some((speaker, utterance)) => TranscriptTurn {
                    speaker: speaker.trim().to_string(),
                    utterance: utterance.trim().to_string(),
                },
                None => TranscriptTurn {
                    speaker: "Unknown".to_string(),
                    utterance: line.to_string(),
                },
            })
            .collect()
    }

    pub fn speakers(&self) -> Vec<String> {
        let mut speakers: Vec<String> = Vec::new();
        for turn in self.turns() {
            if !speakers.contains(&turn.speaker) {
                speakers.push(turn.speaker);
            }
        }
        speakers
    }
}
