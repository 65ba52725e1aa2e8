use crate::collage::EncodedImage;
use crate::error::MemoryError;
use crate::reflection::MemoryEntry;
use crate::transcript::Transcript;

/// One memory session: the transcript plus whatever reflection and collage
/// have been accepted for it so far.
///
/// Entries and images are only ever replaced wholesale with values that were
/// already validated, so every observable state is fully valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    transcript: Option<Transcript>,
    entry: Option<MemoryEntry>,
    image: Option<EncodedImage>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_transcript(&mut self, text: &str) -> Result<(), MemoryError> {
        self.transcript = Some(Transcript::new(text)?);
        Ok(())
    }

    pub fn apply_manual_entry(
        &mut self,
        summary: &str,
        lovely_message: &str,
        amy_feedback: &str,
        jay_feedback: &str,
    ) -> Result<&MemoryEntry, MemoryError> {
        let entry = MemoryEntry::manual(summary, lovely_message, amy_feedback, jay_feedback)?;
        Ok(self.entry.insert(entry))
    }

    pub fn apply_manual_image(&mut self, elements: &[String]) -> Result<&EncodedImage, MemoryError> {
        let image = EncodedImage::manual_placeholder(elements)?;
        Ok(self.image.insert(image))
    }

    pub fn apply_validated_entry(&mut self, entry: MemoryEntry) {
        self.entry = Some(entry);
    }

    pub fn apply_validated_image(&mut self, image: EncodedImage) {
        self.image = Some(image);
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    pub fn entry(&self) -> Option<&MemoryEntry> {
        self.entry.as_ref()
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MemoryError;

    use super::MemoryStore;

    #[test]
    fn empty_transcript_leaves_previous_one_in_place() {
        let mut store = MemoryStore::new();
        store.load_transcript("Amy: Hi\nJay: Hey").unwrap();
        assert!(matches!(
            store.load_transcript("   "),
            Err(MemoryError::Input(_))
        ));
        assert_eq!(
            store.transcript().map(|t| t.text()),
            Some("Amy: Hi\nJay: Hey")
        );
    }

    #[test]
    fn manual_entry_round_trips_trimmed_inputs() {
        let mut store = MemoryStore::new();
        store
            .apply_manual_entry(" short ", " love ", " be kind ", " listen ")
            .unwrap();
        let entry = store.entry().unwrap();
        assert_eq!(entry.summary(), "short");
        assert_eq!(entry.lovely_message(), "love");
        assert_eq!(entry.amy_feedback(), "be kind");
        assert_eq!(entry.jay_feedback(), "listen");
        assert_eq!(store.entry(), store.entry());
    }

    #[test]
    fn rejected_manual_input_does_not_touch_state() {
        let mut store = MemoryStore::new();
        store.apply_manual_entry("a", "b", "c", "d").unwrap();
        store.apply_manual_image(&["hearts".to_string()]).unwrap();
        let before = store.clone();

        assert!(store.apply_manual_entry("a", "", "c", "d").is_err());
        assert!(store.apply_manual_image(&[]).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn fresh_store_reports_nothing() {
        let store = MemoryStore::new();
        assert!(store.transcript().is_none());
        assert!(store.entry().is_none());
        assert!(store.image().is_none());
    }
}
