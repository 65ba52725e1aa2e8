use std::fmt::Write as _;

use super::MemoryStore;

/// Plain-text rendering of the current memory for terminals and logs.
pub fn render_memory(store: &MemoryStore) -> String {
    let mut out = String::from("Couple Memory\n=============\n");

    match store.entry() {
        Some(entry) => {
            let sections = [
                ("Summary", entry.summary()),
                ("Lovely Message", entry.lovely_message()),
                ("Feedback for Amy", entry.amy_feedback()),
                ("Feedback for Jay", entry.jay_feedback()),
            ];
            for (title, body) in sections {
                let _ = write!(out, "\n{title}:\n{body}\n");
            }
        }
        None => out.push_str("\nNo memory entry created yet\n"),
    }

    match store.image() {
        Some(image) => {
            let _ = write!(
                out,
                "\nCollage Image:\nFormat: {}\nSize: {} bytes\n",
                image.format(),
                image.content().len()
            );
            if let Some(description) = image.description() {
                let _ = writeln!(out, "Elements: {description}");
            }
        }
        None => out.push_str("\nNo collage image generated yet\n"),
    }
    out
}
