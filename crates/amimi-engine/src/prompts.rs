use amimi_contracts::transcript::Transcript;

pub(crate) const TRANSCRIPT_HEADING: &str = "Transcript:";

pub fn reflection_prompt(transcript: &Transcript) -> String {
    format!(
        "You are Amimi, a warm companion for a long-distance couple, Amy and Jay.\n\
Read the phone call transcript below and reflect on it.\n\
\n\
1. Summarize in detail what Amy and Jay talked about and how the call flowed.\n\
2. Write one short, loving sentence about their conversation.\n\
3. Offer one gentle, constructive suggestion for Amy and one for Jay that could bring them closer in future calls.\n\
Keep the tone kind and supportive throughout.\n\
\n\
Respond with JSON only, using exactly these keys:\n\
- \"summary\": a detailed but concise description of the conversation\n\
- \"lovely_message\": a heartfelt one-sentence reflection\n\
- \"amy_feedback\": a constructive suggestion for Amy\n\
- \"jay_feedback\": a constructive suggestion for Jay\n\
\n\
{TRANSCRIPT_HEADING}\n{}",
        transcript.text()
    )
}

pub fn collage_prompt(summary: &str) -> String {
    format!(
        "Create a cozy collage illustration in charming pixel art style celebrating a \
long-distance couple's recent phone call. Show Amy and Jay as cute pixel characters \
connected across the scene by pixel hearts or glowing lines. Surround them with small \
pixel icons for the key moments of their conversation, arranged playfully so the \
collage feels warm, nostalgic and story-like.\n\
\n\
Conversation summary:\n{summary}"
    )
}

#[cfg(test)]
mod tests {
    use amimi_contracts::transcript::Transcript;

    use super::{collage_prompt, reflection_prompt, TRANSCRIPT_HEADING};

    #[test]
    fn reflection_prompt_ends_with_the_transcript() {
        let transcript = Transcript::new("Amy: Hi\nJay: Hey").unwrap();
        let prompt = reflection_prompt(&transcript);
        assert!(prompt.ends_with(&format!("{TRANSCRIPT_HEADING}\nAmy: Hi\nJay: Hey")));
        for key in ["summary", "lovely_message", "amy_feedback", "jay_feedback"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "prompt missing {key}");
        }
    }

    #[test]
    fn collage_prompt_carries_the_summary() {
        let prompt = collage_prompt("They planned a picnic.");
        assert!(prompt.ends_with("Conversation summary:\nThey planned a picnic."));
    }
}
