//! Fixed instruction text and prompt assembly.

use crate::handler::request::Snippet;

/// Persona, behaviour rules and escalation policy sent as the system turn.
pub const SYSTEM_PROMPT: &str = "\
You are Kozani, a warm and empathetic companion for people who are pregnant, \
have recently given birth, or are caring for a newborn.

How you respond:
- Be warm and kind. Gently reflect back what the person has shared so they feel heard.
- Give practical guidance in plain, everyday language.
- Encourage the person to talk with a midwife, nurse, doctor or community health worker about their concerns.
- Never judge, shame or blame the person for how they feel or what they have done.

What you must never do:
- Do not diagnose any condition.
- Do not give medication doses or treatment instructions.
- Do not contradict the advice of the person's local health professionals.

Danger signs:
If the person mentions any danger sign, such as severe pain, heavy bleeding, difficulty \
breathing, or thoughts of harming themselves or their baby, tell them clearly and kindly \
to seek urgent in-person care right away at the nearest clinic or hospital, or to call \
their local emergency number.

Style:
Answer in 4 to 7 sentences. Use plain language and validate the person's feelings.";

/// Introduces caller-supplied grounding text.
pub const GROUNDING_HEADER: &str = "\
Background information (for context only; do not quote it verbatim, use it only to \
inform your answer):";

/// Joins snippet texts in supplied order, separated by a blank line.
///
/// Blank snippets are skipped.
pub fn grounding_block(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .map(Snippet::text)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Returns the system prompt with the grounding block appended.
pub fn system_prompt(grounding: &str) -> String {
    if grounding.is_empty() {
        return SYSTEM_PROMPT.to_owned();
    }

    format!("{SYSTEM_PROMPT}\n\n{GROUNDING_HEADER}\n{grounding}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_preserves_order() {
        let snippets = [
            Snippet::Text("first".to_owned()),
            Snippet::Passage {
                text: "second".to_owned(),
                source: None,
            },
        ];
        assert_eq!(grounding_block(&snippets), "first\n\nsecond");
        assert_eq!(grounding_block(&[]), "");
    }

    #[test]
    fn blank_snippets_are_skipped() {
        let blanks = [Snippet::Text(String::new()), Snippet::Text("  \n".to_owned())];
        assert_eq!(grounding_block(&blanks), "");
        assert_eq!(system_prompt(&grounding_block(&blanks)), SYSTEM_PROMPT);

        let mixed = [
            Snippet::Text(String::new()),
            Snippet::Text("Rest often.".to_owned()),
            Snippet::Text(String::new()),
        ];
        assert_eq!(grounding_block(&mixed), "Rest often.");
    }

    #[test]
    fn empty_grounding_has_no_header() {
        assert_eq!(system_prompt(""), SYSTEM_PROMPT);
    }

    #[test]
    fn grounding_is_appended_after_instructions() {
        let prompt = system_prompt("Rest when the baby sleeps.");
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.ends_with("Rest when the baby sleeps."));
        assert!(prompt.contains(GROUNDING_HEADER));
    }

    #[test]
    fn instructions_carry_escalation() {
        assert!(SYSTEM_PROMPT.contains("heavy bleeding"));
        assert!(SYSTEM_PROMPT.contains("urgent in-person care"));
    }
}
