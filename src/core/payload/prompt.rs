//! Prompt construction for combination generation

use crate::domain::{PhysiologyCode, Triad};

/// System prompt sent with every generation request
pub const SYSTEM_PROMPT: &str = "You are given three physiology items (RAH IDs) with their base profiles. \
Return a single JSON object and nothing else, with exactly this shape:\n\
{\n\
  \"combination\": \"concise title (<=140 chars) naming the overlapping systems\",\n\
  \"analysis\": \"1-2 neutral sentences describing likely shared dysfunction\",\n\
  \"potential_indications\": {\n\
    \"Physical\": [\"short YES/NO question\", \"...\"],\n\
    \"Psychological/Emotional\": [\"...\"],\n\
    \"Functional\": [\"...\"]\n\
  },\n\
  \"recommendations\": [\"5-8 short rebalancing bullets covering diet, lifestyle, stress and follow-up\"]\n\
}\n\
Produce 8-12 indication items in total, avoid duplication, keep items short and specific.";

const MISSING_PROFILE: &str = "(no base profile available)";
const CLOSING_INSTRUCTION: &str = "Return JSON now.";

/// Renders one code's context block
fn context_block(code: &PhysiologyCode, profile: &str) -> String {
    let heading = match code.label() {
        Some(label) => format!("RAH {code} ({label}) – Base Profile:"),
        None => format!("RAH {code} – Base Profile:"),
    };
    let profile = profile.trim();
    let body = if profile.is_empty() {
        MISSING_PROFILE
    } else {
        profile
    };
    format!("{heading}\n{body}")
}

/// Builds the combined context for a triad
///
/// `profiles` must be in the triad's canonical order.
pub fn build_context(triad: &Triad, profiles: &[String; 3]) -> String {
    triad
        .codes()
        .iter()
        .zip(profiles.iter())
        .map(|(code, profile)| context_block(code, profile))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the user prompt from a prepared context
pub fn build_user_prompt(context: &str) -> String {
    format!("{context}\n\n{CLOSING_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_follows_canonical_order_with_labels() {
        let triad = Triad::normalize(&[76.0, 30.0, 50.0]).unwrap();
        let profiles = [
            "Cell profile".to_string(),
            "  ".to_string(),
            "Teeth profile".to_string(),
        ];

        let context = build_context(&triad, &profiles);

        let cells = context.find("RAH 30.00 (Cells & tissue)").unwrap();
        let metabolism = context.find("RAH 50.00 (Metabolism)").unwrap();
        let teeth = context.find("RAH 76.00 (Teeth (overall))").unwrap();
        assert!(cells < metabolism && metabolism < teeth);
        assert!(context.contains("Cell profile"));
        assert!(context.contains(MISSING_PROFILE));
    }

    #[test]
    fn test_unknown_code_has_no_label() {
        let triad = Triad::normalize(&[31.0, 50.0, 76.0]).unwrap();
        let profiles = [String::new(), String::new(), String::new()];

        let context = build_context(&triad, &profiles);
        assert!(context.starts_with("RAH 31.00 – Base Profile:"));
    }

    #[test]
    fn test_user_prompt_ends_with_instruction() {
        let prompt = build_user_prompt("ctx");
        assert!(prompt.starts_with("ctx"));
        assert!(prompt.ends_with("Return JSON now."));
    }
}
