use std::sync::LazyLock;

use regex::Regex;
use symptom_match::reference::parse_list_literal;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("Invalid regex"));

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]+|\d+[.)])\s*").expect("Invalid regex"));

/// Remove reasoning blocks emitted by reasoning models.
pub fn strip_reasoning(response: &str) -> &str {
    // An unmatched closing tag means the opening one was cut off upstream.
    match response.rfind("</think>") {
        Some(end) if !response[..end].contains("<think>") => &response[end + "</think>".len()..],
        _ => response,
    }
}

/// Turn a raw model reply into symptom labels.
///
/// Accepts a JSON array, a quoted list literal, or one label per line.
/// Labels are trimmed but otherwise kept as written.
pub fn parse_symptoms(response: &str) -> Vec<String> {
    let without_blocks = THINK_BLOCK.replace_all(response, "");
    let cleaned: String = strip_reasoning(&without_blocks)
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = cleaned.trim();

    if let (Some(start), Some(end)) = (cleaned.find('['), cleaned.rfind(']')) {
        if start < end {
            let segment = &cleaned[start..=end];
            return match serde_json::from_str::<Vec<String>>(segment) {
                Ok(items) => items
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                Err(_) => parse_list_literal(&segment[1..segment.len() - 1]),
            };
        }
    }

    cleaned
        .lines()
        .map(|line| LIST_MARKER.replace(line.trim(), "").trim().to_string())
        .map(|line| line.trim_matches(|c| c == '\'' || c == '"' || c == ',').to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_python_style_list() {
        assert_eq!(
            parse_symptoms(r#"['high_fever', 'headache',"vomiting"]"#),
            vec!["high_fever", "headache", "vomiting"]
        );
    }

    #[test]
    fn parses_json_array_inside_prose() {
        assert_eq!(
            parse_symptoms("Here you go: [\"cough\", \"fatigue\"] hope that helps"),
            vec!["cough", "fatigue"]
        );
    }

    #[test]
    fn drops_think_blocks() {
        let reply = "<think>\nThe user says [fever]? maybe chills\n</think>\n['chills']";
        assert_eq!(parse_symptoms(reply), vec!["chills"]);
    }

    #[test]
    fn drops_text_before_orphan_closing_tag() {
        let reply = "thinking about ['itching'] ... </think>['skin_rash']";
        assert_eq!(parse_symptoms(reply), vec!["skin_rash"]);
    }

    #[test]
    fn strips_code_fences() {
        let reply = "```json\n[\"nausea\"]\n```";
        assert_eq!(parse_symptoms(reply), vec!["nausea"]);
    }

    #[test]
    fn falls_back_to_one_label_per_line() {
        let reply = "high_fever\n- headache\n2. cold_hands_and_feets\n\n";
        assert_eq!(
            parse_symptoms(reply),
            vec!["high_fever", "headache", "cold_hands_and_feets"]
        );
    }

    #[test]
    fn empty_list_and_empty_reply_give_nothing() {
        assert!(parse_symptoms("[]").is_empty());
        assert!(parse_symptoms("").is_empty());
        assert!(parse_symptoms("<think>nothing here</think>").is_empty());
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(parse_symptoms("['Fever']"), vec!["Fever"]);
    }
}
