use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::Value;

/// Entity tails recognized after a `&`. Matching is exact and case-sensitive.
const ENTITY_TAILS: [&str; 5] = ["lt;", "gt;", "amp;", "quot;", "apos;"];

static AMPERSAND: Lazy<Regex> =
    Lazy::new(|| Regex::new("&(lt;|gt;|amp;|quot;|apos;)?").expect("ampersand pattern is valid"));

/// Returns true when `text` begins with one of the five known entity references.
pub fn starts_entity(text: &str) -> bool {
    text.strip_prefix('&')
        .is_some_and(|rest| ENTITY_TAILS.iter().any(|tail| rest.starts_with(tail)))
}

/// Escapes XML-reserved characters, leaving well-formed entity references intact.
pub fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for (position, character) in input.char_indices() {
        match character {
            '&' if starts_entity(&input[position..]) => output.push('&'),
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&apos;"),
            other => output.push(other),
        }
    }

    output
}

/// Same contract as [`escape`], expressed as ordered whole-string substitutions.
///
/// Bare ampersands have to be neutralized first, otherwise the `&` introduced
/// by the later replacements would be escaped again.
pub fn escape_with_patterns(input: &str) -> String {
    AMPERSAND
        .replace_all(input, |captures: &Captures| match captures.get(1) {
            Some(_) => captures[0].to_string(),
            None => "&amp;".to_string(),
        })
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn escape_optional(input: Option<&str>) -> Option<String> {
    input.map(escape)
}

/// Escapes the canonical textual form of a typed value.
pub fn escape_value(value: Option<&Value>) -> Option<String> {
    value.map(|value| match value {
        Value::Text(text) => escape(text),
        other => escape(&other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_escape_bare_ampersand() {
        assert_eq!(escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_escape_preserves_existing_entities() {
        assert_eq!(escape("a &amp; b"), "a &amp; b");
        assert_eq!(
            escape("&lt;&gt;&amp;&quot;&apos;"),
            "&lt;&gt;&amp;&quot;&apos;"
        );
    }

    #[test]
    fn test_escape_markup_and_quotes() {
        assert_eq!(
            escape("<tag>'\"'</tag>"),
            "&lt;tag&gt;&apos;&quot;&apos;&lt;/tag&gt;"
        );
    }

    #[test]
    fn test_escape_trailing_ampersand() {
        assert_eq!(escape("&"), "&amp;");
        assert_eq!(escape("fish &"), "fish &amp;");
    }

    #[test]
    fn test_escape_partial_entities() {
        assert_eq!(escape("&quot"), "&amp;quot");
        assert_eq!(escape("&ampz;"), "&amp;ampz;");
        assert_eq!(escape("&am"), "&amp;am");
        assert_eq!(escape("&ap;"), "&amp;ap;");
        assert_eq!(escape("&apos"), "&amp;apos");
        assert_eq!(escape("&Amp;"), "&amp;Amp;");
        assert_eq!(escape("&#38;"), "&amp;#38;");
        assert_eq!(escape("&nbsp;"), "&amp;nbsp;");
    }

    #[test]
    fn test_escape_apos_and_amp_share_prefix() {
        assert_eq!(escape("&apos;&amp;&a"), "&apos;&amp;&amp;a");
    }

    #[test]
    fn test_escape_keeps_non_ascii() {
        assert_eq!(escape("caf\u{e9} & cr\u{e8}me"), "caf\u{e9} &amp; cr\u{e8}me");
        assert_eq!(escape("\u{1F600}<"), "\u{1F600}&lt;");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape(""), "");
        assert_eq!(escape_with_patterns(""), "");
    }

    #[test]
    fn test_escape_optional_absent() {
        assert_eq!(escape_optional(None), None);
        assert_eq!(escape_optional(Some("")), Some(String::new()));
        assert_eq!(escape_optional(Some("<")), Some("&lt;".to_string()));
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value(None), None);
        assert_eq!(escape_value(Some(&Value::from(12))), Some("12".to_string()));
        assert_eq!(escape_value(Some(&Value::from(true))), Some("true".to_string()));
        assert_eq!(escape_value(Some(&Value::from(0.5))), Some("0.5".to_string()));
        assert_eq!(
            escape_value(Some(&Value::from("R&D"))),
            Some("R&amp;D".to_string())
        );
    }

    #[test]
    fn test_starts_entity() {
        assert!(starts_entity("&amp;rest"));
        assert!(starts_entity("&apos;"));
        assert!(!starts_entity("&apos"));
        assert!(!starts_entity("amp;"));
        assert!(!starts_entity(""));
    }

    #[test]
    fn test_patterns_match_scan_on_examples() {
        for input in [
            "a & b",
            "a &amp; b",
            "<tag>'\"'</tag>",
            "&",
            "&&amp;&",
            "&quot",
            "&ampz;",
            "&amp;lt;",
        ] {
            assert_eq!(escape_with_patterns(input), escape(input), "input: {input:?}");
        }
    }

    static FRAGMENTS: &[&str] = &[
        "&", "<", ">", "\"", "'", ";", "&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "amp",
        "quot", "apos", "lt", "gt",
    ];

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => prop::sample::select(FRAGMENTS).prop_map(|fragment| fragment.to_string()),
            1 => "[a-zA-Z0-9 ]{0,4}",
            1 => "\\PC{0,3}",
        ]
    }

    fn entity_heavy_text() -> impl Strategy<Value = String> {
        prop::collection::vec(fragment(), 0..24).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_formulations_agree(input in entity_heavy_text()) {
            prop_assert_eq!(escape_with_patterns(&input), escape(&input));
        }

        #[test]
        fn prop_formulations_agree_on_any_text(input in "\\PC*") {
            prop_assert_eq!(escape_with_patterns(&input), escape(&input));
        }

        #[test]
        fn prop_plain_text_is_unchanged(input in "[^&<>\"']*") {
            prop_assert_eq!(escape(&input), input);
        }

        #[test]
        fn prop_output_is_xml_safe(input in entity_heavy_text()) {
            let output = escape(&input);
            prop_assert!(!output.contains(['<', '>', '"', '\'']));
            for (position, _) in output.match_indices('&') {
                prop_assert!(starts_entity(&output[position..]));
            }
        }

        #[test]
        fn prop_escape_is_idempotent(input in entity_heavy_text()) {
            let once = escape(&input);
            prop_assert_eq!(escape(&once), once.clone());
        }
    }
}
