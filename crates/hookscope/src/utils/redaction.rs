use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

pub const REDACTION_TOKEN: &str = "[REDACTED]";

struct RedactionMatcher {
    class_name: &'static str,
    regex: fn() -> &'static Regex,
    replacement: for<'a> fn(&Captures<'a>) -> String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedText {
    pub text: String,
    pub redaction_classes: Vec<String>,
}

impl RedactedText {
    #[must_use]
    pub fn pii_redacted(&self) -> bool {
        !self.redaction_classes.is_empty()
    }
}

/// Masks tokens in links, email addresses, and phone numbers in free text such
/// as message bodies and comments.
#[must_use]
pub fn redact_text(value: &str) -> RedactedText {
    let mut classes = BTreeSet::new();
    let mut redacted = value.to_string();

    for matcher in redaction_matcher_catalog() {
        let replaced = (matcher.regex)()
            .replace_all(&redacted, |captures: &Captures<'_>| {
                (matcher.replacement)(captures)
            })
            .to_string();
        if replaced != redacted {
            classes.insert(matcher.class_name.to_string());
            redacted = replaced;
        }
    }

    RedactedText {
        text: redacted,
        redaction_classes: classes.into_iter().collect(),
    }
}

#[must_use]
pub fn redaction_catalog_classes() -> Vec<&'static str> {
    redaction_matcher_catalog()
        .iter()
        .map(|matcher| matcher.class_name)
        .collect()
}

fn url_query_token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)([?&](?:access_token|token|api_key)=)([^&\s]+)")
            .expect("url query token regex should compile")
    })
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}\b")
            .expect("email regex should compile")
    })
}

fn phone_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\+?\d[\d\-\(\) ]{8,}\d\b").expect("phone regex should compile")
    })
}

fn replace_with_redaction(_captures: &Captures<'_>) -> String {
    REDACTION_TOKEN.to_string()
}

fn replace_url_query_token(captures: &Captures<'_>) -> String {
    format!("{}{}", &captures[1], REDACTION_TOKEN)
}

fn redaction_matcher_catalog() -> &'static [RedactionMatcher] {
    static CATALOG: OnceLock<Vec<RedactionMatcher>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            RedactionMatcher {
                class_name: "url_query_token",
                regex: url_query_token_regex,
                replacement: replace_url_query_token,
            },
            RedactionMatcher {
                class_name: "email",
                regex: email_regex,
                replacement: replace_with_redaction,
            },
            RedactionMatcher {
                class_name: "phone",
                regex: phone_regex,
                replacement: replace_with_redaction,
            },
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::{REDACTION_TOKEN, redact_text, redaction_catalog_classes};

    #[test]
    fn redacts_contact_details_and_tracks_classes() {
        let result = redact_text("write to alpha@example.com or call +1 (555) 123-4567");

        assert!(result.pii_redacted());
        assert!(!result.text.contains("alpha@example.com"));
        assert!(!result.text.contains("123-4567"));
        assert_eq!(
            result.redaction_classes,
            vec!["email".to_string(), "phone".to_string()]
        );
    }

    #[test]
    fn keeps_the_query_key_of_token_links() {
        let result = redact_text("see https://example.com/cb?access_token=EAAB123&x=1");
        assert_eq!(
            result.text,
            format!("see https://example.com/cb?access_token={REDACTION_TOKEN}&x=1")
        );
        assert_eq!(result.redaction_classes, vec!["url_query_token".to_string()]);
    }

    #[test]
    fn plain_text_is_untouched() {
        let result = redact_text("hello, is the shop open today?");
        assert!(!result.pii_redacted());
        assert_eq!(result.text, "hello, is the shop open today?");
    }

    #[test]
    fn exposes_catalog_classes_in_deterministic_order() {
        assert_eq!(
            redaction_catalog_classes(),
            vec!["url_query_token", "email", "phone"]
        );
    }
}
