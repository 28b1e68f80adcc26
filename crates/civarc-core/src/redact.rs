//! Redaction of credentials in log output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Replacement for redacted secret values.
pub const SECRET_PLACEHOLDER: &str = "HIDDEN_SECRET";

static TOKEN_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"token=[^&\s"]+"#).expect("token pattern is valid"));

/// Replace the value of every `token=<value>` fragment with the placeholder.
pub fn redact_secrets(line: &str) -> Cow<'_, str> {
    TOKEN_PARAM.replace_all(line, format!("token={SECRET_PLACEHOLDER}").as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_in_query_string_is_hidden() {
        let line = "GET https://civitai.com/api/v1/models?limit=10&token=ABC123&page=2";
        let redacted = redact_secrets(line);
        assert_eq!(
            redacted,
            "GET https://civitai.com/api/v1/models?limit=10&token=HIDDEN_SECRET&page=2"
        );
        assert!(!redacted.contains("ABC123"));
    }

    #[test]
    fn test_every_occurrence_is_hidden() {
        let line = "a?token=one b?x=1&token=two";
        let redacted = redact_secrets(line);
        assert!(!redacted.contains("one"));
        assert!(!redacted.contains("two"));
    }

    #[test]
    fn test_quoted_field_keeps_closing_quote() {
        let line = r#"INFO Downloading url="https://x/y?token=ABC123" next=1"#;
        assert_eq!(
            redact_secrets(line),
            r#"INFO Downloading url="https://x/y?token=HIDDEN_SECRET" next=1"#
        );
    }

    #[test]
    fn test_lines_without_token_are_borrowed() {
        let line = "downloaded https://civitai.com/api/download/models/1";
        assert!(matches!(redact_secrets(line), Cow::Borrowed(_)));
    }
}
