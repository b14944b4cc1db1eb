#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Property tests: every field policy is idempotent and leaves no markup,
//! dangerous protocols or event handlers behind.

use cadence_security::*;
use proptest::prelude::*;
use regex::Regex;

/// Inputs assembled from markup fragments, attack tokens and filler text so
/// that interesting interleavings show up quickly.
fn hostile_text() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        Just("<".to_string()),
        Just(">".to_string()),
        Just("</".to_string()),
        Just("<!--".to_string()),
        Just("-->".to_string()),
        Just("<script>".to_string()),
        Just("</script>".to_string()),
        Just("< script >".to_string()),
        Just("<style>".to_string()),
        Just("<iframe src=x>".to_string()),
        Just("<img src=x onerror=alert(1)>".to_string()),
        Just("javascript:".to_string()),
        Just("java".to_string()),
        Just("script:".to_string()),
        Just("data:".to_string()),
        Just("on".to_string()),
        Just("click=".to_string()),
        Just("onload=".to_string()),
        Just("document.cookie".to_string()),
        Just("docu".to_string()),
        Just("ment".to_string()),
        Just("expression(".to_string()),
        Just("&amp;".to_string()),
        Just("&".to_string()),
        Just("\u{200B}".to_string()),
        Just("\u{202E}".to_string()),
        Just("\u{0301}".to_string()),
        Just("\r\n".to_string()),
        Just("\n\n\n".to_string()),
        Just("\t".to_string()),
        Just("  ".to_string()),
        "[a-zA-Z0-9 ._=/:-]{1,6}",
        "\\PC{1,3}",
    ];
    prop::collection::vec(token, 0..24).prop_map(|parts| parts.concat())
}

fn tag_re() -> Regex {
    Regex::new(r"<[^>]*>").unwrap()
}

fn protocol_re() -> Regex {
    Regex::new(r"(?i)(?:javascript|vbscript|\bdata|\bfile)\s*:").unwrap()
}

fn handler_re() -> Regex {
    Regex::new(r"(?i)on\w+\s*=").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_display_name_idempotent(input in hostile_text()) {
        let once = sanitize_display_name(&input);
        prop_assert_eq!(sanitize_display_name(&once), once);
    }

    #[test]
    fn test_bio_idempotent(input in hostile_text()) {
        let once = sanitize_bio(&input);
        prop_assert_eq!(sanitize_bio(&once), once);
    }

    #[test]
    fn test_username_idempotent_and_restricted(input in hostile_text()) {
        let once = sanitize_username(&input);
        let allowed = Regex::new(r"^[A-Za-z0-9_.-]*$").unwrap();
        prop_assert!(allowed.is_match(&once), "{:?}", once);
        prop_assert_eq!(sanitize_username(&once), once);
    }

    #[test]
    fn test_email_idempotent(input in hostile_text()) {
        let once = sanitize_email(&input);
        prop_assert!(!once.chars().any(char::is_whitespace));
        prop_assert_eq!(sanitize_email(&once), once);
    }

    #[test]
    fn test_generic_output_is_inert(input in hostile_text()) {
        let out = sanitize_text(&input, &SanitizeOptions::default());
        prop_assert!(!out.contains('<') && !out.contains('>'), "{:?}", out);
        prop_assert!(!protocol_re().is_match(&out), "{:?}", out);
        prop_assert!(!handler_re().is_match(&out), "{:?}", out);
        prop_assert!(check_dangerous_content(&out).is_safe, "{:?}", out);
    }

    #[test]
    fn test_strip_html_tags_leaves_no_tag(input in hostile_text()) {
        let out = strip_html_tags(&input);
        prop_assert!(!tag_re().is_match(&out), "{:?}", out);
    }

    #[test]
    fn test_remove_dangerous_leaves_no_tag(input in hostile_text()) {
        let out = remove_dangerous_chars(&input);
        prop_assert!(!tag_re().is_match(&out), "{:?}", out);
        prop_assert!(!protocol_re().is_match(&out), "{:?}", out);
        prop_assert!(!handler_re().is_match(&out), "{:?}", out);
    }

    #[test]
    fn test_url_output_is_safe(input in hostile_text()) {
        if let Some(url) = sanitize_url(&input) {
            prop_assert!(!url.contains('<') && !url.contains('>'), "{:?}", url);
            prop_assert!(!protocol_re().is_match(&url), "{:?}", url);
            prop_assert!(!handler_re().is_match(&url), "{:?}", url);
            prop_assert!(
                url.starts_with("http://")
                    || url.starts_with("https://")
                    || url.starts_with('/')
                    || url.starts_with("./"),
                "{:?}",
                url
            );
            prop_assert_eq!(sanitize_url(&url), Some(url.clone()));
        }
    }

    #[test]
    fn test_url_with_prefix_accepted(path in "[a-z0-9/_-]{0,20}") {
        let url = sanitize_url(&format!("https://example.com/{path}"));
        prop_assert!(url.is_some());
    }
}
