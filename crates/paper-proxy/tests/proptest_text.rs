//! Property-based tests for text normalization and lenient parsing.

use proptest::prelude::*;
use paper_proxy::models::SearchParams;
use paper_proxy::sources::{clean_pdf_text, parse_feed, parse_medline};
use paper_proxy::text::{normalize, truncate_chars};
use paper_proxy::xml::XmlDocument;

proptest! {
    /// Normalized text has no leading, trailing or doubled whitespace.
    #[test]
    fn normalize_collapses_whitespace(input in "[ \t\r\na-zé]{0,200}") {
        let out = normalize(&input);
        prop_assert_eq!(out.trim(), out.as_str());
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains(['\t', '\r', '\n']));
    }

    /// Normalizing twice changes nothing.
    #[test]
    fn normalize_is_idempotent(input in "\\PC{0,200}") {
        let once = normalize(&input);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Truncation never splits a character and respects the cap.
    #[test]
    fn truncate_respects_char_boundaries(input in "\\PC{0,100}", max in 0usize..120) {
        let out = truncate_chars(&input, max);
        prop_assert!(out.chars().count() <= max);
        prop_assert!(input.starts_with(&out));
    }

    /// PDF text cleanup is normalized and capped.
    #[test]
    fn clean_pdf_text_is_normalized(input in "[ \na-z]{0,300}") {
        let out = clean_pdf_text(&input);
        prop_assert_eq!(normalize(&out), out);
    }

    /// Arbitrary input never panics the lenient parsers.
    #[test]
    fn parsers_never_panic(input in "\\PC{0,300}") {
        let _ = XmlDocument::parse(&input);
        let _ = parse_feed(&input);
        let _ = parse_medline(&input);
    }

    /// Tag soup never panics and keeps every element it opened.
    #[test]
    fn xml_tag_soup(parts in proptest::collection::vec(prop_oneof![
        Just("<a>"), Just("</a>"), Just("<b>"), Just("</b>"), Just("text"), Just("&amp;"), Just("<c/>"),
    ], 0..40)) {
        let doc = XmlDocument::parse(&parts.concat());
        let _ = doc.find_all("a").count();
        prop_assert!(doc.element_count() <= parts.len() + 1);
    }

    /// Queries of at least three characters within range validate.
    #[test]
    fn search_params_accept_valid(query in "[a-z]{3,40}", max in 1i64..=20) {
        let validated = SearchParams { query: query.clone(), max_results: max }.validate().unwrap();
        prop_assert_eq!(validated.query, query);
        prop_assert_eq!(validated.max_results as i64, max);
    }

    /// Out-of-range result counts are rejected.
    #[test]
    fn search_params_reject_out_of_range(max in prop_oneof![i64::MIN..1, 21i64..i64::MAX]) {
        let params = SearchParams { query: "valid".to_string(), max_results: max };
        prop_assert!(params.validate().is_err());
    }
}
