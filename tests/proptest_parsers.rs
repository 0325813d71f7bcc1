//! Property-based tests for SBOM parsers.
//!
//! Ensures the SPDX decoders and the graph builder don't panic on arbitrary
//! input, including random strings, JSON-like fragments and tag-value lines.

use proptest::prelude::*;
use sca_core::parsers::{detect_format, parse_sbom_str};

proptest! {
    // 500 cases balances coverage vs speed for parser fuzz tests.
    // Parser tests only assert no-panic, since random input is expected to
    // produce Err in almost all cases.
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn parse_sbom_str_doesnt_panic(s in "\\PC{0,2000}") {
        let result = parse_sbom_str(&s);
        prop_assert!(result.is_err(), "Random input should not parse successfully: {:?}", s);
    }

    #[test]
    fn detect_format_doesnt_panic(s in "\\PC{0,2000}") {
        let _ = detect_format(&s);
    }

    #[test]
    fn json_like_input_doesnt_panic(
        s in prop::string::string_regex(r#"\{[^\}]{0,500}\}"#).unwrap()
    ) {
        let _ = parse_sbom_str(&s);
    }

    #[test]
    fn spdx_tag_value_like_doesnt_panic(
        key in "[A-Za-z]{1,20}",
        value in "\\PC{0,100}",
    ) {
        let input = format!("SPDXVersion: SPDX-2.3\n{}: {}", key, value);
        let _ = parse_sbom_str(&input);
        let _ = detect_format(&input);
    }

    #[test]
    fn empty_and_whitespace_doesnt_panic(s in "\\s{0,100}") {
        let _ = parse_sbom_str(&s);
        let _ = detect_format(&s);
    }

    #[test]
    fn spdx_partial_json_doesnt_panic(
        version in "SPDX-[0-9]\\.[0-9]",
        extra in "\\PC{0,200}",
    ) {
        let input = format!(r#"{{"spdxVersion": "{}", "SPDXID": "SPDXRef-DOCUMENT", {}}}"#, version, extra);
        let _ = parse_sbom_str(&input);
    }

    #[test]
    fn random_relationships_dont_panic(
        rels in prop::collection::vec(("[A-C]", "CONTAINS|DEPENDS_ON|DESCRIBES", "[A-C]"), 0..10),
    ) {
        let mut input = String::from("SPDXVersion: SPDX-2.3\nSPDXID: SPDXRef-DOCUMENT\n");
        for id in ["OperatingSystem-A", "Application-B", "Package-C"] {
            input.push_str(&format!("PackageName: {id}\nSPDXID: SPDXRef-{id}\n"));
        }
        input.push_str("ExternalRef: PACKAGE-MANAGER purl pkg:npm/lodash@4.17.21\n");
        let full = |c: &str| match c {
            "A" => "OperatingSystem-A",
            "B" => "Application-B",
            _ => "Package-C",
        };
        for (a, ty, b) in &rels {
            input.push_str(&format!("Relationship: SPDXRef-{} {} SPDXRef-{}\n", full(a), ty, full(b)));
        }
        let sbom = parse_sbom_str(&input).expect("well-formed document");
        // every claiming relationship adds at most one package, an unclaimed one is an orphan
        prop_assert!(sbom.package_count() <= rels.len() + 1);
    }
}
