#![no_main]
use libfuzzer_sys::fuzz_target;
use sca_core::parsers::{SbomParser, SpdxParser};
use sca_core::SbomGraphBuilder;

/// Fuzz the SPDX tag-value decoder and the graph builder.
///
/// Prefixes input with the tag-value header to exercise the line-by-line
/// section handling and `<text>` blocks.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = SpdxParser::new();
        let _ = parser.parse_str(s);

        if s.len() < 10_000 {
            let wrapped = format!(
                "SPDXVersion: SPDX-2.3\nDataLicense: CC0-1.0\nSPDXID: SPDXRef-DOCUMENT\nDocumentName: fuzz\n{s}",
            );
            if let Ok(document) = parser.parse_str(&wrapped) {
                let _ = SbomGraphBuilder::new(&document).build();
            }
        }
    }
});
