#![no_main]
use libfuzzer_sys::fuzz_target;
use sca_core::parsers::{SbomParser, SpdxParser};
use sca_core::SbomGraphBuilder;

/// Fuzz the SPDX JSON decoder and the graph builder.
///
/// Wraps input in an SPDX JSON envelope to reach the package decoding
/// rather than failing at detection.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = SpdxParser::new();
        let _ = parser.parse_str(s);

        if s.len() < 10_000 {
            let wrapped = format!(
                r#"{{"spdxVersion":"SPDX-2.3","SPDXID":"SPDXRef-DOCUMENT","name":"fuzz","packages":[{s}]}}"#,
            );
            if let Ok(document) = parser.parse_str(&wrapped) {
                let _ = SbomGraphBuilder::new(&document).build();
            }
        }
    }
});
