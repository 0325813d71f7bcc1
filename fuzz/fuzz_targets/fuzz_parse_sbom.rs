#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the main SBOM entry point.
///
/// Runs variant detection, the SPDX decoder and package tree
/// reconstruction on arbitrary UTF-8 input.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = sca_core::parsers::parse_sbom_str(s);
    }
});
