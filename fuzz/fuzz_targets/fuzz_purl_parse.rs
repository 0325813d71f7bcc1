#![no_main]
use libfuzzer_sys::fuzz_target;
use sca_core::PackageUrl;

/// Fuzz identifier decoding.
///
/// Anything that decodes must also convert to a package record and render
/// its BOM reference without panicking, and its canonical text must decode
/// again.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(purl) = PackageUrl::parse(s) {
            let _ = purl.to_package();
            let _ = purl.bom_ref();
            let _ = purl.class();
            assert!(PackageUrl::parse(purl.as_str()).is_ok());
        }
    }
});
