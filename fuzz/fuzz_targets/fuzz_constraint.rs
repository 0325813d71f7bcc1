#![no_main]
use libfuzzer_sys::fuzz_target;
use sca_core::detector::compare::{
    GenericComparer, MavenComparer, NpmComparer, Pep440Comparer, RubyGemsComparer,
};
use sca_core::Comparer;

/// Fuzz the version comparers.
///
/// The first line is the installed version, the rest the constraint.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let (version, constraint) = s.split_once('\n').unwrap_or((s, ""));
        let comparers: [&dyn Comparer; 5] = [
            &GenericComparer,
            &NpmComparer,
            &MavenComparer,
            &Pep440Comparer,
            &RubyGemsComparer,
        ];
        for comparer in comparers {
            let _ = comparer.matches(version, constraint);
        }
    }
});
