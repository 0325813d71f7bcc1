//! Property-based tests for package identity and version comparison.
//!
//! Identity encoding must be deterministic and decodable, and neither the
//! decoder nor the comparers may panic on arbitrary input.

use proptest::prelude::*;
use sca_core::detector::compare::{
    GenericComparer, MavenComparer, NpmComparer, Pep440Comparer, RubyGemsComparer,
};
use sca_core::model::{Metadata, Package, PkgType};
use sca_core::utils::{format_version, RpmVersion};
use sca_core::{Comparer, PackageUrl};

fn simple_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}"
}

fn dotted_version() -> impl Strategy<Value = String> {
    "(0|[1-9][0-9]{0,2})(\\.(0|[1-9][0-9]{0,2})){0,2}"
}

fn lang_type() -> impl Strategy<Value = PkgType> {
    prop::sample::select(vec![
        PkgType::Npm,
        PkgType::Cargo,
        PkgType::Pypi,
        PkgType::Gem,
        PkgType::Nuget,
        PkgType::Hex,
        PkgType::Pub,
        PkgType::Conan,
    ])
}

proptest! {
    // 1000 cases: identity checks are cheap and benefit from broad coverage.
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn encode_is_deterministic(pkg_type in lang_type(), name in simple_name(), version in dotted_version()) {
        let pkg = Package::new(name, version);
        let meta = Metadata::default();
        let a = PackageUrl::encode(pkg_type, &meta, &pkg).expect("encodes");
        let b = PackageUrl::encode(pkg_type, &meta, &pkg).expect("encodes");
        prop_assert_eq!(a.map(|p| p.as_str().to_string()), b.map(|p| p.as_str().to_string()));
    }

    #[test]
    fn encoded_identity_decodes_to_same_package(
        pkg_type in lang_type(),
        name in simple_name(),
        version in dotted_version(),
    ) {
        let pkg = Package::new(name.clone(), version.clone());
        let purl = PackageUrl::encode(pkg_type, &Metadata::default(), &pkg)
            .expect("encodes")
            .expect("has identity");

        let decoded = PackageUrl::parse(purl.as_str()).expect("decodes");
        prop_assert_eq!(decoded.pkg_type(), Some(pkg_type));
        prop_assert_eq!(decoded.as_str(), purl.as_str());

        let back = decoded.to_package();
        prop_assert_eq!(back.name, name);
        prop_assert_eq!(back.version, version);
        prop_assert_eq!(back.identifier.as_deref(), Some(purl.as_str()));
    }

    #[test]
    fn canonical_text_is_a_fixed_point(name in simple_name(), version in dotted_version()) {
        let text = format!("pkg:cargo/{name}@{version}");
        let once = PackageUrl::parse(&text).expect("decodes");
        let twice = PackageUrl::parse(once.as_str()).expect("decodes");
        prop_assert_eq!(once.as_str(), twice.as_str());
    }

    #[test]
    fn decode_doesnt_panic(s in "\\PC{0,200}") {
        let _ = PackageUrl::parse(&s);
    }

    #[test]
    fn purl_like_decode_doesnt_panic(
        ty in "[a-z]{1,10}",
        rest in "[A-Za-z0-9@/%?&=#:.+-]{0,80}",
    ) {
        if let Ok(purl) = PackageUrl::parse(&format!("pkg:{ty}/{rest}")) {
            let _ = purl.to_package();
            let _ = purl.bom_ref();
            let _ = purl.class();
            let _ = purl.lang_type();
        }
    }

    #[test]
    fn rpm_version_round_trip(
        epoch in 0u32..10,
        version in dotted_version(),
        release in "[0-9a-z.]{0,10}",
    ) {
        let text = format_version(epoch, &version, &release);
        let parsed = RpmVersion::parse(&text);
        prop_assert_eq!(parsed.epoch, epoch);
        prop_assert_eq!(&parsed.version, &version);
        prop_assert_eq!(&parsed.release, &release);
        prop_assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn version_satisfies_its_own_bounds(version in dotted_version()) {
        let comparers: [&dyn Comparer; 4] = [
            &GenericComparer,
            &MavenComparer,
            &Pep440Comparer,
            &RubyGemsComparer,
        ];
        for comparer in comparers {
            let ge = format!(">={version}");
            let le = format!("<={version}");
            let lt = format!("<{version}");
            prop_assert!(comparer.matches(&version, &ge).expect("valid"));
            prop_assert!(comparer.matches(&version, &le).expect("valid"));
            prop_assert!(!comparer.matches(&version, &lt).expect("valid"));
        }
    }

    #[test]
    fn npm_exact_version_matches(major in 0u32..100, minor in 0u32..100, patch in 0u32..100) {
        let version = format!("{major}.{minor}.{patch}");
        prop_assert!(NpmComparer.matches(&version, &version).expect("valid"));
        let next_major = format!("<{}.0.0", major + 1);
        prop_assert!(NpmComparer.matches(&version, &next_major).expect("valid"));
    }

    #[test]
    fn comparers_dont_panic(version in "\\PC{0,30}", constraint in "\\PC{0,60}") {
        let comparers: [&dyn Comparer; 5] = [
            &GenericComparer,
            &NpmComparer,
            &MavenComparer,
            &Pep440Comparer,
            &RubyGemsComparer,
        ];
        for comparer in comparers {
            let _ = comparer.matches(&version, &constraint);
        }
    }
}
