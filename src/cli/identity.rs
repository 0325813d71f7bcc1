//! `purl` and `decode` command handlers.

use crate::model::{ImageConfig, LangType, Metadata, Os, Package, PkgType};
use crate::pipeline::to_json;
use crate::purl::{PackageUrl, ResultClass};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::Read as _;

/// Inputs of the `purl` command.
#[derive(Debug, Clone, Default)]
pub struct EncodeArgs {
    /// Package type (`npm`, `rpm`, ...) or application type (`eks`, `pip`, ...)
    pub pkg_type: String,
    /// Package record as JSON, or `-` for stdin
    pub package_json: String,
    pub os_family: Option<String>,
    pub os_name: Option<String>,
    pub repo_digests: Vec<String>,
    pub arch: Option<String>,
}

/// Run the purl command: print the canonical identifier of a package record.
pub fn run_purl(args: EncodeArgs) -> Result<()> {
    match encode_package(&args)? {
        Some(purl) => println!("{}", purl.bom_ref()),
        None => eprintln!("No identifier can be derived for this package"),
    }
    Ok(())
}

/// Encode the package described by `args`.
pub fn encode_package(args: &EncodeArgs) -> Result<Option<PackageUrl>> {
    let src_type = LangType::from(args.pkg_type.as_str());
    let pkg_type = PkgType::from_purl_type(&args.pkg_type).or_else(|| src_type.pkg_type());
    let Some(pkg_type) = pkg_type else {
        bail!(
            "Unknown package type: {}. Valid options: {}",
            args.pkg_type,
            PkgType::ALL.map(PkgType::as_str).join(", ")
        );
    };

    let json = if args.package_json == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read package from stdin")?;
        buf
    } else {
        args.package_json.clone()
    };
    let package: Package = serde_json::from_str(&json).context("invalid package JSON")?;

    let os = match (&args.os_family, &args.os_name) {
        (Some(family), name) => Some(Os::new(family.as_str(), name.clone().unwrap_or_default())),
        (None, Some(_)) => bail!("--os-name requires --os-family"),
        (None, None) => None,
    };
    let metadata = Metadata {
        os,
        repo_digests: args.repo_digests.clone(),
        image_config: ImageConfig {
            architecture: args.arch.clone().unwrap_or_default(),
        },
    };

    Ok(PackageUrl::encode_application(&src_type, pkg_type, &metadata, &package)?)
}

/// What `decode` prints.
#[derive(Debug, Serialize)]
pub struct DecodedIdentity {
    pub class: ResultClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang_type: Option<LangType>,
    pub bom_ref: String,
    pub package: Package,
}

/// Decode canonical identifier text.
pub fn decode_identity(text: &str) -> Result<DecodedIdentity> {
    let purl = PackageUrl::parse(text).with_context(|| format!("cannot decode {text:?}"))?;
    Ok(DecodedIdentity {
        class: purl.class(),
        lang_type: purl.lang_type(),
        bom_ref: purl.bom_ref(),
        package: purl.to_package(),
    })
}

/// Run the decode command.
pub fn run_decode(text: &str, pretty: bool) -> Result<()> {
    let decoded = decode_identity(text)?;
    println!("{}", to_json(&decoded, pretty)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_npm() {
        let args = EncodeArgs {
            pkg_type: "npm".into(),
            package_json: r#"{"name": "@babel/core", "version": "7.23.0"}"#.into(),
            ..EncodeArgs::default()
        };
        let purl = encode_package(&args).unwrap().unwrap();
        assert_eq!(purl.namespace(), "@babel");
        assert_eq!(purl.name(), "core");
        assert_eq!(purl.version(), "7.23.0");
    }

    #[test]
    fn test_encode_managed_k8s_component() {
        let args = EncodeArgs {
            pkg_type: "eks".into(),
            package_json: r#"{"name": "k8s.io/kube-proxy", "version": "1.26.2-eksbuild.1"}"#
                .into(),
            ..EncodeArgs::default()
        };
        let purl = encode_package(&args).unwrap().unwrap();
        assert_eq!(
            purl.to_string(),
            "pkg:k8s/eks/k8s.io%2Fkube-proxy@1.26.2-eksbuild.1"
        );
    }

    #[test]
    fn test_encode_unknown_type() {
        let args = EncodeArgs {
            pkg_type: "cobol".into(),
            package_json: "{}".into(),
            ..EncodeArgs::default()
        };
        assert!(encode_package(&args).is_err());
    }

    #[test]
    fn test_os_name_without_family() {
        let args = EncodeArgs {
            pkg_type: "deb".into(),
            package_json: r#"{"name": "bash", "version": "5.2"}"#.into(),
            os_name: Some("12".into()),
            ..EncodeArgs::default()
        };
        assert!(encode_package(&args).is_err());
    }

    #[test]
    fn test_decode_identity() {
        let decoded = decode_identity("pkg:pypi/requests@2.31.0").unwrap();
        assert_eq!(decoded.class, ResultClass::LangPkgs);
        assert_eq!(decoded.lang_type, Some(LangType::PythonPkg));
        assert_eq!(decoded.package.name, "requests");
        assert_eq!(decoded.package.version, "2.31.0");
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_identity("not a purl").is_err());
    }
}
