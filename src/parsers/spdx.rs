//! SPDX document object model and its JSON and tag-value decoders.
//!
//! Only the parts of SPDX 2.x that drive package-tree reconstruction are
//! modelled: packages, files and relationships.

use super::traits::{DocumentVariant, FormatConfidence, FormatDetection, ParseError, SbomParser};
use serde::Deserialize;
use std::collections::HashMap;

/// Prefix shared by all document-local element identifiers.
pub const SPDX_REF_PREFIX: &str = "SPDXRef-";

/// A decoded SPDX document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpdxDocument {
    pub spdx_version: String,
    pub spdx_id: String,
    pub name: String,
    pub packages: Vec<SpdxPackage>,
    pub files: Vec<SpdxFile>,
    pub relationships: Vec<SpdxRelationship>,
}

/// A package element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpdxPackage {
    pub spdx_id: String,
    pub name: String,
    pub version: String,
    pub license_declared: String,
    pub source_info: String,
    pub attribution_texts: Vec<String>,
    pub external_refs: Vec<SpdxExternalRef>,
    /// Files attached directly to the package, in document order
    pub files: Vec<SpdxFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpdxFile {
    pub spdx_id: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdxExternalRef {
    pub category: String,
    pub ref_type: String,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdxRelationship {
    pub element: String,
    pub relationship_type: String,
    pub related_element: String,
}

/// Strip the `SPDXRef-` prefix from an element identifier.
#[must_use]
pub fn element_ref(spdx_id: &str) -> &str {
    spdx_id.strip_prefix(SPDX_REF_PREFIX).unwrap_or(spdx_id)
}

/// Parser for SPDX JSON and tag-value documents.
#[derive(Debug, Default)]
pub struct SpdxParser;

impl SpdxParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse SPDX JSON.
    pub fn parse_json(&self, content: &str) -> Result<SpdxDocument, ParseError> {
        let raw: JsonDocument = serde_json::from_str(content)?;
        raw.into_document()
    }

    /// Parse SPDX JSON from a reader without buffering the whole file.
    pub fn parse_json_reader<R: std::io::Read>(
        &self,
        reader: R,
    ) -> Result<SpdxDocument, ParseError> {
        let raw: JsonDocument = serde_json::from_reader(reader)?;
        raw.into_document()
    }

    /// Parse SPDX tag-value text.
    pub fn parse_tag_value(&self, content: &str) -> Result<SpdxDocument, ParseError> {
        let mut doc = SpdxDocument::default();
        let mut current = Section::Document;
        let mut lines = content.lines();

        while let Some(line) = lines.next() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = read_text_value(value.trim(), &mut lines);

            match key {
                "SPDXVersion" => doc.spdx_version = value,
                "DocumentName" => doc.name = value,
                "SPDXID" => match current {
                    Section::Document => doc.spdx_id = value,
                    Section::Package => {
                        if let Some(pkg) = doc.packages.last_mut() {
                            pkg.spdx_id = value;
                        }
                    }
                    Section::File => {
                        if let Some(file) = doc.files.last_mut() {
                            file.spdx_id.clone_from(&value);
                        }
                        if let Some(file) = doc.packages.last_mut().and_then(|p| p.files.last_mut()) {
                            file.spdx_id = value;
                        }
                    }
                },
                "PackageName" => {
                    current = Section::Package;
                    doc.packages.push(SpdxPackage {
                        name: value,
                        ..SpdxPackage::default()
                    });
                }
                "FileName" => {
                    let file = SpdxFile {
                        spdx_id: String::new(),
                        file_name: value,
                    };
                    // files following a package belong to it
                    if current != Section::Document {
                        if let Some(pkg) = doc.packages.last_mut() {
                            pkg.files.push(file.clone());
                        }
                    }
                    doc.files.push(file);
                    current = Section::File;
                }
                "Relationship" => {
                    if let Some(rel) = parse_relationship_line(&value) {
                        doc.relationships.push(rel);
                    }
                }
                _ if current == Section::Package => {
                    if let Some(pkg) = doc.packages.last_mut() {
                        apply_package_tag(pkg, key, value);
                    }
                }
                _ => {}
            }
        }

        validate(doc)
    }

    fn detect_variant(content: &str) -> Option<DocumentVariant> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') && trimmed.contains("\"spdxVersion\"") {
            Some(DocumentVariant::Json)
        } else if trimmed.contains("SPDXVersion:") {
            Some(DocumentVariant::TagValue)
        } else {
            None
        }
    }
}

impl SbomParser for SpdxParser {
    fn parse_str(&self, content: &str) -> Result<SpdxDocument, ParseError> {
        match Self::detect_variant(content) {
            Some(DocumentVariant::Json) => self.parse_json(content),
            Some(DocumentVariant::TagValue) => self.parse_tag_value(content),
            None => Err(ParseError::UnknownFormat(
                "expected SPDX JSON or tag-value markers".to_string(),
            )),
        }
    }

    fn format_name(&self) -> &str {
        "SPDX"
    }

    fn detect(&self, content: &str) -> FormatDetection {
        let Some(variant) = Self::detect_variant(content) else {
            return FormatDetection::no_match();
        };
        let detection = FormatDetection::with_confidence(FormatConfidence::CERTAIN, variant);
        match extract_version(content) {
            Some(version) => detection.version(version),
            None => FormatDetection {
                confidence: FormatConfidence::HIGH,
                ..detection
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Document,
    Package,
    File,
}

/// Return the value, reading continuation lines for `<text>` blocks.
fn read_text_value<'a>(value: &str, lines: &mut impl Iterator<Item = &'a str>) -> String {
    let Some(rest) = value.strip_prefix("<text>") else {
        return value.to_string();
    };
    if let Some(inner) = rest.strip_suffix("</text>") {
        return inner.to_string();
    }
    let mut text = rest.to_string();
    for line in lines.by_ref() {
        text.push('\n');
        if let Some(end) = line.find("</text>") {
            text.push_str(&line[..end]);
            break;
        }
        text.push_str(line);
    }
    text
}

fn apply_package_tag(pkg: &mut SpdxPackage, key: &str, value: String) {
    match key {
        "PackageVersion" => pkg.version = value,
        "PackageLicenseDeclared" => pkg.license_declared = value,
        "PackageSourceInfo" => pkg.source_info = value,
        "PackageAttributionText" => pkg.attribution_texts.push(value),
        "ExternalRef" => {
            if let Some(ext_ref) = parse_external_ref_line(&value) {
                pkg.external_refs.push(ext_ref);
            }
        }
        _ => {}
    }
}

/// `<element> <TYPE> <related element>`
fn parse_relationship_line(value: &str) -> Option<SpdxRelationship> {
    let mut parts = value.split_whitespace();
    Some(SpdxRelationship {
        element: parts.next()?.to_string(),
        relationship_type: parts.next()?.to_string(),
        related_element: parts.next()?.to_string(),
    })
}

/// `<category> <type> <locator>`
fn parse_external_ref_line(value: &str) -> Option<SpdxExternalRef> {
    let mut parts = value.split_whitespace();
    Some(SpdxExternalRef {
        category: parts.next()?.to_string(),
        ref_type: parts.next()?.to_string(),
        locator: parts.next()?.to_string(),
    })
}

fn extract_version(content: &str) -> Option<&str> {
    let start = content.find("SPDX-2.")? + "SPDX-".len();
    let rest = &content[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn validate(doc: SpdxDocument) -> Result<SpdxDocument, ParseError> {
    if !doc.spdx_version.starts_with("SPDX-") {
        return Err(ParseError::InvalidStructure(format!(
            "unsupported SPDX version {:?}",
            doc.spdx_version
        )));
    }
    if let Some(pkg) = doc.packages.iter().find(|p| p.spdx_id.is_empty()) {
        return Err(ParseError::MissingField(format!(
            "SPDXID of package {:?}",
            pkg.name
        )));
    }
    Ok(doc)
}

// ============================================================================
// SPDX JSON serde structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument {
    spdx_version: String,
    #[serde(rename = "SPDXID", default)]
    spdx_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    packages: Vec<JsonPackage>,
    #[serde(default)]
    files: Vec<JsonFile>,
    #[serde(default)]
    relationships: Vec<JsonRelationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonPackage {
    #[serde(rename = "SPDXID", default)]
    spdx_id: String,
    name: String,
    #[serde(default)]
    version_info: Option<String>,
    #[serde(default)]
    license_declared: Option<String>,
    #[serde(default)]
    source_info: Option<String>,
    #[serde(default)]
    attribution_texts: Vec<String>,
    #[serde(default)]
    external_refs: Vec<JsonExternalRef>,
    #[serde(default)]
    has_files: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonFile {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    file_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonExternalRef {
    reference_category: String,
    reference_type: String,
    reference_locator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonRelationship {
    spdx_element_id: String,
    relationship_type: String,
    related_spdx_element: String,
}

impl JsonDocument {
    fn into_document(self) -> Result<SpdxDocument, ParseError> {
        let files: Vec<SpdxFile> = self
            .files
            .into_iter()
            .map(|f| SpdxFile {
                spdx_id: f.spdx_id,
                file_name: f.file_name,
            })
            .collect();

        let mut files_by_id: HashMap<&str, &SpdxFile> = HashMap::with_capacity(files.len());
        for file in &files {
            // first declaration wins
            files_by_id.entry(file.spdx_id.as_str()).or_insert(file);
        }

        let packages = self
            .packages
            .into_iter()
            .map(|p| SpdxPackage {
                files: p
                    .has_files
                    .iter()
                    .filter_map(|id| files_by_id.get(id.as_str()).map(|f| (*f).clone()))
                    .collect(),
                spdx_id: p.spdx_id,
                name: p.name,
                version: p.version_info.unwrap_or_default(),
                license_declared: p.license_declared.unwrap_or_default(),
                source_info: p.source_info.unwrap_or_default(),
                attribution_texts: p.attribution_texts,
                external_refs: p
                    .external_refs
                    .into_iter()
                    .map(|r| SpdxExternalRef {
                        category: r.reference_category,
                        ref_type: r.reference_type,
                        locator: r.reference_locator,
                    })
                    .collect(),
            })
            .collect();

        let relationships = self
            .relationships
            .into_iter()
            .map(|r| SpdxRelationship {
                element: r.spdx_element_id,
                relationship_type: r.relationship_type,
                related_element: r.related_spdx_element,
            })
            .collect();

        validate(SpdxDocument {
            spdx_version: self.spdx_version,
            spdx_id: self.spdx_id,
            name: self.name,
            packages,
            files,
            relationships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_DOC: &str = r#"{
        "spdxVersion": "SPDX-2.3",
        "SPDXID": "SPDXRef-DOCUMENT",
        "name": "demo",
        "packages": [
            {
                "SPDXID": "SPDXRef-Package-lodash",
                "name": "lodash",
                "versionInfo": "4.17.21",
                "licenseDeclared": "MIT",
                "attributionTexts": ["PkgID: lodash@4.17.21"],
                "externalRefs": [{
                    "referenceCategory": "PACKAGE-MANAGER",
                    "referenceType": "purl",
                    "referenceLocator": "pkg:npm/lodash@4.17.21"
                }],
                "hasFiles": ["SPDXRef-File-lock"]
            }
        ],
        "files": [{"SPDXID": "SPDXRef-File-lock", "fileName": "package-lock.json"}],
        "relationships": [{
            "spdxElementId": "SPDXRef-DOCUMENT",
            "relationshipType": "DESCRIBES",
            "relatedSpdxElement": "SPDXRef-Package-lodash"
        }]
    }"#;

    #[test]
    fn test_parse_json() {
        let doc = SpdxParser::new().parse_str(JSON_DOC).expect("valid document");
        assert_eq!(doc.spdx_version, "SPDX-2.3");
        assert_eq!(doc.packages.len(), 1);

        let pkg = &doc.packages[0];
        assert_eq!(pkg.version, "4.17.21");
        assert_eq!(pkg.external_refs[0].locator, "pkg:npm/lodash@4.17.21");
        assert_eq!(pkg.files[0].file_name, "package-lock.json");
        assert_eq!(doc.relationships[0].relationship_type, "DESCRIBES");
    }

    #[test]
    fn test_parse_tag_value() {
        let content = "\
SPDXVersion: SPDX-2.2
DataLicense: CC0-1.0
SPDXID: SPDXRef-DOCUMENT
DocumentName: demo

PackageName: musl
SPDXID: SPDXRef-Package-musl
PackageVersion: 1.2.3-r0
PackageSourceInfo: built package from: musl 1.2.3-r0
PackageLicenseDeclared: MIT
ExternalRef: PACKAGE-MANAGER purl pkg:apk/alpine/musl@1.2.3-r0?distro=3.17.2
PackageAttributionText: <text>LayerDigest: sha256:aaaa</text>
PackageAttributionText: <text>LayerDiffID:
sha256:bbbb</text>
FileName: /lib/apk/db/installed
SPDXID: SPDXRef-File-installed

Relationship: SPDXRef-DOCUMENT DESCRIBES SPDXRef-Package-musl
";
        let doc = SpdxParser::new().parse_str(content).expect("valid document");
        assert_eq!(doc.spdx_id, "SPDXRef-DOCUMENT");
        assert_eq!(doc.packages.len(), 1);

        let pkg = &doc.packages[0];
        assert_eq!(pkg.spdx_id, "SPDXRef-Package-musl");
        assert_eq!(pkg.source_info, "built package from: musl 1.2.3-r0");
        assert_eq!(pkg.attribution_texts[0], "LayerDigest: sha256:aaaa");
        assert_eq!(pkg.attribution_texts[1], "LayerDiffID:\nsha256:bbbb");
        assert_eq!(pkg.files.len(), 1);
        assert_eq!(pkg.files[0].spdx_id, "SPDXRef-File-installed");
        assert_eq!(doc.files[0].spdx_id, "SPDXRef-File-installed");
        assert_eq!(doc.relationships.len(), 1);
    }

    #[test]
    fn test_has_files_resolved_by_id() {
        let files: Vec<String> = (0..2000)
            .map(|i| format!(r#"{{"SPDXID": "SPDXRef-File-{i}", "fileName": "lib/{i}.so"}}"#))
            .collect();
        let content = format!(
            r#"{{"spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT",
                "packages": [{{"SPDXID": "SPDXRef-Package-a", "name": "a",
                    "hasFiles": ["SPDXRef-File-1999", "SPDXRef-File-missing", "SPDXRef-File-7"]}}],
                "files": [{}, {{"SPDXID": "SPDXRef-File-7", "fileName": "shadowed"}}]}}"#,
            files.join(", ")
        );

        let doc = SpdxParser::new().parse_str(&content).expect("valid document");
        assert_eq!(doc.files.len(), 2001);
        let names: Vec<_> = doc.packages[0]
            .files
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["lib/1999.so", "lib/7.so"]);
    }

    #[test]
    fn test_unknown_format() {
        let err = SpdxParser::new()
            .parse_str(r#"{"bomFormat": "CycloneDX"}"#)
            .expect_err("not SPDX");
        assert!(matches!(err, ParseError::UnknownFormat(_)));
    }

    #[test]
    fn test_package_without_id_is_invalid() {
        let content = r#"{"spdxVersion": "SPDX-2.3", "packages": [{"name": "x"}]}"#;
        let err = SpdxParser::new().parse_str(content).expect_err("missing SPDXID");
        assert!(matches!(err, ParseError::MissingField(_)));
    }

    #[test]
    fn test_detect_reports_version() {
        let detection = SpdxParser::new().detect("SPDXVersion: SPDX-2.3\nSPDXID: SPDXRef-DOCUMENT");
        assert_eq!(detection.variant, Some(DocumentVariant::TagValue));
        assert_eq!(detection.version.as_deref(), Some("2.3"));
        assert!(detection.confidence.can_parse());
    }

    #[test]
    fn test_element_ref() {
        assert_eq!(element_ref("SPDXRef-OperatingSystem-1"), "OperatingSystem-1");
        assert_eq!(element_ref("DocumentRef-x"), "DocumentRef-x");
    }
}
