//! Inspección de solo lectura de la información personal que conserva un documento.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::constants::{CORE_PROPERTIES_REL, EXTENDED_PROPERTIES_REL};
use super::dispatch::classify;
use super::family::DocumentFamily;
use super::office::{
    Access, COMPANY, CORE_PROPERTIES, CREATOR, Document, EXTENDED_PROPERTIES, FieldSpec,
    LAST_MODIFIED_BY,
    PACKAGE_SOURCE, PrivacyMarker, REVISION, TITLE, TOTAL_TIME, element_matches,
    element_text_content, find_child, require_related_part,
};

/// Estado de la metadata personal de un documento.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrivacyReport {
    pub path: PathBuf,
    pub family: DocumentFamily,
    pub creator: Option<String>,
    pub last_modified_by: Option<String>,
    pub title: Option<String>,
    pub revision: Option<String>,
    pub company: Option<String>,
    pub total_time: Option<String>,
    pub privacy_marker: bool,
}

impl PrivacyReport {
    /// Campos que aún delatan información personal.
    pub fn findings(&self) -> Vec<&'static str> {
        let mut findings = Vec::new();
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        if filled(&self.creator) {
            findings.push("autor");
        }
        if filled(&self.last_modified_by) {
            findings.push("último editor");
        }
        if filled(&self.title) {
            findings.push("título");
        }
        if self.revision.as_deref().is_some_and(|v| v != "1") {
            findings.push("revisión");
        }
        if self.company.is_some() {
            findings.push("empresa");
        }
        if self.total_time.as_deref().is_some_and(|v| v != "0") {
            findings.push("tiempo de edición");
        }
        if !self.privacy_marker {
            findings.push("marcador de privacidad");
        }

        findings
    }

    pub fn is_clean(&self) -> bool {
        self.findings().is_empty()
    }
}

/// Lee la metadata personal de un documento sin modificarlo.
pub fn inspect_document(path: &Path) -> Result<PrivacyReport> {
    let family = classify(path)?;

    Document::scoped(path, family, Access::ReadOnly, |document| {
        let core = require_related_part(document, PACKAGE_SOURCE, CORE_PROPERTIES_REL)?;
        let extended = require_related_part(document, PACKAGE_SOURCE, EXTENDED_PROPERTIES_REL)?;

        let mut report = PrivacyReport {
            path: path.to_path_buf(),
            family,
            creator: None,
            last_modified_by: None,
            title: None,
            revision: None,
            company: None,
            total_time: None,
            privacy_marker: false,
        };

        let root = document.part(&core)?;
        if element_matches(root, &CORE_PROPERTIES) {
            let text = |spec: &FieldSpec<'static>| find_child(root, spec).map(element_text_content);
            report.creator = text(&CREATOR);
            report.last_modified_by = text(&LAST_MODIFIED_BY);
            report.title = text(&TITLE);
            report.revision = text(&REVISION);
        }

        let root = document.part(&extended)?;
        if element_matches(root, &EXTENDED_PROPERTIES) {
            report.company = find_child(root, &COMPANY).map(element_text_content);
            report.total_time = find_child(root, &TOTAL_TIME).map(element_text_content);
        }

        let marker = PrivacyMarker::for_family(family);
        let target = marker.target_part(document)?;
        report.privacy_marker = marker.is_marker_set(document.part(&target)?);

        Ok(report)
    })
}
