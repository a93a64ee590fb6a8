//! Marcadores de privacidad propios de cada familia de documentos.
//!
//! Cada familia guarda la indicación "quitar información personal al guardar" en su
//! parte principal, y los esquemas fijan el orden de los hijos: un marcador insertado
//! en la posición equivocada deja el documento ilegible para Office.

use tracing::{debug, info};

use crate::error::Result;
use crate::whitener::constants::{
    MC_NS, OFFICE_DOCUMENT_REL, PML_NS, SETTINGS_REL, SML_NS, WML_NS, X15AC_NS,
};
use crate::whitener::family::DocumentFamily;

use super::document::Document;
use super::rels::{PACKAGE_SOURCE, require_related_part};
use super::xml::{
    Element, FieldSpec, XmlNode, element_matches, find_child, find_child_mut, new_child_element,
    node_matches,
};

const REMOVE_PERSONAL_INFORMATION: FieldSpec<'static> =
    FieldSpec::new("w", "removePersonalInformation", WML_NS);
const REMOVE_DATE_AND_TIME: FieldSpec<'static> = FieldSpec::new("w", "removeDateAndTime", WML_NS);

/// Marcadores de `settings.xml`, en el orden en que deben aparecer.
const WORD_MARKERS: [FieldSpec<'static>; 2] = [REMOVE_PERSONAL_INFORMATION, REMOVE_DATE_AND_TIME];

/// Hijos de `w:settings` que el esquema exige antes de los marcadores.
const WORD_LEADING_SETTINGS: [FieldSpec<'static>; 3] = [
    FieldSpec::new("w", "writeProtection", WML_NS),
    FieldSpec::new("w", "view", WML_NS),
    FieldSpec::new("w", "zoom", WML_NS),
];

const FILE_VERSION: FieldSpec<'static> = FieldSpec::unprefixed("fileVersion", SML_NS);
const WORKBOOK_PR: FieldSpec<'static> = FieldSpec::unprefixed("workbookPr", SML_NS);
const ALTERNATE_CONTENT: FieldSpec<'static> = FieldSpec::new("mc", "AlternateContent", MC_NS);
const CHOICE: FieldSpec<'static> = FieldSpec::new("mc", "Choice", MC_NS);
const ABS_PATH: FieldSpec<'static> = FieldSpec::new("x15ac", "absPath", X15AC_NS);

const PRESENTATION: FieldSpec<'static> = FieldSpec::new("p", "presentation", PML_NS);

const FILTER_PRIVACY: &str = "filterPrivacy";
const REMOVE_PERSONAL_INFO_ON_SAVE: &str = "removePersonalInfoOnSave";

/// Conmutador de privacidad de una familia concreta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrivacyMarker {
    /// `w:removePersonalInformation` y `w:removeDateAndTime` en `settings.xml`.
    WordProcessing,
    /// `filterPrivacy` en `workbookPr` y eliminación de `x15ac:absPath`.
    Spreadsheet,
    /// `removePersonalInfoOnSave` en la raíz de `presentation.xml`.
    Presentation,
}

impl PrivacyMarker {
    pub fn for_family(family: DocumentFamily) -> Self {
        match family {
            DocumentFamily::WordProcessing => PrivacyMarker::WordProcessing,
            DocumentFamily::Spreadsheet => PrivacyMarker::Spreadsheet,
            DocumentFamily::Presentation => PrivacyMarker::Presentation,
        }
    }

    /// Parte que contiene el marcador.
    pub(crate) fn target_part(self, document: &mut Document) -> Result<String> {
        let main = require_related_part(document, PACKAGE_SOURCE, OFFICE_DOCUMENT_REL)?;
        match self {
            PrivacyMarker::WordProcessing => require_related_part(document, &main, SETTINGS_REL),
            PrivacyMarker::Spreadsheet | PrivacyMarker::Presentation => Ok(main),
        }
    }

    /// Activa el marcador en el árbol de la parte destino.
    pub(crate) fn apply_privacy_marker(self, root: &mut Element) {
        match self {
            PrivacyMarker::WordProcessing => mark_settings(root),
            PrivacyMarker::Spreadsheet => mark_workbook(root),
            PrivacyMarker::Presentation => mark_presentation(root),
        }
    }

    /// Indica si el árbol ya tiene el marcador activo.
    pub(crate) fn is_marker_set(self, root: &Element) -> bool {
        match self {
            PrivacyMarker::WordProcessing => WORD_MARKERS
                .iter()
                .all(|spec| find_child(root, spec).is_some()),
            PrivacyMarker::Spreadsheet => find_child(root, &WORKBOOK_PR)
                .is_some_and(|pr| is_truthy(pr.attribute(FILTER_PRIVACY))),
            PrivacyMarker::Presentation => {
                element_matches(root, &PRESENTATION)
                    && is_truthy(root.attribute(REMOVE_PERSONAL_INFO_ON_SAVE))
            }
        }
    }

    /// Resuelve la parte destino, activa el marcador y escribe la parte.
    pub(crate) fn apply(self, document: &mut Document) -> Result<()> {
        let part = self.target_part(document)?;
        self.apply_privacy_marker(document.part_mut(&part)?);
        document.flush(&part)?;
        info!(part = part.as_str(), marker = ?self, "marcador de privacidad activado");
        Ok(())
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "on"))
}

/// Inserta los marcadores que falten tras el último de `writeProtection`, `view` o `zoom`,
/// o al principio si no hay ninguno.
fn mark_settings(root: &mut Element) {
    let missing: Vec<XmlNode> = WORD_MARKERS
        .iter()
        .filter(|spec| find_child(root, spec).is_none())
        .map(|spec| XmlNode::Element(new_child_element(root, spec)))
        .collect();
    if missing.is_empty() {
        return;
    }

    let index = root
        .children
        .iter()
        .rposition(|node| {
            WORD_LEADING_SETTINGS
                .iter()
                .any(|spec| node_matches(node, spec))
        })
        .map_or(0, |position| position + 1);

    debug!(index, added = missing.len(), "insertando marcadores en settings");
    for (offset, marker) in missing.into_iter().enumerate() {
        root.children.insert(index + offset, marker);
    }
}

/// Elimina las rutas absolutas y activa `filterPrivacy` en `workbookPr`,
/// creándolo tras `fileVersion` si no existe.
fn mark_workbook(root: &mut Element) {
    let removed = strip_absolute_paths(root);
    if removed > 0 {
        debug!(removed, "rutas absolutas eliminadas del libro");
    }

    if find_child(root, &WORKBOOK_PR).is_none() {
        let workbook_pr = new_child_element(root, &WORKBOOK_PR);
        let index = root
            .children
            .iter()
            .position(|node| node_matches(node, &FILE_VERSION))
            .map_or(0, |position| position + 1);
        root.children.insert(index, XmlNode::Element(workbook_pr));
    }

    if let Some(workbook_pr) = find_child_mut(root, &WORKBOOK_PR) {
        workbook_pr.set_attribute(FILTER_PRIVACY, "1");
    }
}

/// Activa `removePersonalInfoOnSave` en la raíz de `presentation.xml`.
fn mark_presentation(root: &mut Element) {
    if !element_matches(root, &PRESENTATION) {
        debug!(root = root.name.as_str(), "raíz inesperada en la presentación");
        return;
    }
    root.set_attribute(REMOVE_PERSONAL_INFO_ON_SAVE, "1");
}

/// Quita cada `x15ac:absPath` hijo de un `mc:Choice` dentro de un `mc:AlternateContent`,
/// en cualquier nivel del árbol. Devuelve cuántos eliminó.
///
/// Un `mc:AlternateContent` que queda sin contenido tras la limpieza se elimina entero.
fn strip_absolute_paths(element: &mut Element) -> usize {
    let mut removed = 0;

    element.children.retain_mut(|node| {
        let XmlNode::Element(child) = node else {
            return true;
        };

        if element_matches(child, &ALTERNATE_CONTENT) {
            let stripped = strip_choice_paths(child);
            removed += stripped;
            if stripped > 0 && !has_alternate_content(child) {
                return false;
            }
        }

        removed += strip_absolute_paths(child);
        true
    });

    removed
}

fn strip_choice_paths(alternate: &mut Element) -> usize {
    let mut removed = 0;
    for node in alternate.children.iter_mut() {
        if let XmlNode::Element(choice) = node
            && element_matches(choice, &CHOICE)
        {
            let before = choice.children.len();
            choice.children.retain(|node| !node_matches(node, &ABS_PATH));
            removed += before - choice.children.len();
        }
    }
    removed
}

/// Indica si alguna rama (`mc:Choice` o `mc:Fallback`) conserva elementos.
fn has_alternate_content(alternate: &Element) -> bool {
    alternate.children.iter().any(|node| match node {
        XmlNode::Element(branch) => branch
            .children
            .iter()
            .any(|inner| matches!(inner, XmlNode::Element(_))),
        _ => false,
    })
}
