//! Limpieza de las propiedades comunes a todas las familias (`core.xml` y `app.xml`).

use tracing::{debug, info};

use crate::error::Result;
use crate::whitener::constants::{
    APP_NS, CORE_PROPERTIES_REL, CP_NS, DC_NS, EXTENDED_PROPERTIES_REL,
};

use super::document::Document;
use super::rels::{PACKAGE_SOURCE, require_related_part};
use super::xml::{
    Element, FieldSpec, XmlNode, blank_text_nodes, element_matches, find_child_mut, node_matches,
    set_element_text,
};

pub(crate) const CORE_PROPERTIES: FieldSpec<'static> =
    FieldSpec::new("cp", "coreProperties", CP_NS);
pub(crate) const CREATOR: FieldSpec<'static> = FieldSpec::new("dc", "creator", DC_NS);
pub(crate) const LAST_MODIFIED_BY: FieldSpec<'static> =
    FieldSpec::new("cp", "lastModifiedBy", CP_NS);
pub(crate) const TITLE: FieldSpec<'static> = FieldSpec::new("dc", "title", DC_NS);
pub(crate) const REVISION: FieldSpec<'static> = FieldSpec::new("cp", "revision", CP_NS);

pub(crate) const EXTENDED_PROPERTIES: FieldSpec<'static> =
    FieldSpec::unprefixed("Properties", APP_NS);
pub(crate) const COMPANY: FieldSpec<'static> = FieldSpec::unprefixed("Company", APP_NS);
pub(crate) const TOTAL_TIME: FieldSpec<'static> = FieldSpec::unprefixed("TotalTime", APP_NS);

/// Campos de autoría cuyo texto se vacía sin eliminar el elemento.
const BLANKED_CORE_FIELDS: [FieldSpec<'static>; 3] = [CREATOR, LAST_MODIFIED_BY, TITLE];

/// Limpia `app.xml` y `core.xml` y escribe ambas partes completas.
pub(crate) fn scrub_common_properties(document: &mut Document) -> Result<()> {
    let extended = require_related_part(document, PACKAGE_SOURCE, EXTENDED_PROPERTIES_REL)?;
    let core = require_related_part(document, PACKAGE_SOURCE, CORE_PROPERTIES_REL)?;

    scrub_extended_properties(document.part_mut(&extended)?);
    document.flush(&extended)?;

    scrub_core_properties(document.part_mut(&core)?);
    document.flush(&core)?;

    info!(extended = extended.as_str(), core = core.as_str(), "propiedades comunes limpiadas");
    Ok(())
}

/// Elimina `Company` y reinicia `TotalTime` a `0`. Nunca crea elementos.
pub(crate) fn scrub_extended_properties(root: &mut Element) {
    if !element_matches(root, &EXTENDED_PROPERTIES) {
        debug!(root = root.name.as_str(), "raíz inesperada en propiedades extendidas");
        return;
    }

    root.children.retain(|node| !node_matches(node, &COMPANY));

    if let Some(total_time) = find_child_mut(root, &TOTAL_TIME) {
        set_element_text(total_time, "0");
    }
}

/// Vacía autor, último editor y título, y reinicia `revision` a `1`. Nunca crea elementos.
pub(crate) fn scrub_core_properties(root: &mut Element) {
    if !element_matches(root, &CORE_PROPERTIES) {
        debug!(root = root.name.as_str(), "raíz inesperada en propiedades principales");
        return;
    }

    for node in root.children.iter_mut() {
        if let XmlNode::Element(field) = node
            && BLANKED_CORE_FIELDS
                .iter()
                .any(|spec| element_matches(field, spec))
        {
            blank_text_nodes(field);
        }
    }

    if let Some(revision) = find_child_mut(root, &REVISION) {
        set_element_text(revision, "1");
    }
}
