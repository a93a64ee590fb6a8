//! Resolución de partes a través de las relaciones del paquete.

use tracing::debug;

use crate::error::{Result, WhitenError};
use crate::whitener::constants::RELS_NS;

use super::document::Document;
use super::xml::{FieldSpec, XmlNode, element_matches};

/// Origen que representa al paquete completo (`_rels/.rels`).
pub(crate) const PACKAGE_SOURCE: &str = "";

const RELATIONSHIPS: FieldSpec<'static> = FieldSpec::unprefixed("Relationships", RELS_NS);
const RELATIONSHIP: FieldSpec<'static> = FieldSpec::unprefixed("Relationship", RELS_NS);

/// Nombre de la parte de relaciones de `source`.
pub(crate) fn rels_part_for(source: &str) -> String {
    if source.is_empty() {
        return "_rels/.rels".to_string();
    }
    match source.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/_rels/{name}.rels"),
        None => format!("_rels/{source}.rels"),
    }
}

/// Convierte el `Target` de una relación en el nombre de la entrada dentro del ZIP.
pub(crate) fn resolve_target(source: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        match source.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        }
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Busca la primera relación interna de tipo `rel_type` que parte de `source`.
pub(crate) fn find_related_part(
    document: &mut Document,
    source: &str,
    rel_type: &str,
) -> Result<String> {
    let rels_name = rels_part_for(source);
    if !document.has_part(&rels_name) {
        return Err(WhitenError::PartMissing(rels_name));
    }

    let root = document.part(&rels_name)?;
    if !element_matches(root, &RELATIONSHIPS) {
        return Err(WhitenError::PackageOpenFailure(format!(
            "{} no contiene relaciones",
            rels_name
        )));
    }

    let target = root
        .children
        .iter()
        .filter_map(|node| match node {
            XmlNode::Element(rel) if element_matches(rel, &RELATIONSHIP) => Some(rel),
            _ => None,
        })
        .filter(|rel| rel.attribute("TargetMode") != Some("External"))
        .find(|rel| rel.attribute("Type") == Some(rel_type))
        .and_then(|rel| rel.attribute("Target"))
        .map(|target| resolve_target(source, target));

    match target {
        Some(part) => {
            debug!(source, rel_type, part = part.as_str(), "relación resuelta");
            Ok(part)
        }
        None => Err(WhitenError::PartMissing(format!(
            "relación {} en {}",
            rel_type, rels_name
        ))),
    }
}

/// Resuelve la relación y comprueba que la parte destino exista en el paquete.
pub(crate) fn require_related_part(
    document: &mut Document,
    source: &str,
    rel_type: &str,
) -> Result<String> {
    let part = find_related_part(document, source, rel_type)?;
    if !document.has_part(&part) {
        return Err(WhitenError::PartMissing(part));
    }
    Ok(part)
}
