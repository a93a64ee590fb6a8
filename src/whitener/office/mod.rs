//! Acceso a paquetes Office Open XML y mutaciones de sus partes.

mod archive;
mod cache;
mod document;
mod privacy;
mod properties;
mod rels;
mod xml;

pub use document::HandleState;
pub use privacy::PrivacyMarker;

pub(crate) use archive::Access;
pub(crate) use document::Document;
pub(crate) use properties::{
    COMPANY, CORE_PROPERTIES, CREATOR, EXTENDED_PROPERTIES, LAST_MODIFIED_BY, REVISION, TITLE,
    TOTAL_TIME, scrub_common_properties,
};
pub(crate) use rels::{PACKAGE_SOURCE, require_related_part};
pub(crate) use xml::{FieldSpec, element_matches, element_text_content, find_child};

#[cfg(test)]
pub(crate) use properties::{scrub_core_properties, scrub_extended_properties};
#[cfg(test)]
pub(crate) use rels::{rels_part_for, resolve_target};
#[cfg(test)]
pub(crate) use xml::{Element, XmlNode, parse_part, serialize_part};
