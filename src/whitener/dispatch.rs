//! Punto de entrada de la limpieza: decide la familia y orquesta la sesión del documento.

use std::path::Path;
use tracing::info;

use crate::error::{Result, WhitenError};

use super::family::DocumentFamily;
use super::office::{Access, Document, PrivacyMarker, scrub_common_properties};

/// Valida la ruta y determina la familia sin abrir el contenedor.
pub(crate) fn classify(path: &Path) -> Result<DocumentFamily> {
    if !path.is_file() {
        return Err(WhitenError::FileNotFound(path.to_path_buf()));
    }
    DocumentFamily::from_path(path)
}

/// Elimina la información personal de un documento Office en su lugar.
///
/// Limpia las propiedades comunes y activa el marcador de privacidad de la familia.
/// Las partes ya escritas se confirman aunque un paso posterior falle.
pub fn remove_personal_info(path: &Path) -> Result<DocumentFamily> {
    let family = classify(path)?;
    info!(path = %path.display(), %family, "limpiando documento");

    Document::scoped(path, family, Access::ReadWrite, |document| {
        scrub_common_properties(document)?;
        PrivacyMarker::for_family(document.family()).apply(document)
    })?;

    Ok(family)
}
