//! Clasificación de archivos en familias de documentos según su extensión.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Result, WhitenError};

use super::constants::{
    LEGACY_EXTENSIONS, NO_EXTENSION_LABEL, PRESENTATION_EXTENSIONS, SPREADSHEET_EXTENSIONS,
    WORD_EXTENSIONS,
};

/// Familias de documentos Office Open XML soportadas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFamily {
    WordProcessing,
    Spreadsheet,
    Presentation,
}

impl DocumentFamily {
    /// Determina la familia a partir de una extensión, sin distinguir mayúsculas.
    ///
    /// Acepta la extensión con o sin punto inicial.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        let ext = extension.as_str();

        if WORD_EXTENSIONS.contains(&ext) {
            Ok(DocumentFamily::WordProcessing)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext) {
            Ok(DocumentFamily::Spreadsheet)
        } else if PRESENTATION_EXTENSIONS.contains(&ext) {
            Ok(DocumentFamily::Presentation)
        } else if LEGACY_EXTENSIONS.contains(&ext) {
            Err(WhitenError::LegacyFormatUnsupported(extension))
        } else if ext.is_empty() {
            Err(WhitenError::UnsupportedFormat(NO_EXTENSION_LABEL.to_string()))
        } else {
            Err(WhitenError::UnsupportedFormat(format!(".{extension}")))
        }
    }

    /// Determina la familia a partir de la extensión de `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy())
            .unwrap_or_default();
        Self::from_extension(&extension)
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFamily::WordProcessing => "Documento de texto",
            DocumentFamily::Spreadsheet => "Hoja de cálculo",
            DocumentFamily::Presentation => "Presentación",
        }
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
