//! Errores que puede devolver la limpieza de un documento.

use std::path::PathBuf;
use thiserror::Error;

/// Resultado de las operaciones de limpieza.
pub type Result<T> = std::result::Result<T, WhitenError>;

/// Errores tipados de la limpieza de un documento.
///
/// Cada variante lleva un mensaje legible; quien procese lotes decide cómo mostrarlo.
#[derive(Error, Debug)]
pub enum WhitenError {
    /// La ruta no apunta a un archivo existente.
    #[error("No se encontró el archivo: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Formatos binarios antiguos (`doc`, `xls`, `ppt`).
    #[error("El formato antiguo .{0} no está soportado")]
    LegacyFormatUnsupported(String),

    /// Extensión desconocida.
    #[error("Formato no soportado: {0}")]
    UnsupportedFormat(String),

    /// El contenedor no se pudo abrir o una parte requerida no es XML válido.
    #[error("No es un documento Office válido: {0}")]
    PackageOpenFailure(String),

    /// Falta una parte que la limpieza necesita.
    #[error("Falta la parte requerida: {0}")]
    PartMissing(String),

    /// Falló la escritura de una parte o del contenedor.
    #[error("No se pudo escribir {target}: {reason}")]
    WriteFailure { target: String, reason: String },
}

impl WhitenError {
    /// Identificador estable del tipo de error, útil para reportes en JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            WhitenError::FileNotFound(_) => "file_not_found",
            WhitenError::LegacyFormatUnsupported(_) => "legacy_format_unsupported",
            WhitenError::UnsupportedFormat(_) => "unsupported_format",
            WhitenError::PackageOpenFailure(_) => "package_open_failure",
            WhitenError::PartMissing(_) => "part_missing",
            WhitenError::WriteFailure { .. } => "write_failure",
        }
    }

    pub(crate) fn write_failure(target: impl Into<String>, reason: impl ToString) -> Self {
        WhitenError::WriteFailure {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
