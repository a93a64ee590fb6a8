//! Utilidades compartidas para generar rutas temporales.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Crea un nombre de archivo temporal en el mismo directorio que `path`.
pub fn generate_temp_filename(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let extension = path.extension().unwrap_or_default().to_string_lossy();

    // Varios hilos pueden limpiar archivos del mismo directorio a la vez.
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    parent.join(format!(
        ".{}_temp_{}_{}.{}",
        stem,
        std::process::id(),
        timestamp,
        extension
    ))
}
