use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, WhitenError};
use crate::whitener::utils::generate_temp_filename;

/// Modo en que se abre el contenedor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    ReadOnly,
    ReadWrite,
}

/// Almacén de partes de un paquete ZIP.
///
/// Las sobrescrituras se acumulan en memoria y se confirman juntas en [`PartStore::commit`].
/// Si no hay ninguna, el archivo original no se toca.
pub(crate) struct PartStore {
    path: PathBuf,
    archive: ZipArchive<File>,
    overwrites: BTreeMap<String, Vec<u8>>,
}

impl PartStore {
    pub(crate) fn open(path: &Path, access: Access) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(access == Access::ReadWrite)
            .open(path)
            .map_err(|e| {
                WhitenError::PackageOpenFailure(format!(
                    "no se pudo abrir {}: {}",
                    path.display(),
                    e
                ))
            })?;
        let archive = ZipArchive::new(file).map_err(|e| {
            WhitenError::PackageOpenFailure(format!("{}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), entries = archive.len(), "paquete abierto");

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            overwrites: BTreeMap::new(),
        })
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.overwrites.contains_key(name) || self.archive.file_names().any(|n| n == name)
    }

    /// Lee el contenido actual de una parte, incluida cualquier sobrescritura pendiente.
    pub(crate) fn read_part(&mut self, name: &str) -> Result<Vec<u8>> {
        if let Some(contents) = self.overwrites.get(name) {
            return Ok(contents.clone());
        }

        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(WhitenError::PartMissing(name.to_string())),
            Err(e) => {
                return Err(WhitenError::PackageOpenFailure(format!(
                    "no se pudo acceder a {}: {}",
                    name, e
                )));
            }
        };

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| {
            WhitenError::PackageOpenFailure(format!("error leyendo {}: {}", name, e))
        })?;
        Ok(contents)
    }

    /// Reemplaza por completo el contenido de una parte existente.
    pub(crate) fn overwrite_part(&mut self, name: &str, contents: Vec<u8>) -> Result<()> {
        if !self.contains(name) {
            return Err(WhitenError::PartMissing(name.to_string()));
        }
        debug!(part = name, bytes = contents.len(), "parte sobrescrita");
        self.overwrites.insert(name.to_string(), contents);
        Ok(())
    }

    pub(crate) fn has_pending_writes(&self) -> bool {
        !self.overwrites.is_empty()
    }

    /// Confirma las partes sobrescritas y cierra el contenedor.
    ///
    /// El paquete se reescribe en un temporal del mismo directorio que luego reemplaza
    /// al original, de modo que un fallo a mitad de escritura no lo deja corrupto.
    pub(crate) fn commit(self) -> Result<()> {
        let PartStore {
            path,
            mut archive,
            overwrites,
        } = self;

        if overwrites.is_empty() {
            debug!(path = %path.display(), "sin cambios que confirmar");
            return Ok(());
        }

        let temp_path = generate_temp_filename(&path);
        let written = rewrite_package(&mut archive, &temp_path, &overwrites);
        drop(archive);

        if let Err(error) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(error);
        }

        if let Ok(metadata) = fs::metadata(&path) {
            let _ = fs::set_permissions(&temp_path, metadata.permissions());
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            WhitenError::write_failure(path.display().to_string(), e)
        })?;

        info!(
            path = %path.display(),
            parts = overwrites.len(),
            "paquete confirmado"
        );
        Ok(())
    }
}

/// Copia todas las entradas del paquete a `output_path` sustituyendo las sobrescritas.
///
/// Las entradas intactas se copian en bruto, sin descomprimir.
fn rewrite_package(
    archive: &mut ZipArchive<File>,
    output_path: &Path,
    overwrites: &BTreeMap<String, Vec<u8>>,
) -> Result<()> {
    let target = output_path.display().to_string();
    let target_file =
        File::create(output_path).map_err(|e| WhitenError::write_failure(target.as_str(), e))?;
    let mut writer = ZipWriter::new(target_file);

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(|e| {
            WhitenError::PackageOpenFailure(format!("error leyendo entrada {}: {}", i, e))
        })?;
        let name = entry.name().to_string();

        let Some(contents) = overwrites.get(&name) else {
            writer
                .raw_copy_file(entry)
                .map_err(|e| WhitenError::write_failure(name.as_str(), e))?;
            continue;
        };

        let method = match entry.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let mut options = FileOptions::<'_, ()>::default().compression_method(method);
        if let Some(mode) = entry.unix_mode() {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = entry.last_modified() {
            options = options.last_modified_time(time);
        }
        drop(entry);

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| WhitenError::write_failure(name.as_str(), e))?;
        writer
            .write_all(contents)
            .map_err(|e| WhitenError::write_failure(name.as_str(), e))?;
    }

    writer
        .finish()
        .map_err(|e| WhitenError::write_failure(target.as_str(), e))?;

    Ok(())
}
