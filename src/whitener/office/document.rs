use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, WhitenError};
use crate::whitener::family::DocumentFamily;

use super::archive::{Access, PartStore};
use super::cache::PartCache;
use super::xml::Element;

/// Etapas por las que pasa un documento abierto. No hay retroceso.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandleState {
    Opened,
    Scrubbing,
    Flushing,
    Closed,
}

/// Documento abierto durante una sesión de limpieza.
///
/// Posee el contenedor y la caché de partes. Se cierra siempre al salir de
/// [`Document::scoped`]; si se suelta sin cerrar, `Drop` confirma lo ya escrito.
pub(crate) struct Document {
    path: PathBuf,
    family: DocumentFamily,
    state: HandleState,
    store: Option<PartStore>,
    cache: PartCache,
}

impl Document {
    pub(crate) fn open(path: &Path, family: DocumentFamily, access: Access) -> Result<Self> {
        let store = PartStore::open(path, access)?;
        Ok(Self {
            path: path.to_path_buf(),
            family,
            state: HandleState::Opened,
            store: Some(store),
            cache: PartCache::default(),
        })
    }

    /// Abre el documento, ejecuta `body` y lo cierra en cualquier caso.
    ///
    /// Si `body` falla, su error prevalece sobre un posible error al cerrar.
    pub(crate) fn scoped<T, F>(
        path: &Path,
        family: DocumentFamily,
        access: Access,
        body: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let mut document = Document::open(path, family, access)?;
        let outcome = body(&mut document);
        let closed = document.close();

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(error)) => Err(error),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(close_error)) => {
                warn!(
                    path = %path.display(),
                    error = %close_error,
                    "error adicional al cerrar tras un fallo"
                );
                Err(error)
            }
        }
    }

    pub(crate) fn family(&self) -> DocumentFamily {
        self.family
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn state(&self) -> HandleState {
        self.state
    }

    fn advance(&mut self, next: HandleState) {
        self.state = self.state.max(next);
    }

    pub(crate) fn has_part(&self, name: &str) -> bool {
        self.store.as_ref().is_some_and(|store| store.contains(name))
    }

    /// Árbol de solo lectura de una parte.
    pub(crate) fn part(&mut self, name: &str) -> Result<&Element> {
        let store = self.store.as_mut().ok_or_else(|| closed_error(&self.path))?;
        self.cache.get_or_parse(store, name)
    }

    /// Árbol mutable de una parte; la parte queda marcada como modificada.
    pub(crate) fn part_mut(&mut self, name: &str) -> Result<&mut Element> {
        self.advance(HandleState::Scrubbing);
        let store = self.store.as_mut().ok_or_else(|| closed_error(&self.path))?;
        self.cache.get_or_parse_mut(store, name)
    }

    /// Escribe el árbol en caché de una parte sobre su contenido previo.
    pub(crate) fn flush(&mut self, name: &str) -> Result<()> {
        self.advance(HandleState::Flushing);
        let store = self.store.as_mut().ok_or_else(|| closed_error(&self.path))?;
        self.cache.flush(store, name)
    }

    /// Confirma las partes escritas y cierra el contenedor. Llamadas repetidas no hacen nada.
    pub(crate) fn close(&mut self) -> Result<()> {
        let Some(store) = self.store.take() else {
            return Ok(());
        };
        self.advance(HandleState::Flushing);

        let unflushed = self.cache.discard();
        if !unflushed.is_empty() {
            warn!(
                path = %self.path.display(),
                parts = ?unflushed,
                "partes modificadas sin escribir; se descartan"
            );
        }

        let result = if store.has_pending_writes() {
            store.commit()
        } else {
            debug!(path = %self.path.display(), "documento cerrado sin escrituras");
            Ok(())
        };
        self.state = HandleState::Closed;
        result
    }
}

fn closed_error(path: &Path) -> WhitenError {
    WhitenError::PackageOpenFailure(format!("{} ya está cerrado", path.display()))
}

impl Drop for Document {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(path = %self.path.display(), %error, "no se pudo cerrar el documento");
        }
    }
}
