use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

use crate::error::Result;

use super::archive::PartStore;
use super::xml::{Element, XmlPart, parse_part, serialize_part};

struct CachedPart {
    tree: XmlPart,
    dirty: bool,
}

/// Árboles XML ya analizados, indexados por nombre de parte.
///
/// Toda mutación de una parte pasa por el mismo árbol; nada se escribe hasta que se
/// llama a [`PartCache::flush`].
#[derive(Default)]
pub(crate) struct PartCache {
    entries: HashMap<String, CachedPart>,
}

impl PartCache {
    fn entry(&mut self, store: &mut PartStore, part: &str) -> Result<&mut CachedPart> {
        match self.entries.entry(part.to_string()) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => {
                let contents = store.read_part(part)?;
                let tree = parse_part(part, &contents)?;
                debug!(part, "parte analizada");
                Ok(vacant.insert(CachedPart { tree, dirty: false }))
            }
        }
    }

    pub(crate) fn get_or_parse(&mut self, store: &mut PartStore, part: &str) -> Result<&Element> {
        Ok(&self.entry(store, part)?.tree.root)
    }

    pub(crate) fn get_or_parse_mut(
        &mut self,
        store: &mut PartStore,
        part: &str,
    ) -> Result<&mut Element> {
        let cached = self.entry(store, part)?;
        cached.dirty = true;
        Ok(&mut cached.tree.root)
    }

    /// Serializa el árbol en caché y reemplaza con él el contenido completo de la parte.
    pub(crate) fn flush(&mut self, store: &mut PartStore, part: &str) -> Result<()> {
        let cached = self.entry(store, part)?;
        let contents = serialize_part(part, &cached.tree)?;
        store.overwrite_part(part, contents)?;
        cached.dirty = false;
        Ok(())
    }

    /// Descarta todos los árboles y devuelve los nombres de los que quedaron sin escribir.
    pub(crate) fn discard(&mut self) -> Vec<String> {
        let mut unflushed: Vec<String> = self
            .entries
            .drain()
            .filter(|(_, cached)| cached.dirty)
            .map(|(name, _)| name)
            .collect();
        unflushed.sort();
        unflushed
    }
}
