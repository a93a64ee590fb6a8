//! Limpieza por lotes: recolección de archivos y ejecución aislada por archivo.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::warn;
use walkdir::WalkDir;

use super::dispatch::remove_personal_info;
use super::family::DocumentFamily;

/// Progreso de un lote, en el orden en que ocurre.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleanupEvent {
    Started {
        total: usize,
    },
    Processing {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Success {
        path: PathBuf,
        family: DocumentFamily,
    },
    Failure {
        path: PathBuf,
        kind: String,
        error: String,
    },
    Finished {
        successes: usize,
        failures: usize,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub successes: usize,
    pub failures: usize,
}

/// Archivos de `root` cuya extensión corresponde a una familia soportada.
///
/// Con `recursive` también se recorren los subdirectorios. El resultado está ordenado.
pub fn collect_candidate_files(root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} no es un directorio", root.display()),
        ));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if DocumentFamily::from_path(entry.path()).is_ok() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Limpia cada archivo de forma independiente y notifica el progreso por `sender`.
///
/// Un archivo que falla no detiene al resto. Con `jobs > 1` los archivos se reparten
/// entre varios hilos; cada documento sigue procesándose en un único hilo.
pub fn run_cleanup_with_sender(
    files: Vec<PathBuf>,
    jobs: usize,
    sender: Sender<CleanupEvent>,
) -> BatchSummary {
    let total = files.len();
    let _ = sender.send(CleanupEvent::Started { total });

    let queue = Mutex::new(files.into_iter().enumerate().collect::<VecDeque<_>>());
    let successes = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);
    let workers = jobs.clamp(1, total.max(1));

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let (queue, successes, failures) = (&queue, &successes, &failures);

            scope.spawn(move || {
                loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, path)) = next else {
                        break;
                    };

                    let _ = sender.send(CleanupEvent::Processing {
                        index: index + 1,
                        total,
                        path: path.clone(),
                    });

                    match remove_personal_info(&path) {
                        Ok(family) => {
                            successes.fetch_add(1, Ordering::Relaxed);
                            let _ = sender.send(CleanupEvent::Success { path, family });
                        }
                        Err(error) => {
                            failures.fetch_add(1, Ordering::Relaxed);
                            warn!(path = %path.display(), %error, "no se pudo limpiar");
                            let _ = sender.send(CleanupEvent::Failure {
                                path,
                                kind: error.kind().to_string(),
                                error: error.to_string(),
                            });
                        }
                    }
                }
            });
        }
    });

    let summary = BatchSummary {
        successes: successes.into_inner(),
        failures: failures.into_inner(),
    };
    let _ = sender.send(CleanupEvent::Finished {
        successes: summary.successes,
        failures: summary.failures,
    });
    summary
}
