//! Carga de recursos de icono por identificador

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

/// Convierte un identificador en los bytes de un icono
pub trait ResourceLoader {
    /// Devuelve `None` si el recurso no existe
    fn load(&self, id: &str) -> Option<Vec<u8>>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&str) -> Option<Vec<u8>>,
{
    fn load(&self, id: &str) -> Option<Vec<u8>> {
        self(id)
    }
}

/// Cargador que lee ficheros relativos a un directorio raíz
#[derive(Debug, Clone)]
pub struct FileResourceLoader {
    root: PathBuf,
}

impl FileResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cargador relativo al directorio del ejecutable
    pub fn beside_executable() -> Self {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self::new(root)
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ResourceLoader for FileResourceLoader {
    fn load(&self, id: &str) -> Option<Vec<u8>> {
        let path = self.resolve(id);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("No se pudo leer el recurso {}: {}", path.display(), e);
                None
            }
        }
    }
}
