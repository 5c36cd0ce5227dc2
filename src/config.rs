//! Configuración de la aplicación de ejemplo

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::MAX_TOOLTIP_LEN;

/// Valores por defecto de la configuración
pub struct ConfigDefaults;

impl ConfigDefaults {
    pub const TOOLTIP: &'static str = "NotifyFrame";
    pub const LOG_FILTER: &'static str = "info";
}

/// Configuración leída del archivo JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Texto del tooltip
    pub tooltip: String,
    /// Icono (ICO o PNG) relativo al ejecutable; sin él se dibuja uno
    pub icon_path: Option<String>,
    /// Filtro de `env_logger` si no hay `RUST_LOG`
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tooltip: ConfigDefaults::TOOLTIP.to_string(),
            icon_path: None,
            log_filter: ConfigDefaults::LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Valida que los valores estén en rangos válidos
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tooltip.trim().is_empty() {
            return Err("El tooltip no puede estar vacío".to_string());
        }
        if self.tooltip.encode_utf16().count() > MAX_TOOLTIP_LEN {
            return Err(format!(
                "El tooltip no puede superar {} caracteres",
                MAX_TOOLTIP_LEN
            ));
        }
        if let Some(path) = &self.icon_path {
            if path.trim().is_empty() {
                return Err("La ruta del icono no puede estar vacía".to_string());
            }
        }
        if self.log_filter.trim().is_empty() {
            return Err("El filtro de log no puede estar vacío".to_string());
        }
        Ok(())
    }
}

/// Obtiene la ruta del archivo de configuración
/// El archivo se llama igual que el ejecutable pero con extensión .json
/// Ejemplo: notify-frame.exe -> notify-frame.json
pub fn get_config_path() -> std::result::Result<PathBuf, String> {
    let exe_path = std::env::current_exe()
        .map_err(|e| format!("No se pudo obtener la ruta del ejecutable: {}", e))?;

    let exe_dir = exe_path
        .parent()
        .ok_or("No se pudo obtener el directorio del ejecutable")?;

    let config_name = exe_path
        .file_stem()
        .ok_or("No se pudo obtener el nombre del ejecutable")?
        .to_string_lossy()
        .to_string()
        + ".json";

    Ok(exe_dir.join(config_name))
}

/// Carga la configuración desde un archivo concreto
pub fn load_config_from(path: &Path) -> std::result::Result<Settings, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Error al leer {}: {}", path.display(), e))?;
    let settings = serde_json::from_str::<Settings>(&json)
        .map_err(|e| format!("Error al interpretar {}: {}", path.display(), e))?;
    settings.validate()?;
    Ok(settings)
}

/// Carga la configuración de `path`; si no existe se usan los valores por defecto
pub fn load_config_at(path: &Path) -> std::result::Result<Settings, String> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    load_config_from(path)
}

/// Carga la configuración junto al ejecutable
///
/// No registra nada: el logger aún no existe, ya que su filtro sale de
/// aquí. Quien llama decide qué hacer con el error una vez inicializado.
pub fn load_config() -> std::result::Result<Settings, String> {
    load_config_at(&get_config_path()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.tooltip = "   ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.tooltip = "x".repeat(MAX_TOOLTIP_LEN + 1);
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.icon_path = Some(String::new());
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.log_filter = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify-frame.json");
        fs::write(&path, r#"{ "tooltip": "Pantalla", "icon_path": "tray.ico" }"#).unwrap();

        let settings = load_config_from(&path).unwrap();

        assert_eq!(settings.tooltip, "Pantalla");
        assert_eq!(settings.icon_path.as_deref(), Some("tray.ico"));
        assert_eq!(settings.log_filter, ConfigDefaults::LOG_FILTER);
    }

    #[test]
    fn load_rejects_invalid_json_and_values() {
        let dir = tempfile::tempdir().unwrap();

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ tooltip").unwrap();
        assert!(load_config_from(&broken).is_err());

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "tooltip": "" }"#).unwrap();
        assert!(load_config_from(&invalid).is_err());

        assert!(load_config_from(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config_at(&dir.path().join("notify-frame.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn broken_file_is_reported_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify-frame.json");
        fs::write(&path, r#"{ "tooltip": 5 }"#).unwrap();

        let error = load_config_at(&path).unwrap_err();
        assert!(error.contains("notify-frame.json"));
    }
}
