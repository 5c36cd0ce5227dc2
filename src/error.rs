//! Errores del icono de bandeja

use thiserror::Error;

/// Errores que puede devolver [`crate::IconHost`]
#[derive(Debug, Error)]
pub enum TrayError {
    /// Origen de icono nulo o vacío
    #[error("argumento inválido: {0}")]
    InvalidArgument(&'static str),

    /// El cargador de recursos no encontró el identificador
    #[error("recurso de icono no encontrado: {0}")]
    ResourceNotFound(String),

    /// Los bytes del recurso no son una imagen válida
    #[error("no se pudo decodificar el icono: {0}")]
    Decode(#[from] image::ImageError),

    /// El shell rechazó la operación sobre el icono
    #[error("el shell rechazó el icono: {0}")]
    Shell(String),

    /// Error de la API Win32
    #[cfg(windows)]
    #[error(transparent)]
    Win32(#[from] windows::core::Error),

    /// El contenedor ya fue liberado
    #[error("el icono de bandeja ya fue liberado")]
    Disposed,
}

pub type Result<T> = std::result::Result<T, TrayError>;
