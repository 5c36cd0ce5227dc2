//! Tipos personalizados y wrappers

use crate::constants::{BASE_DPI, LIMIT_16, LIMIT_32};

/// Handle de ventana nativa que NO es propiedad de quien lo guarda
///
/// Es un valor `Copy` sin `Drop`: soltarlo nunca destruye la ventana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// Handle nulo (ventana inexistente)
    pub const NULL: WindowHandle = WindowHandle(0);

    /// Indica si el handle es nulo
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Representa una posición en coordenadas de pantalla
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Escala DPI del área de notificación respecto a 96 DPI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpiScale {
    pub x: f64,
    pub y: f64,
}

impl Default for DpiScale {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl DpiScale {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Construye la escala a partir de valores DPI absolutos
    pub fn from_dpi(dpi_x: u32, dpi_y: u32) -> Self {
        Self::new(dpi_x as f64 / BASE_DPI, dpi_y as f64 / BASE_DPI)
    }

    /// Decodifica el `wParam` de `WM_DPICHANGED`
    ///
    /// Palabra baja = DPI horizontal, palabra alta = DPI vertical.
    pub fn from_packed(packed: usize) -> Self {
        let dpi_x = (packed & 0xFFFF) as u32;
        let dpi_y = ((packed >> 16) & 0xFFFF) as u32;
        Self::from_dpi(dpi_x, dpi_y)
    }
}

/// Tamaños de icono soportados en la bandeja
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSize {
    Small,
    Medium,
    Large,
}

impl IconSize {
    /// Tamaño adecuado para un factor de escala
    ///
    /// Los límites son inclusivos hacia el tramo inferior, de modo que el
    /// escalado habitual del 125% sigue usando 16x16.
    pub fn for_factor(factor: f64) -> Self {
        if factor <= LIMIT_16 {
            IconSize::Small
        } else if factor <= LIMIT_32 {
            IconSize::Medium
        } else {
            IconSize::Large
        }
    }

    /// Lado del icono en píxeles
    #[inline]
    pub fn pixels(&self) -> u32 {
        match self {
            IconSize::Small => 16,
            IconSize::Medium => 32,
            IconSize::Large => 48,
        }
    }
}
