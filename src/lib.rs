//! NotifyFrame - icono de bandeja del sistema con DPI adaptativo
//!
//! [`IconHost`] es el propietario del icono: lo renderiza a 16, 32 o 48 px
//! según la escala del área de notificación y convierte los clics en
//! [`TrayEvent`]. [`MessageListener`] observa la ventana oculta del icono para
//! volver a renderizarlo cuando cambia el DPI.

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod icon;
pub mod listener;
pub mod resource;
pub mod types;

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
mod testing;

// Re-exports públicos
pub use backend::{
    ClickKind, Dispatch, MouseButton, SubclassId, TrayBackend, TrayMouseEvent, WindowMessage,
};
pub use error::{Result, TrayError};
pub use host::{IconHost, TrayEvent};
pub use icon::{IconFrames, IconSource, RenderedIcon};
pub use listener::MessageListener;
pub use resource::{FileResourceLoader, ResourceLoader};
pub use types::{DpiScale, IconSize, ScreenPoint, WindowHandle};

#[cfg(windows)]
pub use win32::Win32TrayBackend;
