//! Primitivas del sistema operativo que necesita el icono de bandeja

use crate::error::Result;
use crate::icon::RenderedIcon;
use crate::types::{DpiScale, ScreenPoint, WindowHandle};

/// Botón del ratón en un evento de la bandeja
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Tipo de pulsación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Click,
    DoubleClick,
}

/// Evento de ratón en bruto tal y como lo entrega el shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayMouseEvent {
    pub kind: ClickKind,
    pub button: MouseButton,
}

/// Mensaje de ventana observado por un subclass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMessage {
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
    /// Valor devuelto al sistema si el mensaje queda procesado
    pub result: isize,
}

impl WindowMessage {
    pub fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            id,
            wparam,
            lparam,
            result: 0,
        }
    }
}

/// Decide si el procesamiento por defecto de la ventana debe ejecutarse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Mensaje procesado del todo; se devuelve `WindowMessage::result`
    Handled,
    /// Dejar que la ventana lo procese como siempre
    Default,
}

/// Identificador de un subclass instalado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubclassId(pub usize);

pub type MessageHandler = Box<dyn FnMut(&mut WindowMessage) -> Dispatch>;
pub type MouseHandler = Box<dyn FnMut(TrayMouseEvent)>;

/// Recurso de icono de bandeja del sistema operativo
///
/// Todas las llamadas ocurren en el hilo que bombea los mensajes.
pub trait TrayBackend {
    /// Escala DPI actual del área de notificación
    fn notification_area_dpi(&self) -> DpiScale;

    /// Muestra el icono (lo crea la primera vez, lo modifica después)
    fn show(&mut self, icon: &RenderedIcon, text: &str) -> Result<()>;

    /// Sustituye la imagen del icono ya visible, liberando la anterior
    fn replace_icon(&mut self, icon: &RenderedIcon) -> Result<()>;

    /// Elimina el icono de la bandeja; no hace nada si no existe
    fn remove(&mut self);

    fn text(&self) -> String;

    fn set_text(&mut self, text: &str);

    /// Ventana oculta asociada al icono, si ya existe
    fn host_window(&self) -> Option<WindowHandle>;

    /// Instala `handler` antes del procesamiento por defecto de `window`
    fn subclass_window(
        &mut self,
        window: WindowHandle,
        handler: MessageHandler,
    ) -> Option<SubclassId>;

    /// Retira el subclass sin tocar la ventana
    fn remove_subclass(&mut self, window: WindowHandle, id: SubclassId);

    /// Intenta traer al frente la ventana del icono
    fn set_foreground(&self);

    /// Posición en pantalla de la última pulsación sobre el icono
    fn clicked_point(&self) -> Option<ScreenPoint>;

    /// Registra el receptor de eventos de ratón en bruto
    fn set_mouse_handler(&mut self, handler: MouseHandler);
}
