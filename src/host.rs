//! Contenedor del icono de bandeja
//!
//! Es propietario del icono del sistema, recuerda el DPI y la imagen actual y
//! traduce los clics en bruto a eventos de la aplicación. Todo ocurre en el
//! hilo que bombea los mensajes, por eso el estado vive en `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use crate::backend::{ClickKind, MouseButton, TrayBackend, TrayMouseEvent};
use crate::error::{Result, TrayError};
use crate::icon::{decode_icon, IconFrames, IconSource, RenderedIcon};
use crate::listener::MessageListener;
use crate::resource::{FileResourceLoader, ResourceLoader};
use crate::types::{DpiScale, IconSize, ScreenPoint, WindowHandle};

/// Eventos que emite el icono
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    LeftButtonClick,
    RightButtonClick(ScreenPoint),
}

type EventHandler = Box<dyn FnMut(&TrayEvent)>;
type Subscribers = RefCell<Vec<EventHandler>>;

struct HostState<B> {
    backend: B,
    source: Option<IconFrames>,
    dpi: Option<DpiScale>,
    rendered: Option<RenderedIcon>,
    listener: Option<MessageListener>,
    disposed: bool,
}

impl<B: TrayBackend> HostState<B> {
    /// Reacción a `WM_DPICHANGED` reenviado por el listener
    fn on_dpi_changed(&mut self, dpi: DpiScale) {
        if self.disposed {
            return;
        }

        let previous = self.dpi;
        if previous == Some(dpi) {
            return;
        }

        let Some(source) = &self.source else {
            self.dpi = Some(dpi);
            return;
        };

        // La escala solo se da por aplicada si el icono se sustituyó
        let rendered = RenderedIcon::render(source, dpi);
        match self.backend.replace_icon(&rendered) {
            Ok(()) => {
                debug!(
                    "DPI {:?} -> {:?}: icono de {}px",
                    previous,
                    dpi,
                    rendered.size().pixels()
                );
                self.dpi = Some(dpi);
                self.rendered = Some(rendered);
            }
            Err(e) => warn!("No se pudo actualizar el icono tras el cambio de DPI: {}", e),
        }
    }

    /// Traduce un clic en bruto al evento de la aplicación
    fn translate_click(&self, event: TrayMouseEvent) -> Option<TrayEvent> {
        if self.disposed {
            return None;
        }

        // La ventana al frente para que la UI que se abra reciba el foco
        self.backend.set_foreground();

        match (event.kind, event.button) {
            (ClickKind::Click, MouseButton::Right) => {
                let point = self.backend.clicked_point();
                if point.is_none() {
                    debug!("Clic derecho sin posición disponible");
                }
                point.map(TrayEvent::RightButtonClick)
            }
            (ClickKind::Click, _) => Some(TrayEvent::LeftButtonClick),
            (ClickKind::DoubleClick, _) => Some(TrayEvent::LeftButtonClick),
        }
    }
}

/// Icono de bandeja con DPI adaptativo
pub struct IconHost<B: TrayBackend + 'static> {
    state: Rc<RefCell<HostState<B>>>,
    subscribers: Rc<Subscribers>,
    loader: Box<dyn ResourceLoader>,
}

impl<B: TrayBackend + 'static> IconHost<B> {
    /// Crea el contenedor con recursos relativos al ejecutable
    pub fn new(backend: B) -> Self {
        Self::with_loader(backend, FileResourceLoader::beside_executable())
    }

    pub fn with_loader(backend: B, loader: impl ResourceLoader + 'static) -> Self {
        let state = Rc::new(RefCell::new(HostState {
            backend,
            source: None,
            dpi: None,
            rendered: None,
            listener: None,
            disposed: false,
        }));
        let subscribers: Rc<Subscribers> = Rc::new(RefCell::new(Vec::new()));

        let weak_state = Rc::downgrade(&state);
        let weak_subscribers = Rc::downgrade(&subscribers);
        state
            .borrow_mut()
            .backend
            .set_mouse_handler(Box::new(move |event| {
                on_mouse_event(&weak_state, &weak_subscribers, event)
            }));

        Self {
            state,
            subscribers,
            loader: Box::new(loader),
        }
    }

    /// Muestra el icono con el tooltip indicado
    ///
    /// La primera llamada crea el icono del sistema; las siguientes lo
    /// modifican. Tras mostrarlo intenta engancharse a su ventana; si no lo
    /// consigue el icono sigue visible pero no reacciona a cambios de DPI.
    pub fn show_icon(&self, source: impl Into<IconSource>, text: &str) -> Result<()> {
        let source = source.into();
        source.validate()?;

        if self.state.borrow().disposed {
            return Err(TrayError::Disposed);
        }

        let frames = match source {
            IconSource::Resource(id) => {
                let bytes = self
                    .loader
                    .load(&id)
                    .ok_or_else(|| TrayError::ResourceNotFound(id.clone()))?;
                decode_icon(&bytes)?
            }
            IconSource::Image(image) => IconFrames::from(image),
        };

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let dpi = state.backend.notification_area_dpi();
        let rendered = RenderedIcon::render(&frames, dpi);
        state.backend.show(&rendered, text)?;
        debug!(
            "Icono visible a {}px (DPI {:?})",
            rendered.size().pixels(),
            dpi
        );

        state.source = Some(frames);
        state.dpi = Some(dpi);
        state.rendered = Some(rendered);

        if state.listener.is_none() {
            let weak_state = Rc::downgrade(&self.state);
            state.listener = MessageListener::attach(&mut state.backend, move |dpi| {
                forward_dpi_change(&weak_state, dpi)
            });
            if state.listener.is_none() {
                debug!("Ventana del icono no disponible; sin seguimiento de DPI");
            }
        }

        Ok(())
    }

    /// Texto del tooltip
    pub fn text(&self) -> String {
        self.state.borrow().backend.text()
    }

    pub fn set_text(&self, text: &str) {
        self.state.borrow_mut().backend.set_text(text);
    }

    /// Suscribe un receptor a todos los eventos del icono
    pub fn subscribe(&self, handler: impl FnMut(&TrayEvent) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(handler));
    }

    pub fn on_left_click(&self, mut handler: impl FnMut() + 'static) {
        self.subscribe(move |event| {
            if let TrayEvent::LeftButtonClick = event {
                handler();
            }
        });
    }

    pub fn on_right_click(&self, mut handler: impl FnMut(ScreenPoint) + 'static) {
        self.subscribe(move |event| {
            if let TrayEvent::RightButtonClick(point) = event {
                handler(*point);
            }
        });
    }

    /// Escala DPI con la que está renderizado el icono
    pub fn dpi(&self) -> Option<DpiScale> {
        self.state.borrow().dpi
    }

    pub fn icon_size_in_use(&self) -> Option<IconSize> {
        self.state.borrow().rendered.as_ref().map(RenderedIcon::size)
    }

    /// Identidad del icono renderizado actual
    pub fn render_generation(&self) -> Option<u64> {
        self.state
            .borrow()
            .rendered
            .as_ref()
            .map(RenderedIcon::generation)
    }

    /// Indica si hay un listener enganchado a la ventana del icono
    pub fn is_listening(&self) -> bool {
        self.state.borrow().listener.is_some()
    }

    pub fn host_window(&self) -> Option<WindowHandle> {
        let state = self.state.borrow();
        if state.disposed {
            return None;
        }
        state.backend.host_window()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Suelta el listener y elimina el icono; las llamadas repetidas no hacen nada
    pub fn dispose(&self) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.disposed {
            return;
        }
        state.disposed = true;

        if let Some(listener) = state.listener.take() {
            listener.close(&mut state.backend);
        }
        state.backend.remove();
        state.rendered = None;
        state.source = None;
        debug!("Icono de bandeja liberado");
    }
}

impl<B: TrayBackend + 'static> Drop for IconHost<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn forward_dpi_change<B: TrayBackend>(state: &Weak<RefCell<HostState<B>>>, dpi: DpiScale) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => state.on_dpi_changed(dpi),
        Err(_) => warn!("Cambio de DPI recibido durante otra operación; ignorado"),
    };
}

fn on_mouse_event<B: TrayBackend>(
    state: &Weak<RefCell<HostState<B>>>,
    subscribers: &Weak<Subscribers>,
    event: TrayMouseEvent,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let translated = match state.try_borrow() {
        Ok(state) => state.translate_click(event),
        Err(_) => {
            warn!("Clic recibido durante otra operación; ignorado");
            return;
        }
    };

    if let (Some(event), Some(subscribers)) = (translated, subscribers.upgrade()) {
        emit(&subscribers, &event);
    }
}

/// Entrega el evento sin mantener prestada la lista de receptores
fn emit(subscribers: &Subscribers, event: &TrayEvent) {
    let mut handlers = std::mem::take(&mut *subscribers.borrow_mut());
    for handler in handlers.iter_mut() {
        handler(event);
    }

    let mut slot = subscribers.borrow_mut();
    handlers.append(&mut slot);
    *slot = handlers;
}
