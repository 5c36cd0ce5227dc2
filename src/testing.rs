//! Backend falso que registra las llamadas, para los tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{
    Dispatch, MessageHandler, MouseHandler, SubclassId, TrayBackend, TrayMouseEvent,
    WindowMessage,
};
use crate::error::{Result, TrayError};
use crate::icon::RenderedIcon;
use crate::types::{DpiScale, IconSize, ScreenPoint, WindowHandle};

struct Subclass {
    id: SubclassId,
    window: WindowHandle,
    handler: Option<MessageHandler>,
}

#[derive(Default)]
struct FakeState {
    dpi: DpiScale,
    window: Option<WindowHandle>,
    visible: bool,
    created: usize,
    modified: usize,
    replaced: usize,
    removed: usize,
    fail_show: bool,
    fail_replace: bool,
    refuse_subclass: bool,
    text: String,
    icon: Option<(IconSize, u64)>,
    released: Vec<u64>,
    subclasses: Vec<Subclass>,
    next_subclass: usize,
    foreground_calls: usize,
    click_point: Option<ScreenPoint>,
    mouse_handler: Option<MouseHandler>,
}

/// Clonar comparte el estado: el test conserva una copia para inspeccionar
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<FakeState>>,
}

impl FakeBackend {
    pub fn with_window(window: WindowHandle) -> Self {
        let fake = Self::default();
        fake.state.borrow_mut().window = Some(window);
        fake
    }

    pub fn set_dpi(&self, dpi: DpiScale) {
        self.state.borrow_mut().dpi = dpi;
    }

    pub fn set_click_point(&self, point: Option<ScreenPoint>) {
        self.state.borrow_mut().click_point = point;
    }

    pub fn fail_show(&self, fail: bool) {
        self.state.borrow_mut().fail_show = fail;
    }

    pub fn fail_replace(&self, fail: bool) {
        self.state.borrow_mut().fail_replace = fail;
    }

    pub fn refuse_subclass(&self) {
        self.state.borrow_mut().refuse_subclass = true;
    }

    pub fn window(&self) -> Option<WindowHandle> {
        self.state.borrow().window
    }

    pub fn visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn created(&self) -> usize {
        self.state.borrow().created
    }

    pub fn modified(&self) -> usize {
        self.state.borrow().modified
    }

    pub fn replaced(&self) -> usize {
        self.state.borrow().replaced
    }

    pub fn removed(&self) -> usize {
        self.state.borrow().removed
    }

    pub fn shown_text(&self) -> String {
        self.state.borrow().text.clone()
    }

    pub fn icon(&self) -> Option<(IconSize, u64)> {
        self.state.borrow().icon
    }

    pub fn released(&self) -> Vec<u64> {
        self.state.borrow().released.clone()
    }

    pub fn subclass_count(&self) -> usize {
        self.state.borrow().subclasses.len()
    }

    pub fn foreground_calls(&self) -> usize {
        self.state.borrow().foreground_calls
    }

    /// Entrega un mensaje a la ventana como lo haría el sistema
    ///
    /// Devuelve `None` si ningún subclass lo observó.
    pub fn send_message(&self, message: WindowMessage) -> Option<(Dispatch, WindowMessage)> {
        let window = self.window()?;
        let (index, mut handler) = {
            let mut state = self.state.borrow_mut();
            let index = state
                .subclasses
                .iter()
                .position(|subclass| subclass.window == window)?;
            (index, state.subclasses[index].handler.take()?)
        };

        let mut message = message;
        let dispatch = handler(&mut message);

        let mut state = self.state.borrow_mut();
        if let Some(subclass) = state.subclasses.get_mut(index) {
            subclass.handler = Some(handler);
        }
        Some((dispatch, message))
    }

    /// Notificación de cambio de DPI con valores absolutos
    pub fn send_dpi_changed(&self, dpi_x: usize, dpi_y: usize) -> Option<(Dispatch, WindowMessage)> {
        self.send_message(WindowMessage::new(
            crate::constants::WM_DPICHANGED,
            dpi_x | (dpi_y << 16),
            0,
        ))
    }

    /// Simula una pulsación sobre el icono
    pub fn click(&self, event: TrayMouseEvent) {
        let handler = self.state.borrow_mut().mouse_handler.take();
        if let Some(mut handler) = handler {
            handler(event);
            self.state.borrow_mut().mouse_handler.get_or_insert(handler);
        }
    }
}

impl TrayBackend for FakeBackend {
    fn notification_area_dpi(&self) -> DpiScale {
        self.state.borrow().dpi
    }

    fn show(&mut self, icon: &RenderedIcon, text: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_show {
            return Err(TrayError::Shell("Shell_NotifyIcon falló".to_string()));
        }
        if state.visible {
            state.modified += 1;
        } else {
            state.created += 1;
            state.visible = true;
        }
        if let Some((_, previous)) = state.icon.replace((icon.size(), icon.generation())) {
            state.released.push(previous);
        }
        state.text = text.to_string();
        Ok(())
    }

    fn replace_icon(&mut self, icon: &RenderedIcon) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_replace {
            return Err(TrayError::Shell("NIM_MODIFY falló".to_string()));
        }
        state.replaced += 1;
        if let Some((_, previous)) = state.icon.replace((icon.size(), icon.generation())) {
            state.released.push(previous);
        }
        Ok(())
    }

    fn remove(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.visible {
            return;
        }
        state.visible = false;
        state.removed += 1;
        if let Some((_, previous)) = state.icon.take() {
            state.released.push(previous);
        }
    }

    fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.state.borrow_mut().text = text.to_string();
    }

    fn host_window(&self) -> Option<WindowHandle> {
        self.state.borrow().window
    }

    fn subclass_window(
        &mut self,
        window: WindowHandle,
        handler: MessageHandler,
    ) -> Option<SubclassId> {
        let mut state = self.state.borrow_mut();
        if state.refuse_subclass {
            return None;
        }
        state.next_subclass += 1;
        let id = SubclassId(state.next_subclass);
        state.subclasses.push(Subclass {
            id,
            window,
            handler: Some(handler),
        });
        Some(id)
    }

    fn remove_subclass(&mut self, window: WindowHandle, id: SubclassId) {
        self.state
            .borrow_mut()
            .subclasses
            .retain(|subclass| !(subclass.id == id && subclass.window == window));
    }

    fn set_foreground(&self) {
        self.state.borrow_mut().foreground_calls += 1;
    }

    fn clicked_point(&self) -> Option<ScreenPoint> {
        self.state.borrow().click_point
    }

    fn set_mouse_handler(&mut self, handler: MouseHandler) {
        self.state.borrow_mut().mouse_handler = Some(handler);
    }
}
