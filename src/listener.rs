//! Escucha de los mensajes de la ventana oculta del icono
//!
//! La ventana no es nuestra: se observa mediante un subclass que ejecuta
//! nuestra lógica primero y deja el procesamiento por defecto intacto para
//! todo lo que no sea `WM_DPICHANGED`.

use log::debug;

use crate::backend::{Dispatch, MessageHandler, SubclassId, TrayBackend, WindowMessage};
use crate::constants::WM_DPICHANGED;
use crate::types::{DpiScale, WindowHandle};

/// Suscripción a los mensajes de la ventana del icono
///
/// Guarda solo el handle (sin propiedad) y el id del subclass.
#[derive(Debug)]
pub struct MessageListener {
    window: WindowHandle,
    subclass: SubclassId,
}

impl MessageListener {
    /// Se engancha a la ventana del icono ya visible
    ///
    /// Devuelve `None` si la ventana no existe, su handle es nulo o el
    /// sistema rechaza el subclass.
    pub fn attach<B, F>(backend: &mut B, on_dpi_changed: F) -> Option<Self>
    where
        B: TrayBackend + ?Sized,
        F: FnMut(DpiScale) + 'static,
    {
        let window = backend.host_window().filter(|window| !window.is_null())?;

        let mut on_dpi_changed = on_dpi_changed;
        let handler: MessageHandler =
            Box::new(move |message| handle_message(message, &mut on_dpi_changed));

        let subclass = backend.subclass_window(window, handler)?;
        debug!("Listener enganchado a la ventana {:#x}", window.0);

        Some(Self { window, subclass })
    }

    #[inline]
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// Suelta la suscripción; la ventana queda como estaba
    pub fn close<B>(self, backend: &mut B)
    where
        B: TrayBackend + ?Sized,
    {
        backend.remove_subclass(self.window, self.subclass);
        debug!("Listener liberado de la ventana {:#x}", self.window.0);
    }
}

/// Procesa un mensaje antes que la ventana
pub fn handle_message<F>(message: &mut WindowMessage, on_dpi_changed: &mut F) -> Dispatch
where
    F: FnMut(DpiScale),
{
    match message.id {
        WM_DPICHANGED => {
            on_dpi_changed(DpiScale::from_packed(message.wparam));
            message.result = 0;
            Dispatch::Handled
        }
        _ => Dispatch::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    fn packed(dpi_x: usize, dpi_y: usize) -> usize {
        dpi_x | (dpi_y << 16)
    }

    #[test]
    fn dpi_message_is_forwarded_and_handled() {
        let mut seen = Vec::new();
        let mut message = WindowMessage::new(WM_DPICHANGED, packed(144, 144), 0);
        message.result = 42;

        let dispatch = handle_message(&mut message, &mut |dpi| seen.push(dpi));

        assert_eq!(dispatch, Dispatch::Handled);
        assert_eq!(message.result, 0);
        assert_eq!(seen, vec![DpiScale::new(1.5, 1.5)]);
    }

    #[test]
    fn other_messages_pass_through_untouched() {
        let mut calls = 0;
        for id in [0x0001, 0x0010, 0x0200, 0x02E1] {
            let mut message = WindowMessage::new(id, 7, 9);
            let before = message;

            let dispatch = handle_message(&mut message, &mut |_| calls += 1);

            assert_eq!(dispatch, Dispatch::Default);
            assert_eq!(message, before);
        }
        assert_eq!(calls, 0);
    }

    #[test]
    fn attach_fails_without_window() {
        let fake = FakeBackend::default();
        let mut backend = fake.clone();

        assert!(MessageListener::attach(&mut backend, |_| {}).is_none());
        assert_eq!(fake.subclass_count(), 0);
    }

    #[test]
    fn attach_fails_with_null_window() {
        let fake = FakeBackend::with_window(WindowHandle::NULL);
        let mut backend = fake.clone();

        assert!(MessageListener::attach(&mut backend, |_| {}).is_none());
        assert_eq!(fake.subclass_count(), 0);
    }

    #[test]
    fn attach_fails_when_subclass_is_refused() {
        let fake = FakeBackend::with_window(WindowHandle(0x10));
        fake.refuse_subclass();
        let mut backend = fake.clone();

        assert!(MessageListener::attach(&mut backend, |_| {}).is_none());
    }

    #[test]
    fn attached_listener_sees_messages_and_close_detaches() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let window = WindowHandle(0x10);
        let fake = FakeBackend::with_window(window);
        let mut backend = fake.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let listener =
            MessageListener::attach(&mut backend, move |dpi| sink.borrow_mut().push(dpi)).unwrap();
        assert_eq!(listener.window(), window);

        let reply = fake.send_message(WindowMessage::new(WM_DPICHANGED, packed(192, 192), 0));
        assert_eq!(reply.map(|(dispatch, _)| dispatch), Some(Dispatch::Handled));
        assert_eq!(*seen.borrow(), vec![DpiScale::new(2.0, 2.0)]);

        listener.close(&mut backend);
        assert_eq!(fake.subclass_count(), 0);
        assert_eq!(fake.window(), Some(window));
        assert!(fake.send_message(WindowMessage::new(WM_DPICHANGED, 0, 0)).is_none());
    }
}
