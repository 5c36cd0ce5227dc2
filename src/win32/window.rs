//! Ventana oculta que recibe los mensajes del icono de bandeja

use std::cell::{Cell, RefCell};
use std::sync::Once;

use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::backend::{ClickKind, MouseButton, MouseHandler, TrayMouseEvent};
use crate::constants::WM_TRAYICON;
use crate::types::ScreenPoint;

static REGISTER_CLASS: Once = Once::new();

const CLASS_NAME: PCWSTR = w!("NotifyFrameTrayWindow");

/// Estado accesible desde el procedimiento de ventana
#[derive(Default)]
pub(super) struct TrayWindowState {
    pub(super) mouse_handler: RefCell<Option<MouseHandler>>,
    pub(super) last_click: Cell<Option<ScreenPoint>>,
    /// El botón soltado tras un doble clic no cuenta como clic
    suppress_click: Cell<bool>,
}

impl TrayWindowState {
    unsafe fn handle_tray_message(&self, lparam: LPARAM) {
        let event = match (lparam.0 as u32) & 0xFFFF {
            WM_LBUTTONUP => self.click(MouseButton::Left),
            WM_RBUTTONUP => self.click(MouseButton::Right),
            WM_MBUTTONUP => self.click(MouseButton::Middle),
            WM_LBUTTONDBLCLK => self.double_click(MouseButton::Left),
            WM_RBUTTONDBLCLK => self.double_click(MouseButton::Right),
            WM_MBUTTONDBLCLK => self.double_click(MouseButton::Middle),
            _ => None,
        };
        let Some(event) = event else {
            return;
        };

        // Posición del cursor en el momento de la pulsación
        let mut point = POINT::default();
        let position = GetCursorPos(&mut point)
            .ok()
            .map(|_| ScreenPoint::new(point.x, point.y));
        self.last_click.set(position);

        if let Ok(mut handler) = self.mouse_handler.try_borrow_mut() {
            if let Some(handler) = handler.as_mut() {
                handler(event);
            }
        }
    }

    fn click(&self, button: MouseButton) -> Option<TrayMouseEvent> {
        if self.suppress_click.replace(false) {
            return None;
        }
        Some(TrayMouseEvent {
            kind: ClickKind::Click,
            button,
        })
    }

    fn double_click(&self, button: MouseButton) -> Option<TrayMouseEvent> {
        self.suppress_click.set(true);
        Some(TrayMouseEvent {
            kind: ClickKind::DoubleClick,
            button,
        })
    }
}

/// Ventana top-level nunca visible (recibe también `WM_DPICHANGED`)
pub(super) struct TrayWindow {
    hwnd: HWND,
    state: Box<TrayWindowState>,
}

impl TrayWindow {
    pub(super) fn create() -> Result<Self> {
        unsafe {
            let instance = GetModuleHandleW(None)?;

            let mut registered = Ok(());
            REGISTER_CLASS.call_once(|| {
                let wc = WNDCLASSEXW {
                    cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                    // Sin CS_DBLCLKS el shell no envía dobles clics
                    style: CS_DBLCLKS,
                    lpfnWndProc: Some(tray_window_proc),
                    hInstance: instance.into(),
                    lpszClassName: CLASS_NAME,
                    ..Default::default()
                };
                if RegisterClassExW(&wc) == 0 {
                    registered = Err(Error::from_win32());
                }
            });
            registered?;

            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW,
                CLASS_NAME,
                w!("NotifyFrame"),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                None,
                instance,
                None,
            )?;

            let state = Box::<TrayWindowState>::default();
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, &*state as *const TrayWindowState as isize);

            Ok(Self { hwnd, state })
        }
    }

    #[inline]
    pub(super) fn hwnd(&self) -> HWND {
        self.hwnd
    }

    #[inline]
    pub(super) fn state(&self) -> &TrayWindowState {
        &self.state
    }
}

impl Drop for TrayWindow {
    fn drop(&mut self) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

/// Procedimiento de ventana (solo atiende el callback del icono)
unsafe extern "system" fn tray_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TRAYICON => {
            let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const TrayWindowState;
            if let Some(state) = state.as_ref() {
                state.handle_tray_message(lparam);
            }
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
