//! Subclass de ventanas ajenas con comctl32

use std::cell::RefCell;

use windows::Win32::Foundation::*;
use windows::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};

use crate::backend::{Dispatch, MessageHandler, SubclassId, WindowMessage};
use crate::types::WindowHandle;

type HandlerCell = RefCell<MessageHandler>;

/// Subclass instalado; el handler vive en el heap mientras dure
pub(super) struct InstalledSubclass {
    window: WindowHandle,
    id: SubclassId,
    handler: *mut HandlerCell,
}

impl InstalledSubclass {
    pub(super) fn install(
        window: WindowHandle,
        id: SubclassId,
        handler: MessageHandler,
    ) -> Option<Self> {
        let handler = Box::into_raw(Box::new(RefCell::new(handler)));
        unsafe {
            if SetWindowSubclass(to_hwnd(window), Some(subclass_proc), id.0, handler as usize)
                .as_bool()
            {
                Some(Self {
                    window,
                    id,
                    handler,
                })
            } else {
                drop(Box::from_raw(handler));
                None
            }
        }
    }

    #[inline]
    pub(super) fn matches(&self, window: WindowHandle, id: SubclassId) -> bool {
        self.window == window && self.id == id
    }

    /// Retira el subclass y libera el handler; la ventana no se toca
    pub(super) fn remove(self) {
        unsafe {
            // Si la ventana ya no existe el sistema quitó el subclass por su cuenta
            let _ = RemoveWindowSubclass(to_hwnd(self.window), Some(subclass_proc), self.id.0);
            drop(Box::from_raw(self.handler));
        }
    }
}

pub(super) fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut core::ffi::c_void)
}

pub(super) fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

/// Ejecuta el handler y, salvo que lo procese entero, el procedimiento original
unsafe extern "system" fn subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _id: usize,
    data: usize,
) -> LRESULT {
    let cell = &*(data as *const HandlerCell);
    let mut message = WindowMessage::new(msg, wparam.0, lparam.0);

    let dispatch = match cell.try_borrow_mut() {
        Ok(mut guard) => {
            let handler = &mut *guard;
            handler(&mut message)
        }
        Err(_) => Dispatch::Default,
    };

    match dispatch {
        Dispatch::Handled => LRESULT(message.result),
        Dispatch::Default => DefSubclassProc(hwnd, msg, wparam, lparam),
    }
}
