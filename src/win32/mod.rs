//! Backend Win32: `Shell_NotifyIconW`, ventana oculta y subclassing

mod icon;
mod subclass;
mod window;

use log::{debug, warn};
use windows::core::*;
use windows::Win32::Foundation::POINT;
use windows::Win32::Graphics::Gdi::{MonitorFromWindow, MONITOR_DEFAULTTOPRIMARY};
use windows::Win32::UI::HiDpi::{
    GetDpiForMonitor, SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    MDT_EFFECTIVE_DPI,
};
use windows::Win32::UI::Shell::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::backend::{MessageHandler, MouseHandler, SubclassId, TrayBackend};
use crate::constants::{IDM_EXIT, MAX_TOOLTIP_LEN, TRAY_ICON_ID, WM_TRAYICON};
use crate::error::{Result as TrayResult, TrayError};
use crate::icon::RenderedIcon;
use crate::types::{DpiScale, ScreenPoint, WindowHandle};

use icon::OwnedIcon;
use subclass::{from_hwnd, to_hwnd, InstalledSubclass};
use window::TrayWindow;

/// Icono de bandeja del sistema sobre la API Win32
pub struct Win32TrayBackend {
    window: TrayWindow,
    added: bool,
    text: String,
    icon: Option<OwnedIcon>,
    subclasses: Vec<InstalledSubclass>,
    next_subclass: usize,
}

impl Win32TrayBackend {
    /// Crea la ventana oculta; el icono no aparece hasta `show`
    pub fn new() -> TrayResult<Self> {
        Ok(Self {
            window: TrayWindow::create()?,
            added: false,
            text: String::new(),
            icon: None,
            subclasses: Vec::new(),
            next_subclass: 0,
        })
    }

    fn notify_data(&self, flags: NOTIFY_ICON_DATA_FLAGS) -> NOTIFYICONDATAW {
        NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.window.hwnd(),
            uID: TRAY_ICON_ID,
            uFlags: flags,
            uCallbackMessage: WM_TRAYICON,
            ..Default::default()
        }
    }

    fn notify(&self, message: NOTIFY_ICON_MESSAGE, nid: &NOTIFYICONDATAW) -> TrayResult<()> {
        if unsafe { Shell_NotifyIconW(message, nid) }.as_bool() {
            Ok(())
        } else {
            Err(TrayError::Shell(format!(
                "Shell_NotifyIconW({}) falló",
                message.0
            )))
        }
    }
}

impl TrayBackend for Win32TrayBackend {
    fn notification_area_dpi(&self) -> DpiScale {
        unsafe {
            // Monitor de la barra de tareas
            let taskbar = FindWindowW(w!("Shell_TrayWnd"), PCWSTR::null()).unwrap_or_default();
            let monitor = MonitorFromWindow(taskbar, MONITOR_DEFAULTTOPRIMARY);

            let (mut dpi_x, mut dpi_y) = (0u32, 0u32);
            match GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) {
                Ok(()) => DpiScale::from_dpi(dpi_x, dpi_y),
                Err(e) => {
                    warn!("No se pudo obtener el DPI del área de notificación: {}", e);
                    DpiScale::default()
                }
            }
        }
    }

    fn show(&mut self, icon: &RenderedIcon, text: &str) -> TrayResult<()> {
        let handle = OwnedIcon::from_rendered(icon)?;

        let mut nid = self.notify_data(NIF_ICON | NIF_MESSAGE | NIF_TIP);
        nid.hIcon = handle.handle();
        let text = copy_tooltip(&mut nid.szTip, text);

        let message = if self.added { NIM_MODIFY } else { NIM_ADD };
        self.notify(message, &nid)?;

        self.added = true;
        self.text = text;
        // Soltar el HICON anterior
        self.icon = Some(handle);
        Ok(())
    }

    fn replace_icon(&mut self, icon: &RenderedIcon) -> TrayResult<()> {
        if !self.added {
            return Err(TrayError::Shell("el icono no está visible".to_string()));
        }

        let handle = OwnedIcon::from_rendered(icon)?;
        let mut nid = self.notify_data(NIF_ICON);
        nid.hIcon = handle.handle();
        self.notify(NIM_MODIFY, &nid)?;

        self.icon = Some(handle);
        Ok(())
    }

    fn remove(&mut self) {
        if self.added {
            let nid = self.notify_data(NOTIFY_ICON_DATA_FLAGS(0));
            if let Err(e) = self.notify(NIM_DELETE, &nid) {
                warn!("No se pudo eliminar el icono de la bandeja: {}", e);
            }
            self.added = false;
        }
        self.icon = None;
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        let mut nid = self.notify_data(NIF_TIP);
        self.text = copy_tooltip(&mut nid.szTip, text);

        if self.added {
            if let Err(e) = self.notify(NIM_MODIFY, &nid) {
                warn!("No se pudo actualizar el tooltip: {}", e);
            }
        }
    }

    fn host_window(&self) -> Option<WindowHandle> {
        // La ventana solo queda asociada al icono una vez añadido
        if !self.added {
            return None;
        }
        Some(from_hwnd(self.window.hwnd())).filter(|window| !window.is_null())
    }

    fn subclass_window(
        &mut self,
        window: WindowHandle,
        handler: MessageHandler,
    ) -> Option<SubclassId> {
        self.next_subclass += 1;
        let id = SubclassId(self.next_subclass);

        match InstalledSubclass::install(window, id, handler) {
            Some(installed) => {
                self.subclasses.push(installed);
                Some(id)
            }
            None => {
                warn!("SetWindowSubclass falló para la ventana {:#x}", window.0);
                None
            }
        }
    }

    fn remove_subclass(&mut self, window: WindowHandle, id: SubclassId) {
        if let Some(index) = self
            .subclasses
            .iter()
            .position(|installed| installed.matches(window, id))
        {
            self.subclasses.swap_remove(index).remove();
        }
    }

    fn set_foreground(&self) {
        unsafe {
            if !SetForegroundWindow(self.window.hwnd()).as_bool() {
                debug!("SetForegroundWindow no tuvo efecto");
            }
        }
    }

    fn clicked_point(&self) -> Option<ScreenPoint> {
        self.window.state().last_click.get()
    }

    fn set_mouse_handler(&mut self, handler: MouseHandler) {
        match self.window.state().mouse_handler.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(handler),
            Err(_) => warn!("No se puede cambiar el receptor de clics mientras se ejecuta"),
        }
    }
}

impl Drop for Win32TrayBackend {
    fn drop(&mut self) {
        for installed in self.subclasses.drain(..) {
            installed.remove();
        }
        self.remove();
    }
}

/// Copia el tooltip truncado al límite del sistema y devuelve lo copiado
fn copy_tooltip(target: &mut [u16; 128], text: &str) -> String {
    let wide: Vec<u16> = text.encode_utf16().take(MAX_TOOLTIP_LEN).collect();
    target[..wide.len()].copy_from_slice(&wide);
    target[wide.len()] = 0;
    String::from_utf16_lossy(&wide)
}

/// Activa DPI por monitor para recibir `WM_DPICHANGED`
pub fn enable_per_monitor_dpi() {
    unsafe {
        if let Err(e) = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) {
            // Ya fijado por el manifiesto o sistema anterior a Windows 10 1703
            debug!("SetProcessDpiAwarenessContext: {}", e);
        }
    }
}

/// Muestra el menú contextual del icono y devuelve si se eligió salir
pub fn show_exit_menu(window: WindowHandle, point: ScreenPoint) -> bool {
    unsafe {
        let hmenu = match CreatePopupMenu() {
            Ok(hmenu) => hmenu,
            Err(e) => {
                warn!("No se pudo crear el menú contextual: {}", e);
                return false;
            }
        };

        let _ = AppendMenuW(hmenu, MF_STRING, IDM_EXIT as usize, w!("Salir"));

        // Hacer que la ventana sea foreground para que el menú se cierre correctamente
        let hwnd = to_hwnd(window);
        let _ = SetForegroundWindow(hwnd);

        let pt = POINT {
            x: point.x,
            y: point.y,
        };
        let command = TrackPopupMenu(
            hmenu,
            TPM_RIGHTBUTTON | TPM_RETURNCMD,
            pt.x,
            pt.y,
            0,
            hwnd,
            None,
        );

        let _ = DestroyMenu(hmenu);
        command.0 as u32 == IDM_EXIT
    }
}

/// Bucle de mensajes del hilo actual hasta `WM_QUIT`
pub fn run_message_loop() {
    unsafe {
        let mut msg = MSG::default();
        loop {
            let ret = GetMessageW(&mut msg, None, 0, 0);
            if ret.0 == 0 || ret.0 == -1 {
                break; // WM_QUIT o error
            }
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
        }
    }
}

/// Pide al bucle de mensajes que termine
pub fn quit_message_loop() {
    unsafe { PostQuitMessage(0) };
}
