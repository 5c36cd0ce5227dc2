//! Constantes Windows, IDs de mensajes y umbrales de DPI

/// Notificación de cambio de DPI (`WM_DPICHANGED`)
pub const WM_DPICHANGED: u32 = 0x02E0;

/// `WM_USER` de Windows, base de los mensajes propios
pub const WM_USER: u32 = 0x0400;

/// Mensaje del system tray icon
pub const WM_TRAYICON: u32 = WM_USER + 100;

/// ID del icono en el system tray
pub const TRAY_ICON_ID: u32 = 1;

/// IDs de elementos del menú contextual
pub const IDM_EXIT: u32 = 1001;

/// DPI de referencia (100%)
pub const BASE_DPI: f64 = 96.0;

/// Límite superior (110%) para 16x16
pub const LIMIT_16: f64 = 1.1;

/// Límite superior (200%) para 32x32
pub const LIMIT_32: f64 = 2.0;

/// Longitud máxima del tooltip en unidades UTF-16 (sin el nulo final)
pub const MAX_TOOLTIP_LEN: usize = 127;
