//! NotifyFrame - ejemplo de icono de bandeja con DPI adaptativo
//!
//! Clic izquierdo: se registra en el log
//! Clic derecho: menú con la opción de salir

#![cfg_attr(windows, windows_subsystem = "windows")]

use notify_frame::config::{load_config, Settings};

fn init_logging(settings: &Settings) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_filter.as_str()),
    )
    .init();
}

/// Lee la configuración e inicializa el log con ella
///
/// El error de carga se registra después de crear el logger.
fn load_settings() -> Settings {
    let loaded = load_config();
    let settings = loaded.clone().unwrap_or_default();
    init_logging(&settings);

    if let Err(e) = loaded {
        log::warn!("{}; se usan valores por defecto", e);
    }
    settings
}

#[cfg(windows)]
fn main() {
    let settings = load_settings();

    if let Err(e) = run(&settings) {
        log::error!("NotifyFrame terminó con error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(windows)]
fn run(settings: &Settings) -> notify_frame::Result<()> {
    use notify_frame::icon::default_badge;
    use notify_frame::win32::{
        enable_per_monitor_dpi, quit_message_loop, run_message_loop, show_exit_menu,
    };
    use notify_frame::{IconHost, IconSource, Win32TrayBackend};

    enable_per_monitor_dpi();

    let host = IconHost::new(Win32TrayBackend::new()?);

    let source = match &settings.icon_path {
        Some(path) => IconSource::from(path.as_str()),
        None => IconSource::from(default_badge(64)),
    };
    host.show_icon(source, &settings.tooltip)?;

    if !host.is_listening() {
        log::warn!("Sin acceso a la ventana del icono; no se seguirán los cambios de DPI");
    }

    host.on_left_click(|| log::info!("Clic izquierdo en el icono"));

    if let Some(window) = host.host_window() {
        host.on_right_click(move |point| {
            if show_exit_menu(window, point) {
                quit_message_loop();
            }
        });
    }

    log::info!("Icono visible: {}", settings.tooltip);
    run_message_loop();

    host.dispose();
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    let settings = load_settings();

    log::error!("NotifyFrame solo funciona en Windows");
    std::process::exit(1);
}
