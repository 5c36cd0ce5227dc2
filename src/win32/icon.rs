//! Conversión de iconos renderizados a HICON

use windows::core::*;
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::icon::RenderedIcon;

/// HICON propio; se destruye al soltarlo
pub(super) struct OwnedIcon(HICON);

impl OwnedIcon {
    /// Crea el HICON a partir de los píxeles RGBA
    pub(super) fn from_rendered(icon: &RenderedIcon) -> Result<Self> {
        unsafe { create_icon(icon).map(OwnedIcon) }
    }

    #[inline]
    pub(super) fn handle(&self) -> HICON {
        self.0
    }
}

impl Drop for OwnedIcon {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyIcon(self.0);
        }
    }
}

unsafe fn create_icon(icon: &RenderedIcon) -> Result<HICON> {
    let side = icon.size().pixels() as i32;

    // DIB de 32 bits de arriba abajo para el color con alfa
    let info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: side,
            biHeight: -side,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let screen_dc = GetDC(None);
    if screen_dc.is_invalid() {
        return Err(Error::from_win32());
    }

    let mut bits: *mut core::ffi::c_void = std::ptr::null_mut();
    let color_bitmap = CreateDIBSection(screen_dc, &info, DIB_RGB_COLORS, &mut bits, None, 0);
    let _ = ReleaseDC(None, screen_dc);
    let color_bitmap = color_bitmap?;

    if bits.is_null() {
        let _ = DeleteObject(color_bitmap);
        return Err(Error::from_win32());
    }

    // RGBA -> BGRA
    let len = (side * side * 4) as usize;
    let target = std::slice::from_raw_parts_mut(bits as *mut u8, len);
    for (dst, src) in target.chunks_exact_mut(4).zip(icon.rgba().chunks_exact(4)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
        dst[3] = src[3];
    }

    // Máscara vacía: la transparencia la aporta el canal alfa
    let mask_bitmap = CreateBitmap(side, side, 1, 1, None);
    if mask_bitmap.is_invalid() {
        let _ = DeleteObject(color_bitmap);
        return Err(Error::from_win32());
    }

    let icon_info = ICONINFO {
        fIcon: true.into(),
        xHotspot: 0,
        yHotspot: 0,
        hbmMask: mask_bitmap,
        hbmColor: color_bitmap,
    };

    let icon = CreateIconIndirect(&icon_info);

    // CreateIconIndirect copia los bitmaps
    let _ = DeleteObject(color_bitmap);
    let _ = DeleteObject(mask_bitmap);

    icon
}
