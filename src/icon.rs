//! Origen del icono y renderizado al tamaño que dicta el DPI

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;

use crate::error::{Result, TrayError};
use crate::types::{DpiScale, IconSize};

/// Contador global de renderizados (identidad de cada [`RenderedIcon`])
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Imagen de origen del icono
#[derive(Debug, Clone)]
pub enum IconSource {
    /// Identificador que resuelve el [`crate::ResourceLoader`]
    Resource(String),
    /// Imagen ya decodificada
    Image(RgbaImage),
}

impl From<&str> for IconSource {
    fn from(id: &str) -> Self {
        IconSource::Resource(id.to_string())
    }
}

impl From<String> for IconSource {
    fn from(id: String) -> Self {
        IconSource::Resource(id)
    }
}

impl From<RgbaImage> for IconSource {
    fn from(image: RgbaImage) -> Self {
        IconSource::Image(image)
    }
}

impl IconSource {
    /// Rechaza identificadores vacíos e imágenes sin píxeles
    pub fn validate(&self) -> Result<()> {
        match self {
            IconSource::Resource(id) if id.trim().is_empty() => {
                Err(TrayError::InvalidArgument("identificador de icono vacío"))
            }
            IconSource::Image(image) if image.width() == 0 || image.height() == 0 => {
                Err(TrayError::InvalidArgument("imagen de icono vacía"))
            }
            _ => Ok(()),
        }
    }
}

/// Fotogramas disponibles del icono de origen
///
/// Un ICO puede traer varios tamaños dibujados a mano; se conservan todos
/// y al renderizar se elige el que mejor encaja.
#[derive(Debug, Clone)]
pub struct IconFrames {
    /// Fotograma de mayor lado
    largest: RgbaImage,
    /// Resto, de menor a mayor lado
    smaller: Vec<RgbaImage>,
}

impl From<RgbaImage> for IconFrames {
    fn from(image: RgbaImage) -> Self {
        Self {
            largest: image,
            smaller: Vec::new(),
        }
    }
}

impl IconFrames {
    /// `None` si no hay ningún fotograma
    fn from_frames(mut frames: Vec<RgbaImage>) -> Option<Self> {
        frames.sort_by_key(|frame| frame.width().max(frame.height()));
        let largest = frames.pop()?;
        Some(Self {
            largest,
            smaller: frames,
        })
    }

    pub fn count(&self) -> usize {
        self.smaller.len() + 1
    }

    fn iter(&self) -> impl Iterator<Item = &RgbaImage> {
        self.smaller.iter().chain(std::iter::once(&self.largest))
    }

    /// Fotograma exacto, o el menor que cubre `side`, o el más grande
    pub fn best_for(&self, side: u32) -> &RgbaImage {
        self.iter()
            .find(|frame| frame.dimensions() == (side, side))
            .or_else(|| {
                self.iter()
                    .find(|frame| frame.width().min(frame.height()) >= side)
            })
            .unwrap_or(&self.largest)
    }
}

/// Decodifica los bytes de un recurso (ICO, PNG) a RGBA
pub fn decode_icon(bytes: &[u8]) -> Result<IconFrames> {
    if let Some(frames) = decode_ico_frames(bytes) {
        return Ok(frames);
    }

    let image = image::load_from_memory(bytes)?.into_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(TrayError::InvalidArgument("imagen de icono vacía"));
    }
    Ok(IconFrames::from(image))
}

/// Todos los fotogramas de un ICO; `None` si no es un ICO legible
fn decode_ico_frames(bytes: &[u8]) -> Option<IconFrames> {
    let dir = ico::IconDir::read(Cursor::new(bytes)).ok()?;
    if dir.resource_type() != ico::ResourceType::Icon {
        return None;
    }

    let frames: Vec<RgbaImage> = dir
        .entries()
        .iter()
        .filter_map(|entry| match entry.decode() {
            Ok(image) => RgbaImage::from_raw(
                image.width(),
                image.height(),
                image.rgba_data().to_vec(),
            ),
            Err(e) => {
                debug!("Fotograma ICO de {}px ignorado: {}", entry.width(), e);
                None
            }
        })
        .filter(|frame| frame.width() > 0 && frame.height() > 0)
        .collect();

    IconFrames::from_frames(frames)
}

/// Bitmap derivado del origen a un tamaño concreto
#[derive(Debug, Clone)]
pub struct RenderedIcon {
    size: IconSize,
    generation: u64,
    pixels: RgbaImage,
}

impl RenderedIcon {
    /// Renderiza `source` al tamaño que corresponde a `dpi`
    ///
    /// Solo se reescala si ningún fotograma tiene el tamaño exacto.
    pub fn render(source: &IconFrames, dpi: DpiScale) -> Self {
        let size = IconSize::for_factor(dpi.x);
        let side = size.pixels();

        let frame = source.best_for(side);
        let pixels = if frame.dimensions() == (side, side) {
            frame.clone()
        } else {
            imageops::resize(frame, side, side, FilterType::Lanczos3)
        };

        Self {
            size,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            pixels,
        }
    }

    #[inline]
    pub fn size(&self) -> IconSize {
        self.size
    }

    /// Identidad del renderizado; cambia en cada regeneración
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Píxeles RGBA, fila a fila de arriba abajo
    #[inline]
    pub fn rgba(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// Dibuja el icono por defecto: círculo púrpura con un punto blanco
pub fn default_badge(side: u32) -> RgbaImage {
    const PURPLE: Rgba<u8> = Rgba([0x88, 0x44, 0xAA, 0xFF]);
    const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    let center = side as f32 / 2.0;
    let radius = center - 1.0;
    let spot = (side as f32 / 8.0).max(1.5);

    RgbaImage::from_fn(side, side, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= spot {
            WHITE
        } else if distance <= radius {
            PURPLE
        } else {
            CLEAR
        }
    })
}
