//! Icon rendering collaborator.
//!
//! Layout asks an [`IconRenderer`] for a square, single-colour raster of an
//! icon. The bundled [`SvgIconRenderer`] treats [`IconRef`] contents as SVG
//! markup, renders it with resvg and recolours every covered pixel.
//! Renderer failures never escape: a broken icon resolves to `None` and the
//! marker is laid out without one.

use lru::LruCache;
use serde::{Serialize, Serializer};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tiny_skia::Pixmap;
use tracing::warn;

use marker_common::{IconRef, Rgb};

/// Default number of rendered icons kept by [`SvgIconRenderer`].
const DEFAULT_ICON_CACHE_ENTRIES: usize = 128;

/// A rendered icon, premultiplied RGBA.
///
/// Cloning shares the pixel buffer. Equality compares pixels.
#[derive(Clone)]
pub struct IconImage(Arc<Pixmap>);

impl IconImage {
    pub fn new(pixmap: Pixmap) -> Self {
        Self(Arc::new(pixmap))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.0
    }
}

impl PartialEq for IconImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.width() == other.width()
                && self.height() == other.height()
                && self.0.data() == other.0.data())
    }
}

impl std::fmt::Debug for IconImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IconImage({}x{})", self.width(), self.height())
    }
}

impl Serialize for IconImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}x{}", self.width(), self.height()))
    }
}

/// Resolves an icon reference into a recoloured square raster.
pub trait IconRenderer: Send {
    /// Render `icon` at `size_px` square in `color`, or `None` if it cannot
    /// be decoded.
    fn render_icon(&self, icon: &IconRef, size_px: u32, color: Rgb) -> Option<IconImage>;
}

type IconKey = (IconRef, u32, Rgb);

/// SVG icon renderer with an LRU of results keyed by `(icon, size, colour)`.
///
/// Failed decodes are cached too, so a broken icon is reported once.
pub struct SvgIconRenderer {
    cache: Mutex<LruCache<IconKey, Option<IconImage>>>,
}

impl Default for SvgIconRenderer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ICON_CACHE_ENTRIES)
    }
}

impl SvgIconRenderer {
    pub fn with_capacity(entries: usize) -> Self {
        let capacity = NonZeroUsize::new(entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl IconRenderer for SvgIconRenderer {
    fn render_icon(&self, icon: &IconRef, size_px: u32, color: Rgb) -> Option<IconImage> {
        let key = (icon.clone(), size_px, color);
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }

        let rendered = rasterize_svg(icon.as_str(), size_px).map(|mut pixmap| {
            tint(&mut pixmap, color);
            IconImage::new(pixmap)
        });
        cache.put(key, rendered.clone());
        rendered
    }
}

/// Render SVG markup scaled to fit and centred in a `size` square.
fn rasterize_svg(svg: &str, size: u32) -> Option<Pixmap> {
    let opt = usvg::Options::default();
    let tree = match usvg::Tree::from_str(svg, &opt) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "Failed to decode marker icon; laying out without it");
            return None;
        }
    };

    let mut pixmap = Pixmap::new(size, size)?;

    let svg_size = tree.size();
    let scale = (size as f32 / svg_size.width()).min(size as f32 / svg_size.height());
    let offset_x = (size as f32 - svg_size.width() * scale) / 2.0;
    let offset_y = (size as f32 - svg_size.height() * scale) / 2.0;

    let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(offset_x, offset_y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Some(pixmap)
}

/// Replace the colour of every pixel with `color`, keeping its coverage.
fn tint(pixmap: &mut Pixmap, color: Rgb) {
    for px in pixmap.data_mut().chunks_exact_mut(4) {
        let a = px[3] as u32;
        px[0] = ((color.r as u32 * a + 127) / 255) as u8;
        px[1] = ((color.g as u32 * a + 127) / 255) as u8;
        px[2] = ((color.b as u32 * a + 127) / 255) as u8;
    }
}
