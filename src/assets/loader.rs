//! Image and font acquisition behind narrow loader traits.
//!
//! The pipeline's prepare stage funnels all image IO through an
//! [`ImageLoader`], so hosts decide where bytes come from (filesystem,
//! embedded assets, HTTP). Decoded bitmaps are premultiplied RGBA8, the
//! format the CPU rasterizer consumes directly.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{PlacardError, PlacardResult};

/// A decoded, premultiplied RGBA8 bitmap ready to paint.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels, row-major, `width * height * 4` bytes.
    pub pixels: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap raw premultiplied pixels after a length check.
    pub fn from_premul_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> PlacardResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(PlacardError::resource_load(format!(
                "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    pub(crate) fn buffer_identity(&self) -> usize {
        Arc::as_ptr(&self.pixels) as *const () as usize
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into a [`PreparedImage`].
pub fn decode_image(bytes: &[u8]) -> PlacardResult<PreparedImage> {
    let decoded = image::load_from_memory(bytes)
        .context("image decode failed")
        .map_err(|e| PlacardError::resource_load(format!("{e:#}")))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        let p = Rgba8Premul::from_straight_rgba(r, g, b, a);
        pixels.extend_from_slice(&[p.r, p.g, p.b, p.a]);
    }
    PreparedImage::from_premul_rgba8(width, height, pixels)
}

/// Resolves an image `src` locator to a decoded bitmap.
///
/// Called from the prepare stage; results are memoized per element by the
/// element cache, so a loader is only consulted when an element's config
/// content changes.
pub trait ImageLoader {
    /// Fetch and decode the image behind `src`.
    fn load(&mut self, src: &str) -> PlacardResult<PreparedImage>;
}

/// Resolves a font family name to raw font bytes (TTF/OTF).
pub trait FontLoader {
    /// Fetch the font data for `family`.
    fn load(&mut self, family: &str) -> PlacardResult<Vec<u8>>;
}

/// Filesystem-backed [`ImageLoader`] resolving `src` relative to a root.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Loader reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&mut self, src: &str) -> PlacardResult<PreparedImage> {
        let path = self.root.join(src);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image {}", path.display()))
            .map_err(|e| PlacardError::resource_load(format!("{e:#}")))?;
        decode_image(&bytes)
    }
}

/// Filesystem-backed [`FontLoader`] looking up `<family>.ttf` / `<family>.otf`.
#[derive(Clone, Debug)]
pub struct FsFontLoader {
    root: PathBuf,
}

impl FsFontLoader {
    /// Loader reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FontLoader for FsFontLoader {
    fn load(&mut self, family: &str) -> PlacardResult<Vec<u8>> {
        for ext in ["ttf", "otf"] {
            let path = self.root.join(format!("{family}.{ext}"));
            if path.is_file() {
                return std::fs::read(&path)
                    .with_context(|| format!("read font {}", path.display()))
                    .map_err(|e| PlacardError::resource_load(format!("{e:#}")));
            }
        }
        Err(PlacardError::resource_load(format!(
            "no font file for family \"{family}\" under {}",
            self.root.display()
        )))
    }
}

/// LRU memo over another [`ImageLoader`], keyed by `src`.
///
/// Decoupled from the per-element cache: two elements sharing a `src` share
/// one decode, and a reconfigured element re-preparing hits memory instead
/// of the inner loader.
pub struct LruImageCache<L> {
    inner: L,
    capacity: usize,
    images: HashMap<String, PreparedImage>,
    order: VecDeque<String>,
}

impl<L> LruImageCache<L> {
    /// Wrap `inner`, retaining at most `capacity` decoded images.
    pub fn new(inner: L, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            images: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Number of decoded images currently retained.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when no images are retained.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn touch(&mut self, src: &str) {
        if let Some(pos) = self.order.iter().position(|s| s == src) {
            self.order.remove(pos);
        }
        self.order.push_back(src.to_owned());
    }
}

impl<L: ImageLoader> ImageLoader for LruImageCache<L> {
    fn load(&mut self, src: &str) -> PlacardResult<PreparedImage> {
        if let Some(img) = self.images.get(src).cloned() {
            self.touch(src);
            return Ok(img);
        }

        let img = self.inner.load(src)?;
        while self.images.len() >= self.capacity {
            let Some(evicted) = self.order.pop_front() else {
                break;
            };
            self.images.remove(&evicted);
        }
        self.images.insert(src.to_owned(), img.clone());
        self.order.push_back(src.to_owned());
        Ok(img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
