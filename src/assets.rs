//! Asset collaborator: turns an [`ImageRef`] into pixels and a size.
//!
//! The board core never decodes images. Frontends resolve an image once when
//! it is dropped, size the node from the result, and keep the pixels for
//! drawing. PNG files are decoded with tiny-skia and SVG files are rasterized
//! with usvg/resvg. Anything else is a [`BoardError::MissingAsset`], in which
//! case the node is still created and drawn as a placeholder.

use std::path::Path;

use log::warn;

use crate::error::BoardError;
use crate::types::ImageRef;

/// A decoded image in premultiplied RGBA8.
#[derive(Clone, PartialEq)]
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Premultiplied RGBA bytes, row-major
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Intrinsic size as floats.
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Resolves image references to decoded pixels.
pub trait AssetResolver {
    /// Loads the image behind `image_ref`.
    fn load(&self, image_ref: &ImageRef) -> Result<DecodedImage, BoardError>;
}

/// Loads images from the local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FsAssetResolver {
    /// SVGs are rasterized to fit inside this box
    pub raster_box: (f32, f32),
}

impl FsAssetResolver {
    /// Creates a resolver that rasterizes vector images into `raster_box`.
    pub fn new(raster_box: (f32, f32)) -> Self {
        Self { raster_box }
    }

    fn load_png(path: &Path) -> Result<DecodedImage, String> {
        let pixmap = tiny_skia::Pixmap::load_png(path).map_err(|e| e.to_string())?;
        Ok(DecodedImage {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels: pixmap.take(),
        })
    }

    fn load_svg(&self, path: &Path) -> Result<DecodedImage, String> {
        let data = std::fs::read(path).map_err(|e| e.to_string())?;
        let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
            .map_err(|e| e.to_string())?;

        let intrinsic = (tree.size().width(), tree.size().height());
        let (width, height) = fit_within(intrinsic, self.raster_box);
        let scale = if intrinsic.0 > 0.0 { width / intrinsic.0 } else { 1.0 };
        let out_w = width.round().max(1.0) as u32;
        let out_h = height.round().max(1.0) as u32;

        let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h)
            .ok_or_else(|| format!("cannot allocate {out_w}x{out_h} pixmap"))?;
        let transform = tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(DecodedImage {
            width: out_w,
            height: out_h,
            pixels: pixmap.take(),
        })
    }
}

impl Default for FsAssetResolver {
    fn default() -> Self {
        Self::new((crate::constants::NODE_WIDTH, crate::constants::NODE_HEIGHT))
    }
}

impl AssetResolver for FsAssetResolver {
    fn load(&self, image_ref: &ImageRef) -> Result<DecodedImage, BoardError> {
        let path = Path::new(image_ref.as_str());
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let result = match extension.as_deref() {
            Some("png") => Self::load_png(path),
            Some("svg") => self.load_svg(path),
            _ => Err("unsupported image format".to_string()),
        };

        result.map_err(|reason| {
            warn!("Could not load image {image_ref}: {reason}");
            BoardError::MissingAsset(format!("{image_ref}: {reason}"))
        })
    }
}

/// Scales `size` to fit inside `bounds`, preserving aspect ratio.
///
/// Images smaller than the box are scaled up, matching how dropped images are
/// thumbnailed into a uniform node size. Degenerate sizes fall back to `bounds`.
pub fn fit_within(size: (f32, f32), bounds: (f32, f32)) -> (f32, f32) {
    if size.0 <= 0.0 || size.1 <= 0.0 || !size.0.is_finite() || !size.1.is_finite() {
        return bounds;
    }
    let scale = (bounds.0 / size.0).min(bounds.1 / size.1);
    (size.0 * scale, size.1 * scale)
}

/// Resolves an image and picks the node size for it.
///
/// Returns the size to give the node and, when the image could be loaded,
/// its pixels. A missing image yields the full `node_box` and no pixels.
pub fn resolve_node_image(
    resolver: &dyn AssetResolver,
    image_ref: &ImageRef,
    node_box: (f32, f32),
) -> ((f32, f32), Option<DecodedImage>) {
    match resolver.load(image_ref) {
        Ok(image) => (fit_within(image.size(), node_box), Some(image)),
        Err(_) => (node_box, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_fit_within_preserves_aspect() {
        let (w, h) = fit_within((200.0, 100.0), (80.0, 80.0));
        assert!(approx_eq!(f32, w, 80.0));
        assert!(approx_eq!(f32, h, 40.0));

        let (w, h) = fit_within((10.0, 40.0), (80.0, 80.0));
        assert!(approx_eq!(f32, w, 20.0));
        assert!(approx_eq!(f32, h, 80.0));
    }

    #[test]
    fn test_fit_within_degenerate_size() {
        assert_eq!(fit_within((0.0, 10.0), (80.0, 80.0)), (80.0, 80.0));
        assert_eq!(fit_within((f32::NAN, 10.0), (80.0, 80.0)), (80.0, 80.0));
    }

    #[test]
    fn test_missing_file_is_missing_asset() {
        let resolver = FsAssetResolver::default();
        let result = resolver.load(&ImageRef::new("/definitely/not/here.png"));
        assert!(matches!(result, Err(BoardError::MissingAsset(_))));
    }

    #[test]
    fn test_unsupported_extension_is_missing_asset() {
        let resolver = FsAssetResolver::default();
        let result = resolver.load(&ImageRef::new("notes.txt"));
        assert!(matches!(result, Err(BoardError::MissingAsset(_))));
    }

    #[test]
    fn test_loads_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        tiny_skia::Pixmap::new(40, 20).unwrap().save_png(&path).unwrap();

        let resolver = FsAssetResolver::default();
        let image = resolver
            .load(&ImageRef::new(path.to_string_lossy()))
            .unwrap();

        assert_eq!((image.width, image.height), (40, 20));
        assert_eq!(image.pixels.len(), 40 * 20 * 4);
    }

    #[test]
    fn test_rasterizes_svg_into_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tall.svg");
        std::fs::write(
            &path,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20"><rect width="10" height="20" fill="red"/></svg>"#,
        )
        .unwrap();

        let resolver = FsAssetResolver::new((80.0, 80.0));
        let image = resolver
            .load(&ImageRef::new(path.to_string_lossy()))
            .unwrap();

        assert_eq!((image.width, image.height), (40, 80));
    }

    #[test]
    fn test_resolve_node_image_falls_back_to_box() {
        let resolver = FsAssetResolver::default();
        let (size, image) =
            resolve_node_image(&resolver, &ImageRef::new("missing.png"), (80.0, 80.0));
        assert_eq!(size, (80.0, 80.0));
        assert!(image.is_none());
    }
}
