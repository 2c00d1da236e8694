//! Watermark: decode the background image once and paint it on every page.
//!
//! The watermark is optional. A path that does not exist yields `Ok(None)` and
//! the document is produced without one; a file that exists but cannot be
//! decoded is an error, since that usually means the wrong file was supplied.
//!
//! Large images are downscaled before embedding. The image is stored once in
//! the PDF and referenced from every page, but a multi-megapixel photo would
//! still dominate the size of a document that is otherwise a few kilobytes.

use crate::config::{mm, SheetStyle};
use crate::error::TripSheetError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use printpdf::ops::Op;
use printpdf::xobject::XObjectTransform;
use printpdf::{ExtendedGraphicsStateId, Pt, XObjectId};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A decoded watermark, re-encoded as PNG ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    source: PathBuf,
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl Watermark {
    /// Load the watermark at `path`, capping its longest edge at the default
    /// limit.
    ///
    /// # Errors
    /// [`TripSheetError::WatermarkDecode`] if the file exists but is not a
    /// readable image.
    pub fn load(path: &Path) -> Result<Option<Self>, TripSheetError> {
        Self::load_with_max_px(path, SheetStyle::default().watermark_max_px)
    }

    /// Like [`Watermark::load`] with an explicit pixel limit.
    pub fn load_with_max_px(path: &Path, max_px: u32) -> Result<Option<Self>, TripSheetError> {
        if !path.exists() {
            info!(
                "Watermark '{}' not found; generating without a watermark",
                path.display()
            );
            return Ok(None);
        }

        let bytes = std::fs::read(path).map_err(|e| TripSheetError::WatermarkDecode {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_bytes(&bytes, path, max_px).map(Some)
    }

    /// Decode an in-memory image. `source` is only used in messages.
    pub fn from_bytes(bytes: &[u8], source: &Path, max_px: u32) -> Result<Self, TripSheetError> {
        let decode_err = |detail: String| TripSheetError::WatermarkDecode {
            path: source.to_path_buf(),
            detail,
        };

        let img = image::load_from_memory(bytes).map_err(|e| decode_err(e.to_string()))?;
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(decode_err("image has no pixels".into()));
        }

        let img = if max_px > 0 && w.max(h) > max_px {
            let scaled = img.resize(max_px, max_px, FilterType::Triangle);
            debug!(
                "Downscaled watermark {}x{} -> {}x{}",
                w,
                h,
                scaled.width(),
                scaled.height()
            );
            scaled
        } else {
            img
        };

        // Normalise to 8-bit RGBA so the PDF encoder sees one pixel layout.
        let img = DynamicImage::ImageRgba8(img.to_rgba8());
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| decode_err(e.to_string()))?;

        info!(
            "Loaded watermark '{}' ({}x{}, {} bytes)",
            source.display(),
            img.width(),
            img.height(),
            png.len()
        );

        Ok(Self {
            source: source.to_path_buf(),
            png,
            width: img.width(),
            height: img.height(),
        })
    }

    /// The file the watermark was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// PNG bytes to embed.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Pixel dimensions after any downscaling.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Placement on the page: a square of the configured size centred on the
    /// page, as `(x, y, size)` in points with a bottom-left origin.
    pub fn placement(style: &SheetStyle) -> (f32, f32, f32) {
        let size = mm(style.watermark_size_mm);
        let x = (style.page_width_pt() - size) / 2.0;
        let y = (style.page_height_pt() - size) / 2.0;
        (x, y, size)
    }

    /// Operations that paint the watermark beneath everything else on a page.
    ///
    /// `image` is the embedded image and `alpha` a graphics state carrying
    /// the watermark opacity. The graphics state is saved and restored so the
    /// opacity does not leak into the page content.
    pub fn paint_ops(
        &self,
        image: &XObjectId,
        alpha: &ExtendedGraphicsStateId,
        style: &SheetStyle,
    ) -> Vec<Op> {
        let (x, y, size) = Self::placement(style);
        vec![
            Op::SaveGraphicsState,
            Op::LoadGraphicsState { gs: alpha.clone() },
            Op::UseXobject {
                id: image.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(x)),
                    translate_y: Some(Pt(y)),
                    // At 72 dpi one pixel is one point.
                    scale_x: Some(size / self.width as f32),
                    scale_y: Some(size / self.height as f32),
                    rotate: None,
                    dpi: Some(72.0),
                },
            },
            Op::RestoreGraphicsState,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_of(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 120, 0, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let wm = Watermark::load(&dir.path().join("hanuman.png")).unwrap();
        assert!(wm.is_none());
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = Watermark::load(&path).unwrap_err();
        assert!(matches!(err, TripSheetError::WatermarkDecode { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Render);
    }

    #[test]
    fn small_images_keep_their_size() {
        let wm = Watermark::from_bytes(&png_of(40, 20), Path::new("w.png"), 1200).unwrap();
        assert_eq!(wm.dimensions(), (40, 20));
        assert!(!wm.png_bytes().is_empty());
    }

    #[test]
    fn large_images_are_downscaled_keeping_aspect() {
        let wm = Watermark::from_bytes(&png_of(300, 150), Path::new("w.png"), 100).unwrap();
        assert_eq!(wm.dimensions(), (100, 50));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wm.png");
        std::fs::write(&path, png_of(8, 8)).unwrap();
        let wm = Watermark::load(&path).unwrap().unwrap();
        assert_eq!(wm.source(), path.as_path());
    }

    #[test]
    fn placement_is_centred_120mm_square() {
        let style = SheetStyle::default();
        let (x, y, size) = Watermark::placement(&style);
        assert!((size - mm(120.0)).abs() < 1e-3);
        assert!((x - mm(45.0)).abs() < 1e-3);
        assert!((y - mm(88.5)).abs() < 1e-3);
    }

    #[test]
    fn paint_ops_are_wrapped_in_saved_state() {
        let wm = Watermark::from_bytes(&png_of(10, 10), Path::new("w.png"), 1200).unwrap();
        let image = XObjectId("XOwm".into());
        let gs = ExtendedGraphicsStateId("GSwm".into());
        let ops = wm.paint_ops(&image, &gs, &SheetStyle::default());
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops.first(), Some(Op::SaveGraphicsState)));
        assert!(matches!(ops.last(), Some(Op::RestoreGraphicsState)));
        assert!(matches!(&ops[1], Op::LoadGraphicsState { gs: g } if *g == gs));
        assert!(matches!(&ops[2], Op::UseXobject { id, .. } if *id == image));
    }
}
