//! Document assembly: replay laid-out pages as PDF operations.
//!
//! All geometry was decided by [`crate::pipeline::layout`]; this stage only
//! flips the y axis (layout measures down from the top, PDF up from the
//! bottom) and emits drawing operations. The watermark image is embedded
//! once and referenced from every page.

use crate::config::{FontFace, SheetConfig, SheetStyle};
use crate::error::TripSheetError;
use crate::pipeline::layout::{PageContent, PlacedCell, Rect};
use crate::pipeline::watermark::Watermark;
use printpdf::graphics::{Line, LinePoint, Point};
use printpdf::matrix::TextMatrix;
use printpdf::ops::Op;
use printpdf::text::TextItem;
use printpdf::{
    BuiltinFont, Color, ExtendedGraphicsState, ExtendedGraphicsStateId, Mm, PdfDocument, PdfPage,
    PdfSaveOptions, Pt, RawImage, Rgb, XObject, XObjectId,
};
use tracing::{debug, warn};

// ── Resource names ───────────────────────────────────────────────────────────
//
// Every page content stream refers to the watermark by these names, so they
// are fixed rather than generated. Identical input then gives identical
// content streams.

/// Resource name of the embedded watermark image.
pub const WATERMARK_IMAGE: &str = "XOwatermark";
/// Resource name of the graphics state carrying the watermark opacity.
pub const WATERMARK_ALPHA: &str = "GSwatermark";

/// Serialise pages into a single PDF.
///
/// Page order follows `pages`. When `watermark` is `Some`, it is painted
/// beneath the content of every page.
///
/// # Errors
/// [`TripSheetError::Render`] if `pages` is empty or the watermark cannot be
/// embedded.
pub fn build_document(
    pages: &[PageContent],
    watermark: Option<&Watermark>,
    config: &SheetConfig,
) -> Result<Vec<u8>, TripSheetError> {
    if pages.is_empty() {
        return Err(TripSheetError::Render(
            "a document needs at least one page".into(),
        ));
    }

    let style = &config.style;
    let mut doc = PdfDocument::new(&config.title);

    let background = match watermark {
        Some(wm) => {
            let mut warnings = Vec::new();
            let raw = RawImage::decode_from_bytes(wm.png_bytes(), &mut warnings).map_err(|e| {
                TripSheetError::Render(format!(
                    "Failed to embed watermark '{}': {e}",
                    wm.source().display()
                ))
            })?;
            let image = XObjectId(WATERMARK_IMAGE.to_string());
            doc.resources
                .xobjects
                .map
                .insert(image.clone(), XObject::Image(raw));
            let alpha = ExtendedGraphicsStateId(WATERMARK_ALPHA.to_string());
            doc.resources
                .extgstates
                .map
                .insert(alpha.clone(), watermark_alpha(style.watermark_opacity));
            wm.paint_ops(&image, &alpha, style)
        }
        None => Vec::new(),
    };

    let pdf_pages: Vec<PdfPage> = pages
        .iter()
        .map(|page| {
            let mut ops = background.clone();
            ops.extend(page_ops(page, style));
            PdfPage::new(Mm(style.page_width_mm), Mm(style.page_height_mm), ops)
        })
        .collect();

    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(pdf_pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!("PDF writer reported {} warnings", warnings.len());
    }
    debug!("Serialised {} pages into {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}

/// Constant opacity for both painting operations.
///
/// printpdf writes `current_fill_alpha` as `/CA` and `current_stroke_alpha`
/// as `/ca`. Images are painted with `/ca`, so both are set.
fn watermark_alpha(opacity: f32) -> ExtendedGraphicsState {
    ExtendedGraphicsState::default()
        .with_current_fill_alpha(opacity)
        .with_current_stroke_alpha(opacity)
}

/// Drawing operations for one page, excluding the watermark.
fn page_ops(page: &PageContent, style: &SheetStyle) -> Vec<Op> {
    let page_height = style.page_height_pt();
    let black = || Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));

    let mut ops = vec![
        Op::SetOutlineColor { col: black() },
        Op::SetOutlineThickness {
            pt: Pt(style.grid_line_pt),
        },
        Op::SetFillColor { col: black() },
    ];

    for cell in page.grid.iter().filter(|c| c.bordered) {
        ops.push(Op::DrawLine {
            line: outline(cell.rect, page_height),
        });
    }

    for cell in page.grid.iter().chain(std::iter::once(&page.signature)) {
        text_ops(cell, page_height, &mut ops);
    }
    ops
}

/// Closed rectangle path, converted to bottom-left coordinates.
fn outline(rect: Rect, page_height: f32) -> Line {
    let top = page_height - rect.y;
    let bottom = top - rect.height;
    let right = rect.x + rect.width;
    let corner = |x: f32, y: f32| LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    };
    Line {
        points: vec![
            corner(rect.x, top),
            corner(right, top),
            corner(right, bottom),
            corner(rect.x, bottom),
        ],
        is_closed: true,
    }
}

fn text_ops(cell: &PlacedCell, page_height: f32, ops: &mut Vec<Op>) {
    for line in &cell.lines {
        let font = builtin(line.style.face);
        ops.extend([
            Op::StartTextSection,
            Op::SetFontSizeBuiltinFont {
                size: Pt(line.style.size),
                font,
            },
            Op::SetTextMatrix {
                matrix: TextMatrix::Translate(Pt(line.x), Pt(page_height - line.baseline)),
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font,
            },
            Op::EndTextSection,
        ]);
    }
}

fn builtin(face: FontFace) -> BuiltinFont {
    match face {
        FontFace::Regular => BuiltinFont::Helvetica,
        FontFace::Bold => BuiltinFont::HelveticaBold,
    }
}
