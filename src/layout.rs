//! Page geometry for the report.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner of the page.
//! `printpdf` positions content in millimetres, so placements convert at the last moment.

/// ISO A4 portrait width.
pub const PAGE_WIDTH_PT: f64 = 595.28;
/// ISO A4 portrait height.
pub const PAGE_HEIGHT_PT: f64 = 841.89;
/// Resolution images are embedded at before scaling.
pub const IMAGE_DPI: f64 = 300.0;
/// Blank border around the content page.
pub const CONTENT_MARGIN_PT: f64 = 56.0;

const POINTS_PER_INCH: f64 = 72.0;
const MM_PER_INCH: f64 = 25.4;

pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_INCH / POINTS_PER_INCH
}

/// Size in points of an image with the given pixel dimensions at [`IMAGE_DPI`].
pub fn natural_size_pt(px_width: u32, px_height: u32) -> (f64, f64) {
    let factor = POINTS_PER_INCH / IMAGE_DPI;
    (f64::from(px_width) * factor, f64::from(px_height) * factor)
}

/// An axis-aligned rectangle in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full page canvas.
    pub fn page() -> Self {
        Self::new(0.0, 0.0, PAGE_WIDTH_PT, PAGE_HEIGHT_PT)
    }
}

/// Translation and scale factors handed to `printpdf` when drawing an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Placement {
    /// Final drawn size in points for an image of the given pixel dimensions.
    pub fn drawn_size(&self, px_width: u32, px_height: u32) -> (f64, f64) {
        let (width, height) = natural_size_pt(px_width, px_height);
        (width * self.scale_x, height * self.scale_y)
    }
}

/// Stretches an image over the whole `area`, ignoring its aspect ratio.
pub fn fill(px_width: u32, px_height: u32, area: Rect) -> Placement {
    let (width, height) = natural_size_pt(px_width.max(1), px_height.max(1));
    Placement {
        x: area.x,
        y: area.y,
        scale_x: area.width / width,
        scale_y: area.height / height,
    }
}

/// Scales an image uniformly to the largest size that fits inside `area`, centred horizontally
/// and aligned to the top edge.
pub fn fit_top_center(px_width: u32, px_height: u32, area: Rect) -> Placement {
    let (width, height) = natural_size_pt(px_width.max(1), px_height.max(1));
    let scale = (area.width / width).min(area.height / height).max(0.0);
    let drawn_width = width * scale;
    let drawn_height = height * scale;

    Placement {
        x: area.x + (area.width - drawn_width) / 2.0,
        y: area.y + area.height - drawn_height,
        scale_x: scale,
        scale_y: scale,
    }
}
