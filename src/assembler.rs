//! Assembly of the PDF report: cover, content page, back cover.

use std::io::{BufWriter, Cursor};

use image::{DynamicImage, GenericImageView};
use log::{debug, info, warn};
use printpdf::{
    Color, Image, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};

use crate::config::AssemblerConfig;
use crate::error::ReportError;
use crate::fetch::{self, HttpFetcher, ImageFetcher};
use crate::fonts::{self, ReportFonts};
use crate::layout::{self, Rect, CONTENT_MARGIN_PT, IMAGE_DPI, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use crate::model::{OrganizationDetails, ReportSpec};

const COVER: &str = "cover";
const BACK_COVER: &str = "back cover";

const CHART_HEADING: &str = "Materiality matrix";
const LABEL_COLUMN_PT: f64 = 90.0;
const LINE_GAP_PT: f64 = 18.0;
const TEXT_GREY: (f64, f64, f64) = (0.2, 0.2, 0.2);

/// Page titles in output order, used for the optional outline.
pub const COVER_PAGE_TITLE: &str = "Cover";
pub const CONTENT_PAGE_TITLE: &str = "Materiality";
pub const BACK_COVER_PAGE_TITLE: &str = "Back cover";

/// Raw image bytes acquired for one report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportImages {
    pub cover: Vec<u8>,
    pub back_cover: Vec<u8>,
    /// Empty when no chart was supplied or it could not be decoded.
    pub chart: Vec<u8>,
}

/// Builds report PDFs.  Each call works on its own document, so one assembler can serve
/// concurrent requests.
#[derive(Clone, Debug)]
pub struct ReportAssembler<F = HttpFetcher> {
    fetcher: F,
    config: AssemblerConfig,
}

impl ReportAssembler<HttpFetcher> {
    /// Creates an assembler that downloads remote images over HTTP.
    pub fn from_config(config: AssemblerConfig) -> Result<Self, ReportError> {
        let fetcher = HttpFetcher::from_config(&config).map_err(ReportError::Client)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: ImageFetcher> ReportAssembler<F> {
    pub fn new(fetcher: F, config: AssemblerConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Acquires every image of `spec` and renders the report.
    ///
    /// A cover or back cover that cannot be fetched or decoded aborts the run; a broken chart is
    /// left out of the document.
    pub async fn assemble(&self, spec: &ReportSpec) -> Result<Vec<u8>, ReportError> {
        let cover = fetch::acquire_required(&self.fetcher, spec.cover(), COVER).await?;
        let back_cover =
            fetch::acquire_required(&self.fetcher, spec.back_cover(), BACK_COVER).await?;
        let chart = match spec.chart() {
            Some(source) => fetch::acquire_optional(&self.fetcher, source).await,
            None => Vec::new(),
        };

        self.render(
            ReportImages {
                cover,
                back_cover,
                chart,
            },
            spec,
        )
    }

    /// Lays out already acquired images.  Performs no I/O.
    pub fn render(&self, images: ReportImages, spec: &ReportSpec) -> Result<Vec<u8>, ReportError> {
        let cover = decode_required(&images.cover, COVER)?;
        let back_cover = decode_required(&images.back_cover, BACK_COVER)?;
        let chart = decode_optional(&images.chart);

        let title = spec.title().unwrap_or(&self.config.title);
        let mut document = ReportDocument::new(title, &cover);
        let mut page_titles = vec![COVER_PAGE_TITLE];

        if chart.is_some() || !spec.organization().is_empty() {
            document.add_content_page(title, spec.organization(), chart.as_ref())?;
            page_titles.push(CONTENT_PAGE_TITLE);
        } else {
            debug!("No chart or organization details; skipping content page");
        }

        document.add_full_page_image(&back_cover, "Back cover");
        page_titles.push(BACK_COVER_PAGE_TITLE);

        let bytes = document.finish()?;
        let bytes = self.apply_outline(bytes, &page_titles)?;
        info!(
            "Assembled report '{title}' with {} pages ({} bytes)",
            page_titles.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    #[cfg(feature = "bookmarks")]
    fn apply_outline(&self, bytes: Vec<u8>, page_titles: &[&str]) -> Result<Vec<u8>, ReportError> {
        if !self.config.bookmarks {
            return Ok(bytes);
        }
        Ok(crate::bookmarks::apply_page_bookmarks(&bytes, page_titles)?)
    }

    #[cfg(not(feature = "bookmarks"))]
    fn apply_outline(&self, bytes: Vec<u8>, _page_titles: &[&str]) -> Result<Vec<u8>, ReportError> {
        if self.config.bookmarks {
            warn!("Bookmarks requested but the `bookmarks` feature is disabled");
        }
        Ok(bytes)
    }
}

fn decode_required(bytes: &[u8], role: &'static str) -> Result<DynamicImage, ReportError> {
    image::load_from_memory(bytes)
        .map(flatten)
        .map_err(|source| ReportError::Image { role, source })
}

fn decode_optional(bytes: &[u8]) -> Option<DynamicImage> {
    if bytes.is_empty() {
        return None;
    }
    match image::load_from_memory(bytes) {
        Ok(decoded) => Some(flatten(decoded)),
        Err(err) => {
            warn!("Leaving chart out of the report: {err}");
            None
        }
    }
}

/// Drops any alpha channel; PDF image XObjects carry colour only.
fn flatten(image: DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgb8(image.to_rgb8())
}

/// A `printpdf` document being filled page by page.
struct ReportDocument {
    document: PdfDocumentReference,
    fonts: Option<ReportFonts>,
}

impl ReportDocument {
    /// Starts a document whose first page is `cover`.
    fn new(title: &str, cover: &DynamicImage) -> Self {
        let (document, page, layer) = PdfDocument::new(
            title,
            Mm(layout::pt_to_mm(PAGE_WIDTH_PT)),
            Mm(layout::pt_to_mm(PAGE_HEIGHT_PT)),
            "Cover",
        );
        let layer = document.get_page(page).get_layer(layer);
        draw_image(&layer, cover, fill_page(cover));

        Self {
            document,
            fonts: None,
        }
    }

    fn new_page(&self, name: &str) -> PdfLayerReference {
        let (page, layer) = self.document.add_page(
            Mm(layout::pt_to_mm(PAGE_WIDTH_PT)),
            Mm(layout::pt_to_mm(PAGE_HEIGHT_PT)),
            name,
        );
        self.document.get_page(page).get_layer(layer)
    }

    fn add_full_page_image(&mut self, image: &DynamicImage, name: &str) {
        let layer = self.new_page(name);
        draw_image(&layer, image, fill_page(image));
    }

    fn fonts(&mut self) -> Result<ReportFonts, ReportError> {
        if let Some(fonts) = &self.fonts {
            return Ok(fonts.clone());
        }
        let fonts = ReportFonts::embed(&self.document)?;
        self.fonts = Some(fonts.clone());
        Ok(fonts)
    }

    /// Heading, organization details and the chart, top to bottom.
    fn add_content_page(
        &mut self,
        title: &str,
        organization: &OrganizationDetails,
        chart: Option<&DynamicImage>,
    ) -> Result<(), ReportError> {
        let fonts = self.fonts()?;
        let layer = self.new_page("Content");
        let (r, g, b) = TEXT_GREY;
        layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));

        let left = CONTENT_MARGIN_PT;
        let mut cursor = PAGE_HEIGHT_PT - CONTENT_MARGIN_PT - fonts::TITLE_SIZE;
        draw_text(&layer, title, fonts::TITLE_SIZE, left, cursor, &fonts.bold);
        cursor -= fonts::TITLE_SIZE;

        for (label, value) in organization.lines() {
            cursor -= LINE_GAP_PT;
            draw_text(&layer, label, fonts::BODY_SIZE, left, cursor, &fonts.bold);
            draw_text(
                &layer,
                value,
                fonts::BODY_SIZE,
                left + LABEL_COLUMN_PT,
                cursor,
                &fonts.regular,
            );
        }

        if let Some(chart) = chart {
            cursor -= LINE_GAP_PT + fonts::SECTION_SIZE;
            draw_text(&layer, CHART_HEADING, fonts::SECTION_SIZE, left, cursor, &fonts.bold);
            cursor -= LINE_GAP_PT;

            let area = Rect::new(
                left,
                CONTENT_MARGIN_PT,
                PAGE_WIDTH_PT - 2.0 * CONTENT_MARGIN_PT,
                (cursor - CONTENT_MARGIN_PT).max(0.0),
            );
            let (width, height) = chart.dimensions();
            draw_image(&layer, chart, layout::fit_top_center(width, height, area));
        }

        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut writer = BufWriter::new(Cursor::new(Vec::new()));
        self.document.save(&mut writer).map_err(ReportError::pdf)?;
        let cursor = writer
            .into_inner()
            .map_err(|err| ReportError::Io(err.into_error()))?;
        Ok(cursor.into_inner())
    }
}

fn fill_page(image: &DynamicImage) -> layout::Placement {
    let (width, height) = image.dimensions();
    layout::fill(width, height, Rect::page())
}

fn draw_image(layer: &PdfLayerReference, image: &DynamicImage, placement: layout::Placement) {
    Image::from_dynamic_image(image).add_to_layer(
        layer.clone(),
        Some(Mm(layout::pt_to_mm(placement.x))),
        Some(Mm(layout::pt_to_mm(placement.y))),
        None,
        Some(placement.scale_x),
        Some(placement.scale_y),
        Some(IMAGE_DPI),
    );
}

fn draw_text(
    layer: &PdfLayerReference,
    text: &str,
    size: f64,
    x: f64,
    y: f64,
    font: &IndirectFontRef,
) {
    layer.use_text(
        text,
        size,
        Mm(layout::pt_to_mm(x)),
        Mm(layout::pt_to_mm(y)),
        font,
    );
}
