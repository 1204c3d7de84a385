//! Fonts used on the report's text pages.
//!
//! Only the PDF standard 14 faces are used, so nothing has to be shipped or located on disk.

use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};

use crate::error::ReportError;

/// Face used for headings and field labels.
pub const HEADING_FONT: BuiltinFont = BuiltinFont::HelveticaBold;
/// Face used for body text.
pub const BODY_FONT: BuiltinFont = BuiltinFont::Helvetica;

pub const TITLE_SIZE: f64 = 22.0;
pub const SECTION_SIZE: f64 = 14.0;
pub const BODY_SIZE: f64 = 11.0;

/// The bold and regular fonts of one document.  Embedded once, then shared by reference.
#[derive(Clone, Debug)]
pub struct ReportFonts {
    pub bold: IndirectFontRef,
    pub regular: IndirectFontRef,
}

impl ReportFonts {
    pub fn embed(document: &PdfDocumentReference) -> Result<Self, ReportError> {
        let bold = document
            .add_builtin_font(HEADING_FONT)
            .map_err(ReportError::pdf)?;
        let regular = document
            .add_builtin_font(BODY_FONT)
            .map_err(ReportError::pdf)?;
        Ok(Self { bold, regular })
    }
}
