//! Materiality chart shaping and PDF report assembly for ESG analyses.
//!
//! [`materiality::transform`] turns raw analysis rows into ordered chart points, and
//! [`assembler::ReportAssembler`] wraps a rendered chart between a cover and a back cover.

pub mod assembler;
pub mod config;
pub mod encoding;
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod layout;
pub mod materiality;
pub mod model;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use assembler::{ReportAssembler, ReportImages};
pub use config::AssemblerConfig;
pub use error::{DecodeError, FetchError, ReportError};
pub use materiality::{transform, MaterialityChartPoint, MaterialityRow};
pub use model::{ImageSource, OrganizationDetails, ReportSpec};
