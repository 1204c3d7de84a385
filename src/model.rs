//! Data structures describing the content of a generated report.
//!
//! The types here carry no rendering state: a [`ReportSpec`] only says where the images come
//! from and which organization details to print.  Acquiring the images and laying out the pages
//! is the job of [`crate::assembler`].

use serde::{Deserialize, Serialize};

use crate::encoding;

/// Where the bytes of an image come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Remote image downloaded over HTTP(S).
    Url(String),
    /// Image embedded as a base64 `data:` URI.
    DataUri(String),
    /// Image already held in memory.
    Bytes(Vec<u8>),
    /// Image stored on the local filesystem.
    Path(String),
}

impl ImageSource {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn from_data_uri(uri: impl Into<String>) -> Self {
        Self::DataUri(uri.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Classifies a user supplied string: `data:` URIs, `http(s)://` URLs, anything else is a
    /// path.
    pub fn parse(source: &str) -> Self {
        let lowered = source.trim_start().to_ascii_lowercase();
        if encoding::is_data_uri(&lowered) {
            Self::DataUri(source.trim().to_string())
        } else if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Self::Url(source.trim().to_string())
        } else {
            Self::Path(source.to_string())
        }
    }

    /// Short description used in log lines; never includes inline payloads.
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::DataUri(uri) => format!("data URI ({} chars)", uri.len()),
            Self::Bytes(bytes) => format!("{} in-memory bytes", bytes.len()),
            Self::Path(path) => path.clone(),
        }
    }
}

/// Free-text details about the analysed organization, printed on the content page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub founded: Option<String>,
}

impl OrganizationDetails {
    /// Labelled lines in print order, skipping blank values.
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        [
            ("Organization", self.name.as_deref()),
            ("Industry", self.industry.as_deref()),
            ("Country", self.country.as_deref()),
            ("Founded", self.founded.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| (label, value))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

/// Everything needed to assemble one report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSpec {
    cover: ImageSource,
    back_cover: ImageSource,
    #[serde(default)]
    chart: Option<ImageSource>,
    #[serde(default)]
    organization: OrganizationDetails,
    #[serde(default)]
    title: Option<String>,
}

impl ReportSpec {
    /// Creates a report with the two required full-page images.
    pub fn new(cover: ImageSource, back_cover: ImageSource) -> Self {
        Self {
            cover,
            back_cover,
            chart: None,
            organization: OrganizationDetails::default(),
            title: None,
        }
    }

    pub fn cover(&self) -> &ImageSource {
        &self.cover
    }

    pub fn back_cover(&self) -> &ImageSource {
        &self.back_cover
    }

    pub fn chart(&self) -> Option<&ImageSource> {
        self.chart.as_ref()
    }

    pub fn organization(&self) -> &OrganizationDetails {
        &self.organization
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Sets the rendered chart image and returns the updated spec.
    pub fn with_chart(mut self, chart: impl Into<Option<ImageSource>>) -> Self {
        self.chart = chart.into();
        self
    }

    pub fn with_organization(mut self, organization: OrganizationDetails) -> Self {
        self.organization = organization;
        self
    }

    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_sources() {
        assert_eq!(
            ImageSource::parse("https://cdn.example.com/a.png"),
            ImageSource::Url("https://cdn.example.com/a.png".into())
        );
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUri(_)
        ));
        assert_eq!(
            ImageSource::parse("assets/cover.jpg"),
            ImageSource::Path("assets/cover.jpg".into())
        );
    }

    #[test]
    fn organization_lines_skip_blank_values() {
        let details = OrganizationDetails {
            name: Some("Acme".into()),
            industry: Some("   ".into()),
            country: None,
            founded: Some("1999".into()),
        };

        assert_eq!(
            details.lines(),
            vec![("Organization", "Acme"), ("Founded", "1999")]
        );
        assert!(OrganizationDetails::default().is_empty());
    }

    #[test]
    fn describe_hides_inline_payloads() {
        let source = ImageSource::from_data_uri("data:image/png;base64,AAAA");
        assert_eq!(source.describe(), "data URI (26 chars)");
    }
}
