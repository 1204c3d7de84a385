//! Reshaping of ESG materiality rows into chart points.
//!
//! Rows arrive loosely typed from the analysis API: any field may be missing, scores may be
//! numbers or numeric strings, and the financial materiality label is free text.  The functions
//! here normalise every row into a [`MaterialityChartPoint`] whose `y` is the ESG score and whose
//! `x` is the position of the financial materiality category.  The on-screen chart and the PDF
//! report both plot these points, so the ordering and axis mapping must not drift.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single topic name or a list of them, as delivered by the analysis API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicName {
    /// One topic.
    Single(String),
    /// Several topics grouped on one point.
    Many(Vec<String>),
}

impl TopicName {
    /// Accepts a string or an array of strings; any other shape is dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Topic deserializer that maps unexpected shapes to `None` instead of failing the whole batch.
fn lenient_topic<'de, D>(deserializer: D) -> Result<Option<TopicName>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(TopicName::from_value(&value))
}

/// Raw materiality row.  JSON `null` deserializes to `None`, same as an absent field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialityRow {
    #[serde(
        default,
        deserialize_with = "lenient_topic",
        skip_serializing_if = "Option::is_none"
    )]
    pub tema: Option<TopicName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materialidad_financiera: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materialidad: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materialidad_esg: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Value>,
}

impl MaterialityRow {
    /// Builds a row from an arbitrary JSON value; anything that is not a well-formed object
    /// yields an empty row.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let field = |name: &str| object.get(name).filter(|value| !value.is_null()).cloned();

        Self {
            tema: object.get("tema").and_then(TopicName::from_value),
            materialidad_financiera: field("materialidad_financiera"),
            materialidad: field("materialidad"),
            materialidad_esg: field("materialidad_esg"),
            x: field("x"),
            y: field("y"),
        }
    }

    /// ESG score used for ordering and as the y coordinate.
    pub fn score(&self) -> f64 {
        self.materialidad_esg
            .as_ref()
            .or(self.y.as_ref())
            .map_or(0.0, coerce_number)
    }

    /// Financial materiality label, empty when neither label field is present.
    pub fn label(&self) -> String {
        self.materialidad_financiera
            .as_ref()
            .or(self.materialidad.as_ref())
            .map(coerce_string)
            .unwrap_or_default()
    }

    /// Pre-computed x coordinate; only JSON numbers are honoured.
    fn preset_x(&self) -> f64 {
        self.x
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
            .map_or(0.0, |value| value + 0.0)
    }
}

/// Chart-ready point.  `y` always equals `materialidad_esg`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialityChartPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tema: Option<TopicName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materialidad_financiera: Option<Value>,
    pub materialidad: String,
    pub materialidad_esg: f64,
    pub x: f64,
    pub y: f64,
}

/// Categories of financial materiality with a fixed position on the x axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FinancialMateriality {
    Baja,
    Media,
    Alta,
}

impl FinancialMateriality {
    /// Matches a label case-insensitively.  Surrounding whitespace is significant.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("baja") {
            Some(Self::Baja)
        } else if label.eq_ignore_ascii_case("media") {
            Some(Self::Media)
        } else if label.eq_ignore_ascii_case("alta") {
            Some(Self::Alta)
        } else {
            None
        }
    }

    /// Position of the category on the x axis.
    pub fn axis_value(self) -> f64 {
        match self {
            Self::Baja => 1.0,
            Self::Media => 3.0,
            Self::Alta => 5.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baja => "baja",
            Self::Media => "media",
            Self::Alta => "alta",
        }
    }
}

/// Converts rows into chart points sorted by ESG score, highest first.
///
/// Rows with equal scores keep their input order.  The output always has the same length as the
/// input.
pub fn transform(rows: &[MaterialityRow]) -> Vec<MaterialityChartPoint> {
    let mut scored: Vec<(usize, f64, &MaterialityRow)> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| (index, row.score(), row))
        .collect();

    // Coerced scores are finite and never -0.0, so total_cmp orders them like numbers.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    scored
        .into_iter()
        .map(|(_, score, row)| to_chart_point(row, score))
        .collect()
}

/// Same as [`transform`] for untyped JSON; anything other than an array yields no points.
pub fn transform_value(value: &Value) -> Vec<MaterialityChartPoint> {
    let rows: Vec<MaterialityRow> = value
        .as_array()
        .map(|items| items.iter().map(MaterialityRow::from_value).collect())
        .unwrap_or_default();
    transform(&rows)
}

fn to_chart_point(row: &MaterialityRow, score: f64) -> MaterialityChartPoint {
    let label = row.label();
    let x = FinancialMateriality::from_label(&label)
        .map_or_else(|| row.preset_x(), FinancialMateriality::axis_value);

    MaterialityChartPoint {
        tema: row.tema.clone(),
        materialidad_financiera: row.materialidad_financiera.clone(),
        materialidad: label,
        materialidad_esg: score,
        x,
        y: score,
    }
}

/// Number conversion with a zero fallback for anything that does not represent a finite number.
pub fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if number.is_finite() {
        // Folds -0.0 into 0.0.
        number + 0.0
    } else {
        0.0
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Number(number) => format_number(number),
        other => other.to_string(),
    }
}

/// Integral floats print without a fraction (`1.0` becomes `"1"`), matching how the chart
/// front end stringifies numbers.
fn format_number(number: &serde_json::Number) -> String {
    if number.is_f64() {
        if let Some(value) = number.as_f64() {
            return format!("{}", value + 0.0);
        }
    }
    number.to_string()
}
