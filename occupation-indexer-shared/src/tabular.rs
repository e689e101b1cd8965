//! Rows of the bulk wage and employment dataset.
//!
//! Values are kept raw: the dataset mixes numbers with suppression markers
//! (`*`, `**`, `#`) and blanks, and deciding what those mean is the
//! transformer's job, not the extractor's.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Geographic granularity of a bulk dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    National,
    State,
    Metro,
}

impl Granularity {
    /// Label used in logs and in location documents (`area_type`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::National => "national",
            Granularity::State => "state",
            Granularity::Metro => "metro",
        }
    }

    /// Suffix of the bulk archive file name for this granularity.
    pub fn archive_suffix(&self) -> &'static str {
        match self {
            Granularity::National => "nat",
            Granularity::State => "st",
            Granularity::Metro => "ma",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TabularValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl TabularValue {
    /// Render the value as text; numbers with no fractional part lose the `.0`.
    pub fn to_text(&self) -> String {
        match self {
            TabularValue::Empty => String::new(),
            TabularValue::Number(n) if n.is_finite() && n.fract() == 0.0 => {
                format!("{}", *n as i64)
            }
            TabularValue::Number(n) => n.to_string(),
            TabularValue::Text(s) => s.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TabularValue::Empty => true,
            TabularValue::Text(s) => s.trim().is_empty(),
            TabularValue::Number(_) => false,
        }
    }
}

impl From<f64> for TabularValue {
    fn from(value: f64) -> Self {
        TabularValue::Number(value)
    }
}

impl From<i64> for TabularValue {
    fn from(value: i64) -> Self {
        TabularValue::Number(value as f64)
    }
}

impl From<&str> for TabularValue {
    fn from(value: &str) -> Self {
        TabularValue::Text(value.to_string())
    }
}

impl From<String> for TabularValue {
    fn from(value: String) -> Self {
        TabularValue::Text(value)
    }
}

/// Granularity flag value marking a detailed occupation row.
pub const DETAILED_GROUP: &str = "detailed";

/// One row of the bulk dataset, national or per area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularOccupationRow {
    /// Occupation code as it appears in the source (`OCC_CODE`).
    pub occ_code: String,
    /// Occupation title (`OCC_TITLE`).
    pub occ_title: String,
    /// Granularity flag (`O_GROUP`), absent in some vintages of the dataset.
    pub o_group: Option<String>,
    /// Area code (`AREA`), location variants only.
    pub area: Option<String>,
    /// Area title (`AREA_TITLE`), location variants only.
    pub area_title: Option<String>,
    /// Primary state abbreviation (`PRIM_STATE`), location variants only.
    pub prim_state: Option<String>,
    pub tot_emp: TabularValue,
    pub jobs_1000: TabularValue,
    pub loc_quotient: TabularValue,
    pub h_mean: TabularValue,
    pub a_mean: TabularValue,
    pub h_median: TabularValue,
    pub a_median: TabularValue,
    pub h_pct10: TabularValue,
    pub h_pct25: TabularValue,
    pub h_pct75: TabularValue,
    pub h_pct90: TabularValue,
    pub a_pct10: TabularValue,
    pub a_pct25: TabularValue,
    pub a_pct75: TabularValue,
    pub a_pct90: TabularValue,
}

impl TabularOccupationRow {
    /// Build a row from a header row and the matching record.
    ///
    /// Header names are matched case-insensitively; unknown columns are
    /// ignored and missing columns stay empty.
    pub fn from_record<H, V>(headers: &[H], record: V) -> Self
    where
        H: AsRef<str>,
        V: IntoIterator<Item = TabularValue>,
    {
        let mut row = Self::default();
        for (header, value) in headers.iter().zip(record) {
            row.set_column(header.as_ref(), value);
        }
        row
    }

    /// Assign a single column by its source header name.
    ///
    /// Returns `false` when the column is not one this row tracks.
    pub fn set_column(&mut self, header: &str, value: TabularValue) -> bool {
        match header.trim().to_ascii_uppercase().as_str() {
            "OCC_CODE" => self.occ_code = value.to_text(),
            "OCC_TITLE" => self.occ_title = value.to_text(),
            "O_GROUP" | "OCC_GROUP" => self.o_group = non_empty_text(&value),
            "AREA" => self.area = non_empty_text(&value),
            "AREA_TITLE" => self.area_title = non_empty_text(&value),
            "PRIM_STATE" => self.prim_state = non_empty_text(&value),
            "TOT_EMP" => self.tot_emp = value,
            "JOBS_1000" => self.jobs_1000 = value,
            "LOC_QUOTIENT" => self.loc_quotient = value,
            "H_MEAN" => self.h_mean = value,
            "A_MEAN" => self.a_mean = value,
            "H_MEDIAN" => self.h_median = value,
            "A_MEDIAN" => self.a_median = value,
            "H_PCT10" => self.h_pct10 = value,
            "H_PCT25" => self.h_pct25 = value,
            "H_PCT75" => self.h_pct75 = value,
            "H_PCT90" => self.h_pct90 = value,
            "A_PCT10" => self.a_pct10 = value,
            "A_PCT25" => self.a_pct25 = value,
            "A_PCT75" => self.a_pct75 = value,
            "A_PCT90" => self.a_pct90 = value,
            _ => return false,
        }
        true
    }

    /// Whether this row describes a detailed occupation.
    ///
    /// Rows without a granularity flag are kept: older files carry none.
    pub fn is_detailed(&self) -> bool {
        match &self.o_group {
            Some(group) => group.eq_ignore_ascii_case(DETAILED_GROUP),
            None => true,
        }
    }
}

fn non_empty_text(value: &TabularValue) -> Option<String> {
    let text = value.to_text();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
