use crate::extract::Axis;
use crate::extract::Extraction;
use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::row_to_index;
use regex::Regex;
use thiserror::Error;

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),
}

/// Builds an axis from optional inclusive bounds.
fn to_axis(lower: Option<usize>, upper: Option<usize>) -> Axis {
    match upper {
        Some(upper) => Axis::inclusive(lower.unwrap_or(0), upper),
        None => Axis::From(lower.unwrap_or(0)),
    }
}

impl TryFrom<&str> for Extraction {
    type Error = RangeError;

    /// Parses an Excel-style range string (e.g., "B2:D10", "A1:", "C:E", "3:7").
    /// Bounds are inclusive as written; a missing bound is open, so a single
    /// reference like "B2" reads from B2 to the end of the data.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern");
        let value = value.trim().to_ascii_uppercase();
        let captures = pattern
            .captures(value.as_str())
            .ok_or_else(|| RangeError::FormatError(value.to_owned()))?;
        // An empty group leaves the bound open; a written bound must parse.
        let bound = |index: usize, parse: fn(&str) -> Option<usize>| {
            match captures.get(index).map(|matcher| matcher.as_str()) {
                None | Some("") => Ok(None),
                Some(text) => parse(text)
                    .map(Some)
                    .ok_or_else(|| RangeError::FormatError(value.to_owned())),
            }
        };
        let col_lower_bound = bound(1, col_to_index)?;
        let row_lower_bound = bound(2, row_to_index)?;
        let col_upper_bound = bound(4, col_to_index)?;
        let row_upper_bound = bound(5, row_to_index)?;

        let is_reversed = |lower: Option<usize>, upper: Option<usize>| {
            lower.zip(upper).map(|(lower, upper)| upper < lower).unwrap_or(false)
        };
        if is_reversed(row_lower_bound, row_upper_bound) || is_reversed(col_lower_bound, col_upper_bound) {
            return Err(RangeError::FormatError(value.to_owned()));
        }

        Ok(Extraction {
            rows: to_axis(row_lower_bound, row_upper_bound),
            columns: to_axis(col_lower_bound, col_upper_bound),
            ..Extraction::default()
        })
    }
}
