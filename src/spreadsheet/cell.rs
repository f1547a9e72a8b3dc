use crate::spreadsheet::reference::index_to_reference;
use calamine::Data;
use calamine::DataRef;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use std::fmt::Display;

/// Represents a single recorded cell in a spreadsheet with its position and value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell value as decoded by the container reader
    pub value: Data,
}

impl Cell {
    pub(crate) fn new(row: usize, col: usize, value: Data) -> Self {
        Self { row, col, value }
    }

    /// Builds an owned cell from a streaming cell reader value.
    pub(crate) fn from_ref(row: usize, col: usize, value: &DataRef<'_>) -> Self {
        let value = match value {
            DataRef::Int(value) => Data::Int(*value),
            DataRef::Float(value) => Data::Float(*value),
            DataRef::String(value) => Data::String(value.to_owned()),
            DataRef::SharedString(value) => Data::String(value.to_string()),
            DataRef::Bool(value) => Data::Bool(*value),
            DataRef::DateTime(value) => Data::DateTime(*value),
            DataRef::DateTimeIso(value) => Data::DateTimeIso(value.to_owned()),
            DataRef::DurationIso(value) => Data::DurationIso(value.to_owned()),
            DataRef::Error(value) => Data::Error(value.to_owned()),
            DataRef::Empty => Data::Empty,
        };
        Self::new(row, col, value)
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// A blank cell carries no value: empty, or an empty string.
    pub fn is_blank(&self) -> bool {
        match &self.value {
            Data::Empty => true,
            Data::String(value) => value.is_empty(),
            _ => false,
        }
    }

    pub fn get_bool(&self) -> Option<bool> {
        match self.value {
            Data::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Checks if the cell holds a numeric value. Date-formatted numbers count as numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self.value, Data::Int(_) | Data::Float(_) | Data::DateTime(_))
    }

    /// Extracts the numeric value as a double; date-formatted cells yield their serial number.
    pub fn get_double(&self) -> Option<f64> {
        match &self.value {
            Data::Int(value) => Some(*value as f64),
            Data::Float(value) => Some(*value),
            Data::DateTime(value) => Some(value.as_f64()),
            _ => None,
        }
    }

    /// Extracts a date/time from a date-serial or plain numeric cell (1900 date system).
    pub fn get_datetime(&self) -> Option<NaiveDateTime> {
        match &self.value {
            Data::DateTime(value) if value.is_datetime() => value.as_datetime(),
            Data::Int(value) => serial_to_datetime(*value as f64),
            Data::Float(value) => serial_to_datetime(*value),
            _ => None,
        }
    }

    /// Text rendering of the cell; None for a blank cell.
    pub fn to_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Data::Empty => Ok(()),
            Data::Int(value) => write!(f, "{value}"),
            Data::Float(value) => write!(f, "{value}"),
            Data::Bool(value) => write!(f, "{value}"),
            Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
                write!(f, "{value}")
            }
            Data::Error(value) => write!(f, "{value}"),
            Data::DateTime(value) => {
                let serial = value.as_f64();
                if value.is_duration() {
                    write!(f, "{}", to_time_string(serial))
                } else if let Some(datetime) = value.as_datetime() {
                    if serial < 1.0 {
                        write!(f, "{}", datetime.format("%H:%M:%S"))
                    } else if serial.fract() == 0.0 {
                        write!(f, "{}", datetime.format("%Y-%m-%d"))
                    } else {
                        write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S"))
                    }
                } else {
                    write!(f, "{serial}")
                }
            }
        }
    }
}

/// Converts an Excel 1900-system serial number to a date/time.
/// Serials below 60 are shifted a day to account for the Lotus 1-2-3 leap year bug.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(days + if days < 60 { 1 } else { 0 }))?;
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(milliseconds))
}

/// Converts a fraction of a day (or a duration in days) to `HH:MM:SS`.
fn to_time_string(value: f64) -> String {
    let mut seconds = (value * 86_400f64).round() as i64;
    let hours = seconds / 3_600;
    seconds %= 3_600;
    let minutes = seconds / 60;
    seconds %= 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use calamine::ExcelDateTime;
    use calamine::ExcelDateTimeType;

    fn cell(value: Data) -> Cell {
        Cell::new(1, 2, value)
    }

    #[test]
    fn cell_reference() {
        assert_eq!(cell(Data::Empty).reference(), "C2");
    }

    #[test]
    fn cell_blank() {
        assert!(cell(Data::Empty).is_blank());
        assert!(cell(Data::String(String::new())).is_blank());
        assert!(!cell(Data::String(" ".to_owned())).is_blank());
        assert!(!cell(Data::Float(0.0)).is_blank());
        assert_eq!(cell(Data::Empty).to_text(), None);
    }

    #[test]
    fn cell_text_rendering() {
        assert_eq!(cell(Data::Float(30.0)).to_string(), "30");
        assert_eq!(cell(Data::Float(95.5)).to_string(), "95.5");
        assert_eq!(cell(Data::Int(-7)).to_string(), "-7");
        assert_eq!(cell(Data::Bool(true)).to_string(), "true");
        assert_eq!(cell(Data::String("Alice".to_owned())).to_string(), "Alice");
        assert_eq!(cell(Data::Error(CellErrorType::Div0)).to_string(), "#DIV/0!");
    }

    #[test]
    fn cell_date_rendering() {
        let date = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell(Data::DateTime(date)).to_string(), "2024-01-01");

        let datetime = ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell(Data::DateTime(datetime)).to_string(), "2024-01-01 12:00:00");

        let time = ExcelDateTime::new(0.75, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell(Data::DateTime(time)).to_string(), "18:00:00");
    }

    #[test]
    fn cell_numeric_accessors() {
        assert!(cell(Data::Int(3)).is_numeric());
        assert_eq!(cell(Data::Int(3)).get_double(), Some(3.0));
        assert!(!cell(Data::String("3".to_owned())).is_numeric());
        assert_eq!(cell(Data::String("3".to_owned())).get_double(), None);
        assert_eq!(cell(Data::Bool(false)).get_bool(), Some(false));
        assert_eq!(cell(Data::Int(1)).get_bool(), None);
    }

    #[test]
    fn serial_numbers_to_dates() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(serial_to_datetime(1.0).map(|it| it.date()), Some(date(1900, 1, 1)));
        assert_eq!(serial_to_datetime(61.0).map(|it| it.date()), Some(date(1900, 3, 1)));
        assert_eq!(serial_to_datetime(45292.0).map(|it| it.date()), Some(date(2024, 1, 1)));
        assert_eq!(
            serial_to_datetime(45292.25),
            date(2024, 1, 1).and_hms_opt(6, 0, 0)
        );
        assert_eq!(serial_to_datetime(-1.0), None);
        assert_eq!(serial_to_datetime(f64::NAN), None);
    }
}
