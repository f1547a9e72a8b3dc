use crate::record::truncate_i128;
use crate::record::truncate_i64;
use crate::record::FieldKind;
use crate::record::FieldValue;
use crate::spreadsheet::Cell;
use rust_decimal::Decimal;

/// How a cell is read for a declared field kind.
///
/// Each rule reads the cell through its typed accessor and falls back to the
/// cell's text rendering when the stored value is of another type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoercionRule {
    /// Numeric cells truncated to a 64-bit integer
    Integer,
    /// Numeric cells truncated to a 128-bit integer
    BigInteger,
    /// Numeric cells as exact decimals
    Decimal,
    /// Numeric cells at native double precision
    Floating,
    /// Date-serial cells as dates
    Date,
    /// Date-serial cells as timestamps
    Timestamp,
    /// Boolean cells
    Boolean,
    /// Text rendering as UTF-8 bytes
    Bytes,
    /// Text rendering
    Text,
}

impl CoercionRule {
    pub const fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Integer | FieldKind::Long => Self::Integer,
            FieldKind::BigInteger => Self::BigInteger,
            FieldKind::Decimal => Self::Decimal,
            FieldKind::Float | FieldKind::Double => Self::Floating,
            FieldKind::Date => Self::Date,
            FieldKind::Timestamp => Self::Timestamp,
            FieldKind::Boolean => Self::Boolean,
            FieldKind::Bytes => Self::Bytes,
            FieldKind::Text => Self::Text,
        }
    }

    /// Coerces a non-blank cell.
    pub fn apply(&self, cell: &Cell) -> FieldValue {
        let coerced = match self {
            Self::Integer => cell.get_double().map(|number| {
                truncate_i64(number)
                    .map(FieldValue::Integer)
                    .unwrap_or(FieldValue::Double(number))
            }),
            Self::BigInteger => cell.get_double().map(|number| {
                truncate_i128(number)
                    .map(FieldValue::BigInteger)
                    .unwrap_or(FieldValue::Double(number))
            }),
            Self::Decimal => cell
                .get_double()
                .and_then(|number| Decimal::try_from(number).ok())
                .map(FieldValue::Decimal),
            Self::Floating => cell.get_double().map(FieldValue::Double),
            Self::Date => cell
                .get_datetime()
                .map(|datetime| FieldValue::Date(datetime.date())),
            Self::Timestamp => cell.get_datetime().map(FieldValue::Timestamp),
            Self::Boolean => cell.get_bool().map(FieldValue::Boolean),
            Self::Bytes => Some(FieldValue::Bytes(cell.to_string().into_bytes())),
            Self::Text => None,
        };
        coerced.unwrap_or_else(|| FieldValue::Text(cell.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FromFieldValue;
    use calamine::Data;
    use calamine::ExcelDateTime;
    use calamine::ExcelDateTimeType;
    use chrono::NaiveDate;

    fn cell(value: Data) -> Cell {
        Cell::new(0, 0, value)
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_owned())
    }

    #[test]
    fn rule_for_kind() {
        assert_eq!(CoercionRule::for_kind(FieldKind::Long), CoercionRule::Integer);
        assert_eq!(CoercionRule::for_kind(FieldKind::Float), CoercionRule::Floating);
        assert_eq!(CoercionRule::for_kind(FieldKind::Bytes), CoercionRule::Bytes);
    }

    #[test]
    fn integer_rule() {
        let rule = CoercionRule::Integer;
        assert_eq!(rule.apply(&cell(Data::Float(30.0))), FieldValue::Integer(30));
        assert_eq!(rule.apply(&cell(Data::Float(30.7))), FieldValue::Integer(30));
        assert_eq!(rule.apply(&cell(Data::Int(-4))), FieldValue::Integer(-4));
        assert_eq!(rule.apply(&cell(Data::String("30".to_owned()))), text("30"));
        assert_eq!(rule.apply(&cell(Data::Bool(true))), text("true"));
    }

    #[test]
    fn integer_rule_out_of_range_keeps_double() {
        assert_eq!(CoercionRule::Integer.apply(&cell(Data::Float(1e20))), FieldValue::Double(1e20));
        assert_eq!(CoercionRule::Integer.apply(&cell(Data::Float(-1e19))), FieldValue::Double(-1e19));
        assert_eq!(CoercionRule::BigInteger.apply(&cell(Data::Float(1e40))), FieldValue::Double(1e40));
        assert!(i64::from_field_value(CoercionRule::Integer.apply(&cell(Data::Float(1e20)))).is_err());
        assert!(i128::from_field_value(CoercionRule::BigInteger.apply(&cell(Data::Float(1e40)))).is_err());
    }

    #[test]
    fn numeric_rules() {
        assert_eq!(
            CoercionRule::BigInteger.apply(&cell(Data::Float(1e20))),
            FieldValue::BigInteger(100_000_000_000_000_000_000)
        );
        assert_eq!(
            CoercionRule::Decimal.apply(&cell(Data::Float(2.5))),
            FieldValue::Decimal(Decimal::new(25, 1))
        );
        assert_eq!(
            CoercionRule::Floating.apply(&cell(Data::Float(0.1))),
            FieldValue::Double(0.1)
        );
        assert_eq!(
            CoercionRule::Floating.apply(&cell(Data::String("n/a".to_owned()))),
            text("n/a")
        );
    }

    #[test]
    fn temporal_rules() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let serial = cell(Data::DateTime(ExcelDateTime::new(
            45292.5,
            ExcelDateTimeType::DateTime,
            false,
        )));
        assert_eq!(CoercionRule::Date.apply(&serial), FieldValue::Date(date));
        assert_eq!(
            CoercionRule::Timestamp.apply(&serial),
            FieldValue::Timestamp(date.and_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(CoercionRule::Date.apply(&cell(Data::Float(45292.0))), FieldValue::Date(date));
        assert_eq!(
            CoercionRule::Date.apply(&cell(Data::String("2024-01-01".to_owned()))),
            text("2024-01-01")
        );
    }

    #[test]
    fn boolean_rule_falls_back_to_text() {
        assert_eq!(CoercionRule::Boolean.apply(&cell(Data::Bool(false))), FieldValue::Boolean(false));
        assert_eq!(CoercionRule::Boolean.apply(&cell(Data::String("yes".to_owned()))), text("yes"));
        assert_eq!(CoercionRule::Boolean.apply(&cell(Data::Float(1.0))), text("1"));
    }

    #[test]
    fn text_and_bytes_rules() {
        assert_eq!(CoercionRule::Text.apply(&cell(Data::Float(12.0))), text("12"));
        assert_eq!(
            CoercionRule::Bytes.apply(&cell(Data::String("abc".to_owned()))),
            FieldValue::Bytes(b"abc".to_vec())
        );
    }
}
