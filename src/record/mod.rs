//! # Record Module
//!
//! Field metadata and setters for record types populated from spreadsheet rows.
//! A record type declares each field's [`FieldKind`]; a [`CoercionRule`] picked by
//! that kind turns a cell into a [`FieldValue`], and [`FromFieldValue`] converts the
//! value into the field's Rust type.
//!
//! ```
//! use sheet_import::impl_record;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: Option<String>,
//!     age: Option<i32>,
//! }
//!
//! impl_record!(Person {
//!     name: Text,
//!     age: Integer,
//! });
//! ```
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

mod coercion;

pub use coercion::CoercionRule;

/// Errors raised while resolving or setting a record field.
#[derive(Error, Debug, PartialEq)]
pub enum FieldError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Invalid value for field '{field}': {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },
}

/// A field value that cannot be represented by the field's Rust type.
#[derive(Error, Debug, PartialEq)]
#[error("cannot convert {value} to {target}")]
pub struct ConversionError {
    pub value: String,
    pub target: &'static str,
}

impl ConversionError {
    fn new(value: &FieldValue, target: &'static str) -> Self {
        Self {
            value: format!("{value:?}"),
            target,
        }
    }
}

/// Declared semantic type of a record field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// 32-bit integers
    Integer,
    /// 64-bit integers
    Long,
    /// Arbitrary-size integers
    BigInteger,
    /// Exact decimal numbers
    Decimal,
    /// Single precision floating point numbers
    Float,
    /// Double precision floating point numbers
    Double,
    /// Date without time
    Date,
    /// Date and time
    Timestamp,
    /// Boolean values
    Boolean,
    /// Raw bytes
    Bytes,
    /// Text and anything else
    Text,
}

/// A cell value coerced towards a field's declared kind.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    BigInteger(i128),
    Decimal(Decimal),
    Double(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Boolean(bool),
    Bytes(Vec<u8>),
    /// Text rendering of the cell, used whenever the cell does not match the declared kind
    Text(String),
}

/// Field metadata and setters of a record type.
///
/// Usually implemented with [`impl_record!`](crate::impl_record).
pub trait Record: Default {
    /// Declared kind of a field, or None if the type has no such field.
    fn field_kind(name: &str) -> Option<FieldKind>;

    /// Stores a coerced value into a field.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldError>;
}

/// Conversion from a coerced value into a field's Rust type.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError>;
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        T::from_field_value(value).map(Some)
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match value {
            FieldValue::Text(value) => Ok(value),
            FieldValue::Integer(value) => Ok(value.to_string()),
            FieldValue::BigInteger(value) => Ok(value.to_string()),
            FieldValue::Decimal(value) => Ok(value.to_string()),
            FieldValue::Double(value) => Ok(value.to_string()),
            FieldValue::Date(value) => Ok(value.format("%Y-%m-%d").to_string()),
            FieldValue::Timestamp(value) => Ok(value.format("%Y-%m-%d %H:%M:%S").to_string()),
            FieldValue::Boolean(value) => Ok(value.to_string()),
            FieldValue::Bytes(value) => {
                String::from_utf8(value).map_err(|e| ConversionError {
                    value: format!("{:?}", e.as_bytes()),
                    target: "String",
                })
            }
        }
    }
}

/// Truncates toward zero, or None when the value is not finite or does not fit an `i64`.
pub(crate) fn truncate_i64(number: f64) -> Option<i64> {
    let number = number.trunc();
    (number.is_finite() && number >= i64::MIN as f64 && number < i64::MAX as f64).then(|| number as i64)
}

/// Truncates toward zero, or None when the value is not finite or does not fit an `i128`.
pub(crate) fn truncate_i128(number: f64) -> Option<i128> {
    let number = number.trunc();
    (number.is_finite() && number >= i128::MIN as f64 && number < i128::MAX as f64).then(|| number as i128)
}

/// Parses trimmed text with `FromStr`, reporting the target type on failure.
fn parse_text<T: FromStr>(value: &FieldValue, text: &str, target: &'static str) -> Result<T, ConversionError> {
    text.trim().parse::<T>().map_err(|_| ConversionError::new(value, target))
}

macro_rules! impl_from_integer_field_value {
    ($($target:ty),*) => {
        $(
            impl FromFieldValue for $target {
                fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
                    let target = stringify!($target);
                    match &value {
                        FieldValue::Integer(number) => {
                            <$target>::try_from(*number).map_err(|_| ConversionError::new(&value, target))
                        }
                        FieldValue::BigInteger(number) => {
                            <$target>::try_from(*number).map_err(|_| ConversionError::new(&value, target))
                        }
                        FieldValue::Decimal(number) => number
                            .trunc()
                            .to_i128()
                            .and_then(|number| <$target>::try_from(number).ok())
                            .ok_or_else(|| ConversionError::new(&value, target)),
                        FieldValue::Double(number) => truncate_i128(*number)
                            .and_then(|number| <$target>::try_from(number).ok())
                            .ok_or_else(|| ConversionError::new(&value, target)),
                        FieldValue::Text(text) => parse_text(&value, text, target),
                        _ => Err(ConversionError::new(&value, target)),
                    }
                }
            }
        )*
    };
}

impl_from_integer_field_value!(i16, i32, i64, i128, u32, u64);

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match &value {
            FieldValue::Double(number) => Ok(*number),
            FieldValue::Integer(number) => Ok(*number as f64),
            FieldValue::BigInteger(number) => Ok(*number as f64),
            FieldValue::Decimal(number) => number.to_f64().ok_or_else(|| ConversionError::new(&value, "f64")),
            FieldValue::Text(text) => parse_text(&value, text, "f64"),
            _ => Err(ConversionError::new(&value, "f64")),
        }
    }
}

impl FromFieldValue for f32 {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match value {
            FieldValue::Text(ref text) => parse_text(&value, text, "f32"),
            value => f64::from_field_value(value).map(|number| number as f32),
        }
    }
}

impl FromFieldValue for Decimal {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match &value {
            FieldValue::Decimal(number) => Ok(*number),
            FieldValue::Integer(number) => Ok(Decimal::from(*number)),
            FieldValue::BigInteger(number) => Decimal::try_from_i128_with_scale(*number, 0)
                .map_err(|_| ConversionError::new(&value, "Decimal")),
            FieldValue::Double(number) => {
                Decimal::try_from(*number).map_err(|_| ConversionError::new(&value, "Decimal"))
            }
            FieldValue::Text(text) => parse_text(&value, text, "Decimal"),
            _ => Err(ConversionError::new(&value, "Decimal")),
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match &value {
            FieldValue::Boolean(flag) => Ok(*flag),
            FieldValue::Integer(number) => Ok(*number != 0),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(true),
                "false" | "f" | "no" | "n" | "0" => Ok(false),
                _ => Err(ConversionError::new(&value, "bool")),
            },
            _ => Err(ConversionError::new(&value, "bool")),
        }
    }
}

impl FromFieldValue for NaiveDate {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match &value {
            FieldValue::Date(date) => Ok(*date),
            FieldValue::Timestamp(datetime) => Ok(datetime.date()),
            FieldValue::Text(text) => {
                let text = text.trim();
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .or_else(|_| parse_datetime(text).map(|datetime| datetime.date()))
                    .map_err(|_| ConversionError::new(&value, "NaiveDate"))
            }
            _ => Err(ConversionError::new(&value, "NaiveDate")),
        }
    }
}

impl FromFieldValue for NaiveDateTime {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match &value {
            FieldValue::Timestamp(datetime) => Ok(*datetime),
            FieldValue::Date(date) => date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| ConversionError::new(&value, "NaiveDateTime")),
            FieldValue::Text(text) => {
                let text = text.trim();
                parse_datetime(text)
                    .or_else(|_| {
                        NaiveDate::parse_from_str(text, "%Y-%m-%d")
                            .map(|date| date.and_time(chrono::NaiveTime::MIN))
                    })
                    .map_err(|_| ConversionError::new(&value, "NaiveDateTime"))
            }
            _ => Err(ConversionError::new(&value, "NaiveDateTime")),
        }
    }
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    if text.contains('T') {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
    } else {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
    }
}

impl FromFieldValue for Vec<u8> {
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match value {
            FieldValue::Bytes(bytes) => Ok(bytes),
            FieldValue::Text(text) => Ok(text.into_bytes()),
            value => String::from_field_value(value).map(String::into_bytes),
        }
    }
}

/// Implements [`Record`] for a struct whose listed fields implement [`FromFieldValue`].
///
/// Each field is listed with its [`FieldKind`] variant name.
#[macro_export]
macro_rules! impl_record {
    ($record:ty { $($field:ident : $kind:ident),* $(,)? }) => {
        impl $crate::record::Record for $record {
            fn field_kind(name: &str) -> Option<$crate::record::FieldKind> {
                match name {
                    $(stringify!($field) => Some($crate::record::FieldKind::$kind),)*
                    _ => None,
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::record::FieldValue,
            ) -> Result<(), $crate::record::FieldError> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::record::FromFieldValue::from_field_value(value)
                                .map_err(|source| $crate::record::FieldError::Conversion {
                                    field: name.to_owned(),
                                    source,
                                })?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::record::FieldError::UnknownField(name.to_owned())),
                }
            }
        }
    };
}
