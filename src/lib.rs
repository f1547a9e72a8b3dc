//! # Sheet Import
//!
//! Reads tabular data out of Excel workbooks and looks up statistics query models.
//!
//! ## Features
//!
//! - **Workbook formats**: legacy `.xls` and OOXML `.xlsx` / `.xlsm`, from a path or a caller-owned stream
//! - **Text extraction**: rows as lists of optional strings, one slot per requested column
//! - **Record extraction**: rows mapped column-by-column onto typed records through [`impl_record!`]
//! - **Flexible addressing**: explicit row/column lists, half-open ranges, open-ended tails, or A1 ranges
//! - **Query models**: filtered listing, CRUD and wizard numbering over DuckDB
//!
//! ```no_run
//! use sheet_import::{read_text, Axis, Extraction};
//!
//! let extraction = Extraction::new()
//!     .sheet_name("Sheet1")
//!     .rows(Axis::List(vec![1]))
//!     .columns(Axis::List(vec![0, 1, 2]));
//! let rows = read_text("people.xlsx", &extraction)?;
//! # Ok::<(), sheet_import::ExtractError>(())
//! ```
pub mod dao;
pub mod extract;
pub mod record;
pub mod spreadsheet;

pub use dao::DaoError;
pub use dao::FilterFields;
pub use dao::FilterKind;
pub use dao::QueryModel;
pub use dao::QueryModelDao;
pub use extract::range::RangeError;
pub use extract::read_records;
pub use extract::read_text;
pub use extract::Axis;
pub use extract::ExtractError;
pub use extract::Extraction;
pub use extract::FieldMap;
pub use extract::TextRow;
pub use record::CoercionRule;
pub use record::FieldKind;
pub use record::FieldValue;
pub use record::Record;
pub use spreadsheet::SheetSelector;
pub use spreadsheet::SpreadsheetError;
pub use spreadsheet::SpreadsheetFormat;
pub use spreadsheet::Workbook;
