//! # Extraction Module
//!
//! Reads rows out of a worksheet as a text matrix or as typed records.
//!
//! An [`Extraction`] names the sheet and how rows and columns are addressed:
//!
//! - rows given as an explicit [`Axis::List`] yield exactly one entry per requested
//!   row, `None` for a row the sheet never recorded;
//! - rows given as an [`Axis::Range`] or [`Axis::From`] skip absent rows and drop
//!   rows without any non-blank requested cell;
//! - columns given as [`Axis::From`] end at each row's own last recorded cell, so
//!   row width varies only in that mode.
use crate::record::CoercionRule;
use crate::record::FieldError;
use crate::record::Record;
use crate::spreadsheet::Cell;
use crate::spreadsheet::FileReader;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::SheetSelector;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use std::collections::BTreeMap;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use tracing::trace;

pub mod range;

/// Number of columns a worksheet can hold (`A` through `XFD`); range column ends are capped here.
pub const MAX_COLUMNS: usize = 16_384;

/// Mapped columns resolved to their field names and coercion rules.
type ResolvedFields<'a> = Vec<(usize, &'a str, CoercionRule)>;

/// One extracted text row: a slot per requested column, `None` for an absent or blank cell.
pub type TextRow = Vec<Option<String>>;

/// Errors raised while extracting rows.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Read spreadsheet failed: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    /// A mapped field name the record type does not declare
    #[error("Unknown field '{field}' mapped to column {col}")]
    UnknownField { col: usize, field: String },

    /// A cell value the record field cannot hold
    #[error("Invalid cell value at '{position}': {source}")]
    InvalidCellValue {
        position: String,
        #[source]
        source: FieldError,
    },
}

/// Addressing of rows or columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Explicit ordered indexes
    List(Vec<usize>),
    /// Half-open range `[begin, end)`; as columns, `end` is capped at [`MAX_COLUMNS`]
    Range { begin: usize, end: usize },
    /// From `begin` through the populated end of the sheet (rows) or of each row (columns)
    From(usize),
}

impl Default for Axis {
    fn default() -> Self {
        Self::From(0)
    }
}

impl Axis {
    /// Range with an inclusive end: `[begin, end]`.
    pub fn inclusive(begin: usize, end: usize) -> Self {
        Self::Range {
            begin,
            end: end.saturating_add(1),
        }
    }

    /// Column indexes addressed in a row whose column end is `row_end`.
    fn indexes(&self, row_end: usize) -> Vec<usize> {
        match self {
            Self::List(indexes) => indexes.to_owned(),
            Self::Range { begin, end } => (*begin..(*end).min(MAX_COLUMNS)).collect(),
            Self::From(begin) => (*begin..row_end).collect(),
        }
    }

    /// Checks whether a column is addressed in a row whose column end is `row_end`.
    fn admits(&self, index: usize, row_end: usize) -> bool {
        match self {
            Self::List(indexes) => indexes.contains(&index),
            Self::Range { begin, end } => *begin <= index && index < *end,
            Self::From(begin) => *begin <= index && index < row_end,
        }
    }
}

/// Which sheet to read and how its rows and columns are addressed.
///
/// Defaults to the first sheet, every row and every column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub sheet: SheetSelector,
    pub rows: Axis,
    pub columns: Axis,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a sheet by exact name; a blank name selects the first sheet.
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet = SheetSelector::Name(name.into());
        self
    }

    /// Selects a sheet by zero-based position.
    pub fn sheet_index(mut self, index: usize) -> Self {
        self.sheet = SheetSelector::Index(index);
        self
    }

    pub fn rows(mut self, rows: Axis) -> Self {
        self.rows = rows;
        self
    }

    pub fn columns(mut self, columns: Axis) -> Self {
        self.columns = columns;
        self
    }

    /// Present rows addressed by a range or open-ended row axis, ascending.
    fn present_rows(&self, sheet: &Sheet) -> Vec<usize> {
        match &self.rows {
            Axis::List(rows) => rows.iter().copied().filter(|row| sheet.has_row(*row)).collect(),
            Axis::Range { begin, end } if begin < end => sheet.rows_between(*begin, end - 1).collect(),
            Axis::Range { .. } => Vec::new(),
            Axis::From(begin) => sheet
                .last_row()
                .map(|last_row| sheet.rows_between(*begin, last_row).collect())
                .unwrap_or_default(),
        }
    }

    fn text_row(&self, sheet: &Sheet, row: usize) -> TextRow {
        let row_end = sheet.row_end(row).unwrap_or(0);
        self.columns
            .indexes(row_end)
            .into_iter()
            .map(|col| sheet.get(row, col).and_then(Cell::to_text))
            .collect()
    }

    /// Extracts a text matrix from a loaded sheet.
    pub fn text_rows(&self, sheet: &Sheet) -> Vec<Option<TextRow>> {
        match &self.rows {
            Axis::List(rows) => rows
                .iter()
                .map(|row| sheet.has_row(*row).then(|| self.text_row(sheet, *row)))
                .collect(),
            _ => self
                .present_rows(sheet)
                .into_iter()
                .filter_map(|row| {
                    let text_row = self.text_row(sheet, row);
                    if text_row.iter().any(Option::is_some) {
                        Some(Some(text_row))
                    } else {
                        trace!(row, "dropping blank row");
                        None
                    }
                })
                .collect(),
        }
    }

    /// Extracts records from a loaded sheet. Records without any populated field are dropped.
    pub fn records<T: Record>(&self, sheet: &Sheet, fields: &FieldMap) -> Result<Vec<T>, ExtractError> {
        let rules = fields.resolve::<T>()?;
        self.resolved_records(sheet, &rules)
    }

    fn resolved_records<T: Record>(&self, sheet: &Sheet, rules: &[(usize, &str, CoercionRule)]) -> Result<Vec<T>, ExtractError> {
        let rows = self.present_rows(sheet);
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let row_end = sheet.row_end(row).unwrap_or(0);
            let mut record = T::default();
            let mut populated = 0;
            for (col, field, rule) in rules {
                if !self.columns.admits(*col, row_end) {
                    continue;
                }
                let Some(cell) = sheet.get(row, *col).filter(|cell| !cell.is_blank()) else {
                    continue;
                };
                record
                    .set_field(field, rule.apply(cell))
                    .map_err(|source| ExtractError::InvalidCellValue {
                        position: cell.reference(),
                        source,
                    })?;
                populated += 1;
            }
            if populated > 0 {
                records.push(record);
            } else {
                trace!(row, "dropping record without populated fields");
            }
        }
        Ok(records)
    }
}

/// Mapping from column index to record field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<usize, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, col: usize, field: impl Into<String>) -> Option<String> {
        self.0.insert(col, field.into())
    }

    pub fn get(&self, col: usize) -> Option<&str> {
        self.0.get(&col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves every mapped field against the record type's declared kinds.
    fn resolve<T: Record>(&self) -> Result<ResolvedFields<'_>, ExtractError> {
        self.0
            .iter()
            .map(|(col, field)| {
                T::field_kind(field)
                    .map(|kind| (*col, field.as_str(), CoercionRule::for_kind(kind)))
                    .ok_or_else(|| ExtractError::UnknownField {
                        col: *col,
                        field: field.to_owned(),
                    })
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(col, field)| (col, field.into())).collect())
    }
}

impl<RS: Read + Seek> Workbook<RS> {
    /// Extracts a text matrix, or `None` when the named sheet does not exist.
    pub fn extract_text(&mut self, extraction: &Extraction) -> Result<Option<Vec<Option<TextRow>>>, ExtractError> {
        let Some(sheet) = self.open_sheet(&extraction.sheet)? else {
            return Ok(None);
        };
        let rows = extraction.text_rows(&sheet);
        debug!(sheet = %sheet.name, rows = rows.len(), "extracted text rows");
        Ok(Some(rows))
    }

    /// Extracts records, or `None` when the named sheet does not exist.
    ///
    /// Fails before reading any row if a mapped field is unknown to `T`.
    pub fn extract_records<T: Record>(
        &mut self,
        extraction: &Extraction,
        fields: &FieldMap,
    ) -> Result<Option<Vec<T>>, ExtractError> {
        let rules = fields.resolve::<T>()?;
        let Some(sheet) = self.open_sheet(&extraction.sheet)? else {
            return Ok(None);
        };
        let records = extraction.resolved_records::<T>(&sheet, &rules)?;
        debug!(sheet = %sheet.name, records = records.len(), "extracted records");
        Ok(Some(records))
    }
}

/// Opens a workbook file, extracts a text matrix, and releases the file.
pub fn read_text<P: AsRef<Path>>(path: P, extraction: &Extraction) -> Result<Option<Vec<Option<TextRow>>>, ExtractError> {
    let mut workbook: Workbook<FileReader> = Workbook::open(path)?;
    workbook.extract_text(extraction)
}

/// Opens a workbook file, extracts records, and releases the file.
pub fn read_records<T: Record, P: AsRef<Path>>(
    path: P,
    extraction: &Extraction,
    fields: &FieldMap,
) -> Result<Option<Vec<T>>, ExtractError> {
    let mut workbook: Workbook<FileReader> = Workbook::open(path)?;
    workbook.extract_records(extraction, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        name: Option<String>,
        age: Option<i64>,
        active: Option<bool>,
    }

    crate::impl_record!(Person {
        name: Text,
        age: Long,
        active: Boolean,
    });

    fn text(value: &str) -> Option<String> {
        Some(value.to_owned())
    }

    /// Rows 0 and 2 populated, row 4 holds only a blank cell.
    fn sheet() -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        sheet.push(Cell::new(0, 0, Data::String("Bob".to_owned())));
        sheet.push(Cell::new(0, 1, Data::Float(25.0)));
        sheet.push(Cell::new(2, 0, Data::String("Alice".to_owned())));
        sheet.push(Cell::new(2, 1, Data::Float(30.0)));
        sheet.push(Cell::new(2, 2, Data::Bool(true)));
        sheet.push(Cell::new(4, 1, Data::Empty));
        sheet
    }

    #[test]
    fn text_explicit_lists() {
        let extraction = Extraction::new()
            .rows(Axis::List(vec![2, 5, 0]))
            .columns(Axis::List(vec![2, 0]));

        assert_eq!(
            extraction.text_rows(&sheet()),
            vec![
                Some(vec![text("true"), text("Alice")]),
                None,
                Some(vec![None, text("Bob")]),
            ]
        );
    }

    #[test]
    fn text_explicit_lists_keep_blank_rows() {
        let extraction = Extraction::new()
            .rows(Axis::List(vec![4]))
            .columns(Axis::List(vec![0, 1]));

        assert_eq!(extraction.text_rows(&sheet()), vec![Some(vec![None, None])]);
    }

    #[test]
    fn text_range_skips_absent_and_blank_rows() {
        let extraction = Extraction::new()
            .rows(Axis::Range { begin: 0, end: 5 })
            .columns(Axis::Range { begin: 0, end: 2 });

        assert_eq!(
            extraction.text_rows(&sheet()),
            vec![
                Some(vec![text("Bob"), text("25")]),
                Some(vec![text("Alice"), text("30")]),
            ]
        );
    }

    #[test]
    fn text_range_end_is_exclusive() {
        let extraction = Extraction::new()
            .rows(Axis::Range { begin: 0, end: 2 })
            .columns(Axis::inclusive(1, 2));

        assert_eq!(extraction.text_rows(&sheet()), vec![Some(vec![text("25"), None])]);
    }

    #[test]
    fn text_range_columns_capped() {
        let extraction = Extraction::new()
            .rows(Axis::List(vec![0]))
            .columns(Axis::inclusive(0, usize::MAX));

        let rows = extraction.text_rows(&sheet());
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.len(), MAX_COLUMNS);
        assert_eq!(row[..2], [text("Bob"), text("25")]);
        assert!(row[2..].iter().all(Option::is_none));
    }

    #[test]
    fn records_with_unbounded_column_range() {
        let fields: FieldMap = [(0, "name")].into_iter().collect();
        let extraction = Extraction::new().columns(Axis::Range { begin: 0, end: usize::MAX });
        let people: Vec<Person> = extraction.records(&sheet(), &fields).unwrap();

        assert_eq!(people.len(), 2);
    }

    #[test]
    fn text_empty_range() {
        let extraction = Extraction::new().rows(Axis::Range { begin: 3, end: 3 });

        assert!(extraction.text_rows(&sheet()).is_empty());
    }

    #[test]
    fn text_open_ended_width_follows_row() {
        let extraction = Extraction::new();

        assert_eq!(
            extraction.text_rows(&sheet()),
            vec![
                Some(vec![text("Bob"), text("25")]),
                Some(vec![text("Alice"), text("30"), text("true")]),
            ]
        );
    }

    #[test]
    fn text_open_ended_from_offset() {
        let extraction = Extraction::new().rows(Axis::From(1)).columns(Axis::From(1));

        assert_eq!(
            extraction.text_rows(&sheet()),
            vec![Some(vec![text("30"), text("true")])]
        );
    }

    #[test]
    fn records_from_sheet() {
        let fields: FieldMap = [(0, "name"), (1, "age"), (2, "active")].into_iter().collect();
        let people: Vec<Person> = Extraction::new().records(&sheet(), &fields).unwrap();

        assert_eq!(
            people,
            vec![
                Person { name: text("Bob"), age: Some(25), active: None },
                Person { name: text("Alice"), age: Some(30), active: Some(true) },
            ]
        );
    }

    #[test]
    fn records_respect_column_axis() {
        let fields: FieldMap = [(0, "name"), (1, "age")].into_iter().collect();
        let extraction = Extraction::new()
            .rows(Axis::List(vec![2, 5]))
            .columns(Axis::List(vec![1]));
        let people: Vec<Person> = extraction.records(&sheet(), &fields).unwrap();

        assert_eq!(people, vec![Person { name: None, age: Some(30), active: None }]);
    }

    #[test]
    fn records_drop_unpopulated() {
        let fields: FieldMap = [(1, "age")].into_iter().collect();
        let extraction = Extraction::new().rows(Axis::List(vec![4]));
        let people: Vec<Person> = extraction.records(&sheet(), &fields).unwrap();

        assert!(people.is_empty());
    }

    #[test]
    fn records_unknown_field() {
        let fields: FieldMap = [(0, "name"), (3, "email")].into_iter().collect();
        let result = Extraction::new().records::<Person>(&sheet(), &fields);

        assert!(matches!(
            result,
            Err(ExtractError::UnknownField { col: 3, ref field }) if field == "email"
        ));
    }

    #[test]
    fn records_invalid_value() {
        let fields: FieldMap = [(0, "age")].into_iter().collect();
        let result = Extraction::new().records::<Person>(&sheet(), &fields);

        assert!(matches!(
            result,
            Err(ExtractError::InvalidCellValue { ref position, .. }) if position == "A1"
        ));
    }

    #[test]
    fn field_map_lookup() {
        let mut fields = FieldMap::new();
        assert!(fields.is_empty());
        fields.insert(1, "age");
        fields.insert(0, "name");

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get(0), Some("name"));
        assert_eq!(fields.get(2), None);
    }
}
