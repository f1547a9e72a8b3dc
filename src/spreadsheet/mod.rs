//! # Spreadsheet Module
//!
//! Opens legacy binary (`.xls`) and zip-based (`.xlsx`, `.xlsm`) workbooks through
//! calamine and materializes a selected worksheet into a [`Sheet`] of recorded cells.
use calamine::open_workbook;
use calamine::Reader;
use calamine::Xls;
use calamine::XlsError;
use calamine::Xlsx;
use calamine::XlsxError;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod cell;
pub(crate) mod reference;
pub mod sheet;

pub use cell::Cell;
pub use sheet::Sheet;

/// Errors raised while opening a workbook or selecting a sheet.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm), including I/O failures
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in legacy Excel format (.xls), including I/O failures
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// File name suffix is not a supported spreadsheet format
    #[error("Cannot detect file format for '{name}'")]
    UnsupportedFormat { name: String },

    /// Sheet position beyond the number of sheets in the workbook
    #[error("Sheet index {index} out of bounds for a workbook with {count} sheets")]
    SheetIndexOutOfBounds { index: usize, count: usize },
}

/// The two container formats a workbook can be parsed from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Legacy binary workbook (.xls)
    Xls,
    /// Zip-based workbook (.xlsx, .xlsm)
    Xlsx,
}

impl SpreadsheetFormat {
    /// Detects the format from a file name suffix, case-insensitively.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpreadsheetError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xls") => Ok(Self::Xls),
            Some("xlsx") | Some("xlsm") => Ok(Self::Xlsx),
            _ => Err(SpreadsheetError::UnsupportedFormat {
                name: path.to_string_lossy().to_string(),
            }),
        }
    }
}

/// Selects one worksheet of a workbook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetSelector {
    /// Exact sheet name; a blank name selects the first sheet
    Name(String),
    /// Zero-based sheet position
    Index(usize),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Name(String::new())
    }
}

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// An opened workbook in one of the two supported container formats.
pub enum Workbook<RS> {
    /// Legacy Excel format reader (range based)
    Xls(Xls<RS>),
    /// Excel 2007+ format reader (cell streaming)
    Xlsx(Xlsx<RS>),
}

impl Workbook<FileReader> {
    /// Opens a workbook file, detecting the format from its suffix.
    /// The file is released when the workbook is dropped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SpreadsheetError> {
        let path = path.as_ref();
        let format = SpreadsheetFormat::from_path(path)?;
        debug!(path = %path.display(), ?format, "opening workbook");
        match format {
            SpreadsheetFormat::Xls => Ok(Self::Xls(open_workbook(path)?)),
            SpreadsheetFormat::Xlsx => Ok(Self::Xlsx(open_workbook(path)?)),
        }
    }
}

impl<RS: Read + Seek> Workbook<RS> {
    /// Parses a workbook from a stream in an explicitly given format.
    ///
    /// Pass `&mut stream` to keep ownership of the stream; it is never closed here.
    pub fn from_reader(reader: RS, format: SpreadsheetFormat) -> Result<Self, SpreadsheetError> {
        debug!(?format, "parsing workbook from stream");
        match format {
            SpreadsheetFormat::Xls => Ok(Self::Xls(Xls::new(reader)?)),
            SpreadsheetFormat::Xlsx => Ok(Self::Xlsx(Xlsx::new(reader)?)),
        }
    }

    pub fn format(&self) -> SpreadsheetFormat {
        match self {
            Self::Xls(_) => SpreadsheetFormat::Xls,
            Self::Xlsx(_) => SpreadsheetFormat::Xlsx,
        }
    }

    /// Returns the names of all sheets in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xls(xls) => xls.sheet_names(),
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
        }
    }

    /// Resolves a selector to a sheet name.
    ///
    /// An unknown name resolves to `None`; an index past the last sheet is an error.
    pub fn sheet_name(&self, selector: &SheetSelector) -> Result<Option<String>, SpreadsheetError> {
        let names = self.sheet_names();
        match selector {
            SheetSelector::Name(name) if name.trim().is_empty() => Ok(names.into_iter().next()),
            SheetSelector::Name(name) => Ok(names.into_iter().find(|it| it == name)),
            SheetSelector::Index(index) => {
                let count = names.len();
                names
                    .into_iter()
                    .nth(*index)
                    .map(Some)
                    .ok_or(SpreadsheetError::SheetIndexOutOfBounds { index: *index, count })
            }
        }
    }

    /// Loads the selected sheet, or `None` when no sheet matches the selector's name.
    pub fn open_sheet(&mut self, selector: &SheetSelector) -> Result<Option<Sheet>, SpreadsheetError> {
        let Some(name) = self.sheet_name(selector)? else {
            debug!(?selector, "sheet not found");
            return Ok(None);
        };
        let mut sheet = Sheet::new(&name);
        match self {
            Self::Xls(xls) => {
                let range = xls.worksheet_range(&name)?;
                if let Some((row_lower_bound, col_lower_bound)) = range.start() {
                    for (row, col, value) in range.used_cells() {
                        sheet.push(Cell::new(
                            row_lower_bound as usize + row,
                            col_lower_bound as usize + col,
                            value.to_owned(),
                        ));
                    }
                }
            }
            Self::Xlsx(xlsx) => {
                let mut reader = xlsx.worksheet_cells_reader(&name)?;
                while let Some(cell) = reader.next_cell()? {
                    let (row, col) = cell.get_position();
                    sheet.push(Cell::from_ref(row as usize, col as usize, cell.get_value()));
                }
            }
        }
        debug!(sheet = %sheet.name, first_row = ?sheet.first_row(), last_row = ?sheet.last_row(), "sheet loaded");
        Ok(Some(sheet))
    }
}
