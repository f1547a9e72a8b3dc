#![allow(dead_code)]

use anyhow::Result;
use rust_xlsxwriter::Format;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use tempfile::TempDir;

/// Serial number of 2024-01-01 in the 1900 date system
pub const JAN_1_2024: f64 = 45292.0;

/// Builds the shared fixture workbook.
///
/// `Sheet1` holds text only: a header in row 0 and `Alice`, `30`, `true` in row 2.
/// `People` holds typed values: a header in row 0, then
/// `Bob`, 30, TRUE, 2024-01-01 in row 1 and `Carol`, 41.9, `yes` in row 2.
pub fn people_workbook() -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let text = workbook.add_worksheet().set_name("Sheet1")?;
    text.write_string(0, 0, "name")?;
    text.write_string(0, 1, "age")?;
    text.write_string(0, 2, "active")?;
    text.write_string(2, 0, "Alice")?;
    text.write_string(2, 1, "30")?;
    text.write_string(2, 2, "true")?;

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let typed = workbook.add_worksheet().set_name("People")?;
    typed.write_string(0, 0, "name")?;
    typed.write_string(0, 1, "age")?;
    typed.write_string(0, 2, "active")?;
    typed.write_string(0, 3, "joined")?;
    typed.write_string(1, 0, "Bob")?;
    typed.write_number(1, 1, 30.0)?;
    typed.write_boolean(1, 2, true)?;
    typed.write_number_with_format(1, 3, JAN_1_2024, &date_format)?;
    typed.write_string(2, 0, "Carol")?;
    typed.write_number(2, 1, 41.9)?;
    typed.write_string(2, 2, "yes")?;

    Ok(workbook)
}

/// Saves the fixture workbook into a fresh temporary directory.
/// The directory lives as long as the returned guard.
pub fn people_xlsx() -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("people.xlsx");
    people_workbook()?.save(&path)?;
    Ok((dir, path))
}

/// The fixture workbook as in-memory xlsx bytes.
pub fn people_xlsx_bytes() -> Result<Vec<u8>> {
    Ok(people_workbook()?.save_to_buffer()?)
}

/// The legacy binary fixture: `Sheet1` and `People` as in [`people_workbook`],
/// plus `Offset` with `x`, 1 in C4:D4 and `y`, 2 in C6 and E6.
pub fn people_xls() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/people.xls")
}
