//! Conversions between zero-based indexes and Excel-style references.

/// Converts zero-based row & column indexes to an Excel-style cell reference (e.g. "A1", "AB12").
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut reference = index_to_col(col);
    reference.push_str((row + 1).to_string().as_str());
    reference
}

/// Converts a zero-based column index to column letters: 0 = A, 25 = Z, 26 = AA.
pub(crate) fn index_to_col(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = String::new();
    while col > 0 {
        col -= 1;
        letters.insert(0, char::from(b'A' + (col % 26) as u8));
        col /= 26;
    }
    letters
}

/// Parses column letters (case-insensitive) to a zero-based column index.
/// Returns None for an empty or non-alphabetic string, or one too long for `usize`.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0usize, |index, letter| {
            index.checked_mul(26)?.checked_add((letter - b'A') as usize + 1)
        })
        .map(|col| col - 1)
}

/// Parses a 1-based row number to a zero-based row index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}
