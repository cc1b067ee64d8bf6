use super::HeaderRow;

/// Marker Nasdaq puts in the first cell of the row listing period end dates
/// ("Period Ending:", "Quarter Ending:", ...).
const PERIOD_MARKER: &str = "ending";

/// Cells before the first period label: the marker cell and a spacer.
const LEADING_HEADER_CELLS: usize = 2;

/// Returns the period labels of the first header row whose first cell
/// mentions "ending", or an empty list when there is none.
///
/// Repeated labels are kept once, at their first position.
pub fn extract_columns(header_rows: &[HeaderRow]) -> Vec<String> {
    let Some(row) = header_rows.iter().find(|row| {
        row.first()
            .is_some_and(|cell| cell.to_lowercase().contains(PERIOD_MARKER))
    }) else {
        return Vec::new();
    };

    let mut labels: Vec<String> = Vec::with_capacity(row.len().saturating_sub(LEADING_HEADER_CELLS));
    for cell in row.iter().skip(LEADING_HEADER_CELLS) {
        if !labels.contains(cell) {
            labels.push(cell.clone());
        }
    }
    labels
}
