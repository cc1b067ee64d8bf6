use tracing::trace;

use super::{BodyRow, RawRow, RawTable};

/// Marker that distinguishes a value cell from commentary or "--" cells.
const CURRENCY_MARKER: char = '$';

/// Pairs `keys[i]` with `values[i]`, stopping at the shorter side.
///
/// Statement rows often carry fewer values than there are periods (a
/// quarter not yet reported, a "--" cell filtered out). The missing
/// trailing periods get no value for that row; nothing is padded.
pub fn align_by_position<'a, K, V>(
    keys: &'a [K],
    values: &'a [V],
) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
    let n = keys.len().min(values.len());
    keys[..n].iter().zip(&values[..n])
}

/// Builds the raw table for `columns` out of the body rows.
///
/// Rows without label or data cells are spacers and are skipped. Of the data
/// cells, the first is dropped and only cells containing `$` are kept.
pub fn extract_rows(body_rows: &[BodyRow], columns: &[String]) -> RawTable {
    let mut rows = Vec::with_capacity(body_rows.len());

    for row in body_rows {
        let Some(label) = row.labels.first() else {
            trace!("skipping row without label cells");
            continue;
        };
        if row.cells.is_empty() {
            trace!(%label, "skipping row without data cells");
            continue;
        }

        let currency: Vec<&String> = row
            .cells
            .iter()
            .skip(1)
            .filter(|cell| cell.contains(CURRENCY_MARKER))
            .collect();

        let cells: Vec<String> = align_by_position(columns, currency.as_slice())
            .map(|(_, cell)| (*cell).clone())
            .collect();
        if cells.len() < columns.len() {
            trace!(%label, have = cells.len(), want = columns.len(), "row truncated");
        }

        rows.push(RawRow {
            label: label.clone(),
            cells,
        });
    }

    RawTable {
        columns: columns.to_vec(),
        rows,
    }
}
