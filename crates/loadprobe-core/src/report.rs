//! Console rendering for sample records.

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;

use crate::model::RowSet;

/// Render rows as a plain-ASCII table with a leading row index column.
#[must_use]
pub fn render_rows(rows: &RowSet) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);

    let mut header = Vec::with_capacity(rows.columns.len() + 1);
    header.push(String::new());
    header.extend(rows.columns.iter().cloned());
    table.set_header(header);

    for (i, row) in rows.rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(row.len() + 1);
        cells.push(i.to_string());
        cells.extend(row.iter().map(ToString::to_string));
        table.add_row(cells);
    }

    table.to_string()
}
