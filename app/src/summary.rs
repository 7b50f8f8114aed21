//! Terminal tables for `inspect` and run summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use label_engine::RowFailure;
use row_source::{ColumnKind, SourceError, Table as RowTable, Value};

/// Columns of a source with their inferred kind and fill count.
pub fn columns_table(rows: &RowTable) -> Result<Table, SourceError> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Non-empty"),
    ]);
    apply_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    for (i, column) in rows.columns().iter().enumerate() {
        let kind = match rows.column_kind(column)? {
            ColumnKind::Numeric => Cell::new("numeric").fg(Color::Green),
            ColumnKind::Text => Cell::new("text"),
        };
        let filled = rows
            .rows()
            .iter()
            .filter(|row| row.get(column).is_some_and(|v| !v.is_empty()))
            .count();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(column),
            kind,
            Cell::new(format!("{filled}/{}", rows.len())),
        ]);
    }
    Ok(table)
}

/// Distinct values of one column, as offered by value filters.
pub fn values_table(column: &str, values: &[Value]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(column)]);
    table.load_preset(UTF8_FULL_CONDENSED);
    for value in values {
        table.add_row(vec![Cell::new(value)]);
    }
    table
}

/// Rows left out under `--skip-invalid`.
pub fn skipped_table(skipped: &[RowFailure]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Row"), header_cell("Reason")]);
    apply_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for failure in skipped {
        table.add_row(vec![
            Cell::new(failure.index + 1),
            Cell::new(&failure.error).fg(Color::Yellow),
        ]);
    }
    table
}

fn apply_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
