//! Headless text rendering of a dataset through its columns
//!
//! Used for previews, logging and tests; real presentation adapters draw the
//! same information with their own widgets.

use crate::column::{ColumnGroup, HAlign};
use crate::data::Dataset;
use crate::sort::{SortOrder, SortState};
use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};

fn cell_alignment(align: HAlign) -> CellAlignment {
    match align {
        HAlign::Left => CellAlignment::Left,
        HAlign::Right => CellAlignment::Right,
        HAlign::Center => CellAlignment::Center,
    }
}

/// Header label with the sort indicator of the column
pub fn header_label(name: &str, order: Option<SortOrder>) -> String {
    match order {
        Some(SortOrder::Ascending) => format!("{} ▲", name),
        Some(SortOrder::Descending) => format!("{} ▼", name),
        None => name.to_string(),
    }
}

/// Draw `data` as a text table
///
/// Cells that fail to convert are shown as `#ERR` so one bad value does not
/// hide the rest of the table.
pub fn render_text(columns: &ColumnGroup, data: &Dataset, sort: &SortState) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Disabled);

    let headers: Vec<Cell> = columns
        .iter()
        .map(|column| {
            let label = header_label(&column.name, sort.status_of(&column.key).indicator());
            Cell::new(label).add_attribute(Attribute::Bold)
        })
        .collect();
    table.set_header(headers);

    for row in data {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|column| {
                let text = column
                    .display(column.cell(row))
                    .unwrap_or_else(|_| "#ERR".to_string());
                Cell::new(text).set_alignment(cell_alignment(column.alignment.horizontal))
            })
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}
