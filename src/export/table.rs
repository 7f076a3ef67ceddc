use std::path::Path;

use log::warn;

use super::format_float;
use crate::config::TableOptions;
use crate::data::model::{DataSet, GroupedDataSets};
use crate::error::{CapError, Result};

// ---------------------------------------------------------------------------
// Delimited table export
// ---------------------------------------------------------------------------

enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn render(&self, decimal_separator: char) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => {
                let text = format_float(*v);
                if decimal_separator == '.' {
                    text
                } else {
                    text.replace('.', &decimal_separator.to_string())
                }
            }
        }
    }
}

/// Render all groups as one delimited grid.
///
/// Layout, per group in ascending group order:
/// * each data set contributes an x column and a y column, data sets sorted
///   by name (ties keep discovery order);
/// * row 0 is blank except for `Group {n}` in the group's first column,
///   row 1 holds the data set name above its x column;
/// * inconsistent data sets are left out, and a group with nothing left is
///   a single `Group {n} (empty)` column.
///
/// All columns are padded with empty cells to the tallest one, and every row
/// ends with a trailing separator. Cells containing the cell separator, a
/// double quote or a line break are quoted CSV-style (`"a;b"`, `""` for `"`).
pub fn to_delimited(groups: &GroupedDataSets, options: &TableOptions) -> Result<String> {
    let delimiter = u8::try_from(options.cell_separator)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            CapError::Export(format!(
                "cell separator {:?} must be a single ASCII character",
                options.cell_separator
            ))
        })?;

    let columns = build_columns(groups);
    if columns.is_empty() {
        return Ok(String::new());
    }
    let height = columns.iter().map(Vec::len).max().unwrap_or(1);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::new());

    for row in 0..height {
        let mut record: Vec<String> = columns
            .iter()
            .map(|column| {
                column
                    .get(row)
                    .map(|cell| cell.render(options.decimal_separator))
                    .unwrap_or_default()
            })
            .collect();
        record.push(String::new());
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CapError::Export(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| CapError::Export(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Render the table and write it to `path`.
pub fn write_delimited(
    groups: &GroupedDataSets,
    options: &TableOptions,
    path: &Path,
) -> Result<()> {
    let text = to_delimited(groups, options)?;
    std::fs::write(path, text)?;
    Ok(())
}

fn build_columns(groups: &GroupedDataSets) -> Vec<Vec<Cell>> {
    let mut columns: Vec<Vec<Cell>> = Vec::new();

    for (&group, data_sets) in groups {
        let mut exportable: Vec<&DataSet> = data_sets
            .iter()
            .filter(|ds| {
                if !ds.is_consistent() {
                    warn!(
                        "group {group}: leaving '{}' out of the table ({} x values, {} y values)",
                        ds.name,
                        ds.x_values.len(),
                        ds.y_values.len()
                    );
                }
                ds.is_consistent()
            })
            .collect();
        exportable.sort_by(|a, b| a.name.cmp(&b.name));

        if exportable.is_empty() {
            columns.push(vec![Cell::Text(format!("Group {group} (empty)"))]);
            continue;
        }

        let first = columns.len();
        for ds in exportable {
            let mut x_column = vec![Cell::Empty, Cell::Text(ds.name.clone())];
            x_column.extend(ds.x_values.iter().copied().map(Cell::Number));
            let mut y_column = vec![Cell::Empty, Cell::Empty];
            y_column.extend(ds.y_values.iter().copied().map(Cell::Number));
            columns.push(x_column);
            columns.push(y_column);
        }
        columns[first][0] = Cell::Text(format!("Group {group}"));
    }

    columns
}
