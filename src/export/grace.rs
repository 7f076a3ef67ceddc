//! Line-table export in the Grace/xmgrace ASCII interchange format.
//!
//! One file per group. Each channel becomes an `xy` set with a legend entry,
//! followed by tab-separated `x y` rows and a closing `&`.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::format_float;
use crate::data::model::{DataSet, GroupedDataSets};
use crate::error::Result;

const HEADER: &str = "# dump from cap file\n@WITH G0\n@G0 ON\n";

/// Name of the file holding one group.
pub fn group_file_name(group_number: i64) -> String {
    format!("set{group_number}.txt")
}

/// Render one group. Channels keep manifest discovery order.
pub fn render_group(group_number: i64, data_sets: &[DataSet]) -> String {
    let mut out = String::from(HEADER);
    let mut legend_index = 0usize;

    for ds in data_sets {
        if ds.declared_count == 0 {
            debug!("group {group_number}: '{}' has no recorded samples", ds.name);
            continue;
        }
        if decode_failed(ds) {
            warn!(
                "group {group_number}: failed to read '{}' from {} and {} ({} samples declared)",
                ds.name, ds.x_source, ds.y_source, ds.declared_count
            );
            continue;
        }

        out.push_str(&format!(
            "# {group_number}, field \"{name}\", from {x} and {y}.\n@TYPE xy\n@    legend string {legend_index} \"{name}\"\n",
            name = ds.name,
            x = ds.x_source,
            y = ds.y_source,
        ));
        legend_index += 1;

        let rows = ds.x_values.len().max(ds.y_values.len());
        for i in 0..rows {
            let x = ds.x_values.get(i).copied().unwrap_or(0.0);
            let y = ds.y_values.get(i).copied().unwrap_or(0.0);
            out.push_str(&format!("{}\t{}\n", format_float(x), format_float(y)));
        }
        out.push_str("&\n");
    }

    out
}

/// No dependent values were decoded; whatever the x axis holds, there is
/// nothing to pair it with.
fn decode_failed(ds: &DataSet) -> bool {
    ds.y_values.is_empty()
}

/// Write `set{n}.txt` for every group into `output_dir`, creating it if needed.
///
/// Groups are written in ascending order; the written paths are returned.
pub fn write_groups(groups: &GroupedDataSets, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(groups.len());
    for (&group_number, data_sets) in groups {
        let path = output_dir.join(group_file_name(group_number));
        std::fs::write(&path, render_group(group_number, data_sets))?;
        written.push(path);
    }
    info!("wrote {} line-table file(s) to {}", written.len(), output_dir.display());
    Ok(written)
}
