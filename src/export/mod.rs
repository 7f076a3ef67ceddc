/// Export layer: turn grouped data sets into text formats.
///
/// ```text
///   GroupedDataSets
///        │
///        ├──► table  – one delimited grid, two columns per data set
///        │
///        └──► grace  – one line-table file per group (`set{n}.txt`)
/// ```

pub mod grace;
pub mod table;

/// Shortest round-trip rendering that always keeps a decimal part
/// (`1.0`, `0.25`, `1e-7`).
pub(crate) fn format_float(value: f64) -> String {
    format!("{value:?}")
}
