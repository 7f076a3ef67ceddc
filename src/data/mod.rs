/// Data layer: archive access, manifest indexing, decoding and assembly.
///
/// Architecture:
/// ```text
///   .cap (zip)
///        │
///        ▼
///   ┌──────────┐
///   │ archive   │  open container, lazy entry reads, path normalization
///   └──────────┘
///        │ main.xml
///        ▼
///   ┌──────────┐
///   │ manifest  │  XML → group number → [ChannelDescriptor]
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  descriptor + records → DataSet, grouped
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ GroupedDataSets │  handed to the exporters
///   └────────────────┘
/// ```

pub mod archive;
pub mod loader;
pub mod manifest;
pub mod model;
pub mod records;

#[cfg(test)]
pub(crate) mod fixtures;
