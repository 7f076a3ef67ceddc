//! In-memory Capstone archives for tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::archive::CapArchive;
use super::records::encode_records;

#[derive(Default)]
pub(crate) struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entry(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.entries.push((name.to_string(), bytes));
        self
    }

    pub(crate) fn manifest(self, xml: &str) -> Self {
        self.entry("main.xml", xml.as_bytes().to_vec())
    }

    /// A subfile holding `values` as 12-byte records.
    pub(crate) fn series(self, name: &str, values: &[f64]) -> Self {
        self.entry(name, encode_records(values))
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in self.entries {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(&bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn build(self) -> CapArchive<Cursor<Vec<u8>>> {
        CapArchive::from_reader(Cursor::new(self.into_bytes())).unwrap()
    }
}

/// One `<DataSource>` element with a single data set.
pub(crate) fn data_source(
    name: &str,
    channel: Option<&str>,
    group: i64,
    independent: &str,
    dependent: &str,
    size: usize,
) -> String {
    let channel_attr = channel
        .map(|c| format!(r#" ChannelIDName="{c}""#))
        .unwrap_or_default();
    format!(
        r#"<DataSource MeasurementName="{name}"{channel_attr}>
  <DataSet DataGroupNumber="{group}">
    <DataSegmentElement>
      <DependentStorageElement FileName="{dependent}" DataCacheDataSize="{size}"/>
      <IndependentStorageElement {independent}/>
    </DataSegmentElement>
  </DataSet>
</DataSource>"#
    )
}

/// Wrap data sources into a complete manifest document.
pub(crate) fn manifest(sources: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<CapstoneFile>\n<DataRepository>\n{}\n</DataRepository>\n</CapstoneFile>",
        sources.join("\n")
    )
}
