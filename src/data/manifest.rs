//! Parser for the Capstone `main.xml` manifest.
//!
//! Layout of the parts the reader cares about:
//!
//! ```text
//! DataRepository
//! └── DataSource [MeasurementName, ChannelIDName?]
//!     └── DataSet [DataGroupNumber]
//!         └── DataSegmentElement
//!             ├── DependentStorageElement   [FileName, DataCacheDataSize]
//!             └── IndependentStorageElement [FileName | IntervalCacheInterval]
//! ```
//!
//! Element names are matched without namespace. Anything wrong with a single
//! data set only drops that channel; only an unparsable document or a missing
//! repository is fatal.

use std::collections::BTreeMap;

use log::{debug, warn};
use roxmltree::{Document, Node, ParsingOptions};

use super::model::{ChannelDescriptor, XSource};
use crate::error::{CapError, ChannelError, Result};

/// group number → channel descriptors in document order.
pub type ManifestIndex = BTreeMap<i64, Vec<ChannelDescriptor>>;

const DATA_REPOSITORY: &str = "DataRepository";
const DATA_SOURCE: &str = "DataSource";
const DATA_SET: &str = "DataSet";
const DATA_SEGMENT: &str = "DataSegmentElement";
const DEPENDENT: &str = "DependentStorageElement";
const INDEPENDENT: &str = "IndependentStorageElement";

/// Parse manifest text and build the channel index.
pub fn parse_manifest(text: &str) -> Result<ManifestIndex> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)
        .map_err(|e| CapError::ManifestMalformed(e.to_string()))?;
    build_index(&doc)
}

/// Walk a parsed manifest and collect one descriptor per valid data set.
pub fn build_index(doc: &Document) -> Result<ManifestIndex> {
    let root = doc.root_element();
    let repository = if root.has_tag_name(DATA_REPOSITORY) {
        root
    } else {
        root.descendants()
            .find(|n| n.has_tag_name(DATA_REPOSITORY))
            .ok_or_else(|| CapError::ManifestMalformed(format!("no <{DATA_REPOSITORY}> element")))?
    };

    let mut index = ManifestIndex::new();
    let mut skipped = 0usize;

    for source in repository.children().filter(|n| n.has_tag_name(DATA_SOURCE)) {
        for data_set in source.children().filter(|n| n.has_tag_name(DATA_SET)) {
            match parse_data_set(source, data_set) {
                Ok(descriptor) => {
                    debug!(
                        "group {}: channel '{}' ({} samples)",
                        descriptor.group_number,
                        descriptor.display_name(),
                        descriptor.declared_count
                    );
                    index
                        .entry(descriptor.group_number)
                        .or_default()
                        .push(descriptor);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(
                        "skipping data set of '{}' (line {}): {e}",
                        source.attribute("MeasurementName").unwrap_or("<unnamed>"),
                        doc.text_pos_at(data_set.range().start).row
                    );
                }
            }
        }
    }

    if skipped > 0 {
        warn!("{skipped} malformed data set(s) skipped while indexing manifest");
    }
    Ok(index)
}

fn parse_data_set(
    source: Node,
    data_set: Node,
) -> std::result::Result<ChannelDescriptor, ChannelError> {
    let measurement_name = attr_string(&source, "MeasurementName")?;
    let channel_id = source
        .attribute("ChannelIDName")
        .filter(|id| !id.is_empty())
        .map(String::from);

    let group_number: i64 = attr_parse(&data_set, "DataGroupNumber")?;

    let mut segments = data_set.children().filter(|n| n.has_tag_name(DATA_SEGMENT));
    let segment = segments
        .next()
        .ok_or_else(|| missing_element(DATA_SEGMENT))?;
    if segments.next().is_some() {
        warn!("'{measurement_name}': multiple <{DATA_SEGMENT}> elements, using the first");
    }

    let dependent = child(segment, DEPENDENT)?;
    let independent = child(segment, INDEPENDENT)?;

    let declared_count: usize = attr_parse(&dependent, "DataCacheDataSize")?;
    let y_source = attr_string(&dependent, "FileName")?;
    let x_source = independent_source(&independent)?;

    Ok(ChannelDescriptor {
        group_number,
        measurement_name,
        channel_id,
        x_source,
        y_source,
        declared_count,
    })
}

/// Explicit independent file wins; otherwise the constant interval is used.
fn independent_source(node: &Node) -> std::result::Result<XSource, ChannelError> {
    if let Some(path) = node.attribute("FileName").filter(|p| !p.is_empty()) {
        return Ok(XSource::Subfile(path.to_string()));
    }
    let raw = node.attribute("IntervalCacheInterval").ok_or_else(|| {
        ChannelError::Malformed(format!(
            "<{INDEPENDENT}> has neither FileName nor IntervalCacheInterval"
        ))
    })?;
    match raw.trim().parse::<f64>() {
        Ok(step) if step.is_finite() => Ok(XSource::FixedStep(step)),
        _ => Err(ChannelError::Malformed(format!(
            "IntervalCacheInterval '{raw}' is not a number"
        ))),
    }
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> std::result::Result<Node<'a, 'input>, ChannelError> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .ok_or_else(|| missing_element(name))
}

fn missing_element(name: &str) -> ChannelError {
    ChannelError::Malformed(format!("missing <{name}> element"))
}

fn attr_string(node: &Node, name: &str) -> std::result::Result<String, ChannelError> {
    node.attribute(name)
        .map(String::from)
        .ok_or_else(|| ChannelError::Malformed(format!("missing attribute '{name}'")))
}

fn attr_parse<T: std::str::FromStr>(
    node: &Node,
    name: &str,
) -> std::result::Result<T, ChannelError> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| ChannelError::Malformed(format!("missing attribute '{name}'")))?;
    raw.trim().parse().map_err(|_| {
        ChannelError::Malformed(format!("attribute {name}=\"{raw}\" is not a valid integer"))
    })
}
