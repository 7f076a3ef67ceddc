use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// XSource – where the independent axis comes from
// ---------------------------------------------------------------------------

/// Source of a channel's independent (x) axis, resolved once from the manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum XSource {
    /// Constant time step; the axis is synthesized as `0, s, 2s, ...`.
    FixedStep(f64),
    /// Path of a binary subfile inside the archive.
    Subfile(String),
}

impl fmt::Display for XSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XSource::FixedStep(step) => write!(f, "{step:?}"),
            XSource::Subfile(path) => write!(f, "{path}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelDescriptor – one manifest data set entry
// ---------------------------------------------------------------------------

/// Everything needed to materialize one channel of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub group_number: i64,
    pub measurement_name: String,
    pub channel_id: Option<String>,
    pub x_source: XSource,
    /// Path of the dependent (y) subfile.
    pub y_source: String,
    /// Number of samples advertised by the manifest.
    pub declared_count: usize,
}

impl ChannelDescriptor {
    /// `MeasurementName-ChannelIDName`, or just the measurement name.
    pub fn display_name(&self) -> String {
        match self.channel_id.as_deref() {
            Some(id) if !id.is_empty() => format!("{}-{}", self.measurement_name, id),
            _ => self.measurement_name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// DataSet – a materialized (x, y) series
// ---------------------------------------------------------------------------

/// A decoded channel. Both sequences are empty when nothing could be read;
/// when only one of them is empty the set is inconsistent.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub name: String,
    pub group_number: i64,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
    pub declared_count: usize,
    pub x_source: XSource,
    pub y_source: String,
}

impl DataSet {
    /// No samples on either axis.
    pub fn is_empty(&self) -> bool {
        self.x_values.is_empty() && self.y_values.is_empty()
    }

    /// Both axes have the same length (possibly zero).
    pub fn is_consistent(&self) -> bool {
        self.x_values.len() == self.y_values.len()
    }

    /// Number of (x, y) pairs; zero for inconsistent sets.
    pub fn len(&self) -> usize {
        if self.is_consistent() {
            self.y_values.len()
        } else {
            0
        }
    }

    /// The series as `[x, y]` pairs, ready for a plotting backend.
    pub fn points(&self) -> Vec<[f64; 2]> {
        if !self.is_consistent() {
            return Vec::new();
        }
        self.x_values
            .iter()
            .zip(self.y_values.iter())
            .map(|(&x, &y)| [x, y])
            .collect()
    }
}

fn fmt_series(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    match values {
        [] => write!(f, "[]"),
        [a] => write!(f, "[{a:?}]"),
        [a, b] => write!(f, "[{a:?}, {b:?}]"),
        [first, .., last] => write!(f, "[{first:?}, ..., {last:?}]"),
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataSet(name=\"{}\", x_values=", self.name)?;
        fmt_series(f, &self.x_values)?;
        write!(f, ", y_values=")?;
        fmt_series(f, &self.y_values)?;
        write!(f, ", data_size={})", self.declared_count)
    }
}

// ---------------------------------------------------------------------------
// GroupedDataSets / CapFile – the complete loaded archive
// ---------------------------------------------------------------------------

/// group number → data sets in manifest discovery order.
pub type GroupedDataSets = BTreeMap<i64, Vec<DataSet>>;

/// A loaded Capstone archive.
#[derive(Debug, Clone)]
pub struct CapFile {
    /// Where the archive was read from.
    pub path: PathBuf,
    pub data_sets: GroupedDataSets,
}

impl CapFile {
    /// Total number of data sets over all groups.
    pub fn len(&self) -> usize {
        self.data_sets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Data sets of one group, if the group exists.
    pub fn group(&self, group_number: i64) -> Option<&[DataSet]> {
        self.data_sets.get(&group_number).map(Vec::as_slice)
    }
}

impl fmt::Display for CapFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        write!(f, "{name} at {}:", self.path.display())?;
        for (group_number, data_sets) in &self.data_sets {
            write!(f, "\nGroup {group_number}:")?;
            for data_set in data_sets {
                write!(f, "\n{data_set}")?;
            }
        }
        Ok(())
    }
}
