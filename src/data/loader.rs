use std::io::{Read, Seek};
use std::path::Path;

use log::{debug, info, warn};

use super::archive::CapArchive;
use super::manifest::{parse_manifest, ManifestIndex};
use super::model::{CapFile, ChannelDescriptor, DataSet, GroupedDataSets, XSource};
use super::records::{decode_records, expected_len};
use crate::config::ReaderConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every data set of a Capstone archive on disk.
///
/// Only a missing/mis-named file, an unreadable container, or a broken
/// manifest fail the call; per-channel problems yield empty series.
pub fn load_file(path: &Path, config: &ReaderConfig) -> Result<CapFile> {
    let mut archive = CapArchive::open(path, config)?;
    let data_sets = load_archive(&mut archive, config)?;
    info!(
        "loaded {} data set(s) in {} group(s) from {}",
        data_sets.values().map(Vec::len).sum::<usize>(),
        data_sets.len(),
        path.display()
    );
    Ok(CapFile {
        path: path.to_path_buf(),
        data_sets,
    })
}

/// Index the manifest, then resolve every descriptor against the archive.
pub fn load_archive<R: Read + Seek>(
    archive: &mut CapArchive<R>,
    config: &ReaderConfig,
) -> Result<GroupedDataSets> {
    debug!("archive entries: {:?}", archive.entry_names());
    let manifest = archive.read_manifest(&config.manifest_entry)?;
    let index = parse_manifest(&manifest)?;
    Ok(assemble_all(&index, archive))
}

/// Materialize every channel of an index, keeping group and discovery order.
pub fn assemble_all<R: Read + Seek>(
    index: &ManifestIndex,
    archive: &mut CapArchive<R>,
) -> GroupedDataSets {
    let mut groups = GroupedDataSets::new();
    for (&group, descriptors) in index {
        let sets = groups.entry(group).or_default();
        for descriptor in descriptors {
            sets.push(assemble(descriptor, archive));
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Data set assembly
// ---------------------------------------------------------------------------

/// Resolve one descriptor into a data set.
///
/// The dependent series is decoded first; a fixed-step axis only gets as many
/// terms as were actually decoded, so it is empty when the read failed.
pub fn assemble<R: Read + Seek>(
    descriptor: &ChannelDescriptor,
    archive: &mut CapArchive<R>,
) -> DataSet {
    let name = descriptor.display_name();
    let count = descriptor.declared_count;

    let y_values = read_series(archive, &descriptor.y_source, count, &name);
    let x_values = match &descriptor.x_source {
        XSource::FixedStep(step) => fixed_step_axis(*step, y_values.len()),
        XSource::Subfile(path) => read_series(archive, path, count, &name),
    };

    if x_values.len() != y_values.len() {
        warn!(
            "group {}: '{name}' is inconsistent ({} x values, {} y values)",
            descriptor.group_number,
            x_values.len(),
            y_values.len()
        );
    }

    DataSet {
        name,
        group_number: descriptor.group_number,
        x_values,
        y_values,
        declared_count: count,
        x_source: descriptor.x_source.clone(),
        y_source: descriptor.y_source.clone(),
    }
}

/// `count` samples spaced by `step`, starting at zero, rounded to 12 decimals.
pub fn fixed_step_axis(step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| round12(step * i as f64)).collect()
}

fn round12(value: f64) -> f64 {
    const SCALE: f64 = 1e12;
    let scaled = value * SCALE;
    // Beyond this magnitude there are no fractional digits left to round.
    if !scaled.is_finite() || scaled.abs() >= 2f64.powi(52) {
        return value;
    }
    scaled.round() / SCALE
}

/// Read and decode a subfile; any failure is logged and yields no values.
fn read_series<R: Read + Seek>(
    archive: &mut CapArchive<R>,
    path: &str,
    count: usize,
    channel: &str,
) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    // One byte past the expected length is enough to detect oversized entries.
    let limit = expected_len(count).saturating_add(1);
    match archive
        .read_subfile(path, limit)
        .and_then(|raw| decode_records(&raw, count))
    {
        Ok(values) => values,
        Err(e) => {
            warn!("channel '{channel}', subfile '{path}': {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{data_source, manifest, ArchiveBuilder};
    use crate::error::CapError;

    fn descriptor(x_source: XSource, y_source: &str, count: usize) -> ChannelDescriptor {
        ChannelDescriptor {
            group_number: 1,
            measurement_name: "Temp".into(),
            channel_id: None,
            x_source,
            y_source: y_source.into(),
            declared_count: count,
        }
    }

    #[test]
    fn subfile_channel_round_trip() {
        let mut archive = ArchiveBuilder::new()
            .series("Data/x.bin", &[0.0, 1.0, 2.0])
            .series("Data/y.bin", &[1.0, 2.0, 3.0])
            .build();
        let ds = assemble(
            &descriptor(XSource::Subfile(r"Data\x.bin".into()), r"Data\y.bin", 3),
            &mut archive,
        );
        assert_eq!(ds.name, "Temp");
        assert_eq!(ds.x_values, vec![0.0, 1.0, 2.0]);
        assert_eq!(ds.y_values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn fixed_step_channel() {
        let mut archive = ArchiveBuilder::new()
            .series("y.bin", &[5.0, 6.0, 7.0, 8.0])
            .build();
        let ds = assemble(&descriptor(XSource::FixedStep(0.5), "y.bin", 4), &mut archive);
        assert_eq!(ds.x_values, vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(ds.y_values, vec![5.0, 6.0, 7.0, 8.0]);
        assert!(ds.is_consistent());
    }

    #[test]
    fn fixed_step_axis_is_rounded() {
        assert_eq!(fixed_step_axis(0.1, 4), vec![0.0, 0.1, 0.2, 0.3]);
        assert_eq!(fixed_step_axis(0.5, 0), Vec::<f64>::new());
        assert_eq!(fixed_step_axis(2.0, 3), vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn missing_dependent_keeps_independent_axis() {
        let mut archive = ArchiveBuilder::new().series("x.bin", &[0.0, 1.0]).build();
        let ds = assemble(
            &descriptor(XSource::Subfile("x.bin".into()), "gone.bin", 2),
            &mut archive,
        );
        assert_eq!(ds.x_values, vec![0.0, 1.0]);
        assert!(ds.y_values.is_empty());
        assert!(!ds.is_consistent());
    }

    #[test]
    fn truncated_subfile_degrades_to_empty() {
        let mut raw = crate::data::records::encode_records(&[1.0, 2.0, 3.0]);
        raw.truncate(30);
        let mut archive = ArchiveBuilder::new()
            .entry("y.bin", raw)
            .series("x.bin", &[0.0, 1.0, 2.0])
            .build();
        let ds = assemble(
            &descriptor(XSource::Subfile("x.bin".into()), "y.bin", 3),
            &mut archive,
        );
        assert_eq!(ds.x_values.len(), 3);
        assert!(ds.y_values.is_empty());
    }

    #[test]
    fn oversized_subfile_degrades_to_empty() {
        let mut archive = ArchiveBuilder::new()
            .series("y.bin", &[1.0, 2.0, 3.0, 4.0])
            .build();
        let ds = assemble(&descriptor(XSource::FixedStep(1.0), "y.bin", 2), &mut archive);
        assert!(ds.is_empty());
    }

    #[test]
    fn failed_fixed_step_channel_has_no_axis() {
        let mut archive = ArchiveBuilder::new().build();
        let ds = assemble(&descriptor(XSource::FixedStep(0.5), "gone.bin", 3), &mut archive);
        assert!(ds.is_empty());
        assert!(ds.is_consistent());
    }

    #[test]
    fn huge_declared_size_fails_only_that_channel() {
        let xml = manifest(&[
            data_source("Huge", None, 1, r#"IntervalCacheInterval="1""#, "h.bin", 1 << 61),
            data_source("Sibling", None, 1, r#"IntervalCacheInterval="1""#, "s.bin", 2),
        ]);
        let mut archive = ArchiveBuilder::new()
            .manifest(&xml)
            .series("h.bin", &[1.0, 2.0])
            .series("s.bin", &[3.0, 4.0])
            .build();

        let groups = load_archive(&mut archive, &ReaderConfig::default()).unwrap();
        let group = &groups[&1];
        assert_eq!(group.len(), 2);
        assert!(group[0].is_empty());
        assert_eq!(group[0].declared_count, 1 << 61);
        assert_eq!(group[1].points(), vec![[0.0, 3.0], [1.0, 4.0]]);
    }

    #[test]
    fn zero_declared_size_reads_nothing() {
        // Neither subfile exists; a zero count must not even look them up.
        let mut archive = ArchiveBuilder::new().build();
        let ds = assemble(&descriptor(XSource::Subfile("x".into()), "y", 0), &mut archive);
        assert!(ds.is_empty());
        assert!(ds.is_consistent());
    }

    #[test]
    fn whole_archive_pipeline() {
        let xml = manifest(&[
            data_source("Temp", None, 1, r#"FileName="Data\x.bin""#, r"Data\y.bin", 3),
            data_source("Voltage", Some("A"), 2, r#"IntervalCacheInterval="0.5""#, "v.bin", 2),
            data_source("Broken", None, 2, r#"IntervalCacheInterval="0.5""#, "missing.bin", 2),
        ]);
        let mut archive = ArchiveBuilder::new()
            .manifest(&xml)
            .series("Data/x.bin", &[0.0, 1.0, 2.0])
            .series("Data/y.bin", &[1.0, 2.0, 3.0])
            .series("v.bin", &[9.0, 8.0])
            .build();

        let groups = load_archive(&mut archive, &ReaderConfig::default()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&1][0].y_values, vec![1.0, 2.0, 3.0]);

        let group2 = &groups[&2];
        assert_eq!(group2[0].name, "Voltage-A");
        assert_eq!(group2[0].points(), vec![[0.0, 9.0], [0.5, 8.0]]);
        assert_eq!(group2[1].name, "Broken");
        assert!(group2[1].is_empty());
    }

    #[test]
    fn custom_manifest_entry_name() {
        let xml = manifest(&[data_source("T", None, 1, r#"IntervalCacheInterval="1""#, "y", 1)]);
        let mut archive = ArchiveBuilder::new()
            .entry("index.xml", xml.into_bytes())
            .series("y", &[4.0])
            .build();

        let config = ReaderConfig {
            manifest_entry: "index.xml".into(),
            ..ReaderConfig::default()
        };
        let groups = load_archive(&mut archive, &config).unwrap();
        assert_eq!(groups[&1][0].points(), vec![[0.0, 4.0]]);

        assert!(matches!(
            load_archive(&mut archive, &ReaderConfig::default()),
            Err(CapError::ManifestMissing(_))
        ));
    }

    #[test]
    fn load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.cap");
        let xml = manifest(&[data_source("Temp", None, 1, r#"IntervalCacheInterval="1""#, "y", 2)]);
        std::fs::write(
            &path,
            ArchiveBuilder::new().manifest(&xml).series("y", &[1.5, 2.5]).into_bytes(),
        )
        .unwrap();

        let cap = load_file(&path, &ReaderConfig::default()).unwrap();
        assert_eq!(cap.len(), 1);
        assert_eq!(cap.group(1).unwrap()[0].points(), vec![[0.0, 1.5], [1.0, 2.5]]);
        assert!(cap.group(2).is_none());
        assert!(cap.to_string().starts_with("run.cap at "));
        assert!(cap.to_string().contains("\nGroup 1:\nDataSet(name=\"Temp\""));
    }
}
