use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use capdump::config::Config;
use capdump::data::loader::load_file;
use capdump::export::{grace, table};

const USAGE: &str = "usage: capdump <file.cap> [output-dir] [config.json]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let input = PathBuf::from(args.next().context(USAGE)?);
    let output_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension(""));
    let config = match args.next() {
        Some(path) => Config::from_json_file(Path::new(&path))
            .with_context(|| format!("reading config {}", Path::new(&path).display()))?,
        None => Config::default(),
    };

    let cap = load_file(&input, &config.reader)
        .with_context(|| format!("loading {}", input.display()))?;
    log::debug!("{cap}");

    grace::write_groups(&cap.data_sets, &output_dir)
        .with_context(|| format!("writing line tables to {}", output_dir.display()))?;

    let csv_path = output_dir.join("data.csv");
    table::write_delimited(&cap.data_sets, &config.table, &csv_path)
        .with_context(|| format!("writing {}", csv_path.display()))?;

    println!(
        "Exported {} data set(s) in {} group(s) to {}",
        cap.len(),
        cap.data_sets.len(),
        output_dir.display()
    );
    Ok(())
}
