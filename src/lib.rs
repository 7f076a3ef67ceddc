//! Reader for PASCO Capstone (`.cap`) archives.
//!
//! A `.cap` file is a zip container holding an XML manifest (`main.xml`) and
//! binary subfiles of 12-byte records. This crate indexes the manifest,
//! decodes every channel into an (x, y) series grouped by run, and exports the
//! result as a delimited table or as Grace line-table files.
//!
//! ```no_run
//! use std::path::Path;
//! use capdump::config::Config;
//! use capdump::data::loader::load_file;
//! use capdump::export::table::to_delimited;
//!
//! let config = Config::default();
//! let cap = load_file(Path::new("run.cap"), &config.reader)?;
//! println!("{}", to_delimited(&cap.data_sets, &config.table)?);
//! # Ok::<(), capdump::error::CapError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
