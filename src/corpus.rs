//! Labeled-corpus file formats and directory scanning.
//!
//! Two on-disk shapes exist. Token label files map a token id to a payload
//! (or `null` for tokens the annotator discarded):
//!
//! ```json
//! { "t0": { "text": "$1,200.50", "semantic_clasification": 2, "xmin": 10.0 }, "t1": null }
//! ```
//!
//! The `semantic_clasification` field name is the historical on-disk
//! contract and is kept as-is. Geometry page files carry page metadata and a
//! flat word list for the header-detection variant.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::geometry::WordBox;

/// One labeled token payload as stored in a corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default)]
    pub text: String,
    /// Raw semantic label; absent labels default to `0` downstream.
    #[serde(default)]
    pub semantic_clasification: Option<i32>,
    #[serde(default)]
    pub xmin: Option<f64>,
    #[serde(default)]
    pub ymin: Option<f64>,
    #[serde(default)]
    pub xmax: Option<f64>,
    #[serde(default)]
    pub ymax: Option<f64>,
    #[serde(default)]
    pub page_w: Option<f64>,
    #[serde(default)]
    pub page_h: Option<f64>,
}

/// A parsed token label file: token id to optional payload, in
/// deterministic (sorted) id order.
pub type TokenFile = BTreeMap<String, Option<TokenRecord>>;

/// Page metadata in a geometry corpus file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub page_w: f64,
    #[serde(default)]
    pub page_h: f64,
}

/// One geometry corpus file: page metadata plus its word boxes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFile {
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub words: Vec<WordBox>,
}

/// Collect the `.json` files in a corpus directory, sorted by path.
///
/// A missing directory or one without matching files is not fatal: it is
/// logged as an error and yields an empty list, so a run degrades to an
/// empty dataset instead of aborting.
pub fn scan_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        log::error!("corpus directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();

    if files.is_empty() {
        log::error!("no JSON corpus files found in {}", dir.display());
    }

    Ok(files)
}

/// Parse one token label file.
pub fn read_token_file(path: &Path) -> Result<TokenFile> {
    let content = fs::read_to_string(path)?;
    let tokens: TokenFile = serde_json::from_str(&content)?;
    Ok(tokens)
}

/// Parse one geometry page file.
pub fn read_page_file(path: &Path) -> Result<PageFile> {
    let content = fs::read_to_string(path)?;
    let page: PageFile = serde_json::from_str(&content)?;
    Ok(page)
}
