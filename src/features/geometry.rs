//! Geometry-only feature variant for page-layout header detection.
//!
//! A deliberately separate 8-float contract built from word bounding boxes
//! and page dimensions. It never mixes with the 14-float text contract in
//! [`super`]; the two pipelines train distinct models.

use serde::{Deserialize, Serialize};

/// Number of geometry features per word.
pub const GEOMETRY_FEATURE_DIM: usize = 8;

/// Geometry feature names in vector order.
pub const GEOMETRY_FEATURE_NAMES: [&str; GEOMETRY_FEATURE_DIM] = [
    "length",
    "num_digits",
    "num_alpha",
    "is_upper",
    "rel_y_center",
    "rel_x_center",
    "rel_width",
    "rel_height",
];

/// One OCR word with its bounding box and precomputed text counts, as read
/// from the geometry corpus files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub length: f64,
    pub num_digits: f64,
    pub num_alpha: f64,
    pub is_upper: f64,
    /// Header label, present in labeled corpora.
    #[serde(default)]
    pub is_header: Option<i32>,
}

/// A fixed-order vector of `GEOMETRY_FEATURE_DIM` floats for one word.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryFeatures(pub [f32; GEOMETRY_FEATURE_DIM]);

impl GeometryFeatures {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Compute the geometry features for a word on a page.
///
/// Box coordinates normalize against the page dimensions; zero page sizes
/// are guarded to 1 so degenerate page metadata cannot divide by zero.
pub fn geometry_features(word: &WordBox, page_w: f64, page_h: f64) -> GeometryFeatures {
    let page_w = if page_w == 0.0 { 1.0 } else { page_w };
    let page_h = if page_h == 0.0 { 1.0 } else { page_h };

    let x_center = (word.xmin + word.xmax) / 2.0;
    let y_center = (word.ymin + word.ymax) / 2.0;
    let width = word.xmax - word.xmin;
    let height = word.ymax - word.ymin;

    GeometryFeatures([
        word.length as f32,
        word.num_digits as f32,
        word.num_alpha as f32,
        word.is_upper as f32,
        (y_center / page_h) as f32,
        (x_center / page_w) as f32,
        (width / page_w) as f32,
        (height / page_h) as f32,
    ])
}
