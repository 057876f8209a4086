//! Dataset assembly from labeled corpora.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{read_page_file, read_token_file, scan_json_files};
use crate::error::Result;
use crate::features::geometry::{GeometryFeatures, geometry_features};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::labels::LabelMapper;

/// One training row: token text, both label spaces, and the feature vector.
/// Built fresh each run and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRow {
    /// Corpus file the token came from.
    pub file: String,
    pub token_id: String,
    pub text: String,
    pub label_original: i32,
    pub label_mapped: i32,
    pub features: FeatureVector,
}

/// An ordered collection of dataset rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature matrix in row order.
    pub fn feature_matrix(&self) -> Vec<Vec<f32>> {
        self.rows
            .iter()
            .map(|row| row.features.as_slice().to_vec())
            .collect()
    }

    /// Mapped label vector in row order.
    pub fn mapped_labels(&self) -> Vec<i32> {
        self.rows.iter().map(|row| row.label_mapped).collect()
    }
}

/// Builds datasets by scanning a corpus directory and running every valid
/// token through feature extraction and label mapping.
///
/// An unparseable file is logged and skipped, an invalid token is logged
/// and dropped, and an empty corpus yields an empty dataset. Only
/// I/O-level directory errors are fatal.
pub struct DatasetBuilder<'a> {
    extractor: &'a FeatureExtractor,
    mapper: &'a LabelMapper,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(extractor: &'a FeatureExtractor, mapper: &'a LabelMapper) -> Self {
        DatasetBuilder { extractor, mapper }
    }

    /// Build a dataset from every token label file in a directory.
    pub fn build(&self, corpus_dir: &Path) -> Result<Dataset> {
        let mut dataset = Dataset::default();

        for path in scan_json_files(corpus_dir)? {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            let tokens = match read_token_file(&path) {
                Ok(tokens) => tokens,
                Err(e) => {
                    log::error!("skipping corpus file {}: {e}", path.display());
                    continue;
                }
            };

            let before = dataset.len();
            for (token_id, payload) in tokens {
                let Some(record) = payload else {
                    log::debug!("{file_name}/{token_id}: empty payload, skipped");
                    continue;
                };

                if !self.extractor.accepts(&record.text) {
                    log::debug!("{file_name}/{token_id}: invalid text, skipped");
                    continue;
                }

                let label_original = record.semantic_clasification.unwrap_or(0);
                let features = self.extractor.extract(&record.text);

                dataset.rows.push(DatasetRow {
                    file: file_name.clone(),
                    token_id,
                    text: record.text,
                    label_original,
                    label_mapped: self.mapper.map(label_original),
                    features,
                });
            }

            log::info!(
                "processed {file_name}: {} tokens",
                dataset.len() - before
            );
        }

        if dataset.is_empty() {
            log::error!(
                "corpus {} produced no usable tokens",
                corpus_dir.display()
            );
        }

        Ok(dataset)
    }
}

/// One row of the geometry (header-detection) variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderRow {
    pub file: String,
    pub is_header: i32,
    pub features: GeometryFeatures,
}

/// Dataset for the geometry-only header pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderDataset {
    rows: Vec<HeaderRow>,
}

impl HeaderDataset {
    pub fn rows(&self) -> &[HeaderRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn feature_matrix(&self) -> Vec<Vec<f32>> {
        self.rows
            .iter()
            .map(|row| row.features.as_slice().to_vec())
            .collect()
    }

    pub fn labels(&self) -> Vec<i32> {
        self.rows.iter().map(|row| row.is_header).collect()
    }

    /// Build the header dataset from every geometry page file in a
    /// directory. Words without an `is_header` label are dropped.
    pub fn build(corpus_dir: &Path) -> Result<HeaderDataset> {
        let mut dataset = HeaderDataset::default();

        for path in scan_json_files(corpus_dir)? {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            let page = match read_page_file(&path) {
                Ok(page) => page,
                Err(e) => {
                    log::error!("skipping page file {}: {e}", path.display());
                    continue;
                }
            };

            for word in &page.words {
                let Some(is_header) = word.is_header else {
                    log::debug!("{file_name}: unlabeled word, skipped");
                    continue;
                };

                dataset.rows.push(HeaderRow {
                    file: file_name.clone(),
                    is_header,
                    features: geometry_features(
                        word,
                        page.page_info.page_w,
                        page.page_info.page_h,
                    ),
                });
            }
        }

        if dataset.is_empty() {
            log::error!(
                "geometry corpus {} produced no labeled words",
                corpus_dir.display()
            );
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::features::encoding::EncoderConfig;

    fn test_extractor() -> FeatureExtractor {
        let char_num: HashSet<char> = "0123456789.,$".chars().collect();
        let density = HashMap::from([('a', 0.3), ('1', 0.9)]);
        let inv_density = HashMap::from([('a', 0.7), ('1', 0.1)]);
        FeatureExtractor::new(EncoderConfig::new(char_num, density, inv_density))
    }

    fn test_mapper() -> LabelMapper {
        LabelMapper::build(&[
            HashMap::from([(0, 0)]),
            HashMap::from([(1, 1)]),
            HashMap::from([(2, 0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_skips_invalid_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("page1.json"),
            r#"{
                "t0": {"text": "Invoice", "semantic_clasification": 1},
                "t1": {"text": "   "},
                "t2": null,
                "t3": {"text": "1234", "semantic_clasification": 2}
            }"#,
        )
        .unwrap();

        let extractor = test_extractor();
        let mapper = test_mapper();
        let dataset = DatasetBuilder::new(&extractor, &mapper)
            .build(dir.path())
            .unwrap();

        // t1 (whitespace) and t2 (null) drop out.
        assert_eq!(dataset.len(), 2);
        let texts: Vec<&str> = dataset.rows().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Invoice", "1234"]);

        // Raw 2 remaps to 0 through the conversion map.
        assert_eq!(dataset.rows()[1].label_original, 2);
        assert_eq!(dataset.rows()[1].label_mapped, 0);
    }

    #[test]
    fn test_missing_label_defaults_to_zero() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.json"), r#"{"t0": {"text": "abc"}}"#).unwrap();

        let extractor = test_extractor();
        let mapper = test_mapper();
        let dataset = DatasetBuilder::new(&extractor, &mapper)
            .build(dir.path())
            .unwrap();

        assert_eq!(dataset.rows()[0].label_original, 0);
        assert_eq!(dataset.rows()[0].label_mapped, 0);
    }

    #[test]
    fn test_unparseable_file_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "not json at all").unwrap();
        fs::write(
            dir.path().join("good.json"),
            r#"{"t0": {"text": "ok", "semantic_clasification": 1}}"#,
        )
        .unwrap();

        let extractor = test_extractor();
        let mapper = test_mapper();
        let dataset = DatasetBuilder::new(&extractor, &mapper)
            .build(dir.path())
            .unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows()[0].file, "good.json");
    }

    #[test]
    fn test_empty_corpus_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let extractor = test_extractor();
        let mapper = test_mapper();
        let dataset = DatasetBuilder::new(&extractor, &mapper)
            .build(dir.path())
            .unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_matrix_shape() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("f.json"),
            r#"{"t0": {"text": "a1", "semantic_clasification": 1}}"#,
        )
        .unwrap();

        let extractor = test_extractor();
        let mapper = test_mapper();
        let dataset = DatasetBuilder::new(&extractor, &mapper)
            .build(dir.path())
            .unwrap();

        let matrix = dataset.feature_matrix();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].len(), crate::features::FEATURE_DIM);
        assert_eq!(dataset.mapped_labels(), vec![1]);
    }

    #[test]
    fn test_header_dataset_build() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("page.json"),
            r#"{
                "page_info": {"page_w": 800.0, "page_h": 600.0},
                "words": [
                    {"xmin": 0.0, "ymin": 0.0, "xmax": 80.0, "ymax": 30.0,
                     "length": 5.0, "num_digits": 0.0, "num_alpha": 5.0,
                     "is_upper": 1.0, "is_header": 1},
                    {"xmin": 0.0, "ymin": 100.0, "xmax": 40.0, "ymax": 120.0,
                     "length": 3.0, "num_digits": 3.0, "num_alpha": 0.0,
                     "is_upper": 0.0}
                ]
            }"#,
        )
        .unwrap();

        let dataset = HeaderDataset::build(dir.path()).unwrap();
        // The unlabeled word drops out.
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.labels(), vec![1]);
        assert_eq!(
            dataset.feature_matrix()[0].len(),
            crate::features::geometry::GEOMETRY_FEATURE_DIM
        );
    }
}
