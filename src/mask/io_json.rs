//! JSON mask documents.
//!
//! Three document shapes are accepted:
//! - a single RLE object: `{"size": [rows, cols], "counts": ...}`
//! - a JSON array of RLE objects
//! - a COCO dataset, whose `annotations[].segmentation` entries are read
//!   when they are RLE objects (polygon segmentations are skipped)
//!
//! `counts` may be a compressed RLE string or a plain array of integers.
//! An object with `"kind": "labeled"` carries `(run length, label)` pairs
//! and is split into one binary mask per non-zero label.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::model::Dims;
use super::rle::{decode_compressed_counts, encode_compressed_rle, expand_labeled_runs};
use crate::error::MasktraceError;

/// Largest labeled mask that will be expanded to split it by label.
const MAX_LABELED_PIXELS: u64 = 1 << 28;

/// How the `counts` of an RLE object are to be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskKind {
    /// Alternating background/foreground runs.
    #[default]
    Binary,
    /// `(run length, label)` pairs.
    Labeled,
}

/// One binary mask read from a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaskEntry {
    /// Position of the source object in the document.
    pub index: usize,
    pub label: Option<String>,
    /// Kind of the source object; entries split from a labeled object
    /// are binary masks but keep `Labeled` here.
    pub kind: MaskKind,
    pub dims: Dims,
    pub counts: Vec<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaskDocument {
    Single(RleObject),
    List(Vec<RleObject>),
    Coco(CocoDocument),
}

#[derive(Deserialize)]
struct RleObject {
    size: [u32; 2],
    counts: RawCounts,
    #[serde(default)]
    label: Option<RawLabel>,
    #[serde(default)]
    kind: MaskKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCounts {
    Compressed(String),
    Runs(Vec<u32>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Name(String),
    Id(u64),
}

impl RawLabel {
    fn into_string(self) -> String {
        match self {
            RawLabel::Name(name) => name,
            RawLabel::Id(id) => id.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CocoDocument {
    annotations: Vec<CocoAnnotation>,
}

#[derive(Deserialize)]
struct CocoAnnotation {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    category_id: Option<u64>,
    segmentation: serde_json::Value,
}

#[derive(Serialize)]
struct RleOutput<'a> {
    size: [u32; 2],
    counts: &'a str,
}

/// Reads every mask from a JSON document on disk.
///
/// # Errors
/// Fails if the file cannot be read, is not one of the accepted document
/// shapes, or holds a malformed compressed RLE string.
pub fn read_mask_json(path: &Path) -> Result<Vec<MaskEntry>, MasktraceError> {
    let file = File::open(path).map_err(MasktraceError::Io)?;
    let reader = BufReader::new(file);

    let document: MaskDocument =
        serde_json::from_reader(reader).map_err(|source| MasktraceError::MaskJsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    collect_entries(document)
}

/// Reads every mask from a JSON string.
pub fn from_mask_str(json: &str) -> Result<Vec<MaskEntry>, MasktraceError> {
    from_mask_slice(json.as_bytes())
}

/// Reads every mask from raw JSON bytes.
pub fn from_mask_slice(bytes: &[u8]) -> Result<Vec<MaskEntry>, MasktraceError> {
    let document: MaskDocument =
        serde_json::from_slice(bytes).map_err(|source| MasktraceError::MaskJsonParse {
            path: PathBuf::from("<memory>"),
            source,
        })?;
    collect_entries(document)
}

/// Renders counts as a COCO RLE object with a compressed `counts` string.
pub fn to_rle_json_string(dims: Dims, counts: &[u32]) -> Result<String, MasktraceError> {
    let compressed = encode_compressed_rle(counts);
    let output = RleOutput {
        size: [dims.rows, dims.cols],
        counts: &compressed,
    };
    serde_json::to_string(&output).map_err(MasktraceError::MaskJsonWrite)
}

fn collect_entries(document: MaskDocument) -> Result<Vec<MaskEntry>, MasktraceError> {
    let mut entries = Vec::new();

    match document {
        MaskDocument::Single(object) => push_object(&mut entries, 0, object)?,
        MaskDocument::List(objects) => {
            for (index, object) in objects.into_iter().enumerate() {
                push_object(&mut entries, index, object)?;
            }
        }
        MaskDocument::Coco(coco) => {
            for (index, annotation) in coco.annotations.into_iter().enumerate() {
                if !annotation.segmentation.is_object() {
                    tracing::warn!(
                        annotation = ?annotation.id,
                        "skipping polygon segmentation"
                    );
                    continue;
                }
                let mut object: RleObject = serde_json::from_value(annotation.segmentation)
                    .map_err(|source| MasktraceError::MaskJsonParse {
                        path: PathBuf::from(format!("annotations[{index}].segmentation")),
                        source,
                    })?;
                if object.label.is_none() {
                    object.label = annotation.category_id.map(RawLabel::Id);
                }
                push_object(&mut entries, index, object)?;
            }
        }
    }

    Ok(entries)
}

fn push_object(
    entries: &mut Vec<MaskEntry>,
    index: usize,
    object: RleObject,
) -> Result<(), MasktraceError> {
    let dims = Dims::new(object.size[0], object.size[1]);
    let counts = match object.counts {
        RawCounts::Compressed(text) => decode_compressed_counts(&text)?,
        RawCounts::Runs(runs) => runs,
    };
    let label = object.label.map(RawLabel::into_string);

    match object.kind {
        MaskKind::Binary => entries.push(MaskEntry {
            index,
            label,
            kind: MaskKind::Binary,
            dims,
            counts,
        }),
        MaskKind::Labeled => {
            let pixels = dims.rows as u64 * dims.cols as u64;
            if pixels > MAX_LABELED_PIXELS {
                return Err(MasktraceError::InvalidMaskSize {
                    rows: dims.rows as u64,
                    cols: dims.cols as u64,
                    message: format!("labeled masks are limited to {MAX_LABELED_PIXELS} pixels"),
                });
            }

            let labels = expand_labeled_runs(dims, &counts);
            // Label 0 is background.
            for value in labels.distinct_labels().into_iter().filter(|&l| l != 0) {
                let name = match &label {
                    Some(prefix) => format!("{prefix}:{value}"),
                    None => value.to_string(),
                };
                entries.push(MaskEntry {
                    index,
                    label: Some(name),
                    kind: MaskKind::Labeled,
                    dims,
                    counts: labels.binary_mask(value).to_counts(),
                });
            }
        }
    }

    Ok(())
}
