use log::warn;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, LineError, Result};
use crate::types::{ProcessingStats, RawBox, YoloBox};
use crate::utils::read_image_dimensions;

/// Parse one raw DeepPCB annotation line.
///
/// Fields are comma-separated when the line contains a comma, otherwise
/// whitespace-separated. Blank lines yield `Ok(None)`; anything past the
/// fifth field is ignored.
pub fn parse_raw_line(line: &str) -> std::result::Result<Option<RawBox>, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    };
    if fields.len() < 5 {
        return Err(LineError::TooFewFields(fields.len()));
    }

    let mut values = [0i64; 5];
    for (index, (slot, field)) in values.iter_mut().zip(&fields).enumerate() {
        *slot = field.parse().map_err(|_| LineError::InvalidInteger {
            index,
            value: field.to_string(),
        })?;
    }
    let [x1, y1, x2, y2, class_id] = values;

    Ok(Some(RawBox {
        x1,
        y1,
        x2,
        y2,
        class_id,
    }))
}

/// Map a raw 1-based DeepPCB class id onto YOLO's 0-based ids.
///
/// A raw `0` is left as `0`, so raw `0` and raw `1` collide. This mirrors the
/// observed behavior of the dataset tooling and is most likely an off-by-one
/// in the source data; it is kept until the intended meaning of `0` is known.
pub fn remap_class_id(class_id: i64) -> i64 {
    if class_id > 0 {
        class_id - 1
    } else {
        class_id
    }
}

/// Normalize a pixel box against the image size.
pub fn normalize(raw: &RawBox, image_width: u32, image_height: u32) -> YoloBox {
    let w = image_width as f64;
    let h = image_height as f64;
    let (x1, y1, x2, y2) = (raw.x1 as f64, raw.y1 as f64, raw.x2 as f64, raw.y2 as f64);

    YoloBox {
        class_id: remap_class_id(raw.class_id),
        x_center: (x1 + x2) / 2.0 / w,
        y_center: (y1 + y2) / 2.0 / h,
        width: (x2 - x1) / w,
        height: (y2 - y1) / h,
    }
}

/// Convert the text of a raw annotation file into YOLO label lines.
///
/// Malformed lines are logged and skipped; they never stop the remaining
/// lines from converting.
pub fn convert_lines(
    content: &str,
    image_width: u32,
    image_height: u32,
    stats: &mut ProcessingStats,
) -> String {
    let mut yolo_data = String::with_capacity(content.len() * 2);

    for line in content.lines() {
        match parse_raw_line(line) {
            Ok(Some(raw)) => {
                let yolo = normalize(&raw, image_width, image_height);
                yolo_data.push_str(&yolo.to_string());
                yolo_data.push('\n');
                stats.lines_converted += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping annotation line {:?}: {}", line.trim(), e);
                stats.lines_skipped += 1;
            }
        }
    }

    yolo_data
}

/// Convert one raw annotation file into a YOLO label file.
///
/// The image is only probed for its dimensions. The output file is truncated
/// and rewritten. Returns the number of boxes written.
pub fn convert_annotation_file(
    annotation_path: &Path,
    image_path: &Path,
    output_path: &Path,
    stats: &mut ProcessingStats,
) -> Result<usize> {
    let (width, height) = read_image_dimensions(image_path)?;
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage(image_path.to_path_buf()));
    }
    let content =
        fs::read_to_string(annotation_path).map_err(|e| Error::io(annotation_path, e))?;

    let before = stats.lines_converted;
    let yolo_data = convert_lines(&content, width, height, stats);

    let file = File::create(output_path).map_err(|e| Error::io(output_path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(yolo_data.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| Error::io(output_path, e))?;

    Ok(stats.lines_converted - before)
}
