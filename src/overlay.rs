//! Rendering of detections produced by an external inference engine.

use ab_glyph::{Font, FontRef, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::OverlayArgs;
use crate::error::{Error, Result};

const BOX_THICKNESS: u32 = 2;
const LABEL_SCALE: f32 = 14.0;
// Pixels between the top edge of a box and the bottom of its label
const LABEL_GAP: i32 = 2;

static LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const CLASS_COLORS: [Rgba<u8>; 6] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([0, 0, 255, 255]),
    Rgba([255, 255, 0, 255]),
    Rgba([255, 0, 255, 255]),
    Rgba([0, 255, 255, 255]),
];

/// One detected defect, in absolute pixel coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

pub fn load_detections(path: &Path) -> Result<Vec<Detection>> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn filter_by_confidence(detections: Vec<Detection>, min_confidence: f32) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| d.confidence >= min_confidence)
        .collect()
}

pub fn class_name(class_id: usize, class_names: &[String]) -> String {
    class_names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

/// One-line human-readable description, numbered from 1.
pub fn describe_detection(index: usize, detection: &Detection, class_names: &[String]) -> String {
    format!(
        "Defect {}: {} (Confidence: {:.2}%)",
        index,
        class_name(detection.class_id, class_names),
        detection.confidence * 100.0
    )
}

pub fn class_color(class_id: usize) -> Rgba<u8> {
    CLASS_COLORS[class_id % CLASS_COLORS.len()]
}

/// Clamp a pixel box to the image; `None` when nothing of it is drawable.
pub fn clamp_box(detection: &Detection, dims: (u32, u32)) -> Option<[u32; 4]> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return None;
    }
    let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min((max - 1) as f32) as u32 };
    let x0 = clamp(detection.x1, w);
    let y0 = clamp(detection.y1, h);
    let x1 = clamp(detection.x2, w);
    let y1 = clamp(detection.y2, h);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some([x0, y0, x1, y1])
}

/// The bundled font used for box labels.
pub fn label_font() -> Result<FontRef<'static>> {
    Ok(FontRef::try_from_slice(LABEL_FONT)?)
}

/// Text drawn above a box, e.g. `short: 0.87`.
pub fn box_label(detection: &Detection, class_names: &[String]) -> String {
    format!(
        "{}: {:.2}",
        class_name(detection.class_id, class_names),
        detection.confidence
    )
}

/// Draw a rectangle border with given thickness.
pub fn draw_rect(img: &mut RgbaImage, bbox_px: [u32; 4], color: Rgba<u8>, thickness: u32) {
    let [x0, y0, x1, y1] = bbox_px;
    for t in 0..thickness {
        let (w, h) = ((x1 - x0 + 1).saturating_sub(2 * t), (y1 - y0 + 1).saturating_sub(2 * t));
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((x0 + t) as i32, (y0 + t) as i32).of_size(w, h);
        draw_hollow_rect_mut(img, rect, color);
    }
}

/// Draw every detection with its class/confidence label, colored by class.
/// Returns how many boxes were drawn.
pub fn draw_detections(
    img: &mut RgbaImage,
    detections: &[Detection],
    class_names: &[String],
    font: &impl Font,
) -> usize {
    let dims = img.dimensions();
    let mut drawn = 0;
    for detection in detections {
        let Some(bbox) = clamp_box(detection, dims) else {
            continue;
        };
        let color = class_color(detection.class_id);
        draw_rect(img, bbox, color, BOX_THICKNESS);

        let label = box_label(detection, class_names);
        let (_, text_height) = text_size(LABEL_SCALE, font, &label);
        let y = (bbox[1] as i32 - text_height as i32 - LABEL_GAP).max(0);
        draw_text_mut(img, color, bbox[0] as i32, y, LABEL_SCALE, font, &label);
        drawn += 1;
    }
    drawn
}

/// Load an image and its detections, draw them, and save the result.
pub fn render_overlay(args: &OverlayArgs) -> Result<Vec<String>> {
    let detections = filter_by_confidence(load_detections(&args.detections)?, args.min_confidence);

    let mut img = image::open(&args.image)
        .map_err(|source| Error::Image {
            path: args.image.clone(),
            source,
        })?
        .into_rgba8();

    let descriptions: Vec<String> = detections
        .iter()
        .enumerate()
        .map(|(i, d)| describe_detection(i + 1, d, &args.class_names))
        .collect();

    if detections.is_empty() {
        info!("No defects detected in {}", args.image.display());
    } else {
        let font = label_font()?;
        let drawn = draw_detections(&mut img, &detections, &args.class_names, &font);
        info!("Detected {} defect(s), drew {} box(es)", detections.len(), drawn);
        for line in &descriptions {
            info!("{}", line);
        }
    }

    // JPEG output cannot carry alpha
    image::DynamicImage::ImageRgba8(img)
        .into_rgb8()
        .save(&args.output)
        .map_err(|source| Error::Image {
            path: args.output.clone(),
            source,
        })?;
    info!("Saved overlay to {}", args.output.display());

    Ok(descriptions)
}
