use std::fs;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use denticore::api_interface::{DentalClass, PredictionResponse};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::generator::detections::build_detections;
use crate::workflow::config::ServiceConfig;

const CAVITY_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const NORMAL_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Stand-in for the model server's prediction pass: decodes the upload,
/// times a synthetic detection sweep, annotates a copy, and assembles
/// the wire response.
#[derive(Clone)]
pub struct PredictRunner {
    config: ServiceConfig,
}

impl PredictRunner {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn execute(
        &self,
        file_name: &str,
        bytes: &[u8],
        confidence_override: Option<f32>,
    ) -> anyhow::Result<PredictionResponse> {
        let started = Instant::now();
        let decoded = image::load_from_memory(bytes).context("decoding uploaded image")?;
        let mut annotated: RgbImage = decoded.to_rgb8();

        let threshold = confidence_override.unwrap_or(self.config.confidence_threshold);
        let detections = build_detections(
            annotated.width(),
            annotated.height(),
            threshold,
            &self.config.to_scenario(),
        );

        for detection in &detections {
            let color = match detection.dental_class() {
                Some(DentalClass::Cavity) => CAVITY_COLOR,
                _ => NORMAL_COLOR,
            };
            draw_box(&mut annotated, detection.bbox, color);
        }

        let inference_time_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
        let saved_image_path = self.save_annotated(file_name, &annotated)?;

        Ok(PredictionResponse {
            num_detections: detections.len(),
            detections,
            inference_time_ms,
            confidence_threshold: Some(threshold),
            saved_image_path: Some(saved_image_path),
            error: None,
        })
    }

    fn save_annotated(&self, file_name: &str, annotated: &RgbImage) -> anyhow::Result<String> {
        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "creating annotated-image directory {}",
                self.config.output_dir.display()
            )
        })?;

        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("upload");
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let name = format!("annotated_{}_{}.jpg", stem, millis);

        let path = self.config.output_dir.join(&name);
        annotated
            .save(&path)
            .with_context(|| format!("saving annotated image {}", path.display()))?;
        Ok(name)
    }
}

fn draw_box(image: &mut RgbImage, bbox: [i32; 4], color: Rgb<u8>) {
    let [x1, y1, x2, y2] = bbox;
    let width = (x2 - x1).max(1) as u32;
    let height = (y2 - y1).max(1) as u32;
    draw_hollow_rect_mut(image, Rect::at(x1, y1).of_size(width, height), color);
    if width > 2 && height > 2 {
        draw_hollow_rect_mut(
            image,
            Rect::at(x1 + 1, y1 + 1).of_size(width - 2, height - 2),
            color,
        );
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template::{encode_png, sample_image};
    use std::path::PathBuf;

    fn test_config(output_dir: PathBuf) -> ServiceConfig {
        ServiceConfig::from_args(0.25, 4, 7, output_dir)
    }

    #[test]
    fn runner_executes_a_prediction_pass() {
        let dir = tempfile::tempdir().unwrap();
        let runner = PredictRunner::new(test_config(dir.path().to_path_buf()));
        let bytes = encode_png(&sample_image(160, 120)).unwrap();

        let response = runner.execute("scan.png", &bytes, None).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.num_detections, response.detections.len());
        assert_eq!(response.confidence_threshold, Some(0.25));
        assert!(response.inference_time_ms >= 0.0);

        let saved = response.saved_image_path.unwrap();
        assert!(saved.starts_with("annotated_scan_"));
        assert!(dir.path().join(&saved).exists());
    }

    #[test]
    fn confidence_override_reaches_the_response() {
        let dir = tempfile::tempdir().unwrap();
        let runner = PredictRunner::new(test_config(dir.path().to_path_buf()));
        let bytes = encode_png(&sample_image(96, 64)).unwrap();

        let response = runner.execute("scan.png", &bytes, Some(0.6)).unwrap();
        assert_eq!(response.confidence_threshold, Some(0.6));
        for detection in &response.detections {
            assert!(detection.confidence >= 0.6);
        }
    }

    #[test]
    fn undecodable_uploads_fail_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let runner = PredictRunner::new(test_config(dir.path().to_path_buf()));
        assert!(runner.execute("scan.png", b"not an image", None).is_err());
    }
}
