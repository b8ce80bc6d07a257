//! OCR wrapper.
//!
//! The project relies on `ocr-rs` (Rust PaddleOCR bindings) to read the
//! numbers on debuff icons. Counter crops are tiny, so most preprocessing is
//! done in `Image::get_text(...)` before calling into this module.

use std::path::Path;

use anyhow::{Context, Result};

pub struct Ocr {
    engine: ocr_rs::OcrEngine,
}

impl Ocr {
    /// Initialize the OCR engine with the given model paths.
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charsset: impl AsRef<Path>,
    ) -> Result<Self> {
        // Counters are one or two glyphs; more threads only add overhead.
        let engine = ocr_rs::OcrEngine::new(
            detection,
            recognition,
            charsset,
            Some(ocr_rs::OcrEngineConfig {
                backend: ocr_rs::Backend::CPU,
                thread_count: 1,
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: false,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine (missing or invalid model files?)")?;

        Ok(Self { engine })
    }

    /// Recognize text from an RGB image view.
    pub fn get_text(&self, image: crate::Image) -> String {
        let image = ocr_rs::preprocess::rgb_to_image(&image.get_bytes(), image.width(), image.height());

        match self.engine.recognize(&image) {
            Ok(results) => results
                .into_iter()
                .map(|v| v.text)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }
}
