mod image;
pub use image::*;
mod ocr;
mod theme;
pub use theme::*;
mod util;

pub mod screen;

pub struct Ie {
	theme: Theme,
	ocr: ocr::Ocr,
}

impl Ie {
	pub fn try_new(
		theme: Theme,
		ocr_detection: impl AsRef<std::path::Path>,
		ocr_recognition: impl AsRef<std::path::Path>,
		ocr_charsset: impl AsRef<std::path::Path>,
	) -> anyhow::Result<Self> {
		Ok(Self {
			theme,
			ocr: ocr::Ocr::try_new(ocr_detection, ocr_recognition, ocr_charsset)?,
		})
	}

	/// Read the number in a counter region (see [`screen::buffbar::Slot::counter`]).
	///
	/// Unreadable counters are 0.
	pub fn read_counter(&self, image: Image) -> u32 {
		util::read_counter(image, self.theme, &self.ocr)
	}
}
