use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

const TEMPLATE: &str = "icons/electrified.data.png";
const OCR_DETECTION: &str = "ocr/detection.mnn";
const OCR_RECOGNITION: &str = "ocr/latin_recognition.mnn";
const OCR_CHARSET: &str = "ocr/latin_charset.txt";

/// Runtime asset locations.
#[derive(Debug, Clone)]
pub struct Assets {
	pub root: PathBuf,
}

impl Assets {
	pub fn sounds(&self) -> PathBuf {
		self.root.join("alarms")
	}

	/// Icon template of the electrified debuff.
	pub fn template(&self) -> PathBuf {
		self.root.join(TEMPLATE)
	}

	pub fn ocr_detection(&self) -> PathBuf {
		self.root.join(OCR_DETECTION)
	}

	pub fn ocr_recognition(&self) -> PathBuf {
		self.root.join(OCR_RECOGNITION)
	}

	pub fn ocr_charset(&self) -> PathBuf {
		self.root.join(OCR_CHARSET)
	}

	fn is_complete(root: &Path) -> bool {
		[TEMPLATE, OCR_DETECTION, OCR_RECOGNITION, OCR_CHARSET]
			.iter()
			.all(|rel| root.join(rel).is_file())
	}
}

/// Resolve the asset folder in a way that works both:
/// - when running from the repo (`cargo run`), and
/// - when running a packaged binary (assets next to the executable).
///
/// You can override discovery by setting `DSI_ASSETS_DIR`.
pub fn resolve_assets() -> Result<Assets> {
	let mut candidates: Vec<PathBuf> = Vec::new();
	if let Some(dir) = std::env::var_os("DSI_ASSETS_DIR") {
		candidates.push(PathBuf::from(dir));
	}
	if let Ok(exe) = std::env::current_exe()
		&& let Some(dir) = exe.parent()
	{
		candidates.push(dir.join("assets"));
	}
	if let Ok(cwd) = std::env::current_dir() {
		candidates.push(cwd.join("assets"));
	}
	// Compile-time path to the crate. Only useful for local development.
	#[cfg(debug_assertions)]
	candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"));

	resolve_from(candidates)
}

fn resolve_from(candidates: Vec<PathBuf>) -> Result<Assets> {
	let mut tried = Vec::new();
	for root in candidates {
		if Assets::is_complete(&root) {
			return Ok(Assets { root });
		}
		tried.push(root);
	}

	bail!(
		"asset files not found. Expected these files:\n  - {TEMPLATE}\n  - {OCR_DETECTION}\n  - {OCR_RECOGNITION}\n  - {OCR_CHARSET}\n  - alarms/<sound>.wav\n\nSearched in:\n{}\n\nFix: copy the 'assets/' folder next to the executable (or set DSI_ASSETS_DIR to it).",
		tried
			.into_iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n")
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn touch(root: &Path, rel: &str) {
		let path = root.join(rel);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, b"").unwrap();
	}

	#[test]
	fn picks_first_complete_candidate() {
		let empty = tempfile::tempdir().unwrap();
		let full = tempfile::tempdir().unwrap();
		for rel in [TEMPLATE, OCR_DETECTION, OCR_RECOGNITION, OCR_CHARSET] {
			touch(full.path(), rel);
		}

		let assets = resolve_from(vec![empty.path().to_path_buf(), full.path().to_path_buf()]).unwrap();
		assert_eq!(assets.root, full.path());
		assert_eq!(assets.sounds(), full.path().join("alarms"));
	}

	#[test]
	fn missing_assets_lists_searched_folders() {
		let empty = tempfile::tempdir().unwrap();
		let err = resolve_from(vec![empty.path().to_path_buf()]).unwrap_err();
		let msg = format!("{err:#}");
		assert!(msg.contains(TEMPLATE));
		assert!(msg.contains(&empty.path().display().to_string()));
	}
}
