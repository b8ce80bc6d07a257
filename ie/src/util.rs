use crate::{Image, Theme};

static DIGIT_REGEX: std::sync::LazyLock<regex::Regex> =
	std::sync::LazyLock::new(|| regex::Regex::new(r"(?<sign>-)?(?<digits>\d+)").unwrap());

/// Parse the first number in `text`. Anything unreadable or negative is 0.
pub fn parse_counter(text: &str) -> u32 {
	let Some(caps) = DIGIT_REGEX.captures(text) else {
		return 0;
	};
	if caps.name("sign").is_some() {
		return 0;
	}
	caps.name("digits")
		.and_then(|digits| digits.as_str().parse().ok())
		.unwrap_or(0)
}

pub fn read_counter(image: Image, theme: Theme, ocr: &crate::ocr::Ocr) -> u32 {
	parse_counter(&image.get_text(theme, ocr))
}
