use std::sync::LazyLock;

use i18n_embed::{
	fluent::{fluent_language_loader, FluentLanguageLoader},
	DesktopLanguageRequester,
};
use rust_embed::RustEmbed;
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "i18n"]
struct Localizations;

static LOADER: LazyLock<FluentLanguageLoader> = LazyLock::new(|| {
	let loader: FluentLanguageLoader = fluent_language_loader!();
	// Labels are shown as-is; no bidi isolation marks around arguments.
	loader.set_use_isolating(false);
	loader
});

/// Access the global language loader (used by `tr!()`).
pub fn loader() -> &'static FluentLanguageLoader {
	&LOADER
}

/// Initialize localization. If `forced_locale` is provided, it is preferred over the system locale.
pub fn init(forced_locale: Option<&str>) {
	let requested = if let Some(tag) = forced_locale {
		tag.parse::<LanguageIdentifier>()
			.ok()
			.into_iter()
			.collect::<Vec<_>>()
	} else {
		DesktopLanguageRequester::requested_languages()
	};

	// We don't crash if locale loading fails; we fall back to the built-in fallback locale.
	if let Err(err) = i18n_embed::select(loader(), &Localizations, &requested) {
		tracing::warn!(error = %err, "failed to select locale");
	}
}

#[macro_export]
macro_rules! tr {
	($id:literal) => {
		i18n_embed_fl::fl!($crate::i18n::loader(), $id)
	};
	($id:literal, $($args:tt)+) => {
		i18n_embed_fl::fl!($crate::i18n::loader(), $id, $($args)+)
	};
}
