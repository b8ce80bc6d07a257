use crate::Color;

/// Colors of the numbers the game prints on buff/debuff icons.
///
/// The OCR preprocessing uses these to separate the counter glyphs from the
/// icon artwork underneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Theme {
    /// Glyph fill.
    pub primary: Color,
    /// Glyph outline.
    pub secondary: Color,
}

impl Theme {
    /// White digits with a black drop shadow.
    pub const COUNTER: Self = Self {
        primary: Color::WHITE,
        secondary: Color::BLACK,
    };
}
