//! Image primitives and utilities.
//!
//! The project uses a lightweight owned RGB image type (`OwnedImage`) for screen
//! captures and icon templates.
//!
//! Most operations borrow a view (`Image<'a>`) instead of copying pixels, so a
//! single capture can be sliced into debuff slots, icon regions and counter
//! regions without allocating.

use anyhow::{Context, Result};

/// Packed bitset (row-major), one bit per pixel.
pub struct OwnedMask(pub Vec<u8>);
#[derive(Clone, Copy)]
pub struct Mask<'a>(pub &'a [u8]);

impl OwnedMask {
    /// A mask with every one of `len` pixels enabled.
    pub fn full(len: usize) -> Self {
        Self(vec![0xff; len / 8 + 1])
    }

    pub fn as_mask(&self) -> Mask<'_> {
        Mask(&self.0)
    }
}

impl Mask<'_> {
    #[inline(always)]
    pub fn get(&self, i: usize) -> bool {
        self.0
            .get(i / 8)
            .is_some_and(|byte| ((byte >> (i % 8)) & 1) == 1)
    }
}

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// A `width` x `height` image filled with a single color.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            data: vec![fill; (width * height) as usize],
        }
    }

    /// Build an `OwnedImage` from RGBA bytes (alpha is discarded).
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = bytes.len() / width.max(1) / 4;
        let data = bytes
            .chunks_exact(4)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    /// Load an RGBA PNG and return an `(OwnedImage, OwnedMask)` pair.
    ///
    /// The mask is a packed bitset (row-major) where each bit indicates whether
    /// the original alpha value was >= `alpha_threshold`.
    pub fn from_png_mask(bytes: &[u8], alpha_threshold: u8) -> Result<(Self, OwnedMask)> {
        let img = image::load_from_memory(bytes)
            .context("decode png (with alpha)")?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let mut data = Vec::with_capacity((width * height) as usize);
        let mut mask = vec![0u8; (width * height) as usize / 8 + 1];

        for (i, p) in img.pixels().enumerate() {
            let [r, g, b, a] = p.0;
            data.push(Color::new(r, g, b));
            if a >= alpha_threshold {
                mask[i / 8] |= 1 << (i % 8);
            }
        }

        Ok((
            Self {
                width,
                height,
                data,
            },
            OwnedMask(mask),
        ))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set a single pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.data[(x + y * self.width) as usize] = color;
        }
    }

    /// Copy `src` into this image with its top-left corner at `(x, y)`, clipped to bounds.
    pub fn blit(&mut self, x: u32, y: u32, src: Image) {
        for sy in 0..src.height() {
            for sx in 0..src.width() {
                self.put_pixel(x + sx, y + sy, src.get(sx, sy));
            }
        }
    }

    /// Resize this image to the given height (preserving aspect ratio).
    ///
    /// Uses `fast_image_resize` (SIMD-optimized) and keeps output in `Vec<Color>`.
    pub fn resize_h(&mut self, height: u32) {
        if self.height == height {
            return;
        }

        let height = height.max(1);
        let width = ((self.width as u64 * height as u64 / self.height.max(1) as u64) as u32).max(1);

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let Ok(src) = fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels) else {
            return;
        };

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        if resizer.resize(&src, &mut dst, &Some(options)).is_err() {
            return;
        }

        let bytes: Vec<u8> = dst.into_vec();
        let mut data = Vec::with_capacity((width * height) as usize);
        for px in bytes.chunks_exact(3) {
            data.push(Color::new(px[0], px[1], px[2]));
        }

        self.width = width;
        self.height = height;
        self.data = data;
    }

    #[inline]
    pub fn resized_h(mut self, height: u32) -> Self {
        self.resize_h(height);
        self
    }

    pub fn map_pixels(&mut self, f: impl Fn(&mut Color)) {
        for v in &mut self.data {
            f(v);
        }
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        use image::{GrayImage, Luma};
        let mut out = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.data[(x + y * self.width) as usize];
                out.put_pixel(x, y, Luma([c.luma()]));
            }
        }
        out
    }

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let mut data = Vec::with_capacity((w * h) as usize);
        for p in gray.pixels() {
            let v = p.0[0];
            data.push(Color::new(v, v, v));
        }
        Self {
            width: w,
            height: h,
            data,
        }
    }
}

// ----------

/// Result of comparing a region against a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchCount {
    /// Template pixels that were compared (enabled in the mask and inside both images).
    pub tested: u32,
    /// Compared pixels that were exactly equal.
    pub passed: u32,
}

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    /// Pixel at `(x, y)` relative to this view.
    #[inline(always)]
    pub fn get(&self, x: u32, y: u32) -> Color {
        *self.pixel(self.x1 + x, self.y1 + y)
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                data.push(*self.pixel(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; (self.width() * self.height() * 3) as usize];
        let mut i = 0;
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes[i] = clr.r;
                bytes[i + 1] = clr.g;
                bytes[i + 2] = clr.b;
                i += 3;
            }
        }
        bytes
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let bytes = self.get_bytes();
        let img = image::RgbImage::from_raw(self.width(), self.height(), bytes)
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Gets a subimage with the same width and provided height aligned to the bottom with the top side trimmed.
    pub fn trimmed_bottom(&self, height: u32) -> Self {
        let size = height.min(self.height());

        Self {
            x1: self.x1,
            y1: self.y2 - size,
            x2: self.x2,
            y2: self.y2,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// Create an arbitrary subimage (relative coordinates).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// Count pixels of `template` that are exactly equal to this view, both
    /// anchored at their top-left corner.
    ///
    /// Only pixels enabled in `mask` (indexed over the template's own width)
    /// take part. No tolerance is applied: anti-aliased or recolored pixels
    /// never pass.
    pub fn count_match(&self, template: Image, mask: Mask) -> MatchCount {
        let width = self.width().min(template.width());
        let height = self.height().min(template.height());

        let mut count = MatchCount::default();
        for y in 0..height {
            for x in 0..width {
                if !mask.get((x + y * template.width()) as usize) {
                    continue;
                }

                count.tested += 1;
                if self.get(x, y) == template.get(x, y) {
                    count.passed += 1;
                }
            }
        }
        count
    }

    /// Extract text using OCR with preprocessing (grayscale, thresholding, upscale).
    ///
    /// The function tries multiple preprocessing strategies (adaptive threshold,
    /// Otsu threshold, theme-guided) and picks the most plausible result.
    pub fn get_text(&self, theme: crate::Theme, ocr: &crate::ocr::Ocr) -> String {
        use imageproc::contrast::{adaptive_threshold, equalize_histogram, otsu_level, threshold, ThresholdType};

        // Counter crops are tiny; OCR needs larger glyphs.
        let mut base = self.to_owned_image();
        const MIN_H: u32 = 48;
        if base.height < MIN_H {
            base = base.resized_h(MIN_H);
        }

        let adaptive = {
            let gray = equalize_histogram(&base.to_gray_image());
            let bin = adaptive_threshold(&gray, 5, 10);
            OwnedImage::from_gray_as_rgb(&ensure_dark_text_on_light(bin))
        };

        let otsu = {
            let gray = equalize_histogram(&base.to_gray_image());
            let level = otsu_level(&gray);
            let bin = threshold(&gray, level, ThresholdType::Binary);
            OwnedImage::from_gray_as_rgb(&ensure_dark_text_on_light(bin))
        };

        // Counter digits are drawn in `theme.primary` over a `theme.secondary` outline.
        let theme_bin = {
            let mut img = base.clone();
            img.map_pixels(|v| {
                let d1 = v.deviation(theme.primary);
                let d2 = v.deviation(theme.secondary);
                *v = if d1 < d2 { Color::BLACK } else { Color::WHITE };
            });
            img
        };

        let mut best = String::new();
        let mut best_score = i64::MIN;

        for cand in [adaptive, otsu, theme_bin] {
            let text = ocr.get_text(cand.as_image());
            let score = score_ocr_text(&text);
            if score > best_score {
                best_score = score;
                best = text;
            }
        }

        if std::env::var("DSI_WRITE_IMAGE").as_deref() == Ok("1") {
            let name = best.chars().filter(|c| c.is_ascii_alphanumeric()).take(40).collect::<String>();
            let _ = self.save_png(format!("./debug_ocr_{name}.png"));
        }

        best
    }
}

fn ensure_dark_text_on_light(mut bin: image::GrayImage) -> image::GrayImage {
    // If the image is mostly black, invert it so background becomes light.
    let mut white = 0u64;
    let mut black = 0u64;
    for p in bin.pixels() {
        if p.0[0] > 0 {
            white += 1;
        } else {
            black += 1;
        }
    }
    if black > white {
        for p in bin.pixels_mut() {
            p.0[0] = 255u8.saturating_sub(p.0[0]);
        }
    }
    bin
}

fn score_ocr_text(text: &str) -> i64 {
    // Counters are digits only; anything else is noise.
    let mut score = 0i64;
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            score += 3;
        } else if !ch.is_whitespace() {
            score -= 1;
        }
    }
    score
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Deviation metric used for frame and text color checks.
    ///
    /// NOTE: This is intentionally *not* Euclidean distance; it is tuned for
    /// thresholding in the presence of compression and post-processing.
    pub fn deviation(&self, other: Color) -> f32 {
        (((self.r as f32 - other.r as f32).abs() / 255.0 / 3.0
            + (self.g as f32 - other.g as f32).abs() / 255.0 / 3.0
            + (self.b as f32 - other.b as f32).abs() / 255.0 / 3.0)
            / 0.05)
            .powi(3)
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}
