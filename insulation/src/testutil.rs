//! Synthetic screens for tests.

use ie::screen::buffbar::{BarKind, SLOT_SIZE};
use ie::{Color, OwnedImage, OwnedMask};

use crate::detector::{StackReader, Template};

pub const BACKGROUND: Color = Color::new(18, 22, 31);
pub const ICON: u32 = SLOT_SIZE - 2;

pub fn screen() -> OwnedImage {
	OwnedImage::new(640, 400, BACKGROUND)
}

/// A debuff frame with a flat icon.
pub fn draw_slot(screen: &mut OwnedImage, x: u32, y: u32, fill: Color) {
	let frame = BarKind::Debuffs.frame();
	for i in 0..SLOT_SIZE {
		for j in 0..SLOT_SIZE {
			let edge = i == 0 || j == 0 || i == SLOT_SIZE - 1 || j == SLOT_SIZE - 1;
			screen.put_pixel(x + i, y + j, if edge { frame } else { fill });
		}
	}
}

pub fn electrified_icon() -> OwnedImage {
	let mut icon = OwnedImage::new(ICON, ICON, Color::BLACK);
	for y in 0..ICON {
		for x in 0..ICON {
			icon.put_pixel(x, y, Color::new((x * 10) as u8, (y * 10) as u8, 77));
		}
	}
	icon
}

pub fn electrified() -> Template {
	Template::new(electrified_icon(), OwnedMask::full((ICON * ICON) as usize))
}

/// A debuff slot showing the electrified icon with `stacks` encoded in the
/// bottom-right counter pixel (see [`PixelStacks`]).
pub fn draw_electrified(screen: &mut OwnedImage, x: u32, y: u32, stacks: u8) {
	draw_slot(screen, x, y, Color::BLACK);
	screen.blit(x + 1, y + 1, electrified_icon().as_image());
	screen.put_pixel(x + ICON, y + ICON, Color::new(stacks, 0, 0));
}

/// Reads the red channel of the counter's bottom-right pixel as the stack count.
pub struct PixelStacks;

impl StackReader for PixelStacks {
	fn read_stacks(&self, counter: ie::Image) -> u32 {
		counter.get(counter.width() - 1, counter.height() - 1).r as u32
	}
}
