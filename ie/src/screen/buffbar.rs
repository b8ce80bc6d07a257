//! Buff/debuff bar detection.
//!
//! The game draws active effects as a grid of square icons, each surrounded by
//! a one pixel frame whose color tells buffs and debuffs apart. The bar is
//! found once by scanning the whole capture for a frame, then re-read from the
//! cached position every poll.
//!
//! Reading is conservative: if the first slot is no longer framed at the cached
//! position we return `None` so the caller can search again.

use crate::{Color, Image};

/// Outer size of a slot, frame included.
pub const SLOT_SIZE: u32 = 27;
/// Distance between the top-left corners of neighbouring slots.
pub const GRID: u32 = 30;
/// Rows at the bottom of an icon that hold the counter text.
pub const COUNTER_HEIGHT: u32 = 11;

const MAX_COLUMNS: u32 = 12;
const MAX_ROWS: u32 = 4;

/// Frame colors are flat, so only compression noise is tolerated.
const FRAME_TOLERANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Buffs,
    Debuffs,
}

impl BarKind {
    pub const fn frame(self) -> Color {
        match self {
            BarKind::Buffs => Color::new(90, 150, 25),
            BarKind::Debuffs => Color::new(204, 0, 0),
        }
    }
}

/// Position of the bar's first (top-left) slot in capture coordinates.
///
/// Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct BarPosition {
    pub x: u32,
    pub y: u32,
}

impl From<[u32; 2]> for BarPosition {
    fn from([x, y]: [u32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<BarPosition> for [u32; 2] {
    fn from(pos: BarPosition) -> Self {
        [pos.x, pos.y]
    }
}

/// One framed icon on the bar.
#[derive(Clone, Copy)]
pub struct Slot<'a> {
    pub x: u32,
    pub y: u32,
    image: Image<'a>,
}

impl<'a> Slot<'a> {
    /// The icon artwork inside the frame.
    pub fn icon(&self) -> Image<'a> {
        self.image.sub_image(self.x + 1, self.y + 1, SLOT_SIZE - 2, SLOT_SIZE - 2)
    }

    /// The part of the icon the stack/time counter is printed on.
    pub fn counter(&self) -> Image<'a> {
        self.icon().trimmed_bottom(COUNTER_HEIGHT)
    }
}

fn is_frame_color(image: Image, x: u32, y: u32, frame: Color) -> bool {
    image.get(x, y).deviation(frame) < FRAME_TOLERANCE
}

/// Whether a complete slot frame has its top-left corner at `(x, y)`.
pub fn is_slot(image: Image, x: u32, y: u32, kind: BarKind) -> bool {
    if x + SLOT_SIZE > image.width() || y + SLOT_SIZE > image.height() {
        return false;
    }

    let frame = kind.frame();
    let last = SLOT_SIZE - 1;
    (0..SLOT_SIZE).all(|i| {
        is_frame_color(image, x + i, y, frame)
            && is_frame_color(image, x + i, y + last, frame)
            && is_frame_color(image, x, y + i, frame)
            && is_frame_color(image, x + last, y + i, frame)
    })
}

/// Scan the whole image for the first slot (row-major).
pub fn find(image: Image, kind: BarKind) -> Option<BarPosition> {
    if image.width() < SLOT_SIZE || image.height() < SLOT_SIZE {
        return None;
    }

    let frame = kind.frame();
    for y in 0..=image.height() - SLOT_SIZE {
        for x in 0..=image.width() - SLOT_SIZE {
            // Cheap single pixel check before walking the whole frame.
            if is_frame_color(image, x, y, frame) && is_slot(image, x, y, kind) {
                return Some(BarPosition { x, y });
            }
        }
    }
    None
}

/// Read every slot of the bar starting at `pos`.
///
/// Slots are returned row by row, left to right. A row ends at its first gap
/// and the bar ends at the first row without a leading slot. Returns `None`
/// if there is no slot at `pos` at all.
pub fn read<'a>(image: Image<'a>, pos: BarPosition, kind: BarKind) -> Option<Vec<Slot<'a>>> {
    if !is_slot(image, pos.x, pos.y, kind) {
        return None;
    }

    let mut slots = Vec::new();
    for row in 0..MAX_ROWS {
        let y = pos.y + row * GRID;
        let mut row_len = 0;
        for col in 0..MAX_COLUMNS {
            let x = pos.x + col * GRID;
            if !is_slot(image, x, y, kind) {
                break;
            }
            slots.push(Slot { x, y, image });
            row_len += 1;
        }
        if row_len == 0 {
            break;
        }
    }
    Some(slots)
}
