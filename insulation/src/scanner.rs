use ie::screen::buffbar::{self, BarKind, BarPosition};

/// One debuff on the bar, borrowed from the current capture.
#[derive(Clone, Copy)]
pub struct DebuffEntry<'a> {
	pub icon: ie::Image<'a>,
	pub counter: ie::Image<'a>,
}

/// Read the debuffs at `location`, in bar order.
///
/// `None` means there is no bar at `location` any more.
pub fn scan<'a>(screen: ie::Image<'a>, location: BarPosition) -> Option<Vec<DebuffEntry<'a>>> {
	let slots = buffbar::read(screen, location, BarKind::Debuffs)?;
	Some(
		slots
			.into_iter()
			.map(|slot| DebuffEntry {
				icon: slot.icon(),
				counter: slot.counter(),
			})
			.collect(),
	)
}
