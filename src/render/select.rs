//! Representative palette selection.

use std::collections::HashMap;

use crate::types::{Palette, World};

/// Palette id that worlds use for their default palette.
pub const DEFAULT_PALETTE_ID: &str = "0";

/// Choose the palette a world's objects are rendered with.
///
/// Preference order:
/// 1. the usable palette with the default id
/// 2. the usable palette referenced by the most rooms (first in id order on ties)
/// 3. the first usable palette in id order
/// 4. the builtin fallback
pub fn select_palette(world: &World) -> Palette {
    if let Some(palette) = world
        .palettes
        .get(DEFAULT_PALETTE_ID)
        .filter(|p| p.is_usable())
    {
        return palette.clone();
    }

    let mut usage: HashMap<&str, usize> = HashMap::new();
    for palette_id in world.rooms.values().filter_map(|r| r.palette_id.as_deref()) {
        *usage.entry(palette_id).or_insert(0) += 1;
    }

    let mut chosen: Option<(&Palette, usize)> = None;
    for palette in world.palettes.values().filter(|p| p.is_usable()) {
        let count = usage.get(palette.id.as_str()).copied().unwrap_or(0);
        if chosen.map_or(true, |(_, best)| count > best) {
            chosen = Some((palette, count));
        }
    }

    chosen
        .map(|(palette, _)| palette.clone())
        .unwrap_or_else(Palette::fallback)
}
