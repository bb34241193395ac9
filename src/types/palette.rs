//! Palette type: an ordered list of colours with role accessors.

use super::Colour;

/// Colour slot holding the background.
pub const BACKGROUND_SLOT: usize = 0;

/// Colour slot holding the tile foreground.
pub const TILE_SLOT: usize = 1;

/// Colour slot holding the sprite and item foreground.
pub const SPRITE_SLOT: usize = 2;

/// An ordered colour palette parsed from a `PAL` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Palette id (unique within a world)
    pub id: String,

    /// Optional display name, empty when absent
    pub name: String,

    /// Colours in declaration order
    pub colors: Vec<Colour>,
}

impl Palette {
    /// Create a new empty palette.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            colors: Vec::new(),
        }
    }

    /// The builtin palette used when a world has no usable palette.
    pub fn fallback() -> Self {
        Self {
            id: "default".to_string(),
            name: "default".to_string(),
            colors: vec![
                Colour::rgb(0x00, 0x52, 0xcc),
                Colour::rgb(0x80, 0x9f, 0xff),
                Colour::rgb(0xff, 0xff, 0xff),
            ],
        }
    }

    /// Colour at `slot`, if declared.
    pub fn get(&self, slot: usize) -> Option<Colour> {
        self.colors.get(slot).copied()
    }

    pub fn background(&self) -> Option<Colour> {
        self.get(BACKGROUND_SLOT)
    }

    pub fn tile_color(&self) -> Option<Colour> {
        self.get(TILE_SLOT)
    }

    pub fn sprite_color(&self) -> Option<Colour> {
        self.get(SPRITE_SLOT)
    }

    /// A palette is usable when tiles are distinguishable from the background.
    pub fn is_usable(&self) -> bool {
        self.background() != self.tile_color()
    }

    /// Serialise back to the document format.
    pub fn to_block(&self) -> String {
        let mut block = format!("PAL {}\n", self.id);
        if !self.name.is_empty() {
            block.push_str(&format!("NAME {}\n", self.name));
        }
        for colour in &self.colors {
            block.push_str(&format!("{},{},{}\n", colour.r, colour.g, colour.b));
        }
        block
    }
}
