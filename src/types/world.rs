//! Parsed world documents.
//!
//! A world holds palettes, rooms, and three buckets of renderable objects
//! (tiles, sprites, items). The buckets share one object shape and differ
//! only in which map they populate.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::palette::{SPRITE_SLOT, TILE_SLOT};
use super::{AnimatedGraphic, Palette};

/// Object bucket within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    #[serde(rename = "tiles")]
    Tile,
    #[serde(rename = "sprites")]
    Sprite,
    #[serde(rename = "items")]
    Item,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Tile, Bucket::Sprite, Bucket::Item];

    /// Block marker introducing an object of this bucket.
    pub fn marker(self) -> &'static str {
        match self {
            Bucket::Tile => "TIL",
            Bucket::Sprite => "SPR",
            Bucket::Item => "ITM",
        }
    }

    /// Palette slot used for the foreground when no `COL` line is present.
    pub fn default_color_slot(self) -> usize {
        match self {
            Bucket::Tile => TILE_SLOT,
            Bucket::Sprite | Bucket::Item => SPRITE_SLOT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Tile => "tiles",
            Bucket::Sprite => "sprites",
            Bucket::Item => "items",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "tiles" | "tile" => Ok(Bucket::Tile),
            "sprites" | "sprite" => Ok(Bucket::Sprite),
            "items" | "item" => Ok(Bucket::Item),
            other => Err(format!("unknown bucket '{}' (expected tiles, sprites or items)", other)),
        }
    }
}

/// A tile, sprite or item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableObject {
    pub id: String,
    pub name: String,
    pub bucket: Bucket,
    pub graphic: AnimatedGraphic,
    /// Palette slot holding this object's foreground colour
    pub palette_color_index: usize,
}

/// A room; only its palette reference matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub palette_id: Option<String>,
}

/// One parsed source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    pub palettes: BTreeMap<String, Palette>,
    pub tiles: BTreeMap<String, RenderableObject>,
    pub sprites: BTreeMap<String, RenderableObject>,
    pub items: BTreeMap<String, RenderableObject>,
    pub rooms: BTreeMap<String, Room>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, bucket: Bucket) -> &BTreeMap<String, RenderableObject> {
        match bucket {
            Bucket::Tile => &self.tiles,
            Bucket::Sprite => &self.sprites,
            Bucket::Item => &self.items,
        }
    }

    pub(crate) fn bucket_mut(&mut self, bucket: Bucket) -> &mut BTreeMap<String, RenderableObject> {
        match bucket {
            Bucket::Tile => &mut self.tiles,
            Bucket::Sprite => &mut self.sprites,
            Bucket::Item => &mut self.items,
        }
    }

    /// Objects from the given buckets, bucket by bucket in id order.
    pub fn objects<'a>(
        &'a self,
        buckets: &'a [Bucket],
    ) -> impl Iterator<Item = &'a RenderableObject> + 'a {
        Bucket::ALL
            .into_iter()
            .filter(move |b| buckets.contains(b))
            .flat_map(move |b| self.bucket(b).values())
    }

    /// Total number of objects across all buckets.
    pub fn object_count(&self) -> usize {
        self.tiles.len() + self.sprites.len() + self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frame;

    fn object(id: &str, bucket: Bucket) -> RenderableObject {
        RenderableObject {
            id: id.to_string(),
            name: String::new(),
            bucket,
            graphic: AnimatedGraphic::single(Frame::blank()),
            palette_color_index: bucket.default_color_slot(),
        }
    }

    #[test]
    fn test_bucket_parse() {
        assert_eq!("tiles".parse::<Bucket>(), Ok(Bucket::Tile));
        assert_eq!("sprite".parse::<Bucket>(), Ok(Bucket::Sprite));
        assert_eq!(" items ".parse::<Bucket>(), Ok(Bucket::Item));
        assert!("rooms".parse::<Bucket>().is_err());
    }

    #[test]
    fn test_default_color_slots() {
        assert_eq!(Bucket::Tile.default_color_slot(), 1);
        assert_eq!(Bucket::Sprite.default_color_slot(), 2);
        assert_eq!(Bucket::Item.default_color_slot(), 2);
    }

    #[test]
    fn test_objects_respects_filter_and_order() {
        let mut world = World::new();
        world.tiles.insert("b".into(), object("b", Bucket::Tile));
        world.tiles.insert("a".into(), object("a", Bucket::Tile));
        world.sprites.insert("A".into(), object("A", Bucket::Sprite));
        world.items.insert("0".into(), object("0", Bucket::Item));

        let ids: Vec<&str> = world
            .objects(&[Bucket::Item, Bucket::Tile])
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "0"]);
        assert_eq!(world.object_count(), 4);
    }
}
