//! World document parser.
//!
//! Parses the line-oriented world format into a [`World`]. Blocks are
//! separated by blank lines and introduced by a marker:
//!
//! ```text
//! PAL 0
//! NAME dusk
//! 0,82,204
//! 128,159,255
//! 255,255,255
//!
//! TIL a
//! 11111111
//! 10000001
//! 10000001
//! 10000001
//! 10000001
//! 10000001
//! 10000001
//! 11111111
//! >
//! 00000000
//! ...
//! NAME wall
//! ```
//!
//! Any block whose first line is not a recognised marker is skipped up to and
//! including its blank separator, which is how the parser tolerates record
//! kinds it does not care about.

use crate::error::Result;
use crate::types::{
    AnimatedGraphic, Bucket, Colour, Frame, Palette, RenderableObject, Room, World, FRAME_SIDE,
};

use super::cursor::{split_once, LineCursor};

const PALETTE_MARKER: &str = "PAL";
const ROOM_MARKERS: [&str; 2] = ["ROOM", "SET"];
const NAME_MARKER: &str = "NAME";
const COLOR_MARKER: &str = "COL ";
const FRAME_SEPARATOR: &str = ">";

/// Parse a document's lines into a world.
pub fn parse_world(lines: Vec<String>) -> Result<World> {
    WorldParser::new(LineCursor::new(lines)).parse()
}

/// Parse a whole document, splitting it on `\n`.
pub fn parse_world_str(text: &str) -> Result<World> {
    WorldParser::new(LineCursor::from_text(text)).parse()
}

struct WorldParser {
    cursor: LineCursor,
    world: World,
}

impl WorldParser {
    fn new(cursor: LineCursor) -> Self {
        Self {
            cursor,
            world: World::new(),
        }
    }

    fn parse(mut self) -> Result<World> {
        while !self.cursor.is_done() {
            if self.cursor.check(PALETTE_MARKER) {
                self.take_palette()?;
            } else if let Some(bucket) = self.object_marker() {
                self.take_object(bucket)?;
            } else if ROOM_MARKERS.iter().any(|m| self.cursor.check(m)) {
                self.take_room()?;
            } else {
                while !self.cursor.check_blank() {
                    self.cursor.skip_line();
                }
                self.cursor.skip_line();
            }
        }

        Ok(self.world)
    }

    fn object_marker(&self) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| self.cursor.check(bucket.marker()))
    }

    fn take_palette(&mut self) -> Result<()> {
        let (_, rest) = self.cursor.take_split_once(' ', "palette header")?;
        let (id, inline_name) = split_inline_name(&rest);

        let mut palette = Palette::new(id);
        palette.name = inline_name.unwrap_or_default();
        if let Some(name) = self.try_take_name()? {
            palette.name = name;
        }

        while !self.cursor.check_blank() {
            palette.colors.push(self.take_color()?);
        }

        self.world.palettes.insert(palette.id.clone(), palette);
        Ok(())
    }

    fn take_color(&mut self) -> Result<Colour> {
        let line = self.cursor.take_line("colour")?;
        let channels: Vec<&str> = line.split(',').collect();

        if channels.len() < 3 {
            return Err(self
                .cursor
                .error_at_previous(&line, "expected an r,g,b colour triple"));
        }

        let mut rgb = [0u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(&channels) {
            *slot = channel.trim().parse::<u8>().map_err(|e| {
                self.cursor
                    .error_at_previous(&line, format!("invalid colour channel '{}': {}", channel.trim(), e))
            })?;
        }

        Ok(Colour::rgb(rgb[0], rgb[1], rgb[2]))
    }

    fn take_object(&mut self, bucket: Bucket) -> Result<()> {
        let (_, id) = self.cursor.take_split_once(' ', "object header")?;
        let graphic = self.take_graphic()?;

        let mut object = RenderableObject {
            id,
            name: String::new(),
            bucket,
            graphic,
            palette_color_index: bucket.default_color_slot(),
        };

        // Attribute lines up to the separator. Only NAME and COL matter; the
        // rest would be skipped by the unknown-block rule anyway.
        while !self.cursor.check_blank() {
            if let Some(name) = self.try_take_name()? {
                object.name = name;
            } else if self.cursor.check(COLOR_MARKER) {
                let line = self.cursor.take_line("colour index")?;
                let (_, value) = split_once(&line, ' ');
                object.palette_color_index = value.trim().parse().map_err(|e| {
                    self.cursor
                        .error_at_previous(&line, format!("invalid colour index: {}", e))
                })?;
            } else {
                self.cursor.skip_line();
            }
        }

        self.world.bucket_mut(bucket).insert(object.id.clone(), object);
        Ok(())
    }

    fn take_graphic(&mut self) -> Result<AnimatedGraphic> {
        let mut frames = vec![self.take_frame()?];

        while self.cursor.check(FRAME_SEPARATOR) {
            self.cursor.skip_line();
            frames.push(self.take_frame()?);
        }

        Ok(AnimatedGraphic::new(frames).unwrap_or_else(|| AnimatedGraphic::single(Frame::blank())))
    }

    fn take_frame(&mut self) -> Result<Frame> {
        let mut frame = Frame::blank();

        for y in 0..FRAME_SIDE {
            let row = self.cursor.take_line("frame row")?;
            for (x, pixel) in row.chars().take(FRAME_SIDE).enumerate() {
                frame.set(x, y, pixel == '1');
            }
        }

        Ok(frame)
    }

    fn take_room(&mut self) -> Result<()> {
        let (_, id) = self.cursor.take_split_once(' ', "room header")?;
        let mut room = Room { id, palette_id: None };

        while !self.cursor.check_blank() {
            let line = self.cursor.take_line("room line")?;
            if let Some(palette_id) = line.strip_prefix("PAL ") {
                room.palette_id = Some(palette_id.trim().to_string());
            }
        }

        self.world.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    /// Take a `NAME <name>` line if the cursor is on one.
    fn try_take_name(&mut self) -> Result<Option<String>> {
        if !self.cursor.check(NAME_MARKER) {
            return Ok(None);
        }

        let (_, name) = self.cursor.take_split_once(' ', "name")?;
        Ok(Some(name))
    }
}

/// Peel an inline `NAME <name>` suffix off a header remainder.
fn split_inline_name(rest: &str) -> (String, Option<String>) {
    let (id, tail) = split_once(rest, ' ');
    match tail.strip_prefix(NAME_MARKER) {
        Some(name) if name.is_empty() || name.starts_with(' ') => {
            (id, Some(name.trim_start().to_string()))
        }
        _ => (rest.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MosaicError;
    use pretty_assertions::assert_eq;

    const BLANK_ROWS: &str = "00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n";

    #[test]
    fn test_parse_palette_and_tile() {
        let source = format!("PAL 0\n0,0,0\n255,255,255\n255,0,0\n\nTIL a\n{}\n", BLANK_ROWS);
        let world = parse_world_str(&source).unwrap();

        let palette = &world.palettes["0"];
        assert_eq!(palette.background().map(Colour::to_packed), Some(0x000000FF));
        assert_eq!(palette.tile_color(), Some(Colour::WHITE));
        assert_eq!(palette.sprite_color(), Some(Colour::rgb(255, 0, 0)));

        let tile = &world.tiles["a"];
        assert_eq!(tile.graphic.len(), 1);
        assert!(tile.graphic.frame(0).is_blank());
        assert_eq!(tile.palette_color_index, 1);
    }

    #[test]
    fn test_palette_name_line() {
        let world = parse_world_str("PAL 1\nNAME dusk\n1,2,3\n\n").unwrap();
        let palette = &world.palettes["1"];
        assert_eq!(palette.name, "dusk");
        assert_eq!(palette.colors, vec![Colour::rgb(1, 2, 3)]);
    }

    #[test]
    fn test_palette_inline_name() {
        let world = parse_world_str("PAL 2 NAME night sky\n1,2,3\n\n").unwrap();
        let palette = &world.palettes["2"];
        assert_eq!(palette.id, "2");
        assert_eq!(palette.name, "night sky");
    }

    #[test]
    fn test_palette_block_round_trips() {
        let source = "PAL 7\nNAME x\n12,34,56\n0,0,0\n255,128,1\n\n";
        let world = parse_world_str(source).unwrap();
        let palette = &world.palettes["7"];

        let reparsed = parse_world_str(&format!("{}\n", palette.to_block())).unwrap();
        assert_eq!(&reparsed.palettes["7"], palette);
        assert_eq!(
            palette.colors.iter().map(|c| c.to_packed() >> 8).collect::<Vec<_>>(),
            vec![0x0C2238, 0x000000, 0xFF8001]
        );
    }

    #[test]
    fn test_animated_sprite_with_attributes() {
        let source = "SPR A\n\
11111111\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n\
>\n\
00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000001\n\
NAME avatar\n\
POS 0 4,4\n\
COL 3\n\
\n";
        let world = parse_world_str(source).unwrap();
        let sprite = &world.sprites["A"];

        assert_eq!(sprite.name, "avatar");
        assert_eq!(sprite.bucket, Bucket::Sprite);
        assert_eq!(sprite.graphic.len(), 2);
        assert!(sprite.graphic.frame(0).get(7, 0));
        assert!(sprite.graphic.frame(1).get(7, 7));
        assert!(!sprite.graphic.frame(1).get(0, 0));
        assert_eq!(sprite.palette_color_index, 3);
    }

    #[test]
    fn test_item_defaults_to_sprite_slot() {
        let source = format!("ITM 0\n{}NAME tea\n\n", BLANK_ROWS);
        let world = parse_world_str(&source).unwrap();
        assert_eq!(world.items["0"].palette_color_index, 2);
        assert_eq!(world.items["0"].name, "tea");
    }

    #[test]
    fn test_unknown_blocks_are_skipped() {
        let source = "My Game\n\n# BITSY VERSION 7.2\n\nDLG 0\nhello\nPAL 9\n\nPAL 0\n0,0,0\n1,1,1\n\n";
        let world = parse_world_str(source).unwrap();

        // PAL 9 sits inside a DLG block and must not be parsed
        assert_eq!(world.palettes.keys().collect::<Vec<_>>(), vec!["0"]);
    }

    #[test]
    fn test_rooms_record_palette() {
        let source = "ROOM 0\n0,0,0\n0,a,0\nNAME start\nPAL 1\n\nSET 1\n0,0\n\n";
        let world = parse_world_str(source).unwrap();
        assert_eq!(world.rooms["0"].palette_id.as_deref(), Some("1"));
        assert_eq!(world.rooms["1"].palette_id, None);
    }

    #[test]
    fn test_short_rows_pad_with_off() {
        let source = "TIL s\n1\n11\n\n\n\n\n\n\n\n";
        let world = parse_world_str(source).unwrap();
        let frame = world.tiles["s"].graphic.frame(0);
        assert!(frame.get(0, 0));
        assert!(!frame.get(1, 0));
        assert!(frame.get(1, 1));
    }

    #[test]
    fn test_malformed_colour_reports_line() {
        let err = parse_world_str("PAL 0\n0,0,0\n12,abc,3\n\n").unwrap_err();
        match err {
            MosaicError::Parse { line, text, .. } => {
                assert_eq!(line, 3);
                assert_eq!(text, "12,abc,3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_colour_out_of_range_is_error() {
        assert!(parse_world_str("PAL 0\n300,0,0\n\n").is_err());
        assert!(parse_world_str("PAL 0\n1,2\n\n").is_err());
    }

    #[test]
    fn test_truncated_tile_is_unexpected_end() {
        let err = parse_world_str("TIL a\n11111111\n11111111").unwrap_err();
        assert!(matches!(err, MosaicError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_separator_without_frame_is_unexpected_end() {
        let source = format!("TIL a\n{}>", BLANK_ROWS);
        let err = parse_world_str(&source).unwrap_err();
        assert!(matches!(err, MosaicError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_crlf_document() {
        let source = "PAL 0\r\n0,0,0\r\n9,9,9\r\n\r\n";
        let world = parse_world_str(source).unwrap();
        assert_eq!(world.palettes["0"].colors.len(), 2);
    }

    #[test]
    fn test_bad_colour_index_is_error() {
        let source = format!("TIL a\n{}COL x\n\n", BLANK_ROWS);
        assert!(parse_world_str(&source).is_err());
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let source = format!("TIL a\n{}NAME first\n\nTIL a\n{}NAME second\n\n", BLANK_ROWS, BLANK_ROWS);
        let world = parse_world_str(&source).unwrap();
        assert_eq!(world.tiles.len(), 1);
        assert_eq!(world.tiles["a"].name, "second");
    }

    #[test]
    fn test_split_inline_name() {
        assert_eq!(split_inline_name("0"), ("0".to_string(), None));
        assert_eq!(
            split_inline_name("0 NAME warm"),
            ("0".to_string(), Some("warm".to_string()))
        );
        assert_eq!(split_inline_name("0 NAMELESS"), ("0 NAMELESS".to_string(), None));
    }
}
