//! One-bit animated graphics.

/// Side length of a frame in pixels.
pub const FRAME_SIDE: usize = 8;

/// Number of pixels in a frame.
pub const FRAME_PIXELS: usize = FRAME_SIDE * FRAME_SIDE;

/// A single 8×8 one-bit frame, row-major, `true` = foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    cells: [bool; FRAME_PIXELS],
}

impl Frame {
    /// A frame with every pixel off.
    pub const fn blank() -> Self {
        Self {
            cells: [false; FRAME_PIXELS],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < FRAME_SIDE && y < FRAME_SIDE && self.cells[y * FRAME_SIDE + x]
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < FRAME_SIDE && y < FRAME_SIDE {
            self.cells[y * FRAME_SIDE + x] = on;
        }
    }

    pub fn cells(&self) -> &[bool; FRAME_PIXELS] {
        &self.cells
    }

    /// Whether every pixel is off.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&on| !on)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

/// A non-empty sequence of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedGraphic {
    frames: Vec<Frame>,
}

impl AnimatedGraphic {
    /// Build from frames, `None` if `frames` is empty.
    pub fn new(frames: Vec<Frame>) -> Option<Self> {
        if frames.is_empty() {
            None
        } else {
            Some(Self { frames })
        }
    }

    pub fn single(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Frame shown on animation tick `tick`.
    pub fn frame(&self, tick: usize) -> &Frame {
        &self.frames[tick % self.frames.len()]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
