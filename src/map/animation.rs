use serde::{Deserialize, Serialize};

/// A single frame of an animated tile.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Frame {
    /// Tile to display, local to the tileset.
    pub tile_id: u32,
    /// Milliseconds to display the tile for. 0 stops playback on this frame.
    pub duration: u32,
}

impl Frame {
    pub fn new(tile_id: u32, duration: u32) -> Self {
        Self { tile_id, duration }
    }
}

/// Frame sequence of a tile along with its playback position.
#[derive(Clone, Default, Debug)]
pub struct Animation {
    frames: Vec<Frame>,
    current_frame_index: usize,
    unused_time: u32,
}

impl Animation {

    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            current_frame_index: 0,
            unused_time: 0,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Replaces the frames and rewinds playback.
    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
        self.current_frame_index = 0;
        self.unused_time = 0;
    }

    pub fn is_animated(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Always 0 when there are no frames.
    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    pub fn current_frame(&self) -> Option<Frame> {
        self.frames.get(self.current_frame_index).copied()
    }

    /// Time spent on the current frame so far, in milliseconds.
    pub fn unused_time(&self) -> u32 {
        self.unused_time
    }

    /// Length of one full cycle in milliseconds.
    pub fn total_duration(&self) -> u64 {
        self.frames.iter().map(|frame| frame.duration as u64).sum()
    }

    /// Rewinds to the first frame.
    /// Returns true if the displayed tile changed.
    pub fn reset(&mut self) -> bool {
        let Some(previous) = self.current_frame() else { return false };
        self.current_frame_index = 0;
        self.unused_time = 0;
        previous.tile_id != self.frames[0].tile_id
    }

    /// Moves playback forward by `ms` milliseconds, wrapping at the end of the sequence.
    /// Returns true if the displayed tile changed.
    pub fn advance(&mut self, ms: u32) -> bool {
        let Some(mut frame) = self.current_frame() else { return false };
        let previous_tile_id = frame.tile_id;
        self.unused_time = self.unused_time.saturating_add(ms);
        while frame.duration > 0 && self.unused_time > frame.duration {
            self.unused_time -= frame.duration;
            self.current_frame_index = (self.current_frame_index + 1) % self.frames.len();
            frame = self.frames[self.current_frame_index];
        }
        previous_tile_id != frame.tile_id
    }
}
