use serde::{Deserialize, Serialize};
use crate::map::Properties;

/// Packed terrain of a tile that has no terrain on any corner.
pub const NO_TERRAIN: u32 = 0xFFFF_FFFF;

/// Terrain id reported for a corner without terrain.
pub const UNSET_TERRAIN_ID: i32 = -1;

/// Highest terrain id that fits in a corner. 0xFF is reserved for "unset".
pub const MAX_TERRAIN_ID: i32 = 254;

/// One of the four quadrants of a tile.
/// Discriminants match the byte order of the packed terrain, most significant first.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Corner {

    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit offset of this corner's byte within a packed terrain.
    pub fn shift(self) -> u32 {
        (3 - self as u32) * 8
    }

    /// Corner diagonally across the tile.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Packs the same terrain id into all four corners.
pub fn make_terrain(id: i32) -> u32 {
    let id = (id & 0xFF) as u32;
    id << 24 | id << 16 | id << 8 | id
}

/// Packs four corner terrain ids into a single word.
/// -1 on a corner becomes 0xFF, "no terrain".
pub fn make_terrain_corners(top_left: i32, top_right: i32, bottom_left: i32, bottom_right: i32) -> u32 {
    ((top_left & 0xFF) as u32) << 24
        | ((top_right & 0xFF) as u32) << 16
        | ((bottom_left & 0xFF) as u32) << 8
        | ((bottom_right & 0xFF) as u32)
}

/// Decodes the terrain id of a single corner.
/// Returns -1 when the corner has no terrain.
pub fn terrain_corner(terrain: u32, corner: Corner) -> i32 {
    let id = (terrain >> corner.shift()) & 0xFF;
    if id == 0xFF {
        UNSET_TERRAIN_ID
    } else {
        id as i32
    }
}

/// Returns `terrain` with `corner` replaced by `terrain_id`. Other corners are left untouched.
pub fn set_terrain_corner(terrain: u32, corner: Corner, terrain_id: i32) -> u32 {
    let mask = 0xFFu32 << corner.shift();
    let insert = ((terrain_id & 0xFF) as u32) << corner.shift();
    (terrain & !mask) | (insert & mask)
}

/// True if any corner of `terrain` carries `terrain_id`.
pub fn has_terrain(terrain: u32, terrain_id: i32) -> bool {
    Corner::ALL
        .iter()
        .any(|corner| terrain_corner(terrain, *corner) == terrain_id)
}

/// All four corners decoded, in [`Corner::ALL`] order.
pub fn terrain_corners(terrain: u32) -> [i32; 4] {
    Corner::ALL.map(|corner| terrain_corner(terrain, corner))
}

/// A terrain type defined by a [`Tileset`](crate::map::Tileset).
#[derive(Clone, Debug)]
pub struct Terrain {
    pub(crate) id: i32,
    pub name: String,
    /// Tile that represents this terrain in a terrain list.
    pub image_tile_id: Option<u32>,
    pub properties: Properties,
    /// Transition distances indexed by `terrain id + 1`, so index 0 is "no terrain".
    pub(crate) transition_distances: Vec<Option<u32>>,
}

impl Terrain {

    pub(crate) fn new(id: i32, name: impl Into<String>, image_tile_id: Option<u32>) -> Self {
        Self {
            id,
            name: name.into(),
            image_tile_id,
            properties: Properties::default(),
            transition_distances: Vec::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub(crate) fn transition_distance(&self, terrain_id: i32) -> Option<u32> {
        let index = usize::try_from(terrain_id + 1).ok()?;
        self.transition_distances.get(index).copied().flatten()
    }

    pub(crate) fn set_transition_distance(&mut self, terrain_id: i32, distance: u32) {
        let index = (terrain_id + 1) as usize;
        if index >= self.transition_distances.len() {
            self.transition_distances.resize(index + 1, None);
        }
        self.transition_distances[index] = Some(distance);
    }
}
