//! YAML tileset definitions.
//!
//! A definition lists terrains by name and tiles by id. Terrain corners refer to terrains by
//! their position in the `terrains` list, with `~` for "no terrain".
//!
//! ```yaml
//! name: shore
//! tile_width: 16
//! tile_height: 16
//! terrains:
//!   - name: grass
//!     tile: 0
//! tiles:
//!   - id: 0
//!     image: grass.png
//!     terrain: [0, 0, 0, ~]
//!     animation:
//!       - { tile_id: 0, duration: 100 }
//!     objects:
//!       - { shape: rectangle, size: [16, 16] }
//! ```
use std::path::{Path, PathBuf};
use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use crate::map::{make_terrain_corners, Frame, ImageStatus, MapObject, ObjectGroup, ObjectShape, Properties, Tile, Tileset, TilesetError, MAX_TERRAIN_ID, NO_TERRAIN};
use crate::HashSet;

#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesetDef {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_offset: IVec2,
    pub properties: Properties,
    pub terrains: Vec<TerrainDef>,
    pub tiles: Vec<TileDef>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TerrainDef {
    pub name: String,
    /// Tile representing the terrain.
    #[serde(default)]
    pub tile: Option<u32>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TileDef {
    pub id: u32,
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default, rename = "type")]
    pub tile_type: String,
    /// Top left, top right, bottom left and bottom right terrain ids.
    #[serde(default)]
    pub terrain: Option<[Option<i32>; 4]>,
    #[serde(default = "default_probability")]
    pub probability: f32,
    #[serde(default)]
    pub animation: Vec<Frame>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

fn default_probability() -> f32 { 1.0 }

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ObjectDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
    #[serde(flatten)]
    pub shape: ObjectShape,
    #[serde(default)]
    pub properties: Properties,
}

impl TilesetDef {

    pub fn from_yaml(source: &str) -> Result<Self, TilesetError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn to_yaml(&self) -> Result<String, TilesetError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TilesetError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Builds the tileset, validating terrain corners and animation frames.
    /// Tiles with an image are left [`ImageStatus::Pending`], see [`Tileset::load_images`].
    pub fn build(&self) -> Result<Tileset, TilesetError> {
        let mut tileset = Tileset::new(self.name.as_str(), self.tile_width, self.tile_height);
        tileset.set_tile_offset(self.tile_offset);
        tileset.properties = self.properties.clone();

        for terrain_def in &self.terrains {
            let id = tileset.add_terrain(terrain_def.name.as_str(), terrain_def.tile)?;
            if let Some(terrain) = tileset.terrain_mut(id) {
                terrain.properties = terrain_def.properties.clone();
            }
        }

        let mut seen = HashSet::default();
        for tile_def in &self.tiles {
            if !seen.insert(tile_def.id) {
                return Err(TilesetError::DuplicateTileId { tile_id: tile_def.id });
            }
            let tile = tile_def.build()?;
            tileset.validate_terrain(tile.id(), tile.terrain())?;
            tileset.insert_tile(tile)?;
        }

        for tile in tileset.tiles() {
            for frame in tile.frames() {
                if tileset.tile(frame.tile_id).is_none() {
                    return Err(TilesetError::UnknownFrameTile { tile_id: tile.id(), frame_tile_id: frame.tile_id });
                }
            }
        }

        log::debug!("Built tileset '{}' with {} tiles", tileset.name, tileset.tile_count());
        Ok(tileset)
    }
}

impl TileDef {

    fn terrain(&self) -> Result<u32, TilesetError> {
        let Some(corners) = self.terrain else { return Ok(NO_TERRAIN) };
        let mut ids = [-1; 4];
        for (slot, corner) in ids.iter_mut().zip(corners) {
            let Some(terrain_id) = corner else { continue };
            if !(0..=MAX_TERRAIN_ID).contains(&terrain_id) {
                return Err(TilesetError::InvalidTerrainId { tile_id: self.id, terrain_id });
            }
            *slot = terrain_id;
        }
        let [top_left, top_right, bottom_left, bottom_right] = ids;
        Ok(make_terrain_corners(top_left, top_right, bottom_left, bottom_right))
    }

    fn build(&self) -> Result<Tile, TilesetError> {
        let mut tile = Tile::new(self.id);
        if let Some(image) = &self.image {
            tile.set_image_source(Some(image.clone()));
            tile.set_image_status(ImageStatus::Pending);
        }
        tile.set_tile_type(self.tile_type.as_str());
        tile.set_terrain(self.terrain()?);
        if !self.probability.is_finite() {
            return Err(TilesetError::InvalidProbability { tile_id: self.id, probability: self.probability });
        }
        tile.set_probability(self.probability);
        tile.set_frames(self.animation.clone());
        *tile.properties_mut() = self.properties.clone();
        if !self.objects.is_empty() {
            let mut group = ObjectGroup::new();
            for object_def in &self.objects {
                group.add_object(object_def.build())?;
            }
            tile.set_object_group(Some(Box::new(group)));
        }
        Ok(tile)
    }
}

impl ObjectDef {
    fn build(&self) -> MapObject {
        let mut object = MapObject::new(self.shape.clone(), self.position);
        object.name = self.name.clone();
        object.class = self.class.clone();
        object.rotation = self.rotation;
        object.properties = self.properties.clone();
        object
    }
}

/// Reads a tileset definition and loads the images it refers to.
/// Image paths are resolved relative to the definition file.
pub fn load_tileset(path: impl AsRef<Path>) -> Result<Tileset, TilesetError> {
    let path = path.as_ref();
    let mut tileset = TilesetDef::load(path)?.build()?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    let failures = tileset.load_images(base_dir);
    if failures > 0 {
        log::warn!("{failures} images of tileset '{}' failed to load", tileset.name);
    }
    Ok(tileset)
}
