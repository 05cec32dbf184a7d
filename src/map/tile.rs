use std::path::{Path, PathBuf};
use glam::UVec2;
use image::RgbaImage;
use crate::map::{set_terrain_corner, terrain_corner, Animation, Corner, Frame, ObjectGroup, Properties, NO_TERRAIN};

/// Loading state of the image of a [`Tile`].
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum ImageStatus {
    /// Refers to an external image that was not loaded yet.
    Pending,
    Loading,
    #[default]
    Ready,
    Error,
}

/// A single tile of a [`Tileset`](crate::map::Tileset).
#[derive(Clone, Debug)]
pub struct Tile {
    pub(crate) id: u32,
    image: Option<RgbaImage>,
    image_source: Option<PathBuf>,
    image_status: ImageStatus,
    tile_type: String,
    terrain: u32,
    probability: f32,
    properties: Properties,
    object_group: Option<Box<ObjectGroup>>,
    animation: Animation,
}

impl Tile {

    /// Creates a tile without an image.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            image: None,
            image_source: None,
            image_status: ImageStatus::Ready,
            tile_type: String::new(),
            terrain: NO_TERRAIN,
            probability: 1.0,
            properties: Properties::default(),
            object_group: None,
            animation: Animation::default(),
        }
    }

    pub fn with_image(id: u32, image: RgbaImage) -> Self {
        let mut tile = Self::new(id);
        tile.set_image(image);
        tile
    }

    /// ID of this tile within its tileset.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Sets the image of this tile.
    /// An image with a zero dimension counts as a failed load.
    pub fn set_image(&mut self, image: RgbaImage) {
        self.image_status = if image.width() == 0 || image.height() == 0 {
            ImageStatus::Error
        }
        else {
            ImageStatus::Ready
        };
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.image_status = ImageStatus::Error;
    }

    /// Path of the external image that represents this tile, if any.
    pub fn image_source(&self) -> Option<&Path> {
        self.image_source.as_deref()
    }

    pub fn set_image_source(&mut self, image_source: Option<PathBuf>) {
        self.image_source = image_source;
    }

    pub fn image_status(&self) -> ImageStatus {
        self.image_status
    }

    pub fn set_image_status(&mut self, status: ImageStatus) {
        self.image_status = status;
    }

    pub fn width(&self) -> u32 {
        self.image.as_ref().map_or(0, |image| image.width())
    }

    pub fn height(&self) -> u32 {
        self.image.as_ref().map_or(0, |image| image.height())
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width(), self.height())
    }

    /// Type of this tile.
    /// Objects that use this tile without a type of their own are assumed to be of this type.
    pub fn tile_type(&self) -> &str {
        &self.tile_type
    }

    pub fn set_tile_type(&mut self, tile_type: impl Into<String>) {
        self.tile_type = tile_type.into();
    }

    /// Terrain id at `corner`, or -1 when the corner has no terrain.
    pub fn corner_terrain_id(&self, corner: Corner) -> i32 {
        terrain_corner(self.terrain, corner)
    }

    pub fn set_corner_terrain_id(&mut self, corner: Corner, terrain_id: i32) {
        self.terrain = set_terrain_corner(self.terrain, corner, terrain_id);
    }

    /// Terrain of all four corners, packed.
    pub fn terrain(&self) -> u32 {
        self.terrain
    }

    pub fn set_terrain(&mut self, terrain: u32) {
        self.terrain = terrain;
    }

    /// Relative probability of this tile appearing while painting.
    pub fn probability(&self) -> f32 {
        self.probability
    }

    pub fn set_probability(&mut self, probability: f32) {
        self.probability = probability;
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Objects associated with this tile, generally its collision shapes.
    pub fn object_group(&self) -> Option<&ObjectGroup> {
        self.object_group.as_deref()
    }

    pub fn object_group_mut(&mut self) -> Option<&mut ObjectGroup> {
        self.object_group.as_deref_mut()
    }

    /// Takes ownership of `object_group`, dropping the previous one.
    pub fn set_object_group(&mut self, object_group: Option<Box<ObjectGroup>>) {
        self.object_group = object_group;
    }

    /// Exchanges the object group of this tile with the one in `object_group`.
    pub fn swap_object_group(&mut self, object_group: &mut Option<Box<ObjectGroup>>) {
        std::mem::swap(&mut self.object_group, object_group);
    }

    pub fn take_object_group(&mut self) -> Option<Box<ObjectGroup>> {
        self.object_group.take()
    }

    pub fn frames(&self) -> &[Frame] {
        self.animation.frames()
    }

    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.animation.set_frames(frames);
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_animated()
    }

    pub fn current_frame_index(&self) -> usize {
        self.animation.current_frame_index()
    }

    /// Returns true if the displayed tile changed.
    pub fn reset_animation(&mut self) -> bool {
        self.animation.reset()
    }

    /// Returns true if the displayed tile changed.
    pub fn advance_animation(&mut self, ms: u32) -> bool {
        self.animation.advance(ms)
    }
}
