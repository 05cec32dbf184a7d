use std::collections::BTreeMap;
use std::path::Path;
use derive_more::*;
use glam::IVec2;
use image::RgbaImage;
use rand::Rng;
use tracing::instrument;
use crate::map::{has_terrain, terrain_corner, terrain_corners, Corner, ImageStatus, Properties, Terrain, Tile, MAX_TERRAIN_ID};
use crate::RandomPicker;

/// Collection of tiles sharing a tile size, along with the terrain types they reference.
#[derive(Clone, Default, Debug)]
pub struct Tileset {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub properties: Properties,
    tile_offset: IVec2,
    tiles: BTreeMap<u32, Tile>,
    next_tile_id: u32,
    terrains: Vec<Terrain>,
    terrain_distances_dirty: bool,
}

impl Tileset {

    pub fn new(name: impl Into<String>, tile_width: u32, tile_height: u32) -> Self {
        Self {
            name: name.into(),
            tile_width,
            tile_height,
            ..Default::default()
        }
    }

    /// Offset in pixels applied when drawing tiles of this tileset.
    pub fn tile_offset(&self) -> IVec2 {
        self.tile_offset
    }

    pub fn set_tile_offset(&mut self, tile_offset: IVec2) {
        self.tile_offset = tile_offset;
    }

    /// Adds an empty tile and returns its id.
    pub fn add_tile(&mut self) -> Result<u32, TilesetError> {
        let id = self.next_tile_id;
        self.insert_tile(Tile::new(id))?;
        Ok(id)
    }

    pub fn add_tile_with_image(&mut self, image: RgbaImage) -> Result<u32, TilesetError> {
        let id = self.next_tile_id;
        self.insert_tile(Tile::with_image(id, image))?;
        Ok(id)
    }

    /// Inserts a tile under its own id, returning the tile it replaced.
    /// `u32::MAX` is rejected since no id would be left for the next tile.
    pub fn insert_tile(&mut self, tile: Tile) -> Result<Option<Tile>, TilesetError> {
        let next_id = tile
            .id()
            .checked_add(1)
            .ok_or(TilesetError::TileIdOverflow { tile_id: tile.id() })?;
        self.next_tile_id = self.next_tile_id.max(next_id);
        self.terrain_distances_dirty = true;
        Ok(self.tiles.insert(tile.id(), tile))
    }

    pub fn remove_tile(&mut self, id: u32) -> Option<Tile> {
        let tile = self.tiles.remove(&id)?;
        self.terrain_distances_dirty = true;
        Some(tile)
    }

    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn tile_mut(&mut self, id: u32) -> Option<&mut Tile> {
        let tile = self.tiles.get_mut(&id)?;
        self.terrain_distances_dirty = true;
        Some(tile)
    }

    /// Tiles ordered by id.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Id the next call to [`Tileset::add_tile`] will use.
    pub fn next_tile_id(&self) -> u32 {
        self.next_tile_id
    }

    /// The tile currently displayed in place of tile `id`.
    /// That is the tile itself unless it is animated.
    pub fn current_frame_tile(&self, id: u32) -> Option<&Tile> {
        let tile = self.tiles.get(&id)?;
        let frame_tile = tile
            .animation()
            .current_frame()
            .and_then(|frame| self.tiles.get(&frame.tile_id));
        Some(frame_tile.unwrap_or(tile))
    }

    pub fn set_tile_terrain(&mut self, id: u32, terrain: u32) -> bool {
        let Some(tile) = self.tile_mut(id) else { return false };
        tile.set_terrain(terrain);
        true
    }

    /// Terrain at the given corner of tile `id`.
    pub fn terrain_at_corner(&self, id: u32, corner: Corner) -> Option<&Terrain> {
        let tile = self.tiles.get(&id)?;
        self.terrain(tile.corner_terrain_id(corner))
    }

    /// Adds a terrain type and returns its id.
    pub fn add_terrain(&mut self, name: impl Into<String>, image_tile_id: Option<u32>) -> Result<i32, TilesetError> {
        let id = self.terrains.len() as i32;
        if id > MAX_TERRAIN_ID {
            return Err(TilesetError::TooManyTerrains);
        }
        self.terrains.push(Terrain::new(id, name, image_tile_id));
        self.terrain_distances_dirty = true;
        Ok(id)
    }

    pub fn terrain(&self, id: i32) -> Option<&Terrain> {
        let index = usize::try_from(id).ok()?;
        self.terrains.get(index)
    }

    pub fn terrain_mut(&mut self, id: i32) -> Option<&mut Terrain> {
        let index = usize::try_from(id).ok()?;
        self.terrains.get_mut(index)
    }

    pub fn terrains(&self) -> &[Terrain] {
        &self.terrains
    }

    pub fn terrain_count(&self) -> usize {
        self.terrains.len()
    }

    /// Checks that every corner of `terrain` is unset or names a terrain of this tileset.
    pub(crate) fn validate_terrain(&self, tile_id: u32, terrain: u32) -> Result<(), TilesetError> {
        for corner in Corner::ALL {
            let terrain_id = terrain_corner(terrain, corner);
            if terrain_id != -1 && self.terrain(terrain_id).is_none() {
                return Err(TilesetError::UnknownTerrain { tile_id, terrain_id });
            }
        }
        Ok(())
    }

    /// Number of transitions needed before terrain `from` may meet terrain `to`.
    /// `to` may be -1 for "no terrain".
    /// `None` when no chain of tiles connects the two.
    pub fn terrain_transition_distance(&mut self, from: i32, to: i32) -> Option<u32> {
        if self.terrain_distances_dirty {
            self.recalculate_terrain_distances();
        }
        self.terrain(from)?.transition_distance(to)
    }

    #[instrument(skip_all)]
    fn recalculate_terrain_distances(&mut self) {
        let count = self.terrains.len();

        // Direct transitions, found in tiles carrying the terrain
        for index in 0..count {
            let id = index as i32;
            let mut distances: Vec<Option<u32>> = vec![None; count + 1];
            let mut set_neighbour = |neighbour: i32| {
                if let Some(slot) = distances.get_mut((neighbour + 1) as usize) {
                    *slot = Some(1);
                }
            };
            let mut carried = false;
            for tile in self.tiles.values() {
                if !has_terrain(tile.terrain(), id) {
                    continue;
                }
                let [top_left, top_right, bottom_left, bottom_right] = terrain_corners(tile.terrain());

                // Diagonally opposite corners do not touch
                if top_left == id || bottom_right == id {
                    set_neighbour(top_right);
                    set_neighbour(bottom_left);
                }
                if top_right == id || bottom_left == id {
                    set_neighbour(top_left);
                    set_neighbour(bottom_right);
                }
                carried = true;
            }
            if carried {
                distances[index + 1] = Some(0);
            }
            self.terrains[index].transition_distances = distances;
        }

        // Indirect transitions through a terrain both have in common
        loop {
            let mut connected = false;
            for i in 0..count {
                for j in 0..count {
                    if i == j {
                        continue;
                    }
                    for common in -1..count as i32 {
                        let d0 = self.terrains[i].transition_distance(common);
                        let d1 = self.terrains[j].transition_distance(common);
                        let (Some(d0), Some(d1)) = (d0, d1) else { continue };
                        let current = self.terrains[i].transition_distance(j as i32);
                        if current.map_or(true, |current| d0 + d1 < current) {
                            self.terrains[i].set_transition_distance(j as i32, d0 + d1);
                            self.terrains[j].set_transition_distance(i as i32, d0 + d1);
                            connected = true;
                        }
                    }
                }
            }
            if !connected {
                break;
            }
        }

        self.terrain_distances_dirty = false;
        log::debug!("Recalculated distances of {count} terrains in tileset '{}'", self.name);
    }

    /// Ids of tiles whose four corners match `terrain` exactly.
    pub fn tiles_with_terrain(&self, terrain: u32) -> Vec<u32> {
        self.tiles
            .values()
            .filter(|tile| tile.terrain() == terrain)
            .map(Tile::id)
            .collect()
    }

    /// Picks a tile matching `terrain`, weighted by tile probability.
    pub fn pick_tile(&self, terrain: u32, rng: &mut impl Rng) -> Option<u32> {
        let picker: RandomPicker<u32> = self.tiles
            .values()
            .filter(|tile| tile.terrain() == terrain)
            .map(|tile| (tile.id(), tile.probability()))
            .collect();
        picker.pick(rng).copied()
    }

    /// Advances the animation of every tile.
    /// Returns the ids of tiles whose displayed frame changed.
    #[instrument(skip_all)]
    pub fn advance_animations(&mut self, ms: u32) -> Vec<u32> {
        self.tiles
            .values_mut()
            .filter_map(|tile| tile.advance_animation(ms).then_some(tile.id()))
            .collect()
    }

    /// Rewinds the animation of every tile.
    /// Returns the ids of tiles whose displayed frame changed.
    pub fn reset_animations(&mut self) -> Vec<u32> {
        self.tiles
            .values_mut()
            .filter_map(|tile| tile.reset_animation().then_some(tile.id()))
            .collect()
    }

    /// Loads the external image of every tile that refers to one.
    /// Relative image sources are resolved against `base_dir`.
    /// Returns the number of images that failed to load.
    #[instrument(skip_all)]
    pub fn load_images(&mut self, base_dir: &Path) -> usize {
        let mut failures = 0;
        for tile in self.tiles.values_mut() {
            let Some(source) = tile.image_source() else { continue };
            let path = base_dir.join(source);
            tile.set_image_status(ImageStatus::Loading);
            match load_image(&path) {
                Ok(image) => tile.set_image(image),
                Err(err) => {
                    log::warn!("Failed to load image '{}' of tile {}: {err}", path.display(), tile.id());
                    tile.set_image_status(ImageStatus::Error);
                },
            }
            if tile.image_status() == ImageStatus::Error {
                failures += 1;
            }
        }
        failures
    }
}

fn load_image(path: &Path) -> Result<RgbaImage, TilesetError> {
    Ok(image::open(path)?.to_rgba8())
}

#[derive(Error, Display, From, Debug)]
pub enum TilesetError {
    #[display(fmt="{_0}")]
    Io(std::io::Error),
    #[display(fmt="{_0}")]
    Yaml(serde_yaml::Error),
    #[display(fmt="{_0}")]
    Image(image::ImageError),
    #[display(fmt="Tile {tile_id} has terrain id {terrain_id} outside of -1..=254")]
    #[from(ignore)]
    InvalidTerrainId { tile_id: u32, terrain_id: i32 },
    #[display(fmt="Tile {tile_id} refers to unknown terrain {terrain_id}")]
    #[from(ignore)]
    UnknownTerrain { tile_id: u32, terrain_id: i32 },
    #[display(fmt="Tile {tile_id} animates to unknown tile {frame_tile_id}")]
    #[from(ignore)]
    UnknownFrameTile { tile_id: u32, frame_tile_id: u32 },
    #[display(fmt="Tile id {tile_id} is defined more than once")]
    #[from(ignore)]
    DuplicateTileId { tile_id: u32 },
    #[display(fmt="Tile {tile_id} has an invalid probability {probability}")]
    #[from(ignore)]
    InvalidProbability { tile_id: u32, probability: f32 },
    #[display(fmt="Tile id {tile_id} leaves no id for further tiles")]
    #[from(ignore)]
    TileIdOverflow { tile_id: u32 },
    #[display(fmt="Object id {object_id} leaves no id for further objects")]
    #[from(ignore)]
    ObjectIdOverflow { object_id: u32 },
    #[display(fmt="Tileset can hold at most 255 terrains")]
    #[from(ignore)]
    TooManyTerrains,
}

#[cfg(test)]
mod test {
    use glam::IVec2;
    use image::RgbaImage;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use crate::map::{make_terrain, make_terrain_corners, Corner, Frame, ImageStatus, Tile, Tileset, TilesetError};

    /// Grass (0), sand (1) and water (2) with grass-sand and sand-water transitions.
    fn shore_tileset() -> Tileset {
        let mut tileset = Tileset::new("shore", 16, 16);
        let grass = tileset.add_terrain("grass", None).unwrap();
        let sand = tileset.add_terrain("sand", None).unwrap();
        let water = tileset.add_terrain("water", None).unwrap();
        for terrain in [
            make_terrain(grass),
            make_terrain(sand),
            make_terrain(water),
            make_terrain_corners(grass, grass, sand, sand),
            make_terrain_corners(sand, water, sand, water),
        ] {
            let id = tileset.add_tile().unwrap();
            tileset.set_tile_terrain(id, terrain);
        }
        tileset
    }

    #[test]
    fn tile_ids() {
        let mut tileset = Tileset::new("ids", 8, 8);
        assert_eq!(0, tileset.add_tile().unwrap());
        assert_eq!(1, tileset.add_tile_with_image(RgbaImage::new(8, 8)).unwrap());
        assert!(tileset.insert_tile(Tile::new(10)).unwrap().is_none());
        assert_eq!(11, tileset.add_tile().unwrap());
        assert_eq!(4, tileset.tile_count());

        // Removing keeps ids stable
        assert!(tileset.remove_tile(1).is_some());
        assert_eq!(12, tileset.next_tile_id());
        assert!(tileset.tile(1).is_none());
        assert_eq!(vec![0, 10, 11], tileset.tiles().map(Tile::id).collect::<Vec<_>>());
        assert!(tileset.insert_tile(Tile::new(10)).unwrap().is_some());
    }

    #[test]
    fn last_tile_id_is_reserved() {
        let mut tileset = Tileset::new("ids", 8, 8);
        let err = tileset.insert_tile(Tile::new(u32::MAX)).unwrap_err();
        assert!(matches!(err, TilesetError::TileIdOverflow { tile_id: u32::MAX }));
        assert_eq!(0, tileset.tile_count());
        assert_eq!(0, tileset.next_tile_id());

        tileset.insert_tile(Tile::new(u32::MAX - 1)).unwrap();
        assert_eq!(u32::MAX, tileset.next_tile_id());
        assert!(matches!(tileset.add_tile(), Err(TilesetError::TileIdOverflow { .. })));
        assert_eq!(1, tileset.tile_count());
    }

    #[test]
    fn current_frame_tile() {
        let mut tileset = Tileset::new("water", 16, 16);
        let first = tileset.add_tile().unwrap();
        let second = tileset.add_tile().unwrap();
        let still = tileset.add_tile().unwrap();
        tileset
            .tile_mut(first)
            .unwrap()
            .set_frames(vec![Frame::new(first, 100), Frame::new(second, 100)]);

        assert_eq!(first, tileset.current_frame_tile(first).unwrap().id());
        assert_eq!(vec![first], tileset.advance_animations(101));
        assert_eq!(second, tileset.current_frame_tile(first).unwrap().id());
        assert_eq!(still, tileset.current_frame_tile(still).unwrap().id());
        assert!(tileset.current_frame_tile(99).is_none());

        assert_eq!(vec![first], tileset.reset_animations());
        assert_eq!(first, tileset.current_frame_tile(first).unwrap().id());
    }

    #[test]
    fn terrain_at_corner() {
        let tileset = shore_tileset();
        assert_eq!("grass", tileset.terrain_at_corner(3, Corner::TopRight).unwrap().name);
        assert_eq!("sand", tileset.terrain_at_corner(3, Corner::BottomLeft).unwrap().name);
        let mut empty = Tileset::new("empty", 16, 16);
        let id = empty.add_tile().unwrap();
        assert!(empty.terrain_at_corner(id, Corner::TopLeft).is_none());
    }

    #[test]
    fn transition_distances() {
        let mut tileset = shore_tileset();
        assert_eq!(Some(0), tileset.terrain_transition_distance(0, 0));
        assert_eq!(Some(1), tileset.terrain_transition_distance(0, 1));
        assert_eq!(Some(1), tileset.terrain_transition_distance(1, 2));
        assert_eq!(Some(2), tileset.terrain_transition_distance(0, 2));
        assert_eq!(Some(2), tileset.terrain_transition_distance(2, 0));
        assert_eq!(None, tileset.terrain_transition_distance(0, -1));
        assert_eq!(None, tileset.terrain_transition_distance(7, 0));
    }

    #[test]
    fn diagonal_corners_are_not_neighbours() {
        let mut tileset = Tileset::new("diagonal", 16, 16);
        let a = tileset.add_terrain("a", None).unwrap();
        let b = tileset.add_terrain("b", None).unwrap();
        let id = tileset.add_tile().unwrap();
        tileset.set_tile_terrain(id, make_terrain_corners(a, -1, -1, b));
        assert_eq!(Some(1), tileset.terrain_transition_distance(a, -1));
        assert_eq!(Some(2), tileset.terrain_transition_distance(a, b));
    }

    #[test]
    fn distances_follow_tile_changes() {
        let mut tileset = shore_tileset();
        assert_eq!(Some(2), tileset.terrain_transition_distance(0, 2));
        tileset.set_tile_terrain(0, make_terrain_corners(0, 2, 0, 2));
        assert_eq!(Some(1), tileset.terrain_transition_distance(0, 2));
    }

    #[test]
    fn pick_by_probability() {
        let mut tileset = Tileset::new("grass", 16, 16);
        let grass = make_terrain(0);
        for probability in [1.0, 0.0, 0.5] {
            let id = tileset.add_tile().unwrap();
            let tile = tileset.tile_mut(id).unwrap();
            tile.set_terrain(grass);
            tile.set_probability(probability);
        }
        assert_eq!(vec![0, 1, 2], tileset.tiles_with_terrain(grass));

        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let picked = tileset.pick_tile(grass, &mut rng).unwrap();
            assert_ne!(1, picked);
        }
        assert_eq!(None, tileset.pick_tile(make_terrain(1), &mut rng));
    }

    #[test]
    fn pick_with_overflowing_probabilities() {
        let mut tileset = Tileset::new("grass", 16, 16);
        let grass = make_terrain(0);
        for _ in 0..2 {
            let id = tileset.add_tile().unwrap();
            let tile = tileset.tile_mut(id).unwrap();
            tile.set_terrain(grass);
            tile.set_probability(3.0e38);
        }
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(None, tileset.pick_tile(grass, &mut rng));

        tileset.tile_mut(1).unwrap().set_probability(f32::INFINITY);
        assert_eq!(Some(0), tileset.pick_tile(grass, &mut rng));
    }

    #[test]
    fn missing_images_fail() {
        let mut tileset = Tileset::new("images", 16, 16);
        tileset.set_tile_offset(IVec2::new(0, -8));
        let id = tileset.add_tile().unwrap();
        let tile = tileset.tile_mut(id).unwrap();
        tile.set_image_source(Some("does/not/exist.png".into()));
        tile.set_image_status(ImageStatus::Pending);
        tileset.add_tile().unwrap();

        let dir = std::env::temp_dir();
        assert_eq!(1, tileset.load_images(&dir));
        assert_eq!(ImageStatus::Error, tileset.tile(id).unwrap().image_status());
        assert_eq!(IVec2::new(0, -8), tileset.tile_offset());
    }

    #[test]
    fn loads_images() {
        let dir = std::env::temp_dir().join(format!("tilekit-images-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        RgbaImage::new(16, 32).save(dir.join("tall.png")).unwrap();

        let mut tileset = Tileset::new("images", 16, 32);
        let id = tileset.add_tile().unwrap();
        tileset.tile_mut(id).unwrap().set_image_source(Some("tall.png".into()));
        assert_eq!(0, tileset.load_images(&dir));

        let tile = tileset.tile(id).unwrap();
        assert_eq!(ImageStatus::Ready, tile.image_status());
        assert_eq!((16, 32), (tile.width(), tile.height()));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
