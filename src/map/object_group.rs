use glam::Vec2;
use serde::{Deserialize, Serialize};
use crate::map::{Properties, TilesetError};
use crate::Rect;

/// Group of objects attached to a tile.
/// Generally used for editing the tile's collision shapes.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct ObjectGroup {
    pub name: String,
    pub draw_order: DrawOrder,
    pub properties: Properties,
    objects: Vec<MapObject>,
    next_object_id: u32,
}

impl ObjectGroup {

    pub fn new() -> Self {
        Self {
            next_object_id: 1,
            ..Default::default()
        }
    }

    /// Adds an object, assigning it a fresh id when it has none.
    /// Returns the object's id. `u32::MAX` is rejected since no id would be left for the next object.
    pub fn add_object(&mut self, mut object: MapObject) -> Result<u32, TilesetError> {
        if object.id == 0 {
            object.id = self.next_object_id.max(1);
        }
        let next_id = object
            .id
            .checked_add(1)
            .ok_or(TilesetError::ObjectIdOverflow { object_id: object.id })?;
        self.next_object_id = self.next_object_id.max(next_id);
        let id = object.id;
        self.objects.push(object);
        Ok(id)
    }

    pub fn remove_object(&mut self, id: u32) -> Option<MapObject> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn object(&self, id: u32) -> Option<&MapObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn object_mut(&mut self, id: u32) -> Option<&mut MapObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Union of the bounds of all objects, or `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(MapObject::bounds)
            .reduce(|a, b| a.union(b))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawOrder {
    #[default]
    TopDown,
    Index,
}

/// A single shape in an [`ObjectGroup`], positioned in tile pixels.
#[derive(Clone, PartialEq, Debug)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    pub class: String,
    pub position: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    pub visible: bool,
    pub shape: ObjectShape,
    pub properties: Properties,
}

impl MapObject {

    pub fn new(shape: ObjectShape, position: Vec2) -> Self {
        Self {
            id: 0,
            name: String::new(),
            class: String::new(),
            position,
            rotation: 0.0,
            visible: true,
            shape,
            properties: Properties::default(),
        }
    }

    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(ObjectShape::Rectangle { size: Vec2::new(width, height) }, Vec2::new(x, y))
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        let local = self.shape.bounds();
        Rect {
            origin: self.position + local.origin,
            size: local.size,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ObjectShape {
    Rectangle { size: Vec2 },
    Ellipse { size: Vec2 },
    Point,
    Polygon { points: Vec<Vec2> },
    Polyline { points: Vec<Vec2> },
}

impl ObjectShape {

    /// Bounds relative to the object's position.
    pub fn bounds(&self) -> Rect {
        match self {
            ObjectShape::Rectangle { size } | ObjectShape::Ellipse { size } => Rect {
                origin: Vec2::ZERO,
                size: *size,
            },
            ObjectShape::Point => Rect::default(),
            ObjectShape::Polygon { points } | ObjectShape::Polyline { points } => {
                let Some(first) = points.first() else { return Rect::default() };
                let (min, max) = points
                    .iter()
                    .fold((*first, *first), |(min, max), point| (min.min(*point), max.max(*point)));
                Rect { origin: min, size: max - min }
            },
        }
    }

    pub fn is_closed(&self) -> bool {
        !matches!(self, ObjectShape::Polyline { .. } | ObjectShape::Point)
    }
}
