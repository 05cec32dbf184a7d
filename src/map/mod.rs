mod animation;
mod object_group;
mod properties;
mod terrain;
mod tile;
mod tileset;

pub use animation::*;
pub use object_group::*;
pub use properties::*;
pub use terrain::*;
pub use tile::*;
pub use tileset::*;
