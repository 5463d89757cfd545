//! Tracks are the surfaces cars drive on. The car model only
//! asks a track two things: which tile, if any, contains a world
//! point, and whether a tile-local point lies on that tile's road.
//!
//! [`RoadGrid`] is a row-major grid of square road tiles
//! implementing that interface.
mod errors;
mod grid;
pub mod layouts;
mod tiles;

pub use errors::TrackError;
pub use grid::{RoadGrid, TilePlacement, TrackLayout};
pub use tiles::{GridCell, TileKind, ROAD_INNER, ROAD_OUTER, ROAD_WIDTH, TILE_SIZE};

/// A tile of a track, positioned in world space.
pub trait RoadTile {
    /// Returns true if the tile-local point lies on the road.
    fn point_on_road(&self, x: f64, y: f64) -> bool;

    /// Returns the world coordinates of the tile's top-left corner.
    fn origin(&self) -> (f64, f64);
}

/// A drivable surface made of tiles.
pub trait Track {
    /// Returns the tile containing the world point, if any.
    fn tile_at(&self, x: f64, y: f64) -> Option<&dyn RoadTile>;

    /// Returns true if the world point lies on the road of its tile.
    fn is_on_road(&self, x: f64, y: f64) -> bool {
        self.tile_at(x, y).map_or(false, |tile| {
            let (ox, oy) = tile.origin();
            tile.point_on_road(x - ox, y - oy)
        })
    }
}
