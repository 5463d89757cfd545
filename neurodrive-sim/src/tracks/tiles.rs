use super::RoadTile;

use serde::{Deserialize, Serialize};

/// Side length of every square tile.
pub const TILE_SIZE: f64 = 120.0;
/// Width of the drivable band of road tiles.
pub const ROAD_WIDTH: f64 = 90.0;
/// Distance from a tile edge (or corner centre) to the near side of the road.
pub const ROAD_INNER: f64 = (TILE_SIZE - ROAD_WIDTH) / 2.0;
/// Distance from a tile edge (or corner centre) to the far side of the road.
pub const ROAD_OUTER: f64 = (TILE_SIZE + ROAD_WIDTH) / 2.0;

/// The shape of the road on a tile.
///
/// Corner kinds are named after the tile corner their
/// quarter-circle is centred on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// No road at all.
    #[default]
    Grass,
    /// A road crossing the tile from top to bottom.
    StraightVertical,
    /// A road crossing the tile from left to right.
    StraightHorizontal,
    /// A quarter turn joining the top and left edges.
    CornerNW,
    /// A quarter turn joining the top and right edges.
    CornerNE,
    /// A quarter turn joining the bottom and left edges.
    CornerSW,
    /// A quarter turn joining the bottom and right edges.
    CornerSE,
}

impl TileKind {
    /// Returns true if the tile-local point lies on the road.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::tracks::TileKind;
    ///
    /// assert!(TileKind::StraightVertical.point_on_road(60.0, 0.0));
    /// assert!(!TileKind::StraightVertical.point_on_road(10.0, 60.0));
    /// assert!(TileKind::CornerNW.point_on_road(60.0, 0.0));
    /// assert!(!TileKind::CornerNW.point_on_road(110.0, 110.0));
    /// assert!(!TileKind::Grass.point_on_road(60.0, 60.0));
    /// ```
    pub fn point_on_road(self, x: f64, y: f64) -> bool {
        let band = |v: f64| (ROAD_INNER..=ROAD_OUTER).contains(&v);
        match self {
            Self::Grass => false,
            Self::StraightVertical => band(x),
            Self::StraightHorizontal => band(y),
            Self::CornerNW | Self::CornerNE | Self::CornerSW | Self::CornerSE => {
                let (cx, cy) = self.corner_centre();
                let (dx, dy) = (x - cx, y - cy);
                let dist_sqr = dx * dx + dy * dy;
                dist_sqr >= ROAD_INNER * ROAD_INNER && dist_sqr <= ROAD_OUTER * ROAD_OUTER
            }
        }
    }

    fn corner_centre(self) -> (f64, f64) {
        match self {
            Self::CornerNE => (TILE_SIZE, 0.0),
            Self::CornerSW => (0.0, TILE_SIZE),
            Self::CornerSE => (TILE_SIZE, TILE_SIZE),
            _ => (0.0, 0.0),
        }
    }
}

/// A tile placed at a fixed position of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub(super) kind: TileKind,
    pub(super) x: f64,
    pub(super) y: f64,
}

impl GridCell {
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Returns the world coordinates of the cell's centre.
    pub fn centre(&self) -> (f64, f64) {
        (self.x + TILE_SIZE / 2.0, self.y + TILE_SIZE / 2.0)
    }
}

impl RoadTile for GridCell {
    fn point_on_road(&self, x: f64, y: f64) -> bool {
        self.kind.point_on_road(x, y)
    }

    fn origin(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}
