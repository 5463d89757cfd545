use super::{GridCell, RoadTile, TileKind, Track, TrackError, TILE_SIZE};

use serde::{Deserialize, Serialize};

use std::f64::consts::FRAC_PI_2;

/// A single non-grass tile of a [`TrackLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub row: usize,
    pub col: usize,
    pub kind: TileKind,
}

/// A serializable description of a tile grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Number of tile columns.
    pub width: usize,
    /// Number of tile rows.
    pub height: usize,
    /// Row and column of the tile cars start on.
    pub start: (usize, usize),
    /// Heading of cars at the start, in radians.
    #[serde(default = "default_start_rotation")]
    pub start_rotation: f64,
    /// Road tiles; every other cell is grass.
    pub tiles: Vec<TilePlacement>,
}

fn default_start_rotation() -> f64 {
    FRAC_PI_2
}

/// A row-major grid of road tiles. The tile in row `r`,
/// column `c` covers world coordinates
/// `[c × TILE_SIZE, (c + 1) × TILE_SIZE)` horizontally and
/// `[r × TILE_SIZE, (r + 1) × TILE_SIZE)` vertically.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadGrid {
    width: usize,
    height: usize,
    cells: Box<[GridCell]>,
    start: usize,
    start_rotation: f64,
}

impl RoadGrid {
    /// Returns a grass-only grid of `width` columns and `height` rows,
    /// starting at its top-left cell and facing down.
    ///
    /// # Errors
    /// Fails if either dimension is 0.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::tracks::{RoadGrid, TileKind, Track};
    ///
    /// let mut grid = RoadGrid::new(3, 2).unwrap();
    /// grid.set(1, 2, TileKind::StraightHorizontal).unwrap();
    ///
    /// assert!(grid.is_on_road(300.0, 180.0));
    /// assert!(!grid.is_on_road(300.0, 60.0));
    /// assert!(grid.tile_at(-1.0, 10.0).is_none());
    /// assert!(grid.tile_at(360.0, 10.0).is_none());
    /// ```
    pub fn new(width: usize, height: usize) -> Result<RoadGrid, TrackError> {
        if width == 0 || height == 0 {
            return Err(TrackError::EmptyGrid);
        }
        let cells = (0..height)
            .flat_map(|row| {
                (0..width).map(move |col| GridCell {
                    kind: TileKind::Grass,
                    x: col as f64 * TILE_SIZE,
                    y: row as f64 * TILE_SIZE,
                })
            })
            .collect();
        Ok(RoadGrid {
            width,
            height,
            cells,
            start: 0,
            start_rotation: FRAC_PI_2,
        })
    }

    /// Builds a grid from its serializable description.
    ///
    /// # Errors
    /// Fails if the grid is empty, or the start or a
    /// placement lies outside of it.
    pub fn from_layout(layout: &TrackLayout) -> Result<RoadGrid, TrackError> {
        let mut grid = RoadGrid::new(layout.width, layout.height)?;
        for tile in &layout.tiles {
            grid.set(tile.row, tile.col, tile.kind)?;
        }
        grid.set_start(layout.start.0, layout.start.1)?;
        grid.start_rotation = layout.start_rotation;
        Ok(grid)
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, TrackError> {
        if row < self.height && col < self.width {
            Ok(row * self.width + col)
        } else {
            Err(TrackError::CellOutOfRange {
                row,
                col,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Places a tile of the passed kind.
    pub fn set(&mut self, row: usize, col: usize, kind: TileKind) -> Result<(), TrackError> {
        let index = self.index(row, col)?;
        self.cells[index].kind = kind;
        Ok(())
    }

    /// Returns the cell at the passed position.
    pub fn at(&self, row: usize, col: usize) -> Result<&GridCell, TrackError> {
        self.index(row, col).map(|index| &self.cells[index])
    }

    /// Moves the start to the passed cell.
    pub fn set_start(&mut self, row: usize, col: usize) -> Result<(), TrackError> {
        self.start = self.index(row, col)?;
        Ok(())
    }

    /// Returns the row and column of the start cell.
    pub fn start(&self) -> (usize, usize) {
        (self.start / self.width, self.start % self.width)
    }

    pub fn set_start_rotation(&mut self, rotation: f64) {
        self.start_rotation = rotation;
    }

    pub fn start_rotation(&self) -> f64 {
        self.start_rotation
    }

    /// Returns the centre of the start cell and the start heading.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::tracks::RoadGrid;
    ///
    /// let mut grid = RoadGrid::new(4, 4).unwrap();
    /// grid.set_start(2, 1).unwrap();
    /// let (x, y, _) = grid.start_pose();
    /// assert_eq!((x, y), (180.0, 300.0));
    /// ```
    pub fn start_pose(&self) -> (f64, f64, f64) {
        let (x, y) = self.cells[self.start].centre();
        (x, y, self.start_rotation)
    }

    /// Number of tile columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tile rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cells in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }
}

impl Track for RoadGrid {
    fn tile_at(&self, x: f64, y: f64) -> Option<&dyn RoadTile> {
        // Also rejects NaN coordinates.
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let col = (x / TILE_SIZE) as usize;
        let row = (y / TILE_SIZE) as usize;
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(&self.cells[row * self.width + col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid() {
        assert_eq!(RoadGrid::new(0, 3).unwrap_err(), TrackError::EmptyGrid);
        assert_eq!(RoadGrid::new(3, 0).unwrap_err(), TrackError::EmptyGrid);
    }

    #[test]
    fn cells_are_row_major() {
        let grid = RoadGrid::new(3, 2).unwrap();
        let origins: Vec<_> = grid.cells().iter().map(|c| c.origin()).collect();
        assert_eq!(
            origins,
            vec![
                (0.0, 0.0),
                (120.0, 0.0),
                (240.0, 0.0),
                (0.0, 120.0),
                (120.0, 120.0),
                (240.0, 120.0)
            ]
        );
    }

    #[test]
    fn out_of_range_cells() {
        let mut grid = RoadGrid::new(2, 2).unwrap();
        assert_eq!(
            grid.set(2, 0, TileKind::CornerNE),
            Err(TrackError::CellOutOfRange {
                row: 2,
                col: 0,
                width: 2,
                height: 2
            })
        );
        assert!(grid.at(0, 2).is_err());
        assert!(grid.set_start(5, 5).is_err());
        assert_eq!(grid.start(), (0, 0));
    }

    #[test]
    fn tile_lookup() {
        let mut grid = RoadGrid::new(2, 2).unwrap();
        grid.set(1, 0, TileKind::StraightVertical).unwrap();
        let tile = grid.tile_at(10.0, 130.0).unwrap();
        assert_eq!(tile.origin(), (0.0, 120.0));
        assert!(grid.tile_at(f64::NAN, 10.0).is_none());
        assert!(grid.tile_at(10.0, 240.0).is_none());
        assert!(grid.is_on_road(60.0, 239.0));
        assert!(!grid.is_on_road(60.0, 100.0));
    }

    #[test]
    fn from_layout() {
        let layout = TrackLayout {
            width: 3,
            height: 3,
            start: (1, 2),
            start_rotation: 0.5,
            tiles: vec![TilePlacement {
                row: 1,
                col: 2,
                kind: TileKind::StraightHorizontal,
            }],
        };
        let grid = RoadGrid::from_layout(&layout).unwrap();
        assert_eq!(grid.at(1, 2).unwrap().kind(), TileKind::StraightHorizontal);
        assert_eq!(grid.at(0, 0).unwrap().kind(), TileKind::Grass);
        assert_eq!(grid.start(), (1, 2));
        assert_eq!(grid.start_pose(), (300.0, 180.0, 0.5));

        let bad = TrackLayout {
            start: (3, 0),
            ..layout
        };
        assert!(RoadGrid::from_layout(&bad).is_err());
    }

    #[test]
    fn layout_start_rotation_defaults_to_facing_down() {
        let layout: TrackLayout = serde_json::from_str(
            r#"{ "width": 1, "height": 1, "start": [0, 0], "tiles": [] }"#,
        )
        .unwrap();
        assert_eq!(layout.start_rotation, FRAC_PI_2);
    }
}
