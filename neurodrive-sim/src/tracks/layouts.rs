//! Built-in track layouts on a 16 × 9 grid.
use super::{TileKind, TilePlacement, TrackLayout};

use std::f64::consts::FRAC_PI_2;

use TileKind::{
    CornerNE as NE, CornerNW as NW, CornerSE as SE, CornerSW as SW, StraightHorizontal as H,
    StraightVertical as V,
};

const WIDTH: usize = 16;
const HEIGHT: usize = 9;

fn layout(start: (usize, usize), tiles: &[(usize, usize, TileKind)]) -> TrackLayout {
    TrackLayout {
        width: WIDTH,
        height: HEIGHT,
        start,
        start_rotation: FRAC_PI_2,
        tiles: tiles
            .iter()
            .map(|&(row, col, kind)| TilePlacement { row, col, kind })
            .collect(),
    }
}

/// A short loop with a double switchback.
pub fn hairpin() -> TrackLayout {
    layout(
        (2, 1),
        &[
            (0, 6, SW),
            (0, 5, H),
            (0, 4, H),
            (0, 3, SE),
            (1, 3, NW),
            (1, 2, H),
            (1, 1, SE),
            (2, 1, V),
            (3, 1, NE),
            (3, 2, H),
            (3, 3, H),
            (3, 4, NW),
            (2, 4, SE),
            (2, 5, SW),
            (3, 5, NE),
            (3, 6, NW),
            (2, 6, V),
            (1, 6, V),
        ],
    )
}

/// A long loop filling most of the grid with chains of tight turns.
pub fn serpentine() -> TrackLayout {
    layout(
        (2, 1),
        &[
            (1, 1, SE),
            (1, 2, H),
            (1, 3, NW),
            (0, 3, SE),
            (0, 4, H),
            (0, 5, H),
            (0, 6, H),
            (0, 7, H),
            (0, 8, H),
            (0, 9, H),
            (0, 10, H),
            (0, 11, H),
            (0, 12, H),
            (0, 13, H),
            (0, 14, H),
            (0, 15, SW),
            (1, 15, NW),
            (1, 14, H),
            (1, 13, H),
            (1, 12, SE),
            (2, 12, NW),
            (2, 11, NE),
            (1, 11, SW),
            (1, 10, H),
            (1, 9, SE),
            (2, 9, NW),
            (2, 8, SE),
            (3, 8, NW),
            (3, 7, SE),
            (4, 7, NW),
            (4, 6, SE),
            (5, 6, NE),
            (5, 7, H),
            (5, 8, NW),
            (4, 8, SE),
            (4, 9, NW),
            (3, 9, SE),
            (3, 10, H),
            (3, 11, H),
            (3, 12, H),
            (3, 13, NW),
            (2, 13, SE),
            (2, 14, H),
            (2, 15, SW),
            (3, 15, NW),
            (3, 14, SE),
            (4, 14, NE),
            (4, 15, SW),
            (5, 15, NW),
            (5, 14, H),
            (5, 13, NE),
            (4, 13, SW),
            (4, 12, H),
            (4, 11, H),
            (4, 10, SE),
            (5, 10, V),
            (6, 10, NE),
            (6, 11, H),
            (6, 12, H),
            (6, 13, H),
            (6, 14, SW),
            (7, 14, NE),
            (7, 15, SW),
            (8, 15, NW),
            (8, 14, H),
            (8, 13, NE),
            (7, 13, SW),
            (7, 12, H),
            (7, 11, H),
            (7, 10, H),
            (7, 9, H),
            (7, 8, H),
            (7, 7, H),
            (7, 6, H),
            (7, 5, NE),
            (6, 5, V),
            (5, 5, V),
            (4, 5, V),
            (3, 5, V),
            (2, 5, SE),
            (2, 6, NW),
            (1, 6, SW),
            (1, 5, H),
            (1, 4, SE),
            (2, 4, V),
            (3, 4, V),
            (4, 4, V),
            (5, 4, V),
            (6, 4, V),
            (7, 4, NW),
            (7, 3, NE),
            (6, 3, SW),
            (6, 2, NE),
            (5, 2, SW),
            (5, 1, NE),
            (4, 1, SW),
            (4, 0, NE),
            (3, 0, SE),
            (3, 1, NW),
            (2, 1, V),
        ],
    )
}

/// Returns every built-in layout, in selection order.
pub fn builtin() -> Vec<TrackLayout> {
    vec![hairpin(), serpentine()]
}
