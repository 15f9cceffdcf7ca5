use super::cubie::{CORNERS, EDGES};
use crate::prelude::*;

use Face::*;

/// Facelet indices of each corner slot, clockwise starting from the U/D sticker.
/// Facelets are numbered face-major in U R F D L B order, row-major within a face.
const CORNER_FACELETS: [[usize; 3]; CORNERS] = [
    [8, 9, 20],
    [6, 18, 38],
    [0, 36, 47],
    [2, 45, 11],
    [29, 26, 15],
    [27, 44, 24],
    [33, 53, 42],
    [35, 17, 51],
];

const EDGE_FACELETS: [[usize; 2]; EDGES] = [
    [5, 10],
    [7, 19],
    [3, 37],
    [1, 46],
    [32, 16],
    [28, 25],
    [30, 43],
    [34, 52],
    [23, 12],
    [21, 41],
    [50, 39],
    [48, 14],
];

const CORNER_COLORS: [[Face; 3]; CORNERS] = [
    [Up, Right, Front],
    [Up, Front, Left],
    [Up, Left, Back],
    [Up, Back, Right],
    [Down, Front, Right],
    [Down, Left, Front],
    [Down, Back, Left],
    [Down, Right, Back],
];

const EDGE_COLORS: [[Face; 2]; EDGES] = [
    [Up, Right],
    [Up, Front],
    [Up, Left],
    [Up, Back],
    [Down, Right],
    [Down, Front],
    [Down, Left],
    [Down, Back],
    [Front, Right],
    [Front, Left],
    [Back, Left],
    [Back, Right],
];

fn paint_corners(corners: &CornerCube, out: &mut [Face]) {
    for slot in 0..CORNERS {
        let piece = corners.cp[slot] as usize;
        let twist = corners.co[slot] as usize;
        for n in 0..3 {
            out[CORNER_FACELETS[slot][(n + twist) % 3]] = CORNER_COLORS[piece][n];
        }
    }
}

/// The 54 stickers of a 3x3x3, laid out as [`StickerCube`] lays out size 3.
pub fn facelets(cube: &CubieCube) -> Vec<Face> {
    let mut out: Vec<Face> = (0..54).map(|i| Face::from_index(i / 9)).collect();
    paint_corners(&cube.corners, &mut out);
    for slot in 0..EDGES {
        let piece = cube.ep[slot] as usize;
        let flip = cube.eo[slot] as usize;
        for n in 0..2 {
            out[EDGE_FACELETS[slot][(n + flip) % 2]] = EDGE_COLORS[piece][n];
        }
    }
    out
}

/// The 24 stickers of a 2x2x2 whose corners are `corners`.
pub fn corner_facelets(corners: &CornerCube) -> Vec<Face> {
    let mut big = vec![Up; 54];
    paint_corners(corners, &mut big);

    let mut out = vec![Up; 24];
    for (i, sticker) in big.into_iter().enumerate() {
        let (face, row, col) = (i / 9, i % 9 / 3, i % 3);
        if row != 1 && col != 1 {
            out[face * 4 + row / 2 * 2 + col / 2] = sticker;
        }
    }
    out
}
