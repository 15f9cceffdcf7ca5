use crate::prelude::*;

use enum_iterator::Sequence;
use serde::Serialize;

/// Every puzzle the engine can scramble, in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize)]
pub enum PuzzleKind {
    #[serde(rename = "2x2x2")]
    Cube2,
    #[serde(rename = "3x3x3")]
    Cube3,
    #[serde(rename = "4x4x4")]
    Cube4,
    #[serde(rename = "5x5x5")]
    Cube5,
    #[serde(rename = "6x6x6")]
    Cube6,
    #[serde(rename = "7x7x7")]
    Cube7,
    #[serde(rename = "sq1")]
    SquareOne,
}

impl PuzzleKind {
    pub fn all() -> impl Iterator<Item = PuzzleKind> {
        enum_iterator::all()
    }

    pub fn id(self) -> &'static str {
        match self {
            PuzzleKind::Cube2 => "2x2x2",
            PuzzleKind::Cube3 => "3x3x3",
            PuzzleKind::Cube4 => "4x4x4",
            PuzzleKind::Cube5 => "5x5x5",
            PuzzleKind::Cube6 => "6x6x6",
            PuzzleKind::Cube7 => "7x7x7",
            PuzzleKind::SquareOne => "sq1",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PuzzleKind::Cube2 => "2x2x2 Cube",
            PuzzleKind::Cube3 => "3x3x3 Cube",
            PuzzleKind::Cube4 => "4x4x4 Cube",
            PuzzleKind::Cube5 => "5x5x5 Cube",
            PuzzleKind::Cube6 => "6x6x6 Cube",
            PuzzleKind::Cube7 => "7x7x7 Cube",
            PuzzleKind::SquareOne => "Square-1",
        }
    }

    pub fn from_id(id: &str) -> Result<PuzzleKind> {
        PuzzleKind::all()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| ScrambleError::UnknownPuzzle(id.to_string()))
    }

    /// Edge length for cubes.
    pub fn cube_size(self) -> Option<u8> {
        match self {
            PuzzleKind::Cube2 => Some(2),
            PuzzleKind::Cube3 => Some(3),
            PuzzleKind::Cube4 => Some(4),
            PuzzleKind::Cube5 => Some(5),
            PuzzleKind::Cube6 => Some(6),
            PuzzleKind::Cube7 => Some(7),
            PuzzleKind::SquareOne => None,
        }
    }

    /// True for cubes scrambled by a random move walk instead of a solved
    /// random state.
    pub fn is_random_walk(self) -> bool {
        self.cube_size().map_or(false, |n| n >= 4)
    }

    pub fn default_policy(self) -> ScramblePolicy {
        match self {
            PuzzleKind::Cube2 => ScramblePolicy::new(4, 11),
            PuzzleKind::Cube3 => ScramblePolicy::new(2, 21),
            PuzzleKind::Cube4 => ScramblePolicy::new(40, 40),
            PuzzleKind::Cube5 => ScramblePolicy::new(60, 60),
            PuzzleKind::Cube6 => ScramblePolicy::new(80, 80),
            PuzzleKind::Cube7 => ScramblePolicy::new(100, 100),
            PuzzleKind::SquareOne => ScramblePolicy::new(11, 30),
        }
    }
}

impl core::fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleInfo {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceInfo {
    pub name: &'static str,
    /// `#rrggbb`
    pub color: &'static str,
}

/// What a renderer needs to draw a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleGeometry {
    pub puzzle: PuzzleKind,
    pub faces: Vec<FaceInfo>,
    /// Stickers along a cube edge, or slots per Square-1 layer.
    pub grid_size: usize,
    pub sticker_count: usize,
}

const CUBE_COLORS: [(&str, &str); 6] = [
    ("U", "#ffffff"),
    ("R", "#ff0000"),
    ("F", "#00ff00"),
    ("D", "#ffff00"),
    ("L", "#ff8000"),
    ("B", "#0000ff"),
];

/// Yellow top, white bottom.
const SQUARE_ONE_COLORS: [(&str, &str); 6] = [
    ("U", "#ffff00"),
    ("R", "#00ff00"),
    ("F", "#ff0000"),
    ("D", "#ffffff"),
    ("L", "#0000ff"),
    ("B", "#ff8000"),
];

impl PuzzleGeometry {
    pub fn of(kind: PuzzleKind) -> PuzzleGeometry {
        let colors = match kind {
            PuzzleKind::SquareOne => &SQUARE_ONE_COLORS,
            _ => &CUBE_COLORS,
        };
        let faces = colors
            .iter()
            .map(|&(name, color)| FaceInfo { name, color })
            .collect();
        match kind.cube_size() {
            Some(n) => {
                let n = n as usize;
                PuzzleGeometry {
                    puzzle: kind,
                    faces,
                    grid_size: n,
                    sticker_count: 6 * n * n,
                }
            }
            None => PuzzleGeometry {
                puzzle: kind,
                faces,
                grid_size: crate::square_one::SLOTS,
                sticker_count: 2 * crate::square_one::SLOTS,
            },
        }
    }
}

/// Puzzle state after a scramble, for diagrams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StickerView {
    /// One string per face in U R F D L B order, `size * size` face letters
    /// read row by row.
    Cube { size: usize, faces: Vec<String> },
    /// Piece ids per slot, corners `0..8` spanning two slots, edges `8..16`.
    SquareOne {
        top: Vec<u8>,
        bottom: Vec<u8>,
        middle_flipped: bool,
    },
}

impl StickerView {
    pub fn of_cube(cube: &StickerCube) -> StickerView {
        let faces = Face::all()
            .map(|face| cube.face(face).iter().map(|s| s.letter()).collect())
            .collect();
        StickerView::Cube {
            size: cube.size() as usize,
            faces,
        }
    }

    pub fn of_square_one(state: &SquareOne) -> StickerView {
        StickerView::SquareOne {
            top: state.top().to_vec(),
            bottom: state.bottom().to_vec(),
            middle_flipped: state.middle_flipped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_in_order() {
        let ids: Vec<&str> = PuzzleKind::all().map(|k| k.id()).collect();
        assert_eq!(
            ids,
            ["2x2x2", "3x3x3", "4x4x4", "5x5x5", "6x6x6", "7x7x7", "sq1"]
        );
        for kind in PuzzleKind::all() {
            assert_eq!(PuzzleKind::from_id(kind.id()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_id() {
        assert!(matches!(
            PuzzleKind::from_id("not-a-puzzle"),
            Err(ScrambleError::UnknownPuzzle(_))
        ));
    }

    #[test]
    fn serializes_as_id() {
        assert_eq!(serde_json::to_string(&PuzzleKind::SquareOne).unwrap(), "\"sq1\"");
    }

    #[test]
    fn solved_cube_view() {
        let view = StickerView::of_cube(&StickerCube::new(3));
        match view {
            StickerView::Cube { size, faces } => {
                assert_eq!(size, 3);
                assert_eq!(faces[0], "UUUUUUUUU");
                assert_eq!(faces[5], "BBBBBBBBB");
            }
            _ => panic!("expected a cube view"),
        }
    }

    #[test]
    fn geometry_sizes() {
        assert_eq!(PuzzleGeometry::of(PuzzleKind::Cube5).sticker_count, 150);
        assert_eq!(PuzzleGeometry::of(PuzzleKind::SquareOne).grid_size, 12);
    }

    #[test]
    fn square_one_has_its_own_colors() {
        let cube = PuzzleGeometry::of(PuzzleKind::Cube3);
        let sq1 = PuzzleGeometry::of(PuzzleKind::SquareOne);
        assert_eq!(cube.faces[0].color, "#ffffff");
        assert_eq!(sq1.faces[0], FaceInfo { name: "U", color: "#ffff00" });
        assert_eq!(sq1.faces[3].color, "#ffffff");
        assert_ne!(cube.faces, sq1.faces);
    }
}
