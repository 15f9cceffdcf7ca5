use crate::prelude::*;

use enum_iterator::Sequence;

/// Faces in the U R F D L B order used by every cube table in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Face {
    Up,
    Right,
    Front,
    Down,
    Left,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Axis {
    UD,
    LR,
    FB,
}

impl Face {
    pub fn all() -> impl Iterator<Item = Face> {
        enum_iterator::all()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Face {
        match index % 6 {
            0 => Face::Up,
            1 => Face::Right,
            2 => Face::Front,
            3 => Face::Down,
            4 => Face::Left,
            _ => Face::Back,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Face::Up | Face::Down => Axis::UD,
            Face::Right | Face::Left => Axis::LR,
            Face::Front | Face::Back => Axis::FB,
        }
    }

    pub fn opposite(self) -> Face {
        Face::from_index(self.index() + 3)
    }

    pub fn same_axis(a: Face, b: Face) -> bool {
        a.axis() == b.axis()
    }

    pub fn letter(self) -> char {
        match self {
            Face::Up => 'U',
            Face::Right => 'R',
            Face::Front => 'F',
            Face::Down => 'D',
            Face::Left => 'L',
            Face::Back => 'B',
        }
    }

    pub fn from_letter(c: char) -> Option<Face> {
        Some(match c {
            'U' | 'u' => Face::Up,
            'R' | 'r' => Face::Right,
            'F' | 'f' => Face::Front,
            'D' | 'd' => Face::Down,
            'L' | 'l' => Face::Left,
            'B' | 'b' => Face::Back,
            _ => return None,
        })
    }
}

impl core::fmt::Display for Face {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Direction {
    Single,
    Double,
    Reverse,
}

impl Direction {
    pub fn quarter_turns(self) -> u8 {
        match self {
            Direction::Single => 1,
            Direction::Double => 2,
            Direction::Reverse => 3,
        }
    }

    pub fn from_quarter_turns(turns: u8) -> Option<Direction> {
        match turns % 4 {
            1 => Some(Direction::Single),
            2 => Some(Direction::Double),
            3 => Some(Direction::Reverse),
            _ => None,
        }
    }

    pub fn inverse(self) -> Direction {
        match self {
            Direction::Single => Direction::Reverse,
            Direction::Double => Direction::Double,
            Direction::Reverse => Direction::Single,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Direction::Single => "",
            Direction::Double => "2",
            Direction::Reverse => "'",
        }
    }

    fn parse(token: &str, rest: &str) -> Result<Direction> {
        match rest {
            "" => Ok(Direction::Single),
            "'" => Ok(Direction::Reverse),
            "2" | "2'" => Ok(Direction::Double),
            other => Err(ScrambleError::invalid_move(
                token,
                format!("unrecognized direction {:?}", other),
            )),
        }
    }
}

/// A face turn of a 2x2x2 or 3x3x3.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub face: Face,
    pub direction: Direction,
}

pub const MOVE_COUNT: usize = 18;

impl Move {
    pub const fn new(face: Face, direction: Direction) -> Move {
        Move { face, direction }
    }

    /// All 18 face turns, face-major: U U2 U' R R2 R' ...
    pub fn all() -> impl Iterator<Item = Move> {
        (0..MOVE_COUNT).map(Move::from_index)
    }

    pub fn index(self) -> usize {
        self.face.index() * 3 + self.direction.quarter_turns() as usize - 1
    }

    pub fn from_index(index: usize) -> Move {
        let direction = match index % 3 {
            0 => Direction::Single,
            1 => Direction::Double,
            _ => Direction::Reverse,
        };
        Move::new(Face::from_index(index / 3), direction)
    }

    pub fn inverse(self) -> Move {
        Move::new(self.face, self.direction.inverse())
    }

    /// Search-time ordering: never the same face twice, and opposite faces only
    /// in U-before-D (R-before-L, F-before-B) order.
    pub fn could_follow(&self, previous: &Move) -> bool {
        if self.face == previous.face {
            return false;
        }
        !(Face::same_axis(self.face, previous.face) && self.face.index() < previous.face.index())
    }

    pub fn parse_sequence(s: &str) -> Result<Vec<Move>> {
        s.split_whitespace().map(|s| s.parse()).collect()
    }
}

impl core::str::FromStr for Move {
    type Err = ScrambleError;

    fn from_str(s: &str) -> Result<Move> {
        let mut chars = s.chars();
        let face_char = match chars.next() {
            Some(c) => c,
            None => return Err(ScrambleError::invalid_move(s, "no face for move")),
        };

        let face = match Face::from_letter(face_char) {
            Some(face) => face,
            None => {
                return Err(ScrambleError::invalid_move(
                    s,
                    format!("unrecognized face {}", face_char),
                ))
            }
        };

        let direction = Direction::parse(s, chars.as_str())?;
        Ok(Move { face, direction })
    }
}

impl core::fmt::Display for Move {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}{}", self.face, self.direction.suffix())
    }
}

/// A turn of one block of layers about one of the three cube axes.
///
/// Moves on the same axis commute, so a run of them is canonical as long as
/// no block of layers appears twice in it.
pub trait AxialMove: Copy + Eq {
    fn axis(&self) -> Axis;

    /// The block of layers turned: outer face plus depth.
    fn slice(&self) -> (Face, u8);

    fn quarter_turns(&self) -> u8;

    /// The same slice turned by `turns` quarter turns, or `None` for zero.
    fn with_quarter_turns(&self, turns: u8) -> Option<Self>;
}

impl AxialMove for Move {
    fn axis(&self) -> Axis {
        self.face.axis()
    }

    fn slice(&self) -> (Face, u8) {
        (self.face, 1)
    }

    fn quarter_turns(&self) -> u8 {
        self.direction.quarter_turns()
    }

    fn with_quarter_turns(&self, turns: u8) -> Option<Self> {
        Direction::from_quarter_turns(turns).map(|direction| Move::new(self.face, direction))
    }
}

/// Merges and cancels turns of the same slice inside each same-axis run.
pub fn canonicalize<M: AxialMove>(moves: impl IntoIterator<Item = M>) -> Vec<M> {
    let mut out: Vec<M> = Vec::new();
    'moves: for m in moves {
        let mut i = out.len();
        while i > 0 && out[i - 1].axis() == m.axis() {
            i -= 1;
            if out[i].slice() == m.slice() {
                let turns = (out[i].quarter_turns() + m.quarter_turns()) % 4;
                match out[i].with_quarter_turns(turns) {
                    Some(merged) => out[i] = merged,
                    None => {
                        out.remove(i);
                    }
                }
                continue 'moves;
            }
        }
        out.push(m);
    }
    out
}

/// No slice is turned twice inside any run of same-axis moves.
pub fn is_canonical<M: AxialMove>(moves: &[M]) -> bool {
    moves.iter().enumerate().all(|(i, m)| {
        moves[..i]
            .iter()
            .rev()
            .take_while(|prev| prev.axis() == m.axis())
            .all(|prev| prev.slice() != m.slice())
    })
}
