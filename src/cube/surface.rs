use crate::prelude::*;

/// A block turn on an NxNxN: the outer `width` layers below `face`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NxnMove {
    pub face: Face,
    pub width: u8,
    pub direction: Direction,
}

impl NxnMove {
    pub fn new(face: Face, width: u8, direction: Direction) -> NxnMove {
        NxnMove {
            face,
            width,
            direction,
        }
    }

    /// Every block turn that leaves the cube's orientation alone on a `size`
    /// cube, widths up to half the cube. On even cubes a half-width D, L or B
    /// turn is the U, R or F one followed by a rotation, so only the latter
    /// are listed.
    pub fn all(size: u8) -> impl Iterator<Item = NxnMove> {
        let half = size / 2;
        let widths = 1..=half.max(1);
        widths
            .flat_map(|width| Move::all().map(move |m| NxnMove::new(m.face, width, m.direction)))
            .filter(move |m| !(size % 2 == 0 && m.width == half && m.face.index() >= 3))
    }
}

impl From<Move> for NxnMove {
    fn from(m: Move) -> NxnMove {
        NxnMove::new(m.face, 1, m.direction)
    }
}

impl AxialMove for NxnMove {
    fn axis(&self) -> Axis {
        self.face.axis()
    }

    fn slice(&self) -> (Face, u8) {
        (self.face, self.width)
    }

    fn quarter_turns(&self) -> u8 {
        self.direction.quarter_turns()
    }

    fn with_quarter_turns(&self, turns: u8) -> Option<NxnMove> {
        Direction::from_quarter_turns(turns).map(|d| NxnMove::new(self.face, self.width, d))
    }
}

impl PuzzleMove for NxnMove {
    fn inverse(&self) -> NxnMove {
        NxnMove::new(self.face, self.width, self.direction.inverse())
    }
}

impl core::fmt::Display for NxnMove {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let m = Move::new(self.face, self.direction);
        match self.width {
            1 => write!(f, "{}", m),
            2 => write!(f, "{}w{}", self.face, &m.to_string()[1..]),
            w => write!(f, "{}{}w{}", w, self.face, &m.to_string()[1..]),
        }
    }
}

impl core::str::FromStr for NxnMove {
    type Err = ScrambleError;

    fn from_str(s: &str) -> Result<NxnMove> {
        let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
        let explicit_width = if digits > 0 {
            Some(
                s[..digits]
                    .parse::<u8>()
                    .map_err(|_| ScrambleError::invalid_move(s, "width out of range"))?,
            )
        } else {
            None
        };

        let rest = &s[digits..];
        let (face_part, wide, suffix) = match rest.char_indices().nth(1) {
            Some((i, 'w')) => (&rest[..i], true, &rest[i + 1..]),
            Some((i, _)) => (&rest[..i], false, &rest[i..]),
            None => (rest, false, ""),
        };

        let width = match (explicit_width, wide) {
            (None, false) => 1,
            (None, true) => 2,
            (Some(w), true) if w >= 2 => w,
            (Some(_), _) => return Err(ScrambleError::invalid_move(s, "bad block width")),
        };

        let base: Move = format!("{}{}", face_part, suffix)
            .parse()
            .map_err(|_| ScrambleError::invalid_move(s, "not a block turn"))?;
        Ok(NxnMove::new(base.face, width, base.direction))
    }
}

/// Sticker-level NxNxN. Stickers are stored face-major in U R F D L B order,
/// row-major within each face as seen from outside with U above F and F
/// below U for the side faces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StickerCube {
    size: u8,
    stickers: Vec<Face>,
}

impl StickerCube {
    pub fn new(size: u8) -> StickerCube {
        let per_face = size as usize * size as usize;
        StickerCube {
            size,
            stickers: (0..6 * per_face)
                .map(|i| Face::from_index(i / per_face))
                .collect(),
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn stickers(&self) -> &[Face] {
        &self.stickers
    }

    pub fn face(&self, face: Face) -> &[Face] {
        let per_face = self.size as usize * self.size as usize;
        &self.stickers[face.index() * per_face..(face.index() + 1) * per_face]
    }

    pub fn is_solved(&self) -> bool {
        *self == StickerCube::new(self.size)
    }

    /// A block turn is legal unless it would move the whole cube.
    pub fn is_legal(&self, m: &NxnMove) -> bool {
        m.width >= 1 && m.width < self.size.max(2)
    }

    pub fn apply(self, m: NxnMove) -> StickerCube {
        let n = self.size as i32;
        let threshold = n + 1 - 2 * m.width as i32;

        let mut out = self.stickers.clone();
        for (i, &sticker) in self.stickers.iter().enumerate() {
            let mut pos = position(n, i);
            if depth(m.face, pos) < threshold {
                continue;
            }
            for _ in 0..m.direction.quarter_turns() {
                pos = quarter_turn(m.face, pos);
            }
            out[index(n, pos)] = sticker;
        }

        StickerCube {
            size: self.size,
            stickers: out,
        }
    }

    pub fn apply_all(self, moves: impl IntoIterator<Item = NxnMove>) -> StickerCube {
        moves.into_iter().fold(self, |cube, m| cube.apply(m))
    }
}

// Sticker centres live on a doubled grid: face planes at +-n, rows and
// columns at odd offsets in -(n-1)..=(n-1).

fn offset(n: i32, i: i32) -> i32 {
    2 * i - (n - 1)
}

fn unoffset(n: i32, k: i32) -> usize {
    ((k + n - 1) / 2) as usize
}

fn position(n: i32, i: usize) -> [i32; 3] {
    let per_face = (n * n) as usize;
    let face = Face::from_index(i / per_face);
    let row = offset(n, ((i % per_face) / n as usize) as i32);
    let col = offset(n, (i % n as usize) as i32);
    match face {
        Face::Up => [col, n, row],
        Face::Down => [col, -n, -row],
        Face::Front => [col, -row, n],
        Face::Back => [-col, -row, -n],
        Face::Right => [n, -row, -col],
        Face::Left => [-n, -row, col],
    }
}

fn index(n: i32, [x, y, z]: [i32; 3]) -> usize {
    let (face, row, col) = if y == n {
        (Face::Up, z, x)
    } else if y == -n {
        (Face::Down, -z, x)
    } else if z == n {
        (Face::Front, -y, x)
    } else if z == -n {
        (Face::Back, -y, -x)
    } else if x == n {
        (Face::Right, -y, -z)
    } else {
        (Face::Left, -y, z)
    };
    face.index() * (n * n) as usize + unoffset(n, row) * n as usize + unoffset(n, col)
}

fn depth(face: Face, [x, y, z]: [i32; 3]) -> i32 {
    match face {
        Face::Up => y,
        Face::Down => -y,
        Face::Right => x,
        Face::Left => -x,
        Face::Front => z,
        Face::Back => -z,
    }
}

/// Clockwise as seen looking at `face`.
fn quarter_turn(face: Face, [x, y, z]: [i32; 3]) -> [i32; 3] {
    match face {
        Face::Right => [x, z, -y],
        Face::Left => [x, -z, y],
        Face::Up => [-z, y, x],
        Face::Down => [z, y, -x],
        Face::Front => [y, -x, z],
        Face::Back => [-y, x, z],
    }
}
