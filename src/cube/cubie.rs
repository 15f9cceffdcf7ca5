use crate::prelude::*;

pub const CORNERS: usize = 8;
pub const EDGES: usize = 12;

// Corner slots.
pub const URF: u8 = 0;
pub const UFL: u8 = 1;
pub const ULB: u8 = 2;
pub const UBR: u8 = 3;
pub const DFR: u8 = 4;
pub const DLF: u8 = 5;
pub const DBL: u8 = 6;
pub const DRB: u8 = 7;

// Edge slots.
pub const UR: u8 = 0;
pub const UF: u8 = 1;
pub const UL: u8 = 2;
pub const UB: u8 = 3;
pub const DR: u8 = 4;
pub const DF: u8 = 5;
pub const DL: u8 = 6;
pub const DB: u8 = 7;
pub const FR: u8 = 8;
pub const FL: u8 = 9;
pub const BL: u8 = 10;
pub const BR: u8 = 11;

/// Corner half of a cube: `cp[slot]` is the corner sitting in `slot`,
/// `co[slot]` its clockwise twist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CornerCube {
    pub cp: [u8; CORNERS],
    pub co: [u8; CORNERS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubieCube {
    pub corners: CornerCube,
    pub ep: [u8; EDGES],
    pub eo: [u8; EDGES],
}

const SOLVED_CORNERS: CornerCube = CornerCube {
    cp: [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB],
    co: [0; CORNERS],
};

const SOLVED: CubieCube = CubieCube {
    corners: SOLVED_CORNERS,
    ep: [UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR],
    eo: [0; EDGES],
};

/// Clockwise quarter turn of each face, U R F D L B, in replaced-by form.
const QUARTER_TURNS: [CubieCube; 6] = [
    CubieCube {
        corners: CornerCube {
            cp: [UBR, URF, UFL, ULB, DFR, DLF, DBL, DRB],
            co: [0; CORNERS],
        },
        ep: [UB, UR, UF, UL, DR, DF, DL, DB, FR, FL, BL, BR],
        eo: [0; EDGES],
    },
    CubieCube {
        corners: CornerCube {
            cp: [DFR, UFL, ULB, URF, DRB, DLF, DBL, UBR],
            co: [2, 0, 0, 1, 1, 0, 0, 2],
        },
        ep: [FR, UF, UL, UB, BR, DF, DL, DB, DR, FL, BL, UR],
        eo: [0; EDGES],
    },
    CubieCube {
        corners: CornerCube {
            cp: [UFL, DLF, ULB, UBR, URF, DFR, DBL, DRB],
            co: [1, 2, 0, 0, 2, 1, 0, 0],
        },
        ep: [UR, FL, UL, UB, DR, FR, DL, DB, UF, DF, BL, BR],
        eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    CubieCube {
        corners: CornerCube {
            cp: [URF, UFL, ULB, UBR, DLF, DBL, DRB, DFR],
            co: [0; CORNERS],
        },
        ep: [UR, UF, UL, UB, DF, DL, DB, DR, FR, FL, BL, BR],
        eo: [0; EDGES],
    },
    CubieCube {
        corners: CornerCube {
            cp: [URF, ULB, DBL, UBR, DFR, UFL, DLF, DRB],
            co: [0, 1, 2, 0, 0, 2, 1, 0],
        },
        ep: [UR, UF, BL, UB, DR, DF, FL, DB, FR, UL, DL, BR],
        eo: [0; EDGES],
    },
    CubieCube {
        corners: CornerCube {
            cp: [URF, UFL, UBR, DRB, DFR, DLF, ULB, DBL],
            co: [0, 0, 1, 2, 0, 0, 2, 1],
        },
        ep: [UR, UF, UL, BR, DR, DF, DL, BL, FR, FL, UB, DB],
        eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];

impl CornerCube {
    pub fn solved() -> CornerCube {
        SOLVED_CORNERS
    }

    /// `self` followed by `other`.
    pub fn multiply(&self, other: &CornerCube) -> CornerCube {
        let mut out = CornerCube::solved();
        for c in 0..CORNERS {
            let from = other.cp[c] as usize;
            out.cp[c] = self.cp[from];
            out.co[c] = (self.co[from] + other.co[c]) % 3;
        }
        out
    }

    pub fn inverse(&self) -> CornerCube {
        let mut out = CornerCube::solved();
        for c in 0..CORNERS {
            out.cp[self.cp[c] as usize] = c as u8;
        }
        for c in 0..CORNERS {
            out.co[c] = (3 - self.co[out.cp[c] as usize]) % 3;
        }
        out
    }

    pub fn parity(&self) -> bool {
        permutation_parity(&self.cp)
    }

    /// Every corner exactly once, twists summing to zero mod 3.
    pub fn is_valid(&self) -> bool {
        is_permutation(&self.cp)
            && self.co.iter().all(|&o| o < 3)
            && self.co.iter().map(|&o| o as u32).sum::<u32>() % 3 == 0
    }
}

impl CubieCube {
    pub fn multiply(&self, other: &CubieCube) -> CubieCube {
        let mut out = CubieCube {
            corners: self.corners.multiply(&other.corners),
            ..SOLVED
        };
        for e in 0..EDGES {
            let from = other.ep[e] as usize;
            out.ep[e] = self.ep[from];
            out.eo[e] = (self.eo[from] + other.eo[e]) % 2;
        }
        out
    }

    pub fn inverse(&self) -> CubieCube {
        let mut out = CubieCube {
            corners: self.corners.inverse(),
            ..SOLVED
        };
        for e in 0..EDGES {
            out.ep[self.ep[e] as usize] = e as u8;
        }
        for e in 0..EDGES {
            out.eo[e] = self.eo[out.ep[e] as usize];
        }
        out
    }

    /// The cube reached from solved by `move_`.
    pub fn of_move(move_: Move) -> CubieCube {
        let quarter = &QUARTER_TURNS[move_.face.index()];
        (0..move_.direction.quarter_turns()).fold(SOLVED, |c, _| c.multiply(quarter))
    }

    pub fn edge_parity(&self) -> bool {
        permutation_parity(&self.ep)
    }

    /// A cube reachable by face turns: consistent permutations, orientation
    /// sums and permutation parities.
    pub fn is_valid(&self) -> bool {
        self.corners.is_valid()
            && is_permutation(&self.ep)
            && self.eo.iter().all(|&o| o < 2)
            && self.eo.iter().map(|&o| o as u32).sum::<u32>() % 2 == 0
            && self.corners.parity() == self.edge_parity()
    }
}

impl super::PuzzleState for CubieCube {
    type Move = Move;

    fn solved() -> CubieCube {
        SOLVED
    }

    fn apply(self, move_: Move) -> CubieCube {
        self.multiply(&CubieCube::of_move(move_))
    }
}

/// True when `perm` is an odd permutation.
pub fn permutation_parity(perm: &[u8]) -> bool {
    let mut inversions = 0;
    for i in 0..perm.len() {
        for j in i + 1..perm.len() {
            if perm[j] < perm[i] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 1
}

fn is_permutation(perm: &[u8]) -> bool {
    let mut seen = 0u32;
    for &p in perm {
        if p as usize >= perm.len() || seen & (1 << p) != 0 {
            return false;
        }
        seen |= 1 << p;
    }
    true
}
