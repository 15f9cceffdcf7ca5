//! Kociemba-style coordinates: dense integer indices of partial cube state,
//! and the move tables that step them without touching cubies.

use super::cubie::{CORNERS, EDGES, FR};
use crate::prelude::*;

pub const N_TWIST: usize = 2187;
pub const N_FLIP: usize = 2048;
pub const N_SLICE: usize = 495;
pub const N_CORNER_PERM: usize = 40320;
pub const N_UD_EDGE_PERM: usize = 40320;
pub const N_SLICE_PERM: usize = 24;

pub const N_POCKET_PERM: usize = 5040;
pub const N_POCKET_TWIST: usize = 729;

/// Corner slots of a 2x2x2 other than the fixed DBL.
const POCKET_SLOTS: [usize; 7] = [0, 1, 2, 3, 4, 5, 7];

fn check(coordinate: &'static str, value: usize, size: usize) -> Result<()> {
    if value < size {
        Ok(())
    } else {
        Err(ScrambleError::InvalidState {
            coordinate,
            value,
            size,
        })
    }
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Lehmer rank of a sequence of distinct values, by relative order.
pub fn rank_permutation(perm: &[u8]) -> usize {
    let n = perm.len();
    (0..n).fold(0, |rank, i| {
        let smaller_after = perm[i + 1..].iter().filter(|&&p| p < perm[i]).count();
        rank + smaller_after * factorial(n - 1 - i)
    })
}

/// Inverse of [`rank_permutation`], writing a permutation of `0..out.len()`.
pub fn unrank_permutation(mut rank: usize, out: &mut [u8]) {
    let n = out.len();
    let mut available: Vec<u8> = (0..n as u8).collect();
    for (i, slot) in out.iter_mut().enumerate() {
        let f = factorial(n - 1 - i);
        *slot = available.remove(rank / f);
        rank %= f;
    }
}

/// Twist of the first seven corners in base 3; the eighth is implied.
pub fn twist(c: &CornerCube) -> usize {
    c.co[..CORNERS - 1]
        .iter()
        .fold(0, |v, &o| v * 3 + o as usize)
}

pub fn set_twist(c: &mut CornerCube, value: usize) -> Result<()> {
    check("twist", value, N_TWIST)?;
    let mut rest = value;
    let mut sum = 0;
    for slot in (0..CORNERS - 1).rev() {
        c.co[slot] = (rest % 3) as u8;
        sum += rest % 3;
        rest /= 3;
    }
    c.co[CORNERS - 1] = ((3 - sum % 3) % 3) as u8;
    Ok(())
}

pub fn flip(c: &CubieCube) -> usize {
    c.eo[..EDGES - 1]
        .iter()
        .fold(0, |v, &o| v * 2 + o as usize)
}

pub fn set_flip(c: &mut CubieCube, value: usize) -> Result<()> {
    check("flip", value, N_FLIP)?;
    let mut rest = value;
    let mut sum = 0;
    for slot in (0..EDGES - 1).rev() {
        c.eo[slot] = (rest % 2) as u8;
        sum += rest % 2;
        rest /= 2;
    }
    c.eo[EDGES - 1] = (sum % 2) as u8;
    Ok(())
}

fn is_slice_edge(e: u8) -> bool {
    e >= FR
}

/// Which four slots hold the FR FL BL BR edges, ignoring their order.
/// Zero when they are home.
pub fn slice(c: &CubieCube) -> usize {
    let mut k = 0;
    let mut value = 0;
    // Counting slots from BR backwards makes the solved cube rank zero.
    for q in 0..EDGES {
        if is_slice_edge(c.ep[EDGES - 1 - q]) {
            k += 1;
            value += binomial(q, k);
        }
    }
    value
}

pub fn set_slice(c: &mut CubieCube, value: usize) -> Result<()> {
    check("slice", value, N_SLICE)?;
    let mut rest = value;
    let mut occupied = [false; EDGES];
    for k in (1..=4).rev() {
        let mut q = k - 1;
        while binomial(q + 1, k) <= rest {
            q += 1;
        }
        rest -= binomial(q, k);
        occupied[EDGES - 1 - q] = true;
    }

    let (mut slice_edge, mut other_edge) = (FR, 0);
    for (slot, &is_slice) in occupied.iter().enumerate() {
        if is_slice {
            c.ep[slot] = slice_edge;
            slice_edge += 1;
        } else {
            c.ep[slot] = other_edge;
            other_edge += 1;
        }
    }
    Ok(())
}

pub fn corner_perm(c: &CornerCube) -> usize {
    rank_permutation(&c.cp)
}

pub fn set_corner_perm(c: &mut CornerCube, value: usize) -> Result<()> {
    check("corner permutation", value, N_CORNER_PERM)?;
    unrank_permutation(value, &mut c.cp);
    Ok(())
}

/// Permutation of the eight U and D edges. Only meaningful once they are
/// all in the U and D layers.
pub fn ud_edge_perm(c: &CubieCube) -> usize {
    rank_permutation(&c.ep[..8])
}

pub fn set_ud_edge_perm(c: &mut CubieCube, value: usize) -> Result<()> {
    check("U/D edge permutation", value, N_UD_EDGE_PERM)?;
    unrank_permutation(value, &mut c.ep[..8]);
    Ok(())
}

/// Permutation of the four slice edges within the slice.
pub fn slice_perm(c: &CubieCube) -> usize {
    rank_permutation(&c.ep[8..])
}

pub fn set_slice_perm(c: &mut CubieCube, value: usize) -> Result<()> {
    check("slice permutation", value, N_SLICE_PERM)?;
    unrank_permutation(value, &mut c.ep[8..]);
    for e in &mut c.ep[8..] {
        *e += FR;
    }
    Ok(())
}

pub fn pocket_perm(c: &CornerCube) -> usize {
    let pieces: Vec<u8> = POCKET_SLOTS.iter().map(|&s| c.cp[s]).collect();
    rank_permutation(&pieces)
}

pub fn set_pocket_perm(c: &mut CornerCube, value: usize) -> Result<()> {
    check("2x2x2 permutation", value, N_POCKET_PERM)?;
    let mut relative = [0u8; 7];
    unrank_permutation(value, &mut relative);
    for (&slot, &r) in POCKET_SLOTS.iter().zip(&relative) {
        c.cp[slot] = POCKET_SLOTS[r as usize] as u8;
    }
    c.cp[6] = 6;
    Ok(())
}

/// Twist of URF..DLF; DBL is untwisted and DRB implied.
pub fn pocket_twist(c: &CornerCube) -> usize {
    c.co[..6].iter().fold(0, |v, &o| v * 3 + o as usize)
}

pub fn set_pocket_twist(c: &mut CornerCube, value: usize) -> Result<()> {
    check("2x2x2 twist", value, N_POCKET_TWIST)?;
    let mut rest = value;
    let mut sum = 0;
    for slot in (0..6).rev() {
        c.co[slot] = (rest % 3) as u8;
        sum += rest % 3;
        rest /= 3;
    }
    c.co[6] = 0;
    c.co[7] = ((3 - sum % 3) % 3) as u8;
    Ok(())
}

/// `table[coord * moves + m]` is the coordinate after move `m`.
pub struct MoveTable {
    name: &'static str,
    moves: usize,
    table: Box<[u16]>,
}

impl MoveTable {
    /// Steps every coordinate value through every move. `step` decodes,
    /// turns and re-encodes; a decode failure aborts the build.
    pub fn build<M: Copy>(
        name: &'static str,
        size: usize,
        moves: &[M],
        step: impl Fn(usize, M) -> Result<usize>,
    ) -> Result<MoveTable> {
        let start = std::time::Instant::now();
        log::debug!("Populating move table {}", name);

        let mut table = Vec::with_capacity(size * moves.len());
        for coord in 0..size {
            for &m in moves {
                let next = step(coord, m)?;
                check(name, next, size)?;
                table.push(next as u16);
            }
        }

        log::debug!(
            "Finished populating move table {}, took {:?}",
            name,
            start.elapsed()
        );
        Ok(MoveTable {
            name,
            moves: moves.len(),
            table: table.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn get(&self, coord: usize, move_index: usize) -> usize {
        self.table[coord * self.moves + move_index] as usize
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.table.len() / self.moves
    }

    /// Folds the table into a running CRC-32C.
    pub fn fingerprint(&self, crc: u32) -> u32 {
        let bytes: Vec<u8> = self.table.iter().flat_map(|v| v.to_le_bytes()).collect();
        crc32c::crc32c_append(crc, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solved_coordinates_are_zero() {
        let c = CubieCube::solved();
        assert_eq!(twist(&c.corners), 0);
        assert_eq!(flip(&c), 0);
        assert_eq!(slice(&c), 0);
        assert_eq!(corner_perm(&c.corners), 0);
        assert_eq!(ud_edge_perm(&c), 0);
        assert_eq!(slice_perm(&c), 0);
        assert_eq!(pocket_perm(&c.corners), 0);
        assert_eq!(pocket_twist(&c.corners), 0);
    }

    #[test]
    fn binomials() {
        assert_eq!(binomial(12, 4), N_SLICE);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(5, 0), 1);
    }

    #[test]
    fn out_of_range_is_invalid_state() {
        let mut c = CubieCube::solved();
        assert!(matches!(
            set_flip(&mut c, N_FLIP),
            Err(ScrambleError::InvalidState { size: N_FLIP, .. })
        ));
        assert!(set_slice(&mut c, 9999).is_err());
    }

    #[test]
    fn twist_round_trips() {
        for v in 0..N_TWIST {
            let mut c = CornerCube::solved();
            set_twist(&mut c, v).unwrap();
            assert!(c.is_valid());
            assert_eq!(twist(&c), v);
        }
    }

    #[test]
    fn flip_round_trips() {
        for v in 0..N_FLIP {
            let mut c = CubieCube::solved();
            set_flip(&mut c, v).unwrap();
            assert_eq!(flip(&c), v);
        }
    }

    #[test]
    fn slice_round_trips() {
        for v in 0..N_SLICE {
            let mut c = CubieCube::solved();
            set_slice(&mut c, v).unwrap();
            assert_eq!(c.ep.iter().filter(|&&e| e >= FR).count(), 4);
            assert_eq!(slice(&c), v);
        }
    }

    #[test]
    fn permutations_round_trip() {
        for v in (0..N_CORNER_PERM).step_by(37) {
            let mut c = CornerCube::solved();
            set_corner_perm(&mut c, v).unwrap();
            assert_eq!(corner_perm(&c), v);
        }
        for v in 0..N_SLICE_PERM {
            let mut c = CubieCube::solved();
            set_slice_perm(&mut c, v).unwrap();
            assert_eq!(slice_perm(&c), v);
        }
        for v in 0..N_POCKET_PERM {
            let mut c = CornerCube::solved();
            set_pocket_perm(&mut c, v).unwrap();
            assert_eq!(pocket_perm(&c), v);
        }
    }

    #[test]
    fn pocket_twist_round_trips() {
        for v in 0..N_POCKET_TWIST {
            let mut c = CornerCube::solved();
            set_pocket_twist(&mut c, v).unwrap();
            assert!(c.is_valid());
            assert_eq!(pocket_twist(&c), v);
        }
    }

    #[test]
    fn u_and_d_keep_the_slice() {
        assert_eq!(slice(&cube_with_moves("U D' U2")), 0);
        assert_ne!(slice(&cube_with_moves("R")), 0);
    }

    #[test]
    fn flip_only_changes_on_front_and_back() {
        assert_eq!(flip(&cube_with_moves("U R D L U2 R2")), 0);
        assert_ne!(flip(&cube_with_moves("F")), 0);
        assert_ne!(flip(&cube_with_moves("B'")), 0);
    }

    #[test]
    fn twist_move_table_matches_cubies() {
        let moves: Vec<Move> = Move::all().collect();
        let table = MoveTable::build("twist", N_TWIST, &moves, |v, m| {
            let mut c = CubieCube::solved();
            set_twist(&mut c.corners, v)?;
            Ok(twist(&c.apply(m).corners))
        })
        .unwrap();

        let cube = cube_with_moves("R U F' D2 L B");
        for (i, m) in moves.iter().enumerate() {
            assert_eq!(
                table.get(twist(&cube.corners), i),
                twist(&cube.apply(*m).corners)
            );
        }
    }

    #[quickcheck]
    fn coordinates_stay_in_range(moves: Vec<Move>) -> bool {
        let c = CubieCube::solved().apply_all(moves);
        twist(&c.corners) < N_TWIST
            && flip(&c) < N_FLIP
            && slice(&c) < N_SLICE
            && corner_perm(&c.corners) < N_CORNER_PERM
    }
}
