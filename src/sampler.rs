//! Uniform random states, and random move walks for the cubes too big to
//! solve.

use crate::prelude::*;
use crate::square_one::{fill_shape, ShapeTables, N_SHAPES};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Same seed text, same stream. No seed draws from the OS.
pub fn rng_for(seed: Option<&str>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(fnv1a(seed.as_bytes())),
        None => StdRng::from_entropy(),
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

/// Random twists summing to 0 mod `modulus`; the last entry takes the slack.
fn orientations(out: &mut [u8], modulus: u8, rng: &mut impl Rng) {
    let Some((last, free)) = out.split_last_mut() else {
        return;
    };
    let mut sum = 0;
    for o in free {
        *o = rng.gen_range(0..modulus);
        sum += *o as u32;
    }
    *last = ((modulus as u32 - sum % modulus as u32) % modulus as u32) as u8;
}

pub fn random_cube(rng: &mut impl Rng) -> CubieCube {
    let mut cube = CubieCube::solved();
    cube.corners.cp.shuffle(rng);
    cube.ep.shuffle(rng);
    if permutation_parity(&cube.corners.cp) != permutation_parity(&cube.ep) {
        cube.ep.swap(10, 11);
    }
    orientations(&mut cube.corners.co, 3, rng);
    orientations(&mut cube.eo, 2, rng);
    cube
}

/// DBL stays home and untwisted.
pub fn random_pocket(rng: &mut impl Rng) -> PocketCube {
    const MOVING: [usize; 7] = [0, 1, 2, 3, 4, 5, 7];

    let mut corners = CornerCube::solved();
    let mut pieces = MOVING.map(|slot| corners.cp[slot]);
    pieces.shuffle(rng);
    let mut twists = [0u8; 7];
    orientations(&mut twists, 3, rng);
    for ((&slot, &piece), &twist) in MOVING.iter().zip(&pieces).zip(&twists) {
        corners.cp[slot] = piece;
        corners.co[slot] = twist;
    }
    PocketCube(corners)
}

/// Uniform shape, then uniform pieces, then a uniform middle layer.
pub fn random_square_one(shapes: &ShapeTables, rng: &mut impl Rng) -> Result<SquareOne> {
    let key = shapes.key(rng.gen_range(0..N_SHAPES));
    let mut corners: Vec<u8> = (0..8).collect();
    let mut edges: Vec<u8> = (8..16).collect();
    corners.shuffle(rng);
    edges.shuffle(rng);

    let laid = fill_shape(key, &mut corners.into_iter(), &mut edges.into_iter());
    SquareOne::from_slots(*laid.slots(), rng.gen()).ok_or(ScrambleError::InvalidState {
        coordinate: "square-1 shape",
        value: key as usize,
        size: N_SHAPES,
    })
}

/// `length` block turns with no slice turned twice in a same-axis run.
pub fn random_walk(size: u8, length: usize, rng: &mut impl Rng) -> Vec<NxnMove> {
    let alphabet: Vec<NxnMove> = NxnMove::all(size).collect();
    let mut walk: Vec<NxnMove> = Vec::with_capacity(length);
    while walk.len() < length {
        let m = alphabet[rng.gen_range(0..alphabet.len())];
        let repeats = walk
            .iter()
            .rev()
            .take_while(|prev| prev.axis() == m.axis())
            .any(|prev| prev.slice() == m.slice());
        if !repeats {
            walk.push(m);
        }
    }
    walk
}
