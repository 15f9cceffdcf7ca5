use super::{SquareOne, SquareOneMove, SLOTS};
use crate::prelude::*;

/// Twistable (top, bottom) corner layouts.
pub const N_SHAPES: usize = 3678;

/// Shape plus parity.
pub const N_SHAPE_COORDS: usize = 2 * N_SHAPES;

const NONE: u16 = u16::MAX;

/// Six-slot half-layer layouts with no corner cut by the half boundary.
fn half_patterns() -> Vec<u16> {
    fn fill(pos: usize, mask: u16, out: &mut Vec<u16>) {
        if pos == 6 {
            out.push(mask);
            return;
        }
        fill(pos + 1, mask, out);
        if pos + 2 <= 6 {
            fill(pos + 2, mask | 0b11 << pos, out);
        }
    }
    let mut out = Vec::new();
    fill(0, 0, &mut out);
    out.sort_unstable();
    out
}

/// Coordinate over the shape of a twistable Square-1 and its parity, with
/// transitions for layer turns and the slash.
pub struct ShapeTables {
    keys: Vec<u32>,
    top_turn: Box<[u16]>,
    bottom_turn: Box<[u16]>,
    slash: Box<[u16]>,
}

impl ShapeTables {
    pub fn new() -> Result<ShapeTables> {
        let start = std::time::Instant::now();
        let halves = half_patterns();
        let mut keys = Vec::with_capacity(N_SHAPES);
        for &tl in &halves {
            for &tr in &halves {
                for &bl in &halves {
                    for &br in &halves {
                        let top = tl | tr << 6;
                        let bottom = bl | br << 6;
                        if top.count_ones() + bottom.count_ones() == 16 {
                            keys.push((top as u32) << 12 | bottom as u32);
                        }
                    }
                }
            }
        }
        keys.sort_unstable();
        if keys.len() != N_SHAPES {
            return Err(ScrambleError::InvalidState {
                coordinate: "square-1 shape count",
                value: keys.len(),
                size: N_SHAPES,
            });
        }

        let mut tables = ShapeTables {
            keys,
            top_turn: vec![NONE; N_SHAPE_COORDS * SLOTS].into_boxed_slice(),
            bottom_turn: vec![NONE; N_SHAPE_COORDS * SLOTS].into_boxed_slice(),
            slash: vec![NONE; N_SHAPE_COORDS].into_boxed_slice(),
        };

        // Parity changes depend only on where pieces sit, so one
        // representative per shape is enough.
        for shape in 0..N_SHAPES {
            let rep = tables.representative(shape);
            let base = rep.parity();
            for k in 0..SLOTS as i32 {
                let top = rep.apply(SquareOneMove::turn(k, 0));
                let bottom = rep.apply(SquareOneMove::turn(0, k));
                for parity in 0..2 {
                    let coord = shape * 2 + parity;
                    let slot = coord * SLOTS + k as usize;
                    if top.is_twistable() {
                        tables.top_turn[slot] = tables.follow(&top, base, parity)? as u16;
                    }
                    if bottom.is_twistable() {
                        tables.bottom_turn[slot] = tables.follow(&bottom, base, parity)? as u16;
                    }
                }
            }
            let slashed = rep.apply(SquareOneMove::Slash);
            for parity in 0..2 {
                tables.slash[shape * 2 + parity] = tables.follow(&slashed, base, parity)? as u16;
            }
        }

        log::debug!("Built square-1 shape tables in {:?}", start.elapsed());
        Ok(tables)
    }

    /// Coordinate of `moved`, reached from a state of parity `from_parity`
    /// whose representative had parity `base`.
    fn follow(&self, moved: &SquareOne, base: bool, from_parity: usize) -> Result<usize> {
        let shape = self.shape_index(moved.shape_key())?;
        let flips = (base != moved.parity()) as usize;
        Ok(shape * 2 + (from_parity ^ flips))
    }

    pub fn shape_index(&self, key: u32) -> Result<usize> {
        self.keys
            .binary_search(&key)
            .map_err(|_| ScrambleError::InvalidState {
                coordinate: "square-1 shape",
                value: key as usize,
                size: N_SHAPES,
            })
    }

    pub fn key(&self, shape: usize) -> u32 {
        self.keys[shape]
    }

    /// `None` when the state cannot be slashed and so has no shape coordinate.
    pub fn coordinate(&self, state: &SquareOne) -> Result<Option<usize>> {
        if !state.is_twistable() {
            return Ok(None);
        }
        let shape = self.shape_index(state.shape_key())?;
        Ok(Some(shape * 2 + state.parity() as usize))
    }

    /// A state of the given shape: corners then edges numbered in reading
    /// order.
    pub fn representative(&self, shape: usize) -> SquareOne {
        let key = self.keys[shape];
        fill_shape(key, &mut (0..8u8), &mut (8..16u8))
    }

    pub fn top_turn(&self, coord: usize, k: usize) -> Option<usize> {
        step(self.top_turn[coord * SLOTS + k])
    }

    pub fn bottom_turn(&self, coord: usize, k: usize) -> Option<usize> {
        step(self.bottom_turn[coord * SLOTS + k])
    }

    pub fn slash(&self, coord: usize) -> usize {
        self.slash[coord] as usize
    }

    /// Every coordinate reachable from `coord` by turning the layers.
    pub fn rotations(&self, coord: usize) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..SLOTS).flat_map(move |a| {
            self.top_turn(coord, a).into_iter().flat_map(move |top| {
                (0..SLOTS).filter_map(move |b| self.bottom_turn(top, b).map(|c| (a, b, c)))
            })
        })
    }

    pub fn fingerprint(&self) -> u32 {
        let words = self.top_turn.iter().chain(self.bottom_turn.iter()).chain(self.slash.iter());
        let bytes: Vec<u8> = words.flat_map(|w| w.to_le_bytes()).collect();
        crc32c::crc32c(&bytes)
    }
}

fn step(entry: u16) -> Option<usize> {
    (entry != NONE).then(|| entry as usize)
}

/// Lays pieces into a shape key, drawing corners and edges in slot order.
pub fn fill_shape(
    key: u32,
    corners: &mut impl Iterator<Item = u8>,
    edges: &mut impl Iterator<Item = u8>,
) -> SquareOne {
    let mut slots = [0u8; 2 * SLOTS];
    for (layer, mask) in [(0, key >> 12), (1, key & 0xfff)] {
        let mut i = 0;
        while i < SLOTS {
            let slot = layer * SLOTS + i;
            if mask & 1 << i != 0 {
                let corner = corners.next().unwrap_or(0);
                slots[slot] = corner;
                slots[slot + 1] = corner;
                i += 2;
            } else {
                slots[slot] = edges.next().unwrap_or(8);
                i += 1;
            }
        }
    }
    SquareOne {
        slots,
        middle_flipped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    lazy_static::lazy_static! {
        static ref SHAPES: ShapeTables = ShapeTables::new().unwrap();
    }

    #[test]
    fn thirteen_half_patterns() {
        assert_eq!(half_patterns().len(), 13);
    }

    #[test]
    fn representatives_are_valid() {
        for shape in 0..N_SHAPES {
            let rep = SHAPES.representative(shape);
            assert!(SquareOne::from_slots(*rep.slots(), false).is_some());
            assert!(rep.is_twistable());
            assert_eq!(SHAPES.shape_index(rep.shape_key()).unwrap(), shape);
        }
    }

    #[test]
    fn solved_has_a_coordinate() {
        let c = SHAPES.coordinate(&SquareOne::solved()).unwrap().unwrap();
        assert_eq!(c % 2, 0);
        assert_eq!(SHAPES.slash(SHAPES.slash(c)), c);
    }

    #[test]
    fn full_turn_is_identity() {
        let c = SHAPES.coordinate(&SquareOne::solved()).unwrap().unwrap();
        assert_eq!(SHAPES.top_turn(c, 0), Some(c));
        assert_eq!(SHAPES.top_turn(c, 2), None);
    }

    #[quickcheck]
    fn tables_follow_real_states(choices: Vec<(u8, u8)>) -> bool {
        let mut state = SquareOne::solved();
        let mut coord = SHAPES.coordinate(&state).unwrap().unwrap();
        for (a, b) in choices {
            let (a, b) = (a as usize % SLOTS, b as usize % SLOTS);
            let turned = state.apply(SquareOneMove::turn(a as i32, b as i32));
            if !turned.is_twistable() {
                continue;
            }
            let via_tables = SHAPES
                .top_turn(coord, a)
                .and_then(|c| SHAPES.bottom_turn(c, b))
                .map(|c| SHAPES.slash(c));
            state = turned.apply(SquareOneMove::Slash);
            coord = SHAPES.coordinate(&state).unwrap().unwrap();
            if via_tables != Some(coord) {
                return false;
            }
        }
        true
    }
}
