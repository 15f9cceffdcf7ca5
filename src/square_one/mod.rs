//! Square-1 state model.
//!
//! Each layer has twelve 30-degree slots, top slots 0..12 then bottom slots
//! 12..24. Corners (ids 0..8) fill two adjacent slots, edges (ids 8..16) one.
//! The slash swaps top slots 0..6 with bottom slots 0..6 and flips the
//! middle layer; it is only possible when no corner straddles either cut.

use crate::prelude::*;

mod shape;
pub use shape::*;

pub const SLOTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SquareOne {
    slots: [u8; 2 * SLOTS],
    middle_flipped: bool,
}

const SOLVED: SquareOne = SquareOne {
    slots: [
        0, 0, 8, 1, 1, 9, 2, 2, 10, 3, 3, 11, // top
        12, 4, 4, 13, 5, 5, 14, 6, 6, 15, 7, 7, // bottom
    ],
    middle_flipped: false,
};

pub fn is_corner(piece: u8) -> bool {
    piece < 8
}

impl SquareOne {
    /// Checked constructor: every corner fills two adjacent slots of one
    /// layer and every edge one slot.
    pub fn from_slots(slots: [u8; 2 * SLOTS], middle_flipped: bool) -> Option<SquareOne> {
        let state = SquareOne {
            slots,
            middle_flipped,
        };
        state.is_valid().then(|| state)
    }

    pub fn slots(&self) -> &[u8; 2 * SLOTS] {
        &self.slots
    }

    pub fn top(&self) -> &[u8] {
        &self.slots[..SLOTS]
    }

    pub fn bottom(&self) -> &[u8] {
        &self.slots[SLOTS..]
    }

    pub fn middle_flipped(&self) -> bool {
        self.middle_flipped
    }

    fn layer(&self, layer: usize) -> &[u8] {
        &self.slots[layer * SLOTS..(layer + 1) * SLOTS]
    }

    pub fn is_valid(&self) -> bool {
        let mut counts = [0u8; 16];
        for &p in &self.slots {
            match counts.get_mut(p as usize) {
                Some(c) => *c += 1,
                None => return false,
            }
        }
        let counts_ok = counts
            .iter()
            .enumerate()
            .all(|(p, &c)| c == if is_corner(p as u8) { 2 } else { 1 });

        counts_ok
            && (0..2).all(|layer| {
                let l = self.layer(layer);
                (0..SLOTS).all(|i| {
                    !is_corner(l[i]) || l[(i + 1) % SLOTS] == l[i] || l[(i + SLOTS - 1) % SLOTS] == l[i]
                })
            })
    }

    /// Bit `i` set when slot `i` of the layer holds (half) a corner.
    pub fn layer_mask(&self, layer: usize) -> u16 {
        self.layer(layer)
            .iter()
            .enumerate()
            .filter(|(_, p)| is_corner(**p))
            .fold(0, |mask, (i, _)| mask | 1 << i)
    }

    pub fn shape_key(&self) -> u32 {
        (self.layer_mask(0) as u32) << 12 | self.layer_mask(1) as u32
    }

    pub fn is_twistable(&self) -> bool {
        (0..2).all(|layer| {
            let l = self.layer(layer);
            l[SLOTS - 1] != l[0] && l[5] != l[6]
        })
    }

    /// Parity of the 16 pieces read top then bottom, slot order, each corner
    /// once. Only meaningful for twistable states.
    pub fn parity(&self) -> bool {
        let mut pieces = Vec::with_capacity(16);
        for layer in 0..2 {
            let l = self.layer(layer);
            for i in 0..SLOTS {
                if i == 0 || l[i] != l[i - 1] {
                    pieces.push(l[i]);
                }
            }
        }
        crate::cube::permutation_parity(&pieces)
    }

    fn turn(&self, top: i8, bottom: i8) -> SquareOne {
        let mut out = *self;
        for (layer, amount) in [(0, top), (1, bottom)] {
            let k = amount.rem_euclid(SLOTS as i8) as usize;
            for i in 0..SLOTS {
                out.slots[layer * SLOTS + (i + k) % SLOTS] = self.slots[layer * SLOTS + i];
            }
        }
        out
    }

    fn slash(&self) -> SquareOne {
        let mut out = *self;
        for i in 0..SLOTS / 2 {
            out.slots.swap(i, SLOTS + i);
        }
        out.middle_flipped = !self.middle_flipped;
        out
    }
}

impl PuzzleState for SquareOne {
    type Move = SquareOneMove;

    fn solved() -> SquareOne {
        SOLVED
    }

    fn apply(self, move_: SquareOneMove) -> SquareOne {
        match move_ {
            SquareOneMove::Turn { top, bottom } => self.turn(top, bottom),
            SquareOneMove::Slash => self.slash(),
        }
    }

    fn is_legal(&self, move_: &SquareOneMove) -> bool {
        match move_ {
            SquareOneMove::Turn { .. } => true,
            SquareOneMove::Slash => self.is_twistable(),
        }
    }
}

/// `(top, bottom)` layer turns in twelfths, or the `/` twist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareOneMove {
    Turn { top: i8, bottom: i8 },
    Slash,
}

/// Folds a turn amount into -5..=6.
pub fn normalize_turn(amount: i32) -> i8 {
    let k = amount.rem_euclid(SLOTS as i32);
    (if k > 6 { k - 12 } else { k }) as i8
}

impl SquareOneMove {
    pub fn turn(top: i32, bottom: i32) -> SquareOneMove {
        SquareOneMove::Turn {
            top: normalize_turn(top),
            bottom: normalize_turn(bottom),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, SquareOneMove::Turn { top: 0, bottom: 0 })
    }

    /// Reads `(x,y)` and `/` tokens, spaces optional.
    pub fn parse_sequence(s: &str) -> Result<Vec<SquareOneMove>> {
        let mut moves = Vec::new();
        let mut rest = s.trim_start();
        while let Some(c) = rest.chars().next() {
            let len = match c {
                '/' => 1,
                '(' => rest
                    .find(')')
                    .map(|i| i + 1)
                    .ok_or_else(|| ScrambleError::invalid_move(rest, "unclosed turn"))?,
                _ => rest.find(|c: char| c.is_whitespace()).unwrap_or(rest.len()),
            };
            moves.push(rest[..len].parse()?);
            rest = rest[len..].trim_start();
        }
        Ok(moves)
    }
}

impl PuzzleMove for SquareOneMove {
    fn inverse(&self) -> SquareOneMove {
        match *self {
            SquareOneMove::Turn { top, bottom } => {
                SquareOneMove::turn(-(top as i32), -(bottom as i32))
            }
            SquareOneMove::Slash => SquareOneMove::Slash,
        }
    }
}

impl core::fmt::Display for SquareOneMove {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            SquareOneMove::Turn { top, bottom } => write!(f, "({},{})", top, bottom),
            SquareOneMove::Slash => write!(f, "/"),
        }
    }
}

impl core::str::FromStr for SquareOneMove {
    type Err = ScrambleError;

    fn from_str(s: &str) -> Result<SquareOneMove> {
        if s == "/" {
            return Ok(SquareOneMove::Slash);
        }
        let inner = s
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| ScrambleError::invalid_move(s, "expected (x,y) or /"))?;
        let (top, bottom) = inner
            .split_once(',')
            .ok_or_else(|| ScrambleError::invalid_move(s, "expected two amounts"))?;

        let amount = |part: &str| -> Result<i32> {
            let v: i32 = part
                .trim()
                .parse()
                .map_err(|_| ScrambleError::invalid_move(s, format!("bad amount {:?}", part)))?;
            if !(-5..=6).contains(&v) {
                return Err(ScrambleError::invalid_move(s, "amount outside -5..6"));
            }
            Ok(v)
        };
        Ok(SquareOneMove::turn(amount(top)?, amount(bottom)?))
    }
}

/// Merges adjacent turns, drops identity turns and cancels double slashes.
pub fn canonicalize(moves: impl IntoIterator<Item = SquareOneMove>) -> Vec<SquareOneMove> {
    let mut out: Vec<SquareOneMove> = Vec::new();
    for m in moves {
        match (out.last().copied(), m) {
            (_, m) if m.is_identity() => {}
            (Some(SquareOneMove::Slash), SquareOneMove::Slash) => {
                out.pop();
            }
            (
                Some(SquareOneMove::Turn { top: t1, bottom: b1 }),
                SquareOneMove::Turn { top: t2, bottom: b2 },
            ) => {
                out.pop();
                let merged = SquareOneMove::turn(t1 as i32 + t2 as i32, b1 as i32 + b2 as i32);
                if !merged.is_identity() {
                    out.push(merged);
                }
            }
            _ => out.push(m),
        }
    }
    out
}

pub fn is_canonical(moves: &[SquareOneMove]) -> bool {
    moves.iter().all(|m| !m.is_identity())
        && moves.windows(2).all(|w| {
            !matches!(
                (w[0], w[1]),
                (SquareOneMove::Slash, SquareOneMove::Slash)
                    | (SquareOneMove::Turn { .. }, SquareOneMove::Turn { .. })
            )
        })
}

/// Slashes are the twist-metric length.
pub fn twist_count(moves: &[SquareOneMove]) -> usize {
    moves
        .iter()
        .filter(|m| matches!(m, SquareOneMove::Slash))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Vec<SquareOneMove> {
        SquareOneMove::parse_sequence(s).unwrap()
    }

    #[test]
    fn solved_is_valid_cube_shape() {
        let solved = SquareOne::solved();
        assert!(solved.is_valid());
        assert!(solved.is_twistable());
        assert_eq!(solved.layer_mask(0), 0x6db);
        assert!(!solved.parity());
    }

    #[test]
    fn parses_and_displays() {
        let moves = seq("(1,0) / (-3, 3)/(0,-1)");
        assert_eq!(
            moves,
            vec![
                SquareOneMove::turn(1, 0),
                SquareOneMove::Slash,
                SquareOneMove::turn(-3, 3),
                SquareOneMove::Slash,
                SquareOneMove::turn(0, -1),
            ]
        );
        let shown: Vec<String> = moves.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["(1,0)", "/", "(-3,3)", "/", "(0,-1)"]);
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(SquareOneMove::parse_sequence("(1,0").is_err());
        assert!("(7,0)".parse::<SquareOneMove>().is_err());
        assert!("R".parse::<SquareOneMove>().is_err());
    }

    #[test]
    fn normalizes_into_range() {
        assert_eq!(normalize_turn(7), -5);
        assert_eq!(normalize_turn(-6), 6);
        assert_eq!(normalize_turn(12), 0);
    }

    #[test]
    fn straddling_corner_blocks_slash() {
        let state = SquareOne::solved().apply(SquareOneMove::turn(2, 0));
        assert!(!state.is_twistable());
        assert!(!state.is_legal(&SquareOneMove::Slash));
        assert!(!SquareOne::solved().apply(SquareOneMove::turn(0, 1)).is_twistable());
        assert!(SquareOne::solved().apply(SquareOneMove::turn(1, 0)).is_twistable());
        assert!(SquareOne::solved().apply(SquareOneMove::turn(0, -1)).is_twistable());
    }

    #[test]
    fn slash_is_an_involution() {
        let state = SquareOne::solved().apply_all(seq("(0,-1) / (3,0) /"));
        assert!(state.is_valid());
        assert_eq!(state.apply(SquareOneMove::Slash).apply(SquareOneMove::Slash), state);
    }

    #[test]
    fn canonicalize_merges_and_cancels() {
        let moves = seq("(1,0) (2,3) / / (0,-3) (-3,0) /");
        assert_eq!(canonicalize(moves), seq("/"));
        assert!(is_canonical(&seq("(1,0) / (-1,0) /")));
        assert!(!is_canonical(&seq("(1,0) (1,0)")));
        assert!(!is_canonical(&seq("/ /")));
    }

    #[test]
    fn twist_metric_counts_slashes() {
        assert_eq!(twist_count(&seq("(1,0) / (-1,0) / (3,3)")), 2);
    }

    #[quickcheck]
    fn legal_moves_keep_states_valid(choices: Vec<(u8, u8)>) -> bool {
        let mut state = SquareOne::solved();
        for (a, b) in choices {
            let turned = state.apply(SquareOneMove::turn(a as i32, b as i32));
            if turned.is_twistable() {
                state = turned.apply(SquareOneMove::Slash);
            }
            if !state.is_valid() {
                return false;
            }
        }
        true
    }

    #[quickcheck]
    fn inverse_undoes(choices: Vec<(u8, u8)>) -> bool {
        let mut state = SquareOne::solved();
        let mut moves = Vec::new();
        for (a, b) in choices {
            let turn = SquareOneMove::turn(a as i32, b as i32);
            state = state.apply(turn);
            moves.push(turn);
            if state.is_twistable() {
                state = state.apply(SquareOneMove::Slash);
                moves.push(SquareOneMove::Slash);
            }
        }
        state.apply_all(SquareOneMove::invert_sequence(&moves)).is_solved()
    }
}
