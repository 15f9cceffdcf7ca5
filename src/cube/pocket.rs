use super::cubie::DBL;
use crate::prelude::*;

/// 2x2x2 state. Scrambles only turn U, R and F so the DBL corner stays home
/// and fixes the cube's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PocketCube(pub CornerCube);

impl PocketCube {
    pub fn corners(&self) -> &CornerCube {
        &self.0
    }

    /// Generators keeping DBL fixed.
    pub fn moves() -> impl Iterator<Item = Move> {
        Move::all().filter(|m| matches!(m.face, Face::Up | Face::Right | Face::Front))
    }

    pub fn is_anchored(&self) -> bool {
        self.0.cp[DBL as usize] == DBL && self.0.co[DBL as usize] == 0
    }
}

impl PuzzleState for PocketCube {
    type Move = Move;

    fn solved() -> PocketCube {
        PocketCube(CornerCube::solved())
    }

    fn apply(self, move_: Move) -> PocketCube {
        PocketCube(self.0.multiply(&CubieCube::of_move(move_).corners))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_generators() {
        assert_eq!(PocketCube::moves().count(), 9);
    }

    #[quickcheck]
    fn generators_keep_dbl_home(indices: Vec<u8>) -> bool {
        let moves: Vec<Move> = PocketCube::moves().collect();
        PocketCube::solved()
            .apply_all(indices.into_iter().map(|i| moves[i as usize % 9]))
            .is_anchored()
    }

    #[test]
    fn left_turn_moves_dbl() {
        assert!(!PocketCube::solved().apply("L".parse().unwrap()).is_anchored());
    }
}
