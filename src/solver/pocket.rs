use crate::cache::{load_or_build, TableCache};
use crate::cube::coord::{self, MoveTable};
use crate::prelude::*;

pub const POCKET_PUZZLE: &str = "2x2x2";

/// Optimal 2x2x2 solver: IDA* over corner permutation and twist with U, R, F.
pub struct PocketSolver {
    moves: Vec<Move>,
    perm: MoveTable,
    twist: MoveTable,
    perm_distance: PruningTable,
    twist_distance: PruningTable,
}

impl PocketSolver {
    pub fn new(cache: Option<&TableCache>) -> Result<PocketSolver> {
        let moves: Vec<Move> = PocketCube::moves().collect();

        let perm = MoveTable::build("2x2x2 permutation", coord::N_POCKET_PERM, &moves, |v, m| {
            let mut c = CornerCube::solved();
            coord::set_pocket_perm(&mut c, v)?;
            Ok(coord::pocket_perm(&c.multiply(&CubieCube::of_move(m).corners)))
        })?;
        let twist = MoveTable::build("2x2x2 twist", coord::N_POCKET_TWIST, &moves, |v, m| {
            let mut c = CornerCube::solved();
            coord::set_pocket_twist(&mut c, v)?;
            Ok(coord::pocket_twist(&c.multiply(&CubieCube::of_move(m).corners)))
        })?;

        let fingerprint = twist.fingerprint(perm.fingerprint(0));
        let shapes = [
            ("2x2x2 permutation", coord::N_POCKET_PERM),
            ("2x2x2 twist", coord::N_POCKET_TWIST),
        ];
        let [perm_distance, twist_distance] =
            load_or_build(cache, POCKET_PUZZLE, fingerprint, shapes, || {
                Ok([
                    single_table(shapes[0].0, &perm, moves.len())?,
                    single_table(shapes[1].0, &twist, moves.len())?,
                ])
            })?;

        Ok(PocketSolver {
            moves,
            perm,
            twist,
            perm_distance,
            twist_distance,
        })
    }

    fn distance(&self, perm: usize, twist: usize) -> usize {
        let a = self.perm_distance.distance(perm);
        let b = self.twist_distance.distance(twist);
        a.max(b) as usize
    }

    fn search(&self, perm: usize, twist: usize, togo: usize, move_stack: &mut Vec<Move>) -> bool {
        if togo == 0 {
            return perm == 0 && twist == 0;
        }

        for (i, m) in self.moves.iter().enumerate() {
            if move_stack.last().map_or(false, |last| !m.could_follow(last)) {
                continue;
            }
            let (p, t) = (self.perm.get(perm, i), self.twist.get(twist, i));
            if self.distance(p, t) >= togo {
                continue;
            }

            move_stack.push(*m);
            if self.search(p, t, togo - 1, move_stack) {
                return true;
            }
            move_stack.pop();
        }
        false
    }
}

fn single_table(name: &str, table: &MoveTable, moves: usize) -> Result<PruningTable> {
    PruningTable::build(name, table.size(), [0], |c, out| {
        out.extend((0..moves).map(|m| table.get(c, m)));
    })
}

impl Solver for PocketSolver {
    type State = PocketCube;

    fn puzzle(&self) -> &'static str {
        POCKET_PUZZLE
    }

    /// Always optimal in the face-turn metric.
    fn solve(&self, cube: &PocketCube, max_length: usize, budget: &SearchBudget) -> Result<Vec<Move>> {
        let perm = coord::pocket_perm(cube.corners());
        let twist = coord::pocket_twist(cube.corners());

        let mut move_stack = Vec::with_capacity(max_length);
        for depth in self.distance(perm, twist)..=max_length {
            budget.check(POCKET_PUZZLE)?;
            if self.search(perm, twist, depth, &mut move_stack) {
                return Ok(move_stack);
            }
        }
        Err(ScrambleError::budget(
            POCKET_PUZZLE,
            format!("no solution within {} moves", max_length),
        ))
    }
}
