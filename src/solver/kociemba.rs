use crate::cache::{load_or_build, TableCache};
use crate::cube::coord::{self, MoveTable};
use crate::prelude::*;

pub const CUBE_PUZZLE: &str = "3x3x3";

/// Generators of the subgroup `<U, D, R2, L2, F2, B2>` solved by phase 2.
pub const PHASE2_MOVES: [Move; 10] = [
    Move::new(Face::Up, Direction::Single),
    Move::new(Face::Up, Direction::Double),
    Move::new(Face::Up, Direction::Reverse),
    Move::new(Face::Down, Direction::Single),
    Move::new(Face::Down, Direction::Double),
    Move::new(Face::Down, Direction::Reverse),
    Move::new(Face::Right, Direction::Double),
    Move::new(Face::Left, Direction::Double),
    Move::new(Face::Front, Direction::Double),
    Move::new(Face::Back, Direction::Double),
];

/// Longest phase 2 tried for any single phase-1 solution.
const PHASE2_MAX_DEPTH: usize = 12;

pub fn is_phase2_move(m: &Move) -> bool {
    matches!(
        (m.face, m.direction),
        (Face::Up | Face::Down, _) | (_, Direction::Double)
    )
}

/// Two-phase 3x3x3 solver: phase 1 reaches the subgroup where corner twist,
/// edge flip and the E-slice membership are solved; phase 2 finishes with
/// subgroup moves.
pub struct Kociemba {
    twist: MoveTable,
    flip: MoveTable,
    slice: MoveTable,
    corner_perm: MoveTable,
    ud_edge_perm: MoveTable,
    slice_perm: MoveTable,

    twist_slice: PruningTable,
    flip_slice: PruningTable,
    corner_slice: PruningTable,
    edge_slice: PruningTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Phase1 {
    twist: usize,
    flip: usize,
    slice: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Phase2 {
    corners: usize,
    edges: usize,
    slice: usize,
}

impl Kociemba {
    pub fn new(cache: Option<&TableCache>) -> Result<Kociemba> {
        let start = std::time::Instant::now();
        let moves: Vec<Move> = Move::all().collect();

        let twist = MoveTable::build("twist", coord::N_TWIST, &moves, |v, m| {
            let mut c = CornerCube::solved();
            coord::set_twist(&mut c, v)?;
            Ok(coord::twist(&c.multiply(&CubieCube::of_move(m).corners)))
        })?;
        let flip = MoveTable::build("flip", coord::N_FLIP, &moves, |v, m| {
            let mut c = CubieCube::solved();
            coord::set_flip(&mut c, v)?;
            Ok(coord::flip(&c.apply(m)))
        })?;
        let slice = MoveTable::build("slice", coord::N_SLICE, &moves, |v, m| {
            let mut c = CubieCube::solved();
            coord::set_slice(&mut c, v)?;
            Ok(coord::slice(&c.apply(m)))
        })?;
        let corner_perm = MoveTable::build(
            "corner permutation",
            coord::N_CORNER_PERM,
            &PHASE2_MOVES,
            |v, m| {
                let mut c = CornerCube::solved();
                coord::set_corner_perm(&mut c, v)?;
                Ok(coord::corner_perm(&c.multiply(&CubieCube::of_move(m).corners)))
            },
        )?;
        let ud_edge_perm = MoveTable::build(
            "U/D edge permutation",
            coord::N_UD_EDGE_PERM,
            &PHASE2_MOVES,
            |v, m| {
                let mut c = CubieCube::solved();
                coord::set_ud_edge_perm(&mut c, v)?;
                Ok(coord::ud_edge_perm(&c.apply(m)))
            },
        )?;
        let slice_perm = MoveTable::build(
            "slice permutation",
            coord::N_SLICE_PERM,
            &PHASE2_MOVES,
            |v, m| {
                let mut c = CubieCube::solved();
                coord::set_slice_perm(&mut c, v)?;
                Ok(coord::slice_perm(&c.apply(m)))
            },
        )?;

        let fingerprint = [&twist, &flip, &slice, &corner_perm, &ud_edge_perm, &slice_perm]
            .iter()
            .fold(0, |crc, table| table.fingerprint(crc));

        let shapes = [
            ("twist x slice", coord::N_TWIST * coord::N_SLICE),
            ("flip x slice", coord::N_FLIP * coord::N_SLICE),
            ("corners x slice permutation", coord::N_CORNER_PERM * coord::N_SLICE_PERM),
            ("edges x slice permutation", coord::N_UD_EDGE_PERM * coord::N_SLICE_PERM),
        ];
        let [twist_slice, flip_slice, corner_slice, edge_slice] =
            load_or_build(cache, CUBE_PUZZLE, fingerprint, shapes, || {
                Ok([
                    pair_table(shapes[0].0, &twist, &slice, coord::N_SLICE, moves.len())?,
                    pair_table(shapes[1].0, &flip, &slice, coord::N_SLICE, moves.len())?,
                    pair_table(
                        shapes[2].0,
                        &corner_perm,
                        &slice_perm,
                        coord::N_SLICE_PERM,
                        PHASE2_MOVES.len(),
                    )?,
                    pair_table(
                        shapes[3].0,
                        &ud_edge_perm,
                        &slice_perm,
                        coord::N_SLICE_PERM,
                        PHASE2_MOVES.len(),
                    )?,
                ])
            })?;

        log::info!("3x3x3 tables ready in {:?}", start.elapsed());
        Ok(Kociemba {
            twist,
            flip,
            slice,
            corner_perm,
            ud_edge_perm,
            slice_perm,
            twist_slice,
            flip_slice,
            corner_slice,
            edge_slice,
        })
    }

    fn phase1_distance(&self, c: Phase1) -> usize {
        let a = self.twist_slice.distance(c.twist * coord::N_SLICE + c.slice);
        let b = self.flip_slice.distance(c.flip * coord::N_SLICE + c.slice);
        a.max(b) as usize
    }

    fn phase2_distance(&self, c: Phase2) -> usize {
        let a = self.corner_slice.distance(c.corners * coord::N_SLICE_PERM + c.slice);
        let b = self.edge_slice.distance(c.edges * coord::N_SLICE_PERM + c.slice);
        a.max(b) as usize
    }

    fn phase1_step(&self, c: Phase1, move_index: usize) -> Phase1 {
        Phase1 {
            twist: self.twist.get(c.twist, move_index),
            flip: self.flip.get(c.flip, move_index),
            slice: self.slice.get(c.slice, move_index),
        }
    }

    fn phase2_step(&self, c: Phase2, move_index: usize) -> Phase2 {
        Phase2 {
            corners: self.corner_perm.get(c.corners, move_index),
            edges: self.ud_edge_perm.get(c.edges, move_index),
            slice: self.slice_perm.get(c.slice, move_index),
        }
    }
}

/// Distance table over `a x b`, both coordinates stepped by the same moves.
fn pair_table(
    name: &str,
    a: &MoveTable,
    b: &MoveTable,
    b_size: usize,
    moves: usize,
) -> Result<PruningTable> {
    PruningTable::build(name, a.size() * b_size, [0], |c, out| {
        let (x, y) = (c / b_size, c % b_size);
        out.extend((0..moves).map(|m| a.get(x, m) * b_size + b.get(y, m)));
    })
}

impl Solver for Kociemba {
    type State = CubieCube;

    fn puzzle(&self) -> &'static str {
        CUBE_PUZZLE
    }

    fn solve(&self, cube: &CubieCube, max_length: usize, budget: &SearchBudget) -> Result<Vec<Move>> {
        let start = Phase1 {
            twist: coord::twist(&cube.corners),
            flip: coord::flip(cube),
            slice: coord::slice(cube),
        };

        let mut search = Search {
            solver: self,
            budget,
            cube: *cube,
            max_length,
            phase1: Vec::with_capacity(max_length),
            phase2: Vec::with_capacity(PHASE2_MAX_DEPTH),
            nodes: 0,
        };

        for depth in self.phase1_distance(start)..=max_length {
            budget.check(CUBE_PUZZLE)?;
            log::trace!("3x3x3: phase 1 depth {}", depth);
            if let Some(solution) = search.phase1(start, depth)? {
                return Ok(solution);
            }
        }

        Err(ScrambleError::budget(
            CUBE_PUZZLE,
            format!("no solution within {} moves", max_length),
        ))
    }
}

struct Search<'a> {
    solver: &'a Kociemba,
    budget: &'a SearchBudget,
    cube: CubieCube,
    max_length: usize,
    phase1: Vec<Move>,
    phase2: Vec<Move>,
    nodes: u64,
}

impl Search<'_> {
    /// Phase-1 solutions of exactly `togo` more moves, each handed to phase 2.
    fn phase1(&mut self, c: Phase1, togo: usize) -> Result<Option<Vec<Move>>> {
        self.budget.tick(CUBE_PUZZLE, &mut self.nodes)?;
        if togo == 0 {
            return self.start_phase2();
        }

        for (i, m) in Move::all().enumerate() {
            if let Some(last) = self.phase1.last() {
                if !m.could_follow(last) {
                    continue;
                }
            }
            let next = self.solver.phase1_step(c, i);
            if self.solver.phase1_distance(next) >= togo {
                continue;
            }

            self.phase1.push(m);
            let found = self.phase1(next, togo - 1)?;
            self.phase1.pop();
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    fn start_phase2(&mut self) -> Result<Option<Vec<Move>>> {
        // Ending on a subgroup move means a shorter phase 1 already led here.
        if self.phase1.last().map_or(false, is_phase2_move) {
            return Ok(None);
        }
        self.budget.check(CUBE_PUZZLE)?;

        let cube = self.cube.apply_all(self.phase1.iter().copied());
        let c = Phase2 {
            corners: coord::corner_perm(&cube.corners),
            edges: coord::ud_edge_perm(&cube),
            slice: coord::slice_perm(&cube),
        };

        let limit = (self.max_length - self.phase1.len()).min(PHASE2_MAX_DEPTH);
        for depth in self.solver.phase2_distance(c)..=limit {
            if self.phase2(c, depth)? {
                let mut solution = self.phase1.clone();
                solution.append(&mut self.phase2);
                return Ok(Some(solution));
            }
        }
        Ok(None)
    }

    fn phase2(&mut self, c: Phase2, togo: usize) -> Result<bool> {
        self.budget.tick(CUBE_PUZZLE, &mut self.nodes)?;
        if togo == 0 {
            return Ok(c == Phase2 { corners: 0, edges: 0, slice: 0 });
        }

        for (i, m) in PHASE2_MOVES.iter().enumerate() {
            if let Some(last) = self.phase2.last().or_else(|| self.phase1.last()) {
                if !m.could_follow(last) {
                    continue;
                }
            }
            let next = self.solver.phase2_step(c, i);
            if self.solver.phase2_distance(next) >= togo {
                continue;
            }

            self.phase2.push(*m);
            if self.phase2(next, togo - 1)? {
                return Ok(true);
            }
            self.phase2.pop();
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    lazy_static::lazy_static! {
        static ref SOLVER: Kociemba = Kociemba::new(None).unwrap();
    }

    fn solves(cube: CubieCube) -> Vec<Move> {
        let solution = SOLVER.solve(&cube, 21, &SearchBudget::unlimited()).unwrap();
        assert!(solution.len() <= 21);
        assert!(cube.apply_all(solution.iter().copied()).is_solved());
        solution
    }

    #[test]
    fn phase2_moves_are_phase2_moves() {
        assert!(PHASE2_MOVES.iter().all(is_phase2_move));
        assert_eq!(Move::all().filter(is_phase2_move).count(), PHASE2_MOVES.len());
    }

    #[test]
    fn solved_needs_nothing() {
        assert!(solves(CubieCube::solved()).is_empty());
    }

    #[test]
    fn single_turns_are_solved() {
        for m in Move::all() {
            let solution = solves(CubieCube::solved().apply(m));
            assert!(!solution.is_empty());
        }
    }

    #[test]
    fn long_scrambles() {
        for scramble in [
            "R2 U' L' R2 B2 F' L F2 U2 L' U' B D U2 L2 D2 U R' B F' L R F U R2 B' F2 L2 U' L",
            "D2 F' U2 L2 B2 R F' D' L' B2 U R2 F2 D' R2 U' L2 F2 U2 B2",
            "F R' B D2 L U' F2 R B' D L2 U B2 R' F D' L' B U2 R2 F' D",
        ] {
            solves(cube_with_moves(scramble));
        }
    }

    #[test]
    fn subgroup_cube_skips_phase1() {
        let solution = solves(cube_with_moves("U R2 D' F2 L2 U2 B2"));
        assert!(solution.iter().all(is_phase2_move));
    }

    #[test]
    fn heuristics_are_exact_at_target() {
        let tables = [
            &SOLVER.twist_slice,
            &SOLVER.flip_slice,
            &SOLVER.corner_slice,
            &SOLVER.edge_slice,
        ];
        for table in tables {
            assert_eq!(table.distance(0), 0);
        }
        // Twist and flip are both hit by a single F.
        let f = cube_with_moves("F");
        let c = Phase1 {
            twist: coord::twist(&f.corners),
            flip: coord::flip(&f),
            slice: coord::slice(&f),
        };
        assert_eq!(SOLVER.phase1_distance(c), 1);
    }

    #[test]
    fn deadline_is_reported() {
        let budget = SearchBudget::unlimited().with_deadline(std::time::Instant::now());
        let result = SOLVER.solve(&cube_with_moves("R U F"), 21, &budget);
        assert!(matches!(result, Err(ScrambleError::BudgetExceeded { .. })));
    }

    #[test]
    fn phase2_polls_the_budget() {
        let budget = SearchBudget::unlimited().with_deadline(std::time::Instant::now());
        let mut search = Search {
            solver: &SOLVER,
            budget: &budget,
            cube: CubieCube::solved(),
            max_length: 21,
            phase1: Vec::new(),
            phase2: Vec::new(),
            nodes: crate::budget::NODES_PER_CHECK - 1,
        };
        let c = Phase2 {
            corners: 1,
            edges: 2,
            slice: 3,
        };
        assert!(matches!(
            search.phase2(c, PHASE2_MAX_DEPTH),
            Err(ScrambleError::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn too_short_limit_is_exceeded() {
        let result = SOLVER.solve(&cube_with_moves("R U F"), 2, &SearchBudget::unlimited());
        assert!(matches!(result, Err(ScrambleError::BudgetExceeded { .. })));
    }

    #[quickcheck]
    fn phase1_heuristic_is_admissible(moves: Vec<Move>) -> bool {
        let cube = CubieCube::solved().apply_all(moves.iter().copied().take(6));
        let c = Phase1 {
            twist: coord::twist(&cube.corners),
            flip: coord::flip(&cube),
            slice: coord::slice(&cube),
        };
        SOLVER.phase1_distance(c) <= moves.len().min(6)
    }
}
