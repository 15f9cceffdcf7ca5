use crate::cache::{load_or_build, TableCache};
use crate::cube::coord::{rank_permutation, unrank_permutation, MoveTable, N_CORNER_PERM};
use crate::prelude::*;
use crate::square_one::{canonicalize, twist_count, ShapeTables, N_SHAPE_COORDS};

use smallvec::SmallVec;

pub const SQUARE_ONE_PUZZLE: &str = "sq1";

const CORNER_SLOTS: [usize; 8] = [0, 3, 6, 9, 12, 15, 18, 21];
const EDGE_SLOTS: [usize; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

/// Solved with the bottom turned back one twelfth: both layers then read
/// corner-corner-edge from slot 0.
const TO_TARGET: SquareOneMove = SquareOneMove::Turn { top: 0, bottom: -1 };

/// Moves that keep the aligned cube shape: a third of a turn on either
/// layer, the slash, and the slash made with both layers one twelfth on.
const PHASE2_MOVES: [&[SquareOneMove]; 4] = [
    &[SquareOneMove::Turn { top: 3, bottom: 0 }],
    &[SquareOneMove::Turn { top: 0, bottom: 3 }],
    &[SquareOneMove::Slash],
    &[
        SquareOneMove::Turn { top: 1, bottom: 1 },
        SquareOneMove::Slash,
        SquareOneMove::Turn { top: -1, bottom: -1 },
    ],
];
const TOP_THIRD: usize = 0;
const BOTTOM_THIRD: usize = 1;
/// Table column of the slash at offset 0 and 1.
const SLASHES: [usize; 2] = [2, 3];

/// Longest phase 2 tried for any single phase-1 solution, in slashes.
const PHASE2_MAX_DEPTH: usize = 10;

/// Two-phase Square-1 solver in the twist metric. Phase 1 brings the shape
/// (and permutation parity) to the cube, phase 2 solves the pieces with
/// cube-shape moves only.
pub struct SquareOneSolver {
    shapes: ShapeTables,
    corners: MoveTable,
    edges: MoveTable,

    shape_distance: PruningTable,
    corner_distance: PruningTable,
    edge_distance: PruningTable,

    shape_target: usize,
    corner_target: usize,
    edge_target: usize,

    candidates: usize,
}

fn corner_coord(state: &SquareOne) -> usize {
    rank_permutation(&CORNER_SLOTS.map(|i| state.slots()[i]))
}

fn edge_coord(state: &SquareOne) -> usize {
    rank_permutation(&EDGE_SLOTS.map(|i| state.slots()[i] - 8))
}

/// The aligned cube-shape state with the given piece orders.
fn aligned_state(corners: usize, edges: usize) -> Result<SquareOne> {
    let mut corner_order = [0u8; 8];
    let mut edge_order = [0u8; 8];
    unrank_permutation(corners, &mut corner_order);
    unrank_permutation(edges, &mut edge_order);

    let mut slots = [0u8; 24];
    for (&slot, &c) in CORNER_SLOTS.iter().zip(&corner_order) {
        slots[slot] = c;
        slots[slot + 1] = c;
    }
    for (&slot, &e) in EDGE_SLOTS.iter().zip(&edge_order) {
        slots[slot] = e + 8;
    }
    SquareOne::from_slots(slots, false).ok_or(ScrambleError::InvalidState {
        coordinate: "square-1 cube shape",
        value: corners,
        size: N_CORNER_PERM,
    })
}

impl SquareOneSolver {
    pub fn new(cache: Option<&TableCache>, candidates: usize) -> Result<SquareOneSolver> {
        let start = std::time::Instant::now();
        let shapes = ShapeTables::new()?;

        let corners = MoveTable::build("square-1 corners", N_CORNER_PERM, &PHASE2_MOVES, |v, m| {
            Ok(corner_coord(&aligned_state(v, 0)?.apply_all(m.iter().copied())))
        })?;
        let edges = MoveTable::build("square-1 edges", N_CORNER_PERM, &PHASE2_MOVES, |v, m| {
            Ok(edge_coord(&aligned_state(0, v)?.apply_all(m.iter().copied())))
        })?;

        let target = SquareOne::solved().apply(TO_TARGET);
        let shape_target = shapes
            .coordinate(&target)?
            .ok_or(ScrambleError::InvalidState {
                coordinate: "square-1 target shape",
                value: 0,
                size: N_SHAPE_COORDS,
            })?;
        let corner_target = corner_coord(&target);
        let edge_target = edge_coord(&target);

        let fingerprint = edges.fingerprint(corners.fingerprint(shapes.fingerprint()));
        let table_shapes = [
            ("square-1 shape", N_SHAPE_COORDS),
            ("square-1 corners x middle", 2 * N_CORNER_PERM),
            ("square-1 edges x middle", 2 * N_CORNER_PERM),
        ];
        let [shape_distance, corner_distance, edge_distance] =
            load_or_build(cache, SQUARE_ONE_PUZZLE, fingerprint, table_shapes, || {
                // Every twistable rotation of the target: both layers read
                // corner-corner-edge or edge-corner-corner from slot 0.
                let shape_distance = PruningTable::build(
                    table_shapes[0].0,
                    N_SHAPE_COORDS,
                    shapes.rotations(shape_target).map(|(_, _, c)| c),
                    |c, out| out.extend(shapes.rotations(shapes.slash(c)).map(|(_, _, n)| n)),
                )?;
                Ok([
                    shape_distance,
                    piece_table(table_shapes[1].0, &corners, corner_target)?,
                    piece_table(table_shapes[2].0, &edges, edge_target)?,
                ])
            })?;

        log::info!("square-1 tables ready in {:?}", start.elapsed());
        Ok(SquareOneSolver {
            shapes,
            corners,
            edges,
            shape_distance,
            corner_distance,
            edge_distance,
            shape_target,
            corner_target,
            edge_target,
            candidates: candidates.max(1),
        })
    }

    pub fn shapes(&self) -> &ShapeTables {
        &self.shapes
    }

    fn phase2_distance(&self, c: usize, e: usize, ml: usize) -> usize {
        let a = self.corner_distance.distance(c * 2 + ml);
        let b = self.edge_distance.distance(e * 2 + ml);
        a.max(b) as usize
    }
}

/// `coord` after `a` top thirds and `b` bottom thirds, at index `a * 4 + b`.
fn third_turns(table: &MoveTable, coord: usize) -> [usize; 16] {
    let mut out = [0; 16];
    let mut top = coord;
    for a in 0..4 {
        let mut turned = top;
        for b in 0..4 {
            out[a * 4 + b] = turned;
            turned = table.get(turned, BOTTOM_THIRD);
        }
        top = table.get(top, TOP_THIRD);
    }
    out
}

/// Distance over one piece type and the middle layer, in slashes, to any
/// layer rotation of `target`.
fn piece_table(name: &str, table: &MoveTable, target: usize) -> Result<PruningTable> {
    PruningTable::build(
        name,
        2 * table.size(),
        third_turns(table, target).map(|c| c * 2),
        |x, out| {
            let ml = 1 - x % 2;
            for slash in SLASHES {
                let slashed = table.get(x / 2, slash);
                out.extend(third_turns(table, slashed).map(|c| c * 2 + ml));
            }
        },
    )
}

impl Solver for SquareOneSolver {
    type State = SquareOne;

    fn puzzle(&self) -> &'static str {
        SQUARE_ONE_PUZZLE
    }

    /// Tries several phase-1 solutions and keeps the shortest total.
    fn solve(
        &self,
        state: &SquareOne,
        max_length: usize,
        budget: &SearchBudget,
    ) -> Result<Vec<SquareOneMove>> {
        let start = self.shapes.coordinate(state)?.ok_or_else(|| {
            ScrambleError::budget(SQUARE_ONE_PUZZLE, "state cannot be slashed")
        })?;

        let mut search = Search::new(self, budget, *state, max_length);
        let first = self.shape_distance.distance(start) as usize;
        for depth in first..=max_length {
            if search.best_twists().map_or(false, |best| depth >= best) {
                break;
            }
            budget.check(SQUARE_ONE_PUZZLE)?;
            log::trace!("sq1: phase 1 depth {}", depth);
            if search.phase1(start, depth)? {
                break;
            }
        }

        search.best.ok_or_else(|| {
            ScrambleError::budget(
                SQUARE_ONE_PUZZLE,
                format!("no solution within {} twists", max_length),
            )
        })
    }
}

/// A phase-2 step: thirds on each layer, then the slash at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    top: usize,
    bottom: usize,
    offset: usize,
}

impl Step {
    /// The turn leading into the slash.
    fn lead_in(&self) -> (i32, i32) {
        let offset = self.offset as i32;
        (3 * self.top as i32 + offset, 3 * self.bottom as i32 + offset)
    }
}

struct Search<'a> {
    solver: &'a SquareOneSolver,
    budget: &'a SearchBudget,
    state: SquareOne,
    max_length: usize,
    /// Layer turns preceding each slash.
    phase1: SmallVec<[(usize, usize); 16]>,
    phase2: SmallVec<[Step; 16]>,
    best: Option<Vec<SquareOneMove>>,
    candidates_left: usize,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(
        solver: &'a SquareOneSolver,
        budget: &'a SearchBudget,
        state: SquareOne,
        max_length: usize,
    ) -> Search<'a> {
        Search {
            solver,
            budget,
            state,
            max_length,
            phase1: SmallVec::new(),
            phase2: SmallVec::new(),
            best: None,
            candidates_left: solver.candidates,
            nodes: 0,
        }
    }

    fn best_twists(&self) -> Option<usize> {
        self.best.as_deref().map(twist_count)
    }

    /// Returns true once enough candidates have been tried.
    fn phase1(&mut self, coord: usize, togo: usize) -> Result<bool> {
        self.budget.tick(SQUARE_ONE_PUZZLE, &mut self.nodes)?;
        if togo == 0 {
            return self.start_phase2();
        }

        let solver = self.solver;
        for (a, b, turned) in solver.shapes.rotations(coord) {
            if (a, b) == (0, 0) && !self.phase1.is_empty() {
                continue;
            }
            let next = solver.shapes.slash(turned);
            if solver.shape_distance.distance(next) as usize >= togo {
                continue;
            }

            self.phase1.push((a, b));
            let done = self.phase1(next, togo - 1)?;
            self.phase1.pop();
            if done {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn start_phase2(&mut self) -> Result<bool> {
        self.budget.check(SQUARE_ONE_PUZZLE)?;
        let solver = self.solver;

        let mut moves = Vec::new();
        let mut state = self.state;
        for &(a, b) in &self.phase1 {
            moves.push(SquareOneMove::turn(a as i32, b as i32));
            moves.push(SquareOneMove::Slash);
            state = state
                .apply(SquareOneMove::turn(a as i32, b as i32))
                .apply(SquareOneMove::Slash);
        }

        let mut aligned = None;
        'align: for a in 0..12 {
            for b in 0..12 {
                let candidate = state.apply(SquareOneMove::turn(a, b));
                if solver.shapes.coordinate(&candidate)? == Some(solver.shape_target) {
                    aligned = Some(((a, b), candidate));
                    break 'align;
                }
            }
        }
        let ((a, b), state) = aligned.ok_or(ScrambleError::InvalidState {
            coordinate: "square-1 aligned shape",
            value: self.phase1.len(),
            size: N_SHAPE_COORDS,
        })?;
        moves.push(SquareOneMove::turn(a, b));
        let lead = if self.phase1.is_empty() { None } else { Some((a, b)) };

        let used = self.phase1.len();
        let limit = match self.best_twists() {
            Some(best) => best.saturating_sub(1).min(self.max_length),
            None => self.max_length,
        };
        if used > limit {
            return Ok(false);
        }

        let (c, e) = (corner_coord(&state), edge_coord(&state));
        let ml = state.middle_flipped() as usize;
        let deepest = (limit - used).min(PHASE2_MAX_DEPTH);
        for depth in solver.phase2_distance(c, e, ml)..=deepest {
            self.budget.check(SQUARE_ONE_PUZZLE)?;
            if self.phase2(c, e, ml, depth, lead)? {
                let steps: SmallVec<[Step; 16]> = self.phase2.drain(..).collect();
                // The last step only rotates onto the target.
                if let Some((last, slashed)) = steps.split_last() {
                    for step in slashed {
                        let (top, bottom) = step.lead_in();
                        let back = -(step.offset as i32);
                        moves.push(SquareOneMove::turn(top, bottom));
                        moves.push(SquareOneMove::Slash);
                        moves.push(SquareOneMove::turn(back, back));
                    }
                    let (top, bottom) = (3 * last.top as i32, 3 * last.bottom as i32);
                    moves.push(SquareOneMove::turn(top, bottom));
                }
                moves.push(TO_TARGET.inverse());

                let solution = canonicalize(moves);
                log::trace!(
                    "sq1: candidate with {} + {} twists",
                    used,
                    twist_count(&solution).saturating_sub(used)
                );
                self.best = Some(solution);
                self.candidates_left -= 1;
                return Ok(self.candidates_left == 0);
            }
        }
        Ok(false)
    }

    /// On success `self.phase2` holds every step plus a final rotation onto
    /// the target. `lead` is the turn since the previous slash, when there
    /// was one, and rules out steps that would undo it.
    fn phase2(
        &mut self,
        c: usize,
        e: usize,
        ml: usize,
        togo: usize,
        lead: Option<(i32, i32)>,
    ) -> Result<bool> {
        self.budget.tick(SQUARE_ONE_PUZZLE, &mut self.nodes)?;
        let solver = self.solver;
        let corners = third_turns(&solver.corners, c);
        let edges = third_turns(&solver.edges, e);

        if togo == 0 {
            if ml != 0 {
                return Ok(false);
            }
            let goal = (0..16)
                .find(|&i| corners[i] == solver.corner_target && edges[i] == solver.edge_target);
            if let Some(i) = goal {
                self.phase2.push(Step {
                    top: i / 4,
                    bottom: i % 4,
                    offset: 0,
                });
            }
            return Ok(goal.is_some());
        }

        for (offset, &slash) in SLASHES.iter().enumerate() {
            for i in 0..16 {
                let step = Step {
                    top: i / 4,
                    bottom: i % 4,
                    offset,
                };
                if let Some((top, bottom)) = lead {
                    let (t, b) = step.lead_in();
                    if (top + t).rem_euclid(12) == 0 && (bottom + b).rem_euclid(12) == 0 {
                        continue;
                    }
                }
                let c1 = solver.corners.get(corners[i], slash);
                let e1 = solver.edges.get(edges[i], slash);
                let ml1 = 1 - ml;
                if solver.phase2_distance(c1, e1, ml1) >= togo {
                    continue;
                }

                self.phase2.push(step);
                let back = -(offset as i32);
                if self.phase2(c1, e1, ml1, togo - 1, Some((back, back)))? {
                    return Ok(true);
                }
                self.phase2.pop();
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::NODES_PER_CHECK;
    use crate::square_one::is_canonical;
    use std::time::Instant;

    lazy_static::lazy_static! {
        static ref SOLVER: SquareOneSolver = SquareOneSolver::new(None, 2).unwrap();
    }

    fn solves(state: SquareOne) -> Vec<SquareOneMove> {
        let budget = SearchBudget::unlimited().with_timeout(Duration::from_secs(20));
        let solution = SOLVER.solve(&state, 40, &budget).unwrap();
        let mut replay = state;
        for m in &solution {
            assert!(replay.is_legal(m), "illegal {} in {:?}", m, solution);
            replay = replay.apply(*m);
        }
        assert!(replay.is_solved());
        assert!(is_canonical(&solution));
        solution
    }

    #[test]
    fn target_is_aligned_cube_shape() {
        let target = SquareOne::solved().apply(TO_TARGET);
        assert_eq!(target.layer_mask(0), 0x6db);
        assert_eq!(target.layer_mask(1), 0x6db);
        assert_eq!(SOLVER.shapes.coordinate(&target).unwrap(), Some(SOLVER.shape_target));
        assert_eq!(SOLVER.shape_distance.distance(SOLVER.shape_target), 0);
        assert_eq!(
            SOLVER.phase2_distance(SOLVER.corner_target, SOLVER.edge_target, 0),
            0
        );
    }

    #[test]
    fn every_cube_shape_alignment_ends_phase1() {
        let target = SquareOne::solved().apply(TO_TARGET);
        for (a, b) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let turned = target.apply(SquareOneMove::turn(a, b));
            let coord = SOLVER.shapes.coordinate(&turned).unwrap().unwrap();
            assert_eq!(SOLVER.shape_distance.distance(coord), 0, "({},{})", a, b);
        }
        assert_eq!(target.apply(SquareOneMove::turn(1, 1)).layer_mask(0), 0xdb6);
    }

    #[test]
    fn phase2_moves_keep_the_aligned_cube_shape() {
        let state = aligned_state(1234, 4321).unwrap();
        for m in PHASE2_MOVES {
            let moved = state.apply_all(m.iter().copied());
            assert_eq!(moved.layer_mask(0), 0x6db, "{:?}", m);
            assert_eq!(moved.layer_mask(1), 0x6db, "{:?}", m);
        }
        let plain = state.apply_all(PHASE2_MOVES[SLASHES[0]].iter().copied());
        let offset = state.apply_all(PHASE2_MOVES[SLASHES[1]].iter().copied());
        assert_ne!(plain, offset);
    }

    #[test]
    fn third_turns_cycle() {
        let turns = third_turns(&SOLVER.corners, SOLVER.corner_target);
        assert_eq!(turns[0], SOLVER.corner_target);
        assert_eq!(SOLVER.corners.get(turns[3 * 4], TOP_THIRD), turns[0]);
        assert_eq!(SOLVER.corners.get(turns[3], BOTTOM_THIRD), turns[0]);
    }

    #[test]
    fn aligned_state_round_trips() {
        for v in (0..N_CORNER_PERM).step_by(101) {
            let state = aligned_state(v, N_CORNER_PERM - 1 - v).unwrap();
            assert_eq!(corner_coord(&state), v);
            assert_eq!(edge_coord(&state), N_CORNER_PERM - 1 - v);
        }
    }

    #[test]
    fn solved_needs_no_twists() {
        assert_eq!(twist_count(&solves(SquareOne::solved())), 0);
    }

    #[test]
    fn undoes_a_single_slash() {
        let moves = SquareOneMove::parse_sequence("(0,-1) /").unwrap();
        let solution = solves(SquareOne::solved().apply_all(moves));
        assert_eq!(twist_count(&solution), 1);
    }

    #[test]
    fn solves_sampled_states() {
        for seed in ["a", "b", "sq1"] {
            let mut rng = crate::sampler::rng_for(Some(seed));
            let state = crate::sampler::random_square_one(&SOLVER.shapes, &mut rng).unwrap();
            let solution = solves(state);
            assert!(twist_count(&solution) <= 40);
        }
    }

    #[test]
    fn unslashable_state_is_rejected() {
        let state = SquareOne::solved().apply(SquareOneMove::turn(2, 0));
        assert!(SOLVER
            .solve(&state, 40, &SearchBudget::unlimited())
            .is_err());
    }

    #[test]
    fn deadline_is_reported() {
        let budget = SearchBudget::unlimited().with_deadline(Instant::now());
        let moves = SquareOneMove::parse_sequence("(0,-1) /").unwrap();
        let state = SquareOne::solved().apply_all(moves);
        assert!(matches!(
            SOLVER.solve(&state, 40, &budget),
            Err(ScrambleError::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn phase2_polls_the_budget() {
        let budget = SearchBudget::unlimited().with_deadline(Instant::now());
        let mut search = Search::new(&SOLVER, &budget, SquareOne::solved(), 40);
        search.nodes = NODES_PER_CHECK - 1;
        let state = aligned_state(1234, 4321).unwrap();
        let result = search.phase2(
            corner_coord(&state),
            edge_coord(&state),
            0,
            PHASE2_MAX_DEPTH,
            None,
        );
        assert!(matches!(result, Err(ScrambleError::BudgetExceeded { .. })));
    }

    #[quickcheck]
    fn solves_random_walks(choices: Vec<(u8, u8)>) -> bool {
        let mut state = SquareOne::solved();
        for (a, b) in choices.into_iter().take(20) {
            let turned = state.apply(SquareOneMove::turn(a as i32, b as i32));
            if turned.is_twistable() {
                state = turned.apply(SquareOneMove::Slash);
            }
        }
        let solution = solves(state);
        twist_count(&solution) <= 40
    }
}
