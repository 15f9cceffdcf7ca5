use crate::cache::TableCache;
use crate::prelude::*;
use crate::sampler;
use crate::square_one::twist_count;

use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// One scramble: canonical tokens taking the solved puzzle to a random state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrambleResult {
    pub puzzle: PuzzleKind,
    pub moves: Vec<String>,
    /// Length in the puzzle's metric. Slashes for Square-1.
    pub move_count: usize,
}

impl ScrambleResult {
    pub fn text(&self) -> String {
        self.moves.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleRequest {
    pub puzzle: String,
    pub seed: Option<String>,
}

impl ScrambleRequest {
    pub fn new(puzzle: impl Into<String>) -> ScrambleRequest {
        ScrambleRequest {
            puzzle: puzzle.into(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<impl Into<String>>) -> ScrambleRequest {
        self.seed = seed.map(Into::into);
        self
    }
}

enum Scrambler {
    Pocket(Arc<PocketSolver>),
    Cube {
        solver: Arc<Kociemba>,
        near_solved: NaiveIddfs<CubieCube>,
    },
    Walk(u8),
    SquareOne(Arc<SquareOneSolver>),
}

/// Builds every table up front, then serves scrambles from any thread.
pub struct Engine {
    config: EngineConfig,
    scramblers: Vec<(PuzzleKind, Scrambler)>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Engine> {
        let start = Instant::now();
        let cache = config.table_cache.as_ref().map(TableCache::new);
        let cache = cache.as_ref();

        let mut scramblers = Vec::new();
        for kind in PuzzleKind::all().filter(|k| config.puzzles.contains(k)) {
            log::info!("Preparing {}", kind);
            let scrambler = match kind {
                PuzzleKind::Cube2 => Scrambler::Pocket(Arc::new(PocketSolver::new(cache)?)),
                PuzzleKind::Cube3 => Scrambler::Cube {
                    solver: Arc::new(Kociemba::new(cache)?),
                    near_solved: NaiveIddfs::new(Move::all()),
                },
                PuzzleKind::Cube4 => Scrambler::Walk(4),
                PuzzleKind::Cube5 => Scrambler::Walk(5),
                PuzzleKind::Cube6 => Scrambler::Walk(6),
                PuzzleKind::Cube7 => Scrambler::Walk(7),
                PuzzleKind::SquareOne => Scrambler::SquareOne(Arc::new(SquareOneSolver::new(
                    cache,
                    config.square_one_candidates,
                )?)),
            };
            scramblers.push((kind, scrambler));
        }

        log::info!(
            "Engine ready with {} puzzles, took {:?}",
            scramblers.len(),
            start.elapsed()
        );
        Ok(Engine { config, scramblers })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn list_puzzles(&self) -> Vec<PuzzleInfo> {
        self.scramblers
            .iter()
            .map(|(kind, _)| PuzzleInfo {
                id: kind.id(),
                name: kind.name(),
            })
            .collect()
    }

    fn scrambler(&self, id: &str) -> Result<(PuzzleKind, &Scrambler)> {
        let kind = PuzzleKind::from_id(id)?;
        self.scramblers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(k, s)| (*k, s))
            .ok_or_else(|| ScrambleError::UnknownPuzzle(id.to_string()))
    }

    /// Uses the configured timeout.
    pub fn generate_scramble(&self, id: &str, seed: Option<&str>) -> Result<ScrambleResult> {
        let request = ScrambleRequest::new(id).with_seed(seed);
        self.generate_scramble_with_budget(&request, &self.config.budget())
    }

    pub fn generate_scramble_with_budget(
        &self,
        request: &ScrambleRequest,
        budget: &SearchBudget,
    ) -> Result<ScrambleResult> {
        let (kind, scrambler) = self.scrambler(&request.puzzle)?;
        let policy = self.config.policy(kind);
        let mut rng = sampler::rng_for(request.seed.as_deref());

        let start = Instant::now();
        for attempt in 1..=self.config.max_attempts {
            budget.check(kind.id())?;
            match scrambler.attempt(policy, budget, &mut rng) {
                Ok(Some((moves, move_count))) => {
                    log::debug!(
                        "{}: {} moves after {} attempts, took {:?}",
                        kind,
                        move_count,
                        attempt,
                        start.elapsed()
                    );
                    return Ok(ScrambleResult {
                        puzzle: kind,
                        moves,
                        move_count,
                    });
                }
                Ok(None) => log::debug!("{}: attempt {} outside policy", kind, attempt),
                Err(ScrambleError::BudgetExceeded { reason, .. }) => {
                    log::debug!("{}: attempt {} failed: {}", kind, attempt, reason)
                }
                Err(e) => return Err(e),
            }
        }

        Err(ScrambleError::budget(
            kind.id(),
            format!("{} attempts", self.config.max_attempts),
        ))
    }

    /// One scramble per seed, in parallel. `None` seeds draw from the OS.
    pub fn generate_batch(&self, id: &str, seeds: &[Option<String>]) -> Vec<Result<ScrambleResult>> {
        seeds
            .par_iter()
            .map(|seed| self.generate_scramble(id, seed.as_deref()))
            .collect()
    }

    pub fn geometry(&self, id: &str) -> Result<PuzzleGeometry> {
        Ok(PuzzleGeometry::of(PuzzleKind::from_id(id)?))
    }

    /// The puzzle after `tokens`, starting from solved.
    pub fn scrambled_stickers(&self, id: &str, tokens: &str) -> Result<StickerView> {
        let kind = PuzzleKind::from_id(id)?;
        match kind.cube_size() {
            Some(size) => {
                let mut cube = StickerCube::new(size);
                for token in tokens.split_whitespace() {
                    let m: NxnMove = token.parse()?;
                    if !cube.is_legal(&m) {
                        return Err(ScrambleError::invalid_move(token, "block too wide"));
                    }
                    cube = cube.apply(m);
                }
                Ok(StickerView::of_cube(&cube))
            }
            None => {
                let mut state = SquareOne::solved();
                for m in SquareOneMove::parse_sequence(tokens)? {
                    if !state.is_legal(&m) {
                        return Err(ScrambleError::invalid_move(
                            &m.to_string(),
                            "a corner blocks the slash",
                        ));
                    }
                    state = state.apply(m);
                }
                Ok(StickerView::of_square_one(&state))
            }
        }
    }
}

fn tokens<M: core::fmt::Display>(moves: &[M]) -> Vec<String> {
    moves.iter().map(|m| m.to_string()).collect()
}

impl Scrambler {
    /// `None` when the sample lands outside the policy's length bounds.
    fn attempt(
        &self,
        policy: ScramblePolicy,
        budget: &SearchBudget,
        rng: &mut impl Rng,
    ) -> Result<Option<(Vec<String>, usize)>> {
        let (moves, count) = match self {
            Scrambler::Pocket(solver) => {
                let state = sampler::random_pocket(rng);
                let solution = solver.solve(&state, policy.max_length, budget)?;
                let scramble = canonicalize(Move::invert_sequence(&solution));
                (tokens(&scramble), scramble.len())
            }
            Scrambler::Cube {
                solver,
                near_solved,
            } => {
                let state = sampler::random_cube(rng);
                if policy.min_length > 0
                    && near_solved
                        .solve_within(&state, policy.min_length - 1)
                        .is_some()
                {
                    return Ok(None);
                }
                let solution = solver.solve(&state, policy.max_length, budget)?;
                let scramble = canonicalize(Move::invert_sequence(&solution));
                (tokens(&scramble), scramble.len())
            }
            Scrambler::Walk(size) => {
                let walk = sampler::random_walk(*size, policy.max_length, rng);
                (tokens(&walk), walk.len())
            }
            Scrambler::SquareOne(solver) => {
                let state = sampler::random_square_one(solver.shapes(), rng)?;
                let solution = solver.solve(&state, policy.max_length, budget)?;
                let scramble =
                    crate::square_one::canonicalize(SquareOneMove::invert_sequence(&solution));
                (tokens(&scramble), twist_count(&scramble))
            }
        };
        Ok(policy.allows(count).then(|| (moves, count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    lazy_static::lazy_static! {
        static ref ENGINE: Engine = Engine::new(EngineConfig::default().with_timeout(None)).unwrap();
    }

    fn replay_cube(result: &ScrambleResult) -> CubieCube {
        CubieCube::solved().apply_all(Move::parse_sequence(&result.text()).unwrap())
    }

    #[test]
    fn lists_in_registration_order() {
        let ids: Vec<&str> = ENGINE.list_puzzles().iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            ["2x2x2", "3x3x3", "4x4x4", "5x5x5", "6x6x6", "7x7x7", "sq1"]
        );
    }

    #[test]
    fn unknown_puzzle() {
        assert!(matches!(
            ENGINE.generate_scramble("not-a-puzzle", None),
            Err(ScrambleError::UnknownPuzzle(_))
        ));
    }

    #[test]
    fn disabled_puzzle_is_unknown() {
        let engine = Engine::new(EngineConfig::default().with_puzzles([PuzzleKind::Cube4])).unwrap();
        assert!(matches!(
            engine.generate_scramble("3x3x3", None),
            Err(ScrambleError::UnknownPuzzle(_))
        ));
        assert_eq!(engine.generate_scramble("4x4x4", None).unwrap().move_count, 40);
    }

    #[test]
    fn seeded_cube_scramble() {
        let result = ENGINE.generate_scramble("3x3x3", Some("abc")).unwrap();
        assert!((2..=21).contains(&result.move_count));
        assert_eq!(result.move_count, result.moves.len());

        let moves = Move::parse_sequence(&result.text()).unwrap();
        assert!(is_canonical(&moves));

        let stickers = StickerCube::new(3).apply_all(moves.into_iter().map(NxnMove::from));
        let solved_faces = Face::all()
            .filter(|&f| stickers.face(f).iter().all(|&s| s == stickers.face(f)[4]))
            .count();
        assert!(solved_faces <= 1);

        let sampled = sampler::random_cube(&mut sampler::rng_for(Some("abc")));
        assert_eq!(replay_cube(&result), sampled);
    }

    #[test]
    fn same_seed_same_scramble() {
        for id in ["2x2x2", "3x3x3", "5x5x5", "sq1"] {
            let a = ENGINE.generate_scramble(id, Some("seed")).unwrap();
            let b = ENGINE.generate_scramble(id, Some("seed")).unwrap();
            assert_eq!(a, b, "{}", id);
        }
    }

    #[test]
    fn pocket_scramble_reproduces_sample() {
        let result = ENGINE.generate_scramble("2x2x2", Some("pocket")).unwrap();
        assert!((4..=11).contains(&result.move_count));
        let moves = Move::parse_sequence(&result.text()).unwrap();
        let replayed = PocketCube::solved().apply_all(moves);
        let sampled = sampler::random_pocket(&mut sampler::rng_for(Some("pocket")));
        assert!(replayed.is_anchored());
        assert_eq!(replayed, sampled);
    }

    #[test]
    fn square_one_scramble_reproduces_sample() {
        let shapes = crate::square_one::ShapeTables::new().unwrap();
        for seed in ["a", "b", "c"] {
            let request = ScrambleRequest::new("sq1").with_seed(Some(seed));
            let budget = SearchBudget::unlimited().with_timeout(Duration::from_secs(60));
            let result = ENGINE.generate_scramble_with_budget(&request, &budget).unwrap();
            let moves = SquareOneMove::parse_sequence(&result.text()).unwrap();
            assert!(crate::square_one::is_canonical(&moves));
            assert_eq!(twist_count(&moves), result.move_count);
            assert!((11..=30).contains(&result.move_count));

            let mut state = SquareOne::solved();
            for m in moves {
                assert!(state.is_legal(&m));
                state = state.apply(m);
            }
            assert!(state.is_valid());

            // Samples outside the length policy are redrawn from the same stream.
            let mut rng = sampler::rng_for(Some(seed));
            let drawn: Vec<SquareOne> = (0..ENGINE.config().max_attempts)
                .map(|_| sampler::random_square_one(&shapes, &mut rng).unwrap())
                .collect();
            assert!(drawn.contains(&state), "{}: {}", seed, result.text());
        }
    }

    #[test]
    fn big_cubes_walk_their_policy_length() {
        for (id, length) in [("4x4x4", 40), ("7x7x7", 100)] {
            let result = ENGINE.generate_scramble(id, None).unwrap();
            assert_eq!(result.move_count, length);
            let moves: Vec<NxnMove> = result.moves.iter().map(|t| t.parse().unwrap()).collect();
            assert!(is_canonical(&moves));
        }
    }

    #[test]
    fn batch_matches_single_requests() {
        let seeds = vec![Some("x".to_string()), Some("y".to_string()), None];
        let results = ENGINE.generate_batch("3x3x3", &seeds);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &ENGINE.generate_scramble("3x3x3", Some("x")).unwrap()
        );
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn cancelled_request() {
        let flag = Arc::new(AtomicBool::new(true));
        let budget = SearchBudget::unlimited().with_cancel_flag(flag);
        let request = ScrambleRequest::new("3x3x3");
        assert!(matches!(
            ENGINE.generate_scramble_with_budget(&request, &budget),
            Err(ScrambleError::Cancelled { .. })
        ));
    }

    #[test]
    fn stickers_after_tokens() {
        let view = ENGINE.scrambled_stickers("3x3x3", "R").unwrap();
        match view {
            StickerView::Cube { faces, .. } => assert_eq!(faces[1], "RRRRRRRRR"),
            _ => panic!("expected a cube view"),
        }
        assert!(matches!(
            ENGINE.scrambled_stickers("3x3x3", "3Rw"),
            Err(ScrambleError::InvalidMove { .. })
        ));
        assert!(matches!(
            ENGINE.scrambled_stickers("sq1", "(2,0) /"),
            Err(ScrambleError::InvalidMove { .. })
        ));
        assert!(ENGINE.scrambled_stickers("sq1", "(0,-1) /").is_ok());
    }
}
