//! Random-state scramble generation for the WCA cube family and Square-1.
//!
//! An [`Engine`] builds every lookup table once, then hands out scrambles
//! for any registered puzzle from any number of threads.

#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

mod budget;
pub mod cache;
mod config;
pub mod cube;
mod error;
mod r#move;
mod prelude;
mod puzzle;
mod sampler;
mod scramble;
pub mod solver;
pub mod square_one;


pub use budget::SearchBudget;
pub use config::{EngineConfig, ScramblePolicy};
pub use error::{CacheError, Result, ScrambleError};
pub use puzzle::{FaceInfo, PuzzleGeometry, PuzzleInfo, PuzzleKind, StickerView};
pub use r#move::{canonicalize, is_canonical, AxialMove, Axis, Direction, Face, Move};
pub use scramble::{Engine, ScrambleRequest, ScrambleResult};
