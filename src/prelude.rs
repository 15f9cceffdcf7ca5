pub use crate::{budget::*, config::*, cube::*, error::*, puzzle::*, r#move::*, solver::*};
pub use crate::square_one::{SquareOne, SquareOneMove};

#[cfg(test)]
pub use crate::test::*;

pub use std::time::Duration;
