// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! The staged generation pipeline.
//!
//! A curve is built by running the stages in order, each one filling in the
//! piece of [`Curve`](crate::math::curve::Curve) it owns. A stage reports
//! [`Outcome::Done`], asks to be rerun with [`Outcome::Retry`], or rolls the
//! pipeline back over already completed stages with [`Outcome::Back`]. The
//! rollback unrolls each stage it crosses, so state never leaks across
//! attempts.
//!
//! A [`Plan`](stages::Plan) binds one strategy to every stage; the engines
//! assemble plans from the configuration and run slices of the pipeline.

pub mod pipeline;
pub mod stages;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Seed,
    Field,
    A,
    B,
    Curve,
    Order,
    Generators,
    Points,
}

impl Stage {
    pub const COUNT: usize = 8;
    pub const ALL: [Stage; Self::COUNT] = [
        Stage::Seed,
        Stage::Field,
        Stage::A,
        Stage::B,
        Stage::Curve,
        Stage::Order,
        Stage::Generators,
        Stage::Points,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Exclusive end marker: run everything through the points stage.
pub const END: usize = Stage::COUNT;

/// Per-stage input supplied by an engine rather than the plan.
#[derive(Clone, Debug)]
pub enum StageArg {
    /// Target orders for the trial points strategy.
    Primes(Vec<u64>),
}

/// One optional argument slot per stage.
pub type StageArgs<'a> = [Option<&'a StageArg>; Stage::COUNT];

pub fn no_args<'a>() -> StageArgs<'a> {
    [None; Stage::COUNT]
}

/// What a stage asks the pipeline to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Rerun this stage with fresh randomness.
    Retry,
    /// Unroll this many stages and resume from there.
    Back(usize),
}
