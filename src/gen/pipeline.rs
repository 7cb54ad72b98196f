// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! The pipeline driver: runs a slice of stages against a plan, handling
//! retries and rollbacks.

use crate::context::Context;
use crate::math::curve::Curve;
use crate::verbose;

use super::stages::Plan;
use super::{Outcome, Stage, StageArgs};

/// Run stages `from` (inclusive) to `until` (exclusive, an index into
/// [`Stage::ALL`] or [`END`](super::END)) until they all complete. Never
/// gives up; only use with plans whose stages eventually succeed.
pub fn run(
    curve: &mut Curve,
    ctx: &mut Context,
    plan: &Plan,
    args: &StageArgs,
    from: Stage,
    until: usize,
) -> bool {
    drive(curve, ctx, plan, args, from, until, None)
}

/// Like [`run`], but a stage that retries more than `tries` times in a row
/// fails the whole slice. The curve is left mid-construction; callers reset
/// it before reuse.
pub fn run_bounded(
    curve: &mut Curve,
    ctx: &mut Context,
    plan: &Plan,
    args: &StageArgs,
    from: Stage,
    until: usize,
    tries: usize,
) -> bool {
    drive(curve, ctx, plan, args, from, until, Some(tries))
}

fn drive(
    curve: &mut Curve,
    ctx: &mut Context,
    plan: &Plan,
    args: &StageArgs,
    from: Stage,
    until: usize,
    tries: Option<usize>,
) -> bool {
    let floor = from.index();
    let mut i = floor;
    let mut attempts = 0usize;
    while i < until {
        let stage = Stage::ALL[i];
        match plan.execute(stage, curve, ctx, args[i]) {
            Outcome::Done => {
                i += 1;
                attempts = 0;
            }
            Outcome::Retry => {
                plan.unroll(stage, curve);
                attempts += 1;
                if verbose::enabled() && attempts % 100 == 0 {
                    verbose!("{stage:?}: {attempts} attempts");
                }
                if let Some(max) = tries {
                    if attempts >= max {
                        return false;
                    }
                }
            }
            Outcome::Back(n) => {
                let target = i.saturating_sub(n).max(floor);
                for j in (target..=i).rev() {
                    plan.unroll(Stage::ALL[j], curve);
                }
                if target == i {
                    // clamped at the slice start, so this is a plain retry
                    attempts += 1;
                    if let Some(max) = tries {
                        if attempts >= max {
                            return false;
                        }
                    }
                } else {
                    verbose!("{stage:?}: rolling back to {:?}", Stage::ALL[target]);
                    i = target;
                    attempts = 0;
                }
            }
        }
    }
    true
}
