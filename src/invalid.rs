// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Invalid-curve search.
//!
//! Starting from one honestly generated base curve, the search produces a
//! set of "invalid" curves sharing its field and a coefficient but with
//! varied b, such that for every small prime in the target set at least one
//! produced curve has order divisible by that prime. Such sets are the raw
//! material for invalid-curve attacks against implementations that skip
//! point validation.
//!
//! The target set is the shortest run of consecutive primes 2, 3, 5, ...
//! whose product reaches the square of the base order, which is enough to
//! recover a full scalar by CRT.

use std::mem;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;

use num_bigint::BigUint;
use num_prime::nt_funcs;
use num_traits::Zero;
use uucore::error::UResult;

use crate::config::Config;
use crate::context::Context;
use crate::errors::EcgenError;
use crate::gen::stages::{
    AGen, BGen, CurveGen, FieldGen, GensGen, OrderGen, Plan, PointsGen, SeedGen,
};
use crate::gen::{no_args, pipeline, Stage, StageArg, END};
use crate::math::curve::Curve;
use crate::math::field::Field;
use crate::output::Output;
use crate::verbose;

/// Smallest set of consecutive primes starting at 2 whose product is at
/// least `order` squared.
pub fn target_primes(order: &BigUint) -> Vec<u64> {
    let threshold = order * order;
    let mut primes = Vec::new();
    let mut product = BigUint::from(1u32);
    let mut q = 2u64;
    loop {
        primes.push(q);
        product *= q;
        if product >= threshold {
            return primes;
        }
        q = nt_funcs::next_prime(&q, None).expect("consecutive primes fit in u64 here");
    }
}

/// Strategy for candidate curves: keep the base field and a, redraw b.
fn candidate_plan(unique: bool) -> Plan {
    Plan {
        seed: SeedGen::Skip,
        field: FieldGen::Keep,
        a: AGen::Keep,
        b: BGen::Random,
        curve: CurveGen::Nonsingular,
        order: OrderGen::Compute {
            require_prime: false,
            cofactor_bound: None,
        },
        generators: if unique { GensGen::One } else { GensGen::Any },
        points: PointsGen::Trial,
    }
}

/// Run the invalid-curve search, streaming the base curve and every found
/// curve into the sink. Returns the found curves in slot (target prime)
/// order.
pub fn generate(cfg: &Config, ctx: &mut Context, out: &mut dyn Output) -> UResult<Vec<Curve>> {
    let base_plan = Plan {
        seed: SeedGen::Skip,
        field: FieldGen::Random {
            kind: cfg.field,
            bits: cfg.bits,
        },
        a: if cfg.koblitz { AGen::Zero } else { AGen::Random },
        b: BGen::Random,
        curve: CurveGen::Nonsingular,
        order: OrderGen::Compute {
            require_prime: false,
            cofactor_bound: None,
        },
        generators: GensGen::Any,
        points: PointsGen::Skip,
    };
    let mut base = Curve::new();
    pipeline::run(&mut base, ctx, &base_plan, &no_args(), Stage::Field, END);

    let order = base.order.clone().expect("order stage ran");
    let primes = target_primes(&order);
    verbose!(
        "invalid: searching {} curves for primes up to {}",
        primes.len(),
        primes.last().expect("the target set is never empty")
    );

    out.begin().map_err(EcgenError::Io)?;
    out.emit(&base).map_err(EcgenError::Io)?;
    out.separator().map_err(EcgenError::Io)?;

    let field = base.field.clone().expect("field stage ran");
    let a = base.a.clone().expect("a stage ran");
    let curves = if cfg.threads > 1 {
        threaded(cfg, ctx, &field, &a, &primes, out)?
    } else {
        sequential(ctx, &field, &a, &primes, cfg.unique, out)?
    };
    out.end().map_err(EcgenError::Io)?;
    Ok(curves)
}

/// Generate one candidate through its order and report which still-open
/// slots it satisfies.
fn open_hits(order: &BigUint, primes: &[u64], taken: impl Fn(usize) -> bool) -> Vec<usize> {
    (0..primes.len())
        .filter(|&i| !taken(i) && (order % primes[i]).is_zero())
        .collect()
}

/// Finish a candidate that satisfies some slots: bounded generator search,
/// then trial point search for exactly the satisfied primes. `false` means
/// the candidate should be discarded.
fn finish_candidate(
    cand: &mut Curve,
    ctx: &mut Context,
    plan: &Plan,
    primes: &[u64],
    hits: &[usize],
) -> bool {
    if !pipeline::run_bounded(
        cand,
        ctx,
        plan,
        &no_args(),
        Stage::Generators,
        Stage::Points.index(),
        1,
    ) {
        return false;
    }
    let arg = StageArg::Primes(hits.iter().map(|&i| primes[i]).collect());
    let mut args = no_args();
    args[Stage::Points.index()] = Some(&arg);
    pipeline::run(cand, ctx, plan, &args, Stage::Points, END)
}

fn sequential(
    ctx: &mut Context,
    field: &Field,
    a: &BigUint,
    primes: &[u64],
    unique: bool,
    out: &mut dyn Output,
) -> UResult<Vec<Curve>> {
    let n = primes.len();
    let plan = candidate_plan(unique);
    let mut slots: Vec<Option<Curve>> = vec![None; n];
    let mut filled = 0usize;
    let mut cand = Curve::with_base(field.clone(), a.clone());
    while filled < n {
        pipeline::run(
            &mut cand,
            ctx,
            &plan,
            &no_args(),
            Stage::B,
            Stage::Generators.index(),
        );
        let order = cand.order.clone().expect("order stage ran");
        let hits = open_hits(&order, primes, |i| slots[i].is_some());
        if hits.is_empty() || !finish_candidate(&mut cand, ctx, &plan, primes, &hits) {
            cand.reset_to_base();
            continue;
        }
        let done = mem::replace(&mut cand, Curve::with_base(field.clone(), a.clone()));
        for &i in &hits[1..] {
            slots[i] = Some(done.clone());
        }
        slots[hits[0]] = Some(done);
        filled += hits.len();
        verbose!("invalid: {filled}/{n} slots filled");
        for (k, &i) in hits.iter().enumerate() {
            out.emit(slots[i].as_ref().expect("just filled"))
                .map_err(EcgenError::Io)?;
            let last_overall = filled == n && k + 1 == hits.len();
            if !last_overall {
                out.separator().map_err(EcgenError::Io)?;
            }
        }
    }
    Ok(slots
        .into_iter()
        .map(|s| s.expect("loop exits only when every slot is filled"))
        .collect())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    Claimed,
    Done,
}

struct Board {
    states: Vec<Slot>,
    filled: usize,
}

fn threaded(
    cfg: &Config,
    ctx: &mut Context,
    field: &Field,
    a: &BigUint,
    primes: &[u64],
    out: &mut dyn Output,
) -> UResult<Vec<Curve>> {
    let n = primes.len();
    let board = Mutex::new(Board {
        states: vec![Slot::Free; n],
        filled: 0,
    });
    let (tx, rx) = mpsc::channel::<(usize, Curve)>();
    let mut slots: Vec<Option<Curve>> = vec![None; n];

    thread::scope(|scope| -> UResult<()> {
        for w in 0..cfg.threads {
            let mut wctx = ctx.fork();
            let tx = tx.clone();
            let board = &board;
            let field = field.clone();
            let a = a.clone();
            let mut builder = thread::Builder::new().name(format!("invalid{w}"));
            if let Some(size) = cfg.thread_stack {
                builder = builder.stack_size(size);
            }
            let unique = cfg.unique;
            builder
                .spawn_scoped(scope, move || {
                    worker(board, tx, &field, &a, primes, unique, &mut wctx);
                })
                .map_err(EcgenError::ThreadSpawn)?;
        }
        drop(tx);

        let mut received = 0usize;
        while received < n {
            let (slot, curve) = rx
                .recv()
                .expect("workers fill every slot before hanging up");
            out.emit(&curve).map_err(EcgenError::Io)?;
            received += 1;
            verbose!("invalid: {received}/{n} slots filled");
            if received < n {
                out.separator().map_err(EcgenError::Io)?;
            }
            slots[slot] = Some(curve);
        }
        Ok(())
    })?;

    Ok(slots
        .into_iter()
        .map(|s| s.expect("the coordinator stored every received slot"))
        .collect())
}

fn worker(
    board: &Mutex<Board>,
    tx: Sender<(usize, Curve)>,
    field: &Field,
    a: &BigUint,
    primes: &[u64],
    unique: bool,
    ctx: &mut Context,
) {
    let n = primes.len();
    let plan = candidate_plan(unique);
    let mut cand = Curve::with_base(field.clone(), a.clone());
    loop {
        if board.lock().expect("board lock poisoned").filled == n {
            return;
        }
        pipeline::run(
            &mut cand,
            ctx,
            &plan,
            &no_args(),
            Stage::B,
            Stage::Generators.index(),
        );
        let order = cand.order.clone().expect("order stage ran");
        // claim before the expensive point search so no other worker
        // duplicates the work
        let hits = {
            let mut b = board.lock().expect("board lock poisoned");
            let hits = open_hits(&order, primes, |i| b.states[i] != Slot::Free);
            for &i in &hits {
                b.states[i] = Slot::Claimed;
            }
            hits
        };
        if hits.is_empty() {
            cand.reset_to_base();
            continue;
        }
        if !finish_candidate(&mut cand, ctx, &plan, primes, &hits) {
            let mut b = board.lock().expect("board lock poisoned");
            for &i in &hits {
                b.states[i] = Slot::Free;
            }
            cand.reset_to_base();
            continue;
        }
        {
            let mut b = board.lock().expect("board lock poisoned");
            for &i in &hits {
                b.states[i] = Slot::Done;
            }
            b.filled += hits.len();
        }
        let done = mem::replace(&mut cand, Curve::with_base(field.clone(), a.clone()));
        let (first, rest) = hits.split_first().expect("hits is non-empty");
        for &i in rest {
            tx.send((i, done.clone()))
                .expect("the coordinator outlives the workers");
        }
        tx.send((*first, done))
            .expect("the coordinator outlives the workers");
    }
}
