// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! The plain generation driver: random, prime-order, bounded-cofactor,
//! Koblitz, unique-generator and anomalous curves, in any requested count.

use uucore::error::UResult;

use crate::anomalous::DiscTable;
use crate::config::{Config, PointsKind};
use crate::context::Context;
use crate::errors::EcgenError;
use crate::gen::stages::{
    AGen, BGen, CurveGen, FieldGen, GensGen, OrderGen, Plan, PointsGen, SeedGen,
};
use crate::gen::{no_args, pipeline, Stage, END};
use crate::math::curve::Curve;
use crate::output::Output;
use crate::verbose;

/// Generate `cfg.count` curves and stream them into the sink. The table is
/// present exactly when the anomalous mode is selected.
pub fn generate(
    cfg: &Config,
    ctx: &mut Context,
    table: Option<&DiscTable>,
    out: &mut dyn Output,
) -> UResult<()> {
    out.begin().map_err(EcgenError::Io)?;
    for i in 0..cfg.count {
        let plan = plan_for(cfg, ctx, table);
        let mut curve = Curve::new();
        pipeline::run(&mut curve, ctx, &plan, &no_args(), Stage::Field, END);
        verbose!("curve {} of {} generated", i + 1, cfg.count);
        out.emit(&curve).map_err(EcgenError::Io)?;
        if i + 1 < cfg.count {
            out.separator().map_err(EcgenError::Io)?;
        }
    }
    out.end().map_err(EcgenError::Io)?;
    Ok(())
}

/// Bind a strategy to every stage for one curve. Anomalous curves draw a
/// fresh discriminant each time.
fn plan_for(cfg: &Config, ctx: &mut Context, table: Option<&DiscTable>) -> Plan {
    let field;
    let a;
    let b;
    let order;
    if let Some(table) = table {
        let entry = table.pick(ctx).clone();
        field = FieldGen::AnomalousPrime {
            entry: entry.clone(),
            bits: cfg.bits,
        };
        a = AGen::CmDerived {
            entry: entry.clone(),
        };
        b = BGen::CmDerived { entry };
        order = OrderGen::FieldCharacteristic;
    } else {
        field = FieldGen::Random {
            kind: cfg.field,
            bits: cfg.bits,
        };
        a = if cfg.koblitz { AGen::Zero } else { AGen::Random };
        b = BGen::Random;
        order = OrderGen::Compute {
            require_prime: cfg.prime,
            cofactor_bound: cfg.cofactor_bound,
        };
    }
    Plan {
        seed: SeedGen::Skip,
        field,
        a,
        b,
        curve: CurveGen::Nonsingular,
        order,
        generators: if cfg.unique { GensGen::One } else { GensGen::Any },
        points: match cfg.points.kind {
            PointsKind::None => PointsGen::Skip,
            PointsKind::Random => PointsGen::Random(cfg.points.amount),
            PointsKind::Prime => PointsGen::Prime,
            PointsKind::All => PointsGen::All,
        },
    }
}
