// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore (words) koblitz anomalous primorial

//! ecgen generates elliptic curve domain parameters: random curves over
//! prime or binary fields, curves with prime order or bounded cofactor,
//! Koblitz and anomalous curves, and sets of invalid curves for testing
//! point-validation failures.

pub mod anomalous;
pub mod config;
pub mod context;
pub mod errors;
pub mod exhaustive;
pub mod gen;
pub mod invalid;
pub mod math;
pub mod output;
pub mod verbose;

mod uu_args;
pub use uu_args::options;
pub use uu_args::uu_app;

use uucore::error::UResult;

use crate::anomalous::DiscTable;
use crate::config::Config;
use crate::context::Context;
use crate::errors::EcgenError;

#[uucore::main]
pub fn uumain(args: impl uucore::Args) -> UResult<()> {
    let matches = uu_app().try_get_matches_from(args)?;
    let cfg = Config::from_matches(&matches)?;
    verbose::init(cfg.verbose, cfg.verbose_log.as_deref()).map_err(EcgenError::Io)?;

    if cfg.from_seed {
        return Err(EcgenError::Unimplemented("seeded generation (--seed)").into());
    }
    if cfg.fixed_order.is_some() {
        return Err(EcgenError::Unimplemented("fixed-order generation (--order)").into());
    }

    let mut ctx = Context::from_entropy();
    let mut out = output::create(&cfg)?;

    if cfg.invalid {
        invalid::generate(&cfg, &mut ctx, out.as_mut())?;
    } else if cfg.anomalous {
        let table = DiscTable::build();
        exhaustive::generate(&cfg, &mut ctx, Some(&table), out.as_mut())?;
    } else {
        exhaustive::generate(&cfg, &mut ctx, None, out.as_mut())?;
    }
    Ok(())
}
