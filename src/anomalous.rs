// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Anomalous curve generation data.
//!
//! An anomalous curve over F_p has exactly p points. Such curves come from
//! complex multiplication by an order of discriminant -d with class number
//! one and p = (1 + d*y^2) / 4: the curve with the corresponding
//! j-invariant (or its quadratic twist) has trace of Frobenius 1. The five
//! usable discriminants and their j-invariants are tabulated here; all five
//! j values are negative, so they are stored by absolute value.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;

use crate::context::Context;

#[derive(Clone, Debug)]
pub struct DiscEntry {
    /// CM discriminant d (for the order of discriminant -d).
    pub d: u64,
    /// |j|, the j-invariant being negative for every listed d.
    pub j_abs: BigUint,
}

impl DiscEntry {
    /// The curve coefficient seed k = j / (1728 - j) mod p, from which
    /// a = 3k and b = 2k. `None` when p divides j or 1728 - j, which makes
    /// the construction degenerate for this prime.
    pub fn k_mod(&self, p: &BigUint) -> Option<BigUint> {
        let j = &self.j_abs % p;
        if j.is_zero() {
            return None;
        }
        // j < 0, so 1728 - j = 1728 + |j|
        let den = (&self.j_abs + 1728u32) % p;
        if den.is_zero() {
            return None;
        }
        // p is prime, invert by Fermat
        let den_inv = den.modpow(&(p - 2u32), p);
        Some((p - j) * den_inv % p)
    }
}

pub struct DiscTable {
    entries: Vec<DiscEntry>,
}

impl DiscTable {
    pub fn build() -> Self {
        let table: [(u64, u128); 5] = [
            (11, 32_768),
            (19, 884_736),
            (43, 884_736_000),
            (67, 147_197_952_000),
            (163, 262_537_412_640_768_000),
        ];
        Self {
            entries: table
                .iter()
                .map(|&(d, j_abs)| DiscEntry {
                    d,
                    j_abs: BigUint::from(j_abs),
                })
                .collect(),
        }
    }

    /// Pick a discriminant uniformly; each generated curve draws its own.
    pub fn pick(&self, ctx: &mut Context) -> &DiscEntry {
        let i = ctx.rng().gen_range(0..self.entries.len());
        &self.entries[i]
    }

    pub fn entries(&self) -> &[DiscEntry] {
        &self.entries
    }
}
