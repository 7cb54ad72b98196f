// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Group order and point order computation.
//!
//! The group order comes from a Shanks-Mestre style search: baby-step
//! giant-step over the Hasse interval for random points, refined by taking
//! lcms of point orders, alternating with the quadratic twist until a unique
//! candidate remains. The baby-step table costs on the order of q^(1/4)
//! group operations and as much memory, so the search is practical up to
//! moderate field sizes; cryptographic sizes need Schoof-class point
//! counting instead.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::Rng;

use crate::math::curve::{Curve, Params, Point};
use crate::math::field::Field;
use crate::math::primes;

/// The Hasse interval [q + 1 - 2*sqrt(q), q + 1 + 2*sqrt(q)] containing the
/// order of every curve over a field of `size` elements.
pub fn hasse_interval(size: &BigUint) -> (BigUint, BigUint) {
    let center = size + 1u32;
    let radius = primes::isqrt(&(size * 4u32));
    (&center - &radius, center + radius)
}

/// All k in [lo, hi] with k * P = O, ascending.
pub fn annihilators(params: &Params, p: &Point, lo: &BigUint, hi: &BigUint) -> Vec<BigUint> {
    let width = hi - lo + 1u32;
    let m = primes::isqrt(&width) + 1u32;

    // baby steps j * P, j = 1..=m; a hit on infinity reveals ord(P) directly
    let mut table: HashMap<Point, BigUint> = HashMap::new();
    let mut step = Point::Infinity;
    let mut j = BigUint::one();
    while j <= m {
        step = params.add(&step, p);
        if step.is_infinity() {
            return multiples_in(&j, lo, hi);
        }
        table.insert(step.clone(), j.clone());
        j += 1u32;
    }
    // ord(P) > m now, so the baby table has no collisions

    let stride = params.mul(&m, p);
    let mut giant = params.mul(lo, p);
    let mut base = lo.clone();
    let mut out = Vec::new();
    while base <= *hi {
        if giant.is_infinity() {
            out.push(base.clone());
        } else if let Some(j) = table.get(&params.neg(&giant)) {
            let k = &base + j;
            if k <= *hi {
                out.push(k);
            }
        }
        base += &m;
        giant = params.add(&giant, &stride);
    }
    out.sort();
    out.dedup();
    out
}

/// Multiples of `d` inside [lo, hi], ascending.
pub fn multiples_in(d: &BigUint, lo: &BigUint, hi: &BigUint) -> Vec<BigUint> {
    let mut k = (lo + d - 1u32) / d * d;
    let mut out = Vec::new();
    while k <= *hi {
        out.push(k.clone());
        k += d;
    }
    out
}

/// Coefficients of a quadratic twist, valid for both field kinds.
fn twist_coeffs<R: Rng>(params: &Params, rng: &mut R) -> (BigUint, BigUint) {
    match params.field {
        Field::Prime { .. } => params.twist(rng),
        Field::Binary { .. } => {
            // adding a trace-one element to a twists the curve
            let t = loop {
                let t = params.field.rand_nonzero(rng);
                if params.field.trace(&t) == BigUint::one() {
                    break t;
                }
            };
            (params.field.add(params.a, &t), params.b.clone())
        }
    }
}

/// Order of the curve group.
pub fn curve_order<R: Rng>(params: &Params, rng: &mut R) -> BigUint {
    let size = params.field.size();
    let (lo, hi) = hasse_interval(&size);
    let total = &size * 2u32 + 2u32;

    let (ta, tb) = twist_coeffs(params, rng);
    let twisted = Curve {
        field: Some(params.field.clone()),
        a: Some(ta),
        b: Some(tb),
        ..Curve::default()
    };

    // exponent lower bounds accumulated for the curve and its twist
    let mut known = [BigUint::one(), BigUint::one()];
    let mut round = 0usize;
    loop {
        let side = round % 2;
        round += 1;
        let tp = twisted.params();
        let pr = if side == 0 { params } else { &tp };

        let point = pr.random_point(rng);
        let ks = annihilators(pr, &point, &lo, &hi);
        let refined = if ks.len() == 1 {
            ks[0].clone()
        } else {
            // consecutive annihilators are spaced by ord(point)
            known[side] = primes::lcm(&known[side], &(&ks[1] - &ks[0]));
            let mult = multiples_in(&known[side], &lo, &hi);
            if mult.len() != 1 {
                continue;
            }
            mult.into_iter().next().expect("len checked")
        };
        // |E| + |E_twist| = 2q + 2
        return if side == 0 { refined } else { &total - refined };
    }
}

/// Exact order of `point`, given the group order and its factorization.
pub fn point_order(
    params: &Params,
    point: &Point,
    order: &BigUint,
    factors: &[(BigUint, usize)],
) -> BigUint {
    debug_assert!(params.mul(order, point).is_infinity());
    let mut ord = order.clone();
    for (q, e) in factors {
        for _ in 0..*e {
            let reduced = &ord / q;
            if params.mul(&reduced, point).is_infinity() {
                ord = reduced;
            } else {
                break;
            }
        }
    }
    ord
}

/// Prime factorization of a divisor `d` of the group order, read off the
/// order's factorization.
pub fn divisor_factors(d: &BigUint, factors: &[(BigUint, usize)]) -> Vec<(BigUint, usize)> {
    let mut out = Vec::new();
    for (q, _) in factors {
        let mut rest = d.clone();
        let mut e = 0usize;
        while (&rest % q).is_zero() {
            rest /= q;
            e += 1;
        }
        if e > 0 {
            out.push((q.clone(), e));
        }
    }
    out
}

/// Search for a point of exact order `d`, where `d` divides the group
/// exponent. Scaling a sampled point down by its own order gives an exact
/// hit whenever `d` divides that order, so a bounded number of tries
/// suffices; `None` means the caller should retry its stage. Scaling by
/// `order / d` instead would always land on infinity in non-cyclic groups
/// whenever `order / d` is a multiple of the exponent.
pub fn point_of_order<R: Rng>(
    params: &Params,
    d: &BigUint,
    order: &BigUint,
    factors: &[(BigUint, usize)],
    rng: &mut R,
) -> Option<Point> {
    for _ in 0..100 {
        let r = params.random_point(rng);
        let ord = point_order(params, &r, order, factors);
        if !(&ord % d).is_zero() {
            continue;
        }
        // <r> is cyclic of order ord, so this has order exactly d
        let s = params.mul(&(&ord / d), &r);
        debug_assert!(params.mul(d, &s).is_infinity());
        return Some(s);
    }
    None
}

/// Combine two points of known order into one whose order is the lcm.
pub fn combine_to_lcm(
    params: &Params,
    p: (&Point, &BigUint),
    q: (&Point, &BigUint),
) -> (Point, BigUint) {
    let (pp, np) = p;
    let (qp, nq) = q;
    let l = primes::lcm(np, nq);
    // split l = a * b, gcd(a, b) = 1, a | ord(P), b | ord(Q)
    let mut a = BigUint::one();
    let mut b = BigUint::one();
    for (prime, e) in primes::factorize(&l) {
        let pe = prime.pow(e as u32);
        if (np % &pe).is_zero() {
            a *= pe;
        } else {
            b *= pe;
        }
    }
    let combined = params.add(&params.mul(&(np / &a), pp), &params.mul(&(nq / &b), qp));
    debug_assert!(params.mul(&l, &combined).is_infinity());
    (combined, l)
}
