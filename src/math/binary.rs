// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Polynomial arithmetic over GF(2), with polynomials packed into the bits
//! of a `BigUint` (bit i is the coefficient of x^i).

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

/// Degree of a nonzero polynomial.
pub fn degree(f: &BigUint) -> u64 {
    debug_assert!(!f.is_zero());
    f.bits() - 1
}

/// Carry-less product of two polynomials.
pub fn mul(a: &BigUint, b: &BigUint) -> BigUint {
    let mut acc = BigUint::zero();
    for i in 0..b.bits() {
        if b.bit(i) {
            acc ^= a << i;
        }
    }
    acc
}

/// Remainder of `x` modulo `f`.
pub fn rem(mut x: BigUint, f: &BigUint) -> BigUint {
    while !x.is_zero() && x.bits() >= f.bits() {
        let shift = x.bits() - f.bits();
        x ^= f << shift;
    }
    x
}

/// Quotient and remainder of `a` divided by `f`.
fn div_rem(a: &BigUint, f: &BigUint) -> (BigUint, BigUint) {
    let mut q = BigUint::zero();
    let mut r = a.clone();
    while !r.is_zero() && r.bits() >= f.bits() {
        let shift = r.bits() - f.bits();
        q ^= BigUint::one() << shift;
        r ^= f << shift;
    }
    (q, r)
}

pub fn mulmod(a: &BigUint, b: &BigUint, f: &BigUint) -> BigUint {
    rem(mul(a, b), f)
}

pub fn sqrmod(a: &BigUint, f: &BigUint) -> BigUint {
    rem(mul(a, a), f)
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = rem(a, &b);
        a = b;
        b = r;
    }
    a
}

/// Inverse of `a` modulo `f`, `None` for zero. Extended Euclid over GF(2)[x].
pub fn invmod(a: &BigUint, f: &BigUint) -> Option<BigUint> {
    if a.is_zero() {
        return None;
    }
    let (mut r0, mut r1) = (f.clone(), rem(a.clone(), f));
    let (mut t0, mut t1) = (BigUint::zero(), BigUint::one());
    while !r1.is_zero() {
        let (q, r) = div_rem(&r0, &r1);
        r0 = std::mem::replace(&mut r1, r);
        let t = &t0 ^ mul(&q, &t1);
        t0 = std::mem::replace(&mut t1, t);
    }
    // gcd must be the constant 1 when f is irreducible
    if r0 == BigUint::one() {
        Some(rem(t0, f))
    } else {
        None
    }
}

/// x^(2^k) modulo `f`.
fn frobenius_of_x(k: u64, f: &BigUint) -> BigUint {
    let mut h = BigUint::from(2u32); // the polynomial x
    for _ in 0..k {
        h = sqrmod(&h, f);
    }
    h
}

fn prime_divisors(mut m: u64) -> Vec<u64> {
    let mut out = Vec::new();
    let mut d = 2;
    while d * d <= m {
        if m % d == 0 {
            out.push(d);
            while m % d == 0 {
                m /= d;
            }
        }
        d += 1;
    }
    if m > 1 {
        out.push(m);
    }
    out
}

/// Rabin's irreducibility test for a degree-`m` polynomial.
pub fn is_irreducible(f: &BigUint, m: u64) -> bool {
    if degree(f) != m || !f.bit(0) {
        return false;
    }
    let x = BigUint::from(2u32);
    for r in prime_divisors(m) {
        let h = frobenius_of_x(m / r, f);
        if gcd(&(&h ^ &x), f) != BigUint::one() {
            return false;
        }
    }
    frobenius_of_x(m, f) == x
}

/// Draw a random monic irreducible polynomial of degree `m`.
pub fn random_irreducible<R: Rng>(m: u64, rng: &mut R) -> BigUint {
    let top = BigUint::one() << m;
    loop {
        let f = &top | rng.gen_biguint(m) | BigUint::one();
        if is_irreducible(&f, m) {
            return f;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn poly(bits: u64) -> BigUint {
        BigUint::from(bits)
    }

    #[test]
    fn multiplication_reduces() {
        // (x + 1)^2 = x^2 + 1
        assert_eq!(mul(&poly(0b11), &poly(0b11)), poly(0b101));
        // x^4 + x + 1 is the AES-ish GF(16) modulus; x * x^3 = x^4 = x + 1
        let f = poly(0b10011);
        assert_eq!(mulmod(&poly(0b10), &poly(0b1000), &f), poly(0b11));
    }

    #[test]
    fn inverse_roundtrip() {
        let f = poly(0b10011); // x^4 + x + 1, irreducible
        for v in 1u64..16 {
            let a = poly(v);
            let inv = invmod(&a, &f).unwrap();
            assert_eq!(mulmod(&a, &inv, &f), BigUint::one(), "a = {v}");
        }
    }

    #[test]
    fn known_irreducibles() {
        assert!(is_irreducible(&poly(0b111), 2)); // x^2 + x + 1
        assert!(is_irreducible(&poly(0b1011), 3)); // x^3 + x + 1
        assert!(is_irreducible(&poly(0b10011), 4)); // x^4 + x + 1
        assert!(!is_irreducible(&poly(0b1111), 3)); // (x + 1)(x^2 + 1)... reducible
        assert!(!is_irreducible(&poly(0b101), 2)); // x^2 + 1 = (x + 1)^2
    }

    #[test]
    fn random_irreducible_has_requested_degree() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        for m in [5u64, 8, 13] {
            let f = random_irreducible(m, &mut rng);
            assert_eq!(degree(&f), m);
            assert!(is_irreducible(&f, m));
        }
    }
}
