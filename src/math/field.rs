// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Finite field arithmetic, for prime fields F_p and binary fields
//! F_2^m = GF(2)[x]/f(x).

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

use crate::math::binary;

/// Which kind of field to generate, before one exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Prime,
    Binary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// F_p for a prime p.
    Prime { p: BigUint },
    /// F_2^m with reduction polynomial `poly` (the x^m bit included).
    Binary { m: u64, poly: BigUint },
}

impl Field {
    /// Bit length of the field: bits of p, or the extension degree m.
    pub fn bits(&self) -> u64 {
        match self {
            Field::Prime { p } => p.bits(),
            Field::Binary { m, .. } => *m,
        }
    }

    /// Number of field elements.
    pub fn size(&self) -> BigUint {
        match self {
            Field::Prime { p } => p.clone(),
            Field::Binary { m, .. } => BigUint::one() << *m,
        }
    }

    pub fn zero(&self) -> BigUint {
        BigUint::zero()
    }

    pub fn one(&self) -> BigUint {
        BigUint::one()
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        match self {
            Field::Prime { p } => (a + b) % p,
            Field::Binary { .. } => a ^ b,
        }
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        match self {
            Field::Prime { p } => (a + p - b) % p,
            Field::Binary { .. } => a ^ b,
        }
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        match self {
            Field::Prime { p } => {
                if a.is_zero() {
                    BigUint::zero()
                } else {
                    p - a
                }
            }
            Field::Binary { .. } => a.clone(),
        }
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        match self {
            Field::Prime { p } => (a * b) % p,
            Field::Binary { poly, .. } => binary::mulmod(a, b, poly),
        }
    }

    pub fn sqr(&self, a: &BigUint) -> BigUint {
        self.mul(a, a)
    }

    /// Inverse of a nonzero element. p is always prime here, so Fermat
    /// serves for the prime case.
    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        match self {
            Field::Prime { p } => Some(a.modpow(&(p - 2u32), p)),
            Field::Binary { poly, .. } => binary::invmod(a, poly),
        }
    }

    pub fn div(&self, a: &BigUint, b: &BigUint) -> Option<BigUint> {
        self.inv(b).map(|inv| self.mul(a, &inv))
    }

    pub fn rand_element<R: Rng>(&self, rng: &mut R) -> BigUint {
        match self {
            Field::Prime { p } => rng.gen_biguint_range(&BigUint::zero(), p),
            Field::Binary { m, .. } => rng.gen_biguint(*m),
        }
    }

    pub fn rand_nonzero<R: Rng>(&self, rng: &mut R) -> BigUint {
        loop {
            let a = self.rand_element(rng);
            if !a.is_zero() {
                return a;
            }
        }
    }

    /// Whether `a` is a nonzero square, in a prime field.
    pub fn is_qr(&self, a: &BigUint) -> bool {
        match self {
            Field::Prime { p } => {
                !a.is_zero() && a.modpow(&((p - 1u32) >> 1), p) == BigUint::one()
            }
            // Squaring is a bijection in characteristic 2.
            Field::Binary { .. } => true,
        }
    }

    /// Square root of `a`, `None` when `a` is a nonresidue.
    pub fn sqrt<R: Rng>(&self, a: &BigUint, rng: &mut R) -> Option<BigUint> {
        match self {
            Field::Prime { p } => {
                if a.is_zero() {
                    return Some(BigUint::zero());
                }
                if !self.is_qr(a) {
                    return None;
                }
                if p % 4u32 == BigUint::from(3u32) {
                    return Some(a.modpow(&((p + 1u32) >> 2), p));
                }
                Some(self.tonelli_shanks(a, rng))
            }
            Field::Binary { m, .. } => {
                // sqrt(a) = a^(2^(m-1))
                let mut r = a.clone();
                for _ in 0..m.saturating_sub(1) {
                    r = self.sqr(&r);
                }
                Some(r)
            }
        }
    }

    /// Tonelli-Shanks for p = 1 mod 4. Assumes `a` is a known residue.
    fn tonelli_shanks<R: Rng>(&self, a: &BigUint, rng: &mut R) -> BigUint {
        let Field::Prime { p } = self else {
            unreachable!("tonelli_shanks is prime-field only");
        };
        // p - 1 = q * 2^s with q odd
        let mut q = p - 1u32;
        let mut s = 0u64;
        while !q.bit(0) {
            q >>= 1;
            s += 1;
        }
        // any nonresidue serves as the starting generator
        let n = loop {
            let n = self.rand_nonzero(rng);
            if !self.is_qr(&n) {
                break n;
            }
        };
        let mut c = n.modpow(&q, p);
        let mut t = a.modpow(&q, p);
        let mut r = a.modpow(&((&q + 1u32) >> 1), p);
        let mut m = s;
        while t != BigUint::one() {
            let mut i = 0u64;
            let mut t2 = t.clone();
            while t2 != BigUint::one() {
                t2 = self.sqr(&t2);
                i += 1;
            }
            let b = c.modpow(&(BigUint::one() << (m - i - 1)), p);
            c = self.sqr(&b);
            t = self.mul(&t, &c);
            r = self.mul(&r, &b);
            m = i;
        }
        r
    }

    /// Absolute trace Tr(c) of a binary field element, as 0 or 1.
    pub fn trace(&self, c: &BigUint) -> BigUint {
        let Field::Binary { m, .. } = self else {
            unreachable!("trace is binary-field only");
        };
        let mut acc = c.clone();
        let mut pow = c.clone();
        for _ in 1..*m {
            pow = self.sqr(&pow);
            acc ^= &pow;
        }
        acc
    }

    /// Solve z^2 + z = c in a binary field. A solution exists iff Tr(c) = 0;
    /// the other root is z + 1.
    pub fn solve_quadratic<R: Rng>(&self, c: &BigUint, rng: &mut R) -> Option<BigUint> {
        let Field::Binary { m, .. } = self else {
            unreachable!("solve_quadratic is binary-field only");
        };
        if self.trace(c) != BigUint::zero() {
            return None;
        }
        // half-trace construction: pick theta with Tr(theta) = 1, then
        // z = sum_i s_i theta^(2^i) with s_i the partial trace sums of c.
        let theta = if m % 2 == 1 {
            BigUint::one()
        } else {
            loop {
                let t = self.rand_element(rng);
                if self.trace(&t) == BigUint::one() {
                    break t;
                }
            }
        };
        let mut z = BigUint::zero();
        let mut s = c.clone(); // s_0 = c
        let mut c_pow = c.clone();
        let mut theta_pow = theta;
        for i in 0..*m {
            if i > 0 {
                c_pow = self.sqr(&c_pow);
                s ^= &c_pow;
                theta_pow = self.sqr(&theta_pow);
            }
            z ^= self.mul(&s, &theta_pow);
        }
        debug_assert_eq!(self.add(&self.sqr(&z), &z), *c);
        Some(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn fp(p: u64) -> Field {
        Field::Prime {
            p: BigUint::from(p),
        }
    }

    fn f2m(m: u64, poly: u64) -> Field {
        Field::Binary {
            m,
            poly: BigUint::from(poly),
        }
    }

    #[test]
    fn prime_field_inverse() {
        let f = fp(10007);
        for v in [1u64, 2, 3, 9999, 10006] {
            let a = BigUint::from(v);
            let inv = f.inv(&a).unwrap();
            assert_eq!(f.mul(&a, &inv), BigUint::one());
        }
        assert_eq!(f.inv(&BigUint::zero()), None);
    }

    #[test]
    fn prime_field_sqrt_both_branches() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        // 10007 = 3 mod 4, 10009 = 1 mod 4
        for p in [10007u64, 10009] {
            let f = fp(p);
            for v in 2u64..40 {
                let a = BigUint::from(v);
                match f.sqrt(&a, &mut rng) {
                    Some(r) => assert_eq!(f.sqr(&r), a, "p = {p}, a = {v}"),
                    None => assert!(!f.is_qr(&a)),
                }
            }
        }
    }

    #[test]
    fn binary_field_sqrt() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let f = f2m(4, 0b10011);
        for v in 0u64..16 {
            let a = BigUint::from(v);
            let r = f.sqrt(&a, &mut rng).unwrap();
            assert_eq!(f.sqr(&r), a);
        }
    }

    #[test]
    fn binary_quadratic_solver() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        for (m, poly) in [(4u64, 0b10011u64), (5, 0b100101), (8, 0b100011011)] {
            let f = f2m(m, poly);
            let mut solvable = 0;
            for v in 0u64..(1 << m) {
                let c = BigUint::from(v);
                if let Some(z) = f.solve_quadratic(&c, &mut rng) {
                    assert_eq!(f.add(&f.sqr(&z), &z), c);
                    solvable += 1;
                }
            }
            // exactly half of the field has trace zero
            assert_eq!(solvable, 1 << (m - 1));
        }
    }

    #[test]
    fn rand_element_in_range() {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let f = fp(101);
        for _ in 0..50 {
            assert!(f.rand_element(&mut rng) < BigUint::from(101u32));
        }
        let g = f2m(6, 0b1000011);
        for _ in 0..50 {
            assert!(g.rand_element(&mut rng).bits() <= 6);
        }
    }
}
