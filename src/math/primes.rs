// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Prime and integer utilities on top of `num-prime`.

use num_bigint::{BigUint, RandBigInt};
use num_prime::nt_funcs;
use num_traits::{One, Zero};
use rand::Rng;

pub fn is_prime(n: &BigUint) -> bool {
    nt_funcs::is_prime(n, None).probably()
}

/// Draw a random prime of exactly `bits` bits.
pub fn random_prime<R: Rng>(bits: u64, rng: &mut R) -> BigUint {
    let top = BigUint::one() << (bits - 1);
    loop {
        let p = (&top | rng.gen_biguint(bits - 1)) | BigUint::one();
        if is_prime(&p) {
            return p;
        }
    }
}

/// Full factorization, sorted by prime. The sizes ecgen works at factor
/// completely; a cofactor `num-prime` gives up on is kept as a single
/// unfactored entry.
pub fn factorize(n: &BigUint) -> Vec<(BigUint, usize)> {
    let (map, remainder) = nt_funcs::factors(n.clone(), None);
    let mut out: Vec<(BigUint, usize)> = map.into_iter().collect();
    if let Some(rest) = remainder {
        for r in rest {
            out.push((r, 1));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Integer square root by Newton iteration.
pub fn isqrt(n: &BigUint) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }
    let mut x = BigUint::one() << n.bits().div_ceil(2);
    loop {
        let y = (&x + n / &x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    if a.is_zero() || b.is_zero() {
        return BigUint::zero();
    }
    a / gcd(a, b) * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn isqrt_matches_floor() {
        for n in 0u64..200 {
            let r = isqrt(&BigUint::from(n));
            assert!(&r * &r <= BigUint::from(n));
            let r1 = &r + 1u32;
            assert!(&r1 * &r1 > BigUint::from(n));
        }
    }

    #[test]
    fn random_prime_exact_bits() {
        let mut rng = ChaCha12Rng::seed_from_u64(9);
        for bits in [8u64, 12, 20] {
            let p = random_prime(bits, &mut rng);
            assert_eq!(p.bits(), bits);
            assert!(is_prime(&p));
        }
    }

    #[test]
    fn factorize_small() {
        let f = factorize(&BigUint::from(360u32));
        assert_eq!(
            f,
            vec![
                (BigUint::from(2u32), 3),
                (BigUint::from(3u32), 2),
                (BigUint::from(5u32), 1)
            ]
        );
    }

    #[test]
    fn gcd_lcm() {
        let a = BigUint::from(12u32);
        let b = BigUint::from(18u32);
        assert_eq!(gcd(&a, &b), BigUint::from(6u32));
        assert_eq!(lcm(&a, &b), BigUint::from(36u32));
    }
}
