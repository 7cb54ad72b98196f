// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Elliptic curve state and group law.
//!
//! [`Curve`] is the accumulator the staged pipeline fills in: every field is
//! optional and set by exactly one stage. [`Params`] is the borrowed view the
//! arithmetic works against once field, a and b are known.
//!
//! Prime fields use short Weierstrass y^2 = x^3 + ax + b; binary fields use
//! y^2 + xy = x^3 + ax^2 + b.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::Rng;

use crate::math::field::Field;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }
}

/// A generator of a subgroup, with its order and cofactor in the full group.
#[derive(Clone, Debug)]
pub struct Generator {
    pub point: Point,
    pub order: BigUint,
    pub cofactor: BigUint,
}

/// A point of known order, emitted by the points stage.
#[derive(Clone, Debug)]
pub struct TorsionPoint {
    pub point: Point,
    pub order: BigUint,
}

/// The curve under construction. Stages fill fields in order and the unroll
/// hooks clear them again on rollback.
#[derive(Clone, Debug, Default)]
pub struct Curve {
    pub seed: Option<BigUint>,
    pub field: Option<Field>,
    pub a: Option<BigUint>,
    pub b: Option<BigUint>,
    pub order: Option<BigUint>,
    pub order_factors: Option<Vec<(BigUint, usize)>>,
    pub generators: Vec<Generator>,
    pub points: Vec<TorsionPoint>,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh curve sharing the field and a of an already generated one.
    /// Used by the invalid-curve search, which varies only b.
    pub fn with_base(field: Field, a: BigUint) -> Self {
        Self {
            field: Some(field),
            a: Some(a),
            ..Self::default()
        }
    }

    /// Drop everything downstream of a, keeping the shared base.
    pub fn reset_to_base(&mut self) {
        self.b = None;
        self.order = None;
        self.order_factors = None;
        self.generators.clear();
        self.points.clear();
    }

    /// Borrowed arithmetic view. Valid once the field, a and b stages ran.
    pub fn params(&self) -> Params<'_> {
        Params {
            field: self.field.as_ref().expect("field set by an earlier stage"),
            a: self.a.as_ref().expect("a set by an earlier stage"),
            b: self.b.as_ref().expect("b set by an earlier stage"),
        }
    }
}

#[derive(Clone, Copy)]
pub struct Params<'a> {
    pub field: &'a Field,
    pub a: &'a BigUint,
    pub b: &'a BigUint,
}

impl Params<'_> {
    /// Whether the discriminant vanishes.
    pub fn is_singular(&self) -> bool {
        match self.field {
            Field::Prime { .. } => {
                // 4a^3 + 27b^2 = 0
                let f = self.field;
                let a3 = f.mul(&f.mul(self.a, self.a), self.a);
                let b2 = f.mul(self.b, self.b);
                f.add(
                    &f.mul(&BigUint::from(4u32), &a3),
                    &f.mul(&BigUint::from(27u32), &b2),
                )
                .is_zero()
            }
            // the discriminant of y^2 + xy = x^3 + ax^2 + b is b
            Field::Binary { .. } => self.b.is_zero(),
        }
    }

    pub fn contains(&self, pt: &Point) -> bool {
        let Point::Affine { x, y } = pt else {
            return true;
        };
        let f = self.field;
        match f {
            Field::Prime { .. } => {
                let lhs = f.sqr(y);
                let rhs = f.add(
                    &f.add(&f.mul(&f.sqr(x), x), &f.mul(self.a, x)),
                    self.b,
                );
                lhs == rhs
            }
            Field::Binary { .. } => {
                let lhs = f.add(&f.sqr(y), &f.mul(x, y));
                let rhs = f.add(
                    &f.add(&f.mul(&f.sqr(x), x), &f.mul(self.a, &f.sqr(x))),
                    self.b,
                );
                lhs == rhs
            }
        }
    }

    pub fn neg(&self, pt: &Point) -> Point {
        let Point::Affine { x, y } = pt else {
            return Point::Infinity;
        };
        let f = self.field;
        match f {
            Field::Prime { .. } => Point::Affine {
                x: x.clone(),
                y: f.neg(y),
            },
            Field::Binary { .. } => Point::Affine {
                x: x.clone(),
                y: f.add(x, y),
            },
        }
    }

    pub fn add(&self, p: &Point, q: &Point) -> Point {
        let (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) = (p, q) else {
            return if p.is_infinity() { q.clone() } else { p.clone() };
        };
        if p == &self.neg(q) {
            return Point::Infinity;
        }
        if p == q {
            return self.double(p);
        }
        let f = self.field;
        match f {
            Field::Prime { .. } => {
                let lambda = f
                    .div(&f.sub(y2, y1), &f.sub(x2, x1))
                    .expect("distinct non-opposite points have distinct x");
                let x3 = f.sub(&f.sub(&f.sqr(&lambda), x1), x2);
                let y3 = f.sub(&f.mul(&lambda, &f.sub(x1, &x3)), y1);
                Point::Affine { x: x3, y: y3 }
            }
            Field::Binary { .. } => {
                let lambda = f
                    .div(&f.add(y1, y2), &f.add(x1, x2))
                    .expect("distinct non-opposite points have distinct x");
                let x3 = f.add(
                    &f.add(&f.add(&f.sqr(&lambda), &lambda), &f.add(x1, x2)),
                    self.a,
                );
                let y3 = f.add(&f.add(&f.mul(&lambda, &f.add(x1, &x3)), &x3), y1);
                Point::Affine { x: x3, y: y3 }
            }
        }
    }

    pub fn double(&self, p: &Point) -> Point {
        let Point::Affine { x, y } = p else {
            return Point::Infinity;
        };
        if p == &self.neg(p) {
            return Point::Infinity;
        }
        let f = self.field;
        match f {
            Field::Prime { .. } => {
                let num = f.add(&f.mul(&BigUint::from(3u32), &f.sqr(x)), self.a);
                let lambda = f
                    .div(&num, &f.mul(&BigUint::from(2u32), y))
                    .expect("2-torsion handled above");
                let x3 = f.sub(&f.sub(&f.sqr(&lambda), x), x);
                let y3 = f.sub(&f.mul(&lambda, &f.sub(x, &x3)), y);
                Point::Affine { x: x3, y: y3 }
            }
            Field::Binary { .. } => {
                // x = 0 is the 2-torsion point, caught by the neg check
                let lambda = f.add(x, &f.div(y, x).expect("2-torsion handled above"));
                let x3 = f.add(&f.add(&f.sqr(&lambda), &lambda), self.a);
                let y3 = f.add(&f.sqr(x), &f.mul(&f.add(&lambda, &f.one()), &x3));
                Point::Affine { x: x3, y: y3 }
            }
        }
    }

    /// Scalar multiple k * P by double-and-add.
    pub fn mul(&self, k: &BigUint, p: &Point) -> Point {
        let mut acc = Point::Infinity;
        if k.is_zero() || p.is_infinity() {
            return acc;
        }
        for i in (0..k.bits()).rev() {
            acc = self.double(&acc);
            if k.bit(i) {
                acc = self.add(&acc, p);
            }
        }
        acc
    }

    /// Draw a uniformly random affine point on the curve.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Point {
        let f = self.field;
        match f {
            Field::Prime { .. } => loop {
                let x = f.rand_element(rng);
                let rhs = f.add(&f.add(&f.mul(&f.sqr(&x), &x), &f.mul(self.a, &x)), self.b);
                if let Some(y) = f.sqrt(&rhs, rng) {
                    let y = if rng.gen::<bool>() { f.neg(&y) } else { y };
                    return Point::Affine { x, y };
                }
            },
            Field::Binary { .. } => loop {
                let x = f.rand_element(rng);
                if x.is_zero() {
                    // (0, sqrt(b)) is the lone point with x = 0
                    let y = f.sqrt(self.b, rng).expect("squaring is a bijection");
                    return Point::Affine { x, y };
                }
                // substitute y = xz: z^2 + z = x + a + b / x^2
                let c = f.add(
                    &f.add(&x, self.a),
                    &f.div(self.b, &f.sqr(&x)).expect("x is nonzero"),
                );
                if let Some(z) = f.solve_quadratic(&c, rng) {
                    let z = if rng.gen::<bool>() { z ^ BigUint::one() } else { z };
                    let y = f.mul(&x, &z);
                    return Point::Affine { x, y };
                }
            },
        }
    }

    /// Coefficients of a quadratic twist, over a prime field.
    pub fn twist<R: Rng>(&self, rng: &mut R) -> (BigUint, BigUint) {
        let f = self.field;
        let c = loop {
            let c = f.rand_nonzero(rng);
            if !f.is_qr(&c) {
                break c;
            }
        };
        let c2 = f.sqr(&c);
        (f.mul(self.a, &c2), f.mul(self.b, &f.mul(&c2, &c)))
    }
}
