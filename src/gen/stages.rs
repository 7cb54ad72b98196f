// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Stage strategies and their execution.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};

use crate::anomalous::DiscEntry;
use crate::context::Context;
use crate::math::curve::{Curve, Generator, TorsionPoint};
use crate::math::field::{Field, FieldKind};
use crate::math::{binary, order, primes};
use crate::verbose;

use super::{Outcome, Stage, StageArg};

#[derive(Clone, Debug)]
pub enum SeedGen {
    Skip,
}

#[derive(Clone, Debug)]
pub enum FieldGen {
    Random { kind: FieldKind, bits: u64 },
    /// The field was set up by the caller and must survive rollbacks.
    Keep,
    /// A prime p = (1 + d*y^2) / 4 admitting an anomalous curve for the
    /// discriminant -d.
    AnomalousPrime { entry: DiscEntry, bits: u64 },
}

#[derive(Clone, Debug)]
pub enum AGen {
    Random,
    Zero,
    Keep,
    /// a = 3k with k the CM j-invariant seed.
    CmDerived { entry: DiscEntry },
}

#[derive(Clone, Debug)]
pub enum BGen {
    Random,
    /// b = 2k with k the CM j-invariant seed.
    CmDerived { entry: DiscEntry },
}

#[derive(Clone, Debug)]
pub enum CurveGen {
    /// Reject singular equations, rolling back to redraw b.
    Nonsingular,
}

#[derive(Clone, Debug)]
pub enum OrderGen {
    Compute {
        require_prime: bool,
        cofactor_bound: Option<u64>,
    },
    /// Anomalous curves have order p; verify and twist into place.
    FieldCharacteristic,
    Skip,
}

#[derive(Clone, Debug)]
pub enum GensGen {
    /// Full generator set: one or two points spanning the group.
    Any,
    /// Demand a cyclic group and a single generator of full order.
    One,
    Skip,
}

#[derive(Clone, Debug)]
pub enum PointsGen {
    Skip,
    /// A fixed number of uniformly random points.
    Random(usize),
    /// One point per distinct prime dividing the order.
    Prime,
    /// One point per divisor of the group exponent.
    All,
    /// Points of the orders listed in the stage argument.
    Trial,
}

/// The strategy bound to every stage for one generation run.
#[derive(Clone, Debug)]
pub struct Plan {
    pub seed: SeedGen,
    pub field: FieldGen,
    pub a: AGen,
    pub b: BGen,
    pub curve: CurveGen,
    pub order: OrderGen,
    pub generators: GensGen,
    pub points: PointsGen,
}

impl Plan {
    pub fn execute(
        &self,
        stage: Stage,
        curve: &mut Curve,
        ctx: &mut Context,
        arg: Option<&StageArg>,
    ) -> Outcome {
        match stage {
            Stage::Seed => Outcome::Done,
            Stage::Field => self.gen_field(curve, ctx),
            Stage::A => self.gen_a(curve, ctx),
            Stage::B => self.gen_b(curve, ctx),
            Stage::Curve => self.check_curve(curve),
            Stage::Order => self.gen_order(curve, ctx),
            Stage::Generators => self.gen_generators(curve, ctx),
            Stage::Points => self.gen_points(curve, ctx, arg),
        }
    }

    /// Undo a stage's effect on the curve. Rollback calls this for every
    /// stage it crosses, newest first.
    pub fn unroll(&self, stage: Stage, curve: &mut Curve) {
        match stage {
            Stage::Seed => curve.seed = None,
            Stage::Field => {
                if !matches!(self.field, FieldGen::Keep) {
                    curve.field = None;
                }
            }
            Stage::A => {
                if !matches!(self.a, AGen::Keep) {
                    curve.a = None;
                }
            }
            Stage::B => curve.b = None,
            Stage::Curve => {}
            Stage::Order => {
                curve.order = None;
                curve.order_factors = None;
            }
            Stage::Generators => curve.generators.clear(),
            Stage::Points => curve.points.clear(),
        }
    }

    fn gen_field(&self, curve: &mut Curve, ctx: &mut Context) -> Outcome {
        match &self.field {
            FieldGen::Keep => Outcome::Done,
            FieldGen::Random { kind, bits } => {
                curve.field = Some(match kind {
                    FieldKind::Prime => Field::Prime {
                        p: primes::random_prime(*bits, ctx.rng()),
                    },
                    FieldKind::Binary => Field::Binary {
                        m: *bits,
                        poly: binary::random_irreducible(*bits, ctx.rng()),
                    },
                });
                Outcome::Done
            }
            FieldGen::AnomalousPrime { entry, bits } => {
                let d = BigUint::from(entry.d);
                // p in [2^(bits-1), 2^bits) needs y ~ sqrt(4p / d)
                let lo = primes::isqrt(&((BigUint::one() << (bits + 1)) / &d));
                let hi = primes::isqrt(&((BigUint::one() << (bits + 2)) / &d));
                let y = ctx.rng().gen_biguint_range(&lo, &(hi + 1u32)) | BigUint::one();
                let four_p = &d * &y * &y + 1u32;
                // y odd and d = 3 mod 4 make 1 + d*y^2 divisible by 4
                debug_assert!((&four_p % 4u32).is_zero());
                let p = four_p >> 2u32;
                if p.bits() != *bits || !primes::is_prime(&p) {
                    return Outcome::Retry;
                }
                curve.field = Some(Field::Prime { p });
                Outcome::Done
            }
        }
    }

    fn gen_a(&self, curve: &mut Curve, ctx: &mut Context) -> Outcome {
        match &self.a {
            AGen::Keep => Outcome::Done,
            AGen::Zero => {
                curve.a = Some(BigUint::zero());
                Outcome::Done
            }
            AGen::Random => {
                let field = curve.field.as_ref().expect("field set by an earlier stage");
                curve.a = Some(field.rand_element(ctx.rng()));
                Outcome::Done
            }
            AGen::CmDerived { entry } => {
                let Some(Field::Prime { p }) = &curve.field else {
                    unreachable!("CM construction runs over prime fields");
                };
                match entry.k_mod(p) {
                    Some(k) => {
                        curve.a = Some(k * 3u32 % p);
                        Outcome::Done
                    }
                    // degenerate prime for this discriminant, redraw the field
                    None => Outcome::Back(1),
                }
            }
        }
    }

    fn gen_b(&self, curve: &mut Curve, ctx: &mut Context) -> Outcome {
        match &self.b {
            BGen::Random => {
                let field = curve.field.as_ref().expect("field set by an earlier stage");
                curve.b = Some(field.rand_element(ctx.rng()));
                Outcome::Done
            }
            BGen::CmDerived { entry } => {
                let Some(Field::Prime { p }) = &curve.field else {
                    unreachable!("CM construction runs over prime fields");
                };
                match entry.k_mod(p) {
                    Some(k) => {
                        curve.b = Some(k * 2u32 % p);
                        Outcome::Done
                    }
                    None => Outcome::Back(2),
                }
            }
        }
    }

    fn check_curve(&self, curve: &mut Curve) -> Outcome {
        let CurveGen::Nonsingular = self.curve;
        if curve.params().is_singular() {
            // redraw b
            Outcome::Back(1)
        } else {
            Outcome::Done
        }
    }

    fn gen_order(&self, curve: &mut Curve, ctx: &mut Context) -> Outcome {
        match &self.order {
            OrderGen::Skip => Outcome::Done,
            OrderGen::Compute {
                require_prime,
                cofactor_bound,
            } => {
                let n = order::curve_order(&curve.params(), ctx.rng());
                verbose!("order: {n}");
                if *require_prime {
                    if !primes::is_prime(&n) {
                        return Outcome::Back(2);
                    }
                    curve.order_factors = Some(vec![(n.clone(), 1)]);
                    curve.order = Some(n);
                    return Outcome::Done;
                }
                let factors = primes::factorize(&n);
                if let Some(bound) = cofactor_bound {
                    let largest = &factors.last().expect("order is at least 2").0;
                    let cofactor = &n / largest;
                    if cofactor > BigUint::from(*bound) {
                        return Outcome::Back(2);
                    }
                }
                curve.order_factors = Some(factors);
                curve.order = Some(n);
                Outcome::Done
            }
            OrderGen::FieldCharacteristic => {
                let Some(Field::Prime { p }) = curve.field.clone() else {
                    unreachable!("anomalous curves live over prime fields");
                };
                let anomalous = {
                    let params = curve.params();
                    let pt = params.random_point(ctx.rng());
                    params.mul(&p, &pt).is_infinity()
                };
                if !anomalous {
                    // the CM construction lands on the curve or its twist
                    let (ta, tb) = {
                        let params = curve.params();
                        params.twist(ctx.rng())
                    };
                    curve.a = Some(ta);
                    curve.b = Some(tb);
                    let params = curve.params();
                    let pt = params.random_point(ctx.rng());
                    if !params.mul(&p, &pt).is_infinity() {
                        // neither the curve nor its twist is anomalous,
                        // start over from a fresh prime
                        return Outcome::Back(4);
                    }
                }
                curve.order_factors = Some(vec![(p.clone(), 1)]);
                curve.order = Some(p);
                Outcome::Done
            }
        }
    }

    fn gen_generators(&self, curve: &mut Curve, ctx: &mut Context) -> Outcome {
        match &self.generators {
            GensGen::Skip => Outcome::Done,
            GensGen::Any => {
                let (n, factors) = ensure_factors(curve);
                let params = curve.params();
                // drive a sample up to the group exponent by lcm combination
                let mut point = params.random_point(ctx.rng());
                let mut exp = order::point_order(&params, &point, &n, &factors);
                for _ in 0..8 {
                    if exp == n {
                        break;
                    }
                    let extra = params.random_point(ctx.rng());
                    let extra_ord = order::point_order(&params, &extra, &n, &factors);
                    (point, exp) =
                        order::combine_to_lcm(&params, (&point, &exp), (&extra, &extra_ord));
                }
                let mut gens = vec![Generator {
                    cofactor: &n / &exp,
                    order: exp.clone(),
                    point: point.clone(),
                }];
                if exp != n {
                    // E = Z_n1 x Z_n2; find an order-n2 point outside <point>
                    let n2 = &n / &exp;
                    let mut second = None;
                    for _ in 0..20 {
                        let Some(s) = order::point_of_order(&params, &n2, &n, &factors, ctx.rng())
                        else {
                            continue;
                        };
                        if independent(&params, &point, &exp, &s, &n2) {
                            second = Some(s);
                            break;
                        }
                    }
                    match second {
                        Some(s) => gens.push(Generator {
                            cofactor: &n / &n2,
                            order: n2,
                            point: s,
                        }),
                        None => return Outcome::Retry,
                    }
                }
                curve.generators = gens;
                Outcome::Done
            }
            GensGen::One => {
                let (n, factors) = ensure_factors(curve);
                let params = curve.params();
                let mut point = params.random_point(ctx.rng());
                let mut exp = order::point_order(&params, &point, &n, &factors);
                for _ in 0..20 {
                    if exp == n {
                        break;
                    }
                    let extra = params.random_point(ctx.rng());
                    let extra_ord = order::point_order(&params, &extra, &n, &factors);
                    (point, exp) =
                        order::combine_to_lcm(&params, (&point, &exp), (&extra, &extra_ord));
                }
                if exp != n {
                    // group is not cyclic, redraw b
                    return Outcome::Back(3);
                }
                curve.generators = vec![Generator {
                    point,
                    order: n,
                    cofactor: BigUint::one(),
                }];
                Outcome::Done
            }
        }
    }

    fn gen_points(&self, curve: &mut Curve, ctx: &mut Context, arg: Option<&StageArg>) -> Outcome {
        match &self.points {
            PointsGen::Skip => Outcome::Done,
            PointsGen::Random(count) => {
                let (n, factors) = ensure_factors(curve);
                let params = curve.params();
                let mut pts = Vec::with_capacity(*count);
                for _ in 0..*count {
                    let point = params.random_point(ctx.rng());
                    let ord = order::point_order(&params, &point, &n, &factors);
                    pts.push(TorsionPoint { point, order: ord });
                }
                curve.points = pts;
                Outcome::Done
            }
            PointsGen::Prime => {
                let (n, factors) = ensure_factors(curve);
                let params = curve.params();
                let mut pts = Vec::with_capacity(factors.len());
                for (q, _) in &factors {
                    match order::point_of_order(&params, q, &n, &factors, ctx.rng()) {
                        Some(point) => pts.push(TorsionPoint {
                            point,
                            order: q.clone(),
                        }),
                        None => return Outcome::Retry,
                    }
                }
                curve.points = pts;
                Outcome::Done
            }
            PointsGen::All => {
                let (n, factors) = ensure_factors(curve);
                // every divisor of the exponent has a point of that order;
                // divisors of the full order need not
                let exp = curve
                    .generators
                    .first()
                    .expect("generators stage ran before points")
                    .order
                    .clone();
                let params = curve.params();
                let mut pts = Vec::new();
                for d in divisors(&order::divisor_factors(&exp, &factors)) {
                    if d.is_one() {
                        continue;
                    }
                    match order::point_of_order(&params, &d, &n, &factors, ctx.rng()) {
                        Some(point) => pts.push(TorsionPoint { point, order: d }),
                        None => return Outcome::Retry,
                    }
                }
                curve.points = pts;
                Outcome::Done
            }
            PointsGen::Trial => {
                let Some(StageArg::Primes(targets)) = arg else {
                    unreachable!("trial points need their target orders");
                };
                let (n, factors) = ensure_factors(curve);
                let params = curve.params();
                let mut pts = Vec::with_capacity(targets.len());
                for &q in targets {
                    let q = BigUint::from(q);
                    match order::point_of_order(&params, &q, &n, &factors, ctx.rng()) {
                        Some(point) => pts.push(TorsionPoint { point, order: q }),
                        None => return Outcome::Retry,
                    }
                }
                curve.points = pts;
                Outcome::Done
            }
        }
    }
}

/// Group order and its factorization, computing and caching the latter on
/// first use.
fn ensure_factors(curve: &mut Curve) -> (BigUint, Vec<(BigUint, usize)>) {
    let n = curve
        .order
        .clone()
        .expect("order set by an earlier stage");
    if curve.order_factors.is_none() {
        curve.order_factors = Some(primes::factorize(&n));
    }
    (n, curve.order_factors.clone().expect("just cached"))
}

/// Whether `s` lies outside the subgroup generated by `g`. Checked by
/// enumerating the unique order-n2 subgroup of <g> when that is small;
/// larger cases accept the draw, which is overwhelmingly independent.
fn independent(
    params: &crate::math::curve::Params,
    g: &crate::math::curve::Point,
    g_order: &BigUint,
    s: &crate::math::curve::Point,
    n2: &BigUint,
) -> bool {
    if *n2 > BigUint::from(4096u32) {
        return true;
    }
    let h = params.mul(&(g_order / n2), g);
    let mut acc = crate::math::curve::Point::Infinity;
    let mut j = BigUint::zero();
    while j < *n2 {
        if acc == *s {
            return false;
        }
        acc = params.add(&acc, &h);
        j += 1u32;
    }
    true
}

/// All divisors of a number given its factorization, ascending.
fn divisors(factors: &[(BigUint, usize)]) -> Vec<BigUint> {
    let mut out = vec![BigUint::one()];
    for (q, e) in factors {
        let base = out.clone();
        let mut power = BigUint::one();
        for _ in 0..*e {
            power *= q;
            out.extend(base.iter().map(|d| d * &power));
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::{no_args, pipeline, END};

    fn plan(bits: u64) -> Plan {
        Plan {
            seed: SeedGen::Skip,
            field: FieldGen::Random {
                kind: FieldKind::Prime,
                bits,
            },
            a: AGen::Random,
            b: BGen::Random,
            curve: CurveGen::Nonsingular,
            order: OrderGen::Compute {
                require_prime: false,
                cofactor_bound: None,
            },
            generators: GensGen::Any,
            points: PointsGen::Prime,
        }
    }

    #[test]
    fn full_pipeline_produces_consistent_curve() {
        let mut ctx = Context::from_seed(100);
        let mut curve = Curve::new();
        let plan = plan(12);
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &plan,
            &no_args(),
            Stage::Field,
            END
        ));
        let n = curve.order.clone().unwrap();
        let params = curve.params();
        assert!(!params.is_singular());
        for g in &curve.generators {
            assert!(params.contains(&g.point));
            assert!(params.mul(&g.order, &g.point).is_infinity());
            assert_eq!(&g.order * &g.cofactor, n);
        }
        let product: BigUint = curve.generators.iter().map(|g| g.order.clone()).product();
        assert_eq!(product, n);
        for pt in &curve.points {
            assert!(params.contains(&pt.point));
            assert!(primes::is_prime(&pt.order));
            assert!(params.mul(&pt.order, &pt.point).is_infinity());
        }
    }

    #[test]
    fn prime_order_plan_yields_prime_order() {
        let mut ctx = Context::from_seed(101);
        let mut curve = Curve::new();
        let mut p = plan(12);
        p.order = OrderGen::Compute {
            require_prime: true,
            cofactor_bound: None,
        };
        p.generators = GensGen::One;
        p.points = PointsGen::Skip;
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &p,
            &no_args(),
            Stage::Field,
            END
        ));
        assert!(primes::is_prime(curve.order.as_ref().unwrap()));
        assert_eq!(curve.generators.len(), 1);
        assert!(curve.generators[0].cofactor.is_one());
    }

    #[test]
    fn cofactor_bound_is_honored() {
        let mut ctx = Context::from_seed(102);
        let mut curve = Curve::new();
        let mut p = plan(12);
        p.order = OrderGen::Compute {
            require_prime: false,
            cofactor_bound: Some(4),
        };
        p.generators = GensGen::Skip;
        p.points = PointsGen::Skip;
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &p,
            &no_args(),
            Stage::Field,
            END
        ));
        let n = curve.order.clone().unwrap();
        let factors = curve.order_factors.clone().unwrap();
        let largest = &factors.last().unwrap().0;
        assert!(&n / largest <= BigUint::from(4u32));
    }

    #[test]
    fn koblitz_plan_fixes_a_to_zero() {
        let mut ctx = Context::from_seed(103);
        let mut curve = Curve::new();
        let mut p = plan(12);
        p.a = AGen::Zero;
        p.generators = GensGen::Skip;
        p.points = PointsGen::Skip;
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &p,
            &no_args(),
            Stage::Field,
            END
        ));
        assert!(curve.a.as_ref().unwrap().is_zero());
    }

    #[test]
    fn binary_field_pipeline() {
        let mut ctx = Context::from_seed(104);
        let mut curve = Curve::new();
        let mut p = plan(10);
        p.field = FieldGen::Random {
            kind: FieldKind::Binary,
            bits: 10,
        };
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &p,
            &no_args(),
            Stage::Field,
            END
        ));
        let n = curve.order.clone().unwrap();
        let params = curve.params();
        for g in &curve.generators {
            assert!(params.contains(&g.point));
            assert_eq!(&g.order * &g.cofactor, n);
        }
    }

    #[test]
    fn all_points_cover_exponent_divisors() {
        let mut ctx = Context::from_seed(105);
        let mut curve = Curve::new();
        let mut p = plan(12);
        p.points = PointsGen::All;
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &p,
            &no_args(),
            Stage::Field,
            END
        ));
        let factors = curve.order_factors.clone().unwrap();
        let exp = curve.generators[0].order.clone();
        let expected: Vec<BigUint> = divisors(&order::divisor_factors(&exp, &factors))
            .into_iter()
            .filter(|d| !d.is_one())
            .collect();
        assert!(!expected.is_empty());
        let got: Vec<BigUint> = curve.points.iter().map(|pt| pt.order.clone()).collect();
        assert_eq!(got, expected);
        let params = curve.params();
        for pt in &curve.points {
            assert!(params.contains(&pt.point));
            assert!(params.mul(&pt.order, &pt.point).is_infinity());
            for (q, _) in order::divisor_factors(&pt.order, &factors) {
                assert!(!params.mul(&(&pt.order / &q), &pt.point).is_infinity());
            }
        }
    }

    #[test]
    fn divisor_enumeration() {
        let f = vec![(BigUint::from(2u32), 2), (BigUint::from(3u32), 1)];
        let ds: Vec<u32> = divisors(&f)
            .iter()
            .map(|d| d.to_string().parse().unwrap())
            .collect();
        assert_eq!(ds, vec![1, 2, 3, 4, 6, 12]);
    }
}
