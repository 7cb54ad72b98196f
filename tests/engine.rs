// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! End-to-end engine scenarios at small field sizes.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use ecgen::anomalous::DiscTable;
use ecgen::config::{Config, Format, PointsKind, PointsSpec};
use ecgen::context::Context;
use ecgen::gen::stages::{
    AGen, BGen, CurveGen, FieldGen, GensGen, OrderGen, Plan, PointsGen, SeedGen,
};
use ecgen::gen::{no_args, pipeline, Stage, END};
use ecgen::math::curve::Curve;
use ecgen::output::{CsvOutput, JsonOutput, Output};
use ecgen::{exhaustive, invalid};

/// A `Write` whose contents stay inspectable after the sink takes ownership.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn base_cfg(bits: u64) -> Config {
    Config {
        bits,
        hex_digits: (bits.div_ceil(8) * 2) as usize,
        ..Config::default()
    }
}

fn json_sink(buf: &SharedBuf, cfg: &Config) -> JsonOutput {
    JsonOutput::new(Box::new(buf.clone()), cfg.hex_digits)
}

fn first_consecutive_primes(n: usize) -> Vec<u64> {
    let mut out = Vec::with_capacity(n);
    let mut q = 2u64;
    while out.len() < n {
        out.push(q);
        q = num_prime::nt_funcs::next_prime(&q, None).unwrap();
    }
    out
}

fn assert_invalid_set(curves: &[Curve]) {
    let primes = first_consecutive_primes(curves.len());
    let field = curves[0].field.clone().unwrap();
    let a = curves[0].a.clone().unwrap();
    for (i, curve) in curves.iter().enumerate() {
        // all curves share the base field and a
        assert_eq!(curve.field.as_ref().unwrap(), &field);
        assert_eq!(curve.a.as_ref().unwrap(), &a);
        assert!(!curve.params().is_singular());
        let order = curve.order.as_ref().unwrap();
        assert!(
            (order % primes[i]).is_zero(),
            "slot {i} order not divisible by {}",
            primes[i]
        );
        // the trial point search produced a point of the slot's order
        let q = BigUint::from(primes[i]);
        let witness = curve
            .points
            .iter()
            .find(|pt| pt.order == q)
            .expect("a point of the slot prime's order was recorded");
        assert!(curve.params().contains(&witness.point));
        assert!(curve.params().mul(&q, &witness.point).is_infinity());
        assert!(!curve.generators.is_empty());
    }
}

#[test]
fn invalid_search_sequential() {
    let mut cfg = base_cfg(14);
    cfg.invalid = true;
    let mut ctx = Context::from_seed(1);
    let buf = SharedBuf::default();
    let mut out = json_sink(&buf, &cfg);
    let curves = invalid::generate(&cfg, &mut ctx, &mut out).unwrap();
    assert!(!curves.is_empty());
    assert_invalid_set(&curves);
    // base curve plus one object per slot, bracketed as a JSON array
    let text = buf.contents();
    assert!(text.starts_with("[\n"));
    assert!(text.ends_with("]\n"));
    assert_eq!(text.matches("\"field\"").count(), curves.len() + 1);
}

#[test]
fn invalid_search_threaded() {
    let mut cfg = base_cfg(14);
    cfg.invalid = true;
    cfg.threads = 3;
    let mut ctx = Context::from_seed(2);
    let buf = SharedBuf::default();
    let mut out = json_sink(&buf, &cfg);
    let curves = invalid::generate(&cfg, &mut ctx, &mut out).unwrap();
    assert_invalid_set(&curves);
    let text = buf.contents();
    assert!(text.starts_with("[\n"));
    assert!(text.ends_with("]\n"));
    assert_eq!(text.matches("\"field\"").count(), curves.len() + 1);
}

#[test]
fn invalid_search_threaded_with_stack_size() {
    let mut cfg = base_cfg(12);
    cfg.invalid = true;
    cfg.threads = 2;
    cfg.thread_stack = Some(4 * 1024 * 1024);
    let mut ctx = Context::from_seed(3);
    let buf = SharedBuf::default();
    let mut out = json_sink(&buf, &cfg);
    let curves = invalid::generate(&cfg, &mut ctx, &mut out).unwrap();
    assert_invalid_set(&curves);
}

#[test]
fn invalid_search_with_unique_generator() {
    let mut cfg = base_cfg(12);
    cfg.invalid = true;
    cfg.unique = true;
    let mut ctx = Context::from_seed(9);
    let buf = SharedBuf::default();
    let mut out = json_sink(&buf, &cfg);
    let curves = invalid::generate(&cfg, &mut ctx, &mut out).unwrap();
    assert_invalid_set(&curves);
    // every found curve is cyclic with a single full-order generator
    for curve in &curves {
        assert_eq!(curve.generators.len(), 1);
        assert!(curve.generators[0].cofactor.is_one());
        assert_eq!(&curve.generators[0].order, curve.order.as_ref().unwrap());
    }
}

#[test]
fn exhaustive_count_and_separators() {
    let mut cfg = base_cfg(12);
    cfg.count = 3;
    let mut ctx = Context::from_seed(4);
    let buf = SharedBuf::default();
    let mut out = json_sink(&buf, &cfg);
    exhaustive::generate(&cfg, &mut ctx, None, &mut out).unwrap();
    let text = buf.contents();
    assert!(text.starts_with("[\n"));
    assert!(text.ends_with("]\n"));
    assert_eq!(text.matches("\"field\"").count(), 3);
    // separators between top-level objects, none after the last
    assert_eq!(text.matches("\n  },\n").count(), 2);
}

#[test]
fn json_values_are_padded_hex() {
    let mut cfg = base_cfg(16);
    cfg.points = PointsSpec {
        kind: PointsKind::Prime,
        amount: 0,
    };
    let mut ctx = Context::from_seed(5);
    let buf = SharedBuf::default();
    let mut out = json_sink(&buf, &cfg);
    exhaustive::generate(&cfg, &mut ctx, None, &mut out).unwrap();
    let text = buf.contents();
    for value in text.split('"').filter(|s| s.starts_with("0x")) {
        assert!(
            value.len() >= 2 + cfg.hex_digits,
            "unpadded value {value:?}"
        );
    }
    assert!(text.contains("\"points\""));
}

#[test]
fn csv_one_row_per_curve() {
    let mut cfg = base_cfg(12);
    cfg.count = 2;
    cfg.format = Format::Csv;
    let mut ctx = Context::from_seed(6);
    let buf = SharedBuf::default();
    let mut out = CsvOutput::new(Box::new(buf.clone()), cfg.hex_digits);
    exhaustive::generate(&cfg, &mut ctx, None, &mut out).unwrap();
    let text = buf.contents();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert!(row.starts_with("0x"));
        assert!(row.split(',').count() >= 4);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut cfg = base_cfg(12);
    cfg.count = 2;
    cfg.points = PointsSpec {
        kind: PointsKind::Prime,
        amount: 0,
    };
    let run = || {
        let mut ctx = Context::from_seed(42);
        let buf = SharedBuf::default();
        let mut out = json_sink(&buf, &cfg);
        exhaustive::generate(&cfg, &mut ctx, None, &mut out).unwrap();
        buf.contents()
    };
    assert_eq!(run(), run());
}

#[test]
fn seeded_invalid_single_worker_is_reproducible() {
    let mut cfg = base_cfg(12);
    cfg.invalid = true;
    let run = || {
        let mut ctx = Context::from_seed(43);
        let buf = SharedBuf::default();
        let mut out = json_sink(&buf, &cfg);
        invalid::generate(&cfg, &mut ctx, &mut out).unwrap();
        buf.contents()
    };
    assert_eq!(run(), run());
}

#[test]
fn anomalous_curve_has_order_p() {
    let mut ctx = Context::from_seed(7);
    let table = DiscTable::build();
    // small discriminants leave enough prime candidates at 20 bits
    for d in [11u64, 19] {
        let bits = 20u64;
        let entry = table
            .entries()
            .iter()
            .find(|e| e.d == d)
            .unwrap()
            .clone();
        let plan = Plan {
            seed: SeedGen::Skip,
            field: FieldGen::AnomalousPrime {
                entry: entry.clone(),
                bits,
            },
            a: AGen::CmDerived {
                entry: entry.clone(),
            },
            b: BGen::CmDerived { entry },
            curve: CurveGen::Nonsingular,
            order: OrderGen::FieldCharacteristic,
            generators: GensGen::Any,
            points: PointsGen::Skip,
        };
        let mut curve = Curve::new();
        assert!(pipeline::run(
            &mut curve,
            &mut ctx,
            &plan,
            &no_args(),
            Stage::Field,
            END
        ));
        let p = match curve.field.as_ref().unwrap() {
            ecgen::math::field::Field::Prime { p } => p.clone(),
            _ => unreachable!(),
        };
        assert_eq!(p.bits(), bits);
        assert!(ecgen::math::primes::is_prime(&p));
        // trace one: exactly p points
        assert_eq!(curve.order.as_ref().unwrap(), &p);
        assert_eq!(curve.generators.len(), 1);
        assert_eq!(curve.generators[0].order, p);
    }
}

#[test]
fn output_to_file_and_append() {
    use std::fs;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curves.json");
    let mut cfg = base_cfg(12);
    cfg.output = Some(path.clone());

    let mut ctx = Context::from_seed(8);
    let mut out = ecgen::output::create(&cfg).unwrap();
    exhaustive::generate(&cfg, &mut ctx, None, out.as_mut()).unwrap();
    drop(out);
    let first = fs::read_to_string(&path).unwrap();
    assert!(first.starts_with("[\n"));

    cfg.append = true;
    let mut out = ecgen::output::create(&cfg).unwrap();
    exhaustive::generate(&cfg, &mut ctx, None, out.as_mut()).unwrap();
    drop(out);
    let second = fs::read_to_string(&path).unwrap();
    assert!(second.len() > first.len());
    assert!(second.starts_with(&first));
}
