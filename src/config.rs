// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Run configuration, parsed and validated from the command line before the
//! engine starts.

use std::path::PathBuf;

use clap::ArgMatches;
use uucore::error::{UResult, UUsageError};
use uucore::parse_size::parse_size_u64;

use crate::math::field::FieldKind;
use crate::uu_args::options;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointsKind {
    None,
    Random,
    Prime,
    All,
}

#[derive(Clone, Copy, Debug)]
pub struct PointsSpec {
    pub kind: PointsKind,
    pub amount: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bits: u64,
    /// Hex digits per emitted value: two per byte of the field size.
    pub hex_digits: usize,
    pub field: FieldKind,
    pub random: bool,
    pub prime: bool,
    pub cofactor_bound: Option<u64>,
    pub koblitz: bool,
    pub unique: bool,
    pub invalid: bool,
    pub anomalous: bool,
    pub from_seed: bool,
    pub fixed_order: Option<String>,
    pub points: PointsSpec,
    pub count: usize,
    pub threads: usize,
    pub thread_stack: Option<usize>,
    pub format: Format,
    pub output: Option<PathBuf>,
    pub append: bool,
    pub verbose: u8,
    pub verbose_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bits: 0,
            hex_digits: 0,
            field: FieldKind::Prime,
            random: false,
            prime: false,
            cofactor_bound: None,
            koblitz: false,
            unique: false,
            invalid: false,
            anomalous: false,
            from_seed: false,
            fixed_order: None,
            points: PointsSpec {
                kind: PointsKind::None,
                amount: 0,
            },
            count: 1,
            threads: 1,
            thread_stack: None,
            format: Format::Json,
            output: None,
            append: false,
            verbose: 0,
            verbose_log: None,
        }
    }
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> UResult<Self> {
        let mut cfg = Self::default();

        let bits_str = matches
            .get_one::<String>(options::BITS)
            .expect("bits is required by clap");
        cfg.bits = bits_str
            .parse()
            .map_err(|_| UUsageError::new(1, format!("invalid bit size: {bits_str:?}")))?;
        if cfg.bits < 2 {
            return Err(UUsageError::new(1, "the bit size must be at least 2"));
        }
        cfg.hex_digits = (cfg.bits.div_ceil(8) * 2) as usize;

        cfg.field = if matches.get_flag(options::FP) {
            FieldKind::Prime
        } else if matches.get_flag(options::F2M) {
            FieldKind::Binary
        } else {
            return Err(UUsageError::new(1, "a field type (--fp or --f2m) is required"));
        };

        cfg.random = matches.get_flag(options::RANDOM);
        cfg.prime = matches.get_flag(options::PRIME);
        cfg.koblitz = matches.get_flag(options::KOBLITZ);
        cfg.unique = matches.get_flag(options::UNIQUE);
        cfg.invalid = matches.get_flag(options::INVALID);
        cfg.anomalous = matches.get_flag(options::ANOMALOUS);
        cfg.from_seed = matches.contains_id(options::SEED);
        cfg.fixed_order = matches.get_one::<String>(options::ORDER).cloned();
        cfg.append = matches.get_flag(options::APPEND);
        cfg.verbose = matches.get_count(options::VERBOSE);
        cfg.verbose_log = matches
            .get_one::<String>(options::VERBOSE_LOG)
            .map(PathBuf::from);
        cfg.output = matches.get_one::<String>(options::OUTPUT).map(PathBuf::from);

        if let Some(bound) = matches.get_one::<String>(options::COFACTOR) {
            let bound: u64 = bound
                .parse()
                .map_err(|_| UUsageError::new(1, format!("invalid cofactor bound: {bound:?}")))?;
            if bound == 0 {
                return Err(UUsageError::new(1, "the cofactor bound must be positive"));
            }
            cfg.cofactor_bound = Some(bound);
        }

        if let Some(count) = matches.get_one::<String>(options::COUNT) {
            cfg.count = count
                .parse()
                .map_err(|_| UUsageError::new(1, format!("invalid curve count: {count:?}")))?;
            if cfg.count == 0 {
                return Err(UUsageError::new(1, "the curve count must be positive"));
            }
        }

        if let Some(spec) = matches.get_one::<String>(options::POINTS) {
            cfg.points = parse_points(spec)?;
        }

        if let Some(format) = matches.get_one::<String>(options::FORMAT) {
            cfg.format = match format.as_str() {
                "csv" => Format::Csv,
                _ => Format::Json,
            };
        }

        if let Some(threads) = matches.get_one::<String>(options::THREADS) {
            cfg.threads = if threads == "auto" {
                std::thread::available_parallelism().map_or(1, |n| n.get())
            } else {
                let n = threads.parse().map_err(|_| {
                    UUsageError::new(1, format!("invalid thread count: {threads:?}"))
                })?;
                if n == 0 {
                    return Err(UUsageError::new(1, "the thread count must be positive"));
                }
                n
            };
        }

        if let Some(size) = matches.get_one::<String>(options::THREAD_STACK) {
            let size = parse_size_u64(size)
                .map_err(|e| UUsageError::new(1, format!("invalid thread stack size: {e}")))?;
            cfg.thread_stack = Some(size as usize);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject contradictory mode combinations, mirroring the checks the
    /// engine relies on.
    fn validate(&self) -> UResult<()> {
        let usage = |msg: &str| Err(UUsageError::new(1, msg.to_string()));

        if self.invalid {
            if self.prime {
                return usage("--invalid cannot be combined with --prime");
            }
            if self.from_seed {
                return usage("--invalid cannot be combined with --seed");
            }
            if self.cofactor_bound.is_some() {
                return usage("--invalid cannot be combined with --cofactor");
            }
        }
        if let Some(order) = &self.fixed_order {
            if order.is_empty() {
                return usage("--order requires a value");
            }
            if self.prime {
                return usage("--order cannot be combined with --prime");
            }
            if self.from_seed {
                return usage("--order cannot be combined with --seed");
            }
            if self.invalid {
                return usage("--order cannot be combined with --invalid");
            }
            if self.cofactor_bound.is_some() {
                return usage("--order cannot be combined with --cofactor");
            }
            if self.anomalous {
                return usage("--order cannot be combined with --anomalous");
            }
        }
        if self.anomalous {
            if self.field == FieldKind::Binary {
                return usage("--anomalous requires a prime field");
            }
            if self.cofactor_bound.is_some() {
                return usage("--anomalous cannot be combined with --cofactor");
            }
            if self.from_seed {
                return usage("--anomalous cannot be combined with --seed");
            }
            if self.invalid {
                return usage("--anomalous cannot be combined with --invalid");
            }
            if self.koblitz {
                return usage("--anomalous cannot be combined with --koblitz");
            }
        }
        if self.threads > 1 && !self.invalid {
            return usage("--threads only applies to the --invalid search");
        }
        if self.thread_stack.is_some() && self.threads <= 1 {
            return usage("--thread-stack only applies to multi-threaded runs");
        }
        if self.append && self.output.is_none() {
            return usage("--append only applies when --output is given");
        }
        Ok(())
    }
}

/// Parse a points specification: `prime`, `all`, `none`, or an amount
/// followed by `random` (a bare amount implies `random`).
fn parse_points(spec: &str) -> UResult<PointsSpec> {
    let digits: String = spec.chars().take_while(|c| c.is_ascii_digit()).collect();
    let rest = &spec[digits.len()..];
    let amount: Option<usize> = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().map_err(|_| {
            UUsageError::new(1, format!("invalid points amount: {digits:?}"))
        })?)
    };
    let kind = match rest {
        "random" => PointsKind::Random,
        "" if amount.is_some() => PointsKind::Random,
        "prime" => PointsKind::Prime,
        "all" => PointsKind::All,
        "none" => PointsKind::None,
        _ => {
            return Err(UUsageError::new(
                1,
                format!("invalid points specification: {spec:?}"),
            ));
        }
    };
    if amount.is_some() && kind != PointsKind::Random {
        return Err(UUsageError::new(
            1,
            format!("a points amount only applies to 'random': {spec:?}"),
        ));
    }
    Ok(PointsSpec {
        kind,
        // ten random points unless an amount was given
        amount: amount.unwrap_or(10),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uu_app;

    fn parse(args: &[&str]) -> UResult<Config> {
        let matches = uu_app()
            .try_get_matches_from(std::iter::once("ecgen").chain(args.iter().copied()))
            .expect("argument syntax is valid");
        Config::from_matches(&matches)
    }

    #[test]
    fn minimal_prime_field_run() {
        let cfg = parse(&["--fp", "16"]).unwrap();
        assert_eq!(cfg.bits, 16);
        assert_eq!(cfg.hex_digits, 4);
        assert_eq!(cfg.field, FieldKind::Prime);
        assert_eq!(cfg.count, 1);
        assert_eq!(cfg.points.kind, PointsKind::None);
    }

    #[test]
    fn field_type_is_required() {
        assert!(parse(&["16"]).is_err());
    }

    #[test]
    fn points_specifications() {
        assert_eq!(
            parse(&["--fp", "16", "--points", "prime"]).unwrap().points.kind,
            PointsKind::Prime
        );
        let random = parse(&["--fp", "16", "--points", "5random"]).unwrap().points;
        assert_eq!(random.kind, PointsKind::Random);
        assert_eq!(random.amount, 5);
        let bare = parse(&["--fp", "16", "--points", "7"]).unwrap().points;
        assert_eq!(bare.kind, PointsKind::Random);
        assert_eq!(bare.amount, 7);
        assert!(parse(&["--fp", "16", "--points", "5prime"]).is_err());
        assert!(parse(&["--fp", "16", "--points", "sometimes"]).is_err());
    }

    #[test]
    fn mutual_exclusions() {
        assert!(parse(&["--fp", "16", "-i", "-p"]).is_err());
        assert!(parse(&["--fp", "16", "-i", "-k", "4"]).is_err());
        assert!(parse(&["--fp", "16", "--anomalous", "--koblitz"]).is_err());
        assert!(parse(&["--f2m", "16", "--anomalous"]).is_err());
        assert!(parse(&["--fp", "16", "-n", "1021", "-p"]).is_err());
        assert!(parse(&["--fp", "16", "--threads", "4"]).is_err());
        assert!(parse(&["--fp", "16", "-a"]).is_err());
    }

    #[test]
    fn invalid_combines_with_unique() {
        let cfg = parse(&["--fp", "16", "-i", "-u"]).unwrap();
        assert!(cfg.invalid);
        assert!(cfg.unique);
    }

    #[test]
    fn threads_and_stack() {
        let cfg = parse(&["--fp", "16", "-i", "--threads", "3"]).unwrap();
        assert_eq!(cfg.threads, 3);
        let cfg = parse(&["--fp", "16", "-i", "--threads", "2", "--thread-stack", "4m"]).unwrap();
        assert_eq!(cfg.thread_stack, Some(4 * 1024 * 1024));
        let cfg = parse(&["--fp", "16", "-i", "--threads", "auto"]).unwrap();
        assert!(cfg.threads >= 1);
    }
}
