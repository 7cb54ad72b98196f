// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use clap::{crate_version, Arg, ArgAction, Command};
use uucore::format_usage;

const ABOUT: &str = "Generate elliptic curve domain parameters.";
const USAGE: &str = "{} [OPTION]... --fp|--f2m BITS";

pub mod options {
    pub const BITS: &str = "bits";
    pub const FP: &str = "fp";
    pub const F2M: &str = "f2m";
    pub const RANDOM: &str = "random";
    pub const PRIME: &str = "prime";
    pub const COFACTOR: &str = "cofactor";
    pub const KOBLITZ: &str = "koblitz";
    pub const UNIQUE: &str = "unique";
    pub const ANOMALOUS: &str = "anomalous";
    pub const INVALID: &str = "invalid";
    pub const SEED: &str = "seed";
    pub const ORDER: &str = "order";
    pub const COUNT: &str = "count";
    pub const POINTS: &str = "points";
    pub const FORMAT: &str = "format";
    pub const OUTPUT: &str = "output";
    pub const APPEND: &str = "append";
    pub const VERBOSE: &str = "verbose";
    pub const VERBOSE_LOG: &str = "verbose-log";
    pub const THREADS: &str = "threads";
    pub const THREAD_STACK: &str = "thread-stack";
}

pub fn uu_app() -> Command {
    Command::new(uucore::util_name())
        .version(crate_version!())
        .about(ABOUT)
        .override_usage(format_usage(USAGE))
        .infer_long_args(true)
        .arg(
            Arg::new(options::BITS)
                .value_name("BITS")
                .help("size of the field in bits")
                .required(true),
        )
        .arg(
            Arg::new(options::FP)
                .long(options::FP)
                .help("generate a curve over a prime field")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::F2M)
                .long(options::F2M)
                .help("generate a curve over a binary field")
                .action(ArgAction::SetTrue)
                .conflicts_with(options::FP),
        )
        .arg(
            Arg::new(options::RANDOM)
                .short('r')
                .long(options::RANDOM)
                .help("generate a random curve (the default)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::PRIME)
                .short('p')
                .long(options::PRIME)
                .help("only generate curves of prime order")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::COFACTOR)
                .short('k')
                .long(options::COFACTOR)
                .value_name("BOUND")
                .help("only generate curves with cofactor at most BOUND"),
        )
        .arg(
            Arg::new(options::KOBLITZ)
                .short('K')
                .long(options::KOBLITZ)
                .help("generate a Koblitz curve (a = 0)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::UNIQUE)
                .short('u')
                .long(options::UNIQUE)
                .help("require a uniquely generated group (one generator)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::ANOMALOUS)
                .long(options::ANOMALOUS)
                .help("generate an anomalous curve (order equal to the field characteristic)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::INVALID)
                .short('i')
                .long(options::INVALID)
                .help("generate a set of invalid curves for a random base curve")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SEED)
                .short('s')
                .long(options::SEED)
                .value_name("SEED")
                .num_args(0..=1)
                .help("use the ANSI X9.62 seeded generation procedure"),
        )
        .arg(
            Arg::new(options::ORDER)
                .short('n')
                .long(options::ORDER)
                .value_name("ORDER")
                .help("generate a curve of the given order"),
        )
        .arg(
            Arg::new(options::COUNT)
                .short('c')
                .long(options::COUNT)
                .value_name("NUM")
                .help("number of curves to generate"),
        )
        .arg(
            Arg::new(options::POINTS)
                .long(options::POINTS)
                .value_name("SPEC")
                .help(
                    "points to compute per curve: 'prime', 'all', 'none', or \
                     an amount followed by 'random' (e.g. '5random')",
                ),
        )
        .arg(
            Arg::new(options::FORMAT)
                .short('t')
                .long(options::FORMAT)
                .value_name("FORMAT")
                .value_parser(["json", "csv"])
                .help("output format"),
        )
        .arg(
            Arg::new(options::OUTPUT)
                .short('o')
                .long(options::OUTPUT)
                .value_name("FILE")
                .help("write the generated curves to FILE instead of standard output"),
        )
        .arg(
            Arg::new(options::APPEND)
                .short('a')
                .long(options::APPEND)
                .help("append to the output file instead of overwriting it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::VERBOSE)
                .short('v')
                .long(options::VERBOSE)
                .help("print progress information; repeat for more detail")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(options::VERBOSE_LOG)
                .long(options::VERBOSE_LOG)
                .value_name("FILE")
                .help("write progress information to FILE instead of standard error"),
        )
        .arg(
            Arg::new(options::THREADS)
                .long(options::THREADS)
                .value_name("NUM")
                .help("number of worker threads for the invalid curve search, or 'auto'"),
        )
        .arg(
            Arg::new(options::THREAD_STACK)
                .long(options::THREAD_STACK)
                .value_name("SIZE")
                .help("stack size per worker thread (k/m/g suffixes accepted)"),
        )
}
