// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Output sinks for generated curves.
//!
//! A sink is driven through four hooks: `begin` once before any curve,
//! `emit` per curve, `separator` between curves (never after the last), and
//! `end` once after all curves. The engines call the hooks as curves become
//! available, so long searches stream their results.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use num_bigint::BigUint;

use crate::config::{Config, Format};
use crate::math::curve::Curve;
use uucore::error::UResult;

mod csv;
mod json;

pub use csv::CsvOutput;
pub use json::JsonOutput;

pub trait Output {
    fn begin(&mut self) -> io::Result<()>;
    fn emit(&mut self, curve: &Curve) -> io::Result<()>;
    fn separator(&mut self) -> io::Result<()>;
    fn end(&mut self) -> io::Result<()>;
}

/// Open the sink the configuration asks for.
pub fn create(cfg: &Config) -> UResult<Box<dyn Output>> {
    let writer: Box<dyn Write> = match &cfg.output {
        Some(path) => {
            let file: File = if cfg.append {
                OpenOptions::new().create(true).append(true).open(path)?
            } else {
                File::create(path)?
            };
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };
    Ok(match cfg.format {
        Format::Json => Box::new(JsonOutput::new(writer, cfg.hex_digits)),
        Format::Csv => Box::new(CsvOutput::new(writer, cfg.hex_digits)),
    })
}

/// Fixed-width hex rendering shared by the sinks.
fn hex(value: &BigUint, width: usize) -> String {
    format!("0x{:0>width$}", value.to_str_radix(16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_pads_to_width() {
        assert_eq!(hex(&BigUint::from(0x1fu32), 4), "0x001f");
        assert_eq!(hex(&BigUint::from(0xabcdeu32), 4), "0xabcde");
    }
}
