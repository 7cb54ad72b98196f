// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! JSON sink: an array of curve objects with hex-encoded values.

use std::io::{self, Write};

use crate::math::curve::{Curve, Point};
use crate::math::field::Field;

use super::{hex, Output};

pub struct JsonOutput {
    writer: Box<dyn Write>,
    width: usize,
}

impl JsonOutput {
    pub fn new(writer: Box<dyn Write>, width: usize) -> Self {
        Self { writer, width }
    }

    fn write_point(&mut self, point: &Point, indent: &str) -> io::Result<()> {
        match point {
            Point::Infinity => {
                write!(self.writer, "{indent}\"x\": null,\n{indent}\"y\": null")
            }
            Point::Affine { x, y } => {
                write!(
                    self.writer,
                    "{indent}\"x\": \"{}\",\n{indent}\"y\": \"{}\"",
                    hex(x, self.width),
                    hex(y, self.width)
                )
            }
        }
    }
}

impl Output for JsonOutput {
    fn begin(&mut self) -> io::Result<()> {
        write!(self.writer, "[\n")
    }

    fn emit(&mut self, curve: &Curve) -> io::Result<()> {
        let w = self.width;
        writeln!(self.writer, "  {{")?;
        match curve.field.as_ref().expect("emitted curves have a field") {
            Field::Prime { p } => {
                writeln!(self.writer, "    \"field\": {{ \"p\": \"{}\" }},", hex(p, w))?;
            }
            Field::Binary { m, poly } => {
                writeln!(
                    self.writer,
                    "    \"field\": {{ \"m\": {m}, \"poly\": \"{}\" }},",
                    hex(poly, w)
                )?;
            }
        }
        let a = curve.a.as_ref().expect("emitted curves have a");
        let b = curve.b.as_ref().expect("emitted curves have b");
        writeln!(self.writer, "    \"a\": \"{}\",", hex(a, w))?;
        write!(self.writer, "    \"b\": \"{}\"", hex(b, w))?;
        if let Some(order) = &curve.order {
            write!(self.writer, ",\n    \"order\": \"{}\"", hex(order, w))?;
        }
        if !curve.generators.is_empty() {
            write!(self.writer, ",\n    \"generators\": [\n")?;
            for (i, g) in curve.generators.iter().enumerate() {
                writeln!(self.writer, "      {{")?;
                self.write_point(&g.point, "        ")?;
                writeln!(self.writer, ",")?;
                writeln!(self.writer, "        \"order\": \"{}\",", hex(&g.order, w))?;
                writeln!(
                    self.writer,
                    "        \"cofactor\": \"{}\"",
                    hex(&g.cofactor, w)
                )?;
                write!(self.writer, "      }}")?;
                if i + 1 < curve.generators.len() {
                    writeln!(self.writer, ",")?;
                }
            }
            write!(self.writer, "\n    ]")?;
        }
        if !curve.points.is_empty() {
            write!(self.writer, ",\n    \"points\": [\n")?;
            for (i, pt) in curve.points.iter().enumerate() {
                writeln!(self.writer, "      {{")?;
                self.write_point(&pt.point, "        ")?;
                writeln!(self.writer, ",")?;
                writeln!(self.writer, "        \"order\": \"{}\"", hex(&pt.order, w))?;
                write!(self.writer, "      }}")?;
                if i + 1 < curve.points.len() {
                    writeln!(self.writer, ",")?;
                }
            }
            write!(self.writer, "\n    ]")?;
        }
        write!(self.writer, "\n  }}")
    }

    fn separator(&mut self) -> io::Result<()> {
        write!(self.writer, ",\n")
    }

    fn end(&mut self) -> io::Result<()> {
        write!(self.writer, "\n]\n")?;
        self.writer.flush()
    }
}
