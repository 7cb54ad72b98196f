// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! CSV sink: one row per curve, values in hex, points flattened in order.

use std::io::{self, Write};

use crate::math::curve::{Curve, Point};
use crate::math::field::Field;

use super::{hex, Output};

pub struct CsvOutput {
    writer: Box<dyn Write>,
    width: usize,
}

impl CsvOutput {
    pub fn new(writer: Box<dyn Write>, width: usize) -> Self {
        Self { writer, width }
    }

    fn push_point(&self, row: &mut Vec<String>, point: &Point) {
        match point {
            Point::Infinity => {
                row.push(String::new());
                row.push(String::new());
            }
            Point::Affine { x, y } => {
                row.push(hex(x, self.width));
                row.push(hex(y, self.width));
            }
        }
    }
}

impl Output for CsvOutput {
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn emit(&mut self, curve: &Curve) -> io::Result<()> {
        let w = self.width;
        let mut row = Vec::new();
        match curve.field.as_ref().expect("emitted curves have a field") {
            Field::Prime { p } => row.push(hex(p, w)),
            Field::Binary { m, poly } => {
                row.push(m.to_string());
                row.push(hex(poly, w));
            }
        }
        row.push(hex(curve.a.as_ref().expect("emitted curves have a"), w));
        row.push(hex(curve.b.as_ref().expect("emitted curves have b"), w));
        if let Some(order) = &curve.order {
            row.push(hex(order, w));
        }
        for g in &curve.generators {
            self.push_point(&mut row, &g.point);
            row.push(hex(&g.order, w));
            row.push(hex(&g.cofactor, w));
        }
        for pt in &curve.points {
            self.push_point(&mut row, &pt.point);
            row.push(hex(&pt.order, w));
        }
        writeln!(self.writer, "{}", row.join(","))
    }

    fn separator(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
