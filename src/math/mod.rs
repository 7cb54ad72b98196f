// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! The arithmetic layer the generation engine builds on: finite fields,
//! the curve group law, order computation and prime utilities. The engine
//! treats this layer as a trusted oracle and never works around it.

pub mod binary;
pub mod curve;
pub mod field;
pub mod order;
pub mod primes;
