//! # Tether Serde
//! Bit-level stream reader/writer and the primitive codecs shared by the
//! tether replication crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod integer;
mod math;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::{
    SerdeInteger, SignedInteger, SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};
pub use serde::{ConstBitLength, Serde};
