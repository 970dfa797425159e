//! Per-signal C statement emitters
//!
//! One emitter per bit-packing convention. The generator picks an emitter
//! when it is constructed and feeds every signal through it; everything else
//! in the generated file is convention-independent.

use crate::config::Endianness;
use crate::model::Signal;

pub mod big;
pub mod little;

pub use big::BigEndianCodeGen;
pub use little::LittleEndianCodeGen;

/// Statement emitters for one bit-packing convention
///
/// The emitted statements assume the surrounding function bodies the
/// generator produces: encode writes through `uint64_t *to` from a struct
/// `from`, decode reads through `const uint64_t *from` into a struct `to`.
pub trait SignalCodeGen {
    /// Local declarations an encode body needs before any signal statement
    fn encode_prelude(&self, out: &mut String);

    /// Statements packing `from-><name>` into the payload behind `to`
    fn encode_signal(&self, signal: &Signal, out: &mut String);

    /// Local declarations a decode body needs before any signal statement
    fn decode_prelude(&self, out: &mut String);

    /// Statements unpacking the payload behind `from` into `to-><name>`
    fn decode_signal(&self, signal: &Signal, out: &mut String);
}

/// Select the emitter for a bit-packing convention
pub fn for_endianness(endianness: Endianness) -> Box<dyn SignalCodeGen> {
    match endianness {
        Endianness::Little => Box::new(LittleEndianCodeGen),
        Endianness::Big => Box::new(BigEndianCodeGen),
    }
}
