//! DBC Code Generator Library
//!
//! Parses Vector DBC network descriptions and generates self-contained C
//! code to marshal and unmarshal the defined messages, including per-message
//! missing-in-action (MIA) staleness tracking.
//!
//! # Architecture
//!
//! The library is a single synchronous pipeline:
//! - Parses the node, message and signal description lines of a DBC file
//! - Resolves a storage type for every signal from its width and scale
//! - Emits typedefs, header instances, encode/decode functions and MIA
//!   handlers, filtered by what the configured self node sends and receives
//!
//! The library does NOT:
//! - Interpret multiplexed signals or value tables
//! - Parse the DBC sections that do not affect generated code
//! - Write files; the generated text is returned as a `String`
//!
//! The generated encode functions clamp out-of-range fields of the input
//! struct in place before packing, so their callers need exclusive access
//! to that struct for the duration of the call; the emitted doc comments
//! carry the same note.
//!
//! The runtime [`SignalCodec`] executes the same packing arithmetic the
//! generated C performs, so encode/decode behaviour can be tested without
//! compiling the output.
//!
//! # Example Usage
//!
//! ```
//! use dbc_codegen::{parse_dbc_str, CodegenOptions, Generator};
//!
//! let dbc = parse_dbc_str(
//!     "example.dbc",
//!     "BU_: MOTOR DRIVER\n\
//!      BO_ 100 MOTOR_STATUS: 8 MOTOR\n\
//!      \x20SG_ MOTOR_SPEED : 0|12@1+ (0.1,0) [0|100] \"kph\" DRIVER\n",
//! )
//! .unwrap();
//!
//! let options = CodegenOptions::new("MOTOR");
//! let code = Generator::new(dbc, options).generate();
//!
//! assert!(code.contains("static msg_hdr_t MOTOR_TX_MOTOR_STATUS_encode("));
//! ```

// Public modules
pub mod codec;
pub mod config;
pub mod generator;
pub mod layout;
pub mod model;
pub mod parser;
pub mod typemap;
pub mod types;

// Re-export main types for convenience
pub use codec::{MiaInfo, SignalCodec};
pub use config::{CodegenOptions, Endianness};
pub use generator::Generator;
pub use model::{Dbc, Message, Node, Signal};
pub use parser::{parse_dbc_file, parse_dbc_str};
pub use types::{CodegenError, Result};

// Internal modules (not exposed in public API)
mod emit;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
