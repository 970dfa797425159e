//! Generator configuration types
//!
//! The generator needs very little configuration: whose point of view the
//! code is generated from, whether role-based filtering is bypassed, and
//! which bit-packing convention the target uses.

use serde::{Deserialize, Serialize};

/// Bit-packing convention for generated pack/unpack code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Single-word shifts against a little-endian payload word
    #[default]
    Little,
    /// Byte-relative chunk walk over the payload bytes
    Big,
}

/// Configuration for the code generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodegenOptions {
    /// Node the code is generated for; drives encode/decode filtering
    pub self_node: String,

    /// Emit code for every message regardless of the self node's role
    #[serde(default)]
    pub generate_all: bool,

    /// Bit-packing convention of the generated code
    #[serde(default)]
    pub endianness: Endianness,
}

impl CodegenOptions {
    /// Create options for the given self node with everything else defaulted
    pub fn new(self_node: impl Into<String>) -> Self {
        Self {
            self_node: self_node.into(),
            generate_all: false,
            endianness: Endianness::default(),
        }
    }

    /// Builder method: emit code for every message
    pub fn with_generate_all(mut self, enabled: bool) -> Self {
        self.generate_all = enabled;
        self
    }

    /// Builder method: set the bit-packing convention
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }
}
