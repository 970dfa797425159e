//! In-memory model of a parsed DBC network description
//!
//! Numeric attributes that came out of the DBC text are stored twice: once as
//! the exact source text (`*_str`) and once parsed to `f64`. The source text
//! is what ends up in generated code, so `0.1` stays `0.1` instead of turning
//! into a re-rendered float; the parsed value feeds width resolution and the
//! runtime codec.

use serde::Serialize;

/// Recipient placeholder used by DBC files for signals routed to no node
pub const NO_RECIPIENT: &str = "Vector__XXX";

/// A network participant listed on the `BU_:` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node { name: name.into() }
    }
}

/// A single signal within a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    /// Signal name, unique within its message
    pub name: String,
    /// Position of the least significant bit within the 64-bit payload
    pub bit_start: u16,
    /// Width in bits, 1..=64
    pub bit_size: u16,
    /// True for `@1+` style definitions, false for `@1-`
    pub is_unsigned: bool,
    /// Scale factor applied to the raw value
    pub scale: f64,
    /// Scale factor as written in the DBC file
    pub scale_str: String,
    /// Offset added after scaling
    pub offset: f64,
    /// Offset as written in the DBC file
    pub offset_str: String,
    /// Lower physical bound
    pub min_val: f64,
    /// Lower physical bound as written in the DBC file
    pub min_val_str: String,
    /// Upper physical bound
    pub max_val: f64,
    /// Upper physical bound as written in the DBC file
    pub max_val_str: String,
    /// Receiving node names, possibly the `Vector__XXX` placeholder
    pub recipients: Vec<String>,
}

impl Signal {
    /// Position of the most significant bit of this signal
    pub fn bit_end(&self) -> u16 {
        self.bit_start + self.bit_size - 1
    }

    /// True when the DBC declares a usable min/max range.
    ///
    /// `[0|0]` means "no bounds" in DBC files, so a signal whose range is
    /// genuinely zero to zero is indistinguishable from an unbounded one.
    pub fn has_bounds(&self) -> bool {
        self.min_val != 0.0 || self.max_val != 0.0
    }

    /// True when `node` is listed as a recipient of this signal
    pub fn is_received_by(&self, node: &str) -> bool {
        self.recipients.iter().any(|r| r == node)
    }
}

/// A message definition from a `BO_` line with its signals attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Message ID as written in the DBC file
    pub id: String,
    /// Message name
    pub name: String,
    /// Data length in bytes as written in the DBC file
    pub length: String,
    /// Sending node name
    pub sender: String,
    /// Signals in definition order
    pub signals: Vec<Signal>,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        length: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Message {
            id: id.into(),
            name: name.into(),
            length: length.into(),
            sender: sender.into(),
            signals: Vec::new(),
        }
    }

    pub fn add_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Base identifier for generated functions and constants,
    /// e.g. `MOTOR_TX_MOTOR_STATUS`
    pub fn base_name(&self) -> String {
        format!("{}_TX_{}", self.sender, self.name)
    }

    /// Name of the generated C struct, e.g. `MOTOR_TX_MOTOR_STATUS_t`
    pub fn struct_name(&self) -> String {
        format!("{}_t", self.base_name())
    }

    /// True when `node` receives at least one signal of this message
    pub fn is_received_by(&self, node: &str) -> bool {
        self.signals.iter().any(|s| s.is_received_by(node))
    }
}

/// A fully parsed DBC file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dbc {
    /// File name the model was parsed from
    pub name: String,
    /// Nodes from the `BU_:` line
    pub nodes: Vec<Node>,
    /// Messages in definition order
    pub messages: Vec<Message>,
}

/// Statistics about a parsed model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    pub num_nodes: usize,
    pub num_messages: usize,
    pub num_signals: usize,
}

impl Dbc {
    pub fn new(name: impl Into<String>) -> Self {
        Dbc {
            name: name.into(),
            nodes: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// True when `name` appears on the `BU_:` line
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Find a message by name
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Get statistics about the parsed model
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            num_nodes: self.nodes.len(),
            num_messages: self.messages.len(),
            num_signals: self.messages.iter().map(|m| m.signals.len()).sum(),
        }
    }
}
