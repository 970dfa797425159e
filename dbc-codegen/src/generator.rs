//! Generated-file assembly
//!
//! Walks the parsed model and produces one self-contained C source text:
//! shared structs first, then per-message typedefs, MIA externs, encode
//! functions, decode functions and MIA handlers. Which messages get code
//! depends on the self node's role; skipped items leave a comment line so
//! the output records the decision.

use crate::config::CodegenOptions;
use crate::emit::{self, SignalCodeGen};
use crate::model::{Dbc, Message, Signal};
use crate::typemap;
use std::fmt::Write;

const ERROR_BANNER: &str =
    "/////////////////////////////// ERROR /////////////////////////////////////";

/// Code generator for one parsed DBC model
pub struct Generator {
    dbc: Dbc,
    options: CodegenOptions,
    codegen: Box<dyn SignalCodeGen>,
}

impl Generator {
    /// Create a generator; the statement emitter is picked here from the
    /// configured endianness and used for every signal
    pub fn new(dbc: Dbc, options: CodegenOptions) -> Self {
        let codegen = emit::for_endianness(options.endianness);
        Self {
            dbc,
            options,
            codegen,
        }
    }

    /// Produce the complete generated C text
    pub fn generate(&self) -> String {
        let stats = self.dbc.stats();
        log::info!(
            "Generating code for '{}' as node '{}' ({} messages, {} signals)",
            self.dbc.name,
            self.options.self_node,
            stats.num_messages,
            stats.num_signals
        );

        let mut out = String::new();

        self.emit_preamble(&mut out);
        writeln!(out).unwrap();
        self.emit_mia_struct(&mut out);
        writeln!(out).unwrap();
        self.emit_msg_hdr_struct(&mut out);
        writeln!(out).unwrap();
        self.emit_msg_hdr_instances(&mut out);

        for message in &self.dbc.messages {
            self.emit_message_struct(message, &mut out);
        }

        self.emit_mia_externs(&mut out);

        for message in &self.dbc.messages {
            self.emit_encode(message, &mut out);
        }
        for message in &self.dbc.messages {
            self.emit_decode(message, &mut out);
        }
        for message in &self.dbc.messages {
            self.emit_mia_handler(message, &mut out);
        }

        log::debug!("Generated {} bytes of C output", out.len());
        out
    }

    /// True when the self node transmits this message
    fn sends(&self, message: &Message) -> bool {
        self.options.generate_all || message.sender == self.options.self_node
    }

    /// True when the self node receives at least one signal of this message
    fn receives(&self, message: &Message) -> bool {
        self.options.generate_all || message.is_received_by(&self.options.self_node)
    }

    fn is_visible(&self, message: &Message) -> bool {
        self.sends(message) || self.receives(message)
    }

    fn emit_preamble(&self, out: &mut String) {
        writeln!(
            out,
            "/// DBC file: {}    Self node: {}",
            self.dbc.name, self.options.self_node
        )
        .unwrap();
        writeln!(
            out,
            "/// This file should be included by a source file, for example: #include \"generated.c\""
        )
        .unwrap();
        writeln!(out, "#include <stdbool.h>").unwrap();
        writeln!(out, "#include <stdint.h>").unwrap();

        if !self.dbc.has_node(&self.options.self_node) {
            log::error!(
                "Self node '{}' is not part of the BU_ node list; the generated file will not compile",
                self.options.self_node
            );
            writeln!(out).unwrap();
            writeln!(out, "{}", ERROR_BANNER).unwrap();
            writeln!(
                out,
                "#error \"Self node: {} is not listed in the BU_ nodes of the DBC file\"",
                self.options.self_node
            )
            .unwrap();
            writeln!(out, "{}", ERROR_BANNER).unwrap();
        }
    }

    fn emit_mia_struct(&self, out: &mut String) {
        writeln!(out, "/// Missing in Action structure").unwrap();
        writeln!(out, "typedef struct {{").unwrap();
        writeln!(out, "    uint32_t is_mia : 1;          ///< Missing in action flag").unwrap();
        writeln!(out, "    uint32_t mia_counter_ms : 31; ///< Missing in action counter").unwrap();
        writeln!(out, "}} mia_info_t;").unwrap();
    }

    fn emit_msg_hdr_struct(&self, out: &mut String) {
        writeln!(out, "/// CAN message header structure").unwrap();
        writeln!(out, "typedef struct {{").unwrap();
        writeln!(out, "    uint32_t mid; ///< Message ID of the message").unwrap();
        writeln!(out, "    uint8_t  dlc; ///< Data length of the message").unwrap();
        writeln!(out, "}} msg_hdr_t;").unwrap();
    }

    fn emit_msg_hdr_instances(&self, out: &mut String) {
        for message in &self.dbc.messages {
            writeln!(
                out,
                "static const msg_hdr_t {:<39}{{ {:>4}, {} }};",
                format!("{}_HDR = ", message.base_name()),
                message.id,
                message.length
            )
            .unwrap();
        }
    }

    fn emit_message_struct(&self, message: &Message, out: &mut String) {
        if !self.is_visible(message) {
            writeln!(
                out,
                "\n/// Not generating '{}' since we are not the sender or a recipient of any of its signals",
                message.struct_name()
            )
            .unwrap();
            return;
        }

        writeln!(
            out,
            "\n/// Message: {} from '{}', DLC: {} byte(s), MID: {}",
            message.name, message.sender, message.length, message.id
        )
        .unwrap();
        writeln!(out, "typedef struct {{").unwrap();
        for signal in &message.signals {
            self.emit_signal_field(signal, out);
        }
        writeln!(out, "\n    mia_info_t mia_info;").unwrap();
        writeln!(out, "}} {};", message.struct_name()).unwrap();
    }

    fn emit_signal_field(&self, signal: &Signal, out: &mut String) {
        let mut line = format!(
            "    {} {};",
            typemap::storage_type(signal).c_type(),
            signal.name
        );
        while line.len() < 40 {
            line.push(' ');
        }
        line.push_str(&format!(" ///< B{}:{}", signal.bit_end(), signal.bit_start));
        if signal.has_bounds() {
            line.push_str(&format!(
                "  Min: {} Max: {}",
                signal.min_val_str, signal.max_val_str
            ));
        }
        line.push_str(&format!("   Destination: {}", signal.recipients.join(",")));
        writeln!(out, "{}", line).unwrap();
    }

    fn emit_mia_externs(&self, out: &mut String) {
        writeln!(
            out,
            "\n/// These 'externs' need to be defined in a source file of your project"
        )
        .unwrap();
        for message in &self.dbc.messages {
            if self.receives(message) {
                writeln!(out, "extern const uint32_t {}__MIA_MS;", message.name).unwrap();
                writeln!(
                    out,
                    "extern const {} {}__MIA_MSG;",
                    message.struct_name(),
                    message.name
                )
                .unwrap();
            }
        }
    }

    fn emit_encode(&self, message: &Message, out: &mut String) {
        if !self.sends(message) {
            log::debug!(
                "Skipping {}_encode(): sender is '{}'",
                message.base_name(),
                message.sender
            );
            writeln!(
                out,
                "\n/// Not generating code for {}_encode() since the sender is {} and we are {}",
                message.base_name(),
                message.sender,
                self.options.self_node
            )
            .unwrap();
            return;
        }

        writeln!(out, "\n/// Encode {}'s '{}' message", message.sender, message.name).unwrap();
        writeln!(out, "/// @returns the message header of this message").unwrap();
        if message.signals.iter().any(Signal::has_bounds) {
            writeln!(
                out,
                "/// @note Out-of-range signal values in 'from' are clamped in place, so the caller needs exclusive access to the struct during this call"
            )
            .unwrap();
        }
        writeln!(
            out,
            "static msg_hdr_t {}_encode(uint64_t *to, {} *from)",
            message.base_name(),
            message.struct_name()
        )
        .unwrap();
        writeln!(out, "{{").unwrap();
        writeln!(out, "    *to = 0; ///< Default the entire destination data with zeroes").unwrap();
        self.codegen.encode_prelude(out);
        writeln!(out).unwrap();

        for signal in &message.signals {
            if signal.has_bounds() {
                writeln!(out).unwrap();
                writeln!(
                    out,
                    "    if(from->{} < {}) {{ from->{} = {}; }}",
                    signal.name, signal.min_val_str, signal.name, signal.min_val_str
                )
                .unwrap();
                writeln!(
                    out,
                    "    if(from->{} > {}) {{ from->{} = {}; }}",
                    signal.name, signal.max_val_str, signal.name, signal.max_val_str
                )
                .unwrap();
            }
            self.codegen.encode_signal(signal, out);
        }

        writeln!(out, "\n    return {}_HDR;", message.base_name()).unwrap();
        writeln!(out, "}}").unwrap();
    }

    fn emit_decode(&self, message: &Message, out: &mut String) {
        if !self.receives(message) {
            log::debug!(
                "Skipping {}_decode(): '{}' receives none of its signals",
                message.base_name(),
                self.options.self_node
            );
            writeln!(
                out,
                "\n/// Not generating code for {}_decode() since we are not the recipient of any of its signals",
                message.base_name()
            )
            .unwrap();
            return;
        }

        writeln!(out, "\n/// Decode {}'s '{}' message", message.sender, message.name).unwrap();
        writeln!(
            out,
            "/// @param hdr  The header of the message to validate its DLC and MID; this can be NULL to skip this check"
        )
        .unwrap();
        writeln!(
            out,
            "static inline bool {}_decode({} *to, const uint64_t *from, const msg_hdr_t *hdr)",
            message.base_name(),
            message.struct_name()
        )
        .unwrap();
        writeln!(out, "{{").unwrap();
        writeln!(out, "    const bool success = true;").unwrap();
        writeln!(
            out,
            "    if (NULL != hdr && (hdr->dlc != {base}_HDR.dlc || hdr->mid != {base}_HDR.mid)) {{",
            base = message.base_name()
        )
        .unwrap();
        writeln!(out, "        return !success;").unwrap();
        writeln!(out, "    }}").unwrap();
        self.codegen.decode_prelude(out);
        writeln!(out).unwrap();

        for signal in &message.signals {
            self.codegen.decode_signal(signal, out);
        }

        writeln!(out).unwrap();
        writeln!(out, "    to->mia_info.mia_counter_ms = 0; ///< Reset the MIA counter").unwrap();
        writeln!(out, "    return success;").unwrap();
        writeln!(out, "}}").unwrap();
    }

    fn emit_mia_handler(&self, message: &Message, out: &mut String) {
        if !self.receives(message) {
            return;
        }

        writeln!(
            out,
            "\n/// Handle the MIA for {}'s '{}' message",
            message.sender, message.name
        )
        .unwrap();
        writeln!(out, "/// @param   time_incr_ms  The time to increment the MIA counter with").unwrap();
        writeln!(out, "/// @returns true if the MIA just occurred").unwrap();
        writeln!(
            out,
            "/// @post    If the MIA counter is not reset, and goes beyond the MIA value, the MIA flag is set"
        )
        .unwrap();
        writeln!(
            out,
            "static inline bool {}_handle_mia({} *msg, uint32_t time_incr_ms)",
            message.base_name(),
            message.struct_name()
        )
        .unwrap();
        writeln!(out, "{{").unwrap();
        writeln!(out, "    bool mia_occurred = false;").unwrap();
        writeln!(out, "    const mia_info_t old_mia = msg->mia_info;").unwrap();
        writeln!(
            out,
            "    msg->mia_info.is_mia = (msg->mia_info.mia_counter_ms >= {}__MIA_MS);",
            message.name
        )
        .unwrap();
        writeln!(out).unwrap();
        writeln!(out, "    if (!msg->mia_info.is_mia) {{").unwrap();
        writeln!(out, "        msg->mia_info.mia_counter_ms += time_incr_ms;").unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out, "    else if(!old_mia.is_mia)   {{").unwrap();
        writeln!(
            out,
            "        // Copy the MIA default, then restore the counter and flag the copy overwrote"
        )
        .unwrap();
        writeln!(out, "        *msg = {}__MIA_MSG;", message.name).unwrap();
        writeln!(
            out,
            "        msg->mia_info.mia_counter_ms = {}__MIA_MS;",
            message.name
        )
        .unwrap();
        writeln!(out, "        msg->mia_info.is_mia = true;").unwrap();
        writeln!(out, "        mia_occurred = true;").unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out, "\n    return mia_occurred;").unwrap();
        writeln!(out, "}}").unwrap();
    }
}
