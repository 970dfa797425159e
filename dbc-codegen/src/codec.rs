//! Runtime signal codec and MIA bookkeeping
//!
//! Executes the same clamping, scaling and bit-layout arithmetic that the
//! generated C performs, against the in-memory model instead of emitted
//! text. Round-trip and isolation tests run here; the generator only has to
//! reproduce these operations as C statements.

use crate::config::Endianness;
use crate::layout;
use crate::model::{Message, Signal};
use crate::types::{CodegenError, Result};

/// Signal codec - packs and unpacks physical values in a 64-bit payload
pub struct SignalCodec;

impl SignalCodec {
    /// Encode one physical value into the payload word.
    ///
    /// The value is clamped to the signal's declared range before scaling;
    /// the value actually written is returned.
    pub fn encode_signal(
        signal: &Signal,
        word: &mut u64,
        physical: f64,
        endianness: Endianness,
    ) -> f64 {
        let clamped = layout::clamp(signal, physical);
        let raw = layout::raw_from_physical(signal, clamped);

        match endianness {
            Endianness::Little => {
                layout::insert_le(word, signal.bit_start, signal.bit_size, raw)
            }
            Endianness::Big => {
                let mut bytes = word.to_le_bytes();
                layout::insert_be(&mut bytes, signal.bit_start, signal.bit_size, raw);
                *word = u64::from_le_bytes(bytes);
            }
        }

        clamped
    }

    /// Decode one physical value from the payload word
    pub fn decode_signal(signal: &Signal, word: u64, endianness: Endianness) -> f64 {
        let raw = match endianness {
            Endianness::Little => layout::extract_le(word, signal.bit_start, signal.bit_size),
            Endianness::Big => {
                layout::extract_be(&word.to_le_bytes(), signal.bit_start, signal.bit_size)
            }
        };
        layout::physical_from_raw(signal, raw)
    }

    /// Encode a whole message from physical values given in signal order
    pub fn encode_message(
        message: &Message,
        values: &[f64],
        endianness: Endianness,
    ) -> Result<u64> {
        if values.len() != message.signals.len() {
            return Err(CodegenError::ValueCountMismatch {
                message: message.name.clone(),
                expected: message.signals.len(),
                actual: values.len(),
            });
        }

        let mut word = 0u64;
        for (signal, value) in message.signals.iter().zip(values) {
            Self::encode_signal(signal, &mut word, *value, endianness);
        }
        Ok(word)
    }

    /// Decode a whole message into physical values in signal order
    pub fn decode_message(message: &Message, word: u64, endianness: Endianness) -> Vec<f64> {
        message
            .signals
            .iter()
            .map(|signal| Self::decode_signal(signal, word, endianness))
            .collect()
    }
}

/// Staleness state of one received message image.
///
/// Mirrors the `mia_info_t` the generated structs embed: a counter of
/// milliseconds since the last decode plus the latched missing-in-action
/// flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiaInfo {
    /// True once the counter has reached the threshold
    pub is_mia: bool,
    /// Milliseconds accumulated since the last decode
    pub mia_counter_ms: u32,
}

impl MiaInfo {
    /// Advance the staleness state by `elapsed_ms`.
    ///
    /// While the message is fresh the counter accumulates. The first call
    /// that finds the counter at or past `threshold_ms` replaces `image`
    /// with `mia_default`, pins the counter at the threshold, latches the
    /// flag and returns true. Later calls return false until a decode
    /// resets the counter.
    pub fn handle<T: Clone>(
        &mut self,
        image: &mut T,
        mia_default: &T,
        threshold_ms: u32,
        elapsed_ms: u32,
    ) -> bool {
        let old_mia = self.is_mia;
        self.is_mia = self.mia_counter_ms >= threshold_ms;

        if !self.is_mia {
            self.mia_counter_ms = self.mia_counter_ms.saturating_add(elapsed_ms);
            false
        } else if !old_mia {
            *image = mia_default.clone();
            self.mia_counter_ms = threshold_ms;
            true
        } else {
            false
        }
    }

    /// Record a successful decode.
    ///
    /// Only the counter resets; the flag is re-derived on the next
    /// [`handle`](Self::handle) call, exactly like the generated decode
    /// functions which touch nothing but `mia_counter_ms`.
    pub fn note_decoded(&mut self) {
        self.mia_counter_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(
        name: &str,
        bit_start: u16,
        bit_size: u16,
        scale: &str,
        offset: &str,
        min_val: &str,
        max_val: &str,
    ) -> Signal {
        Signal {
            name: name.to_string(),
            bit_start,
            bit_size,
            is_unsigned: true,
            scale: scale.parse().unwrap(),
            scale_str: scale.to_string(),
            offset: offset.parse().unwrap(),
            offset_str: offset.to_string(),
            min_val: min_val.parse().unwrap(),
            min_val_str: min_val.to_string(),
            max_val: max_val.parse().unwrap(),
            max_val_str: max_val.to_string(),
            recipients: vec!["IO".to_string()],
        }
    }

    fn temperature_message() -> Message {
        let mut msg = Message::new("100", "SENSOR_DATA", "8", "SENSOR");
        msg.add_signal(signal("TEMP", 0, 12, "0.1", "-40", "-40", "125"));
        msg.add_signal(signal("HUMIDITY", 12, 7, "1", "0", "0", "100"));
        msg.add_signal(signal("FLAGS", 19, 4, "1", "0", "0", "0"));
        msg
    }

    #[test]
    fn test_signal_round_trip_within_quantization() {
        let sig = signal("TEMP", 0, 12, "0.1", "-40", "-40", "125");

        for endianness in [Endianness::Little, Endianness::Big] {
            let mut word = 0u64;
            let written = SignalCodec::encode_signal(&sig, &mut word, 21.57, endianness);
            assert_eq!(written, 21.57);

            let back = SignalCodec::decode_signal(&sig, word, endianness);
            assert!((back - 21.57).abs() <= 0.1 / 2.0 + 1e-9, "got {}", back);

            // Decoding the same word again yields the same value
            assert_eq!(SignalCodec::decode_signal(&sig, word, endianness), back);
        }
    }

    #[test]
    fn test_encode_clamps_to_declared_range() {
        let sig = signal("HUMIDITY", 0, 7, "1", "0", "0", "100");

        let mut word = 0u64;
        let written = SignalCodec::encode_signal(&sig, &mut word, 312.0, Endianness::Little);
        assert_eq!(written, 100.0);
        assert_eq!(SignalCodec::decode_signal(&sig, word, Endianness::Little), 100.0);

        let mut word = 0u64;
        let written = SignalCodec::encode_signal(&sig, &mut word, -3.0, Endianness::Little);
        assert_eq!(written, 0.0);
    }

    #[test]
    fn test_clamped_encode_matches_bound_exactly() {
        let sig = signal("LEVEL", 0, 8, "1", "0", "0", "100");

        let mut clamped = 0u64;
        SignalCodec::encode_signal(&sig, &mut clamped, 150.0, Endianness::Little);
        let mut exact = 0u64;
        SignalCodec::encode_signal(&sig, &mut exact, 100.0, Endianness::Little);

        assert_eq!(clamped, exact);
        assert_eq!(clamped, 100);
        assert_eq!(
            SignalCodec::decode_signal(&sig, clamped, Endianness::Little),
            100.0
        );
    }

    #[test]
    fn test_unbounded_signal_is_not_clamped() {
        // [0|0] carries no range, so an oversized value is only truncated
        // by the width mask and must not disturb neighbouring bits
        let low = signal("LOW", 0, 4, "1", "0", "0", "0");
        let high = signal("HIGH", 4, 4, "1", "0", "0", "0");

        let mut word = 0u64;
        SignalCodec::encode_signal(&high, &mut word, 9.0, Endianness::Little);
        SignalCodec::encode_signal(&low, &mut word, 300.0, Endianness::Little);

        // 300 & 0xf == 12; the neighbour keeps its value
        assert_eq!(SignalCodec::decode_signal(&low, word, Endianness::Little), 12.0);
        assert_eq!(SignalCodec::decode_signal(&high, word, Endianness::Little), 9.0);
    }

    #[test]
    fn test_message_round_trip() {
        let msg = temperature_message();
        let values = [21.5, 55.0, 9.0];

        for endianness in [Endianness::Little, Endianness::Big] {
            let word = SignalCodec::encode_message(&msg, &values, endianness).unwrap();
            let decoded = SignalCodec::decode_message(&msg, word, endianness);

            assert_eq!(decoded.len(), 3);
            assert!((decoded[0] - 21.5).abs() <= 0.05 + 1e-9);
            assert_eq!(decoded[1], 55.0);
            assert_eq!(decoded[2], 9.0);
        }
    }

    #[test]
    fn test_message_value_count_mismatch() {
        let msg = temperature_message();
        let err = SignalCodec::encode_message(&msg, &[1.0, 2.0], Endianness::Little).unwrap_err();
        match err {
            CodegenError::ValueCountMismatch { expected, actual, .. } => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected ValueCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_mia_edge_fires_exactly_once() {
        let mia_default = vec![99.0, 0.0];
        let mut image = vec![21.5, 55.0];
        let mut state = MiaInfo::default();

        // Counter accumulates while fresh: 100, 200, 300
        assert!(!state.handle(&mut image, &mia_default, 300, 100));
        assert!(!state.handle(&mut image, &mia_default, 300, 100));
        assert!(!state.handle(&mut image, &mia_default, 300, 100));
        assert!(!state.is_mia);
        assert_eq!(image, vec![21.5, 55.0]);

        // The call after the counter reaches the threshold fires the edge
        assert!(state.handle(&mut image, &mia_default, 300, 100));
        assert!(state.is_mia);
        assert_eq!(state.mia_counter_ms, 300);
        assert_eq!(image, mia_default);

        // Already MIA: no further events, image untouched
        image[0] = 1.0;
        assert!(!state.handle(&mut image, &mia_default, 300, 100));
        assert_eq!(image, vec![1.0, 0.0]);
    }

    #[test]
    fn test_mia_counter_is_pinned_at_threshold() {
        let mia_default = 0u8;
        let mut image = 7u8;
        let mut state = MiaInfo {
            is_mia: false,
            mia_counter_ms: 260,
        };

        // 260 >= 250 on entry, so the edge fires and the overshoot is pinned
        assert!(state.handle(&mut image, &mia_default, 250, 100));
        assert_eq!(state.mia_counter_ms, 250);
        assert_eq!(image, 0);
    }

    #[test]
    fn test_decode_resets_counter_but_not_flag() {
        let mia_default = 0u8;
        let mut image = 7u8;
        let mut state = MiaInfo {
            is_mia: true,
            mia_counter_ms: 500,
        };

        state.note_decoded();
        assert_eq!(state.mia_counter_ms, 0);
        // Flag is stale until the next handle() re-derives it
        assert!(state.is_mia);

        assert!(!state.handle(&mut image, &mia_default, 300, 50));
        assert!(!state.is_mia);
        assert_eq!(state.mia_counter_ms, 50);
        assert_eq!(image, 7);
    }
}
