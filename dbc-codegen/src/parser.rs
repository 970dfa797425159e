//! Line-based parser for Vector DBC files
//!
//! Only the three description kinds that drive code generation are consumed:
//! the `BU_:` node list, `BO_` message definitions and ` SG_` signal
//! definitions. Every other line (VERSION, NS_, CM_, BA_, VAL_, ...) is
//! ignored. Signal lines attach to the most recent message line, so the
//! parser carries an explicit current-message cursor through the file.

use crate::model::{Dbc, Message, Node, Signal};
use crate::types::{CodegenError, Result};
use std::path::Path;

/// Parse a DBC file into a [`Dbc`] model
pub fn parse_dbc_file(path: &Path) -> Result<Dbc> {
    log::info!("Parsing DBC file: {:?}", path);

    // Read as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path).map_err(|source| CodegenError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    // Try UTF-8 first, then fall back to Latin-1/Windows-1252 encoding
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc");

    parse_dbc_str(name, &content)
}

/// Parse DBC description text into a [`Dbc`] model.
///
/// `name` is recorded on the model and shows up in the generated file
/// preamble; it is usually the source file name.
pub fn parse_dbc_str(name: &str, content: &str) -> Result<Dbc> {
    let mut dbc = Dbc::new(name);
    let mut current: Option<Message> = None;

    for (idx, line) in content.lines().enumerate() {
        let lineno = idx + 1;

        if line.starts_with("BU_:") {
            dbc.nodes = line.split_whitespace().skip(1).map(Node::new).collect();
        } else if line.starts_with("BO_ ") {
            if let Some(done) = current.take() {
                dbc.messages.push(done);
            }
            current = Some(parse_message_line(lineno, line)?);
        } else if line.starts_with(" SG_ ") {
            let signal = parse_signal_line(lineno, line)?;
            match current.as_mut() {
                Some(message) => message.add_signal(signal),
                None => {
                    return Err(CodegenError::OrphanSignal {
                        line: lineno,
                        name: signal.name,
                    })
                }
            }
        }
    }

    if let Some(done) = current.take() {
        dbc.messages.push(done);
    }

    let stats = dbc.stats();
    log::info!(
        "Parsed {} messages with {} signals from '{}'",
        stats.num_messages,
        stats.num_signals,
        name
    );

    Ok(dbc)
}

/// Parse a `BO_ <id> <name>: <dlc> <sender>` line
fn parse_message_line(lineno: usize, line: &str) -> Result<Message> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(CodegenError::MalformedLine {
            line: lineno,
            reason: format!(
                "message definition has {} of 5 expected columns",
                tokens.len()
            ),
        });
    }

    Ok(Message::new(
        tokens[1],
        tokens[2].trim_matches(':'),
        tokens[3],
        tokens[4],
    ))
}

/// Parse a ` SG_ <name> : <start>|<size>@1<sign> (<scale>,<offset>) [<min>|<max>] "<unit>" <recipients>` line
fn parse_signal_line(lineno: usize, line: &str) -> Result<Signal> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 8 {
        return Err(CodegenError::MalformedLine {
            line: lineno,
            reason: format!(
                "signal definition has {} of 8 expected columns",
                tokens.len()
            ),
        });
    }
    if tokens[2] != ":" {
        return Err(CodegenError::MalformedLine {
            line: lineno,
            reason: format!(
                "expected ':' after signal name, found '{}' (multiplexed signals are not supported)",
                tokens[2]
            ),
        });
    }

    let name = tokens[1];

    // <start>|<size>@<order><sign>
    let position: Vec<&str> = tokens[3].split(|c| c == '|' || c == '@').collect();
    if position.len() != 3 {
        return Err(CodegenError::MalformedLine {
            line: lineno,
            reason: format!("signal position '{}' does not match start|size@order", tokens[3]),
        });
    }
    let bit_start: u16 = parse_int(lineno, position[0], "bit start")?;
    let bit_size: u16 = parse_int(lineno, position[1], "bit size")?;
    let is_unsigned = position[2].contains('+');

    if bit_size == 0 {
        return Err(CodegenError::InvalidSignalDefinition(format!(
            "signal '{}' has zero width",
            name
        )));
    }
    if u32::from(bit_start) + u32::from(bit_size) > 64 {
        return Err(CodegenError::InvalidSignalDefinition(format!(
            "signal '{}' occupies bits {}..{} which do not fit a 64-bit payload",
            name,
            bit_start,
            u32::from(bit_start) + u32::from(bit_size)
        )));
    }

    // (<scale>,<offset>)
    let inner = strip_delimiters(lineno, tokens[4], '(', ')')?;
    let (scale_str, offset_str) = inner.split_once(',').ok_or_else(|| {
        CodegenError::MalformedLine {
            line: lineno,
            reason: format!("scale/offset '{}' is missing the ',' separator", tokens[4]),
        }
    })?;

    // [<min>|<max>]
    let inner = strip_delimiters(lineno, tokens[5], '[', ']')?;
    let (min_str, max_str) = inner.split_once('|').ok_or_else(|| {
        CodegenError::MalformedLine {
            line: lineno,
            reason: format!("min/max '{}' is missing the '|' separator", tokens[5]),
        }
    })?;

    // tokens[6] is the unit and is not used for code generation
    let recipients = tokens[7].split(',').map(str::to_string).collect();

    Ok(Signal {
        name: name.to_string(),
        bit_start,
        bit_size,
        is_unsigned,
        scale: parse_float(lineno, scale_str, "scale")?,
        scale_str: scale_str.to_string(),
        offset: parse_float(lineno, offset_str, "offset")?,
        offset_str: offset_str.to_string(),
        min_val: parse_float(lineno, min_str, "min")?,
        min_val_str: min_str.to_string(),
        max_val: parse_float(lineno, max_str, "max")?,
        max_val_str: max_str.to_string(),
        recipients,
    })
}

fn parse_int(lineno: usize, text: &str, what: &str) -> Result<u16> {
    text.parse().map_err(|_| CodegenError::MalformedLine {
        line: lineno,
        reason: format!("{} '{}' is not a valid integer", what, text),
    })
}

fn parse_float(lineno: usize, text: &str, what: &str) -> Result<f64> {
    text.parse().map_err(|_| CodegenError::MalformedLine {
        line: lineno,
        reason: format!("{} '{}' is not a valid number", what, text),
    })
}

fn strip_delimiters<'a>(lineno: usize, token: &'a str, open: char, close: char) -> Result<&'a str> {
    token
        .strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .ok_or_else(|| CodegenError::MalformedLine {
            line: lineno,
            reason: format!("'{}' is not delimited by '{}' and '{}'", token, open, close),
        })
}
