//! Log parsing for Cooja simulation logs.
//!
//! Each line is classified into at most one record kind by an ordered list of
//! tag parsers; control-protocol markers are counted on every line
//! independently. Malformed lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::types::*;
use crate::error::AnalysisError;

const RX_TAG: &str = "CSV,RX,";
const RTT_TAG: &str = "CSV,RTT,";
const DELAY_TAG: &str = "CSV,DELAY,";
const TX_TAG: &str = "CSV,TX,";
const TX_TEXT_TAG: &str = "TX ";

/// Substrings that mark a routing-protocol control message
const CONTROL_MARKERS: [&str; 3] = ["RPL:", "DIO", "DAO"];

/// Compiled regex patterns for free-text mote output
pub struct LogPatterns {
    /// Match: "TX seq=<n>" or "TX id=<n> seq=<n>"
    pub tx_text: Regex,
    /// Match: Cooja mote prefix "ID:<n>"
    pub mote_id: Regex,
}

impl LogPatterns {
    pub fn new() -> Self {
        Self {
            tx_text: Regex::new(r"\bTX (?:id=(\d+)\s+)?seq=(\d+)").expect("Invalid tx_text regex"),
            mote_id: Regex::new(r"ID:(\d+)").expect("Invalid mote_id regex"),
        }
    }
}

impl Default for LogPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<LogPatterns> = LazyLock::new(LogPatterns::new);

/// A single recognized log record
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    /// Data packet sent; `node` is `None` when the line omits the sender
    Tx { node: Option<NodeRef>, seq: SeqNo },
    /// Data packet received at the sink
    Rx { source: NodeRef, seq: SeqNo },
    /// One-way delay sample in milliseconds
    Delay { delay_ms: f64 },
}

type RecordParser = fn(&str) -> Option<LogRecord>;

/// Tag parsers in priority order. The first tag found in a line decides
/// how the line is parsed, even if that parse then fails.
static RECORD_PARSERS: [(&str, RecordParser); 5] = [
    (RX_TAG, parse_rx),
    (RTT_TAG, parse_rtt),
    (DELAY_TAG, parse_delay),
    (TX_TAG, parse_csv_tx),
    (TX_TEXT_TAG, parse_tx_text),
];

/// Classify a log line into a record, if it carries one
pub fn classify_line(line: &str) -> Option<LogRecord> {
    let (_, parse) = RECORD_PARSERS.iter().find(|(tag, _)| line.contains(tag))?;
    parse(line)
}

/// Whether a line carries a routing control marker
pub fn is_control_line(line: &str) -> bool {
    CONTROL_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Comma-separated fields following the first occurrence of `tag`
fn fields_after<'a>(line: &'a str, tag: &str) -> Vec<&'a str> {
    line.split_once(tag)
        .map(|(_, rest)| rest.split(',').map(str::trim).collect())
        .unwrap_or_default()
}

/// Node id encoded in the low 16 bits of an IPv6 (or IPv4) address
pub fn node_id_from_address(addr: &str) -> Option<u32> {
    match addr.trim().parse::<IpAddr>().ok()? {
        IpAddr::V6(v6) => Some((u128::from(v6) & 0xffff) as u32),
        IpAddr::V4(v4) => Some(u32::from(v4) & 0xffff),
    }
}

/// Resolve a source field: address, then plain id, then literal
fn decode_source(field: &str) -> Option<NodeRef> {
    if field.is_empty() {
        return None;
    }
    if let Some(id) = node_id_from_address(field) {
        return Some(NodeRef::Id(id));
    }
    match field.parse::<u32>() {
        Ok(id) => Some(NodeRef::Id(id)),
        Err(_) => Some(NodeRef::Named(field.to_string())),
    }
}

/// `CSV,RX,<src>,<seq>,...` or `CSV,RX,node=<n>,<src>,<seq>,...`
fn parse_rx(line: &str) -> Option<LogRecord> {
    let fields = fields_after(line, RX_TAG);
    let (src, seq) = match fields.as_slice() {
        [first, src, seq, ..] if first.starts_with("node=") => (*src, *seq),
        [src, seq, ..] => (*src, *seq),
        _ => return None,
    };
    let seq = seq.parse().ok()?;
    let source = decode_source(src)?;
    Some(LogRecord::Rx { source, seq })
}

/// `CSV,RTT,<seq>,<t0>,<t_ack>,<rtt_ticks>,...`
///
/// One tick is one millisecond; half the round trip approximates the
/// one-way delay.
fn parse_rtt(line: &str) -> Option<LogRecord> {
    let fields = fields_after(line, RTT_TAG);
    if fields.len() < 4 {
        return None;
    }
    fields[0].parse::<SeqNo>().ok()?;
    let rtt_ticks: u64 = fields[3].parse().ok()?;
    Some(LogRecord::Delay {
        delay_ms: rtt_ticks as f64 / 2.0,
    })
}

/// `CSV,DELAY,<delay_ms>,...`
fn parse_delay(line: &str) -> Option<LogRecord> {
    let fields = fields_after(line, DELAY_TAG);
    let delay_ms: f64 = fields.first()?.parse().ok()?;
    if !delay_ms.is_finite() {
        return None;
    }
    Some(LogRecord::Delay { delay_ms })
}

/// `CSV,TX,<node>,<seq>,...`
fn parse_csv_tx(line: &str) -> Option<LogRecord> {
    let fields = fields_after(line, TX_TAG);
    if fields.len() < 2 {
        return None;
    }
    let node: u32 = fields[0].parse().ok()?;
    let seq: SeqNo = fields[1].parse().ok()?;
    Some(LogRecord::Tx {
        node: Some(NodeRef::Id(node)),
        seq,
    })
}

/// Free-text sender output: `... TX id=<n> seq=<n>` or `ID:<n> ... TX seq=<n>`
fn parse_tx_text(line: &str) -> Option<LogRecord> {
    let caps = PATTERNS.tx_text.captures(line)?;
    let seq: SeqNo = caps.get(2)?.as_str().parse().ok()?;
    let node = caps
        .get(1)
        .and_then(|id| id.as_str().parse().ok())
        .or_else(|| PATTERNS.mote_id.captures(line)?.get(1)?.as_str().parse().ok())
        .map(NodeRef::Id);
    Some(LogRecord::Tx { node, seq })
}

/// Accumulation state for a single log
#[derive(Debug, Default)]
pub struct ParseState {
    metrics: LogMetrics,
    /// First RX source seen, used for TX lines that omit the sender
    inferred_sender: Option<NodeRef>,
    /// TX sequence numbers seen before any sender could be inferred
    pending_tx_seqs: Vec<SeqNo>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();

        match classify_line(line) {
            Some(LogRecord::Rx { source, seq }) => {
                if self.inferred_sender.is_none() {
                    self.inferred_sender = Some(source.clone());
                }
                self.metrics.record_rx(source, seq);
            }
            Some(LogRecord::Delay { delay_ms }) => self.metrics.delays_ms.push(delay_ms),
            Some(LogRecord::Tx { node, seq }) => {
                match node.or_else(|| self.inferred_sender.clone()) {
                    Some(node) => self.metrics.record_tx(node, seq),
                    None => self.pending_tx_seqs.push(seq),
                }
            }
            None => {}
        }

        if is_control_line(line) {
            self.metrics.control_packets += 1;
        }
    }

    /// Attribute buffered transmissions and return the accumulated metrics
    pub fn finish(mut self) -> LogMetrics {
        match self.inferred_sender {
            Some(sender) => {
                for seq in self.pending_tx_seqs.drain(..) {
                    self.metrics.record_tx(sender.clone(), seq);
                }
            }
            None if !self.pending_tx_seqs.is_empty() => {
                log::debug!(
                    "Dropping {} TX records with no resolvable sender",
                    self.pending_tx_seqs.len()
                );
            }
            None => {}
        }
        self.metrics
    }
}

/// Parse a log from any buffered reader
///
/// Bytes that are not valid UTF-8 are replaced rather than dropping the line.
pub fn parse_log_reader<R: BufRead>(reader: R) -> LogMetrics {
    let mut state = ParseState::new();

    for chunk in reader.split(b'\n') {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Stopped reading log early: {}", e);
                break;
            }
        };
        state.push_line(&String::from_utf8_lossy(&bytes));
    }

    state.finish()
}

/// Parse a single log file
pub fn parse_log_file(path: &Path) -> Result<LogMetrics, AnalysisError> {
    if !path.is_file() {
        return Err(AnalysisError::missing(path));
    }
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let reader = BufReader::with_capacity(64 * 1024, file);

    let metrics = parse_log_reader(reader);
    log::debug!(
        "Parsed {}: {} TX, {} RX, {} delay samples, {} control lines",
        path.display(),
        metrics.tx_count(),
        metrics.rx_count(),
        metrics.delays_ms.len(),
        metrics.control_packets
    );
    Ok(metrics)
}
