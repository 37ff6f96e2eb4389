//! Core data types for simulation metrics extraction.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Application-level packet sequence number
pub type SeqNo = u32;

/// Identity of a node as it appears in a log record.
///
/// Numeric ids come either from an explicit id field or from the low 16 bits
/// of a source address. Anything else is kept verbatim so that distinct
/// sources still deduplicate separately.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Id(u32),
    Named(String),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{}", id),
            NodeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Per-node sequence numbers, ordered for stable reporting
pub type PacketLedger = BTreeMap<NodeRef, BTreeSet<SeqNo>>;

/// Everything extracted from a single simulator log
#[derive(Debug, Clone, Default)]
pub struct LogMetrics {
    pub tx_packets: PacketLedger,
    pub rx_packets: PacketLedger,
    /// One-way delay samples in milliseconds
    pub delays_ms: Vec<f64>,
    /// Lines carrying routing-protocol control markers
    pub control_packets: u64,
}

impl LogMetrics {
    /// Record a transmission; repeats of the same packet are ignored
    pub fn record_tx(&mut self, node: NodeRef, seq: SeqNo) {
        self.tx_packets.entry(node).or_default().insert(seq);
    }

    /// Record a reception; repeats of the same packet are ignored
    pub fn record_rx(&mut self, node: NodeRef, seq: SeqNo) {
        self.rx_packets.entry(node).or_default().insert(seq);
    }

    pub fn tx_count(&self) -> usize {
        self.tx_packets.values().map(BTreeSet::len).sum()
    }

    pub fn rx_count(&self) -> usize {
        self.rx_packets.values().map(BTreeSet::len).sum()
    }

    /// Packet delivery ratio in percent, 0 when nothing was sent
    pub fn pdr(&self) -> f64 {
        percentage(self.rx_count() as f64, self.tx_count()).unwrap_or(0.0)
    }

    pub fn avg_delay_ms(&self) -> Option<f64> {
        self.delay_stats().map(|s| s.mean_ms)
    }

    pub fn delay_stats(&self) -> Option<DelayStats> {
        DelayStats::from_samples(&self.delays_ms)
    }

    /// Control packets per data transmission, in percent
    pub fn overhead_pct(&self) -> Option<f64> {
        percentage(self.control_packets as f64, self.tx_count())
    }

    /// Per-node delivery over every identity seen on either side
    pub fn node_breakdown(&self) -> Vec<NodeDelivery> {
        let nodes: BTreeSet<&NodeRef> = self
            .tx_packets
            .keys()
            .chain(self.rx_packets.keys())
            .collect();

        nodes
            .into_iter()
            .map(|node| NodeDelivery {
                node: node.clone(),
                tx: self.tx_packets.get(node).map_or(0, BTreeSet::len),
                rx: self.rx_packets.get(node).map_or(0, BTreeSet::len),
            })
            .collect()
    }
}

fn percentage(numerator: f64, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator * 100.0 / denominator as f64)
    }
}

/// Delivery counts for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDelivery {
    pub node: NodeRef,
    pub tx: usize,
    pub rx: usize,
}

impl NodeDelivery {
    pub fn pdr(&self) -> Option<f64> {
        percentage(self.rx as f64, self.tx)
    }
}

/// Summary of delay samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayStats {
    pub samples: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl DelayStats {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sum: f64 = samples.iter().sum();
        let min_ms = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            samples: samples.len(),
            mean_ms: sum / samples.len() as f64,
            min_ms,
            max_ms,
        })
    }
}

/// Trust-engine exposure figures from the last row of `exposure.csv`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExposureMetrics {
    pub e1: Option<f64>,
    pub e3: Option<f64>,
    pub e1_num: Option<f64>,
    pub e1_den: Option<f64>,
    pub e3_num: Option<f64>,
    pub e3_den: Option<f64>,
}

/// Routing stability figures from `parent_switch.csv` / `stats.csv`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StabilityMetrics {
    pub parent_switch_rate: Option<f64>,
    pub sink_adv_attacker: Option<f64>,
    pub sink_stab_attacker: Option<f64>,
    pub sink_adv_mean: Option<f64>,
    pub sink_stab_mean: Option<f64>,
}

/// Experiment parameters recovered from a run directory name
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    pub topology: String,
    pub attack_rate: Option<u32>,
    pub trust: u32,
    pub lambda: u32,
    pub gamma: u32,
    pub attack_mode: Option<u32>,
    pub sink_delta: Option<u32>,
    pub trust_alpha: Option<f64>,
    pub seed: Option<u64>,
}

/// Why a run was routed to the invalid table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NoTransmissions,
    NoReceptions,
    MoreReceptionsThanTransmissions,
    ZeroE1Denominator,
    ZeroE3Denominator,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            InvalidReason::NoTransmissions => "tx=0",
            InvalidReason::NoReceptions => "rx=0",
            InvalidReason::MoreReceptionsThanTransmissions => "tx<rx",
            InvalidReason::ZeroE1Denominator => "e1_den=0",
            InvalidReason::ZeroE3Denominator => "e3_den=0",
        };
        f.write_str(tag)
    }
}
