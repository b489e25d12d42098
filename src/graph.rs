//! Host/connection graph built up from observed IPv4 traffic.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use serde::Serialize;

/// Type tag consumers key on; part of the output contract.
pub const GRAPH_TYPE: &str = "web2.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Host {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    #[serde(rename = "type")]
    pub graph_type: &'static str,
    pub nodes: Vec<Host>,
    pub links: Vec<Connection>,
}

impl Graph {
    /// Stamps the fixed type tag onto the final node and link sequences.
    pub fn assemble(nodes: Vec<Host>, links: Vec<Connection>) -> Self {
        Graph {
            graph_type: GRAPH_TYPE,
            nodes,
            links,
        }
    }
}

/// Distinct addresses in first-seen order.
///
/// The set answers "seen before?", the vec keeps the order; an address is
/// appended only when the set insert actually adds it.
#[derive(Debug, Default)]
pub struct HostRegistry {
    seen: HashSet<Ipv4Addr>,
    order: Vec<Ipv4Addr>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, addr: Ipv4Addr) {
        if self.seen.insert(addr) {
            self.order.push(addr);
        }
    }

    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.order
    }

    pub fn into_hosts(self) -> Vec<Host> {
        self.order
            .into_iter()
            .map(|addr| Host {
                id: addr.to_string(),
            })
            .collect()
    }
}

/// One directed edge per packet, arrival order, no deduplication.
#[derive(Debug, Default)]
pub struct ConnectionCollector {
    links: Vec<Connection>,
}

impl ConnectionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, source: Ipv4Addr, target: Ipv4Addr) {
        self.links.push(Connection {
            source: source.to_string(),
            target: target.to_string(),
        });
    }

    pub fn links(&self) -> &[Connection] {
        &self.links
    }

    pub fn into_links(self) -> Vec<Connection> {
        self.links
    }
}
