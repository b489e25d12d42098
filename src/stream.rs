//! Single-pass traversal of the decoded packet sequence.

use tracing::trace;

use crate::capture::DecodedPacket;
use crate::graph::{ConnectionCollector, Graph, HostRegistry};

/// Feeds every IPv4-bearing packet to the two accumulators, then assembles
/// the graph. `run` consumes the driver, so a finished run cannot be
/// mutated or restarted.
#[derive(Debug, Default)]
pub struct StreamDriver {
    hosts: HostRegistry,
    connections: ConnectionCollector,
}

impl StreamDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(mut self, packets: impl IntoIterator<Item = DecodedPacket>) -> Graph {
        for packet in packets {
            let Some(ip) = packet.ipv4 else {
                trace!("skipping non-IPv4 packet");
                continue;
            };
            // Source before destination fixes the node order.
            self.hosts.observe(ip.source);
            self.hosts.observe(ip.destination);
            self.connections.record(ip.source, ip.destination);
        }
        Graph::assemble(self.hosts.into_hosts(), self.connections.into_links())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Ipv4Record;
    use std::net::Ipv4Addr;

    fn ipv4(source: &str, destination: &str) -> DecodedPacket {
        DecodedPacket {
            ipv4: Some(Ipv4Record {
                source: source.parse::<Ipv4Addr>().unwrap(),
                destination: destination.parse::<Ipv4Addr>().unwrap(),
            }),
        }
    }

    fn non_ip() -> DecodedPacket {
        DecodedPacket { ipv4: None }
    }

    #[test]
    fn nodes_first_seen_links_in_arrival_order() {
        let graph = StreamDriver::new().run(vec![
            ipv4("10.0.0.1", "10.0.0.2"),
            non_ip(),
            ipv4("10.0.0.2", "10.0.0.1"),
        ]);

        let ids: Vec<&str> = graph.nodes.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["10.0.0.1", "10.0.0.2"]);

        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[0].source, "10.0.0.1");
        assert_eq!(graph.links[0].target, "10.0.0.2");
        assert_eq!(graph.links[1].source, "10.0.0.2");
        assert_eq!(graph.links[1].target, "10.0.0.1");
    }

    #[test]
    fn non_ipv4_packets_leave_no_trace() {
        let graph = StreamDriver::new().run(vec![non_ip(), non_ip()]);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn empty_stream_yields_empty_tagged_graph() {
        let graph = StreamDriver::new().run(Vec::new());
        assert_eq!(graph.graph_type, "web2.0");
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn self_directed_packet_records_one_node_one_link() {
        let graph = StreamDriver::new().run(vec![ipv4("10.0.0.1", "10.0.0.1")]);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "10.0.0.1");
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].source, "10.0.0.1");
        assert_eq!(graph.links[0].target, "10.0.0.1");
    }

    #[test]
    fn duplicate_packets_produce_duplicate_links() {
        let graph = StreamDriver::new().run(vec![
            ipv4("10.0.0.1", "10.0.0.2"),
            ipv4("10.0.0.1", "10.0.0.2"),
        ]);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[0], graph.links[1]);
    }

    #[test]
    fn rerun_on_same_sequence_is_deterministic() {
        let packets = || {
            vec![
                ipv4("172.16.0.5", "8.8.8.8"),
                ipv4("8.8.8.8", "172.16.0.5"),
                ipv4("172.16.0.6", "8.8.8.8"),
            ]
        };
        let a = StreamDriver::new().run(packets());
        let b = StreamDriver::new().run(packets());
        assert_eq!(a, b);
    }
}
