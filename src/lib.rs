pub mod capture;
pub mod graph;
pub mod stream;

pub use capture::{CaptureConfig, CaptureError, DecodedPacket, Ipv4Record, PacketStream};
pub use graph::{Connection, ConnectionCollector, Graph, Host, HostRegistry, GRAPH_TYPE};
pub use stream::StreamDriver;
