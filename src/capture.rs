//! Capture sources and link-layer decoding down to the IPv4 header.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use etherparse::{NetSlice, SlicedPacket};
use pcap::{Activated, Capture};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot open capture file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: pcap::Error,
    },
    #[error("cannot open capture device {device}: {source}")]
    OpenDevice {
        device: String,
        source: pcap::Error,
    },
}

/// Knobs for opening a live device, built once in main and passed down.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub snaplen: i32,
    pub promiscuous: bool,
    pub timeout_ms: i32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            snaplen: 1024,
            promiscuous: false,
            timeout_ms: 30_000,
        }
    }
}

/// Source and destination of one IPv4 packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Record {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

/// A captured frame after decoding; `ipv4` is None for non-IPv4 traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPacket {
    pub ipv4: Option<Ipv4Record>,
}

/// Pulls the IPv4 header out of an Ethernet frame.
///
/// Anything that is not decodable IPv4 (ARP, IPv6, truncated frames) maps
/// to None; upstream treats all of those as "no IPv4 header present".
pub fn decode_frame(data: &[u8]) -> Option<Ipv4Record> {
    let sliced = SlicedPacket::from_ethernet(data).ok()?;
    match sliced.net? {
        NetSlice::Ipv4(ipv4) => Some(Ipv4Record {
            source: ipv4.header().source_addr(),
            destination: ipv4.header().destination_addr(),
        }),
        _ => None,
    }
}

/// Lazy sequence of decoded packets over a pcap handle.
///
/// Finite for file sources; a live source ends when the handle reports an
/// error (read timeout included). Not restartable without reopening.
pub struct PacketStream {
    capture: Capture<dyn Activated>,
}

impl PacketStream {
    pub fn from_file(path: &Path) -> Result<Self, CaptureError> {
        let capture = Capture::from_file(path).map_err(|source| CaptureError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PacketStream {
            capture: capture.into(),
        })
    }

    pub fn from_device(name: &str, config: &CaptureConfig) -> Result<Self, CaptureError> {
        let open = || -> Result<Capture<pcap::Active>, pcap::Error> {
            Capture::from_device(name)?
                .promisc(config.promiscuous)
                .snaplen(config.snaplen)
                .timeout(config.timeout_ms)
                .open()
        };
        let capture = open().map_err(|source| CaptureError::OpenDevice {
            device: name.to_string(),
            source,
        })?;
        Ok(PacketStream {
            capture: capture.into(),
        })
    }
}

impl Iterator for PacketStream {
    type Item = DecodedPacket;

    fn next(&mut self) -> Option<DecodedPacket> {
        match self.capture.next_packet() {
            Ok(packet) => Some(DecodedPacket {
                ipv4: decode_frame(packet.data),
            }),
            Err(pcap::Error::NoMorePackets) => None,
            Err(e) => {
                debug!(error = %e, "capture read ended");
                None
            }
        }
    }
}
