//! Bit exact wire structures of Chapter 10 packets according to IRIG-106 Chapter 10 §10.6.
//!
//! All multi-byte fields are little endian. Bit fields are defined with explicit bit positions
//! where bit 0 is the least significant bit of the containing integer, so the layout never
//! depends on the compiler's native bitfield ordering.
//!
//! A packet has the following layout:
//!
//! ```text
//! +----------------------+------------------------+------+---------+--------+----------+
//! | header (24)          | secondary header (12)? | CSDW | payload | filler | checksum |
//! +----------------------+------------------------+------+---------+--------+----------+
//!                                                 |<-- data length ->|
//! |<------------------------------- packet length --------------------------------------->|
//! ```
pub mod csdw;
pub mod data_type;
pub mod header;
pub mod intra_packet;

pub use csdw::*;
pub use data_type::*;
pub use header::*;
pub use intra_packet::*;

/// Packet sync pattern.
pub const SYNC_PATTERN: u16 = 0xEB25;
/// Length of the packet header in bytes.
pub const HEADER_LEN: usize = 24;
/// Length of the optional secondary header in bytes.
pub const SECONDARY_HEADER_LEN: usize = 12;
/// Length of the channel specific data word in bytes.
pub const CSDW_LEN: usize = 4;
/// Length of the relative time counter field in bytes.
pub const RTC_LEN: usize = 6;
/// Packet lengths are always a multiple of this value.
pub const PACKET_ALIGNMENT: usize = 4;
