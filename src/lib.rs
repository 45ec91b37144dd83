//! # IRIG-106 Chapter 10 packet library
//!
//! This crate decodes, validates, mutates and re-encodes IRIG-106 Chapter 10 telemetry packets.
//! Chapter 10 recordings interleave multiplexed avionics bus data (MIL-STD-1553, PCM, analog,
//! video, Ethernet, Fibre Channel, time, index) into a single byte stream. Every packet has a
//! fixed 24 byte header, an optional 12 byte secondary header, a body starting with a 32 bit
//! channel specific data word and an optional 8, 16 or 32 bit checksum trailer.
//!
//! The crate contains the following components:
//!
//!  - [bits]: Extraction of arbitrary width signed and unsigned integers and IEEE-754 floats at
//!    arbitrary bit offsets from raw byte buffers.
//!  - [checksum]: The arithmetic sum checksums used by the packet header and trailer as well as
//!    a generic table driven CRC.
//!  - [layout]: The bit exact wire structures of the packet header, the secondary header, the
//!    channel specific data words and intra-packet headers.
//!  - [packet]: The [Packet] type which owns the packet buffer and provides typed views,
//!    checksum verification and repair and in-place RTC rewriting.
//!  - [payload]: Walkers over the sub-records of 1553 and index packets.
//!  - [seq_count]: Per channel sequence number counters for created packets.
//!  - [time]: Relative time counter (RTC) helpers and secondary header time decoding.
//!
//! ## Features
//!
//! `chapter10` is a `no_std` crate which requires the [`alloc`](https://doc.rust-lang.org/alloc/)
//! crate.
//!
//! Default features:
//!
//!  - [`std`](https://doc.rust-lang.org/std/): Enables functionality relying on the standard
//!    library, for example [std::error::Error] support of the dependencies.
//!
//! Optional features:
//!
//!  - [`serde`](https://serde.rs/): Adds `serde` support for the logical data types like
//!    [layout::DataType] and [time::TimeEncoding].
//!
//! ## Example
//!
//! ```rust
//! use chapter10::checksum::ChecksumType;
//! use chapter10::layout::DataType;
//! use chapter10::packet::PacketCreator;
//!
//! let packet = PacketCreator::new(0x10, DataType::PcmF1)
//!     .with_checksum_type(ChecksumType::Bits16)
//!     .with_payload(&[1, 2, 3, 4, 5])
//!     .build()
//!     .unwrap();
//! assert!(packet.is_pcm());
//! assert!(packet.is_header_checksum_valid());
//! assert!(packet.verify_packet_checksum());
//! ```
#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bits;
pub mod checksum;
pub mod layout;
pub mod packet;
pub mod payload;
pub mod seq_count;
pub mod time;

pub use packet::{Packet, PacketCreator, PacketError};

/// Generic error type when converting to and from raw byte slices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteConversionError {
    /// The passed slice is too small. Returns the passed slice length and expected minimum size
    #[error("target slice with size {found} is too small, expected size of at least {expected}")]
    ToSliceTooSmall { found: usize, expected: usize },
    /// The provider buffer is too small. Returns the passed slice length and expected minimum size
    #[error("source slice with size {found} too small, expected at least {expected} bytes")]
    FromSliceTooSmall { found: usize, expected: usize },
}

#[cfg(test)]
mod tests {
    use crate::ByteConversionError;
    use alloc::string::ToString;

    #[test]
    fn test_byte_conversion_error_display() {
        let error = ByteConversionError::FromSliceTooSmall {
            found: 12,
            expected: 24,
        };
        assert_eq!(
            error.to_string(),
            "source slice with size 12 too small, expected at least 24 bytes"
        );
        let error = ByteConversionError::ToSliceTooSmall {
            found: 2,
            expected: 4,
        };
        assert_eq!(
            error.to_string(),
            "target slice with size 2 is too small, expected size of at least 4"
        );
    }
}
