//! Channel specific data words (CSDW).
//!
//! The CSDW is the first 32 bit little endian word of the packet body. Its layout depends on the
//! data type of the packet. Every CSDW type implements [ChannelSpecificData], which binds it to
//! the data types it describes so a [crate::Packet] can refuse to interpret the body of a packet
//! with the wrong layout.
use arbitrary_int::{u18, u2, u24, u3, u4, u6};

use super::DataType;

/// Common interface of all channel specific data words.
pub trait ChannelSpecificData: Copy + core::fmt::Debug {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Whether the raw data type byte of a packet header uses this CSDW layout.
    fn accepts(data_type: u8) -> bool;

    fn from_raw(raw: u32) -> Self;

    fn raw(&self) -> u32;
}

/// CSDW without interpretation. Accepts every data type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawCsdw(pub u32);

impl ChannelSpecificData for RawCsdw {
    const NAME: &'static str = "RawCsdw";

    #[inline]
    fn accepts(_data_type: u8) -> bool {
        true
    }

    #[inline]
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    fn raw(&self) -> u32 {
        self.0
    }
}

/// PCM format 1 CSDW (IRIG-106 table 10-14).
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct PcmCsdw {
    /// Each minor frame is preceded by an intra-packet header.
    #[bit(30, rw)]
    intra_packet_header: bool,
    /// Major frame indicator.
    #[bit(29, rw)]
    major_frame: bool,
    /// Minor frame indicator.
    #[bit(28, rw)]
    minor_frame: bool,
    #[bits(26..=27, rw)]
    minor_frame_status: u2,
    #[bits(24..=25, rw)]
    major_frame_status: u2,
    /// Data is aligned to 32 bit words instead of 16 bit words.
    #[bit(21, rw)]
    alignment_32_bit: bool,
    #[bit(20, rw)]
    throughput_mode: bool,
    #[bit(19, rw)]
    packed_mode: bool,
    #[bit(18, rw)]
    unpacked_mode: bool,
    /// Offset of the first minor frame sync word in bits.
    #[bits(0..=17, rw)]
    sync_offset: u18,
}

/// Time format 1 CSDW (IRIG-106 table 10-22).
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct TimeCsdw {
    /// Time is expressed as month and day instead of day of year.
    #[bit(9, rw)]
    date_format: bool,
    #[bit(8, rw)]
    leap_year: bool,
    /// 0: IRIG-B, 1: IRIG-A, 2: IRIG-G, 3: real time clock, 4: UTC from GPS, 5: native GPS.
    #[bits(4..=7, rw)]
    time_format: u4,
    /// 0: internal, 1: external, 2: internal from RMM, 0xF: none.
    #[bits(0..=3, rw)]
    time_source: u4,
}

/// MIL-STD-1553 format 1 CSDW (IRIG-106 table 10-25).
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct Mil1553Csdw {
    /// Which message bit the intra-packet time stamp refers to.
    #[bits(30..=31, rw)]
    time_tag_bits: u2,
    /// Number of messages in the packet body.
    #[bits(0..=23, rw)]
    message_count: u24,
}

/// Analog format 1 CSDW (IRIG-106 table 10-28).
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct AnalogCsdw {
    /// All subchannels share this CSDW.
    #[bit(28, rw)]
    same: bool,
    /// Sampling rate exponent.
    #[bits(24..=27, rw)]
    factor: u4,
    #[bits(16..=23, rw)]
    total_channels: u8,
    #[bits(8..=15, rw)]
    subchannel: u8,
    /// Bits per sample, 0 means 64.
    #[bits(2..=7, rw)]
    length: u6,
    #[bits(0..=1, rw)]
    mode: u2,
}

/// Video format 0 CSDW (IRIG-106 table 10-29).
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct VideoCsdw {
    /// Embedded time.
    #[bit(31, rw)]
    embedded_time: bool,
    #[bit(30, rw)]
    intra_packet_header: bool,
    /// KLV metadata present.
    #[bit(29, rw)]
    klv: bool,
    /// SCR/RTC sync.
    #[bit(28, rw)]
    scr_rtc_sync: bool,
    #[bits(24..=27, rw)]
    payload_type: u4,
    /// Little endian byte alignment of the transport stream words.
    #[bit(23, rw)]
    byte_alignment: bool,
}

/// Ethernet format 0 CSDW.
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct EthernetCsdw {
    #[bits(28..=31, rw)]
    format: u4,
    /// Time tag bits.
    #[bits(25..=27, rw)]
    time_tag_bits: u3,
    #[bits(0..=15, rw)]
    frame_count: u16,
}

/// Fibre Channel CSDW.
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct FibreChannelCsdw {
    #[bits(28..=31, rw)]
    format: u4,
    #[bits(0..=15, rw)]
    frame_count: u16,
}

/// Kind of a recording index packet.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum IndexType {
    /// Entries point to other index packets.
    Root = 0,
    /// Entries point to data packets.
    Node = 1,
}

/// Recording index CSDW (IRIG-106 table 10-57).
#[bitbybit::bitfield(u32, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct IndexCsdw {
    /// Set for node index packets.
    #[bit(31, rw)]
    node_index: bool,
    /// An 8 byte file size word follows the CSDW.
    #[bit(30, rw)]
    file_size_present: bool,
    /// Every entry contains an 8 byte intra-packet data header.
    #[bit(29, rw)]
    intra_packet_data_header: bool,
    #[bits(0..=15, rw)]
    entry_count: u16,
}

impl IndexCsdw {
    #[inline]
    pub fn index_type(&self) -> IndexType {
        if self.node_index() {
            IndexType::Node
        } else {
            IndexType::Root
        }
    }

    #[inline]
    pub fn with_index_type(self, index_type: IndexType) -> Self {
        self.with_node_index(index_type == IndexType::Node)
    }
}

macro_rules! csdw_impl {
    ($($csdw: ident => [$($data_type: ident),+],)+) => {
        $(
            impl ChannelSpecificData for $csdw {
                const NAME: &'static str = stringify!($csdw);

                #[inline]
                fn accepts(data_type: u8) -> bool {
                    matches!(DataType::try_from(data_type), Ok($(DataType::$data_type)|+))
                }

                #[inline]
                fn from_raw(raw: u32) -> Self {
                    Self::new_with_raw_value(raw)
                }

                #[inline]
                fn raw(&self) -> u32 {
                    self.raw_value()
                }
            }
        )+
    }
}

csdw_impl!(
    PcmCsdw => [PcmF1],
    TimeCsdw => [TimeF1],
    Mil1553Csdw => [Mil1553F1],
    AnalogCsdw => [AnalogF1],
    VideoCsdw => [VideoF0],
    EthernetCsdw => [EthernetF0],
    FibreChannelCsdw => [FibreChannelF0, FibreChannelF1],
    IndexCsdw => [ComputerGeneratedF3],
);
