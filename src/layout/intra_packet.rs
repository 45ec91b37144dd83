//! Intra-packet headers and entry layouts of packet bodies.
use core::mem::size_of;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, Unaligned, U16, U64};

use super::RTC_LEN;
use crate::time::{rtc_from_le_bytes, rtc_to_le_bytes};
use crate::ByteConversionError;

/// Length of the 1553 intra-packet header in bytes.
pub const MIL1553_IPH_LEN: usize = 14;
/// Length of an intra-packet time stamp in bytes.
pub const IPTS_LEN: usize = 8;
/// Length of the optional intra-packet data header of index entries.
pub const INDEX_IPDH_LEN: usize = 8;
/// Length of the optional file size word which follows the index CSDW.
pub const INDEX_FILE_SIZE_LEN: usize = 8;
/// Root index entry without intra-packet data header: time stamp and packet offset.
pub const ROOT_INDEX_ENTRY_LEN: usize = IPTS_LEN + 8;
/// Node index entry without intra-packet data header: time stamp, channel, data type and
/// packet offset.
pub const NODE_INDEX_ENTRY_LEN: usize = IPTS_LEN + size_of::<NodeIndexInfo>() + 8;

/// Block status word of the 1553 intra-packet header (IRIG-106 table 10-26).
#[bitbybit::bitfield(u16, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct BlockStatusWord {
    /// Message was transferred on bus B.
    #[bit(13, rw)]
    bus_b: bool,
    #[bit(12, rw)]
    message_error: bool,
    #[bit(11, rw)]
    rt_to_rt_transfer: bool,
    #[bit(10, rw)]
    format_error: bool,
    #[bit(9, rw)]
    response_timeout: bool,
    #[bit(5, rw)]
    word_count_error: bool,
    #[bit(4, rw)]
    sync_type_error: bool,
    #[bit(3, rw)]
    invalid_word_error: bool,
}

/// Header which precedes every message of a 1553 format 1 packet.
#[derive(
    FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug, Copy, Clone, PartialEq, Eq,
)]
#[repr(C)]
pub struct Mil1553IntraPacketHeader {
    time_stamp: [u8; IPTS_LEN],
    block_status: U16<LittleEndian>,
    gap_times: U16<LittleEndian>,
    length: U16<LittleEndian>,
}

const _: () = assert!(size_of::<Mil1553IntraPacketHeader>() == MIL1553_IPH_LEN);

impl Mil1553IntraPacketHeader {
    pub fn new(time_stamp: [u8; IPTS_LEN], block_status: BlockStatusWord, length: u16) -> Self {
        Self {
            time_stamp,
            block_status: U16::new(block_status.raw_value()),
            gap_times: U16::new(0),
            length: U16::new(length),
        }
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, ByteConversionError> {
        Self::read_from_prefix(buf)
            .map(|(header, _)| header)
            .map_err(|_| ByteConversionError::FromSliceTooSmall {
                found: buf.len(),
                expected: MIL1553_IPH_LEN,
            })
    }

    /// Raw 8 byte time stamp. Its format depends on the time encoding of the packet.
    #[inline]
    pub fn time_stamp(&self) -> &[u8; IPTS_LEN] {
        &self.time_stamp
    }

    /// Time stamp interpreted as a 48 bit RTC value. The upper two bytes are ignored.
    #[inline]
    pub fn rtc(&self) -> u64 {
        let mut raw = [0; RTC_LEN];
        raw.copy_from_slice(&self.time_stamp[..RTC_LEN]);
        rtc_from_le_bytes(&raw)
    }

    /// Write an RTC time stamp. The upper two bytes of the time stamp are left untouched.
    #[inline]
    pub fn set_rtc(&mut self, rtc: u64) {
        self.time_stamp[..RTC_LEN].copy_from_slice(&rtc_to_le_bytes(rtc));
    }

    #[inline]
    pub fn block_status(&self) -> BlockStatusWord {
        BlockStatusWord::new_with_raw_value(self.block_status.get())
    }

    /// Raw gap times word. The lower byte is the first gap, the upper byte the second gap, both
    /// in units of 0.1 microseconds.
    #[inline]
    pub fn gap_times(&self) -> u16 {
        self.gap_times.get()
    }

    #[inline]
    pub fn set_gap_times(&mut self, gap_times: u16) {
        self.gap_times.set(gap_times);
    }

    /// Length of the message data following this header in bytes.
    #[inline]
    pub fn length(&self) -> u16 {
        self.length.get()
    }
}

/// Channel and data type part of a node index entry.
#[derive(
    FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug, Copy, Clone, PartialEq, Eq,
)]
#[repr(C)]
pub struct NodeIndexInfo {
    channel_id: U16<LittleEndian>,
    data_type: u8,
    reserved: u8,
}

impl NodeIndexInfo {
    pub fn new(channel_id: u16, data_type: impl Into<u8>) -> Self {
        Self {
            channel_id: U16::new(channel_id),
            data_type: data_type.into(),
            reserved: 0,
        }
    }

    #[inline]
    pub fn channel_id(&self) -> u16 {
        self.channel_id.get()
    }

    #[inline]
    pub fn data_type(&self) -> u8 {
        self.data_type
    }
}

/// Little endian 64 bit file offset of index entries.
pub type IndexOffset = U64<LittleEndian>;

/// Length of a single index entry for the given index type and intra-packet data header
/// presence.
pub const fn index_entry_len(node: bool, intra_packet_data_header: bool) -> usize {
    let base = if node {
        NODE_INDEX_ENTRY_LEN
    } else {
        ROOT_INDEX_ENTRY_LEN
    };
    if intra_packet_data_header {
        base + INDEX_IPDH_LEN
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_entry_lengths() {
        assert_eq!(index_entry_len(false, false), 16);
        assert_eq!(index_entry_len(false, true), 24);
        assert_eq!(index_entry_len(true, false), 20);
        assert_eq!(index_entry_len(true, true), 28);
    }

    #[test]
    fn test_block_status_word() {
        let bsw = BlockStatusWord::new_with_raw_value(0x2208);
        assert!(bsw.bus_b());
        assert!(bsw.response_timeout());
        assert!(bsw.invalid_word_error());
        assert!(!bsw.message_error());
        assert!(!bsw.rt_to_rt_transfer());
        let bsw = BlockStatusWord::new_with_raw_value(0)
            .with_message_error(true)
            .with_word_count_error(true);
        assert_eq!(bsw.raw_value(), 0x1020);
    }

    #[test]
    fn test_mil1553_iph_layout() {
        let mut iph = Mil1553IntraPacketHeader::new(
            [1, 2, 3, 4, 5, 6, 0xAA, 0xBB],
            BlockStatusWord::new_with_raw_value(0x2000),
            6,
        );
        iph.set_gap_times(0x0304);
        let raw = iph.as_bytes();
        assert_eq!(raw.len(), MIL1553_IPH_LEN);
        assert_eq!(&raw[8..14], &[0x00, 0x20, 0x04, 0x03, 0x06, 0x00]);
        assert_eq!(iph.rtc(), 0x0605_0403_0201);

        let mut read_back = Mil1553IntraPacketHeader::from_bytes(raw).unwrap();
        assert_eq!(read_back, iph);
        assert!(read_back.block_status().bus_b());
        assert_eq!(read_back.length(), 6);
        read_back.set_rtc(0x1_0000_0000_0001);
        assert_eq!(read_back.time_stamp(), &[1, 0, 0, 0, 0, 0, 0xAA, 0xBB]);
    }

    #[test]
    fn test_mil1553_iph_too_small() {
        assert_eq!(
            Mil1553IntraPacketHeader::from_bytes(&[0; 13]),
            Err(ByteConversionError::FromSliceTooSmall {
                found: 13,
                expected: MIL1553_IPH_LEN
            })
        );
    }

    #[test]
    fn test_node_index_info() {
        let info = NodeIndexInfo::new(0x0203, 0x19u8);
        assert_eq!(info.as_bytes(), &[0x03, 0x02, 0x19, 0x00]);
        assert_eq!(info.channel_id(), 0x0203);
        assert_eq!(info.data_type(), 0x19);
    }
}
