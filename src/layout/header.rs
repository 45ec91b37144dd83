//! Packet header (IRIG-106 10.6.1.1) and packet secondary header (IRIG-106 10.6.1.2).
use core::mem::size_of;

use arbitrary_int::u2;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, Unaligned, U16, U32};

use super::{DataType, HEADER_LEN, RTC_LEN, SECONDARY_HEADER_LEN, SYNC_PATTERN};
use crate::checksum::{sum16, ChecksumType, ChecksumWord};
use crate::time::{rtc_from_le_bytes, rtc_to_le_bytes};
use crate::ByteConversionError;

/// Packet flags byte of the packet header.
#[bitbybit::bitfield(u8, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct PacketFlags {
    /// A secondary header follows the packet header.
    #[bit(7, rw)]
    secondary_header: bool,
    /// Intra-packet time stamps use the secondary header time format instead of the RTC.
    #[bit(6, rw)]
    ipts_from_secondary_time: bool,
    #[bit(5, rw)]
    rtc_sync_error: bool,
    #[bit(4, rw)]
    data_overflow_error: bool,
    /// 0: Chapter 4 binary weighted time, 1: IEEE-1588, 2: ERTC, 3: reserved.
    #[bits(2..=3, rw)]
    secondary_time_format: u2,
    #[bits(0..=1, rw)]
    checksum_type: ChecksumType,
}

/// The 24 byte packet header.
#[derive(
    FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug, Copy, Clone, PartialEq, Eq,
)]
#[repr(C)]
pub struct PacketHeader {
    sync: U16<LittleEndian>,
    channel_id: U16<LittleEndian>,
    packet_length: U32<LittleEndian>,
    data_length: U32<LittleEndian>,
    data_type_version: u8,
    sequence_number: u8,
    packet_flags: u8,
    data_type: u8,
    rtc: [u8; RTC_LEN],
    checksum: U16<LittleEndian>,
}

const _: () = assert!(size_of::<PacketHeader>() == HEADER_LEN);

/// Offset of the header checksum, which is the last 16 bit word of the header.
const HEADER_CHECKSUM_OFFSET: usize = HEADER_LEN - 2;

impl PacketHeader {
    /// Header with a valid sync pattern for an empty packet which only consists of the header.
    pub fn new(channel_id: u16, data_type: impl Into<u8>) -> Self {
        Self {
            sync: U16::new(SYNC_PATTERN),
            channel_id: U16::new(channel_id),
            packet_length: U32::new(HEADER_LEN as u32),
            data_length: U32::new(0),
            data_type_version: 0,
            sequence_number: 0,
            packet_flags: 0,
            data_type: data_type.into(),
            rtc: [0; RTC_LEN],
            checksum: U16::new(0),
        }
    }

    /// Read a header from the start of a raw buffer.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, ByteConversionError> {
        Self::read_from_prefix(buf)
            .map(|(header, _)| header)
            .map_err(|_| ByteConversionError::FromSliceTooSmall {
                found: buf.len(),
                expected: HEADER_LEN,
            })
    }

    /// Write the header to the start of a raw buffer. Returns the written size on success.
    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, ByteConversionError> {
        self.write_to_prefix(buf)
            .map_err(|_| ByteConversionError::ToSliceTooSmall {
                found: buf.len(),
                expected: HEADER_LEN,
            })?;
        Ok(HEADER_LEN)
    }

    #[inline]
    pub fn sync(&self) -> u16 {
        self.sync.get()
    }

    #[inline]
    pub fn is_sync_valid(&self) -> bool {
        self.sync() == SYNC_PATTERN
    }

    #[inline]
    pub fn channel_id(&self) -> u16 {
        self.channel_id.get()
    }

    /// Total packet length in bytes, including header, filler and checksum.
    #[inline]
    pub fn packet_length(&self) -> u32 {
        self.packet_length.get()
    }

    /// Length of the packet body in bytes. Does not include the secondary header, filler and
    /// the checksum.
    #[inline]
    pub fn data_length(&self) -> u32 {
        self.data_length.get()
    }

    #[inline]
    pub fn data_type_version(&self) -> u8 {
        self.data_type_version
    }

    #[inline]
    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    #[inline]
    pub fn flags(&self) -> PacketFlags {
        PacketFlags::new_with_raw_value(self.packet_flags)
    }

    /// Raw data type byte.
    #[inline]
    pub fn raw_data_type(&self) -> u8 {
        self.data_type
    }

    /// Returns the raw value if the data type is not a known data type.
    #[inline]
    pub fn data_type(&self) -> Result<DataType, u8> {
        DataType::try_from(self.data_type).map_err(|_| self.data_type)
    }

    /// 48 bit relative time counter.
    #[inline]
    pub fn rtc(&self) -> u64 {
        rtc_from_le_bytes(&self.rtc)
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        self.checksum.get()
    }

    #[inline]
    pub fn has_secondary_header(&self) -> bool {
        self.flags().secondary_header()
    }

    #[inline]
    pub fn checksum_type(&self) -> ChecksumType {
        self.flags().checksum_type()
    }

    /// Offset of the channel specific data word relative to the packet start.
    #[inline]
    pub fn body_offset(&self) -> usize {
        if self.has_secondary_header() {
            HEADER_LEN + SECONDARY_HEADER_LEN
        } else {
            HEADER_LEN
        }
    }

    #[inline]
    pub fn set_sync(&mut self, sync: u16) {
        self.sync.set(sync);
    }

    #[inline]
    pub fn set_channel_id(&mut self, channel_id: u16) {
        self.channel_id.set(channel_id);
    }

    #[inline]
    pub fn set_packet_length(&mut self, packet_length: u32) {
        self.packet_length.set(packet_length);
    }

    #[inline]
    pub fn set_data_length(&mut self, data_length: u32) {
        self.data_length.set(data_length);
    }

    #[inline]
    pub fn set_data_type_version(&mut self, version: u8) {
        self.data_type_version = version;
    }

    #[inline]
    pub fn set_sequence_number(&mut self, sequence_number: u8) {
        self.sequence_number = sequence_number;
    }

    #[inline]
    pub fn set_flags(&mut self, flags: PacketFlags) {
        self.packet_flags = flags.raw_value();
    }

    #[inline]
    pub fn set_data_type(&mut self, data_type: impl Into<u8>) {
        self.data_type = data_type.into();
    }

    /// Set the relative time counter. Only the lower 48 bits are stored.
    #[inline]
    pub fn set_rtc(&mut self, rtc: u64) {
        self.rtc = rtc_to_le_bytes(rtc);
    }

    #[inline]
    pub fn set_checksum(&mut self, checksum: u16) {
        self.checksum.set(checksum);
    }

    /// Sum of all 16 bit header words except the checksum word itself.
    pub fn calc_checksum(&self) -> u16 {
        sum16(&self.as_bytes()[..HEADER_CHECKSUM_OFFSET])
    }

    pub fn is_checksum_valid(&self) -> bool {
        self.calc_checksum() == self.checksum()
    }

    /// Store the calculated header checksum. If `correctly` is false, the stored checksum is
    /// deliberately wrong, which can be used to inject faults.
    pub fn fix_checksum(&mut self, correctly: bool) {
        let checksum = self.calc_checksum();
        if correctly {
            self.set_checksum(checksum);
        } else {
            self.set_checksum(checksum.wrapping_inc());
        }
    }
}

/// The optional 12 byte secondary header.
#[derive(
    FromBytes,
    IntoBytes,
    Immutable,
    KnownLayout,
    Unaligned,
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
)]
#[repr(C)]
pub struct SecondaryHeader {
    time: [u8; 8],
    reserved: U16<LittleEndian>,
    checksum: U16<LittleEndian>,
}

const _: () = assert!(size_of::<SecondaryHeader>() == SECONDARY_HEADER_LEN);

const SECONDARY_CHECKSUM_OFFSET: usize = SECONDARY_HEADER_LEN - 2;

impl SecondaryHeader {
    /// Create a secondary header from the raw 8 byte time field. The checksum is calculated
    /// automatically.
    pub fn new(time: [u8; 8]) -> Self {
        let mut header = Self {
            time,
            ..Default::default()
        };
        header.fix_checksum(true);
        header
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, ByteConversionError> {
        Self::read_from_prefix(buf)
            .map(|(header, _)| header)
            .map_err(|_| ByteConversionError::FromSliceTooSmall {
                found: buf.len(),
                expected: SECONDARY_HEADER_LEN,
            })
    }

    /// Raw time field. The interpretation depends on the secondary time format of the packet
    /// flags, see [crate::time::SecondaryHeaderTime].
    #[inline]
    pub fn time(&self) -> &[u8; 8] {
        &self.time
    }

    #[inline]
    pub fn set_time(&mut self, time: [u8; 8]) {
        self.time = time;
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        self.checksum.get()
    }

    pub fn calc_checksum(&self) -> u16 {
        sum16(&self.as_bytes()[..SECONDARY_CHECKSUM_OFFSET])
    }

    pub fn is_checksum_valid(&self) -> bool {
        self.calc_checksum() == self.checksum()
    }

    pub fn fix_checksum(&mut self, correctly: bool) {
        let checksum = self.calc_checksum();
        if correctly {
            self.checksum.set(checksum);
        } else {
            self.checksum.set(checksum.wrapping_inc());
        }
    }
}
