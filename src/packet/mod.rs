//! The [Packet] type, which owns the raw buffer of a single Chapter 10 packet.
//!
//! A packet never stores pointers into its buffer. Views on the header, the secondary header
//! and the body are computed from the header fields whenever they are requested.
//!
//! The buffer is reference counted. [Packet::cheap_clone] creates a second packet which shares
//! the buffer with the original, while [Packet::deep_copy] duplicates it. Every mutating
//! operation copies a shared buffer before writing to it, so packets which share a buffer never
//! observe each other's modifications.
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use delegate::delegate;
use paste::paste;
use tracing::{debug, trace, warn};
use zerocopy::FromBytes;

use crate::checksum::{checksum, ChecksumType, ChecksumWord};
use crate::layout::{
    data_type_mnemonic, BasicDataType, ChannelSpecificData, DataType, Mil1553Csdw, PacketFlags,
    PacketHeader, SecondaryHeader, CSDW_LEN, HEADER_LEN, PACKET_ALIGNMENT, SECONDARY_HEADER_LEN,
};
use crate::payload::{mil1553, IndexPacket, Mil1553Packet};
use crate::time::{SecondaryHeaderTime, TimeEncoding, TimeReference, RTC_MASK};
use crate::ByteConversionError;

mod creator;

pub use creator::PacketCreator;

/// Errors when creating a packet or a typed view of a packet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    /// Byte conversion error.
    #[error("byte conversion error: {0}")]
    ByteConversion(#[from] ByteConversionError),
    /// The packet length of the header does not match the length of the buffer.
    #[error("declared packet length {declared} does not match buffer length {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("packet length {0} is not a multiple of 4")]
    UnalignedPacketLength(usize),
    /// The body declared by the data length does not fit into the packet.
    #[error("data length {data_length} does not fit into packet of length {packet_length}")]
    DataLengthTooLarge {
        data_length: usize,
        packet_length: usize,
    },
    /// The data type of the packet does not match the requested interpretation.
    #[error("packet with data type {found:#04x} can not be interpreted as {expected}")]
    InvalidPacketConversion { expected: &'static str, found: u8 },
}

/// Detail level of [Packet::describe].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextLevel {
    /// Single line with data type, channel, sequence number and RTC.
    Minimal,
    /// All header fields and the checksum states.
    #[default]
    Header,
    /// Header, secondary header, CSDW and the sub-records of 1553 and index packets.
    Everything,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
enum ChecksumState {
    Unchecked = 0,
    Valid = 1,
    Invalid = 2,
}

/// Result of summing the checksum region of the body.
struct BodyChecksum<T> {
    calculated: T,
    trailer_offset: usize,
}

/// A single Chapter 10 packet.
///
/// Besides the raw buffer, a packet carries metadata which is not part of the wire format: the
/// cached RTC, the RTC before the last [Packet::set_rtc] call, an absolute time, and the
/// position of the packet in its recording file.
#[derive(Debug)]
pub struct Packet {
    buf: Arc<Vec<u8>>,
    rtc: u64,
    original_rtc: u64,
    absolute_time: Option<DateTime<Utc>>,
    file_offset: u64,
    file_packet_number: u64,
    checksum_state: AtomicU8,
}

/// Structural checks of a header. Returns the packet length on success.
fn check_header(header: &PacketHeader) -> Result<usize, PacketError> {
    let packet_length = header.packet_length() as usize;
    if packet_length < HEADER_LEN {
        return Err(ByteConversionError::FromSliceTooSmall {
            found: packet_length,
            expected: HEADER_LEN,
        }
        .into());
    }
    if packet_length % PACKET_ALIGNMENT != 0 {
        return Err(PacketError::UnalignedPacketLength(packet_length));
    }
    let data_length = header.data_length() as usize;
    if header.body_offset().saturating_add(data_length) > packet_length {
        return Err(PacketError::DataLengthTooLarge {
            data_length,
            packet_length,
        });
    }
    Ok(packet_length)
}

impl Packet {
    /// Create a zero filled packet of the packet length declared by the header and copy the
    /// header into it.
    pub fn from_header(header: &PacketHeader) -> Result<Self, PacketError> {
        let packet_length = check_header(header)?;
        let mut buf = vec![0; packet_length];
        header.write_to_bytes(&mut buf)?;
        Ok(Self::with_buffer(buf))
    }

    /// Take ownership of a buffer which contains a complete packet. The declared packet length
    /// must match the buffer length. Checksums and the sync pattern are not verified.
    pub fn from_vec(buf: Vec<u8>) -> Result<Self, PacketError> {
        Self::check_buffer(&buf)
            .inspect_err(|e| debug!(len = buf.len(), "rejected packet buffer: {e}"))?;
        Ok(Self::with_buffer(buf))
    }

    /// Copy a complete packet from a raw slice. The slice may be longer than the packet, the
    /// remaining bytes are ignored.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, PacketError> {
        let header = PacketHeader::from_bytes(raw)?;
        let packet_length = header.packet_length() as usize;
        if raw.len() < packet_length {
            return Err(ByteConversionError::FromSliceTooSmall {
                found: raw.len(),
                expected: packet_length,
            }
            .into());
        }
        Self::from_vec(raw[..packet_length].to_vec())
    }

    fn check_buffer(buf: &[u8]) -> Result<(), PacketError> {
        let header = PacketHeader::from_bytes(buf)?;
        let packet_length = check_header(&header)?;
        if packet_length != buf.len() {
            return Err(PacketError::LengthMismatch {
                declared: packet_length,
                actual: buf.len(),
            });
        }
        if !header.is_sync_valid() {
            debug!(sync = header.sync(), "packet with invalid sync pattern");
        }
        Ok(())
    }

    fn with_buffer(buf: Vec<u8>) -> Self {
        let mut packet = Self {
            buf: Arc::new(buf),
            rtc: 0,
            original_rtc: 0,
            absolute_time: None,
            file_offset: 0,
            file_packet_number: 0,
            checksum_state: AtomicU8::new(ChecksumState::Unchecked.into()),
        };
        packet.rtc = packet.header().rtc();
        packet.original_rtc = packet.rtc;
        packet
    }

    #[inline]
    pub fn header(&self) -> &PacketHeader {
        match PacketHeader::ref_from_prefix(self.buf.as_slice()) {
            Ok((header, _)) => header,
            // Every constructor checks that the buffer contains a complete header.
            Err(_) => unreachable!("packet buffer shorter than header"),
        }
    }

    /// Mutable access to the header. Invalidates the cached body checksum state.
    pub fn header_mut(&mut self) -> &mut PacketHeader {
        self.invalidate_checksum_state();
        match PacketHeader::mut_from_prefix(Arc::make_mut(&mut self.buf).as_mut_slice()) {
            Ok((header, _)) => header,
            Err(_) => unreachable!("packet buffer shorter than header"),
        }
    }

    delegate! {
        to self.header() {
            #[inline]
            pub fn channel_id(&self) -> u16;
            #[inline]
            pub fn packet_length(&self) -> u32;
            #[inline]
            pub fn data_length(&self) -> u32;
            #[inline]
            pub fn data_type_version(&self) -> u8;
            #[inline]
            pub fn sequence_number(&self) -> u8;
            #[inline]
            pub fn flags(&self) -> PacketFlags;
            #[inline]
            pub fn raw_data_type(&self) -> u8;
            #[inline]
            pub fn data_type(&self) -> Result<DataType, u8>;
            #[inline]
            pub fn checksum_type(&self) -> ChecksumType;
            #[inline]
            pub fn has_secondary_header(&self) -> bool;
            #[inline]
            pub fn body_offset(&self) -> usize;
            #[inline]
            pub fn is_sync_valid(&self) -> bool;
        }
    }

    /// Basic data type of the packet. Returns the masked raw value if it is unknown.
    #[inline]
    pub fn basic_data_type(&self) -> Result<BasicDataType, u8> {
        BasicDataType::from_data_type(self.raw_data_type())
    }

    /// The complete raw packet.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Raw packet buffer. The buffer is only copied if it is shared with another packet.
    pub fn into_vec(self) -> Vec<u8> {
        Arc::try_unwrap(self.buf).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    /// The secondary header, if the packet flags declare one.
    pub fn secondary_header(&self) -> Option<SecondaryHeader> {
        if !self.has_secondary_header() {
            return None;
        }
        SecondaryHeader::from_bytes(self.buf.get(HEADER_LEN..)?).ok()
    }

    /// Decoded time of the secondary header. The inner error contains the raw secondary time
    /// format if the format is not supported.
    pub fn secondary_header_time(&self) -> Option<Result<SecondaryHeaderTime, u8>> {
        let secondary_header = self.secondary_header()?;
        Some(SecondaryHeaderTime::from_bytes(
            self.flags().secondary_time_format(),
            secondary_header.time(),
        ))
    }

    /// Returns [None] if the packet has no secondary header.
    pub fn is_secondary_header_checksum_valid(&self) -> Option<bool> {
        self.secondary_header()
            .map(|secondary_header| secondary_header.is_checksum_valid())
    }

    /// Does nothing if the packet has no secondary header.
    pub fn fix_secondary_header_checksum(&mut self, correctly: bool) {
        if !self.has_secondary_header() {
            return;
        }
        let buf = Arc::make_mut(&mut self.buf);
        if let Some(raw) = buf.get_mut(HEADER_LEN..HEADER_LEN + SECONDARY_HEADER_LEN) {
            if let Ok(secondary_header) = SecondaryHeader::mut_from_bytes(raw) {
                secondary_header.fix_checksum(correctly);
            }
        }
    }

    fn body_range(&self) -> (usize, usize) {
        let len = self.buf.len();
        let start = self.body_offset().min(len);
        let end = start
            .saturating_add(self.data_length() as usize)
            .min(len);
        (start, end)
    }

    /// CSDW and payload, as declared by the data length. Filler and checksum are not included.
    pub fn body(&self) -> &[u8] {
        let (start, end) = self.body_range();
        &self.buf[start..end]
    }

    /// Mutable access to the body. Invalidates the cached body checksum state.
    pub fn body_mut(&mut self) -> &mut [u8] {
        let (start, end) = self.body_range();
        self.invalidate_checksum_state();
        &mut Arc::make_mut(&mut self.buf)[start..end]
    }

    /// Raw channel specific data word.
    pub fn csdw(&self) -> Result<u32, PacketError> {
        let body = self.body();
        match body.first_chunk::<CSDW_LEN>() {
            Some(raw) => Ok(u32::from_le_bytes(*raw)),
            None => Err(ByteConversionError::FromSliceTooSmall {
                found: body.len(),
                expected: CSDW_LEN,
            }
            .into()),
        }
    }

    /// Typed channel specific data word. Fails if the data type of the packet does not use the
    /// requested CSDW layout.
    pub fn channel_specific_data<T: ChannelSpecificData>(&self) -> Result<T, PacketError> {
        if !T::accepts(self.raw_data_type()) {
            return Err(PacketError::InvalidPacketConversion {
                expected: T::NAME,
                found: self.raw_data_type(),
            });
        }
        Ok(T::from_raw(self.csdw()?))
    }

    /// View of a MIL-STD-1553 format 1 packet.
    pub fn as_mil1553(&self) -> Result<Mil1553Packet<'_>, PacketError> {
        if self.data_type() != Ok(DataType::Mil1553F1) {
            return Err(PacketError::InvalidPacketConversion {
                expected: DataType::Mil1553F1.mnemonic(),
                found: self.raw_data_type(),
            });
        }
        Ok(Mil1553Packet::from_body(self.body())?)
    }

    /// View of a recording index packet.
    pub fn as_index(&self) -> Result<IndexPacket<'_>, PacketError> {
        if !self.is_index() {
            return Err(PacketError::InvalidPacketConversion {
                expected: DataType::ComputerGeneratedF3.mnemonic(),
                found: self.raw_data_type(),
            });
        }
        Ok(IndexPacket::from_body(self.body())?)
    }

    fn checksum_state(&self) -> ChecksumState {
        ChecksumState::try_from(self.checksum_state.load(Ordering::Relaxed))
            .unwrap_or(ChecksumState::Unchecked)
    }

    fn store_checksum_state(&self, valid: bool) {
        let state = if valid {
            ChecksumState::Valid
        } else {
            ChecksumState::Invalid
        };
        self.checksum_state.store(state.into(), Ordering::Relaxed);
    }

    fn invalidate_checksum_state(&self) {
        self.checksum_state
            .store(ChecksumState::Unchecked.into(), Ordering::Relaxed);
    }

    /// Sum over `ceil(data_length / width)` elements starting at the body. This includes the
    /// filler bytes up to the next element boundary. The trailer is the last element of the
    /// buffer. Returns [None] if the summed region exceeds the buffer or if the trailer would
    /// start inside the header or secondary header.
    fn body_checksum<T: ChecksumWord>(&self) -> Option<BodyChecksum<T>> {
        let start = self.body_offset();
        let count = (self.data_length() as usize).div_ceil(T::WIDTH);
        let end = start.saturating_add(count.saturating_mul(T::WIDTH));
        let len = self.buf.len();
        if end > len {
            warn!(
                channel_id = self.channel_id(),
                end, len, "checksum region exceeds packet"
            );
            return None;
        }
        let trailer_offset = match len.checked_sub(T::WIDTH) {
            Some(offset) if offset >= start => offset,
            _ => {
                warn!(
                    channel_id = self.channel_id(),
                    body_offset = start,
                    len,
                    "no room for checksum trailer after headers"
                );
                return None;
            }
        };
        Some(BodyChecksum {
            calculated: checksum::<T>(&self.buf[start..end], count),
            trailer_offset,
        })
    }

    fn is_body_checksum_valid<T: ChecksumWord>(&self) -> bool {
        match self.body_checksum::<T>() {
            Some(sum) => T::from_le_slice(&self.buf[sum.trailer_offset..]) == sum.calculated,
            None => false,
        }
    }

    fn write_body_checksum<T: ChecksumWord>(&mut self, correctly: bool) {
        if let Some(sum) = self.body_checksum::<T>() {
            let value = if correctly {
                sum.calculated
            } else {
                sum.calculated.wrapping_inc()
            };
            value.write_le_slice(&mut Arc::make_mut(&mut self.buf)[sum.trailer_offset..]);
        }
    }

    /// Calculate the body checksum and compare it against the trailer. The result is cached for
    /// [Self::is_packet_checksum_valid]. Packets without a checksum are always valid.
    pub fn verify_packet_checksum(&self) -> bool {
        let valid = match self.checksum_type() {
            ChecksumType::None => true,
            ChecksumType::Bits8 => self.is_body_checksum_valid::<u8>(),
            ChecksumType::Bits16 => self.is_body_checksum_valid::<u16>(),
            ChecksumType::Bits32 => self.is_body_checksum_valid::<u32>(),
        };
        self.store_checksum_state(valid);
        valid
    }

    /// Cached result of the last body checksum verification. The checksum is only verified if
    /// it was not verified since the packet was created or mutably accessed.
    pub fn is_packet_checksum_valid(&self) -> bool {
        match self.checksum_state() {
            ChecksumState::Valid => true,
            ChecksumState::Invalid => false,
            ChecksumState::Unchecked => self.verify_packet_checksum(),
        }
    }

    /// Recalculated on every call.
    pub fn is_header_checksum_valid(&self) -> bool {
        self.header().is_checksum_valid()
    }

    /// Recalculate and store the body checksum. If `correctly` is false, the stored checksum is
    /// deliberately wrong. Does nothing for packets without a checksum.
    pub fn fix_checksum(&mut self, correctly: bool) {
        match self.checksum_type() {
            ChecksumType::None => (),
            ChecksumType::Bits8 => self.write_body_checksum::<u8>(correctly),
            ChecksumType::Bits16 => self.write_body_checksum::<u16>(correctly),
            ChecksumType::Bits32 => self.write_body_checksum::<u32>(correctly),
        }
        self.verify_packet_checksum();
    }

    /// Recalculate and store the header checksum. If `correctly` is false, the stored checksum
    /// is deliberately wrong.
    pub fn fix_header_checksum(&mut self, correctly: bool) {
        self.header_mut().fix_checksum(correctly);
    }

    /// Cached 48 bit RTC.
    #[inline]
    pub fn rtc(&self) -> u64 {
        self.rtc
    }

    /// RTC before the last [Self::set_rtc] call which requested to keep it.
    #[inline]
    pub fn original_rtc(&self) -> u64 {
        self.original_rtc
    }

    /// Replace the RTC of the packet.
    ///
    /// The RTC is wrapped to 48 bits. The intra-packet time stamps of 1553 packets are shifted
    /// by the same amount as the RTC. Body and header checksums are repaired if and only if
    /// they were valid before the call, so intentionally or accidentally broken checksums stay
    /// broken.
    pub fn set_rtc(&mut self, new_rtc: u64, update_original: bool) {
        let new_rtc = new_rtc & RTC_MASK;
        let old_rtc = self.rtc;
        if update_original {
            self.original_rtc = old_rtc;
        }
        let has_body_checksum = self.checksum_type() != ChecksumType::None;
        let body_checksum_valid = has_body_checksum && self.verify_packet_checksum();
        let header_checksum_valid = self.is_header_checksum_valid();

        if let Ok(csdw) = self.channel_specific_data::<Mil1553Csdw>() {
            let delta = new_rtc.wrapping_sub(old_rtc) & RTC_MASK;
            let shifted = mil1553::shift_time_stamps(self.body_mut(), csdw, delta);
            trace!(channel_id = self.channel_id(), shifted, delta, "shifted 1553 time stamps");
        }
        if body_checksum_valid {
            self.fix_checksum(true);
        }
        self.rtc = new_rtc;
        self.header_mut().set_rtc(new_rtc);
        if header_checksum_valid {
            self.fix_header_checksum(true);
        }
        trace!(
            channel_id = self.channel_id(),
            old_rtc,
            new_rtc,
            "packet RTC replaced"
        );
    }

    /// Time encoding of the intra-packet time stamps.
    #[inline]
    pub fn time_encoding(&self) -> TimeEncoding {
        TimeEncoding::from_flags(self.flags())
    }

    #[inline]
    pub fn absolute_time(&self) -> Option<DateTime<Utc>> {
        self.absolute_time
    }

    #[inline]
    pub fn set_absolute_time(&mut self, absolute_time: Option<DateTime<Utc>>) {
        self.absolute_time = absolute_time;
    }

    /// Convert the RTC of the packet to an absolute time and store it as the absolute time of
    /// the packet.
    pub fn rtc_to_absolute(&mut self, reference: &TimeReference) -> Option<DateTime<Utc>> {
        self.absolute_time = reference.rtc_to_absolute(self.rtc);
        self.absolute_time
    }

    /// Byte offset of the packet in its recording file.
    #[inline]
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    #[inline]
    pub fn set_file_offset(&mut self, file_offset: u64) {
        self.file_offset = file_offset;
    }

    /// Index of the packet in its recording file.
    #[inline]
    pub fn file_packet_number(&self) -> u64 {
        self.file_packet_number
    }

    #[inline]
    pub fn set_file_packet_number(&mut self, file_packet_number: u64) {
        self.file_packet_number = file_packet_number;
    }

    /// Copy the packet into a new buffer, including all metadata and the cached checksum
    /// state.
    pub fn deep_copy(&self) -> Self {
        Self {
            buf: Arc::new(self.buf.as_ref().clone()),
            ..self.cheap_clone(None, None, None, None)
        }
    }

    /// Create a packet which shares the buffer of this packet. Metadata which is passed as
    /// [Some] replaces the metadata of this packet, everything else is kept.
    pub fn cheap_clone(
        &self,
        absolute_time: Option<DateTime<Utc>>,
        file_offset: Option<u64>,
        file_packet_number: Option<u64>,
        rtc: Option<u64>,
    ) -> Self {
        Self {
            buf: Arc::clone(&self.buf),
            rtc: rtc.map(|rtc| rtc & RTC_MASK).unwrap_or(self.rtc),
            original_rtc: self.original_rtc,
            absolute_time: absolute_time.or(self.absolute_time),
            file_offset: file_offset.unwrap_or(self.file_offset),
            file_packet_number: file_packet_number.unwrap_or(self.file_packet_number),
            checksum_state: AtomicU8::new(self.checksum_state.load(Ordering::Relaxed)),
        }
    }

    /// Whether both packets currently use the same buffer.
    #[inline]
    pub fn shares_buffer_with(&self, other: &Packet) -> bool {
        Arc::ptr_eq(&self.buf, &other.buf)
    }

    /// TMATS setup record.
    #[inline]
    pub fn is_tmats(&self) -> bool {
        self.data_type() == Ok(DataType::ComputerGeneratedF1)
    }

    /// Recording index.
    #[inline]
    pub fn is_index(&self) -> bool {
        self.data_type() == Ok(DataType::ComputerGeneratedF3)
    }

    #[inline]
    pub fn is_1553(&self) -> bool {
        self.basic_data_type() == Ok(BasicDataType::Mil1553)
    }

    #[inline]
    pub fn is_fibre_channel(&self) -> bool {
        matches!(
            self.data_type(),
            Ok(DataType::FibreChannelF0 | DataType::FibreChannelF1)
        )
    }

    /// Text description of the packet.
    pub fn describe(&self, level: TextLevel) -> String {
        let mut text = String::new();
        // Writing into a string can not fail.
        let _ = self.write_description(&mut text, level);
        text
    }

    fn write_description<W: fmt::Write>(&self, f: &mut W, level: TextLevel) -> fmt::Result {
        let header = self.header();
        write!(
            f,
            "{} channel {:#06x} seq {} rtc {}",
            data_type_mnemonic(header.raw_data_type()),
            header.channel_id(),
            header.sequence_number(),
            self.rtc
        )?;
        if level == TextLevel::Minimal {
            return Ok(());
        }
        let flags = header.flags();
        writeln!(f)?;
        writeln!(
            f,
            "sync {:#06x}{}",
            header.sync(),
            if header.is_sync_valid() { "" } else { " (invalid)" }
        )?;
        writeln!(
            f,
            "packet length {}, data length {}, data type {:#04x} version {}",
            header.packet_length(),
            header.data_length(),
            header.raw_data_type(),
            header.data_type_version()
        )?;
        writeln!(
            f,
            "flags {:#04x}: secondary header {}, rtc sync error {}, data overflow {}, time \
             encoding {:?}, checksum {:?}",
            flags.raw_value(),
            flags.secondary_header(),
            flags.rtc_sync_error(),
            flags.data_overflow_error(),
            self.time_encoding(),
            flags.checksum_type()
        )?;
        write!(
            f,
            "header checksum {:#06x} ({}), packet checksum {}",
            header.checksum(),
            validity(header.is_checksum_valid()),
            validity(self.is_packet_checksum_valid())
        )?;
        if level == TextLevel::Header {
            return Ok(());
        }
        if let Some(secondary_header) = self.secondary_header() {
            writeln!(f)?;
            write!(
                f,
                "secondary header checksum {:#06x} ({})",
                secondary_header.checksum(),
                validity(secondary_header.is_checksum_valid())
            )?;
            match self.secondary_header_time() {
                Some(Ok(time)) => write!(f, ", time {time:?}")?,
                Some(Err(format)) => write!(f, ", unknown time format {format}")?,
                None => (),
            }
        }
        if let Ok(csdw) = self.csdw() {
            writeln!(f)?;
            write!(f, "csdw {csdw:#010x}")?;
        }
        if let Ok(mil1553) = self.as_mil1553() {
            for (idx, message) in mil1553.messages().enumerate() {
                writeln!(f)?;
                write!(
                    f,
                    "message {idx}: time stamp {:#014x}, status {:#06x}, length {}",
                    message.header.rtc(),
                    message.header.block_status().raw_value(),
                    message.header.length()
                )?;
            }
        } else if let Ok(index) = self.as_index() {
            writeln!(f)?;
            write!(
                f,
                "{:?} index, {} entries",
                index.index_type(),
                index.entry_count()
            )?;
            if let Some(file_size) = index.file_size() {
                write!(f, ", file size {file_size}")?;
            }
            for (idx, entry) in index.entries().enumerate() {
                writeln!(f)?;
                write!(f, "entry {idx}: {entry}")?;
            }
        }
        Ok(())
    }
}

fn validity(valid: bool) -> &'static str {
    if valid {
        "valid"
    } else {
        "invalid"
    }
}

macro_rules! basic_type_predicates {
    ($($name: ident => $basic: ident,)+) => {
        paste! {
            impl Packet {
                $(
                    #[doc = "Whether the basic data type is [BasicDataType::" $basic "]."]
                    #[inline]
                    pub fn [<is_ $name>](&self) -> bool {
                        self.basic_data_type() == Ok(BasicDataType::$basic)
                    }
                )+
            }
        }
    };
}

basic_type_predicates!(
    computer_generated => ComputerGenerated,
    pcm => Pcm,
    time => Time,
    analog => Analog,
    discrete => Discrete,
    message => Message,
    arinc429 => Arinc429,
    video => Video,
    image => Image,
    uart => Uart,
    ieee1394 => Ieee1394,
    parallel => Parallel,
    ethernet => Ethernet,
);

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_description(f, TextLevel::Header)
    }
}
