use alloc::vec;

use zerocopy::IntoBytes;

use super::{Packet, PacketError};
use crate::checksum::ChecksumType;
use crate::layout::{
    ChannelSpecificData, PacketHeader, SecondaryHeader, CSDW_LEN, HEADER_LEN, PACKET_ALIGNMENT,
};
use crate::seq_count::ChannelSequenceCounter;
use crate::time::SecondaryHeaderTime;

/// Builds a complete packet from a CSDW and a payload.
///
/// The data length is the CSDW plus the payload. Filler bytes are appended so that the packet
/// length including the checksum trailer is a multiple of 4. All checksums of the created packet
/// are valid.
#[derive(Debug, Clone)]
pub struct PacketCreator<'a> {
    header: PacketHeader,
    csdw: u32,
    payload: &'a [u8],
    secondary_time: Option<SecondaryHeaderTime>,
}

impl<'a> PacketCreator<'a> {
    pub fn new(channel_id: u16, data_type: impl Into<u8>) -> Self {
        Self {
            header: PacketHeader::new(channel_id, data_type),
            csdw: 0,
            payload: &[],
            secondary_time: None,
        }
    }

    pub fn with_checksum_type(mut self, checksum_type: ChecksumType) -> Self {
        self.header
            .set_flags(self.header.flags().with_checksum_type(checksum_type));
        self
    }

    pub fn with_csdw(mut self, csdw: impl ChannelSpecificData) -> Self {
        self.csdw = csdw.raw();
        self
    }

    /// Payload following the CSDW.
    pub fn with_payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_rtc(mut self, rtc: u64) -> Self {
        self.header.set_rtc(rtc);
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: u8) -> Self {
        self.header.set_sequence_number(sequence_number);
        self
    }

    /// Take the next sequence number of the packet channel from `counter`.
    pub fn with_next_sequence_number(self, counter: &impl ChannelSequenceCounter) -> Self {
        let sequence_number = counter.get_and_increment(self.header.channel_id());
        self.with_sequence_number(sequence_number)
    }

    pub fn with_data_type_version(mut self, version: u8) -> Self {
        self.header.set_data_type_version(version);
        self
    }

    pub fn with_rtc_sync_error(mut self, rtc_sync_error: bool) -> Self {
        self.header
            .set_flags(self.header.flags().with_rtc_sync_error(rtc_sync_error));
        self
    }

    pub fn with_data_overflow_error(mut self, data_overflow_error: bool) -> Self {
        self.header
            .set_flags(self.header.flags().with_data_overflow_error(data_overflow_error));
        self
    }

    /// Add a secondary header with the given time. The secondary time format of the packet
    /// flags is set accordingly.
    pub fn with_secondary_time(mut self, time: SecondaryHeaderTime) -> Self {
        self.header.set_flags(
            self.header
                .flags()
                .with_secondary_header(true)
                .with_secondary_time_format(time.format()),
        );
        self.secondary_time = Some(time);
        self
    }

    /// Intra-packet time stamps use the secondary header time format instead of the RTC.
    pub fn with_ipts_from_secondary_time(mut self, ipts_from_secondary_time: bool) -> Self {
        self.header.set_flags(
            self.header
                .flags()
                .with_ipts_from_secondary_time(ipts_from_secondary_time),
        );
        self
    }

    /// Data length of the created packet.
    #[inline]
    pub fn data_len(&self) -> usize {
        CSDW_LEN + self.payload.len()
    }

    /// Packet length of the created packet.
    pub fn packet_len(&self) -> usize {
        (self.header.body_offset() + self.data_len() + self.header.checksum_type().width())
            .next_multiple_of(PACKET_ALIGNMENT)
    }

    pub fn build(self) -> Result<Packet, PacketError> {
        let data_length = self.data_len();
        let packet_length = self.packet_len();
        let (Ok(raw_data_length), Ok(raw_packet_length)) =
            (u32::try_from(data_length), u32::try_from(packet_length))
        else {
            return Err(PacketError::DataLengthTooLarge {
                data_length,
                packet_length,
            });
        };
        let mut header = self.header;
        header.set_data_length(raw_data_length);
        header.set_packet_length(raw_packet_length);
        header.fix_checksum(true);

        let mut buf = vec![0; packet_length];
        header.write_to_bytes(&mut buf)?;
        if let Some(time) = &self.secondary_time {
            let secondary_header = SecondaryHeader::new(time.to_bytes());
            buf[HEADER_LEN..header.body_offset()].copy_from_slice(secondary_header.as_bytes());
        }
        let body_offset = header.body_offset();
        buf[body_offset..body_offset + CSDW_LEN].copy_from_slice(&self.csdw.to_le_bytes());
        buf[body_offset + CSDW_LEN..body_offset + data_length].copy_from_slice(self.payload);

        let mut packet = Packet::from_vec(buf)?;
        packet.fix_checksum(true);
        Ok(packet)
    }
}
