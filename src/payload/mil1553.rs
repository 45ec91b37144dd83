//! MIL-STD-1553 format 1 packet bodies.
//!
//! The body consists of the CSDW followed by the messages. Every message starts with a 14 byte
//! [Mil1553IntraPacketHeader] whose length field gives the number of message bytes which
//! follow it.
use arbitrary_int::u5;
use tracing::warn;

use crate::layout::{Mil1553Csdw, Mil1553IntraPacketHeader, CSDW_LEN, IPTS_LEN, MIL1553_IPH_LEN};
use crate::time::RTC_MASK;
use crate::ByteConversionError;

/// 1553 command word.
#[bitbybit::bitfield(u16, default = 0x00, debug)]
#[derive(PartialEq, Eq)]
pub struct CommandWord {
    #[bits(11..=15, rw)]
    rt_address: u5,
    /// Set if the remote terminal transmits.
    #[bit(10, rw)]
    transmit: bool,
    #[bits(5..=9, rw)]
    subaddress: u5,
    /// Word count or mode code. A value of 0 means 32 data words.
    #[bits(0..=4, rw)]
    word_count: u5,
}

impl CommandWord {
    /// Number of data words, resolving the encoding of 32 as 0.
    #[inline]
    pub fn data_word_count(&self) -> usize {
        match self.word_count().value() {
            0 => 32,
            count => count as usize,
        }
    }
}

/// Walks the intra-packet headers of a 1553 body.
#[derive(Debug, Clone)]
pub(crate) struct MessageCursor {
    remaining: u32,
    offset: usize,
}

impl MessageCursor {
    pub(crate) fn new(csdw: Mil1553Csdw) -> Self {
        Self {
            remaining: csdw.message_count().value(),
            offset: CSDW_LEN,
        }
    }

    /// Offset of the next intra-packet header relative to the body start, together with a copy
    /// of the header.
    pub(crate) fn next_header(
        &mut self,
        body: &[u8],
    ) -> Option<(usize, Mil1553IntraPacketHeader)> {
        if self.remaining == 0 || self.offset >= body.len() {
            return None;
        }
        let offset = self.offset;
        let header = match Mil1553IntraPacketHeader::from_bytes(&body[offset..]) {
            Ok(header) => header,
            Err(e) => {
                warn!(offset, remaining = self.remaining, "truncated 1553 message: {e}");
                self.remaining = 0;
                return None;
            }
        };
        self.offset = offset + MIL1553_IPH_LEN + header.length() as usize;
        self.remaining -= 1;
        Some((offset, header))
    }
}

/// Add `delta` to the RTC time stamp of every message. The upper two bytes of each time stamp
/// are preserved. Returns the number of adjusted messages.
pub(crate) fn shift_time_stamps(body: &mut [u8], csdw: Mil1553Csdw, delta: u64) -> usize {
    let mut cursor = MessageCursor::new(csdw);
    let mut shifted = 0;
    while let Some((offset, mut header)) = cursor.next_header(body) {
        header.set_rtc(header.rtc().wrapping_add(delta) & RTC_MASK);
        body[offset..offset + IPTS_LEN].copy_from_slice(header.time_stamp());
        shifted += 1;
    }
    shifted
}

/// A single 1553 message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Mil1553Message<'a> {
    /// Offset of the intra-packet header relative to the body start.
    pub offset: usize,
    pub header: Mil1553IntraPacketHeader,
    /// Command, status and data words. May be shorter than the header length if the body is
    /// truncated.
    pub data: &'a [u8],
}

impl<'a> Mil1553Message<'a> {
    /// 16 bit words of the message.
    pub fn words(&self) -> impl Iterator<Item = u16> + 'a {
        self.data
            .chunks_exact(2)
            .map(|word| u16::from_le_bytes([word[0], word[1]]))
    }

    pub fn command_word(&self) -> Option<CommandWord> {
        self.words().next().map(CommandWord::new_with_raw_value)
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.header.length() as usize
    }
}

/// Iterator over the messages of a 1553 body.
#[derive(Debug, Clone)]
pub struct Mil1553Messages<'a> {
    body: &'a [u8],
    cursor: MessageCursor,
}

impl<'a> Iterator for Mil1553Messages<'a> {
    type Item = Mil1553Message<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, header) = self.cursor.next_header(self.body)?;
        let start = offset + MIL1553_IPH_LEN;
        let end = start + header.length() as usize;
        let data = if end > self.body.len() {
            warn!(offset, length = header.length(), "1553 message data truncated");
            &self.body[start..]
        } else {
            &self.body[start..end]
        };
        Some(Mil1553Message {
            offset,
            header,
            data,
        })
    }
}

/// Typed view of a MIL-STD-1553 format 1 packet body.
#[derive(Debug, Copy, Clone)]
pub struct Mil1553Packet<'a> {
    csdw: Mil1553Csdw,
    body: &'a [u8],
}

impl<'a> Mil1553Packet<'a> {
    /// Create the view from a packet body which starts with the CSDW. The body should end at
    /// the declared data length of the packet.
    pub fn from_body(body: &'a [u8]) -> Result<Self, ByteConversionError> {
        if body.len() < CSDW_LEN {
            return Err(ByteConversionError::FromSliceTooSmall {
                found: body.len(),
                expected: CSDW_LEN,
            });
        }
        let csdw = Mil1553Csdw::new_with_raw_value(u32::from_le_bytes([
            body[0], body[1], body[2], body[3],
        ]));
        Ok(Self { csdw, body })
    }

    #[inline]
    pub fn csdw(&self) -> Mil1553Csdw {
        self.csdw
    }

    /// Message count declared by the CSDW.
    #[inline]
    pub fn message_count(&self) -> u32 {
        self.csdw.message_count().value()
    }

    pub fn messages(&self) -> Mil1553Messages<'a> {
        Mil1553Messages {
            body: self.body,
            cursor: MessageCursor::new(self.csdw),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::vec::Vec;
    use arbitrary_int::u24;

    use super::*;
    use crate::layout::BlockStatusWord;
    use zerocopy::IntoBytes;

    /// Body with one message per entry of `messages`, each given as time stamp and data words.
    pub(crate) fn build_body(declared_count: u32, messages: &[(u64, &[u16])]) -> Vec<u8> {
        let csdw = Mil1553Csdw::new_with_raw_value(0).with_message_count(u24::new(declared_count));
        let mut body = Vec::from(csdw.raw_value().to_le_bytes());
        for (time_stamp, words) in messages {
            let mut raw_time = [0; IPTS_LEN];
            raw_time.copy_from_slice(&time_stamp.to_le_bytes());
            let iph = Mil1553IntraPacketHeader::new(
                raw_time,
                BlockStatusWord::new_with_raw_value(0),
                (words.len() * 2) as u16,
            );
            body.extend_from_slice(iph.as_bytes());
            for word in *words {
                body.extend_from_slice(&word.to_le_bytes());
            }
        }
        body
    }

    #[test]
    fn test_command_word() {
        let cmd = CommandWord::new_with_raw_value(0x0C22);
        assert_eq!(cmd.rt_address().value(), 1);
        assert!(cmd.transmit());
        assert_eq!(cmd.subaddress().value(), 1);
        assert_eq!(cmd.data_word_count(), 2);
        assert_eq!(CommandWord::new_with_raw_value(0x0820).data_word_count(), 32);
    }

    #[test]
    fn test_messages() {
        let body = build_body(2, &[(100, &[0x0C22, 1, 2]), (200, &[0x0821])]);
        let packet = Mil1553Packet::from_body(&body).unwrap();
        assert_eq!(packet.message_count(), 2);
        let messages: Vec<_> = packet.messages().collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].offset, CSDW_LEN);
        assert_eq!(messages[0].header.rtc(), 100);
        assert_eq!(messages[0].words().collect::<Vec<_>>(), [0x0C22, 1, 2]);
        assert_eq!(messages[1].offset, CSDW_LEN + MIL1553_IPH_LEN + 6);
        assert_eq!(messages[1].header.rtc(), 200);
        assert_eq!(
            messages[1].command_word().unwrap().subaddress().value(),
            1
        );
        assert!(!messages[1].is_truncated());
    }

    #[test]
    fn test_stops_at_message_count() {
        let body = build_body(1, &[(1, &[0]), (2, &[0])]);
        let packet = Mil1553Packet::from_body(&body).unwrap();
        assert_eq!(packet.messages().count(), 1);
    }

    #[test]
    fn test_stops_at_body_end() {
        let body = build_body(5, &[(1, &[0]), (2, &[0])]);
        let packet = Mil1553Packet::from_body(&body).unwrap();
        assert_eq!(packet.messages().count(), 2);
    }

    #[test]
    fn test_truncated_message() {
        let mut body = build_body(2, &[(1, &[1, 2, 3]), (2, &[4])]);
        // Cut into the data of the second message.
        body.truncate(body.len() - 1);
        let packet = Mil1553Packet::from_body(&body).unwrap();
        let messages: Vec<_> = packet.messages().collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_truncated());

        // Cut into the intra-packet header of the second message.
        body.truncate(CSDW_LEN + MIL1553_IPH_LEN + 6 + 4);
        let packet = Mil1553Packet::from_body(&body).unwrap();
        assert_eq!(packet.messages().count(), 1);
    }

    #[test]
    fn test_body_too_small() {
        assert_eq!(
            Mil1553Packet::from_body(&[0; 3]).unwrap_err(),
            ByteConversionError::FromSliceTooSmall {
                found: 3,
                expected: CSDW_LEN
            }
        );
    }

    #[test]
    fn test_shift_time_stamps() {
        let mut body = build_body(2, &[(0x00AB_0000_0000_0010, &[0]), (RTC_MASK, &[0])]);
        let csdw = Mil1553Packet::from_body(&body).unwrap().csdw();
        assert_eq!(shift_time_stamps(&mut body, csdw, 0x20), 2);
        let packet = Mil1553Packet::from_body(&body).unwrap();
        let messages: Vec<_> = packet.messages().collect();
        assert_eq!(messages[0].header.rtc(), 0x30);
        // The upper bytes outside of the 48 bit RTC are kept.
        assert_eq!(messages[0].header.time_stamp()[6], 0xAB);
        assert_eq!(messages[1].header.rtc(), 0x1F);
    }
}
