//! Recording index packet bodies (computer generated format 3).
//!
//! Root index packets point to node index packets, node index packets point to data packets.
//! Each entry consists of an 8 byte time stamp, an optional 8 byte intra-packet data header,
//! for node entries the channel ID and data type of the referenced packet, and the 64 bit file
//! offset of the referenced packet.
use core::fmt;

use tracing::warn;
use zerocopy::FromBytes;

use crate::layout::{
    index_entry_len, IndexCsdw, IndexOffset, IndexType, NodeIndexInfo, CSDW_LEN,
    INDEX_FILE_SIZE_LEN, INDEX_IPDH_LEN, IPTS_LEN,
};
use crate::ByteConversionError;

/// A single decoded index entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub time_stamp: [u8; IPTS_LEN],
    pub intra_packet_data_header: Option<[u8; INDEX_IPDH_LEN]>,
    /// Channel and data type of the referenced packet. Only present for node entries.
    pub node: Option<NodeIndexInfo>,
    /// File offset of the referenced packet.
    pub offset: u64,
}

impl IndexEntry {
    #[inline]
    pub fn index_type(&self) -> IndexType {
        if self.node.is_some() {
            IndexType::Node
        } else {
            IndexType::Root
        }
    }

    fn parse(raw: &[u8], node: bool, ipdh: bool) -> Self {
        let mut time_stamp = [0; IPTS_LEN];
        time_stamp.copy_from_slice(&raw[..IPTS_LEN]);
        let mut current = IPTS_LEN;
        let intra_packet_data_header = if ipdh {
            let mut header = [0; INDEX_IPDH_LEN];
            header.copy_from_slice(&raw[current..current + INDEX_IPDH_LEN]);
            current += INDEX_IPDH_LEN;
            Some(header)
        } else {
            None
        };
        let node = if node {
            let info = NodeIndexInfo::read_from_prefix(&raw[current..])
                .ok()
                .map(|(info, _)| info);
            current += core::mem::size_of::<NodeIndexInfo>();
            info
        } else {
            None
        };
        let offset = IndexOffset::read_from_prefix(&raw[current..])
            .map(|(offset, _)| offset.get())
            .unwrap_or_default();
        Self {
            time_stamp,
            intra_packet_data_header,
            node,
            offset,
        }
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time stamp {:#018x}",
            u64::from_le_bytes(self.time_stamp)
        )?;
        if let Some(node) = &self.node {
            write!(
                f,
                ", channel {:#06x}, data type {}",
                node.channel_id(),
                crate::layout::data_type_mnemonic(node.data_type())
            )?;
        }
        write!(f, ", offset {}", self.offset)
    }
}

/// Iterator over the entries of an index packet body.
#[derive(Debug, Clone)]
pub struct IndexEntries<'a> {
    body: &'a [u8],
    offset: usize,
    remaining: u16,
    node: bool,
    ipdh: bool,
}

impl Iterator for IndexEntries<'_> {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry_len = index_entry_len(self.node, self.ipdh);
        let raw = match self.body.get(self.offset..self.offset + entry_len) {
            Some(raw) => raw,
            None => {
                warn!(
                    offset = self.offset,
                    remaining = self.remaining,
                    "index packet body truncated"
                );
                self.remaining = 0;
                return None;
            }
        };
        self.offset += entry_len;
        self.remaining -= 1;
        Some(IndexEntry::parse(raw, self.node, self.ipdh))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

/// Typed view of a recording index packet body.
#[derive(Debug, Copy, Clone)]
pub struct IndexPacket<'a> {
    csdw: IndexCsdw,
    body: &'a [u8],
}

impl<'a> IndexPacket<'a> {
    /// Create the view from a packet body which starts with the CSDW.
    pub fn from_body(body: &'a [u8]) -> Result<Self, ByteConversionError> {
        if body.len() < CSDW_LEN {
            return Err(ByteConversionError::FromSliceTooSmall {
                found: body.len(),
                expected: CSDW_LEN,
            });
        }
        let csdw = IndexCsdw::new_with_raw_value(u32::from_le_bytes([
            body[0], body[1], body[2], body[3],
        ]));
        Ok(Self { csdw, body })
    }

    #[inline]
    pub fn csdw(&self) -> IndexCsdw {
        self.csdw
    }

    #[inline]
    pub fn index_type(&self) -> IndexType {
        self.csdw.index_type()
    }

    /// Size of the recording file, if the CSDW declares it to be present.
    pub fn file_size(&self) -> Option<u64> {
        if !self.csdw.file_size_present() {
            return None;
        }
        IndexOffset::read_from_prefix(self.body.get(CSDW_LEN..)?)
            .ok()
            .map(|(size, _)| size.get())
    }

    /// Entry count declared by the CSDW.
    #[inline]
    pub fn entry_count(&self) -> u16 {
        self.csdw.entry_count()
    }

    pub fn entries(&self) -> IndexEntries<'a> {
        let offset = if self.csdw.file_size_present() {
            CSDW_LEN + INDEX_FILE_SIZE_LEN
        } else {
            CSDW_LEN
        };
        IndexEntries {
            body: self.body,
            offset,
            remaining: self.csdw.entry_count(),
            node: self.csdw.node_index(),
            ipdh: self.csdw.intra_packet_data_header(),
        }
    }
}
