//! Interpretation of packet bodies which consist of a sequence of sub-records.
//!
//! The walkers in this module never store an offset table. The start of each record is the end
//! of the previous one, and walking stops at the record count of the channel specific data word
//! or at the end of the body, whichever comes first.
pub mod index;
pub mod mil1553;

pub use index::{IndexEntries, IndexEntry, IndexPacket};
pub use mil1553::{Mil1553Message, Mil1553Messages, Mil1553Packet};
