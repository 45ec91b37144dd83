//! Packet sequence numbers.
//!
//! The sequence number of the packet header is an 8 bit counter which is maintained per channel
//! and wraps around from 255 to 0. [PacketCreator](crate::PacketCreator) can draw the sequence
//! number of a new packet from any [ChannelSequenceCounter].
use alloc::collections::BTreeMap;
use core::cell::RefCell;
#[cfg(feature = "std")]
pub use stdmod::*;

/// Provides the sequence numbers of multiple channels.
///
/// The functions are not mutable so that counters can be shared by reference. Implementations
/// use interior mutability.
pub trait ChannelSequenceCounter {
    /// Current sequence number of the channel.
    fn get(&self, channel_id: u16) -> u8;

    /// Current sequence number of the channel. The counter of the channel is incremented
    /// afterwards.
    fn get_and_increment(&self, channel_id: u16) -> u8;
}

/// Per channel sequence counters with interior mutability. Channels start at 0.
#[derive(Debug, Default, Clone)]
pub struct ChannelSeqCounters {
    counters: RefCell<BTreeMap<u16, u8>>,
}

impl ChannelSeqCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the counter of a channel at 0.
    pub fn reset(&self, channel_id: u16) {
        self.counters.borrow_mut().remove(&channel_id);
    }

    /// Number of channels which have been counted so far.
    pub fn channels(&self) -> usize {
        self.counters.borrow().len()
    }
}

impl ChannelSequenceCounter for ChannelSeqCounters {
    fn get(&self, channel_id: u16) -> u8 {
        self.counters
            .borrow()
            .get(&channel_id)
            .copied()
            .unwrap_or_default()
    }

    fn get_and_increment(&self, channel_id: u16) -> u8 {
        let mut counters = self.counters.borrow_mut();
        let counter = counters.entry(channel_id).or_insert(0);
        let curr_count = *counter;
        *counter = curr_count.wrapping_add(1);
        curr_count
    }
}

#[cfg(feature = "std")]
pub mod stdmod {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Per channel sequence counters which can be shared between threads. This type does not
    /// panic on [Mutex] lock errors, the getters yield 0 instead.
    #[derive(Debug, Clone, Default)]
    pub struct ChannelSeqCountersSync {
        counters: Arc<Mutex<BTreeMap<u16, u8>>>,
    }

    impl ChannelSeqCountersSync {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl ChannelSequenceCounter for ChannelSeqCountersSync {
        fn get(&self, channel_id: u16) -> u8 {
            match self.counters.lock() {
                Ok(counters) => counters.get(&channel_id).copied().unwrap_or_default(),
                Err(_) => 0,
            }
        }

        fn get_and_increment(&self, channel_id: u16) -> u8 {
            match self.counters.lock() {
                Ok(mut counters) => {
                    let counter = counters.entry(channel_id).or_insert(0);
                    let val = *counter;
                    *counter = val.wrapping_add(1);
                    val
                }
                Err(_) => 0,
            }
        }
    }
}
