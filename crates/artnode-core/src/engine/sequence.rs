use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::protocols::artnet::PortAddress;

/// What to do with ArtDmx frames that arrive out of sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequencePolicy {
    /// Flag only; every frame is passed on.
    #[default]
    Accept,
    /// Drop a frame repeating the last accepted sequence number.
    DropDuplicates,
    /// Drop duplicates and frames that are behind the last accepted one.
    DropOutOfOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStatus {
    /// Sequence number 0: ordering disabled by the sender.
    Untracked,
    InOrder,
    Duplicate,
    OutOfOrder,
}

/// Streams remembered at once; the oldest stream is forgotten first.
pub const MAX_TRACKED_STREAMS: usize = 1024;

type StreamKey = (Ipv4Addr, PortAddress);

/// Last accepted sequence number per (sender, Port-Address).
///
/// Both halves of the key come from the network, so the table is bounded
/// by `MAX_TRACKED_STREAMS`. A forgotten stream restarts as in order.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    policy: SequencePolicy,
    last: HashMap<StreamKey, u8>,
    order: VecDeque<StreamKey>,
}

impl SequenceTracker {
    pub fn new(policy: SequencePolicy) -> Self {
        Self {
            policy,
            last: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.last.len()
    }

    pub fn policy(&self) -> SequencePolicy {
        self.policy
    }

    /// Classify `sequence` and decide whether the frame is accepted.
    ///
    /// Only accepted frames advance the stored sequence.
    pub fn observe(
        &mut self,
        source: Ipv4Addr,
        address: PortAddress,
        sequence: u8,
    ) -> (SequenceStatus, bool) {
        // Sequence 0 disables tracking for the frame.
        if sequence == 0 {
            return (SequenceStatus::Untracked, true);
        }
        let key = (source, address);
        let status = match self.last.get(&key) {
            None => SequenceStatus::InOrder,
            Some(&last) if last == sequence => SequenceStatus::Duplicate,
            Some(&last) => {
                // Half the sequence space ahead counts as forward progress.
                if sequence.wrapping_sub(last) < 128 {
                    SequenceStatus::InOrder
                } else {
                    SequenceStatus::OutOfOrder
                }
            }
        };
        let accepted = match (self.policy, status) {
            (SequencePolicy::DropDuplicates, SequenceStatus::Duplicate) => false,
            (
                SequencePolicy::DropOutOfOrder,
                SequenceStatus::Duplicate | SequenceStatus::OutOfOrder,
            ) => false,
            _ => true,
        };
        if accepted {
            self.remember(key, sequence);
        }
        (status, accepted)
    }

    fn remember(&mut self, key: StreamKey, sequence: u8) {
        if let Some(last) = self.last.get_mut(&key) {
            *last = sequence;
            return;
        }
        if self.last.len() >= MAX_TRACKED_STREAMS {
            if let Some(oldest) = self.order.pop_front() {
                self.last.remove(&oldest);
            }
        }
        self.last.insert(key, sequence);
        self.order.push_back(key);
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{MAX_TRACKED_STREAMS, SequencePolicy, SequenceStatus, SequenceTracker};
    use crate::protocols::artnet::PortAddress;

    const SRC: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

    fn addr() -> PortAddress {
        PortAddress::new(1)
    }

    #[test]
    fn zero_is_always_accepted() {
        let mut tracker = SequenceTracker::new(SequencePolicy::DropOutOfOrder);
        tracker.observe(SRC, addr(), 10);
        for _ in 0..3 {
            assert_eq!(
                tracker.observe(SRC, addr(), 0),
                (SequenceStatus::Untracked, true)
            );
        }
    }

    #[test]
    fn repeated_sequence_is_duplicate() {
        let mut tracker = SequenceTracker::new(SequencePolicy::Accept);
        assert_eq!(tracker.observe(SRC, addr(), 5).0, SequenceStatus::InOrder);
        assert_eq!(
            tracker.observe(SRC, addr(), 5),
            (SequenceStatus::Duplicate, true)
        );
    }

    #[test]
    fn drop_duplicates_keeps_out_of_order() {
        let mut tracker = SequenceTracker::new(SequencePolicy::DropDuplicates);
        tracker.observe(SRC, addr(), 5);
        assert_eq!(
            tracker.observe(SRC, addr(), 5),
            (SequenceStatus::Duplicate, false)
        );
        assert_eq!(
            tracker.observe(SRC, addr(), 3),
            (SequenceStatus::OutOfOrder, true)
        );
    }

    #[test]
    fn wraparound_is_in_order() {
        let mut tracker = SequenceTracker::new(SequencePolicy::DropOutOfOrder);
        tracker.observe(SRC, addr(), 255);
        assert_eq!(
            tracker.observe(SRC, addr(), 1),
            (SequenceStatus::InOrder, true)
        );
        assert_eq!(
            tracker.observe(SRC, addr(), 200),
            (SequenceStatus::OutOfOrder, false)
        );
    }

    #[test]
    fn sources_are_tracked_independently() {
        let mut tracker = SequenceTracker::new(SequencePolicy::DropDuplicates);
        tracker.observe(SRC, addr(), 7);
        let other = Ipv4Addr::new(10, 0, 0, 2);
        assert_eq!(
            tracker.observe(other, addr(), 7),
            (SequenceStatus::InOrder, true)
        );
    }

    #[test]
    fn table_is_bounded_and_forgets_oldest_stream() {
        let mut tracker = SequenceTracker::new(SequencePolicy::Accept);
        for n in 0..100_000u32 {
            tracker.observe(Ipv4Addr::from(0x0a00_0000 | n), addr(), 9);
        }
        assert_eq!(tracker.len(), MAX_TRACKED_STREAMS);

        // The first sender was evicted long ago; the newest is still known.
        assert_eq!(
            tracker.observe(Ipv4Addr::from(0x0a00_0000), addr(), 9).0,
            SequenceStatus::InOrder
        );
        assert_eq!(
            tracker.observe(Ipv4Addr::from(0x0a00_0000 | 99_999), addr(), 9).0,
            SequenceStatus::Duplicate
        );
        assert_eq!(tracker.len(), MAX_TRACKED_STREAMS);
    }
}
