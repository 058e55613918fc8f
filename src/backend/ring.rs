//! Bounded, time-indexed packet history

use std::collections::VecDeque;
use std::sync::Arc;

use crate::types::{Status, TimePreference};

/// One produced packet held in the history.
#[derive(Debug, Clone)]
pub struct Entry {
    pub frame_stamp: i64,
    pub timestamp: u64,
    pub payload: Arc<[u8]>,
    pub pose: Arc<[u8]>,
}

/// Result of a lookup: the status and, when `Ok`, the matching entry.
#[derive(Debug, Clone)]
pub enum Lookup<'a> {
    Found(&'a Entry),
    Wait,
    Discarded,
}

impl Lookup<'_> {
    pub fn status(&self) -> Status {
        match self {
            Lookup::Found(_) => Status::Ok,
            Lookup::Wait => Status::Wait,
            Lookup::Discarded => Status::Discarded,
        }
    }
}

/// Ring buffer of the most recent `capacity` packets.
///
/// Frame stamps start at 0 and increase by one per pushed packet. Once the
/// buffer is full, the oldest entry is evicted on every push. Timestamps are
/// expected to be non-decreasing in push order.
#[derive(Debug)]
pub struct TimeIndexedBuffer {
    capacity: usize,
    entries: VecDeque<Entry>,
    next_stamp: i64,
}

impl TimeIndexedBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, entries: VecDeque::with_capacity(capacity), next_stamp: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a packet and return its frame stamp.
    pub fn push(&mut self, timestamp: u64, payload: Arc<[u8]>, pose: Arc<[u8]>) -> i64 {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let frame_stamp = self.next_stamp;
        self.next_stamp += 1;
        self.entries.push_back(Entry { frame_stamp, timestamp, payload, pose });
        frame_stamp
    }

    fn oldest_stamp(&self) -> i64 {
        self.next_stamp - self.entries.len() as i64
    }

    fn has_evicted(&self) -> bool {
        self.oldest_stamp() > 0
    }

    /// Packet with the given frame stamp.
    pub fn get_by_index(&self, frame_stamp: i64) -> Lookup<'_> {
        if frame_stamp >= self.next_stamp {
            return Lookup::Wait;
        }
        let oldest = self.oldest_stamp();
        if frame_stamp < oldest {
            return Lookup::Discarded;
        }
        match self.entries.get((frame_stamp - oldest) as usize) {
            Some(entry) => Lookup::Found(entry),
            None => Lookup::Discarded,
        }
    }

    /// Packet whose timestamp best matches `timestamp` under `preference`.
    ///
    /// Requests past the newest packet return `Wait`, since a closer packet
    /// may still be produced. Requests before the oldest packet return
    /// `Discarded` when the best match may have been evicted.
    pub fn get_by_timestamp(
        &self,
        timestamp: u64,
        preference: TimePreference,
        tiebreak_right: bool,
    ) -> Lookup<'_> {
        let (Some(oldest), Some(newest)) = (self.entries.front(), self.entries.back()) else {
            return Lookup::Wait;
        };
        if timestamp > newest.timestamp {
            return Lookup::Wait;
        }
        if timestamp < oldest.timestamp {
            return match preference {
                TimePreference::PreferPast => Lookup::Discarded,
                _ if self.has_evicted() => Lookup::Discarded,
                _ => Lookup::Found(oldest),
            };
        }

        // First entry with entry.timestamp >= timestamp; exists since newest qualifies
        let right_index = self.entries.partition_point(|entry| entry.timestamp < timestamp);
        let right = &self.entries[right_index];
        if right.timestamp == timestamp {
            return Lookup::Found(right);
        }
        // timestamp > oldest.timestamp here, so right_index > 0
        let left = &self.entries[right_index - 1];

        match preference {
            TimePreference::PreferPast => Lookup::Found(left),
            TimePreference::PreferFuture => Lookup::Found(right),
            TimePreference::PreferNearest => {
                let left_distance = timestamp - left.timestamp;
                let right_distance = right.timestamp - timestamp;
                if left_distance < right_distance {
                    Lookup::Found(left)
                } else if right_distance < left_distance {
                    Lookup::Found(right)
                } else if tiebreak_right {
                    Lookup::Found(right)
                } else {
                    Lookup::Found(left)
                }
            }
        }
    }
}
