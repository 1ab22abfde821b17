//! Bounded per-metric history: one time-ordered sample buffer per
//! (source, interface, direction) key, with a long-run observed maximum.

use std::collections::{HashMap, VecDeque};

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    /// Mb/s, non-negative and finite once stored.
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub source: String,
    pub interface: String,
    pub direction: Direction,
}

/// Bounded, oldest-first sample buffer. Eviction is FIFO by insertion;
/// `observed_max` is a process-lifetime high-water mark and survives eviction.
#[derive(Debug)]
pub struct MetricStream {
    samples: VecDeque<Sample>,
    capacity: usize,
    observed_max: f64,
    rejected: u64,
}

impl MetricStream {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            observed_max: 0.0,
            rejected: 0,
        }
    }

    /// Insert a sample keeping the buffer oldest-first. Non-finite or
    /// negative values are dropped silently and counted for diagnostics.
    pub fn append(&mut self, sample: Sample) {
        if !sample.value.is_finite() || sample.value < 0.0 {
            self.rejected += 1;
            return;
        }
        match self.samples.back() {
            Some(last) if sample.timestamp < last.timestamp => {
                // Out-of-order arrival: insert at the right spot
                let idx = self
                    .samples
                    .partition_point(|s| s.timestamp <= sample.timestamp);
                self.samples.insert(idx, sample);
            }
            _ => self.samples.push_back(sample),
        }
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        if sample.value > self.observed_max {
            self.observed_max = sample.value;
        }
    }

    /// Most recent sample by timestamp, regardless of storage order.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples
            .iter()
            .max_by_key(|s| s.timestamp)
    }

    /// Restartable iterator over samples no older than `max_age` seconds
    /// relative to the caller's `now`.
    pub fn windowed(&self, now: i64, max_age: i64) -> impl Iterator<Item = &Sample> {
        let cutoff = now - max_age;
        self.samples.iter().filter(move |s| s.timestamp >= cutoff)
    }

    pub fn observed_max(&self) -> f64 {
        self.observed_max
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Streams created lazily on first sight of a key; they live for the
/// process lifetime.
#[derive(Debug, Default)]
pub struct StreamSet {
    streams: HashMap<StreamKey, MetricStream>,
}

impl StreamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, key: StreamKey) -> &mut MetricStream {
        self.streams
            .entry(key)
            .or_insert_with(|| MetricStream::new(DEFAULT_CAPACITY))
    }

    pub fn get(&self, key: &StreamKey) -> Option<&MetricStream> {
        self.streams.get(key)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
