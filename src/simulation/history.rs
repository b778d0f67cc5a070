//! Per-generation training statistics for plotting.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Summary of one finished generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation number (starting at 1).
    pub generation: u32,
    /// Highest score in the generation.
    pub best_score: u32,
    /// Average score of the generation.
    pub mean_score: f64,
    /// Mutation rate the generation's children were bred with.
    pub mutation_rate: f32,
}

/// Recent generation records, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    records: VecDeque<GenerationRecord>,
    max_records: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(500)
    }
}

impl History {
    /// Creates an empty history keeping at most `max_records` entries
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records),
            max_records,
        }
    }

    /// Appends a record, dropping the oldest ones past capacity
    pub fn record(&mut self, record: GenerationRecord) {
        self.records.push_back(record);

        while self.records.len() > self.max_records {
            self.records.pop_front();
        }
    }

    /// All kept records, oldest first
    pub fn records(&self) -> &VecDeque<GenerationRecord> {
        &self.records
    }

    /// The most recent record
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.back()
    }

    /// Clears all records
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: u32) -> GenerationRecord {
        GenerationRecord {
            generation,
            best_score: generation * 10,
            mean_score: 1.0,
            mutation_rate: 0.05,
        }
    }

    #[test]
    fn drops_oldest_past_capacity() {
        let mut history = History::new(3);
        for generation in 1..=5 {
            history.record(record(generation));
        }
        let kept: Vec<u32> = history.records().iter().map(|r| r.generation).collect();
        assert_eq!(kept, vec![3, 4, 5]);
        assert_eq!(history.last().map(|r| r.best_score), Some(50));
    }
}
