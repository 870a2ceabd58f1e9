//! Auxiliary candidate list, a small append-only record kept alongside a
//! detected transient for an external (Viterbi-style) pitch-track selector
//! to annotate later. This crate only produces and stores these records; it
//! never reads `cost`/`backlink_index` itself.
//!
//! Grounded on `examples/original_source/candidates.h`/`candidates.c`
//! (`struct candidate`, `struct candidateList`), renamed to the crate's
//! naming convention (`backlink_index` for the original's
//! `indexLowestCost`, a backward pointer into a previous frame's
//! candidates).

/// One pitch-track candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub frequency: f64,
    pub confidence: i32,
    /// Path cost, populated by an external selector. Defaults to `0.0` when
    /// the candidate is created, since this crate never assigns it itself.
    pub cost: f64,
    /// Backward pointer to the lowest-cost candidate in the previous frame,
    /// populated by an external selector. Defaults to `-1` (no backlink).
    pub backlink_index: i32,
}

impl Candidate {
    pub fn new(frequency: f64, confidence: i32) -> Self {
        Self {
            frequency,
            confidence,
            cost: 0.0,
            backlink_index: -1,
        }
    }
}

/// Append-only list of candidates for one frame.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, frequency: f64, confidence: i32) {
        self.candidates.push(Candidate::new(frequency, confidence));
    }

    pub fn adjust_cost(&mut self, index: usize, cost: f64, backlink_index: i32) {
        self.candidates[index].cost = cost;
        self.candidates[index].backlink_index = backlink_index;
    }

    pub fn get(&self, index: usize) -> Candidate {
        self.candidates[index]
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }
}
