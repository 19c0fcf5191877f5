//! Auto-detecting meta-codec.
//!
//! [`AutoFrameCodec`] wraps an ordered list of candidate codecs and figures
//! out which one the incoming byte stream actually speaks. On every decode
//! call it replays the buffered view against each candidate, scores the
//! results, applies the winner, and — once one candidate has won enough
//! consecutive passes — locks onto it and stops scoring altogether.
//!
//! # Scoring
//!
//! Each candidate runs against a private copy of the view and is judged by
//!
//! ```text
//! score = frames_decoded * 1000 + bytes_consumed - remainder * penalty
//! ```
//!
//! so producing frames dominates, consuming input breaks ties between
//! codecs with equal output, and leftover bytes count against a candidate
//! that only explains part of the stream. Ties go to the earlier candidate
//! in the list.
//!
//! # Example
//!
//! ```
//! use framesift_codecs::{AutoFrameCodec, FixedLengthCodec, FrameCodec, NewlineCodec};
//!
//! let mut auto = AutoFrameCodec::new(vec![
//!     Box::new(NewlineCodec::new()),
//!     Box::new(FixedLengthCodec::new(8).unwrap()),
//! ])
//! .unwrap();
//!
//! let mut view: &[u8] = b"hello\nworld\n";
//! assert_eq!(&auto.decode(&mut view).unwrap()[..], b"hello");
//! assert_eq!(&auto.decode(&mut view).unwrap()[..], b"world");
//! assert!(view.is_empty());
//! ```

use crate::codec::FrameCodec;
use bytes::Bytes;
use framesift_core::constants::{
    AUTO_LOCK_AFTER_HITS, AUTO_MAX_FRAME, AUTO_MAX_FRAMES_PER_PASS, AUTO_MAX_QUEUE_FRAMES,
    AUTO_MIN_BUFFER, AUTO_MIN_FRAMES_TO_LOCK, AUTO_REMAINDER_PENALTY,
};
use framesift_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Configuration for [`AutoFrameCodec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoFrameConfig {
    /// Per-frame sanity bound; a candidate emitting a frame outside
    /// `(0, max_frame_size]` forfeits its whole pass.
    pub max_frame_size: usize,

    /// Skip scoring entirely while the view is shorter than this.
    pub min_buffer_to_consider: usize,

    /// Halt a candidate's scoring run after this many frames.
    pub max_frames_per_pass: usize,

    /// Retain at most this many frames per winning pass; excess frames are
    /// counted toward the score but dropped.
    pub max_queue_frames: usize,

    /// Per-byte penalty for bytes a candidate leaves unconsumed.
    pub remainder_penalty: i64,

    /// Consecutive wins required before locking onto a candidate.
    pub lock_after_hits: u32,

    /// Minimum frames decoded in the winning pass for it to count toward a
    /// lock.
    pub min_frames_to_lock: usize,

    /// Candidate index used for encoding before a lock is acquired.
    /// `None` falls back to the first candidate.
    pub default_encoder: Option<usize>,
}

impl Default for AutoFrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: AUTO_MAX_FRAME,
            min_buffer_to_consider: AUTO_MIN_BUFFER,
            max_frames_per_pass: AUTO_MAX_FRAMES_PER_PASS,
            max_queue_frames: AUTO_MAX_QUEUE_FRAMES,
            remainder_penalty: AUTO_REMAINDER_PENALTY,
            lock_after_hits: AUTO_LOCK_AFTER_HITS,
            min_frames_to_lock: AUTO_MIN_FRAMES_TO_LOCK,
            default_encoder: None,
        }
    }
}

/// Result of one candidate's scoring run.
#[derive(Debug)]
struct PassOutcome {
    index: usize,
    decoded: usize,
    consumed: usize,
    frames: Vec<Bytes>,
    score: i64,
}

/// Adaptive codec that detects the framing discipline of a byte stream.
///
/// Candidates are identified by their slot in the owned candidate list; the
/// list never changes after construction, so the slot index is a stable
/// identity even when two candidates carry identical parameters.
///
/// Not reentrant: all interior state (pending frames, win streaks, the lock
/// decision) is mutated inside `decode`, and a single instance must not be
/// shared across concurrent decodes.
#[derive(Debug)]
pub struct AutoFrameCodec {
    candidates: Vec<Box<dyn FrameCodec>>,
    config: AutoFrameConfig,
    pending: VecDeque<Bytes>,
    streaks: HashMap<usize, u32>,
    locked: Option<usize>,
}

impl AutoFrameCodec {
    /// Create an auto-framer with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `candidates` is empty.
    pub fn new(candidates: Vec<Box<dyn FrameCodec>>) -> Result<Self> {
        Self::with_config(candidates, AutoFrameConfig::default())
    }

    /// Create an auto-framer with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `candidates` is empty or
    /// `config.default_encoder` does not index into it.
    pub fn with_config(candidates: Vec<Box<dyn FrameCodec>>, config: AutoFrameConfig) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::InvalidConfig(
                "auto-framer needs at least one candidate codec".to_string(),
            ));
        }
        if let Some(index) = config.default_encoder
            && index >= candidates.len()
        {
            return Err(Error::InvalidConfig(format!(
                "default encoder index {index} out of range for {} candidates",
                candidates.len()
            )));
        }

        Ok(Self {
            candidates,
            config,
            pending: VecDeque::new(),
            streaks: HashMap::new(),
            locked: None,
        })
    }

    /// Read-only mode tag: `"AUTO"` while scoring, `"LOCKED:<codec-name>"`
    /// once a candidate has been chosen for good.
    pub fn mode(&self) -> String {
        match self.locked {
            Some(index) => format!("LOCKED:{}", self.candidates[index].name()),
            None => "AUTO".to_string(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Run every candidate against a private copy of `snapshot` and return
    /// the best outcome, if any candidate produced valid frames.
    fn run_scoring_pass(&mut self, snapshot: &[u8]) -> Option<PassOutcome> {
        let mut best: Option<PassOutcome> = None;

        for (index, candidate) in self.candidates.iter_mut().enumerate() {
            let mut local = snapshot;
            let mut frames = Vec::new();
            let mut decoded = 0usize;
            let mut valid = true;

            while decoded < self.config.max_frames_per_pass {
                let Some(frame) = candidate.decode(&mut local) else {
                    break;
                };
                if frame.is_empty() || frame.len() > self.config.max_frame_size {
                    valid = false;
                    break;
                }
                decoded += 1;
                if frames.len() < self.config.max_queue_frames {
                    frames.push(frame);
                }
            }

            if !valid || decoded == 0 {
                continue;
            }

            let consumed = snapshot.len() - local.len();
            let remainder = local.len();
            let score = decoded as i64 * 1000 + consumed as i64
                - remainder as i64 * self.config.remainder_penalty;

            // strict comparison keeps the earliest candidate on ties
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(PassOutcome {
                    index,
                    decoded,
                    consumed,
                    frames,
                    score,
                });
            }
        }

        best
    }

    /// Credit the winner, debit everyone else, and lock when the winner has
    /// been consistent enough.
    fn update_streaks(&mut self, winner: usize, decoded: usize) {
        for index in 0..self.candidates.len() {
            if index == winner {
                let streak = self.streaks.entry(index).or_insert(0);
                *streak += 1;
                if *streak >= self.config.lock_after_hits
                    && decoded >= self.config.min_frames_to_lock
                {
                    self.locked = Some(index);
                }
            } else if let Some(streak) = self.streaks.get_mut(&index) {
                *streak = streak.saturating_sub(1);
            }
        }
    }
}

impl FrameCodec for AutoFrameCodec {
    fn name(&self) -> &'static str {
        "auto"
    }

    /// Encode with the locked codec, the configured default encoder, or the
    /// first candidate, in that order of preference.
    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let index = self
            .locked
            .or(self.config.default_encoder)
            .unwrap_or(0);
        self.candidates[index].encode(payload)
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        // frames queued by an earlier pass go out first, one per call
        if let Some(frame) = self.pending.pop_front() {
            return Some(frame);
        }

        if let Some(index) = self.locked {
            return self.candidates[index].decode(view);
        }

        if view.len() < self.config.min_buffer_to_consider {
            return None;
        }

        let outcome = self.run_scoring_pass(*view)?;

        *view = &view[outcome.consumed..];
        self.pending.extend(outcome.frames);
        self.update_streaks(outcome.index, outcome.decoded);

        self.pending.pop_front()
    }
}
