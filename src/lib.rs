//! Salted Bloom filter with bit-packed bitmap storage.
//!
//! This crate provides a space-efficient probabilistic set for high-volume
//! "have I seen this before" checks (dedup, existence pre-checks before an
//! expensive lookup) where false positives are tolerable, false negatives
//! are not, and memory footprint matters more than exactness.
//!
//! HowTo:
//!    * Sizing: the filter derives its bit count `m` and hash round count
//!      `k` from the desired element capacity `n` and target false positive
//!      rate `p` using the standard optimal-parameter formula.
//!    * Salting: each round gets its own random salt drawn at construction
//!      from the OS secure random source, so rounds stay decorrelated and
//!      the effective false positive rate tracks the configured target.
//!    * Storage: bits live in a byte-backed [`Bitmap`] the filter guards
//!      with its own readers-writer lock; the standalone [`SharedBitmap`]
//!      offers the self-locking regime for direct use.
//!
//! Insertion:
//!     * [`BloomFilter::add`] hashes `key bytes || salt bytes` once per
//!       round and sets the resulting `k` bit indices.
//! Query:
//!     * [`BloomFilter::contains`] recomputes the same indices and reports
//!       present only if every bit is set; it short-circuits on the first
//!       unset bit. Added keys are never reported absent.
//! Persistence:
//!     * [`BloomFilter::dump`] / [`BloomFilter::restore`] move the full
//!       filter state through an exact binary format: a magic line, a salt
//!       count line, fixed-width newline-terminated salts, then the raw
//!       bitmap bytes. Restoring a dump reproduces the exact byte stream on
//!       the next dump.
//!
//! Known limits:
//!     * Exceeding the design capacity degrades the false positive rate
//!       smoothly, not catastrophically.
//!     * Salts are decorrelation material, not secrets.
//!     * The filter never clears bits; the bitmap's `clear` exists for
//!       direct bitmap users who accept the shared-bit caveat.

mod bitmap;
mod common;
mod config;
mod error;
mod filter;
mod hash;
mod key;

pub use bitmap::{Bitmap, SharedBitmap};
pub use config::{BloomConfig, BloomConfigBuilder, BloomConfigBuilderError};
pub use error::{FilterError, Result};
pub use filter::BloomFilter;
pub use hash::{
    HasherFactory, HasherPool, RoundHasher, fnv_round_hasher,
    murmur3_round_hasher, optimal_params,
};
pub use key::FilterKey;
