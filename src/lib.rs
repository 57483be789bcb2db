//! Rust library for combining pattern matches when annotating sequencing reads.
//!
//! # Overview
//! seqcomb provides the match-combination engine behind a read-annotation
//! pattern language: compound patterns (AND, PLUS, SEQUENCE, OR) are built
//! out of simpler sub-patterns, and each sub-pattern produces a lazy stream
//! of scored, positioned candidate matches against a target sequence.
//!
//! The combiner enumerates *combinations*, one match taken from each operand
//! stream, that are mutually compatible under a positional validation rule,
//! without materializing the full cross product. Operand streams can be
//! numerous, overlapping, and only approximately sorted, so the combiner
//! tracks which combinations it has already tried and which pairs of
//! sub-matches are known to be incompatible.
//!
//! ## Matches and ranges
//! A [`Match`] is a score plus one or more half-open [`Range`]s, each tagged
//! with the target sequence it covers, plus named [`GroupEdge`] captures that
//! mark sub-regions of interest (barcodes, UMIs, adapters):
//! ```text
//! score: 12
//! seq:      AATTCCGGAATTCCCAAAAG
//! match:        |--------|
//! barcode>      |
//! <barcode           |
//! ```
//!
//! ## Pull-based combination
//! Operand streams implement [`MatchStream`]: repeated `pull()` calls yield
//! matches in approximately descending score order (or ascending coordinate
//! order), then `None` once exhausted. A [`MatchCombiner`] wraps N operand
//! streams and exposes the same interface, so combiners nest arbitrarily.
//!
//! Two traversal strategies drive the search:
//! * coordinate-ordered: an exhaustive mixed-radix sweep, used when
//!   downstream needs composites ordered by starting position, and
//! * score-ordered: greedy stages (probe each operand's second-best match,
//!   then climb the index with the best marginal score) followed by an
//!   exhaustive fallback sweep.
//!
//! *Fair* mode fully enumerates and sorts before serving results, which is
//! exact but requires bounded operand streams (see [`Capped`]). *Unfair*
//! mode streams results as they are discovered, trading order accuracy for
//! speed.
//!
//! ## Compound patterns
//! [`PatternExpr`] describes an operator tree over named leaf matchers and
//! can be loaded from YAML:
//! ```text
//! and:
//!   - leaf: barcode
//!   - sequence:
//!       - leaf: adapter
//!       - leaf: umi
//! ```
//! Building the tree produces nested combiners with each operator's
//! validation and scoring semantics.

pub mod combine;
pub mod errors;
pub mod matches;
pub mod patterns;
pub mod stream;

mod inline_string;

// commonly used functions and types

pub use crate::combine::*;
pub use crate::inline_string::InlineString;
pub use crate::matches::*;
pub use crate::patterns::*;
pub use crate::stream::*;
