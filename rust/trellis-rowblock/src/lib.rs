//! Row-encoded result batches exchanged between the stages of a multi-stage
//! query plan.
//!
//! Leaf-stage workers serialize their results as [`block::RowBlock`]: an
//! immutable, schema-tagged batch where each row occupies a fixed-width strip
//! of cells, with variable-size payloads spilled into a shared byte region.
//! Intermediate stages never re-encode a received block; instead, the
//! [`decoder`] module extracts one column at a time into a contiguous typed
//! vector, optionally restricted and reordered by a [`filter::RowIndexFilter`].

pub mod block;
pub mod decoder;
pub mod filter;
pub mod schema;
