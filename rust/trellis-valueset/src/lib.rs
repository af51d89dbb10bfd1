//! Columnar value sets over row-encoded blocks.
//!
//! Leaf-stage workers process data in columnar fashion, but by the time a
//! projected column reaches an intermediate stage it has been re-encoded into
//! the row-major exchange format. This crate bridges the two representations:
//! a value set binds to one column of one received block and materializes it
//! back into a contiguous typed vector on demand, so that aggregation and
//! scalar-function kernels written against columnar input can run unchanged.
//!
//! Two bindings exist: [`value_set::BlockValueSet`] covers every row of the
//! block, and [`filtered::FilteredBlockValueSet`] restricts the view to an
//! ordered subset of rows (typically the survivors of a predicate) without
//! copying or re-encoding the block itself. Both expose the same capability
//! set through the [`value_set::ValueSet`] trait; a consumer inspects
//! `value_type()` and `is_single_value()` and then calls exactly one matching
//! typed accessor.

pub mod column_values;
pub mod filtered;
pub mod value_set;

pub use column_values::ColumnValues;
pub use filtered::FilteredBlockValueSet;
pub use value_set::{BlockValueSet, Dictionary, ValueSet};
