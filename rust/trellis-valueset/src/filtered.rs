//! The filtered specialization of the per-column read view.

use roaring::RoaringBitmap;
use trellis_common::Result;
use trellis_rowblock::{
    block::RowBlock,
    decoder,
    filter::RowIndexFilter,
    schema::{ColumnType, ScalarType},
};

use crate::column_values::ColumnValues;
use crate::value_set::ValueSet;

/// Read view over an ordered subset of one column's rows.
///
/// Rather than materializing a filtered copy of the block (which would mean
/// re-encoding every column), the filter is pushed down to decode time and
/// applied per column, on demand, only for the columns a consumer actually
/// requests. Every extraction yields a vector whose length equals the
/// filter's length, in filter order.
///
/// The type binding (`value_type`, `is_single_value`) is plain data captured
/// at construction and is unaffected by the filter. The null bitmap is
/// remapped at construction so that position `i` is set iff the row at
/// `filter[i]` is null in the block; consumers therefore index null state the
/// same way they index the extracted vectors.
pub struct FilteredBlockValueSet<'a> {
    column_type: ColumnType,
    block: &'a RowBlock,
    col_index: usize,
    filter: &'a RowIndexFilter,
    null_bitmap: Option<RoaringBitmap>,
}

impl<'a> FilteredBlockValueSet<'a> {
    /// Binds to `col_index` of `block`, restricted to `filter`.
    ///
    /// # Panics
    ///
    /// Panics if `col_index` is out of range or `column_type` disagrees with
    /// the schema's declared type for that column. Filter positions are not
    /// validated here; an out-of-range position is the filter producer's bug
    /// and surfaces as a panic at decode time.
    pub fn new(
        column_type: ColumnType,
        block: &'a RowBlock,
        col_index: usize,
        filter: &'a RowIndexFilter,
    ) -> Self {
        assert!(col_index < block.schema().len(), "column index out of range");
        assert_eq!(
            block.schema().column_type(col_index),
            column_type,
            "bound column type disagrees with the block schema"
        );
        let null_bitmap = block.null_rows(col_index).and_then(|nulls| {
            let remapped: RoaringBitmap = filter
                .positions()
                .iter()
                .enumerate()
                .filter(|&(_, &row)| nulls.contains(row))
                .map(|(out_pos, _)| out_pos as u32)
                .collect();
            (!remapped.is_empty()).then_some(remapped)
        });
        FilteredBlockValueSet {
            column_type,
            block,
            col_index,
            filter,
            null_bitmap,
        }
    }

    /// The bound filter.
    pub fn filter(&self) -> &RowIndexFilter {
        self.filter
    }
}

impl ValueSet for FilteredBlockValueSet<'_> {
    fn value_type(&self) -> ScalarType {
        self.column_type.scalar
    }

    fn is_single_value(&self) -> bool {
        !self.column_type.multi_value
    }

    fn null_bitmap(&self) -> Option<&RoaringBitmap> {
        self.null_bitmap.as_ref()
    }

    fn values(&self) -> Result<ColumnValues> {
        ColumnValues::decode(self.block, self.col_index, Some(self.filter))
    }

    fn num_mv_entries(&self) -> Result<Vec<i32>> {
        decoder::extract_num_mv_entries(self.block, self.col_index, Some(self.filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_rowblock::block::{CellValue, RowBlockBuilder};
    use trellis_rowblock::schema::{Field, Schema};

    fn block_with_nulls() -> RowBlock {
        let schema = Schema::new(vec![Field::new(
            "v",
            ColumnType::single(ScalarType::Int),
        )])
        .unwrap();
        let mut builder = RowBlockBuilder::new(schema);
        builder.push_row(&[CellValue::Int(10)]).unwrap();
        builder.push_row(&[CellValue::Null]).unwrap();
        builder.push_row(&[CellValue::Int(30)]).unwrap();
        builder.build()
    }

    #[test]
    fn test_null_bitmap_is_output_relative() {
        let block = block_with_nulls();
        let filter = RowIndexFilter::from_positions(vec![1, 0]);
        let vs =
            FilteredBlockValueSet::new(ColumnType::single(ScalarType::Int), &block, 0, &filter);
        let nulls = vs.null_bitmap().unwrap();
        assert!(nulls.contains(0));
        assert!(!nulls.contains(1));
    }

    #[test]
    fn test_null_bitmap_absent_when_no_visible_nulls() {
        let block = block_with_nulls();
        let filter = RowIndexFilter::from_positions(vec![2, 0]);
        let vs =
            FilteredBlockValueSet::new(ColumnType::single(ScalarType::Int), &block, 0, &filter);
        assert!(vs.null_bitmap().is_none());
    }

    #[test]
    fn test_metadata_invariant_under_filtering() {
        let block = block_with_nulls();
        let filter = RowIndexFilter::from_positions(vec![2]);
        let vs =
            FilteredBlockValueSet::new(ColumnType::single(ScalarType::Int), &block, 0, &filter);
        assert_eq!(vs.value_type(), ScalarType::Int);
        assert!(vs.is_single_value());
        assert!(vs.dictionary().is_none());
    }
}
