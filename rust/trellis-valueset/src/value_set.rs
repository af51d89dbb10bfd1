//! The per-column read view and its capability set.

use bigdecimal::BigDecimal;
use roaring::RoaringBitmap;
use trellis_common::{Result, error::Error};
use trellis_rowblock::{
    block::RowBlock,
    decoder,
    schema::{ColumnType, ScalarType},
};

use crate::column_values::ColumnValues;

/// Handle to a dictionary backing a dictionary-encoded column.
///
/// The row-block bridge never carries dictionary-encoded data, so this type
/// is uninhabited: [`ValueSet::dictionary`] can only ever report absence. It
/// exists so the capability set lines up with the engine's other value-set
/// implementations.
#[derive(Debug, Clone, Copy)]
pub enum Dictionary {}

/// Uniform capability set of a per-column, per-block read view.
///
/// A consumer dispatches on [`value_type`](ValueSet::value_type) and
/// [`is_single_value`](ValueSet::is_single_value) and then calls exactly one
/// matching typed accessor. Calling an accessor of the wrong type or
/// cardinality is a programming error in the dispatch layer and panics; the
/// permanently unsupported accessors (`dictionary_ids_sv`,
/// `dictionary_ids_mv`, `bytes_values_mv`) instead fail deterministically
/// with an unsupported-operation error, filtered or not.
///
/// Every typed accessor decodes eagerly into a freshly allocated vector sized
/// to the number of visible rows; the view itself owns no value storage and
/// leaves the bound block untouched.
pub trait ValueSet {
    /// The physical scalar type backing the column, independent of
    /// single/multi-value cardinality.
    fn value_type(&self) -> ScalarType;

    fn is_single_value(&self) -> bool;

    /// Null positions of the current view, or `None` when the view has no
    /// nulls. For a filtered view the positions are relative to the filtered
    /// output, not to the underlying block.
    fn null_bitmap(&self) -> Option<&RoaringBitmap>;

    /// Always `None` on this code path.
    fn dictionary(&self) -> Option<&Dictionary> {
        None
    }

    /// Decodes the bound column into the variant matching its declared type.
    fn values(&self) -> Result<ColumnValues>;

    /// Per-row entry count of a multi-value column.
    fn num_mv_entries(&self) -> Result<Vec<i32>>;

    fn int_values_sv(&self) -> Result<Vec<i32>> {
        Ok(self.values()?.into_int_sv())
    }

    fn long_values_sv(&self) -> Result<Vec<i64>> {
        Ok(self.values()?.into_long_sv())
    }

    fn float_values_sv(&self) -> Result<Vec<f32>> {
        Ok(self.values()?.into_float_sv())
    }

    fn double_values_sv(&self) -> Result<Vec<f64>> {
        Ok(self.values()?.into_double_sv())
    }

    fn decimal_values_sv(&self) -> Result<Vec<BigDecimal>> {
        Ok(self.values()?.into_decimal_sv())
    }

    fn string_values_sv(&self) -> Result<Vec<String>> {
        Ok(self.values()?.into_string_sv())
    }

    fn bytes_values_sv(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self.values()?.into_bytes_sv())
    }

    fn int_values_mv(&self) -> Result<Vec<Vec<i32>>> {
        Ok(self.values()?.into_int_mv())
    }

    fn long_values_mv(&self) -> Result<Vec<Vec<i64>>> {
        Ok(self.values()?.into_long_mv())
    }

    fn float_values_mv(&self) -> Result<Vec<Vec<f32>>> {
        Ok(self.values()?.into_float_mv())
    }

    fn double_values_mv(&self) -> Result<Vec<Vec<f64>>> {
        Ok(self.values()?.into_double_mv())
    }

    fn decimal_values_mv(&self) -> Result<Vec<Vec<BigDecimal>>> {
        Ok(self.values()?.into_decimal_mv())
    }

    fn string_values_mv(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.values()?.into_string_mv())
    }

    fn dictionary_ids_sv(&self) -> Result<Vec<i32>> {
        Err(Error::unsupported_operation("dictionary_ids_sv"))
    }

    fn dictionary_ids_mv(&self) -> Result<Vec<Vec<i32>>> {
        Err(Error::unsupported_operation("dictionary_ids_mv"))
    }

    fn bytes_values_mv(&self) -> Result<Vec<Vec<Vec<u8>>>> {
        Err(Error::unsupported_operation("bytes_values_mv"))
    }
}

/// Read view over all rows of one column of a [`RowBlock`].
///
/// Ephemeral: constructed per column-access request and discarded after the
/// single accessor call.
pub struct BlockValueSet<'a> {
    column_type: ColumnType,
    block: &'a RowBlock,
    col_index: usize,
}

impl<'a> BlockValueSet<'a> {
    /// Binds to `col_index` of `block`.
    ///
    /// # Panics
    ///
    /// Panics if `col_index` is out of range or `column_type` disagrees with
    /// the schema's declared type for that column.
    pub fn new(column_type: ColumnType, block: &'a RowBlock, col_index: usize) -> Self {
        assert!(col_index < block.schema().len(), "column index out of range");
        assert_eq!(
            block.schema().column_type(col_index),
            column_type,
            "bound column type disagrees with the block schema"
        );
        BlockValueSet {
            column_type,
            block,
            col_index,
        }
    }
}

impl ValueSet for BlockValueSet<'_> {
    fn value_type(&self) -> ScalarType {
        self.column_type.scalar
    }

    fn is_single_value(&self) -> bool {
        !self.column_type.multi_value
    }

    fn null_bitmap(&self) -> Option<&RoaringBitmap> {
        self.block.null_rows(self.col_index)
    }

    fn values(&self) -> Result<ColumnValues> {
        ColumnValues::decode(self.block, self.col_index, None)
    }

    fn num_mv_entries(&self) -> Result<Vec<i32>> {
        decoder::extract_num_mv_entries(self.block, self.col_index, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_rowblock::block::{CellValue, RowBlockBuilder};
    use trellis_rowblock::schema::{Field, Schema};

    fn int_block() -> RowBlock {
        let schema = Schema::new(vec![Field::new(
            "v",
            ColumnType::single(ScalarType::Int),
        )])
        .unwrap();
        let mut builder = RowBlockBuilder::new(schema);
        builder.push_row(&[CellValue::Int(1)]).unwrap();
        builder.push_row(&[CellValue::Null]).unwrap();
        builder.build()
    }

    #[test]
    fn test_binding_metadata() {
        let block = int_block();
        let vs = BlockValueSet::new(ColumnType::single(ScalarType::Int), &block, 0);
        assert_eq!(vs.value_type(), ScalarType::Int);
        assert!(vs.is_single_value());
        assert!(vs.dictionary().is_none());
        let nulls = vs.null_bitmap().unwrap();
        assert!(nulls.contains(1));
    }

    #[test]
    #[should_panic(expected = "disagrees with the block schema")]
    fn test_mismatched_binding_panics() {
        let block = int_block();
        let _ = BlockValueSet::new(ColumnType::single(ScalarType::Long), &block, 0);
    }

    #[test]
    fn test_unsupported_accessors() {
        let block = int_block();
        let vs = BlockValueSet::new(ColumnType::single(ScalarType::Int), &block, 0);
        assert!(vs.dictionary_ids_sv().is_err());
        assert!(vs.dictionary_ids_mv().is_err());
        assert!(vs.bytes_values_mv().is_err());
    }
}
