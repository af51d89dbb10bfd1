//! The tagged union of extracted column shapes.

use bigdecimal::BigDecimal;
use trellis_common::Result;
use trellis_rowblock::{
    block::RowBlock,
    decoder,
    filter::RowIndexFilter,
    schema::{ColumnType, ScalarType},
};

/// A fully materialized column, one variant per supported
/// (scalar type, cardinality) shape.
///
/// There is no `BytesMv` variant: multi-value byte-array columns are rejected
/// at schema construction and never reach extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    IntSv(Vec<i32>),
    LongSv(Vec<i64>),
    FloatSv(Vec<f32>),
    DoubleSv(Vec<f64>),
    DecimalSv(Vec<BigDecimal>),
    StringSv(Vec<String>),
    BytesSv(Vec<Vec<u8>>),
    IntMv(Vec<Vec<i32>>),
    LongMv(Vec<Vec<i64>>),
    FloatMv(Vec<Vec<f32>>),
    DoubleMv(Vec<Vec<f64>>),
    DecimalMv(Vec<Vec<BigDecimal>>),
    StringMv(Vec<Vec<String>>),
}

impl ColumnValues {
    /// Decodes one column of a block into the variant matching its declared
    /// type, optionally restricted and reordered by `filter`.
    ///
    /// This is the single extraction entry point; the typed `into_*`
    /// unwrappers below give consumers the concrete vector.
    ///
    /// # Panics
    ///
    /// Panics if `col_index` is out of range for the block's schema.
    pub fn decode(
        block: &RowBlock,
        col_index: usize,
        filter: Option<&RowIndexFilter>,
    ) -> Result<ColumnValues> {
        let column_type = block.schema().column_type(col_index);
        let values = match (column_type.scalar, column_type.multi_value) {
            (ScalarType::Int, false) => {
                ColumnValues::IntSv(decoder::extract_int_values(block, col_index, filter)?)
            }
            (ScalarType::Long, false) => {
                ColumnValues::LongSv(decoder::extract_long_values(block, col_index, filter)?)
            }
            (ScalarType::Float, false) => {
                ColumnValues::FloatSv(decoder::extract_float_values(block, col_index, filter)?)
            }
            (ScalarType::Double, false) => {
                ColumnValues::DoubleSv(decoder::extract_double_values(block, col_index, filter)?)
            }
            (ScalarType::Decimal, false) => {
                ColumnValues::DecimalSv(decoder::extract_decimal_values(block, col_index, filter)?)
            }
            (ScalarType::String, false) => {
                ColumnValues::StringSv(decoder::extract_string_values(block, col_index, filter)?)
            }
            (ScalarType::Bytes, false) => {
                ColumnValues::BytesSv(decoder::extract_bytes_values(block, col_index, filter)?)
            }
            (ScalarType::Int, true) => {
                ColumnValues::IntMv(decoder::extract_int_multi_values(block, col_index, filter)?)
            }
            (ScalarType::Long, true) => {
                ColumnValues::LongMv(decoder::extract_long_multi_values(block, col_index, filter)?)
            }
            (ScalarType::Float, true) => ColumnValues::FloatMv(decoder::extract_float_multi_values(
                block, col_index, filter,
            )?),
            (ScalarType::Double, true) => ColumnValues::DoubleMv(
                decoder::extract_double_multi_values(block, col_index, filter)?,
            ),
            (ScalarType::Decimal, true) => ColumnValues::DecimalMv(
                decoder::extract_decimal_multi_values(block, col_index, filter)?,
            ),
            (ScalarType::String, true) => ColumnValues::StringMv(
                decoder::extract_string_multi_values(block, col_index, filter)?,
            ),
            (ScalarType::Bytes, true) => {
                unreachable!("multi-value bytes columns are rejected at schema construction")
            }
        };
        Ok(values)
    }

    /// Number of rows in the extracted column.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::IntSv(v) => v.len(),
            ColumnValues::LongSv(v) => v.len(),
            ColumnValues::FloatSv(v) => v.len(),
            ColumnValues::DoubleSv(v) => v.len(),
            ColumnValues::DecimalSv(v) => v.len(),
            ColumnValues::StringSv(v) => v.len(),
            ColumnValues::BytesSv(v) => v.len(),
            ColumnValues::IntMv(v) => v.len(),
            ColumnValues::LongMv(v) => v.len(),
            ColumnValues::FloatMv(v) => v.len(),
            ColumnValues::DoubleMv(v) => v.len(),
            ColumnValues::DecimalMv(v) => v.len(),
            ColumnValues::StringMv(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The physical scalar type of the values, independent of cardinality.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ColumnValues::IntSv(_) | ColumnValues::IntMv(_) => ScalarType::Int,
            ColumnValues::LongSv(_) | ColumnValues::LongMv(_) => ScalarType::Long,
            ColumnValues::FloatSv(_) | ColumnValues::FloatMv(_) => ScalarType::Float,
            ColumnValues::DoubleSv(_) | ColumnValues::DoubleMv(_) => ScalarType::Double,
            ColumnValues::DecimalSv(_) | ColumnValues::DecimalMv(_) => ScalarType::Decimal,
            ColumnValues::StringSv(_) | ColumnValues::StringMv(_) => ScalarType::String,
            ColumnValues::BytesSv(_) => ScalarType::Bytes,
        }
    }

    pub fn is_single_value(&self) -> bool {
        matches!(
            self,
            ColumnValues::IntSv(_)
                | ColumnValues::LongSv(_)
                | ColumnValues::FloatSv(_)
                | ColumnValues::DoubleSv(_)
                | ColumnValues::DecimalSv(_)
                | ColumnValues::StringSv(_)
                | ColumnValues::BytesSv(_)
        )
    }

    /// The (scalar, cardinality) shape of this column.
    pub fn shape(&self) -> ColumnType {
        ColumnType {
            scalar: self.scalar_type(),
            multi_value: !self.is_single_value(),
        }
    }

    pub fn into_int_sv(self) -> Vec<i32> {
        match self {
            ColumnValues::IntSv(v) => v,
            other => other.mismatch("int_values_sv"),
        }
    }

    pub fn into_long_sv(self) -> Vec<i64> {
        match self {
            ColumnValues::LongSv(v) => v,
            other => other.mismatch("long_values_sv"),
        }
    }

    pub fn into_float_sv(self) -> Vec<f32> {
        match self {
            ColumnValues::FloatSv(v) => v,
            other => other.mismatch("float_values_sv"),
        }
    }

    pub fn into_double_sv(self) -> Vec<f64> {
        match self {
            ColumnValues::DoubleSv(v) => v,
            other => other.mismatch("double_values_sv"),
        }
    }

    pub fn into_decimal_sv(self) -> Vec<BigDecimal> {
        match self {
            ColumnValues::DecimalSv(v) => v,
            other => other.mismatch("decimal_values_sv"),
        }
    }

    pub fn into_string_sv(self) -> Vec<String> {
        match self {
            ColumnValues::StringSv(v) => v,
            other => other.mismatch("string_values_sv"),
        }
    }

    pub fn into_bytes_sv(self) -> Vec<Vec<u8>> {
        match self {
            ColumnValues::BytesSv(v) => v,
            other => other.mismatch("bytes_values_sv"),
        }
    }

    pub fn into_int_mv(self) -> Vec<Vec<i32>> {
        match self {
            ColumnValues::IntMv(v) => v,
            other => other.mismatch("int_values_mv"),
        }
    }

    pub fn into_long_mv(self) -> Vec<Vec<i64>> {
        match self {
            ColumnValues::LongMv(v) => v,
            other => other.mismatch("long_values_mv"),
        }
    }

    pub fn into_float_mv(self) -> Vec<Vec<f32>> {
        match self {
            ColumnValues::FloatMv(v) => v,
            other => other.mismatch("float_values_mv"),
        }
    }

    pub fn into_double_mv(self) -> Vec<Vec<f64>> {
        match self {
            ColumnValues::DoubleMv(v) => v,
            other => other.mismatch("double_values_mv"),
        }
    }

    pub fn into_decimal_mv(self) -> Vec<Vec<BigDecimal>> {
        match self {
            ColumnValues::DecimalMv(v) => v,
            other => other.mismatch("decimal_values_mv"),
        }
    }

    pub fn into_string_mv(self) -> Vec<Vec<String>> {
        match self {
            ColumnValues::StringMv(v) => v,
            other => other.mismatch("string_values_mv"),
        }
    }

    /// Typed accessors must agree with the column's declared type; a mismatch
    /// is a bug in the dispatch layer above, not a runtime condition.
    fn mismatch(&self, accessor: &str) -> ! {
        panic!("{accessor} called on {:?} column values", self.shape())
    }
}
