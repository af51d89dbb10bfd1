//! The row-encoded result block.

use bigdecimal::BigDecimal;
use roaring::RoaringBitmap;
use trellis_common::{Result, verify_arg, verify_data};

use crate::schema::{ColumnType, ScalarType, Schema};

/// An immutable, schema-tagged batch of rows in the inter-stage exchange
/// encoding.
///
/// Each row occupies a fixed-width strip in the `fixed` region, one cell per
/// column. Numeric single-value cells hold the little-endian value itself;
/// variable-size single-value cells (`Decimal`, `String`, `Bytes`) and all
/// multi-value cells hold a `(u32 offset, u32 length-or-count)` reference into
/// the shared `var` region.
///
/// Null rows are tracked per column as a bitmap of block-relative row
/// positions, independent of the cell payload; a null cell is zero-filled so
/// that decode never has to branch on null state.
///
/// A block is immutable once built and may safely back any number of
/// concurrently reading views.
#[derive(Debug, Clone)]
pub struct RowBlock {
    schema: Schema,
    row_count: usize,
    row_width: usize,
    cell_offsets: Vec<usize>,
    fixed: Vec<u8>,
    var: Vec<u8>,
    null_rows: Vec<Option<RoaringBitmap>>,
}

impl RowBlock {
    /// The column schema of this block.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows in this block.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the block-relative positions of null rows in the given column,
    /// or `None` if the column has no nulls.
    ///
    /// # Panics
    ///
    /// Panics if `col_index` is out of range.
    pub fn null_rows(&self, col_index: usize) -> Option<&RoaringBitmap> {
        self.null_rows[col_index].as_ref()
    }

    /// Raw cell bytes of `(row, col)`, exactly `cell_size` bytes long.
    #[inline]
    pub(crate) fn cell(&self, row: usize, col_index: usize) -> &[u8] {
        let start = row * self.row_width + self.cell_offsets[col_index];
        &self.fixed[start..start + self.schema.column_type(col_index).cell_size()]
    }

    /// A range of the variable region, validated against its bounds.
    pub(crate) fn var_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).unwrap_or(usize::MAX);
        verify_data!(var_region, end <= self.var.len());
        Ok(&self.var[offset..end])
    }
}

/// A dynamically typed cell handed to [`RowBlockBuilder::push_row`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
    String(String),
    Bytes(Vec<u8>),
    IntList(Vec<i32>),
    LongList(Vec<i64>),
    FloatList(Vec<f32>),
    DoubleList(Vec<f64>),
    DecimalList(Vec<BigDecimal>),
    StringList(Vec<String>),
}

impl CellValue {
    /// Returns `true` if this cell may be stored in a column of the given
    /// type. `Null` is storable in any column.
    pub fn matches(&self, column_type: ColumnType) -> bool {
        use ScalarType::*;
        let expected = match self {
            CellValue::Null => return true,
            CellValue::Int(_) => ColumnType::single(Int),
            CellValue::Long(_) => ColumnType::single(Long),
            CellValue::Float(_) => ColumnType::single(Float),
            CellValue::Double(_) => ColumnType::single(Double),
            CellValue::Decimal(_) => ColumnType::single(Decimal),
            CellValue::String(_) => ColumnType::single(String),
            CellValue::Bytes(_) => ColumnType::single(Bytes),
            CellValue::IntList(_) => ColumnType::multi(Int),
            CellValue::LongList(_) => ColumnType::multi(Long),
            CellValue::FloatList(_) => ColumnType::multi(Float),
            CellValue::DoubleList(_) => ColumnType::multi(Double),
            CellValue::DecimalList(_) => ColumnType::multi(Decimal),
            CellValue::StringList(_) => ColumnType::multi(String),
        };
        expected == column_type
    }

    /// Bytes this cell will append to the block's variable region, including
    /// the length prefixes of variable-size list entries.
    pub(crate) fn var_bytes(&self) -> usize {
        match self {
            CellValue::Null
            | CellValue::Int(_)
            | CellValue::Long(_)
            | CellValue::Float(_)
            | CellValue::Double(_) => 0,
            CellValue::Decimal(v) => v.to_string().len(),
            CellValue::String(v) => v.len(),
            CellValue::Bytes(v) => v.len(),
            CellValue::IntList(vs) => vs.len() * 4,
            CellValue::LongList(vs) => vs.len() * 8,
            CellValue::FloatList(vs) => vs.len() * 4,
            CellValue::DoubleList(vs) => vs.len() * 8,
            CellValue::DecimalList(vs) => vs.iter().map(|v| 4 + v.to_string().len()).sum(),
            CellValue::StringList(vs) => vs.iter().map(|v| 4 + v.len()).sum(),
        }
    }
}

/// The variable region is addressed by `u32` offsets; a row may not grow it
/// past that range.
fn var_capacity_ok(current: usize, additional: usize) -> bool {
    current
        .checked_add(additional)
        .is_some_and(|end| end <= u32::MAX as usize)
}

/// Builds a [`RowBlock`] row by row.
///
/// A row that fails validation leaves the builder unchanged.
pub struct RowBlockBuilder {
    schema: Schema,
    row_width: usize,
    cell_offsets: Vec<usize>,
    fixed: Vec<u8>,
    var: Vec<u8>,
    nulls: Vec<RoaringBitmap>,
    row_count: usize,
}

impl RowBlockBuilder {
    pub fn new(schema: Schema) -> RowBlockBuilder {
        let mut cell_offsets = Vec::with_capacity(schema.len());
        let mut row_width = 0;
        for field in schema.fields() {
            cell_offsets.push(row_width);
            row_width += field.column_type().cell_size();
        }
        let nulls = vec![RoaringBitmap::new(); schema.len()];
        RowBlockBuilder {
            schema,
            row_width,
            cell_offsets,
            fixed: Vec::new(),
            var: Vec::new(),
            nulls,
            row_count: 0,
        }
    }

    /// Number of rows appended so far.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Appends one row, validating it against the schema first.
    pub fn push_row(&mut self, row: &[CellValue]) -> Result<()> {
        verify_arg!(row, row.len() == self.schema.len());
        for (col_index, cell) in row.iter().enumerate() {
            verify_arg!(cell, cell.matches(self.schema.column_type(col_index)));
        }
        let var_growth: usize = row.iter().map(CellValue::var_bytes).sum();
        verify_arg!(var_region, var_capacity_ok(self.var.len(), var_growth));
        for (col_index, cell) in row.iter().enumerate() {
            self.write_cell(col_index, cell);
        }
        self.row_count += 1;
        Ok(())
    }

    /// Consumes the builder and returns the finished block.
    pub fn build(self) -> RowBlock {
        RowBlock {
            schema: self.schema,
            row_count: self.row_count,
            row_width: self.row_width,
            cell_offsets: self.cell_offsets,
            fixed: self.fixed,
            var: self.var,
            null_rows: self
                .nulls
                .into_iter()
                .map(|bitmap| (!bitmap.is_empty()).then_some(bitmap))
                .collect(),
        }
    }

    fn write_cell(&mut self, col_index: usize, cell: &CellValue) {
        match cell {
            CellValue::Null => {
                self.nulls[col_index].insert(self.row_count as u32);
                let cell_size = self.schema.column_type(col_index).cell_size();
                self.fixed.resize(self.fixed.len() + cell_size, 0);
            }
            CellValue::Int(v) => self.fixed.extend_from_slice(&v.to_le_bytes()),
            CellValue::Long(v) => self.fixed.extend_from_slice(&v.to_le_bytes()),
            CellValue::Float(v) => self.fixed.extend_from_slice(&v.to_le_bytes()),
            CellValue::Double(v) => self.fixed.extend_from_slice(&v.to_le_bytes()),
            CellValue::Decimal(v) => self.write_var_cell(v.to_string().as_bytes()),
            CellValue::String(v) => self.write_var_cell(v.as_bytes()),
            CellValue::Bytes(v) => self.write_var_cell(v),
            CellValue::IntList(vs) => {
                let offset = self.var.len() as u32;
                for v in vs {
                    self.var.extend_from_slice(&v.to_le_bytes());
                }
                self.write_ref_cell(offset, vs.len() as u32);
            }
            CellValue::LongList(vs) => {
                let offset = self.var.len() as u32;
                for v in vs {
                    self.var.extend_from_slice(&v.to_le_bytes());
                }
                self.write_ref_cell(offset, vs.len() as u32);
            }
            CellValue::FloatList(vs) => {
                let offset = self.var.len() as u32;
                for v in vs {
                    self.var.extend_from_slice(&v.to_le_bytes());
                }
                self.write_ref_cell(offset, vs.len() as u32);
            }
            CellValue::DoubleList(vs) => {
                let offset = self.var.len() as u32;
                for v in vs {
                    self.var.extend_from_slice(&v.to_le_bytes());
                }
                self.write_ref_cell(offset, vs.len() as u32);
            }
            CellValue::DecimalList(vs) => {
                let offset = self.var.len() as u32;
                for v in vs {
                    self.write_var_entry(v.to_string().as_bytes());
                }
                self.write_ref_cell(offset, vs.len() as u32);
            }
            CellValue::StringList(vs) => {
                let offset = self.var.len() as u32;
                for v in vs {
                    self.write_var_entry(v.as_bytes());
                }
                self.write_ref_cell(offset, vs.len() as u32);
            }
        }
    }

    /// Writes a variable-size single value: payload into the variable region,
    /// `(offset, byte length)` into the row strip.
    fn write_var_cell(&mut self, bytes: &[u8]) {
        let offset = self.var.len() as u32;
        self.var.extend_from_slice(bytes);
        self.write_ref_cell(offset, bytes.len() as u32);
    }

    /// Writes one length-prefixed entry of a variable-size multi-value list.
    fn write_var_entry(&mut self, bytes: &[u8]) {
        self.var.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        self.var.extend_from_slice(bytes);
    }

    fn write_ref_cell(&mut self, offset: u32, len: u32) {
        self.fixed.extend_from_slice(&offset.to_le_bytes());
        self.fixed.extend_from_slice(&len.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn two_column_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", ColumnType::single(ScalarType::Int)),
            Field::new("tags", ColumnType::multi(ScalarType::String)),
        ])
        .unwrap()
    }

    #[test]
    fn test_push_row_arity_mismatch() {
        let mut builder = RowBlockBuilder::new(two_column_schema());
        let result = builder.push_row(&[CellValue::Int(1)]);
        assert!(result.is_err());
        assert_eq!(builder.row_count(), 0);
    }

    #[test]
    fn test_push_row_type_mismatch() {
        let mut builder = RowBlockBuilder::new(two_column_schema());
        let result = builder.push_row(&[
            CellValue::Long(1),
            CellValue::StringList(vec!["a".to_string()]),
        ]);
        assert!(result.is_err());
        assert_eq!(builder.row_count(), 0);
    }

    #[test]
    fn test_null_tracking_per_column() {
        let mut builder = RowBlockBuilder::new(two_column_schema());
        builder
            .push_row(&[CellValue::Int(1), CellValue::StringList(vec![])])
            .unwrap();
        builder
            .push_row(&[CellValue::Null, CellValue::StringList(vec!["x".into()])])
            .unwrap();
        builder
            .push_row(&[CellValue::Int(3), CellValue::Null])
            .unwrap();
        let block = builder.build();

        assert_eq!(block.row_count(), 3);
        let id_nulls = block.null_rows(0).unwrap();
        assert!(id_nulls.contains(1));
        assert_eq!(id_nulls.len(), 1);
        let tag_nulls = block.null_rows(1).unwrap();
        assert!(tag_nulls.contains(2));
        assert_eq!(tag_nulls.len(), 1);
    }

    #[test]
    fn test_no_nulls_is_absent() {
        let mut builder = RowBlockBuilder::new(two_column_schema());
        builder
            .push_row(&[CellValue::Int(1), CellValue::StringList(vec![])])
            .unwrap();
        let block = builder.build();
        assert!(block.null_rows(0).is_none());
        assert!(block.null_rows(1).is_none());
    }

    #[test]
    fn test_var_region_growth_accounting() {
        assert_eq!(CellValue::Null.var_bytes(), 0);
        assert_eq!(CellValue::Int(7).var_bytes(), 0);
        assert_eq!(CellValue::Double(1.5).var_bytes(), 0);
        assert_eq!(CellValue::String("abc".into()).var_bytes(), 3);
        assert_eq!(CellValue::Bytes(vec![1, 2]).var_bytes(), 2);
        assert_eq!(CellValue::Decimal("12.5".parse().unwrap()).var_bytes(), 4);
        assert_eq!(CellValue::IntList(vec![1, 2, 3]).var_bytes(), 12);
        assert_eq!(CellValue::LongList(vec![1]).var_bytes(), 8);
        assert_eq!(
            CellValue::StringList(vec!["ab".into(), "c".into()]).var_bytes(),
            11
        );
    }

    #[test]
    fn test_var_region_capacity_bounds() {
        // The guard must account for the row being written, not just the
        // bytes already present.
        assert!(var_capacity_ok(0, u32::MAX as usize));
        assert!(!var_capacity_ok(1, u32::MAX as usize));
        assert!(var_capacity_ok(u32::MAX as usize, 0));
        assert!(!var_capacity_ok(u32::MAX as usize, 1));
        assert!(!var_capacity_ok(usize::MAX, 1));
    }

    #[test]
    fn test_empty_block() {
        let block = RowBlockBuilder::new(two_column_schema()).build();
        assert_eq!(block.row_count(), 0);
        assert!(block.null_rows(0).is_none());
    }
}
