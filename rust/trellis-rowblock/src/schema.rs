//! Column schema of a row-encoded block.

use trellis_common::{Result, verify_arg};

/// Physical scalar type of a column, independent of its single-value or
/// multi-value cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Arbitrary-precision decimal.
    Decimal,
    /// UTF-8 string.
    String,
    /// Raw byte sequence.
    Bytes,
}

impl ScalarType {
    /// Returns the in-row cell size of a single-value cell of this type in
    /// bytes, or `None` if the value is variable-size and the cell holds a
    /// `(offset, length)` reference into the block's variable region instead.
    pub fn fixed_cell_size(&self) -> Option<usize> {
        match self {
            ScalarType::Int => Some(4),
            ScalarType::Long => Some(8),
            ScalarType::Float => Some(4),
            ScalarType::Double => Some(8),
            ScalarType::Decimal | ScalarType::String | ScalarType::Bytes => None,
        }
    }

    /// Returns `true` if values of this type are stored out-of-row, in the
    /// block's variable region.
    pub fn is_variable_size(&self) -> bool {
        self.fixed_cell_size().is_none()
    }
}

/// Logical type of a column: a physical scalar plus the single/multi-value
/// cardinality modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnType {
    /// The underlying physical scalar type.
    pub scalar: ScalarType,
    /// `true` if every row holds a list of scalars rather than a single one.
    pub multi_value: bool,
}

impl ColumnType {
    /// A single-value column of the given scalar type.
    pub fn single(scalar: ScalarType) -> ColumnType {
        ColumnType {
            scalar,
            multi_value: false,
        }
    }

    /// A multi-value column of the given scalar type.
    pub fn multi(scalar: ScalarType) -> ColumnType {
        ColumnType {
            scalar,
            multi_value: true,
        }
    }

    /// Size in bytes of this column's cell within a row strip.
    ///
    /// Multi-value cells and variable-size single-value cells are a
    /// `(u32 offset, u32 length)` pair referencing the variable region.
    pub fn cell_size(&self) -> usize {
        if self.multi_value {
            8
        } else {
            self.scalar.fixed_cell_size().unwrap_or(8)
        }
    }
}

/// A named column within a block schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    column_type: ColumnType,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Field {
        Field {
            name: name.into(),
            column_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

/// Ordered list of columns carried by a [`crate::block::RowBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema from an ordered field list.
    ///
    /// Multi-value byte-array columns are rejected: the exchange format has
    /// no encoding for them and no stage operator produces them.
    pub fn new(fields: Vec<Field>) -> Result<Schema> {
        for field in &fields {
            verify_arg!(
                field,
                field.column_type() != ColumnType::multi(ScalarType::Bytes)
            );
        }
        Ok(Schema { fields })
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at `col_index`.
    ///
    /// # Panics
    ///
    /// Panics if `col_index` is out of range.
    pub fn field(&self, col_index: usize) -> &Field {
        &self.fields[col_index]
    }

    /// Returns the logical type of the column at `col_index`.
    ///
    /// # Panics
    ///
    /// Panics if `col_index` is out of range.
    pub fn column_type(&self, col_index: usize) -> ColumnType {
        self.fields[col_index].column_type()
    }

    /// Returns the index of the column with the given name, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_sizes() {
        assert_eq!(ColumnType::single(ScalarType::Int).cell_size(), 4);
        assert_eq!(ColumnType::single(ScalarType::Long).cell_size(), 8);
        assert_eq!(ColumnType::single(ScalarType::Float).cell_size(), 4);
        assert_eq!(ColumnType::single(ScalarType::Double).cell_size(), 8);
        assert_eq!(ColumnType::single(ScalarType::String).cell_size(), 8);
        assert_eq!(ColumnType::multi(ScalarType::Int).cell_size(), 8);
        assert_eq!(ColumnType::multi(ScalarType::String).cell_size(), 8);
    }

    #[test]
    fn test_schema_rejects_bytes_mv() {
        let result = Schema::new(vec![Field::new(
            "payloads",
            ColumnType::multi(ScalarType::Bytes),
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::new(vec![
            Field::new("a", ColumnType::single(ScalarType::Int)),
            Field::new("b", ColumnType::multi(ScalarType::String)),
        ])
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("b"), Some(1));
        assert_eq!(schema.position("c"), None);
        assert_eq!(
            schema.column_type(1),
            ColumnType::multi(ScalarType::String)
        );
    }
}
