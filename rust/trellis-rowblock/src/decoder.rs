//! Filter-aware columnar extraction out of a row-encoded block.
//!
//! Each `extract_*` function walks one column of a [`RowBlock`] and
//! materializes it as a freshly allocated typed vector. With no filter the
//! output covers all rows in block order; with a [`RowIndexFilter`] it covers
//! exactly the filtered positions, in filter order. Extraction is total over
//! well-formed blocks: it either returns the complete vector or fails before
//! producing a partial one.
//!
//! Requesting a column under the wrong type is a caller bug (the dispatch
//! layer above selects the extraction function from the declared column
//! type), and panics rather than producing a typed error.

use bigdecimal::BigDecimal;
use trellis_common::{Result, error::Error};

use crate::{
    block::RowBlock,
    filter::RowIndexFilter,
    schema::{ColumnType, ScalarType},
};

/// Extracts a single-value INT column.
pub fn extract_int_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<i32>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::Int));
    fixed_sv(block, col_index, filter, |cell| {
        i32::from_le_bytes(cell.try_into().expect("int cell"))
    })
}

/// Extracts a single-value LONG column.
pub fn extract_long_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<i64>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::Long));
    fixed_sv(block, col_index, filter, |cell| {
        i64::from_le_bytes(cell.try_into().expect("long cell"))
    })
}

/// Extracts a single-value FLOAT column.
pub fn extract_float_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<f32>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::Float));
    fixed_sv(block, col_index, filter, |cell| {
        f32::from_le_bytes(cell.try_into().expect("float cell"))
    })
}

/// Extracts a single-value DOUBLE column.
pub fn extract_double_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<f64>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::Double));
    fixed_sv(block, col_index, filter, |cell| {
        f64::from_le_bytes(cell.try_into().expect("double cell"))
    })
}

/// Extracts a single-value DECIMAL column.
pub fn extract_decimal_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<BigDecimal>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::Decimal));
    var_sv(block, col_index, filter, decode_decimal)
}

/// Extracts a single-value STRING column.
pub fn extract_string_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<String>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::String));
    var_sv(block, col_index, filter, decode_string)
}

/// Extracts a single-value BYTES column.
pub fn extract_bytes_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<u8>>> {
    expect_column(block, col_index, ColumnType::single(ScalarType::Bytes));
    var_sv(block, col_index, filter, |bytes| Ok(bytes.to_vec()))
}

/// Extracts a multi-value INT column.
pub fn extract_int_multi_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<i32>>> {
    expect_column(block, col_index, ColumnType::multi(ScalarType::Int));
    fixed_mv(block, col_index, filter, 4, |chunk| {
        i32::from_le_bytes(chunk.try_into().expect("int element"))
    })
}

/// Extracts a multi-value LONG column.
pub fn extract_long_multi_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<i64>>> {
    expect_column(block, col_index, ColumnType::multi(ScalarType::Long));
    fixed_mv(block, col_index, filter, 8, |chunk| {
        i64::from_le_bytes(chunk.try_into().expect("long element"))
    })
}

/// Extracts a multi-value FLOAT column.
pub fn extract_float_multi_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<f32>>> {
    expect_column(block, col_index, ColumnType::multi(ScalarType::Float));
    fixed_mv(block, col_index, filter, 4, |chunk| {
        f32::from_le_bytes(chunk.try_into().expect("float element"))
    })
}

/// Extracts a multi-value DOUBLE column.
pub fn extract_double_multi_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<f64>>> {
    expect_column(block, col_index, ColumnType::multi(ScalarType::Double));
    fixed_mv(block, col_index, filter, 8, |chunk| {
        f64::from_le_bytes(chunk.try_into().expect("double element"))
    })
}

/// Extracts a multi-value DECIMAL column.
pub fn extract_decimal_multi_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<BigDecimal>>> {
    expect_column(block, col_index, ColumnType::multi(ScalarType::Decimal));
    var_mv(block, col_index, filter, decode_decimal)
}

/// Extracts a multi-value STRING column.
pub fn extract_string_multi_values(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<Vec<String>>> {
    expect_column(block, col_index, ColumnType::multi(ScalarType::String));
    var_mv(block, col_index, filter, decode_string)
}

/// Extracts the per-row entry count of a multi-value column without
/// materializing the entries themselves.
pub fn extract_num_mv_entries(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
) -> Result<Vec<i32>> {
    let column_type = block.schema().column_type(col_index);
    if !column_type.multi_value {
        return Err(Error::invalid_operation("num_mv_entries"));
    }
    collect_rows(block, filter, |row| {
        let (_, count) = read_ref(block.cell(row, col_index));
        Ok(count as i32)
    })
}

/// Applies `read` to every visible row: all rows in block order when there is
/// no filter, otherwise the filtered positions in filter order.
fn collect_rows<T>(
    block: &RowBlock,
    filter: Option<&RowIndexFilter>,
    mut read: impl FnMut(usize) -> Result<T>,
) -> Result<Vec<T>> {
    match filter {
        Some(filter) => filter
            .positions()
            .iter()
            .map(|&row| read(row as usize))
            .collect(),
        None => (0..block.row_count()).map(&mut read).collect(),
    }
}

fn fixed_sv<T>(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
    decode: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>> {
    collect_rows(block, filter, |row| Ok(decode(block.cell(row, col_index))))
}

fn fixed_mv<T>(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
    elem_size: usize,
    decode: impl Fn(&[u8]) -> T,
) -> Result<Vec<Vec<T>>> {
    collect_rows(block, filter, |row| {
        let (offset, count) = read_ref(block.cell(row, col_index));
        let bytes = block.var_slice(offset as usize, count as usize * elem_size)?;
        Ok(bytes.chunks_exact(elem_size).map(&decode).collect())
    })
}

fn var_sv<T>(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
    decode: impl Fn(&[u8]) -> Result<T>,
) -> Result<Vec<T>> {
    collect_rows(block, filter, |row| {
        let (offset, len) = read_ref(block.cell(row, col_index));
        decode(block.var_slice(offset as usize, len as usize)?)
    })
}

fn var_mv<T>(
    block: &RowBlock,
    col_index: usize,
    filter: Option<&RowIndexFilter>,
    decode: impl Fn(&[u8]) -> Result<T>,
) -> Result<Vec<Vec<T>>> {
    collect_rows(block, filter, |row| {
        let (offset, count) = read_ref(block.cell(row, col_index));
        let mut entries = Vec::with_capacity(count as usize);
        let mut cursor = offset as usize;
        for _ in 0..count {
            let len_bytes = block.var_slice(cursor, 4)?;
            let len = u32::from_le_bytes(len_bytes.try_into().expect("entry length")) as usize;
            entries.push(decode(block.var_slice(cursor + 4, len)?)?);
            cursor += 4 + len;
        }
        Ok(entries)
    })
}

/// Splits a `(offset, length-or-count)` reference cell.
fn read_ref(cell: &[u8]) -> (u32, u32) {
    let offset = u32::from_le_bytes(cell[0..4].try_into().expect("ref cell"));
    let len = u32::from_le_bytes(cell[4..8].try_into().expect("ref cell"));
    (offset, len)
}

fn decode_string(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::invalid_format("string value", "not valid UTF-8"))?;
    Ok(text.to_string())
}

fn decode_decimal(bytes: &[u8]) -> Result<BigDecimal> {
    // A zero-filled null cell has an empty payload.
    if bytes.is_empty() {
        return Ok(BigDecimal::from(0));
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::invalid_format("decimal value", "not valid UTF-8"))?;
    text.parse::<BigDecimal>()
        .map_err(|_| Error::invalid_format("decimal value", "unparsable decimal rendering"))
}

fn expect_column(block: &RowBlock, col_index: usize, expected: ColumnType) {
    let actual = block.schema().column_type(col_index);
    assert_eq!(
        actual, expected,
        "column {col_index} extraction requested as {expected:?}, declared as {actual:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{CellValue, RowBlockBuilder};
    use crate::schema::{Field, Schema};

    fn sample_block() -> RowBlock {
        let schema = Schema::new(vec![
            Field::new("id", ColumnType::single(ScalarType::Int)),
            Field::new("name", ColumnType::single(ScalarType::String)),
            Field::new("weights", ColumnType::multi(ScalarType::Double)),
        ])
        .unwrap();
        let mut builder = RowBlockBuilder::new(schema);
        builder
            .push_row(&[
                CellValue::Int(10),
                CellValue::String("alpha".into()),
                CellValue::DoubleList(vec![1.5, 2.5]),
            ])
            .unwrap();
        builder
            .push_row(&[
                CellValue::Null,
                CellValue::String("beta".into()),
                CellValue::DoubleList(vec![]),
            ])
            .unwrap();
        builder
            .push_row(&[
                CellValue::Int(30),
                CellValue::Null,
                CellValue::DoubleList(vec![-0.5]),
            ])
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_unfiltered_block_order() {
        let block = sample_block();
        assert_eq!(extract_int_values(&block, 0, None).unwrap(), vec![10, 0, 30]);
        assert_eq!(
            extract_string_values(&block, 1, None).unwrap(),
            vec!["alpha".to_string(), "beta".to_string(), String::new()]
        );
        assert_eq!(
            extract_double_multi_values(&block, 2, None).unwrap(),
            vec![vec![1.5, 2.5], vec![], vec![-0.5]]
        );
    }

    #[test]
    fn test_filtered_order_and_length() {
        let block = sample_block();
        let filter = RowIndexFilter::from_positions(vec![2, 0]);
        assert_eq!(
            extract_int_values(&block, 0, Some(&filter)).unwrap(),
            vec![30, 10]
        );
        assert_eq!(
            extract_double_multi_values(&block, 2, Some(&filter)).unwrap(),
            vec![vec![-0.5], vec![1.5, 2.5]]
        );
    }

    #[test]
    fn test_empty_filter() {
        let block = sample_block();
        let filter = RowIndexFilter::default();
        assert!(extract_int_values(&block, 0, Some(&filter)).unwrap().is_empty());
        assert!(
            extract_num_mv_entries(&block, 2, Some(&filter))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_duplicate_positions() {
        let block = sample_block();
        let filter = RowIndexFilter::from_positions(vec![0, 0, 2]);
        assert_eq!(
            extract_int_values(&block, 0, Some(&filter)).unwrap(),
            vec![10, 10, 30]
        );
    }

    #[test]
    fn test_num_mv_entries() {
        let block = sample_block();
        assert_eq!(
            extract_num_mv_entries(&block, 2, None).unwrap(),
            vec![2, 0, 1]
        );
        assert!(extract_num_mv_entries(&block, 0, None).is_err());
    }

    #[test]
    fn test_decimal_round_trip() {
        let schema = Schema::new(vec![Field::new(
            "price",
            ColumnType::single(ScalarType::Decimal),
        )])
        .unwrap();
        let mut builder = RowBlockBuilder::new(schema);
        builder
            .push_row(&[CellValue::Decimal("123.456".parse().unwrap())])
            .unwrap();
        builder.push_row(&[CellValue::Null]).unwrap();
        let block = builder.build();

        let values = extract_decimal_values(&block, 0, None).unwrap();
        assert_eq!(values[0], "123.456".parse::<BigDecimal>().unwrap());
        assert_eq!(values[1], BigDecimal::from(0));
    }

    #[test]
    #[should_panic(expected = "extraction requested as")]
    fn test_wrong_type_panics() {
        let block = sample_block();
        let _ = extract_long_values(&block, 0, None);
    }
}
