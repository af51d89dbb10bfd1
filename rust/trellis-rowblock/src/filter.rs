//! Ordered row-index filters.

use roaring::RoaringBitmap;

/// An ordered sequence of row positions selecting a subset of a block's rows.
///
/// The filter defines both which rows are visible and the order in which they
/// appear in the extracted output. Positions may repeat. Every position must
/// be below the row count of the block the filter is applied to; that is the
/// producer's obligation and is not re-validated at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndexFilter {
    positions: Vec<u32>,
}

impl RowIndexFilter {
    /// Creates a filter from an explicit position list.
    pub fn from_positions(positions: Vec<u32>) -> RowIndexFilter {
        RowIndexFilter { positions }
    }

    /// Creates a filter from a selection bitmap, in ascending row order.
    ///
    /// This is the common hand-off from predicate evaluation, which produces
    /// the surviving rows as a bitmap.
    pub fn from_selection(selection: &RoaringBitmap) -> RowIndexFilter {
        RowIndexFilter {
            positions: selection.iter().collect(),
        }
    }

    /// Number of selected positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The selected positions, in output order.
    #[inline]
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }
}

impl From<Vec<u32>> for RowIndexFilter {
    fn from(positions: Vec<u32>) -> Self {
        RowIndexFilter::from_positions(positions)
    }
}
