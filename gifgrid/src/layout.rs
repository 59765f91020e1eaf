use alloc::vec::Vec;

use crate::LayoutOptions;

/// Number of columns that fit a container `width`.
///
/// `clamp(floor((width + gap) / (min_column_width + gap)), 1, max_columns)`. With no gap this is
/// `floor(width / min_column_width)`. An unmeasured container (`width == 0`) yields one column.
pub fn column_count(width: u32, options: &LayoutOptions) -> usize {
    let max = options.max_columns.max(1);
    let min_column = options.min_column_width_for(width);
    if width == 0 {
        return 1;
    }
    if min_column == 0 {
        return max;
    }
    let gap = options.gap as u64;
    let fit = (width as u64 + gap) / (min_column as u64 + gap);
    (fit as usize).clamp(1, max)
}

/// Distributes `items` round-robin into `columns` buckets: bucket `i` receives the items at
/// positions `i, i + columns, i + 2 * columns, ...`, in order.
pub fn assign_columns<T>(items: impl IntoIterator<Item = T>, columns: usize) -> Vec<Vec<T>> {
    let columns = columns.max(1);
    let mut out: Vec<Vec<T>> = (0..columns).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        out[i % columns].push(item);
    }
    out
}

/// Column-balanced layout driven by the measured container width.
///
/// Assignment is by absolute index, so appending items never moves an already placed item to a
/// different column. Only a column-count change reshuffles.
#[derive(Clone, Debug)]
pub struct ColumnLayout {
    options: LayoutOptions,
    width: u32,
    columns: usize,
}

impl ColumnLayout {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            columns: column_count(0, &options),
            options,
            width: 0,
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) -> bool {
        self.options = options;
        self.recompute()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Applies a new container width. Returns `true` when the column count changed.
    pub fn set_width(&mut self, width: u32) -> bool {
        if self.width == width {
            return false;
        }
        self.width = width;
        self.recompute()
    }

    fn recompute(&mut self) -> bool {
        let next = column_count(self.width, &self.options);
        if next == self.columns {
            return false;
        }
        gtrace!(
            width = self.width,
            from = self.columns,
            to = next,
            "ColumnLayout: column count changed"
        );
        self.columns = next;
        true
    }

    /// Pixel width of one column (gaps excluded).
    pub fn column_width(&self) -> u32 {
        let gaps = self.options.gap.saturating_mul(self.columns.saturating_sub(1) as u32);
        self.width.saturating_sub(gaps) / self.columns as u32
    }

    pub fn column_of(&self, index: usize) -> usize {
        index % self.columns
    }

    /// Visits the items of one column, in order.
    pub fn for_each_in_column<'a, T>(
        &self,
        items: &'a [T],
        column: usize,
        mut f: impl FnMut(&'a T),
    ) {
        if column >= self.columns {
            return;
        }
        for item in items.iter().skip(column).step_by(self.columns) {
            f(item);
        }
    }

    pub fn assign<'a, T>(&self, items: &'a [T]) -> Vec<Vec<&'a T>> {
        assign_columns(items, self.columns)
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

/// What [`ColumnBuckets::sync`] had to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnSync {
    Unchanged,
    /// Only new indexes were pushed onto the existing buckets.
    Appended(usize),
    /// The column count changed or the list shrank; buckets were rebuilt.
    Rebuilt,
}

/// Incrementally maintained round-robin assignment of item indexes to columns.
///
/// Adapters that keep per-column render state can use the returned [`ColumnSync`] to avoid
/// touching columns that did not change.
#[derive(Clone, Debug, Default)]
pub struct ColumnBuckets {
    len: usize,
    buckets: Vec<Vec<usize>>,
}

impl ColumnBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, column: usize) -> &[usize] {
        self.buckets.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn buckets(&self) -> &[Vec<usize>] {
        &self.buckets
    }

    pub fn sync(&mut self, len: usize, columns: usize) -> ColumnSync {
        let columns = columns.max(1);
        if columns != self.buckets.len() || len < self.len {
            self.buckets = assign_columns(0..len, columns);
            self.len = len;
            return ColumnSync::Rebuilt;
        }
        if len == self.len {
            return ColumnSync::Unchanged;
        }
        let added = len - self.len;
        for i in self.len..len {
            self.buckets[i % columns].push(i);
        }
        self.len = len;
        ColumnSync::Appended(added)
    }
}
