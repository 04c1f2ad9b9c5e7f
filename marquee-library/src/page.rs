//! Page values and the next-offset rule

/// One bounded batch of items plus pagination metadata
///
/// Immutable once received; shared as `Arc<Page<T>>` between the cache and
/// every feed that reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in source order
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total_length: u64,
    /// Offset this page was requested at
    pub offset: u64,
}

impl<T> Page<T> {
    /// Offset of the following page, if any
    ///
    /// `None` is the terminal condition: pagination is exhausted.
    pub fn next_offset(&self, limit: u64) -> Option<u64> {
        next_offset(self.total_length, self.offset, limit)
    }
}

/// Calculate the next page offset
///
/// # Examples
/// ```
/// use marquee_library::page::next_offset;
///
/// // 450 total results at 200 per page = offsets 0, 200, 400
/// assert_eq!(next_offset(450, 0, 200), Some(200));
/// assert_eq!(next_offset(450, 200, 200), Some(400));
/// assert_eq!(next_offset(450, 400, 200), None);
/// ```
pub fn next_offset(total_length: u64, offset: u64, limit: u64) -> Option<u64> {
    let next = offset.saturating_add(limit);
    (total_length > next).then_some(next)
}
