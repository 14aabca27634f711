// Visible sub-range of the task list

use std::ops::Range;

/// Rows of a `len`-long list to render, centered on `cursor`
///
/// The window starts `window_size / 2` rows above the cursor. Near the end of
/// the list the start is pulled back so the window stays full instead of
/// showing a short tail. A cursor past the end is treated as the last row.
///
/// For `len > 0` and `window_size > 0` the result satisfies
/// `start <= cursor < end <= len` and `end - start == min(window_size, len)`.
/// Either being zero yields an empty range.
pub fn window(cursor: usize, len: usize, window_size: usize) -> Range<usize> {
    if len == 0 || window_size == 0 {
        return 0..0;
    }

    let cursor = cursor.min(len - 1);
    let start = cursor
        .saturating_sub(window_size / 2)
        .min(len.saturating_sub(window_size));
    let end = len.min(start + window_size);

    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_empty_list() {
        assert_eq!(window(0, 0, 10), 0..0);
        assert_eq!(window(5, 0, 10), 0..0);
    }

    #[test]
    fn test_window_zero_size() {
        assert_eq!(window(3, 10, 0), 0..0);
    }

    #[test]
    fn test_window_larger_than_list() {
        for cursor in 0..10 {
            assert_eq!(window(cursor, 10, 10), 0..10);
            assert_eq!(window(cursor, 10, 30), 0..10);
        }
    }

    #[test]
    fn test_window_centers_on_cursor() {
        assert_eq!(window(50, 100, 10), 45..55);
        assert_eq!(window(0, 100, 10), 0..10);
        assert_eq!(window(3, 100, 10), 0..10);
    }

    #[test]
    fn test_window_stays_full_at_end() {
        // Without the end cap this would be 95..100
        assert_eq!(window(99, 100, 10), 90..100);
        assert_eq!(window(97, 100, 10), 90..100);
    }

    #[test]
    fn test_window_stale_cursor() {
        assert_eq!(window(500, 20, 5), 15..20);
    }

    #[test]
    fn test_window_bounds_hold_everywhere() {
        for len in 1..40usize {
            for size in 1..45usize {
                for cursor in 0..len {
                    let r = window(cursor, len, size);
                    assert!(r.start <= cursor, "len={len} size={size} cursor={cursor}");
                    assert!(cursor < r.end, "len={len} size={size} cursor={cursor}");
                    assert!(r.end <= len);
                    assert!(r.end - r.start <= size);
                    assert_eq!(r.end - r.start, size.min(len));
                }
            }
        }
    }
}
