//! Assertions over job output lines.

use std::fmt::Debug;

/// Assert that two line sequences are equal in order and content.
///
/// # Panics
///
/// Panics if the sequences differ in length or content.
///
/// # Example
///
/// ```
/// use forumstats::testing::assert_lines_equal;
///
/// assert_lines_equal(&["a\t1", "b\t2"], &["a\t1", "b\t2"]);
/// ```
pub fn assert_lines_equal<A, E>(actual: &[A], expected: &[E])
where
    A: AsRef<str> + Debug,
    E: AsRef<str> + Debug,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Line count mismatch:\n  Expected: {expected:#?}\n  Actual: {actual:#?}"
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a.as_ref(),
            e.as_ref(),
            "Line {i} differs:\n  Full expected: {expected:#?}\n  Full actual: {actual:#?}"
        );
    }
}

/// Assert that two line sequences hold the same lines, ignoring order.
///
/// # Panics
///
/// Panics if the sorted sequences differ.
pub fn assert_lines_unordered_equal<A, E>(actual: &[A], expected: &[E])
where
    A: AsRef<str> + Debug,
    E: AsRef<str> + Debug,
{
    let mut a: Vec<&str> = actual.iter().map(AsRef::as_ref).collect();
    let mut e: Vec<&str> = expected.iter().map(AsRef::as_ref).collect();
    a.sort_unstable();
    e.sort_unstable();
    assert_lines_equal(&a, &e);
}

/// Assert that every line has exactly `columns` tab-separated fields.
///
/// # Panics
///
/// Panics on the first line with a different width.
pub fn assert_columns<A: AsRef<str> + Debug>(lines: &[A], columns: usize) {
    for line in lines {
        let n = line.as_ref().split('\t').count();
        assert_eq!(n, columns, "Expected {columns} columns, got {n} in {line:?}");
    }
}
