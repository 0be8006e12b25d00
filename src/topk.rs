//! Bounded top-K selection over a key-grouped stream.
//!
//! [`BoundedTopK`] keeps the `k` largest values pushed into it using a
//! **min-heap** (`BinaryHeap<Reverse<T>>`) of size ≤ `k`: every push beyond
//! `k` evicts the current minimum, so memory stays bounded by `k` no matter how
//! long the stream is.
//!
//! [`TopKSelector`] puts that heap behind a [`SortedGroupReducer`]: each group
//! is first totalled across all of its lines, and only the sealed total
//! competes for a heap slot. Upstream splits must therefore forward *every*
//! partial count they saw. If each split pre-truncated to its own top-N, a
//! value that is globally dominant but thin in every split could be dropped
//! before its partial counts were ever added up.

use crate::emit::Emit;
use crate::reducer::{GroupFold, SortedGroupReducer};
use crate::validation::ValidationError;
use anyhow::Result;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// The largest `k` values seen so far (requires `Ord`).
///
/// # Notes
/// - `k == 0` keeps nothing.
/// - Among equal values the heap keeps whichever the `Ord` impl ranks higher,
///   so for tuple-like values ties break on the later fields.
#[derive(Clone, Debug)]
pub struct BoundedTopK<T> {
    k: usize,
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> BoundedTopK<T> {
    /// Create an empty selector keeping at most `k` values.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest value currently retained, i.e. the next eviction candidate.
    pub fn min(&self) -> Option<&T> {
        self.heap.peek().map(|Reverse(v)| v)
    }

    /// Offer a value; returns the evicted value if the heap overflowed.
    pub fn push(&mut self, v: T) -> Option<T> {
        self.heap.push(Reverse(v));
        if self.heap.len() > self.k {
            self.heap.pop().map(|Reverse(x)| x) // drop smallest
        } else {
            None
        }
    }

    /// Drain into a `Vec` sorted ascending (smallest retained value first).
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<T> {
        // BinaryHeap<Reverse<T>>::into_sorted_vec is ascending in Reverse,
        // i.e. descending in T.
        let mut v: Vec<T> = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(x)| x)
            .collect();
        v.reverse();
        v
    }
}

/// Totals each key group with `R`, then keeps the top `k` sealed totals.
///
/// Output comes only at end of stream, ascending.
pub struct TopKSelector<R>
where
    R: GroupFold,
    R::Out: Ord,
{
    groups: SortedGroupReducer<R>,
    heap: BoundedTopK<R::Out>,
}

/// Adapter forwarding skips to the caller's emitter while sealed groups go
/// into the heap.
struct HeapSink<'a, T, E> {
    heap: &'a mut BoundedTopK<T>,
    skips: &'a mut E,
}

impl<T: Ord, E: Emit<T>> Emit<T> for HeapSink<'_, T, E> {
    fn emit(&mut self, value: T) -> Result<()> {
        self.heap.push(value);
        Ok(())
    }

    fn skip(&mut self, error: ValidationError) {
        self.skips.skip(error);
    }
}

impl<R> TopKSelector<R>
where
    R: GroupFold,
    R::Out: Ord,
{
    pub fn new(fold: R, k: usize) -> Self {
        Self {
            groups: SortedGroupReducer::new(fold),
            heap: BoundedTopK::new(k),
        }
    }

    pub fn groups_sealed(&self) -> u64 {
        self.groups.groups_sealed()
    }

    /// Consume one line. Malformed lines are reported to `out` as skips; no
    /// values are emitted until [`finish`](Self::finish).
    ///
    /// # Errors
    /// Fails if called after `finish`.
    pub fn push_line<E: Emit<R::Out>>(&mut self, line: &str, out: &mut E) -> Result<()> {
        let mut sink = HeapSink {
            heap: &mut self.heap,
            skips: &mut *out,
        };
        self.groups.push_line(line, &mut sink)
    }

    /// Seal the last group and emit the retained values ascending.
    ///
    /// A second call emits nothing.
    ///
    /// # Errors
    /// Propagates sink failures.
    pub fn finish<E: Emit<R::Out>>(&mut self, out: &mut E) -> Result<()> {
        let mut sink = HeapSink {
            heap: &mut self.heap,
            skips: &mut *out,
        };
        self.groups.finish(&mut sink)?;
        let heap = std::mem::replace(&mut self.heap, BoundedTopK::new(0));
        for v in heap.into_sorted_vec() {
            out.emit(v)?;
        }
        Ok(())
    }

    /// Push every line, then [`finish`](Self::finish).
    ///
    /// # Errors
    /// Propagates read errors from `lines` and sink failures.
    pub fn reduce_lines<I, S, E>(&mut self, lines: I, out: &mut E) -> Result<()>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
        E: Emit<R::Out>,
    {
        for line in lines {
            self.push_line(line?.as_ref(), out)?;
        }
        self.finish(out)
    }
}
