//! Lazily indexed sequences
//!
//! A [`LazyIndexableView`] addresses either an in-memory list or an
//! `index -> value` generator through a normalised [`RangeDescriptor`].
//! Slicing and reversing only compose descriptors; values are produced on
//! demand.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::errors::{OutOfRangeReason, Result, index_out_of_range_error};

use super::descriptor::{self, RangeDescriptor};

/// Generator backing an unbounded or very long sequence. Returns `None` for
/// indices outside its own domain.
pub type Generator = Arc<dyn Fn(i64) -> Option<String> + Send + Sync>;

/// The values a view addresses
#[derive(Clone)]
pub enum Producer {
    /// A finite list held in memory
    Finite(Arc<[String]>),
    /// A generator together with the length it claims to support
    Generated {
        generator: Generator,
        declared_length: i64,
    },
}

impl Producer {
    pub fn declared_length(&self) -> i64 {
        match self {
            Producer::Finite(values) => values.len() as i64,
            Producer::Generated {
                declared_length, ..
            } => *declared_length,
        }
    }

    fn produce(&self, raw_index: i64) -> Option<String> {
        match self {
            Producer::Finite(values) => usize::try_from(raw_index)
                .ok()
                .and_then(|index| values.get(index))
                .cloned(),
            Producer::Generated { generator, .. } => generator(raw_index),
        }
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Finite(values) => f.debug_tuple("Finite").field(&values.len()).finish(),
            Producer::Generated {
                declared_length, ..
            } => f
                .debug_struct("Generated")
                .field("declared_length", declared_length)
                .finish_non_exhaustive(),
        }
    }
}

/// A re-sliceable, bidirectional window over a [`Producer`]
#[derive(Debug, Clone)]
pub struct LazyIndexableView {
    producer: Producer,
    descriptor: RangeDescriptor,
    len: i64,
}

impl LazyIndexableView {
    /// Creates a view over an in-memory list
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Arc<[String]> = values.into_iter().map(Into::into).collect();
        let len = values.len() as i64;
        LazyIndexableView {
            producer: Producer::Finite(values),
            descriptor: RangeDescriptor::span(0, len),
            len,
        }
    }

    /// Creates a view over a generator that claims to serve `declared_length` indices
    pub fn from_generator<F>(declared_length: i64, generator: F) -> Self
    where
        F: Fn(i64) -> Option<String> + Send + Sync + 'static,
    {
        let declared_length = declared_length.max(0);
        LazyIndexableView {
            producer: Producer::Generated {
                generator: Arc::new(generator),
                declared_length,
            },
            descriptor: RangeDescriptor::span(0, declared_length),
            len: declared_length,
        }
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn descriptor(&self) -> RangeDescriptor {
        self.descriptor
    }

    pub fn declared_length(&self) -> i64 {
        self.producer.declared_length()
    }

    pub fn len(&self) -> i64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value at `position`; negative positions count from the end.
    ///
    /// # Errors
    /// * `IndexOutOfRange` with `NotAMember` if the position is outside the view
    /// * `IndexOutOfRange` with `OverPromised` if the producer cannot render an
    ///   index its declared length promised
    pub fn index(&self, position: i64) -> Result<String> {
        let declared_length = self.declared_length();
        let raw_index = descriptor::to_raw_index(position, &self.descriptor, declared_length)
            .map_err(|_| {
                index_out_of_range_error(position, self.len, OutOfRangeReason::NotAMember)
            })?;

        self.producer.produce(raw_index).ok_or_else(|| {
            index_out_of_range_error(raw_index, declared_length, OutOfRangeReason::OverPromised)
        })
    }

    /// Returns a view of the selected part of this one
    pub fn slice(&self, desc: &RangeDescriptor) -> Result<Self> {
        let declared_length = self.declared_length();
        let composed = descriptor::compose(&[self.descriptor, *desc], declared_length)?;
        let len = descriptor::count(&composed, declared_length)?;
        Ok(LazyIndexableView {
            producer: self.producer.clone(),
            descriptor: composed,
            len,
        })
    }

    /// Returns the first `count` elements, or fewer if the view is shorter
    pub fn take(&self, count: i64) -> Result<Self> {
        self.slice(&RangeDescriptor::span(0, count.max(0)))
    }

    pub fn reverse(&self) -> Result<Self> {
        self.slice(&RangeDescriptor::reversed())
    }

    /// Position of the first element equal to `value`, searching at most `limit` elements
    pub fn position_of(&self, value: &str, limit: i64) -> Option<i64> {
        (0..self.len.min(limit)).find(|&position| {
            self.index(position)
                .map(|candidate| candidate == value)
                .unwrap_or(false)
        })
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            view: self,
            front: 0,
            back: self.len,
        }
    }

    pub fn to_vec(&self) -> Result<Vec<String>> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a LazyIndexableView {
    type Item = Result<String>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a view; every call to [`LazyIndexableView::iter`] starts afresh
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    view: &'a LazyIndexableView,
    front: i64,
    back: i64,
}

impl Iterator for Iter<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let value = self.view.index(self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.back - self.front).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.view.index(self.back))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
