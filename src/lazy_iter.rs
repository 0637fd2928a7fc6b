use std::{iter::FromFn, slice, vec};

use futures::Stream;
use itertools::Itertools;
use log::debug;

use crate::{
    adapters::{Chunks, Filter, FilterMap, Map},
    async_lazy_iter::AsyncLazyIter,
    chunk::ChunkSize,
    error::Result,
    source::{FromIter, Indexed, Source},
};

/// A lazy, chainable transformation over a synchronous sequence.
///
/// Transformations consume the wrapper and return a new one around a derived
/// sequence; nothing is pulled from the source until the result is
/// collected or iterated.
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LazyIter<S> {
    source: S,
}

impl<I: Iterator> LazyIter<FromIter<I>> {
    /// Wraps an arbitrary one-shot producer. The result cannot be reversed.
    pub fn new<J: IntoIterator<IntoIter = I>>(iter: J) -> Self {
        Self {
            source: FromIter::new(iter.into_iter()),
        }
    }
}

impl<T, F: FnMut() -> Option<T>> LazyIter<FromIter<FromFn<F>>> {
    /// Wraps a generator that produces items until it returns `None`.
    pub fn from_fn(f: F) -> Self {
        Self::new(std::iter::from_fn(f))
    }
}

impl<I: DoubleEndedIterator + ExactSizeIterator> LazyIter<Indexed<I>> {
    /// Wraps an indexed collection, which makes [`LazyIter::rev`] available.
    ///
    /// A partly consumed iterator is accepted; `rev` then reverses only the
    /// items it still holds.
    pub fn indexed<C: IntoIterator<IntoIter = I>>(items: C) -> Self {
        Self {
            source: Indexed::new(items.into_iter()),
        }
    }
}

impl<T> LazyIter<Indexed<vec::IntoIter<T>>> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::indexed(items)
    }
}

impl<'a, T> LazyIter<Indexed<slice::Iter<'a, T>>> {
    pub fn from_slice(items: &'a [T]) -> Self {
        Self::indexed(items)
    }
}

impl<T> From<Vec<T>> for LazyIter<Indexed<vec::IntoIter<T>>> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<S: Iterator> LazyIter<S> {
    /// Drains the sequence, returning its items in production order.
    pub fn collect(self) -> Vec<S::Item> {
        self.source.collect_vec()
    }

    /// Applies `f` to every item as it is pulled.
    pub fn map<U, F: FnMut(S::Item) -> U>(self, f: F) -> LazyIter<Map<S, F>> {
        LazyIter {
            source: Map::new(self.source, f),
        }
    }

    /// Like [`LazyIter::map`] for fallible transforms.
    ///
    /// An error becomes an item of the derived sequence; [`LazyIter::try_collect`]
    /// stops at the first one.
    pub fn try_map<U, E, F: FnMut(S::Item) -> Result<U, E>>(self, f: F) -> LazyIter<Map<S, F>> {
        self.map(f)
    }

    pub fn filter<P: FnMut(&S::Item) -> bool>(self, predicate: P) -> LazyIter<Filter<S, P>> {
        LazyIter {
            source: Filter::new(self.source, predicate),
        }
    }

    /// Keeps the items for which `f` returns `Some`, narrowing the item type.
    pub fn filter_map<U, F: FnMut(S::Item) -> Option<U>>(
        self,
        f: F,
    ) -> LazyIter<FilterMap<S, F>> {
        LazyIter {
            source: FilterMap::new(self.source, f),
        }
    }

    /// Groups items into chunks of `size`, the last chunk may be shorter.
    pub fn chunks(self, size: impl ChunkSize) -> Result<LazyIter<Chunks<S, S::Item>>> {
        self.chunks_with(size, false)
    }

    /// Groups items into chunks of exactly `size`, dropping any leftover items.
    pub fn chunks_exact(self, size: impl ChunkSize) -> Result<LazyIter<Chunks<S, S::Item>>> {
        self.chunks_with(size, true)
    }

    /// Groups items into chunks of `size`.
    ///
    /// A partial trailing chunk is kept unless `truncate` is set.
    /// Fails if `size` is not a positive integer or is infinite.
    pub fn chunks_with(
        self,
        size: impl ChunkSize,
        truncate: bool,
    ) -> Result<LazyIter<Chunks<S, S::Item>>> {
        let size = size.chunk_size()?;
        Ok(LazyIter {
            source: Chunks::new(self.source, size, truncate),
        })
    }

    /// Turns this into an asynchronous iterator over the same sequence.
    pub fn into_async(self) -> AsyncLazyIter<S>
    where
        S: Stream,
    {
        AsyncLazyIter::wrap(self.source)
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<T, E, S: Iterator<Item = Result<T, E>>> LazyIter<S> {
    /// Drains the sequence, stopping at the first error.
    ///
    /// Items produced before the error are discarded.
    pub fn try_collect(self) -> Result<Vec<T>, E> {
        let items = self.source.collect::<Result<Vec<_>, _>>();
        if items.is_err() {
            debug!("collection stopped by an error");
        }
        items
    }
}

impl<S> LazyIter<S>
where
    S: Iterator + Source,
    S::Reversed: Iterator<Item = S::Item>,
{
    /// Yields the backing collection last to first.
    ///
    /// Only sequences built by [`LazyIter::indexed`], [`LazyIter::from_vec`]
    /// or [`LazyIter::from_slice`] can be reversed; anything else fails with
    /// [`Error::NotReversible`](crate::Error::NotReversible).
    pub fn rev(self) -> Result<LazyIter<S::Reversed>> {
        Ok(LazyIter {
            source: self.source.reversed()?,
        })
    }
}

impl<S: Iterator> IntoIterator for LazyIter<S> {
    type Item = S::Item;
    type IntoIter = S;

    fn into_iter(self) -> S {
        self.source
    }
}
