//! Derived sequences.
//!
//! Every adapter pulls from its upstream only when it is pulled itself,
//! and works over iterators and streams alike.

use std::{
    fmt,
    num::NonZeroUsize,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{ready, Stream};
use pin_project::pin_project;

use crate::{chunk::ChunkBuffer, source::not_reversible};

#[pin_project]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Map<S, F> {
    #[pin]
    source: S,
    f: F,
}

impl<S, F> Map<S, F> {
    pub(crate) fn new(source: S, f: F) -> Self {
        Self { source, f }
    }
}

impl<S: fmt::Debug, F> fmt::Debug for Map<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("source", &self.source).finish()
    }
}

impl<U, S: Iterator, F: FnMut(S::Item) -> U> Iterator for Map<S, F> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        self.source.next().map(&mut self.f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

impl<U, S: Stream, F: FnMut(S::Item) -> U> Stream for Map<S, F> {
    type Item = U;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<U>> {
        let this = self.project();
        let f = this.f;
        this.source.poll_next(cx).map(|item| item.map(f))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

#[pin_project]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Filter<S, P> {
    #[pin]
    source: S,
    predicate: P,
    done: bool,
}

impl<S, P> Filter<S, P> {
    pub(crate) fn new(source: S, predicate: P) -> Self {
        Self {
            source,
            predicate,
            done: false,
        }
    }
}

impl<S: fmt::Debug, P> fmt::Debug for Filter<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("source", &self.source)
            .field("done", &self.done)
            .finish()
    }
}

impl<S: Iterator, P: FnMut(&S::Item) -> bool> Iterator for Filter<S, P> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        if self.done {
            return None;
        }
        let predicate = &mut self.predicate;
        let item = self.source.find(|item| predicate(item));
        self.done = item.is_none();
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, self.source.size_hint().1)
        }
    }
}

impl<S: Stream, P: FnMut(&S::Item) -> bool> Stream for Filter<S, P> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match ready!(this.source.as_mut().poll_next(cx)) {
                Some(item) => {
                    if (this.predicate)(&item) {
                        return Poll::Ready(Some(item));
                    }
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

/// Keeps the items for which `f` returns `Some`, narrowing the item type.
#[pin_project]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct FilterMap<S, F> {
    #[pin]
    source: S,
    f: F,
    done: bool,
}

impl<S, F> FilterMap<S, F> {
    pub(crate) fn new(source: S, f: F) -> Self {
        Self {
            source,
            f,
            done: false,
        }
    }
}

impl<S: fmt::Debug, F> fmt::Debug for FilterMap<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterMap")
            .field("source", &self.source)
            .field("done", &self.done)
            .finish()
    }
}

impl<U, S: Iterator, F: FnMut(S::Item) -> Option<U>> Iterator for FilterMap<S, F> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        if self.done {
            return None;
        }
        for item in &mut self.source {
            if let Some(narrowed) = (self.f)(item) {
                return Some(narrowed);
            }
        }
        self.done = true;
        None
    }
}

impl<U, S: Stream, F: FnMut(S::Item) -> Option<U>> Stream for FilterMap<S, F> {
    type Item = U;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<U>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match ready!(this.source.as_mut().poll_next(cx)) {
                Some(item) => {
                    if let Some(narrowed) = (this.f)(item) {
                        return Poll::Ready(Some(narrowed));
                    }
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

#[pin_project]
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Chunks<S, T> {
    #[pin]
    source: S,
    buffer: ChunkBuffer<T>,
    done: bool,
}

impl<S, T> Chunks<S, T> {
    pub(crate) fn new(source: S, size: NonZeroUsize, truncate: bool) -> Self {
        Self {
            source,
            buffer: ChunkBuffer::new(size, truncate),
            done: false,
        }
    }
}

impl<S: Iterator> Iterator for Chunks<S, S::Item> {
    type Item = Vec<S::Item>;

    fn next(&mut self) -> Option<Vec<S::Item>> {
        if self.done {
            return None;
        }
        for item in &mut self.source {
            if let Some(chunk) = self.buffer.push(item) {
                return Some(chunk);
            }
        }
        self.done = true;
        self.buffer.finish()
    }
}

impl<S: Stream> Stream for Chunks<S, S::Item> {
    type Item = Vec<S::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Vec<S::Item>>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match ready!(this.source.as_mut().poll_next(cx)) {
                Some(item) => {
                    if let Some(chunk) = this.buffer.push(item) {
                        return Poll::Ready(Some(chunk));
                    }
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(this.buffer.finish());
                }
            }
        }
    }
}

not_reversible!(Map<S, F>, Filter<S, P>, FilterMap<S, F>, Chunks<S, T>);

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;

    use super::*;
    use crate::source::{FromIter, Source};

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn map_calls_once_per_pull() {
        let calls = Cell::new(0);
        let mut map = Map::new(FromIter::new(1..=3), |x: i32| {
            calls.set(calls.get() + 1);
            x * 2
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(map.next(), Some(2));
        assert_eq!(calls.get(), 1);
        assert_eq!(map.by_ref().collect::<Vec<_>>(), vec![4, 6]);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn filter_skips_until_match() {
        let pulled = Cell::new(0);
        let source = FromIter::new((1..=6).inspect(|_| pulled.set(pulled.get() + 1)));
        let mut filter = Filter::new(source, |x: &i32| x % 3 == 0);
        assert_eq!(filter.next(), Some(3));
        assert_eq!(pulled.get(), 3);
        assert_eq!(filter.next(), Some(6));
        assert_eq!(filter.next(), None);
        assert_eq!(filter.next(), None);
    }

    #[test]
    fn filter_map_narrows() {
        let words = FromIter::new(vec!["1", "x", "22", "", "3"].into_iter());
        let numbers = FilterMap::new(words, |w: &str| w.parse::<u32>().ok());
        assert_eq!(numbers.collect::<Vec<_>>(), vec![1, 22, 3]);
    }

    #[test]
    fn chunks_stay_exhausted() {
        let mut chunks = Chunks::new(FromIter::new(1..=5), size(2), false);
        assert_eq!(chunks.next(), Some(vec![1, 2]));
        assert_eq!(chunks.next(), Some(vec![3, 4]));
        assert_eq!(chunks.next(), Some(vec![5]));
        assert_eq!(chunks.next(), None);
        assert_eq!(chunks.next(), None);
    }

    #[test]
    fn chunks_over_stream() {
        let chunks = Chunks::new(FromIter::new(1..=5), size(2), true);
        let chunks: Vec<Vec<i32>> = block_on(futures::StreamExt::collect(chunks));
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn adapters_do_not_reverse() {
        let map = Map::new(FromIter::new(0..3), |x: i32| x + 1);
        assert!(map.reversed().is_err());
        let chunks = Chunks::<_, i32>::new(FromIter::new(0..3), size(1), false);
        assert!(chunks.reversed().is_err());
    }
}
