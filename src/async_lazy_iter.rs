use std::{
    pin::Pin,
    task::{Context, Poll},
    vec,
};

use futures::{Stream, StreamExt, TryStreamExt};
use log::debug;
use pin_project::pin_project;

use crate::{
    adapters::{Chunks, Filter, FilterMap, Map},
    chunk::ChunkSize,
    error::Result,
    source::{FromIter, FromStream, Indexed, Source},
};

/// A lazy, chainable transformation over an asynchronous sequence.
///
/// Every pull from the source is a suspension point: [`AsyncLazyIter::collect`]
/// yields to the executor whenever the source is not ready and resumes in
/// source order.
#[pin_project]
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct AsyncLazyIter<S> {
    #[pin]
    source: S,
}

impl<S> AsyncLazyIter<S> {
    pub(crate) fn wrap(source: S) -> Self {
        Self { source }
    }
}

impl<S: Stream> AsyncLazyIter<FromStream<S>> {
    /// Wraps an arbitrary stream. The result cannot be reversed.
    pub fn new(stream: S) -> Self {
        Self::wrap(FromStream::new(stream))
    }
}

impl<I: Iterator> AsyncLazyIter<FromIter<I>> {
    /// Wraps a synchronous producer, pulling it once per poll.
    pub fn from_sync<J: IntoIterator<IntoIter = I>>(iter: J) -> Self {
        Self::wrap(FromIter::new(iter.into_iter()))
    }
}

impl<I: DoubleEndedIterator + ExactSizeIterator> AsyncLazyIter<Indexed<I>> {
    /// Wraps an indexed collection. A partly consumed iterator is accepted and
    /// `rev` reverses only the items it still holds.
    pub fn indexed<C: IntoIterator<IntoIter = I>>(items: C) -> Self {
        Self::wrap(Indexed::new(items.into_iter()))
    }
}

impl<T> AsyncLazyIter<Indexed<vec::IntoIter<T>>> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::indexed(items)
    }
}

impl<T> From<Vec<T>> for AsyncLazyIter<Indexed<vec::IntoIter<T>>> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<S: Stream> AsyncLazyIter<S> {
    /// Drains the sequence, returning its items in production order.
    pub async fn collect(self) -> Vec<S::Item> {
        StreamExt::collect(self.source).await
    }

    pub fn map<U, F: FnMut(S::Item) -> U>(self, f: F) -> AsyncLazyIter<Map<S, F>> {
        AsyncLazyIter::wrap(Map::new(self.source, f))
    }

    /// Like [`AsyncLazyIter::map`] for fallible transforms, see
    /// [`AsyncLazyIter::try_collect`].
    pub fn try_map<U, E, F: FnMut(S::Item) -> Result<U, E>>(
        self,
        f: F,
    ) -> AsyncLazyIter<Map<S, F>> {
        self.map(f)
    }

    pub fn filter<P: FnMut(&S::Item) -> bool>(self, predicate: P) -> AsyncLazyIter<Filter<S, P>> {
        AsyncLazyIter::wrap(Filter::new(self.source, predicate))
    }

    pub fn filter_map<U, F: FnMut(S::Item) -> Option<U>>(
        self,
        f: F,
    ) -> AsyncLazyIter<FilterMap<S, F>> {
        AsyncLazyIter::wrap(FilterMap::new(self.source, f))
    }

    pub fn chunks(self, size: impl ChunkSize) -> Result<AsyncLazyIter<Chunks<S, S::Item>>> {
        self.chunks_with(size, false)
    }

    pub fn chunks_exact(self, size: impl ChunkSize) -> Result<AsyncLazyIter<Chunks<S, S::Item>>> {
        self.chunks_with(size, true)
    }

    /// Groups items into chunks of `size`, see [`LazyIter::chunks_with`](crate::LazyIter::chunks_with).
    pub fn chunks_with(
        self,
        size: impl ChunkSize,
        truncate: bool,
    ) -> Result<AsyncLazyIter<Chunks<S, S::Item>>> {
        let size = size.chunk_size()?;
        Ok(AsyncLazyIter::wrap(Chunks::new(self.source, size, truncate)))
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<T, E, S: Stream<Item = Result<T, E>>> AsyncLazyIter<S> {
    /// Drains the sequence, stopping at the first error.
    ///
    /// Items produced before the error are discarded.
    pub async fn try_collect(self) -> Result<Vec<T>, E> {
        let items = TryStreamExt::try_collect::<Vec<_>>(self.source).await;
        if items.is_err() {
            debug!("collection stopped by an error");
        }
        items
    }
}

impl<S> AsyncLazyIter<S>
where
    S: Stream + Source,
    S::Reversed: Stream<Item = S::Item>,
{
    /// Yields the backing collection last to first.
    ///
    /// Fails with [`Error::NotReversible`](crate::Error::NotReversible) unless
    /// the sequence was built from an indexed collection.
    pub fn rev(self) -> Result<AsyncLazyIter<S::Reversed>> {
        Ok(AsyncLazyIter::wrap(self.source.reversed()?))
    }
}

impl<S: Stream> Stream for AsyncLazyIter<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        self.project().source.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::{executor::block_on, stream};

    use super::*;
    use crate::{error::Error, lazy_iter::LazyIter};

    /// Returns `Pending` before every item, waking itself.
    struct Yielding<I> {
        items: I,
        ready: bool,
        pending: usize,
    }

    impl<I> Yielding<I> {
        fn new(items: I) -> Self {
            Self {
                items,
                ready: false,
                pending: 0,
            }
        }
    }

    impl<I: Iterator + Unpin> Stream for Yielding<I> {
        type Item = I::Item;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<I::Item>> {
            if !self.ready {
                self.ready = true;
                self.pending += 1;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.ready = false;
            Poll::Ready(self.items.next())
        }
    }

    #[test]
    fn filter_then_map() {
        let res = block_on(
            AsyncLazyIter::from_vec(vec![1, 2, 3, 4, 5])
                .filter(|x| x % 2 == 0)
                .map(|x| x * 10)
                .collect(),
        );
        assert_eq!(res, vec![20, 40]);
    }

    #[test]
    fn suspends_at_every_pull() {
        let mut source = Yielding::new(1..=5);
        let res = block_on(AsyncLazyIter::new(&mut source).chunks(2).unwrap().collect());
        assert_eq!(res, vec![vec![1, 2], vec![3, 4], vec![5]]);
        // one suspension per item plus the end of the stream
        assert_eq!(source.pending, 6);
    }

    #[test]
    fn chaining_does_not_poll() {
        let pulled = Cell::new(0);
        let source = stream::iter(1..=4).inspect(|_| pulled.set(pulled.get() + 1));
        let chain = AsyncLazyIter::new(source)
            .map(|x| x * 2)
            .filter(|x| *x > 2)
            .chunks_exact(2)
            .unwrap();
        assert_eq!(pulled.get(), 0);
        assert_eq!(block_on(chain.collect()), vec![vec![4, 6]]);
        assert_eq!(pulled.get(), 4);
    }

    #[test]
    fn manual_pulls_stop_early() {
        let mut squares = AsyncLazyIter::from_sync(0..).map(|x: u64| x * x);
        block_on(async {
            assert_eq!(squares.next().await, Some(0));
            assert_eq!(squares.next().await, Some(1));
            assert_eq!(squares.next().await, Some(4));
        });
    }

    #[test]
    fn invalid_chunk_sizes() {
        assert_eq!(
            AsyncLazyIter::from_sync(0..3).chunks(0).err(),
            Some(Error::InvalidChunkSize("0".into()))
        );
        assert_eq!(
            AsyncLazyIter::from_sync(0..3).chunks_exact(-4i64).err(),
            Some(Error::InvalidChunkSize("-4".into()))
        );
        assert_eq!(
            AsyncLazyIter::from_sync(0..3).chunks(f64::INFINITY).err(),
            Some(Error::UnboundedChunkSize)
        );
    }

    #[test]
    fn rev() {
        let res = block_on(AsyncLazyIter::from_vec(vec![1, 2, 3]).rev().unwrap().collect());
        assert_eq!(res, vec![3, 2, 1]);

        let empty = block_on(AsyncLazyIter::from_vec(Vec::<u8>::new()).rev().unwrap().collect());
        assert!(empty.is_empty());

        assert_eq!(
            AsyncLazyIter::new(stream::iter(vec![1, 2])).rev().err(),
            Some(Error::NotReversible)
        );
        assert_eq!(
            AsyncLazyIter::from_vec(vec![1, 2]).filter(|_| true).rev().err(),
            Some(Error::NotReversible)
        );
    }

    #[test]
    fn try_collect_stops_at_first_error() {
        let calls = Cell::new(0);
        let res = block_on(
            AsyncLazyIter::new(Yielding::new(vec!["7", "oops", "9"].into_iter()))
                .try_map(|s| {
                    calls.set(calls.get() + 1);
                    s.parse::<u8>()
                })
                .try_collect(),
        );
        assert!(res.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn matches_sync_mode() {
        let sync = LazyIter::new(0..50)
            .filter(|x| x % 3 != 0)
            .map(|x| x * 2)
            .chunks(4)
            .unwrap()
            .collect();
        let asynchronous = block_on(
            AsyncLazyIter::new(Yielding::new(0..50))
                .filter(|x| x % 3 != 0)
                .map(|x| x * 2)
                .chunks(4)
                .unwrap()
                .collect(),
        );
        assert_eq!(sync, asynchronous);
    }

    #[test]
    fn into_async_keeps_reversibility() {
        let reversed = LazyIter::from_vec(vec!['a', 'b', 'c'])
            .into_async()
            .rev()
            .unwrap();
        let res = block_on(reversed.collect());
        assert_eq!(res, vec!['c', 'b', 'a']);

        let res = block_on(
            LazyIter::new(1..=6)
                .filter_map(|x| if x % 2 == 0 { Some(x / 2) } else { None })
                .into_async()
                .collect(),
        );
        assert_eq!(res, vec![1, 2, 3]);
    }
}
