use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use log::debug;
use pin_project::pin_project;

use crate::error::Result;

/// A sequence that a lazy iterator can wrap.
///
/// Only sequences backed by an indexed collection can be reversed; every
/// other source reports [`Error::NotReversible`](crate::Error::NotReversible).
pub trait Source: Sized {
    type Reversed;

    fn reversed(self) -> Result<Self::Reversed>;
}

macro_rules! not_reversible {
    ($($name:ident<$($param:ident),*>),* $(,)?) => {
        $(
            impl<$($param),*> $crate::source::Source for $name<$($param),*> {
                // never produced
                type Reversed = Self;

                fn reversed(self) -> $crate::error::Result<Self> {
                    log::debug!("refusing to reverse {}", stringify!($name));
                    Err($crate::error::Error::NotReversible)
                }
            }
        )*
    };
}

pub(crate) use not_reversible;

/// Pulled as a stream, every item is ready as soon as it is polled.
#[pin_project]
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct FromIter<I> {
    iter: I,
}

impl<I> FromIter<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator> Iterator for FromIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I: Iterator> Stream for FromIter<I> {
    type Item = I::Item;

    fn poll_next(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<I::Item>> {
        Poll::Ready(self.project().iter.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

#[pin_project]
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct FromStream<S> {
    #[pin]
    stream: S,
}

impl<S> FromStream<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S: Stream> Stream for FromStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        self.project().stream.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

/// A sequence backed by a held, ordered, finite collection.
///
/// This is the only kind of source that can be reversed.
#[pin_project]
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Indexed<I> {
    items: I,
}

impl<I: DoubleEndedIterator + ExactSizeIterator> Indexed<I> {
    pub(crate) fn new(items: I) -> Self {
        Self { items }
    }
}

impl<I: Iterator> Iterator for Indexed<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<I: Iterator> Stream for Indexed<I> {
    type Item = I::Item;

    fn poll_next(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<I::Item>> {
        Poll::Ready(self.project().items.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<I: DoubleEndedIterator + ExactSizeIterator> Source for Indexed<I> {
    type Reversed = Reversed<I>;

    fn reversed(self) -> Result<Reversed<I>> {
        debug!("reversing {} indexed items", self.items.len());
        Ok(Reversed { items: self.items })
    }
}

#[pin_project]
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Reversed<I> {
    items: I,
}

impl<I: DoubleEndedIterator> Iterator for Reversed<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.items.next_back()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<I: DoubleEndedIterator> Stream for Reversed<I> {
    type Item = I::Item;

    fn poll_next(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<I::Item>> {
        Poll::Ready(self.project().items.next_back())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

not_reversible!(FromIter<I>, FromStream<S>, Reversed<I>);
