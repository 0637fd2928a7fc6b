use std::{convert::TryFrom, mem, num::NonZeroUsize};

use log::{debug, trace};

use crate::error::{Error, Result};

/// Values accepted as a chunk size.
///
/// Conversion fails with [`Error::InvalidChunkSize`] for sizes that are not
/// positive integers and with [`Error::UnboundedChunkSize`] for an infinite size.
pub trait ChunkSize {
    fn chunk_size(self) -> Result<NonZeroUsize>;
}

fn reject(size: impl ToString) -> Error {
    let size = size.to_string();
    debug!("rejecting chunk size {}", size);
    Error::InvalidChunkSize(size)
}

impl ChunkSize for NonZeroUsize {
    fn chunk_size(self) -> Result<NonZeroUsize> {
        Ok(self)
    }
}

impl ChunkSize for usize {
    fn chunk_size(self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self).ok_or_else(|| reject(self))
    }
}

macro_rules! chunk_size_from_int {
    ($($int:ty),*) => {
        $(
            impl ChunkSize for $int {
                fn chunk_size(self) -> Result<NonZeroUsize> {
                    usize::try_from(self)
                        .ok()
                        .and_then(NonZeroUsize::new)
                        .ok_or_else(|| reject(self))
                }
            }
        )*
    };
}

chunk_size_from_int!(u32, u64, i32, i64, isize);

impl ChunkSize for f64 {
    fn chunk_size(self) -> Result<NonZeroUsize> {
        if self == f64::INFINITY {
            debug!("rejecting unbounded chunk size");
            return Err(Error::UnboundedChunkSize);
        }
        if self.is_nan() || self <= 0.0 || self.fract() != 0.0 || self >= usize::MAX as f64 {
            return Err(reject(self));
        }
        NonZeroUsize::new(self as usize).ok_or_else(|| reject(self))
    }
}

/// Accumulates pulled items into chunks of a fixed size.
///
/// Both the iterator and the stream chunk adapters drive one of these,
/// so the grouping rules live in exactly one place.
#[derive(Debug)]
pub(crate) struct ChunkBuffer<T> {
    size: NonZeroUsize,
    truncate: bool,
    chunk: Vec<T>,
}

impl<T> ChunkBuffer<T> {
    pub(crate) fn new(size: NonZeroUsize, truncate: bool) -> Self {
        Self {
            size,
            truncate,
            chunk: Vec::new(),
        }
    }

    /// Adds an item, returning the chunk once it is full.
    pub(crate) fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.chunk.push(item);
        if self.chunk.len() == self.size.get() {
            trace!("emitting chunk of {} items", self.chunk.len());
            Some(mem::take(&mut self.chunk))
        } else {
            None
        }
    }

    /// Called once the upstream is exhausted.
    pub(crate) fn finish(&mut self) -> Option<Vec<T>> {
        if self.chunk.is_empty() {
            return None;
        }
        let rest = mem::take(&mut self.chunk);
        if self.truncate {
            trace!("dropping trailing chunk of {} items", rest.len());
            None
        } else {
            trace!("emitting trailing chunk of {} items", rest.len());
            Some(rest)
        }
    }
}
