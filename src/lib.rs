//! Lazy, chainable transformations over synchronous iterators and
//! asynchronous streams.
//!
//! [`LazyIter`] and [`AsyncLazyIter`] wrap a sequence and derive new
//! sequences from it with `map`, `filter`, `chunks` and `rev`. Nothing is
//! produced until the result is collected or pulled.
//!
//! ```
//! use lazy_iter::LazyIter;
//!
//! let res = LazyIter::from_vec(vec![1, 2, 3, 4, 5])
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * 10)
//!     .collect();
//! assert_eq!(res, vec![20, 40]);
//! ```
//!
//! The asynchronous wrapper offers the same operations; every pull from its
//! source may suspend the calling task.
//!
//! ```
//! use futures::executor::block_on;
//! use lazy_iter::AsyncLazyIter;
//!
//! let chunks = AsyncLazyIter::from_vec(vec![1, 2, 3, 4, 5]).chunks(2)?;
//! assert_eq!(block_on(chunks.collect()), vec![vec![1, 2], vec![3, 4], vec![5]]);
//! # Ok::<(), lazy_iter::Error>(())
//! ```

pub mod adapters;
mod async_lazy_iter;
mod chunk;
mod error;
mod lazy_iter;
pub mod source;

pub use async_lazy_iter::AsyncLazyIter;
pub use chunk::ChunkSize;
pub use error::{Error, Result};
pub use lazy_iter::LazyIter;
pub use source::Source;
