#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

//! This crate provides a compressed bitmap using the
//! [Roaring bitmap compression scheme](https://roaringbitmap.org).
//!
//! # Examples
//!
//! ```rust
//! use roaring::RoaringBitmap;
//!
//! let mut rb1 = RoaringBitmap::new();
//! rb1.insert(1);
//! rb1.insert(2);
//! rb1.insert(3);
//! rb1.insert(4);
//! rb1.insert(5);
//!
//! let mut rb2 = RoaringBitmap::new();
//! rb2.insert(4);
//! rb2.insert(5);
//! rb2.insert(6);
//! rb2.insert(7);
//! rb2.insert(8);
//!
//! let rb1_clone = rb1.clone();
//!
//! let intersection = rb1 & rb2;
//!
//! assert_eq!(intersection, (rb1_clone & rb2));
//! ```

extern crate alloc;

mod bitmap;

pub use crate::bitmap::{IntoIter, Iter, MultiOps, RoaringBitmap};

use core::fmt;

/// Error returned by [`RoaringBitmap::from_sorted_iter`]/[`RoaringBitmap::append`] when the
/// provided iterator is not strictly sorted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NonSortedIntegers {
    pub(crate) valid_until: u64,
}

impl NonSortedIntegers {
    /// Returns the number of elements that were appended before the error occurred.
    pub fn valid_until(&self) -> u64 {
        self.valid_until
    }
}

impl fmt::Display for NonSortedIntegers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "integers are not sorted, valid until {}", self.valid_until)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NonSortedIntegers {}
