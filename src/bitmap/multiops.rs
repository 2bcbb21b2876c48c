use core::ops::{BitAndAssign, BitOrAssign, BitXorAssign, SubAssign};

use crate::RoaringBitmap;

/// Extends the binary set operators to an arbitrary number of bitmaps.
///
/// Implemented for any `IntoIterator` of owned or borrowed `RoaringBitmap`s, and for the
/// corresponding `IntoIterator` of `Result<_, E>` items, so a fallible source (bitmaps streamed
/// in one at a time, each load able to fail) can be combined without collecting into a `Vec`
/// first.
pub trait MultiOps<T> {
    type Output;

    /// Union (`|`) of every bitmap in the collection.
    fn union(self) -> Self::Output;

    /// Intersection (`&`) of every bitmap in the collection.
    fn intersection(self) -> Self::Output;

    /// Sequential difference (`-`) of every bitmap in the collection: `a - b - c - ...`.
    fn difference(self) -> Self::Output;

    /// Symmetric difference (`^`) of every bitmap in the collection.
    fn symmetric_difference(self) -> Self::Output;
}

impl<I> MultiOps<RoaringBitmap> for I
where
    I: IntoIterator<Item = RoaringBitmap>,
{
    type Output = RoaringBitmap;

    fn union(self) -> Self::Output {
        self.into_iter().fold(RoaringBitmap::new(), |mut acc, bitmap| {
            BitOrAssign::bitor_assign(&mut acc, bitmap);
            acc
        })
    }

    fn intersection(self) -> Self::Output {
        let mut iter = self.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, |mut acc, bitmap| {
                BitAndAssign::bitand_assign(&mut acc, bitmap);
                acc
            }),
            None => RoaringBitmap::new(),
        }
    }

    fn difference(self) -> Self::Output {
        let mut iter = self.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, |mut acc, bitmap| {
                SubAssign::sub_assign(&mut acc, &bitmap);
                acc
            }),
            None => RoaringBitmap::new(),
        }
    }

    fn symmetric_difference(self) -> Self::Output {
        self.into_iter().fold(RoaringBitmap::new(), |mut acc, bitmap| {
            BitXorAssign::bitxor_assign(&mut acc, bitmap);
            acc
        })
    }
}

impl<'a, I> MultiOps<&'a RoaringBitmap> for I
where
    I: IntoIterator<Item = &'a RoaringBitmap>,
{
    type Output = RoaringBitmap;

    fn union(self) -> Self::Output {
        self.into_iter().fold(RoaringBitmap::new(), |acc, bitmap| acc | bitmap)
    }

    fn intersection(self) -> Self::Output {
        let mut iter = self.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first.clone(), |acc, bitmap| acc & bitmap),
            None => RoaringBitmap::new(),
        }
    }

    fn difference(self) -> Self::Output {
        let mut iter = self.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first.clone(), |acc, bitmap| acc - bitmap),
            None => RoaringBitmap::new(),
        }
    }

    fn symmetric_difference(self) -> Self::Output {
        let mut iter = self.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first.clone(), |acc, bitmap| acc ^ bitmap),
            None => RoaringBitmap::new(),
        }
    }
}

impl<E, I> MultiOps<Result<RoaringBitmap, E>> for I
where
    I: IntoIterator<Item = Result<RoaringBitmap, E>>,
{
    type Output = Result<RoaringBitmap, E>;

    fn union(self) -> Self::Output {
        self.into_iter().try_fold(RoaringBitmap::new(), |mut acc, bitmap| {
            BitOrAssign::bitor_assign(&mut acc, bitmap?);
            Ok(acc)
        })
    }

    fn intersection(self) -> Self::Output {
        let mut iter = self.into_iter();
        let first = match iter.next() {
            Some(bitmap) => bitmap?,
            None => return Ok(RoaringBitmap::new()),
        };
        iter.try_fold(first, |mut acc, bitmap| {
            BitAndAssign::bitand_assign(&mut acc, bitmap?);
            Ok(acc)
        })
    }

    fn difference(self) -> Self::Output {
        let mut iter = self.into_iter();
        let first = match iter.next() {
            Some(bitmap) => bitmap?,
            None => return Ok(RoaringBitmap::new()),
        };
        iter.try_fold(first, |mut acc, bitmap| {
            SubAssign::sub_assign(&mut acc, &bitmap?);
            Ok(acc)
        })
    }

    fn symmetric_difference(self) -> Self::Output {
        self.into_iter().try_fold(RoaringBitmap::new(), |mut acc, bitmap| {
            BitXorAssign::bitxor_assign(&mut acc, bitmap?);
            Ok(acc)
        })
    }
}

impl<'a, E, I> MultiOps<Result<&'a RoaringBitmap, E>> for I
where
    I: IntoIterator<Item = Result<&'a RoaringBitmap, E>>,
{
    type Output = Result<RoaringBitmap, E>;

    fn union(self) -> Self::Output {
        self.into_iter().try_fold(RoaringBitmap::new(), |acc, bitmap| bitmap.map(|b| acc | b))
    }

    fn intersection(self) -> Self::Output {
        let mut iter = self.into_iter();
        let first = match iter.next() {
            Some(bitmap) => bitmap?.clone(),
            None => return Ok(RoaringBitmap::new()),
        };
        iter.try_fold(first, |acc, bitmap| bitmap.map(|b| acc & b))
    }

    fn difference(self) -> Self::Output {
        let mut iter = self.into_iter();
        let first = match iter.next() {
            Some(bitmap) => bitmap?.clone(),
            None => return Ok(RoaringBitmap::new()),
        };
        iter.try_fold(first, |acc, bitmap| bitmap.map(|b| acc - b))
    }

    fn symmetric_difference(self) -> Self::Output {
        let mut iter = self.into_iter();
        let first = match iter.next() {
            Some(bitmap) => bitmap?.clone(),
            None => return Ok(RoaringBitmap::new()),
        };
        iter.try_fold(first, |acc, bitmap| bitmap.map(|b| acc ^ b))
    }
}
