mod array_store;
mod bitmap_store;
mod run_store;

use core::mem;
use core::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, RangeInclusive, Sub, SubAssign,
};
use core::slice;

pub use self::bitmap_store::BITMAP_LENGTH;
use self::Store::{Array, Bitmap, Run};

pub(crate) use self::array_store::ArrayStore;
pub use self::bitmap_store::{BitmapIter, BitmapStore};
pub(crate) use self::run_store::{Run as RunInterval, RunIter, RunStore};

/// Size in bytes of a bitmap container, used to decide whether `optimize`/`to_bitmap` is
/// worthwhile relative to the array or run representations.
pub(crate) const BITMAP_BYTES: usize = BITMAP_LENGTH * core::mem::size_of::<u64>();

#[derive(Clone, PartialEq)]
pub(crate) enum Store {
    Array(ArrayStore),
    Bitmap(BitmapStore),
    Run(RunStore),
}

#[derive(Clone)]
pub(crate) enum Iter<'a> {
    Array(slice::Iter<'a, u16>),
    Vec(std::vec::IntoIter<u16>),
    BitmapBorrowed(BitmapIter<&'a [u64; BITMAP_LENGTH]>),
    BitmapOwned(BitmapIter<Box<[u64; BITMAP_LENGTH]>>),
    RunBorrowed(RunIter<&'a [RunInterval]>),
    RunOwned(RunIter<Vec<RunInterval>>),
}

/// Converts a `Run` operand paired with a different representation into a bitmap, so that every
/// binary op only has to special-case same-representation pairs plus the long-standing
/// Array/Bitmap mix; Run containers are rare enough (`run_optimize` is opt-in) that paying a
/// conversion on a mixed pair is cheaper than hand-rolling every Run/Array and Run/Bitmap kernel.
fn normalize_run(store: &Store) -> Store {
    match store {
        Run(runs) => Bitmap(runs.to_bitmap_store()),
        other => other.clone(),
    }
}

impl Store {
    pub fn new() -> Store {
        Store::Array(ArrayStore::new())
    }

    pub fn full() -> Store {
        Store::Bitmap(BitmapStore::full())
    }

    #[inline]
    pub fn insert(&mut self, index: u16) -> bool {
        match self {
            Array(vec) => vec.insert(index),
            Bitmap(bits) => bits.insert(index),
            Run(runs) => runs.insert(index),
        }
    }

    pub fn insert_range(&mut self, range: RangeInclusive<u16>) -> u64 {
        if range.is_empty() {
            return 0;
        }
        match self {
            Array(vec) => vec.insert_range(range),
            Bitmap(bits) => bits.insert_range(range),
            Run(runs) => runs.insert_range(range),
        }
    }

    /// Push `index` at the end of the store only if `index` is the new max.
    ///
    /// Returns whether `index` was effectively pushed.
    pub fn push(&mut self, index: u16) -> bool {
        match self {
            Array(vec) => vec.push(index),
            Bitmap(bits) => bits.push(index),
            Run(runs) => runs.push(index),
        }
    }

    ///
    /// Pushes `index` at the end of the store.
    /// It is up to the caller to have validated index > self.max()
    ///
    /// # Panics
    ///
    /// If debug_assertions enabled and index is > self.max()
    pub(crate) fn push_unchecked(&mut self, index: u16) {
        match self {
            Array(vec) => vec.push_unchecked(index),
            Bitmap(bits) => bits.push_unchecked(index),
            Run(runs) => runs.push_unchecked(index),
        }
    }

    pub fn remove(&mut self, index: u16) -> bool {
        match self {
            Array(vec) => vec.remove(index),
            Bitmap(bits) => bits.remove(index),
            Run(runs) => runs.remove(index),
        }
    }

    pub fn remove_range(&mut self, range: RangeInclusive<u16>) -> u64 {
        if range.is_empty() {
            return 0;
        }
        match self {
            Array(vec) => vec.remove_range(range),
            Bitmap(bits) => bits.remove_range(range),
            Run(runs) => runs.remove_range(range),
        }
    }

    pub fn remove_smallest(&mut self, n: u64) {
        match self {
            Array(vec) => vec.remove_smallest(n),
            Bitmap(bits) => bits.remove_smallest(n),
            Run(runs) => runs.remove_smallest(n),
        }
    }

    pub fn remove_biggest(&mut self, n: u64) {
        match self {
            Array(vec) => vec.remove_biggest(n),
            Bitmap(bits) => bits.remove_biggest(n),
            Run(runs) => runs.remove_biggest(n),
        }
    }

    pub fn contains(&self, index: u16) -> bool {
        match self {
            Array(vec) => vec.contains(index),
            Bitmap(bits) => bits.contains(index),
            Run(runs) => runs.contains(index),
        }
    }

    pub fn contains_range(&self, range: RangeInclusive<u16>) -> bool {
        match self {
            Array(vec) => vec.contains_range(range),
            Bitmap(bits) => bits.contains_range(range),
            Run(runs) => runs.contains_range(range),
        }
    }

    pub fn is_full(&self) -> bool {
        self.len() == (1 << 16)
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        match (self, other) {
            (Array(vec1), Array(vec2)) => vec1.is_disjoint(vec2),
            (Bitmap(bits1), Bitmap(bits2)) => bits1.is_disjoint(bits2),
            (Array(vec), Bitmap(bits)) | (Bitmap(bits), Array(vec)) => {
                vec.iter().all(|&i| !bits.contains(i))
            }
            (Run(runs1), Run(runs2)) => runs1.is_disjoint(runs2),
            (run @ Run(..), Array(vec)) | (Array(vec), run @ Run(..)) => {
                vec.iter().all(|&i| !run.contains(i))
            }
            (Run(..), Bitmap(..)) | (Bitmap(..), Run(..)) => {
                let lhs = normalize_run(self);
                let rhs = normalize_run(other);
                lhs.is_disjoint(&rhs)
            }
        }
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        match (self, other) {
            (Array(vec1), Array(vec2)) => vec1.is_subset(vec2),
            (Bitmap(bits1), Bitmap(bits2)) => bits1.is_subset(bits2),
            (Array(vec), Bitmap(bits)) => vec.iter().all(|&i| bits.contains(i)),
            (Bitmap(..), Array(..)) => false,
            (Run(runs1), Run(runs2)) => runs1.is_subset(runs2),
            (Array(vec), run @ Run(..)) => vec.iter().all(|&i| run.contains(i)),
            (run @ Run(..), Array(vec)) => run.iter().all(|i| vec.contains(i)),
            (Run(..), Bitmap(..)) | (Bitmap(..), Run(..)) => {
                let lhs = normalize_run(self);
                let rhs = normalize_run(other);
                lhs.is_subset(&rhs)
            }
        }
    }

    pub fn intersection_len(&self, other: &Self) -> u64 {
        match (self, other) {
            (Array(vec1), Array(vec2)) => vec1.intersection_len(vec2),
            (Bitmap(bits1), Bitmap(bits2)) => bits1.intersection_len_bitmap(bits2),
            (Array(vec), Bitmap(bits)) | (Bitmap(bits), Array(vec)) => {
                bits.intersection_len_array(vec)
            }
            (Run(runs1), Run(runs2)) => runs1.intersection_len(runs2),
            (Run(runs), Array(vec)) | (Array(vec), Run(runs)) => runs.intersection_len_array(vec),
            (Run(runs), Bitmap(bits)) | (Bitmap(bits), Run(runs)) => {
                runs.intersection_len_bitmap(bits)
            }
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            Array(vec) => vec.len(),
            Bitmap(bits) => bits.len(),
            Run(runs) => runs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Array(vec) => vec.is_empty(),
            Bitmap(bits) => bits.is_empty(),
            Run(runs) => runs.is_empty(),
        }
    }

    pub fn min(&self) -> Option<u16> {
        match self {
            Array(vec) => vec.min(),
            Bitmap(bits) => bits.min(),
            Run(runs) => runs.min(),
        }
    }

    #[inline]
    pub fn max(&self) -> Option<u16> {
        match self {
            Array(vec) => vec.max(),
            Bitmap(bits) => bits.max(),
            Run(runs) => runs.max(),
        }
    }

    pub fn rank(&self, index: u16) -> u64 {
        match self {
            Array(vec) => vec.rank(index),
            Bitmap(bits) => bits.rank(index),
            Run(runs) => runs.rank(index),
        }
    }

    pub fn select(&self, n: u16) -> Option<u16> {
        match self {
            Array(vec) => vec.select(n),
            Bitmap(bits) => bits.select(n),
            Run(runs) => runs.select(n),
        }
    }

    pub fn count_runs(&self) -> u64 {
        match self {
            Array(vec) => {
                vec.iter()
                    .fold((-2, 0u64), |(prev, runs), &v| {
                        let new = v as i32;
                        if prev + 1 != new {
                            (new, runs + 1)
                        } else {
                            (new, runs)
                        }
                    })
                    .1
            }
            Bitmap(bits) => {
                let mut num_runs = 0u64;
                let array = bits.as_array();
                for i in 0..BITMAP_LENGTH - 1 {
                    let word = array[i];
                    let next_word = array[i + 1];
                    num_runs +=
                        ((word << 1) & !word).count_ones() as u64 + ((word >> 63) & !next_word);
                }
                let last = array[BITMAP_LENGTH - 1];
                num_runs += ((last << 1) & !last).count_ones() as u64 + (last >> 63);
                num_runs
            }
            Run(runs) => runs.count_runs(),
        }
    }

    pub(crate) fn to_bitmap(&self) -> Store {
        match self {
            Array(vec) => Bitmap(vec.to_bitmap_store()),
            Bitmap(_) => self.clone(),
            Run(runs) => Bitmap(runs.to_bitmap_store()),
        }
    }

    pub(crate) fn to_run(&self) -> Self {
        match self {
            Array(vec) => {
                let slice = vec.as_slice();
                let mut runs = Vec::new();
                let mut start = *slice.first().expect("to_run called on empty array store");
                for (idx, &v) in slice[1..].iter().enumerate() {
                    if v - slice[idx] > 1 {
                        runs.push(RunInterval::new(start, slice[idx]));
                        start = v;
                    }
                }
                runs.push(RunInterval::new(start, *slice.last().unwrap()));
                Run(RunStore::from_runs_unchecked(runs))
            }
            Bitmap(bits) => {
                let array = bits.as_array();
                let mut current = array[0];
                let mut i = 0u16;
                let mut runs = Vec::new();

                loop {
                    while current == 0 && i < BITMAP_LENGTH as u16 - 1 {
                        i += 1;
                        current = array[i as usize];
                    }
                    if current == 0 {
                        break;
                    }
                    let start = 64 * i + current.trailing_zeros() as u16;

                    current |= current - 1;
                    while current == u64::MAX && i < BITMAP_LENGTH as u16 - 1 {
                        i += 1;
                        current = array[i as usize];
                    }

                    if current == u64::MAX {
                        runs.push(RunInterval::new(start, u16::MAX));
                        break;
                    }

                    let end = 64 * i + (!current).trailing_zeros() as u16;
                    runs.push(RunInterval::new(start, end - 1));

                    current &= current + 1;
                }
                Run(RunStore::from_runs_unchecked(runs))
            }
            Run(_) => self.clone(),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new()
    }
}

impl BitOr<&Store> for &Store {
    type Output = Store;

    fn bitor(self, rhs: &Store) -> Store {
        match (self, rhs) {
            (Array(vec1), Array(vec2)) => Array(BitOr::bitor(vec1, vec2)),
            (Run(runs1), Run(runs2)) => Run(runs1.union(runs2)),
            _ => {
                let mut lhs = self.clone();
                BitOrAssign::bitor_assign(&mut lhs, rhs);
                lhs
            }
        }
    }
}

impl BitOrAssign<Store> for Store {
    fn bitor_assign(&mut self, rhs: Store) {
        BitOrAssign::bitor_assign(self, &rhs);
    }
}

impl BitOrAssign<&Store> for Store {
    fn bitor_assign(&mut self, rhs: &Store) {
        if matches!((&*self, rhs), (Run(_), Run(_))) {
            let (Run(runs1), Run(runs2)) = (&mut *self, rhs) else { unreachable!() };
            *runs1 = runs1.union(runs2);
            return;
        }
        if matches!(self, Run(_)) {
            *self = normalize_run(self);
        }
        let rhs_owned;
        let rhs = if matches!(rhs, Run(_)) {
            rhs_owned = normalize_run(rhs);
            &rhs_owned
        } else {
            rhs
        };

        match (self, rhs) {
            (Array(vec1), Array(vec2)) => {
                let this = mem::take(vec1);
                *vec1 = BitOr::bitor(&this, vec2);
            }
            (Bitmap(bits1), Array(vec2)) => {
                BitOrAssign::bitor_assign(bits1, vec2);
            }
            (Bitmap(bits1), Bitmap(bits2)) => {
                BitOrAssign::bitor_assign(bits1, bits2);
            }
            (this @ Array(..), Bitmap(bits2)) => {
                let mut lhs: Store = Bitmap(bits2.clone());
                BitOrAssign::bitor_assign(&mut lhs, &*this);
                *this = lhs;
            }
            (Run(..), _) | (_, Run(..)) => unreachable!("Run normalized above"),
        }
    }
}

impl BitAnd<&Store> for &Store {
    type Output = Store;

    fn bitand(self, rhs: &Store) -> Store {
        match (self, rhs) {
            (Array(vec1), Array(vec2)) => Array(BitAnd::bitand(vec1, vec2)),
            (Run(runs1), Run(runs2)) => Run(runs1.intersect(runs2)),
            (Bitmap(..), Array(..)) => {
                let mut rhs = rhs.clone();
                BitAndAssign::bitand_assign(&mut rhs, self);
                rhs
            }
            _ => {
                let mut lhs = self.clone();
                BitAndAssign::bitand_assign(&mut lhs, rhs);
                lhs
            }
        }
    }
}

impl BitAndAssign<Store> for Store {
    fn bitand_assign(&mut self, rhs: Store) {
        BitAndAssign::bitand_assign(self, &rhs);
    }
}

impl BitAndAssign<&Store> for Store {
    #[allow(clippy::suspicious_op_assign_impl)]
    fn bitand_assign(&mut self, rhs: &Store) {
        if matches!((&*self, rhs), (Run(_), Run(_))) {
            let (Run(runs1), Run(runs2)) = (&mut *self, rhs) else { unreachable!() };
            *runs1 = runs1.intersect(runs2);
            return;
        }
        if matches!(self, Run(_)) {
            *self = normalize_run(self);
        }
        let rhs_owned;
        let rhs = if matches!(rhs, Run(_)) {
            rhs_owned = normalize_run(rhs);
            &rhs_owned
        } else {
            rhs
        };

        match (self, rhs) {
            (Array(vec1), Array(vec2)) => {
                let (mut lhs, rhs) = if vec2.len() < vec1.len() {
                    (vec2.clone(), &*vec1)
                } else {
                    (mem::take(vec1), vec2)
                };
                BitAndAssign::bitand_assign(&mut lhs, rhs);
                *vec1 = lhs;
            }
            (Bitmap(bits1), Bitmap(bits2)) => {
                BitAndAssign::bitand_assign(bits1, bits2);
            }
            (Array(vec1), Bitmap(bits2)) => {
                BitAndAssign::bitand_assign(vec1, bits2);
            }
            (this @ Bitmap(..), Array(..)) => {
                let Array(vec2) = rhs else { unreachable!() };
                let mut new = Array(vec2.clone());
                BitAndAssign::bitand_assign(&mut new, &*this);
                *this = new;
            }
            (Run(..), _) | (_, Run(..)) => unreachable!("Run normalized above"),
        }
    }
}

impl Sub<&Store> for &Store {
    type Output = Store;

    fn sub(self, rhs: &Store) -> Store {
        match (self, rhs) {
            (Array(vec1), Array(vec2)) => Array(Sub::sub(vec1, vec2)),
            (Run(runs1), Run(runs2)) => Run(runs1.difference(runs2)),
            _ => {
                let mut lhs = self.clone();
                SubAssign::sub_assign(&mut lhs, rhs);
                lhs
            }
        }
    }
}

impl SubAssign<&Store> for Store {
    fn sub_assign(&mut self, rhs: &Store) {
        if matches!((&*self, rhs), (Run(_), Run(_))) {
            let (Run(runs1), Run(runs2)) = (&mut *self, rhs) else { unreachable!() };
            *runs1 = runs1.difference(runs2);
            return;
        }
        if matches!(self, Run(_)) {
            *self = normalize_run(self);
        }
        let rhs_owned;
        let rhs = if matches!(rhs, Run(_)) {
            rhs_owned = normalize_run(rhs);
            &rhs_owned
        } else {
            rhs
        };

        match (self, rhs) {
            (Array(vec1), Array(vec2)) => {
                SubAssign::sub_assign(vec1, vec2);
            }
            (Bitmap(bits1), Array(vec2)) => {
                SubAssign::sub_assign(bits1, vec2);
            }
            (Bitmap(bits1), Bitmap(bits2)) => {
                SubAssign::sub_assign(bits1, bits2);
            }
            (Array(vec1), Bitmap(bits2)) => {
                SubAssign::sub_assign(vec1, bits2);
            }
            (Run(..), _) | (_, Run(..)) => unreachable!("Run normalized above"),
        }
    }
}

impl BitXor<&Store> for &Store {
    type Output = Store;

    fn bitxor(self, rhs: &Store) -> Store {
        match (self, rhs) {
            (Array(vec1), Array(vec2)) => Array(BitXor::bitxor(vec1, vec2)),
            (Run(runs1), Run(runs2)) => Run(runs1.symmetric_difference(runs2)),
            (Array(..), Bitmap(..)) => {
                let mut lhs = rhs.clone();
                BitXorAssign::bitxor_assign(&mut lhs, self);
                lhs
            }
            _ => {
                let mut lhs = self.clone();
                BitXorAssign::bitxor_assign(&mut lhs, rhs);
                lhs
            }
        }
    }
}

impl BitXorAssign<Store> for Store {
    fn bitxor_assign(&mut self, rhs: Store) {
        BitXorAssign::bitxor_assign(self, &rhs);
    }
}

impl BitXorAssign<&Store> for Store {
    fn bitxor_assign(&mut self, rhs: &Store) {
        if matches!((&*self, rhs), (Run(_), Run(_))) {
            let (Run(runs1), Run(runs2)) = (&mut *self, rhs) else { unreachable!() };
            *runs1 = runs1.symmetric_difference(runs2);
            return;
        }
        if matches!(self, Run(_)) {
            *self = normalize_run(self);
        }
        let rhs_owned;
        let rhs = if matches!(rhs, Run(_)) {
            rhs_owned = normalize_run(rhs);
            &rhs_owned
        } else {
            rhs
        };

        match (self, rhs) {
            (Array(vec1), Array(vec2)) => {
                let this = mem::take(vec1);
                *vec1 = BitXor::bitxor(&this, vec2);
            }
            (Bitmap(bits1), Array(vec2)) => {
                BitXorAssign::bitxor_assign(bits1, vec2);
            }
            (Bitmap(bits1), Bitmap(bits2)) => {
                BitXorAssign::bitxor_assign(bits1, bits2);
            }
            (this @ Array(..), Bitmap(bits2)) => {
                let mut lhs: Store = Bitmap(bits2.clone());
                BitXorAssign::bitxor_assign(&mut lhs, &*this);
                *this = lhs;
            }
            (Run(..), _) | (_, Run(..)) => unreachable!("Run normalized above"),
        }
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = u16;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> {
        match self {
            Array(vec) => Iter::Array(vec.iter()),
            Bitmap(bits) => Iter::BitmapBorrowed(bits.iter()),
            Run(runs) => Iter::RunBorrowed(runs.iter()),
        }
    }
}

impl IntoIterator for Store {
    type Item = u16;
    type IntoIter = Iter<'static>;
    fn into_iter(self) -> Iter<'static> {
        match self {
            Array(vec) => Iter::Vec(vec.into_iter()),
            Bitmap(bits) => Iter::BitmapOwned(bits.into_iter()),
            Run(runs) => Iter::RunOwned(runs.into_iter()),
        }
    }
}

impl Iter<'_> {
    /// Advance the iterator to the first value greater than or equal to `n`.
    pub(crate) fn advance_to(&mut self, n: u16) {
        match self {
            Iter::Array(inner) => {
                let skip = inner.as_slice().partition_point(|&i| i < n);
                if let Some(nth) = skip.checked_sub(1) {
                    inner.nth(nth);
                }
            }
            Iter::Vec(inner) => {
                let skip = inner.as_slice().partition_point(|&i| i < n);
                if let Some(nth) = skip.checked_sub(1) {
                    inner.nth(nth);
                }
            }
            Iter::BitmapBorrowed(inner) => inner.advance_to(n),
            Iter::BitmapOwned(inner) => inner.advance_to(n),
            Iter::RunBorrowed(inner) => inner.advance_to(n),
            Iter::RunOwned(inner) => inner.advance_to(n),
        }
    }

    pub(crate) fn advance_back_to(&mut self, n: u16) {
        match self {
            Iter::Array(inner) => {
                let slice = inner.as_slice();
                let from_front = slice.partition_point(|&i| i <= n);
                let skip = slice.len() - from_front;
                if let Some(nth) = skip.checked_sub(1) {
                    inner.nth_back(nth);
                }
            }
            Iter::Vec(inner) => {
                let slice = inner.as_slice();
                let from_front = slice.partition_point(|&i| i <= n);
                let skip = slice.len() - from_front;
                if let Some(nth) = skip.checked_sub(1) {
                    inner.nth_back(nth);
                }
            }
            Iter::BitmapBorrowed(inner) => inner.advance_back_to(n),
            Iter::BitmapOwned(inner) => inner.advance_back_to(n),
            Iter::RunBorrowed(inner) => inner.advance_back_to(n),
            Iter::RunOwned(inner) => inner.advance_back_to(n),
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        match self {
            Iter::Array(inner) => inner.next().copied(),
            Iter::Vec(inner) => inner.next(),
            Iter::BitmapBorrowed(inner) => inner.next(),
            Iter::BitmapOwned(inner) => inner.next(),
            Iter::RunBorrowed(inner) => inner.next(),
            Iter::RunOwned(inner) => inner.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Array(inner) => inner.size_hint(),
            Iter::Vec(inner) => inner.size_hint(),
            Iter::BitmapBorrowed(inner) => inner.size_hint(),
            Iter::BitmapOwned(inner) => inner.size_hint(),
            Iter::RunBorrowed(inner) => inner.size_hint(),
            Iter::RunOwned(inner) => inner.size_hint(),
        }
    }

    fn count(self) -> usize
    where
        Self: Sized,
    {
        match self {
            Iter::Array(inner) => inner.count(),
            Iter::Vec(inner) => inner.count(),
            Iter::BitmapBorrowed(inner) => inner.count(),
            Iter::BitmapOwned(inner) => inner.count(),
            Iter::RunBorrowed(inner) => inner.count(),
            Iter::RunOwned(inner) => inner.count(),
        }
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        match self {
            Iter::Array(inner) => inner.nth(n).copied(),
            Iter::Vec(inner) => inner.nth(n),
            Iter::BitmapBorrowed(inner) => inner.nth(n),
            Iter::BitmapOwned(inner) => inner.nth(n),
            Iter::RunBorrowed(inner) => inner.nth(n),
            Iter::RunOwned(inner) => inner.nth(n),
        }
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Array(inner) => inner.next_back().copied(),
            Iter::Vec(inner) => inner.next_back(),
            Iter::BitmapBorrowed(inner) => inner.next_back(),
            Iter::BitmapOwned(inner) => inner.next_back(),
            Iter::RunBorrowed(inner) => inner.next_back(),
            Iter::RunOwned(inner) => inner.next_back(),
        }
    }
}

impl ExactSizeIterator for Iter<'_> {}
