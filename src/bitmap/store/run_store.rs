use core::cmp::Ordering;
use core::fmt::{Display, Formatter};
use core::ops::RangeInclusive;

use super::array_store::ArrayStore;
use super::bitmap_store::{bit, key, BitmapStore, BITMAP_LENGTH};

pub(crate) const RUN_ELEMENT_BYTES: usize = 4;

#[derive(PartialEq, Eq, Clone, Debug)]
pub(crate) struct RunStore(Vec<Run>);

/// A maximal, inclusive run of set bits. Runs in a `RunStore` are kept sorted, non-overlapping
/// and non-adjacent: any two runs always have a gap between them, otherwise they'd be merged
/// into a single run by whichever operation produced them.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub(crate) struct Run {
    pub start: u16,
    pub end: u16,
}

pub(crate) fn cmp_index_run(index: u16, run: Run) -> Ordering {
    if index < run.start {
        Ordering::Less
    } else if index > run.end {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl Run {
    pub fn new(start: u16, end: u16) -> Run {
        Run { start, end }
    }

    pub fn contains_index(&self, value: u16) -> bool {
        self.start <= value && value <= self.end
    }

    pub fn contains_interval(&self, other: &Run) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn run_len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }
}

impl RunStore {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_range(start: u16, end: u16) -> Self {
        Self(vec![Run::new(start, end)])
    }

    pub fn full() -> Self {
        Self(vec![Run::new(0, u16::MAX)])
    }

    /// Wraps an already normalized (sorted, non-overlapping, non-adjacent) run list.
    pub(crate) fn from_runs_unchecked(runs: Vec<Run>) -> Self {
        Self(runs)
    }

    pub fn serialized_byte_size(num_runs: u64) -> usize {
        num_runs as usize * RUN_ELEMENT_BYTES
    }

    pub fn serialized_byte_size_self(&self) -> usize {
        Self::serialized_byte_size(self.0.len() as u64)
    }

    #[inline]
    pub fn insert(&mut self, index: u16) -> bool {
        self.0
            .binary_search_by(|run| cmp_index_run(index, *run))
            .map_err(|loc| {
                let loc_or_last = if loc < self.0.len() {
                    Some(loc)
                } else if !self.0.is_empty() {
                    Some(self.0.len() - 1)
                } else {
                    None
                };
                if let Some(loc_or_last) = loc_or_last {
                    if index == self.0[loc_or_last].end + 1 {
                        self.0[loc_or_last].end += 1;
                    } else if index.checked_add(1).map(|f| f == self.0[loc_or_last].start).unwrap_or(false)
                    {
                        if loc > 0 && self.0[loc - 1].end == index - 1 {
                            self.0[loc - 1].end = self.0[loc].end;
                            self.0.remove(loc);
                            return;
                        }
                        self.0[loc].start -= 1;
                    } else {
                        self.0.insert(loc, Run::new(index, index));
                    }
                } else {
                    self.0.insert(loc, Run::new(index, index));
                }
            })
            .is_err()
    }

    #[inline]
    pub fn insert_range(&mut self, range: RangeInclusive<u16>) -> u64 {
        let run = Run { start: *range.start(), end: *range.end() };
        let first = self.0.binary_search_by(|r| cmp_index_run(run.start, *r));
        let last = self.0.binary_search_by(|r| cmp_index_run(run.end, *r));
        match (first, last) {
            (Ok(begin), Ok(end)) => {
                if begin == end {
                    return 0;
                }
                let drained: u64 = self.0[begin + 1..end].iter().map(Run::run_len).sum();
                let amount =
                    Run::new(self.0[begin].end + 1, self.0[end].start - 1).run_len() - drained;
                self.0[begin].end = self.0[end].end;
                self.0.drain(begin + 1..=end);
                amount
            }
            (Ok(begin), Err(to_insert)) => {
                let (new_end, drain_id) = if to_insert < self.0.len()
                    && self.0[to_insert].start - 1 == run.end
                {
                    (self.0[to_insert].start, to_insert + 1)
                } else {
                    (run.end, to_insert)
                };
                let drained: u64 = self.0[begin + 1..to_insert].iter().map(Run::run_len).sum();
                let amount = Run::new(self.0[begin].end + 1, run.end).run_len() - drained;
                self.0[begin].end = new_end;
                self.0.drain(begin + 1..drain_id);
                amount
            }
            (Err(to_begin), Ok(end)) => {
                let consecutive_begin =
                    to_begin > 0 && self.0[to_begin - 1].end + 1 == run.start;
                let (drain_id, run_id) = if consecutive_begin {
                    (end + 1, to_begin - 1)
                } else {
                    (end, end)
                };
                let drained: u64 = self.0[to_begin..end].iter().map(Run::run_len).sum();
                let amount = Run::new(run.start, self.0[end].start - 1).run_len() - drained;
                if consecutive_begin {
                    self.0[run_id].end = self.0[end].end;
                } else {
                    self.0[run_id].start = run.start;
                }
                self.0.drain(to_begin..drain_id);
                amount
            }
            (Err(to_begin), Err(to_end)) => {
                if self.0.is_empty() {
                    self.0.insert(to_begin, run);
                    return run.run_len();
                }
                let consec_begin = to_begin > 0 && self.0[to_begin - 1].end + 1 == run.start;
                let consec_end = to_end < self.0.len()
                    && self.0[to_end].start.checked_sub(1).map(|f| f == run.end).unwrap_or(false);
                if !consec_begin && !consec_end && to_begin == to_end {
                    self.0.insert(to_begin, run);
                    return run.run_len();
                }
                let (drain_begin, drain_end, run_id) = if consec_end && consec_begin {
                    (to_begin, to_end + 1, to_begin - 1)
                } else if consec_begin {
                    (to_begin, to_end, to_begin - 1)
                } else if consec_end {
                    (to_begin, to_end, to_end)
                } else {
                    (
                        to_begin,
                        to_end.min(self.0.len() - 1),
                        if to_end != self.0.len() { to_begin } else { to_end.min(self.0.len() - 1) },
                    )
                };
                let drained: u64 = self.0[to_begin..to_end].iter().map(Run::run_len).sum();
                let end_amount = if consec_end { self.0[to_end].start - 1 } else { run.end };
                let amount = Run::new(run.start, end_amount).run_len() - drained;
                let new_end = if consec_end { self.0[to_end].end } else { run.end };
                self.0[run_id].end = new_end;
                if !consec_begin {
                    self.0[run_id].start = run.start;
                }
                self.0.drain(drain_begin..drain_end);
                amount
            }
        }
    }

    pub fn push(&mut self, index: u16) -> bool {
        if let Some(last) = self.0.last_mut() {
            if last.end.checked_add(1).map(|f| f == index).unwrap_or(false) {
                last.end = index;
                true
            } else if last.end < index {
                self.0.push(Run::new(index, index));
                true
            } else {
                false
            }
        } else {
            self.0.push(Run::new(index, index));
            true
        }
    }

    pub(crate) fn push_unchecked(&mut self, index: u16) {
        if cfg!(debug_assertions) {
            if let Some(max) = self.max() {
                assert!(index > max, "store max >= index")
            }
        }
        self.push(index);
    }

    pub fn remove(&mut self, index: u16) -> bool {
        self.0
            .binary_search_by(|run| cmp_index_run(index, *run))
            .map(|loc| {
                if index == self.0[loc].start && index == self.0[loc].end {
                    self.0.remove(loc);
                } else if index == self.0[loc].end {
                    self.0[loc].end = index - 1;
                } else if index == self.0[loc].start {
                    self.0[loc].start = index + 1;
                } else {
                    let new_run = Run::new(index + 1, self.0[loc].end);
                    self.0[loc].end = index - 1;
                    self.0.insert(loc + 1, new_run);
                }
            })
            .is_ok()
    }

    pub fn remove_range(&mut self, range: RangeInclusive<u16>) -> u64 {
        let run = Run { start: *range.start(), end: *range.end() };
        let first = self.0.binary_search_by(|r| cmp_index_run(run.start, *r));
        let last = self.0.binary_search_by(|r| cmp_index_run(run.end, *r));
        struct IdValue {
            index: usize,
            value: u16,
        }
        struct Plan {
            drain_range: core::ops::Range<usize>,
            begin_value: Option<IdValue>,
            end_value: Option<IdValue>,
            residual_count: u64,
        }
        if self.0.is_empty() {
            return 0;
        }
        let plan = match (first, last) {
            (Ok(begin), Ok(end)) => {
                if self.0[begin].start == run.start && self.0[end].end == run.end {
                    Plan { drain_range: begin..end + 1, begin_value: None, end_value: None, residual_count: 0 }
                } else if self.0[begin].start == run.start {
                    Plan {
                        drain_range: begin..end,
                        begin_value: None,
                        end_value: Some(IdValue { index: end, value: run.end + 1 }),
                        residual_count: Run::new(self.0[end].start, run.end).run_len(),
                    }
                } else if self.0[end].end == run.end {
                    Plan {
                        drain_range: begin + 1..end + 1,
                        begin_value: Some(IdValue { index: begin, value: run.start - 1 }),
                        end_value: None,
                        residual_count: Run::new(run.start, self.0[begin].end).run_len(),
                    }
                } else {
                    Plan {
                        drain_range: begin + 1..end,
                        begin_value: Some(IdValue { index: begin, value: run.start - 1 }),
                        end_value: Some(IdValue { index: end, value: run.end + 1 }),
                        residual_count: Run::new(self.0[end].start, run.end).run_len()
                            + Run::new(run.start, self.0[begin].end).run_len(),
                    }
                }
            }
            (Ok(begin), Err(to_insert)) => {
                let end = if to_insert == self.0.len() { self.0.len() - 1 } else { to_insert };
                if self.0[begin].start == run.start {
                    Plan { drain_range: begin..end, begin_value: None, end_value: None, residual_count: 0 }
                } else {
                    Plan {
                        drain_range: begin + 1..end + 1,
                        begin_value: Some(IdValue { index: begin, value: run.start - 1 }),
                        end_value: None,
                        residual_count: Run::new(run.start, self.0[begin].end).run_len(),
                    }
                }
            }
            (Err(begin), Ok(end)) => {
                if self.0[begin].end == run.end {
                    Plan { drain_range: begin..end + 1, begin_value: None, end_value: None, residual_count: 0 }
                } else {
                    Plan {
                        drain_range: begin..end,
                        begin_value: None,
                        end_value: Some(IdValue { index: end, value: run.end + 1 }),
                        residual_count: Run::new(self.0[end].start, run.end).run_len(),
                    }
                }
            }
            (Err(begin), Err(to_end)) => {
                let end = if to_end == self.0.len() { self.0.len() - 1 } else { to_end };
                Plan { drain_range: begin..end + 1, begin_value: None, end_value: None, residual_count: 0 }
            }
        };
        let count = self.0[plan.drain_range.clone()].iter().map(Run::run_len).sum::<u64>()
            + plan.residual_count;
        if let Some(IdValue { index, value }) = plan.begin_value {
            self.0[index].end = value;
        }
        if let Some(IdValue { index, value }) = plan.end_value {
            self.0[index].start = value;
        }
        self.0.drain(plan.drain_range);
        count
    }

    pub fn remove_smallest(&mut self, mut amount: u64) {
        let mut remove_to = 0;
        let mut last = None;
        for (i, run) in self.0.iter_mut().enumerate() {
            let too_much = run.run_len() < amount;
            if too_much {
                amount -= run.run_len();
            }
            remove_to = i;
            last = Some(run);
            if !too_much {
                break;
            }
        }
        if let Some(last) = last {
            if last.run_len() < amount {
                remove_to += 1;
            } else {
                last.start += amount as u16;
            }
        }
        self.0.drain(..remove_to);
    }

    pub fn remove_biggest(&mut self, mut amount: u64) {
        let mut remove_from = self.0.len();
        let mut last = None;
        for (i, run) in self.0.iter_mut().enumerate().rev() {
            let too_much = run.run_len() < amount;
            if too_much {
                amount -= run.run_len();
            }
            remove_from = i;
            last = Some(run);
            if !too_much {
                break;
            }
        }
        if let Some(last) = last {
            if last.run_len() < amount {
                // nothing left of this run
            } else {
                last.end -= amount as u16;
                remove_from += 1;
            }
        }
        self.0.drain(remove_from..);
    }

    pub fn contains(&self, index: u16) -> bool {
        self.0.binary_search_by(|run| cmp_index_run(index, *run)).is_ok()
    }

    pub fn contains_range(&self, range: RangeInclusive<u16>) -> bool {
        let start = *range.start();
        let end = *range.end();
        match self.0.binary_search_by(|run| cmp_index_run(start, *run)) {
            Ok(loc) => self.0[loc].end >= end,
            Err(_) => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.0.len() == 1 && self.0[0].start == 0 && self.0[0].end == u16::MAX
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (mut i1, mut i2) = (self.0.iter(), other.0.iter());
        let (mut r1, mut r2) = (i1.next(), i2.next());
        loop {
            match (r1, r2) {
                (Some(a), Some(b)) => {
                    if a.start <= b.end && b.start <= a.end {
                        return false;
                    }
                    match a.end.cmp(&b.end) {
                        Ordering::Less => r1 = i1.next(),
                        Ordering::Greater => r2 = i2.next(),
                        Ordering::Equal => {
                            r1 = i1.next();
                            r2 = i2.next();
                        }
                    }
                }
                _ => return true,
            }
        }
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        let mut j = 0;
        'outer: for r in &self.0 {
            while j < other.0.len() {
                let o = other.0[j];
                if o.end < r.start {
                    j += 1;
                    continue;
                }
                if o.start <= r.start && r.end <= o.end {
                    continue 'outer;
                }
                return false;
            }
            return false;
        }
        true
    }

    pub fn intersection_len(&self, other: &Self) -> u64 {
        let mut total = 0u64;
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let a = self.0[i];
            let b = other.0[j];
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start <= end {
                total += Run::new(start, end).run_len();
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        total
    }

    pub(crate) fn intersection_len_array(&self, other: &ArrayStore) -> u64 {
        other.iter().filter(|&&i| self.contains(i)).count() as u64
    }

    pub(crate) fn intersection_len_bitmap(&self, other: &BitmapStore) -> u64 {
        self.iter().filter(|&i| other.contains(i)).count() as u64
    }

    pub fn len(&self) -> u64 {
        self.0.iter().map(Run::run_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<u16> {
        self.0.first().map(|r| r.start)
    }

    #[inline]
    pub fn max(&self) -> Option<u16> {
        self.0.last().map(|r| r.end)
    }

    pub fn rank(&self, index: u16) -> u64 {
        let mut rank = 0u64;
        for run in &self.0 {
            if run.end < index {
                rank += run.run_len();
            } else if run.start <= index {
                rank += u64::from(index - run.start) + 1;
                break;
            } else {
                break;
            }
        }
        rank
    }

    pub fn select(&self, n: u16) -> Option<u16> {
        let mut n = n as u64;
        for run in &self.0 {
            let len = run.run_len();
            if n < len {
                return Some(run.start + n as u16);
            }
            n -= len;
        }
        None
    }

    pub fn count_runs(&self) -> u64 {
        self.0.len() as u64
    }

    pub fn to_array_store(&self) -> ArrayStore {
        ArrayStore::from_vec_unchecked(self.iter().collect())
    }

    pub fn to_bitmap_store(&self) -> BitmapStore {
        let mut bits = Box::new([0u64; BITMAP_LENGTH]);
        let mut len = 0u64;
        for run in &self.0 {
            for index in run.start..=run.end {
                bits[key(index)] |= 1 << bit(index);
            }
            len += run.run_len();
        }
        BitmapStore::from_unchecked(len, bits)
    }

    pub fn iter(&self) -> RunIter<&[Run]> {
        RunIter::new(&self.0)
    }

    pub(crate) fn as_slice(&self) -> &[Run] {
        &self.0
    }

    pub fn into_iter(self) -> RunIter<Vec<Run>> {
        RunIter::new(self.0)
    }

    /// Union of two run lists, merging adjacent and overlapping runs. Shared by `BitOr` and by
    /// `BitXor`, which unions the two one-sided differences.
    pub(crate) fn union_runs(a: &[Run], b: &[Run]) -> Vec<Run> {
        let mut merged: Vec<Run> = Vec::with_capacity(a.len() + b.len());
        let (mut i1, mut i2) = (a.iter(), b.iter());
        let (mut r1, mut r2) = (i1.next(), i2.next());
        loop {
            let run = match (r1, r2) {
                (None, None) => break,
                (Some(v1), None) => {
                    r1 = i1.next();
                    *v1
                }
                (None, Some(v2)) => {
                    r2 = i2.next();
                    *v2
                }
                (Some(v1), Some(v2)) => match v1.start.cmp(&v2.start) {
                    Ordering::Less => {
                        r1 = i1.next();
                        *v1
                    }
                    Ordering::Greater => {
                        r2 = i2.next();
                        *v2
                    }
                    Ordering::Equal => {
                        r1 = i1.next();
                        r2 = i2.next();
                        *v1
                    }
                },
            };
            match merged.last_mut() {
                None => merged.push(run),
                Some(last) => {
                    if (last.end as i32) + 1 < run.start as i32 {
                        merged.push(run);
                    } else {
                        last.end = last.end.max(run.end);
                    }
                }
            }
        }
        merged
    }

    /// `a - b`, represented internally with `i32` offsets so the arithmetic around `u16::MAX`
    /// never overflows.
    pub(crate) fn difference_runs(a: &[Run], b: &[Run]) -> Vec<Run> {
        let mut result = Vec::new();
        let mut j = 0usize;
        for r in a {
            let mut cur = r.start as i32;
            let end = r.end as i32;
            while j < b.len() && (b[j].end as i32) < cur {
                j += 1;
            }
            let mut k = j;
            while cur <= end {
                if k >= b.len() || b[k].start as i32 > end {
                    result.push(Run::new(cur as u16, end as u16));
                    break;
                }
                let bs = b[k].start as i32;
                let be = b[k].end as i32;
                if be < cur {
                    k += 1;
                    continue;
                }
                if bs > cur {
                    result.push(Run::new(cur as u16, (bs - 1) as u16));
                }
                if be >= end {
                    break;
                }
                cur = be + 1;
                k += 1;
            }
        }
        result
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(Self::union_runs(&self.0, &other.0))
    }

    pub fn intersect(&self, other: &Self) -> Self {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let a = self.0[i];
            let b = other.0[j];
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start <= end {
                result.push(Run::new(start, end));
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self(result)
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(Self::difference_runs(&self.0, &other.0))
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let a_minus_b = Self::difference_runs(&self.0, &other.0);
        let b_minus_a = Self::difference_runs(&other.0, &self.0);
        Self(Self::union_runs(&a_minus_b, &b_minus_a))
    }
}

impl Default for RunStore {
    fn default() -> Self {
        RunStore::new()
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    Overlapping,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::Overlapping => write!(f, "runs overlap or are not in sorted order"),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Clone)]
pub struct RunIter<B: core::borrow::Borrow<[Run]>> {
    runs: B,
    front_run: usize,
    front_val: u32,
    back_run: usize,
    back_val: u32,
    remaining: usize,
}

impl<B: core::borrow::Borrow<[Run]>> RunIter<B> {
    fn new(runs: B) -> Self {
        let (front_val, back_run, back_val, remaining) = {
            let slice = runs.borrow();
            let remaining = slice.iter().map(|r| r.run_len() as usize).sum();
            if slice.is_empty() {
                (0, 0, 0, remaining)
            } else {
                let last = slice.len() - 1;
                (slice[0].start as u32, last, slice[last].end as u32, remaining)
            }
        };
        RunIter { runs, front_run: 0, front_val, back_run, back_val, remaining }
    }

    /// Advance the front of the iterator to the first value >= `n`, recomputing `remaining`.
    pub(crate) fn advance_to(&mut self, n: u16) {
        let slice = self.runs.borrow();
        if self.remaining == 0 || (n as u32) <= self.front_val {
            return;
        }
        if (n as u32) > self.back_val {
            self.remaining = 0;
            return;
        }
        let idx = slice[self.front_run..=self.back_run]
            .partition_point(|r| (r.end as u32) < n as u32)
            + self.front_run;
        self.front_run = idx;
        self.front_val = (n as u32).max(slice[idx].start as u32);
        self.remaining = slice[idx..=self.back_run]
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let start = if i == 0 { self.front_val } else { r.start as u32 };
                let end = if self.front_run + i == self.back_run { self.back_val } else { r.end as u32 };
                (end - start + 1) as usize
            })
            .sum();
    }

    /// Advance the back of the iterator to the last value <= `n`, recomputing `remaining`.
    pub(crate) fn advance_back_to(&mut self, n: u16) {
        let slice = self.runs.borrow();
        if self.remaining == 0 || (n as u32) >= self.back_val {
            return;
        }
        if (n as u32) < self.front_val {
            self.remaining = 0;
            return;
        }
        let idx = slice[self.front_run..=self.back_run]
            .partition_point(|r| (r.start as u32) <= n as u32)
            + self.front_run
            - 1;
        self.back_run = idx;
        self.back_val = (n as u32).min(slice[idx].end as u32);
        self.remaining = slice[self.front_run..=idx]
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let start = if self.front_run + i == self.front_run { self.front_val } else { r.start as u32 };
                let end = if self.front_run + i == idx { self.back_val } else { r.end as u32 };
                (end - start + 1) as usize
            })
            .sum();
    }
}

impl<B: core::borrow::Borrow<[Run]>> Iterator for RunIter<B> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.front_val as u16;
        self.remaining -= 1;
        if self.remaining > 0 {
            if self.front_val < self.runs.borrow()[self.front_run].end as u32 {
                self.front_val += 1;
            } else {
                self.front_run += 1;
                self.front_val = self.runs.borrow()[self.front_run].start as u32;
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<B: core::borrow::Borrow<[Run]>> DoubleEndedIterator for RunIter<B> {
    fn next_back(&mut self) -> Option<u16> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.back_val as u16;
        self.remaining -= 1;
        if self.remaining > 0 {
            if self.back_val > self.runs.borrow()[self.back_run].start as u32 {
                self.back_val -= 1;
            } else {
                self.back_run -= 1;
                self.back_val = self.runs.borrow()[self.back_run].end as u32;
            }
        }
        Some(result)
    }
}

impl<B: core::borrow::Borrow<[Run]>> ExactSizeIterator for RunIter<B> {}
