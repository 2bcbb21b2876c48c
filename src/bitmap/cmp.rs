use core::cmp::Ordering;
use core::iter::Peekable;

use super::container::Container;

/// Anything that can report the `u16` high-bits key of the container it wraps, so [`Pairs`] can
/// merge-join two sequences regardless of whether they hand out owned or borrowed containers.
pub(crate) trait Keyed {
    fn key(&self) -> u16;
}

impl Keyed for Container {
    fn key(&self) -> u16 {
        self.key
    }
}

impl Keyed for &Container {
    fn key(&self) -> u16 {
        self.key
    }
}

/// Merge-joins two container sequences on their high-bits key, the way a sort-merge join walks
/// two sorted tables: at each step the side with the smaller key is yielded alone, and matching
/// keys are yielded together.
pub(crate) struct Pairs<L, R>
where
    L: Iterator,
    R: Iterator,
{
    left: Peekable<L>,
    right: Peekable<R>,
}

impl<'a> Pairs<core::slice::Iter<'a, Container>, core::slice::Iter<'a, Container>> {
    pub fn new(left: &'a [Container], right: &'a [Container]) -> Self {
        Pairs { left: left.iter().peekable(), right: right.iter().peekable() }
    }
}

impl Pairs<alloc::vec::IntoIter<Container>, alloc::vec::IntoIter<Container>> {
    pub fn new(left: alloc::vec::Vec<Container>, right: alloc::vec::Vec<Container>) -> Self {
        Pairs { left: left.into_iter().peekable(), right: right.into_iter().peekable() }
    }
}

impl<'a> Pairs<alloc::vec::IntoIter<Container>, core::slice::Iter<'a, Container>> {
    pub fn new(left: alloc::vec::Vec<Container>, right: &'a [Container]) -> Self {
        Pairs { left: left.into_iter().peekable(), right: right.iter().peekable() }
    }
}

impl<L, R> Iterator for Pairs<L, R>
where
    L: Iterator,
    R: Iterator,
    L::Item: Keyed,
    R::Item: Keyed,
{
    type Item = (Option<L::Item>, Option<R::Item>);

    fn next(&mut self) -> Option<Self::Item> {
        let ordering = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(lhs), Some(rhs)) => lhs.key().cmp(&rhs.key()),
        };

        match ordering {
            Ordering::Less => Some((self.left.next(), None)),
            Ordering::Greater => Some((None, self.right.next())),
            Ordering::Equal => Some((self.left.next(), self.right.next())),
        }
    }
}
