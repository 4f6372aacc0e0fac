use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// Three-way ordering over keys. The comparator is the only source of
/// ordering for a tree and must stay consistent for the tree's lifetime.
pub trait KeyComparator<K> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;

    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        self.compare(lhs, rhs) == Ordering::Less
    }

    #[inline]
    fn equal(&self, lhs: &K, rhs: &K) -> bool {
        self.compare(lhs, rhs) == Ordering::Equal
    }
}

#[derive(Clone)]
pub struct DefaultKeyComparator<K> {
    _k: PhantomData<fn(&K)>,
}

impl<K> DefaultKeyComparator<K> {
    pub fn new() -> Self {
        Self { _k: PhantomData }
    }
}

impl<K> Default for DefaultKeyComparator<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Debug for DefaultKeyComparator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultKeyComparator")
    }
}

impl<K: Ord> KeyComparator<K> for DefaultKeyComparator<K> {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Adapts a closure into a comparator, for keys without an `Ord` impl or
/// records that are only ordered by part of their contents.
#[derive(Clone)]
pub struct FnComparator<F> {
    f: F,
}

impl<F> FnComparator<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}

impl<K, F> KeyComparator<K> for FnComparator<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        (self.f)(lhs, rhs)
    }
}

/// Callback receiving records when a tree tears them down with
/// `destroy_with_entries` or `delete_entry`.
pub type Destructor<K> = Box<dyn FnMut(K)>;

#[cfg(test)]
#[test]
fn test_comparators() {
    let cmp = DefaultKeyComparator::<u64>::new();
    assert!(cmp.less(&1, &2));
    assert!(cmp.equal(&7, &7));

    let rev = FnComparator::new(|a: &u64, b: &u64| b.cmp(a));
    assert!(rev.less(&2, &1));
    assert_eq!(rev.compare(&3, &3), Ordering::Equal);
}
