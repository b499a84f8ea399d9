//! Hash-ordered collections of inputs, outputs and kernels
//!
//! Blocks must list their inputs, outputs and kernels in ascending order of
//! element hash. When several transactions are merged into one block this
//! canonical order hides which inputs and outputs belonged together.
//! Validators only check the order; producers sort.

use bytes::{Buf, BufMut};
use std::ops::Deref;

use super::input::Input;
use super::kernel::TxKernel;
use super::output::Output;
use super::ser::{read_list, Decode, DecodeError, Encode};
use crate::crypto::hash::Hash;

/// The key an element is ordered by
pub trait SortKey {
    fn sort_key(&self) -> Hash;
}

/// A list ordered by element hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashList<T>(Vec<T>);

pub type InputList = HashList<Input>;
pub type OutputList = HashList<Output>;
pub type TxKernelList = HashList<TxKernel>;

impl<T> Default for HashList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: SortKey> HashList<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    /// Whether element `i` orders strictly before element `j`
    pub fn less(&self, i: usize, j: usize) -> bool {
        self.0[i].sort_key() < self.0[j].sort_key()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Non-decreasing by hash. Equal neighbours pass; duplicate spends are
    /// the UTXO layer's concern.
    pub fn is_sorted(&self) -> bool {
        let keys: Vec<Hash> = self.0.iter().map(SortKey::sort_key).collect();
        keys.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// Put the list into canonical order
    pub fn sort(&mut self) {
        self.0.sort_by_cached_key(SortKey::sort_key);
    }

    /// Elements in canonical order, without touching the list itself
    pub fn sorted_view(&self) -> Vec<&T> {
        let mut keyed: Vec<(Hash, &T)> = self.0.iter().map(|item| (item.sort_key(), item)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, item)| item).collect()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, f: F) {
        self.0.retain(f);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T: SortKey + Encode> HashList<T> {
    /// Write the elements in canonical order. The count is written separately
    /// by the containing block or transaction.
    pub fn encode_items<B: BufMut>(&self, buf: &mut B) {
        for item in self.sorted_view() {
            item.encode_to(buf);
        }
    }
}

impl<T: SortKey + Decode> HashList<T> {
    /// Read exactly `count` elements in wire order
    pub fn decode_items<B: Buf>(
        buf: &mut B,
        count: u64,
        min_element_size: usize,
    ) -> Result<Self, DecodeError> {
        read_list(buf, count, min_element_size).map(HashList)
    }
}

impl<T> Deref for HashList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for HashList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for HashList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for HashList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<T> IntoIterator for HashList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a HashList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::OutputFeatures;
    use crate::core::test_util::{output, random_commitment};

    fn inputs(n: usize) -> InputList {
        (0..n)
            .map(|_| Input::new(OutputFeatures::empty(), random_commitment()))
            .collect()
    }

    #[test]
    fn test_sort_orders_by_hash() {
        let mut list = inputs(8);
        list.sort();

        assert!(list.is_sorted());
        for i in 1..list.len() {
            assert!(!list.less(i, i - 1));
        }
    }

    #[test]
    fn test_swap_breaks_order() {
        let mut list = inputs(4);
        list.sort();
        list.swap(1, 2);
        assert!(!list.is_sorted());
    }

    #[test]
    fn test_sorted_view_leaves_list_alone() {
        let mut list: OutputList = (0..6).map(|v| output(v + 1, OutputFeatures::empty()).0).collect();
        if list.is_sorted() {
            list.swap(0, 1);
        }
        let before = list.clone();

        let view = list.sorted_view();
        let keys: Vec<Hash> = view.iter().map(|o| o.hash()).collect();
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(list, before);
    }

    #[test]
    fn test_empty_and_single_are_sorted() {
        assert!(InputList::new().is_sorted());
        assert!(inputs(1).is_sorted());
    }
}
