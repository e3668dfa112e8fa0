//! Non-empty vector.
//!
//! `NonEmptyVec<T>` holds at least one element. It is backed by a single
//! contiguous `Vec`, so it hands out slices for chunked processing.

use std::fmt;
use std::ops::Deref;

/// A vector that is guaranteed to contain at least one element.
///
/// # Example
///
/// ```rust
/// use tabvault_core::NonEmptyVec;
///
/// let vec = NonEmptyVec::try_from(vec![1, 2, 3]).unwrap();
/// assert_eq!(vec.first(), &1);
/// assert_eq!(vec.len(), 3);
/// assert_eq!(vec.chunks(2).count(), 2);
///
/// assert!(NonEmptyVec::<i32>::try_from(Vec::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NonEmptyVec<T> {
    items: Vec<T>,
}

impl<T> NonEmptyVec<T> {
    /// The first element; always present.
    pub fn first(&self) -> &T {
        &self.items[0]
    }

    /// The last element; always present.
    pub fn last(&self) -> &T {
        &self.items[self.items.len() - 1]
    }

    /// Number of elements, at least 1.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Deref for NonEmptyVec<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> TryFrom<Vec<T>> for NonEmptyVec<T> {
    type Error = EmptyVecError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        if items.is_empty() {
            Err(EmptyVecError)
        } else {
            Ok(Self { items })
        }
    }
}

impl<T> From<NonEmptyVec<T>> for Vec<T> {
    fn from(non_empty: NonEmptyVec<T>) -> Self {
        non_empty.items
    }
}

impl<T> IntoIterator for NonEmptyVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NonEmptyVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Error for building a `NonEmptyVec` from an empty `Vec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyVecError;

impl fmt::Display for EmptyVecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot create NonEmptyVec from empty Vec")
    }
}

impl std::error::Error for EmptyVecError {}
