//! Category Sets
//!
//! An ordered, deduplicated collection of product category labels, used both
//! for the distinct categories observed in a cart and for the
//! applicable/excluded category rules on coupons.

use std::string::ToString;

use smallvec::SmallVec;

/// A sorted, deduplicated set of category labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorySet {
    categories: SmallVec<[String; 5]>,
}

impl CategorySet {
    /// Create a category set from a vector of labels, sorting and
    /// deduplicating them.
    #[must_use]
    pub fn new(categories: SmallVec<[String; 5]>) -> Self {
        let mut set = Self { categories };

        set.categories.sort();
        set.categories.dedup();

        set
    }

    /// Create a category set from string slices.
    pub fn from_strs(categories: &[&str]) -> Self {
        Self::new(
            categories
                .iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Create an empty category set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            categories: SmallVec::new(),
        }
    }

    /// Add a category label, keeping the set sorted and deduplicated.
    pub fn add(&mut self, category: &str) {
        if let Err(position) = self.categories.binary_search_by(|c| c.as_str().cmp(category)) {
            self.categories.insert(position, category.to_string());
        }
    }

    /// Check whether the set contains a specific category.
    pub fn contains(&self, category: &str) -> bool {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .is_ok()
    }

    /// Check whether this set shares at least one category with another.
    pub fn intersects(&self, other: &Self) -> bool {
        // Two-pointer walk over the sorted entries, O(n + m).
        let mut left = self.categories.iter();
        let mut right = other.categories.iter();
        let mut left_category = left.next();
        let mut right_category = right.next();

        while let (Some(left_ref), Some(right_ref)) = (left_category, right_category) {
            match left_ref.cmp(right_ref) {
                std::cmp::Ordering::Equal => return true,
                std::cmp::Ordering::Less => left_category = left.next(),
                std::cmp::Ordering::Greater => right_category = right.next(),
            }
        }

        false
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Get the number of categories in the set.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Iterate over the labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for CategorySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(ToString::to_string).collect())
    }
}
