//! Combinators building new predicate trees from existing ones.
//!
//! `Nothing` is the identity of both `and` and `or`. Adjacent lists of the
//! same kind are flattened, so chains of `&` produce a single `And` node:
//!
//! ```rust
//! use quarry_filter::{Filter, field};
//!
//! let filter = field("a").eq(1) & field("b").eq(2) & field("c").eq(3);
//! assert!(matches!(&filter, Filter::And(list) if list.len() == 3));
//!
//! assert_eq!(Filter::Nothing & field("a").eq(1), field("a").eq(1));
//! ```

use std::mem;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use bson::Bson;
use smol_str::SmolStr;

use crate::filter::Filter;

impl Filter {
    /// Combine with another filter using AND.
    ///
    /// Two `And` lists are concatenated; `Nothing` on either side yields the
    /// other operand; a single `And` list gets the other operand appended.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::Nothing, other) | (other, Self::Nothing) => other,
            (Self::And(mut filters), other) | (other, Self::And(mut filters)) => {
                filters.push(other);
                Self::And(filters)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Combine with another filter using OR.
    ///
    /// Follows the same rules as [`Filter::and`]; two `Or` lists are
    /// concatenated left then right.
    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Nothing, other) | (other, Self::Nothing) => other,
            (Self::Or(mut filters), other) | (other, Self::Or(mut filters)) => {
                filters.push(other);
                Self::Or(filters)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }

    /// Negate this filter.
    ///
    /// `Nothing` has no useful negation and is returned unchanged.
    pub fn not(self) -> Self {
        if self.is_nothing() {
            return Self::Nothing;
        }
        Self::Not(Box::new(self))
    }

    /// Fold filters together with [`Filter::and`].
    pub fn all_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        filters.into_iter().fold(Self::Nothing, Self::and)
    }

    /// Fold filters together with [`Filter::or`].
    pub fn any_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        filters.into_iter().fold(Self::Nothing, Self::or)
    }

    /// Equality over an optional value.
    ///
    /// A missing value means the key must not exist.
    pub fn key_eq(key: impl Into<SmolStr>, value: Option<Bson>) -> Self {
        match value {
            Some(value) => Self::Equals(key.into(), value),
            None => Self::Exists(key.into(), false),
        }
    }

    /// Inequality over an optional value.
    ///
    /// A missing value means the key must exist.
    pub fn key_ne(key: impl Into<SmolStr>, value: Option<Bson>) -> Self {
        match value {
            Some(value) => Self::NotEquals(key.into(), value),
            None => Self::Exists(key.into(), true),
        }
    }
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        self.and(rhs)
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        self.or(rhs)
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::not(self)
    }
}

impl BitAndAssign for Filter {
    fn bitand_assign(&mut self, rhs: Filter) {
        *self = mem::take(self).and(rhs);
    }
}

impl BitOrAssign for Filter {
    fn bitor_assign(&mut self, rhs: Filter) {
        *self = mem::take(self).or(rhs);
    }
}
