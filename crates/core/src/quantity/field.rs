//! Editing state for a single quantity input.

use super::{QuantityPolicy, parse_quantity};

/// One quantity input bound to a product's policy.
///
/// The field keeps two values: the `draft` the user sees while typing, and
/// the last `committed` value. Steppers and blur commit; typing only moves the
/// draft. Only committed values are meant to reach the cart store, so an
/// off-grid draft is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityField {
    policy: QuantityPolicy,
    committed: i64,
    draft: i64,
}

impl QuantityField {
    /// A field showing `committed`.
    #[must_use]
    pub const fn new(policy: QuantityPolicy, committed: i64) -> Self {
        Self {
            policy,
            committed,
            draft: committed,
        }
    }

    /// A field for a line that does not exist yet.
    #[must_use]
    pub const fn initial(policy: QuantityPolicy) -> Self {
        Self::new(policy, policy.initial())
    }

    /// The value currently shown.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.draft
    }

    /// The last committed value.
    #[must_use]
    pub const fn committed(&self) -> i64 {
        self.committed
    }

    /// Returns `true` if the shown value has not been committed yet.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Press "+". Commits and returns the new value.
    pub fn step_up(&mut self) -> i64 {
        let next = self.policy.increment(self.draft);
        self.commit(next)
    }

    /// Press "-". Commits and returns the new value.
    pub fn step_down(&mut self) -> i64 {
        let next = self.policy.decrement(self.draft);
        self.commit(next)
    }

    /// Text typed into the field.
    ///
    /// Returns `false` and leaves the field untouched when `raw` holds no
    /// number.
    pub fn input(&mut self, raw: &str) -> bool {
        let Some(typed) = parse_quantity(raw) else {
            return false;
        };
        self.draft = self.policy.apply_typed_delta(self.draft, typed);
        true
    }

    /// Focus left the field. Normalizes, commits and returns the value.
    pub fn blur(&mut self) -> i64 {
        self.commit(self.draft)
    }

    /// Drop the draft and show the committed value again.
    pub const fn reset(&mut self) {
        self.draft = self.committed;
    }

    fn commit(&mut self, quantity: i64) -> i64 {
        let quantity = self.policy.normalize_on_blur(quantity);
        self.committed = quantity;
        self.draft = quantity;
        quantity
    }
}
