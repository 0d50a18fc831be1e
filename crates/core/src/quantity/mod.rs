//! Packaging-constrained quantity rules.
//!
//! Every quantity control in the portal goes through [`QuantityPolicy`]. For
//! an unrestricted product the only rule is `quantity >= 1`. A restricted
//! product has two zones:
//!
//! - **free zone**: `1..=stock_available`, stepped one unit at a time;
//! - **pack zone**: `stock_available + k * pack_quantity` for `k >= 1`.
//!
//! When there is no free stock the free zone is empty and every valid
//! quantity is a positive multiple of the pack size.
//!
//! Steppers ([`QuantityPolicy::increment`], [`QuantityPolicy::decrement`])
//! always land on a valid quantity. Free typing may pass through invalid
//! values; [`QuantityPolicy::normalize_on_blur`] is the pass that restores the
//! invariant before a value is committed.
//!
//! No operation returns more than [`QuantityPolicy::max_quantity`], the
//! largest valid quantity that fits in a cart line.

mod field;
mod parse;

pub use field::QuantityField;
pub use parse::parse_quantity;

use crate::types::{MAX_QUANTITY, Packaging, Product};

/// Where a quantity sits relative to a product's packaging rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Within free stock (or any positive quantity when unrestricted).
    Free,
    /// Past free stock on a whole-pack boundary.
    Pack,
    /// Not reachable by the policy; `normalize_on_blur` would change it.
    Invalid,
}

/// Quantity rules for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityPolicy {
    packaging: Packaging,
}

impl QuantityPolicy {
    /// Policy for the given packaging attributes.
    #[must_use]
    pub const fn new(packaging: Packaging) -> Self {
        Self { packaging }
    }

    /// Policy for a catalog product.
    #[must_use]
    pub const fn for_product(product: &Product) -> Self {
        Self::new(product.packaging)
    }

    /// The packaging attributes this policy applies.
    #[must_use]
    pub const fn packaging(&self) -> Packaging {
        self.packaging
    }

    const fn restricted(&self) -> bool {
        self.packaging.restricted
    }

    const fn stock(&self) -> i64 {
        self.packaging.stock()
    }

    const fn pack(&self) -> i64 {
        self.packaging.pack()
    }

    /// Lowest quantity allowed past the free zone.
    const fn pack_floor(&self) -> i64 {
        if self.stock() > 0 {
            self.stock()
        } else {
            self.pack()
        }
    }

    /// Largest valid quantity not above [`MAX_QUANTITY`].
    ///
    /// For a restricted product this is the last point on the pack grid
    /// below the cap, so clamping to it never leaves the grid.
    #[must_use]
    pub const fn max_quantity(&self) -> i64 {
        if !self.restricted() {
            return MAX_QUANTITY;
        }
        let stock = self.stock();
        let pack = self.pack();
        if stock <= 0 {
            MAX_QUANTITY - MAX_QUANTITY % pack
        } else {
            stock + (MAX_QUANTITY - stock) / pack * pack
        }
    }

    const fn cap(&self, quantity: i64) -> i64 {
        let max = self.max_quantity();
        if quantity > max { max } else { quantity }
    }

    /// Quantity a new line starts with.
    #[must_use]
    pub const fn initial(&self) -> i64 {
        if self.restricted() && self.stock() <= 0 {
            self.pack()
        } else {
            1
        }
    }

    /// Quantity after one press of the "+" stepper.
    #[must_use]
    pub const fn increment(&self, current: i64) -> i64 {
        let next = if self.restricted() && current >= self.stock() {
            current.saturating_add(self.pack())
        } else {
            current.saturating_add(1)
        };
        self.cap(next)
    }

    /// Quantity after one press of the "-" stepper. Never goes below 1.
    #[must_use]
    pub fn decrement(&self, current: i64) -> i64 {
        let next = if self.restricted() && current > self.stock() {
            current.saturating_sub(self.pack()).max(self.pack_floor())
        } else {
            current.saturating_sub(1).max(1)
        };
        self.cap(next)
    }

    /// Quantity after the user typed `typed` into a field showing `current`.
    ///
    /// A one-unit change past free stock is what arrow keys on a number input
    /// produce; it is treated as a stepper press so repeated arrow presses
    /// walk whole packs. Any other value is accepted as typed and left for
    /// [`QuantityPolicy::normalize_on_blur`] to correct.
    #[must_use]
    pub fn apply_typed_delta(&self, current: i64, typed: i64) -> i64 {
        if !self.restricted() {
            return typed;
        }

        match typed.checked_sub(current) {
            Some(1) if current >= self.stock() => self.increment(current),
            Some(-1) if current > self.stock() => self.decrement(current),
            _ => typed,
        }
    }

    /// Snap `quantity` to the nearest valid value. Idempotent.
    ///
    /// - below 1 becomes 1;
    /// - unrestricted: unchanged otherwise;
    /// - restricted without free stock: nearest multiple of the pack size,
    ///   ties rounding up, never below one pack;
    /// - restricted past free stock: the surplus rounds up to whole packs;
    /// - restricted within free stock: unchanged;
    /// - above [`QuantityPolicy::max_quantity`]: the maximum.
    #[must_use]
    pub fn normalize_on_blur(&self, quantity: i64) -> i64 {
        self.cap(self.snap(quantity))
    }

    fn snap(&self, quantity: i64) -> i64 {
        let quantity = quantity.max(1);
        if !self.restricted() {
            return quantity;
        }

        let stock = self.stock();
        let pack = self.pack();

        if stock <= 0 {
            let remainder = quantity % pack;
            let rounded = if remainder == 0 {
                quantity
            } else if remainder.saturating_mul(2) >= pack {
                (quantity - remainder).saturating_add(pack)
            } else {
                quantity - remainder
            };
            return rounded.max(pack);
        }

        if quantity <= stock {
            return quantity;
        }

        let surplus = quantity - stock;
        let packs = ceil_div(surplus, pack);
        stock.saturating_add(packs.saturating_mul(pack))
    }

    /// Classify `quantity`.
    #[must_use]
    pub const fn zone(&self, quantity: i64) -> Zone {
        if quantity < 1 || quantity > self.max_quantity() {
            return Zone::Invalid;
        }
        if !self.restricted() || (self.stock() > 0 && quantity <= self.stock()) {
            return Zone::Free;
        }
        if (quantity - self.stock()) % self.pack() == 0 {
            Zone::Pack
        } else {
            Zone::Invalid
        }
    }

    /// Returns `true` if `quantity` is a value the policy can produce.
    #[must_use]
    pub const fn is_valid(&self, quantity: i64) -> bool {
        !matches!(self.zone(quantity), Zone::Invalid)
    }
}

// Both operands are positive here.
const fn ceil_div(lhs: i64, rhs: i64) -> i64 {
    let quotient = lhs / rhs;
    if lhs % rhs == 0 { quotient } else { quotient + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restricted(stock: i64, pack: i64) -> QuantityPolicy {
        QuantityPolicy::new(Packaging::new(stock, Some(pack), true))
    }

    fn unrestricted() -> QuantityPolicy {
        QuantityPolicy::new(Packaging::new(3, Some(10), false))
    }

    // =========================================================================
    // initial / increment / decrement
    // =========================================================================

    #[test]
    fn test_initial_quantity() {
        assert_eq!(restricted(0, 10).initial(), 10);
        assert_eq!(restricted(5, 3).initial(), 1);
        assert_eq!(unrestricted().initial(), 1);
        assert_eq!(
            QuantityPolicy::new(Packaging::new(0, Some(10), false)).initial(),
            1
        );
    }

    #[test]
    fn test_no_stock_pack_of_ten_scenario() {
        let policy = restricted(0, 10);
        assert_eq!(policy.initial(), 10);
        assert_eq!(policy.increment(10), 20);
        assert_eq!(policy.decrement(20), 10);
        assert_eq!(policy.normalize_on_blur(15), 20);
    }

    #[test]
    fn test_increment_steps_through_free_zone_then_packs() {
        let policy = restricted(5, 3);
        let mut quantity = policy.initial();
        let mut seen = vec![quantity];
        for _ in 0..6 {
            quantity = policy.increment(quantity);
            seen.push(quantity);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 8, 11]);
    }

    #[test]
    fn test_increment_unrestricted() {
        assert_eq!(unrestricted().increment(3), 4);
        assert_eq!(unrestricted().increment(30), 31);
    }

    #[test]
    fn test_decrement_walks_back_down() {
        let policy = restricted(5, 3);
        let mut quantity = 11;
        let mut seen = vec![quantity];
        while quantity > 1 {
            quantity = policy.decrement(quantity);
            seen.push(quantity);
        }
        assert_eq!(seen, vec![11, 8, 5, 4, 3, 2, 1]);
        assert_eq!(policy.decrement(1), 1);
    }

    #[test]
    fn test_decrement_snaps_to_floor() {
        // Off-grid value just above stock snaps to stock, not below it.
        assert_eq!(restricted(5, 3).decrement(6), 5);
        // No free stock: never below one pack.
        assert_eq!(restricted(0, 10).decrement(10), 10);
        assert_eq!(restricted(0, 10).decrement(14), 10);
    }

    #[test]
    fn test_decrement_unrestricted_floors_at_one() {
        assert_eq!(unrestricted().decrement(2), 1);
        assert_eq!(unrestricted().decrement(1), 1);
        assert_eq!(unrestricted().decrement(-5), 1);
    }

    // =========================================================================
    // apply_typed_delta
    // =========================================================================

    #[test]
    fn test_typed_nudge_in_pack_zone_walks_packs() {
        let policy = restricted(5, 3);
        assert_eq!(policy.apply_typed_delta(5, 6), 8);
        assert_eq!(policy.apply_typed_delta(8, 9), 11);
        assert_eq!(policy.apply_typed_delta(8, 7), 5);
        assert_eq!(policy.apply_typed_delta(11, 10), 8);

        let policy = restricted(0, 10);
        assert_eq!(policy.apply_typed_delta(10, 11), 20);
        assert_eq!(policy.apply_typed_delta(20, 19), 10);
        assert_eq!(policy.apply_typed_delta(10, 9), 10);
    }

    #[test]
    fn test_typed_nudge_in_free_zone_is_literal() {
        let policy = restricted(5, 3);
        assert_eq!(policy.apply_typed_delta(3, 4), 4);
        assert_eq!(policy.apply_typed_delta(5, 4), 4);
        assert_eq!(policy.apply_typed_delta(1, 0), 0);
    }

    #[test]
    fn test_typed_free_value_is_accepted_as_is() {
        let policy = restricted(5, 3);
        assert_eq!(policy.apply_typed_delta(5, 7), 7);
        assert_eq!(policy.apply_typed_delta(8, 100), 100);
        assert_eq!(unrestricted().apply_typed_delta(4, 5), 5);
        assert_eq!(unrestricted().apply_typed_delta(4, 0), 0);
    }

    // =========================================================================
    // normalize_on_blur
    // =========================================================================

    #[test]
    fn test_blur_surplus_rounds_up_to_whole_packs() {
        assert_eq!(restricted(5, 3).normalize_on_blur(7), 8);
        assert_eq!(restricted(5, 3).normalize_on_blur(6), 8);
        assert_eq!(restricted(5, 3).normalize_on_blur(8), 8);
        assert_eq!(restricted(5, 3).normalize_on_blur(9), 11);
        assert_eq!(restricted(5, 3).normalize_on_blur(4), 4);
        assert_eq!(restricted(5, 3).normalize_on_blur(0), 1);
    }

    #[test]
    fn test_blur_no_stock_rounds_to_nearest_pack() {
        let policy = restricted(0, 10);
        assert_eq!(policy.normalize_on_blur(1), 10);
        assert_eq!(policy.normalize_on_blur(4), 10);
        assert_eq!(policy.normalize_on_blur(14), 10);
        assert_eq!(policy.normalize_on_blur(15), 20);
        assert_eq!(policy.normalize_on_blur(25), 30);
        assert_eq!(policy.normalize_on_blur(-3), 10);
    }

    #[test]
    fn test_blur_no_stock_is_nearest_multiple_ties_up() {
        for pack in 1..=12 {
            let policy = restricted(0, pack);
            for quantity in 1..=200 {
                let result = policy.normalize_on_blur(quantity);
                assert_eq!(result % pack, 0, "pack {pack}, q {quantity}");
                assert!(result >= pack);

                let below = (quantity / pack) * pack;
                let above = below + pack;
                let expected = if quantity % pack == 0 {
                    quantity
                } else if above - quantity <= quantity - below {
                    above
                } else {
                    below.max(pack)
                };
                assert_eq!(result, expected, "pack {pack}, q {quantity}");
            }
        }
    }

    #[test]
    fn test_blur_with_stock_matches_ceiling_formula() {
        for stock in 1..=8 {
            for pack in 1..=7 {
                let policy = restricted(stock, pack);
                for quantity in (stock + 1)..=(stock + 40) {
                    let surplus = quantity - stock;
                    let packs = (surplus + pack - 1) / pack;
                    assert_eq!(policy.normalize_on_blur(quantity), stock + pack * packs);
                }
            }
        }
    }

    #[test]
    fn test_blur_unrestricted_is_floor_one() {
        for quantity in -5..=50 {
            assert_eq!(unrestricted().normalize_on_blur(quantity), quantity.max(1));
        }
    }

    #[test]
    fn test_blur_is_idempotent_and_valid() {
        let policies = [
            unrestricted(),
            restricted(0, 1),
            restricted(0, 6),
            restricted(0, 10),
            restricted(5, 3),
            restricted(12, 5),
            restricted(1, 24),
        ];
        for policy in policies {
            for quantity in -10..=150 {
                let once = policy.normalize_on_blur(quantity);
                assert_eq!(policy.normalize_on_blur(once), once);
                assert!(policy.is_valid(once), "{policy:?} q {quantity} -> {once}");
            }
        }
    }

    #[test]
    fn test_steppers_stay_valid() {
        let policy = restricted(4, 6);
        let mut quantity = policy.initial();
        for _ in 0..20 {
            quantity = policy.increment(quantity);
            assert!(policy.is_valid(quantity));
        }
        for _ in 0..30 {
            quantity = policy.decrement(quantity);
            assert!(policy.is_valid(quantity));
        }
        assert_eq!(quantity, 1);
    }

    #[test]
    fn test_zone() {
        let policy = restricted(5, 3);
        assert_eq!(policy.zone(0), Zone::Invalid);
        assert_eq!(policy.zone(5), Zone::Free);
        assert_eq!(policy.zone(8), Zone::Pack);
        assert_eq!(policy.zone(7), Zone::Invalid);

        let policy = restricted(0, 10);
        assert_eq!(policy.zone(10), Zone::Pack);
        assert_eq!(policy.zone(3), Zone::Invalid);
    }

    #[test]
    fn test_max_quantity_is_last_grid_point_under_cap() {
        assert_eq!(unrestricted().max_quantity(), MAX_QUANTITY);
        // 4_294_967_295 = 10 * 429_496_729 + 5
        assert_eq!(restricted(0, 10).max_quantity(), 4_294_967_290);
        // 4_294_967_295 - 5 = 3 * 1_431_655_763 + 1
        assert_eq!(restricted(5, 3).max_quantity(), 4_294_967_294);
        assert_eq!(restricted(MAX_QUANTITY, 7).max_quantity(), MAX_QUANTITY);

        for policy in [unrestricted(), restricted(0, 10), restricted(5, 3), restricted(1, 24)] {
            assert!(policy.is_valid(policy.max_quantity()));
            assert_eq!(policy.zone(policy.max_quantity() + 1), Zone::Invalid);
        }
    }

    #[test]
    fn test_huge_quantities_clamp_onto_the_grid() {
        let policies = [unrestricted(), restricted(0, 10), restricted(5, 3), restricted(0, 1)];
        for policy in policies {
            let max = policy.max_quantity();
            for quantity in [MAX_QUANTITY, 5_000_000_000, i64::MAX - 1, i64::MAX] {
                let blurred = policy.normalize_on_blur(quantity);
                assert_eq!(blurred, max, "{policy:?} q {quantity}");
                assert!(policy.is_valid(blurred));
                assert_eq!(policy.normalize_on_blur(blurred), blurred);
            }
            assert_eq!(policy.increment(max), max);
            assert_eq!(policy.increment(i64::MAX), max);
            assert!(policy.decrement(max) < max);
            assert!(policy.is_valid(policy.decrement(i64::MAX)));
        }
    }

    #[test]
    fn test_zero_pack_from_storage_behaves_as_one() {
        let policy = QuantityPolicy::new(Packaging {
            stock_available: 0,
            pack_quantity: 0,
            restricted: true,
        });
        assert_eq!(policy.initial(), 1);
        assert_eq!(policy.normalize_on_blur(7), 7);
        assert_eq!(policy.increment(7), 8);
    }
}
