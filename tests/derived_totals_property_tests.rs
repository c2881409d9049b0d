//! Property-based tests for the derived total resolver
//!
//! Uses proptest to check that overrides, summaries and the inclusive tax
//! adjustment behave the same for any mix of line items and record state.

use proptest::prelude::*;
use purchase_order::{
    amount::{DerivedField, View},
    codec::Guid,
    line_item::{LineAmountTypes, LineItem},
    purchase_order::{Completeness, PurchaseOrder},
    status::PurchaseOrderStatus,
};
use rust_decimal::Decimal;

// PROPERTY TEST STRATEGIES

/// Amounts with two decimal places, 0.00 to 100_000.00
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000).prop_map(|minor| Decimal::new(minor, 2))
}

fn line_items_strategy() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(
        (amount_strategy(), amount_strategy()).prop_map(|(line, tax)| LineItem::new(line, tax)),
        0..8,
    )
}

fn line_amount_types_strategy() -> impl Strategy<Value = LineAmountTypes> {
    prop_oneof![
        Just(LineAmountTypes::Inclusive),
        Just(LineAmountTypes::Exclusive),
        Just(LineAmountTypes::NoTax),
    ]
}

/// New, fully fetched and summary records with random reported totals
fn order_strategy() -> impl Strategy<Value = PurchaseOrder> {
    (
        0u8..=2,
        line_items_strategy(),
        line_amount_types_strategy(),
        prop::option::of(amount_strategy()),
        prop::option::of(amount_strategy()),
        prop::option::of(amount_strategy()),
    )
        .prop_map(|(kind, lines, kind_of_amounts, sub_total, total_tax, total)| {
            let base = match kind {
                0 => PurchaseOrder::new(),
                1 => PurchaseOrder::persisted(
                    Guid::new(),
                    PurchaseOrderStatus::Draft,
                    Completeness::Full,
                ),
                _ => PurchaseOrder::persisted(
                    Guid::new(),
                    PurchaseOrderStatus::Submitted,
                    Completeness::Summary,
                ),
            };
            base.with_line_items(lines)
                .with_line_amount_types(kind_of_amounts)
                .with_reported_totals(sub_total, total_tax, total)
        })
}

fn field_strategy() -> impl Strategy<Value = DerivedField> {
    prop_oneof![
        Just(DerivedField::SubTotal),
        Just(DerivedField::TotalTax),
        Just(DerivedField::Total),
    ]
}

fn read(order: &PurchaseOrder, field: DerivedField, view: View) -> Option<Decimal> {
    match field {
        DerivedField::SubTotal => order.sub_total_as(view),
        DerivedField::TotalTax => order.total_tax_as(view),
        DerivedField::Total => order.total_as(view),
    }
}

fn assign(order: &mut PurchaseOrder, field: DerivedField, value: Decimal) {
    match field {
        DerivedField::SubTotal => order.set_sub_total(value),
        DerivedField::TotalTax => order.set_total_tax(value),
        DerivedField::Total => order.set_total(value),
    }
}

// PROPERTY TESTS
proptest! {
    /// Property: the last assigned value is returned whatever the record state or view
    #[test]
    fn override_always_wins(
        mut order in order_strategy(),
        field in field_strategy(),
        first in amount_strategy(),
        last in amount_strategy(),
    ) {
        assign(&mut order, field, first);
        assign(&mut order, field, last);

        prop_assert_eq!(read(&order, field, View::Resolved), Some(last));
        prop_assert_eq!(read(&order, field, View::Summary), Some(last));
    }

    /// Property: reading is repeatable and never sets an override
    #[test]
    fn resolution_is_idempotent(order in order_strategy(), field in field_strategy()) {
        let before = order.clone();

        let first = read(&order, field, View::Resolved);
        let second = read(&order, field, View::Resolved);

        prop_assert_eq!(first, second);
        prop_assert!(!order.is_overridden(field));
        prop_assert_eq!(order, before);
    }

    /// Property: on a loaded record sub total plus tax is always the total
    #[test]
    fn loaded_total_is_sub_total_plus_tax(
        lines in line_items_strategy(),
        kind in line_amount_types_strategy(),
    ) {
        let order = PurchaseOrder::new().with_line_items(lines).with_line_amount_types(kind);

        let sub_total = order.sub_total().unwrap_or_default();
        let total_tax = order.total_tax().unwrap_or_default();
        prop_assert_eq!(order.total(), Some(sub_total + total_tax));
    }

    /// Property: with inclusive amounts the total is the plain line sum
    #[test]
    fn inclusive_total_reconstructs_line_sum(lines in line_items_strategy()) {
        let sum: Decimal = lines.iter().map(LineItem::line_amount).sum();
        let order = PurchaseOrder::new()
            .with_line_items(lines)
            .with_line_amount_types(LineAmountTypes::Inclusive);

        prop_assert_eq!(order.total(), Some(sum));
    }

    /// Property: a summary without lines only ever returns what was reported
    #[test]
    fn summary_never_sums_missing_lines(
        total in prop::option::of(amount_strategy()),
        view in prop_oneof![Just(View::Resolved), Just(View::Summary)],
    ) {
        let order = PurchaseOrder::persisted(
            Guid::new(),
            PurchaseOrderStatus::Authorised,
            Completeness::Summary,
        )
        .with_reported_totals(None, None, total);

        prop_assert_eq!(order.total_as(view), total);
    }
}
