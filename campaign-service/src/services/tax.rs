//! Tax-inclusive amounts, profit and margin.
//!
//! Every tax-inclusive amount the service produces goes through [`with_tax`],
//! whether it comes from an interactive save or a bulk import.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{InvoiceWrite, PartialInvoice};

/// Fixed 18% tax rate.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `round(amount × 1.18, 2)`; zero stays zero.
pub fn with_tax(amount: Decimal) -> Decimal {
    if amount.is_zero() {
        return Decimal::ZERO;
    }
    (amount * (Decimal::ONE + TAX_RATE))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// [`with_tax`] for an amount that may be absent; absent yields zero.
pub fn with_tax_opt(amount: Option<Decimal>) -> Decimal {
    amount.map(with_tax).unwrap_or(Decimal::ZERO)
}

/// Recompute all four tax-inclusive companions from their tax-exclusive amounts.
pub fn apply_tax(write: &mut InvoiceWrite) {
    write.customer_amount_with_tax = with_tax(write.customer_amount_without_tax);
    write.customer_received_amount_with_tax =
        with_tax(write.customer_received_amount_without_tax);
    write.vendor_amount_with_tax = with_tax(write.vendor_amount_without_tax);
    write.vendor_paid_amount_with_tax = with_tax(write.vendor_paid_amount_without_tax);
}

/// Fill a tax-inclusive companion only when its tax-exclusive amount is set and
/// non-zero and the companion itself is missing or zero.
pub fn fill_missing_tax(partial: &mut PartialInvoice) {
    fn fill(without_tax: Option<Decimal>, with_tax_slot: &mut Option<Decimal>) {
        let has_base = without_tax.is_some_and(|a| !a.is_zero());
        let missing = with_tax_slot.map_or(true, |a| a.is_zero());
        if has_base && missing {
            *with_tax_slot = Some(with_tax_opt(without_tax));
        }
    }

    fill(
        partial.customer_amount_without_tax,
        &mut partial.customer_amount_with_tax,
    );
    fill(
        partial.customer_received_amount_without_tax,
        &mut partial.customer_received_amount_with_tax,
    );
    fill(
        partial.vendor_amount_without_tax,
        &mut partial.vendor_amount_with_tax,
    );
    fill(
        partial.vendor_paid_amount_without_tax,
        &mut partial.vendor_paid_amount_with_tax,
    );
}

/// Customer amount received minus vendor amount paid, both tax-exclusive.
pub fn profit(received: Decimal, paid: Decimal) -> Decimal {
    received - paid
}

/// Profit as a percentage of amount received; 0 unless received is positive.
pub fn margin(profit: Decimal, received: Decimal) -> Decimal {
    if received > Decimal::ZERO {
        profit / received * HUNDRED
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn with_tax_rounds_to_two_places() {
        assert_eq!(with_tax(dec!(10000)), dec!(11800));
        assert_eq!(with_tax(dec!(7000)), dec!(8260));
        assert_eq!(with_tax(dec!(99.99)), dec!(117.99));
        assert_eq!(with_tax(dec!(0.01)), dec!(0.01));
        // 0.25 * 1.18 = 0.295, midpoint rounds up
        assert_eq!(with_tax(dec!(0.25)), dec!(0.30));
    }

    #[test]
    fn with_tax_of_zero_or_absent_is_zero() {
        assert_eq!(with_tax(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(with_tax_opt(None), Decimal::ZERO);
        assert_eq!(with_tax_opt(Some(dec!(100))), dec!(118));
    }

    #[test]
    fn with_tax_matches_formula_across_range() {
        let mut amount = Decimal::ZERO;
        while amount < dec!(50) {
            let expected = (amount * dec!(1.18))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            assert_eq!(with_tax(amount), expected, "amount {amount}");
            amount += dec!(0.37);
        }
    }

    #[test]
    fn apply_tax_overwrites_every_companion() {
        let mut write = InvoiceWrite {
            customer_amount_without_tax: dec!(1000),
            customer_amount_with_tax: dec!(1),
            customer_received_amount_without_tax: dec!(500),
            vendor_amount_without_tax: dec!(300),
            vendor_paid_amount_without_tax: Decimal::ZERO,
            vendor_paid_amount_with_tax: dec!(99),
            ..Default::default()
        };
        apply_tax(&mut write);

        assert_eq!(write.customer_amount_with_tax, dec!(1180));
        assert_eq!(write.customer_received_amount_with_tax, dec!(590));
        assert_eq!(write.vendor_amount_with_tax, dec!(354));
        assert_eq!(write.vendor_paid_amount_with_tax, Decimal::ZERO);
    }

    #[test]
    fn fill_missing_tax_keeps_supplied_companions() {
        let mut partial = PartialInvoice {
            customer_amount_without_tax: Some(dec!(1000)),
            customer_amount_with_tax: Some(dec!(1200)),
            vendor_amount_without_tax: Some(dec!(500)),
            vendor_paid_amount_without_tax: Some(Decimal::ZERO),
            ..Default::default()
        };
        fill_missing_tax(&mut partial);

        assert_eq!(partial.customer_amount_with_tax, Some(dec!(1200)));
        assert_eq!(partial.vendor_amount_with_tax, Some(dec!(590)));
        assert_eq!(partial.vendor_paid_amount_with_tax, None);
        assert_eq!(partial.customer_received_amount_with_tax, None);
    }

    #[test]
    fn margin_is_guarded_against_zero_revenue() {
        assert_eq!(margin(dec!(-500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(margin(dec!(1400), dec!(3000)).round_dp(1), dec!(46.7));
        assert_eq!(profit(dec!(3000), dec!(1600)), dec!(1400));
    }
}
