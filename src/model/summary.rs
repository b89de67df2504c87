use rust_decimal::Decimal;

use super::types::{AggregateSummary, BillResult, HouseholdSize, StaticBill};

/// Sums scraped balances and static bills and splits the total evenly.
///
/// Failed results contribute their stored zero balance. The household size is
/// validated when the configuration is loaded, so the division cannot fail here.
pub fn aggregate(
    results: &[BillResult],
    static_bills: &[StaticBill],
    household_size: HouseholdSize,
) -> AggregateSummary {
    let scraped: Decimal = results.iter().map(BillResult::balance).sum();
    let fixed: Decimal = static_bills.iter().map(|bill| bill.amount).sum();
    let total = scraped + fixed;

    AggregateSummary {
        total,
        per_person: total / Decimal::from(household_size.get()),
        household_size: household_size.get(),
    }
}
