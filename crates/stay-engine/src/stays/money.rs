use super::domain::StayError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Guest-facing amounts carry cents only.
pub const MONEY_SCALE: u32 = 2;

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn checked_product(lhs: Decimal, rhs: Decimal) -> Result<Decimal, StayError> {
    lhs.checked_mul(rhs).ok_or(StayError::AmountOverflow)
}

pub fn checked_sum<I>(amounts: I) -> Result<Decimal, StayError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or(StayError::AmountOverflow)
    })
}

pub fn percent_of(amount: Decimal, percent: Decimal) -> Result<Decimal, StayError> {
    Ok(round_money(checked_product(amount, percent / Decimal::ONE_HUNDRED)?))
}
