use super::super::domain::{FeeSchedule, RatePeriod, StayError};
use super::super::money::{checked_product, checked_sum, percent_of, round_money};
use super::calculator::PriceQuote;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Blended guest service fee assumed once prices are shown marked up.
pub const MARKED_UP_PLATFORM_FEE_RATE: Decimal = dec!(0.135);

/// Uniform percentage inflation of guest-facing prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceMarkupPolicy {
    markup_percent: Decimal,
}

impl PriceMarkupPolicy {
    pub fn new(markup_percent: Decimal) -> Self {
        Self { markup_percent }
    }

    pub fn markup_percent(&self) -> Decimal {
        self.markup_percent
    }

    /// Zero and negative amounts mean "no price" and are passed through.
    pub fn apply(&self, amount: Decimal) -> Result<Decimal, StayError> {
        if amount <= Decimal::ZERO {
            return Ok(amount);
        }
        let factor = Decimal::ONE
            .checked_add(self.markup_percent / Decimal::ONE_HUNDRED)
            .ok_or(StayError::AmountOverflow)?;
        Ok(round_money(checked_product(amount, factor)?))
    }

    /// Line items are marked up individually; totals are rebuilt from them.
    pub fn apply_to_quote(&self, quote: &PriceQuote) -> Result<PriceQuote, StayError> {
        let nightly_average = self.apply(quote.nightly_average)?;
        let base_price = self.apply(quote.base_price)?;
        let cleaning_fee = self.apply(quote.cleaning_fee)?;
        let additional_guest_fee = self.apply(quote.additional_guest_fee)?;

        let subtotal = checked_sum([base_price, cleaning_fee, additional_guest_fee])?;
        let tax_amount = percent_of(subtotal, quote.tax_rate_percent)?;
        let estimated_platform_fee =
            round_money(checked_product(subtotal, MARKED_UP_PLATFORM_FEE_RATE)?);
        let estimated_total = checked_sum([subtotal, tax_amount, estimated_platform_fee])?;

        Ok(PriceQuote {
            nightly_average,
            base_price,
            cleaning_fee,
            additional_guest_fee,
            subtotal,
            tax_amount,
            estimated_platform_fee,
            estimated_total,
            ..quote.clone()
        })
    }

    pub fn apply_to_rates(
        &self,
        rate_periods: &[RatePeriod],
    ) -> Result<Vec<RatePeriod>, StayError> {
        rate_periods
            .iter()
            .map(|period| {
                Ok(RatePeriod {
                    nightly_rate: self.apply(period.nightly_rate)?,
                    weekend_rate: self.apply(period.weekend_rate)?,
                    weekly_rate: self.apply(period.weekly_rate)?,
                    monthly_rate: self.apply(period.monthly_rate)?,
                    ..period.clone()
                })
            })
            .collect()
    }

    /// Tax rate and the refundable deposit are not guest prices.
    pub fn apply_to_fees(&self, fees: &FeeSchedule) -> Result<FeeSchedule, StayError> {
        Ok(FeeSchedule {
            cleaning_fee: self.apply(fees.cleaning_fee)?,
            service_fee: self.apply(fees.service_fee)?,
            resort_fee: self.apply(fees.resort_fee)?,
            pet_fee: self.apply(fees.pet_fee)?,
            additional_guest_fee_per_night: self.apply(fees.additional_guest_fee_per_night)?,
            ..fees.clone()
        })
    }
}
