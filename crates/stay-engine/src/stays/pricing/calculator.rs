use super::super::domain::{rate_period_for, FeeSchedule, RatePeriod, StayError};
use super::super::money::{checked_product, checked_sum, percent_of, round_money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Approximate guest service fee charged by external marketplaces.
pub const PLATFORM_FEE_RATE: Decimal = dec!(0.142);

pub const DEFAULT_FREE_GUESTS: u32 = 2;

/// How the calculator treats a property without any rate periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCoverage {
    /// Quote anyway with every rate-derived figure at zero.
    #[default]
    BestEffort,
    Strict,
}

/// Stay window and party size to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub free_guests: u32,
}

impl StayRequest {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate, guests: u32) -> Self {
        Self {
            check_in,
            check_out,
            guests,
            free_guests: DEFAULT_FREE_GUESTS,
        }
    }

    pub fn with_free_guests(mut self, free_guests: u32) -> Self {
        self.free_guests = free_guests;
        self
    }

    fn nights(&self) -> Result<u32, StayError> {
        let invalid = StayError::InvalidDateRange {
            start: self.check_in,
            end: self.check_out,
        };
        if self.check_out <= self.check_in {
            return Err(invalid);
        }
        u32::try_from((self.check_out - self.check_in).num_days()).map_err(|_| invalid)
    }
}

/// Itemized price for one stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub weekday_nights: u32,
    pub weekend_nights: u32,
    pub nightly_average: Decimal,
    pub base_price: Decimal,
    pub cleaning_fee: Decimal,
    pub additional_guest_fee: Decimal,
    pub subtotal: Decimal,
    pub tax_rate_percent: Decimal,
    pub tax_amount: Decimal,
    pub estimated_platform_fee: Decimal,
    pub estimated_total: Decimal,
    pub currency: String,
    pub season_label: String,
    pub guests: u32,
    pub free_guests: u32,
    pub minimum_stay: u32,
    pub minimum_stay_met: bool,
}

impl PriceQuote {
    /// A zero base price means no rate table backed the quote.
    pub fn is_priced(&self) -> bool {
        self.base_price > Decimal::ZERO
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StayPriceCalculator {
    coverage: RateCoverage,
}

impl StayPriceCalculator {
    pub fn new(coverage: RateCoverage) -> Self {
        Self { coverage }
    }

    pub fn strict() -> Self {
        Self::new(RateCoverage::Strict)
    }

    pub fn quote(
        &self,
        rate_periods: &[RatePeriod],
        fees: &FeeSchedule,
        stay: &StayRequest,
    ) -> Result<PriceQuote, StayError> {
        let nights = stay.nights()?;

        let period = rate_period_for(rate_periods, stay.check_in).or_else(|| rate_periods.first());
        if period.is_none() && self.coverage == RateCoverage::Strict {
            return Err(StayError::NoApplicableRate);
        }

        let weekend_nights = match period {
            Some(period) => stay
                .check_in
                .iter_days()
                .take(nights as usize)
                .filter(|night| period.weekend_nights.includes_night_of(*night))
                .count() as u32,
            None => 0,
        };
        let weekday_nights = nights - weekend_nights;

        let base_price = match period {
            Some(period) => round_money(checked_sum([
                checked_product(Decimal::from(weekday_nights), period.nightly_rate)?,
                checked_product(Decimal::from(weekend_nights), period.weekend_rate)?,
            ])?),
            None => Decimal::ZERO,
        };

        let additional_guest_fee = additional_guest_fee(fees, stay, nights)?;
        let cleaning_fee = round_money(fees.cleaning_fee);
        let subtotal = checked_sum([base_price, cleaning_fee, additional_guest_fee])?;
        let tax_amount = percent_of(subtotal, fees.tax_rate_percent)?;
        let estimated_platform_fee = round_money(checked_product(subtotal, PLATFORM_FEE_RATE)?);
        let estimated_total = checked_sum([subtotal, tax_amount, estimated_platform_fee])?;
        let nightly_average = round_money(base_price / Decimal::from(nights));
        let minimum_stay = period.map(|period| period.minimum_stay).unwrap_or(1);

        debug!(
            check_in = %stay.check_in,
            check_out = %stay.check_out,
            nights,
            weekend_nights,
            priced = period.is_some(),
            %estimated_total,
            "quoted stay"
        );

        Ok(PriceQuote {
            check_in: stay.check_in,
            check_out: stay.check_out,
            nights,
            weekday_nights,
            weekend_nights,
            nightly_average,
            base_price,
            cleaning_fee,
            additional_guest_fee,
            subtotal,
            tax_rate_percent: fees.tax_rate_percent,
            tax_amount,
            estimated_platform_fee,
            estimated_total,
            currency: fees.currency.clone(),
            season_label: period
                .map(|period| period.season_label.clone())
                .unwrap_or_default(),
            guests: stay.guests,
            free_guests: stay.free_guests,
            minimum_stay,
            minimum_stay_met: nights >= minimum_stay,
        })
    }
}

fn additional_guest_fee(
    fees: &FeeSchedule,
    stay: &StayRequest,
    nights: u32,
) -> Result<Decimal, StayError> {
    let extra_guests = stay.guests.saturating_sub(stay.free_guests);
    if extra_guests == 0 || fees.additional_guest_fee_per_night <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let per_guest = checked_product(fees.additional_guest_fee_per_night, Decimal::from(nights))?;
    Ok(round_money(checked_product(Decimal::from(extra_guests), per_guest)?))
}
