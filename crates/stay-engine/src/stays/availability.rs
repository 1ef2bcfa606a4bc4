use super::domain::{rate_period_for, RatePeriod, ReservedStay, StayError, WeekendNights};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::iter::successors;
use tracing::debug;

/// Longest window a single scan covers: four calendar years.
pub const MAX_WINDOW_DAYS: i64 = 4 * 365 + 1;

/// Inclusive range of calendar days to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AvailabilityWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StayError> {
        if start > end {
            return Err(StayError::InvalidDateRange { start, end });
        }
        if end.signed_duration_since(start).num_days() >= MAX_WINDOW_DAYS {
            return Err(StayError::WindowTooLong {
                start,
                end,
                max_days: MAX_WINDOW_DAYS,
            });
        }
        Ok(Self { start, end })
    }

    /// Fills in omitted bounds. A property with no stays and no requested
    /// bounds is scanned across the whole calendar year of `today`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
        has_stays: bool,
    ) -> Result<Self, StayError> {
        if start.is_none() && end.is_none() && !has_stays {
            let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                .ok_or(StayError::WindowOutOfRange(today))?;
            let year_end = NaiveDate::from_ymd_opt(today.year(), 12, 31)
                .ok_or(StayError::WindowOutOfRange(today))?;
            return Self::new(year_start, year_end);
        }

        let start = start.unwrap_or(today);
        let end = match end {
            Some(end) => end,
            None => end_of_next_month(start).ok_or(StayError::WindowOutOfRange(start))?,
        };
        Self::new(start, end)
    }

    /// Every day from `start` through `end`, `NaiveDate::MAX` included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        successors(Some(self.start), NaiveDate::succ_opt).take_while(move |day| *day <= self.end)
    }
}

fn end_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(2))?
        .pred_opt()
}

/// Outcome of the per-night blocking test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "confirmation_code", rename_all = "snake_case")]
pub enum Occupancy {
    Free,
    BlockedBy(String),
}

impl Occupancy {
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Decides whether the night of `date` is bookable against non-cancelled
/// stays sorted by arrival. A turnover day belongs to the arriving stay.
pub fn occupancy_on(date: NaiveDate, stays: &[&ReservedStay]) -> Occupancy {
    for stay in stays {
        if stay.departure_date == date {
            if let Some(arriving) = arriving_after(stay, date, stays) {
                return Occupancy::BlockedBy(arriving.confirmation_code.clone());
            }
        }

        if stay.occupies(date) {
            return Occupancy::BlockedBy(stay.confirmation_code.clone());
        }
    }

    Occupancy::Free
}

/// True when one stay checks out on `date` and a different stay checks in.
pub fn is_turnover_day(date: NaiveDate, stays: &[&ReservedStay]) -> bool {
    stays
        .iter()
        .any(|stay| stay.departure_date == date && arriving_after(stay, date, stays).is_some())
}

fn arriving_after<'a>(
    departing: &ReservedStay,
    date: NaiveDate,
    stays: &[&'a ReservedStay],
) -> Option<&'a ReservedStay> {
    stays
        .iter()
        .copied()
        .find(|other| {
            other.confirmation_code != departing.confirmation_code && other.arrival_date == date
        })
}

/// One bookable night annotated with the rates that apply to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableDate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_label: Option<String>,
    pub nightly_rate: Decimal,
    pub weekend_rate: Decimal,
    pub weekly_rate: Decimal,
    pub monthly_rate: Decimal,
    pub minimum_stay: u32,
    pub weekend_nights: WeekendNights,
    pub night_rate: Decimal,
}

impl AvailableDate {
    fn priced(date: NaiveDate, period: &RatePeriod, matched: bool) -> Self {
        Self {
            start_date: date,
            end_date: date,
            season_label: matched.then(|| period.season_label.clone()),
            nightly_rate: period.nightly_rate,
            weekend_rate: period.weekend_rate,
            weekly_rate: period.weekly_rate,
            monthly_rate: period.monthly_rate,
            minimum_stay: period.minimum_stay,
            weekend_nights: period.weekend_nights.clone(),
            night_rate: period.rate_for_night(date),
        }
    }
}

/// Occupancy view of a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub occupancy: Occupancy,
    pub turnover: bool,
}

/// Stateless resolver turning reservation snapshots into bookable nights.
#[derive(Debug, Clone)]
pub struct AvailabilityResolver {
    fallback: RatePeriod,
}

impl Default for AvailabilityResolver {
    fn default() -> Self {
        Self::new(RatePeriod::fallback())
    }
}

impl AvailabilityResolver {
    pub fn new(fallback: RatePeriod) -> Self {
        Self { fallback }
    }

    pub fn resolve(
        &self,
        stays: &[ReservedStay],
        rate_periods: &[RatePeriod],
        window_start: Option<NaiveDate>,
        window_end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<AvailableDate>, StayError> {
        let window =
            AvailabilityWindow::resolve(window_start, window_end, today, !stays.is_empty())?;
        Ok(self.available_dates(stays, rate_periods, window))
    }

    pub fn available_dates(
        &self,
        stays: &[ReservedStay],
        rate_periods: &[RatePeriod],
        window: AvailabilityWindow,
    ) -> Vec<AvailableDate> {
        let blocking = blocking_stays(stays);

        let available: Vec<AvailableDate> = window
            .days()
            .filter(|day| occupancy_on(*day, &blocking).is_free())
            .map(|day| match rate_period_for(rate_periods, day) {
                Some(period) => AvailableDate::priced(day, period, true),
                None => AvailableDate::priced(day, &self.fallback, false),
            })
            .collect();

        debug!(
            stays = stays.len(),
            blocking = blocking.len(),
            window_start = %window.start,
            window_end = %window.end,
            available = available.len(),
            "resolved stay availability"
        );

        available
    }

    pub fn calendar(&self, stays: &[ReservedStay], window: AvailabilityWindow) -> Vec<CalendarDay> {
        let blocking = blocking_stays(stays);
        window
            .days()
            .map(|date| CalendarDay {
                date,
                occupancy: occupancy_on(date, &blocking),
                turnover: is_turnover_day(date, &blocking),
            })
            .collect()
    }

    /// Checks every night from check-in up to, not including, check-out.
    pub fn is_stay_available(
        &self,
        stays: &[ReservedStay],
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, StayError> {
        if check_out <= check_in {
            return Err(StayError::InvalidDateRange {
                start: check_in,
                end: check_out,
            });
        }

        let blocking = blocking_stays(stays);
        Ok(check_in
            .iter_days()
            .take_while(|night| *night < check_out)
            .all(|night| occupancy_on(night, &blocking).is_free()))
    }
}

fn blocking_stays(stays: &[ReservedStay]) -> Vec<&ReservedStay> {
    let mut blocking: Vec<&ReservedStay> = stays
        .iter()
        .filter(|stay| stay.status.blocks_dates())
        .collect();
    // Same-day arrivals tie-break on confirmation code.
    blocking.sort_by(|left, right| {
        left.arrival_date
            .cmp(&right.arrival_date)
            .then_with(|| left.confirmation_code.cmp(&right.confirmation_code))
    });
    blocking
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn stay(code: &str, status: &str, arrival: &str, departure: &str) -> ReservedStay {
        ReservedStay::parse(code, status, arrival, departure).expect("valid stay")
    }

    #[test]
    fn window_defaults_to_end_of_next_month() {
        let window = AvailabilityWindow::resolve(None, None, date(2025, 1, 30), true)
            .expect("window resolves");
        assert_eq!(window.start, date(2025, 1, 30));
        assert_eq!(window.end, date(2025, 2, 28));

        let december = AvailabilityWindow::resolve(None, None, date(2025, 12, 5), true)
            .expect("window resolves");
        assert_eq!(december.end, date(2026, 1, 31));
    }

    #[test]
    fn window_without_stays_covers_calendar_year() {
        let window = AvailabilityWindow::resolve(None, None, date(2025, 7, 4), false)
            .expect("window resolves");
        assert_eq!(window.start, date(2025, 1, 1));
        assert_eq!(window.end, date(2025, 12, 31));
        assert_eq!(window.days().count(), 365);
    }

    #[test]
    fn window_keeps_explicit_start_and_derives_end() {
        let window =
            AvailabilityWindow::resolve(Some(date(2025, 3, 15)), None, date(2025, 1, 1), false)
                .expect("window resolves");
        assert_eq!(window.start, date(2025, 3, 15));
        assert_eq!(window.end, date(2025, 4, 30));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = AvailabilityWindow::resolve(
            Some(date(2025, 7, 10)),
            Some(date(2025, 7, 1)),
            date(2025, 7, 1),
            true,
        )
        .expect_err("inverted window rejected");
        assert!(matches!(err, StayError::InvalidDateRange { .. }));
    }

    #[test]
    fn window_longer_than_four_years_is_rejected() {
        let err = AvailabilityWindow::new(date(2025, 1, 1), date(2035, 1, 1))
            .expect_err("decade-long window rejected");
        assert!(matches!(
            err,
            StayError::WindowTooLong {
                max_days: MAX_WINDOW_DAYS,
                ..
            }
        ));

        let widest = AvailabilityWindow::new(date(2024, 1, 1), date(2027, 12, 31))
            .expect("four calendar years fit");
        assert_eq!(widest.days().count() as i64, MAX_WINDOW_DAYS);
        assert!(AvailabilityWindow::new(date(2024, 1, 1), date(2028, 1, 1)).is_err());
    }

    #[test]
    fn window_ending_on_last_supported_date_includes_it() {
        let last = NaiveDate::MAX;
        let before_last = last.pred_opt().expect("previous day");
        let window = AvailabilityWindow::new(before_last, last).expect("valid window");

        let days: Vec<NaiveDate> = window.days().collect();
        assert_eq!(days, vec![before_last, last]);
    }

    #[test]
    fn turnover_day_is_claimed_by_arriving_stay_in_either_order() {
        let departing = stay("A", "Confirmed", "2025-07-10", "2025-07-15");
        let arriving = stay("B", "Confirmed", "2025-07-15", "2025-07-18");
        let turnover = date(2025, 7, 15);

        let forward = vec![&departing, &arriving];
        let reversed = vec![&arriving, &departing];

        assert_eq!(
            occupancy_on(turnover, &forward),
            Occupancy::BlockedBy("B".to_string())
        );
        assert_eq!(
            occupancy_on(turnover, &reversed),
            Occupancy::BlockedBy("B".to_string())
        );
        assert!(is_turnover_day(turnover, &forward));
        assert!(!is_turnover_day(date(2025, 7, 18), &forward));
    }

    #[test]
    fn same_confirmation_code_is_not_a_turnover() {
        let first = stay("A", "Confirmed", "2025-07-10", "2025-07-15");
        let extension = stay("A", "Confirmed", "2025-07-15", "2025-07-17");
        let stays = vec![&first, &extension];

        assert!(!is_turnover_day(date(2025, 7, 15), &stays));
        assert_eq!(
            occupancy_on(date(2025, 7, 15), &stays),
            Occupancy::BlockedBy("A".to_string())
        );
    }

    #[test]
    fn calendar_reports_blocking_stay_and_turnover() {
        let resolver = AvailabilityResolver::default();
        let stays = vec![
            stay("B", "Confirmed", "2025-07-12", "2025-07-14"),
            stay("A", "Unconfirmed", "2025-07-10", "2025-07-12"),
        ];
        let window = AvailabilityWindow::new(date(2025, 7, 9), date(2025, 7, 14))
            .expect("valid window");

        let calendar = resolver.calendar(&stays, window);
        let states: Vec<(&Occupancy, bool)> = calendar
            .iter()
            .map(|day| (&day.occupancy, day.turnover))
            .collect();

        assert_eq!(calendar.len(), 6);
        assert_eq!(states[0], (&Occupancy::Free, false));
        assert_eq!(states[1], (&Occupancy::BlockedBy("A".to_string()), false));
        assert_eq!(states[3], (&Occupancy::BlockedBy("B".to_string()), true));
        assert_eq!(states[5], (&Occupancy::Free, false));
    }

    #[test]
    fn free_dates_use_matching_season_or_fallback() {
        let resolver = AvailabilityResolver::default();
        let summer = RatePeriod::new("Summer", date(2025, 7, 1), date(2025, 7, 10))
            .expect("valid period")
            .with_rates(dec!(200), dec!(250))
            .with_minimum_stay(3);

        let window = AvailabilityWindow::new(date(2025, 7, 10), date(2025, 7, 11))
            .expect("valid window");
        let dates = resolver.available_dates(&[], &[summer], window);

        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].season_label.as_deref(), Some("Summer"));
        assert_eq!(dates[0].nightly_rate, dec!(200));
        assert_eq!(dates[0].minimum_stay, 3);
        assert_eq!(dates[0].start_date, dates[0].end_date);

        assert_eq!(dates[1].season_label, None);
        assert_eq!(dates[1].nightly_rate, dec!(120));
        assert_eq!(dates[1].weekend_rate, dec!(130));
        assert_eq!(dates[1].weekly_rate, dec!(840));
        assert_eq!(dates[1].monthly_rate, dec!(3600));
        // 2025-07-11 is a Friday.
        assert_eq!(dates[1].night_rate, dec!(130));
    }

    #[test]
    fn stay_availability_checks_each_night() {
        let resolver = AvailabilityResolver::default();
        let stays = vec![stay("A", "Confirmed", "2025-07-10", "2025-07-15")];

        assert!(resolver
            .is_stay_available(&stays, date(2025, 7, 15), date(2025, 7, 18))
            .expect("valid range"));
        assert!(resolver
            .is_stay_available(&stays, date(2025, 7, 5), date(2025, 7, 10))
            .expect("valid range"));
        assert!(!resolver
            .is_stay_available(&stays, date(2025, 7, 8), date(2025, 7, 11))
            .expect("valid range"));
        assert!(resolver
            .is_stay_available(&stays, date(2025, 7, 8), date(2025, 7, 8))
            .is_err());
    }
}
