use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failures raised by the availability and pricing core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StayError {
    #[error("could not parse {field} '{value}' as YYYY-MM-DD")]
    DateParse { field: &'static str, value: String },
    #[error("date range {start} -> {end} is empty or inverted")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("no rate period is available to price the stay")]
    NoApplicableRate,
    #[error("availability window around {0} falls outside the supported calendar")]
    WindowOutOfRange(NaiveDate),
    #[error("availability window {start} -> {end} spans more than {max_days} days")]
    WindowTooLong {
        start: NaiveDate,
        end: NaiveDate,
        max_days: i64,
    },
    #[error("amount exceeds the supported decimal range")]
    AmountOverflow,
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, StayError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| StayError::DateParse {
        field,
        value: raw.to_string(),
    })
}

pub fn parse_optional_date(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, StayError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_date(field, value))
        .transpose()
}

/// Booking state reported by the property-management provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StayStatus {
    Confirmed,
    Unconfirmed,
    Completed,
    Cancelled,
    Other(String),
}

impl StayStatus {
    /// Cancelled stays never hold the calendar.
    pub fn blocks_dates(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Unconfirmed => "Unconfirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for StayStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Self::Confirmed,
            "unconfirmed" => Self::Unconfirmed,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for StayStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<StayStatus> for String {
    fn from(value: StayStatus) -> Self {
        value.label().to_string()
    }
}

/// One booked interval; the departure day itself is not occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservedStayRecord")]
pub struct ReservedStay {
    pub confirmation_code: String,
    pub status: StayStatus,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
}

impl ReservedStay {
    pub fn new(
        confirmation_code: impl Into<String>,
        status: StayStatus,
        arrival_date: NaiveDate,
        departure_date: NaiveDate,
    ) -> Result<Self, StayError> {
        if arrival_date >= departure_date {
            return Err(StayError::InvalidDateRange {
                start: arrival_date,
                end: departure_date,
            });
        }

        Ok(Self {
            confirmation_code: confirmation_code.into(),
            status,
            arrival_date,
            departure_date,
        })
    }

    pub fn parse(
        confirmation_code: impl Into<String>,
        status: &str,
        arrival: &str,
        departure: &str,
    ) -> Result<Self, StayError> {
        let arrival_date = parse_date("arrival_date", arrival)?;
        let departure_date = parse_date("departure_date", departure)?;
        Self::new(
            confirmation_code,
            StayStatus::from(status),
            arrival_date,
            departure_date,
        )
    }

    pub fn nights(&self) -> i64 {
        (self.departure_date - self.arrival_date).num_days()
    }

    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.arrival_date <= date && date < self.departure_date
    }
}

/// Reservation as delivered by an upstream feed, dates still unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedStayRecord {
    pub confirmation_code: String,
    pub status: String,
    pub arrival_date: String,
    pub departure_date: String,
}

impl TryFrom<ReservedStayRecord> for ReservedStay {
    type Error = StayError;

    fn try_from(record: ReservedStayRecord) -> Result<Self, Self::Error> {
        Self::parse(
            record.confirmation_code,
            &record.status,
            &record.arrival_date,
            &record.departure_date,
        )
    }
}

/// Weekdays whose nights price at the weekend rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekendNights(Vec<Weekday>);

impl Default for WeekendNights {
    fn default() -> Self {
        Self(vec![Weekday::Fri, Weekday::Sat])
    }
}

impl WeekendNights {
    /// Unrecognised names are skipped; an empty result falls back to Fri/Sat.
    pub fn parse<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days: Vec<Weekday> = names
            .into_iter()
            .filter_map(|name| name.as_ref().trim().parse::<Weekday>().ok())
            .collect();

        if days.is_empty() {
            return Self::default();
        }

        days.sort_by_key(|day| day.num_days_from_monday());
        days.dedup();
        Self(days)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn includes_night_of(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }
}

impl Serialize for WeekendNights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|day| weekday_label(*day)))
    }
}

impl<'de> Deserialize<'de> for WeekendNights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::parse(names))
    }
}

pub const fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Seasonal pricing window with an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RatePeriodRecord")]
pub struct RatePeriod {
    pub season_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub nightly_rate: Decimal,
    pub weekend_rate: Decimal,
    pub weekly_rate: Decimal,
    pub monthly_rate: Decimal,
    pub minimum_stay: u32,
    pub weekend_nights: WeekendNights,
}

impl RatePeriod {
    pub fn new(
        season_label: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, StayError> {
        if start_date > end_date {
            return Err(StayError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            season_label: season_label.into(),
            start_date,
            end_date,
            nightly_rate: Decimal::ZERO,
            weekend_rate: Decimal::ZERO,
            weekly_rate: Decimal::ZERO,
            monthly_rate: Decimal::ZERO,
            minimum_stay: 1,
            weekend_nights: WeekendNights::default(),
        })
    }

    /// Rates offered when no configured season covers a date.
    pub fn fallback() -> Self {
        Self {
            season_label: String::new(),
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MAX,
            nightly_rate: dec!(120),
            weekend_rate: dec!(130),
            weekly_rate: dec!(840),
            monthly_rate: dec!(3600),
            minimum_stay: 1,
            weekend_nights: WeekendNights::default(),
        }
    }

    pub fn with_rates(mut self, nightly_rate: Decimal, weekend_rate: Decimal) -> Self {
        self.nightly_rate = nightly_rate;
        self.weekend_rate = weekend_rate;
        self
    }

    pub fn with_long_stay_rates(mut self, weekly_rate: Decimal, monthly_rate: Decimal) -> Self {
        self.weekly_rate = weekly_rate;
        self.monthly_rate = monthly_rate;
        self
    }

    pub fn with_minimum_stay(mut self, nights: u32) -> Self {
        self.minimum_stay = nights.max(1);
        self
    }

    pub fn with_weekend_nights(mut self, weekend_nights: WeekendNights) -> Self {
        self.weekend_nights = weekend_nights;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn rate_for_night(&self, date: NaiveDate) -> Decimal {
        if self.weekend_nights.includes_night_of(date) {
            self.weekend_rate
        } else {
            self.nightly_rate
        }
    }
}

/// First period in caller order whose range covers `date`.
pub fn rate_period_for(periods: &[RatePeriod], date: NaiveDate) -> Option<&RatePeriod> {
    periods.iter().find(|period| period.contains(date))
}

/// Rate period as delivered by an upstream feed, dates still unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePeriodRecord {
    #[serde(default)]
    pub season_label: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub nightly_rate: Option<Decimal>,
    #[serde(default)]
    pub weekend_rate: Option<Decimal>,
    #[serde(default)]
    pub weekly_rate: Option<Decimal>,
    #[serde(default)]
    pub monthly_rate: Option<Decimal>,
    #[serde(default)]
    pub minimum_stay: Option<u32>,
    #[serde(default)]
    pub weekend_nights: Vec<String>,
}

impl TryFrom<RatePeriodRecord> for RatePeriod {
    type Error = StayError;

    fn try_from(record: RatePeriodRecord) -> Result<Self, Self::Error> {
        let start_date = parse_date("start_date", &record.start_date)?;
        let end_date = parse_date("end_date", &record.end_date)?;

        Ok(RatePeriod::new(record.season_label, start_date, end_date)?
            .with_rates(
                record.nightly_rate.unwrap_or_default(),
                record.weekend_rate.unwrap_or_default(),
            )
            .with_long_stay_rates(
                record.weekly_rate.unwrap_or_default(),
                record.monthly_rate.unwrap_or_default(),
            )
            .with_minimum_stay(record.minimum_stay.unwrap_or(1))
            .with_weekend_nights(WeekendNights::parse(&record.weekend_nights)))
    }
}

/// Per-property charges layered on top of the nightly rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub cleaning_fee: Decimal,
    pub service_fee: Decimal,
    pub resort_fee: Decimal,
    pub tax_rate_percent: Decimal,
    pub security_deposit: Decimal,
    pub pet_fee: Decimal,
    pub additional_guest_fee_per_night: Decimal,
    pub currency: String,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            cleaning_fee: Decimal::ZERO,
            service_fee: Decimal::ZERO,
            resort_fee: Decimal::ZERO,
            tax_rate_percent: Decimal::ZERO,
            security_deposit: Decimal::ZERO,
            pet_fee: Decimal::ZERO,
            additional_guest_fee_per_night: Decimal::ZERO,
            currency: "USD".to_string(),
        }
    }
}
