use super::SnapshotImportError;
use crate::stays::domain::{
    FeeSchedule, RatePeriod, RatePeriodRecord, ReservedStay, ReservedStayRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::str::FromStr;

fn snapshot_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn parse_reserved_stays<R: Read>(
    reader: R,
) -> Result<Vec<ReservedStay>, SnapshotImportError> {
    let mut csv_reader = snapshot_reader(reader);
    let mut stays = Vec::new();
    for record in csv_reader.deserialize::<ReservationRow>() {
        let row = record?;
        stays.push(ReservedStay::try_from(ReservedStayRecord {
            confirmation_code: row.confirmation_code,
            status: row.status,
            arrival_date: row.arrival,
            departure_date: row.departure,
        })?);
    }
    Ok(stays)
}

pub(crate) fn parse_rate_periods<R: Read>(
    reader: R,
) -> Result<Vec<RatePeriod>, SnapshotImportError> {
    let mut csv_reader = snapshot_reader(reader);
    let mut periods = Vec::new();
    for record in csv_reader.deserialize::<RateRow>() {
        let row = record?;
        let minimum_stay = match row.minimum_stay.as_deref() {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| SnapshotImportError::InvalidAmount {
                field: "Minimum Stay",
                value: raw.to_string(),
            })?),
            None => None,
        };

        periods.push(RatePeriod::try_from(RatePeriodRecord {
            season_label: row.season.unwrap_or_default(),
            start_date: row.start_date,
            end_date: row.end_date,
            nightly_rate: amount("Nightly Rate", row.nightly_rate.as_deref())?,
            weekend_rate: amount("Weekend Rate", row.weekend_rate.as_deref())?,
            weekly_rate: amount("Weekly Rate", row.weekly_rate.as_deref())?,
            monthly_rate: amount("Monthly Rate", row.monthly_rate.as_deref())?,
            minimum_stay,
            weekend_nights: row
                .weekend_nights
                .as_deref()
                .map(split_day_names)
                .unwrap_or_default(),
        })?);
    }
    Ok(periods)
}

pub(crate) fn parse_fee_schedule<R: Read>(reader: R) -> Result<FeeSchedule, SnapshotImportError> {
    let mut csv_reader = snapshot_reader(reader);
    let row = csv_reader
        .deserialize::<FeeRow>()
        .next()
        .ok_or(SnapshotImportError::MissingFeeRow)??;

    let defaults = FeeSchedule::default();
    Ok(FeeSchedule {
        cleaning_fee: amount("Cleaning Fee", row.cleaning_fee.as_deref())?.unwrap_or_default(),
        service_fee: amount("Service Fee", row.service_fee.as_deref())?.unwrap_or_default(),
        resort_fee: amount("Resort Fee", row.resort_fee.as_deref())?.unwrap_or_default(),
        tax_rate_percent: amount("Tax Rate", row.tax_rate.as_deref())?.unwrap_or_default(),
        security_deposit: amount("Security Deposit", row.security_deposit.as_deref())?
            .unwrap_or_default(),
        pet_fee: amount("Pet Fee", row.pet_fee.as_deref())?.unwrap_or_default(),
        additional_guest_fee_per_night: amount(
            "Additional Guest Fee",
            row.additional_guest_fee.as_deref(),
        )?
        .unwrap_or_default(),
        currency: row.currency.unwrap_or(defaults.currency),
    })
}

fn amount(field: &'static str, raw: Option<&str>) -> Result<Option<Decimal>, SnapshotImportError> {
    raw.map(|value| {
        Decimal::from_str(value.trim_start_matches('$')).map_err(|_| {
            SnapshotImportError::InvalidAmount {
                field,
                value: value.to_string(),
            }
        })
    })
    .transpose()
}

fn split_day_names(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ';' || c == '|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct ReservationRow {
    #[serde(rename = "Confirmation Code")]
    confirmation_code: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Arrival")]
    arrival: String,
    #[serde(rename = "Departure")]
    departure: String,
}

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Season", default, deserialize_with = "empty_string_as_none")]
    season: Option<String>,
    #[serde(rename = "Start Date")]
    start_date: String,
    #[serde(rename = "End Date")]
    end_date: String,
    #[serde(
        rename = "Nightly Rate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    nightly_rate: Option<String>,
    #[serde(
        rename = "Weekend Rate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    weekend_rate: Option<String>,
    #[serde(
        rename = "Weekly Rate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    weekly_rate: Option<String>,
    #[serde(
        rename = "Monthly Rate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    monthly_rate: Option<String>,
    #[serde(
        rename = "Minimum Stay",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    minimum_stay: Option<String>,
    #[serde(
        rename = "Weekend Nights",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    weekend_nights: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeeRow {
    #[serde(
        rename = "Cleaning Fee",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    cleaning_fee: Option<String>,
    #[serde(
        rename = "Service Fee",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    service_fee: Option<String>,
    #[serde(
        rename = "Resort Fee",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    resort_fee: Option<String>,
    #[serde(rename = "Tax Rate", default, deserialize_with = "empty_string_as_none")]
    tax_rate: Option<String>,
    #[serde(
        rename = "Security Deposit",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    security_deposit: Option<String>,
    #[serde(rename = "Pet Fee", default, deserialize_with = "empty_string_as_none")]
    pet_fee: Option<String>,
    #[serde(
        rename = "Additional Guest Fee",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    additional_guest_fee: Option<String>,
    #[serde(rename = "Currency", default, deserialize_with = "empty_string_as_none")]
    currency: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
