use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use stay_engine::stays::domain::DATE_FORMAT;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_percent(raw: &str) -> Result<Decimal, String> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as a percentage ({err})"))?;
    if value.is_sign_negative() {
        return Err(format!("percentage '{raw}' must not be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_cli_dates_and_percentages() {
        assert_eq!(
            parse_date(" 2025-07-10 "),
            Ok(NaiveDate::from_ymd_opt(2025, 7, 10).expect("valid date"))
        );
        assert!(parse_date("07/10/2025").is_err());
        assert_eq!(parse_percent("25"), Ok(dec!(25)));
        assert!(parse_percent("-3").is_err());
        assert!(parse_percent("lots").is_err());
    }
}
