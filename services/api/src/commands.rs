use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use stay_engine::config::AppConfig;
use stay_engine::error::AppError;
use stay_engine::stays::{
    AvailabilityResolver, AvailabilityWindow, AvailableDate, CalendarDay, FeeSchedule, Occupancy,
    PriceMarkupPolicy, PriceQuote, PropertySnapshotImporter, RatePeriod, StayPriceCalculator,
    StayRequest,
};

#[derive(Args, Debug)]
pub(crate) struct AvailabilityArgs {
    /// Reservation export (CSV: Confirmation Code, Status, Arrival, Departure)
    #[arg(long)]
    pub(crate) reservations: PathBuf,
    /// Optional seasonal rate export used to annotate free nights
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
    /// First day to scan (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) window_start: Option<NaiveDate>,
    /// Last day to scan (YYYY-MM-DD). Defaults to the end of next month.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) window_end: Option<NaiveDate>,
    /// Override the reference date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print every day with the stay holding it instead of free nights only
    #[arg(long)]
    pub(crate) calendar: bool,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Seasonal rate export
    #[arg(long)]
    pub(crate) rates: PathBuf,
    /// Fee schedule export (single row). Fees default to zero when omitted.
    #[arg(long)]
    pub(crate) fees: Option<PathBuf>,
    /// Check-in date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) check_in: NaiveDate,
    /// Check-out date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) check_out: NaiveDate,
    /// Party size
    #[arg(long, default_value_t = 2)]
    pub(crate) guests: u32,
    /// Guests included in the nightly rate (defaults to STAY_FREE_GUESTS)
    #[arg(long)]
    pub(crate) free_guests: Option<u32>,
    /// Markup percentage (defaults to STAY_MARKUP_PERCENT)
    #[arg(long, value_parser = crate::infra::parse_percent)]
    pub(crate) markup: Option<Decimal>,
    /// Fail instead of quoting zero when the rate export is empty
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) fn run_availability(args: AvailabilityArgs) -> Result<(), AppError> {
    let AvailabilityArgs {
        reservations,
        rates,
        window_start,
        window_end,
        today,
        calendar,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let stays = PropertySnapshotImporter::reserved_stays_from_path(reservations)?;
    let rate_periods = match rates {
        Some(path) => PropertySnapshotImporter::rate_periods_from_path(path)?,
        None => Vec::new(),
    };

    let window = AvailabilityWindow::resolve(window_start, window_end, today, !stays.is_empty())?;
    let resolver = AvailabilityResolver::default();

    println!("Stay availability");
    println!(
        "Window: {} -> {} ({} reservations, {} rate periods)",
        window.start,
        window.end,
        stays.len(),
        rate_periods.len()
    );

    if calendar {
        render_calendar(&resolver.calendar(&stays, window));
    } else {
        render_available_dates(&resolver.available_dates(&stays, &rate_periods, window));
    }

    Ok(())
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        rates,
        fees,
        check_in,
        check_out,
        guests,
        free_guests,
        markup,
        strict,
    } = args;

    let pricing = AppConfig::load()?.pricing;
    let rate_periods = PropertySnapshotImporter::rate_periods_from_path(rates)?;
    let fees = match fees {
        Some(path) => PropertySnapshotImporter::fee_schedule_from_path(path)?,
        None => FeeSchedule::default(),
    };
    let markup_percent = markup.unwrap_or(pricing.markup_percent);

    let quote = quote_stay(
        &rate_periods,
        &fees,
        StayRequest::new(check_in, check_out, guests)
            .with_free_guests(free_guests.unwrap_or(pricing.free_guests)),
        strict,
    )?;
    let marked = PriceMarkupPolicy::new(markup_percent).apply_to_quote(&quote)?;

    println!("Stay quote");
    println!(
        "{} -> {}: {} night(s), {} weekday / {} weekend, {} guest(s) ({} included)",
        quote.check_in,
        quote.check_out,
        quote.nights,
        quote.weekday_nights,
        quote.weekend_nights,
        quote.guests,
        quote.free_guests
    );
    if quote.is_priced() {
        println!("Season: {}", display_season(&quote.season_label));
    } else {
        println!("Season: none (no rate periods, rate-derived figures are zero)");
    }
    if !quote.minimum_stay_met {
        println!(
            "Warning: season requires at least {} night(s)",
            quote.minimum_stay
        );
    }

    println!("\nListed price");
    render_quote(&quote);
    println!("\nGuest price ({}% markup)", markup_percent);
    render_quote(&marked);

    Ok(())
}

fn quote_stay(
    rate_periods: &[RatePeriod],
    fees: &FeeSchedule,
    stay: StayRequest,
    strict: bool,
) -> Result<PriceQuote, AppError> {
    let calculator = if strict {
        StayPriceCalculator::strict()
    } else {
        StayPriceCalculator::default()
    };
    Ok(calculator.quote(rate_periods, fees, &stay)?)
}

fn render_available_dates(dates: &[AvailableDate]) {
    if dates.is_empty() {
        println!("\nAvailable nights: none");
        return;
    }

    println!("\nAvailable nights ({})", dates.len());
    for available in dates {
        println!(
            "- {} | {} | night {} | nightly {} / weekend {} | min stay {}",
            available.start_date,
            display_season(available.season_label.as_deref().unwrap_or_default()),
            available.night_rate,
            available.nightly_rate,
            available.weekend_rate,
            available.minimum_stay
        );
    }
}

fn render_calendar(days: &[CalendarDay]) {
    println!("\nCalendar");
    for day in days {
        let state = match &day.occupancy {
            Occupancy::Free => "free".to_string(),
            Occupancy::BlockedBy(code) => format!("held by {code}"),
        };
        let turnover_note = if day.turnover { " (turnover)" } else { "" };
        println!("- {}: {}{}", day.date, state, turnover_note);
    }
}

fn render_quote(quote: &PriceQuote) {
    println!("- Nightly average: {} {}", quote.nightly_average, quote.currency);
    println!("- Base price: {}", quote.base_price);
    println!("- Cleaning fee: {}", quote.cleaning_fee);
    println!("- Additional guest fee: {}", quote.additional_guest_fee);
    println!("- Subtotal: {}", quote.subtotal);
    println!(
        "- Tax ({}%): {}",
        quote.tax_rate_percent, quote.tax_amount
    );
    println!("- Estimated platform fee: {}", quote.estimated_platform_fee);
    println!("- Estimated total: {} {}", quote.estimated_total, quote.currency);
}

fn display_season(label: &str) -> &str {
    if label.is_empty() {
        "default rates"
    } else {
        label
    }
}
