mod calculator;
mod markup;

pub use calculator::{
    PriceQuote, RateCoverage, StayPriceCalculator, StayRequest, DEFAULT_FREE_GUESTS,
    PLATFORM_FEE_RATE,
};
pub use markup::{PriceMarkupPolicy, MARKED_UP_PLATFORM_FEE_RATE};
