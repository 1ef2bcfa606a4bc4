pub mod availability;
pub mod domain;
pub mod money;
pub mod pricing;
pub mod router;
pub mod snapshot;

pub use availability::{
    AvailabilityResolver, AvailabilityWindow, AvailableDate, CalendarDay, Occupancy,
};
pub use domain::{
    FeeSchedule, RatePeriod, RatePeriodRecord, ReservedStay, ReservedStayRecord, StayError,
    StayStatus, WeekendNights,
};
pub use pricing::{
    PriceMarkupPolicy, PriceQuote, RateCoverage, StayPriceCalculator, StayRequest,
};
pub use router::storefront_router;
pub use snapshot::{PropertySnapshotImporter, SnapshotImportError};
