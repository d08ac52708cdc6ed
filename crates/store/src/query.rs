use chrono::{DateTime, TimeDelta, Utc};

/// Order status selected by the pending-orders report.
pub const PENDING_STATUS: &str = "Pending";

/// Category selected by the cross-category stock report.
pub const ELECTRONICS_CATEGORY: &str = "Electronics";

/// Size of the recent-orders window, in days.
pub const DEFAULT_RECENT_WINDOW_DAYS: i64 = 30;

/// Longest recent-orders window accepted from configuration (about a century).
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

/// Number of customers kept by the top-customers report.
pub const DEFAULT_TOP_CUSTOMERS: usize = 3;

/// Parameters shared by the reports.
///
/// The reference time is always explicit so a run is reproducible: the
/// recent-orders cutoff is computed from `now`, never from the wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    /// Reference time for relative date filters.
    pub now: DateTime<Utc>,

    /// Order status matched exactly (case-sensitive).
    pub status: String,

    /// Maximum number of rows in the top-customers report.
    pub top_customers: usize,

    /// Length of the recent-orders window in days (inclusive bound).
    pub recent_window_days: i64,

    /// Category name matched exactly.
    pub category: String,
}

impl ReportQuery {
    /// Creates a query anchored at `now` with the standard parameters.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            status: PENDING_STATUS.to_string(),
            top_customers: DEFAULT_TOP_CUSTOMERS,
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
            category: ELECTRONICS_CATEGORY.to_string(),
        }
    }

    /// Selects orders with this status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Limits the top-customers report to this many rows.
    pub fn top_customers(mut self, limit: usize) -> Self {
        self.top_customers = limit;
        self
    }

    /// Sets the recent-orders window.
    pub fn recent_window_days(mut self, days: i64) -> Self {
        self.recent_window_days = days;
        self
    }

    /// Selects products in this category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Earliest order date still counted as recent.
    pub fn recent_cutoff(&self) -> DateTime<Utc> {
        recent_cutoff(self.now, self.recent_window_days)
    }
}

/// `now` minus `days` whole days.
///
/// Saturates at the representable range instead of overflowing: a window
/// reaching past the earliest date keeps every order.
pub fn recent_cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    match TimeDelta::try_days(days).and_then(|window| now.checked_sub_signed(window)) {
        Some(cutoff) => cutoff,
        None if days < 0 => DateTime::<Utc>::MAX_UTC,
        None => DateTime::<Utc>::MIN_UTC,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn query_defaults() {
        let query = ReportQuery::at(reference());

        assert_eq!(query.now, reference());
        assert_eq!(query.status, "Pending");
        assert_eq!(query.top_customers, 3);
        assert_eq!(query.recent_window_days, 30);
        assert_eq!(query.category, "Electronics");
    }

    #[test]
    fn query_builder_chain() {
        let query = ReportQuery::at(reference())
            .status("Shipped")
            .top_customers(5)
            .recent_window_days(7)
            .category("Books");

        assert_eq!(query.status, "Shipped");
        assert_eq!(query.top_customers, 5);
        assert_eq!(query.recent_window_days, 7);
        assert_eq!(query.category, "Books");
    }

    #[test]
    fn recent_cutoff_is_thirty_days_back() {
        let query = ReportQuery::at(reference());
        assert_eq!(
            query.recent_cutoff(),
            Utc.with_ymd_and_hms(2024, 5, 16, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn oversized_window_saturates_at_earliest_date() {
        let query = ReportQuery::at(reference()).recent_window_days(200_000_000);
        assert_eq!(query.recent_cutoff(), DateTime::<Utc>::MIN_UTC);

        assert_eq!(recent_cutoff(reference(), i64::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(recent_cutoff(reference(), i64::MIN), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn zero_day_window_cuts_at_now() {
        let query = ReportQuery::at(reference()).recent_window_days(0);
        assert_eq!(query.recent_cutoff(), reference());
    }
}
