//! Income over a calendar period, bucketed for charting.
//!
//! All calendar arithmetic (midnight, start of week, start of month) happens
//! in the time zone of the reference instant the caller passes in. Buckets
//! are half-open: a sale stamped exactly at midnight belongs to the day that
//! starts at that midnight.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::sale::Sale;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Chart caption fragment.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "Today",
            Self::Week => "This Week",
            Self::Month => "This Month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("unsupported period `{other}` (expected day|week|month)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeReport {
    pub period: Period,
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the last bucket.
    pub end_date: DateTime<Utc>,
    pub buckets: Vec<Bucket>,
    /// Headline totals cover every sale at or after `start_date`, including
    /// any stamped after `end_date`.
    pub total_income: Decimal,
    pub total_units: u64,
    pub transaction_count: usize,
    pub avg_sale_per_transaction: Decimal,
}

impl IncomeReport {
    pub fn bucket_sum(&self) -> Decimal {
        self.buckets.iter().map(|bucket| bucket.total).sum()
    }
}

pub fn aggregate<Tz: TimeZone>(
    sales: &[Sale],
    period: Period,
    reference_instant: &DateTime<Tz>,
) -> IncomeReport {
    let tz = reference_instant.timezone();
    let today = reference_instant.naive_local().date();
    let start_day = period_start_day(period, today);
    let start_date = local_instant(&tz, midnight(start_day));

    let included: Vec<&Sale> =
        sales.iter().filter(|sale| sale.occurred_at_or_after(start_date)).collect();

    let total_income: Decimal = included.iter().map(|sale| sale.total).sum();
    let total_units: u64 = included.iter().map(|sale| u64::from(sale.quantity)).sum();
    let transaction_count = included.len();
    let avg_sale_per_transaction = if transaction_count == 0 {
        Decimal::ZERO
    } else {
        total_income / Decimal::from(transaction_count)
    };

    let buckets: Vec<Bucket> = bucket_ranges(period, start_day)
        .into_iter()
        .map(|(label, from, to)| {
            let start = local_instant(&tz, from);
            let end = local_instant(&tz, to);
            let total = included
                .iter()
                .filter(|sale| sale.date.is_some_and(|date| date >= start && date < end))
                .map(|sale| sale.total)
                .sum();
            Bucket { label, start, end, total }
        })
        .collect();
    let end_date = buckets.last().map(|bucket| bucket.end).unwrap_or(start_date);

    IncomeReport {
        period,
        start_date,
        end_date,
        buckets,
        total_income,
        total_units,
        transaction_count,
        avg_sale_per_transaction,
    }
}

/// Holds the period the income view is showing. Every switch recomputes the
/// report synchronously.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodSelector {
    current: Period,
}

impl PeriodSelector {
    pub fn new(period: Period) -> Self {
        Self { current: period }
    }

    pub fn current(&self) -> Period {
        self.current
    }

    pub fn switch_to<Tz: TimeZone>(
        &mut self,
        period: Period,
        sales: &[Sale],
        now: &DateTime<Tz>,
    ) -> IncomeReport {
        debug!(
            event_name = "partsdesk.income.period_switched",
            from = self.current.as_str(),
            to = period.as_str(),
            "income period switched"
        );
        self.current = period;
        self.refresh(sales, now)
    }

    pub fn refresh<Tz: TimeZone>(&self, sales: &[Sale], now: &DateTime<Tz>) -> IncomeReport {
        aggregate(sales, self.current, now)
    }
}

fn period_start_day(period: Period, today: NaiveDate) -> NaiveDate {
    match period {
        Period::Day => today,
        Period::Week => {
            today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
        }
        Period::Month => NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today),
    }
}

fn bucket_ranges(
    period: Period,
    start_day: NaiveDate,
) -> Vec<(String, NaiveDateTime, NaiveDateTime)> {
    let start = midnight(start_day);
    match period {
        Period::Day => (0..24)
            .map(|hour| {
                (
                    format!("{hour}:00"),
                    start + Duration::hours(hour),
                    start + Duration::hours(hour + 1),
                )
            })
            .collect(),
        Period::Week => (0..7)
            .map(|offset| {
                let day = start_day + Duration::days(offset);
                let label = WEEKDAY_LABELS[day.weekday().num_days_from_sunday() as usize];
                (label.to_string(), midnight(day), midnight(day + Duration::days(1)))
            })
            .collect(),
        Period::Month => (0..i64::from(days_in_month(start_day)))
            .map(|offset| {
                let day = start_day + Duration::days(offset);
                ((offset + 1).to_string(), midnight(day), midnight(day + Duration::days(1)))
            })
            .collect(),
    }
}

fn days_in_month(first_of_month: NaiveDate) -> u32 {
    let (year, month) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| (next - first_of_month).num_days() as u32)
        .unwrap_or(30)
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}

/// Resolves a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times skipped by a DST jump resolve one hour later.
fn local_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|resolved| resolved.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{aggregate, Period, PeriodSelector};
    use crate::domain::product::ProductId;
    use crate::domain::sale::Sale;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).expect("valid timestamp").with_timezone(&Utc)
    }

    fn sale(raw: &str, quantity: u32, total: i64) -> Sale {
        Sale {
            date: Some(at(raw)),
            product_id: ProductId(1),
            product_name: "Exhaust Pipe".to_string(),
            quantity,
            price: Decimal::from(total) / Decimal::from(quantity.max(1)),
            total: Decimal::from(total),
        }
    }

    #[test]
    fn day_buckets_by_hour() {
        let sales = vec![sale("2024-01-01T05:30:00Z", 1, 100), sale("2024-01-01T13:00:00Z", 1, 50)];

        let report = aggregate(&sales, Period::Day, &at("2024-01-01T23:00:00Z"));

        assert_eq!(report.buckets.len(), 24);
        assert_eq!(report.buckets[5].total, Decimal::from(100));
        assert_eq!(report.buckets[13].total, Decimal::from(50));
        let others: Decimal = report
            .buckets
            .iter()
            .enumerate()
            .filter(|(hour, _)| *hour != 5 && *hour != 13)
            .map(|(_, bucket)| bucket.total)
            .sum();
        assert_eq!(others, Decimal::ZERO);
        assert_eq!(report.total_income, Decimal::from(150));
        assert_eq!(report.start_date, at("2024-01-01T00:00:00Z"));
        assert_eq!(report.buckets[0].label, "0:00");
        assert_eq!(report.buckets[23].label, "23:00");
    }

    #[test]
    fn week_starts_sunday_across_year_boundary() {
        // Wednesday 2024-01-03; week starts Sunday 2023-12-31
        let sales = vec![
            sale("2024-01-01T10:00:00Z", 2, 700),
            sale("2023-12-31T00:00:00Z", 1, 40),
            sale("2023-12-30T23:59:59Z", 1, 999),
        ];

        let report = aggregate(&sales, Period::Week, &at("2024-01-03T12:00:00Z"));

        assert_eq!(report.start_date, at("2023-12-31T00:00:00Z"));
        let labels: Vec<&str> = report.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
        assert_eq!(report.buckets[1].total, Decimal::from(700));
        assert_eq!(report.buckets[0].total, Decimal::from(40));
        assert_eq!(report.total_income, Decimal::from(740));
        assert_eq!(report.total_units, 3);
    }

    #[test]
    fn week_monday_bucket_across_month_boundary() {
        // Wednesday 2024-05-01; week starts Sunday 2024-04-28
        let sales = vec![sale("2024-04-29T08:15:00Z", 1, 1200)];

        let report = aggregate(&sales, Period::Week, &at("2024-05-01T09:00:00Z"));

        assert_eq!(report.buckets[1].label, "Mon");
        assert_eq!(report.buckets[1].total, Decimal::from(1200));
    }

    #[test]
    fn week_buckets_are_half_open_at_midnight() {
        let sales = vec![sale("2024-01-02T00:00:00Z", 1, 10)];

        let report = aggregate(&sales, Period::Week, &at("2024-01-03T12:00:00Z"));

        assert_eq!(report.buckets[1].total, Decimal::ZERO);
        assert_eq!(report.buckets[2].total, Decimal::from(10));
    }

    #[test]
    fn month_has_one_bucket_per_day() {
        let sales = vec![
            sale("2024-02-29T18:00:00Z", 3, 1350),
            sale("2024-02-01T00:00:00Z", 1, 450),
            sale("2024-01-31T23:00:00Z", 1, 8500),
        ];

        let report = aggregate(&sales, Period::Month, &at("2024-02-15T12:00:00Z"));

        assert_eq!(report.buckets.len(), 29);
        assert_eq!(report.buckets[0].label, "1");
        assert_eq!(report.buckets[28].label, "29");
        assert_eq!(report.buckets[28].total, Decimal::from(1350));
        assert_eq!(report.buckets[0].total, Decimal::from(450));
        assert_eq!(report.total_income, Decimal::from(1800));
        assert_eq!(report.end_date, at("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn december_has_thirty_one_buckets() {
        let report = aggregate(&[], Period::Month, &at("2023-12-09T12:00:00Z"));
        assert_eq!(report.buckets.len(), 31);
        assert_eq!(report.end_date, at("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn empty_period_has_zero_average() {
        let sales = vec![sale("2023-06-01T10:00:00Z", 1, 100)];

        let report = aggregate(&sales, Period::Day, &at("2024-01-01T12:00:00Z"));

        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.total_income, Decimal::ZERO);
        assert_eq!(report.avg_sale_per_transaction, Decimal::ZERO);
    }

    #[test]
    fn average_divides_income_by_transactions() {
        let sales = vec![sale("2024-01-01T01:00:00Z", 1, 100), sale("2024-01-01T02:00:00Z", 2, 50)];

        let report = aggregate(&sales, Period::Day, &at("2024-01-01T12:00:00Z"));

        assert_eq!(report.avg_sale_per_transaction, Decimal::from(75));
        assert_eq!(report.total_units, 3);
    }

    #[test]
    fn headline_totals_are_open_ended_but_buckets_are_not() {
        let sales = vec![sale("2024-01-01T09:00:00Z", 1, 100), sale("2024-01-02T01:00:00Z", 1, 60)];

        let report = aggregate(&sales, Period::Day, &at("2024-01-01T10:00:00Z"));

        assert_eq!(report.total_income, Decimal::from(160));
        assert_eq!(report.bucket_sum(), Decimal::from(100));
    }

    #[test]
    fn bucket_sum_matches_total_for_in_period_sales() {
        let sales: Vec<Sale> = (0..24)
            .map(|hour| sale(&format!("2024-03-10T{hour:02}:{:02}:00Z", hour * 2 % 60), 1, 17 * hour + 3))
            .collect();

        for period in [Period::Day, Period::Week, Period::Month] {
            let report = aggregate(&sales, period, &at("2024-03-10T23:59:00Z"));
            assert_eq!(report.bucket_sum(), report.total_income, "period {period}");
        }
    }

    #[test]
    fn undated_sales_are_ignored() {
        let mut undated = sale("2024-01-01T05:00:00Z", 1, 100);
        undated.date = None;

        let report = aggregate(&[undated], Period::Day, &at("2024-01-01T12:00:00Z"));

        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.bucket_sum(), Decimal::ZERO);
    }

    #[test]
    fn calendar_follows_reference_time_zone() {
        let manila = FixedOffset::east_opt(8 * 3600).expect("valid offset");
        let reference = manila.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).single().expect("instant");
        // 00:30 local on 2024-01-01
        let sales = vec![sale("2023-12-31T16:30:00Z", 1, 250)];

        let report = aggregate(&sales, Period::Day, &reference);

        assert_eq!(report.start_date, at("2023-12-31T16:00:00Z"));
        assert_eq!(report.buckets[0].total, Decimal::from(250));
    }

    #[test]
    fn selector_recomputes_on_switch() {
        let sales = vec![sale("2024-01-01T10:00:00Z", 1, 100), sale("2024-01-02T10:00:00Z", 1, 50)];
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).single().expect("instant");
        let mut selector = PeriodSelector::default();

        assert_eq!(selector.current(), Period::Day);
        assert_eq!(selector.refresh(&sales, &now).total_income, Decimal::from(50));

        let weekly = selector.switch_to(Period::Week, &sales, &now);
        assert_eq!(selector.current(), Period::Week);
        assert_eq!(weekly.buckets.len(), 7);
        assert_eq!(weekly.total_income, Decimal::from(150));
    }

    #[test]
    fn periods_parse_from_strings() {
        assert_eq!("Week".parse::<Period>(), Ok(Period::Week));
        assert!("year".parse::<Period>().is_err());
        assert_eq!(Period::Month.label(), "This Month");
    }
}
