//! # Reporting / Aggregation
//!
//! Dashboard KPI rollups over already-fetched ledger rows. Everything here
//! is a pure fold: recomputing from the same rows yields the same totals
//! regardless of input order.
//!
//! The database layer fetches the sales inside a window; this module turns
//! them into summaries, series and breakdowns. KPI comparisons are computed
//! by running the same fold over the previous window's rows.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{MarketCredit, MarketCreditStatus, Product, Sale};

// =============================================================================
// Report Window
// =============================================================================

/// The time window a dashboard report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportWindow {
    Today,
    Week,
    Month,
    Year,
}

impl ReportWindow {
    /// Half-open bounds `[start, end)` of the current window, relative to
    /// `now`.
    ///
    /// - Today: midnight → next midnight
    /// - Week: the last 7 days, ending tomorrow midnight
    /// - Month: first of the month → first of next month
    /// - Year: Jan 1 → Jan 1 next year (year-to-date in practice)
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc();

        match self {
            ReportWindow::Today => (midnight(today), midnight(today) + Duration::days(1)),
            ReportWindow::Week => (
                midnight(today) - Duration::days(6),
                midnight(today) + Duration::days(1),
            ),
            ReportWindow::Month => {
                let start = first_of_month(today.year(), today.month());
                let end = if today.month() == 12 {
                    first_of_month(today.year() + 1, 1)
                } else {
                    first_of_month(today.year(), today.month() + 1)
                };
                (midnight(start), midnight(end))
            }
            ReportWindow::Year => (
                midnight(first_of_month(today.year(), 1)),
                midnight(first_of_month(today.year() + 1, 1)),
            ),
        }
    }

    /// Bounds of the comparison window immediately before this one:
    /// yesterday, the prior 7 days, the previous calendar month, or the
    /// previous year (for YTD-vs-last-year comparisons).
    pub fn previous_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc();
        let (start, end) = self.bounds(now);

        match self {
            ReportWindow::Today | ReportWindow::Week => {
                let span = end - start;
                (start - span, start)
            }
            ReportWindow::Month => {
                let prev = if today.month() == 1 {
                    first_of_month(today.year() - 1, 12)
                } else {
                    first_of_month(today.year(), today.month() - 1)
                };
                (midnight(prev), start)
            }
            ReportWindow::Year => (midnight(first_of_month(today.year() - 1, 1)), start),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Day 1 of a real month is always constructible
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date"))
}

// =============================================================================
// Summaries
// =============================================================================

/// Headline KPIs for a window of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Total revenue (sum of sale totals) in paise.
    pub revenue_paise: i64,
    /// Number of sales in the window.
    pub transactions: u64,
    /// revenue / transactions, in paise; zero for an empty window.
    pub average_order_paise: i64,
}

impl SalesSummary {
    pub fn revenue(&self) -> Money {
        Money::from_paise(self.revenue_paise)
    }
}

/// Folds a slice of sales into headline KPIs.
pub fn sales_summary(sales: &[Sale]) -> SalesSummary {
    let revenue: i64 = sales.iter().map(|s| s.total_paise).sum();
    let transactions = sales.len() as u64;
    let average = if transactions == 0 {
        0
    } else {
        revenue / transactions as i64
    };

    SalesSummary {
        revenue_paise: revenue,
        transactions,
        average_order_paise: average,
    }
}

/// Current-vs-previous window comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiComparison {
    pub current: SalesSummary,
    pub previous: SalesSummary,
    /// current revenue − previous revenue, in paise.
    pub revenue_change_paise: i64,
}

/// Builds a comparison from the two windows' sales.
pub fn compare_windows(current: &[Sale], previous: &[Sale]) -> KpiComparison {
    let current = sales_summary(current);
    let previous = sales_summary(previous);
    KpiComparison {
        revenue_change_paise: current.revenue_paise - previous.revenue_paise,
        current,
        previous,
    }
}

// =============================================================================
// Series and Breakdowns
// =============================================================================

/// One bucket in a revenue series or breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBucket {
    /// Bucket label: an ISO date, a "YYYY-MM" month, a payment method or a
    /// category name.
    pub label: String,
    pub revenue_paise: i64,
    pub transactions: u64,
}

fn bucketize<K: Ord + ToString>(
    sales: &[Sale],
    key: impl Fn(&Sale) -> K,
) -> Vec<RevenueBucket> {
    let mut buckets: BTreeMap<K, (i64, u64)> = BTreeMap::new();
    for sale in sales {
        let entry = buckets.entry(key(sale)).or_insert((0, 0));
        entry.0 += sale.total_paise;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(k, (revenue, count))| RevenueBucket {
            label: k.to_string(),
            revenue_paise: revenue,
            transactions: count,
        })
        .collect()
}

/// Per-day revenue series, labelled with ISO dates, sorted ascending.
pub fn revenue_by_day(sales: &[Sale]) -> Vec<RevenueBucket> {
    bucketize(sales, |s| s.created_at.date_naive())
}

/// Per-month revenue series, labelled "YYYY-MM", sorted ascending.
pub fn revenue_by_month(sales: &[Sale]) -> Vec<RevenueBucket> {
    bucketize(sales, |s| s.created_at.format("%Y-%m").to_string())
}

/// Revenue split by payment method.
pub fn revenue_by_payment_method(sales: &[Sale]) -> Vec<RevenueBucket> {
    bucketize(sales, |s| s.payment_method.label().to_string())
}

/// Revenue split by product category.
///
/// The category comes from the product record itself; sales referencing a
/// product that is no longer known fall into "uncategorized".
pub fn revenue_by_category(sales: &[Sale], products: &[Product]) -> Vec<RevenueBucket> {
    let categories: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id.as_str(), p.category.as_str()))
        .collect();

    bucketize(sales, |s| {
        categories
            .get(s.product_id.as_str())
            .copied()
            .unwrap_or("uncategorized")
            .to_string()
    })
}

// =============================================================================
// Credit Book Rollups
// =============================================================================

/// Total outstanding across all unpaid market credits.
pub fn total_outstanding(credits: &[MarketCredit]) -> Money {
    credits
        .iter()
        .filter(|c| c.status == MarketCreditStatus::Unpaid)
        .map(|c| c.outstanding())
        .sum()
}

/// Outstanding balance for one customer's unpaid market credits:
/// Σ (amount − collections) over their entries.
pub fn customer_balance(credits: &[MarketCredit], phone: &str) -> Money {
    credits
        .iter()
        .filter(|c| c.customer_phone == phone && c.status == MarketCreditStatus::Unpaid)
        .map(|c| c.outstanding())
        .sum()
}

// =============================================================================
// Stock
// =============================================================================

/// Active products at or below their reorder threshold.
pub fn low_stock<'a>(products: &'a [Product]) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| p.is_active && p.is_low_stock())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, Unit};
    use chrono::TimeZone;

    fn sale_at(
        day: u32,
        product_id: &str,
        total_rupees: i64,
        method: PaymentMethod,
    ) -> Sale {
        let created = Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap();
        Sale {
            id: format!("s-{}-{}", day, product_id),
            product_id: product_id.to_string(),
            product_name: product_id.to_string(),
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            quantity: 1,
            unit_price_paise: total_rupees * 100,
            total_paise: total_rupees * 100,
            paid_paise: total_rupees * 100,
            credit_paise: 0,
            payment_method: method,
            recorded_by: "staff-1".to_string(),
            created_at: created,
        }
    }

    fn product(id: &str, category: &str) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            category: category.to_string(),
            product_type: "t".to_string(),
            packaging: "1L".to_string(),
            base_price_paise: 100,
            stock: 10,
            unit: Unit::L,
            low_stock_alert: 2,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sales_summary() {
        let sales = vec![
            sale_at(1, "p1", 100, PaymentMethod::Cash),
            sale_at(1, "p2", 200, PaymentMethod::Gpay),
            sale_at(2, "p1", 300, PaymentMethod::Credit),
        ];
        let summary = sales_summary(&sales);
        assert_eq!(summary.revenue_paise, 60000);
        assert_eq!(summary.transactions, 3);
        assert_eq!(summary.average_order_paise, 20000);
    }

    #[test]
    fn test_sales_summary_empty() {
        let summary = sales_summary(&[]);
        assert_eq!(summary.revenue_paise, 0);
        assert_eq!(summary.transactions, 0);
        assert_eq!(summary.average_order_paise, 0);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut sales = vec![
            sale_at(1, "p1", 100, PaymentMethod::Cash),
            sale_at(2, "p2", 200, PaymentMethod::Gpay),
            sale_at(3, "p3", 300, PaymentMethod::Credit),
        ];
        let forward = sales_summary(&sales);
        let by_day_forward = revenue_by_day(&sales);

        sales.reverse();
        assert_eq!(sales_summary(&sales), forward);
        assert_eq!(revenue_by_day(&sales), by_day_forward);
    }

    #[test]
    fn test_revenue_by_day() {
        let sales = vec![
            sale_at(1, "p1", 100, PaymentMethod::Cash),
            sale_at(1, "p2", 200, PaymentMethod::Cash),
            sale_at(2, "p1", 300, PaymentMethod::Cash),
        ];
        let series = revenue_by_day(&sales);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "2026-03-01");
        assert_eq!(series[0].revenue_paise, 30000);
        assert_eq!(series[1].label, "2026-03-02");
        assert_eq!(series[1].transactions, 1);
    }

    #[test]
    fn test_revenue_by_payment_method() {
        let sales = vec![
            sale_at(1, "p1", 100, PaymentMethod::Cash),
            sale_at(1, "p2", 200, PaymentMethod::Cash),
            sale_at(2, "p1", 300, PaymentMethod::Gpay),
        ];
        let breakdown = revenue_by_payment_method(&sales);
        let cash = breakdown.iter().find(|b| b.label == "cash").unwrap();
        assert_eq!(cash.revenue_paise, 30000);
        assert_eq!(cash.transactions, 2);
    }

    #[test]
    fn test_revenue_by_category_uses_product_field() {
        let products = vec![product("p1", "oil"), product("p2", "rice")];
        let sales = vec![
            sale_at(1, "p1", 100, PaymentMethod::Cash),
            sale_at(1, "p2", 200, PaymentMethod::Cash),
            sale_at(1, "ghost", 50, PaymentMethod::Cash),
        ];
        let breakdown = revenue_by_category(&sales, &products);
        let oil = breakdown.iter().find(|b| b.label == "oil").unwrap();
        assert_eq!(oil.revenue_paise, 10000);
        assert!(breakdown.iter().any(|b| b.label == "uncategorized"));
    }

    #[test]
    fn test_compare_windows() {
        let current = vec![sale_at(2, "p1", 300, PaymentMethod::Cash)];
        let previous = vec![sale_at(1, "p1", 100, PaymentMethod::Cash)];
        let cmp = compare_windows(&current, &previous);
        assert_eq!(cmp.revenue_change_paise, 20000);
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap();

        let (start, end) = ReportWindow::Today.bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap());

        let (mstart, mend) = ReportWindow::Month.bounds(now);
        assert_eq!(mstart, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(mend, Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());

        let (pstart, pend) = ReportWindow::Month.previous_bounds(now);
        assert_eq!(pstart, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(pend, mstart);

        let (ystart, _) = ReportWindow::Year.bounds(now);
        assert_eq!(ystart, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_previous_spans_align() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        // January: previous month must be December of the prior year
        let (pstart, pend) = ReportWindow::Month.previous_bounds(now);
        assert_eq!(pstart, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(pend, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_total_outstanding_and_customer_balance() {
        let mut c1 = MarketCredit {
            id: "mc-1".to_string(),
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            amount_paise: 100000,
            collected_paise: 50000,
            description: String::new(),
            status: MarketCreditStatus::Unpaid,
            created_by: "owner".to_string(),
            created_at: Utc::now(),
        };
        let mut c2 = c1.clone();
        c2.id = "mc-2".to_string();
        c2.customer_phone = "9000000000".to_string();
        c2.collected_paise = 0;

        // A settled credit contributes nothing
        let mut c3 = c1.clone();
        c3.id = "mc-3".to_string();
        c3.collected_paise = 100000;
        c3.status = MarketCreditStatus::Paid;

        let credits = vec![c1.clone(), c2, c3];
        assert_eq!(total_outstanding(&credits).paise(), 150000);
        assert_eq!(customer_balance(&credits, "9876543210").paise(), 50000);
        assert_eq!(customer_balance(&credits, "9000000000").paise(), 100000);

        c1.collected_paise = 100000;
        assert_eq!(c1.outstanding().paise(), 0);
    }

    #[test]
    fn test_low_stock() {
        let mut p1 = product("p1", "oil");
        p1.stock = 2; // at threshold
        let mut p2 = product("p2", "rice");
        p2.stock = 10;
        let mut p3 = product("p3", "oil");
        p3.stock = 0;
        p3.is_active = false;

        let products = vec![p1, p2, p3];
        let flagged = low_stock(&products);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, "p1");
    }
}
