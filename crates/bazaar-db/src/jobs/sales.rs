//! # Sales History Generation
//!
//! Builds `days × branches × per_branch_per_day` sale drafts, oldest day
//! first, and persists them through [`SaleRepository::insert_batch`].
//!
//! ```text
//! for day in oldest..=yesterday
//!   for branch
//!     per_branch_per_day random times between 09:00 and 21:59 (sorted)
//!       SaleBuilder::build ──► apply_to_stock (local view) ──► pending
//!       pending.len() == batch_size ──► insert_batch
//! ```
//!
//! The local stock view starts from `branch_stock` and is decremented as
//! drafts are built, so a draft never asks for more than the database
//! holds. The guarded decrement inside each sale transaction still has the
//! final word.
//!
//! [`SaleRepository::insert_batch`]: crate::repository::sale::SaleRepository::insert_batch

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::{JobError, JobResult};
use crate::config::AppConfig;
use crate::pool::Database;
use bazaar_core::payment::PaymentMix;
use bazaar_core::sale_builder::{apply_to_stock, SaleBuilder, SaleContext, SaleDraft, StockedProduct};
use bazaar_core::{User, UserRole};

const OPENING_HOUR: u32 = 9;
const CLOSING_HOUR: u32 = 22;

/// How much history to generate.
#[derive(Debug, Clone)]
pub struct SalesOptions {
    pub days: u32,
    pub per_branch_per_day: u32,
    pub batch_size: usize,
    /// History ends the day before this instant.
    pub end: DateTime<Utc>,
    pub payment_mix: PaymentMix,
}

impl SalesOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        SalesOptions {
            days: config.sales_days,
            per_branch_per_day: config.sales_per_branch_per_day,
            batch_size: config.sales_batch_size.max(1),
            end: Utc::now(),
            payment_mix: PaymentMix::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Sale slots tried.
    pub attempted: usize,
    /// Slots where the branch had nothing left to sell.
    pub skipped_empty: usize,
    pub inserted: usize,
    pub failed: usize,
    pub first_number: Option<String>,
    pub last_number: Option<String>,
}

/// Generates and stores sales history.
pub async fn seed_sales<R: Rng + ?Sized>(
    db: &Database,
    options: &SalesOptions,
    rng: &mut R,
) -> JobResult<SalesSummary> {
    let branches: Vec<_> = db
        .branches()
        .list()
        .await?
        .into_iter()
        .filter(|b| b.is_active)
        .collect();
    if branches.is_empty() {
        return Err(JobError::MissingPrerequisite(
            "no branches found; run seed first".to_string(),
        ));
    }

    let products = db.products().list().await?;
    if products.is_empty() {
        return Err(JobError::MissingPrerequisite(
            "no products found; run seed and distribute-inventory first".to_string(),
        ));
    }

    let users: Vec<User> = db
        .users()
        .list()
        .await?
        .into_iter()
        .filter(|u| u.is_active)
        .collect();
    if users.is_empty() {
        return Err(JobError::MissingPrerequisite(
            "no users found; run seed first".to_string(),
        ));
    }

    let customers: Vec<_> = db
        .customers()
        .list()
        .await?
        .into_iter()
        .filter(|c| c.is_active)
        .collect();

    let resumed_from = db.sequences().sync_sale_sequence().await?;
    info!(
        days = options.days,
        per_branch_per_day = options.per_branch_per_day,
        branches = branches.len(),
        customers = customers.len(),
        sequence = resumed_from,
        "Generating sales"
    );

    let mut stock: HashMap<&str, Vec<StockedProduct>> = branches
        .iter()
        .map(|b| (b.id.as_str(), StockedProduct::for_branch(&products, &b.id)))
        .collect();

    let builder = SaleBuilder::new().payment_mix(options.payment_mix);
    let batch_size = options.batch_size.max(1);
    let mut pending: Vec<SaleDraft> = Vec::with_capacity(batch_size);
    let mut summary = SalesSummary::default();

    for days_back in (1..=i64::from(options.days)).rev() {
        let date = (options.end - Duration::days(days_back)).date_naive();

        for branch in &branches {
            let cashiers = cashiers_for(&users, &branch.id);
            let Some(view) = stock.get_mut(branch.id.as_str()) else {
                continue;
            };

            let mut times: Vec<DateTime<Utc>> = (0..options.per_branch_per_day)
                .filter_map(|_| sale_time(date, rng))
                .collect();
            times.sort();

            for at in times {
                summary.attempted += 1;

                let Some(cashier) = cashiers.choose(rng) else {
                    continue;
                };
                let ctx = SaleContext {
                    branch_id: &branch.id,
                    cashier_id: &cashier.id,
                    products: view.as_slice(),
                    customers: &customers,
                    at,
                };

                match builder.build(&ctx, rng) {
                    Some(draft) => {
                        apply_to_stock(view, &draft);
                        pending.push(draft);
                    }
                    None => {
                        debug!(branch = %branch.code, %date, "Branch out of stock, slot skipped");
                        summary.skipped_empty += 1;
                    }
                }

                if pending.len() >= batch_size {
                    flush(db, &mut pending, &mut summary).await;
                }
            }
        }
    }
    flush(db, &mut pending, &mut summary).await;

    info!(
        attempted = summary.attempted,
        inserted = summary.inserted,
        failed = summary.failed,
        skipped_empty = summary.skipped_empty,
        "Sales generated"
    );
    Ok(summary)
}

async fn flush(db: &Database, pending: &mut Vec<SaleDraft>, summary: &mut SalesSummary) {
    if pending.is_empty() {
        return;
    }

    let report = db.sales().insert_batch(pending).await;
    summary.inserted += report.inserted_count();
    summary.failed += report.failed_count();

    if let Some(first) = report.inserted.first() {
        summary
            .first_number
            .get_or_insert_with(|| first.sale_number.clone());
    }
    if let Some(last) = report.inserted.last() {
        summary.last_number = Some(last.sale_number.clone());
    }

    pending.clear();
}

/// Cashiers of a branch; any staff of the branch, then anyone, when it has none.
fn cashiers_for<'a>(users: &'a [User], branch_id: &str) -> Vec<&'a User> {
    let at_branch = |u: &&User| u.branch_id.as_deref() == Some(branch_id);

    let cashiers: Vec<&User> = users
        .iter()
        .filter(at_branch)
        .filter(|u| u.role == UserRole::Cashier)
        .collect();
    if !cashiers.is_empty() {
        return cashiers;
    }

    let staff: Vec<&User> = users.iter().filter(at_branch).collect();
    if !staff.is_empty() {
        return staff;
    }

    users.iter().collect()
}

/// A random moment of trading hours on `date`.
fn sale_time<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(
        rng.gen_range(OPENING_HOUR..CLOSING_HOUR),
        rng.gen_range(0..60),
        rng.gen_range(0..60),
    )?;
    Some(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seeded_db, test_db, user};
    use bazaar_core::SaleStatus;
    use chrono::Timelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options(days: u32, per_day: u32, batch_size: usize) -> SalesOptions {
        SalesOptions {
            days,
            per_branch_per_day: per_day,
            batch_size,
            end: Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap(),
            payment_mix: PaymentMix::default(),
        }
    }

    #[tokio::test]
    async fn test_seed_sales_requires_branches() {
        let db = test_db().await;
        let mut rng = StdRng::seed_from_u64(3);

        let err = seed_sales(&db, &options(1, 1, 10), &mut rng).await.unwrap_err();
        assert!(matches!(err, JobError::MissingPrerequisite(_)));
    }

    #[tokio::test]
    async fn test_seed_sales_accounts_for_every_slot() {
        let (db, fixture) = seeded_db().await;
        let mut rng = StdRng::seed_from_u64(8);

        let summary = seed_sales(&db, &options(2, 3, 2), &mut rng).await.unwrap();

        assert_eq!(summary.attempted, 6);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.inserted + summary.skipped_empty, 6);
        assert!(summary.inserted > 0);
        assert_eq!(db.sales().count().await.unwrap(), summary.inserted as i64);
        assert_eq!(summary.first_number.as_deref(), Some("SAL20260313000001"));

        let sales = db.sales().list_with_items().await.unwrap();
        let sold: i64 = sales.iter().flat_map(|s| &s.items).map(|i| i.quantity).sum();
        let remaining: i64 = db
            .products()
            .stock_for_branch(&fixture.main.id)
            .await
            .unwrap()
            .iter()
            .map(|s| s.quantity)
            .sum();
        assert_eq!(sold + remaining, 60);

        for sale in &sales {
            assert_eq!(sale.status, SaleStatus::Completed);
            assert_eq!(sale.created_by, fixture.cashier.id);
            assert!(sale.created_at < options(2, 3, 2).end);
            let hour = sale.created_at.hour();
            assert!((OPENING_HOUR..CLOSING_HOUR).contains(&hour));
        }
    }

    #[tokio::test]
    async fn test_seed_sales_continues_numbering() {
        let (db, _) = seeded_db().await;
        let mut rng = StdRng::seed_from_u64(9);

        let first = seed_sales(&db, &options(1, 1, 10), &mut rng).await.unwrap();
        let second = seed_sales(&db, &options(1, 1, 10), &mut rng).await.unwrap();

        assert_eq!(first.inserted, 1);
        assert_eq!(second.inserted, 1);
        assert_eq!(second.first_number.as_deref(), Some("SAL20260314000002"));
    }

    #[test]
    fn test_branch_without_cashier_falls_back_to_staff() {
        let users = vec![
            user("admin", UserRole::Admin, None),
            user("mgr.blr01", UserRole::Manager, Some("b1")),
        ];

        let picked = cashiers_for(&users, "b1");
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].username, "mgr.blr01");

        let anyone = cashiers_for(&users, "b2");
        assert_eq!(anyone.len(), 2);
    }

    #[test]
    fn test_sale_time_within_trading_hours() {
        let mut rng = StdRng::seed_from_u64(4);
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        for _ in 0..100 {
            let at = sale_time(date, &mut rng).unwrap();
            assert_eq!(at.date_naive(), date);
            assert!(at.hour() >= OPENING_HOUR && at.hour() < CLOSING_HOUR);
        }
    }
}
