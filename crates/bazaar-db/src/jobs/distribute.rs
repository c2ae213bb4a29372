//! # Inventory Distribution
//!
//! Plans stock for every branch with [`InventoryDistributor`] and writes the
//! plans as `branch_stock` rows. Re-running replaces the previous quantities.

use chrono::Utc;
use rand::Rng;
use tracing::info;

use super::{JobError, JobResult};
use crate::pool::Database;
use bazaar_core::inventory::{DistributionSummary, InventoryDistributor};
use bazaar_core::{BranchStock, Money};

/// Stocks every active branch towards `target_per_branch` (value at cost).
pub async fn distribute_inventory<R: Rng + ?Sized>(
    db: &Database,
    target_per_branch: Money,
    rng: &mut R,
) -> JobResult<Vec<DistributionSummary>> {
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
            "no products found; run seed first".to_string(),
        ));
    }

    info!(
        branches = branches.len(),
        products = products.len(),
        target = %target_per_branch,
        "Distributing inventory"
    );

    let distributor = InventoryDistributor::new(target_per_branch);
    let now = Utc::now();
    let mut summaries = Vec::with_capacity(branches.len());

    for branch in &branches {
        let plan = distributor.plan_branch(branch, &products, rng);
        let records: Vec<BranchStock> = plan
            .stocks
            .iter()
            .map(|stock| stock.to_branch_stock(now))
            .collect();
        db.products().upsert_stock(&records).await?;

        let summary = plan.summary;
        info!(
            branch = %summary.branch_code,
            stocked = summary.products_stocked,
            skipped = summary.products_skipped,
            units = summary.total_units,
            value = %summary.inventory_value,
            target = %summary.target_value,
            "Branch stocked"
        );
        summaries.push(summary);
    }

    Ok(summaries)
}
