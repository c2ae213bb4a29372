//! # Data Validation
//!
//! Loads the whole dataset and runs [`consistency::validate`] over it.
//! Nothing is written; findings are logged per check and returned.

use tracing::{debug, error, info, warn};

use super::JobResult;
use crate::pool::Database;
use bazaar_core::consistency::{self, CheckKind, Dataset, Finding, Severity, ValidationReport};

/// Findings logged individually per check before the rest are summarized.
const LOGGED_PER_CHECK: usize = 5;

pub async fn validate_data(db: &Database) -> JobResult<ValidationReport> {
    let branches = db.branches().list().await?;
    let categories = db.categories().list().await?;
    let products = db.products().list().await?;
    let users = db.users().list().await?;
    let customers = db.customers().list().await?;
    let sales = db.sales().list_with_items().await?;

    info!(
        branches = branches.len(),
        products = products.len(),
        customers = customers.len(),
        sales = sales.len(),
        "Validating data"
    );

    let report = consistency::validate(&Dataset {
        branches: &branches,
        categories: &categories,
        products: &products,
        users: &users,
        customers: &customers,
        sales: &sales,
    });

    for passed in &report.passed {
        info!(check = passed.check.name(), examined = passed.examined, "Check passed");
    }
    for check in CheckKind::ALL {
        let findings: Vec<&Finding> = report.findings_for(check).collect();
        if findings.is_empty() {
            continue;
        }
        log_findings(check, &findings);
    }

    info!(
        passed = report.passed_count(),
        warnings = report.warning_count(),
        failed = report.failure_count(),
        "Validation finished"
    );
    Ok(report)
}

fn log_findings(check: CheckKind, findings: &[&Finding]) {
    let failing = check.severity() == Severity::Failure;
    for finding in findings.iter().take(LOGGED_PER_CHECK) {
        if failing {
            error!(check = check.name(), subject = %finding.subject, "{}", finding.message);
        } else {
            warn!(check = check.name(), subject = %finding.subject, "{}", finding.message);
        }
        debug!(check = check.name(), details = %finding.details, "Finding details");
    }

    let rest = findings.len().saturating_sub(LOGGED_PER_CHECK);
    if rest > 0 {
        if failing {
            error!(check = check.name(), count = findings.len(), "... and {rest} more");
        } else {
            warn!(check = check.name(), count = findings.len(), "... and {rest} more");
        }
    }
}
