//! Protected-resource override for data tables.
use crate::provider::Tables;
use crate::report::{Action, Ledger, Outcome, Step};

/// Clears deletion protection on each table and deletes it.
///
/// Callers must only reach this with the override set. Both calls are
/// attempted for every table, whatever the first one returned.
pub async fn reclaim(cloud: &impl Tables, tables: &[String], ledger: &mut Ledger) {
    if tables.is_empty() {
        ledger.notice("stack has no tables, nothing to override");
        return;
    }

    for table in tables {
        let unprotected = cloud.disable_deletion_protection(table).await;
        ledger.record(
            Step::Tables,
            Action::DisableProtection,
            table,
            Outcome::from_result(&unprotected),
        );

        let deleted = cloud.delete_table(table).await;
        ledger.record(
            Step::Tables,
            Action::Delete,
            table,
            Outcome::from_result(&deleted),
        );
    }
}
