//! Bucket reclamation.
use crate::classify::Classifier;
use crate::provider::Storage;
use crate::report::{Action, Ledger, Outcome, Step};

/// Empties and deletes the deployment-owned buckets among `buckets`.
///
/// Buckets without a role marker are left alone. A bucket is only deleted
/// once emptying it succeeded.
pub async fn reclaim(
    cloud: &impl Storage,
    buckets: &[String],
    classifier: &impl Classifier,
    ledger: &mut Ledger,
) {
    if buckets.is_empty() {
        ledger.notice("stack has no buckets, skipping bucket reclamation");
        return;
    }

    for bucket in buckets {
        let Some(role) = classifier.bucket_role(bucket) else {
            ledger.record(
                Step::Buckets,
                Action::Delete,
                bucket,
                Outcome::Skipped("not deployment-owned".to_owned()),
            );
            continue;
        };
        log::debug!("bucket {bucket} has role {role}");

        let emptied = cloud.empty_bucket(bucket).await;
        let outcome = Outcome::from_result(&emptied);
        let detail = emptied
            .as_ref()
            .ok()
            .map(|count| format!("{count} object(s) removed"));
        ledger.record_with_detail(Step::Buckets, Action::Empty, bucket, outcome.clone(), detail);

        if !outcome.is_done() {
            let reason = match outcome {
                Outcome::Skipped(reason) => reason,
                _ => "bucket could not be emptied".to_owned(),
            };
            ledger.record(Step::Buckets, Action::Delete, bucket, Outcome::Skipped(reason));
            continue;
        }

        let deleted = cloud.delete_bucket(bucket).await;
        ledger.record(
            Step::Buckets,
            Action::Delete,
            bucket,
            Outcome::from_result(&deleted),
        );
    }
}
