//! services/client/src/sync/mutation.rs
//!
//! Issues user-initiated writes and keeps mounted lists in step with them.

use recletters_core::domain::CurrentUser;
use recletters_core::mutation::{plan, Mutation, MutationKind, MutationPlan};
use recletters_core::ports::{
    MutationReceipt, NavigationService, NotificationService, OperationalLog, RemoteCollectionService,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::sync::store::QueryStore;

pub struct MutationService {
    remote: Arc<dyn RemoteCollectionService>,
    store: Arc<QueryStore>,
    notifier: Arc<dyn NotificationService>,
    log: Arc<dyn OperationalLog>,
    navigator: Arc<dyn NavigationService>,
}

impl MutationService {
    pub fn new(
        remote: Arc<dyn RemoteCollectionService>,
        store: Arc<QueryStore>,
        notifier: Arc<dyn NotificationService>,
        log: Arc<dyn OperationalLog>,
        navigator: Arc<dyn NavigationService>,
    ) -> Self {
        Self {
            remote,
            store,
            notifier,
            log,
            navigator,
        }
    }

    /// Plans, sends and settles one mutation.
    ///
    /// A refused plan returns before anything is sent. A failed call is
    /// reported and leaves every cached list untouched. A confirmed call is
    /// announced, then every list that may hold the record is refetched.
    pub async fn mutate(
        &self,
        user: Option<&CurrentUser>,
        mutation: &Mutation,
    ) -> Result<MutationReceipt, ClientError> {
        let plan = plan(user, mutation).map_err(|e| {
            warn!(error = %e, "Mutation refused");
            e
        })?;

        match self.remote.execute(&plan).await {
            Ok(receipt) => {
                self.notifier.notify(&confirmation(&plan, &receipt));
                self.store.invalidate_affected(plan.affected).await;
                if let Some(destination) = plan.destination.clone() {
                    self.navigator.navigate(destination);
                }
                info!(kind = ?plan.kind, id = ?receipt.id, "Mutation confirmed");
                Ok(receipt)
            }
            Err(err) => {
                self.notifier.notify(&err.user_message(&plan.failure));
                self.log.log_error(&err.to_string(), &plan.failure);
                Err(err.into())
            }
        }
    }
}

/// The one-line success toast.
fn confirmation(plan: &MutationPlan, receipt: &MutationReceipt) -> String {
    if let Some(message) = receipt.message.as_deref().filter(|m| !m.trim().is_empty()) {
        return message.to_string();
    }
    match (plan.kind, receipt.id) {
        (MutationKind::Create, Some(id)) => format!("{} - id: {}", plan.confirmation, id),
        _ => plan.confirmation.clone(),
    }
}
