use std::sync::Arc;

use shared::{
    domain::{Product, ProductField, ProductId},
    protocol::FieldEdit,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

pub mod config;
pub mod error;
pub mod form;
pub mod remote;
pub mod state;
pub mod validate;
pub mod view;

pub use config::{load_client_settings, ClientSettings, ReconcileMode};
pub use error::{SyncError, ValidationError};
pub use form::ProductForm;
pub use remote::{HttpRemoteStore, RemoteStore};
pub use state::CatalogState;
pub use view::{AdminGrid, CardAction, CatalogCard, CatalogView, MemoryView};

use validate::{edit_from_text, validate_edit};
use view::{render_admin, render_catalog};

/// Result of one user-triggered mutation. Failures are already logged by
/// the time this is returned; callers are free to ignore it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Applied,
    Aborted(SyncError),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            EditOutcome::Applied => None,
            EditOutcome::Aborted(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReorderReport {
    pub applied: Vec<ProductId>,
    pub failed: Vec<(ProductId, SyncError)>,
}

impl ReorderReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

enum Mutation {
    Upserted(Product),
    Removed(ProductId),
    /// Accepted by the store without the resulting entity.
    Acknowledged,
}

impl From<Option<Product>> for Mutation {
    fn from(entity: Option<Product>) -> Self {
        entity.map_or(Mutation::Acknowledged, Mutation::Upserted)
    }
}

/// Owns the catalog snapshot and runs every edit against the remote store.
///
/// Mutations are serialized through a single write lane: each one holds it
/// for the request plus the reconciliation that follows, and a reorder holds
/// it for the whole gesture.
pub struct CatalogSession {
    remote: Arc<dyn RemoteStore>,
    view: Arc<dyn CatalogView>,
    state: RwLock<CatalogState>,
    write_lane: Mutex<()>,
    reconcile: ReconcileMode,
}

impl CatalogSession {
    pub fn new(remote: Arc<dyn RemoteStore>, view: Arc<dyn CatalogView>) -> Self {
        Self {
            remote,
            view,
            state: RwLock::new(CatalogState::default()),
            write_lane: Mutex::new(()),
            reconcile: ReconcileMode::Refetch,
        }
    }

    pub fn with_reconcile_mode(mut self, reconcile: ReconcileMode) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn reconcile_mode(&self) -> ReconcileMode {
        self.reconcile
    }

    pub async fn snapshot(&self) -> CatalogState {
        self.state.read().await.clone()
    }

    /// The admin grid as it would be rendered from the current snapshot.
    pub async fn admin_grid(&self) -> AdminGrid {
        render_admin(self.state.read().await.products())
    }

    /// Replaces the snapshot from the remote list. On failure the previous
    /// snapshot stays in place and `false` is returned.
    pub async fn refresh(&self) -> bool {
        let _lane = self.write_lane.lock().await;
        self.refresh_in_lane().await
    }

    async fn refresh_in_lane(&self) -> bool {
        match self.remote.list().await {
            Ok(products) => {
                self.install(products).await;
                true
            }
            Err(err) => {
                error!(kind = err.kind(), %err, "failed to fetch products");
                false
            }
        }
    }

    async fn install(&self, products: Vec<Product>) {
        let mut state = self.state.write().await;
        state.replace(products);
        self.view.render_catalog(render_catalog(state.products()));
        self.view.render_admin(render_admin(state.products()));
        debug!(
            revision = state.revision(),
            count = state.len(),
            "catalog state replaced"
        );
    }

    async fn reconcile_after(&self, mutation: Mutation) {
        match self.reconcile {
            ReconcileMode::Refetch => {
                self.refresh_in_lane().await;
            }
            ReconcileMode::ApplyResponse => {
                let next = {
                    let state = self.state.read().await;
                    match mutation {
                        Mutation::Upserted(product) => Some(state.with_upserted(product)),
                        Mutation::Removed(id) => Some(state.without(&id)),
                        Mutation::Acknowledged => None,
                    }
                };
                match next {
                    Some(products) => self.install(products).await,
                    None => {
                        debug!("no entity in response, refetching");
                        self.refresh_in_lane().await;
                    }
                }
            }
        }
    }

    pub async fn update_field(&self, id: &ProductId, edit: FieldEdit) -> EditOutcome {
        let _lane = self.write_lane.lock().await;
        self.update_field_in_lane(id, edit).await
    }

    async fn update_field_in_lane(&self, id: &ProductId, edit: FieldEdit) -> EditOutcome {
        let field = edit.field();
        info!(%id, %field, value = %edit.value_json(), "updating field");

        if let Err(err) = validate_edit(id, &edit) {
            warn!(%id, %field, %err, "edit rejected before dispatch");
            return EditOutcome::Aborted(err.into());
        }

        match self.remote.update(id, &edit).await {
            Ok(updated) => {
                self.reconcile_after(updated.into()).await;
                EditOutcome::Applied
            }
            Err(err) => {
                match &err {
                    SyncError::Server { status, .. } => {
                        error!(%id, %field, status, "PATCH failed");
                    }
                    _ => error!(%id, %field, %err, "failed to update field"),
                }
                EditOutcome::Aborted(err)
            }
        }
    }

    /// Entry point for raw text coming out of an inline editor. `None` means
    /// the region produced no value at all.
    pub async fn edit_field(
        &self,
        id: &ProductId,
        field: ProductField,
        raw: Option<&str>,
    ) -> EditOutcome {
        let Some(raw) = raw else {
            warn!(%id, %field, "no value supplied");
            return EditOutcome::Aborted(ValidationError::MissingValue { field }.into());
        };
        match edit_from_text(field, raw) {
            Ok(edit) => self.update_field(id, edit).await,
            Err(err @ ValidationError::InvalidPriceInput { .. }) => {
                warn!(%id, raw, "invalid price input");
                EditOutcome::Aborted(err.into())
            }
            Err(err) => {
                warn!(%id, %field, %err, "edit rejected before dispatch");
                EditOutcome::Aborted(err.into())
            }
        }
    }

    pub async fn dispatch(&self, action: CardAction) -> EditOutcome {
        match action {
            CardAction::Blur { id, field, text } => {
                self.edit_field(&id, field, Some(text.as_str())).await
            }
            CardAction::Delete { id } => self.delete_product(&id).await,
        }
    }

    /// Persists a completed drag gesture: position `i` gets sort order
    /// `i + 1`. Items are written one at a time; a failed item is recorded
    /// and the gesture carries on with the next.
    pub async fn reorder(&self, order: &[ProductId]) -> ReorderReport {
        let _lane = self.write_lane.lock().await;
        let mut report = ReorderReport::default();
        if order.is_empty() {
            debug!("empty reorder ignored");
            return report;
        }

        let known = self.state.read().await.len();
        if order.len() != known {
            warn!(
                ordered = order.len(),
                known, "reorder does not cover the full catalog"
            );
        }

        for (index, id) in order.iter().enumerate() {
            let position = index as i64 + 1;
            match self
                .update_field_in_lane(id, FieldEdit::SortOrder(position))
                .await
            {
                EditOutcome::Applied => report.applied.push(id.clone()),
                EditOutcome::Aborted(err) => report.failed.push((id.clone(), err)),
            }
        }

        if self.reconcile == ReconcileMode::ApplyResponse {
            self.refresh_in_lane().await;
        }

        info!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            "reordering complete"
        );
        report
    }

    pub async fn delete_product(&self, id: &ProductId) -> EditOutcome {
        let _lane = self.write_lane.lock().await;
        if id.is_empty() {
            warn!("delete rejected: product id is missing");
            return EditOutcome::Aborted(ValidationError::MissingId.into());
        }
        match self.remote.delete(id).await {
            Ok(()) => {
                info!(%id, "product deleted");
                self.reconcile_after(Mutation::Removed(id.clone())).await;
                EditOutcome::Applied
            }
            Err(err) => {
                error!(%id, %err, "failed to delete product");
                EditOutcome::Aborted(err)
            }
        }
    }

    /// Submits the add form. The form is cleared only after the store
    /// accepted the product, so a failed submission keeps the user's input.
    pub async fn add_product(&self, form: &mut ProductForm) -> EditOutcome {
        let new_product = match form.to_new_product() {
            Ok(product) => product,
            Err(err) => {
                warn!(%err, "add form rejected");
                return EditOutcome::Aborted(err.into());
            }
        };

        let _lane = self.write_lane.lock().await;
        match self.remote.create(&new_product).await {
            Ok(created) => {
                match &created {
                    Some(product) => info!(id = %product.id, name = %product.name, "product added"),
                    None => info!(name = %new_product.name, "product added"),
                }
                form.reset();
                self.reconcile_after(created.into()).await;
                EditOutcome::Applied
            }
            Err(err) => {
                error!(%err, "failed to add product");
                EditOutcome::Aborted(err)
            }
        }
    }

    /// Re-renders only the public catalog with products whose name contains
    /// `query`, ignoring case. Returns the number of matches.
    pub async fn handle_search(&self, query: &str) -> usize {
        let matches = self.state.read().await.search(query);
        let count = matches.len();
        self.view.render_catalog(render_catalog(&matches));
        debug!(query, count, "search applied");
        count
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
