use super::form::ModeloForm;
use crate::client::{ClientError, MarcaApi, ModeloApi};
use crate::models::{add_marca_to_collection_if_missing, Marca, Modelo};
use crate::routing::Navigator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The form failed validation; nothing was sent.
    #[error("modelo form is invalid: {0}")]
    Validation(ValidationErrors),

    #[error("failed to save modelo: {0}")]
    Save(#[source] ClientError),

    #[error("failed to load marca options: {0}")]
    LoadOptions(#[source] ClientError),
}

/// Where a workflow instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    Loading,
    Ready,
    Saving,
    Succeeded,
    Failed,
}

/// Holds `is_saving` and the `Saving` phase for one request.
///
/// Dropping it clears the flag and moves the phase to the settled outcome,
/// or back to `Idle` when the request was cancelled before settling.
struct SavingGuard<'a> {
    flag: Arc<AtomicBool>,
    phase: &'a mut WorkflowPhase,
    outcome: Option<WorkflowPhase>,
}

impl<'a> SavingGuard<'a> {
    fn engage(flag: Arc<AtomicBool>, phase: &'a mut WorkflowPhase) -> Self {
        flag.store(true, Ordering::SeqCst);
        *phase = WorkflowPhase::Saving;
        Self {
            flag,
            phase,
            outcome: None,
        }
    }

    fn settle(mut self, outcome: WorkflowPhase) {
        self.outcome = Some(outcome);
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        *self.phase = self.outcome.unwrap_or(WorkflowPhase::Idle);
    }
}

/// Identity of an option in the marca picklist.
///
/// # Panics
///
/// Every marca handed out by [`MarcaApi::query`] is persisted, so it always
/// carries an id. Passing an unsaved marca panics.
pub fn track_marca_by_id(item: &Marca) -> i64 {
    item.id
        .expect("marca picklist entries always come from the server with an id")
}

/// Creates or updates one [`Modelo`] through an edit form, keeping the
/// record's current marca selectable in the picklist.
///
/// One instance serves one navigation into the edit view.
pub struct ModeloUpdateWorkflow<M, S, N> {
    marca_api: M,
    modelo_api: S,
    navigator: N,
    is_saving: Arc<AtomicBool>,
    marcas_shared_collection: Vec<Marca>,
    edit_form: ModeloForm,
    phase: WorkflowPhase,
}

impl<M, S, N> ModeloUpdateWorkflow<M, S, N>
where
    M: MarcaApi,
    S: ModeloApi,
    N: Navigator,
{
    pub fn new(marca_api: M, modelo_api: S, navigator: N) -> Self {
        Self {
            marca_api,
            modelo_api,
            navigator,
            is_saving: Arc::new(AtomicBool::new(false)),
            marcas_shared_collection: Vec::new(),
            edit_form: ModeloForm::new(),
            phase: WorkflowPhase::Idle,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving.load(Ordering::SeqCst)
    }

    /// Shared view of the saving flag, readable while a submit is in flight.
    pub fn saving_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.is_saving)
    }

    pub fn marcas_shared_collection(&self) -> &[Marca] {
        &self.marcas_shared_collection
    }

    pub fn edit_form(&self) -> &ModeloForm {
        &self.edit_form
    }

    pub fn edit_form_mut(&mut self) -> &mut ModeloForm {
        &mut self.edit_form
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Returns a settled workflow (`Succeeded` or `Failed`) to `Idle`.
    pub fn reset(&mut self) {
        if matches!(self.phase, WorkflowPhase::Succeeded | WorkflowPhase::Failed) {
            self.phase = WorkflowPhase::Idle;
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Seeds the form from `record` and loads the marca options.
    ///
    /// The form is usable even when loading the options fails; the error is
    /// still reported so the caller can tell the user.
    #[instrument(skip(self, record), fields(modelo_id = ?record.id))]
    pub async fn initialize(&mut self, record: &Modelo) -> Result<(), WorkflowError> {
        self.update_form(record);
        self.load_relationship_options().await
    }

    /// Copies every field of `record` into the form and keeps its marca
    /// visible before the full option list arrives.
    pub fn update_form(&mut self, record: &Modelo) {
        self.edit_form.patch_value(record);
        self.marcas_shared_collection = add_marca_to_collection_if_missing(
            std::mem::take(&mut self.marcas_shared_collection),
            record.marca.as_ref(),
        );
    }

    /// Replaces the picklist with the server's marcas plus the form's
    /// current selection. On failure the picklist is left as it was.
    pub async fn load_relationship_options(&mut self) -> Result<(), WorkflowError> {
        self.phase = WorkflowPhase::Loading;
        let result = self.marca_api.query().await;
        self.phase = WorkflowPhase::Ready;

        match result {
            Ok(marcas) => {
                self.marcas_shared_collection =
                    add_marca_to_collection_if_missing(marcas, self.edit_form.marca.value());
                debug!(
                    options = self.marcas_shared_collection.len(),
                    "marca options loaded"
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "could not load marca options");
                Err(WorkflowError::LoadOptions(err))
            }
        }
    }

    /// Validates the form, then sends exactly one update (record has an id)
    /// or create (it has none).
    ///
    /// `is_saving` is set for the duration of the request and cleared once it
    /// settles, before navigating back on success. Dropping the returned
    /// future mid-request leaves the workflow `Idle` with the form intact.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Modelo, WorkflowError> {
        self.edit_form.validate().map_err(WorkflowError::Validation)?;

        let modelo = self.edit_form.to_modelo();
        let saving = SavingGuard::engage(self.saving_flag(), &mut self.phase);
        let result = if modelo.id.is_some() {
            self.modelo_api.update(modelo).await
        } else {
            self.modelo_api.create(modelo).await
        };
        saving.settle(if result.is_ok() {
            WorkflowPhase::Succeeded
        } else {
            WorkflowPhase::Failed
        });

        match result {
            Ok(saved) => {
                info!(modelo_id = ?saved.id, "modelo saved");
                self.navigator.previous_state();
                Ok(saved)
            }
            Err(err) => {
                warn!(error = %err, "modelo save failed");
                Err(WorkflowError::Save(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockMarcaApi, MockModeloApi};
    use crate::routing::{MockNavigator, NavigationHistory};
    use assert_matches::assert_matches;
    use reqwest::StatusCode;
    use crate::handlers::common::PaginationParams;
    use std::sync::Mutex;
    use std::time::Duration;

    fn honda() -> Marca {
        Marca::new(Some(3), "Honda")
    }

    fn toyota() -> Marca {
        Marca::new(Some(9), "Toyota")
    }

    fn civic() -> Modelo {
        Modelo {
            id: Some(7),
            modelo: Some("Civic".into()),
            marca: Some(honda()),
            ..Default::default()
        }
    }

    fn server_error() -> ClientError {
        ClientError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".into(),
        }
    }

    fn idle_navigator() -> MockNavigator {
        let mut navigator = MockNavigator::new();
        navigator.expect_previous_state().never();
        navigator
    }

    #[tokio::test]
    async fn initialize_merges_selected_marca_without_duplicates() {
        let mut marcas = MockMarcaApi::new();
        marcas
            .expect_query()
            .times(1)
            .returning(|| Ok(vec![honda(), toyota()]));

        let mut workflow =
            ModeloUpdateWorkflow::new(marcas, MockModeloApi::new(), idle_navigator());
        workflow.initialize(&civic()).await.unwrap();

        assert_eq!(workflow.marcas_shared_collection(), &[honda(), toyota()]);
        assert_eq!(workflow.edit_form().to_modelo(), civic());
        assert_eq!(workflow.phase(), WorkflowPhase::Ready);
    }

    #[tokio::test]
    async fn selected_marca_missing_from_options_is_appended() {
        let mut marcas = MockMarcaApi::new();
        marcas.expect_query().returning(|| Ok(vec![toyota()]));

        let mut workflow =
            ModeloUpdateWorkflow::new(marcas, MockModeloApi::new(), idle_navigator());
        workflow.initialize(&civic()).await.unwrap();

        assert_eq!(workflow.marcas_shared_collection(), &[toyota(), honda()]);
    }

    #[test]
    fn update_form_seeds_picklist_before_options_load() {
        let mut workflow = ModeloUpdateWorkflow::new(
            MockMarcaApi::new(),
            MockModeloApi::new(),
            idle_navigator(),
        );
        workflow.update_form(&civic());
        assert_eq!(workflow.marcas_shared_collection(), &[honda()]);
    }

    #[tokio::test]
    async fn record_without_marca_adds_nothing_to_picklist() {
        let mut marcas = MockMarcaApi::new();
        marcas.expect_query().returning(|| Ok(vec![toyota()]));

        let mut workflow =
            ModeloUpdateWorkflow::new(marcas, MockModeloApi::new(), idle_navigator());
        workflow.update_form(&Modelo::default());
        assert!(workflow.marcas_shared_collection().is_empty());

        workflow.load_relationship_options().await.unwrap();
        assert_eq!(workflow.marcas_shared_collection(), &[toyota()]);
    }

    #[tokio::test]
    async fn failed_options_load_keeps_seeded_marca() {
        let mut marcas = MockMarcaApi::new();
        marcas.expect_query().returning(|| Err(server_error()));

        let mut workflow =
            ModeloUpdateWorkflow::new(marcas, MockModeloApi::new(), idle_navigator());
        let result = workflow.initialize(&civic()).await;

        assert_matches!(result, Err(WorkflowError::LoadOptions(_)));
        assert_eq!(workflow.marcas_shared_collection(), &[honda()]);
        assert_eq!(workflow.phase(), WorkflowPhase::Ready);
    }

    #[tokio::test]
    async fn empty_record_blocks_submit_until_name_is_valid() {
        let mut marcas = MockMarcaApi::new();
        marcas.expect_query().returning(|| Ok(vec![]));
        let mut modelos = MockModeloApi::new();
        modelos.expect_update().never();
        modelos
            .expect_create()
            .times(1)
            .withf(|m| m.id.is_none() && m.modelo.as_deref() == Some("Ibiza"))
            .returning(|m| {
                Ok(Modelo {
                    id: Some(21),
                    ..m
                })
            });
        let mut navigator = MockNavigator::new();
        navigator.expect_previous_state().times(1).return_const(());

        let mut workflow = ModeloUpdateWorkflow::new(marcas, modelos, navigator);
        workflow.initialize(&Modelo::default()).await.unwrap();
        assert_eq!(workflow.edit_form().modelo.value(), None);

        let blocked = workflow.submit().await;
        assert_matches!(blocked, Err(WorkflowError::Validation(errors)) => {
            assert!(errors.field_errors().contains_key("modelo"));
        });
        assert!(!workflow.is_saving());

        workflow.edit_form_mut().modelo.set(Some("Ibiz".into()));
        assert_matches!(workflow.submit().await, Err(WorkflowError::Validation(_)));

        workflow.edit_form_mut().modelo.set(Some("Ibiza".into()));
        let saved = workflow.submit().await.unwrap();
        assert_eq!(saved.id, Some(21));
        assert_eq!(workflow.phase(), WorkflowPhase::Succeeded);
    }

    #[tokio::test]
    async fn record_with_id_is_updated_and_navigates_back_once() {
        let mut modelos = MockModeloApi::new();
        modelos.expect_create().never();
        modelos
            .expect_update()
            .times(1)
            .returning(|m| Ok(m));
        let mut navigator = MockNavigator::new();
        navigator.expect_previous_state().times(1).return_const(());

        let mut workflow = ModeloUpdateWorkflow::new(MockMarcaApi::new(), modelos, navigator);
        workflow.update_form(&Modelo {
            modelo: Some("Civic Type R".into()),
            ..civic()
        });

        let saved = workflow.submit().await.unwrap();
        assert_eq!(saved.id, Some(7));
        assert!(!workflow.is_saving());
    }

    #[tokio::test]
    async fn failed_save_never_navigates_and_returns_the_error() {
        let mut modelos = MockModeloApi::new();
        modelos
            .expect_update()
            .times(1)
            .returning(|_| Err(server_error()));

        let mut workflow =
            ModeloUpdateWorkflow::new(MockMarcaApi::new(), modelos, idle_navigator());
        workflow.update_form(&Modelo {
            modelo: Some("Civic Type R".into()),
            ..civic()
        });

        let result = workflow.submit().await;
        assert_matches!(result, Err(WorkflowError::Save(ClientError::Status { .. })));
        assert!(!workflow.is_saving());
        assert_eq!(workflow.phase(), WorkflowPhase::Failed);
    }

    #[tokio::test]
    async fn is_saving_is_set_only_while_request_is_in_flight() {
        let slot: Arc<Mutex<Option<Arc<AtomicBool>>>> = Arc::default();
        let seen_during_request = Arc::new(AtomicBool::new(false));
        let (slot_in_mock, seen_in_mock) = (Arc::clone(&slot), Arc::clone(&seen_during_request));

        let mut modelos = MockModeloApi::new();
        modelos.expect_create().times(1).returning(move |m| {
            if let Some(flag) = slot_in_mock.lock().unwrap().as_ref() {
                seen_in_mock.store(flag.load(Ordering::SeqCst), Ordering::SeqCst);
            }
            Ok(m)
        });
        let mut navigator = MockNavigator::new();
        navigator.expect_previous_state().times(1).return_const(());

        let mut workflow = ModeloUpdateWorkflow::new(MockMarcaApi::new(), modelos, navigator);
        *slot.lock().unwrap() = Some(workflow.saving_flag());

        workflow.edit_form_mut().modelo.set(Some("Corolla".into()));
        assert!(!workflow.is_saving());
        workflow.submit().await.unwrap();

        assert!(seen_during_request.load(Ordering::SeqCst));
        assert!(!workflow.is_saving());
    }

    /// Never answers a save, like a server that hangs.
    struct StalledModeloApi;

    #[async_trait::async_trait]
    impl ModeloApi for StalledModeloApi {
        async fn query(&self, _: PaginationParams) -> Result<Vec<Modelo>, ClientError> {
            Ok(Vec::new())
        }
        async fn find(&self, _: i64) -> Result<Modelo, ClientError> {
            std::future::pending().await
        }
        async fn create(&self, _: Modelo) -> Result<Modelo, ClientError> {
            std::future::pending().await
        }
        async fn update(&self, _: Modelo) -> Result<Modelo, ClientError> {
            std::future::pending().await
        }
        async fn partial_update(&self, _: Modelo) -> Result<Modelo, ClientError> {
            std::future::pending().await
        }
        async fn delete(&self, _: i64) -> Result<(), ClientError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn dropping_submit_mid_request_returns_to_idle() {
        let mut workflow =
            ModeloUpdateWorkflow::new(MockMarcaApi::new(), StalledModeloApi, idle_navigator());
        workflow.update_form(&civic());
        let flag = workflow.saving_flag();

        {
            let pending = workflow.submit();
            tokio::pin!(pending);
            tokio::select! {
                _ = &mut pending => panic!("stalled api never answers"),
                _ = tokio::time::sleep(Duration::from_millis(5)) => {
                    assert!(flag.load(Ordering::SeqCst));
                }
            }
        }

        assert!(!workflow.is_saving());
        assert_eq!(workflow.phase(), WorkflowPhase::Idle);
        assert_eq!(workflow.edit_form().to_modelo(), civic());
    }

    #[tokio::test]
    async fn reset_returns_a_failed_save_to_idle() {
        let mut modelos = MockModeloApi::new();
        modelos.expect_update().times(1).returning(|_| Err(server_error()));

        let mut workflow =
            ModeloUpdateWorkflow::new(MockMarcaApi::new(), modelos, idle_navigator());
        workflow.update_form(&civic());
        assert_matches!(workflow.submit().await, Err(WorkflowError::Save(_)));
        assert_eq!(workflow.phase(), WorkflowPhase::Failed);

        workflow.reset();
        assert_eq!(workflow.phase(), WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn navigation_history_pops_on_success() {
        let mut modelos = MockModeloApi::new();
        modelos.expect_update().returning(|m| Ok(m));

        let mut history = NavigationHistory::new();
        history.push("/modelo");
        history.push("/modelo/7/edit");

        let mut workflow = ModeloUpdateWorkflow::new(MockMarcaApi::new(), modelos, &mut history);
        workflow.update_form(&Modelo {
            modelo: Some("Civic Type R".into()),
            ..civic()
        });
        workflow.submit().await.unwrap();
        drop(workflow);

        assert_eq!(history.current(), Some("/modelo"));
    }

    #[test]
    fn track_by_id_returns_identifier() {
        assert_eq!(track_marca_by_id(&honda()), 3);
    }

    #[test]
    #[should_panic]
    fn track_by_id_requires_an_id() {
        track_marca_by_id(&Marca::new(None, "Draft"));
    }
}
