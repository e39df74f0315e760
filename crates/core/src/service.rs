//! Intake service: the operations exposed by the REST API and the CLI.
//!
//! Each operation loads from the [`Gateway`], runs the pure normalisation, composition or
//! export logic, and (for writes) stores the result. Gateway failures are logged here with
//! their category tag and passed up unchanged.

use crate::config::CoreConfig;
use crate::dashboard::{SubmissionFilter, SubmissionRow};
use crate::error::GatewayError;
use crate::export::{export, CsvExport};
use crate::gateway::Gateway;
use crate::intake::{apply_exam, build_submission, ExamUpdate, PatientForm};
use crate::message::MessageComposer;
use crate::record::{warn_on_sentinel_ids, PatientRecord, SubmissionStatus};
use crate::validation::validate_filter_date;
use crate::view_model::{to_view_model, PatientViewModel};
use crate::{IntakeError, IntakeResult};
use chrono::Utc;
use std::sync::Arc;

/// Composed results message plus the chat deep link, when a number resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhatsAppMessage {
    pub message: String,
    pub link: Option<String>,
}

#[derive(Clone)]
pub struct IntakeService {
    cfg: Arc<CoreConfig>,
    gateway: Arc<dyn Gateway>,
    composer: MessageComposer,
}

fn logged(operation: &'static str) -> impl Fn(GatewayError) -> IntakeError {
    move |e| {
        tracing::error!(operation, kind = e.kind().tag(), error = %e, "gateway call failed");
        IntakeError::Gateway(e)
    }
}

impl IntakeService {
    pub fn new(cfg: Arc<CoreConfig>, gateway: Arc<dyn Gateway>) -> Self {
        let composer = MessageComposer::new(cfg.messaging().clone());
        Self {
            cfg,
            gateway,
            composer,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Validate the public form, stamp it and create it at the gateway.
    pub async fn submit_form(&self, form: &PatientForm) -> IntakeResult<u64> {
        let now = Utc::now().with_timezone(&self.cfg.display_offset());
        let record = build_submission(form, self.cfg.clinic_id(), now)?;
        let id = self
            .gateway
            .create(record)
            .await
            .map_err(logged("create"))?;

        if id == crate::constants::SENTINEL_ID {
            tracing::warn!("gateway returned submission id 0 for a new submission");
        } else {
            tracing::info!(id, "patient form submitted");
        }
        Ok(id)
    }

    /// All records, or only those in `status` when given.
    pub async fn list(&self, status: Option<&SubmissionStatus>) -> IntakeResult<Vec<PatientRecord>> {
        let records = match status {
            Some(status) => self
                .gateway
                .list_filtered(status.as_wire())
                .await
                .map_err(logged("list_filtered"))?,
            None => self.gateway.list().await.map_err(logged("list"))?,
        };
        warn_on_sentinel_ids(&records, "gateway");
        Ok(records)
    }

    pub async fn dashboard(
        &self,
        filter: &SubmissionFilter,
        status: Option<&SubmissionStatus>,
    ) -> IntakeResult<Vec<SubmissionRow>> {
        validate_filter_date(filter.date.as_deref())?;
        let records = filter.apply(self.list(status).await?);
        Ok(records.iter().map(SubmissionRow::from_record).collect())
    }

    /// Fetch one record. An absent id becomes `GatewayError::NotFound`.
    pub async fn record(&self, id: u64) -> IntakeResult<PatientRecord> {
        self.gateway
            .get_by_id(id)
            .await
            .map_err(logged("get_by_id"))?
            .ok_or(IntakeError::Gateway(GatewayError::NotFound(id)))
    }

    pub async fn view(&self, id: u64) -> IntakeResult<PatientViewModel> {
        let record = self.record(id).await?;
        Ok(to_view_model(&record, self.cfg.display_offset()))
    }

    pub async fn exam_prefill(&self, id: u64) -> IntakeResult<ExamUpdate> {
        Ok(ExamUpdate::prefill(&self.record(id).await?))
    }

    /// Apply examination results and write the completed record back with an update.
    pub async fn record_exam(&self, id: u64, update: &ExamUpdate) -> IntakeResult<PatientRecord> {
        if id == crate::constants::SENTINEL_ID {
            return Err(IntakeError::InvalidInput(
                "submission id 0 was never assigned and cannot be updated".into(),
            ));
        }
        update.validate()?;

        let current = self.record(id).await?;
        let completed = apply_exam(&current, update);
        self.gateway
            .update(id, completed.clone())
            .await
            .map_err(logged("update"))?;

        tracing::info!(id, meet_doctor = update.meet_doctor, "examination recorded");
        Ok(completed)
    }

    pub async fn whatsapp(&self, id: u64) -> IntakeResult<WhatsAppMessage> {
        let record = self.record(id).await?;
        Ok(WhatsAppMessage {
            message: self.composer.build_message(&record),
            link: self.composer.build_deep_link(&record),
        })
    }

    /// CSV of the dashboard rows matching `filter`; `None` when nothing matches.
    pub async fn export(&self, filter: &SubmissionFilter) -> IntakeResult<Option<CsvExport>> {
        validate_filter_date(filter.date.as_deref())?;
        let records = filter.apply(self.list(None).await?);
        let csv = export(&records, filter.date.as_deref());
        if csv.is_none() {
            tracing::info!("export requested with no matching submissions");
        }
        Ok(csv)
    }
}
