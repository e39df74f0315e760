use super::Gateway;
use crate::error::{GatewayError, GatewayResult};
use crate::record::{warn_on_sentinel_ids, PatientRecord};
use crate::{IntakeError, IntakeResult};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
struct Store {
    next_id: u64,
    records: Vec<PatientRecord>,
}

/// Process-local gateway.
///
/// Ids are assigned from 1 upwards. Seeded records keep their ids, including the sentinel
/// id `0` found in some legacy exports, so those can be inspected but never updated.
#[derive(Clone, Debug)]
pub struct InMemoryGateway {
    store: Arc<Mutex<Store>>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<PatientRecord>) -> Self {
        warn_on_sentinel_ids(&records, "seed");
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0).saturating_add(1);
        Self {
            store: Arc::new(Mutex::new(Store { next_id, records })),
        }
    }

    fn lock(&self) -> GatewayResult<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| GatewayError::Rejected("in-memory store lock poisoned".into()))
    }

    fn create_now(&self, mut record: PatientRecord) -> GatewayResult<u64> {
        if record.clinic_id.trim().is_empty() {
            return Err(GatewayError::Invalid("clinicId is required".into()));
        }
        let mut store = self.lock()?;
        let id = store.next_id;
        store.next_id += 1;
        record.id = id;
        store.records.push(record);
        Ok(id)
    }

    fn update_now(&self, id: u64, mut record: PatientRecord) -> GatewayResult<()> {
        if record.clinic_id.trim().is_empty() {
            return Err(GatewayError::Invalid("clinicId is required".into()));
        }
        let mut store = self.lock()?;
        let slot = store
            .records
            .iter_mut()
            .find(|r| r.id == id && r.has_assigned_id())
            .ok_or(GatewayError::NotFound(id))?;
        record.id = id;
        *slot = record;
        Ok(())
    }

    fn snapshot(&self, filter_tag: Option<&str>) -> GatewayResult<Vec<PatientRecord>> {
        let store = self.lock()?;
        Ok(store
            .records
            .iter()
            .filter(|r| filter_tag.map_or(true, |tag| r.submission_status.as_wire() == tag))
            .cloned()
            .collect())
    }

    fn find(&self, id: u64) -> GatewayResult<Option<PatientRecord>> {
        let store = self.lock()?;
        Ok(store.records.iter().find(|r| r.id == id).cloned())
    }
}

impl Gateway for InMemoryGateway {
    fn create(&self, record: PatientRecord) -> BoxFuture<'_, GatewayResult<u64>> {
        let result = self.create_now(record);
        async move { result }.boxed()
    }

    fn list(&self) -> BoxFuture<'_, GatewayResult<Vec<PatientRecord>>> {
        let result = self.snapshot(None);
        async move { result }.boxed()
    }

    fn list_filtered<'a>(
        &'a self,
        filter_tag: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<PatientRecord>>> {
        let result = self.snapshot(Some(filter_tag));
        async move { result }.boxed()
    }

    fn get_by_id(&self, id: u64) -> BoxFuture<'_, GatewayResult<Option<PatientRecord>>> {
        let result = self.find(id);
        async move { result }.boxed()
    }

    fn update(&self, id: u64, record: PatientRecord) -> BoxFuture<'_, GatewayResult<()>> {
        let result = self.update_now(id, record);
        async move { result }.boxed()
    }
}

/// Read a YAML list of records.
///
/// Schema mismatches report the failing path (for example `[1].timestamps.submission`).
pub fn load_seed_file(path: &Path) -> IntakeResult<Vec<PatientRecord>> {
    let text = std::fs::read_to_string(path).map_err(IntakeError::SeedFileRead)?;
    let deserializer = serde_yaml::Deserializer::from_str(&text);

    match serde_path_to_error::deserialize(deserializer) {
        Ok(records) => Ok(records),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>".to_string()
            } else {
                path
            };
            Err(IntakeError::SeedFileSchema {
                path,
                message: source.to_string(),
            })
        }
    }
}
