use super::Tool;
use crate::patient_store::PatientStore;

/// Returns a patient's full FHIR bundle by ID.
pub struct GetPatientById {
    store: PatientStore,
}

impl GetPatientById {
    pub fn new(store: PatientStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Tool for GetPatientById {
    fn name(&self) -> &str {
        "get_patient_by_id"
    }

    fn description(&self) -> &str {
        "Get patient data by patient ID. Valid IDs: patient-p01, patient-p02, patient-p03"
    }

    fn parameter(&self) -> &str {
        "patient_id"
    }

    async fn run(&self, patient_id: String) -> String {
        match self.store.lookup(&patient_id) {
            Ok(content) => {
                log::info!(
                    "GetPatientById: returning record for {} ({} bytes)",
                    patient_id.trim(),
                    content.len()
                );
                content
            }
            Err(e) => {
                log::warn!("GetPatientById: {}", e);
                e.to_string()
            }
        }
    }
}
