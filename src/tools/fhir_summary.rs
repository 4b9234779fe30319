use super::Tool;
use crate::fhir::{parse_bundle, FhirError, ParsedBundle};
use crate::patient_store::{PatientStore, StoreError};
use crate::summary;

/// Resolve, load and parse one patient's bundle.
fn load_parsed(store: &PatientStore, patient_id: &str) -> Result<Result<ParsedBundle, FhirError>, StoreError> {
    let content = store.lookup(patient_id)?;
    Ok(parse_bundle(&content))
}

/// Produces a 2-4 sentence history summary for a patient.
pub struct GeneratePatientSummary {
    store: PatientStore,
}

impl GeneratePatientSummary {
    pub fn new(store: PatientStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Tool for GeneratePatientSummary {
    fn name(&self) -> &str {
        "generate_patient_summary"
    }

    fn description(&self) -> &str {
        "Generate a concise 2-4 sentence summary of patient medical history from FHIR data. \
         Includes major diagnoses, key lab tests, and medications. \
         Valid patient IDs: patient-p01, patient-p02, patient-p03"
    }

    fn parameter(&self) -> &str {
        "patient_id"
    }

    async fn run(&self, patient_id: String) -> String {
        match load_parsed(&self.store, &patient_id) {
            Ok(Ok(parsed)) => {
                let summary = summary::generate_summary(&parsed);
                log::info!(
                    "GeneratePatientSummary: summarized {} ({} chars)",
                    patient_id.trim(),
                    summary.len()
                );
                summary
            }
            Ok(Err(e)) => {
                log::error!("GeneratePatientSummary: {}", e);
                format!("Error generating summary: {}", e)
            }
            Err(e) => {
                log::warn!("GeneratePatientSummary: {}", e);
                e.to_string()
            }
        }
    }
}

/// Lists all conditions and lab tests for a patient.
pub struct AnalyzePatientData {
    store: PatientStore,
}

impl AnalyzePatientData {
    pub fn new(store: PatientStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Tool for AnalyzePatientData {
    fn name(&self) -> &str {
        "analyze_patient_data"
    }

    fn description(&self) -> &str {
        "Get detailed analysis of patient conditions, lab tests, and medications from FHIR data. \
         Returns structured information for the specified patient."
    }

    fn parameter(&self) -> &str {
        "patient_id"
    }

    async fn run(&self, patient_id: String) -> String {
        match load_parsed(&self.store, &patient_id) {
            Ok(Ok(parsed)) => summary::analyze(&parsed),
            Ok(Err(e)) => {
                log::error!("AnalyzePatientData: {}", e);
                format!("Error analyzing patient data: {}", e)
            }
            Err(e) => {
                log::warn!("AnalyzePatientData: {}", e);
                e.to_string()
            }
        }
    }
}
