use std::path::{Path, PathBuf};
use thiserror::Error;

/// Known patient IDs and the bundle file holding each one's history.
pub const FILE_MAPPING: [(&str, &str); 3] = [
    ("patient-p01", "p01-heart.json"),
    ("patient-p02", "p02-lungs.json"),
    ("patient-p03", "p03-healthy.json"),
];

/// Failures surfaced to tool callers. The `Display` text is the tool output.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error: Please provide a patient ID.")]
    MissingId,
    #[error("Error: Patient ID '{id}' not found. Available IDs: {available}")]
    UnknownId { id: String, available: String },
    #[error("Error: No file mapping found for patient ID: {0}")]
    NoMapping(String),
    #[error("Error: Patient file not found: {0}")]
    FileNotFound(String),
    #[error("Error loading patient file: {0}")]
    Read(#[from] std::io::Error),
}

/// Read-only access to the static per-patient FHIR bundles.
#[derive(Debug, Clone)]
pub struct PatientStore {
    base_dir: PathBuf,
}

impl PatientStore {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn available_ids() -> String {
        FILE_MAPPING
            .iter()
            .map(|(id, _)| *id)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn filename_for(patient_id: &str) -> Option<&'static str> {
        FILE_MAPPING
            .iter()
            .find(|(id, _)| *id == patient_id)
            .map(|(_, file)| *file)
    }

    /// Validate a raw tool argument and return the trimmed, known patient ID.
    pub fn resolve(raw_id: &str) -> Result<&str, StoreError> {
        let patient_id = raw_id.trim();
        if patient_id.is_empty() {
            return Err(StoreError::MissingId);
        }

        if Self::filename_for(patient_id).is_none() {
            return Err(StoreError::UnknownId {
                id: patient_id.to_string(),
                available: Self::available_ids(),
            });
        }

        Ok(patient_id)
    }

    /// Load the raw bundle text for a patient.
    pub fn load(&self, patient_id: &str) -> Result<String, StoreError> {
        let filename = Self::filename_for(patient_id)
            .ok_or_else(|| StoreError::NoMapping(patient_id.to_string()))?;

        let path = self.base_dir.join(filename);
        if !path.exists() {
            return Err(StoreError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(&path)?;
        log::debug!("PatientStore: loaded {} ({} bytes)", path.display(), content.len());
        Ok(content)
    }

    /// Resolve a raw tool argument, then load the bundle.
    pub fn lookup(&self, raw_id: &str) -> Result<String, StoreError> {
        let patient_id = Self::resolve(raw_id)?;
        self.load(patient_id)
    }
}

#[cfg(test)]
pub(crate) fn bundled_store() -> PatientStore {
    PatientStore::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("patients"))
}
