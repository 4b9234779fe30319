//! Flattening of FHIR `Bundle` documents into the few fields the agents use.
//!
//! Only `Patient`, `Condition` and `Observation` resources are read. Every
//! nested lookup is optional: a missing key becomes an empty string rather
//! than an error.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FhirError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Error parsing FHIR data: {0}")]
    Malformed(String),
}

/// Demographics from the bundle's `Patient` resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub birth_date: String,
    pub gender: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub id: String,
    pub code: String,
    pub display: String,
    pub severity: String,
    pub onset_date: String,
    pub status: String,
}

/// A lab test or vital sign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub id: String,
    pub code: String,
    pub display: String,
    pub value: String,
    pub unit: String,
    pub reference_range: String,
    pub date: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBundle {
    /// `None` when the bundle carries no `Patient` resource.
    pub patient_info: Option<PatientRecord>,
    pub conditions: Vec<Condition>,
    pub observations: Vec<Observation>,
    /// Medication resources are not read; always empty.
    pub medications: Vec<String>,
}

/// Render a scalar JSON value as text. Objects, arrays and null become "".
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// `resource[key].coding[0]`
fn first_coding<'a>(resource: &'a Value, key: &str) -> Option<&'a Value> {
    resource.get(key)?.get("coding")?.as_array()?.first()
}

fn first_of<'a>(resource: &'a Value, key: &str) -> Option<&'a Value> {
    resource.get(key)?.as_array()?.first()
}

fn parse_patient(resource: &Value) -> PatientRecord {
    let name = first_of(resource, "name")
        .map(|name| {
            let given = name
                .get("given")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            let family = text(name.get("family"));
            format!("{} {}", given, family).trim().to_string()
        })
        .unwrap_or_default();

    PatientRecord {
        id: text(resource.get("id")),
        name,
        birth_date: text(resource.get("birthDate")),
        gender: text(resource.get("gender")),
    }
}

fn parse_condition(resource: &Value) -> Condition {
    let coding = first_coding(resource, "code");

    Condition {
        id: text(resource.get("id")),
        code: text(coding.and_then(|c| c.get("code"))),
        display: text(coding.and_then(|c| c.get("display"))),
        severity: text(first_coding(resource, "severity").and_then(|c| c.get("display"))),
        onset_date: text(resource.get("onsetDateTime")),
        status: text(first_coding(resource, "clinicalStatus").and_then(|c| c.get("display"))),
    }
}

fn parse_observation(resource: &Value) -> Observation {
    let coding = first_coding(resource, "code");

    let (value, unit) = if let Some(quantity) = resource.get("valueQuantity") {
        (text(quantity.get("value")), text(quantity.get("unit")))
    } else {
        (text(resource.get("valueString")), String::new())
    };

    let interpretation = first_of(resource, "interpretation")
        .and_then(|i| i.get("coding"))
        .and_then(Value::as_array)
        .and_then(|codings| codings.first())
        .and_then(|c| c.get("display"));

    Observation {
        id: text(resource.get("id")),
        code: text(coding.and_then(|c| c.get("code"))),
        display: text(coding.and_then(|c| c.get("display"))),
        value,
        unit,
        reference_range: text(first_of(resource, "referenceRange").and_then(|r| r.get("text"))),
        date: text(resource.get("effectiveDateTime")),
        interpretation: text(interpretation),
    }
}

/// Parse bundle text into a [`ParsedBundle`].
///
/// Unknown resource types are skipped. A document without `entry`, including
/// one whose top level is not an object, parses to an empty record.
pub fn parse_bundle(content: &str) -> Result<ParsedBundle, FhirError> {
    let document: Value = serde_json::from_str(content)?;

    let mut parsed = ParsedBundle::default();

    let entries = match document.get("entry") {
        None => return Ok(parsed),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(FhirError::Malformed("'entry' is not an array".to_string()));
        }
    };

    for (i, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(FhirError::Malformed(format!("entry {} is not an object", i)));
        }

        let Some(resource) = entry.get("resource") else {
            continue;
        };

        match resource.get("resourceType").and_then(Value::as_str) {
            Some("Patient") => parsed.patient_info = Some(parse_patient(resource)),
            Some("Condition") => parsed.conditions.push(parse_condition(resource)),
            Some("Observation") => parsed.observations.push(parse_observation(resource)),
            _ => {}
        }
    }

    log::debug!(
        "FHIR: parsed bundle ({} conditions, {} observations)",
        parsed.conditions.len(),
        parsed.observations.len()
    );

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient_store::{bundled_store, FILE_MAPPING};

    #[test]
    fn test_bundled_patients_have_names() {
        let store = bundled_store();
        for (id, _) in FILE_MAPPING {
            let parsed = parse_bundle(&store.load(id).unwrap()).unwrap();
            let patient = parsed.patient_info.expect("patient resource");
            assert!(!patient.name.is_empty(), "{} should have a name", id);
            assert_eq!(patient.id, id);
        }
    }

    #[test]
    fn test_patient_name_joins_given_and_family() {
        let bundle = r#"{
            "resourceType": "Bundle",
            "entry": [{
                "resource": {
                    "resourceType": "Patient",
                    "id": "patient-x",
                    "birthDate": "1980-02-03",
                    "gender": "female",
                    "name": [{"given": ["Mary", "Ann"], "family": "Smith"}]
                }
            }]
        }"#;
        let patient = parse_bundle(bundle).unwrap().patient_info.unwrap();
        assert_eq!(patient.name, "Mary Ann Smith");
        assert_eq!(patient.birth_date, "1980-02-03");
        assert_eq!(patient.gender, "female");
    }

    #[test]
    fn test_patient_without_family_name_is_trimmed() {
        let bundle = r#"{"entry": [{"resource": {"resourceType": "Patient", "name": [{"given": ["Cher"]}]}}]}"#;
        let patient = parse_bundle(bundle).unwrap().patient_info.unwrap();
        assert_eq!(patient.name, "Cher");
        assert_eq!(patient.id, "");
    }

    #[test]
    fn test_condition_fields() {
        let bundle = r#"{"entry": [{"resource": {
            "resourceType": "Condition",
            "id": "c1",
            "code": {"coding": [{"code": "38341003", "display": "Hypertension"}]},
            "severity": {"coding": [{"display": "Moderate"}]},
            "clinicalStatus": {"coding": [{"display": "Active"}]},
            "onsetDateTime": "2015-06-01"
        }}]}"#;
        let parsed = parse_bundle(bundle).unwrap();
        assert_eq!(
            parsed.conditions,
            vec![Condition {
                id: "c1".to_string(),
                code: "38341003".to_string(),
                display: "Hypertension".to_string(),
                severity: "Moderate".to_string(),
                onset_date: "2015-06-01".to_string(),
                status: "Active".to_string(),
            }]
        );
    }

    #[test]
    fn test_observation_quantity_and_string_values() {
        let bundle = r#"{"entry": [
            {"resource": {
                "resourceType": "Observation",
                "code": {"coding": [{"code": "2345-7", "display": "Glucose"}]},
                "valueQuantity": {"value": 5.4, "unit": "mmol/L"},
                "referenceRange": [{"text": "3.9-5.5 mmol/L"}],
                "interpretation": [{"coding": [{"display": "Normal"}]}],
                "effectiveDateTime": "2024-01-10"
            }},
            {"resource": {
                "resourceType": "Observation",
                "code": {"coding": [{"display": "Chest X-ray"}]},
                "valueString": "No acute findings"
            }}
        ]}"#;
        let parsed = parse_bundle(bundle).unwrap();
        assert_eq!(parsed.observations.len(), 2);

        let glucose = &parsed.observations[0];
        assert_eq!(glucose.value, "5.4");
        assert_eq!(glucose.unit, "mmol/L");
        assert_eq!(glucose.reference_range, "3.9-5.5 mmol/L");
        assert_eq!(glucose.interpretation, "Normal");
        assert_eq!(glucose.date, "2024-01-10");

        let xray = &parsed.observations[1];
        assert_eq!(xray.value, "No acute findings");
        assert_eq!(xray.unit, "");
        assert_eq!(xray.code, "");
    }

    #[test]
    fn test_unknown_resources_are_skipped() {
        let bundle = r#"{"entry": [
            {"resource": {"resourceType": "MedicationStatement", "id": "m1"}},
            {"resource": {"resourceType": "Encounter"}},
            {"fullUrl": "urn:uuid:1"}
        ]}"#;
        let parsed = parse_bundle(bundle).unwrap();
        assert!(parsed.patient_info.is_none());
        assert!(parsed.conditions.is_empty());
        assert!(parsed.observations.is_empty());
        assert!(parsed.medications.is_empty());
    }

    #[test]
    fn test_bundle_without_entries() {
        let parsed = parse_bundle(r#"{"resourceType": "Bundle"}"#).unwrap();
        assert_eq!(parsed, ParsedBundle::default());

        assert_eq!(parse_bundle("[1, 2]").unwrap(), ParsedBundle::default());
        assert_eq!(parse_bundle(r#""entry""#).unwrap(), ParsedBundle::default());
    }

    #[test]
    fn test_invalid_json_error() {
        let err = parse_bundle("{not json").unwrap_err();
        assert!(matches!(err, FhirError::InvalidJson(_)));
        assert!(err.to_string().starts_with("Invalid JSON format: "));
    }

    #[test]
    fn test_malformed_bundle_error() {
        let err = parse_bundle(r#"{"entry": 42}"#).unwrap_err();
        assert_eq!(err.to_string(), "Error parsing FHIR data: 'entry' is not an array");

        let err = parse_bundle(r#"{"entry": [{"resource": {"resourceType": "Patient"}}, 7]}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Error parsing FHIR data: entry 1 is not an object");
    }
}
