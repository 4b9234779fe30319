//! Rule-based patient history summaries and structured analyses.

use crate::fhir::{Condition, Observation, ParsedBundle};

const MAX_DIAGNOSES: usize = 3;
const MAX_LAB_TESTS: usize = 4;
const MAX_TREATMENTS: usize = 2;
const MAX_SENTENCES: usize = 4;

const SIGNIFICANT_SEVERITIES: [&str; 2] = ["Severe", "Moderate"];
const KEY_LAB_KEYWORDS: [&str; 6] = [
    "glucose",
    "cholesterol",
    "hemoglobin",
    "creatinine",
    "bnp",
    "troponin",
];
const TREATMENT_KEYWORDS: [&str; 3] = ["medication", "therapy", "treatment"];

/// Diagnosis keywords mapped to the medication class a patient is likely on.
const INFERRED_MEDICATIONS: [(&[&str], &str); 3] = [
    (&["hypertension", "heart"], "cardiovascular medications"),
    (&["diabetes"], "antidiabetic therapy"),
    (&["copd", "asthma"], "respiratory medications"),
];

fn is_major_diagnosis(condition: &Condition) -> bool {
    condition.status.eq_ignore_ascii_case("active")
        || SIGNIFICANT_SEVERITIES.contains(&condition.severity.as_str())
}

/// Active or significant conditions, falling back to the first three on file.
fn major_diagnoses(conditions: &[Condition]) -> Vec<&str> {
    let major: Vec<&str> = conditions
        .iter()
        .filter(|c| is_major_diagnosis(c) && !c.display.is_empty())
        .map(|c| c.display.as_str())
        .collect();

    if !major.is_empty() {
        return major;
    }

    conditions
        .iter()
        .take(3)
        .filter(|c| !c.display.is_empty())
        .map(|c| c.display.as_str())
        .collect()
}

fn is_key_lab_test(observation: &Observation) -> bool {
    let abnormal = !observation.interpretation.is_empty()
        && !observation.interpretation.eq_ignore_ascii_case("normal");
    let display = observation.display.to_lowercase();

    abnormal || KEY_LAB_KEYWORDS.iter().any(|k| display.contains(k))
}

fn describe_lab_test(observation: &Observation) -> String {
    let mut info = observation.display.clone();
    if !observation.value.is_empty() && !observation.unit.is_empty() {
        info.push_str(&format!(" ({} {})", observation.value, observation.unit));
    }
    if !observation.interpretation.is_empty() {
        info.push_str(&format!(" - {}", observation.interpretation));
    }
    info
}

fn treatments(conditions: &[Condition]) -> Vec<&str> {
    conditions
        .iter()
        .filter(|c| {
            let text = c.display.to_lowercase();
            TREATMENT_KEYWORDS.iter().any(|k| text.contains(k))
        })
        .map(|c| c.display.as_str())
        .collect()
}

fn inferred_medications(diagnoses: &[&str]) -> Vec<&'static str> {
    let text = diagnoses.join(" ").to_lowercase();

    INFERRED_MEDICATIONS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, medication)| *medication)
        .collect()
}

/// Build a 1-4 sentence history summary: diagnoses, key labs, treatments.
pub fn generate_summary(parsed: &ParsedBundle) -> String {
    let patient_name = parsed
        .patient_info
        .as_ref()
        .map(|p| p.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("Patient");

    let diagnoses = major_diagnoses(&parsed.conditions);
    let lab_tests: Vec<String> = parsed
        .observations
        .iter()
        .filter(|o| is_key_lab_test(o))
        .map(describe_lab_test)
        .collect();
    let treatments = treatments(&parsed.conditions);

    let mut sentences = Vec::new();

    if diagnoses.is_empty() {
        sentences.push(format!(
            "{} is a patient with minimal medical history.",
            patient_name
        ));
    } else {
        let top: Vec<&str> = diagnoses.iter().take(MAX_DIAGNOSES).copied().collect();
        sentences.push(format!("{} is a patient with {}.", patient_name, top.join(", ")));
    }

    if !lab_tests.is_empty() {
        let top: Vec<&str> = lab_tests
            .iter()
            .take(MAX_LAB_TESTS)
            .map(String::as_str)
            .collect();
        sentences.push(format!("Key laboratory findings include {}.", top.join(", ")));
    }

    if !treatments.is_empty() {
        let top: Vec<&str> = treatments.iter().take(MAX_TREATMENTS).copied().collect();
        sentences.push(format!("Current treatments include {}.", top.join(", ")));
    } else if !diagnoses.is_empty() {
        let inferred = inferred_medications(&diagnoses);
        if !inferred.is_empty() {
            sentences.push(format!("The patient is likely on {}.", inferred.join(" and ")));
        }
    }

    sentences.truncate(MAX_SENTENCES);
    sentences.join(" ")
}

/// Render every parsed condition and observation as a markdown-style listing.
pub fn analyze(parsed: &ParsedBundle) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(patient) = &parsed.patient_info {
        lines.push(format!("**Patient:** {}", patient.name));
        lines.push(format!("**ID:** {}", patient.id));
        if !patient.birth_date.is_empty() {
            lines.push(format!("**Birth Date:** {}", patient.birth_date));
        }
        lines.push(String::new());
    }

    if !parsed.conditions.is_empty() {
        lines.push("**Medical Conditions:**".to_string());
        for condition in &parsed.conditions {
            let mut line = format!("- {}", condition.display);
            if !condition.severity.is_empty() {
                line.push_str(&format!(" (Severity: {})", condition.severity));
            }
            if !condition.status.is_empty() {
                line.push_str(&format!(" - Status: {}", condition.status));
            }
            if !condition.onset_date.is_empty() {
                line.push_str(&format!(" - Onset: {}", condition.onset_date));
            }
            lines.push(line);
        }
        lines.push(String::new());
    }

    if !parsed.observations.is_empty() {
        lines.push("**Laboratory Tests:**".to_string());
        for obs in &parsed.observations {
            let mut line = format!("- {}", obs.display);
            match (obs.value.is_empty(), obs.unit.is_empty()) {
                (false, false) => line.push_str(&format!(": {} {}", obs.value, obs.unit)),
                (false, true) => line.push_str(&format!(": {}", obs.value)),
                _ => {}
            }
            if !obs.interpretation.is_empty() {
                line.push_str(&format!(" ({})", obs.interpretation));
            }
            if !obs.reference_range.is_empty() {
                line.push_str(&format!(" [Ref: {}]", obs.reference_range));
            }
            lines.push(line);
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhir::{parse_bundle, PatientRecord};
    use crate::patient_store::{bundled_store, FILE_MAPPING};

    fn condition(display: &str, status: &str, severity: &str) -> Condition {
        Condition {
            display: display.to_string(),
            status: status.to_string(),
            severity: severity.to_string(),
            ..Default::default()
        }
    }

    fn observation(display: &str, value: &str, unit: &str, interpretation: &str) -> Observation {
        Observation {
            display: display.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
            interpretation: interpretation.to_string(),
            ..Default::default()
        }
    }

    fn bundle(name: &str, conditions: Vec<Condition>, observations: Vec<Observation>) -> ParsedBundle {
        ParsedBundle {
            patient_info: Some(PatientRecord {
                name: name.to_string(),
                ..Default::default()
            }),
            conditions,
            observations,
            medications: vec![],
        }
    }

    fn sentence_count(summary: &str) -> usize {
        summary.matches(". ").count() + 1
    }

    #[test]
    fn test_cardiac_patient_summary() {
        let content = bundled_store().load("patient-p01").unwrap();
        let summary = generate_summary(&parse_bundle(&content).unwrap());
        assert_eq!(
            summary,
            "Robert James Henderson is a patient with Essential hypertension, \
             Coronary artery disease, Congestive heart failure. \
             Key laboratory findings include NT-proBNP (1850 pg/mL) - High, \
             Troponin I (0.02 ng/mL) - Normal, Hemoglobin A1c (7.8 %) - High, \
             LDL Cholesterol (142 mg/dL) - High. \
             The patient is likely on cardiovascular medications and antidiabetic therapy."
        );
    }

    #[test]
    fn test_pulmonary_patient_mentions_therapy() {
        let content = bundled_store().load("patient-p02").unwrap();
        let summary = generate_summary(&parse_bundle(&content).unwrap());
        assert!(summary.starts_with(
            "Linda Marie Williams is a patient with Chronic obstructive pulmonary disease, Asthma, Pulmonary fibrosis."
        ));
        assert!(summary.ends_with("Current treatments include Long-term oxygen therapy."));
        assert!(!summary.contains("likely on"));
    }

    #[test]
    fn test_healthy_patient_summary() {
        let content = bundled_store().load("patient-p03").unwrap();
        let summary = generate_summary(&parse_bundle(&content).unwrap());
        assert_eq!(
            summary,
            "Alex Jordan Thompson is a patient with minimal medical history. \
             Key laboratory findings include Glucose (88 mg/dL) - Normal, \
             Total Cholesterol (165 mg/dL) - Normal."
        );
    }

    #[test]
    fn test_summary_sentence_bounds_for_bundled_patients() {
        let store = bundled_store();
        for (id, _) in FILE_MAPPING {
            let summary = generate_summary(&parse_bundle(&store.load(id).unwrap()).unwrap());
            let count = sentence_count(&summary);
            assert!((1..=4).contains(&count), "{} has {} sentences", id, count);
            assert!(summary.contains(" is a patient with "));
        }
    }

    #[test]
    fn test_empty_bundle_summary() {
        let summary = generate_summary(&ParsedBundle::default());
        assert_eq!(summary, "Patient is a patient with minimal medical history.");
    }

    #[test]
    fn test_fallback_to_first_conditions_when_none_major() {
        let parsed = bundle(
            "Jane Roe",
            vec![
                condition("Sprained ankle", "Resolved", "Mild"),
                condition("", "Resolved", "Mild"),
                condition("Seasonal allergies", "Inactive", ""),
                condition("Tonsillitis", "Resolved", "Mild"),
            ],
            vec![],
        );
        let summary = generate_summary(&parsed);
        assert_eq!(summary, "Jane Roe is a patient with Sprained ankle, Seasonal allergies.");
    }

    #[test]
    fn test_diagnosis_status_is_case_insensitive() {
        let parsed = bundle(
            "John Doe",
            vec![
                condition("Migraine", "ACTIVE", ""),
                condition("Old fracture", "Resolved", "Mild"),
            ],
            vec![],
        );
        assert_eq!(generate_summary(&parsed), "John Doe is a patient with Migraine.");
    }

    #[test]
    fn test_lab_selection_and_truncation() {
        let parsed = bundle(
            "John Doe",
            vec![],
            vec![
                observation("Sodium", "140", "mmol/L", "normal"),
                observation("Potassium", "5.9", "mmol/L", "High"),
                observation("Serum creatinine", "", "", ""),
                observation("Heart rate", "72", "", "Normal"),
                observation("Hemoglobin", "13", "g/dL", ""),
                observation("BNP", "400", "pg/mL", "High"),
                observation("Troponin T", "0.5", "ng/mL", "Critical"),
            ],
        );
        let summary = generate_summary(&parsed);
        assert!(summary.contains(
            "Key laboratory findings include Potassium (5.9 mmol/L) - High, Serum creatinine, \
             Hemoglobin (13 g/dL), BNP (400 pg/mL) - High."
        ));
        assert!(!summary.contains("Sodium"));
        assert!(!summary.contains("Troponin"));
    }

    #[test]
    fn test_treatments_limited_to_two() {
        let parsed = bundle(
            "John Doe",
            vec![
                condition("Hypertension", "Active", ""),
                condition("Physical therapy", "Active", ""),
                condition("Medication review", "Active", ""),
                condition("Dialysis treatment", "Active", ""),
            ],
            vec![],
        );
        let summary = generate_summary(&parsed);
        assert!(summary.ends_with("Current treatments include Physical therapy, Medication review."));
        assert!(!summary.contains("likely on"));
    }

    #[test]
    fn test_inferred_respiratory_medications() {
        let parsed = bundle("John Doe", vec![condition("COPD", "Active", "")], vec![]);
        assert_eq!(
            generate_summary(&parsed),
            "John Doe is a patient with COPD. The patient is likely on respiratory medications."
        );
    }

    #[test]
    fn test_no_inference_without_matching_diagnosis() {
        let parsed = bundle("John Doe", vec![condition("Migraine", "Active", "")], vec![]);
        assert_eq!(generate_summary(&parsed), "John Doe is a patient with Migraine.");
    }

    #[test]
    fn test_analyze_lists_everything() {
        let content = bundled_store().load("patient-p02").unwrap();
        let analysis = analyze(&parse_bundle(&content).unwrap());
        assert!(analysis.starts_with("**Patient:** Linda Marie Williams\n**ID:** patient-p02\n**Birth Date:** 1959-07-22\n"));
        assert!(analysis.contains(
            "- Chronic obstructive pulmonary disease (Severity: Severe) - Status: Active - Onset: 2011-10-04"
        ));
        assert!(analysis.contains("- Long-term oxygen therapy - Status: Active - Onset: 2021-01-15"));
        assert!(analysis.contains("- Oxygen saturation: 89 % (Low) [Ref: 95-100 %]"));
        assert!(analysis.contains("- Chest CT: Reticular opacities in both lower lobes (Abnormal)"));
    }

    #[test]
    fn test_analyze_without_patient_resource() {
        let parsed = ParsedBundle {
            observations: vec![observation("", "", "", "")],
            ..Default::default()
        };
        assert_eq!(analyze(&parsed), "**Laboratory Tests:**\n- \n");
    }

    #[test]
    fn test_analyze_keeps_empty_fields_blank() {
        let parsed = bundle("", vec![condition("", "Active", "")], vec![]);
        assert_eq!(
            analyze(&parsed),
            "**Patient:** \n**ID:** \n\n**Medical Conditions:**\n- - Status: Active\n"
        );
    }
}
