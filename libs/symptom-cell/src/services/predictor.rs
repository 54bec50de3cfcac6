use crate::models::SymptomError;

const PREDICTABLE: &[(&str, &[&str], &str)] = &[
    (
        "fever",
        &["Common cold", "Flu", "Viral infection"],
        "Rest, stay hydrated, and monitor temperature. Take fever reducers if needed.",
    ),
    (
        "cough",
        &["Common cold", "Bronchitis", "Respiratory infection"],
        "Stay hydrated, use cough drops, and avoid irritants.",
    ),
    (
        "headache",
        &["Tension headache", "Migraine", "Sinus infection"],
        "Rest in a dark, quiet room. Stay hydrated and avoid triggers.",
    ),
];

/// Prose prediction for a selection from the fixed vocabulary.
pub fn predict(symptoms: &[String]) -> Result<String, SymptomError> {
    let invalid: Vec<String> = symptoms
        .iter()
        .filter(|s| !PREDICTABLE.iter().any(|(name, _, _)| *name == s.as_str()))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(SymptomError::InvalidSymptoms(invalid));
    }
    if symptoms.is_empty() {
        return Err(SymptomError::MissingSymptoms);
    }

    let mut conditions: Vec<&str> = Vec::new();
    let mut recommendations: Vec<&str> = Vec::new();
    for symptom in symptoms {
        if let Some((_, found, advice)) = PREDICTABLE.iter().find(|(name, _, _)| *name == symptom.as_str()) {
            for condition in found.iter() {
                if !conditions.contains(condition) {
                    conditions.push(*condition);
                }
            }
            if !recommendations.contains(advice) {
                recommendations.push(*advice);
            }
        }
    }

    let mut prediction = format!(
        "Based on your symptoms, you may have:\n{}.\n\nRecommendations:\n{}",
        conditions.join(", "),
        recommendations.join("\n")
    );
    if symptoms.len() >= 2 {
        prediction.push_str(
            "\n\nSince you have multiple symptoms, please consider consulting a doctor if symptoms persist or worsen.",
        );
    }
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_symptom_has_no_escalation() {
        let text = predict(&owned(&["fever"])).unwrap();
        assert!(text.starts_with("Based on your symptoms, you may have:\nCommon cold, Flu, Viral infection."));
        assert!(!text.contains("multiple symptoms"));
    }

    #[test]
    fn shared_conditions_are_listed_once() {
        let text = predict(&owned(&["fever", "cough"])).unwrap();
        assert_eq!(text.matches("Common cold").count(), 1);
        assert!(text.contains("multiple symptoms"));
    }

    #[test]
    fn unknown_symptoms_are_reported() {
        let err = predict(&owned(&["fever", "rash", "nausea"])).unwrap_err();
        assert_matches!(err, SymptomError::InvalidSymptoms(list) if list == owned(&["rash", "nausea"]));
    }
}
