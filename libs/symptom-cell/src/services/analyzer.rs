use crate::models::{Analysis, Severity, SymptomError};

struct SymptomEntry {
    key: &'static str,
    conditions: &'static [&'static str],
    recommendations: &'static [&'static str],
}

const SYMPTOMS: &[SymptomEntry] = &[
    SymptomEntry {
        key: "fever",
        conditions: &["Common Cold", "Flu", "COVID-19", "Pneumonia", "Urinary Tract Infection", "Sinusitis"],
        recommendations: &[
            "Rest and stay hydrated",
            "Take over-the-counter fever reducers",
            "Monitor temperature regularly",
            "Use cold compresses",
            "Take lukewarm baths",
            "Wear lightweight clothing",
            "Seek medical attention if fever persists or is very high",
        ],
    },
    SymptomEntry {
        key: "cough",
        conditions: &["Common Cold", "Flu", "COVID-19", "Bronchitis", "Asthma", "Post-nasal Drip", "GERD"],
        recommendations: &[
            "Stay hydrated with warm liquids",
            "Use a humidifier",
            "Take over-the-counter cough medicine",
            "Try honey (for adults and children over 1 year)",
            "Avoid irritants like smoke",
            "Elevate your head while sleeping",
            "Use saline nasal drops",
        ],
    },
    SymptomEntry {
        key: "headache",
        conditions: &["Migraine", "Tension Headache", "Sinusitis", "Cluster Headache", "Dehydration", "Eye Strain"],
        recommendations: &[
            "Rest in a quiet, dark room",
            "Take over-the-counter pain relievers",
            "Stay hydrated",
            "Apply cold or warm compress",
            "Practice relaxation techniques",
            "Maintain regular sleep schedule",
            "Consider using essential oils",
        ],
    },
    SymptomEntry {
        key: "cold",
        conditions: &["Common Cold", "Sinusitis", "Allergic Rhinitis", "Flu"],
        recommendations: &[
            "Get plenty of rest",
            "Stay hydrated with warm liquids",
            "Use saline nasal drops",
            "Take over-the-counter cold medications",
            "Use a humidifier",
            "Gargle with warm salt water",
            "Eat chicken soup or other warm broths",
        ],
    },
    SymptomEntry {
        key: "sore_throat",
        conditions: &["Pharyngitis", "Tonsillitis", "Strep Throat", "Common Cold", "Flu"],
        recommendations: &[
            "Gargle with warm salt water",
            "Stay hydrated",
            "Use throat lozenges",
            "Take over-the-counter pain relievers",
            "Use a humidifier",
            "Avoid irritants like smoke",
            "Rest your voice",
        ],
    },
    SymptomEntry {
        key: "fatigue",
        conditions: &["Anemia", "Depression", "Chronic Fatigue Syndrome", "Sleep Apnea", "Thyroid Disorders"],
        recommendations: &[
            "Get adequate sleep",
            "Maintain a balanced diet",
            "Exercise regularly",
            "Stay hydrated",
            "Manage stress",
            "Take regular breaks",
            "Consider consulting a doctor if fatigue persists",
        ],
    },
    SymptomEntry {
        key: "nausea",
        conditions: &["Gastritis", "Food Poisoning", "Motion Sickness", "Pregnancy", "Migraine"],
        recommendations: &[
            "Stay hydrated with small sips of water",
            "Eat small, bland meals",
            "Avoid strong smells",
            "Rest in a quiet environment",
            "Try ginger tea or candies",
            "Avoid lying down after eating",
            "Take deep breaths",
        ],
    },
    SymptomEntry {
        key: "diarrhea",
        conditions: &["Gastroenteritis", "Food Poisoning", "Irritable Bowel Syndrome", "Lactose Intolerance"],
        recommendations: &[
            "Stay hydrated with electrolyte solutions",
            "Eat bland foods (BRAT diet)",
            "Avoid dairy and fatty foods",
            "Rest and avoid strenuous activity",
            "Take over-the-counter anti-diarrheal medication",
            "Wash hands frequently",
            "Seek medical attention if symptoms persist",
        ],
    },
];

/// Lower-cased words. `_` stays inside a word so `sore_throat` survives.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn push_unique(into: &mut Vec<&'static str>, items: &[&'static str]) {
    for item in items {
        if !into.contains(item) {
            into.push(item);
        }
    }
}

/// Free-text keyword analysis. A table key matches when any token contains it,
/// or when the spaced form of a multi-word key appears in the text.
pub fn analyze(text: &str) -> Result<Analysis, SymptomError> {
    if text.trim().is_empty() {
        return Err(SymptomError::MissingSymptoms);
    }

    let lowered = text.to_lowercase();
    let tokens = tokenize(text);

    let matched: Vec<&SymptomEntry> = SYMPTOMS
        .iter()
        .filter(|entry| {
            tokens.iter().any(|t| t.contains(entry.key))
                || (entry.key.contains('_') && lowered.contains(&entry.key.replace('_', " ")))
        })
        .collect();

    if matched.is_empty() {
        return Err(SymptomError::NoRecognizedSymptoms);
    }

    let mut conditions = Vec::new();
    let mut recommendations = Vec::new();
    for entry in &matched {
        push_unique(&mut conditions, entry.conditions);
        push_unique(&mut recommendations, entry.recommendations);
    }

    let severity = Severity::from_matches(matched.len());
    Ok(Analysis {
        conditions,
        recommendations,
        severity,
        matched_symptoms: matched.iter().map(|e| e.key).collect(),
        message: severity.advice(),
    })
}
