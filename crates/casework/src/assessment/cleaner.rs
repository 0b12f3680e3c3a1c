//! Boundary validation and encoding of raw intake records.
//!
//! A raw record is a bag of loosely-typed answers; cleaning checks every field
//! against its categorical domain and produces the fixed-order numeric vector
//! the predictor expects. The transform is pure and the field order never
//! changes between calls.

use super::domain::{ClientFeatures, RawClientRecord, RawValue, CLIENT_FEATURE_LEN};

/// A required field is missing or outside its categorical domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field '{field}': {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// 0/1 indicator; accepts booleans and yes/no answer text.
    Flag,
    /// Non-negative whole number.
    Count,
    /// Client age, 18 or older.
    Age,
    /// 1 or 2, matching the assessment form coding.
    Gender,
    /// Ability scale from 0 to 10.
    Scale,
    /// Education level 1-14; accepts the form's level descriptions.
    Schooling,
    /// Housing situation 1-10; accepts the form's situation descriptions.
    Housing,
    /// Income source 1-11; accepts the form's source descriptions.
    IncomeSource,
}

/// Field order is the encoding order and must never change: the predictor's
/// input shape depends on it.
const FIELDS: [(&str, FieldKind); CLIENT_FEATURE_LEN] = [
    ("age", FieldKind::Age),
    ("gender", FieldKind::Gender),
    ("work_experience", FieldKind::Count),
    ("canada_work_experience", FieldKind::Count),
    ("dependents", FieldKind::Count),
    ("born_in_canada", FieldKind::Flag),
    ("citizen_status", FieldKind::Flag),
    ("education_level", FieldKind::Schooling),
    ("fluent_in_english", FieldKind::Flag),
    ("reading_scale", FieldKind::Scale),
    ("speaking_scale", FieldKind::Scale),
    ("writing_scale", FieldKind::Scale),
    ("numeracy_scale", FieldKind::Scale),
    ("computer_scale", FieldKind::Scale),
    ("has_transportation", FieldKind::Flag),
    ("is_caregiver", FieldKind::Flag),
    ("housing_situation", FieldKind::Housing),
    ("income_source", FieldKind::IncomeSource),
    ("has_felony", FieldKind::Flag),
    ("attending_school", FieldKind::Flag),
    ("currently_employed", FieldKind::Flag),
    ("substance_use", FieldKind::Flag),
    ("months_unemployed", FieldKind::Count),
    ("needs_mental_health_support", FieldKind::Flag),
];

const SCHOOLING_LEVELS: [(&str, f64); 14] = [
    ("Grade 0-8", 1.0),
    ("Grade 9", 2.0),
    ("Grade 10", 3.0),
    ("Grade 11", 4.0),
    ("Grade 12 or equivalent", 5.0),
    ("OAC or Grade 13", 6.0),
    ("Some college", 7.0),
    ("Some university", 8.0),
    ("Some apprenticeship", 9.0),
    ("Certificate of Apprenticeship", 10.0),
    ("Journeyperson", 11.0),
    ("Certificate/Diploma", 12.0),
    ("Bachelor's degree", 13.0),
    ("Post graduate", 14.0),
];

const HOUSING_SITUATIONS: [(&str, f64); 10] = [
    ("Renting-private", 1.0),
    ("Renting-subsidized", 2.0),
    ("Boarding or lodging", 3.0),
    ("Homeowner", 4.0),
    ("Living with family/friend", 5.0),
    ("Institution", 6.0),
    ("Temporary second residence", 7.0),
    ("Band-owned home", 8.0),
    ("Homeless or transient", 9.0),
    ("Emergency hostel", 10.0),
];

const INCOME_SOURCES: [(&str, f64); 10] = [
    ("No Source of Income", 1.0),
    ("Employment Insurance", 2.0),
    ("Workplace Safety and Insurance Board", 3.0),
    ("Ontario Works applied or receiving", 4.0),
    ("Ontario Disability Support Program applied or receiving", 5.0),
    ("Dependent of someone receiving OW or ODSP", 6.0),
    ("Crown Ward", 7.0),
    ("Employment", 8.0),
    ("Self-Employment", 9.0),
    ("Other (specify)", 10.0),
];

/// Clean a raw intake record into the fixed-order feature vector.
pub fn clean(record: &RawClientRecord) -> Result<ClientFeatures, ValidationError> {
    let mut values = [0.0; CLIENT_FEATURE_LEN];
    for (slot, (field, kind)) in FIELDS.iter().enumerate() {
        let raw = record
            .field(field)
            .ok_or_else(|| ValidationError::new(field, "required field is missing"))?;
        values[slot] = decode_field(field, *kind, raw)?;
    }
    Ok(ClientFeatures::from_values(values))
}

fn decode_field(
    field: &'static str,
    kind: FieldKind,
    raw: &RawValue,
) -> Result<f64, ValidationError> {
    let value = match raw {
        RawValue::Boolean(flag) => match kind {
            FieldKind::Flag => {
                if *flag {
                    1.0
                } else {
                    0.0
                }
            }
            _ => return Err(ValidationError::new(field, "expected a number")),
        },
        RawValue::Number(number) => {
            if !number.is_finite() || number.fract() != 0.0 {
                return Err(ValidationError::new(field, "must be a whole number"));
            }
            *number
        }
        RawValue::Text(text) => decode_text(field, kind, text)?,
    };

    check_domain(field, kind, value)?;
    Ok(value)
}

fn decode_text(field: &'static str, kind: FieldKind, text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();

    let table: &[(&str, f64)] = match kind {
        FieldKind::Schooling => &SCHOOLING_LEVELS,
        FieldKind::Housing => &HOUSING_SITUATIONS,
        FieldKind::IncomeSource => &INCOME_SOURCES,
        _ => &[],
    };
    if let Some((_, mapped)) = table.iter().find(|(answer, _)| *answer == trimmed) {
        return Ok(*mapped);
    }

    if matches!(kind, FieldKind::Flag) {
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "no" | "false" => return Ok(0.0),
            "yes" | "true" => return Ok(1.0),
            _ => {}
        }
    }

    trimmed
        .parse::<i64>()
        .map(|number| number as f64)
        .map_err(|_| ValidationError::new(field, format!("unrecognized answer '{trimmed}'")))
}

fn check_domain(field: &'static str, kind: FieldKind, value: f64) -> Result<(), ValidationError> {
    let ok = match kind {
        FieldKind::Flag => value == 0.0 || value == 1.0,
        FieldKind::Count => value >= 0.0,
        FieldKind::Age => value >= 18.0,
        FieldKind::Gender => value == 1.0 || value == 2.0,
        FieldKind::Scale => (0.0..=10.0).contains(&value),
        FieldKind::Schooling => (1.0..=14.0).contains(&value),
        FieldKind::Housing => (1.0..=10.0).contains(&value),
        FieldKind::IncomeSource => (1.0..=11.0).contains(&value),
    };

    if ok {
        return Ok(());
    }

    let reason = match kind {
        FieldKind::Flag => "must be 0 or 1".to_string(),
        FieldKind::Count => "cannot be negative".to_string(),
        FieldKind::Age => "client must be 18 or older".to_string(),
        FieldKind::Gender => "must be 1 or 2".to_string(),
        FieldKind::Scale => "must be between 0 and 10".to_string(),
        FieldKind::Schooling => "must be between 1 and 14".to_string(),
        FieldKind::Housing => "must be between 1 and 10".to_string(),
        FieldKind::IncomeSource => "must be between 1 and 11".to_string(),
    };
    Err(ValidationError::new(field, reason))
}
