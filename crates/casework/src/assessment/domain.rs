use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of baseline assessment fields encoded for every client.
pub const CLIENT_FEATURE_LEN: usize = 24;

/// Number of togglable intervention flags.
pub const INTERVENTION_COUNT: usize = 7;

/// Full model input width: baseline features plus intervention indicators.
pub const FEATURE_VECTOR_LEN: usize = CLIENT_FEATURE_LEN + INTERVENTION_COUNT;

/// The support programs a client can be enrolled in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    LifeStabilization,
    EmploymentAssistance,
    RetentionServices,
    SpecializedServices,
    EmploymentFinancialSupports,
    EmployerFinancialSupports,
    EnhancedReferrals,
}

impl InterventionKind {
    pub const ALL: [InterventionKind; INTERVENTION_COUNT] = [
        InterventionKind::LifeStabilization,
        InterventionKind::EmploymentAssistance,
        InterventionKind::RetentionServices,
        InterventionKind::SpecializedServices,
        InterventionKind::EmploymentFinancialSupports,
        InterventionKind::EmployerFinancialSupports,
        InterventionKind::EnhancedReferrals,
    ];

    /// Position of this intervention in the feature-vector tail.
    pub const fn index(self) -> usize {
        match self {
            InterventionKind::LifeStabilization => 0,
            InterventionKind::EmploymentAssistance => 1,
            InterventionKind::RetentionServices => 2,
            InterventionKind::SpecializedServices => 3,
            InterventionKind::EmploymentFinancialSupports => 4,
            InterventionKind::EmployerFinancialSupports => 5,
            InterventionKind::EnhancedReferrals => 6,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            InterventionKind::LifeStabilization => "Life Stabilization",
            InterventionKind::EmploymentAssistance => "General Employment Assistance Services",
            InterventionKind::RetentionServices => "Retention Services",
            InterventionKind::SpecializedServices => "Specialized Services",
            InterventionKind::EmploymentFinancialSupports => {
                "Employment-Related Financial Supports for Job Seekers and Employers"
            }
            InterventionKind::EmployerFinancialSupports => "Employer Financial Supports",
            InterventionKind::EnhancedReferrals => "Enhanced Referrals for Skills Development",
        }
    }
}

/// A subset of interventions considered together.
///
/// Members are kept sorted by feature index so that equal subsets compare
/// equal regardless of construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionCombination {
    interventions: Vec<InterventionKind>,
}

impl InterventionCombination {
    pub fn new(mut interventions: Vec<InterventionKind>) -> Self {
        interventions.sort();
        interventions.dedup();
        Self { interventions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.interventions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interventions.is_empty()
    }

    pub fn contains(&self, kind: InterventionKind) -> bool {
        self.interventions.contains(&kind)
    }

    pub fn kinds(&self) -> &[InterventionKind] {
        &self.interventions
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.interventions.iter().map(|kind| kind.label()).collect()
    }

    /// 0/1 indicator row in fixed intervention order.
    pub fn indicator(&self) -> [f64; INTERVENTION_COUNT] {
        let mut row = [0.0; INTERVENTION_COUNT];
        for kind in &self.interventions {
            row[kind.index()] = 1.0;
        }
        row
    }
}

/// Cleaned, fixed-order numeric encoding of a client's baseline attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFeatures([f64; CLIENT_FEATURE_LEN]);

impl ClientFeatures {
    pub(crate) fn from_values(values: [f64; CLIENT_FEATURE_LEN]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Append an intervention indicator row, producing the model input.
    pub fn with_interventions(&self, combination: &InterventionCombination) -> FeatureVector {
        let mut values = [0.0; FEATURE_VECTOR_LEN];
        values[..CLIENT_FEATURE_LEN].copy_from_slice(&self.0);
        values[CLIENT_FEATURE_LEN..].copy_from_slice(&combination.indicator());
        FeatureVector(values)
    }
}

/// A complete model input: baseline features plus intervention indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_VECTOR_LEN]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Indicator tail, exposed for test predictors and audits.
    pub fn intervention_indicator(&self) -> &[f64] {
        &self.0[CLIENT_FEATURE_LEN..]
    }
}

/// Historical training example: what was tried for a client and how it ended.
///
/// Records are immutable once written and only ever consumed in bulk by the
/// retrain flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub features: ClientFeatures,
    pub interventions: InterventionCombination,
    pub success: bool,
    pub recorded_on: NaiveDate,
}

impl OutcomeRecord {
    pub fn vector(&self) -> FeatureVector {
        self.features.with_interventions(&self.interventions)
    }
}

/// A single intake answer before cleaning.
///
/// The surrounding web layer submits a mix of numbers, booleans, and the
/// categorical answer strings used on the assessment form, so the boundary
/// accepts all three and normalizes during cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

/// Raw client intake record as received from the REST layer.
///
/// Every field is optional at the boundary; the cleaner reports the first
/// missing or out-of-domain field by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawClientRecord {
    #[serde(default)]
    pub age: Option<RawValue>,
    #[serde(default)]
    pub gender: Option<RawValue>,
    #[serde(default)]
    pub work_experience: Option<RawValue>,
    #[serde(default)]
    pub canada_work_experience: Option<RawValue>,
    #[serde(default)]
    pub dependents: Option<RawValue>,
    #[serde(default)]
    pub born_in_canada: Option<RawValue>,
    #[serde(default)]
    pub citizen_status: Option<RawValue>,
    #[serde(default)]
    pub education_level: Option<RawValue>,
    #[serde(default)]
    pub fluent_in_english: Option<RawValue>,
    #[serde(default)]
    pub reading_scale: Option<RawValue>,
    #[serde(default)]
    pub speaking_scale: Option<RawValue>,
    #[serde(default)]
    pub writing_scale: Option<RawValue>,
    #[serde(default)]
    pub numeracy_scale: Option<RawValue>,
    #[serde(default)]
    pub computer_scale: Option<RawValue>,
    #[serde(default)]
    pub has_transportation: Option<RawValue>,
    #[serde(default)]
    pub is_caregiver: Option<RawValue>,
    #[serde(default)]
    pub housing_situation: Option<RawValue>,
    #[serde(default)]
    pub income_source: Option<RawValue>,
    #[serde(default)]
    pub has_felony: Option<RawValue>,
    #[serde(default)]
    pub attending_school: Option<RawValue>,
    #[serde(default)]
    pub currently_employed: Option<RawValue>,
    #[serde(default)]
    pub substance_use: Option<RawValue>,
    #[serde(default)]
    pub months_unemployed: Option<RawValue>,
    #[serde(default)]
    pub needs_mental_health_support: Option<RawValue>,
}

impl RawClientRecord {
    pub(crate) fn field(&self, name: &str) -> Option<&RawValue> {
        match name {
            "age" => self.age.as_ref(),
            "gender" => self.gender.as_ref(),
            "work_experience" => self.work_experience.as_ref(),
            "canada_work_experience" => self.canada_work_experience.as_ref(),
            "dependents" => self.dependents.as_ref(),
            "born_in_canada" => self.born_in_canada.as_ref(),
            "citizen_status" => self.citizen_status.as_ref(),
            "education_level" => self.education_level.as_ref(),
            "fluent_in_english" => self.fluent_in_english.as_ref(),
            "reading_scale" => self.reading_scale.as_ref(),
            "speaking_scale" => self.speaking_scale.as_ref(),
            "writing_scale" => self.writing_scale.as_ref(),
            "numeracy_scale" => self.numeracy_scale.as_ref(),
            "computer_scale" => self.computer_scale.as_ref(),
            "has_transportation" => self.has_transportation.as_ref(),
            "is_caregiver" => self.is_caregiver.as_ref(),
            "housing_situation" => self.housing_situation.as_ref(),
            "income_source" => self.income_source.as_ref(),
            "has_felony" => self.has_felony.as_ref(),
            "attending_school" => self.attending_school.as_ref(),
            "currently_employed" => self.currently_employed.as_ref(),
            "substance_use" => self.substance_use.as_ref(),
            "months_unemployed" => self.months_unemployed.as_ref(),
            "needs_mental_health_support" => self.needs_mental_health_support.as_ref(),
            _ => None,
        }
    }
}
