use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::{InterventionCombination, InterventionKind, RawClientRecord, RawValue};

/// Identifier wrapper for client records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for case workers, issued by the external user system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CaseWorkerId(pub u64);

impl fmt::Display for CaseWorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Roles the surrounding API layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    CaseWorker,
}

/// Progress of one intervention for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl InterventionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InterventionStatus::NotStarted => "not_started",
            InterventionStatus::InProgress => "in_progress",
            InterventionStatus::Completed => "completed",
        }
    }
}

/// Typed baseline assessment attributes of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub age: u8,
    pub gender: u8,
    pub work_experience: u8,
    pub canada_work_experience: u8,
    pub dependents: u8,
    pub born_in_canada: bool,
    pub citizen_status: bool,
    pub education_level: u8,
    pub fluent_in_english: bool,
    pub reading_scale: u8,
    pub speaking_scale: u8,
    pub writing_scale: u8,
    pub numeracy_scale: u8,
    pub computer_scale: u8,
    pub has_transportation: bool,
    pub is_caregiver: bool,
    pub housing_situation: u8,
    pub income_source: u8,
    pub has_felony: bool,
    pub attending_school: bool,
    pub currently_employed: bool,
    pub substance_use: bool,
    pub months_unemployed: u16,
    pub needs_mental_health_support: bool,
}

impl From<&ClientProfile> for RawClientRecord {
    fn from(profile: &ClientProfile) -> Self {
        let number = |value: f64| Some(RawValue::Number(value));
        let flag = |value: bool| Some(RawValue::Boolean(value));
        RawClientRecord {
            age: number(profile.age as f64),
            gender: number(profile.gender as f64),
            work_experience: number(profile.work_experience as f64),
            canada_work_experience: number(profile.canada_work_experience as f64),
            dependents: number(profile.dependents as f64),
            born_in_canada: flag(profile.born_in_canada),
            citizen_status: flag(profile.citizen_status),
            education_level: number(profile.education_level as f64),
            fluent_in_english: flag(profile.fluent_in_english),
            reading_scale: number(profile.reading_scale as f64),
            speaking_scale: number(profile.speaking_scale as f64),
            writing_scale: number(profile.writing_scale as f64),
            numeracy_scale: number(profile.numeracy_scale as f64),
            computer_scale: number(profile.computer_scale as f64),
            has_transportation: flag(profile.has_transportation),
            is_caregiver: flag(profile.is_caregiver),
            housing_situation: number(profile.housing_situation as f64),
            income_source: number(profile.income_source as f64),
            has_felony: flag(profile.has_felony),
            attending_school: flag(profile.attending_school),
            currently_employed: flag(profile.currently_employed),
            substance_use: flag(profile.substance_use),
            months_unemployed: number(profile.months_unemployed as f64),
            needs_mental_health_support: flag(profile.needs_mental_health_support),
        }
    }
}

/// A stored client: immutable id plus the mutable profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    #[serde(flatten)]
    pub profile: ClientProfile,
}

/// Partial update to a client profile; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUpdate {
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub work_experience: Option<u8>,
    #[serde(default)]
    pub canada_work_experience: Option<u8>,
    #[serde(default)]
    pub dependents: Option<u8>,
    #[serde(default)]
    pub born_in_canada: Option<bool>,
    #[serde(default)]
    pub citizen_status: Option<bool>,
    #[serde(default)]
    pub education_level: Option<u8>,
    #[serde(default)]
    pub fluent_in_english: Option<bool>,
    #[serde(default)]
    pub reading_scale: Option<u8>,
    #[serde(default)]
    pub speaking_scale: Option<u8>,
    #[serde(default)]
    pub writing_scale: Option<u8>,
    #[serde(default)]
    pub numeracy_scale: Option<u8>,
    #[serde(default)]
    pub computer_scale: Option<u8>,
    #[serde(default)]
    pub has_transportation: Option<bool>,
    #[serde(default)]
    pub is_caregiver: Option<bool>,
    #[serde(default)]
    pub housing_situation: Option<u8>,
    #[serde(default)]
    pub income_source: Option<u8>,
    #[serde(default)]
    pub has_felony: Option<bool>,
    #[serde(default)]
    pub attending_school: Option<bool>,
    #[serde(default)]
    pub currently_employed: Option<bool>,
    #[serde(default)]
    pub substance_use: Option<bool>,
    #[serde(default)]
    pub months_unemployed: Option<u16>,
    #[serde(default)]
    pub needs_mental_health_support: Option<bool>,
}

impl ClientUpdate {
    pub fn apply(&self, profile: &mut ClientProfile) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(value) = self.$field {
                    profile.$field = value;
                }
            };
        }
        set!(age);
        set!(gender);
        set!(work_experience);
        set!(canada_work_experience);
        set!(dependents);
        set!(born_in_canada);
        set!(citizen_status);
        set!(education_level);
        set!(fluent_in_english);
        set!(reading_scale);
        set!(speaking_scale);
        set!(writing_scale);
        set!(numeracy_scale);
        set!(computer_scale);
        set!(has_transportation);
        set!(is_caregiver);
        set!(housing_situation);
        set!(income_source);
        set!(has_felony);
        set!(attending_school);
        set!(currently_employed);
        set!(substance_use);
        set!(months_unemployed);
        set!(needs_mental_health_support);
    }
}

/// Case assignment relating a client to their case worker, with per-
/// intervention progress and the observed success rate so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub client_id: ClientId,
    pub case_worker_id: CaseWorkerId,
    pub statuses: BTreeMap<InterventionKind, InterventionStatus>,
    pub success_rate: u8,
}

impl CaseRecord {
    /// Fresh assignment: nothing started, no observed success yet.
    pub fn new(client_id: ClientId, case_worker_id: CaseWorkerId) -> Self {
        let statuses = InterventionKind::ALL
            .iter()
            .map(|kind| (*kind, InterventionStatus::NotStarted))
            .collect();
        Self {
            client_id,
            case_worker_id,
            statuses,
            success_rate: 0,
        }
    }

    /// Interventions actually applied to the client, for outcome snapshots.
    pub fn applied_interventions(&self) -> InterventionCombination {
        InterventionCombination::new(
            self.statuses
                .iter()
                .filter(|(_, status)| **status != InterventionStatus::NotStarted)
                .map(|(kind, _)| *kind)
                .collect(),
        )
    }
}

/// Partial update to a case: any subset of statuses and/or the success rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseServiceUpdate {
    #[serde(default)]
    pub statuses: BTreeMap<InterventionKind, InterventionStatus>,
    #[serde(default)]
    pub success_rate: Option<u8>,
}

/// One page of clients plus the total count, for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPage {
    pub clients: Vec<ClientRecord>,
    pub total: usize,
}

/// Optional per-field equality/threshold filters for the criteria search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSearchCriteria {
    #[serde(default)]
    pub currently_employed: Option<bool>,
    #[serde(default)]
    pub education_level: Option<u8>,
    #[serde(default)]
    pub age_min: Option<u8>,
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub work_experience: Option<u8>,
    #[serde(default)]
    pub canada_work_experience: Option<u8>,
    #[serde(default)]
    pub dependents: Option<u8>,
    #[serde(default)]
    pub born_in_canada: Option<bool>,
    #[serde(default)]
    pub citizen_status: Option<bool>,
    #[serde(default)]
    pub fluent_in_english: Option<bool>,
    #[serde(default)]
    pub reading_scale: Option<u8>,
    #[serde(default)]
    pub speaking_scale: Option<u8>,
    #[serde(default)]
    pub writing_scale: Option<u8>,
    #[serde(default)]
    pub numeracy_scale: Option<u8>,
    #[serde(default)]
    pub computer_scale: Option<u8>,
    #[serde(default)]
    pub has_transportation: Option<bool>,
    #[serde(default)]
    pub is_caregiver: Option<bool>,
    #[serde(default)]
    pub housing_situation: Option<u8>,
    #[serde(default)]
    pub income_source: Option<u8>,
    #[serde(default)]
    pub has_felony: Option<bool>,
    #[serde(default)]
    pub attending_school: Option<bool>,
    #[serde(default)]
    pub substance_use: Option<bool>,
    #[serde(default)]
    pub months_unemployed: Option<u16>,
    #[serde(default)]
    pub needs_mental_health_support: Option<bool>,
}

impl ClientSearchCriteria {
    pub(crate) fn matches(&self, profile: &ClientProfile) -> bool {
        fn check<T: PartialEq>(filter: &Option<T>, actual: &T) -> bool {
            filter.as_ref().map_or(true, |wanted| wanted == actual)
        }

        self.age_min.map_or(true, |min| profile.age >= min)
            && check(&self.currently_employed, &profile.currently_employed)
            && check(&self.education_level, &profile.education_level)
            && check(&self.gender, &profile.gender)
            && check(&self.work_experience, &profile.work_experience)
            && check(
                &self.canada_work_experience,
                &profile.canada_work_experience,
            )
            && check(&self.dependents, &profile.dependents)
            && check(&self.born_in_canada, &profile.born_in_canada)
            && check(&self.citizen_status, &profile.citizen_status)
            && check(&self.fluent_in_english, &profile.fluent_in_english)
            && check(&self.reading_scale, &profile.reading_scale)
            && check(&self.speaking_scale, &profile.speaking_scale)
            && check(&self.writing_scale, &profile.writing_scale)
            && check(&self.numeracy_scale, &profile.numeracy_scale)
            && check(&self.computer_scale, &profile.computer_scale)
            && check(&self.has_transportation, &profile.has_transportation)
            && check(&self.is_caregiver, &profile.is_caregiver)
            && check(&self.housing_situation, &profile.housing_situation)
            && check(&self.income_source, &profile.income_source)
            && check(&self.has_felony, &profile.has_felony)
            && check(&self.attending_school, &profile.attending_school)
            && check(&self.substance_use, &profile.substance_use)
            && check(&self.months_unemployed, &profile.months_unemployed)
            && check(
                &self.needs_mental_health_support,
                &profile.needs_mental_health_support,
            )
    }
}

/// Per-intervention status filters for the service search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFilter {
    #[serde(default)]
    pub statuses: BTreeMap<InterventionKind, InterventionStatus>,
}

impl ServiceFilter {
    pub(crate) fn matches(&self, case: &CaseRecord) -> bool {
        self.statuses.iter().all(|(kind, wanted)| {
            case.statuses
                .get(kind)
                .map_or(false, |actual| actual == wanted)
        })
    }
}
