//! CSV importer for historical outcome data.
//!
//! Rows carry the 24 baseline assessment columns, one 0/1 column per
//! intervention, and the observed `success_rate` (0-100). Rows are cleaned
//! through the same validation path as live intake, so a bad row fails the
//! import with its row number and offending field.

use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use super::cleaner::{clean, ValidationError};
use super::domain::{
    InterventionCombination, InterventionKind, OutcomeRecord, RawClientRecord, RawValue,
};

/// Success-rate threshold above which an outcome counts as successful.
pub const SUCCESS_RATE_THRESHOLD: f64 = 70.0;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read outcome data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        source: ValidationError,
    },
    #[error("row {row}: success_rate {value} is outside 0-100")]
    SuccessRateOutOfRange { row: usize, value: f64 },
}

#[derive(Debug, Deserialize)]
struct OutcomeRow {
    age: f64,
    gender: f64,
    work_experience: f64,
    canada_work_experience: f64,
    dependents: f64,
    born_in_canada: f64,
    citizen_status: f64,
    education_level: f64,
    fluent_in_english: f64,
    reading_scale: f64,
    speaking_scale: f64,
    writing_scale: f64,
    numeracy_scale: f64,
    computer_scale: f64,
    has_transportation: f64,
    is_caregiver: f64,
    housing_situation: f64,
    income_source: f64,
    has_felony: f64,
    attending_school: f64,
    currently_employed: f64,
    substance_use: f64,
    months_unemployed: f64,
    needs_mental_health_support: f64,
    life_stabilization: f64,
    employment_assistance: f64,
    retention_services: f64,
    specialized_services: f64,
    employment_financial_supports: f64,
    employer_financial_supports: f64,
    enhanced_referrals: f64,
    success_rate: f64,
}

impl OutcomeRow {
    fn raw_record(&self) -> RawClientRecord {
        let number = |value: f64| Some(RawValue::Number(value));
        RawClientRecord {
            age: number(self.age),
            gender: number(self.gender),
            work_experience: number(self.work_experience),
            canada_work_experience: number(self.canada_work_experience),
            dependents: number(self.dependents),
            born_in_canada: number(self.born_in_canada),
            citizen_status: number(self.citizen_status),
            education_level: number(self.education_level),
            fluent_in_english: number(self.fluent_in_english),
            reading_scale: number(self.reading_scale),
            speaking_scale: number(self.speaking_scale),
            writing_scale: number(self.writing_scale),
            numeracy_scale: number(self.numeracy_scale),
            computer_scale: number(self.computer_scale),
            has_transportation: number(self.has_transportation),
            is_caregiver: number(self.is_caregiver),
            housing_situation: number(self.housing_situation),
            income_source: number(self.income_source),
            has_felony: number(self.has_felony),
            attending_school: number(self.attending_school),
            currently_employed: number(self.currently_employed),
            substance_use: number(self.substance_use),
            months_unemployed: number(self.months_unemployed),
            needs_mental_health_support: number(self.needs_mental_health_support),
        }
    }

    fn interventions(&self) -> InterventionCombination {
        let flags = [
            (InterventionKind::LifeStabilization, self.life_stabilization),
            (
                InterventionKind::EmploymentAssistance,
                self.employment_assistance,
            ),
            (InterventionKind::RetentionServices, self.retention_services),
            (
                InterventionKind::SpecializedServices,
                self.specialized_services,
            ),
            (
                InterventionKind::EmploymentFinancialSupports,
                self.employment_financial_supports,
            ),
            (
                InterventionKind::EmployerFinancialSupports,
                self.employer_financial_supports,
            ),
            (InterventionKind::EnhancedReferrals, self.enhanced_referrals),
        ];
        InterventionCombination::new(
            flags
                .iter()
                .filter(|(_, value)| *value != 0.0)
                .map(|(kind, _)| *kind)
                .collect(),
        )
    }
}

/// Read outcome records from CSV, tagging each with the supplied date.
pub fn read_outcomes<R: Read>(
    reader: R,
    recorded_on: NaiveDate,
) -> Result<Vec<OutcomeRecord>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<OutcomeRow>().enumerate() {
        let row_number = index + 1;
        let row = row?;

        if !(0.0..=100.0).contains(&row.success_rate) {
            return Err(DatasetError::SuccessRateOutOfRange {
                row: row_number,
                value: row.success_rate,
            });
        }

        let features = clean(&row.raw_record()).map_err(|source| DatasetError::Row {
            row: row_number,
            source,
        })?;

        records.push(OutcomeRecord {
            features,
            interventions: row.interventions(),
            success: row.success_rate >= SUCCESS_RATE_THRESHOLD,
            recorded_on,
        });
    }

    Ok(records)
}
