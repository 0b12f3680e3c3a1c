use crate::infra::parse_date;
use casework::assessment::{
    clean, rank, read_outcomes, train, AssessmentError, CombinationEnumerator, RawClientRecord,
    TrainedModel,
};
use casework::error::AppError;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file holding one raw client intake record
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Saved model to score against
    #[arg(long, default_value = "model.json")]
    pub(crate) model: PathBuf,
    /// Keep only the strongest N recommendations
    #[arg(long)]
    pub(crate) top_k: Option<usize>,
    /// Cap on interventions applied at once
    #[arg(long)]
    pub(crate) max_simultaneous: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct TrainArgs {
    /// Historical outcomes CSV to train from
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Where to write the trained model
    #[arg(long, default_value = "model.json")]
    pub(crate) model_out: PathBuf,
    /// Date to stamp on the imported records (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) recorded_on: Option<NaiveDate>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let blob = std::fs::read(&args.model)?;
    let model = TrainedModel::from_bytes(&blob).map_err(AssessmentError::from)?;

    let contents = std::fs::read_to_string(&args.input)?;
    let raw: RawClientRecord = serde_json::from_str(&contents)?;
    let features = clean(&raw).map_err(AssessmentError::from)?;

    let enumerator = CombinationEnumerator::all_interventions(args.max_simultaneous)
        .map_err(AssessmentError::from)?;
    let report = rank(&model, &features, enumerator.iter(), args.top_k)
        .map_err(AssessmentError::from)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).map_err(AppError::Serde)?
    );
    Ok(())
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let recorded_on = args
        .recorded_on
        .unwrap_or_else(|| Local::now().date_naive());

    let file = std::fs::File::open(&args.data)?;
    let records = read_outcomes(file, recorded_on)?;
    let model = train(&records).map_err(AssessmentError::from)?;
    let summary = model.summary();

    std::fs::write(
        &args.model_out,
        model.to_bytes().map_err(AssessmentError::from)?,
    )?;

    println!(
        "trained on {} outcome records; model written to {}",
        summary.trained_on,
        args.model_out.display()
    );
    Ok(())
}
