//! `darkroom generate-thumbs` handler.

use darkroom::{
    BackfillOutcome, BackfillScheduler, BackfillSettings, DarkroomResult, PipelineContext,
    PipelineError, PipelineErrorKind, SizeVariantKind,
};
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Backfill one size variant kind and report each photo.
///
/// Fails with [`PipelineErrorKind::UnknownVariantKind`] when `name` is not a
/// variant that can be backfilled.
pub async fn generate_thumbs(
    context: PipelineContext,
    defaults: &BackfillSettings,
    name: &str,
    amount: Option<usize>,
    timeout: Option<u64>,
) -> DarkroomResult<()> {
    let kind = backfill_kind(name)?;

    let amount = amount.unwrap_or(defaults.amount);
    let timeout = timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| defaults.timeout());

    let report = BackfillScheduler::new(context)
        .run(kind, amount, timeout, |outcome| match outcome {
            BackfillOutcome::Created {
                title,
                width,
                height,
                ..
            } => println!("   {} ({}x{}) for {} created.", kind, width, height, title),
            BackfillOutcome::Declined { title, .. } | BackfillOutcome::Failed { title, .. } => {
                println!("   Did not create {} for {}.", kind, title)
            }
        })
        .await?;

    if report.outcomes().is_empty() && !report.timed_out() {
        println!("No picture requires {}.", kind);
    }
    if report.timed_out() {
        println!(
            "Stopped after {} of at most {} pictures: time budget of {}s used up.",
            report.outcomes().len(),
            amount,
            timeout.as_secs()
        );
    }
    Ok(())
}

/// Parse a variant name accepted by `generate-thumbs`. `original` is refused.
pub fn backfill_kind(name: &str) -> DarkroomResult<SizeVariantKind> {
    match SizeVariantKind::from_str(name) {
        Ok(kind) if kind != SizeVariantKind::Original => Ok(kind),
        _ => {
            let valid: Vec<&str> = SizeVariantKind::iter()
                .filter(|kind| *kind != SizeVariantKind::Original)
                .map(|kind| kind.as_str())
                .collect();
            Err(PipelineError::new(PipelineErrorKind::UnknownVariantKind {
                name: name.to_string(),
                valid: valid.join(", "),
            })
            .into())
        }
    }
}
