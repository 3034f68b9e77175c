//! Backfill of one variant kind over stored images.
//!
//! The scheduler only iterates; every create-or-decline decision belongs to
//! the factory. The time budget is checked between records, so a render in
//! flight always completes.

use crate::{PipelineContext, SizeVariantFactory};
use darkroom_core::{MediaRecord, MediaType, RecordId, SizeVariantKind};
use darkroom_error::{DarkroomResult, PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// What happened to one record during a backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackfillOutcome {
    /// The variant was created (or already existed)
    Created {
        /// Record id
        record_id: RecordId,
        /// Record title
        title: String,
        /// Produced width
        width: u32,
        /// Produced height
        height: u32,
    },
    /// The factory declined the variant
    Declined {
        /// Record id
        record_id: RecordId,
        /// Record title
        title: String,
    },
    /// Repository or storage failed for this record
    Failed {
        /// Record id
        record_id: RecordId,
        /// Record title
        title: String,
        /// Error message
        reason: String,
    },
}

impl BackfillOutcome {
    /// The record this outcome is about.
    pub fn record_id(&self) -> RecordId {
        match self {
            BackfillOutcome::Created { record_id, .. }
            | BackfillOutcome::Declined { record_id, .. }
            | BackfillOutcome::Failed { record_id, .. } => *record_id,
        }
    }

    /// Title of the record.
    pub fn title(&self) -> &str {
        match self {
            BackfillOutcome::Created { title, .. }
            | BackfillOutcome::Declined { title, .. }
            | BackfillOutcome::Failed { title, .. } => title,
        }
    }

    /// Whether the variant exists after this outcome.
    pub fn is_created(&self) -> bool {
        matches!(self, BackfillOutcome::Created { .. })
    }
}

/// Result of one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    outcomes: Vec<BackfillOutcome>,
    timed_out: bool,
}

impl BackfillReport {
    /// Per-record outcomes in processing order.
    pub fn outcomes(&self) -> &[BackfillOutcome] {
        &self.outcomes
    }

    /// Whether the time budget stopped the run early.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Number of records that now have the variant.
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_created()).count()
    }
}

/// Drives the factory over images missing a variant kind.
#[derive(Debug, Clone)]
pub struct BackfillScheduler {
    context: PipelineContext,
}

impl BackfillScheduler {
    /// Create a scheduler.
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    /// Create `kind` for up to `amount` images lacking it, within `timeout`.
    ///
    /// `progress` sees every outcome as soon as it is known.
    #[instrument(skip(self, progress))]
    pub async fn run<F>(
        &self,
        kind: SizeVariantKind,
        amount: usize,
        timeout: Duration,
        mut progress: F,
    ) -> DarkroomResult<BackfillReport>
    where
        F: FnMut(&BackfillOutcome) + Send,
    {
        if kind == SizeVariantKind::Original {
            return Err(PipelineError::new(PipelineErrorKind::InvalidVariantKind {
                kind: kind.to_string(),
                reason: "originals are recorded at upload".to_string(),
            })
            .into());
        }

        let started = Instant::now();
        let records = self
            .context
            .repository()
            .records_missing_variant(kind, MediaType::Image, amount)
            .await?;
        info!(candidates = records.len(), "Starting backfill");

        let mut factory = SizeVariantFactory::new(self.context.clone());
        let mut report = BackfillReport::default();
        for record in records {
            if started.elapsed() >= timeout {
                warn!(
                    processed = report.outcomes.len(),
                    "Backfill time budget exhausted"
                );
                report.timed_out = true;
                break;
            }
            let outcome = backfill_one(&mut factory, record, kind).await;
            self.context
                .diagnostics()
                .release(&outcome.record_id().to_string());
            progress(&outcome);
            report.outcomes.push(outcome);
        }
        Ok(report)
    }
}

async fn backfill_one(
    factory: &mut SizeVariantFactory,
    record: MediaRecord,
    kind: SizeVariantKind,
) -> BackfillOutcome {
    let record_id = record.id;
    let title = record.title.clone();
    let result = match factory.init(record).await {
        Ok(()) => factory.create_size_variant_cond(kind).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(Some(variant)) => BackfillOutcome::Created {
            record_id,
            title,
            width: variant.width,
            height: variant.height,
        },
        Ok(None) => BackfillOutcome::Declined { record_id, title },
        Err(e) => {
            warn!(%record_id, error = %e, "Backfill failed for record");
            BackfillOutcome::Failed {
                record_id,
                title,
                reason: e.to_string(),
            }
        }
    }
}
