use std::fmt;

use super::importer::{PackImporter, PackOutcome};
use crate::models::PackSpec;

/// Tally of one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<PackOutcome>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{}", outcome)?;
        }
        write!(
            f,
            "Import complete: {}/{} packs succeeded, {} failed",
            self.succeeded(),
            self.attempted(),
            self.failed()
        )
    }
}

/// Imports packs one after another; a failed pack never stops the batch.
pub struct BatchRunner {
    importer: PackImporter,
}

impl BatchRunner {
    pub fn new(importer: PackImporter) -> Self {
        Self { importer }
    }

    pub async fn run(&self, specs: &[PackSpec]) -> BatchSummary {
        tracing::info!("Starting bulk import of {} packs", specs.len());

        let mut summary = BatchSummary::default();
        for (idx, spec) in specs.iter().enumerate() {
            tracing::info!("[{}/{}] Pack '{}'", idx + 1, specs.len(), spec.name);
            let outcome = self.importer.import(spec).await;
            if !outcome.is_success() {
                tracing::warn!("Pack '{}' was not imported", outcome.name());
            }
            summary.outcomes.push(outcome);
        }

        tracing::info!(
            "Bulk import finished: {}/{} succeeded",
            summary.succeeded(),
            summary.attempted()
        );
        summary
    }
}
