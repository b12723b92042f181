/// Progress bar over the iterations of the `grad` executable
pub(super) struct Progress {
    bar: ProgressBar,
}

impl Progress {

    pub(super) fn new(iterations: usize) -> Self {
        let bar = ProgressBar::new(iterations as u64);
        bar.set_style(ProgressStyle::default_bar()
                      .template("[{elapsed_precise}] {wide_bar} {pos}/{len} iterations ({eta_precise})\n{msg}")
                      .unwrap_or_else(|_| ProgressStyle::default_bar())
        );
        bar.tick();
        Self { bar }
    }

    pub(super) fn iteration_done(&self, report: &IterationReport) {
        let lambdas = report.lambdas.iter().map(|l| format!("{l:.3e}")).join(" ");
        self.bar.set_message(format!("residual: {:.4e}   step sizes: {lambdas}", report.residual));
        self.bar.inc(1);
    }

    pub(super) fn final_report(&self, initial: Option<f64>, last: Option<f64>) {
        self.bar.finish();
        if let (Some(initial), Some(last)) = (initial, last) {
            info!("residual went from {initial:.4e} to {last:.4e}");
        }
    }
}

// ----- Imports -----------------------------------------------------------------------------------------
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use tracing::info;

use tomograd::grad::IterationReport;
