//! Aux: optional per-pass and per-sigma diagnostics capture.
//!
//! Disabled by default (`FitControl::diagnostics == false`), in which case
//! [`DiagnosticsRecorder::disabled`] drops every record at zero cost. This
//! crate never formats or prints diagnostics itself — that's left to the
//! demo binary or the caller, per the out-of-scope note on diagnostics
//! formatting.

/// One FISTA pass's numbers, captured only when diagnostics are enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassDiagnostics {
    pub pass: usize,
    pub primal: f64,
    pub dual: f64,
    pub infeasibility: f64,
    pub line_search_iters: usize,
    pub step_size: f64,
}

/// Outcome of solving a single `sigma_k`.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaOutcome {
    pub sigma_index: usize,
    pub converged: bool,
    pub passes: usize,
    pub kkt_rounds: usize,
    pub active_set_size: usize,
    pub final_infeasibility: f64,
    pub final_rel_gap: f64,
}

/// Per-sigma diagnostics: the outcome plus, if diagnostics are enabled, the
/// full pass-by-pass trace.
#[derive(Debug, Clone, Default)]
pub struct SigmaDiagnostics {
    pub passes: Vec<PassDiagnostics>,
}

/// Collects diagnostics during a fit. Cheap to construct; `disabled()`
/// recorders never allocate.
pub struct DiagnosticsRecorder {
    enabled: bool,
    current: Vec<PassDiagnostics>,
    per_sigma: Vec<SigmaDiagnostics>,
}

impl DiagnosticsRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: Vec::new(),
            per_sigma: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_pass(&mut self, d: PassDiagnostics) {
        if self.enabled {
            self.current.push(d);
        }
    }

    /// Close out the current sigma's trace and push it onto the history.
    pub fn finish_sigma(&mut self) {
        if self.enabled {
            self.per_sigma.push(SigmaDiagnostics {
                passes: std::mem::take(&mut self.current),
            });
        }
    }

    pub fn into_history(self) -> Vec<SigmaDiagnostics> {
        self.per_sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_recorder_drops_everything() {
        let mut rec = DiagnosticsRecorder::disabled();
        rec.record_pass(PassDiagnostics {
            pass: 0,
            primal: 1.0,
            dual: -1.0,
            infeasibility: 0.0,
            line_search_iters: 1,
            step_size: 1.0,
        });
        rec.finish_sigma();
        assert!(rec.into_history().is_empty());
    }

    #[test]
    fn enabled_recorder_tracks_per_sigma_history() {
        let mut rec = DiagnosticsRecorder::new(true);
        rec.record_pass(PassDiagnostics {
            pass: 0,
            primal: 1.0,
            dual: -1.0,
            infeasibility: 0.5,
            line_search_iters: 2,
            step_size: 1.0,
        });
        rec.finish_sigma();
        rec.record_pass(PassDiagnostics {
            pass: 0,
            primal: 0.5,
            dual: -0.5,
            infeasibility: 0.1,
            line_search_iters: 1,
            step_size: 1.0,
        });
        rec.finish_sigma();
        let history = rec.into_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].passes.len(), 1);
        assert_eq!(history[1].passes[0].primal, 0.5);
    }
}
