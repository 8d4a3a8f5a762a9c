use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::core::error::StopReason;
use crate::core::scalar::D;

/// A struct that holds the results of a MADS or Nelder-Mead run.
///
/// Carries the feasibility/infeasibility and mesh bookkeeping a blackbox
/// run needs to report, alongside the usual fit-report fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// The names of the parameters. `None` if no names were set.
    pub parameter_names: Option<Vec<String>>,
    /// A message set by the terminating algorithm (e.g. a [`StopReason`]
    /// rendered to text).
    pub message: String,
    /// The initial parameters of the minimization.
    pub x0: Vec<f64>,
    /// The best feasible (or, if none, best infeasible) point found.
    pub x: Vec<f64>,
    /// The objective value at [`Summary::x`].
    pub fx: f64,
    /// The infeasibility measure `h` at [`Summary::x`].
    pub h: f64,
    /// The barrier's `hMax` threshold at termination.
    pub h_max: f64,
    /// Final per-coordinate mesh size.
    pub mesh_size: Vec<f64>,
    /// The number of blackbox evaluations performed.
    pub bb_evals: usize,
    /// The number of evaluations served from cache.
    pub cache_hits: usize,
    /// The number of megaiterations run.
    pub megaiterations: usize,
    /// Flag that says whether the run ended in a feasible state.
    pub feasible: bool,
}

impl Summary {
    pub fn with_x0(mut self, x0: Vec<f64>) -> Self {
        self.x0 = x0;
        self
    }

    pub fn stop_reason_message(reason: StopReason) -> String {
        match reason {
            StopReason::MaxBbEvalReached => "max blackbox evaluations reached".into(),
            StopReason::MaxEvalReached => "max evaluations reached".into(),
            StopReason::MaxIterationsReached => "max megaiterations reached".into(),
            StopReason::MeshStop => "mesh collapsed".into(),
            StopReason::ObjectiveTargetReached => "objective target reached".into(),
            StopReason::FeasibilityReached => "feasibility reached".into(),
            StopReason::InfeasibleOnlyHMaxCollapsed => "infeasible only, hMax collapsed".into(),
            StopReason::UserInterrupt => "user interrupt".into(),
            StopReason::InitializationFailed => "initialization failed".into(),
            StopReason::NmStopNoShrink => "NM_STOP_NO_SHRINK".into(),
            StopReason::NmSingleCompleted => "NM single completed".into(),
            StopReason::InternalInvariantViolation => "internal invariant violation".into(),
            StopReason::Undefined => "running".into(),
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Summary {
            parameter_names: None,
            message: String::new(),
            x0: Vec::new(),
            x: Vec::new(),
            fx: D::Undefined.to_f64(),
            h: 0.0,
            h_max: f64::INFINITY,
            mesh_size: Vec::new(),
            bb_evals: 0,
            cache_hits: 0,
            megaiterations: 0,
            feasible: false,
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use tabled::{
            builder::Builder,
            settings::{
                object::Row,
                style::{BorderSpanCorrection, HorizontalLine},
                Alignment, Color, Padding, Span, Style, Theme,
            },
        };
        let mut builder = Builder::default();
        builder.push_record(["NOMAD RUN RESULTS"]);
        builder.push_record(["Status", "f(x)", "h(x)", "#bb evals", "", "#cache hits", ""]);
        builder.push_record([
            self.feasible.then_some("Feasible").unwrap_or("Infeasible"),
            &format!("{:.5}", self.fx),
            &format!("{:.5}", self.h),
            &format!("{}", self.bb_evals),
            "",
            &format!("{}", self.cache_hits),
            "",
        ]);
        builder.push_record(["Message", &self.message]);

        let names = self
            .parameter_names
            .clone()
            .unwrap_or(
                vec![""; self.x.len()]
                    .into_iter()
                    .enumerate()
                    .map(|(i, _)| format!("x_{}", i))
                    .collect::<Vec<_>>(),
            )
            .into_iter();

        builder.push_record(["Parameter", "", "Mesh Size"]);
        builder.push_record(["", "=", "0", "delta"]);
        for (((v, v0), delta), n) in self
            .x
            .iter()
            .zip(self.x0.iter().chain(std::iter::repeat(&0.0)))
            .zip(self.mesh_size.iter().chain(std::iter::repeat(&0.0)))
            .zip(names)
        {
            builder.push_record([
                &n,
                &format!("{:.5}", v),
                &format!("{:.5}", v0),
                &format!("{:.2e}", delta),
            ]);
        }
        let mut table = builder.build();
        let mut style = Theme::from_style(Style::rounded().remove_horizontals());
        style.insert_horizontal_line(1, HorizontalLine::inherit(Style::modern()));
        style.insert_horizontal_line(2, HorizontalLine::inherit(Style::modern()));
        style.insert_horizontal_line(3, HorizontalLine::inherit(Style::modern()));
        style.insert_horizontal_line(4, HorizontalLine::inherit(Style::modern()));
        style.insert_horizontal_line(5, HorizontalLine::inherit(Style::modern()));

        table
            .with(style)
            .modify(
                Row::from(0),
                (Padding::new(1, 1, 1, 1), Alignment::center(), Color::BOLD),
            )
            .modify((0, 0), Span::column(7))
            .modify(Row::from(1), Color::BOLD)
            .modify(Row::from(3), Padding::new(1, 1, 1, 1))
            .modify((3, 0), Color::BOLD)
            .with(BorderSpanCorrection);

        f.write_str(&table.to_string())?;
        Ok(())
    }
}
