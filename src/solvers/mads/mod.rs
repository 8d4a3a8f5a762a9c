//! The MADS megaiteration driver: carries `(k, barrier, mesh, successType)`
//! forward across megaiterations, runs Search then Poll, and feeds the
//! step outcome back into the mesh and `hMax`.

pub mod poll;
pub mod search;

use crate::cache::InMemoryCache;
use crate::core::barrier::{ProgressiveBarrier, SuccessType};
use crate::core::error::StopReason;
use crate::core::eval_point::StepTag;
use crate::core::iteration_utils::TrialPointSet;
use crate::core::mesh::GMesh;
use crate::core::point::{Point, VariableSpace};
use crate::core::scalar::D;
use crate::core::subproblem::Subproblem;
use crate::core::summary::Summary;
use crate::core::vector::{AoD, HNorm};
use crate::evaluator::SerialEvaluator;
use crate::solvers::nelder_mead::simplex::Simplex;
use crate::solvers::nelder_mead::NMCoefficients;
use crate::traits::{Cache, Function};
use search::cache_search::cache_search_candidates;
use search::int_line_search::IntegerLineSearch;
use search::nelder_mead_search::reflect_candidate;
use search::quad_model::ModelSearchProvider;
use search::speculative::SpeculativeSearch;
use search::SearchMethod;

/// Adapts an oracle defined over the full-dimension space to the sub-space
/// one fixed-variable `Mads` instance searches over: every call expands
/// the sub-space candidate back to full space before handing it to the
/// real oracle.
struct SubspaceProblem<'a, F: Function + Sync> {
    inner: &'a F,
    subproblem: &'a Subproblem,
}

impl<F: Function + Sync> Function for SubspaceProblem<'_, F> {
    type Error = F::Error;

    fn evaluate(&self, x: &AoD) -> Result<AoD, Self::Error> {
        let full = self.subproblem.to_full_space(x);
        self.inner.evaluate(full.coords())
    }
}

const ANISOTROPY_FACTOR: f64 = 0.1;

/// MADS configuration and run driver over a [`VariableSpace`].
pub struct Mads {
    space: VariableSpace,
    norm: HNorm,
    opportunistic: bool,
    speculative: Option<SpeculativeSearch>,
    cache_search: bool,
    int_line_search: Option<IntegerLineSearch>,
    quad_model: Option<Box<dyn ModelSearchProvider>>,
    nm_search: Option<(NMCoefficients, f64)>,
    anisotropic_mesh: bool,
}

/// `NM_SIMPLEX_INCLUDE_FACTOR` default: the initial NM-Search simplex edge
/// length, expressed as a multiple of the current poll frame size, when
/// [`Mads::with_nelder_mead_search`] is given no explicit
/// `NM_SIMPLEX_INCLUDE_LENGTH`.
pub const NM_SIMPLEX_INCLUDE_FACTOR_DEFAULT: f64 = 1.0;

impl Mads {
    pub fn new(space: VariableSpace, norm: HNorm) -> Self {
        Mads {
            space,
            norm,
            opportunistic: true,
            speculative: None,
            cache_search: false,
            int_line_search: None,
            quad_model: None,
            nm_search: None,
            anisotropic_mesh: true,
        }
    }

    pub fn with_opportunistic(mut self, opportunistic: bool) -> Self {
        self.opportunistic = opportunistic;
        self
    }

    pub fn with_speculative_search(mut self, base_factor: f64) -> Self {
        self.speculative = Some(SpeculativeSearch::new(base_factor));
        self
    }

    /// Enables cache search: each megaiteration, cached points already
    /// dominating the current incumbents are proposed directly, without a
    /// further oracle call.
    pub fn with_cache_search(mut self, enabled: bool) -> Self {
        self.cache_search = enabled;
        self
    }

    /// Enables the integer expansion line search, active only once the
    /// driver has a predecessor and at least one integer/binary
    /// coordinate.
    pub fn with_integer_line_search(mut self, search: IntegerLineSearch) -> Self {
        self.int_line_search = Some(search);
        self
    }

    /// Installs a quadratic-model candidate provider: a separate module
    /// produces candidates and the core only routes them through the
    /// trial-point path.
    pub fn with_quad_model_search(mut self, provider: Box<dyn ModelSearchProvider>) -> Self {
        self.quad_model = Some(provider);
        self
    }

    /// Enables Nelder-Mead as a MADS Search method: one reflective step per
    /// megaiteration against a simplex maintained across iterations, shrink
    /// disabled. `edge_factor` is
    /// `NM_SIMPLEX_INCLUDE_FACTOR`, the initial simplex's edge length as a
    /// multiple of the current poll frame size.
    pub fn with_nelder_mead_search(mut self, coeffs: NMCoefficients) -> Self {
        self.nm_search = Some((coeffs, NM_SIMPLEX_INCLUDE_FACTOR_DEFAULT));
        self
    }

    /// As [`Self::with_nelder_mead_search`], but with an explicit
    /// `NM_SIMPLEX_INCLUDE_FACTOR`/`NM_SIMPLEX_INCLUDE_LENGTH`-style edge
    /// factor instead of the default.
    pub fn with_nelder_mead_search_edge_factor(mut self, coeffs: NMCoefficients, edge_factor: f64) -> Self {
        self.nm_search = Some((coeffs, edge_factor));
        self
    }

    /// Builds a driver configured from a typed [`crate::core::parameters::Parameters`]
    /// set rather than positional arguments.
    pub fn from_parameters(params: &crate::core::parameters::Parameters) -> Self {
        let mut mads = Mads::new(params.variable_space.clone(), params.h_norm)
            .with_opportunistic(params.opportunistic_eval)
            .with_speculative_search(params.speculative_search_base_factor);
        if params.nm_search {
            mads = mads.with_nelder_mead_search(params.nm_coefficients);
        }
        if params.quad_model_search {
            mads = mads.with_quad_model_search(Box::new(search::quad_model::NoOpQuadModel));
        }
        mads
    }

    /// Runs [`Self::minimize`] with every argument taken from a validated
    /// [`crate::core::parameters::Parameters`] set. Callers must have
    /// already run `Parameters::check_and_comply` — this does not
    /// re-validate, matching the parameter layer's own split between a
    /// hard `Result` failure at validation time and algorithmic stop
    /// conditions that only ever travel as `Summary`/`StopReason`.
    pub fn minimize_with_parameters(&self, problem: &(impl Function + Sync), params: &crate::core::parameters::Parameters) -> Summary {
        self.minimize(
            problem,
            &params.x0,
            params.resolved_initial_frame(),
            params.min_mesh_size.clone(),
            params.min_frame_size.clone(),
            params.h_max_0,
            params.max_bb_eval.expect("check_and_comply guarantees MAX_BB_EVAL is set"),
        )
    }

    /// Runs megaiterations from `x0` until a [`StopReason`] fires.
    pub fn minimize(
        &self,
        problem: &(impl Function + Sync),
        x0: &AoD,
        initial_frame: AoD,
        min_mesh: AoD,
        min_frame: AoD,
        h_max_0: D,
        max_bb_eval: usize,
    ) -> Summary {
        self.minimize_in_current_space(problem, x0, initial_frame, min_mesh, min_frame, h_max_0, max_bb_eval)
    }

    /// Runs megaiterations within the sub-space `subproblem` carves out of
    /// `problem`'s full-dimension domain. `self`'s `space`
    /// (bounds/granularity/input types) and `x0_sub` must already be
    /// expressed in that sub-space; `subproblem` expands every candidate
    /// back to full space before the oracle sees it.
    pub fn minimize_subproblem(
        &self,
        problem: &(impl Function + Sync),
        x0_sub: &AoD,
        subproblem: &Subproblem,
        initial_frame: AoD,
        min_mesh: AoD,
        min_frame: AoD,
        h_max_0: D,
        max_bb_eval: usize,
    ) -> Summary {
        let adapter = SubspaceProblem { inner: problem, subproblem };
        self.minimize_in_current_space(&adapter, x0_sub, initial_frame, min_mesh, min_frame, h_max_0, max_bb_eval)
    }

    fn minimize_in_current_space(
        &self,
        problem: &(impl Function + Sync),
        x0: &AoD,
        initial_frame: AoD,
        min_mesh: AoD,
        min_frame: AoD,
        h_max_0: D,
        max_bb_eval: usize,
    ) -> Summary {
        let mut mesh = GMesh::initial(
            &self.space.lb,
            &self.space.ub,
            x0,
            self.space.granularity.clone(),
            Some(initial_frame),
            None,
            min_mesh,
            min_frame,
        );
        let mut barrier = ProgressiveBarrier::new(h_max_0);
        let cache = InMemoryCache::new();
        let evaluator = SerialEvaluator::new(problem, self.norm);

        let mut bb_evals = 0usize;
        let mut megaiterations = 0usize;

        let mut initial_set = TrialPointSet::new();
        initial_set.insert_trial_point(Point::new(x0.clone()), None, StepTag::Initial, None);
        initial_set.eval_trial_points(&evaluator, false);
        bb_evals += initial_set.len();
        let (_, _) = initial_set.post_processing(&mut barrier, x0, self.norm);

        let mut frame_center = barrier
            .current_incumbent_feas()
            .or_else(|| barrier.current_incumbent_inf())
            .map(|e| e.x.coords().clone())
            .unwrap_or_else(|| x0.clone());
        let mut predecessor: Option<AoD> = None;
        let mut nm_simplex: Option<Simplex> = None;

        // Pulls cached outcomes in place, dispatches whatever is left
        // pending to the oracle, and records every freshly-`ok` point in
        // the cache. Shared by the Search and Poll phases below.
        let dispatch = |set: &mut TrialPointSet| -> usize {
            let pts = set.points_mut();
            for p in pts.iter_mut() {
                if let Some(cached) = cache.find(&p.x) {
                    *p = cached;
                }
            }
            pts.sort_by_key(|p| p.eval_status == crate::core::eval_point::EvalStatus::Ok);
            let pending = pts.iter().filter(|p| p.eval_status != crate::core::eval_point::EvalStatus::Ok).count();
            crate::traits::EvaluatorPool::evaluate_block(&evaluator, &mut pts[..pending], self.opportunistic)
                .expect("reference evaluators do not fail outright");
            for p in set.points().iter().filter(|p| p.is_ok()) {
                cache.insert(p.clone());
            }
            pending
        };

        let stop = loop {
            if bb_evals >= max_bb_eval {
                break StopReason::MaxBbEvalReached;
            }
            if mesh.stop_when() {
                break StopReason::MeshStop;
            }

            let search_ctx = search::SearchContext {
                frame_center: &frame_center,
                predecessor: predecessor.as_ref(),
                mesh: &mesh,
                lb: &self.space.lb,
                ub: &self.space.ub,
                input_type: &self.space.input_type,
            };

            // Search runs first; Poll is generated only if Search did not
            // reach a full success.
            let mut search_set = TrialPointSet::new();
            let mut spec_pair: Option<(AoD, AoD)> = None;
            let frame_center_f0 = barrier
                .current_incumbent_feas()
                .into_iter()
                .chain(barrier.current_incumbent_inf())
                .find(|e| e.x.coords() == &frame_center)
                .map(|e| e.f.to_f64());
            if let Some(spec_search) = &self.speculative {
                let candidates = spec_search.generate_trial_points_final(&search_ctx);
                let mut snapped = Vec::with_capacity(candidates.len());
                for cand in &candidates {
                    if let Some(p) = search_set.snap_to_bounds_and_project(cand, &self.space.lb, &self.space.ub, &frame_center, &mesh) {
                        search_set.insert_trial_point(
                            Point::new(p.clone()),
                            Some(Point::new(frame_center.clone())),
                            StepTag::Search(crate::core::eval_point::SearchKind::Speculative),
                            None,
                        );
                        snapped.push(p);
                    }
                }
                // Only a fresh doubling/halving pair gives the (f0,fu,fv)
                // triple the quadratic fit needs; a single fit-refinement
                // candidate leaves history untouched until the next pair.
                if candidates.len() == 2 && snapped.len() == 2 {
                    spec_pair = Some((snapped[0].clone(), snapped[1].clone()));
                } else if candidates.len() == 2 {
                    spec_search.clear();
                }
            }
            if let Some(int_search) = &self.int_line_search {
                for cand in int_search.generate_trial_points_final(&search_ctx) {
                    if let Some(p) = search_set.snap_to_bounds_and_project(&cand, &self.space.lb, &self.space.ub, &frame_center, &mesh) {
                        search_set.insert_trial_point(
                            Point::new(p),
                            Some(Point::new(frame_center.clone())),
                            StepTag::Search(crate::core::eval_point::SearchKind::IntegerLineSearch),
                            None,
                        );
                    }
                }
            }
            if let Some(provider) = &self.quad_model {
                for cand in provider.propose(&search_ctx) {
                    if let Some(p) = search_set.snap_to_bounds_and_project(&cand, &self.space.lb, &self.space.ub, &frame_center, &mesh) {
                        search_set.insert_trial_point(
                            Point::new(p),
                            Some(Point::new(frame_center.clone())),
                            StepTag::Search(crate::core::eval_point::SearchKind::QuadModel),
                            None,
                        );
                    }
                }
            }
            if self.cache_search {
                let incumbents: Vec<_> = barrier.feasible_incumbents().iter().chain(barrier.infeasible_incumbents()).cloned().collect();
                for dominator in cache_search_candidates(&cache, &incumbents) {
                    search_set.insert_evaluated(dominator);
                }
            }

            // Nelder-Mead Search: no live simplex yet, so seed one from the
            // frame center plus one axis-aligned vertex per free
            // coordinate; once a simplex exists, propose its single
            // reflection candidate instead.
            let mut nm_seed_vertices: Vec<AoD> = Vec::new();
            let mut nm_reflect_candidate: Option<AoD> = None;
            if let Some((_, edge_factor)) = &self.nm_search {
                match &nm_simplex {
                    None => {
                        let n = frame_center.len();
                        nm_seed_vertices.push(frame_center.clone());
                        for i in 0..n {
                            let edge = mesh.frame(i).to_f64() * edge_factor;
                            let mut coords = frame_center.clone();
                            coords.set(i, coords[i] + D::Value(edge));
                            nm_seed_vertices.push(coords.snap_to_bounds(&self.space.lb, &self.space.ub));
                        }
                        for v in &nm_seed_vertices {
                            search_set.insert_trial_point(
                                Point::new(v.clone()),
                                Some(Point::new(frame_center.clone())),
                                StepTag::Search(crate::core::eval_point::SearchKind::NelderMead),
                                None,
                            );
                        }
                    }
                    Some(simplex) => {
                        if let Some(candidate) = reflect_candidate(simplex).into_iter().next() {
                            if let Some(p) = search_set.snap_to_bounds_and_project(&candidate, &self.space.lb, &self.space.ub, &frame_center, &mesh) {
                                search_set.insert_trial_point(
                                    Point::new(p.clone()),
                                    Some(Point::new(frame_center.clone())),
                                    StepTag::Search(crate::core::eval_point::SearchKind::NelderMead),
                                    None,
                                );
                                nm_reflect_candidate = Some(p);
                            }
                        }
                    }
                }
            }

            let mut search_success = SuccessType::Unsuccessful;
            let mut search_direction: Option<AoD> = None;
            if !search_set.is_empty() {
                bb_evals += dispatch(&mut search_set);

                // Build or advance the NM-Search simplex before post
                // processing clears this phase's trial points. Shrink is
                // disabled here, so a failed insertion just leaves the
                // simplex untouched for next time.
                if self.nm_search.is_some() {
                    if !nm_seed_vertices.is_empty() {
                        let vertices: Vec<_> = nm_seed_vertices
                            .iter()
                            .filter_map(|v| search_set.points().iter().find(|p| p.x.coords() == v).cloned())
                            .collect();
                        if vertices.len() == nm_seed_vertices.len() && vertices.iter().all(|p| p.is_ok()) {
                            let candidate_simplex = Simplex::new(vertices);
                            if candidate_simplex.is_full_rank() {
                                nm_simplex = Some(candidate_simplex);
                            }
                        }
                    } else if let (Some(simplex), Some(candidate_x)) = (&nm_simplex, &nm_reflect_candidate) {
                        if let Some(candidate_ep) = search_set.points().iter().find(|p| p.x.coords() == candidate_x && p.is_ok()) {
                            if let Some(new_simplex) = simplex.try_insert(candidate_ep.clone()) {
                                nm_simplex = Some(new_simplex);
                            }
                        }
                    }
                }

                let spec_outcome = spec_pair.as_ref().and_then(|(u, v)| {
                    let fu = search_set.points().iter().find(|p| p.x.coords() == u && p.is_ok())?.f.to_f64();
                    let fv = search_set.points().iter().find(|p| p.x.coords() == v && p.is_ok())?.f.to_f64();
                    Some((fu, fv))
                });

                let (s, d) = search_set.post_processing(&mut barrier, &frame_center, self.norm);
                search_success = s;
                search_direction = d;

                if let (Some(spec_search), Some((fu, fv)), Some(f0), Some(predecessor)) =
                    (&self.speculative, spec_outcome, frame_center_f0, predecessor.as_ref())
                {
                    let d = predecessor.vectorize(&frame_center);
                    spec_search.observe(d, f0, fu, fv, search_success == SuccessType::Full);
                } else if spec_pair.is_some() {
                    if let Some(spec_search) = &self.speculative {
                        spec_search.clear();
                    }
                }
            }

            let (success, direction) = if search_success == SuccessType::Full {
                (search_success, search_direction)
            } else {
                let mut poll_set = TrialPointSet::new();
                for poll_direction in poll::poll_trial_points(&mesh, &frame_center) {
                    if let Some(p) = poll_set.snap_to_bounds_and_project(&poll_direction, &self.space.lb, &self.space.ub, &frame_center, &mesh) {
                        poll_set.insert_trial_point(Point::new(p), Some(Point::new(frame_center.clone())), StepTag::Poll, None);
                    }
                }

                if poll_set.is_empty() {
                    break StopReason::MeshStop;
                }

                bb_evals += dispatch(&mut poll_set);
                let (poll_success, poll_direction) = poll_set.post_processing(&mut barrier, &frame_center, self.norm);
                (std::cmp::max(search_success, poll_success), poll_direction)
            };
            megaiterations += 1;

            match success {
                SuccessType::Full => {
                    if let Some(d) = direction {
                        mesh.enlarge(&d, ANISOTROPY_FACTOR, self.anisotropic_mesh);
                    }
                    if let Some(h2) = barrier.worst_h_below_current() {
                        barrier.set_h_max(h2);
                    }
                    predecessor = Some(frame_center.clone());
                    frame_center = barrier
                        .current_incumbent_feas()
                        .or_else(|| barrier.current_incumbent_inf())
                        .map(|e| e.x.coords().clone())
                        .unwrap_or(frame_center);
                }
                SuccessType::Partial => {
                    if let Some(h2) = barrier.worst_h_below_current() {
                        barrier.set_h_max(h2);
                    }
                    mesh.refine();
                }
                SuccessType::Unsuccessful => {
                    mesh.refine();
                }
            }
        };

        self.summary(&barrier, &mesh, x0, bb_evals, cache.nb_cache_hits(), megaiterations, stop)
    }

    fn summary(
        &self,
        barrier: &ProgressiveBarrier,
        mesh: &GMesh,
        x0: &AoD,
        bb_evals: usize,
        cache_hits: usize,
        megaiterations: usize,
        reason: StopReason,
    ) -> Summary {
        let best = barrier.current_incumbent_feas().or_else(|| barrier.current_incumbent_inf());
        let (x, fx, h, feasible) = match best {
            Some(e) => (
                e.x.coords().iter().map(|d| d.to_f64()).collect(),
                e.f.to_f64(),
                e.h.to_f64().max(0.0),
                e.is_feasible(),
            ),
            None => (Vec::new(), D::Undefined.to_f64(), f64::INFINITY, false),
        };
        Summary {
            parameter_names: None,
            message: Summary::stop_reason_message(reason),
            x0: x0.iter().map(|d| d.to_f64()).collect(),
            x,
            fx,
            h,
            h_max: barrier.h_max().to_f64(),
            mesh_size: (0..mesh.dimension()).map(|i| mesh.mesh(i).to_f64()).collect(),
            bb_evals,
            cache_hits,
            megaiterations,
            feasible,
        }
    }
}
