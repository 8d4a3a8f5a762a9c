//! Granular anisotropic mesh (`GMesh`): tracks a mesh size `delta` and a
//! frame size `Delta` per coordinate on a discrete `{1,2,5}` mantissa
//! ladder.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scalar::D;
use super::vector::AoD;

/// Mantissa ladder `{1,2,5}`; refining cycles it down, enlarging cycles it
/// up, crossing a power of ten at each wrap.
fn mantissa_down(m: i32) -> (i32, i32) {
    match m {
        5 => (2, 0),
        2 => (1, 0),
        1 => (5, -1),
        _ => (1, 0),
    }
}

fn mantissa_up(m: i32) -> (i32, i32) {
    match m {
        1 => (2, 0),
        2 => (5, 0),
        5 => (1, 1),
        _ => (1, 0),
    }
}

/// Per-coordinate granular mesh: mesh size `delta` and frame size `Delta`
/// stored as `(mantissa, exponent)` pairs on a discrete ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GMesh {
    n: usize,
    mantissa: Vec<i32>,
    exponent: Vec<i32>,
    init_exponent: Vec<i32>,
    granularity: AoD,
    min_mesh: AoD,
    min_frame: AoD,
}

fn to_ladder(x: f64) -> (i32, i32) {
    if x <= 0.0 || !x.is_finite() {
        return (1, 0);
    }
    let mut e = x.log10().floor() as i32;
    let mut m = x / 10f64.powi(e);
    // snap m to nearest of {1,2,5,10}
    let candidates = [1.0, 2.0, 5.0, 10.0];
    let mut best = candidates[0];
    let mut best_d = f64::MAX;
    for &c in &candidates {
        let d = (m - c).abs();
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    m = best;
    if (m - 10.0).abs() < 1e-12 {
        m = 1.0;
        e += 1;
    }
    (m.round() as i32, e)
}

impl GMesh {
    /// `initial(lb, ub, granularity, initial_frame, initial_mesh)`.
    /// Exactly one of `initial_frame`/`initial_mesh` may be
    /// supplied; specifying both is a caller error (checked by the
    /// parameter layer, not here — this constructor trusts its inputs).
    pub fn initial(
        lb: &AoD,
        ub: &AoD,
        x0: &AoD,
        granularity: AoD,
        initial_frame: Option<AoD>,
        initial_mesh: Option<AoD>,
        min_mesh: AoD,
        min_frame: AoD,
    ) -> GMesh {
        let n = granularity.len();
        let frame0: Vec<f64> = (0..n)
            .map(|i| {
                if let Some(f) = &initial_frame {
                    f[i].to_f64()
                } else if let Some(m) = &initial_mesh {
                    m[i].to_f64() * (n as f64).sqrt()
                } else if let (D::Value(l), D::Value(u)) = (lb[i], ub[i]) {
                    0.1 * (u - l)
                } else {
                    (x0[i].to_f64().abs() / 10.0).max(1.0)
                }
            })
            .collect();

        let mut mantissa = Vec::with_capacity(n);
        let mut exponent = Vec::with_capacity(n);
        for i in 0..n {
            let g = granularity[i].value().unwrap_or(0.0);
            let target = if g > 0.0 { frame0[i].max(g) } else { frame0[i] };
            let (m, e) = to_ladder(target);
            mantissa.push(m);
            exponent.push(e);
        }
        let init_exponent = exponent.clone();

        GMesh {
            n,
            mantissa,
            exponent,
            init_exponent,
            granularity,
            min_mesh,
            min_frame,
        }
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Raw frame size value, `Delta_i = granularity_i * m_i * 10^e_i` (or
    /// just `m_i * 10^e_i` when ungranular).
    fn frame_raw(&self, i: usize) -> f64 {
        let m = self.mantissa[i] as f64 * 10f64.powi(self.exponent[i]);
        match self.granularity[i] {
            D::Value(g) if g > 0.0 => g * m,
            _ => m,
        }
    }

    pub fn frame(&self, i: usize) -> D {
        D::Value(self.frame_raw(i))
    }

    /// Mesh size `delta_i = Delta_i * 10^-|e_i - e_i^0|`, floored at
    /// `granularity_i` when granular.
    pub fn mesh(&self, i: usize) -> D {
        let delta_exp = 10f64.powi(-(self.exponent[i] - self.init_exponent[i]).abs());
        let mut delta = self.frame_raw(i) * delta_exp;
        if let D::Value(g) = self.granularity[i] {
            if g > 0.0 {
                delta = delta.max(g);
            }
        }
        D::Value(delta)
    }

    pub fn frame_vec(&self) -> AoD {
        AoD((0..self.n).map(|i| self.frame(i)).collect())
    }

    pub fn mesh_vec(&self) -> AoD {
        AoD((0..self.n).map(|i| self.mesh(i)).collect())
    }

    /// Invoked on iteration failure: decrement the mantissa ladder on
    /// every coordinate, aggressive on reach, conservative on precision.
    pub fn refine(&mut self) {
        for i in 0..self.n {
            let (m, de) = mantissa_down(self.mantissa[i]);
            self.mantissa[i] = m;
            self.exponent[i] += de;
        }
        debug!(mantissa = ?self.mantissa, exponent = ?self.exponent, "mesh refined");
    }

    /// Invoked on success: enlarge mantissa ladder on coordinates along
    /// which `direction` has meaningful magnitude.
    pub fn enlarge(&mut self, direction: &AoD, anisotropy_factor: f64, anisotropic: bool) {
        assert_eq!(direction.len(), self.n);
        let ratios: Vec<f64> = (0..self.n)
            .map(|i| match direction[i] {
                D::Value(d) => d.abs() / self.frame_raw(i).max(f64::MIN_POSITIVE),
                D::Undefined => 0.0,
            })
            .collect();
        let max_ratio = ratios.iter().cloned().fold(0.0_f64, f64::max);

        for i in 0..self.n {
            let enlarge_i = if anisotropic {
                max_ratio > 0.0 && ratios[i] >= anisotropy_factor * max_ratio
            } else {
                true
            };
            if enlarge_i {
                let (m, de) = mantissa_up(self.mantissa[i]);
                self.mantissa[i] = m;
                self.exponent[i] += de;
                if de > 0 {
                    // Preserve delta <= Delta by also raising e_i^0.
                    self.init_exponent[i] += de;
                }
            }
        }
        debug!(mantissa = ?self.mantissa, exponent = ?self.exponent, "mesh enlarged");
    }

    /// Map a raw offset `l` on coordinate `i` to a mesh-aligned step of
    /// magnitude close to `l * Delta_i`, snapped to a multiple of
    /// `delta_i` and (if applicable) `granularity_i`.
    pub fn scale_and_project(&self, i: usize, l: f64) -> D {
        let target = l * self.frame_raw(i);
        let delta = self.mesh(i).to_f64();
        if delta <= 0.0 {
            return D::Value(target);
        }
        let mut snapped = (target / delta).round() * delta;
        if let D::Value(g) = self.granularity[i] {
            if g > 0.0 {
                snapped = (snapped / g).round() * g;
            }
        }
        D::Value(snapped)
    }

    /// Snap every coordinate of `p` onto `center + k*delta`, `k` integer,
    /// and onto the granularity ladder. Idempotent: re-projecting an
    /// already-projected point is a no-op.
    pub fn project_on_mesh(&self, p: &AoD, center: &AoD) -> AoD {
        assert_eq!(p.len(), self.n);
        assert_eq!(center.len(), self.n);
        let mut out = p.clone();
        for i in 0..self.n {
            let (D::Value(pv), D::Value(cv)) = (p[i], center[i]) else {
                continue;
            };
            let delta = self.mesh(i).to_f64();
            let mut v = if delta > 0.0 {
                cv + ((pv - cv) / delta).round() * delta
            } else {
                pv
            };
            if let D::Value(g) = self.granularity[i] {
                if g > 0.0 {
                    v = (v / g).round() * g;
                }
            }
            out.set(i, D::Value(v));
        }
        out
    }

    /// Terminal when, for all `i`, `delta_i <= minMesh_i` or
    /// `Delta_i <= minFrame_i`.
    pub fn stop_when(&self) -> bool {
        (0..self.n).all(|i| {
            let mesh_stop = match (self.mesh(i), self.min_mesh[i]) {
                (D::Value(d), D::Value(m)) => d <= m,
                _ => false,
            };
            let frame_stop = match (self.frame(i), self.min_frame[i]) {
                (D::Value(d), D::Value(m)) => d <= m,
                _ => false,
            };
            mesh_stop || frame_stop
        })
    }

    /// Sanity invariant: `delta_i <= Delta_i` for all coordinates.
    pub fn is_consistent(&self) -> bool {
        (0..self.n).all(|i| {
            let d = self.mesh(i).to_f64();
            let f = self.frame(i).to_f64();
            d <= f + 1e-9
        })
    }

    /// Captures the mesh's ladder state for hot restart.
    pub fn snapshot(&self) -> MeshSnapshot {
        MeshSnapshot {
            mantissa: self.mantissa.clone(),
            exponent: self.exponent.clone(),
            init_exponent: self.init_exponent.clone(),
            granularity: self.granularity.clone(),
            min_mesh: self.min_mesh.clone(),
            min_frame: self.min_frame.clone(),
        }
    }

    /// Rebuilds a mesh from a previously captured [`MeshSnapshot`].
    pub fn restore(snapshot: &MeshSnapshot) -> GMesh {
        GMesh {
            n: snapshot.granularity.len(),
            mantissa: snapshot.mantissa.clone(),
            exponent: snapshot.exponent.clone(),
            init_exponent: snapshot.init_exponent.clone(),
            granularity: snapshot.granularity.clone(),
            min_mesh: snapshot.min_mesh.clone(),
            min_frame: snapshot.min_frame.clone(),
        }
    }
}

/// Serializable snapshot of a mesh's mantissa/exponent ladder state for
/// hot restart, kept as a plain struct distinct from `GMesh` itself so
/// the wire shape survives internal refactors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub mantissa: Vec<i32>,
    pub exponent: Vec<i32>,
    pub init_exponent: Vec<i32>,
    pub granularity: AoD,
    pub min_mesh: AoD,
    pub min_frame: AoD,
}
