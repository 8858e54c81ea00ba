//! Implied Volatility Solver
//!
//! Inverts the Black-Scholes kernel with Brent's method: inverse quadratic
//! interpolation and secant steps inside a sign-changing bracket, with
//! bisection whenever the interpolated step would leave the bracket or
//! converge too slowly.
//!
//! The solver never fails for numeric input. A missing bracket or an
//! exhausted iteration budget is reported through [`IvStatus`] so callers can
//! substitute zero Greeks and keep going.

// Black-Scholes uses standard mathematical notation (s, k, t, r, q, sigma)
// Brent's method uses the textbook variable names (a, b, c, d, e, p)
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use serde::{Deserialize, Serialize};

use super::black_scholes::{discounted_intrinsic, price};
use crate::market::OptionKind;
use crate::observability::metrics::record_iv_solve;

/// Relative machine precision term in Brent's convergence test.
const BRENT_EPS: f64 = 1e-12;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for IV solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvSolverConfig {
    /// Convergence tolerance on volatility.
    pub tolerance: f64,
    /// Maximum Brent iterations.
    pub max_iterations: u32,
    /// Lower end of the initial bracket.
    pub min_vol: f64,
    /// Upper end of the initial bracket.
    pub max_vol: f64,
    /// How many times the upper bound may be doubled looking for a sign change.
    pub max_bracket_expansions: u32,
    /// Target prices are floored at intrinsic value plus this amount.
    pub price_floor_epsilon: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
            min_vol: 1e-4,
            max_vol: 5.0,
            max_bracket_expansions: 10,
            price_floor_epsilon: 1e-6,
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of an IV solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IvStatus {
    /// Converged within tolerance.
    Ok,
    /// Iteration budget exhausted; sigma is the last iterate.
    MaxIter,
    /// No sign change found; sigma is NaN.
    NoBracket,
}

impl IvStatus {
    /// Metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::MaxIter => "max_iter",
            Self::NoBracket => "no_bracket",
        }
    }
}

impl std::fmt::Display for IvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solved volatility with its status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvSolution {
    /// Implied volatility (NaN when no bracket was found).
    pub sigma: f64,
    /// Solver outcome.
    pub status: IvStatus,
    /// Iterations used, reported for converged solves.
    pub iterations: Option<u32>,
}

impl IvSolution {
    const fn no_bracket() -> Self {
        Self {
            sigma: f64::NAN,
            status: IvStatus::NoBracket,
            iterations: None,
        }
    }

    /// Whether the solve converged.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, IvStatus::Ok)
    }

    /// Sigma when converged and finite.
    #[must_use]
    pub fn converged_sigma(&self) -> Option<f64> {
        (self.is_ok() && self.sigma.is_finite()).then_some(self.sigma)
    }
}

// ============================================================================
// IV Solver
// ============================================================================

/// Implied Volatility Solver.
#[derive(Debug, Clone)]
pub struct IvSolver {
    config: IvSolverConfig,
}

impl Default for IvSolver {
    fn default() -> Self {
        Self::new(IvSolverConfig::default())
    }
}

impl IvSolver {
    /// Create a new IV solver with the given configuration.
    #[must_use]
    pub const fn new(config: IvSolverConfig) -> Self {
        Self { config }
    }

    /// Solver configuration.
    #[must_use]
    pub const fn config(&self) -> &IvSolverConfig {
        &self.config
    }

    /// Solve for implied volatility.
    ///
    /// # Arguments
    ///
    /// * `target_price` - Observed option price per share
    /// * `s` - Spot price
    /// * `k` - Strike price
    /// * `r` - Risk-free rate (continuous, annualized)
    /// * `q` - Dividend yield (continuous)
    /// * `t` - Time to expiration (years, ACT/365)
    /// * `kind` - Call or put
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &self,
        target_price: f64,
        s: f64,
        k: f64,
        r: f64,
        q: f64,
        t: f64,
        kind: OptionKind,
    ) -> IvSolution {
        let solution = self.solve_inner(target_price, s, k, r, q, t, kind);
        record_iv_solve(solution.status, solution.iterations);
        solution
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_inner(
        &self,
        target_price: f64,
        s: f64,
        k: f64,
        r: f64,
        q: f64,
        t: f64,
        kind: OptionKind,
    ) -> IvSolution {
        if !target_price.is_finite() {
            return IvSolution::no_bracket();
        }
        let floor = discounted_intrinsic(s, k, r, q, t, kind) + self.config.price_floor_epsilon;
        let target = target_price.max(floor);
        let objective = |sigma: f64| price(s, k, r, q, sigma, t, kind) - target;

        let Some((lo, hi, f_lo, f_hi)) = self.bracket(&objective) else {
            return IvSolution::no_bracket();
        };
        self.brent(&objective, lo, hi, f_lo, f_hi)
    }

    /// Find `[lo, hi]` with a sign change, doubling `hi` as needed.
    fn bracket(&self, f: &impl Fn(f64) -> f64) -> Option<(f64, f64, f64, f64)> {
        let lo = self.config.min_vol;
        let mut hi = self.config.max_vol;
        let f_lo = f(lo);
        let mut f_hi = f(hi);

        let mut expansions = 0;
        while f_lo * f_hi > 0.0 && expansions < self.config.max_bracket_expansions {
            hi *= 2.0;
            f_hi = f(hi);
            expansions += 1;
        }

        if !f_lo.is_finite() || !f_hi.is_finite() || f_lo * f_hi > 0.0 {
            return None;
        }
        Some((lo, hi, f_lo, f_hi))
    }

    /// Brent root finder on a valid bracket.
    ///
    /// `b` is the best estimate, `c` the contrapoint keeping the root
    /// bracketed and `a` the previous iterate.
    fn brent(
        &self,
        f: &impl Fn(f64) -> f64,
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    ) -> IvSolution {
        let tol = self.config.tolerance;
        let (mut a, mut b, mut c) = (lo, hi, hi);
        let (mut fa, mut fb, mut fc) = (f_lo, f_hi, f_hi);
        let mut d = b - a;
        let mut e = d;

        for iteration in 0..self.config.max_iterations {
            if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol1 = 2.0 * BRENT_EPS * b.abs() + 0.5 * tol;
            let xm = 0.5 * (c - b);
            if xm.abs() <= tol1 || fb == 0.0 {
                return IvSolution {
                    sigma: b,
                    status: IvStatus::Ok,
                    iterations: Some(iteration),
                };
            }

            if e.abs() >= tol1 && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // secant
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    // inverse quadratic interpolation
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * xm * q - (tol1 * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol1 {
                d
            } else {
                tol1.copysign(xm)
            };
            fb = f(b);
        }

        IvSolution {
            sigma: b,
            status: IvStatus::MaxIter,
            iterations: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
