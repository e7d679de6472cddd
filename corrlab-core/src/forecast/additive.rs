//! Additive trend + seasonality model.
//!
//! y(t) = a + b·t + Σ_seasonalities Σ_{k=1..K} [c_k sin(2πk·d/P) + s_k cos(2πk·d/P)]
//!
//! `d` is the date as days since 1970-01-01 and `t` is `d` rescaled to
//! [0, 1] over the fitted history. `y` is scaled by its largest absolute
//! value before fitting. Coefficients come from ridge-regularized least
//! squares; only the seasonal terms are penalized, which keeps the system
//! well-posed when a seasonality cannot be resolved at the data's sampling
//! rate (daily terms on daily data collapse onto the intercept).
//!
//! The uncertainty interval is `yhat ± z·σ`, where σ is the residual
//! standard deviation and z the two-sided normal quantile for
//! `interval_width`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::{
    ForecastError, ForecastRow, Forecaster, ForecasterFactory, Frequency,
};

/// (period in days, Fourier order)
const DAILY: (f64, usize) = (1.0, 4);
const WEEKLY: (f64, usize) = (7.0, 3);
const YEARLY: (f64, usize) = (365.25, 10);

/// Which seasonal components the model includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    pub daily: bool,
    pub weekly: bool,
    pub yearly: bool,
}

impl SeasonalityConfig {
    /// Daily component only.
    ///
    /// Inputs are daily trading closes: weekends are absent, so a weekly
    /// cycle is not generally identifiable, and a few years of history give
    /// too few cycles for a stable yearly component.
    pub fn daily_only() -> Self {
        Self {
            daily: true,
            weekly: false,
            yearly: false,
        }
    }

    fn components(&self) -> Vec<(f64, usize)> {
        [(self.daily, DAILY), (self.weekly, WEEKLY), (self.yearly, YEARLY)]
            .into_iter()
            .filter_map(|(on, c)| on.then_some(c))
            .collect()
    }
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self::daily_only()
    }
}

/// Model settings; also acts as the factory for per-instrument models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdditiveModelConfig {
    pub seasonality: SeasonalityConfig,
    /// Coverage of the uncertainty interval, in (0, 1).
    pub interval_width: f64,
    /// Ridge penalty on seasonal coefficients.
    pub seasonal_ridge: f64,
}

impl Default for AdditiveModelConfig {
    fn default() -> Self {
        Self {
            seasonality: SeasonalityConfig::daily_only(),
            interval_width: 0.8,
            seasonal_ridge: 1e-3,
        }
    }
}

impl ForecasterFactory for AdditiveModelConfig {
    fn build(&self) -> Box<dyn Forecaster> {
        Box::new(AdditiveModel::new(*self))
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    history: Vec<NaiveDate>,
    t0: f64,
    t_span: f64,
    y_scale: f64,
    coef: Vec<f64>,
    /// Residual standard deviation, in original units.
    sigma: f64,
}

#[derive(Debug, Clone)]
pub struct AdditiveModel {
    config: AdditiveModelConfig,
    fitted: Option<Fitted>,
}

impl AdditiveModel {
    pub fn new(config: AdditiveModelConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Residual standard deviation of the last fit.
    pub fn sigma(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.sigma)
    }

    fn features(&self, day: f64, t0: f64, t_span: f64) -> Vec<f64> {
        let mut row = vec![1.0, (day - t0) / t_span];
        for (period, order) in self.config.seasonality.components() {
            for k in 1..=order {
                let angle = 2.0 * std::f64::consts::PI * k as f64 * day / period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    fn z_score(&self) -> Result<f64, ForecastError> {
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| ForecastError::NumericalError(e.to_string()))?;
        Ok(normal.inverse_cdf(0.5 + self.config.interval_width / 2.0))
    }
}

impl Forecaster for AdditiveModel {
    fn fit(&mut self, dates: &[NaiveDate], values: &[f64]) -> Result<(), ForecastError> {
        if dates.len() != values.len() {
            return Err(ForecastError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        let n = values.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData {
                required: 2,
                actual: n,
            });
        }

        let days: Vec<f64> = dates.iter().map(|d| day_number(*d)).collect();
        let t0 = days[0];
        let t_span = (days[n - 1] - t0).max(1.0);
        let y_scale = match values.iter().fold(0.0_f64, |m, v| m.max(v.abs())) {
            m if m > 0.0 => m,
            _ => 1.0,
        };

        let rows: Vec<Vec<f64>> = days.iter().map(|d| self.features(*d, t0, t_span)).collect();
        let p = rows[0].len();

        // Normal equations: (XᵀX + λD) β = Xᵀy, D penalizing seasonal terms only
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, y) in rows.iter().zip(values) {
            let y = y / y_scale;
            for i in 0..p {
                xty[i] += row[i] * y;
                for j in 0..=i {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                xtx[j][i] = xtx[i][j];
            }
            if i >= 2 {
                xtx[i][i] += self.config.seasonal_ridge;
            }
        }

        let coef = solve_spd(xtx, xty).ok_or_else(|| {
            ForecastError::NumericalError("normal equations are singular".to_string())
        })?;

        let sse: f64 = rows
            .iter()
            .zip(values)
            .map(|(row, y)| {
                let fit: f64 = row.iter().zip(&coef).map(|(x, b)| x * b).sum();
                (y / y_scale - fit).powi(2)
            })
            .sum();
        let sigma = (sse / (n - 1) as f64).sqrt() * y_scale;

        self.fitted = Some(Fitted {
            history: dates.to_vec(),
            t0,
            t_span,
            y_scale,
            coef,
            sigma,
        });
        Ok(())
    }

    fn predict(
        &self,
        periods: usize,
        frequency: Frequency,
    ) -> Result<Vec<ForecastRow>, ForecastError> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        let half_width = self.z_score()? * fitted.sigma;

        let last = *fitted.history.last().ok_or(ForecastError::NotFitted)?;
        let future = (1..=periods).map(|i| last + frequency.step() * i as i32);

        let rows = fitted
            .history
            .iter()
            .copied()
            .chain(future)
            .map(|date| {
                let x = self.features(day_number(date), fitted.t0, fitted.t_span);
                let yhat = x.iter().zip(&fitted.coef).map(|(x, b)| x * b).sum::<f64>()
                    * fitted.y_scale;
                ForecastRow {
                    date,
                    yhat,
                    yhat_lower: yhat - half_width,
                    yhat_upper: yhat + half_width,
                }
            })
            .collect();
        Ok(rows)
    }
}

/// Days since 1970-01-01.
fn day_number(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// Solve `a·x = b` for symmetric positive-definite `a` by Cholesky decomposition.
fn solve_spd(mut a: Vec<Vec<f64>>, b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    // In-place lower-triangular factor L with a = L·Lᵀ
    for j in 0..n {
        let diag = a[j][j] - (0..j).map(|k| a[j][k] * a[j][k]).sum::<f64>();
        if diag <= 1e-14 || !diag.is_finite() {
            return None;
        }
        let l_jj = diag.sqrt();
        a[j][j] = l_jj;
        for i in (j + 1)..n {
            let s = a[i][j] - (0..j).map(|k| a[i][k] * a[j][k]).sum::<f64>();
            a[i][j] = s / l_jj;
        }
    }

    // Forward: L·z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let s = b[i] - (0..i).map(|k| a[i][k] * z[k]).sum::<f64>();
        z[i] = s / a[i][i];
    }

    // Backward: Lᵀ·x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let s = z[i] - ((i + 1)..n).map(|k| a[k][i] * x[k]).sum::<f64>();
        x[i] = s / a[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::assert_approx;

    fn days(n: usize) -> Vec<NaiveDate> {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n)
            .map(|i| base + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn recovers_linear_trend() {
        let dates = days(40);
        let values: Vec<f64> = (0..40).map(|i| 100.0 + 0.5 * i as f64).collect();
        let mut model = AdditiveModel::new(AdditiveModelConfig::default());
        model.fit(&dates, &values).unwrap();

        let rows = model.predict(1, Frequency::Daily).unwrap();
        assert_eq!(rows.len(), 41);
        let next = rows[40];
        assert_eq!(next.date, dates[39] + chrono::Duration::days(1));
        assert_approx(next.yhat, 120.0, 1e-3);
        assert!(model.sigma().unwrap() < 1e-3);
    }

    #[test]
    fn interval_brackets_estimate() {
        let dates = days(30);
        let values: Vec<f64> = (0..30)
            .map(|i| 50.0 + (i as f64 * 0.9).sin() * 3.0)
            .collect();
        let mut model = AdditiveModel::new(AdditiveModelConfig::default());
        model.fit(&dates, &values).unwrap();
        for row in model.predict(1, Frequency::Daily).unwrap() {
            assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
            assert!(row.yhat.is_finite());
        }
    }

    #[test]
    fn weekly_component_captures_weekly_cycle() {
        let dates = days(70);
        let pattern = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0];
        let values: Vec<f64> = dates
            .iter()
            .map(|d| 10.0 + pattern[(day_number(*d) as usize) % 7])
            .collect();

        let mut with_weekly = AdditiveModel::new(AdditiveModelConfig {
            seasonality: SeasonalityConfig {
                daily: false,
                weekly: true,
                yearly: false,
            },
            ..AdditiveModelConfig::default()
        });
        with_weekly.fit(&dates, &values).unwrap();

        let mut trend_only = AdditiveModel::new(AdditiveModelConfig {
            seasonality: SeasonalityConfig {
                daily: false,
                weekly: false,
                yearly: false,
            },
            ..AdditiveModelConfig::default()
        });
        trend_only.fit(&dates, &values).unwrap();

        assert!(with_weekly.sigma().unwrap() < trend_only.sigma().unwrap() / 5.0);
    }

    #[test]
    fn wider_interval_for_higher_coverage() {
        let dates = days(30);
        let values: Vec<f64> = (0..30).map(|i| (i as f64 * 1.3).cos() * 4.0 + 20.0).collect();
        let narrow_cfg = AdditiveModelConfig {
            interval_width: 0.5,
            ..AdditiveModelConfig::default()
        };
        let wide_cfg = AdditiveModelConfig {
            interval_width: 0.95,
            ..AdditiveModelConfig::default()
        };
        let mut narrow = narrow_cfg.build();
        let mut wide = wide_cfg.build();
        narrow.fit(&dates, &values).unwrap();
        wide.fit(&dates, &values).unwrap();
        let n = narrow.predict(1, Frequency::Daily).unwrap()[30];
        let w = wide.predict(1, Frequency::Daily).unwrap()[30];
        assert!((w.yhat_upper - w.yhat_lower) > (n.yhat_upper - n.yhat_lower));
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = AdditiveModel::new(AdditiveModelConfig::default());
        assert_eq!(
            model.predict(1, Frequency::Daily).unwrap_err(),
            ForecastError::NotFitted
        );
    }

    #[test]
    fn fit_needs_two_points() {
        let mut model = AdditiveModel::new(AdditiveModelConfig::default());
        assert!(matches!(
            model.fit(&days(1), &[1.0]),
            Err(ForecastError::InsufficientData { .. })
        ));
        assert!(matches!(
            model.fit(&days(2), &[1.0]),
            Err(ForecastError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn cholesky_solves_small_system() {
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let x = solve_spd(a, vec![2.0, 1.0]).unwrap();
        assert_approx(x[0], 0.5, 1e-12);
        assert_approx(x[1], 0.0, 1e-12);
        assert!(solve_spd(vec![vec![0.0]], vec![1.0]).is_none());
    }
}
