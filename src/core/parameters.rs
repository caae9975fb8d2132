use super::units::{lerp, Erodibility, Height, Slope, UpliftRate};

/// The default time step (unit: yr).
const DEFAULT_TIME_STEP: f64 = 250_000.0;

/// The default value of the exponent `m` for calculating stream power.
const DEFAULT_M_EXP: f64 = 0.5;

/// Geological constants of the simulation.
/// The shape and scale of the terrain is determined by these values.
///
/// ### Properties
///  - `time_step` is the duration of one iteration (unit: yr).
///  - `min_uplift`/`max_uplift` bound the tectonic uplift rate
///    (unit: m/yr). A node's rate is the linear blend by its uplift
///    factor.
///  - `erodibility` is the stream-power constant `k`.
///  - `m_exp` is the drainage-area exponent of the stream-power law.
///  - `min_slope`/`max_slope` bound the thermal-shock slope limit
///    (unit: rad). A node's limit is the linear blend by its slope
///    factor.
#[derive(Debug, Clone)]
pub struct GeologyParameters {
    pub time_step: f64,
    pub min_uplift: UpliftRate,
    pub max_uplift: UpliftRate,
    pub erodibility: Erodibility,
    pub m_exp: f64,
    pub min_slope: Slope,
    pub max_slope: Slope,
}

impl Default for GeologyParameters {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            min_uplift: 0.0,
            max_uplift: 5.01e-4,
            erodibility: 5.61e-7,
            m_exp: DEFAULT_M_EXP,
            min_slope: 6.0_f64.to_radians(),
            max_slope: 58.0_f64.to_radians(),
        }
    }
}

impl GeologyParameters {
    /// Uplift rate for an uplift factor in [0, 1].
    pub fn uplift_for(&self, factor: f64) -> UpliftRate {
        lerp(self.min_uplift, self.max_uplift, factor)
    }

    /// Maximum stable slope for a slope factor in [0, 1].
    pub fn slope_for(&self, factor: f64) -> Slope {
        lerp(self.min_slope, self.max_slope, factor)
    }

    /// Rough upper bound of the relief the model converges to.
    pub fn estimated_max_height(&self) -> Height {
        2.244 * self.max_uplift / self.erodibility
    }
}
