use {
    crate::error::{Error, Result},
    serde::Deserialize,
};

/// Root water uptake parameters, passed to the solver unchanged
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RootUptake {
    /// Stress response model: 0 Feddes, 1 S-shape
    pub model: u8,
    /// Head above which uptake stops (anaerobiosis) [L]
    pub p0: f64,
    /// Head below which uptake declines at the high transpiration rate [L]
    pub p2h: f64,
    /// Head below which uptake declines at the low transpiration rate [L]
    pub p2l: f64,
    /// Wilting point head [L]
    pub p3: f64,
    /// High potential transpiration rate [L/T]
    pub r2h: f64,
    /// Low potential transpiration rate [L/T]
    pub r2l: f64,
    /// Optimal uptake head, one per material [L]
    pub poptm: Vec<f64>,
    /// Maximum allowed compensated uptake
    pub root_max: f64,
    /// Critical stress index for compensated uptake
    pub omega_c: f64,
}

impl Default for RootUptake {
    fn default() -> Self {
        RootUptake {
            model: 0,
            p0: -10.0,
            p2h: -200.0,
            p2l: -800.0,
            p3: -8000.0,
            r2h: 0.5,
            r2l: 5.8e-4,
            poptm: vec![-25.0; 4],
            root_max: 0.5,
            omega_c: 1.0,
        }
    }
}

impl RootUptake {
    /// Checks the threshold ordering and that every material has an optimal head
    pub fn check(&self, materials: usize) -> Result<()> {
        if self.model > 1 {
            return Err(Error::config(format!(
                "unknown root uptake model {}",
                self.model
            )));
        }

        if self.poptm.len() != materials {
            return Err(Error::config(format!(
                "root uptake has {} optimal heads for {} materials",
                self.poptm.len(),
                materials
            )));
        }

        for (i, poptm) in self.poptm.iter().enumerate() {
            if !(self.p0 > *poptm && *poptm > self.p2h) {
                return Err(Error::config(format!(
                    "optimal head {} of material {} is outside ({}, {})",
                    poptm,
                    i + 1,
                    self.p2h,
                    self.p0
                )));
            }
        }

        if !(self.p2h >= self.p2l && self.p2l > self.p3) {
            return Err(Error::config(format!(
                "root uptake heads must decrease: P2H {} P2L {} P3 {}",
                self.p2h, self.p2l, self.p3
            )));
        }

        Ok(())
    }
}
