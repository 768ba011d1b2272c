use {
    crate::error::{Error, Result},
    serde::Deserialize,
};

/// Soil hydraulic parameters (van Genuchten-Mualem model)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Material {
    /// Residual water content [L³/L³]
    pub theta_r: f64,
    /// Saturated water content [L³/L³]
    pub theta_s: f64,
    /// Inverse air-entry value [1/L]
    pub alpha: f64,
    /// Pore-size distribution index [-]
    pub n: f64,
    /// Saturated hydraulic conductivity [L/T]
    pub k_s: f64,
    /// Pore-connectivity parameter [-]
    pub l: f64,
}

impl Material {
    pub fn new(theta_r: f64, theta_s: f64, alpha: f64, n: f64, k_s: f64, l: f64) -> Self {
        Material {
            theta_r,
            theta_s,
            alpha,
            n,
            k_s,
            l,
        }
    }

    pub fn values(&self) -> [f64; 6] {
        [
            self.theta_r,
            self.theta_s,
            self.alpha,
            self.n,
            self.k_s,
            self.l,
        ]
    }

    fn check(&self, id: usize) -> Result<()> {
        if !self.values().iter().all(|x| x.is_finite())
            || self.theta_r < 0.0
            || self.theta_s <= self.theta_r
            || self.alpha <= 0.0
            || self.n <= 1.0
            || self.k_s <= 0.0
        {
            return Err(Error::config(format!(
                "material {} has invalid hydraulic parameters {:?}",
                id,
                self.values()
            )));
        }
        Ok(())
    }
}

/// Materials addressed by 1-based ID
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable(Vec<Material>);

impl MaterialTable {
    pub fn new(materials: Vec<Material>) -> Result<Self> {
        if materials.is_empty() {
            return Err(Error::config("no materials defined"));
        }

        for (i, material) in materials.iter().enumerate() {
            material.check(i + 1)?;
        }

        Ok(MaterialTable(materials))
    }

    pub fn get(&self, id: usize) -> Option<&Material> {
        id.checked_sub(1).and_then(|i| self.0.get(i))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> {
        1..=self.0.len()
    }

    /// `(id, material)` pairs in ID order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Material)> {
        self.0.iter().enumerate().map(|(i, m)| (i + 1, m))
    }
}
