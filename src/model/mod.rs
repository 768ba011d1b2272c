//! Model Assembly
//!
//! An [`Assembly`] collects the structural description of the soil column one piece at a
//! time, each step consuming the previous value and returning a new one. Measured overrides
//! (initial heads, root-stress coefficients, groundwater head) are applied after the structure
//! they patch has been registered. [`Assembly::finish`] checks the whole description and
//! produces the immutable [`Model`] handed to the solver.

pub mod atmosphere;
pub mod material;
pub mod profile;
pub mod uptake;

use {
    crate::{
        error::{Error, Result},
        parameters::ModelInfo,
        table::Table,
    },
    atmosphere::Atmosphere,
    material::{Material, MaterialTable},
    profile::Profile,
    uptake::RootUptake,
};

/// Top boundary codes served from the atmospheric file
const ATMOSPHERIC_TOP: [u8; 4] = [2, 3, 4, 5];
/// Bottom boundary codes served from the atmospheric file
const ATMOSPHERIC_BOTTOM: [u8; 2] = [2, 3];
const SUPPORTED_BOTTOM: [u8; 6] = [0, 1, 2, 3, 4, 6];

/// Depth at which the solver reports state time series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationNode {
    pub depth: f64,
    /// 1-based profile node index
    pub node: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    info: ModelInfo,
    materials: Option<MaterialTable>,
    profile: Option<Profile>,
    atmosphere: Option<Atmosphere>,
    observation_nodes: Vec<ObservationNode>,
    root_uptake: Option<RootUptake>,
}

/// Fully assembled model, frozen for solver invocation and result extraction
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub info: ModelInfo,
    pub materials: MaterialTable,
    pub profile: Profile,
    pub atmosphere: Option<Atmosphere>,
    pub observation_nodes: Vec<ObservationNode>,
    pub root_uptake: Option<RootUptake>,
}

impl Assembly {
    pub fn new(info: ModelInfo) -> Self {
        Assembly {
            info,
            materials: None,
            profile: None,
            atmosphere: None,
            observation_nodes: vec![],
            root_uptake: None,
        }
    }

    pub fn with_materials(self, materials: Vec<Material>) -> Result<Self> {
        Ok(Assembly {
            materials: Some(MaterialTable::new(materials)?),
            ..self
        })
    }

    /// Registers the profile; every material it references must already be defined
    pub fn with_profile(self, profile: Profile) -> Result<Self> {
        let materials = self
            .materials
            .as_ref()
            .ok_or_else(|| Error::config("materials must be registered before the profile"))?;

        if let Some(id) = profile
            .material_ids()
            .into_iter()
            .find(|id| materials.get(*id).is_none())
        {
            return Err(Error::config(format!(
                "profile references material {} but only {} are defined",
                id,
                materials.len()
            )));
        }

        Ok(Assembly {
            profile: Some(profile),
            ..self
        })
    }

    /// Overrides the initial head of every profile node
    pub fn with_initial_heads(self, heads: &[f64]) -> Result<Self> {
        let profile = self.take_profile("initial heads")?.with_heads(heads)?;
        Ok(Assembly {
            profile: Some(profile),
            ..self
        })
    }

    /// Overrides the root-stress coefficient of every profile node
    pub fn with_beta(self, beta: &[f64]) -> Result<Self> {
        let profile = self.take_profile("beta")?.with_beta(beta)?;
        Ok(Assembly {
            profile: Some(profile),
            ..self
        })
    }

    pub fn with_atmosphere(self, atmosphere: Atmosphere) -> Result<Self> {
        Ok(Assembly {
            atmosphere: Some(atmosphere),
            ..self
        })
    }

    /// Overrides the lower-boundary head of the registered atmosphere
    pub fn with_bottom_head(self, series: &Table) -> Result<Self> {
        let atmosphere = self
            .atmosphere
            .clone()
            .ok_or_else(|| {
                Error::config("atmosphere must be registered before the bottom head series")
            })?
            .with_bottom_head(series)?;

        Ok(Assembly {
            atmosphere: Some(atmosphere),
            ..self
        })
    }

    /// Resolves each depth to its nearest profile node, keeping the given order
    pub fn with_observation_depths(self, depths: &[f64]) -> Result<Self> {
        let profile = self.take_profile("observation depths")?;

        let mut observation_nodes: Vec<ObservationNode> = vec![];
        for &depth in depths {
            let node = profile.nearest_node(depth).ok_or_else(|| {
                Error::config(format!("observation depth {} is outside the profile", depth))
            })?;

            if let Some(other) = observation_nodes.iter().find(|o| o.node == node) {
                return Err(Error::config(format!(
                    "observation depths {} and {} both resolve to node {}",
                    other.depth, depth, node
                )));
            }

            observation_nodes.push(ObservationNode { depth, node });
        }

        Ok(Assembly {
            observation_nodes,
            ..self
        })
    }

    pub fn with_root_uptake(self, root_uptake: RootUptake) -> Result<Self> {
        let materials = self.materials.as_ref().ok_or_else(|| {
            Error::config("materials must be registered before root uptake")
        })?;
        root_uptake.check(materials.len())?;

        Ok(Assembly {
            root_uptake: Some(root_uptake),
            ..self
        })
    }

    fn take_profile(&self, what: &str) -> Result<Profile> {
        self.profile.clone().ok_or_else(|| {
            Error::config(format!("profile must be registered before {}", what))
        })
    }

    /// Checks the complete description and freezes it
    pub fn finish(self) -> Result<Model> {
        let materials = self
            .materials
            .ok_or_else(|| Error::config("no materials registered"))?;
        let profile = self
            .profile
            .ok_or_else(|| Error::config("no profile registered"))?;

        let referenced = profile.material_ids();
        if let Some(id) = materials.ids().find(|id| !referenced.contains(id)) {
            return Err(Error::config(format!(
                "material {} is defined but not used by the profile",
                id
            )));
        }

        let flow = &self.info.water_flow;
        if flow.top_boundary > 5 {
            return Err(Error::config(format!(
                "unknown top boundary condition {}",
                flow.top_boundary
            )));
        }
        if !SUPPORTED_BOTTOM.contains(&flow.bottom_boundary) {
            return Err(Error::config(format!(
                "unsupported bottom boundary condition {}",
                flow.bottom_boundary
            )));
        }

        let needs_atmosphere = ATMOSPHERIC_TOP.contains(&flow.top_boundary)
            || ATMOSPHERIC_BOTTOM.contains(&flow.bottom_boundary);

        match &self.atmosphere {
            None if needs_atmosphere => {
                return Err(Error::config(format!(
                    "boundary conditions {}/{} need atmospheric forcing",
                    flow.top_boundary, flow.bottom_boundary
                )))
            }
            Some(atmosphere) => {
                let times = atmosphere.times();
                let last = times[times.len() - 1];
                if last < self.info.time.maximum {
                    return Err(Error::config(format!(
                        "atmospheric forcing ends at {} before the simulation end {}",
                        last, self.info.time.maximum
                    )));
                }
            }
            None => (),
        }

        Ok(Model {
            info: self.info,
            materials,
            profile,
            atmosphere: self.atmosphere,
            observation_nodes: self.observation_nodes,
            root_uptake: self.root_uptake,
        })
    }
}

impl Model {
    /// Observation node indices in registration order
    pub fn observation_indices(&self) -> Vec<usize> {
        self.observation_nodes.iter().map(|o| o.node).collect()
    }
}
