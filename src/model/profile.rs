use {
    crate::{
        error::{Error, Result},
        parameters::ProfileLayout,
    },
    std::collections::BTreeSet,
};

/// Discretisation node of the soil column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Elevation relative to the land surface, negative downwards
    pub depth: f64,
    /// Initial pressure head
    pub head: f64,
    pub material: usize,
    /// Mass-balance subregion
    pub layer: usize,
    /// Root-stress coefficient
    pub beta: f64,
}

pub const DEFAULT_TEMPERATURE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    nodes: Vec<Node>,
}

impl Profile {
    /// Builds nodes from the surface down to the last layer bottom
    ///
    /// Each layer contributes nodes from its top (inclusive) to its bottom (exclusive) every
    /// `spacing`; the bottom of the last layer closes the column.
    pub fn create(layout: &ProfileLayout) -> Result<Self> {
        if layout.bottoms.is_empty() {
            return Err(Error::config("profile has no layers"));
        }

        if layout.bottoms.len() != layout.materials.len() {
            return Err(Error::config(format!(
                "profile has {} layer bottoms but {} layer materials",
                layout.bottoms.len(),
                layout.materials.len()
            )));
        }

        if !(layout.spacing > 0.0) {
            return Err(Error::config(format!(
                "profile spacing {} must be positive",
                layout.spacing
            )));
        }

        let mut nodes = vec![];
        let mut top = layout.top;

        for (layer, (&bottom, &material)) in layout
            .bottoms
            .iter()
            .zip(layout.materials.iter())
            .enumerate()
        {
            if !(bottom < top) {
                return Err(Error::config(format!(
                    "layer bottom {} is not below {}",
                    bottom, top
                )));
            }

            let count = ((top - bottom) / layout.spacing - 1e-9).ceil() as usize;

            nodes.extend((0..count).map(|k| Node {
                depth: top - k as f64 * layout.spacing,
                head: layout.initial_head,
                material,
                layer: layer + 1,
                beta: 0.0,
            }));

            top = bottom;
        }

        nodes.push(Node {
            depth: top,
            head: layout.initial_head,
            material: layout.materials[layout.materials.len() - 1],
            layer: layout.bottoms.len(),
            beta: 0.0,
        });

        Ok(Profile { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> f64 {
        self.nodes[0].depth - self.nodes[self.nodes.len() - 1].depth
    }

    pub fn layers(&self) -> usize {
        self.nodes.iter().map(|n| n.layer).max().unwrap_or(0)
    }

    /// Material IDs referenced by at least one node
    pub fn material_ids(&self) -> BTreeSet<usize> {
        self.nodes.iter().map(|n| n.material).collect()
    }

    /// 1-based index of the node closest to `depth`, the shallower one on ties
    pub fn nearest_node(&self, depth: f64) -> Option<usize> {
        let top = self.nodes.first()?.depth;
        let bottom = self.nodes.last()?.depth;
        if depth > top || depth < bottom {
            return None;
        }

        self.nodes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, n)| {
                let distance = (n.depth - depth).abs();
                match best {
                    Some((_, d)) if d <= distance => best,
                    _ => Some((i, distance)),
                }
            })
            .map(|(i, _)| i + 1)
    }

    /// Replaces the initial heads node by node
    pub fn with_heads(self, heads: &[f64]) -> Result<Self> {
        self.with_column("initial head", heads, |node, head| node.head = head)
    }

    /// Replaces the root-stress coefficients node by node
    pub fn with_beta(self, beta: &[f64]) -> Result<Self> {
        self.with_column("beta", beta, |node, beta| node.beta = beta)
    }

    fn with_column<F>(mut self, what: &str, values: &[f64], set: F) -> Result<Self>
    where
        F: Fn(&mut Node, f64),
    {
        if values.len() != self.nodes.len() {
            return Err(Error::config(format!(
                "{} has {} values for {} profile nodes",
                what,
                values.len(),
                self.nodes.len()
            )));
        }

        if let Some(i) = values.iter().position(|x| !x.is_finite()) {
            return Err(Error::config(format!(
                "{} value for node {} is not a number",
                what,
                i + 1
            )));
        }

        for (node, value) in self.nodes.iter_mut().zip(values) {
            set(node, *value);
        }

        Ok(self)
    }
}
