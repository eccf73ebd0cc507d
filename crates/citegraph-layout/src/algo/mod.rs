pub mod hash;
pub mod order;
pub mod relax;
pub mod tree;

pub(crate) mod engine;
pub(crate) mod table;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// Geometry knobs of the layout. `Default` carries the tuned constants; a JSON document may
/// override any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOptions {
    /// Distance between consecutive depth levels along the primary axis.
    pub depth_spacing: f64,
    /// Lower bound of a node's apparent radius.
    pub min_radius: f64,
    /// Radius contributed per unit of node `size`.
    pub radius_per_size: f64,
    /// Gap between neighbouring siblings on the stacking axis.
    pub sibling_gap: f64,
    /// Width of the tertiary-axis jitter band for tree-placed nodes.
    pub tree_jitter: f64,
    /// Width of the tertiary-axis jitter band for fallback-placed nodes.
    pub fallback_jitter: f64,
    /// Fallback nodes wrap onto this many stacking slots.
    pub fallback_columns: usize,
    pub fallback_step: f64,
    pub fallback_offset: f64,
    pub relax: RelaxOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            depth_spacing: 10.0,
            min_radius: 0.45,
            radius_per_size: 0.11,
            sibling_gap: 0.45,
            tree_jitter: 4.2,
            fallback_jitter: 4.8,
            fallback_columns: 8,
            fallback_step: 1.6,
            fallback_offset: 5.5,
            relax: RelaxOptions::default(),
        }
    }
}

impl LayoutOptions {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn radius(&self, size: f64) -> f64 {
        self.min_radius.max(size * self.radius_per_size)
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("depth_spacing", self.depth_spacing),
            ("min_radius", self.min_radius),
            ("radius_per_size", self.radius_per_size),
            ("sibling_gap", self.sibling_gap),
            ("tree_jitter", self.tree_jitter),
            ("fallback_jitter", self.fallback_jitter),
            ("fallback_step", self.fallback_step),
            ("relax.padding", self.relax.padding),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidOption { name, value });
            }
        }
        if !self.fallback_offset.is_finite() {
            return Err(Error::InvalidOption {
                name: "fallback_offset",
                value: self.fallback_offset,
            });
        }
        if self.fallback_columns == 0 {
            return Err(Error::InvalidOption {
                name: "fallback_columns",
                value: 0.0,
            });
        }
        let k = self.relax.spring_strength;
        if !(k.is_finite() && (0.0..=1.0).contains(&k)) {
            return Err(Error::InvalidOption {
                name: "relax.spring_strength",
                value: k,
            });
        }
        Ok(())
    }

    pub(crate) fn fingerprint<H: Hasher>(&self, state: &mut H) {
        for v in [
            self.depth_spacing,
            self.min_radius,
            self.radius_per_size,
            self.sibling_gap,
            self.tree_jitter,
            self.fallback_jitter,
            self.fallback_step,
            self.fallback_offset,
            self.relax.padding,
            self.relax.spring_strength,
        ] {
            state.write_u64(v.to_bits());
        }
        state.write_usize(self.fallback_columns);
        state.write_usize(self.relax.iterations);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelaxOptions {
    /// Upper bound on relaxation passes; the loop stops earlier once a pass sees no overlap.
    pub iterations: usize,
    /// Extra clearance required between two node spheres.
    pub padding: f64,
    /// Fraction of the way each node is pulled back toward its anchor after every pass.
    pub spring_strength: f64,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            iterations: 120,
            padding: 0.35,
            spring_strength: 0.065,
        }
    }
}
