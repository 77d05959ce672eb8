//! Bundle detection over a full graph snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::{EdgeRecord, NodeRecord, Point};

use super::clustering::{ClusterableEdge, cluster_similar_edges};
use super::geometry::create_bundle_control_points;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundlingSettings {
    pub enabled: bool,
    pub min_edges_for_bundle: usize,
    /// Maximum distance between edge midpoints within one bundle.
    pub max_bundle_distance: f64,
    /// Maximum heading difference within one bundle, in degrees.
    pub direction_tolerance: f64,
    /// Scales the perpendicular bulge of the bundle curve.
    pub bundle_strength: f64,
    /// Spacing the renderer keeps between edges of a bundle.
    pub separation_distance: f64,
}

impl Default for BundlingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_edges_for_bundle: 3,
            max_bundle_distance: 80.0,
            direction_tolerance: 30.0,
            bundle_strength: 0.3,
            separation_distance: 8.0,
        }
    }
}

/// Partial settings change; unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlingSettingsUpdate {
    pub enabled: Option<bool>,
    pub min_edges_for_bundle: Option<usize>,
    pub max_bundle_distance: Option<f64>,
    pub direction_tolerance: Option<f64>,
    pub bundle_strength: Option<f64>,
    pub separation_distance: Option<f64>,
}

impl BundlingSettings {
    pub fn apply(&mut self, update: &BundlingSettingsUpdate) {
        if let Some(v) = update.enabled {
            self.enabled = v;
        }
        if let Some(v) = update.min_edges_for_bundle {
            self.min_edges_for_bundle = v;
        }
        if let Some(v) = update.max_bundle_distance {
            self.max_bundle_distance = v;
        }
        if let Some(v) = update.direction_tolerance {
            self.direction_tolerance = v;
        }
        if let Some(v) = update.bundle_strength {
            self.bundle_strength = v;
        }
        if let Some(v) = update.separation_distance {
            self.separation_distance = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleGroup {
    pub id: String,
    pub edges: Vec<EdgeRecord>,
    pub control_points: Vec<Point>,
    pub bundle_strength: f64,
    pub separation_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    pub total_bundles: usize,
    pub bundled_edges: usize,
    pub average_bundle_size: f64,
    pub largest_bundle: usize,
}

pub fn bundle_stats(bundles: &[BundleGroup]) -> BundleStats {
    let bundled_edges: usize = bundles.iter().map(|b| b.edges.len()).sum();
    BundleStats {
        total_bundles: bundles.len(),
        bundled_edges,
        average_bundle_size: if bundles.is_empty() {
            0.0
        } else {
            bundled_edges as f64 / bundles.len() as f64
        },
        largest_bundle: bundles.iter().map(|b| b.edges.len()).max().unwrap_or(0),
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeBundlingCalculator {
    settings: BundlingSettings,
}

impl EdgeBundlingCalculator {
    pub fn new(settings: BundlingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BundlingSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, update: &BundlingSettingsUpdate) {
        self.settings.apply(update);
    }

    /// Recompute all bundles from scratch. Edges whose endpoints are not in
    /// `nodes` take no part.
    pub fn calculate_bundles(&self, edges: &[EdgeRecord], nodes: &[NodeRecord]) -> Vec<BundleGroup> {
        if !self.settings.enabled || edges.len() < self.settings.min_edges_for_bundle {
            return Vec::new();
        }

        let lookup: HashMap<&str, &NodeRecord> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let clusterable: Vec<ClusterableEdge> = edges
            .iter()
            .filter_map(|edge| {
                let source = lookup.get(edge.source.as_str())?;
                let target = lookup.get(edge.target.as_str())?;
                Some(ClusterableEdge::new(edge.clone(), source, target))
            })
            .collect();

        let bundles: Vec<BundleGroup> = cluster_similar_edges(&clusterable, &self.settings)
            .into_iter()
            .map(|cluster| {
                let members: Vec<&ClusterableEdge> = cluster.iter().map(|&i| &clusterable[i]).collect();
                BundleGroup {
                    id: format!("bundle-{}", members[0].edge.id),
                    edges: members.iter().map(|m| m.edge.clone()).collect(),
                    control_points: create_bundle_control_points(&members, self.settings.bundle_strength),
                    bundle_strength: self.settings.bundle_strength,
                    separation_distance: self.settings.separation_distance,
                }
            })
            .collect();

        tracing::debug!(edges = edges.len(), bundles = bundles.len(), "computed edge bundles");
        bundles
    }
}
