//! Compiled-in pattern knowledge: successor distributions, usage
//! frequency, workflow templates, and property recommendations. All
//! read-only — nothing here mutates at runtime.
//!
//! `WORKFLOW_TEMPLATES`, `successor_distribution`, `usage_frequency`, and
//! `PROPERTY_RECOMMENDATIONS` are transcribed from the corpus-derived
//! pattern tables (node sequences, connection frequencies, usage counts,
//! and property recommendations mined from real projects), with one
//! addition noted at its definition site.

use std::collections::BTreeMap;

/// A workflow template: a named, ordered recipe of node types for a given
/// terrain intent.
#[derive(Debug, Clone)]
pub struct WorkflowTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub nodes: &'static [&'static str],
    pub tags: &'static [&'static str],
}

pub const WORKFLOW_TEMPLATES: &[WorkflowTemplate] = &[
    WorkflowTemplate {
        name: "realistic_mountain",
        description: "Standard workflow for realistic mountain terrains",
        nodes: &["Mountain", "Erosion2", "Rivers", "Adjust", "TextureBase", "SatMap"],
        tags: &["mountain", "erosion", "water", "realistic"],
    },
    WorkflowTemplate {
        name: "terraced_landscape",
        description: "Complex terraced landscapes with deformation",
        nodes: &["Slump", "FractalTerraces", "Combine", "Shear", "Crumble", "Erosion2"],
        tags: &["terraces", "geological", "complex"],
    },
    WorkflowTemplate {
        name: "desert_canyon",
        description: "Desert canyon with rock stratification",
        nodes: &["Canyon", "Sandstone", "Stratify", "Erosion2", "TextureBase", "SatMap"],
        tags: &["canyon", "desert", "stratified", "sedimentary"],
    },
    WorkflowTemplate {
        name: "volcanic_terrain",
        description: "Volcanic landscape with thermal erosion",
        nodes: &["Volcano", "Combine", "Thermal2", "Erosion2", "Weathering", "SatMap"],
        tags: &["volcano", "thermal", "lava"],
    },
    WorkflowTemplate {
        name: "water_erosion",
        description: "Water-carved terrain features",
        nodes: &["Mountain", "Erosion2", "Rivers", "Adjust", "Height", "Combine"],
        tags: &["water", "erosion", "rivers", "carved"],
    },
    WorkflowTemplate {
        name: "alien_surface",
        description: "Alien or lunar surface with craters",
        nodes: &["CraterField", "Outcrops", "Outcrops", "SatMap"],
        tags: &["alien", "craters", "lunar", "scifi"],
    },
    WorkflowTemplate {
        name: "stratified_rocks",
        description: "Layered rock formations",
        nodes: &["Sandstone", "Stratify", "Stratify", "SlopeBlur"],
        tags: &["stratified", "sedimentary", "layers", "geological"],
    },
    // Not present in the corpus-derived source table: added to exercise
    // portal routing and Combine fan-in together in one template.
    WorkflowTemplate {
        name: "layered_portal_blend",
        description: "Two generators blended through Combine, routed out through a portal pair",
        nodes: &[
            "Mountain",
            "Volcano",
            "Combine",
            "Erosion2",
            "PortalTransmit",
            "PortalReceive",
            "TextureBase",
            "SatMap",
        ],
        tags: &["blend", "portal", "combine"],
    },
];

/// Map a terrain-intent keyword to the best-matching template.
pub fn workflow_for_terrain_type(terrain_type: &str) -> Option<&'static WorkflowTemplate> {
    let key = match terrain_type.to_lowercase().as_str() {
        "mountain" | "mountains" => "realistic_mountain",
        "canyon" => "desert_canyon",
        "volcano" | "volcanic" => "volcanic_terrain",
        "terraced" | "terrace" => "terraced_landscape",
        "alien" => "alien_surface",
        "water" | "river" | "rivers" => "water_erosion",
        "stratified" | "strata" => "stratified_rocks",
        "blend" | "layered" | "portal" => "layered_portal_blend",
        _ => return None,
    };
    WORKFLOW_TEMPLATES.iter().find(|t| t.name == key)
}

/// Per-node successor probability distribution: what tends to follow a
/// given node type, with a relative weight.
pub fn successor_distribution(node_type: &str) -> &'static [(&'static str, f64)] {
    match node_type {
        "Mountain" => &[("Erosion2", 0.8), ("Outcrops", 0.2)],
        "Erosion2" => &[
            ("Rivers", 0.26),
            ("TextureBase", 0.23),
            ("ColorErosion", 0.19),
            ("Height", 0.13),
            ("Erosion2", 0.10),
        ],
        "Rivers" => &[("Adjust", 0.37), ("Height", 0.33), ("TextureBase", 0.30)],
        "TextureBase" => &[("SatMap", 0.95), ("Combine", 0.05)],
        "SatMap" => &[
            ("Combine", 0.64),
            ("ColorErosion", 0.14),
            ("Mixer", 0.10),
            ("Weathering", 0.08),
        ],
        "Combine" => &[
            ("Combine", 0.29),
            ("Shear", 0.21),
            ("Weathering", 0.10),
            ("Erosion2", 0.04),
            ("SatMap", 0.04),
        ],
        "Crumble" => &[("Erosion2", 0.82), ("Sandstone", 0.09), ("Terraces", 0.09)],
        "Slump" => &[("FractalTerraces", 1.0)],
        "Island" => &[("Adjust", 0.67), ("Blur", 0.33)],
        "Adjust" => &[("Combine", 0.56), ("Blur", 0.33), ("Tint", 0.11)],
        "Height" => &[("Combine", 0.71), ("Debris", 0.14), ("Rivers", 0.07), ("Weathering", 0.07)],
        _ => &[],
    }
}

/// Suggest the top `n` successor node types for `current_node`.
pub fn next_node_suggestions(current_node: &str, n: usize) -> Vec<&'static str> {
    let mut dist = successor_distribution(current_node).to_vec();
    dist.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    dist.into_iter().take(n).map(|(name, _)| name).collect()
}

/// How frequently each node type appears across the reference corpus
/// (top 20). Used to flag unusually rare node types in workflow
/// heuristics.
pub fn usage_frequency() -> BTreeMap<&'static str, u32> {
    let mut m = BTreeMap::new();
    for (name, count) in [
        ("SatMap", 50),
        ("Combine", 48),
        ("Erosion2", 31),
        ("TextureBase", 20),
        ("Adjust", 18),
        ("Height", 14),
        ("ColorErosion", 12),
        ("Crumble", 11),
        ("Rivers", 10),
        ("FractalTerraces", 10),
        ("Shear", 10),
        ("Weathering", 9),
        ("Slump", 9),
        ("Island", 9),
        ("Blur", 9),
        ("Stratify", 8),
        ("Outcrops", 7),
        ("Debris", 7),
        ("Terraces", 7),
        ("Sandstone", 6),
    ] {
        m.insert(name, count);
    }
    m
}

/// A property recommendation entry: a value range plus quality-preset
/// values drawn from it.
#[derive(Debug, Clone)]
pub struct PropertyRecommendation {
    pub node_type: &'static str,
    pub property: &'static str,
    pub min: f64,
    pub max: f64,
    pub performance: f64,
    pub balanced: f64,
    pub detail: f64,
}

pub const PROPERTY_RECOMMENDATIONS: &[PropertyRecommendation] = &[
    // subtle/moderate/heavy common_patterns from the source table.
    PropertyRecommendation {
        node_type: "Erosion2",
        property: "Duration",
        min: 0.04,
        max: 0.1,
        performance: 0.04,
        balanced: 0.07,
        detail: 0.1,
    },
    // source gives only default 100 / range [50, 200]; performance and
    // detail presets mirror suggest_properties_for_node's
    // performance_priority/detail_priority adjustments (50 and 200).
    PropertyRecommendation {
        node_type: "Rivers",
        property: "Headwaters",
        min: 50.0,
        max: 200.0,
        performance: 50.0,
        balanced: 100.0,
        detail: 200.0,
    },
    // source gives default 0.5 and common_values [0.3, 0.5, 0.7]; no
    // preset split is given, so the common_values span stands in for
    // performance/detail.
    PropertyRecommendation {
        node_type: "Combine",
        property: "Ratio",
        min: 0.3,
        max: 0.7,
        performance: 0.3,
        balanced: 0.5,
        detail: 0.7,
    },
    // source gives only default 1.0 and range [0.5, 2.0], no preset split.
    PropertyRecommendation {
        node_type: "Mountain",
        property: "Scale",
        min: 0.5,
        max: 2.0,
        performance: 1.0,
        balanced: 1.0,
        detail: 1.0,
    },
];

pub fn recommendation_for(node_type: &str, property: &str) -> Option<&'static PropertyRecommendation> {
    PROPERTY_RECOMMENDATIONS
        .iter()
        .find(|r| r.node_type == node_type && r.property == property)
}

/// `SatMap`'s common presets. Unlike the other entries in the source
/// table, this one names no property — just a list of named color-map
/// presets — so it doesn't fit `PropertyRecommendation`'s shape.
pub fn satmap_common_presets() -> &'static [&'static str] {
    &["Rocky", "Desert", "Alpine", "Volcanic"]
}

/// Quality preset used to pick a recommended value along a recommendation's
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Performance,
    Balanced,
    Detail,
}

impl PropertyRecommendation {
    pub fn value_for(&self, preset: Preset) -> f64 {
        match preset {
            Preset::Performance => self.performance,
            Preset::Balanced => self.balanced,
            Preset::Detail => self.detail,
        }
    }
}
