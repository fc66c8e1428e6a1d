//! The Gaea2 node catalog: categories, port layouts, property schemas, and
//! the closed set of property-limited node types.

use std::collections::BTreeMap;

use crate::model::PropertyValue;

/// The seven node categories, in the order the catalog groups them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeCategory {
    Primitive,
    Terrain,
    Modify,
    Surface,
    Simulate,
    Derive,
    ColorizeOutputUtility,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 7] = [
        NodeCategory::Primitive,
        NodeCategory::Terrain,
        NodeCategory::Modify,
        NodeCategory::Surface,
        NodeCategory::Simulate,
        NodeCategory::Derive,
        NodeCategory::ColorizeOutputUtility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeCategory::Primitive => "primitive",
            NodeCategory::Terrain => "terrain",
            NodeCategory::Modify => "modify",
            NodeCategory::Surface => "surface",
            NodeCategory::Simulate => "simulate",
            NodeCategory::Derive => "derive",
            NodeCategory::ColorizeOutputUtility => "colorize_output_utility",
        }
    }
}

/// A representative, non-exhaustive slice of the real ~150-entry node
/// catalog, grouped by category. Breadth across categories matters for
/// the invariants in play; exhaustive fidelity to the real catalog does
/// not.
pub fn node_catalog() -> BTreeMap<&'static str, NodeCategory> {
    use NodeCategory::*;
    let mut m = BTreeMap::new();
    for n in [
        "Cellular", "Cone", "Constant", "Cracks", "Gabor", "Mesh", "Perlin", "Slump", "Voronoi",
    ] {
        m.insert(n, Primitive);
    }
    for n in [
        "Canyon", "Crater", "CraterField", "Mountain", "Volcano", "Island", "Plates", "Ridge", "Dunes",
    ] {
        m.insert(n, Terrain);
    }
    for n in [
        "Adjust", "Blur", "SlopeBlur", "Clamp", "Curve", "Warp", "Transform", "Shear", "Terrace", "FractalTerraces",
    ] {
        m.insert(n, Modify);
    }
    for n in [
        "Bomber", "Contours", "Crumble", "Sand", "Sandstone", "Stratify", "Outcrops", "Shatter",
    ] {
        m.insert(n, Surface);
    }
    for n in [
        "Anastomosis", "Erosion", "Erosion2", "Rivers", "Snow", "Thermal", "Thermal2", "Weathering", "Lakes",
        "Glacier", "Beach", "Coast", "SeaLevel", "LavaFlow", "ThermalShatter",
    ] {
        m.insert(n, Simulate);
    }
    for n in [
        "Slope", "Height", "Curvature", "FlowMap", "Occlusion", "Normals",
    ] {
        m.insert(n, Derive);
    }
    for n in [
        "SatMap", "ColorMap", "CLUTer", "HSL", "Combine", "TextureBase", "Export", "OutputBuffer",
        "Unity", "Unreal", "File", "Portal", "PortalTransmit", "PortalReceive",
    ] {
        m.insert(n, ColorizeOutputUtility);
    }
    m
}

/// Nodes whose properties are never allowed to exceed 3 entries. Grounded
/// in the original validator's `PROPERTY_LIMITED_NODES` set.
pub const PROPERTY_LIMITED_NODES: &[&str] = &[
    "Snow",
    "Beach",
    "Coast",
    "Lakes",
    "Glacier",
    "SeaLevel",
    "LavaFlow",
    "ThermalShatter",
    "Ridge",
    "Strata",
    "Voronoi",
    "Terrace",
];

/// Property keys to keep when a property-limited node exceeds the limit
/// and conservative repair must prune it back down. Falls back to
/// "keep the first 3 by insertion order" for any type not listed here.
pub fn essential_properties(node_type: &str) -> Option<&'static [&'static str]> {
    Some(match node_type {
        "Snow" => &["Duration", "SnowLine", "Melt"],
        "Beach" => &["Width", "Scale", "Smoothness"],
        "Coast" => &["Scale", "Variance", "Smoothness"],
        "Lakes" => &["Level", "Scale", "Smoothness"],
        "Glacier" => &["Scale", "Strength", "Direction"],
        "SeaLevel" => &["Level", "Scale", "Smoothness"],
        "LavaFlow" => &["Scale", "Viscosity", "Coverage"],
        "ThermalShatter" => &["Scale", "Strength", "Detail"],
        "Ridge" => &["Scale", "Complexity"],
        "Strata" => &["Layers", "Scale", "Variance"],
        "Voronoi" => &["Scale", "Seed", "Warp"],
        "Terrace" => &["Count", "Scale", "Smoothness"],
        _ => return None,
    })
}

/// Nodes that are expected to sit at the end of a chain and are exempt
/// from orphan/dangling-output warnings.
pub const TERMINAL_EXEMPT_NODES: &[&str] = &["Export", "SatMap", "OutputBuffer", "Unity", "Unreal", "File"];

/// Node types that route data out-of-band through a named portal rather
/// than a direct edge. A template (or any other linear-chain assembler)
/// must not wire a default `Out -> In` edge across one of these.
pub const PORTAL_NODES: &[&str] = &["Portal", "PortalTransmit", "PortalReceive"];

/// The kind of value a property definition expects. `Int` accepts an
/// integral float as a coercion (the original format frequently encodes
/// integers as JSON floats); anything else is a type error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Int,
    Float,
    Bool,
    String,
    Enum,
}

/// A property's default value, convertible to the model's runtime
/// `PropertyValue` on demand.
#[derive(Debug, Clone, Copy)]
pub enum PropertyDefault {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'static str),
}

impl PropertyDefault {
    pub fn to_value(self) -> PropertyValue {
        match self {
            PropertyDefault::Int(i) => PropertyValue::Int(i),
            PropertyDefault::Float(f) => PropertyValue::Float(f),
            PropertyDefault::Bool(b) => PropertyValue::Bool(b),
            PropertyDefault::Str(s) => PropertyValue::String(s.to_string()),
        }
    }
}

/// A single property definition: kind, optional numeric range, optional
/// enum vocabulary, optional default. Ported from the original's
/// `NODE_PROPERTY_DEFINITIONS`/`COMMON_NODE_PROPERTIES` tables.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDefinition {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub range: Option<(f64, f64)>,
    pub enum_options: Option<&'static [&'static str]>,
    pub default: Option<PropertyDefault>,
}

const fn def(
    name: &'static str,
    kind: PropertyKind,
    range: Option<(f64, f64)>,
    enum_options: Option<&'static [&'static str]>,
    default: Option<PropertyDefault>,
) -> PropertyDefinition {
    PropertyDefinition { name, kind, range, enum_options, default }
}

/// Properties common to most node types, used as a fallback when a
/// node-specific definition doesn't mention the property. Grounded in the
/// original's `COMMON_NODE_PROPERTIES`.
const COMMON_PROPERTY_DEFINITIONS: &[PropertyDefinition] = &[
    def("Seed", PropertyKind::Int, Some((0.0, 999999.0)), None, Some(PropertyDefault::Int(0))),
    def("Scale", PropertyKind::Float, Some((0.01, 10.0)), None, Some(PropertyDefault::Float(1.0))),
    def("Height", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Size", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Density", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Octaves", PropertyKind::Int, Some((1.0, 16.0)), None, Some(PropertyDefault::Int(8))),
    def("Strength", PropertyKind::Float, Some((0.0, 2.0)), None, Some(PropertyDefault::Float(0.5))),
    def("X", PropertyKind::Float, Some((-1000.0, 1000.0)), None, Some(PropertyDefault::Float(0.0))),
    def("Y", PropertyKind::Float, Some((-1000.0, 1000.0)), None, Some(PropertyDefault::Float(0.0))),
];

const MOUNTAIN_PROPERTIES: &[PropertyDefinition] = &[
    def("Scale", PropertyKind::Float, Some((0.1, 5.0)), None, Some(PropertyDefault::Float(1.0))),
    def("Height", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.7))),
    def(
        "Style",
        PropertyKind::Enum,
        None,
        Some(&["Basic", "Eroded", "Old", "Alpine", "Strata"]),
        Some(PropertyDefault::Str("Basic")),
    ),
    def(
        "Bulk",
        PropertyKind::Enum,
        None,
        Some(&["Low", "Medium", "High"]),
        Some(PropertyDefault::Str("Medium")),
    ),
    def("ReduceDetails", PropertyKind::Bool, None, None, Some(PropertyDefault::Bool(false))),
    def("Seed", PropertyKind::Int, Some((0.0, 999999.0)), None, Some(PropertyDefault::Int(0))),
];

const EROSION_PROPERTIES: &[PropertyDefinition] = &[
    def("Duration", PropertyKind::Float, Some((0.0, 20.0)), None, Some(PropertyDefault::Float(0.04))),
    def("RockSoftness", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.4))),
    def("Strength", PropertyKind::Float, Some((0.0, 2.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Downcutting", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def("Inhibition", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def("BaseLevel", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def("FeatureScale", PropertyKind::Int, Some((50.0, 10000.0)), None, Some(PropertyDefault::Int(2000))),
    def("RealScale", PropertyKind::Bool, None, None, Some(PropertyDefault::Bool(false))),
    def("Seed", PropertyKind::Int, Some((0.0, 999999.0)), None, Some(PropertyDefault::Int(0))),
    def("AggressiveMode", PropertyKind::Bool, None, None, Some(PropertyDefault::Bool(false))),
    def("Deterministic", PropertyKind::Bool, None, None, Some(PropertyDefault::Bool(false))),
];

const EROSION2_PROPERTIES: &[PropertyDefinition] = &[
    def("Duration", PropertyKind::Float, Some((0.01, 2.0)), None, Some(PropertyDefault::Float(0.15))),
    def("Downcutting", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.3))),
    def(
        "ErosionScale",
        PropertyKind::Float,
        Some((1000.0, 20000.0)),
        None,
        Some(PropertyDefault::Float(5000.0)),
    ),
    def("Seed", PropertyKind::Int, Some((0.0, 999999.0)), None, Some(PropertyDefault::Int(0))),
    def(
        "BedLoadDischargeAmount",
        PropertyKind::Float,
        Some((0.0, 1.0)),
        None,
        Some(PropertyDefault::Float(0.0)),
    ),
    def(
        "BedLoadDischargeAngle",
        PropertyKind::Float,
        Some((0.0, 360.0)),
        None,
        Some(PropertyDefault::Float(0.0)),
    ),
    def(
        "CoarseSedimentsDischargeAmount",
        PropertyKind::Float,
        Some((0.0, 1.0)),
        None,
        Some(PropertyDefault::Float(0.0)),
    ),
    def(
        "CoarseSedimentsDischargeAngle",
        PropertyKind::Float,
        Some((0.0, 360.0)),
        None,
        Some(PropertyDefault::Float(0.0)),
    ),
    def(
        "SuspendedLoadDischargeAmount",
        PropertyKind::Float,
        Some((0.0, 1.0)),
        None,
        Some(PropertyDefault::Float(0.0)),
    ),
    def(
        "SuspendedLoadDischargeAngle",
        PropertyKind::Float,
        Some((0.0, 360.0)),
        None,
        Some(PropertyDefault::Float(0.0)),
    ),
    def("Shape", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def(
        "ShapeDetailScale",
        PropertyKind::Float,
        Some((0.0, 1.0)),
        None,
        Some(PropertyDefault::Float(0.5)),
    ),
    def(
        "ShapeSharpness",
        PropertyKind::Float,
        Some((0.0, 1.0)),
        None,
        Some(PropertyDefault::Float(0.5)),
    ),
];

const COMBINE_PROPERTIES: &[PropertyDefinition] = &[
    def(
        "Mode",
        PropertyKind::Enum,
        None,
        Some(&[
            "Blend", "Add", "Screen", "Subtract", "Difference", "Multiply", "Divide", "Divide2", "Max", "Min",
            "Hypotenuse", "Overlay", "Power", "Exclusion", "Dodge", "Burn", "SoftLight", "HardLight", "PinLight",
            "GrainMerge", "GrainExtract", "Reflect", "Glow", "Phoenix",
        ]),
        Some(PropertyDefault::Str("Blend")),
    ),
    def("Ratio", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def(
        "Clamp",
        PropertyKind::Enum,
        None,
        Some(&["None", "Clamp", "Normalize"]),
        Some(PropertyDefault::Str("Clamp")),
    ),
];

const RIVERS_PROPERTIES: &[PropertyDefinition] = &[
    def("Water", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.3))),
    def("Width", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Depth", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Downcutting", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def(
        "RiverValleyWidth",
        PropertyKind::Enum,
        None,
        Some(&["minus4", "minus2", "zero", "plus2", "plus4"]),
        Some(PropertyDefault::Str("zero")),
    ),
    def("Headwaters", PropertyKind::Int, Some((10.0, 1000.0)), None, Some(PropertyDefault::Int(100))),
    def("RenderSurface", PropertyKind::Bool, None, None, Some(PropertyDefault::Bool(false))),
    def("Seed", PropertyKind::Int, Some((0.0, 999999.0)), None, Some(PropertyDefault::Int(0))),
];

const VOLCANO_PROPERTIES: &[PropertyDefinition] = &[
    def("Scale", PropertyKind::Float, Some((0.1, 5.0)), None, Some(PropertyDefault::Float(1.0))),
    def("Height", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.8))),
    def("Mouth", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.3))),
    def("Bulk", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def(
        "Surface",
        PropertyKind::Enum,
        None,
        Some(&["Smooth", "Eroded"]),
        Some(PropertyDefault::Str("Smooth")),
    ),
    def("X", PropertyKind::Float, Some((-1000.0, 1000.0)), None, Some(PropertyDefault::Float(0.0))),
    def("Y", PropertyKind::Float, Some((-1000.0, 1000.0)), None, Some(PropertyDefault::Float(0.0))),
    def("Seed", PropertyKind::Int, Some((0.0, 999999.0)), None, Some(PropertyDefault::Int(0))),
];

const PORTAL_NAME_PROPERTY: &[PropertyDefinition] = &[def(
    "PortalName",
    PropertyKind::String,
    None,
    None,
    Some(PropertyDefault::Str("Portal_1")),
)];

const PORTAL_PROPERTIES: &[PropertyDefinition] = &[
    def("PortalName", PropertyKind::String, None, None, Some(PropertyDefault::Str("Portal_1"))),
    def(
        "Direction",
        PropertyKind::Enum,
        None,
        Some(&["Transmit", "Receive"]),
        Some(PropertyDefault::Str("Transmit")),
    ),
];

const SNOW_PROPERTIES: &[PropertyDefinition] = &[
    def("Duration", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Intensity", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("SettleDuration", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def(
        "MeltType",
        PropertyKind::Enum,
        None,
        Some(&["Uniform", "Directional"]),
        Some(PropertyDefault::Str("Uniform")),
    ),
    def("Melt", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def("MeltRemnants", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def("Direction", PropertyKind::Float, Some((0.0, 360.0)), None, Some(PropertyDefault::Float(0.0))),
    def("SnowLine", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.7))),
    def("SlipOffAngle", PropertyKind::Float, Some((0.0, 90.0)), None, Some(PropertyDefault::Float(35.0))),
    def("RealScale", PropertyKind::Bool, None, None, Some(PropertyDefault::Bool(false))),
];

const SEA_LEVEL_PROPERTIES: &[PropertyDefinition] = &[
    def("Level", PropertyKind::Float, Some((-1.0, 1.0)), None, Some(PropertyDefault::Float(0.0))),
    def("Precision", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.9))),
];

const BEACH_PROPERTIES: &[PropertyDefinition] = &[
    def("Width", PropertyKind::Float, Some((10.0, 500.0)), None, Some(PropertyDefault::Float(100.0))),
    def("Slope", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.1))),
];

const COAST_PROPERTIES: &[PropertyDefinition] = &[
    def("Erosion", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Detail", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
];

const LAKES_PROPERTIES: &[PropertyDefinition] = &[
    def("Count", PropertyKind::Int, Some((1.0, 20.0)), None, Some(PropertyDefault::Int(3))),
    def("Size", PropertyKind::Float, Some((0.1, 1.0)), None, Some(PropertyDefault::Float(0.3))),
];

const LAVA_FLOW_PROPERTIES: &[PropertyDefinition] = &[
    def(
        "Temperature",
        PropertyKind::Float,
        Some((800.0, 1500.0)),
        None,
        Some(PropertyDefault::Float(1200.0)),
    ),
    def("Viscosity", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
];

const THERMAL_SHATTER_PROPERTIES: &[PropertyDefinition] = &[
    def("Intensity", PropertyKind::Float, Some((0.0, 1.0)), None, Some(PropertyDefault::Float(0.5))),
    def("Scale", PropertyKind::Float, Some((0.1, 1.0)), None, Some(PropertyDefault::Float(0.3))),
];

/// The node-specific property table, keyed by node type. Node types with
/// no entry here (most of the catalog) rely entirely on the common pool
/// plus the unknown-property fallback — matching the original, where most
/// node types have no `NODE_PROPERTY_DEFINITIONS` entry either.
fn node_property_definitions(node_type: &str) -> &'static [PropertyDefinition] {
    match node_type {
        "Mountain" => MOUNTAIN_PROPERTIES,
        "Erosion" => EROSION_PROPERTIES,
        "Erosion2" => EROSION2_PROPERTIES,
        "Combine" => COMBINE_PROPERTIES,
        "Rivers" => RIVERS_PROPERTIES,
        "Volcano" => VOLCANO_PROPERTIES,
        "Portal" => PORTAL_PROPERTIES,
        "PortalTransmit" | "PortalReceive" => PORTAL_NAME_PROPERTY,
        "Snow" => SNOW_PROPERTIES,
        "SeaLevel" => SEA_LEVEL_PROPERTIES,
        "Beach" => BEACH_PROPERTIES,
        "Coast" => COAST_PROPERTIES,
        "Lakes" => LAKES_PROPERTIES,
        "LavaFlow" => LAVA_FLOW_PROPERTIES,
        "ThermalShatter" => THERMAL_SHATTER_PROPERTIES,
        _ => &[],
    }
}

/// Look up the definition for one property on one node type: the
/// node-specific table first, then the shared common pool — the same
/// precedence the original's `validate_node_properties` uses.
pub fn property_definition_for(node_type: &str, property_name: &str) -> Option<&'static PropertyDefinition> {
    node_property_definitions(node_type)
        .iter()
        .chain(COMMON_PROPERTY_DEFINITIONS)
        .find(|d| d.name == property_name)
}

/// Every definition that applies to a node type: its own table first, then
/// whatever common properties it doesn't already override. Used by
/// repair's defaulting step to fill in properties the caller omitted.
pub fn applicable_property_definitions(node_type: &str) -> Vec<&'static PropertyDefinition> {
    let own = node_property_definitions(node_type);
    let mut defs: Vec<&'static PropertyDefinition> = own.iter().collect();
    for common in COMMON_PROPERTY_DEFINITIONS {
        if !own.iter().any(|d| d.name == common.name) {
            defs.push(common);
        }
    }
    defs
}

/// A port declaration: name plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDecl {
    pub name: &'static str,
    pub direction: PortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    In,
    Out,
}

/// The port layout for a node type. Every node gets a base `In`/`Out` pair;
/// specific node types add extra ports on top of that base, grounded in
/// the original generator's per-node-type port overrides.
pub fn ports_for(node_type: &str) -> Vec<PortDecl> {
    let mut ports = vec![
        PortDecl { name: "In", direction: PortDirection::In },
        PortDecl { name: "Out", direction: PortDirection::Out },
    ];
    match node_type {
        "Erosion2" => {
            ports.push(PortDecl { name: "Flow", direction: PortDirection::Out });
            ports.push(PortDecl { name: "Wear", direction: PortDirection::Out });
            ports.push(PortDecl { name: "Deposits", direction: PortDirection::Out });
        }
        "Sandstone" => {
            ports.push(PortDecl { name: "Layers", direction: PortDirection::Out });
        }
        "Canyon" => {
            ports.push(PortDecl { name: "Depth", direction: PortDirection::Out });
        }
        "Combine" | "SatMap" | "ColorMap" => {
            ports.push(PortDecl { name: "Mask", direction: PortDirection::In });
        }
        "Unity" | "Unreal" => {
            const INPUTS: [&str; 8] = ["Input1", "Input2", "Input3", "Input4", "Input5", "Input6", "Input7", "Input8"];
            const OUTPUTS: [&str; 8] = ["Output1", "Output2", "Output3", "Output4", "Output5", "Output6", "Output7", "Output8"];
            for name in INPUTS {
                ports.push(PortDecl { name, direction: PortDirection::In });
            }
            for name in OUTPUTS {
                ports.push(PortDecl { name, direction: PortDirection::Out });
            }
        }
        _ => {}
    }
    ports
}

/// Port-compatibility rule, grounded in the original's simplified
/// `_check_port_compatibility`: `Out -> In` is always compatible, `Mask ->
/// Mask` is compatible, and any `Out -> in*`-prefixed target port is
/// compatible. Anything else is a warning, not a hard error — port naming
/// in real projects is looser than the catalog implies.
pub fn ports_compatible(from_port: &str, to_port: &str) -> bool {
    if from_port == "Out" {
        return true;
    }
    if from_port == "Mask" && to_port == "Mask" {
        return true;
    }
    to_port.to_lowercase().starts_with("in")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_limited_set_has_twelve_entries() {
        assert_eq!(PROPERTY_LIMITED_NODES.len(), 12);
    }

    #[test]
    fn snow_essentials_match_fixture() {
        assert_eq!(essential_properties("Snow"), Some(&["Duration", "SnowLine", "Melt"][..]));
    }

    #[test]
    fn unlisted_property_limited_node_has_no_fixed_essentials() {
        assert_eq!(essential_properties("SomeOtherNode"), None);
    }

    #[test]
    fn erosion2_gets_extra_output_ports() {
        let ports = ports_for("Erosion2");
        let names: Vec<_> = ports.iter().map(|p| p.name).collect();
        assert!(names.contains(&"Flow"));
        assert!(names.contains(&"Wear"));
        assert!(names.contains(&"Deposits"));
    }

    #[test]
    fn port_compatibility_rule() {
        assert!(ports_compatible("Out", "In"));
        assert!(ports_compatible("Mask", "Mask"));
        assert!(ports_compatible("Out", "InputMask"));
        assert!(!ports_compatible("Mask", "Out"));
    }

    #[test]
    fn node_specific_definition_shadows_common_pool() {
        let def = property_definition_for("Mountain", "Scale").unwrap();
        assert_eq!(def.range, Some((0.1, 5.0)));
    }

    #[test]
    fn unlisted_property_falls_back_to_common_pool() {
        let def = property_definition_for("Mountain", "Density").unwrap();
        assert_eq!(def.default.is_some(), true);
    }

    #[test]
    fn unknown_property_has_no_definition_anywhere() {
        assert!(property_definition_for("Mountain", "Wobble").is_none());
    }

    #[test]
    fn combine_mode_is_an_enum_with_default() {
        let def = property_definition_for("Combine", "Mode").unwrap();
        assert_eq!(def.kind, PropertyKind::Enum);
        assert!(def.enum_options.unwrap().contains(&"Blend"));
    }

    #[test]
    fn applicable_definitions_include_common_properties_not_overridden() {
        let defs = applicable_property_definitions("Mountain");
        assert!(defs.iter().any(|d| d.name == "Style"));
        assert!(defs.iter().any(|d| d.name == "Density"));
    }
}
