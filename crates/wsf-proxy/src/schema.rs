//! The builtin scenario schema.
//!
//! # Overview
//!
//! [`builtin_registry`] declares every struct type of a scenario (root
//! catalogs, platforms and their parts, movers, routes, zones, scenario
//! classification) and [`builtin_basic_root`] builds the basic-type tree:
//! the predefined catalog entries (`WSF_PLATFORM`, `WSF_AIR_MOVER`, ...)
//! that user types derive from.

use crate::units::UnitKind;
use crate::value::{BasicKind, StructType, StructValue, TypeDesc, TypeRegistry, Value};

/// Root catalog attribute names.
pub mod catalog {
    pub const PLATFORM: &str = "platform";
    pub const PLATFORM_TYPE: &str = "platformType";
    pub const ZONE: &str = "zone";
    pub const ROUTE: &str = "routes";
    pub const MOVER_TYPE: &str = "moverType";
    pub const SENSOR_TYPE: &str = "sensorType";
    pub const COMM_TYPE: &str = "commType";
    pub const ROUTER_TYPE: &str = "routerType";
    pub const WEAPON_TYPE: &str = "weaponType";
    pub const PROCESSOR_TYPE: &str = "processorType";
    pub const SCENARIO: &str = "scenario";
}

/// Predefined entries of the basic-type tree, per root catalog.
pub const BASIC_TYPES: &[(&str, &str, &str)] = &[
    (catalog::PLATFORM_TYPE, "WSF_PLATFORM", "Platform"),
    (catalog::MOVER_TYPE, "WSF_AIR_MOVER", "WSF_AIR_MOVER"),
    (catalog::MOVER_TYPE, "WSF_GROUND_MOVER", "WSF_GROUND_MOVER"),
    (catalog::MOVER_TYPE, "WSF_SURFACE_MOVER", "WSF_SURFACE_MOVER"),
    (catalog::MOVER_TYPE, "WSF_ROAD_MOVER", "WSF_ROAD_MOVER"),
    (catalog::MOVER_TYPE, "WSF_SPACE_MOVER", "WSF_SPACE_MOVER"),
    (catalog::SENSOR_TYPE, "WSF_GEOMETRIC_SENSOR", "Sensor"),
    (catalog::SENSOR_TYPE, "WSF_RADAR_SENSOR", "Sensor"),
    (catalog::COMM_TYPE, "WSF_COMM_TRANSCEIVER", "Comm"),
    (catalog::ROUTER_TYPE, "WSF_COMM_ROUTER", "Router"),
    (catalog::WEAPON_TYPE, "WSF_EXPLICIT_WEAPON", "Weapon"),
    (catalog::PROCESSOR_TYPE, "WSF_SCRIPT_PROCESSOR", "Processor"),
];

fn unit(kind: UnitKind) -> TypeDesc {
    TypeDesc::unit(kind)
}

/// Declare the scenario schema.
pub fn builtin_registry() -> TypeRegistry {
    let mut reg = TypeRegistry::new();

    let aux_data = reg.define(StructType::new("AuxData").attr("vals", TypeDesc::map_of(TypeDesc::string())));

    // Routes
    let waypoint = reg.define(
        StructType::new("Waypoint")
            .attr("position", TypeDesc::Basic(BasicKind::Position))
            .attr("altitude", unit(UnitKind::Length))
            .attr("altitudeReference", TypeDesc::Basic(BasicKind::AltitudeReference))
            .attr("speed", unit(UnitKind::Speed))
            .attr("heading", unit(UnitKind::Angle))
            .attr("label", TypeDesc::string())
            .attr("gotoLabel", TypeDesc::string())
            .attr("pauseTime", unit(UnitKind::Time))
            .attr("climbRate", unit(UnitKind::Speed))
            .attr("linearAcceleration", unit(UnitKind::Acceleration)),
    );
    let route = reg.define(
        StructType::new("Route").attr("waypoints", TypeDesc::list_of(TypeDesc::of_struct(&waypoint))),
    );

    // Movers
    let mover = reg.define(
        StructType::new("Mover")
            .attr("useRoute", TypeDesc::string())
            .attr("defaultRoute", TypeDesc::of_struct(&route))
            .attr("updateInterval", unit(UnitKind::Time)),
    );
    let route_mover = reg.define(
        StructType::new("WSF_ROUTE_MOVER")
            .extends(&mover)
            .attr("atEndOfPath", TypeDesc::string()),
    );
    reg.define(StructType::new("WSF_AIR_MOVER").extends(&route_mover));
    reg.define(StructType::new("WSF_GROUND_MOVER").extends(&route_mover));
    reg.define(StructType::new("WSF_SURFACE_MOVER").extends(&route_mover));
    reg.define(StructType::new("WSF_ROAD_MOVER").extends(&route_mover));
    reg.define(StructType::new("WSF_SPACE_MOVER").extends(&mover));

    // Platform parts
    let part = reg.define(
        StructType::new("PlatformPart")
            .attr("on", TypeDesc::bool())
            .attr("debug", TypeDesc::bool())
            .attr("category", TypeDesc::string()),
    );
    let sensor = reg.define(
        StructType::new("Sensor")
            .extends(&part)
            .attr("frameTime", unit(UnitKind::Time))
            .attr("maximumRange", unit(UnitKind::Length)),
    );
    let comm = reg.define(
        StructType::new("Comm")
            .extends(&part)
            .attr("network", TypeDesc::string())
            .attr("router", TypeDesc::string())
            .attr("frequency", unit(UnitKind::Frequency))
            .attr("dataRate", unit(UnitKind::DataRate)),
    );
    let router = reg.define(
        StructType::new("Router")
            .extends(&part)
            .attr("gateway", TypeDesc::string())
            .attr("hopLimit", TypeDesc::int()),
    );
    let weapon = reg.define(
        StructType::new("Weapon")
            .extends(&part)
            .attr("launchedPlatformType", TypeDesc::string())
            .attr("quantity", TypeDesc::real()),
    );
    let processor = reg.define(
        StructType::new("Processor")
            .extends(&part)
            .attr("updateInterval", unit(UnitKind::Time)),
    );
    let fuel = reg.define(
        StructType::new("Fuel")
            .attr("maximumQuantity", unit(UnitKind::Mass))
            .attr("initialQuantity", unit(UnitKind::Mass))
            .attr("reserveQuantity", unit(UnitKind::Mass)),
    );
    let command_chain = reg.define(StructType::new("CommandChain").attr("commander", TypeDesc::string()));

    // Zones
    let zone_point = reg.define(
        StructType::new("ZonePoint")
            .attr("latitude", TypeDesc::Basic(BasicKind::Latitude))
            .attr("longitude", TypeDesc::Basic(BasicKind::Longitude))
            .attr("point", TypeDesc::Basic(BasicKind::Length2))
            .attr("mgrs", TypeDesc::string())
            .attr("range", unit(UnitKind::Length))
            .attr("bearing", unit(UnitKind::Angle)),
    );
    let zone = reg.define(
        StructType::new("Zone")
            .attr("fillColor", TypeDesc::Basic(BasicKind::Color))
            .attr("lineColor", TypeDesc::Basic(BasicKind::Color))
            .attr("auxData", TypeDesc::of_struct(&aux_data)),
    );
    reg.define(
        StructType::new("ZoneDefinition")
            .extends(&zone)
            .attr("type", TypeDesc::int())
            .attr("minimumAltitude", unit(UnitKind::Length))
            .attr("maximumAltitude", unit(UnitKind::Length))
            .attr("minimumRadius", unit(UnitKind::Length))
            .attr("maximumRadius", unit(UnitKind::Length))
            .attr("longitudinalAxis", unit(UnitKind::Length))
            .attr("lateralAxis", unit(UnitKind::Length))
            .attr("startAngle", unit(UnitKind::Angle))
            .attr("stopAngle", unit(UnitKind::Angle))
            .attr("heading", unit(UnitKind::Angle))
            .attr("position", TypeDesc::Basic(BasicKind::Position))
            .attr("referencePlatform", TypeDesc::string())
            .attr("referenceZone", TypeDesc::string())
            .attr("negative", TypeDesc::bool())
            .attr("points", TypeDesc::list_of(TypeDesc::of_struct(&zone_point)))
            .attr("useLatLon", TypeDesc::bool())
            .attr("useMGRS", TypeDesc::bool())
            .attr("usePolar", TypeDesc::bool()),
    );
    reg.define(
        StructType::new("ZoneSet")
            .extends(&zone)
            .attr("inclusionZones", TypeDesc::list_of(TypeDesc::string()))
            .attr("exclusionZones", TypeDesc::list_of(TypeDesc::string())),
    );

    // Platform
    let platform = reg.define(
        StructType::new("Platform")
            .attr("side", TypeDesc::string())
            .attr("icon", TypeDesc::string())
            .attr("position", TypeDesc::Basic(BasicKind::Position))
            .attr("altitude", unit(UnitKind::Length))
            .attr("altitudeReference", TypeDesc::Basic(BasicKind::AltitudeReference))
            .attr("heading", unit(UnitKind::Angle))
            .attr("mover", TypeDesc::of_struct(&mover))
            .attr("sensors", TypeDesc::map_of(TypeDesc::of_struct(&sensor)))
            .attr("comms", TypeDesc::map_of(TypeDesc::of_struct(&comm)))
            .attr("routers", TypeDesc::map_of(TypeDesc::of_struct(&router)))
            .attr("weapons", TypeDesc::map_of(TypeDesc::of_struct(&weapon)))
            .attr("processors", TypeDesc::map_of(TypeDesc::of_struct(&processor)))
            .attr("zone", TypeDesc::map_of(TypeDesc::of_struct(&zone)))
            .attr("commandChain", TypeDesc::map_of(TypeDesc::of_struct(&command_chain)))
            .attr("fuel", TypeDesc::of_struct(&fuel))
            .attr("categories", TypeDesc::list_of(TypeDesc::string()))
            .attr("auxData", TypeDesc::of_struct(&aux_data)),
    );

    // Scenario
    let level = reg.define(StructType::new("ClassificationLevel").attr("color", TypeDesc::Basic(BasicKind::Color)));
    let classification = reg.define(
        StructType::new("Classification")
            .attr("level", TypeDesc::string())
            .attr("caveats", TypeDesc::list_of(TypeDesc::string()))
            .attr("trigraphs", TypeDesc::list_of(TypeDesc::string())),
    );
    let scenario = reg.define(
        StructType::new("Scenario")
            .attr("classificationLevels", TypeDesc::map_of(TypeDesc::of_struct(&level)))
            .attr("classifications", TypeDesc::list_of(TypeDesc::of_struct(&classification))),
    );

    reg.define_root(
        StructType::new("Root")
            .attr(catalog::PLATFORM, TypeDesc::map_of(TypeDesc::of_struct(&platform)))
            .attr(catalog::PLATFORM_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&platform)))
            .attr(catalog::ZONE, TypeDesc::map_of(TypeDesc::of_struct(&zone)))
            .attr(catalog::ROUTE, TypeDesc::map_of(TypeDesc::of_struct(&route)))
            .attr(catalog::MOVER_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&mover)))
            .attr(catalog::SENSOR_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&sensor)))
            .attr(catalog::COMM_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&comm)))
            .attr(catalog::ROUTER_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&router)))
            .attr(catalog::WEAPON_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&weapon)))
            .attr(catalog::PROCESSOR_TYPE, TypeDesc::map_of(TypeDesc::of_struct(&processor)))
            .attr(catalog::SCENARIO, TypeDesc::of_struct(&scenario)),
    );

    reg
}

/// Build the basic-type tree for `registry`, populated with [`BASIC_TYPES`].
pub fn builtin_basic_root(registry: &TypeRegistry) -> Value {
    let mut root = registry.default_root();
    for (catalog_name, entry, type_name) in BASIC_TYPES {
        let Some(ty) = registry.get(type_name) else {
            continue;
        };
        let map = root
            .as_struct_mut()
            .and_then(|s| s.attr_mut(catalog_name))
            .and_then(Value::as_object_map_mut);
        if let Some(map) = map {
            map.insert(*entry, Value::Struct(StructValue::new(ty)));
        }
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsf_proxy_path::Path;

    #[test]
    fn test_root_has_every_catalog() {
        let reg = builtin_registry();
        let root = reg.default_root();
        for name in [
            catalog::PLATFORM,
            catalog::PLATFORM_TYPE,
            catalog::ZONE,
            catalog::ROUTE,
            catalog::MOVER_TYPE,
            catalog::SENSOR_TYPE,
            catalog::COMM_TYPE,
            catalog::ROUTER_TYPE,
            catalog::WEAPON_TYPE,
            catalog::PROCESSOR_TYPE,
        ] {
            assert!(root.attr(name).and_then(Value::as_object_map).is_some(), "{name}");
        }
        assert!(root.attr(catalog::SCENARIO).and_then(Value::as_struct).is_some());
    }

    #[test]
    fn test_mover_family() {
        let reg = builtin_registry();
        let air = reg.get("WSF_AIR_MOVER").unwrap();
        assert!(air.is_a("WSF_ROUTE_MOVER"));
        assert!(air.attribute("defaultRoute").is_some());
        assert!(!reg.get("WSF_SPACE_MOVER").unwrap().is_a("WSF_ROUTE_MOVER"));
        assert!(reg.derived_names("WSF_ROUTE_MOVER").contains(&"WSF_ROAD_MOVER"));
    }

    #[test]
    fn test_basic_root_holds_predefined_types() {
        let reg = builtin_registry();
        let basic = builtin_basic_root(&reg);
        let air: Path = "/moverType/WSF_AIR_MOVER".parse().unwrap();
        let value = basic.lookup(&air).unwrap();
        assert_eq!(value.as_struct().unwrap().type_name(), "WSF_AIR_MOVER");
        assert!(basic.lookup(&"/platformType/WSF_PLATFORM".parse().unwrap()).is_some());
    }
}
