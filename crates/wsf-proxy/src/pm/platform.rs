//! Platforms and their parts.

use std::collections::BTreeMap;

use wsf_proxy_path::Key;

use super::{pm_struct, typed, PmList, PmMover, PmNode, PmObjectMapT, PmRoot, PmRoute, PmWaypoint, PmZone};
use crate::geo;
use crate::schema::catalog;
use crate::units::{Quantity, UnitKind};
use crate::value::{AltitudeReference, BasicData, LatLon, Value};

pm_struct!(
    /// A platform instance (`/platform/X`) or platform type
    /// (`/platformType/X`).
    PmPlatform,
    "Platform"
);

impl PmPlatform {
    pub fn side(&self) -> Option<String> {
        self.get_attr("side")
    }

    pub fn icon(&self) -> Option<String> {
        self.get_attr("icon")
    }

    /// Returns `true` for an entry of the platform type catalog.
    pub fn is_platform_type(&self) -> bool {
        self.path().get(0).and_then(Key::as_name) == Some(catalog::PLATFORM_TYPE)
    }

    // ── Movement ──────────────────────────────────────────────────────────

    pub fn mover(&self) -> Option<PmMover> {
        typed(self.at_key("mover"))
    }

    /// Replace the mover with a new instance of the mover type `type_name`.
    pub fn set_mover(&self, type_name: &str) -> Option<PmMover> {
        let type_path = PmRoot::type_path(catalog::MOVER_TYPE, type_name);
        if !self.at_key("mover").replace_with_instance(&type_path) {
            return None;
        }
        self.mover()
    }

    pub fn initial_route(&self) -> Option<PmRoute> {
        self.mover()?.initial_route()
    }

    pub fn first_waypoint(&self) -> Option<PmWaypoint> {
        self.initial_route()?.waypoint(0)
    }

    /// The platform's own `position`, ignoring its route.
    pub fn own_position(&self) -> Option<LatLon> {
        self.get_attr("position")
    }

    pub fn own_altitude(&self) -> Option<Quantity> {
        self.get_attr("altitude")
    }

    pub fn own_altitude_reference(&self) -> Option<AltitudeReference> {
        self.get_attr("altitudeReference")
    }

    pub fn own_heading(&self) -> Option<Quantity> {
        self.get_attr("heading")
    }

    /// Starting location: the first waypoint's position when it has one,
    /// else the platform's own.
    pub fn position(&self) -> Option<LatLon> {
        self.first_waypoint()
            .and_then(|w| w.position())
            .or_else(|| self.own_position())
    }

    /// Starting altitude: the first waypoint's when it has one, else the
    /// platform's own.
    pub fn altitude(&self) -> Option<Quantity> {
        self.first_waypoint()
            .and_then(|w| w.altitude())
            .or_else(|| self.own_altitude())
    }

    /// Reference surface of [`PmPlatform::altitude`].
    pub fn altitude_reference(&self) -> AltitudeReference {
        match self.first_waypoint() {
            Some(w) if w.altitude().is_some() => w.altitude_reference(),
            _ => self.own_altitude_reference().unwrap_or_default(),
        }
    }

    /// Starting heading: the platform's own, else the first waypoint's,
    /// else the bearing from the first waypoint to the second.
    pub fn initial_heading(&self) -> Option<Quantity> {
        if let Some(heading) = self.own_heading() {
            return Some(heading);
        }
        let route = self.initial_route()?;
        let first = route.waypoint(0)?;
        if let Some(heading) = first.heading() {
            return Some(heading);
        }
        let from = first.position()?;
        let to = route.waypoint(1)?.position()?;
        Some(Quantity::from_si(UnitKind::Angle, geo::bearing(from, to)))
    }

    // ── Parts ─────────────────────────────────────────────────────────────

    pub fn sensors(&self) -> PmObjectMapT<PmSensor> {
        PmObjectMapT::new(self.at_key("sensors"))
    }

    pub fn comms(&self) -> PmObjectMapT<PmComm> {
        PmObjectMapT::new(self.at_key("comms"))
    }

    pub fn routers(&self) -> PmObjectMapT<PmRouter> {
        PmObjectMapT::new(self.at_key("routers"))
    }

    pub fn weapons(&self) -> PmObjectMapT<PmWeapon> {
        PmObjectMapT::new(self.at_key("weapons"))
    }

    pub fn processors(&self) -> PmObjectMapT<PmProcessor> {
        PmObjectMapT::new(self.at_key("processors"))
    }

    /// Zones declared on this platform.
    pub fn zones(&self) -> PmObjectMapT<PmZone> {
        PmObjectMapT::new(self.at_key("zone"))
    }

    pub fn command_chains(&self) -> PmObjectMapT<PmCommandChain> {
        PmObjectMapT::new(self.at_key("commandChain"))
    }

    pub fn fuel(&self) -> Option<PmFuel> {
        typed(self.at_key("fuel"))
    }

    pub fn aux_data(&self) -> Option<PmAuxData> {
        typed(self.at_key("auxData"))
    }

    pub fn categories(&self) -> PmList {
        PmList::new(self.at_key("categories"))
    }

    pub fn find_router(&self, name: &str) -> Option<PmRouter> {
        self.routers().find(name)
    }

    /// Commander of command chain `chain`.
    pub fn commander(&self, chain: &str) -> Option<PmPlatform> {
        self.command_chains().find(chain)?.commander()
    }

    /// Set the commander of command chain `chain`, adding the chain if the
    /// platform has none by that name.
    pub fn set_commander(&self, chain: &str, commander: &str) -> bool {
        let chains = self.command_chains();
        if let Some(existing) = chains.find(chain) {
            return existing.set_commander(commander);
        }
        match chains.add_default::<PmCommandChain>(chain, "CommandChain") {
            Some(added) => added.set_commander(commander),
            None => false,
        }
    }
}

// ── Parts ─────────────────────────────────────────────────────────────────

/// Attributes shared by every platform part.
pub trait PmPart: PmNode {
    /// Parts are on unless turned off.
    fn is_on(&self) -> bool {
        self.node().get_attr("on").unwrap_or(true)
    }

    fn debug(&self) -> bool {
        self.node().get_attr("debug").unwrap_or(false)
    }

    fn category(&self) -> Option<String> {
        self.node().get_attr("category")
    }

    /// The platform (or platform type) this part is mounted on; `None` for
    /// an entry of a part type catalog.
    fn parent_platform(&self) -> Option<PmPlatform> {
        typed(self.node().parent()?.parent()?)
    }
}

pm_struct!(
    /// Any platform part, read through the attributes every part shares.
    PmPlatformPart,
    "PlatformPart"
);
impl PmPart for PmPlatformPart {}

pm_struct!(PmSensor, "Sensor");
impl PmPart for PmSensor {}

impl PmSensor {
    pub fn frame_time(&self) -> Option<Quantity> {
        self.get_attr("frameTime")
    }

    pub fn maximum_range(&self) -> Option<Quantity> {
        self.get_attr("maximumRange")
    }
}

pm_struct!(PmComm, "Comm");
impl PmPart for PmComm {}

impl PmComm {
    pub fn network(&self) -> Option<String> {
        self.get_attr("network")
    }

    pub fn router_name(&self) -> Option<String> {
        self.get_attr::<String>("router").filter(|name| !name.is_empty())
    }

    /// The router this comm names, looked up on the owning platform.
    pub fn router(&self) -> Option<PmRouter> {
        let name = self.router_name()?;
        self.parent_platform()?.find_router(&name)
    }

    pub fn frequency(&self) -> Option<Quantity> {
        self.get_attr("frequency")
    }

    pub fn data_rate(&self) -> Option<Quantity> {
        self.get_attr("dataRate")
    }
}

pm_struct!(PmRouter, "Router");
impl PmPart for PmRouter {}

impl PmRouter {
    pub fn gateway(&self) -> Option<String> {
        self.get_attr("gateway")
    }

    pub fn hop_limit(&self) -> Option<i64> {
        self.get_attr("hopLimit")
    }
}

pm_struct!(PmWeapon, "Weapon");
impl PmPart for PmWeapon {}

impl PmWeapon {
    pub fn launched_platform_type_name(&self) -> Option<String> {
        self.get_attr::<String>("launchedPlatformType")
            .filter(|name| !name.is_empty())
    }

    /// The platform type this weapon launches.
    pub fn launched_platform_type(&self) -> Option<PmPlatform> {
        let name = self.launched_platform_type_name()?;
        PmRoot::of(self).platform_types().find(&name)
    }

    pub fn quantity(&self) -> Option<f64> {
        self.get_attr("quantity")
    }
}

pm_struct!(PmProcessor, "Processor");
impl PmPart for PmProcessor {}

impl PmProcessor {
    pub fn update_interval(&self) -> Option<Quantity> {
        self.get_attr("updateInterval")
    }
}

// ── Other platform blocks ─────────────────────────────────────────────────

pm_struct!(PmFuel, "Fuel");

impl PmFuel {
    pub fn maximum_quantity(&self) -> Option<Quantity> {
        self.get_attr("maximumQuantity")
    }

    pub fn initial_quantity(&self) -> Option<Quantity> {
        self.get_attr("initialQuantity")
    }

    pub fn reserve_quantity(&self) -> Option<Quantity> {
        self.get_attr("reserveQuantity")
    }
}

pm_struct!(
    /// One link of a platform's command chains, keyed by chain name.
    PmCommandChain,
    "CommandChain"
);

impl PmCommandChain {
    pub fn commander_name(&self) -> Option<String> {
        self.get_attr::<String>("commander").filter(|name| !name.is_empty())
    }

    /// The commanding platform instance.
    pub fn commander(&self) -> Option<PmPlatform> {
        let name = self.commander_name()?;
        PmRoot::of(self).find_platform(&name)
    }

    pub fn set_commander(&self, commander: &str) -> bool {
        self.assign_attribute("commander", BasicData::from(commander))
    }
}

pm_struct!(
    /// Free-form name/value pairs attached to a platform or zone.
    PmAuxData,
    "AuxData"
);

impl PmAuxData {
    /// Every entry rendered as text, by name.
    pub fn values(&self) -> BTreeMap<String, String> {
        let Some(Value::ObjectMap(vals)) = self.effective_attr("vals") else {
            return BTreeMap::new();
        };
        vals.iter()
            .map(|(name, v)| (name.to_string(), v.to_display_string()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.at_key("vals").get_attr(name)
    }

    /// Set entry `name`, adding it when absent.
    pub fn set(&self, name: &str, value: &str) -> bool {
        let vals = self.at_key("vals");
        let entry = vals.at_key(name);
        if entry.is_null() {
            vals.add_child(name, Value::from(BasicData::from(value)))
        } else {
            entry.assign(BasicData::from(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Proxy;

    fn p1(proxy: &Proxy) -> PmPlatform {
        PmRoot::new(proxy).platforms().add_instance("P1", "WSF_PLATFORM").unwrap()
    }

    fn waypoint_at(route: &PmRoute, lat: f64, lon: f64) -> PmWaypoint {
        let wp = route.add_waypoint().unwrap();
        assert!(wp.assign_attribute("position", BasicData::from(LatLon::new(lat, lon))));
        wp
    }

    #[test]
    fn test_location_prefers_first_waypoint() {
        let proxy = Proxy::with_defaults();
        let platform = p1(&proxy);
        assert!(platform.assign_attribute("position", BasicData::from(LatLon::new(1.0, 2.0))));
        assert_eq!(platform.position(), Some(LatLon::new(1.0, 2.0)));

        let route = platform.set_mover("WSF_GROUND_MOVER").unwrap().default_route().unwrap();
        let wp = waypoint_at(&route, 10.0, 20.0);
        assert_eq!(platform.position(), Some(LatLon::new(10.0, 20.0)));

        assert!(platform.assign_attribute("altitude", BasicData::from(Quantity::new(UnitKind::Length, 5.0, "m").unwrap())));
        assert_eq!(platform.altitude().map(|q| q.si()), Some(5.0));
        assert_eq!(platform.altitude_reference(), AltitudeReference::Default);
        assert!(wp.assign_attribute("altitude", BasicData::from(Quantity::new(UnitKind::Length, 100.0, "m").unwrap())));
        assert_eq!(platform.altitude().map(|q| q.si()), Some(100.0));
        assert_eq!(platform.altitude_reference(), AltitudeReference::Agl);
    }

    #[test]
    fn test_initial_heading_falls_back_to_bearing() {
        let proxy = Proxy::with_defaults();
        let platform = p1(&proxy);
        let route = platform.set_mover("WSF_AIR_MOVER").unwrap().default_route().unwrap();
        waypoint_at(&route, 0.0, 0.0);
        assert!(platform.initial_heading().is_none());
        waypoint_at(&route, 0.0, 1.0);
        let heading = platform.initial_heading().unwrap();
        assert!((heading.si() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

        let own = Quantity::new(UnitKind::Angle, 10.0, "deg").unwrap();
        assert!(platform.assign_attribute("heading", BasicData::from(own.clone())));
        assert_eq!(platform.initial_heading(), Some(own));
    }

    #[test]
    fn test_comm_resolves_router_on_owner() {
        let proxy = Proxy::with_defaults();
        let platform = p1(&proxy);
        let router = platform.routers().add_instance("r1", "WSF_COMM_ROUTER").unwrap();
        let comm = platform.comms().add_instance("c1", "WSF_COMM_TRANSCEIVER").unwrap();
        assert!(comm.router().is_none());
        assert!(comm.assign_attribute("router", BasicData::from("r1")));
        assert_eq!(comm.router(), Some(router));
        assert_eq!(comm.parent_platform(), Some(platform));
        assert!(comm.is_on());
    }

    #[test]
    fn test_weapon_and_commander_resolution() {
        let proxy = Proxy::with_defaults();
        let root = PmRoot::new(&proxy);
        let missile: PmPlatform = root.platform_types().add_instance("MISSILE", "WSF_PLATFORM").unwrap();
        assert!(missile.is_platform_type());
        let boss = p1(&proxy);
        let wingman: PmPlatform = root.platforms().add_instance("P2", "WSF_PLATFORM").unwrap();

        let weapon = wingman.weapons().add_instance("w1", "WSF_EXPLICIT_WEAPON").unwrap();
        assert!(weapon.assign_attribute("launchedPlatformType", BasicData::from("MISSILE")));
        assert_eq!(weapon.launched_platform_type(), Some(missile));

        assert!(wingman.set_commander("default", "P1"));
        assert_eq!(wingman.commander("default"), Some(boss));
        assert!(wingman.commander("other").is_none());
    }

    #[test]
    fn test_aux_data_entries() {
        let proxy = Proxy::with_defaults();
        let aux = p1(&proxy).aux_data().unwrap();
        assert!(aux.set("owner", "blue team"));
        assert!(aux.set("owner", "red team"));
        assert_eq!(aux.get("owner").as_deref(), Some("red team"));
        assert_eq!(aux.values().len(), 1);
    }
}
