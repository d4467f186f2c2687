#![allow(dead_code)]

use wsf_proxy::pm::{PmPlatform, PmRoot, PmRoute, PmWaypoint, PmZoneDefinition};
use wsf_proxy::{BasicData, LatLon, Path, Proxy, Quantity, UnitKind};

pub fn p(s: &str) -> Path {
    s.parse().unwrap()
}

pub fn feet(v: f64) -> BasicData {
    BasicData::from(Quantity::new(UnitKind::Length, v, "ft").unwrap())
}

pub fn meters(v: f64) -> BasicData {
    BasicData::from(Quantity::new(UnitKind::Length, v, "m").unwrap())
}

pub fn at(lat: f64, lon: f64) -> BasicData {
    BasicData::from(LatLon::new(lat, lon))
}

/// Builds small scenarios through the typed accessors.
pub struct ScenarioBuilder {
    proxy: Proxy,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            proxy: Proxy::with_defaults(),
        }
    }

    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    pub fn root(&self) -> PmRoot {
        PmRoot::new(&self.proxy)
    }

    /// Declare platform type `name` derived from `base`.
    pub fn platform_type(self, name: &str, base: &str) -> Self {
        self.root().platform_types().add_instance(name, base).unwrap();
        self
    }

    /// Declare platform `name` of type `type_name`.
    pub fn platform(self, name: &str, type_name: &str) -> Self {
        self.root().platforms().add_instance(name, type_name).unwrap();
        self
    }

    pub fn mover(self, platform: &str, mover_type: &str) -> Self {
        self.find(platform).set_mover(mover_type).unwrap();
        self
    }

    /// Append a waypoint to the platform's own route.
    pub fn waypoint(self, platform: &str, lat: f64, lon: f64, alt_ft: f64) -> Self {
        let route = self.find(platform).mover().unwrap().default_route().unwrap();
        let wp = route.add_waypoint().unwrap();
        assert!(wp.assign_attribute("position", at(lat, lon)));
        assert!(wp.assign_attribute("altitude", feet(alt_ft)));
        self
    }

    /// Declare global route `name` with one waypoint per point.
    pub fn global_route(self, name: &str, points: &[(f64, f64)]) -> Self {
        let route: PmRoute = self.root().routes().add_default(name, "Route").unwrap();
        for &(lat, lon) in points {
            let wp = route.add_waypoint().unwrap();
            assert!(wp.assign_attribute("position", at(lat, lon)));
        }
        self
    }

    pub fn use_route(self, platform: &str, route: &str) -> Self {
        let mover = self.find(platform).mover().unwrap();
        assert!(mover.assign_attribute("useRoute", BasicData::from(route)));
        self
    }

    pub fn commander(self, platform: &str, chain: &str, commander: &str) -> Self {
        assert!(self.find(platform).set_commander(chain, commander));
        self
    }

    pub fn global_zone(self, name: &str) -> Self {
        let _: PmZoneDefinition = self.root().zones().add_default(name, "ZoneDefinition").unwrap();
        self
    }

    /// Point global zone `name` at zone `reference`.
    pub fn zone_reference(self, name: &str, reference: &str) -> Self {
        let zone = self.root().find_global_zone(name).unwrap();
        assert!(zone.assign_attribute("referenceZone", BasicData::from(reference)));
        self
    }

    pub fn find(&self, platform: &str) -> PmPlatform {
        self.root().find_platform(platform).unwrap()
    }

    pub fn first_waypoint(&self, platform: &str) -> PmWaypoint {
        self.find(platform).first_waypoint().unwrap()
    }

    pub fn build(self) -> Proxy {
        self.proxy
    }
}
