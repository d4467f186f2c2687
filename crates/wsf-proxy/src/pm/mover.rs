//! Movers, routes and waypoints.

use super::{pm_struct, typed, PmListT, PmRoot};
use crate::units::Quantity;
use crate::value::{AltitudeReference, BasicData, LatLon};

pm_struct!(
    /// A platform mover or mover type.
    PmMover,
    "Mover"
);

impl PmMover {
    /// Name of the global route this mover follows, if one is named.
    pub fn use_route(&self) -> Option<String> {
        self.get_attr::<String>("useRoute").filter(|name| !name.is_empty())
    }

    /// The route declared inside the mover.
    pub fn default_route(&self) -> Option<PmRoute> {
        typed(self.at_key("defaultRoute"))
    }

    /// The route the mover starts on: the global route named by
    /// `useRoute` when one is named, else the mover's own route. A named
    /// route that does not exist yields `None`.
    pub fn initial_route(&self) -> Option<PmRoute> {
        match self.use_route() {
            Some(name) => PmRoot::of(self).find_global_route(&name),
            None => self.default_route(),
        }
    }

    /// Altitude reference implied for waypoints of this mover's own route.
    pub fn default_altitude_reference(&self) -> AltitudeReference {
        let Some(proxy) = self.proxy() else {
            return AltitudeReference::Default;
        };
        let config = proxy.config();
        if config.msl_mover_types.iter().any(|t| self.is_a_struct_type_of(t)) {
            AltitudeReference::Msl
        } else if self.is_a_struct_type_of(&config.route_mover_type) {
            AltitudeReference::Agl
        } else {
            AltitudeReference::Default
        }
    }
}

pm_struct!(
    /// A route: a mover's own route or an entry of the global route catalog.
    PmRoute,
    "Route"
);

impl PmRoute {
    pub fn waypoints(&self) -> PmListT<PmWaypoint> {
        PmListT::new(self.at_key("waypoints"))
    }

    pub fn waypoint(&self, index: usize) -> Option<PmWaypoint> {
        self.waypoints().get(index)
    }

    pub fn len(&self) -> usize {
        self.waypoints().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an empty waypoint.
    pub fn add_waypoint(&self) -> Option<PmWaypoint> {
        self.waypoints().push_default()
    }

    /// The mover this route is declared in; `None` for a global route.
    pub fn parent_mover(&self) -> Option<PmMover> {
        typed(self.parent()?)
    }

    /// Returns `true` if the route is declared inside a mover.
    pub fn is_local(&self) -> bool {
        self.parent_mover().is_some()
    }

    /// Index of the first waypoint labelled `label`.
    pub fn find_label(&self, label: &str) -> Option<usize> {
        self.waypoints()
            .values()
            .iter()
            .position(|w| w.label().as_deref() == Some(label))
    }
}

pm_struct!(PmWaypoint, "Waypoint");

impl PmWaypoint {
    pub fn position(&self) -> Option<LatLon> {
        self.get_attr("position")
    }

    pub fn altitude(&self) -> Option<Quantity> {
        self.get_attr("altitude")
    }

    pub fn speed(&self) -> Option<Quantity> {
        self.get_attr("speed")
    }

    pub fn heading(&self) -> Option<Quantity> {
        self.get_attr("heading")
    }

    pub fn label(&self) -> Option<String> {
        self.get_attr("label")
    }

    pub fn goto_label(&self) -> Option<String> {
        self.get_attr("gotoLabel")
    }

    pub fn pause_time(&self) -> Option<Quantity> {
        self.get_attr("pauseTime")
    }

    pub fn climb_rate(&self) -> Option<Quantity> {
        self.get_attr("climbRate")
    }

    pub fn linear_acceleration(&self) -> Option<Quantity> {
        self.get_attr("linearAcceleration")
    }

    /// The altitude reference written on this waypoint, if any.
    pub fn explicit_altitude_reference(&self) -> Option<AltitudeReference> {
        self.get_attr::<AltitudeReference>("altitudeReference")
            .filter(|r| *r != AltitudeReference::Default)
    }

    /// The route holding this waypoint.
    pub fn parent_route(&self) -> Option<PmRoute> {
        typed(self.parent()?.parent()?)
    }

    /// Explicit reference if written; else, on a mover's own route, the
    /// mover's default; else `Default`, left to the consumer.
    pub fn altitude_reference(&self) -> AltitudeReference {
        if let Some(explicit) = self.explicit_altitude_reference() {
            return explicit;
        }
        self.parent_route()
            .and_then(|route| route.parent_mover())
            .map_or(AltitudeReference::Default, |mover| mover.default_altitude_reference())
    }

    pub fn set_altitude_reference(&self, reference: AltitudeReference) -> bool {
        self.assign_attribute("altitudeReference", BasicData::from(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::PmPlatform;
    use crate::proxy::Proxy;

    fn platform_with_mover(proxy: &Proxy, mover_type: &str) -> PmPlatform {
        let platform: PmPlatform = PmRoot::new(proxy).platforms().add_instance("P1", "WSF_PLATFORM").unwrap();
        platform.set_mover(mover_type).unwrap();
        platform
    }

    #[test]
    fn test_local_route_reference_follows_mover_type() {
        let proxy = Proxy::with_defaults();
        let air = platform_with_mover(&proxy, "WSF_AIR_MOVER");
        let wp = air.mover().unwrap().default_route().unwrap().add_waypoint().unwrap();
        assert_eq!(wp.altitude_reference(), AltitudeReference::Msl);

        let proxy = Proxy::with_defaults();
        let ground = platform_with_mover(&proxy, "WSF_GROUND_MOVER");
        let wp = ground.mover().unwrap().default_route().unwrap().add_waypoint().unwrap();
        assert_eq!(wp.altitude_reference(), AltitudeReference::Agl);

        let proxy = Proxy::with_defaults();
        let space = platform_with_mover(&proxy, "WSF_SPACE_MOVER");
        let wp = space.mover().unwrap().default_route().unwrap().add_waypoint().unwrap();
        assert_eq!(wp.altitude_reference(), AltitudeReference::Default);
    }

    #[test]
    fn test_explicit_reference_wins() {
        let proxy = Proxy::with_defaults();
        let air = platform_with_mover(&proxy, "WSF_AIR_MOVER");
        let wp = air.mover().unwrap().default_route().unwrap().add_waypoint().unwrap();
        assert!(wp.set_altitude_reference(AltitudeReference::Agl));
        assert_eq!(wp.altitude_reference(), AltitudeReference::Agl);
    }

    #[test]
    fn test_initial_route_selection() {
        let proxy = Proxy::with_defaults();
        let root = PmRoot::new(&proxy);
        let global: PmRoute = root.routes().add_default("R1", "Route").unwrap();
        assert!(global.add_waypoint().is_some());
        let platform = platform_with_mover(&proxy, "WSF_AIR_MOVER");
        let mover = platform.mover().unwrap();

        let route = mover.initial_route().unwrap();
        assert!(route.is_local());
        assert!(mover.assign_attribute("useRoute", BasicData::from("R1")));
        let route = mover.initial_route().unwrap();
        assert_eq!(route.path_string(), "/routes/R1");
        assert!(!route.is_local());
        assert_eq!(route.waypoint(0).unwrap().altitude_reference(), AltitudeReference::Default);

        assert!(mover.assign_attribute("useRoute", BasicData::from("R9")));
        assert!(mover.initial_route().is_none());
    }

    #[test]
    fn test_find_label() {
        let proxy = Proxy::with_defaults();
        let route: PmRoute = PmRoot::new(&proxy).routes().add_default("R1", "Route").unwrap();
        route.add_waypoint().unwrap();
        let second = route.add_waypoint().unwrap();
        assert!(second.assign_attribute("label", BasicData::from("turn")));
        assert_eq!(route.find_label("turn"), Some(1));
        assert_eq!(route.find_label("land"), None);
        assert_eq!(route.len(), 2);
    }
}
