//! Zones, zone sets and the reference-zone chain.
//!
//! # Overview
//!
//! A zone definition may name a `referenceZone`. Any attribute it leaves
//! unset is then read from the referenced zone, looked up first among the
//! zones of the same parent platform and then among global zones, and so
//! on along the chain. Each lookup carries the set of zone names already
//! visited; a name seen twice ends the walk with the local (unset) value.
//!
//! Position and heading also resolve through platforms: a zone declared on
//! a platform, or anchored to one by `referencePlatform`, takes the
//! platform's starting location and heading unless it sets its own. For a
//! `referencePlatform` anchor, a local `position` or `heading` only wins
//! when it was declared after the `referencePlatform` line.

use std::collections::BTreeSet;

use wsf_proxy_path::Key;

use super::{pm_struct, typed, PmAuxData, PmList, PmListT, PmNode, PmPlatform, PmRoot};
use crate::geo;
use crate::schema::catalog;
use crate::units::Quantity;
use crate::value::{Color, FromBasic, LatLon, Length2};

/// A planar or geodetic point: `[x, y]` in meters, or `[lat, lon]` in
/// degrees.
pub type Point = [f64; 2];

/// Shape of a zone definition, stored as the integer `type` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ZoneDefinitionType {
    #[default]
    NotSet,
    Circular,
    Elliptical,
    Polygonal,
    Spherical,
}

impl ZoneDefinitionType {
    /// Out-of-range codes read as `NotSet`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ZoneDefinitionType::Circular,
            2 => ZoneDefinitionType::Elliptical,
            3 => ZoneDefinitionType::Polygonal,
            4 => ZoneDefinitionType::Spherical,
            _ => ZoneDefinitionType::NotSet,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ZoneDefinitionType::NotSet => 0,
            ZoneDefinitionType::Circular => 1,
            ZoneDefinitionType::Elliptical => 2,
            ZoneDefinitionType::Polygonal => 3,
            ZoneDefinitionType::Spherical => 4,
        }
    }
}

// ── Zone ──────────────────────────────────────────────────────────────────

pm_struct!(
    /// A zone of either kind: a definition or a zone set.
    PmZone,
    "Zone"
);

impl PmZone {
    pub fn is_definition(&self) -> bool {
        self.is_a_predefined_struct_type_of("ZoneDefinition")
    }

    pub fn is_zone_set(&self) -> bool {
        self.is_a_predefined_struct_type_of("ZoneSet")
    }

    pub fn as_definition(&self) -> Option<PmZoneDefinition> {
        typed(self.node().clone())
    }

    pub fn as_zone_set(&self) -> Option<PmZoneSet> {
        typed(self.node().clone())
    }

    pub fn aux_data(&self) -> Option<PmAuxData> {
        typed(self.at_key("auxData"))
    }

    /// The zone this one was ultimately copied from: the end of its
    /// inheritance chain, short of the predefined types.
    pub fn source_zone(&self) -> PmZone {
        let mut source = self.clone();
        let mut seen = BTreeSet::from([self.path().clone()]);
        while let Some(next) = source.inherited() {
            if next.is_of_basic_tree() || !seen.insert(next.path().clone()) {
                break;
            }
            source = PmZone::wrap(next);
        }
        source
    }

    fn color(&self, attr: &str) -> Option<Color> {
        if let Some(def) = self.as_definition() {
            return def.color_attr(attr, &mut BTreeSet::new());
        }
        self.get_attr(attr).or_else(|| self.source_zone().get_attr(attr))
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.color("fillColor")
    }

    pub fn line_color(&self) -> Option<Color> {
        self.color("lineColor")
    }

    /// Name of the platform declaring this zone, or the configured global
    /// label for zones not declared on a platform instance.
    pub fn parent_platform_name(&self) -> String {
        let path = self.path();
        let owner = (path.len() > 2 && path.get(0).and_then(Key::as_name) == Some(catalog::PLATFORM))
            .then(|| path.get(1).map(Key::to_string))
            .flatten()
            .filter(|name| PmRoot::of(self).platforms().contains(name));
        match owner {
            Some(name) => name,
            None => self
                .proxy()
                .map(|p| p.config().global_zone_label.clone())
                .unwrap_or_default(),
        }
    }

    /// The platform instance declaring this zone.
    pub fn parent_platform(&self) -> Option<PmPlatform> {
        let path = self.path();
        if path.len() <= 2 || path.get(0).and_then(Key::as_name) != Some(catalog::PLATFORM) {
            return None;
        }
        PmRoot::of(self).find_platform(&path.get(1)?.to_string())
    }

    /// Zone definitions, global or declared on any platform, whose
    /// `referenceZone` names this zone.
    pub fn referencing_zones(&self) -> Vec<PmZone> {
        let name = self.name();
        if name.is_empty() {
            return Vec::new();
        }
        let root = PmRoot::of(self);
        let references = |zone: &PmZone| {
            zone.as_definition()
                .and_then(|d| d.reference_zone_name())
                .is_some_and(|r| r == name)
        };
        let mut out: Vec<PmZone> = root.zones().all_values().into_iter().filter(references).collect();
        for platform in root.platforms().all_values() {
            out.extend(platform.zones().all_values().into_iter().filter(references));
        }
        out
    }

    /// Zone sets in this zone's scope (global, or the same platform) that
    /// include or exclude it by name.
    pub fn using_zone_sets(&self) -> Vec<PmZoneSet> {
        let name = self.name();
        let candidates = match self.parent_platform() {
            Some(platform) => platform.zones().all_values(),
            None => PmRoot::of(self).zones().all_values(),
        };
        candidates
            .iter()
            .filter_map(PmZone::as_zone_set)
            .filter(|set| set.uses_zone(&name))
            .collect()
    }
}

// ── Zone definition ───────────────────────────────────────────────────────

pm_struct!(PmZoneDefinition, "ZoneDefinition");

impl PmZoneDefinition {
    pub fn zone(&self) -> PmZone {
        PmZone::wrap(self.node().clone())
    }

    fn own<T: FromBasic>(&self, attr: &str) -> Option<T> {
        self.get_attr(attr)
    }

    /// Attribute `attr`, taken from the reference chain when unset here.
    fn zone_attr<T: FromBasic>(&self, attr: &str, visited: &mut BTreeSet<String>) -> Option<T> {
        if let Some(value) = self.own(attr) {
            return Some(value);
        }
        let name = self.reference_zone_name()?;
        let reference = self.reference_zone()?;
        if !visited.insert(name) {
            tracing::debug!(zone = %self.path(), attr, "reference zone cycle cut");
            return None;
        }
        reference.zone_attr(attr, visited)
    }

    fn chained<T: FromBasic>(&self, attr: &str) -> Option<T> {
        self.zone_attr(attr, &mut BTreeSet::new())
    }

    pub fn definition_type(&self) -> ZoneDefinitionType {
        self.chained::<i64>("type")
            .map_or(ZoneDefinitionType::NotSet, ZoneDefinitionType::from_code)
    }

    pub fn reference_zone_name(&self) -> Option<String> {
        self.own::<String>("referenceZone").filter(|n| !n.is_empty())
    }

    pub fn reference_platform_name(&self) -> Option<String> {
        self.own::<String>("referencePlatform").filter(|n| !n.is_empty())
    }

    /// The zone definition named by `referenceZone`: on the parent platform
    /// first, then among global zones.
    pub fn reference_zone(&self) -> Option<PmZoneDefinition> {
        let name = self.reference_zone_name()?;
        let local = self
            .zone()
            .parent_platform()
            .and_then(|p| p.zones().find(&name));
        let zone = local.or_else(|| PmRoot::of(self).find_global_zone(&name))?;
        zone.as_definition()
    }

    pub fn reference_platform(&self) -> Option<PmPlatform> {
        let name = self.reference_platform_name()?;
        PmRoot::of(self).find_platform(&name)
    }

    /// Returns `true` if `referencePlatform` is unset or names an existing
    /// platform.
    pub fn is_reference_platform_valid(&self) -> bool {
        match self.own::<String>("referencePlatform") {
            None => true,
            Some(name) => PmRoot::of(self).platforms().contains(&name),
        }
    }

    /// Returns `true` if `attr` was declared after `referencePlatform`.
    fn declared_after_reference_platform(&self, attr: &str) -> bool {
        let node = self.at_key(attr);
        !node.is_null()
            && self.at_key("referencePlatform").declaration_position() < node.declaration_position()
    }

    pub fn heading(&self) -> Option<Quantity> {
        if let Some(parent) = self.zone().parent_platform() {
            if self.own::<LatLon>("position").is_some() {
                return self.chained("heading");
            }
            return self.own("heading").or_else(|| parent.initial_heading());
        }
        if let Some(reference) = self.reference_platform() {
            if self.declared_after_reference_platform("position")
                || self.declared_after_reference_platform("heading")
            {
                return self.chained("heading");
            }
            return reference.initial_heading();
        }
        self.chained("heading")
    }

    pub fn position(&self) -> Option<LatLon> {
        if let Some(parent) = self.zone().parent_platform() {
            return self.own("position").or_else(|| parent.position());
        }
        if let Some(reference) = self.reference_platform() {
            if self.declared_after_reference_platform("position") {
                return self.own("position");
            }
            return reference.position();
        }
        self.own("position")
    }

    pub fn negative(&self) -> bool {
        self.own("negative").unwrap_or(false)
    }

    pub fn minimum_altitude(&self) -> Option<Quantity> {
        self.chained("minimumAltitude")
    }

    pub fn maximum_altitude(&self) -> Option<Quantity> {
        self.chained("maximumAltitude")
    }

    pub fn minimum_radius(&self) -> Option<Quantity> {
        self.chained("minimumRadius")
    }

    pub fn maximum_radius(&self) -> Option<Quantity> {
        self.chained("maximumRadius")
    }

    pub fn longitudinal_axis(&self) -> Option<Quantity> {
        self.chained("longitudinalAxis")
    }

    pub fn lateral_axis(&self) -> Option<Quantity> {
        self.chained("lateralAxis")
    }

    pub fn start_angle(&self) -> Option<Quantity> {
        self.chained("startAngle")
    }

    pub fn stop_angle(&self) -> Option<Quantity> {
        self.chained("stopAngle")
    }

    // ── Points ────────────────────────────────────────────────────────────

    fn points_def_in(&self, visited: &mut BTreeSet<String>) -> PmZoneDefinition {
        if !PmList::new(self.at_key("points")).is_empty() {
            return self.clone();
        }
        let (Some(name), Some(reference)) = (self.reference_zone_name(), self.reference_zone()) else {
            return self.clone();
        };
        if !visited.insert(name) {
            return self.clone();
        }
        reference.points_def_in(visited)
    }

    /// The first zone along the reference chain that declares points.
    pub fn points_def(&self) -> PmZoneDefinition {
        self.points_def_in(&mut BTreeSet::new())
    }

    /// Points of [`PmZoneDefinition::points_def`].
    pub fn point_list(&self) -> PmListT<PmZonePoint> {
        PmListT::new(self.points_def().at_key("points"))
    }

    pub fn point_count(&self) -> usize {
        self.point_list().len()
    }

    fn flag(&self, attr: &str) -> bool {
        self.points_def().own(attr).unwrap_or(false)
    }

    pub fn use_lat_lon(&self) -> bool {
        self.flag("useLatLon")
    }

    pub fn use_mgrs(&self) -> bool {
        self.flag("useMGRS")
    }

    pub fn use_polar(&self) -> bool {
        self.flag("usePolar")
    }

    pub fn use_offset(&self) -> bool {
        !(self.use_lat_lon() || self.use_mgrs() || self.use_polar())
    }

    /// Returns `true` if points are geodetic and not relative to a
    /// reference zone.
    pub fn is_absolute(&self) -> bool {
        (self.use_lat_lon() || self.use_mgrs()) && self.reference_zone_name().is_none()
    }

    /// Geodetic anchor of the points: the points definition's position,
    /// else its first point's latitude and longitude.
    pub fn reference_point(&self) -> Option<Point> {
        let def = self.points_def();
        if let Some(pos) = def.position() {
            return Some([pos.lat, pos.lon]);
        }
        let first = PmListT::<PmZonePoint>::new(def.at_key("points")).get(0)?;
        Some([first.latitude()?, first.longitude()?])
    }

    fn resolve_point(&self, point: &PmZonePoint, style: PointStyle, anchor: Option<Point>) -> Option<Point> {
        match style {
            PointStyle::LatLon => {
                let (lat, lon) = (point.latitude()?, point.longitude()?);
                match anchor {
                    Some([alat, alon]) if self.reference_zone_name().is_some() => {
                        let (north, east) = geo::ned_offset(LatLon::new(alat, alon), LatLon::new(lat, lon));
                        Some([north, east])
                    }
                    _ => Some([lat, lon]),
                }
            }
            PointStyle::Mgrs => None,
            PointStyle::Polar => {
                let range = point.range().map_or(0.0, |q| q.si());
                let bearing = point.bearing().map_or(0.0, |q| q.si());
                Some([range * bearing.cos(), range * bearing.sin()])
            }
            PointStyle::Offset => Some([point.x()?, point.y()?]),
        }
    }

    /// Every point, resolved: geodetic points relative to a reference
    /// zone become north/east offsets from the reference point, polar
    /// points become `[r cos b, r sin b]`, offsets are taken as written.
    /// The style of the first point applies to all. MGRS points are not
    /// converted and are skipped.
    pub fn points(&self) -> Vec<Point> {
        let list = self.point_list();
        let Some(first) = list.get(0) else {
            return Vec::new();
        };
        let style = PointStyle::of(&first);
        let anchor = self.reference_point();
        list.values()
            .iter()
            .filter_map(|p| self.resolve_point(p, style, anchor))
            .collect()
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        let point = self.point_list().get(index)?;
        self.resolve_point(&point, PointStyle::of(&point), self.reference_point())
    }

    // ── Anchors ───────────────────────────────────────────────────────────

    /// The reference platform, else the parent platform.
    pub fn anchor_platform(&self) -> Option<PmPlatform> {
        self.reference_platform()
            .or_else(|| self.zone().parent_platform())
    }

    /// Altitude of the anchor platform: the first waypoint of its initial
    /// route when the route has waypoints, else its own altitude.
    pub fn anchor_platform_altitude(&self) -> Option<Quantity> {
        let anchor = self.anchor_platform()?;
        match anchor.initial_route().filter(|r| !r.is_empty()) {
            Some(route) => route.waypoint(0)?.altitude(),
            None => anchor.own_altitude(),
        }
    }

    // ── Colors ────────────────────────────────────────────────────────────

    fn color_attr(&self, attr: &str, visited: &mut BTreeSet<String>) -> Option<Color> {
        if let Some(color) = self.own(attr) {
            return Some(color);
        }
        let reference = self.reference_zone()?;
        let name = self.reference_zone_name()?;
        if !visited.insert(name) {
            return None;
        }
        reference.color_attr(attr, visited)
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.color_attr("fillColor", &mut BTreeSet::new())
    }

    pub fn line_color(&self) -> Option<Color> {
        self.color_attr("lineColor", &mut BTreeSet::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointStyle {
    LatLon,
    Mgrs,
    Polar,
    Offset,
}

impl PointStyle {
    fn of(point: &PmZonePoint) -> Self {
        if point.latitude().is_some() {
            PointStyle::LatLon
        } else if point.mgrs().is_some() {
            PointStyle::Mgrs
        } else if point.bearing().is_some() {
            PointStyle::Polar
        } else {
            PointStyle::Offset
        }
    }
}

// ── Zone set ──────────────────────────────────────────────────────────────

pm_struct!(PmZoneSet, "ZoneSet");

impl PmZoneSet {
    pub fn zone(&self) -> PmZone {
        PmZone::wrap(self.node().clone())
    }

    pub fn inclusion_zones(&self) -> PmList {
        PmList::new(self.at_key("inclusionZones"))
    }

    pub fn exclusion_zones(&self) -> PmList {
        PmList::new(self.at_key("exclusionZones"))
    }

    /// Returns `true` if zone `name` is included or excluded by this set.
    pub fn uses_zone(&self, name: &str) -> bool {
        self.inclusion_zones()
            .strings()
            .iter()
            .chain(self.exclusion_zones().strings().iter())
            .any(|z| z == name)
    }
}

// ── Zone point ────────────────────────────────────────────────────────────

pm_struct!(PmZonePoint, "ZonePoint");

impl PmZonePoint {
    pub fn latitude(&self) -> Option<f64> {
        self.get_attr("latitude")
    }

    pub fn longitude(&self) -> Option<f64> {
        self.get_attr("longitude")
    }

    pub fn point(&self) -> Option<Length2> {
        self.get_attr("point")
    }

    pub fn mgrs(&self) -> Option<String> {
        self.get_attr::<String>("mgrs").filter(|m| !m.is_empty())
    }

    pub fn range(&self) -> Option<Quantity> {
        self.get_attr("range")
    }

    pub fn bearing(&self) -> Option<Quantity> {
        self.get_attr("bearing")
    }

    /// Offset x, falling back to the latitude value.
    pub fn x(&self) -> Option<f64> {
        self.point().map(|p| p.x).or_else(|| self.latitude())
    }

    /// Offset y, falling back to the longitude value.
    pub fn y(&self) -> Option<f64> {
        self.point().map(|p| p.y).or_else(|| self.longitude())
    }
}
