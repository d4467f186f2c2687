//! Typed accessors.
//!
//! # Overview
//!
//! Each accessor wraps a single [`Node`] and knows the schema of what it
//! points at: [`PmPlatform`] reads a platform's side and initial route,
//! [`PmWaypoint`] resolves its altitude reference, [`PmZoneDefinition`]
//! follows its reference-zone chain, and so on.
//!
//! Converting a generic node is checked: [`PmNode::try_from_node`] (and the
//! `TryFrom<Node>` impls) fail with [`ProxyError::TypeMismatch`] when the
//! node holds something else, or [`ProxyError::NullNode`] when it resolves
//! to nothing. Navigation helpers that may legitimately find nothing
//! return `Option`.

use wsf_proxy_path::Path;

use crate::error::ProxyError;
use crate::node::Node;
use crate::proxy::Proxy;
use crate::schema::catalog;

mod containers;
mod mover;
mod platform;
mod scenario;
mod zone;

pub use containers::{PmList, PmListT, PmObjectMap, PmObjectMapT};
pub use mover::{PmMover, PmRoute, PmWaypoint};
pub use platform::{
    PmAuxData, PmComm, PmCommandChain, PmFuel, PmPart, PmPlatform, PmPlatformPart, PmProcessor,
    PmRouter, PmSensor, PmWeapon,
};
pub use scenario::{Classification, PmClassification, PmClassificationLevel, PmScenario};
pub use zone::{PmZone, PmZoneDefinition, PmZonePoint, PmZoneSet, Point, ZoneDefinitionType};

/// A typed view of a [`Node`].
pub trait PmNode: Sized {
    /// Name reported in [`ProxyError::TypeMismatch`].
    const EXPECTED: &'static str;

    /// Returns `true` if `node` holds a value of this accessor's type.
    fn matches(node: &Node) -> bool;

    /// Wrap without checking.
    fn wrap(node: Node) -> Self;

    fn node(&self) -> &Node;

    fn into_node(self) -> Node;

    /// Wrap after checking the node resolves to the expected type.
    fn try_from_node(node: Node) -> Result<Self, ProxyError> {
        if node.is_null() {
            return Err(ProxyError::NullNode);
        }
        if !Self::matches(&node) {
            let found = node.type_name().unwrap_or_default();
            return Err(ProxyError::mismatch(Self::EXPECTED, found));
        }
        Ok(Self::wrap(node))
    }
}

/// Declare an accessor over a predefined struct type.
macro_rules! pm_struct {
    ($(#[$meta:meta])* $name:ident, $type_name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            node: $crate::node::Node,
        }

        impl $crate::pm::PmNode for $name {
            const EXPECTED: &'static str = $type_name;

            fn matches(node: &$crate::node::Node) -> bool {
                node.is_a_predefined_struct_type_of($type_name)
            }

            fn wrap(node: $crate::node::Node) -> Self {
                Self { node }
            }

            fn node(&self) -> &$crate::node::Node {
                &self.node
            }

            fn into_node(self) -> $crate::node::Node {
                self.node
            }
        }

        impl TryFrom<$crate::node::Node> for $name {
            type Error = $crate::error::ProxyError;

            fn try_from(node: $crate::node::Node) -> Result<Self, Self::Error> {
                <Self as $crate::pm::PmNode>::try_from_node(node)
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::node::Node;

            fn deref(&self) -> &$crate::node::Node {
                &self.node
            }
        }
    };
}

pub(crate) use pm_struct;

/// Checked conversion that treats a mismatch as absence.
pub(crate) fn typed<T: PmNode>(node: Node) -> Option<T> {
    T::try_from_node(node).ok()
}

// ── Root ──────────────────────────────────────────────────────────────────

/// The scenario root and its catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct PmRoot {
    node: Node,
}

impl PmNode for PmRoot {
    const EXPECTED: &'static str = "Root";

    fn matches(node: &Node) -> bool {
        node.path().is_root() && node.is_a_struct_type()
    }

    fn wrap(node: Node) -> Self {
        Self { node: node.root() }
    }

    fn node(&self) -> &Node {
        &self.node
    }

    fn into_node(self) -> Node {
        self.node
    }
}

impl std::ops::Deref for PmRoot {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl PmRoot {
    pub fn new(proxy: &Proxy) -> Self {
        Self { node: proxy.root() }
    }

    /// Root of the proxy `node` belongs to.
    pub fn of(node: &Node) -> Self {
        Self { node: node.root() }
    }

    fn catalog<T: PmNode>(&self, name: &str) -> PmObjectMapT<T> {
        PmObjectMapT::new(self.node.at_key(name))
    }

    pub fn platforms(&self) -> PmObjectMapT<PmPlatform> {
        self.catalog(catalog::PLATFORM)
    }

    pub fn platform_types(&self) -> PmObjectMapT<PmPlatform> {
        self.catalog(catalog::PLATFORM_TYPE)
    }

    pub fn zones(&self) -> PmObjectMapT<PmZone> {
        self.catalog(catalog::ZONE)
    }

    pub fn routes(&self) -> PmObjectMapT<PmRoute> {
        self.catalog(catalog::ROUTE)
    }

    pub fn mover_types(&self) -> PmObjectMapT<PmMover> {
        self.catalog(catalog::MOVER_TYPE)
    }

    pub fn sensor_types(&self) -> PmObjectMapT<PmSensor> {
        self.catalog(catalog::SENSOR_TYPE)
    }

    pub fn comm_types(&self) -> PmObjectMapT<PmComm> {
        self.catalog(catalog::COMM_TYPE)
    }

    pub fn router_types(&self) -> PmObjectMapT<PmRouter> {
        self.catalog(catalog::ROUTER_TYPE)
    }

    pub fn weapon_types(&self) -> PmObjectMapT<PmWeapon> {
        self.catalog(catalog::WEAPON_TYPE)
    }

    pub fn processor_types(&self) -> PmObjectMapT<PmProcessor> {
        self.catalog(catalog::PROCESSOR_TYPE)
    }

    pub fn scenario(&self) -> Option<PmScenario> {
        typed(self.node.at_key(catalog::SCENARIO))
    }

    pub fn find_platform(&self, name: &str) -> Option<PmPlatform> {
        self.platforms().find(name)
    }

    pub fn find_global_zone(&self, name: &str) -> Option<PmZone> {
        self.zones().find(name)
    }

    pub fn find_global_route(&self, name: &str) -> Option<PmRoute> {
        self.routes().find(name)
    }

    /// Path of the type catalog entry `name` in `catalog_name`.
    pub fn type_path(catalog_name: &str, name: &str) -> Path {
        Path::root().with_attr(catalog_name).with_map_key(name)
    }
}
