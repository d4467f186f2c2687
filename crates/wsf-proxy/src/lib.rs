//! Semantic model of a scenario description.
//!
//! # Overview
//!
//! A [`Proxy`] holds the fully resolved, typed, inheritance-aware tree of a
//! parsed scenario (platforms and their parts, movers, routes, zones,
//! classification). Consumers navigate it with [`Node`] cursors, read and
//! write through them, and observe structural changes through before/after
//! notifications. The [`pm`] module layers typed accessors on top
//! ([`pm::PmPlatform`], [`pm::PmWaypoint`], [`pm::PmZoneDefinition`], ...)
//! that implement the scenario-level resolution rules.
//!
//! ```
//! use wsf_proxy::pm::{PmObjectMap, PmPlatform};
//! use wsf_proxy::{BasicData, Proxy};
//!
//! let proxy = Proxy::with_defaults();
//! let platforms = PmObjectMap::new(proxy.root().at_key("platform"));
//! let p1: PmPlatform = platforms.add_instance("P1", "WSF_PLATFORM").unwrap();
//! assert!(p1.assign_attribute("side", BasicData::from("blue")));
//! assert_eq!(p1.side().as_deref(), Some("blue"));
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod node;
pub mod pm;
pub mod proxy;
pub mod schema;
pub mod units;
pub mod value;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use node::{JsonOptions, Node};
pub use proxy::{ChangeEvent, ChangeKind, ChangePhase, DocumentRange, Proxy, TreeKind};
pub use units::{Quantity, UnitKind};
pub use value::{
    AltitudeReference, BasicData, BasicKind, BasicValue, Color, CopyMode, LatLon, Length2, ListValue,
    ObjectMapValue, StructType, StructValue, TypeDesc, TypeRegistry, Value, ValueKind,
};
pub use wsf_proxy_path::{Key, Path, PathError};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
