//! JSON rendering of values.
//!
//! The plain form maps each kind to its natural JSON shape. The detailed
//! form wraps every value in an object carrying its kind, type name, base
//! and flags, so nothing about the tree is lost.

use serde_json::{json, Map, Value as Json};

use super::Node;
use crate::error::ProxyError;
use crate::value::{BasicData, BasicValue, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Emit kind, type, base and flags alongside every value.
    pub detailed: bool,
    /// Keep unset struct attributes (as `null` in the plain form).
    pub include_unset: bool,
}

impl JsonOptions {
    pub fn detailed() -> Self {
        Self {
            detailed: true,
            include_unset: true,
        }
    }
}

fn basic_to_json(b: &BasicValue) -> Json {
    let Some(data) = b.data() else {
        return Json::Null;
    };
    match data {
        BasicData::Bool(v) => json!(v),
        BasicData::Int(v) => json!(v),
        BasicData::Real(v) | BasicData::Latitude(v) | BasicData::Longitude(v) => json!(v),
        BasicData::String(v) => json!(v),
        BasicData::Position(p) => json!({ "lat": p.lat, "lon": p.lon }),
        BasicData::Length2(l) => json!({ "x": l.x, "y": l.y }),
        other => json!(other.to_string()),
    }
}

/// Render `value` as JSON.
pub fn value_to_json(value: &Value, options: &JsonOptions) -> Json {
    let skip = |v: &Value| !options.include_unset && v.is_unset();
    match value {
        Value::Basic(b) if options.detailed => json!({
            "kind": "basic",
            "type": b.kind().name(),
            "value": basic_to_json(b),
            "unset": b.is_unset(),
            "inherited": b.is_inherited(),
        }),
        Value::Basic(b) => basic_to_json(b),
        Value::Struct(s) => {
            let attrs: Map<String, Json> = s
                .attrs()
                .filter(|(_, v)| !skip(v))
                .map(|(name, v)| (name.to_string(), value_to_json(v, options)))
                .collect();
            if !options.detailed {
                return Json::Object(attrs);
            }
            json!({
                "kind": "struct",
                "type": s.type_name(),
                "base": s.base().map(|b| b.to_pointer()),
                "inherited": s.is_inherited(),
                "attributes": attrs,
            })
        }
        Value::List(l) => {
            let items: Vec<Json> = l.iter().map(|v| value_to_json(v, options)).collect();
            if !options.detailed {
                return Json::Array(items);
            }
            json!({
                "kind": "list",
                "type": l.type_desc().name(),
                "inherited": l.is_inherited(),
                "items": items,
            })
        }
        Value::ObjectMap(m) => {
            let entries: Map<String, Json> = m
                .iter()
                .map(|(name, v)| (name.to_string(), value_to_json(v, options)))
                .collect();
            if !options.detailed {
                return Json::Object(entries);
            }
            json!({
                "kind": "map",
                "type": m.type_desc().name(),
                "inherited": m.is_inherited(),
                "entries": entries,
            })
        }
    }
}

impl Node {
    /// The value here as JSON, without inheritance fallback.
    pub fn to_json(&self, options: JsonOptions) -> Option<Json> {
        self.with_value(|v| value_to_json(v, &options))
    }

    /// The effective value here as JSON.
    pub fn to_effective_json(&self, options: JsonOptions) -> Option<Json> {
        self.effective_value().map(|v| value_to_json(&v, &options))
    }

    /// Pretty-printed JSON text. Fails on a null node.
    pub fn to_json_string(&self, options: JsonOptions) -> Result<String, ProxyError> {
        let json = self.to_json(options).ok_or(ProxyError::NullNode)?;
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Proxy;
    use wsf_proxy_path::Path;

    fn proxy_with_platform() -> Proxy {
        let proxy = Proxy::with_defaults();
        let platforms = proxy.root().at_key("platform");
        assert!(platforms.instantiate("P1", &"/platformType/WSF_PLATFORM".parse::<Path>().unwrap()));
        assert!((proxy.root() + "platform" + "P1" + "side").assign(BasicData::from("blue")));
        proxy
    }

    #[test]
    fn test_plain_form_skips_unset() {
        let proxy = proxy_with_platform();
        let json = (proxy.root() + "platform" + "P1").to_json(JsonOptions::default()).unwrap();
        assert_eq!(json["side"], json!("blue"));
        assert!(json.get("icon").is_none());
    }

    #[test]
    fn test_detailed_form_keeps_flags_and_base() {
        let proxy = proxy_with_platform();
        let json = (proxy.root() + "platform" + "P1")
            .to_json(JsonOptions::detailed())
            .unwrap();
        assert_eq!(json["kind"], json!("struct"));
        assert_eq!(json["type"], json!("Platform"));
        assert_eq!(json["base"], json!("/platformType/WSF_PLATFORM"));
        let icon = &json["attributes"]["icon"];
        assert_eq!(icon["unset"], json!(true));
        assert_eq!(icon["inherited"], json!(true));
        assert_eq!(json["attributes"]["side"]["inherited"], json!(false));
    }

    #[test]
    fn test_null_node_is_an_error() {
        let proxy = Proxy::with_defaults();
        let err = (proxy.root() + "nowhere").to_json_string(JsonOptions::default()).unwrap_err();
        assert!(matches!(err, ProxyError::NullNode));
    }
}
