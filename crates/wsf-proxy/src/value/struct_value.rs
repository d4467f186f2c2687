use std::sync::Arc;

use indexmap::IndexMap;
use wsf_proxy_path::Path;

use super::types::{StructType, TypeDesc};
use super::Value;

/// A named-attribute record with an optional `base` path.
///
/// Attribute order follows the struct type's schema. When `base` is set,
/// attributes left unset here resolve against the struct at `base`.
#[derive(Debug, Clone)]
pub struct StructValue {
    ty: Arc<StructType>,
    attrs: IndexMap<String, Value>,
    base: Option<Path>,
    inherited: bool,
}

impl StructValue {
    /// A struct of type `ty` with every attribute at its default.
    pub fn new(ty: &Arc<StructType>) -> Self {
        let attrs = ty
            .attributes()
            .into_iter()
            .map(|a| (a.name.clone(), a.ty.default_value()))
            .collect();
        Self {
            ty: Arc::clone(ty),
            attrs,
            base: None,
            inherited: false,
        }
    }

    pub fn struct_type(&self) -> &Arc<StructType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn attr_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.attrs.get_mut(name)
    }

    /// Replace attribute `name`. Fails if the attribute is not part of the
    /// schema or `value` has an incompatible type.
    pub fn set_attr(&mut self, name: &str, value: Value) -> bool {
        let Some(declared) = self.ty.attribute(name) else {
            return false;
        };
        if !declared.accepts(&value.type_desc()) {
            return false;
        }
        self.attrs.insert(name.to_string(), value);
        true
    }

    /// Attributes in schema order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attrs_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.attrs.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_ref()
    }

    pub fn set_base(&mut self, base: Option<Path>) {
        self.base = base;
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn set_inherited(&mut self, inherited: bool) {
        self.inherited = inherited;
    }

    pub fn type_desc(&self) -> TypeDesc {
        TypeDesc::Struct(Arc::clone(&self.ty))
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.base == other.base && self.attrs == other.attrs
    }
}
