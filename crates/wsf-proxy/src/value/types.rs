//! Type descriptors.
//!
//! # Overview
//!
//! Every [`Value`] carries a [`TypeDesc`]. Struct types form a predefined
//! single-inheritance hierarchy (`WSF_AIR_MOVER` extends `WSF_ROUTE_MOVER`
//! extends `Mover`); a struct type's attribute schema is its parent's
//! followed by its own. A [`TypeRegistry`] owns every struct type of a
//! schema and can build fresh, fully unset values for any of them.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::basic::{BasicKind, BasicValue};
use super::list::ListValue;
use super::object_map::ObjectMapValue;
use super::struct_value::StructValue;
use super::Value;
use crate::units::UnitKind;

// ── StructType ────────────────────────────────────────────────────────────

/// A named attribute in a struct schema.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    pub name: String,
    pub ty: TypeDesc,
}

/// A predefined struct type.
#[derive(Debug)]
pub struct StructType {
    name: String,
    parent: Option<Arc<StructType>>,
    attributes: Vec<AttributeDef>,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
        }
    }

    /// Derive from `parent`, inheriting its attribute schema.
    pub fn extends(mut self, parent: &Arc<StructType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare an attribute.
    pub fn attr(mut self, name: impl Into<String>, ty: TypeDesc) -> Self {
        self.attributes.push(AttributeDef {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<StructType>> {
        self.parent.as_ref()
    }

    /// Attributes declared on this type only.
    pub fn own_attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// All attributes, ancestors first.
    pub fn attributes(&self) -> Vec<&AttributeDef> {
        let mut out = match &self.parent {
            Some(parent) => parent.attributes(),
            None => Vec::new(),
        };
        out.extend(self.attributes.iter());
        out
    }

    /// Declared type of attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&TypeDesc> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.ty)
            .or_else(|| self.parent.as_ref()?.attribute(name))
    }

    /// Returns `true` if this type is `name` or derives from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.parent.as_ref().is_some_and(|p| p.is_a(name))
    }

    /// This type's name followed by every ancestor's.
    pub fn lineage(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        let mut cur = self.parent.as_deref();
        while let Some(t) = cur {
            out.push(t.name.as_str());
            cur = t.parent.as_deref();
        }
        out
    }
}

// ── TypeDesc ──────────────────────────────────────────────────────────────

/// Declared type of a value.
#[derive(Debug, Clone)]
pub enum TypeDesc {
    Basic(BasicKind),
    Struct(Arc<StructType>),
    List(Box<TypeDesc>),
    ObjectMap(Box<TypeDesc>),
}

impl TypeDesc {
    pub fn bool() -> Self {
        TypeDesc::Basic(BasicKind::Bool)
    }

    pub fn int() -> Self {
        TypeDesc::Basic(BasicKind::Int)
    }

    pub fn real() -> Self {
        TypeDesc::Basic(BasicKind::Real)
    }

    pub fn string() -> Self {
        TypeDesc::Basic(BasicKind::String)
    }

    pub fn unit(kind: UnitKind) -> Self {
        TypeDesc::Basic(BasicKind::Unit(kind))
    }

    pub fn list_of(elem: TypeDesc) -> Self {
        TypeDesc::List(Box::new(elem))
    }

    pub fn map_of(elem: TypeDesc) -> Self {
        TypeDesc::ObjectMap(Box::new(elem))
    }

    pub fn of_struct(ty: &Arc<StructType>) -> Self {
        TypeDesc::Struct(Arc::clone(ty))
    }

    /// Type name: the basic kind name, the struct name, or
    /// `List<elem>` / `ObjectMap<elem>`.
    pub fn name(&self) -> String {
        match self {
            TypeDesc::Basic(kind) => kind.name().to_string(),
            TypeDesc::Struct(ty) => ty.name().to_string(),
            TypeDesc::List(elem) => format!("List<{}>", elem.name()),
            TypeDesc::ObjectMap(elem) => format!("ObjectMap<{}>", elem.name()),
        }
    }

    /// Element type of a list or object map.
    pub fn element(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::List(elem) | TypeDesc::ObjectMap(elem) => Some(elem),
            _ => None,
        }
    }

    /// Returns `true` if a value of type `other` may be stored where `self`
    /// is declared. Struct slots accept any derived struct type.
    pub fn accepts(&self, other: &TypeDesc) -> bool {
        match (self, other) {
            (TypeDesc::Basic(a), TypeDesc::Basic(b)) => a == b,
            (TypeDesc::Struct(a), TypeDesc::Struct(b)) => b.is_a(a.name()),
            (TypeDesc::List(a), TypeDesc::List(b)) => a == b,
            (TypeDesc::ObjectMap(a), TypeDesc::ObjectMap(b)) => a == b,
            _ => false,
        }
    }

    /// A fresh value of this type with every basic leaf unset.
    pub fn default_value(&self) -> Value {
        match self {
            TypeDesc::Basic(kind) => Value::Basic(BasicValue::unset(*kind)),
            TypeDesc::Struct(ty) => Value::Struct(StructValue::new(ty)),
            TypeDesc::List(elem) => Value::List(ListValue::new((**elem).clone())),
            TypeDesc::ObjectMap(elem) => Value::ObjectMap(ObjectMapValue::new((**elem).clone())),
        }
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeDesc::Basic(a), TypeDesc::Basic(b)) => a == b,
            (TypeDesc::Struct(a), TypeDesc::Struct(b)) => a.name() == b.name(),
            (TypeDesc::List(a), TypeDesc::List(b)) => a == b,
            (TypeDesc::ObjectMap(a), TypeDesc::ObjectMap(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ── TypeRegistry ──────────────────────────────────────────────────────────

/// All struct types of a schema, keyed by name, plus the root type.
#[derive(Debug)]
pub struct TypeRegistry {
    structs: IndexMap<String, Arc<StructType>>,
    root: Option<Arc<StructType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            structs: IndexMap::new(),
            root: None,
        }
    }

    /// Register a struct type. A later definition with the same name
    /// replaces the earlier one.
    pub fn define(&mut self, ty: StructType) -> Arc<StructType> {
        let ty = Arc::new(ty);
        self.structs.insert(ty.name().to_string(), Arc::clone(&ty));
        ty
    }

    /// Register and mark as the type of both tree roots.
    pub fn define_root(&mut self, ty: StructType) -> Arc<StructType> {
        let ty = self.define(ty);
        self.root = Some(Arc::clone(&ty));
        ty
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StructType>> {
        self.structs.get(name)
    }

    pub fn root_type(&self) -> Option<&Arc<StructType>> {
        self.root.as_ref()
    }

    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    /// Names of every registered type deriving from `name`, including itself.
    pub fn derived_names(&self, name: &str) -> Vec<&str> {
        self.structs
            .values()
            .filter(|t| t.is_a(name))
            .map(|t| t.name())
            .collect()
    }

    /// A fresh value of struct type `name`.
    pub fn default_value(&self, name: &str) -> Option<Value> {
        self.get(name).map(|t| Value::Struct(StructValue::new(t)))
    }

    /// A fresh root value, or an empty struct if no root was declared.
    pub fn default_root(&self) -> Value {
        match &self.root {
            Some(root) => Value::Struct(StructValue::new(root)),
            None => Value::Struct(StructValue::new(&Arc::new(StructType::new("Root")))),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
