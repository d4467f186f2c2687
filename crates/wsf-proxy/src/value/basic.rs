//! Basic (leaf) values: primitives and unit-carrying scalars with the
//! `unset` / `inherited` flags.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::units::{format_number, Quantity, UnitKind};

// ── Leaf data types ───────────────────────────────────────────────────────

/// Reference surface an altitude is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AltitudeReference {
    /// Not specified; the consumer resolves it against context.
    #[default]
    Default,
    /// Mean sea level.
    Msl,
    /// Above ground level.
    Agl,
}

impl AltitudeReference {
    pub fn as_str(self) -> &'static str {
        match self {
            AltitudeReference::Default => "default",
            AltitudeReference::Msl => "msl",
            AltitudeReference::Agl => "agl",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "default" => Some(AltitudeReference::Default),
            "msl" => Some(AltitudeReference::Msl),
            "agl" => Some(AltitudeReference::Agl),
            _ => None,
        }
    }
}

/// Geodetic position in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Planar offset in meters (x north, y east).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Length2 {
    pub x: f64,
    pub y: f64,
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 255,
        }
    }
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb`, `#rrggbbaa`, or `r g b [a]`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 && hex.len() != 8 {
                return None;
            }
            let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            return Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a,
            });
        }
        let parts: Vec<u8> = text
            .split_whitespace()
            .map(|p| p.parse::<u8>().ok())
            .collect::<Option<_>>()?;
        match parts.as_slice() {
            [r, g, b] => Some(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Some(Self {
                r: *r,
                g: *g,
                b: *b,
                a: *a,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

// ── Kinds ─────────────────────────────────────────────────────────────────

/// The declared kind of a basic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Real,
    String,
    Unit(UnitKind),
    Latitude,
    Longitude,
    Position,
    Length2,
    Color,
    AltitudeReference,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Real => "real",
            BasicKind::String => "string",
            BasicKind::Unit(unit) => unit.name(),
            BasicKind::Latitude => "Latitude",
            BasicKind::Longitude => "Longitude",
            BasicKind::Position => "Position",
            BasicKind::Length2 => "Length2",
            BasicKind::Color => "Color",
            BasicKind::AltitudeReference => "AltitudeReference",
        }
    }

    pub fn from_name(name: &str) -> Option<BasicKind> {
        let kind = match name {
            "bool" => BasicKind::Bool,
            "int" => BasicKind::Int,
            "real" => BasicKind::Real,
            "string" => BasicKind::String,
            "Latitude" => BasicKind::Latitude,
            "Longitude" => BasicKind::Longitude,
            "Position" => BasicKind::Position,
            "Length2" => BasicKind::Length2,
            "Color" => BasicKind::Color,
            "AltitudeReference" => BasicKind::AltitudeReference,
            other => BasicKind::Unit(UnitKind::from_name(other)?),
        };
        Some(kind)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Data ──────────────────────────────────────────────────────────────────

/// Payload of a basic value.
#[derive(Debug, Clone, PartialEq)]
pub enum BasicData {
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Unit(Quantity),
    Latitude(f64),
    Longitude(f64),
    Position(LatLon),
    Length2(Length2),
    Color(Color),
    AltitudeReference(AltitudeReference),
}

impl BasicData {
    pub fn kind(&self) -> BasicKind {
        match self {
            BasicData::Bool(_) => BasicKind::Bool,
            BasicData::Int(_) => BasicKind::Int,
            BasicData::Real(_) => BasicKind::Real,
            BasicData::String(_) => BasicKind::String,
            BasicData::Unit(q) => BasicKind::Unit(q.kind),
            BasicData::Latitude(_) => BasicKind::Latitude,
            BasicData::Longitude(_) => BasicKind::Longitude,
            BasicData::Position(_) => BasicKind::Position,
            BasicData::Length2(_) => BasicKind::Length2,
            BasicData::Color(_) => BasicKind::Color,
            BasicData::AltitudeReference(_) => BasicKind::AltitudeReference,
        }
    }

    /// Zero payload for `kind`.
    pub fn default_for(kind: BasicKind) -> Self {
        match kind {
            BasicKind::Bool => BasicData::Bool(false),
            BasicKind::Int => BasicData::Int(0),
            BasicKind::Real => BasicData::Real(0.0),
            BasicKind::String => BasicData::String(String::new()),
            BasicKind::Unit(unit) => BasicData::Unit(Quantity::zero(unit)),
            BasicKind::Latitude => BasicData::Latitude(0.0),
            BasicKind::Longitude => BasicData::Longitude(0.0),
            BasicKind::Position => BasicData::Position(LatLon::default()),
            BasicKind::Length2 => BasicData::Length2(Length2::default()),
            BasicKind::Color => BasicData::Color(Color::default()),
            BasicKind::AltitudeReference => {
                BasicData::AltitudeReference(AltitudeReference::Default)
            }
        }
    }

    /// Parse `text` as a payload of `kind`.
    pub fn parse(kind: BasicKind, text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let data = match kind {
            BasicKind::Bool => BasicData::Bool(match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => true,
                "false" | "off" | "no" | "0" => false,
                _ => return None,
            }),
            BasicKind::Int => BasicData::Int(trimmed.parse().ok()?),
            BasicKind::Real => BasicData::Real(trimmed.parse().ok()?),
            BasicKind::String => BasicData::String(text.to_string()),
            BasicKind::Unit(unit) => BasicData::Unit(Quantity::parse(unit, trimmed)?),
            BasicKind::Latitude => BasicData::Latitude(parse_angle(trimmed, 'n', 's')?),
            BasicKind::Longitude => BasicData::Longitude(parse_angle(trimmed, 'e', 'w')?),
            BasicKind::Position => {
                let mut parts = trimmed.split_whitespace();
                let lat = parse_angle(parts.next()?, 'n', 's')?;
                let lon = parse_angle(parts.next()?, 'e', 'w')?;
                if parts.next().is_some() {
                    return None;
                }
                BasicData::Position(LatLon::new(lat, lon))
            }
            BasicKind::Length2 => {
                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                let (x, y, factor) = match parts.as_slice() {
                    [x, y] => (x.parse::<f64>().ok()?, y.parse::<f64>().ok()?, 1.0),
                    [x, y, unit] => (
                        x.parse::<f64>().ok()?,
                        y.parse::<f64>().ok()?,
                        UnitKind::Length.factor(unit)?,
                    ),
                    _ => return None,
                };
                BasicData::Length2(Length2 {
                    x: x * factor,
                    y: y * factor,
                })
            }
            BasicKind::Color => BasicData::Color(Color::parse(trimmed)?),
            BasicKind::AltitudeReference => {
                BasicData::AltitudeReference(AltitudeReference::parse(trimmed)?)
            }
        };
        Some(data)
    }
}

impl fmt::Display for BasicData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicData::Bool(v) => write!(f, "{v}"),
            BasicData::Int(v) => write!(f, "{v}"),
            BasicData::Real(v) => f.write_str(&format_number(*v)),
            BasicData::String(v) => f.write_str(v),
            BasicData::Unit(q) => write!(f, "{q}"),
            BasicData::Latitude(v) => f.write_str(&format_angle(*v, 'n', 's')),
            BasicData::Longitude(v) => f.write_str(&format_angle(*v, 'e', 'w')),
            BasicData::Position(p) => write!(
                f,
                "{} {}",
                format_angle(p.lat, 'n', 's'),
                format_angle(p.lon, 'e', 'w')
            ),
            BasicData::Length2(v) => write!(f, "{} {} m", format_number(v.x), format_number(v.y)),
            BasicData::Color(c) => write!(f, "{c}"),
            BasicData::AltitudeReference(r) => f.write_str(r.as_str()),
        }
    }
}

fn angle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([-+]?\d+(?:\.\d*)?)(?::(\d+(?:\.\d*)?))?(?::(\d+(?:\.\d*)?))?([A-Za-z])?$")
            .expect("angle pattern compiles")
    })
}

/// Parse `dd[:mm[:ss]][hemisphere]` into signed decimal degrees.
fn parse_angle(text: &str, positive: char, negative: char) -> Option<f64> {
    let caps = angle_regex().captures(text)?;
    let mut degrees: f64 = caps.get(1)?.as_str().parse().ok()?;
    let sign = if degrees < 0.0 { -1.0 } else { 1.0 };
    degrees = degrees.abs();
    if let Some(m) = caps.get(2) {
        degrees += m.as_str().parse::<f64>().ok()? / 60.0;
    }
    if let Some(s) = caps.get(3) {
        degrees += s.as_str().parse::<f64>().ok()? / 3600.0;
    }
    let mut value = sign * degrees;
    if let Some(h) = caps.get(4) {
        let h = h.as_str().to_ascii_lowercase().chars().next()?;
        if h == negative {
            value = -value;
        } else if h != positive {
            return None;
        }
    }
    Some(value)
}

fn format_angle(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    format!("{}{}", format_number(value.abs()), hemisphere)
}

// ── BasicValue ────────────────────────────────────────────────────────────

/// A leaf value with independent `unset` and `inherited` flags.
///
/// Equality compares kind and payload; two unset values of the same kind are
/// equal whatever their payload, and the `inherited` flag never takes part.
#[derive(Debug, Clone)]
pub struct BasicValue {
    data: BasicData,
    unset: bool,
    inherited: bool,
}

impl BasicValue {
    /// A fresh unset value of `kind`.
    pub fn unset(kind: BasicKind) -> Self {
        Self {
            data: BasicData::default_for(kind),
            unset: true,
            inherited: false,
        }
    }

    /// A set, non-inherited value.
    pub fn new(data: BasicData) -> Self {
        Self {
            data,
            unset: false,
            inherited: false,
        }
    }

    pub fn kind(&self) -> BasicKind {
        self.data.kind()
    }

    /// Payload, or `None` when unset.
    pub fn data(&self) -> Option<&BasicData> {
        if self.unset {
            None
        } else {
            Some(&self.data)
        }
    }

    /// Payload regardless of the unset flag.
    pub fn raw_data(&self) -> &BasicData {
        &self.data
    }

    pub fn is_unset(&self) -> bool {
        self.unset
    }

    pub fn is_set(&self) -> bool {
        !self.unset
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn set_unset(&mut self) {
        self.unset = true;
    }

    pub fn clear_unset(&mut self) {
        self.unset = false;
    }

    pub fn set_inherited(&mut self, inherited: bool) {
        self.inherited = inherited;
    }

    /// Replace the payload. Fails (returns `false`) on a kind mismatch.
    pub fn set_data(&mut self, data: BasicData) -> bool {
        if data.kind() != self.kind() {
            return false;
        }
        self.data = data;
        self.unset = false;
        true
    }

    /// Parse and store `text`. Fails (returns `false`) if it does not parse.
    pub fn set_from_str(&mut self, text: &str) -> bool {
        match BasicData::parse(self.kind(), text) {
            Some(data) => self.set_data(data),
            None => false,
        }
    }

    /// Display form; empty when unset.
    pub fn to_display_string(&self) -> String {
        if self.unset {
            String::new()
        } else {
            self.data.to_string()
        }
    }

    /// Typed read of the payload.
    pub fn get<T: FromBasic>(&self) -> Option<T> {
        T::from_basic(self.data()?)
    }
}

impl PartialEq for BasicValue {
    fn eq(&self, other: &Self) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        match (self.unset, other.unset) {
            (true, true) => true,
            (false, false) => self.data == other.data,
            _ => false,
        }
    }
}

impl From<BasicData> for BasicValue {
    fn from(data: BasicData) -> Self {
        BasicValue::new(data)
    }
}

// ── Typed extraction ──────────────────────────────────────────────────────

/// Conversion from a basic payload to a Rust type.
pub trait FromBasic: Sized {
    fn from_basic(data: &BasicData) -> Option<Self>;
}

impl FromBasic for BasicData {
    fn from_basic(data: &BasicData) -> Option<Self> {
        Some(data.clone())
    }
}

impl FromBasic for bool {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromBasic for i64 {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromBasic for f64 {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Real(v) | BasicData::Latitude(v) | BasicData::Longitude(v) => Some(*v),
            BasicData::Int(v) => Some(*v as f64),
            BasicData::Unit(q) => Some(q.si()),
            _ => None,
        }
    }
}

impl FromBasic for String {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::String(v) => Some(v.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl FromBasic for Quantity {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Unit(q) => Some(q.clone()),
            _ => None,
        }
    }
}

impl FromBasic for LatLon {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Position(p) => Some(*p),
            _ => None,
        }
    }
}

impl FromBasic for Length2 {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Length2(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromBasic for Color {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromBasic for AltitudeReference {
    fn from_basic(data: &BasicData) -> Option<Self> {
        match data {
            BasicData::AltitudeReference(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<bool> for BasicData {
    fn from(v: bool) -> Self {
        BasicData::Bool(v)
    }
}

impl From<i64> for BasicData {
    fn from(v: i64) -> Self {
        BasicData::Int(v)
    }
}

impl From<f64> for BasicData {
    fn from(v: f64) -> Self {
        BasicData::Real(v)
    }
}

impl From<&str> for BasicData {
    fn from(v: &str) -> Self {
        BasicData::String(v.to_string())
    }
}

impl From<String> for BasicData {
    fn from(v: String) -> Self {
        BasicData::String(v)
    }
}

impl From<Quantity> for BasicData {
    fn from(v: Quantity) -> Self {
        BasicData::Unit(v)
    }
}

impl From<LatLon> for BasicData {
    fn from(v: LatLon) -> Self {
        BasicData::Position(v)
    }
}

impl From<Length2> for BasicData {
    fn from(v: Length2) -> Self {
        BasicData::Length2(v)
    }
}

impl From<Color> for BasicData {
    fn from(v: Color) -> Self {
        BasicData::Color(v)
    }
}

impl From<AltitudeReference> for BasicData {
    fn from(v: AltitudeReference) -> Self {
        BasicData::AltitudeReference(v)
    }
}
