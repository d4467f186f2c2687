//! Unit-carrying scalars.
//!
//! A quantity keeps the magnitude and unit the author wrote, so it displays
//! back the way it was entered; [`Quantity::si`] converts on demand. Unit
//! names are matched case-insensitively against a per-kind table.

use std::f64::consts::PI;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Physical dimension of a unit-carrying scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Length,
    Angle,
    Time,
    Speed,
    Frequency,
    Power,
    Mass,
    DataRate,
    DataSize,
    Acceleration,
    AngularRate,
}

const LENGTH_UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("meter", 1.0),
    ("meters", 1.0),
    ("km", 1000.0),
    ("kilometers", 1000.0),
    ("cm", 0.01),
    ("mm", 0.001),
    ("ft", 0.3048),
    ("feet", 0.3048),
    ("kft", 304.8),
    ("mi", 1609.344),
    ("miles", 1609.344),
    ("nm", 1852.0),
    ("nmi", 1852.0),
];

const ANGLE_UNITS: &[(&str, f64)] = &[
    ("rad", 1.0),
    ("radians", 1.0),
    ("deg", PI / 180.0),
    ("degree", PI / 180.0),
    ("degrees", PI / 180.0),
    ("mil", 2.0 * PI / 6400.0),
];

const TIME_UNITS: &[(&str, f64)] = &[
    ("s", 1.0),
    ("sec", 1.0),
    ("seconds", 1.0),
    ("ms", 0.001),
    ("min", 60.0),
    ("minutes", 60.0),
    ("h", 3600.0),
    ("hr", 3600.0),
    ("hour", 3600.0),
    ("hours", 3600.0),
    ("day", 86400.0),
    ("days", 86400.0),
];

const SPEED_UNITS: &[(&str, f64)] = &[
    ("m/s", 1.0),
    ("m/sec", 1.0),
    ("km/h", 1000.0 / 3600.0),
    ("km/hr", 1000.0 / 3600.0),
    ("kts", 1852.0 / 3600.0),
    ("knots", 1852.0 / 3600.0),
    ("mph", 1609.344 / 3600.0),
    ("ft/s", 0.3048),
    ("ft/sec", 0.3048),
];

const FREQUENCY_UNITS: &[(&str, f64)] = &[
    ("hz", 1.0),
    ("khz", 1.0e3),
    ("mhz", 1.0e6),
    ("ghz", 1.0e9),
];

const POWER_UNITS: &[(&str, f64)] = &[
    ("w", 1.0),
    ("watt", 1.0),
    ("watts", 1.0),
    ("kw", 1.0e3),
    ("megawatt", 1.0e6),
    ("megawatts", 1.0e6),
    ("milliwatt", 1.0e-3),
    ("milliwatts", 1.0e-3),
];

const MASS_UNITS: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("kilograms", 1.0),
    ("g", 1.0e-3),
    ("grams", 1.0e-3),
    ("lb", 0.453_592_37),
    ("lbs", 0.453_592_37),
    ("pounds", 0.453_592_37),
    ("t", 1000.0),
    ("tonnes", 1000.0),
];

const DATA_RATE_UNITS: &[(&str, f64)] = &[
    ("bit/s", 1.0),
    ("bps", 1.0),
    ("kbit/s", 1.0e3),
    ("kbps", 1.0e3),
    ("mbit/s", 1.0e6),
    ("mbps", 1.0e6),
    ("gbit/s", 1.0e9),
    ("gbps", 1.0e9),
];

const DATA_SIZE_UNITS: &[(&str, f64)] = &[
    ("bit", 1.0),
    ("bits", 1.0),
    ("byte", 8.0),
    ("bytes", 8.0),
    ("kbit", 1.0e3),
    ("kbits", 1.0e3),
    ("kbyte", 8.0e3),
    ("kbytes", 8.0e3),
    ("mbit", 1.0e6),
    ("mbits", 1.0e6),
    ("mbyte", 8.0e6),
    ("mbytes", 8.0e6),
];

const ACCELERATION_UNITS: &[(&str, f64)] = &[
    ("m/s2", 1.0),
    ("m/s^2", 1.0),
    ("ft/s2", 0.3048),
    ("ft/s^2", 0.3048),
    ("g", 9.80665),
];

const ANGULAR_RATE_UNITS: &[(&str, f64)] = &[
    ("rad/s", 1.0),
    ("rad/sec", 1.0),
    ("deg/s", PI / 180.0),
    ("deg/sec", PI / 180.0),
    ("rpm", 2.0 * PI / 60.0),
];

impl UnitKind {
    pub const ALL: [UnitKind; 11] = [
        UnitKind::Length,
        UnitKind::Angle,
        UnitKind::Time,
        UnitKind::Speed,
        UnitKind::Frequency,
        UnitKind::Power,
        UnitKind::Mass,
        UnitKind::DataRate,
        UnitKind::DataSize,
        UnitKind::Acceleration,
        UnitKind::AngularRate,
    ];

    /// Type name used in type queries (`Node::is_of_basic_type`).
    pub fn name(self) -> &'static str {
        match self {
            UnitKind::Length => "Length",
            UnitKind::Angle => "Angle",
            UnitKind::Time => "Time",
            UnitKind::Speed => "Speed",
            UnitKind::Frequency => "Frequency",
            UnitKind::Power => "Power",
            UnitKind::Mass => "Mass",
            UnitKind::DataRate => "DataRate",
            UnitKind::DataSize => "DataSize",
            UnitKind::Acceleration => "Acceleration",
            UnitKind::AngularRate => "AngularRate",
        }
    }

    pub fn from_name(name: &str) -> Option<UnitKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    fn table(self) -> &'static [(&'static str, f64)] {
        match self {
            UnitKind::Length => LENGTH_UNITS,
            UnitKind::Angle => ANGLE_UNITS,
            UnitKind::Time => TIME_UNITS,
            UnitKind::Speed => SPEED_UNITS,
            UnitKind::Frequency => FREQUENCY_UNITS,
            UnitKind::Power => POWER_UNITS,
            UnitKind::Mass => MASS_UNITS,
            UnitKind::DataRate => DATA_RATE_UNITS,
            UnitKind::DataSize => DATA_SIZE_UNITS,
            UnitKind::Acceleration => ACCELERATION_UNITS,
            UnitKind::AngularRate => ANGULAR_RATE_UNITS,
        }
    }

    /// The unit values are stored in.
    pub fn si_unit(self) -> &'static str {
        self.table()[0].0
    }

    /// Multiplier converting `unit` to SI, if `unit` belongs to this kind.
    pub fn factor(self, unit: &str) -> Option<f64> {
        let lower = unit.to_ascii_lowercase();
        self.table()
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, f)| *f)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Quantity ──────────────────────────────────────────────────────────────

/// A unit-carrying scalar: the magnitude as the author wrote it plus its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub kind: UnitKind,
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    /// Zero in the SI unit of `kind`.
    pub fn zero(kind: UnitKind) -> Self {
        Self::from_si(kind, 0.0)
    }

    /// Build from a value expressed in SI.
    pub fn from_si(kind: UnitKind, si: f64) -> Self {
        Self {
            kind,
            value: si,
            unit: kind.si_unit().to_string(),
        }
    }

    /// Build from a value in `unit`. Returns `None` for a unit foreign to `kind`.
    pub fn new(kind: UnitKind, value: f64, unit: &str) -> Option<Self> {
        kind.factor(unit)?;
        Some(Self {
            kind,
            value,
            unit: unit.to_string(),
        })
    }

    /// Magnitude in SI.
    pub fn si(&self) -> f64 {
        self.value * self.kind.factor(&self.unit).unwrap_or(1.0)
    }

    /// Magnitude converted to `unit`.
    pub fn value_in(&self, unit: &str) -> Option<f64> {
        Some(self.si() / self.kind.factor(unit)?)
    }

    /// Parse text of the form `<number> [unit]`. A missing unit means SI.
    pub fn parse(kind: UnitKind, text: &str) -> Option<Self> {
        let caps = quantity_regex().captures(text)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        match caps.get(2) {
            Some(unit) => Quantity::new(kind, value, unit.as_str()),
            None => Some(Quantity::from_si(kind, value)),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_number(self.value), self.unit)
    }
}

fn quantity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*([A-Za-z][A-Za-z0-9/\^]*)?\s*$")
            .expect("quantity pattern compiles")
    })
}

/// Render a float without a trailing `.0` for whole numbers.
pub(crate) fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1.0e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
