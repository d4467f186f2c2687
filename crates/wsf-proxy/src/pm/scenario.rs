//! Scenario-wide settings: classification levels and markings.

use std::collections::BTreeSet;
use std::fmt;

use super::{pm_struct, PmList, PmListT, PmObjectMap};
use crate::value::{BasicData, Color};

/// The combined classification of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Highest level named by any marking; `None` when no marking names a
    /// known level.
    pub level: Option<String>,
    /// Display color of `level`.
    pub color: Option<Color>,
    pub trigraphs: BTreeSet<String>,
    pub caveats: BTreeSet<String>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.trigraphs.is_empty() && self.caveats.is_empty()
    }
}

/// `LEVEL//TRI//TRI - CAVEAT//CAVEAT`
impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(level) = &self.level {
            f.write_str(level)?;
        }
        for trigraph in &self.trigraphs {
            write!(f, "//{trigraph}")?;
        }
        if !self.caveats.is_empty() {
            f.write_str(" - ")?;
            let caveats: Vec<&str> = self.caveats.iter().map(String::as_str).collect();
            f.write_str(&caveats.join("//"))?;
        }
        Ok(())
    }
}

pm_struct!(PmScenario, "Scenario");

impl PmScenario {
    /// Declared level entries.
    pub fn level_map(&self) -> PmObjectMap {
        PmObjectMap::new(self.at_key("classificationLevels"))
    }

    /// Level names, lowest first: the scenario's own, else the configured
    /// defaults.
    pub fn classification_levels(&self) -> Vec<String> {
        let declared = self.level_map().names();
        if !declared.is_empty() {
            return declared;
        }
        self.proxy()
            .map(|p| p.config().classification_levels.clone())
            .unwrap_or_default()
    }

    pub fn level_color(&self, level: &str) -> Option<Color> {
        self.level_map().find::<PmClassificationLevel>(level)?.color()
    }

    /// Declare a level above every level declared so far.
    pub fn add_level(&self, name: &str, color: Option<Color>) -> Option<PmClassificationLevel> {
        let level: PmClassificationLevel = self.level_map().add_default(name, "ClassificationLevel")?;
        if let Some(color) = color {
            level.assign_attribute("color", BasicData::from(color));
        }
        Some(level)
    }

    pub fn classifications(&self) -> PmListT<PmClassification> {
        PmListT::new(self.at_key("classifications"))
    }

    /// Append a marking.
    pub fn add_classification(&self, level: &str, trigraphs: &[&str], caveats: &[&str]) -> Option<PmClassification> {
        let marking = self.classifications().push_default()?;
        marking.assign_attribute("level", BasicData::from(level));
        for trigraph in trigraphs {
            marking.trigraphs().push_str(trigraph);
        }
        for caveat in caveats {
            marking.caveats().push_str(caveat);
        }
        Some(marking)
    }

    /// Combine every marking: the highest known level wins, trigraphs and
    /// caveats are unioned. Markings naming an unknown level contribute
    /// their trigraphs and caveats only.
    pub fn aggregate(&self) -> Classification {
        let levels = self.classification_levels();
        let mut out = Classification::default();
        let mut rank: Option<usize> = None;
        for marking in self.classifications().values() {
            if let Some(level) = marking.level() {
                match levels.iter().position(|l| *l == level) {
                    Some(index) => rank = Some(rank.map_or(index, |r| r.max(index))),
                    None => tracing::debug!(level = %level, "unknown classification level"),
                }
            }
            out.trigraphs.extend(marking.trigraphs().strings());
            out.caveats.extend(marking.caveats().strings());
        }
        if let Some(index) = rank {
            let level = levels[index].clone();
            out.color = self.level_color(&level);
            out.level = Some(level);
        }
        out
    }

    /// The aggregated marking as display text.
    pub fn classification_string(&self) -> String {
        self.aggregate().to_string()
    }
}

pm_struct!(
    /// One `classification` block: a level plus trigraphs and caveats.
    PmClassification,
    "Classification"
);

impl PmClassification {
    pub fn level(&self) -> Option<String> {
        self.get_attr::<String>("level").filter(|l| !l.is_empty())
    }

    pub fn trigraphs(&self) -> PmList {
        PmList::new(self.at_key("trigraphs"))
    }

    pub fn caveats(&self) -> PmList {
        PmList::new(self.at_key("caveats"))
    }
}

pm_struct!(PmClassificationLevel, "ClassificationLevel");

impl PmClassificationLevel {
    pub fn color(&self) -> Option<Color> {
        self.get_attr("color")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::PmRoot;
    use crate::proxy::Proxy;

    #[test]
    fn test_highest_level_wins_and_sets_union() {
        let proxy = Proxy::with_defaults();
        let scenario = PmRoot::new(&proxy).scenario().unwrap();
        scenario.add_classification("CONFIDENTIAL", &["USA"], &["NOFORN"]);
        scenario.add_classification("SECRET", &["GBR", "USA"], &[]);
        scenario.add_classification("UNCLASSIFIED", &[], &["FOUO"]);
        let c = scenario.aggregate();
        assert_eq!(c.level.as_deref(), Some("SECRET"));
        assert_eq!(scenario.classification_string(), "SECRET//GBR//USA - FOUO//NOFORN");
    }

    #[test]
    fn test_declared_levels_replace_defaults() {
        let proxy = Proxy::with_defaults();
        let scenario = PmRoot::new(&proxy).scenario().unwrap();
        assert_eq!(scenario.classification_levels().len(), 4);
        scenario.add_level("LOW", Some(Color::rgb(0, 255, 0))).unwrap();
        scenario.add_level("HIGH", Some(Color::rgb(255, 0, 0))).unwrap();
        assert_eq!(scenario.classification_levels(), vec!["LOW", "HIGH"]);

        scenario.add_classification("HIGH", &[], &[]);
        scenario.add_classification("SECRET", &["XYZ"], &[]);
        let c = scenario.aggregate();
        assert_eq!(c.level.as_deref(), Some("HIGH"));
        assert_eq!(c.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(c.to_string(), "HIGH//XYZ");
    }

    #[test]
    fn test_no_markings_is_empty() {
        let proxy = Proxy::with_defaults();
        let scenario = PmRoot::new(&proxy).scenario().unwrap();
        assert!(scenario.aggregate().is_empty());
        assert_eq!(scenario.classification_string(), "");
    }
}
