use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ScoreComponent;

/// Points and audit reason recorded against a rule name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub points: i64,
    pub reason: String,
}

/// Rule-name keyed breakdown that keeps evaluation order.
///
/// Components sharing a name are merged: their points are summed and their
/// reasons joined with `"; "`, so the entries always add up to the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    entries: Vec<(String, BreakdownEntry)>,
}

impl ScoreBreakdown {
    pub fn from_components(components: &[ScoreComponent]) -> Self {
        let mut breakdown = Self::default();
        for component in components {
            breakdown.record(
                &component.rule_name,
                i64::from(component.points),
                &component.reason,
            );
        }
        breakdown
    }

    fn record(&mut self, name: &str, points: i64, reason: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, entry)) => {
                entry.points = entry.points.saturating_add(points);
                entry.reason.push_str("; ");
                entry.reason.push_str(reason);
            }
            None => self.entries.push((
                name.to_string(),
                BreakdownEntry {
                    points,
                    reason: reason.to_string(),
                },
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BreakdownEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BreakdownEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |total, (_, entry)| total.saturating_add(entry.points))
    }
}

impl Serialize for ScoreBreakdown {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreBreakdown {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(BreakdownVisitor)
    }
}

struct BreakdownVisitor;

impl<'de> Visitor<'de> for BreakdownVisitor {
    type Value = ScoreBreakdown;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of rule names to {points, reason}")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut breakdown = ScoreBreakdown::default();
        while let Some((name, entry)) = access.next_entry::<String, BreakdownEntry>()? {
            breakdown.record(&name, entry.points, &entry.reason);
        }
        Ok(breakdown)
    }
}
