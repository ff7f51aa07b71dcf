use std::collections::BTreeMap;

/// Key/value pairs from a battery status entry, kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatteryState {
    values: BTreeMap<String, String>,
}

impl BatteryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?.trim().parse::<f64>().ok()
    }

    /// Charge in percent, from `Percent` or from `Charge (Ah)` / `Capacity (Ah)`.
    pub fn percentage(&self) -> Option<f64> {
        if let Some(percent) = self.number("Percent") {
            return Some(percent.clamp(0.0, 100.0));
        }
        let charge = self.number("Charge (Ah)")?;
        let capacity = self.number("Capacity (Ah)")?;
        if capacity <= 0.0 {
            return None;
        }
        Some((charge / capacity * 100.0).clamp(0.0, 100.0))
    }

    pub fn is_charging(&self) -> Option<bool> {
        for key in ["Charging State", "Charging"] {
            if let Some(raw) = self.get(key) {
                let raw = raw.trim().to_ascii_lowercase();
                return Some(matches!(raw.as_str(), "true" | "yes" | "1" | "charging"));
            }
        }
        self.number("Current (A)").map(|amps| amps > 0.0)
    }
}

impl FromIterator<(String, String)> for BatteryState {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
