//! Mood tuning parameters.

use serde::{Deserialize, Serialize};

/// One of the three server-side tuning knobs, each conceptually 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    /// Sensible (0) to wacky (100)
    Wackiness,
    /// Shy (0) to talkative (100)
    Talkativeness,
    /// Self-centred (0) to attentive (100)
    Attentiveness,
}

impl Mood {
    pub const fn all() -> &'static [Mood] {
        &[Mood::Wackiness, Mood::Talkativeness, Mood::Attentiveness]
    }

    /// Query parameter name understood by the API.
    pub const fn param(&self) -> &'static str {
        match self {
            Mood::Wackiness => "cb_settings_tweak1",
            Mood::Talkativeness => "cb_settings_tweak2",
            Mood::Attentiveness => "cb_settings_tweak3",
        }
    }
}

/// A set of optional mood values (`mood1`..`mood3`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Moods {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood3: Option<f64>,
}

impl Moods {
    pub fn get(&self, mood: Mood) -> Option<f64> {
        match mood {
            Mood::Wackiness => self.mood1,
            Mood::Talkativeness => self.mood2,
            Mood::Attentiveness => self.mood3,
        }
    }

    pub fn set(&mut self, mood: Mood, value: Option<f64>) {
        match mood {
            Mood::Wackiness => self.mood1 = value,
            Mood::Talkativeness => self.mood2 = value,
            Mood::Attentiveness => self.mood3 = value,
        }
    }

    pub fn with(mut self, mood: Mood, value: f64) -> Self {
        self.set(mood, Some(value));
        self
    }

    /// Fills every unset mood from `fallback`.
    pub fn or(&self, fallback: &Moods) -> Moods {
        Moods {
            mood1: self.mood1.or(fallback.mood1),
            mood2: self.mood2.or(fallback.mood2),
            mood3: self.mood3.or(fallback.mood3),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mood1.is_none() && self.mood2.is_none() && self.mood3.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_prefers_own_values() {
        let own = Moods::default().with(Mood::Wackiness, 10.0);
        let parent = Moods::default()
            .with(Mood::Wackiness, 90.0)
            .with(Mood::Attentiveness, 50.0);

        let merged = own.or(&parent);
        assert_eq!(merged.get(Mood::Wackiness), Some(10.0));
        assert_eq!(merged.get(Mood::Talkativeness), None);
        assert_eq!(merged.get(Mood::Attentiveness), Some(50.0));
    }

    #[test]
    fn test_params_are_distinct() {
        let params: Vec<_> = Mood::all().iter().map(Mood::param).collect();
        assert_eq!(
            params,
            ["cb_settings_tweak1", "cb_settings_tweak2", "cb_settings_tweak3"]
        );
    }
}
