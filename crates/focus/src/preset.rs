//! Timer presets
//!
//! Named focus/break pairs. `Custom` takes its durations from settings.

use grove_core::Settings;

/// Focus/break preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Pomodoro: 25 min focus, 5 min break
    #[default]
    Pomodoro,
    /// Deep: 50 min focus, 10 min break
    Deep,
    /// Quick: 1 min focus, 30 s break, for trying the cycle out
    Quick,
    /// Durations from settings
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Pomodoro, Preset::Deep, Preset::Quick, Preset::Custom];

    /// Focus and break lengths in seconds. The custom minutes are only used
    /// by [`Preset::Custom`].
    pub fn durations(&self, custom_focus_minutes: u32, custom_break_minutes: u32) -> (i64, i64) {
        match self {
            Preset::Pomodoro => (25 * 60, 5 * 60),
            Preset::Deep => (50 * 60, 10 * 60),
            Preset::Quick => (60, 30),
            Preset::Custom => (
                i64::from(custom_focus_minutes) * 60,
                i64::from(custom_break_minutes) * 60,
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Pomodoro => "pomodoro",
            Preset::Deep => "deep",
            Preset::Quick => "quick",
            Preset::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pomodoro" => Some(Preset::Pomodoro),
            "deep" => Some(Preset::Deep),
            "quick" | "test" => Some(Preset::Quick),
            "custom" => Some(Preset::Custom),
            _ => None,
        }
    }

    /// Get a description of this preset
    pub fn description(&self) -> &'static str {
        match self {
            Preset::Pomodoro => "Sustainable rhythm, good for everyday work",
            Preset::Deep => "Longer stretches for complex problems",
            Preset::Quick => "One-minute trial of the focus/break cycle",
            Preset::Custom => "Durations from focus_minutes / break_minutes",
        }
    }
}

/// Focus and break lengths in seconds selected by `settings`. Unknown
/// preset names fall back to pomodoro.
pub fn durations_for(settings: &Settings) -> (i64, i64) {
    Preset::from_str(&settings.preset)
        .unwrap_or_default()
        .durations(settings.focus_minutes, settings.break_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_for_settings() {
        let mut settings = Settings::default();
        assert_eq!(durations_for(&settings), (1500, 300));

        settings.preset = "custom".to_string();
        settings.focus_minutes = 45;
        settings.break_minutes = 15;
        assert_eq!(durations_for(&settings), (2700, 900));

        settings.preset = "nonsense".to_string();
        assert_eq!(durations_for(&settings), (1500, 300));
    }

    #[test]
    fn test_preset_durations() {
        assert_eq!(Preset::Pomodoro.durations(1, 1), (1500, 300));
        assert_eq!(Preset::Deep.durations(1, 1), (3000, 600));
        assert_eq!(Preset::Quick.durations(1, 1), (60, 30));
        assert_eq!(Preset::Custom.durations(40, 8), (2400, 480));
        assert_eq!(Preset::Custom.durations(0, 8), (0, 480));
    }

    #[test]
    fn test_preset_names() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(Preset::from_str("DEEP"), Some(Preset::Deep));
        assert_eq!(Preset::from_str("marathon"), None);
    }
}
