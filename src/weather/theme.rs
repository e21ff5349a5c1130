//! Classification of Open-Meteo weather codes into themes.

use std::fmt;

use colored::Color;

/// Theme derived from a weather code, used for playlist selection and for
/// styling the terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeTag {
    Sunny,
    Cloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
    Default,
}

impl ThemeTag {
    pub const ALL: [ThemeTag; 7] = [
        ThemeTag::Sunny,
        ThemeTag::Cloudy,
        ThemeTag::Foggy,
        ThemeTag::Rainy,
        ThemeTag::Snowy,
        ThemeTag::Stormy,
        ThemeTag::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeTag::Sunny => "sunny",
            ThemeTag::Cloudy => "cloudy",
            ThemeTag::Foggy => "foggy",
            ThemeTag::Rainy => "rainy",
            ThemeTag::Snowy => "snowy",
            ThemeTag::Stormy => "stormy",
            ThemeTag::Default => "default",
        }
    }

    /// Accent color used when printing the theme.
    pub fn color(&self) -> Color {
        match self {
            ThemeTag::Sunny => Color::BrightYellow,
            ThemeTag::Cloudy => Color::White,
            ThemeTag::Foggy => Color::BrightBlack,
            ThemeTag::Rainy => Color::Blue,
            ThemeTag::Snowy => Color::BrightCyan,
            ThemeTag::Stormy => Color::Magenta,
            ThemeTag::Default => Color::BrightWhite,
        }
    }
}

impl fmt::Display for ThemeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a weather code to its theme.
///
/// Total over `i64`: codes outside the known buckets, including negative
/// ones, are [`ThemeTag::Default`].
pub fn classify(code: i64) -> ThemeTag {
    match code {
        0 => ThemeTag::Sunny,
        1..=3 => ThemeTag::Cloudy,
        45 | 48 => ThemeTag::Foggy,
        51 | 55 | 61 | 63 | 80 => ThemeTag::Rainy,
        65 | 81 | 95 => ThemeTag::Stormy,
        71 | 73 | 75 => ThemeTag::Snowy,
        _ => ThemeTag::Default,
    }
}
