use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::theme::{DEFAULT_BACKGROUND_VALUE, DEFAULT_PRIMARY_COLOR};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("Invalid background_type \"{0}\". Use \"color\" or \"image\"")]
    InvalidBackgroundType(String),

    #[error(
        "Invalid layout \"{0}\". Use one of: grid, list, accordion, classic, ultra-elegant, cafe-typewriter, cafe-relax, visual"
    )]
    InvalidLayout(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
}

impl BackgroundType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Image => "image",
        }
    }
}

impl FromStr for BackgroundType {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "color" => Ok(Self::Color),
            "image" => Ok(Self::Image),
            _ => Err(ThemeError::InvalidBackgroundType(s.to_string())),
        }
    }
}

impl fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Grid,
    List,
    Accordion,
    Classic,
    UltraElegant,
    CafeTypewriter,
    CafeRelax,
    Visual,
}

impl Layout {
    pub const ALL: [Self; 8] = [
        Self::Grid,
        Self::List,
        Self::Accordion,
        Self::Classic,
        Self::UltraElegant,
        Self::CafeTypewriter,
        Self::CafeRelax,
        Self::Visual,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
            Self::Accordion => "accordion",
            Self::Classic => "classic",
            Self::UltraElegant => "ultra-elegant",
            Self::CafeTypewriter => "cafe-typewriter",
            Self::CafeRelax => "cafe-relax",
            Self::Visual => "visual",
        }
    }
}

impl FromStr for Layout {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == wanted)
            .ok_or_else(|| ThemeError::InvalidLayout(s.to_string()))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub primary_color: String,
    pub background_type: BackgroundType,
    pub background_value: String,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub layout: Layout,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            background_type: BackgroundType::default(),
            background_value: DEFAULT_BACKGROUND_VALUE.to_string(),
            logo_url: None,
            cover_url: None,
            layout: Layout::default(),
        }
    }
}

/// Partial theme update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeUpdate {
    pub primary_color: Option<String>,
    pub background_type: Option<String>,
    pub background_value: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub layout: Option<String>,
}

impl Theme {
    /// Returns the updated theme, or an error without touching `self`.
    pub fn apply(&self, update: &ThemeUpdate) -> Result<Self, ThemeError> {
        let background_type = update
            .background_type
            .as_deref()
            .map(BackgroundType::from_str)
            .transpose()?;
        let layout = update.layout.as_deref().map(Layout::from_str).transpose()?;

        let mut next = self.clone();

        if let Some(color) = &update.primary_color {
            next.primary_color = color.trim().to_string();
        }
        if let Some(bt) = background_type {
            next.background_type = bt;
        }
        if let Some(value) = &update.background_value {
            next.background_value = value.trim().to_string();
        }
        if let Some(logo) = &update.logo_url {
            next.logo_url = non_empty(logo);
        }
        if let Some(cover) = &update.cover_url {
            next.cover_url = non_empty(cover);
        }
        if let Some(layout) = layout {
            next.layout = layout;
        }

        Ok(next)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_parsing() {
        assert_eq!("grid".parse::<Layout>().unwrap(), Layout::Grid);
        assert_eq!(" Ultra-Elegant ".parse::<Layout>().unwrap(), Layout::UltraElegant);
        assert_eq!("cafe-relax".parse::<Layout>().unwrap(), Layout::CafeRelax);
        assert!("masonry".parse::<Layout>().is_err());
        assert!("".parse::<Layout>().is_err());
    }

    #[test]
    fn test_layout_round_trips_through_str() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
        }
    }

    #[test]
    fn test_background_type_parsing() {
        assert_eq!("IMAGE".parse::<BackgroundType>().unwrap(), BackgroundType::Image);
        assert_eq!(
            "gradient".parse::<BackgroundType>(),
            Err(ThemeError::InvalidBackgroundType("gradient".to_string()))
        );
    }

    #[test]
    fn test_apply_partial_update() {
        let theme = Theme::default();
        let update = ThemeUpdate {
            primary_color: Some(" #ff0000 ".to_string()),
            layout: Some("visual".to_string()),
            ..Default::default()
        };

        let next = theme.apply(&update).unwrap();
        assert_eq!(next.primary_color, "#ff0000");
        assert_eq!(next.layout, Layout::Visual);
        assert_eq!(next.background_value, DEFAULT_BACKGROUND_VALUE);
        assert_eq!(next.background_type, BackgroundType::Color);
    }

    #[test]
    fn test_apply_rejects_whole_update_on_invalid_value() {
        let theme = Theme::default();
        let update = ThemeUpdate {
            primary_color: Some("#000000".to_string()),
            background_type: Some("video".to_string()),
            ..Default::default()
        };

        assert!(theme.apply(&update).is_err());
        assert_eq!(theme.primary_color, DEFAULT_PRIMARY_COLOR);
    }

    #[test]
    fn test_empty_logo_clears_it() {
        let theme = Theme {
            logo_url: Some("/uploads/logo.png".to_string()),
            ..Default::default()
        };
        let update = ThemeUpdate {
            logo_url: Some("   ".to_string()),
            ..Default::default()
        };

        assert_eq!(theme.apply(&update).unwrap().logo_url, None);
    }
}
