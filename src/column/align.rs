use serde::{Deserialize, Serialize};

/// Horizontal placement of cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// Vertical placement of cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    Bottom,
    #[default]
    Center,
}

impl HAlign {
    /// Parse `l`/`r`/`c` or `left`/`right`/`center`
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Some(HAlign::Left),
            "r" | "right" => Some(HAlign::Right),
            "c" | "center" => Some(HAlign::Center),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            HAlign::Left => "l",
            HAlign::Right => "r",
            HAlign::Center => "c",
        }
    }
}

impl VAlign {
    /// Parse `t`/`b`/`c` or `top`/`bottom`/`center`
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "t" | "top" => Some(VAlign::Top),
            "b" | "bottom" => Some(VAlign::Bottom),
            "c" | "center" => Some(VAlign::Center),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            VAlign::Top => "t",
            VAlign::Bottom => "b",
            VAlign::Center => "c",
        }
    }
}

/// Column content alignment (both horizontal and vertical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Alignment {
    pub fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Build from configuration tokens, missing tokens use the defaults
    pub fn from_tokens(h_align: Option<&str>, v_align: Option<&str>) -> Result<Self, String> {
        let horizontal = match h_align {
            Some(token) => {
                HAlign::parse(token).ok_or_else(|| format!("invalid h_align '{}'", token))?
            }
            None => HAlign::default(),
        };
        let vertical = match v_align {
            Some(token) => {
                VAlign::parse(token).ok_or_else(|| format!("invalid v_align '{}'", token))?
            }
            None => VAlign::default(),
        };
        Ok(Self::new(horizontal, vertical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_left_center() {
        let align = Alignment::from_tokens(None, None).unwrap();
        assert_eq!(align, Alignment::new(HAlign::Left, VAlign::Center));
    }

    #[test]
    fn test_long_and_short_tokens() {
        let align = Alignment::from_tokens(Some("right"), Some("t")).unwrap();
        assert_eq!(align.horizontal, HAlign::Right);
        assert_eq!(align.vertical, VAlign::Top);
    }

    #[test]
    fn test_invalid_token() {
        let err = Alignment::from_tokens(Some("middle"), None).unwrap_err();
        assert!(err.contains("h_align"));
    }
}
