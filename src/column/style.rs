use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Color as written in a column configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// `#rgb`, `#rrggbb`, `#rrggbbaa` or a palette name
    Name(String),
    /// `[r, g, b]` or `[r, g, b, a]`
    Components(Vec<u8>),
}

const PALETTE: &[(&str, Rgba)] = &[
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("transparent", Rgba::rgba(0, 0, 0, 0)),
];

fn hex_pair(s: &str) -> Option<u8> {
    u8::from_str_radix(s, 16).ok()
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut parts = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Rgba::rgb(parts.next()??, parts.next()??, parts.next()??))
        }
        6 => Some(Rgba::rgb(
            hex_pair(&hex[0..2])?,
            hex_pair(&hex[2..4])?,
            hex_pair(&hex[4..6])?,
        )),
        8 => Some(Rgba::rgba(
            hex_pair(&hex[0..2])?,
            hex_pair(&hex[2..4])?,
            hex_pair(&hex[4..6])?,
            hex_pair(&hex[6..8])?,
        )),
        _ => None,
    }
}

impl ColorSpec {
    pub fn resolve(&self) -> Result<Rgba, String> {
        match self {
            ColorSpec::Name(name) => {
                let trimmed = name.trim();
                if let Some(hex) = trimmed.strip_prefix('#') {
                    return parse_hex(hex).ok_or_else(|| format!("invalid color '{}'", name));
                }
                let lower = trimmed.to_ascii_lowercase();
                PALETTE
                    .iter()
                    .find(|(palette_name, _)| *palette_name == lower)
                    .map(|(_, color)| *color)
                    .ok_or_else(|| format!("invalid color '{}'", name))
            }
            ColorSpec::Components(parts) => match parts.as_slice() {
                [r, g, b] => Ok(Rgba::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Rgba::rgba(*r, *g, *b, *a)),
                _ => Err(format!(
                    "invalid color {:?}: expected 3 or 4 components",
                    parts
                )),
            },
        }
    }
}

/// Column style: font color and background color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    pub color: Option<Rgba>,
    pub bg_color: Option<Rgba>,
}

impl Style {
    pub fn from_specs(color: Option<&ColorSpec>, bg_color: Option<&ColorSpec>) -> Result<Self, String> {
        Ok(Self {
            color: color.map(ColorSpec::resolve).transpose()?,
            bg_color: bg_color.map(ColorSpec::resolve).transpose()?,
        })
    }

    pub fn is_plain(&self) -> bool {
        self.color.is_none() && self.bg_color.is_none()
    }
}
