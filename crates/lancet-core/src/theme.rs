//! Theme palette and legacy indexed colors.
//!
//! Theme-slot colors resolve against the workbook's [`ThemePalette`] at the
//! codec boundary; the domain model keeps the symbolic `(slot, tint)` form
//! so an unchanged cell never bakes in resolved values.

use crate::style::{Color, ThemeSlot};

/// The twelve resolved theme colors, ARGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    colors: [u32; 12],
}

impl ThemePalette {
    pub fn new(colors: [u32; 12]) -> Self {
        Self { colors }
    }

    /// Build from the raw ARGB hex slots the theme part parser produces.
    pub fn from_xml(xml: &lancet_xml::theme::ThemeColorsXml) -> Self {
        let mut colors = Self::default().colors;
        for (i, hex) in xml.colors.iter().enumerate() {
            if let Ok(argb) = u32::from_str_radix(hex, 16) {
                colors[i] = argb;
            }
        }
        Self { colors }
    }

    /// The raw ARGB for a slot, before tinting.
    pub fn slot(&self, slot: ThemeSlot) -> u32 {
        self.colors[slot.index() as usize]
    }

    /// Resolve any color to ARGB, applying tint for theme colors.
    pub fn resolve(&self, color: Color) -> u32 {
        match color {
            Color::Argb(argb) => argb,
            Color::Theme { slot, tint } => apply_tint(self.slot(slot), tint),
        }
    }
}

impl Default for ThemePalette {
    /// The stock Office theme.
    fn default() -> Self {
        Self {
            colors: [
                0xFF00_0000,
                0xFFFF_FFFF,
                0xFF44_546A,
                0xFFE7_E6E6,
                0xFF44_72C4,
                0xFFED_7D31,
                0xFFA5_A5A5,
                0xFFFF_C000,
                0xFF5B_9BD5,
                0xFF70_AD47,
                0xFF05_63C1,
                0xFF95_4F72,
            ],
        }
    }
}

/// Apply a tint in [-1.0, 1.0] to an ARGB color. Positive tints blend each
/// channel toward 255, negative toward 0; alpha is untouched.
pub fn apply_tint(argb: u32, tint: f64) -> u32 {
    if tint == 0.0 {
        return argb;
    }
    let tint = tint.clamp(-1.0, 1.0);
    let channel = |c: u32| -> u32 {
        let c = c as f64;
        let out = if tint > 0.0 {
            c + (255.0 - c) * tint
        } else {
            c * (1.0 + tint)
        };
        out.round().clamp(0.0, 255.0) as u32
    };
    (argb & 0xFF00_0000)
        | channel((argb >> 16) & 0xFF) << 16
        | channel((argb >> 8) & 0xFF) << 8
        | channel(argb & 0xFF)
}

/// The ECMA-376 default indexed palette (legacy color indices 0-63).
/// Indices 64 and 65 are the system window-text and window-background
/// colors; custom `indexedColors` overrides in the stylesheet are not
/// modelled and fall back to this table.
const INDEXED_PALETTE: [u32; 64] = [
    0xFF000000, 0xFFFFFFFF, 0xFFFF0000, 0xFF00FF00, 0xFF0000FF, 0xFFFFFF00, 0xFFFF00FF,
    0xFF00FFFF, 0xFF000000, 0xFFFFFFFF, 0xFFFF0000, 0xFF00FF00, 0xFF0000FF, 0xFFFFFF00,
    0xFFFF00FF, 0xFF00FFFF, 0xFF800000, 0xFF008000, 0xFF000080, 0xFF808000, 0xFF800080,
    0xFF008080, 0xFFC0C0C0, 0xFF808080, 0xFF9999FF, 0xFF993366, 0xFFFFFFCC, 0xFFCCFFFF,
    0xFF660066, 0xFFFF8080, 0xFF0066CC, 0xFFCCCCFF, 0xFF000080, 0xFFFF00FF, 0xFFFFFF00,
    0xFF00FFFF, 0xFF800080, 0xFF800000, 0xFF008080, 0xFF0000FF, 0xFF00CCFF, 0xFFCCFFFF,
    0xFFCCFFCC, 0xFFFFFF99, 0xFF99CCFF, 0xFFFF99CC, 0xFFCC99FF, 0xFFFFCC99, 0xFF3366FF,
    0xFF33CCCC, 0xFF99CC00, 0xFFFFCC00, 0xFFFF9900, 0xFFFF6600, 0xFF666699, 0xFF969696,
    0xFF003366, 0xFF339966, 0xFF003300, 0xFF333300, 0xFF993300, 0xFF993366, 0xFF333399,
    0xFF333333,
];

/// Resolve a legacy palette index to ARGB.
pub fn indexed_color(index: u32) -> Option<u32> {
    match index {
        0..=63 => Some(INDEXED_PALETTE[index as usize]),
        64 => Some(0xFF00_0000),
        65 => Some(0xFFFF_FFFF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_argb_passthrough() {
        let palette = ThemePalette::default();
        assert_eq!(palette.resolve(Color::Argb(0xFF12_3456)), 0xFF12_3456);
    }

    #[test]
    fn test_resolve_theme_slot_without_tint() {
        let palette = ThemePalette::default();
        let c = Color::Theme {
            slot: ThemeSlot::Accent1,
            tint: 0.0,
        };
        assert_eq!(palette.resolve(c), 0xFF44_72C4);
    }

    #[test]
    fn test_positive_tint_blends_toward_white() {
        assert_eq!(apply_tint(0xFF00_0000, 1.0), 0xFFFF_FFFF);
        // 0x80 + (255 - 0x80) * 0.5 = 0x80 + 0x3F.5 -> 0xC0 (rounded)
        let tinted = apply_tint(0xFF80_8080, 0.5);
        assert_eq!(tinted, 0xFFC0_C0C0);
    }

    #[test]
    fn test_negative_tint_blends_toward_black() {
        assert_eq!(apply_tint(0xFFFF_FFFF, -1.0), 0xFF00_0000);
        let tinted = apply_tint(0xFF80_8080, -0.5);
        assert_eq!(tinted, 0xFF40_4040);
    }

    #[test]
    fn test_tint_preserves_alpha() {
        assert_eq!(apply_tint(0x8000_0000, 1.0) >> 24, 0x80);
    }

    #[test]
    fn test_indexed_palette_boundaries() {
        assert_eq!(indexed_color(0), Some(0xFF00_0000));
        assert_eq!(indexed_color(2), Some(0xFFFF_0000));
        assert_eq!(indexed_color(63), Some(0xFF33_3333));
        assert_eq!(indexed_color(64), Some(0xFF00_0000));
        assert_eq!(indexed_color(65), Some(0xFFFF_FFFF));
        assert_eq!(indexed_color(66), None);
    }

    #[test]
    fn test_palette_from_xml() {
        let xml = lancet_xml::theme::ThemeColorsXml::default();
        let palette = ThemePalette::from_xml(&xml);
        assert_eq!(palette, ThemePalette::default());
    }
}
