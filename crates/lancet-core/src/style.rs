//! Cell styles and the deduplicating style registry.
//!
//! A [`CellStyle`] bundles font, fill, border, alignment, and number
//! format. Styles are registered per sheet in a [`StyleRegistry`], which
//! collapses visually identical styles to a single [`StyleId`] via a
//! deterministic canonical key.
//!
//! The canonical key captures *visual equivalence* and drives
//! deduplication. The `preserved_num_fmt_id` captures *source identity* and
//! drives byte-exact preservation on surgical writes -- it is deliberately
//! NOT part of the key. Two styles that display identically but originate
//! from different `numFmt` entries in the source file are therefore
//! structurally equal to the registry.

use std::collections::HashMap;
use std::fmt::Write as _;

/// A theme color slot, in `clrScheme` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSlot {
    Dark1,
    Light1,
    Dark2,
    Light2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hyperlink,
    FollowedHyperlink,
}

impl ThemeSlot {
    pub const ALL: [ThemeSlot; 12] = [
        ThemeSlot::Dark1,
        ThemeSlot::Light1,
        ThemeSlot::Dark2,
        ThemeSlot::Light2,
        ThemeSlot::Accent1,
        ThemeSlot::Accent2,
        ThemeSlot::Accent3,
        ThemeSlot::Accent4,
        ThemeSlot::Accent5,
        ThemeSlot::Accent6,
        ThemeSlot::Hyperlink,
        ThemeSlot::FollowedHyperlink,
    ];

    pub fn index(self) -> u32 {
        Self::ALL.iter().position(|&s| s == self).unwrap() as u32
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// A color: raw ARGB or a theme slot with a tint in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// 32-bit ARGB, alpha in the high byte.
    Argb(u32),
    /// Theme slot reference; resolution happens at the codec boundary
    /// against the workbook's [`crate::theme::ThemePalette`].
    Theme { slot: ThemeSlot, tint: f64 },
}

impl Color {
    /// Opaque RGB color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Argb(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Parse an 8-digit ARGB hex string (as OOXML writes it).
    pub fn from_argb_hex(hex: &str) -> Option<Self> {
        if hex.len() != 8 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color::Argb)
    }

    /// 8-digit uppercase ARGB hex for [`Color::Argb`]; `None` for theme
    /// colors, which need a palette to resolve.
    pub fn argb_hex(self) -> Option<String> {
        match self {
            Color::Argb(argb) => Some(format!("{argb:08X}")),
            Color::Theme { .. } => None,
        }
    }

    fn key(self, out: &mut String) {
        match self {
            Color::Argb(argb) => {
                let _ = write!(out, "#{argb:08X}");
            }
            Color::Theme { slot, tint } => {
                let _ = write!(out, "t{}:{tint:?}", slot.index());
            }
        }
    }
}

pub const BLACK: Color = Color::Argb(0xFF00_0000);
pub const WHITE: Color = Color::Argb(0xFFFF_FFFF);

/// Font description.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    /// Size in points.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub color: Option<Color>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            bold: false,
            italic: false,
            underline: false,
            strike: false,
            color: None,
        }
    }
}

impl Font {
    fn key(&self, out: &mut String) {
        let _ = write!(
            out,
            "f:{}:{:?}:{}{}{}{}",
            self.name,
            self.size,
            self.bold as u8,
            self.italic as u8,
            self.underline as u8,
            self.strike as u8
        );
        if let Some(c) = self.color {
            c.key(out);
        }
    }
}

/// Fill pattern kinds from the OOXML enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Gray125,
    DarkGray,
    MediumGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray0625,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Gray125 => "gray125",
            PatternKind::DarkGray => "darkGray",
            PatternKind::MediumGray => "mediumGray",
            PatternKind::LightGray => "lightGray",
            PatternKind::DarkHorizontal => "darkHorizontal",
            PatternKind::DarkVertical => "darkVertical",
            PatternKind::DarkDown => "darkDown",
            PatternKind::DarkUp => "darkUp",
            PatternKind::DarkGrid => "darkGrid",
            PatternKind::DarkTrellis => "darkTrellis",
            PatternKind::LightHorizontal => "lightHorizontal",
            PatternKind::LightVertical => "lightVertical",
            PatternKind::LightDown => "lightDown",
            PatternKind::LightUp => "lightUp",
            PatternKind::LightGrid => "lightGrid",
            PatternKind::LightTrellis => "lightTrellis",
            PatternKind::Gray0625 => "gray0625",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gray125" => Some(PatternKind::Gray125),
            "darkGray" => Some(PatternKind::DarkGray),
            "mediumGray" => Some(PatternKind::MediumGray),
            "lightGray" => Some(PatternKind::LightGray),
            "darkHorizontal" => Some(PatternKind::DarkHorizontal),
            "darkVertical" => Some(PatternKind::DarkVertical),
            "darkDown" => Some(PatternKind::DarkDown),
            "darkUp" => Some(PatternKind::DarkUp),
            "darkGrid" => Some(PatternKind::DarkGrid),
            "darkTrellis" => Some(PatternKind::DarkTrellis),
            "lightHorizontal" => Some(PatternKind::LightHorizontal),
            "lightVertical" => Some(PatternKind::LightVertical),
            "lightDown" => Some(PatternKind::LightDown),
            "lightUp" => Some(PatternKind::LightUp),
            "lightGrid" => Some(PatternKind::LightGrid),
            "lightTrellis" => Some(PatternKind::LightTrellis),
            "gray0625" => Some(PatternKind::Gray0625),
            _ => None,
        }
    }
}

/// Cell background fill.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Fill {
    #[default]
    None,
    Solid(Color),
    Pattern {
        fg: Color,
        bg: Color,
        pattern: PatternKind,
    },
}

impl Fill {
    fn key(&self, out: &mut String) {
        match self {
            Fill::None => out.push_str("l:-"),
            Fill::Solid(c) => {
                out.push_str("l:s");
                c.key(out);
            }
            Fill::Pattern { fg, bg, pattern } => {
                let _ = write!(out, "l:p{}", pattern.as_str());
                fg.key(out);
                bg.key(out);
            }
        }
    }
}

/// Border line styles from the OOXML enumeration. `None` means no line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            BorderStyle::None => None,
            BorderStyle::Thin => Some("thin"),
            BorderStyle::Medium => Some("medium"),
            BorderStyle::Thick => Some("thick"),
            BorderStyle::Dashed => Some("dashed"),
            BorderStyle::Dotted => Some("dotted"),
            BorderStyle::Double => Some("double"),
            BorderStyle::Hair => Some("hair"),
            BorderStyle::MediumDashed => Some("mediumDashed"),
            BorderStyle::DashDot => Some("dashDot"),
            BorderStyle::MediumDashDot => Some("mediumDashDot"),
            BorderStyle::DashDotDot => Some("dashDotDot"),
            BorderStyle::MediumDashDotDot => Some("mediumDashDotDot"),
            BorderStyle::SlantDashDot => Some("slantDashDot"),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "thin" => Some(BorderStyle::Thin),
            "medium" => Some(BorderStyle::Medium),
            "thick" => Some(BorderStyle::Thick),
            "dashed" => Some(BorderStyle::Dashed),
            "dotted" => Some(BorderStyle::Dotted),
            "double" => Some(BorderStyle::Double),
            "hair" => Some(BorderStyle::Hair),
            "mediumDashed" => Some(BorderStyle::MediumDashed),
            "dashDot" => Some(BorderStyle::DashDot),
            "mediumDashDot" => Some(BorderStyle::MediumDashDot),
            "dashDotDot" => Some(BorderStyle::DashDotDot),
            "mediumDashDotDot" => Some(BorderStyle::MediumDashDotDot),
            "slantDashDot" => Some(BorderStyle::SlantDashDot),
            _ => None,
        }
    }
}

/// One side of a cell border.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderSide {
    pub style: BorderStyle,
    pub color: Option<Color>,
}

impl BorderSide {
    pub fn thin() -> Self {
        Self {
            style: BorderStyle::Thin,
            color: Some(BLACK),
        }
    }

    fn key(&self, out: &mut String) {
        let _ = write!(out, "{}", self.style.as_str().unwrap_or("-"));
        if let Some(c) = self.color {
            c.key(out);
        }
    }
}

/// The four sides of a cell border.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Border {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
}

impl Border {
    /// A thin black outline on all four sides.
    pub fn outline() -> Self {
        Self {
            top: BorderSide::thin(),
            right: BorderSide::thin(),
            bottom: BorderSide::thin(),
            left: BorderSide::thin(),
        }
    }

    fn key(&self, out: &mut String) {
        out.push_str("b:");
        self.top.key(out);
        out.push('/');
        self.right.key(out);
        out.push('/');
        self.bottom.key(out);
        out.push('/');
        self.left.key(out);
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
    Justify,
    Fill,
    Distributed,
}

impl HAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
            HAlign::Justify => "justify",
            HAlign::Fill => "fill",
            HAlign::Distributed => "distributed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "left" => Some(HAlign::Left),
            "center" => Some(HAlign::Center),
            "right" => Some(HAlign::Right),
            "justify" => Some(HAlign::Justify),
            "fill" => Some(HAlign::Fill),
            "distributed" => Some(HAlign::Distributed),
            _ => None,
        }
    }
}

/// Vertical alignment. OOXML spells `Middle` as `center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
    Justify,
    Distributed,
}

impl VAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Middle => "center",
            VAlign::Bottom => "bottom",
            VAlign::Justify => "justify",
            VAlign::Distributed => "distributed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "top" => Some(VAlign::Top),
            "center" => Some(VAlign::Middle),
            "bottom" => Some(VAlign::Bottom),
            "justify" => Some(VAlign::Justify),
            "distributed" => Some(VAlign::Distributed),
            _ => None,
        }
    }
}

/// Cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Align {
    pub horizontal: Option<HAlign>,
    pub vertical: Option<VAlign>,
    pub wrap: bool,
    pub indent: u32,
}

impl Align {
    pub fn is_default(&self) -> bool {
        *self == Align::default()
    }

    fn key(&self, out: &mut String) {
        let _ = write!(
            out,
            "a:{}:{}:{}:{}",
            self.horizontal.map(|h| h.as_str()).unwrap_or("-"),
            self.vertical.map(|v| v.as_str()).unwrap_or("-"),
            self.wrap as u8,
            self.indent
        );
    }
}

/// Number formats: a closed set of built-ins plus custom codes. Each
/// built-in maps to its reserved OOXML format id.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NumFmt {
    #[default]
    General,
    Integer,
    Decimal,
    Thousands,
    ThousandsDecimal,
    Currency,
    Percent,
    PercentDecimal,
    Scientific,
    Date,
    Time,
    DateTime,
    Text,
    Custom(String),
}

impl NumFmt {
    /// The reserved OOXML id for built-ins; `None` for custom codes, which
    /// the style index allocates at 164 and above.
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumFmt::General => Some(0),
            NumFmt::Integer => Some(1),
            NumFmt::Decimal => Some(2),
            NumFmt::Thousands => Some(3),
            NumFmt::ThousandsDecimal => Some(4),
            NumFmt::Currency => Some(7),
            NumFmt::Percent => Some(9),
            NumFmt::PercentDecimal => Some(10),
            NumFmt::Scientific => Some(11),
            NumFmt::Date => Some(14),
            NumFmt::Time => Some(21),
            NumFmt::DateTime => Some(22),
            NumFmt::Text => Some(49),
            NumFmt::Custom(_) => None,
        }
    }

    /// Resolve a format id from a written file. Unknown ids with a supplied
    /// code become `Custom`; unknown ids without one degrade to `General`.
    pub fn from_id(id: u32, code: Option<&str>) -> Self {
        match id {
            0 => NumFmt::General,
            1 => NumFmt::Integer,
            2 => NumFmt::Decimal,
            3 => NumFmt::Thousands,
            4 => NumFmt::ThousandsDecimal,
            7 => NumFmt::Currency,
            9 => NumFmt::Percent,
            10 => NumFmt::PercentDecimal,
            11 => NumFmt::Scientific,
            14 => NumFmt::Date,
            21 => NumFmt::Time,
            22 => NumFmt::DateTime,
            49 => NumFmt::Text,
            _ => match code {
                Some(code) => NumFmt::Custom(code.to_string()),
                None => NumFmt::General,
            },
        }
    }

    /// The format code for custom formats; built-ins are identified by id
    /// alone and carry no code in the file.
    pub fn custom_code(&self) -> Option<&str> {
        match self {
            NumFmt::Custom(code) => Some(code),
            _ => None,
        }
    }

    /// Whether this format renders serial numbers as dates or times.
    pub fn is_date_like(&self) -> bool {
        matches!(self, NumFmt::Date | NumFmt::Time | NumFmt::DateTime)
    }

    fn key(&self, out: &mut String) {
        match self.builtin_id() {
            Some(id) => {
                let _ = write!(out, "n:{id}");
            }
            None => {
                let _ = write!(out, "n:c{}", self.custom_code().unwrap_or(""));
            }
        }
    }
}

/// A complete cell style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellStyle {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub align: Align,
    pub num_fmt: NumFmt,
    /// The `numFmtId` this style carried in the source file, kept so a
    /// surgical write can re-emit the exact id. Not part of the canonical
    /// key.
    pub preserved_num_fmt_id: Option<u32>,
}

impl CellStyle {
    /// Deterministic signature of the visual properties. Two styles with
    /// equal keys are interchangeable on screen.
    pub fn canonical_key(&self) -> String {
        let mut out = String::with_capacity(64);
        self.font.key(&mut out);
        out.push('|');
        self.fill.key(&mut out);
        out.push('|');
        self.border.key(&mut out);
        out.push('|');
        self.align.key(&mut out);
        out.push('|');
        self.num_fmt.key(&mut out);
        out
    }
}

/// Opaque index into a sheet's [`StyleRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleId(pub u32);

impl StyleId {
    /// The default style, always slot 0.
    pub const DEFAULT: StyleId = StyleId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only style store with canonical-key deduplication. Slot 0 is
/// always the default style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRegistry {
    styles: Vec<CellStyle>,
    by_key: HashMap<String, StyleId>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        let default = CellStyle::default();
        let mut by_key = HashMap::new();
        by_key.insert(default.canonical_key(), StyleId::DEFAULT);
        Self {
            styles: vec![default],
            by_key,
        }
    }

    /// Register a style, returning the id of an existing visually equal
    /// entry when one exists. The vector only grows for genuinely new
    /// looks.
    pub fn register(&mut self, style: CellStyle) -> StyleId {
        let key = style.canonical_key();
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = StyleId(self.styles.len() as u32);
        self.styles.push(style);
        self.by_key.insert(key, id);
        id
    }

    pub fn get(&self, id: StyleId) -> Option<&CellStyle> {
        self.styles.get(id.index())
    }

    /// Whether the id names a live entry.
    pub fn contains(&self, id: StyleId) -> bool {
        id.index() < self.styles.len()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        false // slot 0 is always present
    }

    /// Styles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &CellStyle)> {
        self.styles
            .iter()
            .enumerate()
            .map(|(i, s)| (StyleId(i as u32), s))
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_slot_zero_is_default() {
        let reg = StyleRegistry::new();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(StyleId::DEFAULT), Some(&CellStyle::default()));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut reg = StyleRegistry::new();
        let style = CellStyle {
            font: Font {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let id1 = reg.register(style.clone());
        let len_after_first = reg.len();
        let id2 = reg.register(style);
        assert_eq!(id1, id2);
        assert_eq!(reg.len(), len_after_first);
    }

    #[test]
    fn test_register_default_returns_slot_zero() {
        let mut reg = StyleRegistry::new();
        assert_eq!(reg.register(CellStyle::default()), StyleId::DEFAULT);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_canonical_key_ignores_preserved_num_fmt_id() {
        let a = CellStyle {
            preserved_num_fmt_id: Some(10),
            ..Default::default()
        };
        let b = CellStyle {
            preserved_num_fmt_id: Some(11),
            ..Default::default()
        };
        assert_eq!(a.canonical_key(), b.canonical_key());

        let mut reg = StyleRegistry::new();
        let id_a = reg.register(a);
        let id_b = reg.register(b);
        assert_eq!(id_a, id_b);
    }

    #[test]
    fn test_canonical_key_distinguishes_visual_differences() {
        let base = CellStyle::default();
        let bold = CellStyle {
            font: Font {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let filled = CellStyle {
            fill: Fill::Solid(Color::rgb(0xFF, 0, 0)),
            ..Default::default()
        };
        let keys = [
            base.canonical_key(),
            bold.canonical_key(),
            filled.canonical_key(),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert_ne!(keys[1], keys[2]);
    }

    #[test]
    fn test_distinct_styles_get_sequential_ids() {
        let mut reg = StyleRegistry::new();
        let bold = reg.register(CellStyle {
            font: Font {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        });
        let italic = reg.register(CellStyle {
            font: Font {
                italic: true,
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(bold, StyleId(1));
        assert_eq!(italic, StyleId(2));
    }

    #[test]
    fn test_numfmt_builtin_ids() {
        assert_eq!(NumFmt::General.builtin_id(), Some(0));
        assert_eq!(NumFmt::Integer.builtin_id(), Some(1));
        assert_eq!(NumFmt::Decimal.builtin_id(), Some(2));
        assert_eq!(NumFmt::Percent.builtin_id(), Some(9));
        assert_eq!(NumFmt::Date.builtin_id(), Some(14));
        assert_eq!(NumFmt::DateTime.builtin_id(), Some(22));
        assert_eq!(NumFmt::Text.builtin_id(), Some(49));
        assert_eq!(NumFmt::Custom("0.000".to_string()).builtin_id(), None);
    }

    #[test]
    fn test_numfmt_from_id() {
        assert_eq!(NumFmt::from_id(0, None), NumFmt::General);
        assert_eq!(NumFmt::from_id(14, None), NumFmt::Date);
        assert_eq!(
            NumFmt::from_id(164, Some("0.000")),
            NumFmt::Custom("0.000".to_string())
        );
        assert_eq!(NumFmt::from_id(177, None), NumFmt::General);
    }

    #[test]
    fn test_numfmt_builtins_roundtrip_through_id() {
        for fmt in [
            NumFmt::General,
            NumFmt::Integer,
            NumFmt::Decimal,
            NumFmt::Thousands,
            NumFmt::ThousandsDecimal,
            NumFmt::Currency,
            NumFmt::Percent,
            NumFmt::PercentDecimal,
            NumFmt::Scientific,
            NumFmt::Date,
            NumFmt::Time,
            NumFmt::DateTime,
            NumFmt::Text,
        ] {
            let id = fmt.builtin_id().unwrap();
            assert_eq!(NumFmt::from_id(id, None), fmt);
        }
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(Color::rgb(0xFF, 0x00, 0x00), Color::Argb(0xFFFF_0000));
        assert_eq!(
            Color::from_argb_hex("FF00FF00"),
            Some(Color::Argb(0xFF00_FF00))
        );
        assert_eq!(Color::from_argb_hex("nope"), None);
        assert_eq!(
            Color::Argb(0xFF12_34AB).argb_hex().as_deref(),
            Some("FF1234AB")
        );
        assert!(Color::Theme {
            slot: ThemeSlot::Accent1,
            tint: 0.0
        }
        .argb_hex()
        .is_none());
    }

    #[test]
    fn test_border_style_str_roundtrip() {
        for style in [
            BorderStyle::Thin,
            BorderStyle::Medium,
            BorderStyle::Thick,
            BorderStyle::Dashed,
            BorderStyle::Dotted,
            BorderStyle::Double,
            BorderStyle::Hair,
            BorderStyle::DashDot,
            BorderStyle::SlantDashDot,
        ] {
            let s = style.as_str().unwrap();
            assert_eq!(BorderStyle::from_str(s), Some(style));
        }
        assert_eq!(BorderStyle::None.as_str(), None);
    }

    #[test]
    fn test_theme_slot_index_roundtrip() {
        for slot in ThemeSlot::ALL {
            assert_eq!(ThemeSlot::from_index(slot.index()), Some(slot));
        }
        assert_eq!(ThemeSlot::from_index(12), None);
    }
}
