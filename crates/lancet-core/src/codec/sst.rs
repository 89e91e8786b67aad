//! Shared-strings building.
//!
//! The builder is seeded with the source file's items verbatim so that
//! existing indices never move; new strings append after them. When no new
//! strings are appended the writer streams the original part untouched.

use std::collections::HashMap;

use lancet_xml::shared_strings::{
    BoolVal, ColorXml, RichRunXml, RunProperties, SstXml, StringItem, Text, ValF64, ValString,
};

use crate::style::{Color, Font};
use crate::value::RichRun;

/// Deduplicating shared-string pool preserving original item order.
pub struct SstBuilder {
    items: Vec<StringItem>,
    /// Dedup key (see [`item_key`]) -> index.
    index: HashMap<String, usize>,
    original_len: usize,
}

impl SstBuilder {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            original_len: 0,
        }
    }

    /// Seed with the source file's items; their positions are fixed.
    pub fn from_original(items: &[StringItem]) -> Self {
        let mut builder = Self::new();
        for item in items {
            let idx = builder.items.len();
            builder.index.entry(item_key(item)).or_insert(idx);
            builder.items.push(item.clone());
        }
        builder.original_len = builder.items.len();
        builder
    }

    /// Intern a plain string, returning its index.
    pub fn intern(&mut self, text: &str) -> usize {
        let item = StringItem {
            t: Some(Text::new(text)),
            runs: vec![],
        };
        self.intern_item(item)
    }

    /// Intern rich text, returning its index.
    pub fn intern_rich(&mut self, runs: &[RichRun]) -> usize {
        let item = StringItem {
            t: None,
            runs: runs.iter().map(rich_run_to_xml).collect(),
        };
        self.intern_item(item)
    }

    fn intern_item(&mut self, item: StringItem) -> usize {
        let key = item_key(&item);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.items.len();
        self.index.insert(key, idx);
        self.items.push(item);
        idx
    }

    /// Get an item for reading back.
    pub fn get(&self, index: usize) -> Option<&StringItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when strings were appended beyond the seeded originals.
    pub fn has_new(&self) -> bool {
        self.items.len() > self.original_len
    }

    /// Emit the table in insertion order.
    pub fn to_xml(&self) -> SstXml {
        let len = self.items.len() as u32;
        SstXml {
            count: Some(len),
            unique_count: Some(len),
            items: self.items.clone(),
            ..Default::default()
        }
    }
}

impl Default for SstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Dedup key covering text AND formatting, so a rich item never collides
/// with a plain item of the same text.
fn item_key(item: &StringItem) -> String {
    match &item.t {
        Some(t) => format!("t\u{0}{}", t.value),
        None => {
            let mut key = String::from("r");
            for run in &item.runs {
                key.push('\u{0}');
                key.push_str(&run.t.value);
                key.push('\u{1}');
                if let Some(pr) = &run.r_pr {
                    key.push_str(&format!("{pr:?}"));
                }
            }
            key
        }
    }
}

/// Domain rich run -> XML run. Only properties that differ from an
/// unstyled run are written.
pub(crate) fn rich_run_to_xml(run: &RichRun) -> RichRunXml {
    let r_pr = run.font.as_ref().map(|font| RunProperties {
        b: font.bold.then(BoolVal::default),
        i: font.italic.then(BoolVal::default),
        u: font.underline.then(BoolVal::default),
        strike: font.strike.then(BoolVal::default),
        sz: Some(ValF64 { val: font.size }),
        color: font.color.and_then(|c| match c {
            Color::Argb(argb) => Some(ColorXml {
                rgb: Some(format!("{argb:08X}")),
                ..Default::default()
            }),
            Color::Theme { slot, tint } => Some(ColorXml {
                theme: Some(slot.index()),
                tint: (tint != 0.0).then_some(tint),
                ..Default::default()
            }),
        }),
        r_font: Some(ValString {
            val: font.name.clone(),
        }),
    });
    RichRunXml {
        r_pr,
        t: Text::new(&run.text),
    }
}

/// XML run -> domain rich run.
pub(crate) fn rich_run_from_xml(run: &RichRunXml) -> RichRun {
    let font = run.r_pr.as_ref().map(|pr| Font {
        name: pr
            .r_font
            .as_ref()
            .map(|f| f.val.clone())
            .unwrap_or_else(|| Font::default().name),
        size: pr.sz.as_ref().map(|s| s.val).unwrap_or(11.0),
        bold: pr.b.as_ref().is_some_and(|b| b.is_set()),
        italic: pr.i.as_ref().is_some_and(|b| b.is_set()),
        underline: pr.u.as_ref().is_some_and(|b| b.is_set()),
        strike: pr.strike.as_ref().is_some_and(|b| b.is_set()),
        color: pr.color.as_ref().and_then(color_from_xml),
    });
    RichRun {
        text: run.t.value.clone(),
        font,
    }
}

/// Shared color-from-xml conversion (also used by the style index).
pub(crate) fn color_from_xml(xml: &ColorXml) -> Option<Color> {
    if let Some(rgb) = &xml.rgb {
        return Color::from_argb_hex(rgb);
    }
    if let Some(theme) = xml.theme {
        return crate::style::ThemeSlot::from_index(theme).map(|slot| Color::Theme {
            slot,
            tint: xml.tint.unwrap_or(0.0),
        });
    }
    if let Some(indexed) = xml.indexed {
        return crate::theme::indexed_color(indexed).map(Color::Argb);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut builder = SstBuilder::new();
        assert_eq!(builder.intern("alpha"), 0);
        assert_eq!(builder.intern("beta"), 1);
        assert_eq!(builder.intern("alpha"), 0);
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_original_indices_are_stable() {
        let originals = vec![
            StringItem {
                t: Some(Text::new("first")),
                runs: vec![],
            },
            StringItem {
                t: Some(Text::new("second")),
                runs: vec![],
            },
        ];
        let mut builder = SstBuilder::from_original(&originals);
        assert!(!builder.has_new());
        assert_eq!(builder.intern("second"), 1);
        assert!(!builder.has_new());
        assert_eq!(builder.intern("third"), 2);
        assert!(builder.has_new());
    }

    #[test]
    fn test_rich_and_plain_do_not_collide() {
        let mut builder = SstBuilder::new();
        let plain = builder.intern("bold");
        let rich = builder.intern_rich(&[RichRun {
            text: "bold".to_string(),
            font: Some(Font {
                bold: true,
                ..Default::default()
            }),
        }]);
        assert_ne!(plain, rich);
    }

    #[test]
    fn test_rich_run_conversion_roundtrip() {
        let run = RichRun {
            text: "Loud".to_string(),
            font: Some(Font {
                name: "Arial".to_string(),
                size: 14.0,
                bold: true,
                color: Some(Color::Argb(0xFFFF_0000)),
                ..Default::default()
            }),
        };
        let xml = rich_run_to_xml(&run);
        let back = rich_run_from_xml(&xml);
        assert_eq!(back, run);
    }

    #[test]
    fn test_to_xml_counts() {
        let mut builder = SstBuilder::new();
        builder.intern("x");
        builder.intern("y");
        let xml = builder.to_xml();
        assert_eq!(xml.count, Some(2));
        assert_eq!(xml.unique_count, Some(2));
        assert_eq!(xml.items.len(), 2);
    }

    #[test]
    fn test_preserve_space_flag() {
        let mut builder = SstBuilder::new();
        builder.intern(" padded ");
        let xml = builder.to_xml();
        assert_eq!(
            xml.items[0].t.as_ref().unwrap().xml_space.as_deref(),
            Some("preserve")
        );
    }
}
