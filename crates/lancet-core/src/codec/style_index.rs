//! The writer's style index: turning per-sheet style registries into one
//! `xl/styles.xml` with stable component positions.
//!
//! Two strategies, per the workbook's provenance:
//!
//! - **Fresh** (no source): deduplicate every sheet's registry globally by
//!   canonical key and emit minimal component tables.
//! - **Surgical** (source-backed): seed the tables with the source's
//!   original vectors verbatim, then register the styles of modified
//!   sheets on top. Existing xf records are matched by canonical key PLUS
//!   effective numFmtId, so a preserved source id is never collapsed into
//!   a visually equal record with a different id. Unmodified sheets keep
//!   their original indices because their parts stream through untouched.

use std::collections::HashMap;

use lancet_xml::shared_strings::{BoolVal, ColorXml, ValF64, ValString};
use lancet_xml::styles::{
    AlignmentXml, BorderSideXml, BorderXml, FillXml, FontXml, NumFmtXml, NumFmts, PatternFillXml,
    StyleSheetXml, ValU32, Xf,
};

use crate::codec::sst::color_from_xml;
use crate::source::SourceContext;
use crate::style::{
    Align, Border, BorderSide, BorderStyle, CellStyle, Color, Fill, Font, HAlign, NumFmt,
    PatternKind, StyleId, VAlign,
};
use crate::workbook::Workbook;

/// First id available for custom number formats; below are reserved.
const CUSTOM_NUM_FMT_BASE: u32 = 164;

/// The computed stylesheet plus per-sheet id remappings.
pub(crate) struct StyleIndex {
    pub stylesheet: StyleSheetXml,
    /// Workbook sheet index -> (registry StyleId -> xf index).
    pub remap: Vec<HashMap<StyleId, u32>>,
    /// Whether the stylesheet differs from the source's (always true for
    /// fresh builds).
    pub changed: bool,
}

/// Global dedup build for workbooks without a source.
pub(crate) fn build_fresh(workbook: &Workbook) -> StyleIndex {
    let mut interner = Interner::new(StyleSheetXml::minimal(), false);
    let mut remap = Vec::with_capacity(workbook.sheets().len());
    for sheet in workbook.sheets() {
        let mut map = HashMap::new();
        for (sid, style) in sheet.styles().iter() {
            map.insert(sid, interner.xf_for(style));
        }
        remap.push(map);
    }
    StyleIndex {
        stylesheet: interner.finish(),
        remap,
        changed: true,
    }
}

/// Source-seeded build: only modified (or new) sheets register styles.
pub(crate) fn build_surgical(workbook: &Workbook, ctx: &SourceContext) -> StyleIndex {
    let mut interner = Interner::new(ctx.stylesheet.clone(), true);
    let baseline = interner.shape();

    // Existing xfs are addressed by visual key + effective numFmtId.
    let mut xf_lookup: HashMap<String, u32> = HashMap::new();
    for (i, xf) in interner.ss.cell_xfs.xfs.iter().enumerate() {
        let style = style_from_xf(&interner.ss, xf);
        let key = surgical_key(&style, xf.num_fmt_id.unwrap_or(0));
        xf_lookup.entry(key).or_insert(i as u32);
    }

    let mut remap: Vec<HashMap<StyleId, u32>> = vec![HashMap::new(); workbook.sheets().len()];
    for (i, sheet) in workbook.sheets().iter().enumerate() {
        let origin = ctx.origin_of(i);
        let is_modified = match origin {
            Some(orig) => ctx.tracker.modified_sheets.contains(&orig),
            None => true, // added after read
        };
        if !is_modified {
            continue;
        }
        for (sid, style) in sheet.styles().iter() {
            let num_fmt_id = interner.num_fmt_id(style);
            let key = surgical_key(style, num_fmt_id);
            let xf_index = match xf_lookup.get(&key) {
                Some(&existing) => existing,
                None => {
                    let appended = interner.append_xf(style, num_fmt_id);
                    xf_lookup.insert(key, appended);
                    appended
                }
            };
            remap[i].insert(sid, xf_index);
        }
    }

    let changed = interner.shape() != baseline;
    StyleIndex {
        stylesheet: interner.finish(),
        remap,
        changed,
    }
}

fn surgical_key(style: &CellStyle, num_fmt_id: u32) -> String {
    format!("{}#{}", style.canonical_key(), num_fmt_id)
}

// ---------------------------------------------------------------------------
// Component interning
// ---------------------------------------------------------------------------

struct Interner {
    ss: StyleSheetXml,
    honor_preserved: bool,
    font_keys: HashMap<String, u32>,
    fill_keys: HashMap<String, u32>,
    border_keys: HashMap<String, u32>,
    xf_keys: HashMap<String, u32>,
    custom_codes: HashMap<String, u32>,
    next_custom: u32,
}

impl Interner {
    fn new(ss: StyleSheetXml, honor_preserved: bool) -> Self {
        let mut interner = Self {
            ss,
            honor_preserved,
            font_keys: HashMap::new(),
            fill_keys: HashMap::new(),
            border_keys: HashMap::new(),
            xf_keys: HashMap::new(),
            custom_codes: HashMap::new(),
            next_custom: CUSTOM_NUM_FMT_BASE,
        };
        for (i, f) in interner.ss.fonts.fonts.iter().enumerate() {
            interner.font_keys.entry(format!("{f:?}")).or_insert(i as u32);
        }
        for (i, f) in interner.ss.fills.fills.iter().enumerate() {
            interner.fill_keys.entry(format!("{f:?}")).or_insert(i as u32);
        }
        for (i, b) in interner.ss.borders.borders.iter().enumerate() {
            interner
                .border_keys
                .entry(format!("{b:?}"))
                .or_insert(i as u32);
        }
        for (i, xf) in interner.ss.cell_xfs.xfs.iter().enumerate() {
            interner.xf_keys.entry(format!("{xf:?}")).or_insert(i as u32);
        }
        if let Some(num_fmts) = &interner.ss.num_fmts {
            for fmt in &num_fmts.num_fmts {
                interner
                    .custom_codes
                    .entry(fmt.format_code.clone())
                    .or_insert(fmt.num_fmt_id);
            }
            interner.next_custom = num_fmts
                .num_fmts
                .iter()
                .map(|f| f.num_fmt_id + 1)
                .max()
                .unwrap_or(CUSTOM_NUM_FMT_BASE)
                .max(CUSTOM_NUM_FMT_BASE);
        }
        interner
    }

    /// (fonts, fills, borders, numFmts, xfs) lengths, for change checks.
    fn shape(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.ss.fonts.fonts.len(),
            self.ss.fills.fills.len(),
            self.ss.borders.borders.len(),
            self.ss.num_fmts.as_ref().map(|n| n.num_fmts.len()).unwrap_or(0),
            self.ss.cell_xfs.xfs.len(),
        )
    }

    fn intern_font(&mut self, font: &Font) -> u32 {
        let xml = font_to_xml(font);
        let key = format!("{xml:?}");
        if let Some(&i) = self.font_keys.get(&key) {
            return i;
        }
        let i = self.ss.fonts.fonts.len() as u32;
        self.ss.fonts.fonts.push(xml);
        self.font_keys.insert(key, i);
        i
    }

    fn intern_fill(&mut self, fill: &Fill) -> u32 {
        let xml = fill_to_xml(fill);
        let key = format!("{xml:?}");
        if let Some(&i) = self.fill_keys.get(&key) {
            return i;
        }
        let i = self.ss.fills.fills.len() as u32;
        self.ss.fills.fills.push(xml);
        self.fill_keys.insert(key, i);
        i
    }

    fn intern_border(&mut self, border: &Border) -> u32 {
        let xml = border_to_xml(border);
        let key = format!("{xml:?}");
        if let Some(&i) = self.border_keys.get(&key) {
            return i;
        }
        let i = self.ss.borders.borders.len() as u32;
        self.ss.borders.borders.push(xml);
        self.border_keys.insert(key, i);
        i
    }

    /// The numFmtId this style should be written with. Preserved source
    /// ids win on the surgical path; custom codes allocate from 164 up.
    fn num_fmt_id(&mut self, style: &CellStyle) -> u32 {
        if self.honor_preserved {
            if let Some(id) = style.preserved_num_fmt_id {
                return id;
            }
        }
        match style.num_fmt.builtin_id() {
            Some(id) => id,
            None => {
                let code = style.num_fmt.custom_code().unwrap_or("").to_string();
                if let Some(&id) = self.custom_codes.get(&code) {
                    return id;
                }
                let id = self.next_custom;
                self.next_custom += 1;
                self.custom_codes.insert(code.clone(), id);
                self.ss
                    .num_fmts
                    .get_or_insert_with(NumFmts::default)
                    .num_fmts
                    .push(NumFmtXml {
                        num_fmt_id: id,
                        format_code: code,
                    });
                id
            }
        }
    }

    /// Deduplicate-or-append an xf for the style (fresh path).
    fn xf_for(&mut self, style: &CellStyle) -> u32 {
        let num_fmt_id = self.num_fmt_id(style);
        let xf = self.make_xf(style, num_fmt_id);
        let key = format!("{xf:?}");
        if let Some(&i) = self.xf_keys.get(&key) {
            return i;
        }
        let i = self.ss.cell_xfs.xfs.len() as u32;
        self.ss.cell_xfs.xfs.push(xf);
        self.xf_keys.insert(key, i);
        i
    }

    /// Append an xf unconditionally (surgical path; the caller already
    /// checked the lookup).
    fn append_xf(&mut self, style: &CellStyle, num_fmt_id: u32) -> u32 {
        let xf = self.make_xf(style, num_fmt_id);
        let i = self.ss.cell_xfs.xfs.len() as u32;
        self.ss.cell_xfs.xfs.push(xf);
        i
    }

    fn make_xf(&mut self, style: &CellStyle, num_fmt_id: u32) -> Xf {
        let font_id = self.intern_font(&style.font);
        let fill_id = self.intern_fill(&style.fill);
        let border_id = self.intern_border(&style.border);
        let alignment = align_to_xml(&style.align);
        Xf {
            num_fmt_id: Some(num_fmt_id),
            font_id: Some(font_id),
            fill_id: Some(fill_id),
            border_id: Some(border_id),
            xf_id: Some(0),
            apply_number_format: (num_fmt_id != 0).then_some(true),
            apply_font: (font_id != 0).then_some(true),
            apply_fill: (fill_id != 0).then_some(true),
            apply_border: (border_id != 0).then_some(true),
            apply_alignment: alignment.is_some().then_some(true),
            alignment,
        }
    }

    fn finish(mut self) -> StyleSheetXml {
        self.ss.fonts.count = Some(self.ss.fonts.fonts.len() as u32);
        self.ss.fills.count = Some(self.ss.fills.fills.len() as u32);
        self.ss.borders.count = Some(self.ss.borders.borders.len() as u32);
        self.ss.cell_xfs.count = Some(self.ss.cell_xfs.xfs.len() as u32);
        if let Some(num_fmts) = &mut self.ss.num_fmts {
            num_fmts.count = Some(num_fmts.num_fmts.len() as u32);
        }
        self.ss
    }
}

// ---------------------------------------------------------------------------
// Domain <-> XML component conversions
// ---------------------------------------------------------------------------

pub(crate) fn color_to_xml(color: &Color) -> ColorXml {
    match color {
        Color::Argb(argb) => ColorXml {
            rgb: Some(format!("{argb:08X}")),
            ..Default::default()
        },
        Color::Theme { slot, tint } => ColorXml {
            theme: Some(slot.index()),
            tint: (*tint != 0.0).then_some(*tint),
            ..Default::default()
        },
    }
}

pub(crate) fn font_to_xml(font: &Font) -> FontXml {
    FontXml {
        b: font.bold.then(BoolVal::default),
        i: font.italic.then(BoolVal::default),
        u: font.underline.then(BoolVal::default),
        strike: font.strike.then(BoolVal::default),
        sz: Some(ValF64 { val: font.size }),
        color: font.color.as_ref().map(color_to_xml),
        name: Some(ValString {
            val: font.name.clone(),
        }),
        family: Some(ValU32 { val: 2 }),
        scheme: None,
    }
}

pub(crate) fn font_from_xml(xml: &FontXml) -> Font {
    Font {
        name: xml
            .name
            .as_ref()
            .map(|n| n.val.clone())
            .unwrap_or_else(|| Font::default().name),
        size: xml.sz.as_ref().map(|s| s.val).unwrap_or(11.0),
        bold: xml.b.as_ref().is_some_and(|b| b.is_set()),
        italic: xml.i.as_ref().is_some_and(|b| b.is_set()),
        underline: xml.u.as_ref().is_some_and(|b| b.is_set()),
        strike: xml.strike.as_ref().is_some_and(|b| b.is_set()),
        color: xml.color.as_ref().and_then(color_from_xml),
    }
}

pub(crate) fn fill_to_xml(fill: &Fill) -> FillXml {
    let pattern_fill = match fill {
        Fill::None => PatternFillXml {
            pattern_type: Some("none".to_string()),
            ..Default::default()
        },
        Fill::Solid(color) => PatternFillXml {
            pattern_type: Some("solid".to_string()),
            fg_color: Some(color_to_xml(color)),
            bg_color: None,
        },
        Fill::Pattern { fg, bg, pattern } => PatternFillXml {
            pattern_type: Some(pattern.as_str().to_string()),
            fg_color: Some(color_to_xml(fg)),
            bg_color: Some(color_to_xml(bg)),
        },
    };
    FillXml {
        pattern_fill: Some(pattern_fill),
    }
}

pub(crate) fn fill_from_xml(xml: &FillXml) -> Fill {
    let Some(pattern) = &xml.pattern_fill else {
        return Fill::None;
    };
    match pattern.pattern_type.as_deref() {
        None | Some("none") => Fill::None,
        Some("solid") => pattern
            .fg_color
            .as_ref()
            .and_then(color_from_xml)
            .map(Fill::Solid)
            .unwrap_or(Fill::None),
        Some(kind) => {
            let Some(kind) = PatternKind::from_str(kind) else {
                return Fill::None;
            };
            let fg = pattern
                .fg_color
                .as_ref()
                .and_then(color_from_xml)
                .unwrap_or(crate::style::BLACK);
            let bg = pattern
                .bg_color
                .as_ref()
                .and_then(color_from_xml)
                .unwrap_or(crate::style::WHITE);
            Fill::Pattern { fg, bg, pattern: kind }
        }
    }
}

fn side_to_xml(side: &BorderSide) -> Option<BorderSideXml> {
    side.style.as_str().map(|style| BorderSideXml {
        style: Some(style.to_string()),
        color: side.color.as_ref().map(color_to_xml),
    })
}

fn side_from_xml(xml: Option<&BorderSideXml>) -> BorderSide {
    match xml {
        Some(side) => BorderSide {
            style: side
                .style
                .as_deref()
                .and_then(BorderStyle::from_str)
                .unwrap_or(BorderStyle::None),
            color: side.color.as_ref().and_then(color_from_xml),
        },
        None => BorderSide::default(),
    }
}

pub(crate) fn border_to_xml(border: &Border) -> BorderXml {
    BorderXml {
        left: side_to_xml(&border.left),
        right: side_to_xml(&border.right),
        top: side_to_xml(&border.top),
        bottom: side_to_xml(&border.bottom),
        diagonal: None,
    }
}

pub(crate) fn border_from_xml(xml: &BorderXml) -> Border {
    Border {
        top: side_from_xml(xml.top.as_ref()),
        right: side_from_xml(xml.right.as_ref()),
        bottom: side_from_xml(xml.bottom.as_ref()),
        left: side_from_xml(xml.left.as_ref()),
    }
}

pub(crate) fn align_to_xml(align: &Align) -> Option<AlignmentXml> {
    if align.is_default() {
        return None;
    }
    Some(AlignmentXml {
        horizontal: align.horizontal.map(|h| h.as_str().to_string()),
        vertical: align.vertical.map(|v| v.as_str().to_string()),
        wrap_text: align.wrap.then_some(true),
        indent: (align.indent != 0).then_some(align.indent),
    })
}

pub(crate) fn align_from_xml(xml: Option<&AlignmentXml>) -> Align {
    match xml {
        Some(a) => Align {
            horizontal: a.horizontal.as_deref().and_then(HAlign::from_str),
            vertical: a.vertical.as_deref().and_then(VAlign::from_str),
            wrap: a.wrap_text.unwrap_or(false),
            indent: a.indent.unwrap_or(0),
        },
        None => Align::default(),
    }
}

/// Reconstruct a domain style from an xf record, remembering the source
/// numFmtId for preservation.
pub(crate) fn style_from_xf(ss: &StyleSheetXml, xf: &Xf) -> CellStyle {
    let num_fmt_id = xf.num_fmt_id.unwrap_or(0);
    let code = ss.num_fmts.as_ref().and_then(|fmts| {
        fmts.num_fmts
            .iter()
            .find(|f| f.num_fmt_id == num_fmt_id)
            .map(|f| f.format_code.as_str())
    });
    CellStyle {
        font: ss
            .fonts
            .fonts
            .get(xf.font_id.unwrap_or(0) as usize)
            .map(font_from_xml)
            .unwrap_or_default(),
        fill: ss
            .fills
            .fills
            .get(xf.fill_id.unwrap_or(0) as usize)
            .map(fill_from_xml)
            .unwrap_or_default(),
        border: ss
            .borders
            .borders
            .get(xf.border_id.unwrap_or(0) as usize)
            .map(border_from_xml)
            .unwrap_or_default(),
        align: align_from_xml(xf.alignment.as_ref()),
        num_fmt: NumFmt::from_id(num_fmt_id, code),
        preserved_num_fmt_id: Some(num_fmt_id),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::ARef;
    use crate::patch::Patch;
    use crate::source::{
        ModificationTracker, PartManifest, SheetScaffold, SourceContext, SourceFingerprint,
    };
    use crate::style::Fill;
    use pretty_assertions::assert_eq;

    fn a(s: &str) -> ARef {
        ARef::parse(s).unwrap()
    }

    fn bold() -> CellStyle {
        CellStyle {
            font: Font {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn fake_ctx(workbook: &Workbook, stylesheet: StyleSheetXml) -> SourceContext {
        SourceContext {
            path: std::path::PathBuf::from("/nonexistent.xlsx"),
            fingerprint: SourceFingerprint::of_bytes(b""),
            manifest: PartManifest::default(),
            tracker: ModificationTracker::default(),
            content_types: Default::default(),
            package_rels: lancet_xml::relationships::package_rels(),
            workbook_xml: Default::default(),
            workbook_rels: lancet_xml::relationships::workbook_rels(),
            stylesheet,
            shared_strings: vec![],
            sheet_parts: (0..workbook.sheets().len())
                .map(|i| format!("xl/worksheets/sheet{}.xml", i + 1))
                .collect(),
            scaffolds: vec![SheetScaffold::default(); workbook.sheets().len()],
            origin: (0..workbook.sheets().len()).map(Some).collect(),
        }
    }

    #[test]
    fn test_fresh_build_dedups_across_sheets() {
        let wb = Workbook::new("A").unwrap().add_sheet("B").unwrap();
        let wb = wb
            .apply("A", &Patch::SetCellStyle(a("A1"), bold()))
            .unwrap()
            .apply("B", &Patch::SetCellStyle(a("B2"), bold()))
            .unwrap();
        let index = build_fresh(&wb);
        let id_a = wb.sheets()[0].get(a("A1")).unwrap().style.unwrap();
        let id_b = wb.sheets()[1].get(a("B2")).unwrap().style.unwrap();
        assert_eq!(index.remap[0][&id_a], index.remap[1][&id_b]);
        // Default xf 0 plus one bold xf.
        assert_eq!(index.stylesheet.cell_xfs.xfs.len(), 2);
    }

    #[test]
    fn test_fresh_default_style_maps_to_xf_zero() {
        let wb = Workbook::new("A").unwrap();
        let index = build_fresh(&wb);
        assert_eq!(index.remap[0][&StyleId::DEFAULT], 0);
    }

    #[test]
    fn test_surgical_unmodified_is_unchanged() {
        let wb = Workbook::new("A").unwrap();
        let ctx = fake_ctx(&wb, StyleSheetXml::minimal());
        let index = build_surgical(&wb, &ctx);
        assert!(!index.changed);
    }

    #[test]
    fn test_surgical_matches_existing_xf() {
        // Source stylesheet already has a bold xf at index 1; a modified
        // sheet using the same style must map there, appending nothing.
        let mut ss = StyleSheetXml::minimal();
        ss.fonts.fonts.push(font_to_xml(&Font {
            bold: true,
            ..Default::default()
        }));
        ss.cell_xfs.xfs.push(Xf {
            num_fmt_id: Some(0),
            font_id: Some(1),
            fill_id: Some(0),
            border_id: Some(0),
            xf_id: Some(0),
            apply_font: Some(true),
            ..Default::default()
        });

        let wb = Workbook::new("A").unwrap();
        let wb = wb
            .apply("A", &Patch::SetCellStyle(a("A1"), bold()))
            .unwrap();
        let mut ctx = fake_ctx(&wb, ss);
        ctx.tracker.mark_sheet_modified(0);

        let index = build_surgical(&wb, &ctx);
        let sid = wb.sheets()[0].get(a("A1")).unwrap().style.unwrap();
        assert_eq!(index.remap[0][&sid], 1);
        assert!(!index.changed);
    }

    #[test]
    fn test_surgical_appends_new_styles_after_originals() {
        let wb = Workbook::new("A").unwrap();
        let style = CellStyle {
            fill: Fill::Solid(Color::rgb(0, 0xFF, 0)),
            ..Default::default()
        };
        let wb = wb
            .apply("A", &Patch::SetCellStyle(a("A1"), style))
            .unwrap();
        let mut ctx = fake_ctx(&wb, StyleSheetXml::minimal());
        ctx.tracker.mark_sheet_modified(0);

        let original_xfs = StyleSheetXml::minimal().cell_xfs.xfs.len();
        let index = build_surgical(&wb, &ctx);
        assert!(index.changed);
        let sid = wb.sheets()[0].get(a("A1")).unwrap().style.unwrap();
        assert_eq!(index.remap[0][&sid] as usize, original_xfs);
        // Originals stayed in place.
        assert_eq!(
            index.stylesheet.cell_xfs.xfs[..original_xfs],
            StyleSheetXml::minimal().cell_xfs.xfs[..]
        );
    }

    #[test]
    fn test_surgical_emits_preserved_num_fmt_id() {
        // A source xf carrying numFmtId 10; the style keeps that id even
        // though its visual format would dedup to id 9 territory.
        let mut ss = StyleSheetXml::minimal();
        ss.cell_xfs.xfs.push(Xf {
            num_fmt_id: Some(10),
            font_id: Some(0),
            fill_id: Some(0),
            border_id: Some(0),
            xf_id: Some(0),
            apply_number_format: Some(true),
            ..Default::default()
        });

        let style = style_from_xf(&ss, &ss.cell_xfs.xfs[1]);
        assert_eq!(style.preserved_num_fmt_id, Some(10));

        let wb = Workbook::new("A").unwrap();
        let wb = wb
            .apply("A", &Patch::SetCellStyle(a("A1"), style))
            .unwrap();
        let mut ctx = fake_ctx(&wb, ss);
        ctx.tracker.mark_sheet_modified(0);

        let index = build_surgical(&wb, &ctx);
        let sid = wb.sheets()[0].get(a("A1")).unwrap().style.unwrap();
        let xf = &index.stylesheet.cell_xfs.xfs[index.remap[0][&sid] as usize];
        assert_eq!(xf.num_fmt_id, Some(10));
        assert!(!index.changed);
    }

    #[test]
    fn test_custom_format_allocates_above_base() {
        let wb = Workbook::new("A").unwrap();
        let style = CellStyle {
            num_fmt: NumFmt::Custom("0.000".to_string()),
            ..Default::default()
        };
        let wb = wb
            .apply("A", &Patch::SetCellStyle(a("A1"), style))
            .unwrap();
        let index = build_fresh(&wb);
        let fmts = index.stylesheet.num_fmts.unwrap();
        assert_eq!(fmts.num_fmts.len(), 1);
        assert_eq!(fmts.num_fmts[0].num_fmt_id, CUSTOM_NUM_FMT_BASE);
        assert_eq!(fmts.num_fmts[0].format_code, "0.000");
    }

    #[test]
    fn test_component_conversions_roundtrip() {
        let style = CellStyle {
            font: Font {
                name: "Arial".to_string(),
                size: 9.5,
                italic: true,
                color: Some(Color::rgb(1, 2, 3)),
                ..Default::default()
            },
            fill: Fill::Solid(Color::rgb(9, 9, 9)),
            border: Border::outline(),
            align: Align {
                horizontal: Some(HAlign::Center),
                vertical: Some(VAlign::Middle),
                wrap: true,
                indent: 2,
            },
            num_fmt: NumFmt::Percent,
            preserved_num_fmt_id: None,
        };
        assert_eq!(font_from_xml(&font_to_xml(&style.font)), style.font);
        assert_eq!(fill_from_xml(&fill_to_xml(&style.fill)), style.fill);
        assert_eq!(border_from_xml(&border_to_xml(&style.border)), style.border);
        assert_eq!(
            align_from_xml(align_to_xml(&style.align).as_ref()),
            style.align
        );
    }
}
