//! The OOXML reader.
//!
//! Walks the package relationships, parses the modelled parts into the
//! domain model, and records everything else in the part manifest as
//! preserved. Unsupported content is never fatal at read time: whatever
//! the model does not understand stays in the source archive and will be
//! streamed through on write.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use serde::de::DeserializeOwned;
use zip::ZipArchive;

use lancet_xml::comments::CommentsXml;
use lancet_xml::content_types::ContentTypes;
use lancet_xml::relationships::{rel_types, Relationships};
use lancet_xml::shared_strings::{SstXml, StringItem};
use lancet_xml::styles::StyleSheetXml;
use lancet_xml::table::TableXml;
use lancet_xml::workbook::WorkbookXml;
use lancet_xml::worksheet::{cell_types, CellXml, WorksheetXml};

use crate::addr::{ARef, CellRange, SheetName};
use crate::codec::paths::{rels_path_for, resolve_target};
use crate::codec::sst::rich_run_from_xml;
use crate::codec::style_index::style_from_xf;
use crate::error::{Error, Result};
use crate::sheet::{Cell, ColProps, Comment, RowProps, Sheet, Table};
use crate::source::{
    CompressionKind, ManifestEntry, ModificationTracker, PartManifest, SheetScaffold,
    SourceContext, SourceFingerprint,
};
use crate::style::{CellStyle, StyleId};
use crate::theme::ThemePalette;
use crate::value::{serial_to_datetime, CellError, CellValue};
use crate::workbook::{DefinedName, SheetVisibility, Workbook, WorkbookMeta};

/// Read a workbook from disk, capturing a [`SourceContext`] so later
/// writes can take the surgical path.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    read_impl(&bytes, Some(path))
}

/// Read a workbook from an in-memory buffer. No source context is
/// captured; writing such a workbook always regenerates every part.
pub fn read_bytes(bytes: &[u8]) -> Result<Workbook> {
    read_impl(bytes, None)
}

fn read_impl(bytes: &[u8], path: Option<&Path>) -> Result<Workbook> {
    let fingerprint = SourceFingerprint::of_bytes(bytes);
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| Error::CorruptZip(e.to_string()))?;

    let mut manifest = build_manifest(&mut archive)?;

    // Package skeleton.
    let content_types: ContentTypes = parse_part(&mut archive, "[Content_Types].xml")?;
    let package_rels: Relationships = parse_part(&mut archive, "_rels/.rels")?;
    let workbook_part = package_rels
        .by_type(rel_types::OFFICE_DOCUMENT)
        .map(|r| r.target.trim_start_matches('/').to_string())
        .unwrap_or_else(|| "xl/workbook.xml".to_string());
    let workbook_xml: WorkbookXml = parse_part(&mut archive, &workbook_part)?;
    let workbook_rels: Relationships = parse_part(&mut archive, &rels_path_for(&workbook_part))?;

    // Styles.
    let styles_part = workbook_rels
        .by_type(rel_types::STYLES)
        .map(|r| resolve_target(&workbook_part, &r.target));
    let stylesheet: StyleSheetXml = match &styles_part {
        Some(part) if manifest.contains(part) => parse_part(&mut archive, part)?,
        _ => StyleSheetXml::minimal(),
    };
    let xf_styles: Vec<CellStyle> = stylesheet
        .cell_xfs
        .xfs
        .iter()
        .map(|xf| style_from_xf(&stylesheet, xf))
        .collect();

    // Shared strings.
    let sst_part = workbook_rels
        .by_type(rel_types::SHARED_STRINGS)
        .map(|r| resolve_target(&workbook_part, &r.target));
    let sst_items: Vec<StringItem> = match &sst_part {
        Some(part) if manifest.contains(part) => {
            parse_part::<SstXml, _>(&mut archive, part)?.items
        }
        _ => vec![],
    };

    // Theme colors (the part itself stays preserved).
    let theme = workbook_rels
        .by_type(rel_types::THEME)
        .map(|r| resolve_target(&workbook_part, &r.target))
        .and_then(|part| read_part_bytes(&mut archive, &part).ok())
        .map(|bytes| ThemePalette::from_xml(&lancet_xml::theme::parse_theme_colors(&bytes)))
        .unwrap_or_default();

    // Worksheets, in workbook tab order.
    let mut sheets = Vec::new();
    let mut visibility = Vec::new();
    let mut sheet_parts = Vec::new();
    let mut scaffolds = Vec::new();
    for entry in &workbook_xml.sheets.sheets {
        let rel = workbook_rels.by_id(&entry.r_id).ok_or_else(|| {
            Error::MalformedXml {
                part: workbook_part.clone(),
                detail: format!("sheet '{}' has no relationship {}", entry.name, entry.r_id),
            }
        })?;
        if rel.rel_type != rel_types::WORKSHEET {
            // Chartsheets and other exotic tabs are not modelled; their
            // parts stay preserved.
            log::warn!("skipping non-worksheet tab '{}' ({})", entry.name, rel.rel_type);
            continue;
        }
        let sheet_part = resolve_target(&workbook_part, &rel.target);
        let ws: WorksheetXml = parse_part(&mut archive, &sheet_part)?;
        let (sheet, mut scaffold) = build_sheet(
            &mut archive,
            &entry.name,
            &sheet_part,
            &ws,
            &sst_items,
            &xf_styles,
        )?;
        scaffold.workbook_entry = Some(entry.clone());
        sheets.push(sheet);
        visibility.push(SheetVisibility::from_state_attr(entry.state.as_deref()));
        manifest.mark_parsed(&sheet_part);
        if let Some(part) = &scaffold.comments_part {
            manifest.mark_parsed(part);
        }
        sheet_parts.push(sheet_part);
        scaffolds.push(scaffold);
    }
    if sheets.is_empty() {
        return Err(Error::MalformedXml {
            part: workbook_part.clone(),
            detail: "workbook has no sheets".to_string(),
        });
    }

    // Metadata.
    let defined_names = workbook_xml
        .defined_names
        .as_ref()
        .map(|names| {
            names
                .names
                .iter()
                .map(|n| DefinedName {
                    name: n.name.clone(),
                    refers_to: n.value.clone(),
                    local_sheet: n.local_sheet_id.map(|i| i as usize),
                    hidden: n.hidden.unwrap_or(false),
                })
                .collect()
        })
        .unwrap_or_default();
    let active_sheet = workbook_xml
        .book_views
        .as_ref()
        .and_then(|v| v.views.first())
        .and_then(|v| v.active_tab)
        .unwrap_or(0) as usize;
    let (creator, created, modified) = read_core_properties(&mut archive);

    let meta = WorkbookMeta {
        creator,
        created,
        modified,
        theme,
        defined_names,
    };

    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        workbook_part.as_str(),
    ] {
        manifest.mark_parsed(part);
    }
    manifest.mark_parsed(&rels_path_for(&workbook_part));
    if let Some(part) = &styles_part {
        manifest.mark_parsed(part);
    }
    if let Some(part) = &sst_part {
        manifest.mark_parsed(part);
    }

    let sheet_count = sheets.len();
    let source = path.map(|path| SourceContext {
        path: path.to_path_buf(),
        fingerprint,
        manifest,
        tracker: ModificationTracker::default(),
        content_types,
        package_rels,
        workbook_xml,
        workbook_rels,
        stylesheet,
        shared_strings: sst_items,
        sheet_parts,
        scaffolds,
        origin: (0..sheet_count).map(Some).collect(),
    });

    Ok(Workbook::from_parts(
        sheets,
        visibility,
        meta,
        active_sheet,
        source,
    ))
}

// ---------------------------------------------------------------------------
// ZIP plumbing
// ---------------------------------------------------------------------------

fn build_manifest<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<PartManifest> {
    let mut manifest = PartManifest::default();
    for i in 0..archive.len() {
        let file = archive
            .by_index_raw(i)
            .map_err(|e| Error::CorruptZip(e.to_string()))?;
        if file.is_dir() {
            continue;
        }
        let compression = match file.compression() {
            zip::CompressionMethod::Stored => CompressionKind::Stored,
            _ => CompressionKind::Deflated,
        };
        manifest.push(ManifestEntry {
            name: file.name().to_string(),
            uncompressed_size: file.size(),
            compressed_size: file.compressed_size(),
            crc32: file.crc32(),
            compression,
            parsed: false,
        });
    }
    Ok(manifest)
}

fn read_part_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| Error::MissingPart(name.to_string()))?;
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn parse_part<T: DeserializeOwned, R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<T> {
    let bytes = read_part_bytes(archive, name)?;
    let text = String::from_utf8(bytes).map_err(|e| Error::MalformedXml {
        part: name.to_string(),
        detail: format!("not valid UTF-8: {e}"),
    })?;
    quick_xml::de::from_str(&text).map_err(|e| Error::MalformedXml {
        part: name.to_string(),
        detail: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Worksheet assembly
// ---------------------------------------------------------------------------

fn build_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    sheet_part: &str,
    ws: &WorksheetXml,
    sst_items: &[StringItem],
    xf_styles: &[CellStyle],
) -> Result<(Sheet, SheetScaffold)> {
    let mut sheet = Sheet::new(SheetName::new(name)?);
    let mut xf_to_style: HashMap<u32, StyleId> = HashMap::new();

    let mut register = |sheet: &mut Sheet, xf: u32| -> Option<StyleId> {
        if xf == 0 {
            return None;
        }
        let style = xf_styles.get(xf as usize)?;
        Some(
            *xf_to_style
                .entry(xf)
                .or_insert_with(|| sheet.styles.register(style.clone())),
        )
    };

    // Cells.
    for row in &ws.sheet_data.rows {
        for cell in &row.cells {
            let aref = ARef::parse(&cell.r)?;
            let style = cell.s.and_then(|xf| register(&mut sheet, xf));
            let date_styled = style
                .and_then(|id| sheet.styles.get(id))
                .map(|s| s.num_fmt.is_date_like())
                .unwrap_or(false);
            let value = cell_value_from_xml(cell, sst_items, date_styled);
            if value.is_empty() && style.is_none() {
                continue;
            }
            sheet.cells.insert(
                aref,
                Cell {
                    value,
                    style,
                    comment: None,
                },
            );
        }
        if row_has_props(row) {
            let style = row.s.filter(|_| row.custom_format == Some(true));
            let style = style.and_then(|xf| register(&mut sheet, xf));
            sheet.row_props.insert(
                row.r - 1,
                RowProps {
                    height: row.ht,
                    hidden: row.hidden.unwrap_or(false),
                    outline_level: row.outline_level.unwrap_or(0),
                    collapsed: row.collapsed.unwrap_or(false),
                    style,
                },
            );
        }
    }

    // Column properties (min..=max runs, 1-based in the file).
    if let Some(cols) = &ws.cols {
        for col in &cols.cols {
            let style = col.style.and_then(|xf| register(&mut sheet, xf));
            for index in col.min..=col.max {
                sheet.col_props.insert(
                    index - 1,
                    ColProps {
                        width: col.width,
                        hidden: col.hidden.unwrap_or(false),
                        outline_level: col.outline_level.unwrap_or(0),
                        style,
                    },
                );
            }
        }
    }

    if let Some(pr) = &ws.sheet_format_pr {
        sheet.default_row_height = Some(pr.default_row_height);
        sheet.default_col_width = pr.default_col_width;
    }

    // Merges.
    if let Some(merges) = &ws.merge_cells {
        for merge in &merges.merge_cells {
            sheet.merges.push(CellRange::parse(&merge.reference)?);
        }
        sheet.merges.sort_by_key(|m| m.start);
    }

    // Sheet relationships drive hyperlinks, comments, and tables.
    let rels: Option<Relationships> = parse_part(archive, &rels_path_for(sheet_part)).ok();
    let mut scaffold = SheetScaffold {
        workbook_entry: None,
        drawing_rid: ws.drawing.as_ref().map(|d| d.r_id.clone()),
        legacy_drawing_rid: ws.legacy_drawing.as_ref().map(|d| d.r_id.clone()),
        hyperlinks: ws.hyperlinks.clone(),
        table_parts: ws.table_parts.clone(),
        sheet_format_pr: ws.sheet_format_pr.clone(),
        comments_part: None,
    };

    if let Some(links) = &ws.hyperlinks {
        for link in &links.hyperlinks {
            let aref = ARef::parse(&link.reference)?;
            let target = match (&link.r_id, &link.location) {
                (Some(rid), _) => rels
                    .as_ref()
                    .and_then(|r| r.by_id(rid))
                    .map(|r| r.target.clone()),
                (None, Some(location)) => Some(location.clone()),
                _ => None,
            };
            if let Some(target) = target {
                sheet.hyperlinks.insert(aref, target);
            }
        }
    }

    if let Some(rels) = &rels {
        // Comments.
        if let Some(rel) = rels.by_type(rel_types::COMMENTS) {
            let part = resolve_target(sheet_part, &rel.target);
            if let Ok(comments) = parse_part::<CommentsXml, _>(archive, &part) {
                for c in &comments.comment_list.comments {
                    let aref = ARef::parse(&c.reference)?;
                    let author = comments
                        .authors
                        .authors
                        .get(c.author_id as usize)
                        .cloned()
                        .unwrap_or_default();
                    sheet.cells.entry(aref).or_default().comment = Some(Comment {
                        author,
                        text: c.text.plain_text(),
                    });
                }
                scaffold.comments_part = Some(part);
            }
        }
        // Tables (parsed for the domain view; the parts stay preserved).
        for rel in rels.relationships.iter().filter(|r| r.rel_type == rel_types::TABLE) {
            let part = resolve_target(sheet_part, &rel.target);
            match parse_part::<TableXml, _>(archive, &part) {
                Ok(table) => sheet.tables.push(Table {
                    name: table.display_name.clone(),
                    range: CellRange::parse(&table.reference)?,
                    columns: table
                        .table_columns
                        .columns
                        .iter()
                        .map(|c| c.name.clone())
                        .collect(),
                }),
                Err(_) => log::warn!("unparseable table part {part}, preserving bytes only"),
            }
        }
    }

    Ok((sheet, scaffold))
}

fn row_has_props(row: &lancet_xml::worksheet::RowXml) -> bool {
    row.ht.is_some()
        || row.hidden.is_some()
        || row.outline_level.is_some()
        || row.collapsed.is_some()
        || (row.custom_format == Some(true) && row.s.is_some())
}

fn cell_value_from_xml(cell: &CellXml, sst_items: &[StringItem], date_styled: bool) -> CellValue {
    if let Some(f) = &cell.f {
        let expr = f.value.clone().unwrap_or_default();
        let cached = cached_value_from_xml(cell);
        return match cached {
            Some(value) => CellValue::formula_with_cache(&expr, value),
            None => CellValue::formula(&expr),
        };
    }
    match cell.t.as_deref() {
        Some(cell_types::SHARED_STRING) => {
            let index = cell.v.as_deref().and_then(|v| v.parse::<usize>().ok());
            match index.and_then(|i| sst_items.get(i)) {
                Some(item) if !item.runs.is_empty() => {
                    CellValue::Rich(item.runs.iter().map(rich_run_from_xml).collect())
                }
                Some(item) => CellValue::Text(item.plain_text()),
                None => CellValue::Empty,
            }
        }
        Some(cell_types::INLINE_STRING) => cell
            .is
            .as_ref()
            .and_then(|is| is.t.as_ref())
            .map(|t| CellValue::Text(t.value.clone()))
            .unwrap_or(CellValue::Empty),
        Some(cell_types::FORMULA_STRING) => cell
            .v
            .as_ref()
            .map(|v| CellValue::Text(v.clone()))
            .unwrap_or(CellValue::Empty),
        Some(cell_types::BOOLEAN) => CellValue::Bool(cell.v.as_deref() == Some("1")),
        Some(cell_types::ERROR) => cell
            .v
            .as_deref()
            .and_then(CellError::from_code)
            .map(CellValue::Error)
            .unwrap_or(CellValue::Error(CellError::Value)),
        Some(cell_types::DATE) => cell
            .v
            .as_deref()
            .and_then(parse_iso_datetime)
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        _ => match cell.v.as_deref().and_then(|v| v.parse::<f64>().ok()) {
            Some(n) if date_styled => serial_to_datetime(n)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(n)),
            Some(n) => CellValue::Number(n),
            None => CellValue::Empty,
        },
    }
}

fn cached_value_from_xml(cell: &CellXml) -> Option<CellValue> {
    let v = cell.v.as_deref()?;
    Some(match cell.t.as_deref() {
        Some(cell_types::FORMULA_STRING) => CellValue::Text(v.to_string()),
        Some(cell_types::BOOLEAN) => CellValue::Bool(v == "1"),
        Some(cell_types::ERROR) => CellError::from_code(v)
            .map(CellValue::Error)
            .unwrap_or(CellValue::Error(CellError::Value)),
        _ => match v.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(v.to_string()),
        },
    })
}

fn parse_iso_datetime(text: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn read_core_properties<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> (
    Option<String>,
    Option<chrono::NaiveDateTime>,
    Option<chrono::NaiveDateTime>,
) {
    let Ok(bytes) = read_part_bytes(archive, "docProps/core.xml") else {
        return (None, None, None);
    };
    let mut reader = quick_xml::Reader::from_reader(bytes.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let (mut creator, mut created, mut modified) = (None, None, None);
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e)) => {
                let local = e.local_name();
                current = std::str::from_utf8(local.as_ref()).ok().map(String::from);
            }
            Ok(quick_xml::events::Event::Text(ref t)) => {
                if let Ok(text) = t.unescape() {
                    match current.as_deref() {
                        Some("creator") => creator = Some(text.to_string()),
                        Some("created") => created = parse_w3cdtf(&text),
                        Some("modified") => modified = parse_w3cdtf(&text),
                        _ => {}
                    }
                }
            }
            Ok(quick_xml::events::Event::End(_)) => current = None,
            Ok(quick_xml::events::Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    (creator, created, modified)
}

fn parse_w3cdtf(text: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%SZ").ok()
}

// =========================================================================
// Tests
// =========================================================================
