//! The OOXML writer.
//!
//! Two paths:
//!
//! - **Full**: workbooks without a source context have every part
//!   regenerated from the domain model.
//! - **Surgical**: source-backed workbooks re-emit only the parts whose
//!   domain model changed; everything else streams through the
//!   preserved-part store as raw bytes.
//!
//! Both paths share the atomic-rename discipline: output goes to a temp
//! file next to the destination, is fsynced, and renamed into place. No
//! partial output is ever observable; error paths drop the temp file.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use lancet_xml::comments::{Authors, CommentList, CommentText, CommentsXml, CommentXml};
use lancet_xml::content_types::{mime, ContentTypes, OverrideType};
use lancet_xml::relationships::{rel_types, Relationship, Relationships};
use lancet_xml::shared_strings::Text;
use lancet_xml::workbook::{BookViews, DefinedNames, DefinedNameXml, SheetEntry, WorkbookView, WorkbookXml};
use lancet_xml::worksheet::{
    cell_types, CellFormulaXml, CellXml, Col, Cols, Dimension, DrawingRef, Hyperlink, Hyperlinks,
    LegacyDrawing, MergeCell, MergeCells, RowXml, SheetData, SheetFormatPr, WorksheetXml,
};

use crate::addr::ARef;
use crate::codec::paths::{canonical_rank, rels_path_for};
use crate::codec::preserved::PreservedPartStore;
use crate::codec::sst::SstBuilder;
use crate::codec::style_index::{self, StyleIndex};
use crate::error::{Error, Result};
use crate::sheet::{Cell, Sheet};
use crate::source::{ManifestEntry, SheetScaffold, SourceContext};
use crate::style::StyleId;
use crate::value::{datetime_to_serial, CellValue};
use crate::workbook::{Workbook, WorkbookMeta};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Writer knobs.
#[derive(Default, Clone)]
pub struct WriteOptions {
    /// Best-effort cancellation, checked between ZIP entries. A cancelled
    /// write leaves the destination untouched.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Write a workbook, choosing the surgical path when a source context is
/// present.
pub fn write<P: AsRef<Path>>(workbook: &Workbook, path: P) -> Result<()> {
    write_with(workbook, path, &WriteOptions::default())
}

/// [`write`] with options.
pub fn write_with<P: AsRef<Path>>(
    workbook: &Workbook,
    path: P,
    options: &WriteOptions,
) -> Result<()> {
    let plan = match workbook.source() {
        Some(ctx) => plan_surgical(workbook, ctx)?,
        None => plan_full(workbook)?,
    };
    emit(plan, workbook.source(), path.as_ref(), options)
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

enum Output {
    Generated(Vec<u8>),
    Preserved(ManifestEntry),
}

struct Planned {
    name: String,
    /// Original manifest position, or a large value for appended parts;
    /// tie-breaker inside a canonical rank.
    position: usize,
    output: Output,
}

fn to_xml_bytes<T: Serialize>(part: &str, value: &T) -> Result<Vec<u8>> {
    let body = quick_xml::se::to_string(value).map_err(|e| Error::MalformedXml {
        part: part.to_string(),
        detail: e.to_string(),
    })?;
    let mut bytes = Vec::with_capacity(XML_DECLARATION.len() + 1 + body.len());
    bytes.extend_from_slice(XML_DECLARATION.as_bytes());
    bytes.push(b'\n');
    bytes.extend_from_slice(body.as_bytes());
    Ok(bytes)
}

/// Regenerate everything from the domain model.
fn plan_full(workbook: &Workbook) -> Result<Vec<Planned>> {
    let index = style_index::build_fresh(workbook);
    let mut sst = SstBuilder::new();
    let mut plan: Vec<Planned> = Vec::new();
    let mut position = 0usize;
    let mut push = |plan: &mut Vec<Planned>, name: String, bytes: Vec<u8>| {
        plan.push(Planned {
            name,
            position: {
                position += 1;
                position
            },
            output: Output::Generated(bytes),
        });
    };

    let mut content_types = ContentTypes::default();
    content_types.overrides.clear();
    content_types.set_override("xl/workbook.xml", mime::WORKBOOK);
    content_types.set_override("xl/styles.xml", mime::STYLES);
    content_types.set_override("xl/sharedStrings.xml", mime::SHARED_STRINGS);

    let mut comment_counter = 0usize;
    for (i, sheet) in workbook.sheets().iter().enumerate() {
        let part = format!("xl/worksheets/sheet{}.xml", i + 1);
        content_types.set_override(&part, mime::WORKSHEET);

        // Per-sheet relationships: hyperlinks and comments.
        let mut rels = Relationships {
            xmlns: lancet_xml::namespaces::PACKAGE_RELATIONSHIPS.to_string(),
            relationships: vec![],
        };
        let mut hyperlink_rids: HashMap<ARef, String> = HashMap::new();
        for (aref, target) in &sheet.hyperlinks {
            if is_external_target(target) {
                let rid = rels.next_id();
                rels.relationships.push(Relationship {
                    id: rid.clone(),
                    rel_type: rel_types::HYPERLINK.to_string(),
                    target: target.clone(),
                    target_mode: Some("External".to_string()),
                });
                hyperlink_rids.insert(*aref, rid);
            }
        }
        let comments = comments_xml(sheet);
        let comments_part = comments.as_ref().map(|_| {
            comment_counter += 1;
            format!("xl/comments{comment_counter}.xml")
        });
        if let Some(part) = &comments_part {
            let rid = rels.next_id();
            rels.relationships.push(Relationship {
                id: rid,
                rel_type: rel_types::COMMENTS.to_string(),
                target: format!("../../{part}"),
                target_mode: None,
            });
            content_types.set_override(part, mime::COMMENTS);
        }

        let ws = worksheet_xml(sheet, &index.remap[i], &mut sst, None, &hyperlink_rids);
        push(&mut plan, part.clone(), to_xml_bytes(&part, &ws)?);
        if !rels.relationships.is_empty() {
            let rels_part = rels_path_for(&part);
            push(&mut plan, rels_part.clone(), to_xml_bytes(&rels_part, &rels)?);
        }
        if let (Some(comments), Some(part)) = (&comments, &comments_part) {
            push(&mut plan, part.clone(), to_xml_bytes(part, comments)?);
        }
    }

    // docProps/core.xml only when metadata carries something.
    let core = core_xml(workbook.meta());
    let mut package_rels = lancet_xml::relationships::package_rels();
    if let Some(core_bytes) = core {
        content_types.set_override("docProps/core.xml", mime::CORE_PROPERTIES);
        package_rels.relationships.push(Relationship {
            id: package_rels.next_id(),
            rel_type: "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties".to_string(),
            target: "docProps/core.xml".to_string(),
            target_mode: None,
        });
        push(&mut plan, "docProps/core.xml".to_string(), core_bytes);
    }

    // Workbook part and its rels.
    let workbook_xml = fresh_workbook_xml(workbook);
    push(
        &mut plan,
        "xl/workbook.xml".to_string(),
        to_xml_bytes("xl/workbook.xml", &workbook_xml)?,
    );
    let sheet_count = workbook.sheets().len();
    let mut workbook_rels = Relationships {
        xmlns: lancet_xml::namespaces::PACKAGE_RELATIONSHIPS.to_string(),
        relationships: vec![],
    };
    for i in 0..sheet_count {
        workbook_rels.relationships.push(Relationship {
            id: format!("rId{}", i + 1),
            rel_type: rel_types::WORKSHEET.to_string(),
            target: format!("worksheets/sheet{}.xml", i + 1),
            target_mode: None,
        });
    }
    workbook_rels.relationships.push(Relationship {
        id: format!("rId{}", sheet_count + 1),
        rel_type: rel_types::STYLES.to_string(),
        target: "styles.xml".to_string(),
        target_mode: None,
    });
    workbook_rels.relationships.push(Relationship {
        id: format!("rId{}", sheet_count + 2),
        rel_type: rel_types::SHARED_STRINGS.to_string(),
        target: "sharedStrings.xml".to_string(),
        target_mode: None,
    });
    push(
        &mut plan,
        "xl/_rels/workbook.xml.rels".to_string(),
        to_xml_bytes("xl/_rels/workbook.xml.rels", &workbook_rels)?,
    );

    push(
        &mut plan,
        "xl/styles.xml".to_string(),
        to_xml_bytes("xl/styles.xml", &index.stylesheet)?,
    );
    push(
        &mut plan,
        "xl/sharedStrings.xml".to_string(),
        to_xml_bytes("xl/sharedStrings.xml", &sst.to_xml())?,
    );
    push(
        &mut plan,
        "[Content_Types].xml".to_string(),
        to_xml_bytes("[Content_Types].xml", &content_types)?,
    );
    push(
        &mut plan,
        "_rels/.rels".to_string(),
        to_xml_bytes("_rels/.rels", &package_rels)?,
    );

    Ok(plan)
}

/// Regenerate only what changed; stream the rest.
fn plan_surgical(workbook: &Workbook, ctx: &SourceContext) -> Result<Vec<Planned>> {
    let index: StyleIndex = style_index::build_surgical(workbook, ctx);
    let mut sst = SstBuilder::from_original(&ctx.shared_strings);

    // Original sheet index -> current index, for modified-part regeneration.
    let mut current_of_origin: HashMap<usize, usize> = HashMap::new();
    for (current, origin) in ctx.origin.iter().enumerate() {
        if let Some(origin) = *origin {
            current_of_origin.insert(origin, current);
        }
    }

    // Regenerate the payload of every modified source sheet up front so
    // the SST builder sees all new strings before we decide whether the
    // shared-strings part is dirty.
    let mut regenerated: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut regenerated_comments: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for &origin in &ctx.tracker.modified_sheets {
        let Some(&current) = current_of_origin.get(&origin) else {
            continue;
        };
        let Some(part) = ctx.sheet_part(origin) else {
            continue;
        };
        let sheet = &workbook.sheets()[current];
        let scaffold = ctx.scaffolds.get(origin);
        let ws = worksheet_xml(
            sheet,
            &index.remap[current],
            &mut sst,
            scaffold,
            &HashMap::new(),
        );
        regenerated.insert(part.to_string(), to_xml_bytes(part, &ws)?);
        if let Some(comments_part) = scaffold.and_then(|s| s.comments_part.as_ref()) {
            if let Some(comments) = comments_xml(sheet) {
                regenerated_comments
                    .insert(comments_part.clone(), to_xml_bytes(comments_part, &comments)?);
            }
        }
    }

    // New sheets get freshly named parts after the manifest.
    let mut taken: BTreeSet<String> = ctx.manifest.iter().map(|e| e.name.clone()).collect();
    let mut new_sheet_parts: Vec<(usize, String)> = Vec::new();
    for (current, origin) in ctx.origin.iter().enumerate() {
        if origin.is_some() {
            continue;
        }
        let mut n = ctx.sheet_parts.len() + new_sheet_parts.len() + 1;
        let part = loop {
            let candidate = format!("xl/worksheets/sheet{n}.xml");
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(part.clone());
        new_sheet_parts.push((current, part));
    }
    for (current, part) in &new_sheet_parts {
        let sheet = &workbook.sheets()[*current];
        if sheet.iter_comments().next().is_some() {
            log::warn!(
                "comments on added sheet '{}' are not written on the surgical path",
                sheet.name()
            );
        }
        let ws = worksheet_xml(sheet, &index.remap[*current], &mut sst, None, &HashMap::new());
        regenerated.insert(part.clone(), to_xml_bytes(part, &ws)?);
    }

    let sst_dirty = sst.has_new();
    let sst_added = sst_dirty && !ctx.manifest.contains("xl/sharedStrings.xml");
    let styles_dirty = index.changed;
    let metadata_dirty = ctx.tracker.metadata
        || ctx.tracker.reordered
        || !ctx.tracker.deleted_sheets.is_empty()
        || !new_sheet_parts.is_empty();

    // Parts belonging to deleted sheets are dropped entirely.
    let mut skipped: BTreeSet<String> = BTreeSet::new();
    for &origin in &ctx.tracker.deleted_sheets {
        if let Some(part) = ctx.sheet_part(origin) {
            skipped.insert(part.to_string());
            skipped.insert(rels_path_for(part));
        }
        if let Some(comments) = ctx
            .scaffolds
            .get(origin)
            .and_then(|s| s.comments_part.clone())
        {
            skipped.insert(comments);
        }
    }

    let styles_part_name = "xl/styles.xml";
    let sst_part_name = "xl/sharedStrings.xml";

    let mut plan: Vec<Planned> = Vec::new();
    for (position, entry) in ctx.manifest.iter().enumerate() {
        if skipped.contains(&entry.name) {
            continue;
        }
        let output = if let Some(bytes) = regenerated.remove(&entry.name) {
            Output::Generated(bytes)
        } else if let Some(bytes) = regenerated_comments.remove(&entry.name) {
            Output::Generated(bytes)
        } else if entry.name == "[Content_Types].xml" && (metadata_dirty || sst_added) {
            Output::Generated(patched_content_types(ctx, &skipped, &new_sheet_parts, sst_added)?)
        } else if entry.name == "_rels/.rels" && metadata_dirty {
            Output::Generated(to_xml_bytes("_rels/.rels", &ctx.package_rels)?)
        } else if entry.name == "xl/workbook.xml" && metadata_dirty {
            Output::Generated(patched_workbook_xml(workbook, ctx, &new_sheet_parts)?)
        } else if entry.name == "xl/_rels/workbook.xml.rels" && (metadata_dirty || sst_added) {
            Output::Generated(patched_workbook_rels(ctx, &new_sheet_parts, sst_added)?)
        } else if entry.name == styles_part_name && styles_dirty {
            Output::Generated(to_xml_bytes(styles_part_name, &index.stylesheet)?)
        } else if entry.name == sst_part_name && sst_dirty {
            Output::Generated(to_xml_bytes(sst_part_name, &sst.to_xml())?)
        } else {
            Output::Preserved(entry.clone())
        };
        plan.push(Planned {
            name: entry.name.clone(),
            position,
            output,
        });
    }

    // Appended parts that have no manifest entry.
    let mut position = ctx.manifest.len();
    for (name, bytes) in regenerated {
        plan.push(Planned {
            name,
            position: {
                position += 1;
                position
            },
            output: Output::Generated(bytes),
        });
    }
    if sst_dirty && !ctx.manifest.contains(sst_part_name) {
        plan.push(Planned {
            name: sst_part_name.to_string(),
            position: {
                position += 1;
                position
            },
            output: Output::Generated(to_xml_bytes(sst_part_name, &sst.to_xml())?),
        });
    }
    if styles_dirty && !ctx.manifest.contains(styles_part_name) {
        plan.push(Planned {
            name: styles_part_name.to_string(),
            position: {
                position += 1;
                position
            },
            output: Output::Generated(to_xml_bytes(styles_part_name, &index.stylesheet)?),
        });
    }

    Ok(plan)
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

fn emit(
    mut plan: Vec<Planned>,
    source: Option<&SourceContext>,
    path: &Path,
    options: &WriteOptions,
) -> Result<()> {
    plan.sort_by(|a, b| {
        (canonical_rank(&a.name), a.position).cmp(&(canonical_rank(&b.name), b.position))
    });

    let needs_store = plan
        .iter()
        .any(|p| matches!(p.output, Output::Preserved(_)));
    let mut handle = match (needs_store, source) {
        (true, Some(ctx)) => {
            ctx.verify_fingerprint()?;
            Some(PreservedPartStore::new(&ctx.path).open()?)
        }
        (true, None) => {
            return Err(Error::InvalidWorkbook(
                "preserved entries require a source context".to_string(),
            ))
        }
        _ => None,
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let temp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new()?,
    };
    let mut zip = ZipWriter::new(temp);
    let generated_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for planned in &plan {
        if let Some(cancel) = &options.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "write cancelled",
                )));
            }
        }
        match &planned.output {
            Output::Generated(bytes) => {
                zip.start_file(planned.name.as_str(), generated_options)
                    .map_err(|e| Error::CorruptZip(e.to_string()))?;
                zip.write_all(bytes)?;
            }
            Output::Preserved(entry) => {
                let handle = handle
                    .as_mut()
                    .expect("preserved entry without open store");
                handle.stream_to(entry, &mut zip)?;
            }
        }
    }

    let temp = zip.finish().map_err(|e| Error::CorruptZip(e.to_string()))?;
    drop(handle); // release the source before replacing the destination
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Part generation
// ---------------------------------------------------------------------------

fn is_external_target(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

/// Build a worksheet part from the domain model. Cells are emitted
/// row-major with ascending columns; merges are already sorted on the
/// sheet. The scaffold re-attaches drawing/table references for sheets
/// that came from a source file.
fn worksheet_xml(
    sheet: &Sheet,
    remap: &HashMap<StyleId, u32>,
    sst: &mut SstBuilder,
    scaffold: Option<&SheetScaffold>,
    hyperlink_rids: &HashMap<ARef, String>,
) -> WorksheetXml {
    let mut ws = WorksheetXml {
        dimension: sheet.used_range().map(|r| Dimension {
            reference: r.to_a1(),
        }),
        ..Default::default()
    };

    ws.sheet_format_pr = match scaffold.and_then(|s| s.sheet_format_pr.clone()) {
        Some(pr) => Some(pr),
        None => sheet.default_row_height().map(|h| SheetFormatPr {
            default_row_height: h,
            default_col_width: sheet.default_col_width(),
        }),
    };

    // Columns. Out-of-grid property keys are ignored.
    let cols: Vec<Col> = sheet
        .col_props
        .iter()
        .filter(|(&index, _)| index <= crate::addr::MAX_COLUMN)
        .map(|(&index, props)| Col {
            min: index + 1,
            max: index + 1,
            width: props.width,
            style: props.style.and_then(|sid| remap.get(&sid).copied()),
            hidden: props.hidden.then_some(true),
            custom_width: props.width.is_some().then_some(true),
            outline_level: (props.outline_level != 0).then_some(props.outline_level),
        })
        .collect();
    if !cols.is_empty() {
        ws.cols = Some(Cols { cols });
    }

    // Rows: union of rows that have cells and rows that carry properties.
    let mut row_numbers: BTreeSet<u32> = sheet.cells.keys().map(|a| a.row.index()).collect();
    row_numbers.extend(sheet.row_props.keys().copied());
    let mut rows = Vec::with_capacity(row_numbers.len());
    for row_index in row_numbers {
        let Ok(row) = crate::addr::Row::new(row_index) else {
            continue;
        };
        let props = sheet.row_props.get(&row_index);
        let style = props
            .and_then(|p| p.style)
            .and_then(|sid| remap.get(&sid).copied());
        let cells: Vec<CellXml> = sheet
            .cells
            .range(row_span(row))
            .map(|(aref, cell)| cell_to_xml(*aref, cell, sheet, remap, sst))
            .collect();
        rows.push(RowXml {
            r: row_index + 1,
            s: style,
            custom_format: style.is_some().then_some(true),
            ht: props.and_then(|p| p.height),
            hidden: props.and_then(|p| p.hidden.then_some(true)),
            custom_height: props.and_then(|p| p.height.is_some().then_some(true)),
            outline_level: props.and_then(|p| (p.outline_level != 0).then_some(p.outline_level)),
            collapsed: props.and_then(|p| p.collapsed.then_some(true)),
            cells,
        });
    }
    ws.sheet_data = SheetData { rows };

    // Merges, sorted by start cell.
    if !sheet.merges.is_empty() {
        ws.merge_cells = Some(MergeCells {
            count: Some(sheet.merges.len() as u32),
            merge_cells: sheet
                .merges
                .iter()
                .map(|m| MergeCell {
                    reference: m.to_a1(),
                })
                .collect(),
        });
    }

    // Hyperlinks: the scaffold's original elements win; additions become
    // location links (external additions get rels only on the full path).
    let mut hyperlinks: Vec<Hyperlink> = scaffold
        .and_then(|s| s.hyperlinks.clone())
        .map(|h| h.hyperlinks)
        .unwrap_or_default();
    let covered: BTreeSet<String> = hyperlinks.iter().map(|h| h.reference.clone()).collect();
    for (aref, target) in &sheet.hyperlinks {
        let reference = aref.to_a1();
        if covered.contains(&reference) {
            continue;
        }
        if let Some(rid) = hyperlink_rids.get(aref) {
            hyperlinks.push(Hyperlink {
                reference,
                r_id: Some(rid.clone()),
                location: None,
                display: None,
            });
        } else if !is_external_target(target) {
            hyperlinks.push(Hyperlink {
                reference,
                r_id: None,
                location: Some(target.clone()),
                display: None,
            });
        } else {
            log::warn!("dropping external hyperlink at {reference}: sheet rels are preserved");
        }
    }
    if !hyperlinks.is_empty() {
        ws.hyperlinks = Some(Hyperlinks { hyperlinks });
    }

    if let Some(scaffold) = scaffold {
        ws.drawing = scaffold
            .drawing_rid
            .clone()
            .map(|r_id| DrawingRef { r_id });
        ws.legacy_drawing = scaffold
            .legacy_drawing_rid
            .clone()
            .map(|r_id| LegacyDrawing { r_id });
        ws.table_parts = scaffold.table_parts.clone();
    }

    ws
}

fn row_span(row: crate::addr::Row) -> std::ops::RangeInclusive<ARef> {
    use crate::addr::Column;
    ARef::new(Column::FIRST, row)..=ARef::new(Column::LAST, row)
}

fn cell_to_xml(
    aref: ARef,
    cell: &Cell,
    sheet: &Sheet,
    remap: &HashMap<StyleId, u32>,
    sst: &mut SstBuilder,
) -> CellXml {
    let mut xml = CellXml {
        r: aref.to_a1(),
        s: cell
            .style
            .and_then(|sid| remap.get(&sid).copied())
            .filter(|&xf| xf != 0),
        ..Default::default()
    };
    let date_styled = cell
        .style
        .and_then(|sid| sheet.styles().get(sid))
        .map(|s| s.num_fmt.is_date_like())
        .unwrap_or(false);

    match &cell.value {
        CellValue::Empty => {}
        CellValue::Text(text) => {
            xml.t = Some(cell_types::SHARED_STRING.to_string());
            xml.v = Some(sst.intern(text).to_string());
        }
        CellValue::Rich(runs) => {
            xml.t = Some(cell_types::SHARED_STRING.to_string());
            xml.v = Some(sst.intern_rich(runs).to_string());
        }
        CellValue::Number(n) => {
            xml.v = Some(format_number(*n));
        }
        CellValue::Bool(b) => {
            xml.t = Some(cell_types::BOOLEAN.to_string());
            xml.v = Some(if *b { "1" } else { "0" }.to_string());
        }
        CellValue::DateTime(dt) => {
            if date_styled {
                xml.v = Some(format_number(datetime_to_serial(dt)));
            } else {
                // Unstyled date-times keep their meaning through the ISO
                // cell type instead of degrading to a bare serial.
                xml.t = Some(cell_types::DATE.to_string());
                xml.v = Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
            }
        }
        CellValue::Formula { expr, cached } => {
            xml.f = Some(CellFormulaXml {
                value: Some(expr.clone()),
                ..Default::default()
            });
            if let Some(cached) = cached.as_deref() {
                match cached {
                    CellValue::Text(text) => {
                        xml.t = Some(cell_types::FORMULA_STRING.to_string());
                        xml.v = Some(text.clone());
                    }
                    CellValue::Bool(b) => {
                        xml.t = Some(cell_types::BOOLEAN.to_string());
                        xml.v = Some(if *b { "1" } else { "0" }.to_string());
                    }
                    CellValue::Error(e) => {
                        xml.t = Some(cell_types::ERROR.to_string());
                        xml.v = Some(e.code().to_string());
                    }
                    CellValue::Number(n) => {
                        xml.v = Some(format_number(*n));
                    }
                    CellValue::DateTime(dt) => {
                        xml.v = Some(format_number(datetime_to_serial(dt)));
                    }
                    _ => {}
                }
            }
        }
        CellValue::Error(e) => {
            xml.t = Some(cell_types::ERROR.to_string());
            xml.v = Some(e.code().to_string());
        }
    }
    xml
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn comments_xml(sheet: &Sheet) -> Option<CommentsXml> {
    let mut authors: Vec<String> = Vec::new();
    let mut comments = Vec::new();
    for (aref, comment) in sheet.iter_comments() {
        let author_id = match authors.iter().position(|a| *a == comment.author) {
            Some(i) => i,
            None => {
                authors.push(comment.author.clone());
                authors.len() - 1
            }
        } as u32;
        comments.push(CommentXml {
            reference: aref.to_a1(),
            author_id,
            text: CommentText {
                t: Some(Text::new(&comment.text)),
                runs: vec![],
            },
        });
    }
    if comments.is_empty() {
        return None;
    }
    Some(CommentsXml {
        authors: Authors { authors },
        comment_list: CommentList { comments },
        ..Default::default()
    })
}

fn fresh_workbook_xml(workbook: &Workbook) -> WorkbookXml {
    let mut xml = WorkbookXml::default();
    xml.sheets.sheets = workbook
        .sheets()
        .iter()
        .enumerate()
        .map(|(i, sheet)| SheetEntry {
            name: sheet.name().as_str().to_string(),
            sheet_id: i as u32 + 1,
            state: workbook.visibility(i).state_attr().map(String::from),
            r_id: format!("rId{}", i + 1),
        })
        .collect();
    if workbook.active_sheet() != 0 {
        xml.book_views = Some(BookViews {
            views: vec![WorkbookView {
                active_tab: Some(workbook.active_sheet() as u32),
                ..Default::default()
            }],
        });
    }
    xml.defined_names = defined_names_xml(workbook.meta());
    xml
}

fn defined_names_xml(meta: &WorkbookMeta) -> Option<DefinedNames> {
    if meta.defined_names.is_empty() {
        return None;
    }
    Some(DefinedNames {
        names: meta
            .defined_names
            .iter()
            .map(|d| DefinedNameXml {
                name: d.name.clone(),
                local_sheet_id: d.local_sheet.map(|i| i as u32),
                hidden: d.hidden.then_some(true),
                value: d.refers_to.clone(),
            })
            .collect(),
    })
}

/// Patch the original workbook part: sheet list in current order, updated
/// names/visibility, refreshed active tab and defined names. Everything
/// else (workbookPr, calcPr) carries over verbatim.
fn patched_workbook_xml(
    workbook: &Workbook,
    ctx: &SourceContext,
    new_sheet_parts: &[(usize, String)],
) -> Result<Vec<u8>> {
    let mut xml = ctx.workbook_xml.clone();
    let next_sheet_id = xml
        .sheets
        .sheets
        .iter()
        .map(|s| s.sheet_id + 1)
        .max()
        .unwrap_or(1);
    let new_rids: HashMap<usize, String> = new_rel_ids(ctx, new_sheet_parts, false)
        .into_iter()
        .map(|(current, rid, _)| (current, rid))
        .collect();

    let mut entries = Vec::with_capacity(workbook.sheets().len());
    let mut next_id = next_sheet_id;
    for (current, sheet) in workbook.sheets().iter().enumerate() {
        let entry = match ctx
            .origin_of(current)
            .and_then(|origin| ctx.scaffolds.get(origin))
            .and_then(|s| s.workbook_entry.clone())
        {
            Some(mut entry) => {
                entry.name = sheet.name().as_str().to_string();
                entry.state = workbook.visibility(current).state_attr().map(String::from);
                entry
            }
            None => {
                let entry = SheetEntry {
                    name: sheet.name().as_str().to_string(),
                    sheet_id: next_id,
                    state: workbook.visibility(current).state_attr().map(String::from),
                    r_id: new_rids[&current].clone(),
                };
                next_id += 1;
                entry
            }
        };
        entries.push(entry);
    }
    xml.sheets.sheets = entries;

    let active = workbook.active_sheet() as u32;
    match &mut xml.book_views {
        Some(views) if !views.views.is_empty() => {
            views.views[0].active_tab = Some(active);
        }
        _ if active != 0 => {
            xml.book_views = Some(BookViews {
                views: vec![WorkbookView {
                    active_tab: Some(active),
                    ..Default::default()
                }],
            });
        }
        _ => {}
    }
    xml.defined_names = defined_names_xml(workbook.meta());
    to_xml_bytes("xl/workbook.xml", &xml)
}

/// Relationship ids for parts added after read. Ids continue after the
/// original file's highest `rId`.
fn new_rel_ids(
    ctx: &SourceContext,
    new_sheet_parts: &[(usize, String)],
    with_sst: bool,
) -> Vec<(usize, String, String)> {
    let mut next = ctx
        .workbook_rels
        .relationships
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    let mut out = Vec::new();
    for (current, part) in new_sheet_parts {
        out.push((
            *current,
            format!("rId{next}"),
            part.strip_prefix("xl/").unwrap_or(part).to_string(),
        ));
        next += 1;
    }
    if with_sst {
        out.push((usize::MAX, format!("rId{next}"), "sharedStrings.xml".to_string()));
    }
    out
}

fn patched_workbook_rels(
    ctx: &SourceContext,
    new_sheet_parts: &[(usize, String)],
    sst_added: bool,
) -> Result<Vec<u8>> {
    let mut rels = ctx.workbook_rels.clone();

    // Drop relationships of deleted sheets.
    let deleted_rids: BTreeSet<String> = ctx
        .tracker
        .deleted_sheets
        .iter()
        .filter_map(|&origin| ctx.scaffolds.get(origin))
        .filter_map(|s| s.workbook_entry.as_ref())
        .map(|entry| entry.r_id.clone())
        .collect();
    rels.relationships.retain(|r| !deleted_rids.contains(&r.id));

    let needs_sst_rel = sst_added && rels.by_type(rel_types::SHARED_STRINGS).is_none();
    for (current, rid, target) in new_rel_ids(ctx, new_sheet_parts, needs_sst_rel) {
        let rel_type = if current == usize::MAX {
            rel_types::SHARED_STRINGS
        } else {
            rel_types::WORKSHEET
        };
        rels.relationships.push(Relationship {
            id: rid,
            rel_type: rel_type.to_string(),
            target,
            target_mode: None,
        });
    }
    to_xml_bytes("xl/_rels/workbook.xml.rels", &rels)
}

fn patched_content_types(
    ctx: &SourceContext,
    skipped: &BTreeSet<String>,
    new_sheet_parts: &[(usize, String)],
    sst_added: bool,
) -> Result<Vec<u8>> {
    let mut ct = ctx.content_types.clone();
    ct.overrides
        .retain(|o| !skipped.contains(o.part_name.trim_start_matches('/')));
    for (_, part) in new_sheet_parts {
        ct.set_override(part, mime::WORKSHEET);
    }
    if sst_added && ct.type_of("xl/sharedStrings.xml") != Some(mime::SHARED_STRINGS) {
        ct.overrides.push(OverrideType {
            part_name: "/xl/sharedStrings.xml".to_string(),
            content_type: mime::SHARED_STRINGS.to_string(),
        });
    }
    to_xml_bytes("[Content_Types].xml", &ct)
}

/// docProps/core.xml, hand-rolled: the element set is tiny and the
/// namespaces unfriendly to serde.
fn core_xml(meta: &WorkbookMeta) -> Option<Vec<u8>> {
    if meta.creator.is_none() && meta.created.is_none() && meta.modified.is_none() {
        return None;
    }
    let mut body = String::new();
    body.push_str(XML_DECLARATION);
    body.push('\n');
    body.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(creator) = &meta.creator {
        body.push_str(&format!("<dc:creator>{}</dc:creator>", escape_xml(creator)));
    }
    if let Some(created) = &meta.created {
        body.push_str(&format!(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            created.format("%Y-%m-%dT%H:%M:%SZ")
        ));
    }
    if let Some(modified) = &meta.modified {
        body.push_str(&format!(
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            modified.format("%Y-%m-%dT%H:%M:%SZ")
        ));
    }
    body.push_str("</cp:coreProperties>");
    Some(body.into_bytes())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::CellRange;
    use crate::codec::reader;
    use crate::patch::Patch;
    use crate::value::CellError;

    fn a(s: &str) -> ARef {
        ARef::parse(s).unwrap()
    }

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn test_full_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "a.xlsx");
        let wb = Workbook::new("Sales")
            .unwrap()
            .put("Sales", a("A1"), "Revenue")
            .unwrap()
            .put("Sales", a("B1"), 1000.0)
            .unwrap();
        write(&wb, &path).unwrap();

        let back = reader::read(&path).unwrap();
        assert_eq!(back.sheet_names(), ["Sales"]);
        assert_eq!(
            back.value("Sales", a("A1")).unwrap(),
            CellValue::Text("Revenue".to_string())
        );
        assert_eq!(
            back.value("Sales", a("B1")).unwrap(),
            CellValue::Number(1000.0)
        );
    }

    #[test]
    fn test_full_write_formula_and_error_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "f.xlsx");
        let wb = Workbook::new("S").unwrap();
        let wb = wb
            .apply(
                "S",
                &Patch::Batch(vec![
                    Patch::put(a("A1"), 10.0),
                    Patch::put(a("B1"), 20.0),
                    Patch::Put(
                        a("C1"),
                        CellValue::formula_with_cache("A1+B1", CellValue::Number(30.0)),
                    ),
                    Patch::Put(a("D1"), CellValue::Error(CellError::NA)),
                ]),
            )
            .unwrap();
        write(&wb, &path).unwrap();

        let back = reader::read(&path).unwrap();
        assert_eq!(
            back.value("S", a("C1")).unwrap(),
            CellValue::formula_with_cache("A1+B1", CellValue::Number(30.0))
        );
        assert_eq!(
            back.value("S", a("D1")).unwrap(),
            CellValue::Error(CellError::NA)
        );
    }

    #[test]
    fn test_full_write_merges_and_comments_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "m.xlsx");
        let wb = Workbook::new("S").unwrap();
        let wb = wb
            .apply(
                "S",
                &Patch::Batch(vec![
                    Patch::put(a("A1"), "x"),
                    Patch::Merge(CellRange::parse("A1:B2").unwrap()),
                    Patch::SetComment(a("A1"), crate::sheet::Comment::new("alice", "hm")),
                ]),
            )
            .unwrap();
        write(&wb, &path).unwrap();

        let back = reader::read(&path).unwrap();
        let sheet = back.sheet_by_name("S").unwrap();
        assert_eq!(sheet.merges().len(), 1);
        assert_eq!(sheet.merges()[0].to_a1(), "A1:B2");
        assert_eq!(sheet.comment(a("A1")).unwrap().author, "alice");
        assert_eq!(sheet.comment(a("A1")).unwrap().text, "hm");
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = temp_path(&dir, "d1.xlsx");
        let p2 = temp_path(&dir, "d2.xlsx");
        let wb = Workbook::new("S")
            .unwrap()
            .put("S", a("A1"), "text")
            .unwrap()
            .put("S", a("B2"), 7.0)
            .unwrap();
        write(&wb, &p1).unwrap();
        write(&wb, &p2).unwrap();
        assert_eq!(std::fs::read(&p1).unwrap(), std::fs::read(&p2).unwrap());
    }

    #[test]
    fn test_cancelled_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "c.xlsx");
        let wb = Workbook::new("S").unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let options = WriteOptions {
            cancel: Some(cancel),
        };
        assert!(write_with(&wb, &path, &options).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(1000.0), "1000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
