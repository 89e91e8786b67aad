//! End-to-end tests over the public API: domain round-trips through the
//! codec, surgical preservation against a fixture with unmodelled parts,
//! and the formula engine driven through the workbook.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use lancet::{
    read, write, ARef, CellError, CellRange, CellStyle, CellValue, Comment, Error, Patch,
    RefType, Workbook,
};
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn a(s: &str) -> ARef {
    ARef::parse(s).unwrap()
}

fn r(s: &str) -> CellRange {
    CellRange::parse(s).unwrap()
}

// ---------------------------------------------------------------------------
// Fixture: a workbook with a chart the library does not model
// ---------------------------------------------------------------------------

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const CHART_PAYLOAD: &[u8] =
    b"<c:chartSpace xmlns:c=\"http://schemas.openxmlformats.org/drawingml/2006/chart\">\
      <c:chart><c:plotArea><c:barChart/></c:plotArea></c:chart></c:chartSpace>";

const DRAWING_PAYLOAD: &[u8] =
    b"<xdr:wsDr xmlns:xdr=\"http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing\"/>";

/// Build `with_chart.xlsx`: one sheet (A1 = shared string "Hello",
/// B1 = 42) plus a drawing and chart part the domain model never parses.
fn write_chart_fixture(path: &Path) {
    let mut zip = ZipWriter::new(std::fs::File::create(path).unwrap());
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut add = |name: &str, bytes: &[u8]| {
        zip.start_file(name, options).unwrap();
        zip.write_all(bytes).unwrap();
    };

    add(
        "[Content_Types].xml",
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/><Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/><Override PartName="/xl/charts/chart1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/></Types>"#,
    );
    add(
        "_rels/.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        )
        .as_bytes(),
    );
    add(
        "xl/workbook.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_R}"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        )
        .as_bytes(),
    );
    add(
        "xl/_rels/workbook.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#
        )
        .as_bytes(),
    );
    add(
        "xl/styles.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="{NS_MAIN}"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border/></borders><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellXfs></styleSheet>"#
        )
        .as_bytes(),
    );
    add(
        "xl/sharedStrings.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="{NS_MAIN}" count="1" uniqueCount="1"><si><t>Hello</t></si></sst>"#
        )
        .as_bytes(),
    );
    add(
        "xl/worksheets/sheet1.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{NS_MAIN}" xmlns:r="{NS_R}"><dimension ref="A1:B1"/><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>42</v></c></row></sheetData><drawing r:id="rId1"/></worksheet>"#
        )
        .as_bytes(),
    );
    add(
        "xl/worksheets/_rels/sheet1.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#
        )
        .as_bytes(),
    );
    add("xl/drawings/drawing1.xml", DRAWING_PAYLOAD);
    add(
        "xl/drawings/_rels/drawing1.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/></Relationships>"#
        )
        .as_bytes(),
    );
    add("xl/charts/chart1.xml", CHART_PAYLOAD);
    zip.finish().unwrap();
}

fn entry_bytes(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(std::fs::read(path).unwrap())).unwrap();
    let mut out = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).unwrap();
        out.insert(file.name().to_string(), bytes);
    }
    out
}

fn fixture_in(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("with_chart.xlsx");
    write_chart_fixture(&path);
    path
}

// ---------------------------------------------------------------------------
// Universal properties
// ---------------------------------------------------------------------------

#[test]
fn a1_roundtrip_for_refs_ranges_and_qualified_forms() {
    for s in [
        "A1",
        "XFD1048576",
        "B7:C9",
        "$A$1:A1",
        "Sheet1!A1",
        "'Q1 Sales'!B2:D4",
    ] {
        let parsed = RefType::parse(s).unwrap();
        assert_eq!(RefType::parse(&parsed.to_a1()).unwrap(), parsed);
    }
}

#[test]
fn a1_boundaries() {
    assert!(ARef::parse("XFD1048576").is_ok());
    assert!(matches!(ARef::parse("XFE1"), Err(Error::OutOfBounds { .. })));
    assert!(matches!(
        ARef::parse("A1048577"),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn patch_monoid_laws_under_application() {
    let wb = Workbook::new("S").unwrap();
    let sheet = wb.sheet_by_name("S").unwrap();
    let p1 = Patch::put(a("A1"), 1.0);
    let p2 = Patch::SetCellStyle(a("A1"), CellStyle::default());
    let p3 = Patch::Merge(r("C1:D2"));

    // Identity.
    assert_eq!(
        Patch::Empty.combine(p1.clone()).apply(sheet).unwrap(),
        p1.clone().apply(sheet).unwrap()
    );
    assert_eq!(
        p1.clone().combine(Patch::Empty).apply(sheet).unwrap(),
        p1.clone().apply(sheet).unwrap()
    );
    // Associativity.
    let left = p1.clone().combine(p2.clone()).combine(p3.clone());
    let right = p1.combine(p2.combine(p3));
    assert_eq!(left.apply(sheet).unwrap(), right.apply(sheet).unwrap());
}

#[test]
fn style_registry_idempotence_and_preserved_id_independence() {
    let mut registry = lancet::StyleRegistry::new();
    let style_a = CellStyle {
        preserved_num_fmt_id: Some(10),
        ..Default::default()
    };
    let style_b = CellStyle {
        preserved_num_fmt_id: Some(11),
        ..Default::default()
    };
    // Same look, different source ids: one registry slot.
    let id_a = registry.register(style_a.clone());
    let id_b = registry.register(style_b);
    assert_eq!(id_a, id_b);
    // Idempotence.
    let len = registry.len();
    assert_eq!(registry.register(style_a), id_a);
    assert_eq!(registry.len(), len);
}

#[test]
fn formula_print_parse_roundtrip() {
    for s in [
        "A1+B1",
        "SUM($A$1:A10)*2",
        "IF(A1>=0,\"ok\",\"bad\")",
        "'My Sheet'!C3&\"x\"",
        "-A1%",
        "VLOOKUP(A1,Data!A1:C9,3,FALSE)",
    ] {
        let ast = lancet::parse_formula(s).unwrap();
        let printed = lancet::print_formula(&ast);
        assert_eq!(lancet::parse_formula(&printed).unwrap(), ast);
    }
}

#[test]
fn formula_shift_laws() {
    // Zero shift is identity.
    for s in ["A1+B2", "SUM($A$1:A1)", "Sheet2!C3"] {
        assert_eq!(lancet::shift_formula(s, 0, 0).unwrap(), s);
    }
    // Absolute endpoints are invariant; relative endpoints translate.
    assert_eq!(lancet::shift_formula("$A$1+B2", 3, 4).unwrap(), "$A$1+E6");
    // Saturation at the left edge.
    assert_eq!(lancet::shift_formula("B2", -10, -10).unwrap(), "A1");
}

#[test]
fn fill_drag_shifts() {
    assert_eq!(
        lancet::shift_formula("SUM($A$1:A1)", 0, 4).unwrap(),
        "SUM($A$1:A5)"
    );
    assert_eq!(
        lancet::shift_formula("A1+$B1+C$1+$D$1", 2, 3).unwrap(),
        "C4+$B4+E$1+$D$1"
    );
}

#[test]
fn dependency_graph_order_and_cycles() {
    // Build A1 = =B1, B1 = =A1 and expect both cells reported.
    let wb = Workbook::new("S").unwrap();
    let wb = wb
        .apply(
            "S",
            &Patch::Batch(vec![
                Patch::Put(a("A1"), CellValue::formula("B1")),
                Patch::Put(a("B1"), CellValue::formula("A1")),
            ]),
        )
        .unwrap();
    let graph = lancet::DependencyGraph::from_sheet(wb.sheet_by_name("S").unwrap());
    match graph.topological_order() {
        Err(Error::CycleError { cells }) => {
            assert_eq!(cells, vec!["A1".to_string(), "B1".to_string()])
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_new_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.xlsx");
    let wb = Workbook::new("Sales")
        .unwrap()
        .put("Sales", a("A1"), "Revenue")
        .unwrap()
        .put("Sales", a("B1"), 1000.0)
        .unwrap();
    write(&wb, &path).unwrap();

    let back = read(&path).unwrap();
    assert_eq!(back.sheets()[0].name().as_str(), "Sales");
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
fn scenario_formula_with_cache_and_incremental_recalc() {
    let wb = Workbook::new("S").unwrap();
    let wb = wb
        .apply(
            "S",
            &Patch::Batch(vec![
                Patch::put(a("A1"), 10.0),
                Patch::put(a("B1"), 20.0),
                Patch::Put(a("C1"), CellValue::formula("A1+B1")),
            ]),
        )
        .unwrap();
    let wb = wb.recalculate("S").unwrap();
    assert_eq!(
        wb.value("S", a("C1")).unwrap(),
        CellValue::formula_with_cache("A1+B1", CellValue::Number(30.0))
    );

    let wb = wb.put("S", a("A1"), 50.0).unwrap();
    let wb = wb
        .recalculate_dependents("S", &BTreeSet::from([a("A1")]))
        .unwrap();
    assert_eq!(
        wb.value("S", a("C1")).unwrap(),
        CellValue::formula_with_cache("A1+B1", CellValue::Number(70.0))
    );
}

#[test]
fn scenario_surgical_preservation_of_chart() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out = dir.path().join("out.xlsx");

    let wb = read(&fixture).unwrap();
    assert_eq!(
        wb.value("Sheet1", a("A1")).unwrap(),
        CellValue::Text("Hello".to_string())
    );
    let wb = wb.put("Sheet1", a("A1"), "Updated").unwrap();
    write(&wb, &out).unwrap();

    let original = entry_bytes(&fixture);
    let written = entry_bytes(&out);

    // (a) the chart part's bytes are untouched
    assert_eq!(written["xl/charts/chart1.xml"], original["xl/charts/chart1.xml"]);
    assert_eq!(
        written["xl/drawings/drawing1.xml"],
        original["xl/drawings/drawing1.xml"]
    );
    // (b) the edit is visible when reading back
    let back = read(&out).unwrap();
    assert_eq!(
        back.value("Sheet1", a("A1")).unwrap(),
        CellValue::Text("Updated".to_string())
    );
    // (c) the entry count is unchanged
    assert_eq!(written.len(), original.len());
}

#[test]
fn surgical_write_touches_only_affected_parts() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out = dir.path().join("out.xlsx");

    let wb = read(&fixture).unwrap();
    let wb = wb.put("Sheet1", a("A1"), "Updated").unwrap();
    write(&wb, &out).unwrap();

    let original = entry_bytes(&fixture);
    let written = entry_bytes(&out);
    let mut differing: Vec<&str> = original
        .keys()
        .filter(|name| written.get(*name) != original.get(*name))
        .map(|s| s.as_str())
        .collect();
    differing.sort_unstable();
    // The edited worksheet and the shared-strings table (a new string was
    // interned); nothing else.
    assert_eq!(
        differing,
        ["xl/sharedStrings.xml", "xl/worksheets/sheet1.xml"]
    );
}

#[test]
fn surgical_clean_write_preserves_every_entry() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out = dir.path().join("clean.xlsx");

    let wb = read(&fixture).unwrap();
    assert!(wb.is_clean());
    write(&wb, &out).unwrap();

    assert_eq!(entry_bytes(&fixture), entry_bytes(&out));
}

#[test]
fn surgical_write_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out1 = dir.path().join("o1.xlsx");
    let out2 = dir.path().join("o2.xlsx");

    let wb = read(&fixture).unwrap();
    let wb = wb.put("Sheet1", a("B1"), 43.0).unwrap();
    write(&wb, &out1).unwrap();
    write(&wb, &out2).unwrap();
    assert_eq!(std::fs::read(&out1).unwrap(), std::fs::read(&out2).unwrap());
}

#[test]
fn surgical_write_refuses_mutated_source() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out = dir.path().join("out.xlsx");

    let wb = read(&fixture).unwrap();
    let wb = wb.put("Sheet1", a("A1"), "x").unwrap();
    // Mutate the source behind the workbook's back.
    let mut bytes = std::fs::read(&fixture).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&fixture, bytes).unwrap();

    match write(&wb, &out) {
        Err(Error::SourceMutated { .. }) => {}
        other => panic!("expected SourceMutated, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn scenario_style_dedup_by_canonical_key() {
    let mut registry = lancet::StyleRegistry::new();
    let with_id = |id: u32| CellStyle {
        preserved_num_fmt_id: Some(id),
        ..Default::default()
    };
    assert_eq!(registry.register(with_id(10)), registry.register(with_id(11)));
}

#[test]
fn scenario_merge_overlap_and_last_sheet_guards() {
    let wb = Workbook::new("S").unwrap();
    let wb = wb.apply("S", &Patch::Merge(r("A1:B2"))).unwrap();
    match wb.apply("S", &Patch::Merge(r("B2:C3"))) {
        Err(Error::MergeOverlap { .. }) => {}
        other => panic!("expected merge overlap, got {other:?}"),
    }
    match wb.remove_sheet("S") {
        Err(Error::InvalidWorkbook(_)) => {}
        other => panic!("expected invalid workbook, got {other:?}"),
    }
}

#[test]
fn sheet_rename_and_reorder_roundtrip_through_surgical_write() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out = dir.path().join("renamed.xlsx");

    let wb = read(&fixture).unwrap();
    let wb = wb.rename_sheet("Sheet1", "Data").unwrap();
    write(&wb, &out).unwrap();

    let back = read(&out).unwrap();
    assert_eq!(back.sheet_names(), ["Data"]);
    assert_eq!(
        back.value("Data", a("B1")).unwrap(),
        CellValue::Number(42.0)
    );
    // Preserved parts survive the metadata rewrite.
    let original = entry_bytes(&fixture);
    let written = entry_bytes(&out);
    assert_eq!(written["xl/charts/chart1.xml"], original["xl/charts/chart1.xml"]);
}

#[test]
fn added_sheet_flows_through_surgical_write() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(&dir);
    let out = dir.path().join("added.xlsx");

    let wb = read(&fixture).unwrap();
    let wb = wb.add_sheet("Extra").unwrap();
    let wb = wb.put("Extra", a("A1"), "side data").unwrap();
    write(&wb, &out).unwrap();

    let back = read(&out).unwrap();
    assert_eq!(back.sheet_names(), ["Sheet1", "Extra"]);
    assert_eq!(
        back.value("Extra", a("A1")).unwrap(),
        CellValue::Text("side data".to_string())
    );
    assert_eq!(
        back.value("Sheet1", a("A1")).unwrap(),
        CellValue::Text("Hello".to_string())
    );
}

#[test]
fn comments_and_merges_survive_full_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.xlsx");
    let wb = Workbook::new("S").unwrap();
    let wb = wb
        .apply(
            "S",
            &Patch::Batch(vec![
                Patch::put(a("A1"), "anchor"),
                Patch::Merge(r("A1:B2")),
                Patch::SetComment(a("A1"), Comment::new("reviewer", "check me")),
            ]),
        )
        .unwrap();
    write(&wb, &path).unwrap();

    let back = read(&path).unwrap();
    let sheet = back.sheet_by_name("S").unwrap();
    assert_eq!(sheet.merges()[0].to_a1(), "A1:B2");
    let comment = sheet.comment(a("A1")).unwrap();
    assert_eq!(comment.author, "reviewer");
    assert_eq!(comment.text, "check me");
}

#[test]
fn datetime_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("d.xlsx");
    let dt = chrono::NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(13, 30, 0)
        .unwrap();
    let wb = Workbook::new("S")
        .unwrap()
        .put("S", a("A1"), CellValue::DateTime(dt))
        .unwrap();
    write(&wb, &path).unwrap();
    let back = read(&path).unwrap();
    assert_eq!(back.value("S", a("A1")).unwrap(), CellValue::DateTime(dt));
}

#[test]
fn error_values_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("e.xlsx");
    let wb = Workbook::new("S")
        .unwrap()
        .put("S", a("A1"), CellValue::Error(CellError::Div0))
        .unwrap()
        .put("S", a("A2"), CellValue::Error(CellError::Name))
        .unwrap();
    write(&wb, &path).unwrap();
    let back = read(&path).unwrap();
    assert_eq!(
        back.value("S", a("A1")).unwrap(),
        CellValue::Error(CellError::Div0)
    );
    assert_eq!(
        back.value("S", a("A2")).unwrap(),
        CellValue::Error(CellError::Name)
    );
}

#[test]
fn evaluation_coercions_through_workbook() {
    let wb = Workbook::new("S").unwrap();
    let wb = wb
        .apply(
            "S",
            &Patch::Batch(vec![
                Patch::Put(a("A1"), CellValue::formula("TRUE+1")),
                Patch::Put(a("A2"), CellValue::formula("(5>3)*10")),
                Patch::Put(a("A3"), CellValue::formula("1/0")),
            ]),
        )
        .unwrap();
    let wb = wb.recalculate("S").unwrap();
    let cached = |cell: &str| match wb.value("S", a(cell)).unwrap() {
        CellValue::Formula { cached, .. } => cached.map(|b| *b),
        other => panic!("expected formula, got {other:?}"),
    };
    assert_eq!(cached("A1"), Some(CellValue::Number(2.0)));
    assert_eq!(cached("A2"), Some(CellValue::Number(10.0)));
    assert_eq!(cached("A3"), Some(CellValue::Error(CellError::Div0)));
}
