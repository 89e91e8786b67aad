//! Package-internal path arithmetic and the canonical entry order.

/// Resolve a relationship target against its source part path. Targets
/// may be absolute (`/xl/...`) or relative (`../drawings/drawing1.xml`).
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let base_dir = source_part
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or_default();
    let mut parts: Vec<&str> = if base_dir.is_empty() {
        vec![]
    } else {
        base_dir.split('/').collect()
    };
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(seg),
        }
    }
    parts.join("/")
}

/// The `.rels` part belonging to a package part.
pub(crate) fn rels_path_for(part_path: &str) -> String {
    let normalized = part_path.trim_start_matches('/');
    let (dir, file) = normalized.rsplit_once('/').unwrap_or(("", normalized));
    if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    }
}

/// Canonical output rank for a ZIP entry. Entries are emitted sorted by
/// `(rank, secondary, manifest position)`; the order is part of the
/// byte-determinism contract.
pub(crate) fn canonical_rank(name: &str) -> (u8, u32) {
    match name {
        "[Content_Types].xml" => (0, 0),
        "_rels/.rels" => (1, 0),
        "xl/workbook.xml" => (2, 0),
        "xl/_rels/workbook.xml.rels" => (3, 0),
        "xl/styles.xml" => (4, 0),
        "xl/sharedStrings.xml" => (5, 0),
        _ => {
            if name.starts_with("xl/theme/") {
                (6, 0)
            } else if let Some(n) = sheet_number(name) {
                (7, n)
            } else if name.starts_with("xl/worksheets/_rels/") {
                (8, sheet_number_in(name).unwrap_or(0))
            } else if name.starts_with("xl/drawings/") {
                (9, 0)
            } else if name.starts_with("xl/tables/") {
                (10, 0)
            } else if name.starts_with("xl/comments") {
                (11, 0)
            } else {
                (12, 0)
            }
        }
    }
}

/// `xl/worksheets/sheetN.xml` -> N.
fn sheet_number(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("xl/worksheets/sheet")?;
    rest.strip_suffix(".xml")?.parse().ok()
}

/// `xl/worksheets/_rels/sheetN.xml.rels` -> N.
fn sheet_number_in(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("xl/worksheets/_rels/sheet")?;
    rest.strip_suffix(".xml.rels")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets/sheet1.xml", "../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/styles.xml"),
            "xl/styles.xml"
        );
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(
            rels_path_for("xl/worksheets/sheet2.xml"),
            "xl/worksheets/_rels/sheet2.xml.rels"
        );
    }

    #[test]
    fn test_canonical_rank_ordering() {
        let mut names = vec![
            "xl/worksheets/sheet2.xml",
            "xl/media/image1.png",
            "[Content_Types].xml",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/theme/theme1.xml",
            "xl/sharedStrings.xml",
        ];
        names.sort_by_key(|n| canonical_rank(n));
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "xl/workbook.xml",
                "xl/styles.xml",
                "xl/sharedStrings.xml",
                "xl/theme/theme1.xml",
                "xl/worksheets/sheet1.xml",
                "xl/worksheets/sheet2.xml",
                "xl/media/image1.png",
            ]
        );
    }

    #[test]
    fn test_sheet_numbers_order_numerically() {
        assert!(canonical_rank("xl/worksheets/sheet2.xml") < canonical_rank("xl/worksheets/sheet10.xml"));
    }
}
