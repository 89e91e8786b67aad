//! The workbook domain model.
//!
//! A [`Workbook`] is an ordered collection of sheets plus metadata and an
//! optional [`SourceContext`]. Like [`Sheet`], every operation returns a
//! new value. Operations that can affect physical package parts update the
//! source tracker so the writer knows what to regenerate.

use chrono::NaiveDateTime;

use crate::addr::{ARef, SheetName};
use crate::error::{Error, Result};
use crate::patch::Patch;
use crate::sheet::Sheet;
use crate::source::SourceContext;
use crate::theme::ThemePalette;
use crate::value::CellValue;

/// Visibility of a sheet tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetVisibility {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetVisibility {
    /// The `state` attribute value; visible sheets carry none.
    pub fn state_attr(self) -> Option<&'static str> {
        match self {
            SheetVisibility::Visible => None,
            SheetVisibility::Hidden => Some("hidden"),
            SheetVisibility::VeryHidden => Some("veryHidden"),
        }
    }

    pub fn from_state_attr(state: Option<&str>) -> Self {
        match state {
            Some("hidden") => SheetVisibility::Hidden,
            Some("veryHidden") => SheetVisibility::VeryHidden,
            _ => SheetVisibility::Visible,
        }
    }
}

/// A workbook-level defined name.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedName {
    pub name: String,
    /// The refers-to formula, e.g. `Sheet1!$A$1:$B$10`.
    pub refers_to: String,
    /// Scope: `None` for workbook-global, otherwise a sheet index.
    pub local_sheet: Option<usize>,
    pub hidden: bool,
}

/// Workbook metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookMeta {
    pub creator: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    pub theme: ThemePalette,
    pub defined_names: Vec<DefinedName>,
}

impl Default for WorkbookMeta {
    fn default() -> Self {
        Self {
            creator: None,
            created: None,
            modified: None,
            theme: ThemePalette::default(),
            defined_names: Vec::new(),
        }
    }
}

/// An immutable workbook. Always contains at least one sheet.
#[derive(Debug, Clone)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    visibility: Vec<SheetVisibility>,
    meta: WorkbookMeta,
    active_sheet: usize,
    source: Option<SourceContext>,
}

impl Workbook {
    /// A new workbook with a single empty sheet of the given name.
    pub fn new(sheet_name: &str) -> Result<Self> {
        let name = SheetName::new(sheet_name)?;
        Ok(Self {
            sheets: vec![Sheet::new(name)],
            visibility: vec![SheetVisibility::Visible],
            meta: WorkbookMeta::default(),
            active_sheet: 0,
            source: None,
        })
    }

    /// Assemble a workbook from parts (used by the reader).
    pub(crate) fn from_parts(
        sheets: Vec<Sheet>,
        visibility: Vec<SheetVisibility>,
        meta: WorkbookMeta,
        active_sheet: usize,
        source: Option<SourceContext>,
    ) -> Self {
        debug_assert!(!sheets.is_empty());
        debug_assert_eq!(sheets.len(), visibility.len());
        let active_sheet = active_sheet.min(sheets.len() - 1);
        Self {
            sheets,
            visibility,
            meta,
            active_sheet,
            source,
        }
    }

    // ----- accessors --------------------------------------------------------

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Look a sheet up by exact (case-sensitive) name.
    pub fn sheet_index(&self, name: &str) -> Result<usize> {
        self.sheets
            .iter()
            .position(|s| s.name().as_str() == name)
            .ok_or_else(|| Error::SheetNotFound {
                name: name.to_string(),
            })
    }

    pub fn sheet_by_name(&self, name: &str) -> Result<&Sheet> {
        Ok(&self.sheets[self.sheet_index(name)?])
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name().as_str()).collect()
    }

    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    pub fn visibility(&self, index: usize) -> SheetVisibility {
        self.visibility.get(index).copied().unwrap_or_default()
    }

    pub fn meta(&self) -> &WorkbookMeta {
        &self.meta
    }

    pub fn source(&self) -> Option<&SourceContext> {
        self.source.as_ref()
    }

    /// True when nothing has changed since read (always false for
    /// workbooks built in memory, which have no source).
    pub fn is_clean(&self) -> bool {
        self.source
            .as_ref()
            .map(|ctx| ctx.tracker.is_clean())
            .unwrap_or(false)
    }

    // ----- patching ---------------------------------------------------------

    /// Apply a patch to the named sheet, marking it modified.
    pub fn apply(&self, sheet_name: &str, patch: &Patch) -> Result<Self> {
        let index = self.sheet_index(sheet_name)?;
        self.apply_at(index, patch)
    }

    /// Apply a patch to the sheet at `index`, marking it modified.
    pub fn apply_at(&self, index: usize, patch: &Patch) -> Result<Self> {
        let sheet = self.sheets.get(index).ok_or(Error::OutOfBounds {
            what: "sheet index",
            value: index as u32,
            max: self.sheets.len() as u32 - 1,
        })?;
        let new_sheet = patch.apply(sheet)?;
        let mut next = self.clone();
        next.sheets[index] = new_sheet;
        next.note_sheet_modified(index);
        Ok(next)
    }

    /// Shorthand: write one cell on the named sheet.
    pub fn put(&self, sheet_name: &str, aref: ARef, value: impl Into<CellValue>) -> Result<Self> {
        self.apply(sheet_name, &Patch::Put(aref, value.into()))
    }

    /// Read one cell from the named sheet.
    pub fn value(&self, sheet_name: &str, aref: ARef) -> Result<CellValue> {
        Ok(self.sheet_by_name(sheet_name)?.value(aref))
    }

    // ----- sheet management -------------------------------------------------

    /// Append an empty sheet. Fails on duplicate name (case-sensitive, per
    /// ECMA-376).
    pub fn add_sheet(&self, name: &str) -> Result<Self> {
        let sheet_name = SheetName::new(name)?;
        if self.sheet_index(name).is_ok() {
            return Err(Error::DuplicateSheet {
                name: name.to_string(),
            });
        }
        let mut next = self.clone();
        next.sheets.push(Sheet::new(sheet_name));
        next.visibility.push(SheetVisibility::Visible);
        if let Some(ctx) = next.source.as_mut() {
            ctx.origin.push(None);
            ctx.tracker.mark_metadata();
        }
        Ok(next)
    }

    /// Remove a sheet by name. Removing the last sheet is invalid.
    pub fn remove_sheet(&self, name: &str) -> Result<Self> {
        let index = self.sheet_index(name)?;
        self.remove_sheet_at(index)
    }

    /// Remove the sheet at `index`. Removing the last sheet is invalid.
    pub fn remove_sheet_at(&self, index: usize) -> Result<Self> {
        if index >= self.sheets.len() {
            return Err(Error::OutOfBounds {
                what: "sheet index",
                value: index as u32,
                max: self.sheets.len() as u32 - 1,
            });
        }
        if self.sheets.len() == 1 {
            return Err(Error::InvalidWorkbook(
                "cannot remove the last sheet".to_string(),
            ));
        }
        let mut next = self.clone();
        next.sheets.remove(index);
        next.visibility.remove(index);
        if next.active_sheet >= next.sheets.len() {
            next.active_sheet = next.sheets.len() - 1;
        }
        if let Some(ctx) = next.source.as_mut() {
            if let Some(orig) = ctx.origin.remove(index) {
                ctx.tracker.mark_sheet_deleted(orig);
            }
            ctx.tracker.mark_metadata();
        }
        Ok(next)
    }

    /// Rename a sheet, keeping uniqueness.
    pub fn rename_sheet(&self, old: &str, new: &str) -> Result<Self> {
        let index = self.sheet_index(old)?;
        let new_name = SheetName::new(new)?;
        if old != new && self.sheet_index(new).is_ok() {
            return Err(Error::DuplicateSheet {
                name: new.to_string(),
            });
        }
        let mut next = self.clone();
        next.sheets[index] = next.sheets[index].renamed(new_name);
        next.note_metadata();
        Ok(next)
    }

    /// Move the sheet at `from` so it lands at position `to`.
    pub fn move_sheet(&self, from: usize, to: usize) -> Result<Self> {
        let len = self.sheets.len();
        if from >= len || to >= len {
            return Err(Error::OutOfBounds {
                what: "sheet index",
                value: from.max(to) as u32,
                max: len as u32 - 1,
            });
        }
        if from == to {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        let sheet = next.sheets.remove(from);
        next.sheets.insert(to, sheet);
        let vis = next.visibility.remove(from);
        next.visibility.insert(to, vis);
        if let Some(ctx) = next.source.as_mut() {
            let origin = ctx.origin.remove(from);
            ctx.origin.insert(to, origin);
            ctx.tracker.mark_reordered();
        }
        Ok(next)
    }

    /// Select the active tab.
    pub fn set_active_sheet(&self, index: usize) -> Result<Self> {
        if index >= self.sheets.len() {
            return Err(Error::OutOfBounds {
                what: "sheet index",
                value: index as u32,
                max: self.sheets.len() as u32 - 1,
            });
        }
        let mut next = self.clone();
        next.active_sheet = index;
        next.note_metadata();
        Ok(next)
    }

    /// Change a sheet's visibility. At least one sheet must stay visible.
    pub fn set_visibility(&self, index: usize, visibility: SheetVisibility) -> Result<Self> {
        if index >= self.sheets.len() {
            return Err(Error::OutOfBounds {
                what: "sheet index",
                value: index as u32,
                max: self.sheets.len() as u32 - 1,
            });
        }
        let mut next = self.clone();
        next.visibility[index] = visibility;
        if !next
            .visibility
            .iter()
            .any(|v| *v == SheetVisibility::Visible)
        {
            return Err(Error::InvalidWorkbook(
                "at least one sheet must be visible".to_string(),
            ));
        }
        next.note_metadata();
        Ok(next)
    }

    // ----- metadata ---------------------------------------------------------

    pub fn set_creator(&self, creator: &str) -> Self {
        let mut next = self.clone();
        next.meta.creator = Some(creator.to_string());
        next.note_metadata();
        next
    }

    /// Add or replace a defined name.
    pub fn define_name(&self, name: &str, refers_to: &str) -> Self {
        let mut next = self.clone();
        next.meta
            .defined_names
            .retain(|d| !(d.name == name && d.local_sheet.is_none()));
        next.meta.defined_names.push(DefinedName {
            name: name.to_string(),
            refers_to: refers_to.to_string(),
            local_sheet: None,
            hidden: false,
        });
        next.note_metadata();
        next
    }

    pub fn remove_defined_name(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.meta.defined_names.retain(|d| d.name != name);
        next.note_metadata();
        next
    }

    // ----- recalculation ----------------------------------------------------

    /// Recalculate every formula on the named sheet, refreshing cached
    /// values in dependency order.
    pub fn recalculate(&self, sheet_name: &str) -> Result<Self> {
        let index = self.sheet_index(sheet_name)?;
        let recalced = crate::formula::recalc::recalculate(&self.sheets[index])?;
        let mut next = self.clone();
        next.sheets[index] = recalced;
        next.note_sheet_modified(index);
        Ok(next)
    }

    /// Recalculate only the transitive dependents of the given cells.
    pub fn recalculate_dependents(
        &self,
        sheet_name: &str,
        modified: &std::collections::BTreeSet<ARef>,
    ) -> Result<Self> {
        let index = self.sheet_index(sheet_name)?;
        let recalced =
            crate::formula::recalc::recalculate_dependents(&self.sheets[index], modified)?;
        let mut next = self.clone();
        next.sheets[index] = recalced;
        next.note_sheet_modified(index);
        Ok(next)
    }

    // ----- tracker plumbing -------------------------------------------------

    fn note_sheet_modified(&mut self, index: usize) {
        if let Some(ctx) = self.source.as_mut() {
            if let Some(orig) = ctx.origin.get(index).copied().flatten() {
                ctx.tracker.mark_sheet_modified(orig);
            }
        }
    }

    fn note_metadata(&mut self) {
        if let Some(ctx) = self.source.as_mut() {
            ctx.tracker.mark_metadata();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
