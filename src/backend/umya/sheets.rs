use super::cells::used_bounds;
use super::{open_book, save_book, sheet_mut};
use crate::backend::{NamedRange, WorkbookMetadata};
use crate::errors::{BackendResult, DomainError};
use crate::paths::WorkbookPath;
use crate::tools::{CopySheetParams, RenameSheetParams, SheetParams};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use umya_spreadsheet::Spreadsheet;

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

pub(super) fn check_sheet_name(name: &str) -> BackendResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Sheet name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(DomainError::validation(format!(
            "Sheet name '{trimmed}' exceeds {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if trimmed.contains(FORBIDDEN_SHEET_CHARS) || trimmed.starts_with('\'') || trimmed.ends_with('\'') {
        return Err(DomainError::validation(format!(
            "Sheet name '{trimmed}' contains invalid characters"
        )));
    }
    Ok(trimmed)
}

fn has_sheet(book: &Spreadsheet, name: &str) -> bool {
    book.get_sheet_collection_no_check()
        .iter()
        .any(|sheet| sheet.get_name().eq_ignore_ascii_case(name))
}

fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection_no_check()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

pub(super) fn create_workbook(path: &WorkbookPath) -> BackendResult<()> {
    if let Some(parent) = path.as_path().parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DomainError::workbook(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    let book = umya_spreadsheet::new_file();
    save_book(&book, path)
}

pub(super) fn create_worksheet(params: &SheetParams) -> BackendResult<String> {
    let name = check_sheet_name(&params.sheet_name)?;
    let mut book = open_book(&params.filepath)?;
    if has_sheet(&book, name) {
        return Err(DomainError::workbook(format!("Sheet {name} already exists")));
    }
    book.new_sheet(name)
        .map_err(|e| DomainError::workbook(format!("Failed to create sheet {name}: {e}")))?;
    save_book(&book, &params.filepath)?;
    Ok(format!("Sheet {name} created successfully"))
}

pub(super) fn copy_worksheet(params: &CopySheetParams) -> BackendResult<String> {
    let target = check_sheet_name(&params.target_sheet)?;
    let mut book = open_book(&params.filepath)?;
    let mut copy = sheet_mut(&mut book, &params.source_sheet)?.clone();
    if has_sheet(&book, target) {
        return Err(DomainError::sheet(format!("Sheet '{target}' already exists")));
    }

    copy.set_name(target);
    book.add_sheet(copy)
        .map_err(|e| DomainError::sheet(format!("Failed to copy sheet: {e}")))?;
    save_book(&book, &params.filepath)?;
    Ok(format!(
        "Sheet '{}' copied to '{target}'",
        params.source_sheet
    ))
}

pub(super) fn delete_worksheet(params: &SheetParams) -> BackendResult<String> {
    let mut book = open_book(&params.filepath)?;
    sheet_mut(&mut book, &params.sheet_name)?;
    if book.get_sheet_collection_no_check().len() <= 1 {
        return Err(DomainError::sheet("Cannot delete the only sheet in the workbook"));
    }
    book.remove_sheet_by_name(&params.sheet_name)
        .map_err(|e| DomainError::sheet(format!("Failed to delete sheet '{}': {e}", params.sheet_name)))?;
    save_book(&book, &params.filepath)?;
    Ok(format!("Sheet '{}' deleted", params.sheet_name))
}

pub(super) fn rename_worksheet(params: &RenameSheetParams) -> BackendResult<String> {
    let new_name = check_sheet_name(&params.new_name)?;
    let mut book = open_book(&params.filepath)?;
    sheet_mut(&mut book, &params.old_name)?;
    let renaming_case_only = params.old_name.eq_ignore_ascii_case(new_name);
    if !renaming_case_only && has_sheet(&book, new_name) {
        return Err(DomainError::sheet(format!("Sheet '{new_name}' already exists")));
    }

    sheet_mut(&mut book, &params.old_name)?.set_name(new_name);
    save_book(&book, &params.filepath)?;
    Ok(format!(
        "Sheet '{}' renamed to '{new_name}'",
        params.old_name
    ))
}

pub(super) fn workbook_metadata(
    path: &WorkbookPath,
    include_ranges: bool,
) -> BackendResult<WorkbookMetadata> {
    let stat = std::fs::metadata(path.as_path()).map_err(|e| {
        DomainError::workbook(format!("Failed to open workbook {path}: {e}"))
    })?;
    let book = open_book(path)?;

    let filename = path
        .as_path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let modified = stat
        .modified()
        .ok()
        .map(|time| DateTime::<Utc>::from(time).to_rfc3339());

    let mut metadata = WorkbookMetadata {
        filename,
        size_bytes: stat.len(),
        modified,
        sheets: sheet_names(&book),
        used_ranges: None,
        named_ranges: None,
    };

    if include_ranges {
        let used: IndexMap<String, String> = book
            .get_sheet_collection_no_check()
            .iter()
            .map(|sheet| {
                let range = used_bounds(sheet)
                    .map(|bounds| bounds.to_string())
                    .unwrap_or_else(|| "A1".to_string());
                (sheet.get_name().to_string(), range)
            })
            .collect();

        let mut named: Vec<NamedRange> = book
            .get_defined_names()
            .iter()
            .map(|defined| NamedRange {
                name: defined.get_name().to_string(),
                refers_to: defined.get_address(),
            })
            .collect();
        for sheet in book.get_sheet_collection_no_check() {
            named.extend(sheet.get_defined_names().iter().map(|defined| NamedRange {
                name: defined.get_name().to_string(),
                refers_to: defined.get_address(),
            }));
        }

        metadata.used_ranges = Some(used);
        metadata.named_ranges = Some(named);
    }

    Ok(metadata)
}
