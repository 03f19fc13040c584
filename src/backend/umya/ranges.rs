use super::cells::{cell_value, store_value, used_bounds};
use crate::backend::CellValue;
use super::{open_book, save_book, sheet_mut};
use crate::backend::address::{CellAddr, MAX_COLUMN, MAX_ROW, RangeBounds, parse_cell, parse_range};
use crate::errors::{BackendResult, DomainError};
use crate::formula::shift_formula;
use crate::tools::param_enums::ShiftDirection;
use crate::tools::{CellRangeParams, CopyRangeParams, DeleteRangeParams, ValidateRangeParams};
use umya_spreadsheet::{Style, Worksheet};

pub(super) fn merge_cells(params: &CellRangeParams) -> BackendResult<String> {
    let bounds = parse_range(&params.range())?;
    let mut book = open_book(&params.filepath)?;
    let sheet = sheet_mut(&mut book, &params.sheet_name)?;

    let range = bounds.to_string();
    for merged in sheet.get_merge_cells() {
        let existing = merged.get_range();
        if existing == range {
            return Err(DomainError::sheet(format!("Range '{range}' is already merged")));
        }
        if parse_range(&existing).is_ok_and(|other| other.intersects(&bounds)) {
            return Err(DomainError::sheet(format!(
                "Range '{range}' overlaps merged range '{existing}'"
            )));
        }
    }
    sheet.add_merge_cells(range.as_str());

    save_book(&book, &params.filepath)?;
    Ok(format!(
        "Range '{range}' merged in sheet '{}'",
        params.sheet_name
    ))
}

pub(super) fn unmerge_cells(params: &CellRangeParams) -> BackendResult<String> {
    let bounds = parse_range(&params.range())?;
    let mut book = open_book(&params.filepath)?;
    let sheet = sheet_mut(&mut book, &params.sheet_name)?;

    let range = bounds.to_string();
    let merges = sheet.get_merge_cells_mut();
    let before = merges.len();
    merges.retain(|merged| merged.get_range() != range);
    if merges.len() == before {
        return Err(DomainError::sheet(format!("Range '{range}' is not merged")));
    }

    save_book(&book, &params.filepath)?;
    Ok(format!("Range '{range}' unmerged successfully"))
}

/// Snapshot of one source cell, taken before any destination write.
struct CellCopy {
    style: Style,
    formula: Option<String>,
    value: CellValue,
}

fn snapshot(sheet: &Worksheet, addr: CellAddr) -> Option<CellCopy> {
    sheet.get_cell(addr.coords()).map(|cell| CellCopy {
        style: cell.get_style().clone(),
        formula: cell.is_formula().then(|| cell.get_formula().to_string()),
        value: cell_value(cell),
    })
}

fn place(sheet: &mut Worksheet, addr: CellAddr, copy: Option<CellCopy>, delta: (i64, i64)) {
    let coords = addr.coords();
    let Some(copy) = copy else {
        sheet.remove_cell(coords);
        return;
    };
    sheet.remove_cell(coords);
    let dest = sheet.get_cell_mut(coords);
    dest.set_style(copy.style);
    match copy.formula {
        Some(formula) => {
            // References that cannot move keep the source text.
            let shifted = shift_formula(&formula, delta.0, delta.1).unwrap_or(formula);
            dest.set_formula(shifted);
            dest.set_formula_result_default("");
        }
        None => store_value(dest, &copy.value),
    }
}

pub(super) fn copy_range(params: &CopyRangeParams) -> BackendResult<String> {
    let source = RangeBounds::new(parse_cell(&params.source_start)?, parse_cell(&params.source_end)?);
    let target_start = parse_cell(&params.target_start)?;
    let target_end = CellAddr::new(
        target_start.col + source.width() - 1,
        target_start.row + source.height() - 1,
    );
    if target_end.col > MAX_COLUMN || target_end.row > MAX_ROW {
        return Err(DomainError::validation(
            "Target range extends past the worksheet grid",
        ));
    }
    let target = RangeBounds::new(target_start, target_end);

    let target_sheet = params
        .target_sheet
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&params.sheet_name)
        .to_string();
    if target_sheet == params.sheet_name && source.intersects(&target) {
        return Err(DomainError::sheet(format!(
            "Source range {source} overlaps target range {target}"
        )));
    }

    let mut book = open_book(&params.filepath)?;
    let snapshots: Vec<(CellAddr, Option<CellCopy>)> = {
        let sheet = sheet_mut(&mut book, &params.sheet_name)?;
        source
            .cells()
            .map(|addr| (addr, snapshot(sheet, addr)))
            .collect()
    };

    let delta = (
        i64::from(target.start.col) - i64::from(source.start.col),
        i64::from(target.start.row) - i64::from(source.start.row),
    );
    let dest = sheet_mut(&mut book, &target_sheet)?;
    for (addr, copy) in snapshots {
        let dest_addr = CellAddr::new(
            (i64::from(addr.col) + delta.0) as u32,
            (i64::from(addr.row) + delta.1) as u32,
        );
        place(dest, dest_addr, copy, delta);
    }

    save_book(&book, &params.filepath)?;
    Ok("Range copied successfully".to_string())
}

/// Moves a cell's content and style, clearing the source slot.
fn move_cell(sheet: &mut Worksheet, from: CellAddr, to: CellAddr, delta: (i64, i64)) {
    let copy = snapshot(sheet, from);
    place(sheet, to, copy, delta);
    sheet.remove_cell(from.coords());
}

pub(super) fn delete_range(params: &DeleteRangeParams) -> BackendResult<String> {
    let bounds = RangeBounds::new(parse_cell(&params.start_cell)?, parse_cell(&params.end_cell)?);
    let direction = ShiftDirection::parse(&params.shift_direction)?;

    let mut book = open_book(&params.filepath)?;
    let sheet = sheet_mut(&mut book, &params.sheet_name)?;

    for addr in bounds.cells() {
        sheet.remove_cell(addr.coords());
    }

    if let Some(used) = used_bounds(sheet) {
        match direction {
            ShiftDirection::Up => {
                let delta = (0, -i64::from(bounds.height()));
                for row in (bounds.end.row + 1)..=used.end.row {
                    for col in bounds.start.col..=bounds.end.col {
                        let from = CellAddr::new(col, row);
                        let to = CellAddr::new(col, row - bounds.height());
                        move_cell(sheet, from, to, delta);
                    }
                }
            }
            ShiftDirection::Left => {
                let delta = (-i64::from(bounds.width()), 0);
                for col in (bounds.end.col + 1)..=used.end.col {
                    for row in bounds.start.row..=bounds.end.row {
                        let from = CellAddr::new(col, row);
                        let to = CellAddr::new(col - bounds.width(), row);
                        move_cell(sheet, from, to, delta);
                    }
                }
            }
        }
    }

    save_book(&book, &params.filepath)?;
    Ok(format!(
        "Range {}:{} deleted successfully",
        params.start_cell.trim(),
        params.end_cell.trim()
    ))
}

pub(super) fn validate_range(params: &ValidateRangeParams) -> BackendResult<String> {
    let bounds = parse_range(&params.range)?;
    let book = open_book(&params.filepath)?;
    let sheet = book
        .get_sheet_by_name(&params.sheet_name)
        .ok_or_else(|| DomainError::validation(format!("Sheet '{}' not found", params.sheet_name)))?;

    let used = used_bounds(sheet);
    let data_range = used
        .map(|used| used.to_string())
        .unwrap_or_else(|| "A1".to_string());
    let mut message = format!(
        "Range '{}' is valid. Sheet data range: {data_range}",
        params.range
    );
    if !used.is_some_and(|used| used.contains(&bounds)) {
        message.push_str(" (range extends beyond existing data)");
    }
    Ok(message)
}
