use super::{input_sheet, input_sheet_mut, open_book, save_book};
use crate::backend::CellValue;
use crate::backend::address::{CellAddr, MAX_COLUMN, RangeBounds, parse_cell};
use crate::errors::{BackendResult, DomainError};
use crate::formula::{formula_body, parse_formula};
use crate::tools::{FormulaParams, ReadDataParams, WriteDataParams};
use serde_json::Value;
use umya_spreadsheet::{Cell, CellRawValue, Worksheet};

const PREVIEW_ROWS: usize = 5;

fn check_formula(formula: &str) -> BackendResult<&str> {
    let body = formula_body(formula);
    parse_formula(body)
        .map_err(|e| DomainError::calculation(format!("Invalid formula syntax: {e}")))?;
    Ok(body)
}

pub(super) fn apply_formula(params: &FormulaParams) -> BackendResult<String> {
    let addr = parse_cell(&params.cell)?;
    let body = check_formula(&params.formula)?;
    let mut book = open_book(&params.filepath)?;
    let sheet = input_sheet_mut(&mut book, &params.sheet_name)?;

    let cell = sheet.get_cell_mut(addr.coords());
    cell.set_formula(body);
    cell.set_formula_result_default("");

    save_book(&book, &params.filepath)?;
    Ok(format!(
        "Applied formula '={body}' to {}!{addr}",
        params.sheet_name
    ))
}

pub(super) fn validate_formula(params: &FormulaParams) -> BackendResult<String> {
    let addr = parse_cell(&params.cell)?;
    let body = check_formula(&params.formula)?;
    let book = open_book(&params.filepath)?;
    let sheet = input_sheet(&book, &params.sheet_name)?;

    let mut message = format!("Formula '={body}' is valid for {}!{addr}", params.sheet_name);
    let current = sheet
        .get_cell(addr.coords())
        .filter(|cell| cell.is_formula())
        .map(|cell| cell.get_formula().to_string());
    if let Some(current) = current.filter(|current| formula_body(current) != body) {
        message.push_str(&format!(" (cell currently holds '={}')", formula_body(&current)));
    }
    Ok(message)
}

/// Typed view of a stored cell; formulas come back as their text.
///
/// The stored cell type decides the variant, so text such as `007` or
/// `TRUE` written as a string reads back as text.
pub(super) fn cell_value(cell: &Cell) -> CellValue {
    if cell.is_formula() {
        return CellValue::Text(format!("={}", cell.get_formula()));
    }
    match cell.get_raw_value() {
        CellRawValue::Numeric(number) => CellValue::Number(*number),
        CellRawValue::Bool(flag) => CellValue::Bool(*flag),
        CellRawValue::Empty => CellValue::Empty,
        _ => match cell.get_value() {
            text if text.is_empty() => CellValue::Empty,
            text => CellValue::Text(text.to_string()),
        },
    }
}

/// Writes a typed value with the matching umya setter.
pub(super) fn store_value(cell: &mut Cell, value: &CellValue) {
    match value {
        CellValue::Empty => {}
        CellValue::Number(number) => {
            cell.set_value_number(*number);
        }
        CellValue::Bool(flag) => {
            cell.set_value_bool(*flag);
        }
        CellValue::Text(text) => {
            cell.set_value_string(text.as_str());
        }
    }
}

pub(super) fn value_at(sheet: &Worksheet, addr: CellAddr) -> CellValue {
    sheet
        .get_cell(addr.coords())
        .map(cell_value)
        .unwrap_or(CellValue::Empty)
}

/// Bounding box of every stored cell, `None` for an empty sheet.
pub(super) fn used_bounds(sheet: &Worksheet) -> Option<RangeBounds> {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    if max_col == 0 || max_row == 0 {
        return None;
    }
    Some(RangeBounds::new(
        CellAddr::new(1, 1),
        CellAddr::new(max_col, max_row),
    ))
}

pub(super) fn read_rows(sheet: &Worksheet, bounds: &RangeBounds) -> Vec<Vec<CellValue>> {
    (bounds.start.row..=bounds.end.row)
        .map(|row| {
            (bounds.start.col..=bounds.end.col)
                .map(|col| value_at(sheet, CellAddr::new(col, row)))
                .collect::<Vec<_>>()
        })
        .filter(|row| row.iter().any(|value| !value.is_empty()))
        .collect()
}

pub(super) fn read_data(params: &ReadDataParams) -> BackendResult<Vec<Vec<CellValue>>> {
    let start = parse_cell(&params.start_cell)?;
    let explicit_end = params
        .end_cell
        .as_deref()
        .map(str::trim)
        .filter(|end| !end.is_empty())
        .map(parse_cell)
        .transpose()?;

    let book = open_book(&params.filepath)?;
    let sheet = input_sheet(&book, &params.sheet_name)?;

    let end = match explicit_end {
        Some(end) => end,
        None => match used_bounds(sheet) {
            Some(used) if used.end.col >= start.col && used.end.row >= start.row => used.end,
            _ => return Ok(Vec::new()),
        },
    };

    let mut rows = read_rows(sheet, &RangeBounds::new(start, end));
    if params.preview_only {
        rows.truncate(PREVIEW_ROWS);
    }
    Ok(rows)
}

fn write_value(sheet: &mut Worksheet, addr: CellAddr, value: &Value) {
    let coords = addr.coords();
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            sheet.get_cell_mut(coords).set_value_bool(*flag);
        }
        Value::Number(number) => match number.as_f64() {
            Some(n) => {
                sheet.get_cell_mut(coords).set_value_number(n);
            }
            None => {
                sheet.get_cell_mut(coords).set_value_string(number.to_string());
            }
        },
        Value::String(text) if text.starts_with('=') && text.len() > 1 => {
            let cell = sheet.get_cell_mut(coords);
            cell.set_formula(formula_body(text));
            cell.set_formula_result_default("");
        }
        Value::String(text) => {
            sheet.get_cell_mut(coords).set_value_string(text.as_str());
        }
        other => {
            sheet.get_cell_mut(coords).set_value_string(other.to_string());
        }
    }
}

pub(super) fn write_data(params: &WriteDataParams) -> BackendResult<String> {
    let start = parse_cell(&params.start_cell)?;

    let mut rows = Vec::with_capacity(params.data.len());
    for (idx, row) in params.data.iter().enumerate() {
        let cells = row
            .as_array()
            .ok_or_else(|| DomainError::data(format!("Row {} must be a list of values", idx + 1)))?;
        if start.col as usize + cells.len() > MAX_COLUMN as usize + 1 {
            return Err(DomainError::data(format!(
                "Row {} extends past the last worksheet column",
                idx + 1
            )));
        }
        rows.push(cells);
    }

    let mut book = open_book(&params.filepath)?;
    if book.get_sheet_by_name(&params.sheet_name).is_none() {
        book.new_sheet(params.sheet_name.as_str())
            .map_err(|e| DomainError::data(format!("Failed to create sheet '{}': {e}", params.sheet_name)))?;
    }
    let sheet = input_sheet_mut(&mut book, &params.sheet_name)?;

    for (row_offset, cells) in rows.iter().enumerate() {
        let row = start.row + row_offset as u32;
        for (col_offset, value) in cells.iter().enumerate() {
            let addr = CellAddr::new(start.col + col_offset as u32, row);
            write_value(sheet, addr, value);
            if params.write_headers && row_offset == 0 && !value.is_null() {
                sheet.get_style_mut(addr.coords()).get_font_mut().set_bold(true);
            }
        }
    }

    save_book(&book, &params.filepath)?;
    Ok(format!("Data written to {}", params.sheet_name))
}
