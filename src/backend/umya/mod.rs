//! `umya-spreadsheet` implementation of [`WorkbookBackend`].
//!
//! Each call opens the file, mutates or inspects it, and saves it before
//! returning. Nothing is cached between calls.

mod cells;
mod chart;
mod conditional_format;
mod format;
mod pivot;
mod ranges;
mod sheets;

use super::{CellValue, WorkbookBackend, WorkbookMetadata};
use crate::errors::{BackendResult, DomainError};
use crate::paths::WorkbookPath;
use crate::tools::{
    CellRangeParams, ChartParams, CopyRangeParams, CopySheetParams, DeleteRangeParams,
    FormatRangeParams, FormulaParams, PivotParams, ReadDataParams, RenameSheetParams, SheetParams,
    ValidateRangeParams, WorkbookParams, WriteDataParams,
};
use umya_spreadsheet::{Spreadsheet, Worksheet};

#[derive(Debug, Default, Clone, Copy)]
pub struct UmyaBackend;

impl UmyaBackend {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn open_book(path: &WorkbookPath) -> BackendResult<Spreadsheet> {
    if !path.as_path().is_file() {
        return Err(DomainError::workbook(format!(
            "Failed to open workbook {path}: file does not exist"
        )));
    }
    umya_spreadsheet::reader::xlsx::read(path.as_path())
        .map_err(|e| DomainError::workbook(format!("Failed to open workbook {path}: {e}")))
}

pub(crate) fn save_book(book: &Spreadsheet, path: &WorkbookPath) -> BackendResult<()> {
    umya_spreadsheet::writer::xlsx::write(book, path.as_path())
        .map_err(|e| DomainError::workbook(format!("Failed to save workbook {path}: {e}")))
}

/// Sheet lookup for sheet/range tools.
pub(crate) fn sheet_mut<'a>(book: &'a mut Spreadsheet, name: &str) -> BackendResult<&'a mut Worksheet> {
    book.get_sheet_by_name_mut(name)
        .ok_or_else(|| DomainError::sheet(format!("Sheet '{name}' not found")))
}

/// Sheet lookup for formula/format/data/chart/pivot tools, which report
/// a missing sheet as bad input.
pub(crate) fn input_sheet<'a>(book: &'a Spreadsheet, name: &str) -> BackendResult<&'a Worksheet> {
    book.get_sheet_by_name(name)
        .ok_or_else(|| DomainError::validation(format!("Sheet '{name}' not found")))
}

pub(crate) fn input_sheet_mut<'a>(
    book: &'a mut Spreadsheet,
    name: &str,
) -> BackendResult<&'a mut Worksheet> {
    book.get_sheet_by_name_mut(name)
        .ok_or_else(|| DomainError::validation(format!("Sheet '{name}' not found")))
}

impl WorkbookBackend for UmyaBackend {
    fn apply_formula(&self, params: &FormulaParams) -> BackendResult<String> {
        cells::apply_formula(params)
    }

    fn validate_formula(&self, params: &FormulaParams) -> BackendResult<String> {
        cells::validate_formula(params)
    }

    fn format_range(&self, params: &FormatRangeParams) -> BackendResult<String> {
        format::format_range(params)
    }

    fn read_data(&self, params: &ReadDataParams) -> BackendResult<Vec<Vec<CellValue>>> {
        cells::read_data(params)
    }

    fn write_data(&self, params: &WriteDataParams) -> BackendResult<String> {
        cells::write_data(params)
    }

    fn create_workbook(&self, params: &WorkbookParams) -> BackendResult<()> {
        sheets::create_workbook(&params.filepath)
    }

    fn create_worksheet(&self, params: &SheetParams) -> BackendResult<String> {
        sheets::create_worksheet(params)
    }

    fn create_chart(&self, params: &ChartParams) -> BackendResult<String> {
        chart::create_chart(params)
    }

    fn create_pivot_table(&self, params: &PivotParams) -> BackendResult<String> {
        pivot::create_pivot_table(params)
    }

    fn copy_worksheet(&self, params: &CopySheetParams) -> BackendResult<String> {
        sheets::copy_worksheet(params)
    }

    fn delete_worksheet(&self, params: &SheetParams) -> BackendResult<String> {
        sheets::delete_worksheet(params)
    }

    fn rename_worksheet(&self, params: &RenameSheetParams) -> BackendResult<String> {
        sheets::rename_worksheet(params)
    }

    fn workbook_metadata(
        &self,
        path: &WorkbookPath,
        include_ranges: bool,
    ) -> BackendResult<WorkbookMetadata> {
        sheets::workbook_metadata(path, include_ranges)
    }

    fn merge_cells(&self, params: &CellRangeParams) -> BackendResult<String> {
        ranges::merge_cells(params)
    }

    fn unmerge_cells(&self, params: &CellRangeParams) -> BackendResult<String> {
        ranges::unmerge_cells(params)
    }

    fn copy_range(&self, params: &CopyRangeParams) -> BackendResult<String> {
        ranges::copy_range(params)
    }

    fn delete_range(&self, params: &DeleteRangeParams) -> BackendResult<String> {
        ranges::delete_range(params)
    }

    fn validate_range(&self, params: &ValidateRangeParams) -> BackendResult<String> {
        ranges::validate_range(params)
    }
}
