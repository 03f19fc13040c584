use std::sync::Mutex;
use std::time::Duration;

use excel_mcp_server::backend::{CellValue, WorkbookBackend, WorkbookMetadata};
use excel_mcp_server::errors::{BackendResult, DomainError};
use excel_mcp_server::paths::WorkbookPath;
use excel_mcp_server::tools::{
    CellRangeParams, ChartParams, CopyRangeParams, CopySheetParams, DeleteRangeParams,
    FormatRangeParams, FormulaParams, PivotParams, ReadDataParams, RenameSheetParams, SheetParams,
    ValidateRangeParams, WorkbookParams, WriteDataParams,
};

#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail(DomainError),
    Panic,
}

/// Records each operation it receives, then behaves as configured.
pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    behavior: Behavior,
    metadata_delay: Duration,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            behavior,
            metadata_delay: Duration::ZERO,
        }
    }

    pub fn slow_metadata(delay: Duration) -> Self {
        Self {
            metadata_delay: delay,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, entry: String) -> BackendResult<String> {
        self.calls.lock().unwrap().push(entry.clone());
        match &self.behavior {
            Behavior::Succeed => Ok(format!("ok {entry}")),
            Behavior::Fail(error) => Err(error.clone()),
            Behavior::Panic => panic!("backend exploded"),
        }
    }
}

impl WorkbookBackend for RecordingBackend {
    fn apply_formula(&self, p: &FormulaParams) -> BackendResult<String> {
        self.record(format!("apply_formula {}!{} {}", p.sheet_name, p.cell, p.formula))
    }

    fn validate_formula(&self, p: &FormulaParams) -> BackendResult<String> {
        self.record(format!("validate_formula {}!{}", p.sheet_name, p.cell))
    }

    fn format_range(&self, p: &FormatRangeParams) -> BackendResult<String> {
        self.record(format!(
            "format_range {} {:?} bold={}",
            p.start_cell, p.end_cell, p.bold
        ))
    }

    fn read_data(&self, p: &ReadDataParams) -> BackendResult<Vec<Vec<CellValue>>> {
        self.record(format!("read_data {} preview={}", p.start_cell, p.preview_only))?;
        Ok(vec![vec![
            CellValue::Text("a".to_string()),
            CellValue::Number(1.0),
        ]])
    }

    fn write_data(&self, p: &WriteDataParams) -> BackendResult<String> {
        self.record(format!(
            "write_data {} rows={} headers={}",
            p.start_cell,
            p.data.len(),
            p.write_headers
        ))
    }

    fn create_workbook(&self, p: &WorkbookParams) -> BackendResult<()> {
        self.record(format!("create_workbook {}", p.filepath)).map(|_| ())
    }

    fn create_worksheet(&self, p: &SheetParams) -> BackendResult<String> {
        self.record(format!("create_worksheet {}", p.sheet_name))
    }

    fn create_chart(&self, p: &ChartParams) -> BackendResult<String> {
        self.record(format!("create_chart {} title={:?}", p.chart_type, p.title))
    }

    fn create_pivot_table(&self, p: &PivotParams) -> BackendResult<String> {
        self.record(format!(
            "create_pivot_table rows={:?} columns={:?} agg={}",
            p.rows, p.columns, p.agg_func
        ))
    }

    fn copy_worksheet(&self, p: &CopySheetParams) -> BackendResult<String> {
        self.record(format!("copy_worksheet {} {}", p.source_sheet, p.target_sheet))
    }

    fn delete_worksheet(&self, p: &SheetParams) -> BackendResult<String> {
        self.record(format!("delete_worksheet {}", p.sheet_name))
    }

    fn rename_worksheet(&self, p: &RenameSheetParams) -> BackendResult<String> {
        self.record(format!("rename_worksheet {} {}", p.old_name, p.new_name))
    }

    fn workbook_metadata(
        &self,
        path: &WorkbookPath,
        include_ranges: bool,
    ) -> BackendResult<WorkbookMetadata> {
        if !self.metadata_delay.is_zero() {
            std::thread::sleep(self.metadata_delay);
        }
        self.record(format!("workbook_metadata {path} ranges={include_ranges}"))?;
        Ok(WorkbookMetadata {
            filename: "book.xlsx".to_string(),
            size_bytes: 42,
            modified: None,
            sheets: vec!["Sheet1".to_string()],
            used_ranges: None,
            named_ranges: None,
        })
    }

    fn merge_cells(&self, p: &CellRangeParams) -> BackendResult<String> {
        self.record(format!("merge_cells {}", p.range()))
    }

    fn unmerge_cells(&self, p: &CellRangeParams) -> BackendResult<String> {
        self.record(format!("unmerge_cells {}", p.range()))
    }

    fn copy_range(&self, p: &CopyRangeParams) -> BackendResult<String> {
        self.record(format!(
            "copy_range {}:{} -> {:?}!{}",
            p.source_start, p.source_end, p.target_sheet, p.target_start
        ))
    }

    fn delete_range(&self, p: &DeleteRangeParams) -> BackendResult<String> {
        self.record(format!(
            "delete_range {}:{} {}",
            p.start_cell, p.end_cell, p.shift_direction
        ))
    }

    fn validate_range(&self, p: &ValidateRangeParams) -> BackendResult<String> {
        self.record(format!("validate_range {}", p.range))
    }
}
