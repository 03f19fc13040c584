//! Backend engine seam.
//!
//! Every tool maps to exactly one method here. Implementations are
//! synchronous and are driven from a blocking worker by the router.

pub mod address;
pub mod umya;

use crate::errors::BackendResult;
use crate::paths::WorkbookPath;
use crate::tools::{
    CellRangeParams, ChartParams, CopyRangeParams, CopySheetParams, DeleteRangeParams,
    FormatRangeParams, FormulaParams, PivotParams, ReadDataParams, RenameSheetParams, SheetParams,
    ValidateRangeParams, WorkbookParams, WriteDataParams,
};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

pub use self::umya::UmyaBackend;

pub trait WorkbookBackend: Send + Sync {
    fn apply_formula(&self, params: &FormulaParams) -> BackendResult<String>;
    fn validate_formula(&self, params: &FormulaParams) -> BackendResult<String>;
    fn format_range(&self, params: &FormatRangeParams) -> BackendResult<String>;
    fn read_data(&self, params: &ReadDataParams) -> BackendResult<Vec<Vec<CellValue>>>;
    fn write_data(&self, params: &WriteDataParams) -> BackendResult<String>;
    fn create_workbook(&self, params: &WorkbookParams) -> BackendResult<()>;
    fn create_worksheet(&self, params: &SheetParams) -> BackendResult<String>;
    fn create_chart(&self, params: &ChartParams) -> BackendResult<String>;
    fn create_pivot_table(&self, params: &PivotParams) -> BackendResult<String>;
    fn copy_worksheet(&self, params: &CopySheetParams) -> BackendResult<String>;
    fn delete_worksheet(&self, params: &SheetParams) -> BackendResult<String>;
    fn rename_worksheet(&self, params: &RenameSheetParams) -> BackendResult<String>;
    fn workbook_metadata(
        &self,
        path: &WorkbookPath,
        include_ranges: bool,
    ) -> BackendResult<WorkbookMetadata>;
    fn merge_cells(&self, params: &CellRangeParams) -> BackendResult<String>;
    fn unmerge_cells(&self, params: &CellRangeParams) -> BackendResult<String>;
    fn copy_range(&self, params: &CopyRangeParams) -> BackendResult<String>;
    fn delete_range(&self, params: &DeleteRangeParams) -> BackendResult<String>;
    fn validate_range(&self, params: &ValidateRangeParams) -> BackendResult<String>;
}

/// A single cell as returned by data reads.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text used for grouping keys and labels.
    pub fn label(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string().to_ascii_uppercase(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRange {
    pub name: String,
    pub refers_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookMetadata {
    pub filename: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    pub sheets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_ranges: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_ranges: Option<Vec<NamedRange>>,
}
