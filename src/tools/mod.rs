pub mod args;
pub mod param_enums;

use crate::catalog::{ToolName, descriptor};
use args::decode_params;
use crate::errors::RequestError;
use crate::paths::{PathResolver, WorkbookPath};
use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct FormulaParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub cell: String,
    pub formula: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatRangeParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub start_cell: String,
    pub end_cell: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size: Option<u32>,
    pub font_color: Option<String>,
    pub bg_color: Option<String>,
    pub border_style: Option<String>,
    pub border_color: Option<String>,
    pub number_format: Option<String>,
    pub alignment: Option<String>,
    pub wrap_text: bool,
    pub merge_cells: bool,
    pub conditional_format: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadDataParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub start_cell: String,
    pub end_cell: Option<String>,
    pub preview_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteDataParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    /// Rows as supplied; each row is checked for shape by the backend.
    pub data: Vec<Value>,
    pub start_cell: String,
    pub write_headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkbookParams {
    pub filepath: WorkbookPath,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub data_range: String,
    pub chart_type: String,
    pub target_cell: String,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PivotParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub data_range: String,
    pub rows: Vec<String>,
    pub values: Vec<String>,
    pub columns: Vec<String>,
    pub agg_func: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopySheetParams {
    pub filepath: WorkbookPath,
    pub source_sheet: String,
    pub target_sheet: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameSheetParams {
    pub filepath: WorkbookPath,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataParams {
    pub filepath: WorkbookPath,
    pub include_ranges: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellRangeParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub start_cell: String,
    pub end_cell: String,
}

impl CellRangeParams {
    pub fn range(&self) -> String {
        combine_range(&self.start_cell, Some(&self.end_cell))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopyRangeParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub source_start: String,
    pub source_end: String,
    pub target_start: String,
    pub target_sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRangeParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub start_cell: String,
    pub end_cell: String,
    pub shift_direction: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ValidateRangeInput {
    filepath: WorkbookPath,
    sheet_name: String,
    start_cell: String,
    end_cell: Option<String>,
}

/// Range validation works on a single combined token (`A1` or `A1:B2`).
#[derive(Debug, Clone)]
pub struct ValidateRangeParams {
    pub filepath: WorkbookPath,
    pub sheet_name: String,
    pub range: String,
}

impl From<ValidateRangeInput> for ValidateRangeParams {
    fn from(input: ValidateRangeInput) -> Self {
        let range = combine_range(&input.start_cell, input.end_cell.as_deref());
        Self {
            filepath: input.filepath,
            sheet_name: input.sheet_name,
            range,
        }
    }
}

pub fn combine_range(start: &str, end: Option<&str>) -> String {
    match end.map(str::trim).filter(|end| !end.is_empty()) {
        Some(end) => format!("{}:{}", start.trim(), end),
        None => start.trim().to_string(),
    }
}

/// A decoded, strongly typed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    ApplyFormula(FormulaParams),
    ValidateFormulaSyntax(FormulaParams),
    FormatRange(FormatRangeParams),
    ReadData(ReadDataParams),
    WriteData(WriteDataParams),
    CreateWorkbook(WorkbookParams),
    CreateWorksheet(SheetParams),
    CreateChart(ChartParams),
    CreatePivotTable(PivotParams),
    CopyWorksheet(CopySheetParams),
    DeleteWorksheet(SheetParams),
    RenameWorksheet(RenameSheetParams),
    GetWorkbookMetadata(MetadataParams),
    MergeCells(CellRangeParams),
    UnmergeCells(CellRangeParams),
    CopyRange(CopyRangeParams),
    DeleteRange(DeleteRangeParams),
    ValidateExcelRange(ValidateRangeParams),
}

impl ToolCall {
    pub fn decode(
        name: &str,
        raw: Option<&JsonObject>,
        resolver: &PathResolver,
    ) -> Result<Self, RequestError> {
        let tool = ToolName::parse(name).ok_or_else(|| RequestError::UnknownTool(name.into()))?;
        let descriptor = descriptor(tool);
        let prepared = args::prepare_arguments(descriptor, raw, resolver)?;

        let call = match tool {
            ToolName::ApplyFormula => Self::ApplyFormula(decode_params(descriptor, prepared)?),
            ToolName::ValidateFormulaSyntax => {
                Self::ValidateFormulaSyntax(decode_params(descriptor, prepared)?)
            }
            ToolName::FormatRange => Self::FormatRange(decode_params(descriptor, prepared)?),
            ToolName::ReadDataFromExcel => Self::ReadData(decode_params(descriptor, prepared)?),
            ToolName::WriteDataToExcel => Self::WriteData(decode_params(descriptor, prepared)?),
            ToolName::CreateWorkbook => Self::CreateWorkbook(decode_params(descriptor, prepared)?),
            ToolName::CreateWorksheet => {
                Self::CreateWorksheet(decode_params(descriptor, prepared)?)
            }
            ToolName::CreateChart => Self::CreateChart(decode_params(descriptor, prepared)?),
            ToolName::CreatePivotTable => {
                Self::CreatePivotTable(decode_params(descriptor, prepared)?)
            }
            ToolName::CopyWorksheet => Self::CopyWorksheet(decode_params(descriptor, prepared)?),
            ToolName::DeleteWorksheet => {
                Self::DeleteWorksheet(decode_params(descriptor, prepared)?)
            }
            ToolName::RenameWorksheet => {
                Self::RenameWorksheet(decode_params(descriptor, prepared)?)
            }
            ToolName::GetWorkbookMetadata => {
                Self::GetWorkbookMetadata(decode_params(descriptor, prepared)?)
            }
            ToolName::MergeCells => Self::MergeCells(decode_params(descriptor, prepared)?),
            ToolName::UnmergeCells => Self::UnmergeCells(decode_params(descriptor, prepared)?),
            ToolName::CopyRange => Self::CopyRange(decode_params(descriptor, prepared)?),
            ToolName::DeleteRange => Self::DeleteRange(decode_params(descriptor, prepared)?),
            ToolName::ValidateExcelRange => {
                let input: ValidateRangeInput = decode_params(descriptor, prepared)?;
                Self::ValidateExcelRange(input.into())
            }
        };
        Ok(call)
    }

    pub fn tool(&self) -> ToolName {
        match self {
            Self::ApplyFormula(_) => ToolName::ApplyFormula,
            Self::ValidateFormulaSyntax(_) => ToolName::ValidateFormulaSyntax,
            Self::FormatRange(_) => ToolName::FormatRange,
            Self::ReadData(_) => ToolName::ReadDataFromExcel,
            Self::WriteData(_) => ToolName::WriteDataToExcel,
            Self::CreateWorkbook(_) => ToolName::CreateWorkbook,
            Self::CreateWorksheet(_) => ToolName::CreateWorksheet,
            Self::CreateChart(_) => ToolName::CreateChart,
            Self::CreatePivotTable(_) => ToolName::CreatePivotTable,
            Self::CopyWorksheet(_) => ToolName::CopyWorksheet,
            Self::DeleteWorksheet(_) => ToolName::DeleteWorksheet,
            Self::RenameWorksheet(_) => ToolName::RenameWorksheet,
            Self::GetWorkbookMetadata(_) => ToolName::GetWorkbookMetadata,
            Self::MergeCells(_) => ToolName::MergeCells,
            Self::UnmergeCells(_) => ToolName::UnmergeCells,
            Self::CopyRange(_) => ToolName::CopyRange,
            Self::DeleteRange(_) => ToolName::DeleteRange,
            Self::ValidateExcelRange(_) => ToolName::ValidateExcelRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn decode(name: &str, args: Value) -> Result<ToolCall, RequestError> {
        let resolver = PathResolver::new("/data");
        ToolCall::decode(name, args.as_object(), &resolver)
    }

    #[test]
    fn validate_range_combines_start_and_end() {
        let call = decode(
            "validate_excel_range",
            json!({ "filepath": "a.xlsx", "sheet_name": "S", "start_cell": "A1", "end_cell": "B2" }),
        )
        .unwrap();
        assert_matches!(call, ToolCall::ValidateExcelRange(p) if p.range == "A1:B2");

        let call = decode(
            "validate_excel_range",
            json!({ "filepath": "a.xlsx", "sheet_name": "S", "start_cell": "A1" }),
        )
        .unwrap();
        assert_matches!(call, ToolCall::ValidateExcelRange(p) if p.range == "A1");
    }

    #[test]
    fn pivot_defaults_apply() {
        let call = decode(
            "create_pivot_table",
            json!({
                "filepath": "a.xlsx",
                "sheet_name": "S",
                "data_range": "A1:C5",
                "rows": ["Region"],
                "values": ["Sales"],
            }),
        )
        .unwrap();
        assert_matches!(call, ToolCall::CreatePivotTable(p) => {
            assert!(p.columns.is_empty());
            assert_eq!(p.agg_func, "mean");
            assert_eq!(p.filepath.as_path(), std::path::Path::new("/data/a.xlsx"));
        });
    }

    #[test]
    fn unknown_names_are_reported_verbatim() {
        assert_matches!(
            decode("drop_tables", json!({})),
            Err(RequestError::UnknownTool(name)) if name == "drop_tables"
        );
    }

    #[test]
    fn missing_arguments_object_is_missing_parameters() {
        let resolver = PathResolver::new("/data");
        assert_matches!(
            ToolCall::decode("create_workbook", None, &resolver),
            Err(RequestError::MissingParameters { names, .. }) if names == vec!["filepath"]
        );
    }
}
