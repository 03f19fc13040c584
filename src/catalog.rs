//! Static registry of the tools this server advertises.
//!
//! The descriptor for a tool is also what the argument reader consults for
//! its required set and defaults, so the advertised schema and the enforced
//! contract come from one place.

use crate::errors::DomainErrorKind;
use once_cell::sync::Lazy;
use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    ApplyFormula,
    ValidateFormulaSyntax,
    FormatRange,
    ReadDataFromExcel,
    WriteDataToExcel,
    CreateWorkbook,
    CreateWorksheet,
    CreateChart,
    CreatePivotTable,
    CopyWorksheet,
    DeleteWorksheet,
    RenameWorksheet,
    GetWorkbookMetadata,
    MergeCells,
    UnmergeCells,
    CopyRange,
    DeleteRange,
    ValidateExcelRange,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Domain error kinds rendered as ordinary failures for this tool. Any
    /// other kind escapes to the outer boundary.
    pub fn handled_errors(self) -> &'static [DomainErrorKind] {
        use DomainErrorKind::*;
        match self {
            Self::ApplyFormula | Self::ValidateFormulaSyntax => &[Validation, Calculation],
            Self::FormatRange => &[Validation, Formatting],
            // Reports every failure under its own context instead.
            Self::ReadDataFromExcel => &[],
            Self::WriteDataToExcel => &[Validation, Data],
            Self::CreateWorkbook | Self::GetWorkbookMetadata => &[Workbook],
            Self::CreateWorksheet => &[Validation, Workbook],
            Self::CreateChart => &[Validation, Chart],
            Self::CreatePivotTable => &[Validation, Pivot],
            Self::CopyWorksheet
            | Self::DeleteWorksheet
            | Self::RenameWorksheet
            | Self::MergeCells
            | Self::UnmergeCells
            | Self::CopyRange
            | Self::DeleteRange => &[Validation, Sheet],
            Self::ValidateExcelRange => &[Validation],
        }
    }

    /// Tools that report every backend failure themselves, worker panics
    /// included, as `Error <context>: <message>`.
    pub fn failure_context(self) -> Option<&'static str> {
        match self {
            Self::ReadDataFromExcel => Some("reading data"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A workbook location, resolved against the excel root during decode.
    FilePath,
    String,
    Boolean,
    Integer,
    StringList,
    Rows,
    Object,
}

impl ParamKind {
    pub fn expected(self) -> &'static str {
        match self {
            Self::FilePath | Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::StringList => "an array of strings",
            Self::Rows => "an array of rows",
            Self::Object => "an object",
        }
    }

    fn schema(self) -> Value {
        match self {
            Self::FilePath | Self::String => json!({ "type": "string" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            Self::Rows => json!({ "type": "array", "items": { "type": "array" } }),
            Self::Object => json!({ "type": "object" }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    pub default: Option<Value>,
}

impl ParamSpec {
    fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            default: None,
        }
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    pub fn input_schema(&self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        for param in &self.params {
            let mut schema = param.kind.schema();
            if let Value::Object(obj) = &mut schema {
                obj.insert("description".into(), json!(param.description));
                if let Some(default) = &param.default {
                    obj.insert("default".into(), default.clone());
                }
            }
            properties.insert(param.name.to_string(), schema);
        }
        let required: Vec<&str> = self.required_params().map(|p| p.name).collect();

        let mut schema = JsonObject::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(
            self.name.as_str(),
            self.description,
            Arc::new(self.input_schema()),
        )
    }
}

static CATALOG: Lazy<Vec<ToolDescriptor>> = Lazy::new(|| ToolName::iter().map(describe).collect());

/// Every advertised tool, in declaration order.
pub fn catalog() -> &'static [ToolDescriptor] {
    &CATALOG
}

pub fn descriptor(tool: ToolName) -> &'static ToolDescriptor {
    &CATALOG[tool as usize]
}

pub fn list_tools() -> Vec<Tool> {
    catalog().iter().map(ToolDescriptor::to_tool).collect()
}

fn filepath() -> ParamSpec {
    ParamSpec::required("filepath", ParamKind::FilePath, "Path to Excel file")
}

fn sheet_name(description: &'static str) -> ParamSpec {
    ParamSpec::required("sheet_name", ParamKind::String, description)
}

fn describe(name: ToolName) -> ToolDescriptor {
    use ParamKind::*;

    let (description, params) = match name {
        ToolName::ApplyFormula => (
            "Apply Excel formula to cell",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("cell", String, "Cell reference (e.g., A1)"),
                ParamSpec::required("formula", String, "Excel formula to apply"),
            ],
        ),
        ToolName::ValidateFormulaSyntax => (
            "Validate Excel formula syntax without applying it",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("cell", String, "Cell reference (e.g., A1)"),
                ParamSpec::required("formula", String, "Excel formula to validate"),
            ],
        ),
        ToolName::FormatRange => (
            "Apply formatting to a range of cells",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("start_cell", String, "Start cell of range"),
                ParamSpec::optional("end_cell", String, "End cell of range"),
                ParamSpec::optional("bold", Boolean, "Apply bold formatting")
                    .with_default(json!(false)),
                ParamSpec::optional("italic", Boolean, "Apply italic formatting")
                    .with_default(json!(false)),
                ParamSpec::optional("underline", Boolean, "Apply underline formatting")
                    .with_default(json!(false)),
                ParamSpec::optional("font_size", Integer, "Font size"),
                ParamSpec::optional("font_color", String, "Font color (hex, e.g. FF0000)"),
                ParamSpec::optional("bg_color", String, "Background color (hex)"),
                ParamSpec::optional(
                    "border_style",
                    String,
                    "Border style: thin, medium, thick, dashed, dotted, double or none",
                ),
                ParamSpec::optional("border_color", String, "Border color (hex)"),
                ParamSpec::optional("number_format", String, "Number format code"),
                ParamSpec::optional(
                    "alignment",
                    String,
                    "Horizontal alignment: left, center, right, justify or general",
                ),
                ParamSpec::optional("wrap_text", Boolean, "Wrap text in cells")
                    .with_default(json!(false)),
                ParamSpec::optional("merge_cells", Boolean, "Merge the range")
                    .with_default(json!(false)),
                ParamSpec::optional(
                    "conditional_format",
                    Object,
                    "Conditional format rule: {type: cell_is|expression, operator, formula, fill_color, font_color, bold}",
                ),
            ],
        ),
        ToolName::ReadDataFromExcel => (
            "Read data from Excel worksheet",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::optional("start_cell", String, "Start cell of range (default: A1)")
                    .with_default(json!("A1")),
                ParamSpec::optional("end_cell", String, "End cell of range"),
                ParamSpec::optional("preview_only", Boolean, "Only show preview of data")
                    .with_default(json!(false)),
            ],
        ),
        ToolName::WriteDataToExcel => (
            "Write data to Excel worksheet",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("data", Rows, "List of rows to write"),
                ParamSpec::optional("start_cell", String, "Start cell (default: A1)")
                    .with_default(json!("A1")),
                ParamSpec::optional("write_headers", Boolean, "Write headers")
                    .with_default(json!(true)),
            ],
        ),
        ToolName::CreateWorkbook => ("Create new Excel workbook", vec![filepath()]),
        ToolName::CreateWorksheet => (
            "Create new worksheet in workbook",
            vec![filepath(), sheet_name("Name of new worksheet")],
        ),
        ToolName::CreateChart => (
            "Create chart in worksheet",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("data_range", String, "Data range for chart"),
                ParamSpec::required(
                    "chart_type",
                    String,
                    "Type of chart: line, bar, pie, scatter or area",
                ),
                ParamSpec::required("target_cell", String, "Target cell for chart"),
                ParamSpec::optional("title", String, "Chart title").with_default(json!("")),
                ParamSpec::optional("x_axis", String, "X-axis label").with_default(json!("")),
                ParamSpec::optional("y_axis", String, "Y-axis label").with_default(json!("")),
            ],
        ),
        ToolName::CreatePivotTable => (
            "Create pivot table in worksheet",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("data_range", String, "Data range for pivot table"),
                ParamSpec::required("rows", StringList, "Row fields"),
                ParamSpec::required("values", StringList, "Value fields"),
                ParamSpec::optional("columns", StringList, "Column fields")
                    .with_default(json!([])),
                ParamSpec::optional(
                    "agg_func",
                    String,
                    "Aggregation function: sum, mean, count, min or max",
                )
                .with_default(json!("mean")),
            ],
        ),
        ToolName::CopyWorksheet => (
            "Copy worksheet within workbook",
            vec![
                filepath(),
                ParamSpec::required("source_sheet", String, "Source worksheet name"),
                ParamSpec::required("target_sheet", String, "Target worksheet name"),
            ],
        ),
        ToolName::DeleteWorksheet => (
            "Delete worksheet from workbook",
            vec![filepath(), sheet_name("Name of worksheet to delete")],
        ),
        ToolName::RenameWorksheet => (
            "Rename worksheet in workbook",
            vec![
                filepath(),
                ParamSpec::required("old_name", String, "Current worksheet name"),
                ParamSpec::required("new_name", String, "New worksheet name"),
            ],
        ),
        ToolName::GetWorkbookMetadata => (
            "Get metadata about workbook including sheets, ranges, etc.",
            vec![
                filepath(),
                ParamSpec::optional("include_ranges", Boolean, "Include named ranges")
                    .with_default(json!(false)),
            ],
        ),
        ToolName::MergeCells => (
            "Merge a range of cells",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("start_cell", String, "Start cell of range"),
                ParamSpec::required("end_cell", String, "End cell of range"),
            ],
        ),
        ToolName::UnmergeCells => (
            "Unmerge a range of cells",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("start_cell", String, "Start cell of range"),
                ParamSpec::required("end_cell", String, "End cell of range"),
            ],
        ),
        ToolName::CopyRange => (
            "Copy a range of cells to another location",
            vec![
                filepath(),
                sheet_name("Source worksheet name"),
                ParamSpec::required("source_start", String, "Source start cell"),
                ParamSpec::required("source_end", String, "Source end cell"),
                ParamSpec::required("target_start", String, "Target start cell"),
                ParamSpec::optional("target_sheet", String, "Target worksheet name"),
            ],
        ),
        ToolName::DeleteRange => (
            "Delete a range of cells and shift remaining cells",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("start_cell", String, "Start cell of range"),
                ParamSpec::required("end_cell", String, "End cell of range"),
                ParamSpec::optional(
                    "shift_direction",
                    String,
                    "Direction to shift cells (up/left)",
                )
                .with_default(json!("up")),
            ],
        ),
        ToolName::ValidateExcelRange => (
            "Validate if a range exists and is properly formatted",
            vec![
                filepath(),
                sheet_name("Name of worksheet"),
                ParamSpec::required("start_cell", String, "Start cell of range"),
                ParamSpec::optional("end_cell", String, "End cell of range"),
            ],
        ),
    };

    ToolDescriptor {
        name,
        description,
        params,
    }
}
