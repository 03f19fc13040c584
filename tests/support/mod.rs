#![allow(dead_code)]
pub mod backend;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use excel_mcp_server::backend::WorkbookBackend;
use excel_mcp_server::state::AppState;
use excel_mcp_server::{ExcelMcpServer, ServerConfig};
use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::Spreadsheet;

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        write_workbook_to_path(&path, f);
        path
    }

    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, b"test").expect("write file");
        path
    }

    pub fn read_workbook(&self, name: &str) -> Spreadsheet {
        umya_spreadsheet::reader::xlsx::read(self.path(name)).expect("read workbook")
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            excel_root: self.root.clone(),
            ..ServerConfig::default()
        }
    }

    pub fn config_with<F>(&self, configure: F) -> ServerConfig
    where
        F: FnOnce(&mut ServerConfig),
    {
        let mut config = self.config();
        configure(&mut config);
        config
    }

    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(Arc::new(self.config())))
    }

    pub fn app_state_with_backend(&self, backend: Arc<dyn WorkbookBackend>) -> Arc<AppState> {
        Arc::new(AppState::with_backend(Arc::new(self.config()), backend))
    }

    pub fn server(&self) -> ExcelMcpServer {
        ExcelMcpServer::from_state(self.app_state())
    }

    /// Invoke a tool through the outer boundary and return the text reply.
    pub async fn call(&self, name: &str, args: Value) -> String {
        self.server().handle_tool_call(name, args.as_object()).await
    }
}

pub fn call_tool(name: &'static str, args: Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.into(),
        arguments: args.as_object().cloned(),
    }
}

pub fn text_of(result: &CallToolResult) -> String {
    let content = serde_json::to_value(&result.content).expect("serialize content");
    content
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn object(value: Value) -> JsonObject {
    value.as_object().cloned().expect("json object")
}

/// A complete, valid argument bag for every tool in the catalog.
pub fn full_args(tool: &str) -> Value {
    let base = json!({ "filepath": "book.xlsx", "sheet_name": "Sheet1" });
    let extra = match tool {
        "apply_formula" | "validate_formula_syntax" => json!({ "cell": "A1", "formula": "=1+1" }),
        "format_range" => json!({ "start_cell": "A1", "end_cell": "B2", "bold": true }),
        "read_data_from_excel" => json!({ "start_cell": "A1" }),
        "write_data_to_excel" => json!({ "data": [["a", 1]] }),
        "create_workbook" => return json!({ "filepath": "book.xlsx" }),
        "create_worksheet" | "delete_worksheet" => json!({}),
        "create_chart" => json!({ "data_range": "A1:B5", "chart_type": "line", "target_cell": "D2" }),
        "create_pivot_table" => {
            json!({ "data_range": "A1:C5", "rows": ["Region"], "values": ["Sales"] })
        }
        "copy_worksheet" => {
            return json!({ "filepath": "book.xlsx", "source_sheet": "Sheet1", "target_sheet": "Copy" });
        }
        "rename_worksheet" => {
            return json!({ "filepath": "book.xlsx", "old_name": "Sheet1", "new_name": "Data" });
        }
        "get_workbook_metadata" => return json!({ "filepath": "book.xlsx" }),
        "merge_cells" | "unmerge_cells" => json!({ "start_cell": "A1", "end_cell": "B2" }),
        "copy_range" => json!({ "source_start": "A1", "source_end": "B2", "target_start": "D1" }),
        "delete_range" => json!({ "start_cell": "A1", "end_cell": "B2" }),
        "validate_excel_range" => json!({ "start_cell": "A1", "end_cell": "B2" }),
        other => panic!("no fixture for tool {other}"),
    };
    let mut merged = base;
    if let (Some(target), Some(extra)) = (merged.as_object_mut(), extra.as_object()) {
        target.extend(extra.clone());
    }
    merged
}
