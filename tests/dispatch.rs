use std::sync::Arc;

use excel_mcp_server::ExcelMcpServer;
use excel_mcp_server::catalog::{ToolName, catalog, descriptor, list_tools};
use excel_mcp_server::errors::DomainError;
use serde_json::json;
use strum::IntoEnumIterator;

mod support;
use support::backend::{Behavior, RecordingBackend};

fn server_with(workspace: &support::TestWorkspace, backend: Arc<RecordingBackend>) -> ExcelMcpServer {
    ExcelMcpServer::from_state(workspace.app_state_with_backend(backend))
}

#[test]
fn catalog_lists_every_tool_once() {
    let tools = list_tools();
    assert_eq!(tools.len(), 18);
    let mut names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 18);
    assert!(names.contains(&"create_pivot_table".to_string()));
}

#[test]
fn every_schema_is_an_object_with_required_list() {
    for desc in catalog() {
        let schema = desc.input_schema();
        assert_eq!(schema["type"], "object", "{}", desc.name);
        let required = schema["required"].as_array().expect("required array");
        assert!(required.contains(&json!("filepath")), "{}", desc.name);
        for name in required {
            assert!(
                schema["properties"].get(name.as_str().unwrap()).is_some(),
                "{} declares required {} without a property",
                desc.name,
                name
            );
        }
    }
}

#[tokio::test]
async fn missing_required_parameters_never_reach_backend() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::new());
    let server = server_with(&workspace, backend.clone());

    for tool in ToolName::iter() {
        let desc = descriptor(tool);
        for missing in desc.required_params().map(|param| param.name) {
            let mut args = support::full_args(tool.as_str());
            args.as_object_mut().unwrap().remove(missing);
            let reply = server.handle_tool_call(tool.as_str(), args.as_object()).await;
            assert_eq!(
                reply, "Error: Missing required parameters",
                "{tool} without {missing}"
            );
        }

        let mut blank = support::full_args(tool.as_str());
        blank["filepath"] = json!("");
        let reply = server.handle_tool_call(tool.as_str(), blank.as_object()).await;
        assert_eq!(reply, "Error: Missing required parameters", "{tool} blank filepath");
    }

    assert!(backend.calls().is_empty(), "backend saw {:?}", backend.calls());
}

#[tokio::test]
async fn full_arguments_dispatch_exactly_once() {
    let workspace = support::TestWorkspace::new();
    for tool in ToolName::iter() {
        let backend = Arc::new(RecordingBackend::new());
        let server = server_with(&workspace, backend.clone());
        let args = support::full_args(tool.as_str());
        let reply = server.handle_tool_call(tool.as_str(), args.as_object()).await;
        assert!(!reply.starts_with("Error"), "{tool}: {reply}");
        assert_eq!(backend.calls().len(), 1, "{tool}");
    }
}

#[tokio::test]
async fn unknown_tool_is_reported_by_name() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::new());
    let server = server_with(&workspace, backend.clone());

    let reply = server
        .handle_tool_call("drop_table", json!({ "filepath": "x.xlsx" }).as_object())
        .await;
    assert_eq!(reply, "Unknown tool: drop_table");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn defaults_are_filled_before_dispatch() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::new());
    let server = server_with(&workspace, backend.clone());

    server
        .handle_tool_call(
            "create_pivot_table",
            json!({
                "filepath": "book.xlsx",
                "sheet_name": "Sheet1",
                "data_range": "A1:C5",
                "rows": ["Region"],
                "values": ["Sales"],
            })
            .as_object(),
        )
        .await;
    server
        .handle_tool_call(
            "delete_range",
            json!({ "filepath": "book.xlsx", "sheet_name": "Sheet1", "start_cell": "A1", "end_cell": "B2" })
                .as_object(),
        )
        .await;
    server
        .handle_tool_call(
            "create_chart",
            json!({
                "filepath": "book.xlsx",
                "sheet_name": "Sheet1",
                "data_range": "A1:B5",
                "chart_type": "bar",
                "target_cell": "D2",
            })
            .as_object(),
        )
        .await;

    assert_eq!(
        backend.calls(),
        vec![
            "create_pivot_table rows=[\"Region\"] columns=[] agg=mean".to_string(),
            "delete_range A1:B2 up".to_string(),
            "create_chart bar title=\"\"".to_string(),
        ]
    );
}

#[tokio::test]
async fn relative_paths_resolve_against_root() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::new());
    let server = server_with(&workspace, backend.clone());

    let reply = server
        .handle_tool_call("create_workbook", json!({ "filepath": "nested/out.xlsx" }).as_object())
        .await;
    let expected = workspace.path("nested/out.xlsx");
    assert_eq!(reply, format!("Created workbook at {}", expected.display()));
    assert_eq!(
        backend.calls(),
        vec![format!("create_workbook {}", expected.display())]
    );
}

#[tokio::test]
async fn loosely_typed_values_are_coerced() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::new());
    let server = server_with(&workspace, backend.clone());

    let reply = server
        .handle_tool_call(
            "read_data_from_excel",
            json!({ "filepath": "book.xlsx", "sheet_name": "Sheet1", "preview_only": "true" })
                .as_object(),
        )
        .await;
    assert_eq!(reply, "[\"a\",1]");
    assert_eq!(backend.calls(), vec!["read_data A1 preview=true".to_string()]);

    let reply = server
        .handle_tool_call(
            "read_data_from_excel",
            json!({ "filepath": "book.xlsx", "sheet_name": "Sheet1", "preview_only": {"x": 1} })
                .as_object(),
        )
        .await;
    assert_eq!(
        reply,
        "Error: Invalid parameter 'preview_only': expected a boolean"
    );
}

#[tokio::test]
async fn handled_domain_errors_use_plain_prefix() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::with_behavior(Behavior::Fail(
        DomainError::sheet("Sheet 'Missing' not found"),
    )));
    let server = server_with(&workspace, backend);

    let args = support::full_args("merge_cells");
    let reply = server.handle_tool_call("merge_cells", args.as_object()).await;
    assert_eq!(reply, "Error: Sheet 'Missing' not found");
}

#[tokio::test]
async fn undeclared_domain_errors_use_generic_prefix() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::with_behavior(Behavior::Fail(
        DomainError::chart("renderer offline"),
    )));
    let server = server_with(&workspace, backend);

    // merge_cells declares Validation and Sheet only.
    let args = support::full_args("merge_cells");
    let reply = server.handle_tool_call("merge_cells", args.as_object()).await;
    assert_eq!(reply, "Error executing tool: renderer offline");

    let args = support::full_args("create_chart");
    let reply = server.handle_tool_call("create_chart", args.as_object()).await;
    assert_eq!(reply, "Error: renderer offline");
}

#[tokio::test]
async fn panicking_backend_becomes_generic_error() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::with_behavior(Behavior::Panic));
    let server = server_with(&workspace, backend);

    let args = support::full_args("create_worksheet");
    let reply = server.handle_tool_call("create_worksheet", args.as_object()).await;
    assert!(reply.starts_with("Error executing tool:"), "{reply}");
}

#[tokio::test]
async fn lists_blanked_by_coercion_never_reach_backend() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::new());
    let server = server_with(&workspace, backend.clone());

    let mut args = support::full_args("create_pivot_table");
    args["rows"] = json!(" , ");
    let reply = server
        .handle_tool_call("create_pivot_table", args.as_object())
        .await;
    assert_eq!(reply, "Error: Missing required parameters");

    let mut args = support::full_args("create_pivot_table");
    args["values"] = json!(",");
    let reply = server
        .handle_tool_call("create_pivot_table", args.as_object())
        .await;
    assert_eq!(reply, "Error: Missing required parameters");

    assert!(backend.calls().is_empty(), "{:?}", backend.calls());
}

#[tokio::test]
async fn read_data_reports_every_failure_under_its_own_prefix() {
    let workspace = support::TestWorkspace::new();
    let backend = Arc::new(RecordingBackend::with_behavior(Behavior::Fail(
        DomainError::workbook("Failed to open workbook ghost.xlsx"),
    )));
    let server = server_with(&workspace, backend);

    let args = support::full_args("read_data_from_excel");
    let reply = server
        .handle_tool_call("read_data_from_excel", args.as_object())
        .await;
    assert_eq!(reply, "Error reading data: Failed to open workbook ghost.xlsx");

    let backend = Arc::new(RecordingBackend::with_behavior(Behavior::Panic));
    let server = server_with(&workspace, backend);
    let reply = server
        .handle_tool_call("read_data_from_excel", args.as_object())
        .await;
    assert!(reply.starts_with("Error reading data:"), "{reply}");

    // Missing parameters are still rejected before the backend runs.
    let reply = server
        .handle_tool_call(
            "read_data_from_excel",
            json!({ "filepath": "book.xlsx" }).as_object(),
        )
        .await;
    assert_eq!(reply, "Error: Missing required parameters");
}
