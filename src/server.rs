use crate::catalog;
use crate::resources;
use crate::router;
use crate::state::AppState;
use crate::translate::OperationResult;
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListResourcesResult, ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    transport::stdio,
};
use std::sync::Arc;

const INSTRUCTIONS: &str = "\
Excel MCP: create, edit and inspect .xlsx workbooks on the server's disk.

Relative filepath arguments resolve against the configured excel files directory.
Every tool answers with a single text block; failures start with 'Error'.

TYPICAL FLOW:
1) create_workbook or get_workbook_metadata to orient
2) write_data_to_excel / read_data_from_excel for cell content
3) apply_formula (validate_formula_syntax first for a dry run)
4) format_range, merge_cells, create_chart, create_pivot_table for presentation

Resources list workbooks in the root directory as excel://<name>; reading one returns its metadata.";

#[derive(Clone)]
pub struct ExcelMcpServer {
    state: Arc<AppState>,
}

impl ExcelMcpServer {
    pub fn from_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    /// Outer boundary for tool calls: never fails, always yields the text
    /// the client will see.
    pub async fn handle_tool_call(&self, name: &str, arguments: Option<&JsonObject>) -> String {
        let logged_args = arguments
            .map(|args| serde_json::Value::Object(args.clone()).to_string())
            .unwrap_or_else(|| "null".to_string());
        tracing::info!(tool = name, arguments = %logged_args, "tool invocation requested");

        match router::dispatch(self.state.clone(), name, arguments).await {
            Ok(result) => result.render(),
            Err(error) => {
                tracing::error!(tool = name, error = ?error, "tool execution failed");
                OperationResult::unexpected(error.to_string()).render()
            }
        }
    }
}

impl ServerHandler for ExcelMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(catalog::list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .handle_tool_call(&request.name, request.arguments.as_ref())
            .await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = resources::list_resources(&self.state)
            .iter()
            .map(|descriptor| descriptor.to_resource())
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = resources::read_resource(self.state.clone(), &request.uri).await;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
