//! Decodes a tool call, runs it on the backend and classifies the outcome.

use crate::backend::WorkbookBackend;
use crate::errors::BackendResult;
use crate::state::AppState;
use crate::tools::ToolCall;
use crate::translate::{OperationResult, Success};
use anyhow::{Result, anyhow};
use rmcp::model::JsonObject;
use std::sync::Arc;
use tokio::task;

/// `Ok` carries every outcome the tool declares, including its handled
/// error kinds and, for tools with a failure context, every failure. `Err` is reserved for failures the tool does not expect;
/// the server boundary renders those with the generic prefix.
pub async fn dispatch(
    state: Arc<AppState>,
    name: &str,
    arguments: Option<&JsonObject>,
) -> Result<OperationResult> {
    let call = match ToolCall::decode(name, arguments, state.resolver()) {
        Ok(call) => call,
        Err(error) => {
            tracing::debug!(tool = name, error = %error, "tool call rejected");
            return Ok(error.into());
        }
    };
    let tool = call.tool();
    let backend = state.backend();

    let context = tool.failure_context();
    let outcome = task::spawn_blocking(move || execute(backend.as_ref(), call)).await;
    let outcome = match (outcome, context) {
        (Ok(outcome), _) => outcome,
        (Err(e), Some(context)) => {
            tracing::error!(tool = %tool, error = %e, "tool worker failed");
            return Ok(OperationResult::reported(context, e.to_string()));
        }
        (Err(e), None) => return Err(anyhow!("{tool} worker failed: {e}")),
    };

    match (outcome, context) {
        (Ok(success), _) => Ok(success.into()),
        (Err(error), Some(context)) => {
            tracing::debug!(tool = %tool, kind = %error.kind(), "tool reported error");
            Ok(OperationResult::reported(context, error.message()))
        }
        (Err(error), None) if tool.handled_errors().contains(&error.kind()) => {
            tracing::debug!(tool = %tool, kind = %error.kind(), "tool reported error");
            Ok(error.into())
        }
        (Err(error), None) => Err(anyhow::Error::new(error)),
    }
}

pub fn execute(backend: &dyn WorkbookBackend, call: ToolCall) -> BackendResult<Success> {
    let message = match call {
        ToolCall::ApplyFormula(p) => backend.apply_formula(&p)?,
        ToolCall::ValidateFormulaSyntax(p) => backend.validate_formula(&p)?,
        ToolCall::FormatRange(p) => backend.format_range(&p)?,
        ToolCall::ReadData(p) => return backend.read_data(&p).map(|rows| Success::rows(&rows)),
        ToolCall::WriteData(p) => backend.write_data(&p)?,
        ToolCall::CreateWorkbook(p) => {
            backend.create_workbook(&p)?;
            return Ok(Success::created_workbook(&p.filepath));
        }
        ToolCall::CreateWorksheet(p) => backend.create_worksheet(&p)?,
        ToolCall::CreateChart(p) => backend.create_chart(&p)?,
        ToolCall::CreatePivotTable(p) => backend.create_pivot_table(&p)?,
        ToolCall::CopyWorksheet(p) => backend.copy_worksheet(&p)?,
        ToolCall::DeleteWorksheet(p) => backend.delete_worksheet(&p)?,
        ToolCall::RenameWorksheet(p) => backend.rename_worksheet(&p)?,
        ToolCall::GetWorkbookMetadata(p) => {
            return backend
                .workbook_metadata(&p.filepath, p.include_ranges)
                .map(|metadata| Success::metadata(&metadata));
        }
        ToolCall::MergeCells(p) => backend.merge_cells(&p)?,
        ToolCall::UnmergeCells(p) => backend.unmerge_cells(&p)?,
        ToolCall::CopyRange(p) => backend.copy_range(&p)?,
        ToolCall::DeleteRange(p) => backend.delete_range(&p)?,
        ToolCall::ValidateExcelRange(p) => backend.validate_range(&p)?,
    };
    Ok(Success::message(message))
}
