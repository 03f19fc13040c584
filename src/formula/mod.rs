//! Formula parsing and relative-reference shifting on top of `formualizer-parse`.

use anyhow::{Result, anyhow, bail};
use formualizer_parse::parser::ReferenceType;
use formualizer_parse::pretty::canonical_formula;
use formualizer_parse::{ASTNode, ASTNodeType};

/// Strip surrounding whitespace and one leading `=`.
pub fn formula_body(formula: &str) -> &str {
    let trimmed = formula.trim();
    trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start()
}

/// Parse a formula with or without its leading `=`.
pub fn parse_formula(formula: &str) -> Result<ASTNode> {
    let body = formula_body(formula);
    if body.is_empty() {
        bail!("formula is empty");
    }
    formualizer_parse::parse(&format!("={body}")).map_err(|e| anyhow!("{}", e.message))
}

/// Re-emit `formula` as if it had been copied `delta_col`/`delta_row` cells away.
/// Absolute components stay put. Returned text has no leading `=`.
pub fn shift_formula(formula: &str, delta_col: i64, delta_row: i64) -> Result<String> {
    let mut ast = parse_formula(formula)?;
    if delta_col != 0 || delta_row != 0 {
        shift_refs(&mut ast, delta_col, delta_row)?;
    }
    let rendered = canonical_formula(&ast);
    Ok(rendered
        .strip_prefix('=')
        .map(str::to_string)
        .unwrap_or(rendered))
}

fn shift_refs(node: &mut ASTNode, delta_col: i64, delta_row: i64) -> Result<()> {
    match &mut node.node_type {
        ASTNodeType::Reference {
            original,
            reference,
        } => {
            shift_reference(reference, delta_col, delta_row)?;
            *original = reference.to_string();
        }
        ASTNodeType::UnaryOp { expr, .. } => shift_refs(expr, delta_col, delta_row)?,
        ASTNodeType::BinaryOp { left, right, .. } => {
            shift_refs(left, delta_col, delta_row)?;
            shift_refs(right, delta_col, delta_row)?;
        }
        ASTNodeType::Function { args, .. } => {
            for arg in args.iter_mut() {
                shift_refs(arg, delta_col, delta_row)?;
            }
        }
        ASTNodeType::Array(rows) => {
            for cell in rows.iter_mut().flat_map(|row| row.iter_mut()) {
                shift_refs(cell, delta_col, delta_row)?;
            }
        }
        ASTNodeType::Literal(_) => {}
    }
    Ok(())
}

fn shift_reference(reference: &mut ReferenceType, delta_col: i64, delta_row: i64) -> Result<()> {
    match reference {
        ReferenceType::Cell {
            row,
            col,
            row_abs,
            col_abs,
            ..
        } => {
            *col = shift_index(*col, *col_abs, delta_col)?;
            *row = shift_index(*row, *row_abs, delta_row)?;
        }
        ReferenceType::Range {
            start_row,
            start_col,
            end_row,
            end_col,
            start_row_abs,
            start_col_abs,
            end_row_abs,
            end_col_abs,
            ..
        } => {
            *start_col = shift_optional(*start_col, *start_col_abs, delta_col)?;
            *end_col = shift_optional(*end_col, *end_col_abs, delta_col)?;
            *start_row = shift_optional(*start_row, *start_row_abs, delta_row)?;
            *end_row = shift_optional(*end_row, *end_row_abs, delta_row)?;
        }
        ReferenceType::Table(_) | ReferenceType::NamedRange(_) | ReferenceType::External(_) => {}
    }
    Ok(())
}

fn shift_index(value: u32, absolute: bool, delta: i64) -> Result<u32> {
    if absolute || delta == 0 {
        return Ok(value);
    }
    let shifted = i64::from(value) + delta;
    if shifted < 1 {
        bail!("shift would move reference before A1");
    }
    u32::try_from(shifted).map_err(|_| anyhow!("shifted reference out of range"))
}

fn shift_optional(value: Option<u32>, absolute: bool, delta: i64) -> Result<Option<u32>> {
    value.map(|v| shift_index(v, absolute, delta)).transpose()
}
