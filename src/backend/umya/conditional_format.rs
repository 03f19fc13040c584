//! Conditional formatting rules for `format_range`.

use crate::backend::address::RangeBounds;
use crate::errors::{BackendResult, DomainError};
use crate::tools::param_enums::CfOperator;
use serde::Deserialize;
use serde_json::Value;
use umya_spreadsheet::{
    ConditionalFormatValues, ConditionalFormatting, ConditionalFormattingOperatorValues,
    ConditionalFormattingRule, Formula, PatternValues, Style, Worksheet,
};

const DEFAULT_FILL: &str = "FFFFC7CE";
const DEFAULT_FONT: &str = "FF9C0006";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
enum RuleSpec {
    #[serde(alias = "cellIs", alias = "cell")]
    CellIs {
        operator: String,
        formula: FormulaArg,
        #[serde(default)]
        fill_color: Option<String>,
        #[serde(default)]
        font_color: Option<String>,
        #[serde(default)]
        bold: bool,
    },
    Expression {
        formula: FormulaArg,
        #[serde(default)]
        fill_color: Option<String>,
        #[serde(default)]
        font_color: Option<String>,
        #[serde(default)]
        bold: bool,
    },
}

/// A bound may arrive as `"100"`, `100`, or `["1", "10"]` for between rules.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct FormulaArg(Value);

impl FormulaArg {
    fn parts(&self) -> Vec<String> {
        let render = |value: &Value| match value {
            Value::String(s) => s.trim().trim_start_matches('=').to_string(),
            other => other.to_string(),
        };
        match &self.0 {
            Value::Array(items) => items.iter().map(render).collect(),
            value => vec![render(value)],
        }
    }
}

/// Parse `raw` and attach the rule to `bounds`. Colors go through `normalize`.
pub(super) fn apply_rule(
    sheet: &mut Worksheet,
    bounds: &RangeBounds,
    raw: &Value,
    normalize: impl Fn(&str) -> BackendResult<String>,
) -> BackendResult<()> {
    let spec: RuleSpec = serde_json::from_value(raw.clone())
        .map_err(|e| DomainError::formatting(format!("Invalid conditional format: {e}")))?;
    let sqref = bounds.to_string();
    let anchor = bounds.start.to_string();

    match spec {
        RuleSpec::CellIs {
            operator,
            formula,
            fill_color,
            font_color,
            bold,
        } => {
            let operator = CfOperator::parse(&operator)?;
            let parts = formula.parts();
            let wants_pair = matches!(operator, CfOperator::Between | CfOperator::NotBetween);
            let expected = if wants_pair { 2 } else { 1 };
            if parts.len() != expected || parts.iter().any(String::is_empty) {
                return Err(DomainError::formatting(format!(
                    "Conditional format operator expects {expected} formula value(s)"
                )));
            }
            let style = dxf_style(fill_color.as_deref(), font_color.as_deref(), bold, &normalize)?;
            // cellIs carries one bound in umya, so range tests become expressions
            // relative to the top-left cell.
            match (operator, operator.cell_is_operator(), parts.as_slice()) {
                (CfOperator::Between, _, [low, high]) => {
                    let expression = format!("AND({anchor}>={low},{anchor}<={high})");
                    append_expression_rule(sheet, &sqref, &expression, style);
                }
                (CfOperator::NotBetween, _, [low, high]) => {
                    let expression = format!("OR({anchor}<{low},{anchor}>{high})");
                    append_expression_rule(sheet, &sqref, &expression, style);
                }
                (_, Some(cell_is), [value]) => {
                    append_cellis_rule(sheet, &sqref, cell_is, value, style);
                }
                _ => {
                    return Err(DomainError::formatting(format!(
                        "Conditional format operator expects {expected} formula value(s)"
                    )));
                }
            }
        }
        RuleSpec::Expression {
            formula,
            fill_color,
            font_color,
            bold,
        } => {
            let parts = formula.parts();
            let [expression] = parts.as_slice() else {
                return Err(DomainError::formatting(
                    "Expression rules take exactly one formula",
                ));
            };
            if expression.is_empty() {
                return Err(DomainError::formatting("Expression rule formula is empty"));
            }
            let style = dxf_style(fill_color.as_deref(), font_color.as_deref(), bold, &normalize)?;
            append_expression_rule(sheet, &sqref, expression, style);
        }
    }
    Ok(())
}

fn dxf_style(
    fill: Option<&str>,
    font: Option<&str>,
    bold: bool,
    normalize: &impl Fn(&str) -> BackendResult<String>,
) -> BackendResult<Style> {
    let fill_argb = fill.map(normalize).transpose()?;
    let font_argb = font.map(normalize).transpose()?;
    Ok(build_dxf_style(
        fill_argb.as_deref().unwrap_or(DEFAULT_FILL),
        font_argb.as_deref().unwrap_or(DEFAULT_FONT),
        bold,
    ))
}

/// umya deduplicates `dxf` records by style hash at write time, so identical
/// inputs share one record.
fn build_dxf_style(fill_argb: &str, font_argb: &str, bold: bool) -> Style {
    let mut style = Style::default();
    style
        .get_fill_mut()
        .get_pattern_fill_mut()
        .set_pattern_type(PatternValues::Solid)
        .get_foreground_color_mut()
        .set_argb(fill_argb);

    let font = style.get_font_mut();
    font.set_bold(bold);
    font.get_color_mut().set_argb(font_argb);
    style
}

/// Priorities must be unique within a worksheet.
fn next_priority(sheet: &Worksheet) -> i32 {
    sheet
        .get_conditional_formatting_collection()
        .iter()
        .flat_map(|cf| cf.get_conditional_collection())
        .map(|rule| *rule.get_priority())
        .max()
        .unwrap_or(0)
        .saturating_add(1)
        .max(1)
}

fn push_rule(sheet: &mut Worksheet, sqref: &str, mut rule: ConditionalFormattingRule) {
    let mut cf = ConditionalFormatting::default();
    cf.get_sequence_of_references_mut().set_sqref(sqref);
    rule.set_priority(next_priority(sheet));
    cf.add_conditional_collection(rule);
    sheet.add_conditional_formatting_collection(cf);
}

fn append_expression_rule(sheet: &mut Worksheet, sqref: &str, expression: &str, style: Style) {
    let mut rule = ConditionalFormattingRule::default();
    rule.set_type(ConditionalFormatValues::Expression);
    let mut formula = Formula::default();
    formula.set_string_value(expression);
    rule.set_formula(formula);
    rule.set_style(style);
    push_rule(sheet, sqref, rule);
}

fn append_cellis_rule(
    sheet: &mut Worksheet,
    sqref: &str,
    operator: ConditionalFormattingOperatorValues,
    value: &str,
    style: Style,
) {
    let mut rule = ConditionalFormattingRule::default();
    rule.set_type(ConditionalFormatValues::CellIs);
    rule.set_operator(operator);
    let mut formula = Formula::default();
    formula.set_string_value(value);
    rule.set_formula(formula);
    rule.set_style(style);
    push_rule(sheet, sqref, rule);
}
