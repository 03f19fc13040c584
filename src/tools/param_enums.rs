use crate::errors::{BackendResult, DomainError};
use std::fmt;
use umya_spreadsheet::ConditionalFormattingOperatorValues;
use umya_spreadsheet::structs::{ChartType, HorizontalAlignmentValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Scatter,
    Area,
}

impl ChartKind {
    pub fn parse(raw: &str) -> BackendResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "bar" | "column" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            "scatter" => Ok(Self::Scatter),
            "area" => Ok(Self::Area),
            other => Err(DomainError::validation(format!(
                "Unsupported chart type: {other}. Supported types: line, bar, pie, scatter, area"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Area => "area",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Pie => "Pie",
            Self::Scatter => "Scatter",
            Self::Area => "Area",
        }
    }

    pub fn to_umya(self) -> ChartType {
        match self {
            Self::Line => ChartType::LineChart,
            Self::Bar => ChartType::BarChart,
            Self::Pie => ChartType::PieChart,
            Self::Scatter => ChartType::ScatterChart,
            Self::Area => ChartType::AreaChart,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggFunc {
    Sum,
    #[default]
    Mean,
    Count,
    Min,
    Max,
}

impl AggFunc {
    pub fn parse(raw: &str) -> BackendResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" | "average" | "avg" => Ok(Self::Mean),
            "count" => Ok(Self::Count),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(DomainError::validation(format!(
                "Invalid aggregation function: {other}. Must be one of: sum, mean, average, count, min, max"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// `None` when there is nothing to aggregate (no numeric input, except for count).
    pub fn apply(self, numbers: &[f64], non_empty: usize) -> Option<f64> {
        match self {
            Self::Count => Some(non_empty as f64),
            _ if numbers.is_empty() => None,
            Self::Sum => Some(numbers.iter().sum()),
            Self::Mean => Some(numbers.iter().sum::<f64>() / numbers.len() as f64),
            Self::Min => numbers.iter().copied().reduce(f64::min),
            Self::Max => numbers.iter().copied().reduce(f64::max),
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftDirection {
    #[default]
    Up,
    Left,
}

impl ShiftDirection {
    pub fn parse(raw: &str) -> BackendResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "left" => Ok(Self::Left),
            other => Err(DomainError::validation(format!(
                "Invalid shift direction: {other}. Must be 'up' or 'left'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    None,
}

impl BorderStyle {
    pub fn parse(raw: &str) -> BackendResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "thin" => Ok(Self::Thin),
            "medium" => Ok(Self::Medium),
            "thick" => Ok(Self::Thick),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "double" => Ok(Self::Double),
            "none" => Ok(Self::None),
            other => Err(DomainError::formatting(format!(
                "Invalid border style: {other}"
            ))),
        }
    }

    /// OOXML border style attribute value.
    pub fn as_ooxml(self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
    Right,
    Justify,
}

impl HorizontalAlign {
    pub fn parse(raw: &str) -> BackendResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "justify" => Ok(Self::Justify),
            other => Err(DomainError::formatting(format!(
                "Invalid alignment: {other}"
            ))),
        }
    }

    pub fn to_umya(self) -> HorizontalAlignmentValues {
        match self {
            Self::General => HorizontalAlignmentValues::General,
            Self::Left => HorizontalAlignmentValues::Left,
            Self::Center => HorizontalAlignmentValues::Center,
            Self::Right => HorizontalAlignmentValues::Right,
            Self::Justify => HorizontalAlignmentValues::Justify,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
    NotBetween,
}

impl CfOperator {
    pub fn parse(raw: &str) -> BackendResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "equal" | "eq" | "=" => Ok(Self::Equal),
            "not_equal" | "ne" | "<>" => Ok(Self::NotEqual),
            "greater_than" | "gt" | ">" => Ok(Self::GreaterThan),
            "greater_than_or_equal" | "gte" | ">=" => Ok(Self::GreaterThanOrEqual),
            "less_than" | "lt" | "<" => Ok(Self::LessThan),
            "less_than_or_equal" | "lte" | "<=" => Ok(Self::LessThanOrEqual),
            "between" => Ok(Self::Between),
            "not_between" => Ok(Self::NotBetween),
            other => Err(DomainError::formatting(format!(
                "Invalid conditional format operator: {other}"
            ))),
        }
    }

    /// Single-bound operators only; range tests are written as expressions.
    pub fn cell_is_operator(self) -> Option<ConditionalFormattingOperatorValues> {
        let operator = match self {
            Self::Equal => ConditionalFormattingOperatorValues::Equal,
            Self::NotEqual => ConditionalFormattingOperatorValues::NotEqual,
            Self::GreaterThan => ConditionalFormattingOperatorValues::GreaterThan,
            Self::GreaterThanOrEqual => ConditionalFormattingOperatorValues::GreaterThanOrEqual,
            Self::LessThan => ConditionalFormattingOperatorValues::LessThan,
            Self::LessThanOrEqual => ConditionalFormattingOperatorValues::LessThanOrEqual,
            Self::Between | Self::NotBetween => return None,
        };
        Some(operator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(ChartKind::parse("BAR").unwrap(), ChartKind::Bar);
        assert_eq!(AggFunc::parse(" Average ").unwrap(), AggFunc::Mean);
        assert_eq!(ShiftDirection::parse("Left").unwrap(), ShiftDirection::Left);
    }

    #[test]
    fn range_operators_have_no_cell_is_form() {
        assert_eq!(
            CfOperator::parse(">=").unwrap().cell_is_operator(),
            Some(ConditionalFormattingOperatorValues::GreaterThanOrEqual)
        );
        assert_eq!(CfOperator::parse("between").unwrap().cell_is_operator(), None);
        assert_eq!(CfOperator::parse("not_between").unwrap().cell_is_operator(), None);
    }

    #[test]
    fn unknown_values_are_validation_errors() {
        assert_matches!(ChartKind::parse("radar"), Err(DomainError::Validation(_)));
        assert_matches!(AggFunc::parse("median"), Err(DomainError::Validation(_)));
        assert_matches!(ShiftDirection::parse("down"), Err(DomainError::Validation(_)));
        assert_matches!(BorderStyle::parse("wavy"), Err(DomainError::Formatting(_)));
    }

    #[test]
    fn aggregations() {
        let nums = [4.0, 1.0, 7.0];
        assert_eq!(AggFunc::Sum.apply(&nums, 3), Some(12.0));
        assert_eq!(AggFunc::Mean.apply(&nums, 3), Some(4.0));
        assert_eq!(AggFunc::Min.apply(&nums, 3), Some(1.0));
        assert_eq!(AggFunc::Max.apply(&nums, 3), Some(7.0));
        assert_eq!(AggFunc::Count.apply(&[], 2), Some(2.0));
        assert_eq!(AggFunc::Sum.apply(&[], 2), None);
    }
}
