use super::conditional_format;
use super::{input_sheet_mut, open_book, save_book};
use crate::backend::address::{RangeBounds, parse_cell};
use crate::errors::{BackendResult, DomainError};
use crate::tools::FormatRangeParams;
use crate::tools::param_enums::{BorderStyle, HorizontalAlign};
use umya_spreadsheet::{Border, PatternValues, Style};

/// Accepts `RRGGBB`, `#RRGGBB` or `AARRGGBB`; returns uppercase ARGB.
pub(super) fn normalize_color(raw: &str) -> BackendResult<String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DomainError::formatting(format!("Invalid color: {raw}")));
    }
    match hex.len() {
        6 => Ok(format!("FF{}", hex.to_ascii_uppercase())),
        8 => Ok(hex.to_ascii_uppercase()),
        _ => Err(DomainError::formatting(format!("Invalid color: {raw}"))),
    }
}

/// Everything `format_range` may touch, validated before the workbook is opened.
#[derive(Debug, Default)]
struct StylePlan {
    bold: bool,
    italic: bool,
    underline: bool,
    font_size: Option<f64>,
    font_color: Option<String>,
    fill_color: Option<String>,
    border: Option<(BorderStyle, Option<String>)>,
    number_format: Option<String>,
    alignment: Option<HorizontalAlign>,
    wrap_text: bool,
}

impl StylePlan {
    fn from_params(params: &FormatRangeParams) -> BackendResult<Self> {
        let color = |value: &Option<String>| -> BackendResult<Option<String>> {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(normalize_color)
                .transpose()
        };
        let border = match params.border_style.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(style) => Some((BorderStyle::parse(style)?, color(&params.border_color)?)),
            None => None,
        };
        if params.font_size == Some(0) {
            return Err(DomainError::formatting("Font size must be greater than zero"));
        }
        Ok(Self {
            bold: params.bold,
            italic: params.italic,
            underline: params.underline,
            font_size: params.font_size.map(f64::from),
            font_color: color(&params.font_color)?,
            fill_color: color(&params.bg_color)?,
            border,
            number_format: params
                .number_format
                .clone()
                .filter(|code| !code.trim().is_empty()),
            alignment: params
                .alignment
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(HorizontalAlign::parse)
                .transpose()?,
            wrap_text: params.wrap_text,
        })
    }

    fn apply(&self, style: &mut Style) {
        let font = style.get_font_mut();
        if self.bold {
            font.set_bold(true);
        }
        if self.italic {
            font.set_italic(true);
        }
        if self.underline {
            font.set_underline("single");
        }
        if let Some(size) = self.font_size {
            font.set_size(size);
        }
        if let Some(argb) = &self.font_color {
            font.get_color_mut().set_argb(argb.as_str());
        }

        if let Some(argb) = &self.fill_color {
            style
                .get_fill_mut()
                .get_pattern_fill_mut()
                .set_pattern_type(PatternValues::Solid)
                .get_foreground_color_mut()
                .set_argb(argb.as_str());
        }

        if let Some((border_style, border_color)) = &self.border {
            let paint = |edge: &mut Border| {
                edge.set_border_style(border_style.as_ooxml());
                if let Some(argb) = border_color {
                    edge.get_color_mut().set_argb(argb.as_str());
                }
            };
            let borders = style.get_borders_mut();
            paint(borders.get_left_border_mut());
            paint(borders.get_right_border_mut());
            paint(borders.get_top_border_mut());
            paint(borders.get_bottom_border_mut());
        }

        if let Some(code) = &self.number_format {
            style.get_number_format_mut().set_format_code(code.as_str());
        }

        if let Some(align) = self.alignment {
            style.get_alignment_mut().set_horizontal(align.to_umya());
        }
        if self.wrap_text {
            style.get_alignment_mut().set_wrap_text(true);
        }
    }
}

pub(super) fn format_range(params: &FormatRangeParams) -> BackendResult<String> {
    let start = parse_cell(&params.start_cell)?;
    let end = params
        .end_cell
        .as_deref()
        .map(str::trim)
        .filter(|end| !end.is_empty())
        .map(parse_cell)
        .transpose()?
        .unwrap_or(start);
    let bounds = RangeBounds::new(start, end);
    let plan = StylePlan::from_params(params)?;

    let mut book = open_book(&params.filepath)?;
    let sheet = input_sheet_mut(&mut book, &params.sheet_name)?;

    for addr in bounds.cells() {
        plan.apply(sheet.get_style_mut(addr.coords()));
    }

    if params.merge_cells && !bounds.is_single_cell() {
        let range = bounds.to_string();
        let already = sheet
            .get_merge_cells()
            .iter()
            .any(|merged| merged.get_range() == range);
        if !already {
            sheet.add_merge_cells(range);
        }
    }

    if let Some(rule) = params.conditional_format.as_ref().filter(|v| !v.is_null()) {
        conditional_format::apply_rule(sheet, &bounds, rule, normalize_color)?;
    }

    save_book(&book, &params.filepath)?;
    Ok("Range formatted successfully".to_string())
}
