use super::{input_sheet, open_book, save_book};
use crate::backend::address::{
    CellAddr, RangeBounds, column_name, parse_cell, parse_range, quote_sheet_name,
    split_sheet_prefix,
};
use crate::errors::{BackendResult, DomainError};
use crate::tools::ChartParams;
use crate::tools::param_enums::ChartKind;
use umya_spreadsheet::structs::Chart;
use umya_spreadsheet::structs::drawing::spreadsheet::MarkerType;

/// Default chart footprint, in cells.
const CHART_WIDTH_COLS: u32 = 8;
const CHART_HEIGHT_ROWS: u32 = 15;

/// One absolute series reference per column of `bounds`.
fn series_refs(sheet: &str, bounds: &RangeBounds) -> Vec<String> {
    let sheet = quote_sheet_name(sheet);
    (bounds.start.col..=bounds.end.col)
        .map(|col| {
            let letters = column_name(col);
            format!(
                "{sheet}!${letters}${}:${letters}${}",
                bounds.start.row, bounds.end.row
            )
        })
        .collect()
}

fn marker(addr: CellAddr) -> MarkerType {
    let mut marker = MarkerType::default();
    marker.set_coordinate(addr.to_string());
    marker
}

pub(super) fn create_chart(params: &ChartParams) -> BackendResult<String> {
    let kind = ChartKind::parse(&params.chart_type)?;
    let anchor = parse_cell(&params.target_cell)?;

    let (data_sheet, raw_range) = split_sheet_prefix(&params.data_range);
    let bounds = parse_range(raw_range).map_err(|_| {
        DomainError::chart(format!("Invalid data range: {}", params.data_range))
    })?;
    let data_sheet = data_sheet.unwrap_or_else(|| params.sheet_name.clone());

    let mut book = open_book(&params.filepath)?;
    input_sheet(&book, &params.sheet_name)?;
    if book.get_sheet_by_name(&data_sheet).is_none() {
        return Err(DomainError::chart(format!(
            "Data sheet '{data_sheet}' not found"
        )));
    }

    let refs = series_refs(&data_sheet, &bounds);
    let series: Vec<&str> = refs.iter().map(String::as_str).collect();

    let mut chart = Chart::default();
    chart.new_chart(
        kind.to_umya(),
        marker(anchor),
        marker(CellAddr::new(
            anchor.col + CHART_WIDTH_COLS,
            anchor.row + CHART_HEIGHT_ROWS,
        )),
        series,
    );
    if !params.title.trim().is_empty() {
        chart.set_title(params.title.trim());
    }
    if !params.x_axis.trim().is_empty() {
        chart.set_horizontal_title(params.x_axis.trim());
    }
    if !params.y_axis.trim().is_empty() {
        chart.set_vertical_title(params.y_axis.trim());
    }

    book.get_sheet_by_name_mut(&params.sheet_name)
        .ok_or_else(|| DomainError::validation(format!("Sheet '{}' not found", params.sheet_name)))?
        .add_chart(chart);

    save_book(&book, &params.filepath)?;
    Ok(format!("{} chart created successfully", kind.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_are_one_per_column() {
        let bounds = parse_range("A2:B5").unwrap();
        assert_eq!(
            series_refs("Sales Data", &bounds),
            vec![
                "'Sales Data'!$A$2:$A$5".to_string(),
                "'Sales Data'!$B$2:$B$5".to_string(),
            ]
        );
    }
}
