//! Grouped summary tables written to a companion `<sheet>_pivot` sheet.

use super::cells::read_rows;
use super::{input_sheet, open_book, save_book};
use crate::backend::CellValue;
use crate::backend::address::{parse_range, split_sheet_prefix};
use crate::errors::{BackendResult, DomainError};
use crate::tools::PivotParams;
use crate::tools::param_enums::AggFunc;
use indexmap::{IndexMap, IndexSet};
use umya_spreadsheet::Worksheet;

#[derive(Debug, Default, Clone)]
struct Bucket {
    numbers: Vec<f64>,
    non_empty: usize,
}

impl Bucket {
    fn push(&mut self, value: &CellValue) {
        if value.is_empty() {
            return;
        }
        self.non_empty += 1;
        if let Some(number) = value.as_number() {
            self.numbers.push(number);
        }
    }
}

/// Aggregated table ready to be written: header plus rows of labels and values.
#[derive(Debug, PartialEq)]
pub(super) struct SummaryTable {
    pub header: Vec<String>,
    pub rows: Vec<(Vec<String>, Vec<Option<f64>>)>,
}

fn field_index(headers: &[String], field: &str) -> BackendResult<usize> {
    headers
        .iter()
        .position(|header| header == field.trim())
        .ok_or_else(|| {
            DomainError::pivot(format!(
                "Field '{field}' not found in data headers. Available fields: {}",
                headers.join(", ")
            ))
        })
}

pub(super) fn summarize(
    data: &[Vec<CellValue>],
    rows: &[String],
    columns: &[String],
    values: &[String],
    agg: AggFunc,
) -> BackendResult<SummaryTable> {
    let Some((header_row, records)) = data.split_first() else {
        return Err(DomainError::pivot("Data range contains no header row"));
    };
    if records.is_empty() {
        return Err(DomainError::pivot("Data range contains no data rows"));
    }
    let headers: Vec<String> = header_row.iter().map(CellValue::label).collect();

    let row_idx = rows
        .iter()
        .map(|f| field_index(&headers, f))
        .collect::<BackendResult<Vec<_>>>()?;
    let col_idx = columns
        .iter()
        .map(|f| field_index(&headers, f))
        .collect::<BackendResult<Vec<_>>>()?;
    let value_idx = values
        .iter()
        .map(|f| field_index(&headers, f))
        .collect::<BackendResult<Vec<_>>>()?;

    let key = |record: &[CellValue], idx: &[usize]| -> Vec<String> {
        idx.iter()
            .map(|&i| record.get(i).map(CellValue::label).unwrap_or_default())
            .collect()
    };

    let mut column_keys: IndexSet<Vec<String>> = IndexSet::new();
    let mut groups: IndexMap<Vec<String>, IndexMap<Vec<String>, Vec<Bucket>>> = IndexMap::new();
    for record in records {
        let row_key = key(record, &row_idx);
        let col_key = key(record, &col_idx);
        column_keys.insert(col_key.clone());
        let buckets = groups
            .entry(row_key)
            .or_default()
            .entry(col_key)
            .or_insert_with(|| vec![Bucket::default(); value_idx.len()]);
        for (bucket, &i) in buckets.iter_mut().zip(&value_idx) {
            if let Some(value) = record.get(i) {
                bucket.push(value);
            }
        }
    }

    let mut header: Vec<String> = rows.iter().map(|f| f.trim().to_string()).collect();
    for col_key in &column_keys {
        for value in values {
            let value = value.trim();
            let label = if col_key.is_empty() {
                format!("{value} ({agg})")
            } else if values.len() == 1 {
                col_key.join(" / ")
            } else {
                format!("{} - {value} ({agg})", col_key.join(" / "))
            };
            header.push(label);
        }
    }

    let table_rows = groups
        .into_iter()
        .map(|(row_key, by_column)| {
            let cells = column_keys
                .iter()
                .flat_map(|col_key| match by_column.get(col_key) {
                    Some(buckets) => buckets
                        .iter()
                        .map(|b| agg.apply(&b.numbers, b.non_empty))
                        .collect::<Vec<_>>(),
                    None => vec![None; value_idx.len()],
                })
                .collect();
            (row_key, cells)
        })
        .collect();

    Ok(SummaryTable {
        header,
        rows: table_rows,
    })
}

fn write_table(sheet: &mut Worksheet, table: &SummaryTable) {
    for (col, label) in table.header.iter().enumerate() {
        let coords = (col as u32 + 1, 1);
        sheet.get_cell_mut(coords).set_value_string(label.as_str());
        sheet.get_style_mut(coords).get_font_mut().set_bold(true);
    }
    for (row_offset, (labels, values)) in table.rows.iter().enumerate() {
        let row = row_offset as u32 + 2;
        for (col, label) in labels.iter().enumerate() {
            sheet
                .get_cell_mut((col as u32 + 1, row))
                .set_value_string(label.as_str());
        }
        for (offset, value) in values.iter().enumerate() {
            if let Some(value) = value {
                let col = (labels.len() + offset) as u32 + 1;
                sheet.get_cell_mut((col, row)).set_value_number(*value);
            }
        }
    }
}

pub(super) fn create_pivot_table(params: &PivotParams) -> BackendResult<String> {
    let agg = AggFunc::parse(&params.agg_func)?;
    let (prefixed_sheet, raw_range) = split_sheet_prefix(&params.data_range);
    let bounds = parse_range(raw_range)?;
    let data_sheet = prefixed_sheet.unwrap_or_else(|| params.sheet_name.clone());

    let mut book = open_book(&params.filepath)?;
    input_sheet(&book, &params.sheet_name)?;
    let data = read_rows(input_sheet(&book, &data_sheet)?, &bounds);
    let table = summarize(&data, &params.rows, &params.columns, &params.values, agg)?;

    let pivot_name = format!("{}_pivot", params.sheet_name);
    if book.get_sheet_by_name(&pivot_name).is_some() {
        book.remove_sheet_by_name(&pivot_name)
            .map_err(|e| DomainError::pivot(format!("Failed to replace sheet '{pivot_name}': {e}")))?;
    }
    let sheet = book
        .new_sheet(pivot_name.as_str())
        .map_err(|e| DomainError::pivot(format!("Failed to create sheet '{pivot_name}': {e}")))?;
    write_table(sheet, &table);

    save_book(&book, &params.filepath)?;
    Ok(format!("Summary table created in sheet '{pivot_name}'"))
}
