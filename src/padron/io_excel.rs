// Reading the voter roll from an Excel workbook.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::padron::io_common::{voters_from_table, RawTable};
use crate::padron::*;

use voter_analytics::VoterRecord;

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        // Spreadsheets store the integer columns as floats.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        other => {
            debug!("cell_to_string: unsupported cell {:?}", other);
            String::new()
        }
    }
}

/// Reads the first worksheet (or the named one) of a workbook into a raw table.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> PadronResult<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let range_o = match worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    };
    let wrange = match (range_o, worksheet_name) {
        (Some(r), _) => r.context(OpeningExcelSnafu { path })?,
        (None, Some(name)) => return MissingWorksheetSnafu { path, name }.fail(),
        (None, None) => return EmptyExcelSnafu { path }.fail(),
    };

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| cell_to_string(c).trim().to_string())
        .collect();
    debug!("read_excel_table: header: {:?}", header);

    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        // Line numbers as displayed by the spreadsheet, the header being 1.
        rows.push((idx + 2, cells));
    }
    Ok(RawTable {
        path: path.to_string(),
        header,
        rows,
    })
}

pub fn read_voter_roll_excel(
    path: &str,
    source: &VoterRollSource,
    period: &Period,
) -> PadronResult<Vec<VoterRecord>> {
    let table = read_excel_table(path, source.excel_worksheet_name.as_deref())?;
    voters_from_table(&table, source, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&DataType::Float(1990.0)), "1990");
        assert_eq!(cell_to_string(&DataType::Float(-61.25)), "-61.25");
        assert_eq!(cell_to_string(&DataType::Int(3)), "3");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "true");
        assert_eq!(cell_to_string(&DataType::Empty), "");
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_table("/nonexistent/padron.xlsx", None);
        assert!(matches!(res, Err(PadronError::OpeningExcel { .. })));
    }
}
