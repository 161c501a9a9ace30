// Primitives shared by the table readers.

use crate::padron::*;

use voter_analytics::{PolygonVertex, VoteStatus, VoterRecord};

/// A table read from a file: the header and the data rows with their line number.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub path: String,
    pub header: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

impl RawTable {
    /// Position of a column, by exact header name (surrounding spaces ignored).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    pub fn required_column(&self, name: &str) -> PadronResult<usize> {
        self.column(name).context(MissingColumnSnafu {
            column: name,
            path: self.path.clone(),
        })
    }
}

pub fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Reads an integer that spreadsheet exports may have written as a float (`1990.0`).
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(x) = s.parse::<i64>() {
        return Some(x);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Builds the voter records of a period from a raw roll.
///
/// The document, zone and polygon columns are mandatory. A missing vote
/// column leaves every voter with an unknown status. Unreadable birth
/// years and coordinates are treated as missing values.
pub fn voters_from_table(
    table: &RawTable,
    source: &VoterRollSource,
    period: &Period,
) -> PadronResult<Vec<VoterRecord>> {
    let cols = source.columns();
    let id_idx = table.required_column(cols.document_id())?;
    let zone_idx = table.required_column(cols.zone())?;
    let polygon_idx = table.required_column(cols.polygon())?;

    let optional = |name: &str| {
        let idx = table.column(name);
        if idx.is_none() {
            warn!("voters_from_table: no column {:?} in {}", name, table.path);
        }
        idx
    };
    let year_idx = optional(cols.birth_year());
    let gender_idx = optional(cols.gender());
    let occupation_idx = optional(cols.occupation());
    let lon_idx = optional(cols.longitude());
    let lat_idx = optional(cols.latitude());
    let vote_idx = match &period.vote_status_column {
        Some(c) => optional(c.as_str()),
        None => None,
    };

    let mut res: Vec<VoterRecord> = Vec::with_capacity(table.rows.len());
    for (lineno, row) in table.rows.iter() {
        let birth_year = cell(row, year_idx).and_then(|s| {
            let y = parse_int(s).and_then(|y| i32::try_from(y).ok());
            if y.is_none() {
                debug!("voters_from_table: line {}: unreadable year {:?}", lineno, s);
            }
            y
        });
        let record = VoterRecord {
            document_id: cell(row, Some(id_idx)).unwrap_or_default().to_string(),
            birth_year,
            gender: cell(row, gender_idx).map(|s| s.to_string()),
            occupation: cell(row, occupation_idx).map(|s| s.to_string()),
            zone: row.get(zone_idx).cloned().unwrap_or_default(),
            polygon: row.get(polygon_idx).cloned().unwrap_or_default(),
            longitude: cell(row, lon_idx).and_then(parse_float),
            latitude: cell(row, lat_idx).and_then(parse_float),
            vote_status: cell(row, vote_idx)
                .map(VoteStatus::parse)
                .unwrap_or(VoteStatus::Unknown),
        };
        res.push(record);
    }
    info!(
        "voters_from_table: {} voters read from {} (period {})",
        res.len(),
        simplify_file_name(&table.path),
        period.name
    );
    Ok(res)
}

/// Builds the polygon vertices from the raw geometry table.
///
/// Every column is mandatory and every cell must be readable.
pub fn vertices_from_table(table: &RawTable) -> PadronResult<Vec<PolygonVertex>> {
    let zone_idx = table.required_column("zona")?;
    let polygon_idx = table.required_column("poligono")?;
    let order_idx = table.required_column("orden")?;
    let lon_idx = table.required_column("lon")?;
    let lat_idx = table.required_column("lat")?;

    let read = |lineno: usize, row: &[String], idx: usize, column: &str| -> PadronResult<String> {
        let content = row.get(idx).cloned().unwrap_or_default();
        ensure!(
            !content.trim().is_empty(),
            BadCellSnafu {
                path: table.path.clone(),
                lineno,
                column,
                content,
            }
        );
        Ok(content)
    };
    let number = |lineno: usize, row: &[String], idx: usize, column: &str| -> PadronResult<f64> {
        let content = read(lineno, row, idx, column)?;
        parse_float(&content).context(BadCellSnafu {
            path: table.path.clone(),
            lineno,
            column,
            content,
        })
    };

    let mut res: Vec<PolygonVertex> = Vec::with_capacity(table.rows.len());
    for (lineno, row) in table.rows.iter() {
        let lineno = *lineno;
        let order_s = read(lineno, row, order_idx, "orden")?;
        let order = parse_int(&order_s).context(BadCellSnafu {
            path: table.path.clone(),
            lineno,
            column: "orden",
            content: order_s.clone(),
        })?;
        res.push(PolygonVertex {
            zone: read(lineno, row, zone_idx, "zona")?,
            polygon: read(lineno, row, polygon_idx, "poligono")?,
            order,
            longitude: number(lineno, row, lon_idx, "lon")?,
            latitude: number(lineno, row, lat_idx, "lat")?,
        });
    }
    info!(
        "vertices_from_table: {} vertices read from {}",
        res.len(),
        simplify_file_name(&table.path)
    );
    Ok(res)
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            path: "mem.tsv".to_string(),
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, r)| (i + 2, r.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }

    fn source() -> VoterRollSource {
        VoterRollSource {
            provider: None,
            file_path: "padron.tsv".to_string(),
            excel_worksheet_name: None,
            columns: None,
        }
    }

    fn period(col: Option<&str>) -> Period {
        Period {
            name: "septiembre".to_string(),
            vote_status_column: col.map(|s| s.to_string()),
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_int("1990"), Some(1990));
        assert_eq!(parse_int("1990.0"), Some(1990));
        assert_eq!(parse_int("1990.5"), None);
        assert_eq!(parse_int("nan"), None);
        assert_eq!(parse_float(" -61.25 "), Some(-61.25));
        assert_eq!(parse_float("NaN"), None);
    }

    #[test]
    fn voters() {
        let t = table(
            &["nro_documento", "fecha_nacimiento", "genero", "profesion", "zona", "poligono", "lon", "lat", "voto_septiembre"],
            &[
                &["1", "1990", "F", "ESTUDIANTE", "ZONA 1", "1", "-61.3", "-38.8", "True"],
                &["2", "", "M", "", " ZONA 1 ", "2", "", "x", "False"],
                &["3", "19x0", "", "", "ZONA 2", "1", "", "", ""],
            ],
        );
        let vs = voters_from_table(&t, &source(), &period(Some("voto_septiembre"))).unwrap();
        assert_eq!(vs.len(), 3);
        assert_eq!(vs[0].birth_year, Some(1990));
        assert_eq!(vs[0].latitude, Some(-38.8));
        assert_eq!(vs[0].vote_status, VoteStatus::Voted);
        assert_eq!(vs[1].birth_year, None);
        assert_eq!(vs[1].occupation, None);
        assert_eq!(vs[1].zone, " ZONA 1 ");
        assert_eq!(vs[1].latitude, None);
        assert_eq!(vs[1].vote_status, VoteStatus::DidNotVote);
        assert_eq!(vs[2].birth_year, None);
        assert_eq!(vs[2].gender, None);
        assert_eq!(vs[2].vote_status, VoteStatus::Unknown);

        // A period without a column: nobody has a known status.
        let vs = voters_from_table(&t, &source(), &period(None)).unwrap();
        assert!(vs.iter().all(|v| v.vote_status == VoteStatus::Unknown));
    }

    #[test]
    fn voters_out_of_range_year() {
        let t = table(
            &["nro_documento", "fecha_nacimiento", "zona", "poligono"],
            &[
                &["1", "4294969315", "ZONA 1", "1"],
                &["2", "-2147483649", "ZONA 1", "1"],
                &["3", "2147483647", "ZONA 1", "1"],
            ],
        );
        let vs = voters_from_table(&t, &source(), &period(None)).unwrap();
        assert_eq!(vs[0].birth_year, None);
        assert_eq!(vs[1].birth_year, None);
        assert_eq!(vs[2].birth_year, Some(i32::MAX));
    }

    #[test]
    fn voters_missing_mandatory_column() {
        let t = table(&["nro_documento", "zona"], &[&["1", "ZONA 1"]]);
        let res = voters_from_table(&t, &source(), &period(None));
        assert!(matches!(res, Err(PadronError::MissingColumn { column, .. }) if column == "poligono"));
    }

    #[test]
    fn vertices() {
        let t = table(
            &["zona", "poligono", "orden", "lon", "lat"],
            &[
                &["ZONA 1", "1", "2", "-61.2", "-38.8"],
                &["ZONA 1", "1", "1.0", "-61.3", "-38.8"],
            ],
        );
        let vs = vertices_from_table(&t).unwrap();
        assert_eq!(vs[1].order, 1);
        assert_eq!(vs[0].longitude, -61.2);

        let bad = table(
            &["zona", "poligono", "orden", "lon", "lat"],
            &[&["ZONA 1", "1", "2", "oeste", "-38.8"]],
        );
        let res = vertices_from_table(&bad);
        assert!(matches!(res, Err(PadronError::BadCell { lineno: 2, .. })));
    }
}
