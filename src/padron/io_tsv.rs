// Primitives for reading delimited text files.

use crate::padron::io_common::{vertices_from_table, voters_from_table, RawTable};
use crate::padron::*;

use voter_analytics::{PolygonVertex, VoterRecord};

/// Reads a delimited file with a header line. Short rows are accepted and
/// read as missing cells.
pub fn read_delimited(path: &str, delimiter: u8) -> PadronResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .map(|s| s.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    debug!("read_delimited: {}: header {:?}", path, header);

    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // Empty lines are skipped by the reader: the position gives the real line.
        let line = line_r.context(CsvLineParseSnafu { path, lineno: idx + 2 })?;
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        if line.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        rows.push((lineno, line.iter().map(|s| s.to_string()).collect()));
    }
    Ok(RawTable {
        path: path.to_string(),
        header,
        rows,
    })
}

pub fn read_voter_roll_tsv(
    path: &str,
    source: &VoterRollSource,
    period: &Period,
) -> PadronResult<Vec<VoterRecord>> {
    let table = read_delimited(path, b'\t')?;
    voters_from_table(&table, source, period)
}

/// Reads the zone polygons (`zona`, `poligono`, `orden`, `lon`, `lat`).
pub fn read_polygons(path: &str) -> PadronResult<Vec<PolygonVertex>> {
    let table = read_delimited(path, b'\t')?;
    vertices_from_table(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(name: &str, contents: &str) -> String {
        let dir = std::env::temp_dir().join(format!("padron-io-tsv-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn short_rows_and_blank_lines() {
        let p = write_tmp(
            "short.tsv",
            "nro_documento\tzona\tpoligono\tvoto\n1\tZONA 1\t1\tTrue\n\n2\tZONA 2\n",
        );
        let t = read_delimited(&p, b'\t').unwrap();
        assert_eq!(t.header, vec!["nro_documento", "zona", "poligono", "voto"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1].0, 4);
        assert_eq!(t.rows[1].1.len(), 2);
    }

    #[test]
    fn missing_file() {
        let res = read_polygons("/nonexistent/zonas.tsv");
        match res {
            Err(e) => assert!(e.to_string().contains("zonas.tsv")),
            Ok(_) => panic!("expected an error"),
        }
    }
}
