/*!

This is the long-form manual for `voter_analytics` and `padron`.

## Input formats

The following inputs are read by `padron`:
* the voter roll (`tsv` or `xlsx`)
* the zone polygons (`tsv`)
* the vote-probability estimates and their bootstrap summary (`csv`)
* optionally the bootstrap replicates (`csv`, long format)
* the users allowed to log in (`json`)

### Voter roll, `tsv`

Tab-separated, with a header row. One row per registered voter:

```text
nro_documento	fecha_nacimiento	genero	profesion	zona	poligono	lon	lat	voto_septiembre
20111001	2003	F	ESTUDIANTE	ZONA 1	1	-61.36	-38.86	True
20111002	2001	M		ZONA 1	1			False
```

The document, zone and polygon columns are mandatory. The other columns may be
missing or empty:
- `fecha_nacimiento` is a birth year (`1990` or `1990.0`). Voters without a year
  have no age bracket.
- `lon` and `lat` are only used to centre the map.
- there is one vote column per period. `True`/`False` in any case and `1`/`0`
  are read as voted / did not vote. Anything else, including an empty cell, is
  an unknown status.

### Voter roll, `xlsx`

The same columns in an Excel workbook: the first worksheet, or the one named in
`excelWorksheetName`. Numeric cells are accepted for the years, the coordinates
and the vote status.

### Zone polygons

Tab-separated, one row per vertex:

```text
zona	poligono	orden	lon	lat
ZONA 1	1	1	-61.4	-38.9
ZONA 1	1	2	-61.3	-38.9
```

The vertices of a polygon are joined in `orden` order. The zone and polygon
names are compared to the roll after trimming and upper-casing both of them, so
` zona 1` in the roll matches `ZONA 1` here. A polygon with two vertices sharing
the same `orden` is drawn and its voters are counted, but it gets no label.

### Probability estimates

Comma-separated, one row per age group and one column per party:

```text
age_group,Partido A,Partido B
16-24,0.55,0.45
```

The bootstrap summary has one row per (age group, party):

```text
age_group,party,theta_2.5,theta_50,theta_97.5
16-24,Partido A,0.5,0.55,0.6
```

The replicates, used for the intervals of the overview, are in long format.
Cells missing from a replicate are ignored:

```text
replicate,age_group,party,theta
1,16-24,Partido A,0.52
```

Every value must be a probability (in [0, 1]).

### Users

A JSON list. `password` is the hex SHA-256 digest of the user name, the
password and the salt, concatenated in that order:

```json
[ { "id": 1, "name": "ana", "password": "39d8bb..." } ]
```

## Configuration

`padron` reads a JSON configuration. Relative paths are relative to the
directory of the configuration file.

```json
{
  "outputSettings": { "dashboardName": "QCP", "outputDirectory": "out" },
  "referenceYear": 2025,
  "voterRoll": { "provider": "tsv", "filePath": "padron.tsv",
                 "columns": { "zone": "ZONA" } },
  "periods": [ { "name": "septiembre", "voteStatusColumn": "voto_septiembre" },
               { "name": "octubre" } ],
  "polygons": { "filePath": "zonas.tsv" },
  "thetaEstimates": { "filePath": "theta_estimates.csv" },
  "thetaBootstrap": { "filePath": "theta_bootstrap_summary.csv" },
  "thetaSamples": { "filePath": "theta_samples.csv" },
  "credentials": { "filePath": "users.json", "salt": "..." }
}
```

- `referenceYear` (optional, default 2025): the year the ages are computed for.
- `voterRoll.columns` (optional): header names, when they differ from the
  default ones (`documentId`, `birthYear`, `gender`, `occupation`, `zone`,
  `polygon`, `longitude`, `latitude`).
- a period without `voteStatusColumn` is a period whose roll has not been
  loaded yet: its views say so instead of failing.
- `credentials.salt` (optional): when absent, the `PADRON_SALT` environment
  variable is used.

## Command line

```text
padron --config dashboard_config.json --user ana --password secreto \
    --view turnout-by-age --period septiembre
```

The views are `introduction`, `known-voters`, `turnout-by-age`, `zone-map` and
`theta`. The `theta` view has four modes (`--theta-mode`): `heatmap`,
`by-age-group`, `by-party` and `overview`. `--select` picks the age group or
the party of the interval modes.

The output is a JSON document:

```json
{ "view": "turnout-by-age", "period": "septiembre",
  "warnings": ["age bracket 61+ has no voter with known status"],
  "error": null, "data": { ... } }
```

A view that cannot be computed (missing file, malformed table, wrong password)
still produces a document, with the reason in `error` and an empty `data`.

 */
