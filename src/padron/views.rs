// The JSON documents of the dashboard views.

use serde_json::{json, Map as JSMap};

use crate::padron::session::{Session, ThetaMode, View, ViewRequest};
use crate::padron::*;

use voter_analytics::map::build_zone_map;
use voter_analytics::theta::{point_estimates, ThetaInterval};
use voter_analytics::{turnout_summary, Diagnostic};

pub const LOGIN_PROMPT: &str = "Log in to continue";

/// What a view computed, before it is wrapped in the common envelope.
struct ViewOutput {
    period: Option<String>,
    warnings: Vec<Diagnostic>,
    data: JSValue,
}

impl ViewOutput {
    fn new(data: JSValue) -> ViewOutput {
        ViewOutput {
            period: None,
            warnings: Vec::new(),
            data,
        }
    }
}

/// Renders a view as `{view, period, warnings, error, data}`.
///
/// Failures while loading or checking the inputs are not propagated: they
/// are logged and reported in `error`, with an empty `data`.
pub fn render(session: &mut Session, request: &ViewRequest) -> JSValue {
    let (res, error) = if request.view.requires_login() && !session.is_logged_in() {
        let msg = session.auth_error().unwrap_or(LOGIN_PROMPT).to_string();
        debug!("render: {}: not logged in: {}", request.view.name(), msg);
        (ViewOutput::new(json!({})), Some(msg))
    } else {
        match view_output(session, request) {
            Ok(out) => (out, None),
            Err(e) => {
                warn!("render: view {} failed: {}", request.view.name(), e);
                (ViewOutput::new(json!({})), Some(e.to_string()))
            }
        }
    };
    let warnings: Vec<String> = res.warnings.iter().map(|w| w.to_string()).collect();
    json!({
        "view": request.view.name(),
        "period": res.period,
        "warnings": warnings,
        "error": error,
        "data": res.data,
    })
}

fn view_output(session: &mut Session, request: &ViewRequest) -> PadronResult<ViewOutput> {
    match request.view {
        View::Introduction => Ok(ViewOutput::new(introduction(session))),
        View::KnownVoters | View::TurnoutByAge => turnout_view(session, request),
        View::ZoneMap => zone_map_view(session, request),
        View::Theta => theta_view(session, request),
    }
}

fn introduction(session: &Session) -> JSValue {
    let config = session.config();
    let periods: Vec<JSValue> = config
        .periods
        .iter()
        .map(|p| json!({"name": p.name, "available": p.vote_status_column.is_some()}))
        .collect();
    let views: Vec<&str> = View::ALL.iter().map(|v| v.name()).collect();
    json!({
        "title": config.output_settings.dashboard_name,
        "referenceYear": config.reference_year(),
        "periods": periods,
        "views": views,
        "user": session.user().map(|u| u.name.clone()),
    })
}

fn turnout_view(session: &mut Session, request: &ViewRequest) -> PadronResult<ViewOutput> {
    let period = session.select_period(request.period.as_deref())?;
    if period.vote_status_column.is_none() {
        info!("turnout_view: no roll for period {}", period.name);
        return Ok(ViewOutput {
            period: Some(period.name.clone()),
            warnings: Vec::new(),
            data: json!({
                "available": false,
                "message": format!("The roll of the period {} is not available yet", period.name),
            }),
        });
    }
    let voters = session.voters(&period)?;
    let summary = turnout_summary(&voters, session.config().reference_year());
    let s = &summary.value;
    let data = if request.view == View::KnownVoters {
        json!({
            "available": true,
            "coverage": {
                "known": s.coverage.known,
                "unknown": s.coverage.unknown,
                "knownShare": s.coverage.known_share(),
                "unknownShare": s.coverage.unknown_share(),
            },
            "outcome": {
                "voted": s.outcome.voted,
                "didNotVote": s.outcome.did_not_vote,
                "participation": s.outcome.participation(),
                "abstention": s.outcome.abstention(),
            },
        })
    } else {
        let brackets: Vec<JSValue> = s
            .by_bracket
            .iter()
            .map(|b| {
                json!({
                    "bracket": b.bracket.label(),
                    "voted": b.outcome.voted,
                    "didNotVote": b.outcome.did_not_vote,
                    "participation": b.participation(),
                })
            })
            .collect();
        json!({"available": true, "brackets": brackets})
    };
    // The coverage and outcome views have no use for the bracket warnings.
    let warnings = if request.view == View::TurnoutByAge {
        summary.warnings.clone()
    } else {
        Vec::new()
    };
    Ok(ViewOutput {
        period: Some(period.name),
        warnings,
        data,
    })
}

fn ring_to_json(ring: &[(f64, f64)]) -> JSValue {
    json!(ring.iter().map(|(lon, lat)| vec![*lon, *lat]).collect::<Vec<Vec<f64>>>())
}

fn zone_map_view(session: &mut Session, request: &ViewRequest) -> PadronResult<ViewOutput> {
    let period = session.select_period(request.period.as_deref())?;
    let voters = session.voters(&period)?;
    let vertices = session.vertices()?;
    let res = build_zone_map(&voters, &vertices);
    let map = &res.value;

    let polygons: Vec<JSValue> = map
        .polygons
        .iter()
        .map(|p| {
            json!({
                "key": p.key.key(),
                "zone": p.key.zone,
                "polygon": p.key.polygon,
                "color": p.color,
                "ring": ring_to_json(&p.ring),
            })
        })
        .collect();
    let labels: Vec<JSValue> = map
        .labels
        .iter()
        .map(|l| {
            json!({
                "key": l.key.key(),
                "zone": l.key.zone,
                "lon": l.centroid_lon,
                "lat": l.centroid_lat,
                "count": l.count,
            })
        })
        .collect();
    let view = map.view.map(|v| {
        json!({"latitude": v.latitude, "longitude": v.longitude, "zoom": v.zoom})
    });

    let mut columns: Vec<String> = vec!["zona".to_string(), "poligono".to_string()];
    columns.extend(map.cross_tab.column_labels());
    let rows: Vec<JSValue> = map
        .cross_tab
        .rows
        .iter()
        .map(|r| {
            let mut row: Vec<JSValue> = vec![json!(r.zone), json!(r.polygon)];
            row.extend(r.counts.iter().map(|c| json!(c)));
            JSValue::Array(row)
        })
        .collect();

    let unmatched: Vec<String> = map.unmatched_keys.iter().map(|k| k.key()).collect();
    Ok(ViewOutput {
        period: Some(period.name),
        warnings: res.warnings.clone(),
        data: json!({
            "matchedVoters": map.matched_voters,
            "unmatchedKeys": unmatched,
            "polygons": polygons,
            "labels": labels,
            "view": view,
            "crossTab": {"columns": columns, "rows": rows},
        }),
    })
}

fn interval_to_json(r: &ThetaInterval) -> JSValue {
    json!({
        "ageGroup": r.age_group,
        "party": r.party,
        "low": r.low,
        "median": r.median,
        "high": r.high,
    })
}

/// The requested choice, or the first one.
fn selection(request: &ViewRequest, choices: &[String]) -> PadronResult<String> {
    match (&request.selection, choices.first()) {
        (Some(s), _) => Ok(s.clone()),
        (None, Some(first)) => Ok(first.clone()),
        (None, None) => whatever!("The bootstrap summary is empty"),
    }
}

fn theta_view(session: &mut Session, request: &ViewRequest) -> PadronResult<ViewOutput> {
    let mut data: JSMap<String, JSValue> = JSMap::new();
    data.insert("mode".to_string(), json!(request.theta_mode.name()));
    let mut warnings: Vec<Diagnostic> = Vec::new();
    match request.theta_mode {
        ThetaMode::Heatmap => {
            let table = session.theta_table()?;
            data.insert("ageGroups".to_string(), json!(table.age_groups));
            data.insert("parties".to_string(), json!(table.parties));
            data.insert("values".to_string(), json!(table.values));
        }
        ThetaMode::ByAgeGroup | ThetaMode::ByParty => {
            let intervals = session.theta_intervals()?;
            warnings.extend(intervals.warnings.iter().cloned());
            let by_group = request.theta_mode == ThetaMode::ByAgeGroup;
            let choices = if by_group {
                intervals.value.age_groups()
            } else {
                intervals.value.parties()
            };
            let selected = selection(request, &choices)?;
            let found = if by_group {
                intervals.value.for_age_group(&selected)
            } else {
                intervals.value.for_party(&selected)
            };
            let rows = found.context(AnalyticsSnafu)?;
            let rows: Vec<JSValue> = rows.into_iter().map(interval_to_json).collect();
            data.insert("choices".to_string(), json!(choices));
            data.insert("selected".to_string(), json!(selected));
            data.insert("intervals".to_string(), JSValue::Array(rows));
        }
        ThetaMode::Overview => {
            let table = session.theta_table()?;
            let samples = session.theta_samples()?;
            let estimates =
                point_estimates(&table, samples.as_deref()).context(AnalyticsSnafu)?;
            let estimates: Vec<JSValue> = estimates
                .iter()
                .map(|e| {
                    json!({
                        "ageGroup": e.age_group,
                        "party": e.party,
                        "theta": e.theta,
                        "low": e.interval.map(|i| i.0),
                        "high": e.interval.map(|i| i.1),
                    })
                })
                .collect();
            data.insert("estimates".to_string(), JSValue::Array(estimates));
        }
    }
    Ok(ViewOutput {
        period: None,
        warnings,
        data: JSValue::Object(data),
    })
}
