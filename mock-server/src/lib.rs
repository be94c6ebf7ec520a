//! In-memory PostgREST subset for integration tests.
//!
//! Implements just enough of the wire protocol the trip-core client
//! speaks: `eq.` filters, `or=(...)` disjunctions, `order`, `limit`,
//! `select` projection, inserts with a unique key on
//! (destination, start_date) and 409/merge-duplicates conflict handling,
//! partial updates, and filtered deletes. Rows are untyped JSON objects so
//! the server imposes no schema beyond the unique key.

use std::cmp::Ordering;
use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Row = Map<String, Value>;
pub type Db = Arc<RwLock<Vec<Row>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route(
            "/rest/v1/plans",
            get(list_plans)
                .post(insert_plans)
                .patch(update_plans)
                .delete(delete_plans),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Decoded query-string state for one request.
#[derive(Debug, Default)]
struct Query {
    filters: Vec<(String, String)>,
    or_terms: Vec<(String, String)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
    select: Option<String>,
}

fn parse_query(raw: Option<&str>) -> Query {
    let mut query = Query::default();
    let Some(raw) = raw else { return query };

    for pair in raw.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = percent_decode_str(value).decode_utf8_lossy().into_owned();
        match key {
            "select" => query.select = Some(value),
            "limit" => query.limit = value.parse().ok(),
            "order" => {
                if let Some((column, direction)) = value.rsplit_once('.') {
                    query.order = Some((column.to_string(), direction == "asc"));
                }
            }
            "or" => {
                let inner = value.trim_start_matches('(').trim_end_matches(')');
                for term in inner.split(',') {
                    if let Some((column, rest)) = term.split_once('.') {
                        if let Some(v) = rest.strip_prefix("eq.") {
                            query.or_terms.push((column.to_string(), v.to_string()));
                        }
                    }
                }
            }
            _ => {
                if let Some(v) = value.strip_prefix("eq.") {
                    query.filters.push((key.to_string(), v.to_string()));
                }
            }
        }
    }
    query
}

/// Filter values arrive as text; compare against the row's field rendered
/// the same way.
fn field_text(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn matches(row: &Row, query: &Query) -> bool {
    let all_eq = query
        .filters
        .iter()
        .all(|(column, value)| field_text(row, column) == *value);
    let any_or = query.or_terms.is_empty()
        || query
            .or_terms
            .iter()
            .any(|(column, value)| field_text(row, column) == *value);
    all_eq && any_or
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn project(row: Row, select: Option<&str>) -> Value {
    match select {
        None | Some("*") => Value::Object(row),
        Some(columns) => {
            let mut out = Row::new();
            for column in columns.split(',') {
                let column = column.trim();
                if let Some(v) = row.get(column) {
                    out.insert(column.to_string(), v.clone());
                }
            }
            Value::Object(out)
        }
    }
}

/// Unique key: (destination, start_date), mirroring the production table's
/// constraint.
fn conflicts(a: &Row, b: &Row) -> bool {
    a.get("destination") == b.get("destination") && a.get("start_date") == b.get("start_date")
}

async fn list_plans(State(db): State<Db>, RawQuery(raw): RawQuery) -> Json<Value> {
    let query = parse_query(raw.as_deref());
    let rows = db.read().await;

    let mut matched: Vec<Row> = rows.iter().filter(|r| matches(r, &query)).cloned().collect();
    if let Some((column, ascending)) = &query.order {
        matched.sort_by(|a, b| {
            let ord = compare_fields(a.get(column), b.get(column));
            if *ascending {
                ord
            } else {
                ord.reverse()
            }
        });
    }
    if let Some(limit) = query.limit {
        matched.truncate(limit);
    }

    let projected: Vec<Value> = matched
        .into_iter()
        .map(|row| project(row, query.select.as_deref()))
        .collect();
    Json(Value::Array(projected))
}

async fn insert_plans(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let incoming: Vec<Row> = match body {
        Value::Array(values) => values.into_iter().filter_map(as_row).collect(),
        other => as_row(other).into_iter().collect(),
    };
    if incoming.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "expected an object or an array of objects"})),
        )
            .into_response();
    }

    let prefer = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let merge = prefer.contains("resolution=merge-duplicates");
    let representation = prefer.contains("return=representation");

    let mut rows = db.write().await;
    let mut inserted = Vec::new();
    for mut row in incoming {
        match rows.iter().position(|r| conflicts(r, &row)) {
            Some(index) if merge => {
                // Conflicting row keeps its id; incoming fields win otherwise.
                let merged = &mut rows[index];
                for (key, value) in row {
                    if key != "id" {
                        merged.insert(key, value);
                    }
                }
                inserted.push(Value::Object(merged.clone()));
            }
            Some(_) => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "code": "23505",
                        "message": "duplicate key value violates unique constraint \"plans_destination_start_date_key\"",
                        "details": null,
                        "hint": null
                    })),
                )
                    .into_response();
            }
            None => {
                row.entry("id".to_string())
                    .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
                rows.push(row.clone());
                inserted.push(Value::Object(row));
            }
        }
    }

    if representation {
        (StatusCode::CREATED, Json(Value::Array(inserted))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn update_plans(
    State(db): State<Db>,
    RawQuery(raw): RawQuery,
    Json(patch): Json<Value>,
) -> Response {
    let Some(patch) = patch.as_object().cloned() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "expected a JSON object"})),
        )
            .into_response();
    };

    let query = parse_query(raw.as_deref());
    let mut rows = db.write().await;
    let mut updated = Vec::new();
    for row in rows.iter_mut().filter(|r| matches(r, &query)) {
        for (key, value) in &patch {
            row.insert(key.clone(), value.clone());
        }
        updated.push(Value::Object(row.clone()));
    }
    (StatusCode::OK, Json(Value::Array(updated))).into_response()
}

async fn delete_plans(State(db): State<Db>, RawQuery(raw): RawQuery) -> StatusCode {
    let query = parse_query(raw.as_deref());
    let mut rows = db.write().await;
    rows.retain(|r| !matches(r, &query));
    StatusCode::NO_CONTENT
}

fn as_row(value: Value) -> Option<Row> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
