//! Full query lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every builder
//! operation over real HTTP using ureq as the host transport. Validates
//! that request building and response normalization work end-to-end with
//! an actual PostgREST-style server, including conflict and upsert paths.

use serde_json::json;
use trip_core::{
    Client, ClientConfig, HttpMethod, HttpRequest, HttpResponse, NewPlan, Order, Plan,
    QueryError, TransportError, UNIQUE_VIOLATION,
};

/// Execute an `HttpRequest` using ureq, mapping transport-level failures
/// into the core's failure channel.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// handle status interpretation.
fn execute(req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut r = agent.get(&req.url);
            for (k, v) in &req.headers {
                r = r.header(k.as_str(), v.as_str());
            }
            r.call()
        }
        (HttpMethod::Delete, _) => {
            let mut r = agent.delete(&req.url);
            for (k, v) in &req.headers {
                r = r.header(k.as_str(), v.as_str());
            }
            r.call()
        }
        (HttpMethod::Post, body) => {
            let mut r = agent.post(&req.url);
            for (k, v) in &req.headers {
                r = r.header(k.as_str(), v.as_str());
            }
            r.send(body.unwrap_or_default().as_bytes())
        }
        (HttpMethod::Patch, body) => {
            let mut r = agent.patch(&req.url);
            for (k, v) in &req.headers {
                r = r.header(k.as_str(), v.as_str());
            }
            r.send(body.unwrap_or_default().as_bytes())
        }
    };

    match result {
        Ok(mut response) => Ok(HttpResponse {
            status: response.status().as_u16(),
            headers: Vec::new(),
            body: response.body_mut().read_to_string().unwrap_or_default(),
        }),
        Err(e) => Err(TransportError {
            status: None,
            code: None,
            message: Some(e.to_string()),
        }),
    }
}

/// Start the mock server on a random port and return its address.
fn start_mock_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

#[test]
fn plans_lifecycle() {
    let addr = start_mock_server();
    let client = Client::new(ClientConfig::new(
        &format!("http://{addr}"),
        "test-key",
        "test-token",
    ));

    // Step 1: list — table starts empty.
    let data = client.from("plans").execute(execute).unwrap();
    assert_eq!(data.as_array().map(Vec::len), Some(0));

    // Step 2: save a plan; the representation comes back as a row array.
    let mut tokyo = NewPlan::new("Tokyo", "2026-04-01");
    tokyo.end_date = Some("2026-04-07".to_string());
    tokyo.notes = Some("cherry blossom week".to_string());
    let data = client.from("plans").insert(&tokyo).execute(execute).unwrap();
    let saved: Vec<Plan> = serde_json::from_value(data).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].destination, "Tokyo");
    assert_eq!(saved[0].status, "planned");
    let tokyo_id = saved[0].id;

    // Step 3: saving the same destination+date again conflicts.
    let err = client
        .from("plans")
        .insert(&NewPlan::new("Tokyo", "2026-04-01"))
        .execute(execute)
        .unwrap_err();
    assert_eq!(err.code(), Some(UNIQUE_VIOLATION));
    assert!(matches!(err, QueryError::Conflict { .. }));

    // Step 4: upsert merges into the existing row instead.
    let mut revised = NewPlan::new("Tokyo", "2026-04-01");
    revised.notes = Some("added teamLab tickets".to_string());
    let data = client
        .from("plans")
        .upsert(&revised)
        .execute(execute)
        .unwrap();
    let merged: Vec<Plan> = serde_json::from_value(data).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].id, tokyo_id);
    assert_eq!(merged[0].notes.as_deref(), Some("added teamLab tickets"));

    // Step 5: a second destination for the filter tests.
    client
        .from("plans")
        .insert(&NewPlan::new("Kyoto", "2026-05-02"))
        .execute(execute)
        .unwrap();

    // Step 6: filtered, ordered, projected read.
    let data = client
        .from("plans")
        .select("destination,start_date")
        .or("destination.eq.Tokyo,destination.eq.Kyoto")
        .order("start_date", Order::Ascending)
        .limit(10)
        .execute(execute)
        .unwrap();
    let rows = data.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["destination"], "Tokyo");
    assert!(rows[0].get("id").is_none());

    // Step 7: default direction is descending — newest trip first.
    let data = client
        .from("plans")
        .order("start_date", Order::default())
        .execute(execute)
        .unwrap();
    assert_eq!(data[0]["destination"], "Kyoto");

    // Step 8: single() caps the row count.
    let data = client
        .from("plans")
        .eq("destination", "Kyoto")
        .single()
        .execute(execute)
        .unwrap();
    assert_eq!(data.as_array().map(Vec::len), Some(1));

    // Step 9: update — stray ordering/pagination calls on a mutation are
    // dropped from the URL and the server accepts the request.
    let data = client
        .from("plans")
        .eq("destination", "Tokyo")
        .order("start_date", Order::Ascending)
        .limit(5)
        .update(&json!({"status": "done"}))
        .execute(execute)
        .unwrap();
    let updated: Vec<Plan> = serde_json::from_value(data).unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].status, "done");

    // Step 10: delete the finished trip; 204 normalizes to null data.
    let data = client
        .from("plans")
        .eq("destination", "Tokyo")
        .delete()
        .execute(execute)
        .unwrap();
    assert_eq!(data, serde_json::Value::Null);

    // Step 11: one plan remains.
    let data = client.from("plans").execute(execute).unwrap();
    let remaining = data.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["destination"], "Kyoto");
}

#[test]
fn transport_failure_reports_error_not_panic() {
    // Bind then drop a listener so the port is known to refuse connections.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Client::new(ClientConfig::new(
        &format!("http://127.0.0.1:{port}"),
        "test-key",
        "test-token",
    ));

    let err = client.from("plans").execute(execute).unwrap_err();
    match err {
        QueryError::Transport { message, .. } => assert!(!message.is_empty()),
        other => panic!("expected Transport, got {other:?}"),
    }
}
