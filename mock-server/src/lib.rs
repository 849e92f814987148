use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, Method, StatusCode},
    routing::{any, delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use tokio::net::UnixListener;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub mod config;

pub use config::ServerConfig;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

/// What `/api/echo` saw of a request.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Vec<(String, String)>,
    pub fields: Vec<(String, String)>,
    pub files: Vec<EchoFile>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoFile {
    pub name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Items in creation order. Names are unique.
pub type Db = Arc<RwLock<Vec<Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new().nest("/api", api(db))
}

fn api(db: Db) -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", delete(delete_item))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Bind a Unix socket at `path`, replacing a stale socket file, and open it
/// to all local users (mode 0666).
#[cfg(unix)]
pub fn bind_unix(path: &std::path::Path) -> Result<UnixListener, std::io::Error> {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let listener = UnixListener::bind(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666))?;
    Ok(listener)
}

#[cfg(unix)]
pub async fn run_unix(listener: UnixListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Item>> {
    let items = db.read().await;
    let matching = items
        .iter()
        .filter(|item| params.q.as_deref().is_none_or(|q| item.name.contains(q)))
        .cloned()
        .collect();
    Json(matching)
}

async fn create_item(
    State(db): State<Db>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Item>), StatusCode> {
    let mut name = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("name") {
            name = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
        }
    }
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    let mut items = db.write().await;
    if items.iter().any(|item| item.name == name) {
        return Err(StatusCode::CONFLICT);
    }
    let item = Item {
        id: Uuid::new_v4(),
        name,
    };
    debug!(id = %item.id, name = %item.name, "item created");
    items.push(item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    let mut items = db.write().await;
    match items.iter().position(|item| item.id == id) {
        Some(index) => {
            items.remove(index);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    request: Request,
) -> Result<Json<Echo>, StatusCode> {
    let mut echo = Echo {
        method: method.to_string(),
        query,
        ..Echo::default()
    };

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    if !is_multipart {
        return Ok(Json(echo));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        match file_name {
            Some(file_name) => echo.files.push(EchoFile {
                name,
                file_name,
                content_type,
                size: data.len(),
            }),
            None => echo
                .fields
                .push((name, String::from_utf8_lossy(&data).into_owned())),
        }
    }
    Ok(Json(echo))
}

/// Answer with the requested status; the body is its lowercase reason.
async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) if (200..600).contains(&code) => {
            let reason = status.canonical_reason().unwrap_or_default();
            (status, reason.to_lowercase())
        }
        _ => (StatusCode::BAD_REQUEST, format!("invalid status code {code}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_to_json() {
        let item = Item {
            id: Uuid::nil(),
            name: "Test".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Test");
    }

    #[test]
    fn echo_serializes_pairs_as_arrays() {
        let echo = Echo {
            method: "GET".to_string(),
            query: vec![("q".to_string(), "a b".to_string())],
            ..Echo::default()
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["query"], serde_json::json!([["q", "a b"]]));
        assert_eq!(json["fields"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn status_handler_uses_lowercase_reason() {
        let (code, body) = status(Path(403)).await;
        assert_eq!(code, StatusCode::FORBIDDEN);
        assert_eq!(body, "forbidden");
    }

    #[tokio::test]
    async fn status_handler_rejects_informational_codes() {
        let (code, _) = status(Path(101)).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }
}
