use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const DEFAULT_PAGE_SIZE: usize = 5000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub id_str: String,
    pub name: String,
    pub screen_name: String,
    pub protected: bool,
    pub followers_count: i64,
}

impl User {
    fn seeded(id: i64) -> Self {
        Self {
            id,
            id_str: id.to_string(),
            name: format!("User {id}"),
            screen_name: format!("user{id}"),
            protected: false,
            followers_count: id * 10,
        }
    }
}

#[derive(Debug, Default)]
pub struct Directory {
    pub users: Vec<User>,
    /// Blocked user ids, most recent last.
    pub blocked: Vec<i64>,
}

pub type Db = Arc<RwLock<Directory>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

/// Users `1..=12` exist; `2, 3, 5, 7, 11` start out blocked.
pub fn seed() -> Directory {
    Directory {
        users: (1..=12).map(User::seeded).collect(),
        blocked: vec![2, 3, 5, 7, 11],
    }
}

pub fn app() -> Router {
    app_with(seed())
}

pub fn app_with(directory: Directory) -> Router {
    let db: Db = Arc::new(RwLock::new(directory));
    Router::new()
        .route("/1.1/blocks/ids.json", get(block_ids))
        .route("/1.1/blocks/list.json", get(block_list))
        .route("/1.1/blocks/create.json", post(block_create))
        .route("/1.1/blocks/destroy.json", post(block_destroy))
        .route("/1.1/help/configuration.json", get(configuration))
        .route("/1.1/help/languages.json", get(languages))
        .route("/1.1/help/privacy.json", get(privacy))
        .route("/1.1/help/tos.json", get(tos))
        .route("/1.1/application/rate_limit_status.json", get(rate_limit_status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock: serving");
    }
    axum::serve(listener, app()).await
}

fn api_error(status: StatusCode, code: i64, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "errors": [{ "code": code, "message": message }] })),
    )
}

/// Start offset and size of the page a cursor asks for.
///
/// Positive cursors are start offsets. Negative cursors end the page at
/// `-cursor`; `-1` therefore lands on the first page.
fn page_window(params: &HashMap<String, String>) -> Result<(usize, usize), (StatusCode, Json<Value>)> {
    let count = match params.get("count") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, 44, "count parameter is invalid."))?,
        None => DEFAULT_PAGE_SIZE,
    };
    let cursor = match params.get("cursor") {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|c| *c != 0)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, 44, "cursor parameter is invalid."))?,
        None => -1,
    };
    let start = if cursor > 0 {
        cursor as usize
    } else {
        (cursor.unsigned_abs() as usize).saturating_sub(count)
    };
    Ok((start, count))
}

fn cursored<T: Serialize>(items_key: &str, all: &[T], start: usize, count: usize) -> Value {
    let start = start.min(all.len());
    let end = (start + count).min(all.len());
    let next_cursor = if end < all.len() { end as i64 } else { 0 };
    let previous_cursor = if start > 0 { -(start as i64) } else { 0 };

    let mut body = Map::new();
    body.insert(items_key.to_string(), json!(&all[start..end]));
    body.insert("previous_cursor".to_string(), json!(previous_cursor));
    body.insert("previous_cursor_str".to_string(), json!(previous_cursor.to_string()));
    body.insert("next_cursor".to_string(), json!(next_cursor));
    body.insert("next_cursor_str".to_string(), json!(next_cursor.to_string()));
    Value::Object(body)
}

async fn block_ids(State(db): State<Db>, Query(params): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let (start, count) = page_window(&params)?;
    let dir = db.read().await;
    Ok(Json(cursored("ids", &dir.blocked, start, count)))
}

async fn block_list(State(db): State<Db>, Query(params): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let (start, count) = page_window(&params)?;
    let dir = db.read().await;
    let users: Vec<User> = dir
        .blocked
        .iter()
        .filter_map(|id| dir.users.iter().find(|u| u.id == *id).cloned())
        .collect();
    Ok(Json(cursored("users", &users, start, count)))
}

fn find_target(dir: &Directory, form: &HashMap<String, String>) -> Result<User, (StatusCode, Json<Value>)> {
    let found = if let Some(id) = form.get("user_id") {
        let id: i64 = id
            .parse()
            .map_err(|_| api_error(StatusCode::NOT_FOUND, 50, "User not found."))?;
        dir.users.iter().find(|u| u.id == id)
    } else if let Some(name) = form.get("screen_name") {
        dir.users.iter().find(|u| u.screen_name.eq_ignore_ascii_case(name))
    } else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            38,
            "screen_name or user_id parameter is missing.",
        ));
    };
    found
        .cloned()
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, 50, "User not found."))
}

async fn block_create(State(db): State<Db>, Form(form): Form<HashMap<String, String>>) -> ApiResult<User> {
    let mut dir = db.write().await;
    let user = find_target(&dir, &form)?;
    if !dir.blocked.contains(&user.id) {
        dir.blocked.push(user.id);
    }
    Ok(Json(user))
}

async fn block_destroy(State(db): State<Db>, Form(form): Form<HashMap<String, String>>) -> ApiResult<User> {
    let mut dir = db.write().await;
    let user = find_target(&dir, &form)?;
    dir.blocked.retain(|id| *id != user.id);
    Ok(Json(user))
}

async fn configuration() -> Json<Value> {
    Json(json!({
        "characters_reserved_per_media": 24,
        "dm_text_character_limit": 10000,
        "max_media_per_upload": 1,
        "non_username_paths": ["about", "account", "settings"],
        "photo_size_limit": 3145728,
        "photo_sizes": {
            "thumb": {"h": 150, "w": 150, "resize": "crop"},
            "small": {"h": 480, "w": 340, "resize": "fit"},
            "medium": {"h": 1200, "w": 600, "resize": "fit"},
            "large": {"h": 2048, "w": 1024, "resize": "fit"}
        },
        "short_url_length": 23,
        "short_url_length_https": 23
    }))
}

async fn languages() -> Json<Value> {
    Json(json!([
        {"code": "en", "name": "English", "local_name": "English", "status": "production"},
        {"code": "fr", "name": "French", "local_name": "français", "status": "production"},
        {"code": "ja", "name": "Japanese", "local_name": "日本語", "status": "production"}
    ]))
}

async fn privacy() -> Json<Value> {
    Json(json!({ "privacy": "We respect your privacy." }))
}

async fn tos() -> Json<Value> {
    Json(json!({ "tos": "Be nice." }))
}

fn rate_limit_table() -> Vec<(&'static str, Vec<(&'static str, i64)>)> {
    vec![
        ("application", vec![("/application/rate_limit_status", 180)]),
        ("blocks", vec![("/blocks/list", 15), ("/blocks/ids", 15)]),
        (
            "help",
            vec![
                ("/help/configuration", 15),
                ("/help/languages", 15),
                ("/help/privacy", 15),
                ("/help/tos", 15),
            ],
        ),
    ]
}

async fn rate_limit_status(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let wanted: Option<Vec<&str>> = params
        .get("resources")
        .map(|r| r.split(',').map(str::trim).filter(|s| !s.is_empty()).collect());

    let mut resources = Map::new();
    for (family, endpoints) in rate_limit_table() {
        if wanted.as_ref().is_some_and(|w| !w.contains(&family)) {
            continue;
        }
        let mut group = Map::new();
        for (path, limit) in endpoints {
            group.insert(
                path.to_string(),
                json!({ "limit": limit, "remaining": limit - 1, "reset": 1_700_000_000 }),
            );
        }
        resources.insert(family.to_string(), Value::Object(group));
    }

    Json(json!({
        "rate_limit_context": { "access_token": "mock" },
        "resources": resources
    }))
}
