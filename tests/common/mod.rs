#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use autoplanning::models::{
    CreateResourceRequest, CreateSubjectRequest, Resource, Semester, Subject,
    UpdateResourceRequest, UpdateSubjectRequest, UpdateWeekRequest, Week,
};
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;

pub const EXPORT_BYTES: &[u8] = b"PK\x03\x04fake-xlsx";

#[derive(Default)]
pub struct Store {
    pub subjects: Vec<Subject>,
    next_id: i64,
    pub requests: Vec<String>,
    pub failing: HashSet<String>,
    pub delay: Option<Duration>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        1000 + self.next_id
    }

    fn week_mut(&mut self, id: i64) -> Option<&mut Week> {
        self.subjects
            .iter_mut()
            .flat_map(|s| s.weeks.iter_mut())
            .find(|w| w.id == id)
    }

    fn resource_mut(&mut self, id: i64) -> Option<&mut Resource> {
        self.subjects
            .iter_mut()
            .flat_map(|s| s.weeks.iter_mut())
            .flat_map(|w| w.resources.iter_mut())
            .find(|r| r.id == id)
    }
}

/// In-process stand-in for the planning REST service.
#[derive(Clone)]
pub struct FakeBackend {
    pub store: Arc<Mutex<Store>>,
    pub base_url: String,
}

impl FakeBackend {
    pub async fn start(subjects: Vec<Subject>) -> Self {
        let store = Arc::new(Mutex::new(Store {
            subjects,
            ..Store::default()
        }));

        let api = Router::new()
            .route("/subjects", get(list_subjects).post(create_subject))
            .route(
                "/subjects/{id}",
                get(get_subject).put(update_subject).delete(delete_subject),
            )
            .route("/weeks/{id}", get(get_week).put(update_week))
            .route("/weeks/{id}/resources", post(create_resource))
            .route(
                "/weeks/resources/{id}",
                put(update_resource).delete(delete_resource),
            )
            .route("/export/subjects/{id}", get(export_subject))
            .layer(middleware::from_fn_with_state(store.clone(), record))
            .with_state(store.clone());
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });

        Self {
            store,
            base_url: format!("http://{}/api", addr),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }

    pub fn count(&self, request: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == request).count()
    }

    pub fn fail(&self, request: &str) {
        self.store.lock().unwrap().failing.insert(request.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        self.store.lock().unwrap().delay = Some(delay);
    }

    pub fn subject(&self, id: i64) -> Option<Subject> {
        self.store
            .lock()
            .unwrap()
            .subjects
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }
}

async fn record(State(store): State<Arc<Mutex<Store>>>, req: Request, next: Next) -> Response {
    let key = format!("{} {}", req.method(), req.uri().path().trim_start_matches("/api"));
    let (fails, delay) = {
        let mut store = store.lock().unwrap();
        store.requests.push(key.clone());
        (store.failing.contains(&key), store.delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }
    next.run(req).await
}

type Shared = State<Arc<Mutex<Store>>>;

async fn list_subjects(State(store): Shared) -> Json<Vec<Subject>> {
    Json(store.lock().unwrap().subjects.clone())
}

async fn get_subject(State(store): Shared, Path(id): Path<i64>) -> Result<Json<Subject>, StatusCode> {
    let store = store.lock().unwrap();
    store
        .subjects
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_subject(
    State(store): Shared,
    Json(req): Json<CreateSubjectRequest>,
) -> Json<Subject> {
    let mut store = store.lock().unwrap();
    let id = store.next_id();
    let weeks = (1..=3)
        .map(|n| Week {
            id: id * 100 + i64::from(n),
            week_number: n,
            content: String::new(),
            resources: Vec::new(),
        })
        .collect();
    let subject = Subject {
        id,
        name: req.name,
        semester: req.semester,
        start_week: 1,
        end_week: 3,
        weeks,
        semester_start_date: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    };
    store.subjects.push(subject.clone());
    Json(subject)
}

async fn update_subject(
    State(store): Shared,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSubjectRequest>,
) -> Result<Json<Subject>, StatusCode> {
    let mut store = store.lock().unwrap();
    let subject = store
        .subjects
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = req.name {
        subject.name = name;
    }
    if let Some(semester) = req.semester {
        subject.semester = semester;
    }
    Ok(Json(subject.clone()))
}

async fn delete_subject(State(store): Shared, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().unwrap();
    let before = store.subjects.len();
    store.subjects.retain(|s| s.id != id);
    if store.subjects.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn get_week(State(store): Shared, Path(id): Path<i64>) -> Result<Json<Week>, StatusCode> {
    let mut store = store.lock().unwrap();
    store
        .week_mut(id)
        .map(|w| Json(w.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_week(
    State(store): Shared,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWeekRequest>,
) -> Result<Json<Week>, StatusCode> {
    let mut store = store.lock().unwrap();
    let week = store.week_mut(id).ok_or(StatusCode::NOT_FOUND)?;
    week.content = req.content;
    Ok(Json(week.clone()))
}

async fn create_resource(
    State(store): Shared,
    Path(week_id): Path<i64>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<Json<Resource>, StatusCode> {
    let mut store = store.lock().unwrap();
    let id = store.next_id();
    let week = store.week_mut(week_id).ok_or(StatusCode::NOT_FOUND)?;
    let resource = Resource {
        id,
        url: req.url,
        title: req.title,
        description: req.description,
    };
    week.resources.push(resource.clone());
    Ok(Json(resource))
}

async fn update_resource(
    State(store): Shared,
    Path(id): Path<i64>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<Resource>, StatusCode> {
    let mut store = store.lock().unwrap();
    let resource = store.resource_mut(id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(url) = req.url {
        resource.url = url;
    }
    if req.title.is_some() {
        resource.title = req.title;
    }
    if req.description.is_some() {
        resource.description = req.description;
    }
    Ok(Json(resource.clone()))
}

async fn delete_resource(State(store): Shared, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().unwrap();
    let mut removed = false;
    for week in store.subjects.iter_mut().flat_map(|s| s.weeks.iter_mut()) {
        let before = week.resources.len();
        week.resources.retain(|r| r.id != id);
        removed |= week.resources.len() < before;
    }
    if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn export_subject(State(store): Shared, Path(id): Path<i64>) -> Response {
    let exists = store.lock().unwrap().subjects.iter().any(|s| s.id == id);
    if !exists {
        return StatusCode::NOT_FOUND.into_response();
    }
    (
        [(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )],
        EXPORT_BYTES.to_vec(),
    )
        .into_response()
}

pub fn week(id: i64, week_number: i32, content: &str) -> Week {
    Week {
        id,
        week_number,
        content: content.to_string(),
        resources: Vec::new(),
    }
}

/// Weeks 17-19, stored out of order, with week 17 already filled in.
pub fn physics() -> Subject {
    Subject {
        id: 1,
        name: "Physics".to_string(),
        semester: Semester::Second,
        start_week: 17,
        end_week: 19,
        weeks: vec![
            week(12, 18, ""),
            week(11, 17, "Kinematics: displacement, velocity and acceleration"),
            week(13, 19, ""),
        ],
        semester_start_date: NaiveDate::from_ymd_opt(2025, 3, 3),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}
