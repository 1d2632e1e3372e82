#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use serde::Serialize;

use cinematch::error::{AppError, AppResult};
use cinematch::services::providers::{MetadataProvider, PosterLookup};
use cinematch::services::Delay;
use cinematch::storage::{has_pickle_signature, ArtifactSource};

pub const PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=No+Poster";

/// Pickles a value the way Python's protocol 3 would lay it out
pub fn pickle<T: Serialize>(value: &T) -> Vec<u8> {
    let bytes = serde_pickle::to_vec(value, serde_pickle::SerOptions::new()).unwrap();
    if has_pickle_signature(&bytes) {
        bytes
    } else {
        [&[0x80u8, 0x03][..], &bytes[..]].concat()
    }
}

#[derive(Serialize)]
struct Record {
    movie_id: i64,
    title: String,
}

/// Catalog A..G as a list of records
pub fn movies_pickle() -> Vec<u8> {
    let records: Vec<Record> = ["A", "B", "C", "D", "E", "F", "G"]
        .iter()
        .enumerate()
        .map(|(i, t)| Record {
            movie_id: 100 + i as i64,
            title: t.to_string(),
        })
        .collect();
    pickle(&records)
}

/// 7x7 matrix whose row A is [1.0, 0.9, 0.1, 0.8, 0.95, 0.2, 0.3]
pub fn similarity_pickle() -> Vec<u8> {
    let a = vec![1.0, 0.9, 0.1, 0.8, 0.95, 0.2, 0.3];
    let mut rows: Vec<Vec<f64>> = (0..7)
        .map(|i| {
            let mut row = vec![a[i]; 7];
            row[i] = 1.0;
            row
        })
        .collect();
    rows[0] = a;
    pickle(&rows)
}

pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cinematch-{}-{}", label, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Binds an ephemeral port and serves `app` on it, returning the base URL
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// In-memory artifact source
#[derive(Default)]
pub struct StubSource {
    pub files: HashMap<String, Vec<u8>>,
}

impl StubSource {
    pub fn serving_fixtures() -> Self {
        let mut files = HashMap::new();
        files.insert("movies-id".to_string(), movies_pickle());
        files.insert("similarity-id".to_string(), similarity_pickle());
        Self { files }
    }

    pub fn offline() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ArtifactSource for StubSource {
    async fn fetch(&self, remote_id: &str) -> AppResult<Vec<u8>> {
        self.files
            .get(remote_id)
            .cloned()
            .ok_or_else(|| AppError::ExternalApi("Artifact download returned status 404".to_string()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Metadata provider that knows every title except those listed
#[derive(Default)]
pub struct StubMetadata {
    pub unknown: Vec<String>,
}

#[async_trait::async_trait]
impl MetadataProvider for StubMetadata {
    async fn lookup_poster(&self, title: &str) -> AppResult<PosterLookup> {
        if self.unknown.iter().any(|t| t == title) {
            Ok(PosterLookup::NotFound("Movie not found!".to_string()))
        } else {
            Ok(PosterLookup::Found(format!("https://img.example/{}.jpg", title)))
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Delay that records requested waits instead of sleeping
#[derive(Default)]
pub struct RecordingDelay {
    pub waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
