//! Integration tests for the Evaluacion REST resource.
//!
//! Requests are driven straight through `Router::route` with in-memory
//! bodies, so no socket is opened.

use std::any::Any;
use std::convert::Infallible;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http_body_util::Full;
use hyper::body::{Body, Bytes, Frame};
use hyper::{Method, Request, Response};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

use evaluacion_api::router::Router;
use evaluacion_core::config::StoreConfig;
use evaluacion_core::persistence::{PersistenceManager, SNAPSHOT_FILE};
use evaluacion_core::sort::Sort;
use evaluacion_core::{Evaluacion, EvaluacionStore};

const DEFAULT_STATUS_EVALUACION: i32 = 1;
const UPDATED_STATUS_EVALUACION: i32 = 2;

struct TestContext {
    router: Router,
    store: Arc<EvaluacionStore>,
    config: StoreConfig,
    _temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self::with_config(|_, _| {})
    }

    /// Builds a context whose config is adjusted by `tweak` after defaults
    /// pointing at a fresh temp dir are applied.
    fn with_config(tweak: impl FnOnce(&mut StoreConfig, &Path)) -> Self {
        let temp_dir = tempdir().unwrap();
        let mut config = StoreConfig {
            data_dir: temp_dir.path().to_path_buf(),
            persistence_retry_delay_ms: 0,
            ..Default::default()
        };
        tweak(&mut config, temp_dir.path());
        let store = Arc::new(EvaluacionStore::new());
        let persistence = Arc::new(PersistenceManager::new(&config));
        let router = Router::new(store.clone(), persistence, Arc::new(config.clone()));
        Self {
            router,
            store,
            config,
            _temp_dir: temp_dir,
        }
    }

    async fn perform(&self, method: Method, uri: &str, body: Option<Value>) -> Response<Bytes> {
        let body = match body {
            Some(value) => Bytes::from(serde_json::to_vec(&value).unwrap()),
            None => Bytes::new(),
        };
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json;charset=UTF-8")
            .body(Full::new(body))
            .unwrap();
        match self.router.route(req).await {
            Ok(response) => response,
            Err(err) => Response::from(err),
        }
    }

    fn all(&self) -> Vec<Evaluacion> {
        self.store.find_all(&Sort::unsorted()).unwrap()
    }
}

fn create_entity() -> Evaluacion {
    Evaluacion::default().status_evaluacion(DEFAULT_STATUS_EVALUACION)
}

fn json_body(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn header<'a>(response: &'a Response<Bytes>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn create_evaluacion() {
    let ctx = TestContext::new();
    let database_size_before_create = ctx.all().len();

    let response = ctx
        .perform(
            Method::POST,
            "/api/evaluacions",
            Some(serde_json::to_value(create_entity()).unwrap()),
        )
        .await;
    assert_eq!(response.status(), 201);

    let evaluacion_list = ctx.all();
    assert_eq!(evaluacion_list.len(), database_size_before_create + 1);
    let test_evaluacion = evaluacion_list.last().unwrap();
    assert_eq!(
        test_evaluacion.status_evaluacion,
        Some(DEFAULT_STATUS_EVALUACION)
    );

    let body = json_body(&response);
    let id = test_evaluacion.id.unwrap();
    assert_eq!(body, json!({"id": id, "status_evaluacion": DEFAULT_STATUS_EVALUACION}));
    assert_eq!(
        header(&response, "Location"),
        Some(format!("/api/evaluacions/{}", id).as_str())
    );
    assert_eq!(
        header(&response, "X-evaluacionApp-alert"),
        Some("evaluacionApp.evaluacion.created")
    );
    assert_eq!(
        header(&response, "X-evaluacionApp-params"),
        Some(id.to_string().as_str())
    );
}

#[tokio::test]
async fn create_evaluacion_with_existing_id() {
    let ctx = TestContext::new();
    let database_size_before_create = ctx.all().len();

    // An entity with an existing ID cannot be created
    let evaluacion = create_entity().with_id(1);
    let response = ctx
        .perform(
            Method::POST,
            "/api/evaluacions",
            Some(serde_json::to_value(evaluacion).unwrap()),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        header(&response, "X-evaluacionApp-error"),
        Some("error.idexists")
    );

    assert_eq!(ctx.all().len(), database_size_before_create);
}

#[tokio::test]
async fn get_all_evaluacions() {
    let ctx = TestContext::new();
    let evaluacion = ctx.store.create(create_entity()).unwrap();
    ctx.store.create(create_entity().status_evaluacion(5)).unwrap();

    let response = ctx
        .perform(Method::GET, "/api/evaluacions?sort=id,desc", None)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        header(&response, "Content-Type"),
        Some("application/json;charset=UTF-8")
    );

    let body = json_body(&response);
    let items = body.as_array().unwrap();
    assert!(items
        .iter()
        .any(|item| item["id"] == json!(evaluacion.id.unwrap())));
    assert!(items
        .iter()
        .any(|item| item["status_evaluacion"] == json!(DEFAULT_STATUS_EVALUACION)));

    // Descending by id
    let ids: Vec<u64> = items.iter().map(|i| i["id"].as_u64().unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn get_all_evaluacions_rejects_unknown_sort_property() {
    let ctx = TestContext::new();
    let response = ctx
        .perform(Method::GET, "/api/evaluacions?sort=nombre,asc", None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(json_body(&response)["success"], json!(false));
}

#[tokio::test]
async fn get_all_evaluacions_ignores_blank_sort() {
    let ctx = TestContext::new();
    ctx.store.create(create_entity()).unwrap();
    ctx.store.create(create_entity()).unwrap();

    let response = ctx.perform(Method::GET, "/api/evaluacions?sort=", None).await;
    assert_eq!(response.status(), 200);
    assert_eq!(json_body(&response).as_array().unwrap().len(), 2);

    let response = ctx
        .perform(Method::GET, "/api/evaluacions?sort=id,desc&sort=", None)
        .await;
    assert_eq!(response.status(), 200);
    let ids: Vec<u64> = json_body(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn get_evaluacion() {
    let ctx = TestContext::new();
    let evaluacion = ctx.store.create(create_entity()).unwrap();
    let id = evaluacion.id.unwrap();

    let response = ctx
        .perform(Method::GET, &format!("/api/evaluacions/{}", id), None)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        header(&response, "Content-Type"),
        Some("application/json;charset=UTF-8")
    );

    let body = json_body(&response);
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["status_evaluacion"], json!(DEFAULT_STATUS_EVALUACION));
}

#[tokio::test]
async fn get_non_existing_evaluacion() {
    let ctx = TestContext::new();
    let response = ctx
        .perform(Method::GET, &format!("/api/evaluacions/{}", i64::MAX), None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn get_evaluacion_with_malformed_id() {
    let ctx = TestContext::new();
    let response = ctx.perform(Method::GET, "/api/evaluacions/abc", None).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn update_evaluacion() {
    let ctx = TestContext::new();
    let evaluacion = ctx.store.create(create_entity()).unwrap();
    let database_size_before_update = ctx.all().len();

    let updated_evaluacion = ctx
        .store
        .find_by_id(evaluacion.id.unwrap())
        .unwrap()
        .status_evaluacion(UPDATED_STATUS_EVALUACION);

    let response = ctx
        .perform(
            Method::PUT,
            "/api/evaluacions",
            Some(serde_json::to_value(&updated_evaluacion).unwrap()),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        header(&response, "X-evaluacionApp-alert"),
        Some("evaluacionApp.evaluacion.updated")
    );

    let evaluacion_list = ctx.all();
    assert_eq!(evaluacion_list.len(), database_size_before_update);
    let test_evaluacion = evaluacion_list.last().unwrap();
    assert_eq!(
        test_evaluacion.status_evaluacion,
        Some(UPDATED_STATUS_EVALUACION)
    );
}

#[tokio::test]
async fn update_non_existing_evaluacion() {
    let ctx = TestContext::new();
    let database_size_before_update = ctx.all().len();

    // If the entity doesn't have an ID, it will be created instead of just being updated
    let response = ctx
        .perform(
            Method::PUT,
            "/api/evaluacions",
            Some(serde_json::to_value(create_entity()).unwrap()),
        )
        .await;
    assert_eq!(response.status(), 201);
    assert!(header(&response, "Location").is_some());

    assert_eq!(ctx.all().len(), database_size_before_update + 1);
}

#[tokio::test]
async fn update_with_unknown_id_creates() {
    let ctx = TestContext::new();

    let response = ctx
        .perform(
            Method::PUT,
            "/api/evaluacions",
            Some(json!({"id": 900, "status_evaluacion": 3})),
        )
        .await;
    assert_eq!(response.status(), 201);
    assert_eq!(ctx.all().len(), 1);
    assert_ne!(json_body(&response)["id"], json!(900));
}

#[tokio::test]
async fn delete_evaluacion() {
    let ctx = TestContext::new();
    let evaluacion = ctx.store.create(create_entity()).unwrap();
    let database_size_before_delete = ctx.all().len();
    let uri = format!("/api/evaluacions/{}", evaluacion.id.unwrap());

    let response = ctx.perform(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        header(&response, "X-evaluacionApp-alert"),
        Some("evaluacionApp.evaluacion.deleted")
    );

    assert_eq!(ctx.all().len(), database_size_before_delete - 1);
    let response = ctx.perform(Method::GET, &uri, None).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn delete_non_existing_evaluacion_is_ok() {
    let ctx = TestContext::new();
    let response = ctx
        .perform(Method::DELETE, &format!("/api/evaluacions/{}", i64::MAX), None)
        .await;
    assert_eq!(response.status(), 200);
    assert!(ctx.all().is_empty());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let ctx = TestContext::new();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/evaluacions")
        .body(Full::new(Bytes::from_static(b"{not json")))
        .unwrap();
    let err = ctx.router.route(req).await.unwrap_err();
    assert_eq!(Response::from(err).status(), 400);
    assert!(ctx.all().is_empty());
}

#[tokio::test]
async fn unknown_route_and_wrong_method() {
    let ctx = TestContext::new();

    let response = ctx.perform(Method::GET, "/api/unknown", None).await;
    assert_eq!(response.status(), 404);

    let response = ctx.perform(Method::DELETE, "/api/evaluacions", None).await;
    assert_eq!(response.status(), 405);

    let response = ctx.perform(Method::PUT, "/api/evaluacions/1", None).await;
    assert_eq!(response.status(), 405);
}

#[tokio::test]
async fn mutations_are_written_to_the_snapshot() {
    let ctx = TestContext::new();

    let response = ctx
        .perform(
            Method::POST,
            "/api/evaluacions",
            Some(serde_json::to_value(create_entity()).unwrap()),
        )
        .await;
    assert_eq!(response.status(), 201);
    assert!(ctx.config.data_dir.join(SNAPSHOT_FILE).exists());

    let reloaded = PersistenceManager::new(&ctx.config).load().unwrap();
    assert_eq!(reloaded.count().unwrap(), 1);
}

#[tokio::test]
async fn failed_snapshot_write_is_server_error() {
    // data_dir is a regular file, so the snapshot directory cannot be created
    let ctx = TestContext::with_config(|config, dir| {
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        config.data_dir = blocker;
    });

    let response = ctx
        .perform(
            Method::POST,
            "/api/evaluacions",
            Some(serde_json::to_value(create_entity()).unwrap()),
        )
        .await;
    assert_eq!(response.status(), 500);
    assert_eq!(json_body(&response)["success"], json!(false));
}

/// Request body that never yields a frame.
struct PendingBody;

impl Body for PendingBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Pending
    }
}

#[tokio::test]
async fn stalled_request_body_times_out() {
    let ctx = TestContext::with_config(|config, _| config.request_timeout_ms = 10);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/evaluacions")
        .body(PendingBody)
        .unwrap();
    let err = ctx.router.route(req).await.unwrap_err();
    assert_eq!(Response::from(err).status(), 408);
    assert!(ctx.all().is_empty());
}

#[test]
fn equals_verifier() {
    let evaluacion1 = Evaluacion::default().with_id(1);
    let evaluacion2 = Evaluacion::default().with_id(1);
    assert_eq!(evaluacion1, evaluacion2);

    let evaluacion2 = Evaluacion::default().with_id(2);
    assert_ne!(evaluacion1, evaluacion2);

    let unsaved = Evaluacion::default();
    assert_ne!(evaluacion1, unsaved);
    assert!(!evaluacion1.equals(None));
    let other = String::from("evaluacion");
    assert!(!evaluacion1.equals(Some(&other as &dyn Any)));
}
