use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use library_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct Api {
    router: Router,
    author: Uuid,
}

fn api() -> Api {
    let author = Uuid::now_v7();
    let mut settings = Settings::default();
    settings.server.public_url = "https://library.test".to_string();
    settings.library.authors = vec![author];

    let registry = library_app::build_registry(&settings).unwrap();
    Api {
        router: library_http::build_router(&registry, &settings),
        author,
    }
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

impl Api {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        Reply {
            status,
            location,
            body,
        }
    }

    fn books(&self) -> String {
        format!("/api/authors/{}/books", self.author)
    }

    fn book(&self, id: impl std::fmt::Display) -> String {
        format!("/api/authors/{}/books/{}", self.author, id)
    }
}

fn rels(body: &Value) -> Vec<String> {
    body["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| format!("{} {}", l["method"].as_str().unwrap(), l["rel"].as_str().unwrap()))
        .collect()
}

#[tokio::test]
async fn create_then_get_round_trip() {
    let api = api();

    let created = api
        .send(
            Method::POST,
            &api.books(),
            Some(json!({"title": "X", "description": "Y"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let id = created.body["id"].as_str().unwrap().to_string();
    assert_eq!(created.body["authorId"], api.author.to_string());
    assert_eq!(
        created.location.as_deref(),
        Some(format!("https://library.test{}", api.book(&id)).as_str())
    );
    assert_eq!(
        rels(&created.body),
        vec![
            "GET self",
            "DELETE delete_book",
            "PUT update_book",
            "PATCH partially_update_book"
        ]
    );

    let fetched = api.send(Method::GET, &api.book(&id), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
}

#[tokio::test]
async fn list_wraps_books_with_collection_link() {
    let api = api();
    for (title, description) in [("B", "b"), ("A", "a")] {
        api.send(
            Method::POST,
            &api.books(),
            Some(json!({"title": title, "description": description})),
        )
        .await;
    }

    let listed = api.send(Method::GET, &api.books(), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["value"].as_array().unwrap().len(), 2);
    assert_eq!(listed.body["value"][0]["title"], "A");
    assert_eq!(rels(&listed.body), vec!["GET self"]);
    assert_eq!(
        listed.body["links"][0]["href"],
        format!("https://library.test{}", api.books())
    );
}

#[tokio::test]
async fn unknown_author_is_not_found_everywhere() {
    let api = api();
    let stranger = Uuid::now_v7();
    let books = format!("/api/authors/{stranger}/books");
    let book = format!("{books}/{}", Uuid::now_v7());

    let requests = [
        (Method::GET, books.clone(), None),
        (Method::POST, books, Some(json!({"title": "X", "description": "X"}))),
        (Method::GET, book.clone(), None),
        (Method::PUT, book.clone(), Some(json!({"title": "X", "description": "Y"}))),
        (Method::PATCH, book.clone(), Some(json!([]))),
        (Method::DELETE, book, None),
    ];

    for (method, uri, body) in requests {
        let reply = api.send(method.clone(), &uri, body).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(reply.body["error"]["code"], "not_found");
    }
}

#[tokio::test]
async fn missing_or_broken_bodies_are_bad_requests() {
    let api = api();
    let target = api.book(Uuid::now_v7());

    let empty = api.send(Method::POST, &api.books(), None).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"]["code"], "bad_request");

    let null = api.send(Method::PUT, &target, Some(Value::Null)).await;
    assert_eq!(null.status, StatusCode::BAD_REQUEST);

    let not_a_patch = api
        .send(Method::PATCH, &target, Some(json!({"title": "X"})))
        .await;
    assert_eq!(not_a_patch.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_failure_is_unprocessable() {
    let api = api();

    let reply = api
        .send(
            Method::POST,
            &api.books(),
            Some(json!({"title": "Same", "description": "Same"})),
        )
        .await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["error"]["code"], "validation_error");
    assert_eq!(
        reply.body["error"]["details"][0],
        json!({"field": "BookForCreation", "message": "description must differ from title"})
    );
}

#[tokio::test]
async fn put_upserts_then_replaces() {
    let api = api();
    let id = Uuid::now_v7();

    let created = api
        .send(
            Method::PUT,
            &api.book(id),
            Some(json!({"title": "Emma", "description": "Matchmaking"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["id"], id.to_string());
    assert_eq!(rels(&created.body).len(), 4);

    let replaced = api
        .send(
            Method::PUT,
            &api.book(id),
            Some(json!({"title": "Emma", "description": "Highbury"})),
        )
        .await;
    assert_eq!(replaced.status, StatusCode::NO_CONTENT);
    assert_eq!(replaced.body, Value::Null);

    let fetched = api.send(Method::GET, &api.book(id), None).await;
    assert_eq!(fetched.body["description"], "Highbury");
}

#[tokio::test]
async fn patch_upserts_then_merges() {
    let api = api();
    let id = Uuid::now_v7();

    let created = api
        .send(
            Method::PATCH,
            &api.book(id),
            Some(json!([
                {"op": "replace", "path": "/title", "value": "X"},
                {"op": "replace", "path": "/description", "value": "Y"}
            ])),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["id"], id.to_string());

    let rejected = api
        .send(
            Method::PATCH,
            &api.book(id),
            Some(json!([{"op": "replace", "path": "/title", "value": "Y"}])),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);

    let patched = api
        .send(
            Method::PATCH,
            &api.book(id),
            Some(json!([{"op": "replace", "path": "/title", "value": "Z"}])),
        )
        .await;
    assert_eq!(patched.status, StatusCode::NO_CONTENT);

    let fetched = api.send(Method::GET, &api.book(id), None).await;
    assert_eq!(fetched.body["title"], "Z");
    assert_eq!(fetched.body["description"], "Y");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let api = api();
    let missing = api.send(Method::DELETE, &api.book(Uuid::now_v7()), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let created = api
        .send(
            Method::POST,
            &api.books(),
            Some(json!({"title": "X", "description": "Y"})),
        )
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();

    let deleted = api.send(Method::DELETE, &api.book(&id), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = api.send(Method::GET, &api.book(&id), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let api = api();

    let health = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let response = api.router.clone().oneshot(health).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let docs = api.send(Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(docs.status, StatusCode::OK);
    assert!(docs.body["paths"]["/api/authors/{authorId}/books/{bookId}"]["patch"].is_object());
}

#[tokio::test]
async fn malformed_ids_use_the_error_envelope() {
    let api = api();

    let bad_author = api.send(Method::GET, "/api/authors/not-a-uuid/books", None).await;
    assert_eq!(bad_author.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_author.body["error"]["code"], "bad_request");

    let bad_book = api
        .send(Method::DELETE, &format!("{}/42", api.books()), None)
        .await;
    assert_eq!(bad_book.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_book.body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn patch_paths_ignore_member_case() {
    let api = api();
    let id = Uuid::now_v7();

    let created = api
        .send(
            Method::PATCH,
            &api.book(id),
            Some(json!([
                {"op": "add", "path": "/Title", "value": "Emma"},
                {"op": "add", "path": "/DESCRIPTION", "value": "Matchmaking"}
            ])),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["title"], "Emma");
    assert_eq!(created.body["description"], "Matchmaking");
}
