//! Product API integration tests
//! Run: cargo test -p catalog-server --test products_api

mod common;

use catalog_server::BatchPolicy;
use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn post_then_get_applies_defaults() {
    let app = TestApp::new();

    let (status, body) = app
        .call(
            Method::POST,
            "/products",
            Some(json!({"codigo": "P-1", "volumen": "50ml", "nombre": "Acqua", "precio": 49.99})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "insertedCount": 1, "modifiedCount": 0}));

    let (status, product) = app.call(Method::GET, "/products/P-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["codigo"], "P-1");
    assert_eq!(product["volumen"], "50ml");
    assert_eq!(product["nombre"], "Acqua");
    assert_eq!(product["precio"], 49.99);
    assert_eq!(product["genero"], "Unisex");
    assert_eq!(product["stock"], 0);
    assert_eq!(product["descuento"], false);
    assert_eq!(product["tags"], json!([]));
    assert_eq!(product["imagenes"], json!([]));
    assert_eq!(product["ubicacion"], "");
    assert_eq!(product["schemaVersion"], 2);
    assert!(!product["id"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn repeated_descriptive_payload_is_idempotent() {
    let app = TestApp::new();
    let payload = json!({
        "codigo": "P-2",
        "volumen": "100ml",
        "nombre": "Bleu",
        "marca": "Maison",
        "tags": ["amaderado", "citrico"],
        "genero": "Masculino"
    });

    app.call(Method::POST, "/products", Some(payload.clone())).await;
    let (_, first) = app.call(Method::GET, "/products/P-2", None).await;

    let (status, body) = app.call(Method::POST, "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);
    let (_, second) = app.call(Method::GET, "/products/P-2", None).await;

    for field in ["id", "codigo", "volumen", "nombre", "marca", "tags", "genero", "stock", "createdAt"] {
        assert_eq!(first[field], second[field], "field {field} changed");
    }
}

#[tokio::test]
async fn stock_accumulates() {
    let app = TestApp::new();

    app.call(
        Method::POST,
        "/products",
        Some(json!({"codigo": "X", "volumen": "50ml", "stock": 5})),
    )
    .await;
    let (status, body) = app
        .call(
            Method::POST,
            "/products",
            Some(json!({"codigo": "X", "volumen": "50ml", "stock": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "insertedCount": 0, "modifiedCount": 1}));

    let (_, product) = app.call(Method::GET, "/products/X", None).await;
    assert_eq!(product["stock"], 8);
}

#[tokio::test]
async fn same_code_twice_in_one_batch_increments_twice() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/products",
            Some(json!([
                {"codigo": "D", "stock": 2},
                {"codigo": "D", "stock": 4}
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insertedCount"], 1);
    assert_eq!(body["modifiedCount"], 1);

    let (_, product) = app.call(Method::GET, "/products/D", None).await;
    assert_eq!(product["stock"], 6);
}

#[tokio::test]
async fn batch_partial_failure_reports_index() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/products",
            Some(json!([
                {"codigo": "A", "volumen": "50ml"},
                {"codigo": "", "volumen": "50ml"}
            ])),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    let errors = body["details"]["errors"].as_array().expect("errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["index"], 1);
    assert_eq!(body["details"]["insertedCount"], 1);

    let (status, product) = app.call(Method::GET, "/products/A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["codigo"], "A");
}

#[tokio::test]
async fn reject_all_policy_applies_nothing() {
    let app = TestApp::with_policy(BatchPolicy::RejectAll);
    let (status, body) = app
        .call(
            Method::POST,
            "/products",
            Some(json!([
                {"codigo": "A", "volumen": "50ml"},
                {"codigo": "B", "volumen": "7ml"}
            ])),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["errors"][0]["index"], 1);
    assert_eq!(body["details"]["insertedCount"], 0);

    let (status, _) = app.call(Method::GET, "/products/A", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_body_shapes_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::POST, "/products", Some(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (status, _) = app.call(Method::POST, "/products", Some(json!("P-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_valid_token_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, body) = app
        .request(Method::GET, "/products", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1004);

    let request = http::Request::builder()
        .uri("/products")
        .header(http::header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_is_ordered_by_codigo() {
    let app = TestApp::new();
    app.call(
        Method::POST,
        "/products",
        Some(json!([{"codigo": "C"}, {"codigo": "A"}, {"codigo": "B"}])),
    )
    .await;

    let (status, body) = app.call(Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["codigo"].as_str())
        .collect();
    assert_eq!(codes, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn delete_by_codigo() {
    let app = TestApp::new();
    app.call(Method::POST, "/products", Some(json!({"codigo": "Z"})))
        .await;

    let (status, body) = app.call(Method::DELETE, "/products/Z", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);
    assert_eq!(body["product"]["codigo"], "Z");

    let (status, body) = app.call(Method::DELETE, "/products/Z", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn delete_all_on_empty_store_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::DELETE, "/products/all", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6004);

    app.call(
        Method::POST,
        "/products",
        Some(json!([{"codigo": "A"}, {"codigo": "B"}])),
    )
    .await;
    let (status, body) = app.call(Method::DELETE, "/products/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 2);

    let (_, body) = app.call(Method::GET, "/products", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn lookup_by_internal_id() {
    let app = TestApp::new();
    app.call(Method::POST, "/products", Some(json!({"codigo": "ID-1"})))
        .await;
    let (_, product) = app.call(Method::GET, "/products/ID-1", None).await;
    let id = product["id"].as_str().expect("id").to_string();

    let (status, found) = app
        .call(Method::GET, &format!("/products/id/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["codigo"], "ID-1");

    let (status, body) = app.call(Method::GET, "/products/id/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);

    let (status, _) = app
        .call(
            Method::GET,
            "/products/id/6f9619ff-8b86-4011-b42d-00cf4fc964ff",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replace_by_id_can_rename_but_not_collide() {
    let app = TestApp::new();
    app.call(
        Method::POST,
        "/products",
        Some(json!([{"codigo": "R-1", "stock": 4}, {"codigo": "R-2"}])),
    )
    .await;
    let (_, product) = app.call(Method::GET, "/products/R-1", None).await;
    let id = product["id"].as_str().expect("id").to_string();
    let uri = format!("/products/id/{id}");

    let (status, body) = app
        .call(Method::PUT, &uri, Some(json!({"codigo": "R-2"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6002);

    let (status, renamed) = app
        .call(Method::PUT, &uri, Some(json!({"codigo": "R-3", "stock": 1})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["id"], id.as_str());
    assert_eq!(renamed["codigo"], "R-3");
    assert_eq!(renamed["stock"], 1);

    let (status, _) = app.call(Method::GET, "/products/R-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replace_by_codigo_is_a_snapshot() {
    let app = TestApp::new();
    app.call(
        Method::POST,
        "/products",
        Some(json!({"codigo": "S-1", "stock": 10, "nombre": "Viejo", "tags": ["a"]})),
    )
    .await;

    // Empty body codigo inherits the path value
    let (status, product) = app
        .call(
            Method::PUT,
            "/products/S-1",
            Some(json!({"codigo": "", "nombre": "Nuevo", "stock": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["nombre"], "Nuevo");
    assert_eq!(product["stock"], 2);
    assert_eq!(product["tags"], json!([]));

    let (status, _) = app
        .call(Method::PUT, "/products/S-1", Some(json!({"codigo": "OTHER"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::PUT, "/products/MISSING", Some(json!({"nombre": "x"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_location() {
    let app = TestApp::new();
    app.call(Method::POST, "/products", Some(json!({"codigo": "L-1", "stock": 3})))
        .await;

    let (status, product) = app
        .call(
            Method::PATCH,
            "/products/location/L-1",
            Some(json!({"ubicacion": "Estante 4"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["ubicacion"], "Estante 4");
    assert_eq!(product["stock"], 3);

    let (status, body) = app
        .call(Method::PATCH, "/products/location/L-1", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7);

    let (status, _) = app
        .call(
            Method::PATCH,
            "/products/location/NOPE",
            Some(json!({"ubicacion": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_overflow_is_rejected_without_writing() {
    let app = TestApp::new();

    let (status, _) = app
        .call(
            Method::POST,
            "/products",
            Some(json!({"codigo": "O", "stock": i64::MAX})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::POST, "/products", Some(json!({"codigo": "O", "stock": 1})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (_, product) = app.call(Method::GET, "/products/O", None).await;
    assert_eq!(product["stock"], i64::MAX);

    // presentaciones folded past the limit fail as an entry error
    let (status, body) = app
        .call(
            Method::POST,
            "/products",
            Some(json!({
                "codigo": "Q",
                "stock": i64::MAX,
                "presentaciones": [{"volumen": "50ml", "stock": 1}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["errors"][0]["index"], 0);
    assert_eq!(body["details"]["errors"][0]["codigo"], "Q");
}

#[tokio::test]
async fn prices_round_trip_as_json_numbers() {
    let app = TestApp::new();

    let (status, _) = app
        .call(
            Method::POST,
            "/products",
            Some(json!({
                "codigo": "N",
                "precio": 19.99,
                "precioNeto": 15,
                "descuento": true,
                "porcentajeDescuento": 10
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, product) = app.call(Method::GET, "/products/N", None).await;
    assert_eq!(product["precio"], 19.99);
    assert_eq!(product["precioNeto"], 15.0);
    assert_eq!(product["porcentajeDescuento"], 10.0);
    assert_eq!(product["precioDescuento"], 17.99);
}
