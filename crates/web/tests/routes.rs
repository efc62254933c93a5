use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::Query,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Json, Router,
};
use geocoding::GeocodingClient;
use parking::{memory::MemoryDatabase, Client};
use serde_json::{json, Value};
use tower::ServiceExt;
use web::{app, WebState};

const ADMIN_KEY: &str = "test-admin-key";

fn state() -> WebState<MemoryDatabase> {
    WebState {
        parking_client: Client::new(MemoryDatabase::new()),
        geocoding_client: None,
        admin_key: Some(Arc::from(ADMIN_KEY)),
        development: false,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-admin-key", ADMIN_KEY);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_carpark(router: &Router, name: &str, lat: f64, lng: f64) -> String {
    let (status, body) = send(
        router,
        admin_request(
            Method::POST,
            "/api/v1/admin/carparks",
            Some(json!({
                "name": name,
                "address": format!("{name} Road"),
                "town": name,
                "lat": lat,
                "lng": lng,
                "type": "PUBLIC",
                "totalMotoLots": 20
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
}

fn has_link(body: &Value, relation: &str, href: &str) -> bool {
    body["links"]
        .as_array()
        .unwrap()
        .iter()
        .any(|link| link["rel"] == relation && link["href"] == href)
}

#[tokio::test]
async fn ping() {
    let (status, body) = send(&app(state()), get_request("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "pong!" }));
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let (status, body) = send(&app(state()), get_request("/api/v1/nothing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["httpMethod"], "GET");
    assert_eq!(body["requestedUri"], "/api/v1/nothing");
}

#[tokio::test]
async fn search_around_bishan() {
    let router = app(state());
    create_carpark(&router, "Orchard", 1.3007, 103.8398).await;
    create_carpark(&router, "Bedok", 1.3532, 103.9450).await;
    create_carpark(&router, "Serangoon", 1.3513, 103.8489).await;

    let (status, body) = send(
        &router,
        get_request("/api/v1/carparks/search?lat=1.3521&lng=103.8198&radiusMeters=5000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Serangoon");
    assert_eq!(results[0]["type"], "PUBLIC");
    let distance = results[0]["distanceMeters"].as_f64().unwrap();
    assert!((distance - 3236.0).abs() < 50.0, "distance {distance}");
    assert!(has_link(
        &results[0],
        "map",
        "https://www.google.com/maps?q=1.3513,103.8489"
    ));
}

#[tokio::test]
async fn search_is_sorted_and_defaults_to_two_kilometres() {
    let router = app(state());
    create_carpark(&router, "Far", 1.3650, 103.8198).await;
    create_carpark(&router, "Near", 1.3530, 103.8198).await;
    create_carpark(&router, "Outside", 1.3800, 103.8198).await;

    let (status, body) =
        send(&router, get_request("/api/v1/carparks/search?lat=1.3521&lng=103.8198")).await;
    assert_eq!(status, StatusCode::OK);
    let names = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|result| result["name"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Near", "Far"]);
}

#[tokio::test]
async fn search_rejects_invalid_input() {
    let router = app(state());
    for uri in [
        "/api/v1/carparks/search",
        "/api/v1/carparks/search?lat=1.35",
        "/api/v1/carparks/search?lat=abc&lng=103.8",
        "/api/v1/carparks/search?lat=91&lng=103.8",
        "/api/v1/carparks/search?lat=1.35&lng=103.8&radiusMeters=-5",
    ] {
        let (status, body) = send(&router, get_request(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["httpMethod"], "GET");
        assert_eq!(body["requestedUri"], "/api/v1/carparks/search");
    }
}

#[tokio::test]
async fn carpark_schema() {
    let (status, body) = send(&app(state()), get_request("/api/v1/carparks/schema")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Carpark");
}

#[tokio::test]
async fn suggestion_lifecycle() {
    let router = app(state());

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/v1/suggestions",
            json!({
                "name": "Bishan Community Club",
                "address": "51 Bishan Street 13",
                "town": "Bishan",
                "lat": 1.3515,
                "lng": 103.8490,
                "photos": [{ "url": "https://example.com/entrance.jpg", "caption": "Entrance" }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    let id = body["id"].as_str().unwrap().to_owned();

    let search = "/api/v1/carparks/search?lat=1.3521&lng=103.8198&radiusMeters=5000";
    let (_, body) = send(&router, get_request(search)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &router,
        get_request(&format!("/api/v1/admin/suggestions?key={ADMIN_KEY}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pending = body["data"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["verified"], false);
    assert_eq!(pending[0]["covered"], false);
    assert_eq!(pending[0]["photos"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &router,
        admin_request(
            Method::PUT,
            &format!("/api/v1/admin/suggestions/{id}"),
            Some(json!({ "type": "HDB", "totalMotoLots": 12 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["verified"], true);
    assert_eq!(body["type"], "HDB");
    assert_eq!(body["totalMotoLots"], 12);

    let (_, body) = send(&router, get_request(search)).await;
    assert_eq!(body["data"][0]["id"], id.as_str());

    let (_, body) = send(
        &router,
        admin_request(Method::GET, "/api/v1/admin/suggestions", None),
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_suggestion_is_gone() {
    let router = app(state());
    let (_, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/v1/suggestions",
            json!({
                "name": "Yishun Ring Road",
                "address": "Blk 123",
                "town": "Yishun",
                "lat": 1.4294,
                "lng": 103.8354
            }),
        ),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &router,
        admin_request(Method::DELETE, &format!("/api/v1/admin/suggestions/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = send(
        &router,
        admin_request(Method::GET, &format!("/api/v1/admin/carparks/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_suggestions_are_bad_requests() {
    let router = app(state());
    let base = json!({
        "name": "Somewhere",
        "address": "1 Street",
        "town": "Town",
        "lat": 1.35,
        "lng": 103.8
    });

    let mut outside = base.clone();
    outside["lat"] = json!(51.5);
    outside["lng"] = json!(-0.12);
    let mut without_town = base.clone();
    without_town.as_object_mut().unwrap().remove("town");
    let mut too_many_photos = base.clone();
    too_many_photos["photos"] = json!([
        { "url": "https://example.com/1.jpg" },
        { "url": "https://example.com/2.jpg" },
        { "url": "https://example.com/3.jpg" }
    ]);

    for body in [outside, without_town, too_many_photos] {
        let (status, response) = send(
            &router,
            json_request(Method::POST, "/api/v1/suggestions", body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["httpMethod"], "POST");
        assert!(response["message"].is_string());
    }

    let malformed = Request::post("/api/v1/suggestions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, _) = send(&router, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_require_the_key() {
    let router = app(state());

    let (status, body) = send(&router, get_request("/api/v1/admin/carparks")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access Forbidden");

    let (status, _) =
        send(&router, get_request("/api/v1/admin/carparks?key=wrong")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        get_request(&format!("/api/v1/admin/carparks?key={ADMIN_KEY}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        admin_request(Method::GET, "/api/v1/admin/carparks", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // the query parameter wins over the header
    let (status, _) = send(
        &router,
        admin_request(Method::GET, "/api/v1/admin/carparks?key=wrong", None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_routes_are_closed_without_configured_key() {
    let router = app(WebState {
        admin_key: None,
        ..state()
    });
    let (status, _) = send(
        &router,
        admin_request(Method::GET, "/api/v1/admin/carparks", None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_carpark_maintenance() {
    let router = app(state());
    let id = create_carpark(&router, "Toa Payoh Hub", 1.3326, 103.8474).await;
    let uri = format!("/api/v1/admin/carparks/{id}");

    let (status, body) = send(&router, admin_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert!(has_link(&body, "self", &format!("http://localhost{uri}")));

    let (status, body) = send(
        &router,
        admin_request(
            Method::PUT,
            &uri,
            Some(json!({ "pricingNotes": "$0.65 per entry", "totalMotoLots": null })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pricingNotes"], "$0.65 per entry");
    assert!(body.get("totalMotoLots").is_none());
    assert_eq!(body["name"], "Toa Payoh Hub");

    let (status, _) = send(
        &router,
        admin_request(Method::PUT, &uri, Some(json!({ "name": "   " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, admin_request(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&router, admin_request(method, &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["requestedUri"], uri.as_str());
    }
}

#[tokio::test]
async fn lot_counts_beyond_the_stored_range_are_bad_requests() {
    let router = app(state());

    let (status, body) = send(
        &router,
        admin_request(
            Method::POST,
            "/api/v1/admin/carparks",
            Some(json!({
                "name": "Ang Mo Kio Hub",
                "address": "53 Ang Mo Kio Ave 3",
                "lat": 1.3691,
                "lng": 103.8484,
                "totalMotoLots": 3_000_000_000u32
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["httpMethod"], "POST");

    let id = create_carpark(&router, "Ang Mo Kio", 1.3691, 103.8484).await;
    let uri = format!("/api/v1/admin/carparks/{id}");
    let (status, _) = send(
        &router,
        admin_request(
            Method::PUT,
            &uri,
            Some(json!({ "totalMotoLots": 3_000_000_000u32 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&router, admin_request(Method::GET, &uri, None)).await;
    assert_eq!(body["totalMotoLots"], 20);
    assert!(has_link(
        &body,
        "nearby",
        "http://localhost/api/v1/carparks/search?lat=1.3691&lng=103.8484"
    ));
}

#[tokio::test]
async fn parse_map_links() {
    let router = app(state());

    let (status, body) = send(
        &router,
        get_request("/api/v1/locations/parse?text=https://www.google.com/maps/@1.3521,103.8198,15z"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lat"], 1.3521);
    assert_eq!(body["lng"], 103.8198);
    assert_eq!(body["mapsUrl"], "https://www.google.com/maps?q=1.3521,103.8198");

    let (status, _) = send(
        &router,
        get_request("/api/v1/locations/parse?text=51.5074,-0.1278"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, get_request("/api/v1/locations/parse")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{address}")
}

async fn fake_geocoding_api() -> GeocodingClient {
    let router = Router::new().route(
        "/geocode/json",
        get(
            |Query(params): Query<std::collections::HashMap<String, String>>| async move {
                match params["address"].as_str() {
                    "Bishan, Singapore" => (
                        StatusCode::OK,
                        Json(json!({
                            "status": "OK",
                            "results": [{
                                "formatted_address": "Bishan, Singapore",
                                "geometry": { "location": { "lat": 1.3508, "lng": 103.8485 } }
                            }]
                        })),
                    ),
                    "Broken, Singapore" => (StatusCode::BAD_GATEWAY, Json(json!({}))),
                    _ => (StatusCode::OK, Json(json!({ "status": "ZERO_RESULTS" }))),
                }
            },
        ),
    );
    GeocodingClient::new("test-key").with_base_url(serve(router).await)
}

#[tokio::test]
async fn geocoding() {
    let router = app(WebState {
        geocoding_client: Some(fake_geocoding_api().await),
        ..state()
    });

    let (status, body) = send(&router, get_request("/api/v1/geocode?query=Bishan")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "lat": 1.3508, "lng": 103.8485, "formattedAddress": "Bishan, Singapore" })
    );

    let (status, _) = send(&router, get_request("/api/v1/geocode?query=Atlantis")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, get_request("/api/v1/geocode?query=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, get_request("/api/v1/geocode?query=Broken")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to geocode location.");
    assert!(body.get("detailedInformation").is_none());
}

#[tokio::test]
async fn development_mode_shows_error_details() {
    let router = app(WebState {
        geocoding_client: Some(fake_geocoding_api().await),
        development: true,
        ..state()
    });

    let (status, body) = send(&router, get_request("/api/v1/geocode?query=Broken")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detailedInformation"]
        .as_str()
        .unwrap()
        .contains("502"));
}

#[tokio::test]
async fn geocoding_without_api_key() {
    let (status, body) =
        send(&app(state()), get_request("/api/v1/geocode?query=Bishan")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Geocoding is not configured.");
}
