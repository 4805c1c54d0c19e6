// Shared test utilities for integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use gigboard_db::entities::{artist, venue};
use gigboard_db::AppState;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Create a test AppState around the given connection (mock or disconnected)
pub fn test_app_state(db: DatabaseConnection) -> Arc<AppState> {
    Arc::new(AppState { db })
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn musical_hop() -> venue::Model {
    venue::Model {
        id: 1,
        name: "The Musical Hop".into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        address: "1015 Folsom Street".into(),
        phone: Some("123-123-1234".into()),
        image_link: None,
        facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
        website: None,
        seeking_talent: false,
        seeking_description: None,
        genres: serde_json::json!(["Jazz", "Folk"]),
    }
}

pub fn guns_n_petals() -> artist::Model {
    artist::Model {
        id: 4,
        name: "Guns N Petals".into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: Some("326-123-5000".into()),
        image_link: None,
        facebook_link: None,
        website: Some("https://www.gunsnpetalsband.com".into()),
        seeking_venue: true,
        seeking_description: Some("Looking for shows to perform at in the San Francisco Bay Area!".into()),
        genres: serde_json::json!(["Rock n Roll"]),
    }
}

pub const VENUE_FORM: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
&address=1015+Folsom+Street&phone=123-123-1234&genres=Jazz&genres=Folk\
&facebook_link=https%3A%2F%2Fwww.facebook.com%2FTheMusicalHop";
