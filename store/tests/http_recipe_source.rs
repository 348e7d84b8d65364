//! Integration tests for the HTTP recipe source against a mock server.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use recipe_store::domain::ports::{NewRecipe, RecipeSource, RecipeSourceError};
use recipe_store::domain::{Recipe, RecipeDraft, RecipeId, UserId};
use recipe_store::outbound::http::HttpRecipeSource;
use reqwest::{Client, Url};
use rstest::rstest;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer, timeout: Duration) -> HttpRecipeSource {
    let client = Client::builder()
        .no_proxy()
        .timeout(timeout)
        .build()
        .expect("client builds");
    HttpRecipeSource::with_client(Url::parse(&server.uri()).expect("server URI parses"), client)
}

fn recipe_json(id: Value, owner: &str, is_favorite: bool) -> Value {
    json!({
        "id": id,
        "title": "Mocked Recipe",
        "description": "This recipe comes from a mocked backend",
        "ingredients": ["Mocked Ingredient 1", "Mocked Ingredient 2"],
        "instructions": ["Mocked Step 1", "Mocked Step 2"],
        "prepTime": 15,
        "cookTime": 25,
        "servings": 3,
        "userId": owner,
        "isFavorite": is_favorite,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

fn soup_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Soup".to_owned(),
        description: String::new(),
        ingredients: vec!["water".to_owned()],
        instructions: vec!["boil".to_owned()],
        prep_time: 5,
        cook_time: 10,
        servings: 2,
        image_url: None,
    }
}

#[tokio::test]
async fn lists_recipes_with_numeric_and_textual_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            recipe_json(json!(1), "user1", false),
            recipe_json(json!("2"), "user2", true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let recipes = source_for(&server, Duration::from_secs(5))
        .list()
        .await
        .expect("listing succeeds");

    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes.first().map(|r| r.id.clone()), Some(RecipeId::from(1_u32)));
    assert!(recipes.get(1).is_some_and(|r| r.is_favorite));
}

#[tokio::test]
async fn create_posts_draft_with_user_id() {
    let server = MockServer::start().await;
    let mut expected_body = serde_json::to_value(soup_draft()).expect("draft encodes");
    expected_body
        .as_object_mut()
        .expect("draft is an object")
        .insert("userId".to_owned(), json!("u1"));
    Mock::given(method("POST"))
        .and(path("/api/recipes"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(201).set_body_json(recipe_json(json!(10), "u1", false)))
        .expect(1)
        .mount(&server)
        .await;

    let created = source_for(&server, Duration::from_secs(5))
        .create(&NewRecipe {
            draft: soup_draft(),
            owner_id: UserId::new("u1").expect("valid owner"),
        })
        .await
        .expect("create succeeds");

    assert_eq!(created.id, RecipeId::from(10_u32));
    assert_eq!(created.owner_id.as_ref(), "u1");
}

#[tokio::test]
async fn update_puts_the_full_record() {
    let server = MockServer::start().await;
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("timestamp");
    let merged = Recipe::from_draft(
        RecipeId::from(7_u32),
        UserId::new("u1").expect("valid owner"),
        soup_draft(),
        created_at,
    );
    Mock::given(method("PUT"))
        .and(path("/api/recipes/7"))
        .and(body_json(serde_json::to_value(&merged).expect("recipe encodes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&merged))
        .expect(1)
        .mount(&server)
        .await;

    let updated = source_for(&server, Duration::from_secs(5))
        .update(&merged.id, &merged)
        .await
        .expect("update succeeds");

    assert_eq!(updated, merged);
}

#[tokio::test]
async fn favourite_toggle_patches_only_the_flag() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/recipes/7/favorite"))
        .and(body_json(json!({ "isFavorite": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_json(json!(7), "u1", true)))
        .expect(1)
        .mount(&server)
        .await;

    let toggled = source_for(&server, Duration::from_secs(5))
        .set_favorite(&RecipeId::from(7_u32), true)
        .await
        .expect("patch succeeds");

    assert!(toggled.is_favorite);
}

#[tokio::test]
async fn delete_accepts_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/recipes/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    source_for(&server, Duration::from_secs(5))
        .delete(&RecipeId::from(7_u32))
        .await
        .expect("delete succeeds");
}

#[rstest]
#[case::not_found(404, "NotFound")]
#[case::unprocessable(422, "Rejected")]
#[case::unavailable(503, "Transport")]
#[tokio::test]
async fn error_statuses_map_to_port_errors(#[case] status: u16, #[case] expected: &str) {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/recipes/7"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(&server)
        .await;

    let error = source_for(&server, Duration::from_secs(5))
        .delete(&RecipeId::from(7_u32))
        .await
        .expect_err("error status fails");

    let actual = match error {
        RecipeSourceError::NotFound { .. } => "NotFound",
        RecipeSourceError::Rejected { .. } => "Rejected",
        RecipeSourceError::Transport { .. } => "Transport",
        RecipeSourceError::Timeout { .. } => "Timeout",
        RecipeSourceError::Decode { .. } => "Decode",
    };
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn malformed_bodies_map_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = source_for(&server, Duration::from_secs(5))
        .list()
        .await
        .expect_err("HTML is not a recipe list");

    assert!(matches!(error, RecipeSourceError::Decode { .. }));
}

#[tokio::test]
async fn slow_responses_map_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let error = source_for(&server, Duration::from_millis(50))
        .list()
        .await
        .expect_err("request times out");

    assert!(matches!(error, RecipeSourceError::Timeout { .. }));
}
