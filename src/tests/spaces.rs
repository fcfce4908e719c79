use axum::http::StatusCode;
use serde_json::Value;
use serde_json::json;

use crate::tests::helper;
use crate::tests::helper::TestUser;

#[tokio::test]
async fn test_spaces() {
    let mut app = helper::setup_test_app().await;

    let alice = TestUser::new();
    let bob = TestUser::new();
    let eve = TestUser::new();
    helper::sign_up(&mut app, &bob).await;

    // create
    let (status_code, space, _) =
        helper::maybe_create_space(&mut app, &alice.bearer(), &bob.id, Some("  Us two  ")).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let space = space.unwrap();
    let space_id = helper::get_id(&space);
    assert_eq!(alice.id.to_string(), space["user_a_id"]);
    assert_eq!(bob.id.to_string(), space["user_b_id"]);
    assert_eq!("Us two", space["name"]);

    // both members see it
    for user in [&alice, &bob] {
        let (status_code, spaces) = helper::get(&mut app, &user.bearer(), "/api/spaces").await;
        assert_eq!(StatusCode::OK, status_code);
        let spaces = spaces.unwrap();
        assert_eq!(1, spaces.as_array().unwrap().len());
        assert_eq!(space_id, helper::get_id(&spaces[0]));

        let (status_code, single) =
            helper::get(&mut app, &user.bearer(), &format!("/api/spaces/{space_id}")).await;
        assert_eq!(StatusCode::OK, status_code);
        assert_eq!(Some(space.clone()), single);
    }

    // others do not
    let (_, spaces) = helper::get(&mut app, &eve.bearer(), "/api/spaces").await;
    assert_eq!(Some(json!([])), spaces);

    let (status_code, _) =
        helper::get(&mut app, &eve.bearer(), &format!("/api/spaces/{space_id}")).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}

#[tokio::test]
async fn test_space_without_name() {
    let mut app = helper::setup_test_app().await;

    let alice = TestUser::new();
    let bob = TestUser::new();
    helper::sign_up(&mut app, &bob).await;

    let (status_code, space, _) =
        helper::maybe_create_space(&mut app, &alice.bearer(), &bob.id, Some("   ")).await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!(Value::Null, space.unwrap()["name"]);
}

#[tokio::test]
async fn test_space_needs_two_users() {
    let mut app = helper::setup_test_app().await;

    let alice = TestUser::new();
    helper::sign_up(&mut app, &alice).await;

    // with yourself
    let (status_code, _, error) =
        helper::maybe_create_space(&mut app, &alice.bearer(), &alice.id, None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("A space needs two different users", error.unwrap().error);

    // with someone never seen before
    let (status_code, _, error) =
        helper::maybe_create_space(&mut app, &alice.bearer(), &uuid::Uuid::new_v4(), None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Unknown partner", error.unwrap().error);
}

#[tokio::test]
async fn test_spaces_require_token() {
    let mut app = helper::setup_test_app().await;

    let (status_code, body) = helper::api_request(
        &mut app,
        axum::http::Method::GET,
        "/api/spaces",
        None,
        None,
    )
    .await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!("Missing API token", helper::get_error(&body).error);
}
