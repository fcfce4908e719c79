use axum::http::StatusCode;
use serde_json::Value;
use serde_json::json;

use crate::tests::helper;
use crate::tests::helper::TestUser;

#[tokio::test]
async fn test_notes() {
    let mut app = helper::setup_test_app().await;

    let user = TestUser::new();
    let access_token = user.bearer();

    // verify empty note list
    let notes = helper::list_notes(&mut app, &access_token).await;
    assert_eq!(Vec::<Value>::new(), notes);

    // create note
    let payload = json!({
        "title": "Dinner with the in-laws",
        "content": "Bring flowers",
        "start_time": "2024-10-16T18:00:00Z",
        "end_time": "2024-10-16T21:00:00Z",
        "color": "orange",
    });
    let (status_code, note, _) = helper::maybe_create_note(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let note = note.unwrap();
    let id = helper::get_id(&note);
    assert_eq!("Dinner with the in-laws", note["title"]);
    assert_eq!("Bring flowers", note["content"]);
    assert_eq!(user.id.to_string(), note["user_id"]);
    assert_eq!("2024-10-16T18:00:00Z", note["start_time"]);
    assert_eq!("orange", note["color"]);
    assert_eq!(Value::Null, note["space_id"]);

    // verify note
    let (status_code, fetched) = helper::single_note(&mut app, &access_token, &id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some(note), fetched);

    // fetch notes, note is included
    let notes = helper::list_notes(&mut app, &access_token).await;
    assert_eq!(1, notes.len());
    assert_eq!(id, helper::get_id(&notes[0]));

    // update note, only the title
    let payload = json!({ "title": "Dinner with the family" });
    let (status_code, note, _) =
        helper::maybe_update_note(&mut app, &access_token, &id, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let note = note.unwrap();
    assert_eq!("Dinner with the family", note["title"]);
    assert_eq!("Bring flowers", note["content"]);
    assert_eq!("orange", note["color"]);

    // clear the color
    let payload = json!({ "color": null });
    let (status_code, note, _) =
        helper::maybe_update_note(&mut app, &access_token, &id, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let note = note.unwrap();
    assert_eq!(Value::Null, note["color"]);
    assert_eq!("2024-10-16T18:00:00Z", note["start_time"]);

    // delete note
    let status_code = helper::maybe_delete_note(&mut app, &access_token, &id).await;
    assert_eq!(StatusCode::NO_CONTENT, status_code);

    // verify deleted
    let (status_code, _) = helper::single_note(&mut app, &access_token, &id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let status_code = helper::maybe_delete_note(&mut app, &access_token, &id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}

#[tokio::test]
async fn test_notes_are_private() {
    let mut app = helper::setup_test_app().await;

    let owner = TestUser::new();
    let other = TestUser::new();

    let note = helper::create_note(&mut app, &owner.bearer(), "Surprise party").await;
    let id = helper::get_id(&note);

    let (status_code, _) = helper::single_note(&mut app, &other.bearer(), &id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let payload = json!({ "title": "Not a surprise" });
    let (status_code, _, error) =
        helper::maybe_update_note(&mut app, &other.bearer(), &id, &payload).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Note not found", error.unwrap().error);

    let status_code = helper::maybe_delete_note(&mut app, &other.bearer(), &id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    assert!(helper::list_notes(&mut app, &other.bearer()).await.is_empty());

    // still there for the owner
    let (status_code, note) = helper::single_note(&mut app, &owner.bearer(), &id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("Surprise party", note.unwrap()["title"]);
}

#[tokio::test]
async fn test_notes_newest_first() {
    let mut app = helper::setup_test_app().await;

    let user = TestUser::new();

    let first = helper::create_note(&mut app, &user.bearer(), "First").await;
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = helper::create_note(&mut app, &user.bearer(), "Second").await;

    let notes = helper::list_notes(&mut app, &user.bearer()).await;
    let ids = notes.iter().map(helper::get_id).collect::<Vec<_>>();

    assert_eq!(vec![helper::get_id(&second), helper::get_id(&first)], ids);
}

#[tokio::test]
async fn test_note_validation() {
    let mut app = helper::setup_test_app().await;

    let user = TestUser::new();
    let access_token = user.bearer();

    // empty title
    let payload = json!({ "title": "  " });
    let (status_code, _, error) = helper::maybe_create_note(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Title can not be empty", error.unwrap().error);

    // start after end
    let payload = json!({
        "title": "Backwards",
        "start_time": "2024-10-16T21:00:00Z",
        "end_time": "2024-10-16T18:00:00Z",
    });
    let (status_code, _, error) = helper::maybe_create_note(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Start time can not be after end time", error.unwrap().error);

    // start after end through an update
    let payload = json!({
        "title": "Forwards",
        "end_time": "2024-10-16T18:00:00Z",
    });
    let (status_code, note, _) = helper::maybe_create_note(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let id = helper::get_id(&note.unwrap());

    let payload = json!({ "start_time": "2024-10-16T19:00:00Z" });
    let (status_code, _, error) =
        helper::maybe_update_note(&mut app, &access_token, &id, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Start time can not be after end time", error.unwrap().error);

    // unknown space
    let payload = json!({
        "title": "Lost",
        "space_id": uuid::Uuid::new_v4(),
    });
    let (status_code, _, error) = helper::maybe_create_note(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Unknown space", error.unwrap().error);

    // space links that name no space
    for space_id in ["s1", ""] {
        let payload = json!({ "title": "Lost", "space_id": space_id });
        let (status_code, _, error) =
            helper::maybe_create_note(&mut app, &access_token, &payload).await;
        assert_eq!(StatusCode::BAD_REQUEST, status_code, "{space_id:?}");
        assert_eq!("Unknown space", error.unwrap().error);
    }

    // invalid path parameter
    let (status_code, body) = helper::api_request(
        &mut app,
        axum::http::Method::GET,
        "/api/notes/not-a-uuid",
        Some(&access_token),
        None,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid path parameter", helper::get_error(&body).error);
}

#[tokio::test]
async fn test_note_linked_to_space() {
    let mut app = helper::setup_test_app().await;

    let user = TestUser::new();
    let partner = TestUser::new();
    helper::sign_up(&mut app, &partner).await;

    let space = helper::create_space(&mut app, &user.bearer(), &partner.id).await;
    let space_id = helper::get_id(&space);

    let payload = json!({ "title": "Holiday", "space_id": space_id });
    let (status_code, note, _) = helper::maybe_create_note(&mut app, &user.bearer(), &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let note = note.unwrap();
    assert_eq!(space_id.to_string(), note["space_id"]);

    // unlink
    let payload = json!({ "space_id": null });
    let (status_code, note, _) =
        helper::maybe_update_note(&mut app, &user.bearer(), &helper::get_id(&note), &payload)
            .await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Value::Null, note.unwrap()["space_id"]);
}
