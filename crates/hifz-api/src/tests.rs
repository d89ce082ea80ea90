//! Router tests against an in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use chrono::TimeDelta;
use hifz_auth::{TokenCodec, hash_secret};
use hifz_core::{
  store::RosterStore,
  user::{NewUser, Role, User},
};
use hifz_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, api_router};

const PASSWORD: &str = "correct horse battery staple";

struct Fixture {
  state:   AppState<SqliteStore>,
  admin:   User,
  teacher: User,
  student: User,
}

async fn seed(store: &SqliteStore, username: &str, role: Role) -> User {
  store
    .create_user(NewUser {
      username:    username.into(),
      secret_hash: hash_secret(PASSWORD).unwrap(),
      role,
      phone:       None,
    })
    .await
    .unwrap()
}

async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let admin = seed(&store, "mudir", Role::Admin).await;
  let teacher = seed(&store, "ustadh", Role::Teacher).await;
  let student = seed(&store, "yusuf", Role::Student).await;

  let tokens = Arc::new(TokenCodec::new("router-test-secret", TimeDelta::hours(72)).unwrap());
  let state = AppState::new(Arc::new(store), tokens).unwrap();
  Fixture { state, admin, teacher, student }
}

impl Fixture {
  async fn token(&self, user: &User) -> String {
    self
      .state
      .authenticator
      .authenticate(&user.username, PASSWORD)
      .await
      .unwrap()
      .token
  }

  async fn send(
    &self,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();

    let resp = api_router(self.state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
  }

  /// A class taught by the fixture teacher.
  async fn class(&self, teacher_token: &str) -> i64 {
    let (status, class) = self
      .send(Method::POST, "/api/classes", Some(teacher_token), Some(json!({ "name": "Juz Amma" })))
      .await;
    assert_eq!(status, StatusCode::CREATED, "{class}");
    class["id"].as_i64().unwrap()
  }
}

// ── Login ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_then_whoami() {
  let f = fixture().await;

  let (status, body) = f
    .send(
      Method::POST,
      "/login",
      None,
      Some(json!({ "username": "ustadh", "password": PASSWORD })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["expires_at"].is_string());
  let token = body["token"].as_str().unwrap().to_owned();

  let (status, me) = f.send(Method::GET, "/api/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["username"], "ustadh");
  assert_eq!(me["role"], "teacher");
  assert_eq!(me["id"], f.teacher.id.get());
  assert!(me.get("secret_hash").is_none());
}

#[tokio::test]
async fn login_failures_look_the_same() {
  let f = fixture().await;

  let wrong_secret = f
    .send(Method::POST, "/login", None, Some(json!({ "username": "ustadh", "password": "nope" })))
    .await;
  let unknown_user = f
    .send(Method::POST, "/login", None, Some(json!({ "username": "ghost", "password": PASSWORD })))
    .await;

  assert_eq!(wrong_secret.0, StatusCode::UNAUTHORIZED);
  assert_eq!(wrong_secret, unknown_user);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
  let f = fixture().await;

  let (status, body) = f.send(Method::GET, "/api/classes", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body, json!({ "error": "unauthenticated" }));

  let (status, _) = f.send(Method::GET, "/api/classes", Some("not.a.token"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let req = Request::builder()
    .uri("/api/classes")
    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
    .body(Body::empty())
    .unwrap();
  let resp = api_router(f.state.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn token_of_deleted_user_is_rejected_by_whoami() {
  let f = fixture().await;
  let token = f.token(&f.student).await;
  f.state.store.delete_user(f.student.id).await.unwrap();

  let (status, _) = f.send(Method::GET, "/api/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enroll_is_idempotent_and_visible() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let class_id = f.class(&teacher).await;
  let uri = format!("/api/classes/{class_id}/students");
  let body = json!({ "student_id": f.student.id.get() });

  let (status, first) = f.send(Method::POST, &uri, Some(&teacher), Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED, "{first}");
  assert_eq!(first["username"], "yusuf");
  assert_eq!(first["progress"]["surah"], 1);
  assert_eq!(first["progress"]["ayah"], 1);
  assert_eq!(first["progress"]["page"], 1);
  assert_eq!(first["progress"]["updated_by"], f.teacher.id.get());

  let (status, second) = f.send(Method::POST, &uri, Some(&teacher), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first, second);

  let (status, members) = f.send(Method::GET, &uri, Some(&teacher), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(members.as_array().unwrap().len(), 1);
  assert!(!members[0]["progress"].is_null());
}

#[tokio::test]
async fn students_cannot_enroll() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let student = f.token(&f.student).await;
  let class_id = f.class(&teacher).await;
  let uri = format!("/api/classes/{class_id}/students");

  let (status, body) = f
    .send(Method::POST, &uri, Some(&student), Some(json!({ "student_id": f.student.id.get() })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body, json!({ "error": "forbidden" }));

  let (_, members) = f.send(Method::GET, &uri, Some(&student), None).await;
  assert_eq!(members, json!([]));
}

#[tokio::test]
async fn enroll_rejects_missing_or_non_student_targets() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let class_id = f.class(&teacher).await;
  let uri = format!("/api/classes/{class_id}/students");

  let (status, _) =
    f.send(Method::POST, &uri, Some(&teacher), Some(json!({ "student_id": 9999 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = f
    .send(Method::POST, &uri, Some(&teacher), Some(json!({ "student_id": f.teacher.id.get() })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = f
    .send(
      Method::POST,
      "/api/classes/9999/students",
      Some(&teacher),
      Some(json!({ "student_id": f.student.id.get() })),
    )
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unenroll_keeps_progress_history() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let class_id = f.class(&teacher).await;
  let student_id = f.student.id.get();
  f.send(
    Method::POST,
    &format!("/api/classes/{class_id}/students"),
    Some(&teacher),
    Some(json!({ "student_id": student_id })),
  )
  .await;

  let remove = format!("/api/classes/{class_id}/students/{student_id}");
  let (status, _) = f.send(Method::DELETE, &remove, Some(&teacher), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = f.send(Method::DELETE, &remove, Some(&teacher), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, members) =
    f.send(Method::GET, &format!("/api/classes/{class_id}/students"), Some(&teacher), None).await;
  assert_eq!(members, json!([]));

  let (status, history) =
    f.send(Method::GET, &format!("/api/classes/{class_id}/progress"), Some(&teacher), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(history.as_array().unwrap().len(), 1);
  assert_eq!(history[0]["student_id"], student_id);
}

// ── Progress ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_position_checks_role_bounds_and_existence() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let student = f.token(&f.student).await;
  let class_id = f.class(&teacher).await;
  let (_, enrolled) = f
    .send(
      Method::POST,
      &format!("/api/classes/{class_id}/students"),
      Some(&teacher),
      Some(json!({ "student_id": f.student.id.get() })),
    )
    .await;
  let progress_id = enrolled["progress"]["id"].as_i64().unwrap();
  let uri = format!("/api/progress/{progress_id}");

  let (status, moved) = f
    .send(Method::PUT, &uri, Some(&teacher), Some(json!({ "surah": 2, "ayah": 255, "page": 42 })))
    .await;
  assert_eq!(status, StatusCode::OK, "{moved}");
  assert_eq!(moved["surah"], 2);
  assert_eq!(moved["ayah"], 255);
  assert_eq!(moved["page"], 42);
  assert_eq!(moved["updated_by"], f.teacher.id.get());

  let (status, _) = f
    .send(Method::PUT, &uri, Some(&teacher), Some(json!({ "surah": 115, "ayah": 1, "page": 1 })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = f
    .send(Method::PUT, &uri, Some(&student), Some(json!({ "surah": 3, "ayah": 1, "page": 50 })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = f
    .send(
      Method::PUT,
      "/api/progress/9999",
      Some(&teacher),
      Some(json!({ "surah": 3, "ayah": 1, "page": 50 })),
    )
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, history) =
    f.send(Method::GET, &format!("/api/classes/{class_id}/progress"), Some(&teacher), None).await;
  assert_eq!(history[0]["surah"], 2);
}

#[tokio::test]
async fn student_dashboard_shows_latest_progress() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let student = f.token(&f.student).await;

  let (status, before) = f.send(Method::GET, "/api/students/me", Some(&student), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(before, json!({ "username": "yusuf", "progress": null }));

  let class_id = f.class(&teacher).await;
  f.send(
    Method::POST,
    &format!("/api/classes/{class_id}/students"),
    Some(&teacher),
    Some(json!({ "student_id": f.student.id.get() })),
  )
  .await;

  let (_, after) = f.send(Method::GET, "/api/students/me", Some(&student), None).await;
  assert_eq!(after["progress"]["class_id"], class_id);
  assert_eq!(after["progress"]["surah"], 1);
}

// ── Classes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn class_lifecycle() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let student = f.token(&f.student).await;
  let class_id = f.class(&teacher).await;
  let uri = format!("/api/classes/{class_id}");

  let (status, class) = f.send(Method::GET, &uri, Some(&student), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(class["teacher_id"], f.teacher.id.get());

  let (_, mine) = f
    .send(Method::GET, &format!("/api/teachers/{}/classes", f.teacher.id), Some(&student), None)
    .await;
  assert_eq!(mine.as_array().unwrap().len(), 1);

  let (status, _) = f
    .send(Method::PUT, &uri, Some(&student), Some(json!({ "name": "Hijacked" })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, renamed) = f
    .send(Method::PUT, &uri, Some(&teacher), Some(json!({ "name": "Juz Tabarak" })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(renamed["name"], "Juz Tabarak");

  let (status, _) = f
    .send(Method::POST, "/api/classes", Some(&teacher), Some(json!({ "name": "   " })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = f.send(Method::DELETE, &uri, Some(&teacher), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = f.send(Method::GET, &uri, Some(&teacher), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn class_owner_must_be_a_teacher() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;
  let admin = f.token(&f.admin).await;

  let (status, _) = f
    .send(
      Method::POST,
      "/api/classes",
      Some(&teacher),
      Some(json!({ "name": "Owned by student", "teacher_id": f.student.id.get() })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = f
    .send(
      Method::POST,
      "/api/classes",
      Some(&teacher),
      Some(json!({ "name": "Nobody's", "teacher_id": 9999 })),
    )
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = f
    .send(Method::POST, "/api/classes", Some(&admin), Some(json!({ "name": "Unowned" })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, class) = f
    .send(
      Method::POST,
      "/api/classes",
      Some(&admin),
      Some(json!({ "name": "Assigned", "teacher_id": f.teacher.id.get() })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED, "{class}");
  assert_eq!(class["teacher_id"], f.teacher.id.get());

  let (_, all) = f.send(Method::GET, "/api/classes", Some(&admin), None).await;
  assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_positive_ids_are_bad_requests() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;

  let (status, _) = f.send(Method::GET, "/api/classes/0", Some(&teacher), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = f.send(Method::GET, "/api/classes/-7/students", Some(&teacher), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_management_is_admin_only() {
  let f = fixture().await;
  let teacher = f.token(&f.teacher).await;

  let (status, _) = f.send(Method::GET, "/api/users", Some(&teacher), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = f
    .send(
      Method::POST,
      "/api/users",
      Some(&teacher),
      Some(json!({ "username": "x", "password": "y", "role": "admin" })),
    )
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_manages_users() {
  let f = fixture().await;
  let admin = f.token(&f.admin).await;

  let (status, students) = f.send(Method::GET, "/api/users?role=student", Some(&admin), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(students.as_array().unwrap().len(), 1);
  assert_eq!(students[0]["username"], "yusuf");

  let (status, created) = f
    .send(
      Method::POST,
      "/api/users",
      Some(&admin),
      Some(json!({ "username": "maryam", "password": "first", "role": "student" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED, "{created}");
  let id = created["id"].as_i64().unwrap();

  let (status, dup) = f
    .send(
      Method::POST,
      "/api/users",
      Some(&admin),
      Some(json!({ "username": "maryam", "password": "again", "role": "teacher" })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(dup, json!({ "error": "conflict: record already exists or is still referenced" }));

  let (status, updated) = f
    .send(
      Method::PUT,
      &format!("/api/users/{id}"),
      Some(&admin),
      Some(json!({ "phone": "0300-1234567", "password": "second" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["phone"], "0300-1234567");
  assert_eq!(updated["username"], "maryam");

  let (status, _) = f
    .send(Method::POST, "/login", None, Some(json!({ "username": "maryam", "password": "second" })))
    .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) =
    f.send(Method::PUT, &format!("/api/users/{id}"), Some(&admin), Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = f.send(Method::DELETE, &format!("/api/users/{id}"), Some(&admin), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = f.send(Method::DELETE, &format!("/api/users/{id}"), Some(&admin), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_username_update_is_rejected() {
  let f = fixture().await;
  let admin = f.token(&f.admin).await;
  let uri = format!("/api/users/{}", f.student.id);

  for username in ["", "   "] {
    let (status, _) =
      f.send(Method::PUT, &uri, Some(&admin), Some(json!({ "username": username }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{username:?}");
  }

  let (status, updated) =
    f.send(Method::PUT, &uri, Some(&admin), Some(json!({ "username": "  yusuf2  " }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["username"], "yusuf2");
}

#[tokio::test]
async fn deleting_a_teacher_with_classes_conflicts() {
  let f = fixture().await;
  let admin = f.token(&f.admin).await;
  let teacher = f.token(&f.teacher).await;
  f.class(&teacher).await;

  let (status, body) = f
    .send(Method::DELETE, &format!("/api/users/{}", f.teacher.id), Some(&admin), None)
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  let message = body["error"].as_str().unwrap();
  assert!(!message.contains("constraint"), "{message}");
  assert!(!message.contains("Rusqlite"), "{message}");
}
