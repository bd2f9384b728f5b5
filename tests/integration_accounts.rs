mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{generate_unique_email, login_token, seed_credential, setup_test_app};
use http_body_util::BodyExt;
use secretaria::modules::accounts::model::Role;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_register_success() {
    let (app, _state) = setup_test_app();

    let email = generate_unique_email();
    let linked_record_id = Uuid::new_v4();

    let request = Request::builder()
        .method("POST")
        .uri("/api/students/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": "testpass123",
                "linked_record_id": linked_record_id
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "aluno");
    assert_eq!(body["linked_record_id"], linked_record_id.to_string());
    assert!(body.get("id").is_some());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("salt").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    seed_credential(&state, Role::Teacher, &email, "originalpass").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/teachers/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": "differentpass",
                "linked_record_id": Uuid::new_v4()
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The losing attempt wrote nothing; the original password still works.
    let request = Request::builder()
        .method("POST")
        .uri("/api/teachers/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": "originalpass"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_missing_linked_record() {
    let (app, _state) = setup_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/students/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": generate_unique_email(),
                "password": "testpass123"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_short_password() {
    let (app, _state) = setup_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/students/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": generate_unique_email(),
                "password": "short",
                "linked_record_id": Uuid::new_v4()
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_invalid_email() {
    let (app, _state) = setup_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/teachers/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": "not-an-email",
                "password": "testpass123",
                "linked_record_id": Uuid::new_v4()
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_malformed_json() {
    let (app, _state) = setup_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/students/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_register_requires_admin_token() {
    let (app, state) = setup_test_app();

    let body = serde_json::to_string(&json!({
        "email": generate_unique_email(),
        "password": "testpass123"
    }))
    .unwrap();

    // No token.
    let request = Request::builder()
        .method("POST")
        .uri("/api/admins/register")
        .header("content-type", "application/json")
        .body(Body::from(body.clone()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Staff token.
    let staff_email = generate_unique_email();
    seed_credential(&state, Role::Staff, &staff_email, "staffpass123").await;
    let staff_token = login_token(&state, Role::Staff, &staff_email, "staffpass123").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/admins/register")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {staff_token}"))
        .body(Body::from(body.clone()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin token.
    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/admins/register")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_register_has_no_linked_record() {
    let (app, state) = setup_test_app();

    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    // A supplied linked record id is dropped for admins.
    let request = Request::builder()
        .method("POST")
        .uri("/api/admins/register")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": generate_unique_email(),
                "password": "testpass123",
                "linked_record_id": Uuid::new_v4()
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["role"], "admin");
    assert!(body.get("linked_record_id").is_none());
}

#[tokio::test]
async fn test_get_credential_by_id_self() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    let seeded = seed_credential(&state, Role::Teacher, &email, "testpass123").await;
    let token = login_token(&state, Role::Teacher, &email, "testpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/teachers/{}", seeded.id))
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["id"], seeded.id.to_string());
    assert_eq!(body["email"], email);
}

#[tokio::test]
async fn test_get_credential_by_id_other_teacher_denied() {
    let (app, state) = setup_test_app();

    let email_a = generate_unique_email();
    seed_credential(&state, Role::Teacher, &email_a, "testpass123").await;
    let token_a = login_token(&state, Role::Teacher, &email_a, "testpass123").await;

    let email_b = generate_unique_email();
    let teacher_b = seed_credential(&state, Role::Teacher, &email_b, "testpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/teachers/{}", teacher_b.id))
        .header("Authorization", format!("Bearer {token_a}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["error"],
        "Access denied. You may only access your own record."
    );
}

#[tokio::test]
async fn test_privileged_roles_read_any_student() {
    let (app, state) = setup_test_app();

    let student_email = generate_unique_email();
    let student = seed_credential(&state, Role::Student, &student_email, "studentpass").await;

    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    let staff_email = generate_unique_email();
    seed_credential(&state, Role::Staff, &staff_email, "staffpass123").await;
    let staff_token = login_token(&state, Role::Staff, &staff_email, "staffpass123").await;

    for token in [admin_token, staff_token] {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/api/students/{}", student.id))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["email"], student_email);
    }
}

#[tokio::test]
async fn test_staff_cannot_read_other_staff() {
    let (app, state) = setup_test_app();

    let email_a = generate_unique_email();
    seed_credential(&state, Role::Staff, &email_a, "testpass123").await;
    let token_a = login_token(&state, Role::Staff, &email_a, "testpass123").await;

    let email_b = generate_unique_email();
    let staff_b = seed_credential(&state, Role::Staff, &email_b, "testpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/staff/{}", staff_b.id))
        .header("Authorization", format!("Bearer {token_a}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_whitelist_blocks_lower_roles_from_staff_collection() {
    let (app, state) = setup_test_app();

    let teacher_email = generate_unique_email();
    seed_credential(&state, Role::Teacher, &teacher_email, "testpass123").await;
    let teacher_token = login_token(&state, Role::Teacher, &teacher_email, "testpass123").await;

    let student_email = generate_unique_email();
    seed_credential(&state, Role::Student, &student_email, "testpass123").await;
    let student_token = login_token(&state, Role::Student, &student_email, "testpass123").await;

    for token in [teacher_token, student_token] {
        let request = Request::builder()
            .method("GET")
            .uri("/api/staff/me")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_student_token_rejected_on_teacher_collection() {
    let (app, state) = setup_test_app();

    let student_email = generate_unique_email();
    seed_credential(&state, Role::Student, &student_email, "testpass123").await;
    let student_token = login_token(&state, Role::Student, &student_email, "testpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/teachers/me")
        .header("Authorization", format!("Bearer {student_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_credential_by_email_self_or_privileged() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    seed_credential(&state, Role::Teacher, &email, "testpass123").await;
    let own_token = login_token(&state, Role::Teacher, &email, "testpass123").await;

    let other_email = generate_unique_email();
    seed_credential(&state, Role::Teacher, &other_email, "testpass123").await;

    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    // Own email.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/teachers/email/{email}"))
        .header("Authorization", format!("Bearer {own_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Someone else's email.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/teachers/email/{other_email}"))
        .header("Authorization", format!("Bearer {own_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins read any email.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/teachers/email/{other_email}"))
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_wrong_current() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    seed_credential(&state, Role::Student, &email, "originalpass").await;
    let token = login_token(&state, Role::Student, &email, "originalpass").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/students/change-password")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(
            serde_json::to_string(&json!({
                "current_password": "wrongpass",
                "new_password": "newpass12345"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "incorrect password");

    // Nothing was rotated.
    let request = Request::builder()
        .method("POST")
        .uri("/api/students/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": "originalpass"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_success() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    seed_credential(&state, Role::Staff, &email, "originalpass").await;
    let token = login_token(&state, Role::Staff, &email, "originalpass").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/staff/change-password")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(
            serde_json::to_string(&json!({
                "current_password": "originalpass",
                "new_password": "newpass12345"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // New password logs in, the old one no longer does.
    let request = Request::builder()
        .method("POST")
        .uri("/api/staff/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": "newpass12345"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/api/staff/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": "originalpass"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_short_new_password() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    seed_credential(&state, Role::Teacher, &email, "originalpass").await;
    let token = login_token(&state, Role::Teacher, &email, "originalpass").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/teachers/change-password")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(
            serde_json::to_string(&json!({
                "current_password": "originalpass",
                "new_password": "short"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_admin_list_credentials() {
    let (app, state) = setup_test_app();

    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let second_admin = generate_unique_email();
    seed_credential(&state, Role::Admin, &second_admin, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/admins")
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let listed = body.as_array().unwrap();

    assert_eq!(listed.len(), 2);
    let emails: Vec<&str> = listed.iter().map(|c| c["email"].as_str().unwrap()).collect();
    assert!(emails.contains(&admin_email.as_str()));
    assert!(emails.contains(&second_admin.as_str()));
    for credential in listed {
        assert_eq!(credential["role"], "admin");
        assert!(credential.get("password_hash").is_none());
    }

    // Staff are whitelisted out of the admin collection entirely.
    let staff_email = generate_unique_email();
    seed_credential(&state, Role::Staff, &staff_email, "staffpass123").await;
    let staff_token = login_token(&state, Role::Staff, &staff_email, "staffpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/admins")
        .header("Authorization", format!("Bearer {staff_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_delete_credential_by_email() {
    let (app, state) = setup_test_app();

    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    let doomed_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &doomed_email, "adminpass123").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/admins/email/{doomed_email}"))
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body["message"].as_str().unwrap().contains(&doomed_email));

    // Deleting again reports not found.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/admins/email/{doomed_email}"))
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // And the deleted admin can no longer log in.
    let request = Request::builder()
        .method("POST")
        .uri("/api/admins/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": doomed_email,
                "password": "adminpass123"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_credential_invalid_uuid() {
    let (app, state) = setup_test_app();

    let email = generate_unique_email();
    seed_credential(&state, Role::Student, &email, "testpass123").await;
    let token = login_token(&state, Role::Student, &email, "testpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/students/not-a-uuid")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_privileged_read_of_missing_student_is_not_found() {
    let (app, state) = setup_test_app();

    let admin_email = generate_unique_email();
    seed_credential(&state, Role::Admin, &admin_email, "adminpass123").await;
    let admin_token = login_token(&state, Role::Admin, &admin_email, "adminpass123").await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/students/{}", Uuid::new_v4()))
        .header("Authorization", format!("Bearer {admin_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
