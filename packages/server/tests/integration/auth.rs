use serde_json::json;

use crate::common::{TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_can_register_with_valid_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "alice@example.com", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["user"]["email"], "alice@example.com");
        assert!(res.body["user"]["id"].is_string());
    }

    #[tokio::test]
    async fn cannot_register_an_email_twice() {
        let app = TestApp::spawn().await;
        let body = json!({"email": "alice@example.com", "password": "secret1"});

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201, "First registration failed: {}", first.text);

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": " Alice@Example.com ", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_IN_USE");
    }

    #[tokio::test]
    async fn cannot_register_with_a_weak_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "alice@example.com", "password": "12345"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_a_malformed_email() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "not-an-email", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &json!({"email": "alice@example.com"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_user_can_log_in_and_see_themselves() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("alice@example.com", "secret1")
            .await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn error_messages_follow_accept_language() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url(routes::LOGIN))
            .header("Accept-Language", "ru-RU,ru;q=0.9")
            .json(&json!({"email": "nobody@example.com", "password": "secret1"}))
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = res.json().await.unwrap();

        assert_eq!(body["code"], "INVALID_CREDENTIALS");
        assert!(body["message"].as_str().unwrap().starts_with("Неверный"));
    }

    #[tokio::test]
    async fn repeated_failures_lock_the_email() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("alice@example.com", "secret1")
            .await;
        let bad = json!({"email": "alice@example.com", "password": "wrong-password"});

        for _ in 0..3 {
            let res = app.post_without_token(routes::LOGIN, &bad).await;
            assert_eq!(res.status, 401);
        }

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "secret1"}),
            )
            .await;
        assert_eq!(res.status, 429);
        assert_eq!(res.body["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn guessing_an_unregistered_email_does_not_lock_it() {
        let app = TestApp::spawn().await;
        let guess = json!({"email": "bob@example.com", "password": "secret1"});
        for _ in 0..5 {
            let res = app.post_without_token(routes::LOGIN, &guess).await;
            assert_eq!(res.status, 401);
        }

        app.create_authenticated_user("bob@example.com", "secret1")
            .await;
        let res = app.post_without_token(routes::LOGIN, &guess).await;
        assert_eq!(res.status, 200);
        assert_eq!(app.identity.tracked_failures(), 0);
    }

    #[tokio::test]
    async fn disabled_account_cannot_log_in() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("alice@example.com", "secret1")
            .await;
        assert!(app.identity.disable("alice@example.com"));

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "ACCOUNT_DISABLED");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::OPENAPI).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["info"]["title"], "HTMLIVE API");
        assert!(res.body["paths"]["/api/v1/auth/login"].is_object());
    }
}
