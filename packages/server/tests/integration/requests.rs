use htmlive_common::RequestStatus;
use serde_json::{Value, json};

use crate::common::{TestApp, UploadFile, bundle_form, file, routes};

mod submission {
    use super::*;

    #[tokio::test]
    async fn signed_in_user_can_submit_a_bundle() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let form = bundle_form(
            Some("  Demo  "),
            Some("My first site"),
            &[
                file("index.html", "<h1>Demo</h1>"),
                file("style.css", "h1{color:red}"),
            ],
        );
        let res = app.upload(routes::REQUESTS, form, Some(&token)).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["file_count"], 2);

        let stored = app.store.requests();
        assert_eq!(stored.len(), 1);
        let request = &stored[0];
        assert_eq!(request.id, res.body["id"].as_str().unwrap());
        assert_eq!(request.name, "Demo");
        assert_eq!(request.description, "My first site");
        assert_eq!(request.user_email, "alice@example.com");
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.url, "");
        assert!(request.created_at.is_some());

        let names: Vec<_> = request.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["index.html", "style.css"]);
        assert_eq!(request.files[0].content, "<h1>Demo</h1>");
        assert_eq!(request.files[0].mime_type, "text/html");
        assert_eq!(request.files[1].mime_type, "text/css");
    }

    #[tokio::test]
    async fn declared_mime_type_is_kept() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let files = [UploadFile {
            name: "page.html",
            mime: Some("application/xhtml+xml"),
            content: b"<p>x</p>",
        }];
        app.submit(&token, "Typed", &files).await;

        assert_eq!(
            app.store.requests()[0].files[0].mime_type,
            "application/xhtml+xml"
        );
    }

    #[tokio::test]
    async fn submission_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let form = bundle_form(Some("Demo"), None, &[file("index.html", "x")]);
        let res = app.upload(routes::REQUESTS, form, None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        assert!(app.store.requests().is_empty());
    }

    #[tokio::test]
    async fn submission_without_files_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let res = app
            .upload(routes::REQUESTS, bundle_form(Some("Demo"), None, &[]), Some(&token))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Please select at least one file");
        assert!(app.store.requests().is_empty());
    }

    #[tokio::test]
    async fn submission_without_name_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let form = bundle_form(Some("   "), None, &[file("index.html", "x")]);
        let res = app.upload(routes::REQUESTS, form, Some(&token)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Please enter a site name");
        assert!(app.store.requests().is_empty());
    }

    #[tokio::test]
    async fn nested_paths_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let form = bundle_form(Some("Demo"), None, &[file("../index.html", "x")]);
        let res = app.upload(routes::REQUESTS, form, Some(&token)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_bundle_is_rejected() {
        let app = TestApp::spawn_with_upload(server::config::UploadConfig {
            max_files: 200,
            max_total_bytes: 16,
        })
        .await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let form = bundle_form(
            Some("Big"),
            None,
            &[file("a.html", "0123456789"), file("b.html", "0123456789")],
        );
        let res = app.upload(routes::REQUESTS, form, Some(&token)).await;

        assert_eq!(res.status, 400);
        assert!(app.store.requests().is_empty());
    }

    #[tokio::test]
    async fn store_failure_reports_and_creates_nothing() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        app.store.set_unavailable(true);

        let form = bundle_form(Some("Demo"), None, &[file("index.html", "x")]);
        let res = app.upload(routes::REQUESTS, form, Some(&token)).await;

        assert_eq!(res.status, 503);
        assert_eq!(res.body["code"], "STORE_ERROR");
        assert!(app.store.requests().is_empty());
    }

    #[tokio::test]
    async fn double_submit_creates_two_requests() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let first = app.submit(&token, "Demo", &[file("index.html", "x")]).await;
        let second = app.submit(&token, "Demo", &[file("index.html", "x")]).await;

        assert_ne!(first, second);
        assert_eq!(app.store.requests().len(), 2);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn lists_only_own_requests_newest_first() {
        let app = TestApp::spawn().await;
        let alice = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        let bob = app
            .create_authenticated_user("bob@example.com", "secret1")
            .await;

        let first = app.submit(&alice, "First", &[file("index.html", "1")]).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = app.submit(&alice, "Second", &[file("index.html", "2")]).await;
        app.submit(&bob, "Bob's", &[file("index.html", "b")]).await;

        let res = app.get_with_token(routes::REQUESTS, &alice).await;

        assert_eq!(res.status, 200);
        let ids: Vec<_> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, [second, first]);
        assert_eq!(res.body["data"][0]["status"], "pending");
        assert_eq!(res.body["data"][0]["file_count"], 1);
    }

    #[tokio::test]
    async fn moderator_url_makes_a_request_live() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        let id = app.submit(&token, "Demo", &[file("index.html", "x")]).await;

        app.store.set_url(&id, "demo.example.com").unwrap();
        let res = app.get_with_token(routes::REQUESTS, &token).await;

        assert_eq!(res.body["data"][0]["status"], "live");
        assert_eq!(res.body["data"][0]["url"], "demo.example.com");
    }

    #[tokio::test]
    async fn listing_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::REQUESTS).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unavailable_store_is_reported() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        app.store.set_unavailable(true);

        let res = app.get_with_token(routes::REQUESTS, &token).await;

        assert_eq!(res.status, 503);
        assert_eq!(res.body["code"], "STORE_ERROR");
    }
}

mod streaming {
    use super::*;

    /// Read the next `data:` payload from an event stream.
    async fn next_event(res: &mut reqwest::Response, buffer: &mut String) -> Value {
        loop {
            if let Some(end) = buffer.find("\n\n") {
                let frame: String = buffer.drain(..end + 2).collect();
                let data: String = frame
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                if !data.is_empty() {
                    return serde_json::from_str(&data).expect("event data is JSON");
                }
                continue;
            }
            let chunk = res
                .chunk()
                .await
                .expect("stream read failed")
                .expect("stream ended early");
            buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    #[tokio::test]
    async fn stream_delivers_full_list_on_every_change() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        let first = app.submit(&token, "First", &[file("index.html", "1")]).await;

        let mut res = app
            .client
            .get(app.url(routes::REQUESTS_STREAM))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let mut buffer = String::new();

        let initial = next_event(&mut res, &mut buffer).await;
        assert_eq!(initial.as_array().unwrap().len(), 1);
        assert_eq!(initial[0]["id"], first.as_str());

        app.submit(&token, "Second", &[file("index.html", "2")]).await;
        let after_submit = next_event(&mut res, &mut buffer).await;
        assert_eq!(after_submit.as_array().unwrap().len(), 2);

        app.store.set_status(&first, RequestStatus::Live).unwrap();
        let after_approval = next_event(&mut res, &mut buffer).await;
        let approved = after_approval
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == first.as_str())
            .unwrap();
        assert_eq!(approved["status"], "live");
    }

    #[tokio::test]
    async fn disconnecting_releases_the_subscription() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;

        let mut res = app
            .client
            .get(app.url(routes::REQUESTS_STREAM))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .unwrap();
        let mut buffer = String::new();
        next_event(&mut res, &mut buffer).await;
        assert_eq!(app.store.observer_count(), 1);

        drop(res);
        // Trigger a write so the server notices the closed connection.
        for _ in 0..50 {
            app.submit(&token, "Ping", &[file("index.html", "x")]).await;
            if app.store.observer_count() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(app.store.observer_count(), 0);
    }

    #[tokio::test]
    async fn failed_feed_ends_with_an_empty_list() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        app.submit(&token, "First", &[file("index.html", "1")]).await;

        let user_id = app.store.requests()[0].user_id.clone();
        let mut res = app
            .client
            .get(app.url(routes::REQUESTS_STREAM))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .unwrap();
        let mut buffer = String::new();
        assert_eq!(next_event(&mut res, &mut buffer).await.as_array().unwrap().len(), 1);

        app.store.fail_subscriptions(&user_id, "permission denied");
        let last = next_event(&mut res, &mut buffer).await;
        assert_eq!(last, json!([]));
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn confirmed_deletion_records_a_request_and_keeps_the_site() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        let id = app.submit(&token, "Doomed", &[file("index.html", "x")]).await;

        let res = app
            .post_with_token(&routes::deletion(&id), &json!({"confirm": true}), &token)
            .await;

        assert_eq!(res.status, 202, "{}", res.text);
        assert_eq!(res.body["original_request_id"], id.as_str());
        assert_eq!(res.body["site_name"], "Doomed");

        let deletions = app.store.deletion_requests();
        assert_eq!(deletions.len(), 1);
        assert_eq!(deletions[0].original_request_id, id);
        assert_eq!(deletions[0].user_email, "alice@example.com");
        assert_eq!(deletions[0].status, RequestStatus::Pending);
        assert_eq!(app.store.requests().len(), 1);
    }

    #[tokio::test]
    async fn unconfirmed_deletion_writes_nothing() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        let id = app.submit(&token, "Kept", &[file("index.html", "x")]).await;

        for body in [json!({"confirm": false}), json!({})] {
            let res = app
                .post_with_token(&routes::deletion(&id), &body, &token)
                .await;
            assert_eq!(res.status, 400);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
        assert!(app.store.deletion_requests().is_empty());
    }

    #[tokio::test]
    async fn cannot_request_deletion_of_someone_elses_site() {
        let app = TestApp::spawn().await;
        let alice = app
            .create_authenticated_user("alice@example.com", "secret1")
            .await;
        let bob = app
            .create_authenticated_user("bob@example.com", "secret1")
            .await;
        let id = app.submit(&alice, "Alice's", &[file("index.html", "x")]).await;

        let res = app
            .post_with_token(&routes::deletion(&id), &json!({"confirm": true}), &bob)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert!(app.store.deletion_requests().is_empty());
    }
}
