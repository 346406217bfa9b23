mod common;

use axum::http::StatusCode;
use ck_protocol::events::Event;
use ck_protocol::ipc::Credentials;
use ck_protocol::run_models::{InstallKind, RunStatus};
use common::*;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = setup_test_app("exit 0");

        let response = app.server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_status_starts_idle() {
        let app = setup_test_app("exit 0");

        let response = app.server.get("/status").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "idle");
        assert!(body["run_id"].is_null());
    }
}

mod inventory {
    use super::*;

    #[tokio::test]
    async fn test_generate_writes_tree() {
        let app = setup_test_app("exit 0");

        let response = app.server.post("/generate").json(&fleet()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "status": "success" }));
        assert!(app.inventory_root().join("all.yaml").is_file());
        assert!(app.inventory_root().join("host_vars/node-1.yaml").is_file());
    }

    #[tokio::test]
    async fn test_generate_rejects_fleet_without_master() {
        let app = setup_test_app("exit 0");

        let response = app
            .server
            .post("/generate")
            .json(&json!({ "vms": [{ "name": "node-1", "ip": "10.0.0.20", "role": "worker" }] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "invalid_inventory");
        assert!(body["message"].as_str().unwrap().contains("master"));
        assert!(!app.inventory_root().join("all.yaml").exists());
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() {
        let app = setup_test_app("exit 0");

        let response = app
            .server
            .post("/generate")
            .json(&json!({ "vms": "cp-1" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
    }
}

mod runs {
    use super::*;

    #[tokio::test]
    async fn test_deploy_streams_ndjson() {
        let app = setup_test_app(
            "echo 'TASK [prepare-hosts : apt]'; \
             echo 'TASK [master-install : k3s server]'; \
             exit 0",
        );
        app.server.post("/generate").json(&fleet()).await.assert_status_ok();

        let response = app.server.post("/deploy").json(&credentials()).await;

        response.assert_status_ok();
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            "application/x-ndjson"
        );
        let lines = ndjson_lines(&response.text());
        let kinds: Vec<_> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                "steps",
                "step_start",
                "task",
                "step_done",
                "step_start",
                "task",
                "step_done",
                "finished"
            ]
        );
        assert_eq!(lines[1], json!({ "type": "step_start", "step": "prepare" }));
        assert_eq!(
            lines[7],
            json!({ "type": "finished", "success": true, "aborted": false })
        );

        let status: Value = app.server.get("/status").await.json();
        assert_eq!(status["status"], "succeeded");
        assert_eq!(status["kind"], "install");
        assert_eq!(std::fs::read_dir(app.staging_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_uninstall_uses_uninstall_catalog() {
        let app = setup_test_app("echo 'TASK [worker-uninstall : drain]'; exit 1");
        app.server.post("/generate").json(&fleet()).await.assert_status_ok();

        let response = app.server.post("/uninstall").json(&credentials()).await;

        response.assert_status_ok();
        let lines = ndjson_lines(&response.text());
        let first_step = lines[0]["steps"][0]["id"].as_str();
        assert_eq!(first_step, Some("workers"));
        assert_eq!(lines[lines.len() - 2], json!({ "type": "step_failed", "step": "workers" }));
        assert_eq!(app.state.supervisor.status(), RunStatus::Failed);
    }

    #[tokio::test]
    async fn test_deploy_without_inventory() {
        let app = setup_test_app("exit 0");

        let response = app.server.post("/deploy").json(&credentials()).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "inventory_missing");
        assert_eq!(app.state.supervisor.status(), RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_deploy_with_blank_key() {
        let app = setup_test_app("exit 0");
        app.server.post("/generate").json(&fleet()).await.assert_status_ok();

        let response = app
            .server
            .post("/deploy")
            .json(&json!({ "username": "ubuntu", "private_key": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_abort_when_idle() {
        let app = setup_test_app("exit 0");

        let response = app.server.post("/abort").await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "not_running");
    }

    #[tokio::test]
    async fn test_conflict_then_abort() {
        let app = setup_test_app("trap 'exit 0' TERM; echo 'TASK [prepare-hosts : wait]'; sleep 30");
        app.server.post("/generate").json(&fleet()).await.assert_status_ok();

        let mut events = app
            .state
            .supervisor
            .start(
                InstallKind::Install,
                Credentials::new("ubuntu", "-----BEGIN KEY-----\nk\n-----END KEY-----"),
            )
            .await
            .unwrap();
        loop {
            match events.next().await {
                Some(Event::StepStart { .. }) => break,
                Some(_) => continue,
                None => panic!("Run ended before starting a step"),
            }
        }

        let conflict = app.server.post("/deploy").json(&credentials()).await;
        conflict.assert_status(StatusCode::CONFLICT);
        let body: Value = conflict.json();
        assert_eq!(body["error"], "conflict");

        let status: Value = app.server.get("/status").await.json();
        assert_eq!(status["status"], "running");
        assert_eq!(status["active_step"], "prepare");

        let abort = app.server.post("/abort").await;
        abort.assert_status_ok();
        let body: Value = abort.json();
        assert_eq!(body, json!({ "status": "aborting" }));

        let rest: Vec<Event> = events.collect().await;
        assert_eq!(
            rest.last(),
            Some(&Event::Finished {
                success: false,
                aborted: true
            })
        );
        assert_eq!(app.state.supervisor.status(), RunStatus::Aborted);
    }
}

mod probe {
    use super::*;

    #[tokio::test]
    async fn test_probe_reports_reachability() {
        let app = setup_test_app("exit 0");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let response = app
            .server
            .post("/probe")
            .json(&json!({ "hosts": ["127.0.0.1"], "port": port }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body,
            json!([{ "host": "127.0.0.1", "port": port, "reachable": true }])
        );
    }

    #[tokio::test]
    async fn test_probe_requires_hosts() {
        let app = setup_test_app("exit 0");

        let response = app.server.post("/probe").json(&json!({ "hosts": [] })).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
