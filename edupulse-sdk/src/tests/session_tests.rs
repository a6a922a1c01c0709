//! Tests for the session facade: live calls, offline fallback and
//! persisted preferences

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::EduPulseConfig;
    use crate::error::ServiceError;
    use crate::media::ImageFile;
    use crate::resilience::FallbackState;
    use crate::services::diet::{AggregateFilter, ModuleGenerateRequest};
    use crate::services::lfa::LfaExportRequest;
    use crate::session::{DataSource, EduPulse, QueryDraft};
    use crate::store::{MemoryStore, SharedStore};

    fn config_for(base_url: &str) -> EduPulseConfig {
        EduPulseConfig {
            base_url: base_url.to_string(),
            retries: 0,
            ..EduPulseConfig::default()
        }
    }

    async fn open_session(server: &MockServer) -> EduPulse {
        EduPulse::open(config_for(&server.uri()), MemoryStore::shared())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_live_query_is_served_live() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/teacher/query"))
            .and(body_partial_json(json!({
                "phone": "demo-000",
                "cluster": "Default Cluster",
                "topic": "subtraction-borrowing",
                "is_demo": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "q-live",
                "advice": "Model borrowing with bundles of sticks.",
                "module_sample_link": "/templates/samples/subtraction-borrowing-module.pptx"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = open_session(&server).await;
        let response = session
            .submit_query(QueryDraft::new("  My class keeps forgetting to borrow  "))
            .await
            .unwrap();

        let served = response.data().unwrap();
        assert_eq!(served.source, DataSource::Live);
        assert_eq!(served.data.id, "q-live");
        assert_eq!(session.state().await, FallbackState::Online);
    }

    #[tokio::test]
    async fn test_repeated_failures_switch_to_mock_advice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/teacher/query"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let session = open_session(&server).await;
        let draft = QueryDraft::new("Half my students cannot compare fractions");

        let first = session.submit_query(draft.clone()).await.unwrap();
        assert_eq!(first.error(), Some("Request failed with status code 503"));
        assert_eq!(session.state().await, FallbackState::Degraded);

        let second = session.submit_query(draft.clone()).await.unwrap();
        let served = second.data().unwrap();
        assert!(served.is_mock());
        assert_eq!(served.data.id, "mock-query-2");
        assert!(session.is_mock_mode().await);

        // Mock mode answers locally without touching the server
        let third = session.submit_query(draft).await.unwrap();
        assert!(third.data().unwrap().is_mock());
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let server = MockServer::start().await;
        let session = open_session(&server).await;

        let err = session.submit_query(QueryDraft::new("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(session.state().await, FallbackState::Online);
    }

    #[tokio::test]
    async fn test_non_image_attachment_is_rejected() {
        let server = MockServer::start().await;
        let session = open_session(&server).await;

        let draft = QueryDraft::new("See the worksheet")
            .attachment(ImageFile::new("worksheet.pdf", "application/pdf", vec![1, 2, 3]));

        let err = session.submit_query(draft).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_dashboard_falls_back_to_demo_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/diet/aggregate"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Database unavailable"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = open_session(&server).await;
        let served = session.load_dashboard(&AggregateFilter::new()).await.unwrap();

        assert_eq!(served.source, DataSource::Mock);
        assert_eq!(served.data.total_queries, 15);
        assert_eq!(session.state().await, FallbackState::Degraded);
    }

    #[tokio::test]
    async fn test_export_lfa_drops_blank_entries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/lfa/export"))
            .and(body_json(json!({
                "title": "Reading in Cluster B",
                "problem_statement": "Class 3 reads slowly",
                "student_change": "Fluent reading of short stories",
                "stakeholders": ["Teachers", "Parents"],
                "practice_changes": ["Daily reading circle"],
                "indicators": []
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "export_url": format!("{}/exports/lfa_2.pptx", server.uri()),
                "lfa_id": "lfa-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = open_session(&server).await;
        let request = LfaExportRequest {
            title: "Reading in Cluster B".to_string(),
            problem_statement: "Class 3 reads slowly".to_string(),
            student_change: "Fluent reading of short stories".to_string(),
            stakeholders: vec!["Teachers".to_string(), " ".to_string(), "Parents".to_string()],
            practice_changes: vec!["Daily reading circle".to_string(), String::new()],
            indicators: vec!["".to_string()],
        };

        let response = session.export_lfa(&request).await.unwrap();
        let served = response.data().unwrap();
        assert_eq!(served.source, DataSource::Live);
        assert_eq!(served.data.lfa_id, "lfa-2");
    }

    #[tokio::test]
    async fn test_mock_mode_serves_modules_and_flags() {
        let server = MockServer::start().await;
        let session = open_session(&server).await;
        session.enable_mock_mode().await.unwrap();

        let module = session
            .generate_module(&ModuleGenerateRequest::new("Cluster A", "fractions-conceptual"))
            .await
            .unwrap();
        let module = module.data().unwrap();
        assert!(module.is_mock());
        assert_eq!(module.data.title, "Understanding Fractions - Micro Module");

        let flagged = session.flag_query("mock-query-1", "").await.unwrap();
        assert_eq!(flagged.data().unwrap().data.query_id.as_deref(), Some("mock-query-1"));

        assert_eq!(session.disable_mock_mode().await.unwrap(), FallbackState::Online);
    }

    #[tokio::test]
    async fn test_saved_base_url_overrides_config() {
        let server = MockServer::start().await;
        let store: SharedStore = MemoryStore::shared();

        let mut session = EduPulse::open(config_for("http://127.0.0.1:9"), store.clone())
            .await
            .unwrap();
        assert_eq!(session.api_base_url(), "http://127.0.0.1:9");

        session.set_api_base_url(&format!("{}/", server.uri())).await.unwrap();
        assert_eq!(session.api_base_url(), server.uri());

        let reopened = EduPulse::open(config_for("http://127.0.0.1:9"), store.clone())
            .await
            .unwrap();
        assert_eq!(reopened.api_base_url(), server.uri());

        session.clear_api_base_url().await.unwrap();
        assert_eq!(session.api_base_url(), "http://127.0.0.1:9");

        assert!(session.set_api_base_url("not a url").await.is_err());
    }

    #[tokio::test]
    async fn test_notes_are_kept() {
        let server = MockServer::start().await;
        let session = open_session(&server).await;

        session
            .save_note("Use bundles of ten sticks", Some("subtraction-borrowing"), Some("q-1"))
            .await
            .unwrap();
        session.save_note("Seat quieter students together", None, None).await.unwrap();

        let notes = session.notes().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].query_id.as_deref(), Some("q-1"));
        assert_eq!(notes[1].topic, "general");
    }
}
