//! Teacher endpoints
//!
//! Submitting classroom problems, flagging them for a cluster resource
//! person (CRP), and managing stored queries.

mod models;
pub use models::*;

use std::collections::HashMap;

use reqwest::multipart::{Form, Part};

use crate::core::RequestExecutor;
use crate::error::{Result, ServiceError};
use crate::resilience::ApiResponse;

use super::EduPulseClient;

const QUERY_ENDPOINT: &str = "/api/teacher/query";
const FLAG_ENDPOINT: &str = "/api/teacher/flag";
const SAMPLE_ENDPOINT: &str = "/api/teacher/sample-response";

/// Teacher API group, borrowed from an [`EduPulseClient`]
#[derive(Debug, Clone, Copy)]
pub struct TeacherApi<'a> {
    client: &'a EduPulseClient,
}

impl<'a> TeacherApi<'a> {
    pub(crate) fn new(client: &'a EduPulseClient) -> Self {
        Self { client }
    }

    /// Submit a query and receive advice
    ///
    /// The phone number is hashed (or replaced by the demo placeholder)
    /// before anything is sent. Requests with an attachment go out as
    /// multipart forms, the rest as JSON.
    pub async fn create_query(&self, request: &TeacherQueryRequest) -> ApiResponse<TeacherQueryResponse> {
        let phone = self
            .client
            .phone_hasher()
            .phone_to_send(request.phone.as_deref(), request.is_demo);

        if let Some(attachment) = &request.attachment {
            log::debug!(
                "Submitting query with attachment {} ({} bytes)",
                attachment.name,
                attachment.size()
            );

            let phone = phone.as_deref();
            return self
                .client
                .call(|| async move {
                    let form = query_form(request, phone)?;
                    self.client.post_multipart(QUERY_ENDPOINT, form).await
                })
                .await;
        }

        let payload = QueryPayload {
            phone: phone.unwrap_or_default(),
            cluster: request.cluster_or_default(),
            topic: request.topic_or_default(),
            text: &request.text,
            is_demo: request.is_demo,
            consent_given: request.consent_or_default(),
        };

        self.client
            .call(|| self.client.post(QUERY_ENDPOINT, &payload))
            .await
    }

    /// Flag a query for CRP follow-up
    pub async fn flag_to_crp(&self, query_id: &str, reason: &str) -> ApiResponse<FlagResponse> {
        let body = FlagRequest::new(query_id, reason);
        self.client.call(|| self.client.post(FLAG_ENDPOINT, &body)).await
    }

    /// Deterministic sample advice for a topic
    pub async fn sample_response(&self, topic: Option<&str>) -> ApiResponse<TeacherQueryResponse> {
        let topic = non_blank(topic).unwrap_or(DEFAULT_SAMPLE_TOPIC);
        let mut params = HashMap::new();
        params.insert("topic".to_string(), topic.to_string());

        self.client
            .call(|| self.client.get(SAMPLE_ENDPOINT, Some(params.clone())))
            .await
    }

    /// A stored query by id
    pub async fn query_detail(&self, query_id: &str) -> ApiResponse<TeacherQueryDetail> {
        let endpoint = format!("{}/{}", QUERY_ENDPOINT, query_id);
        self.client.call(|| self.client.get(&endpoint, None)).await
    }

    /// Delete a stored query
    pub async fn delete_query(&self, query_id: &str) -> ApiResponse<DeleteResponse> {
        let endpoint = format!("{}/{}", QUERY_ENDPOINT, query_id);
        self.client.call(|| self.client.delete(&endpoint)).await
    }
}

fn query_form(request: &TeacherQueryRequest, phone: Option<&str>) -> Result<Form> {
    let mut form = Form::new().text("text", request.text.clone());

    if let Some(cluster) = non_blank(request.cluster.as_deref()) {
        form = form.text("cluster", cluster.to_string());
    }
    if let Some(topic) = non_blank(request.topic.as_deref()) {
        form = form.text("topic", topic.to_string());
    }
    if let Some(phone) = phone {
        form = form.text("phone", phone.to_string());
    }
    if request.is_demo {
        form = form.text("is_demo", "true");
    }

    if let Some(attachment) = &request.attachment {
        let part = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.name.clone())
            .mime_str(&attachment.mime_type)
            .map_err(|e| {
                ServiceError::validation(format!(
                    "Invalid attachment type {}: {}",
                    attachment.mime_type, e
                ))
            })?;
        form = form.part("attachment", part);
    }

    Ok(form.text("consent_given", request.consent_or_default().to_string()))
}
