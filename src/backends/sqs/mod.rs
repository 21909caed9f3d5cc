// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Amazon SQS over its JSON protocol.
//!
//! Requests are `POST /` against the queue's endpoint with an
//! `X-Amz-Target: AmazonSQS.<Action>` header and a JSON body. When credentials
//! are configured every request is signed with SigV4; without credentials
//! requests go out unsigned, which is what local SQS emulators expect.

mod signer;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::json;

use crate::config::{AwsCredentials, QueueSettings};
use crate::errors::{ConfigError, QueueError};
use crate::traits::{MessageId, QueueClient, ReceiptHandle, ReceivedMessage};

use signer::SigningParams;

const SERVICE: &str = "sqs";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const TARGET_PREFIX: &str = "AmazonSQS.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ReceiveMessageResponse {
    #[serde(rename = "Messages", default)]
    messages: Vec<SqsMessage>,
}

#[derive(Debug, Deserialize)]
struct SqsMessage {
    #[serde(rename = "MessageId")]
    message_id: String,
    #[serde(rename = "ReceiptHandle")]
    receipt_handle: String,
    #[serde(rename = "Body")]
    body: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(rename = "MessageId")]
    message_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type")]
    code: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

pub struct SqsQueue {
    client: reqwest::Client,
    queue_url: String,
    endpoint: Url,
    host: String,
    region: String,
    credentials: Option<AwsCredentials>,
}

impl SqsQueue {
    /// Build a client for `queue_url`.
    ///
    /// The region comes from settings, or from an `sqs.<region>.amazonaws.com`
    /// host when not set.
    pub fn from_settings(queue_url: &str, settings: &QueueSettings) -> Result<Self, ConfigError> {
        let url = Url::parse(queue_url).map_err(|e| ConfigError::InvalidValue {
            path: "queue.url".to_string(),
            reason: e.to_string(),
        })?;

        let host_name = url.host_str().ok_or_else(|| ConfigError::InvalidValue {
            path: "queue.url".to_string(),
            reason: "URL has no host".to_string(),
        })?;
        let host = match url.port() {
            Some(port) => format!("{host_name}:{port}"),
            None => host_name.to_string(),
        };

        let region = match &settings.region {
            Some(region) => region.clone(),
            None => region_from_host(host_name).ok_or_else(|| ConfigError::Missing {
                path: "aws.region".to_string(),
            })?,
        };

        let mut endpoint = url.clone();
        endpoint.set_path("/");
        endpoint.set_query(None);
        endpoint.set_fragment(None);

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                path: "queue.url".to_string(),
                reason: e.to_string(),
            })?;

        if settings.credentials.is_none() {
            tracing::warn!(queue_url, "No AWS credentials configured, SQS requests are unsigned");
        }

        Ok(Self {
            client,
            queue_url: queue_url.to_string(),
            endpoint,
            host,
            region,
            credentials: settings.credentials.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<T, QueueError> {
        let body = serde_json::to_vec(&payload)
            .map_err(|e| QueueError::InvalidResponse(format!("Unable to serialize request: {e}")))?;
        let target = format!("{TARGET_PREFIX}{action}");

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .timeout(timeout)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", &target);

        if let Some(credentials) = &self.credentials {
            let signed = signer::sign(
                &SigningParams {
                    credentials,
                    region: &self.region,
                    service: SERVICE,
                    host: &self.host,
                    time: chrono::Utc::now(),
                },
                &[("content-type", CONTENT_TYPE), ("x-amz-target", target.as_str())],
                &body,
            );
            for (name, value) in signed.into_pairs() {
                request = request.header(name, value);
            }
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error: ServiceErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(QueueError::Service {
                code: error
                    .code
                    .as_deref()
                    .map(short_error_code)
                    .unwrap_or_else(|| status.as_u16().to_string()),
                message: error
                    .message
                    .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned()),
            });
        }

        // Operations without output may answer with an empty body instead of `{}`
        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes[..]
        };
        serde_json::from_slice(payload)
            .map_err(|e| QueueError::InvalidResponse(format!("{action}: {e}")))
    }
}

/// `com.amazonaws.sqs#QueueDoesNotExist` -> `QueueDoesNotExist`
fn short_error_code(code: &str) -> String {
    code.rsplit('#').next().unwrap_or(code).to_string()
}

fn region_from_host(host: &str) -> Option<String> {
    let mut labels = host.split('.');
    match (labels.next(), labels.next()) {
        (Some("sqs"), Some(region)) if host.ends_with(".amazonaws.com") => Some(region.to_string()),
        _ => None,
    }
}

fn receipt_error(receipt: &ReceiptHandle, err: QueueError) -> QueueError {
    match err {
        QueueError::Service { code, .. } if code == "ReceiptHandleIsInvalid" => {
            QueueError::InvalidReceipt(receipt.as_str().to_string())
        }
        other => other,
    }
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
        lease: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        let response: ReceiveMessageResponse = self
            .call(
                "ReceiveMessage",
                json!({
                    "QueueUrl": self.queue_url,
                    "MaxNumberOfMessages": max_messages,
                    "WaitTimeSeconds": wait.as_secs(),
                    "VisibilityTimeout": lease.as_secs(),
                }),
                wait + REQUEST_TIMEOUT,
            )
            .await?;

        Ok(response
            .messages
            .into_iter()
            .map(|m| ReceivedMessage {
                id: MessageId(m.message_id),
                body: m.body,
                receipt: ReceiptHandle(m.receipt_handle),
            })
            .collect())
    }

    async fn renew_lease(&self, receipt: &ReceiptHandle, lease: Duration) -> Result<(), QueueError> {
        self.call::<IgnoredAny>(
            "ChangeMessageVisibility",
            json!({
                "QueueUrl": self.queue_url,
                "ReceiptHandle": receipt.as_str(),
                "VisibilityTimeout": lease.as_secs(),
            }),
            REQUEST_TIMEOUT,
        )
        .await
        .map(|_| ())
        .map_err(|e| receipt_error(receipt, e))
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.call::<IgnoredAny>(
            "DeleteMessage",
            json!({
                "QueueUrl": self.queue_url,
                "ReceiptHandle": receipt.as_str(),
            }),
            REQUEST_TIMEOUT,
        )
        .await
        .map(|_| ())
        .map_err(|e| receipt_error(receipt, e))
    }

    async fn send(&self, body: String) -> Result<MessageId, QueueError> {
        let response: SendMessageResponse = self
            .call(
                "SendMessage",
                json!({
                    "QueueUrl": self.queue_url,
                    "MessageBody": body,
                }),
                REQUEST_TIMEOUT,
            )
            .await?;

        Ok(MessageId(response.message_id))
    }

    fn name(&self) -> &'static str {
        "sqs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn queue_for(server: &mockito::ServerGuard, credentials: Option<AwsCredentials>) -> SqsQueue {
        let settings = QueueSettings {
            url: None,
            region: Some("eu-central-1".to_string()),
            credentials,
        };
        SqsQueue::from_settings(&format!("{}/123456789012/events", server.url()), &settings)
            .unwrap()
    }

    #[test]
    fn test_region_resolution() {
        struct TestCase {
            name: &'static str,
            url: &'static str,
            region: Option<&'static str>,
            expected: Option<&'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "region from host",
                url: "https://sqs.eu-central-1.amazonaws.com/123456789012/events",
                region: None,
                expected: Some("eu-central-1"),
            },
            TestCase {
                name: "configured region wins",
                url: "https://sqs.eu-central-1.amazonaws.com/123456789012/events",
                region: Some("us-east-1"),
                expected: Some("us-east-1"),
            },
            TestCase {
                name: "custom endpoint needs a region",
                url: "http://localhost:9324/000000000000/events",
                region: None,
                expected: None,
            },
            TestCase {
                name: "custom endpoint with region",
                url: "http://localhost:9324/000000000000/events",
                region: Some("elasticmq"),
                expected: Some("elasticmq"),
            },
        ];

        for test_case in test_cases {
            let settings = QueueSettings {
                url: None,
                region: test_case.region.map(str::to_string),
                credentials: None,
            };
            let result = SqsQueue::from_settings(test_case.url, &settings);

            match test_case.expected {
                Some(region) => assert_eq!(
                    result.unwrap().region,
                    region,
                    "Test case '{}' failed",
                    test_case.name
                ),
                None => assert!(
                    matches!(result, Err(ConfigError::Missing { .. })),
                    "Test case '{}' failed",
                    test_case.name
                ),
            }
        }
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = SqsQueue::from_settings("not a url", &QueueSettings::default());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_receive_parses_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", "AmazonSQS.ReceiveMessage")
            .match_header("content-type", CONTENT_TYPE)
            .match_body(Matcher::PartialJson(json!({
                "MaxNumberOfMessages": 1,
                "WaitTimeSeconds": 20,
                "VisibilityTimeout": 30,
            })))
            .with_status(200)
            .with_body(
                r#"{"Messages":[{"MessageId":"m-1","ReceiptHandle":"r-1","MD5OfBody":"x","Body":"payload"}]}"#,
            )
            .create_async()
            .await;

        let queue = queue_for(&server, None);
        let received = queue
            .receive(1, Duration::from_secs(20), Duration::from_secs(30))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, MessageId("m-1".to_string()));
        assert_eq!(received[0].receipt, ReceiptHandle("r-1".to_string()));
        assert_eq!(received[0].body, "payload");
    }

    #[tokio::test]
    async fn test_empty_receive() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let queue = queue_for(&server, None);
        let received = queue
            .receive(1, Duration::ZERO, Duration::from_secs(30))
            .await
            .unwrap();

        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_send_returns_message_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", "AmazonSQS.SendMessage")
            .match_body(Matcher::PartialJson(json!({ "MessageBody": "encoded" })))
            .with_status(200)
            .with_body(r#"{"MessageId":"m-42","MD5OfMessageBody":"x"}"#)
            .create_async()
            .await;

        let queue = queue_for(&server, None);
        let id = queue.send("encoded".to_string()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(id.to_string(), "m-42");
    }

    #[tokio::test]
    async fn test_signed_requests_carry_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header(
                "authorization",
                Matcher::Regex(r"^AWS4-HMAC-SHA256 Credential=AKID/\d{8}/eu-central-1/sqs/aws4_request".to_string()),
            )
            .match_header("x-amz-date", Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let queue = queue_for(
            &server,
            Some(AwsCredentials {
                access_key_id: "AKID".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            }),
        );
        queue
            .delete(&ReceiptHandle("r-1".to_string()))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_service_errors() {
        struct TestCase {
            name: &'static str,
            body: &'static str,
            invalid_receipt: bool,
        }

        let test_cases = vec![
            TestCase {
                name: "invalid receipt",
                body: r#"{"__type":"com.amazonaws.sqs#ReceiptHandleIsInvalid","message":"bad handle"}"#,
                invalid_receipt: true,
            },
            TestCase {
                name: "other service error",
                body: r#"{"__type":"com.amazonaws.sqs#QueueDoesNotExist","message":"gone"}"#,
                invalid_receipt: false,
            },
        ];

        for test_case in test_cases {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/")
                .with_status(400)
                .with_body(test_case.body)
                .create_async()
                .await;

            let queue = queue_for(&server, None);
            let err = queue
                .delete(&ReceiptHandle("r-1".to_string()))
                .await
                .unwrap_err();

            if test_case.invalid_receipt {
                assert!(
                    matches!(err, QueueError::InvalidReceipt(ref r) if r == "r-1"),
                    "Test case '{}' failed: {err}",
                    test_case.name
                );
            } else {
                assert!(
                    matches!(err, QueueError::Service { ref code, .. } if code == "QueueDoesNotExist"),
                    "Test case '{}' failed: {err}",
                    test_case.name
                );
            }
        }
    }

    #[tokio::test]
    async fn test_empty_success_body_completes_receipt_actions() {
        struct TestCase {
            name: &'static str,
            target: &'static str,
            body: &'static str,
        }

        let test_cases = vec![
            TestCase { name: "delete, empty body", target: "AmazonSQS.DeleteMessage", body: "" },
            TestCase { name: "delete, whitespace body", target: "AmazonSQS.DeleteMessage", body: " \n" },
            TestCase {
                name: "renew, empty body",
                target: "AmazonSQS.ChangeMessageVisibility",
                body: "",
            },
        ];

        for test_case in test_cases {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("POST", "/")
                .match_header("x-amz-target", test_case.target)
                .with_status(200)
                .with_body(test_case.body)
                .create_async()
                .await;

            let queue = queue_for(&server, None);
            let receipt = ReceiptHandle("r-1".to_string());
            let result = if test_case.target.ends_with("DeleteMessage") {
                queue.delete(&receipt).await
            } else {
                queue.renew_lease(&receipt, Duration::from_secs(30)).await
            };

            assert!(result.is_ok(), "Test case '{}' failed: {:?}", test_case.name, result);
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let queue = queue_for(&server, None);
        let err = queue.send("x".to_string()).await.unwrap_err();

        assert!(matches!(err, QueueError::InvalidResponse(_)));
    }
}
