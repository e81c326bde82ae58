use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::{Validate, ValidationErrors};

/// JSON body that is deserialized and then checked with `validator`.
/// Both failures are answered with `422 {"detail": ...}`.
pub struct ValidatedJson<T>(pub T);

#[derive(Debug)]
pub struct ValidationRejection {
    pub message: String,
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": self.message })),
        )
            .into_response()
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let message = rejection.body_text();
                tracing::warn!(path = %path, detail = %message, "rejected malformed JSON body");
                ValidationRejection { message }
            })?;

        value.validate().map_err(|errors| {
            let message = describe_validation_errors(&errors);
            tracing::warn!(path = %path, detail = %message, "request failed validation");
            ValidationRejection { message }
        })?;

        Ok(Self(value))
    }
}

/// Flattens field errors into `field: reason; field: reason`, sorted by field name.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let reason = failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                format!("{field}: {reason}")
            })
        })
        .collect::<Vec<_>>();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Speed {
        #[validate(range(min = 0.5, max = 2.0))]
        factor: f32,
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("lock")).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/api/speed")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    async fn extract_with_logs(body: &'static str) -> (Result<ValidatedJson<Speed>, ValidationRejection>, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let result = ValidatedJson::<Speed>::from_request(json_request(body), &()).await;
        (result, logs.contents())
    }

    #[tokio::test]
    async fn out_of_range_field_is_rejected_and_logged() {
        let (result, logs) = extract_with_logs(r#"{"factor": 3.0}"#).await;

        let Err(rejection) = result else {
            panic!("out-of-range factor was accepted");
        };
        assert!(rejection.message.starts_with("factor:"));
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert!(logs.contains("request failed validation"), "{logs}");
        assert!(logs.contains("/api/speed"), "{logs}");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_and_logged() {
        let (result, logs) = extract_with_logs(r#"{"factor": "#).await;

        assert!(result.is_err());
        assert!(logs.contains("rejected malformed JSON body"), "{logs}");
    }

    #[tokio::test]
    async fn valid_body_passes_silently() {
        let (result, logs) = extract_with_logs(r#"{"factor": 1.5}"#).await;

        let Ok(ValidatedJson(speed)) = result else {
            panic!("valid body was rejected");
        };
        assert_eq!(speed.factor, 1.5);
        assert!(!logs.contains("WARN"), "{logs}");
    }
}
