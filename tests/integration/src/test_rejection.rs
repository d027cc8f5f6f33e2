//! Invalid signature integration tests.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use queryauth_core::Credentials;

    use crate::{client, credentials, get_request, send, signed_get_at, unique_params};

    async fn assert_invalid_signature(request: http::Request<String>) {
        let (status, body) = send(&client(), request).await.unwrap();
        assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            serde_json::json!({"status": "fail", "data": {"message": "Invalid signature"}})
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsigned_request() {
        assert_invalid_signature(get_request("/api/get-example", &unique_params(&[])).unwrap()).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_tampered_parameter() {
        let params = unique_params(&[("amount", "10")]);
        let signed = signed_get_at(&credentials(), "/api/get-example", &params, Utc::now().timestamp())
            .unwrap();

        let uri = signed.uri().to_string().replace("amount=10", "amount=1000");
        let tampered = http::Request::builder()
            .uri(uri)
            .body(String::new())
            .unwrap();

        assert_invalid_signature(tampered).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_secret() {
        let creds = Credentials::new(credentials().key(), "not-the-secret");
        let request =
            signed_get_at(&creds, "/api/get-example", &unique_params(&[]), Utc::now().timestamp())
                .unwrap();
        assert_invalid_signature(request).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_expired_request() {
        let an_hour_ago = Utc::now().timestamp() - 3600;
        let request =
            signed_get_at(&credentials(), "/api/get-example", &unique_params(&[]), an_hour_ago).unwrap();
        assert_invalid_signature(request).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_request_from_the_future() {
        let in_an_hour = Utc::now().timestamp() + 3600;
        let request =
            signed_get_at(&credentials(), "/api/get-example", &unique_params(&[]), in_an_hour).unwrap();
        assert_invalid_signature(request).await;
    }
}
