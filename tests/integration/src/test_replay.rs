//! Replay protection integration tests.

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::{client, credentials, send, signed_get_at, unique_params};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_replayed_request() {
        let client = client();
        let now = Utc::now().timestamp();
        let params = unique_params(&[("q", "1")]);

        let first = signed_get_at(&credentials(), "/api/get-example", &params, now).unwrap();
        let (status, _) = send(&client, first).await.unwrap();
        assert_eq!(status, reqwest::StatusCode::OK);

        let replay = signed_get_at(&credentials(), "/api/get-example", &params, now).unwrap();
        let (status, body) = send(&client, replay).await.unwrap();
        assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["data"]["message"], "Signature has already been used");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_only_one_of_concurrent_replays() {
        let client = client();
        let now = Utc::now().timestamp();
        let params = unique_params(&[]);

        let requests = (0..8).map(|_| {
            let client = client.clone();
            let request = signed_get_at(&credentials(), "/api/get-example", &params, now).unwrap();
            async move { send(&client, request).await.unwrap().0 }
        });
        let statuses = futures::future::join_all(requests).await;

        let accepted = statuses
            .iter()
            .filter(|s| **s == reqwest::StatusCode::OK)
            .count();
        let rejected = statuses
            .iter()
            .filter(|s| **s == reqwest::StatusCode::FORBIDDEN)
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(rejected, 7);
    }
}
