//! Signed request integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, credentials, get_request, post_request, send_signed, unique_params};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_signed_get() {
        let client = client();
        let params = unique_params(&[("q", "klaatu barada")]);

        let (status, body) = send_signed(
            &client,
            &credentials(),
            get_request("/api/get-example", &params).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["apiKey"], credentials().key());
        assert_eq!(body["data"]["method"], "GET");
        assert_eq!(body["data"]["parameters"]["q"], "klaatu barada");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_signed_post_form() {
        let client = client();
        let params = unique_params(&[
            ("name", "Ash"),
            ("email", "ash@s-mart.com"),
            ("department", "Housewares"),
        ]);

        let (status, body) = send_signed(
            &client,
            &credentials(),
            post_request("/api/user", &params).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["data"]["method"], "POST");
        assert_eq!(body["data"]["parameters"]["email"], "ash@s-mart.com");
        assert!(body["data"]["parameters"].get("signature").is_none());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_reserved_characters_in_values() {
        let client = client();
        let params = unique_params(&[("expr", "1+1 = 2 & 3/4 ~ 50%")]);

        let (status, body) = send_signed(
            &client,
            &credentials(),
            get_request("/api/get-example", &params).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["data"]["parameters"]["expr"], "1+1 = 2 & 3/4 ~ 50%");
    }
}
