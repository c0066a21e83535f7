//! Basic scheme end-to-end tests.

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use wsauth_auth::scheme::encode_basic;

    use crate::{send, spawn_default_server};

    #[tokio::test]
    async fn test_should_allow_registered_consumer_with_basic() {
        let server = spawn_default_server().await;
        let header = encode_basic("app1", "s3cr3t");

        let url = server.url("/widgets/?id=7");
        let response = send(Method::GET, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("json body");
        assert_eq!(body["consumer"], "app1");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["throttleId"], "app1_127.0.0.1_nohost");
    }

    #[tokio::test]
    async fn test_should_reject_basic_with_wrong_secret() {
        let server = spawn_default_server().await;
        let header = encode_basic("app1", "wrong");

        let url = server.url("/widgets/?id=7");
        let response = send(Method::GET, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.text().await.expect("body").is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_basic_for_unknown_consumer() {
        let server = spawn_default_server().await;
        let header = encode_basic("UNKNOWN", "s3cr3t");

        let response = send(Method::GET, &server.url("/widgets/"), Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_accept_basic_for_any_method() {
        let server = spawn_default_server().await;
        let header = encode_basic("app2", "other");

        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let url = server.url("/widgets/1");
            let response = send(method.clone(), &url, Some(header.as_str())).await;
            assert_eq!(response.status(), StatusCode::OK, "{method}");
        }
    }
}
