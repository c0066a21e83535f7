//! Authorization gate end-to-end tests.

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use wsauth_auth::scheme::encode_basic;

    use crate::{send, spawn_default_server};

    #[tokio::test]
    async fn test_should_forbid_request_without_authorization() {
        let server = spawn_default_server().await;

        let response = send(Method::GET, &server.url("/widgets/?id=7"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.text().await.expect("body").is_empty());
    }

    #[tokio::test]
    async fn test_should_not_reveal_failure_reason() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/?id=7");

        let failures = [
            None,
            Some("Bearer token".to_owned()),
            Some("Basic not-base64".to_owned()),
            Some(encode_basic("app1", "wrong")),
            Some(encode_basic("UNKNOWN", "s3cr3t")),
            Some(r#"OAuth oauth_consumer_key="app1", oauth_signature="Zm9v""#.to_owned()),
            Some(r#"OAuth oauth_consumer_key="UNKNOWN", oauth_signature="Zm9v""#.to_owned()),
        ];

        let mut observed = Vec::new();
        for header in &failures {
            let response = send(Method::GET, &url, header.as_deref()).await;
            let status = response.status();
            let mut names: Vec<String> = response
                .headers()
                .keys()
                .filter(|name| **name != http::header::DATE)
                .map(ToString::to_string)
                .collect();
            names.sort();
            let body = response.text().await.expect("body");
            observed.push((status, names, body));
        }

        let first = observed[0].clone();
        assert_eq!(first.0, StatusCode::FORBIDDEN);
        assert!(first.2.is_empty());
        for outcome in &observed {
            assert_eq!(outcome, &first);
        }
    }
}
