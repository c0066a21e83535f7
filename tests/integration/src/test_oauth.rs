//! OAuth scheme end-to-end tests.

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use wsauth_auth::scheme::{OAUTH_SIGNATURE, parse_oauth, serialize_oauth};
    use wsauth_auth::{AuthScheme, RequestSigner, SigningRequest};

    use crate::{send, spawn_default_server};

    fn sign(method: &Method, url: &str, key: &str, secret: &str) -> String {
        RequestSigner::default()
            .sign(AuthScheme::OAuth, &SigningRequest::new(method, url, key, secret))
            .expect("signed")
    }

    #[tokio::test]
    async fn test_should_round_trip_oauth_get() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/?id=7");
        let header = sign(&Method::GET, &url, "app1", "s3cr3t");

        let response = send(Method::GET, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("json body");
        assert_eq!(body["consumer"], "app1");
    }

    #[tokio::test]
    async fn test_should_round_trip_oauth_for_other_methods() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/1");

        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let header = sign(&method, &url, "app2", "other");
            let response = send(method.clone(), &url, Some(header.as_str())).await;
            assert_eq!(response.status(), StatusCode::OK, "{method}");
        }
    }

    #[tokio::test]
    async fn test_should_round_trip_paths_rewritten_by_the_client() {
        let server = spawn_default_server().await;

        for path in [
            "/widgets/{x}",
            "/widgets/./a",
            "/widgets/a/../b",
            "/widgets/a|b",
            "/widgets/%7ex%7b",
            "/widgets/caf%C3%A9/?id=7",
        ] {
            let url = server.url(path);
            let header = sign(&Method::GET, &url, "app1", "s3cr3t");
            let response = send(Method::GET, &url, Some(header.as_str())).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_should_accept_reordered_query() {
        let server = spawn_default_server().await;
        let header = sign(&Method::GET, &server.url("/widgets/?a=1&b=2"), "app1", "s3cr3t");

        let url = server.url("/widgets/?b=2&a=1");
        let response = send(Method::GET, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_reject_tampered_query() {
        let server = spawn_default_server().await;
        let header = sign(&Method::GET, &server.url("/widgets/?id=7"), "app1", "s3cr3t");

        let url = server.url("/widgets/?id=8");
        let response = send(Method::GET, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_reject_method_change() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/1");
        let header = sign(&Method::PUT, &url, "app1", "s3cr3t");

        let response = send(Method::DELETE, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_reject_every_single_character_signature_mutation() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/?id=7");
        let header = sign(&Method::GET, &url, "app1", "s3cr3t");
        let params = parse_oauth(&header).expect("signed header parses");
        let signature = params.get(OAUTH_SIGNATURE).expect("signature").to_owned();

        for position in 0..signature.len() {
            let mut bytes = signature.clone().into_bytes();
            bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
            let mut mutated = params.clone();
            mutated.insert(OAUTH_SIGNATURE, String::from_utf8(bytes).expect("ascii"));

            let response = send(Method::GET, &url, Some(serialize_oauth(&mutated).as_str())).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "position {position}");
        }
    }

    #[tokio::test]
    async fn test_should_reject_oauth_signed_with_wrong_secret() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/?id=7");
        let header = sign(&Method::GET, &url, "app1", "wrong");

        let response = send(Method::GET, &url, Some(header.as_str())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_treat_missing_signature_as_unauthenticated() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/?id=7");
        let mut params = parse_oauth(&sign(&Method::GET, &url, "app1", "s3cr3t")).expect("parses");
        params.remove(OAUTH_SIGNATURE);

        let response = send(Method::GET, &url, Some(serialize_oauth(&params).as_str())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.text().await.expect("body").is_empty());
    }

    #[tokio::test]
    async fn test_should_sign_http_request_for_reqwest() {
        let server = spawn_default_server().await;
        let url = server.url("/widgets/?id=7");

        let mut request = http::Request::get(url.as_str()).body(()).expect("request");
        RequestSigner::default()
            .sign_http_request(&mut request, AuthScheme::OAuth, "app1", "s3cr3t")
            .expect("signed");
        let header = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .expect("authorization header");

        let response = send(Method::GET, &url, Some(header)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
