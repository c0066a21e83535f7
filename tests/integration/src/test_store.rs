//! Consumer store selection end-to-end tests.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use reqwest::{Method, StatusCode};
    use wsauth_auth::registry::JSON_FILE_STORE;
    use wsauth_auth::{AuthScheme, ConsumerSigner, ConsumerStoreRegistry};
    use wsauth_core::ConsumerStoreConfig;

    use crate::{send, spawn_server};

    #[tokio::test]
    async fn test_should_authenticate_against_json_file_store() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"key": "reports", "secret": "r3p0rts", "name": "Reporting"}}]"#
        )
        .expect("write applications");

        let config = ConsumerStoreConfig::builder()
            .kind(JSON_FILE_STORE)
            .file(file.path())
            .build();
        let store = ConsumerStoreRegistry::with_builtins()
            .resolve(&config)
            .expect("json-file store");
        let server = spawn_server(store.clone()).await;

        for scheme in [AuthScheme::Basic, AuthScheme::OAuth] {
            let signer = ConsumerSigner::for_consumer(store.as_ref(), "reports", scheme)
                .expect("registered application");
            let url = server.url("/widgets/?page=2");
            let header = signer.authorization(&Method::GET, &url).expect("signed");

            let response = send(Method::GET, &url, Some(header.as_str())).await;
            assert_eq!(response.status(), StatusCode::OK, "{scheme}");
            let body: serde_json::Value = response.json().await.expect("json body");
            assert_eq!(body["consumer"], "reports");
        }
    }
}
