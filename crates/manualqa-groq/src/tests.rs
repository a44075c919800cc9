//! HTTP tests for the Groq and embedding clients

#[cfg(test)]
mod http_tests {
    use crate::{
        EmbeddingClient, EmbeddingConfig, EmbeddingService, Error, GenerationConfig, GroqClient,
        GroqConfig, LanguageModel,
    };
    use insta::assert_debug_snapshot;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;

    fn groq_client(base_url: String) -> GroqClient {
        let mut config = GroqConfig::new("gsk_test_key".to_string());
        config.api_url = base_url;
        GroqClient::new(config).unwrap()
    }

    fn embedding_client(base_url: String, dimension: usize) -> EmbeddingClient {
        let config = EmbeddingConfig::new(base_url, "nomic-embed-text".to_string(), dimension);
        EmbeddingClient::new(config).unwrap()
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GroqConfig::new("gsk_secret".to_string());

        assert_debug_snapshot!(config, @r###"
        GroqConfig {
            api_key: "<redacted>",
            model: "llama-3.1-8b-instant",
            api_url: "https://api.groq.com/openai/v1",
        }
        "###);
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk_test_key")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama-3.1-8b-instant",
                "max_tokens": 64,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  Torque bolt A3 to 45 Nm.\n" } }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = groq_client(server.url());
        let config = GenerationConfig {
            max_tokens: 64,
            ..Default::default()
        };

        let answer = client.generate("prompt", &config).await.unwrap();
        assert_eq!(answer, "Torque bolt A3 to 45 Nm.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_maps_http_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("over capacity")
            .create_async()
            .await;

        let client = groq_client(server.url());
        let err = client
            .generate("prompt", &GenerationConfig::default())
            .await
            .unwrap_err();

        match err {
            Error::Generation(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_response_maps_to_generation_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(500));
                w.write_all(br#"{"choices": [{"message": {"content": "too late"}}]}"#)
            })
            .create_async()
            .await;

        let client = groq_client(server.url());
        let config = GenerationConfig {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };

        let err = client.generate("prompt", &config).await.unwrap_err();
        assert!(matches!(err, Error::GenerationTimeout(t) if t == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_and_empty_responses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("{\"unexpected\": true}")
            .create_async()
            .await;

        let client = groq_client(server.url());
        let err = client
            .generate("prompt", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({ "choices": [{ "message": { "content": "   " } }] }).to_string())
            .create_async()
            .await;

        let client = groq_client(server.url());
        let err = client
            .generate("prompt", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_embed_returns_first_vector() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_body(Matcher::PartialJson(json!({
                "model": "nomic-embed-text",
                "input": ["What is the torque spec for bolt A3?"],
            })))
            .with_status(200)
            .with_body(json!({ "data": [{ "index": 0, "embedding": [0.1, 0.2, 0.3] }] }).to_string())
            .create_async()
            .await;

        let client = embedding_client(server.url(), 3);
        let vector = client
            .embed("What is the torque spec for bolt A3?")
            .await
            .unwrap();

        assert_eq!(client.dimension(), 3);
        assert_eq!(vector.into_inner(), vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_failures_are_embedding_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(500)
            .create_async()
            .await;

        let client = embedding_client(server.url(), 3);
        assert!(matches!(client.embed("q").await, Err(Error::Embedding(_))));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(json!({ "data": [] }).to_string())
            .create_async()
            .await;

        let client = embedding_client(server.url(), 3);
        assert!(matches!(client.embed("q").await, Err(Error::Embedding(_))));
    }
}
