//! Starter knowledge base loaded by the `seed` binary.

pub struct SampleDocument {
    pub content: &'static str,
    pub metadata: &'static str,
}

pub const SAMPLE_DOCUMENTS: &[SampleDocument] = &[
    SampleDocument {
        content: "FastAPI is a modern, fast web framework for building APIs with Python based on \
                  standard Python type hints. It is built on top of Starlette and Pydantic, \
                  providing automatic API documentation, data validation, and serialization.",
        metadata: r#"{"category": "technology", "topic": "fastapi", "source": "documentation"}"#,
    },
    SampleDocument {
        content: "Retrieval-Augmented Generation (RAG) combines large language models with \
                  external knowledge retrieval. Relevant documents are first retrieved from a \
                  knowledge base, then used as context to generate more accurate and better \
                  grounded answers, which reduces hallucinations.",
        metadata: r#"{"category": "ai", "topic": "rag", "source": "research"}"#,
    },
    SampleDocument {
        content: "Milvus is an open-source vector database designed for AI applications. It \
                  provides high-performance similarity search over embeddings and supports \
                  several distance metrics and index types, such as IVF_FLAT and HNSW.",
        metadata: r#"{"category": "technology", "topic": "vector_database", "source": "documentation"}"#,
    },
    SampleDocument {
        content: "Rust is a systems programming language focused on safety, speed, and \
                  concurrency. Its ownership model guarantees memory safety without a garbage \
                  collector, and Cargo manages builds and dependencies.",
        metadata: r#"{"category": "programming", "topic": "rust", "source": "documentation"}"#,
    },
    SampleDocument {
        content: "Machine learning is a subset of artificial intelligence that lets computers \
                  learn from data instead of being explicitly programmed. Common applications \
                  include image recognition, recommendation systems, and predictive analytics.",
        metadata: r#"{"category": "ai", "topic": "machine_learning", "source": "educational"}"#,
    },
    SampleDocument {
        content: "Docker is a platform for developing, shipping, and running applications in \
                  containers. Containers are lightweight, portable units that bundle an \
                  application with its dependencies so it runs the same everywhere.",
        metadata: r#"{"category": "technology", "topic": "docker", "source": "documentation"}"#,
    },
    SampleDocument {
        content: "REST (Representational State Transfer) is an architectural style for \
                  networked applications. REST APIs use HTTP methods such as GET, POST, PUT, \
                  and DELETE on resources and are stateless and cacheable.",
        metadata: r#"{"category": "web", "topic": "rest_api", "source": "educational"}"#,
    },
    SampleDocument {
        content: "Natural Language Processing (NLP) is a branch of artificial intelligence that \
                  helps computers understand and generate human language. Applications include \
                  chatbots, sentiment analysis, translation, and summarization.",
        metadata: r#"{"category": "ai", "topic": "nlp", "source": "educational"}"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_metadata_is_json() {
        assert_eq!(SAMPLE_DOCUMENTS.len(), 8);
        for doc in SAMPLE_DOCUMENTS {
            let parsed: serde_json::Value = serde_json::from_str(doc.metadata).unwrap();
            assert!(parsed["topic"].is_string());
            assert!(!doc.content.is_empty());
        }
    }
}
