//! Edge case tests for Gemini reply normalization
//!
//! Covers:
//! - Envelope descent through candidates/content/parts
//! - Code fence stripping and brace isolation on chatty model output
//! - Defensive defaults for missing or mistyped fields
//! - Error classification for empty and unparseable replies

#[cfg(test)]
mod tests {
    use life_kernel::error::KernelError;
    use life_kernel::normalizer::{self, FALLBACK_SUMMARY};
    use life_kernel::schemas::{KernelResponse, Recommendation};
    use serde_json::json;

    #[test]
    fn test_clean_json_object_passes_through() {
        let reply = normalizer::normalize_text(
            r#"{"summary": "Take a walk", "recommendations": [{"title": "Walk", "detail": "20 minutes outside"}]}"#,
        )
        .unwrap();

        assert_eq!(reply.summary, "Take a walk");
        assert_eq!(
            reply.recommendations,
            vec![Recommendation {
                title: "Walk".into(),
                detail: "20 minutes outside".into(),
            }]
        );
    }

    #[test]
    fn test_fenced_reply_matches_unfenced() {
        let plain = r#"{"summary": "Rest", "recommendations": []}"#;
        let fenced = format!("```json\n{plain}\n```");

        let from_plain = normalizer::normalize_text(plain).unwrap();
        let from_fenced = normalizer::normalize_text(&fenced).unwrap();

        assert_eq!(from_plain, from_fenced);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let fenced = "```\n{\"summary\": \"Rest\", \"recommendations\": []}\n```";
        let reply = normalizer::normalize_text(fenced).unwrap();
        assert_eq!(reply.summary, "Rest");
    }

    #[test]
    fn test_prose_around_object_is_discarded() {
        let text = "Here is your plan: {\"summary\": \"Stretch\", \"recommendations\": []} Let me know!";
        let reply = normalizer::normalize_text(text).unwrap();
        assert_eq!(reply.summary, "Stretch");
        assert!(reply.recommendations.is_empty());
    }

    #[test]
    fn test_chatty_fenced_reply_is_recovered() {
        let text = "Sure! ```json\n{\"summary\":\"Focus now\",\"recommendations\":[{\"title\":\"Nap\",\"detail\":\"20 min\"}]}\n``` Hope that helps!";
        let reply = normalizer::normalize_text(text).unwrap();

        assert_eq!(reply.summary, "Focus now");
        assert_eq!(reply.recommendations.len(), 1);
        assert_eq!(reply.recommendations[0].title, "Nap");
        assert_eq!(reply.recommendations[0].detail, "20 min");
    }

    #[test]
    fn test_unterminated_fence_still_yields_object() {
        let text = "```json\n{\"summary\": \"Rest\", \"recommendations\": []}";
        let reply = normalizer::normalize_text(text).unwrap();
        assert_eq!(reply.summary, "Rest");
    }

    #[test]
    fn test_empty_reply_is_reported_as_empty() {
        let err = normalizer::normalize_text("").unwrap_err();
        assert!(matches!(err, KernelError::EmptyUpstreamResponse));
    }

    #[test]
    fn test_whitespace_only_reply_is_malformed_not_empty() {
        let err = normalizer::normalize_text("   \n  ").unwrap_err();
        assert!(matches!(err, KernelError::MalformedJson { .. }));
    }

    #[test]
    fn test_non_json_reply_is_malformed() {
        let err = normalizer::normalize_text("not json at all").unwrap_err();
        assert!(matches!(err, KernelError::MalformedJson { .. }));
    }

    #[test]
    fn test_mistyped_summary_falls_back() {
        let reply = normalizer::normalize_text(r#"{"summary": 42}"#).unwrap();
        assert_eq!(reply.summary, FALLBACK_SUMMARY);
        assert!(reply.recommendations.is_empty());
    }

    #[test]
    fn test_non_object_json_falls_back_whole() {
        // A bare scalar parses as JSON, so every field takes its default.
        let reply = normalizer::normalize_text("42").unwrap();
        assert_eq!(
            reply,
            KernelResponse {
                summary: FALLBACK_SUMMARY.to_string(),
                recommendations: vec![],
            }
        );
    }

    #[test]
    fn test_malformed_recommendations_are_dropped_per_item() {
        let text = r#"{"summary": "Mixed bag", "recommendations": [
            {"title": "Keep", "detail": "has both fields"},
            {"title": "No detail"},
            {"detail": "no title"},
            "just a string",
            {"title": 1, "detail": 2},
            {"title": "Also keep", "detail": "intact"}
        ]}"#;
        let reply = normalizer::normalize_text(text).unwrap();

        let titles: Vec<&str> = reply
            .recommendations
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Keep", "Also keep"]);
    }

    #[test]
    fn test_envelope_descent_reads_first_candidate() {
        let payload = json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"summary\": \"From envelope\", \"recommendations\": []}"}]}},
                {"content": {"parts": [{"text": "{\"summary\": \"Ignored\", \"recommendations\": []}"}]}}
            ]
        });
        let reply = normalizer::normalize(&payload).unwrap();
        assert_eq!(reply.summary, "From envelope");
    }

    #[test]
    fn test_missing_envelope_text_is_empty_reply() {
        for payload in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"content": {}}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": 7}]}}]}),
        ] {
            let err = normalizer::normalize(&payload).unwrap_err();
            assert!(
                matches!(err, KernelError::EmptyUpstreamResponse),
                "payload {payload} should read as empty"
            );
        }
    }
}
