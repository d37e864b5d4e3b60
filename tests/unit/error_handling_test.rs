#[cfg(test)]
mod tests {
    use crate::error::{AttemptError, ErrorKind, PlanError};

    #[test]
    fn test_error_creation() {
        let error = PlanError::new(ErrorKind::Config, "Test error", "test_stage");
        assert_eq!(error.kind, ErrorKind::Config);
        assert_eq!(error.message, "Test error");
        assert_eq!(error.stage, "test_stage");
    }

    #[test]
    fn test_error_with_context() {
        let error = PlanError::data_source("Test error", "test_stage")
            .with_context("Additional context");
        assert!(error.context.is_some());
        assert_eq!(error.context.unwrap(), "Additional context");
    }

    #[test]
    fn test_error_with_source() {
        let error = PlanError::data_source("Test error", "test_stage").with_source("json_store");
        assert_eq!(error.source.as_deref(), Some("json_store"));
    }

    #[test]
    fn test_error_display() {
        let error = PlanError::invalid_input("Test error", "test_stage")
            .with_context("context")
            .with_source("source");
        let display = format!("{}", error);
        assert_eq!(display, "[test_stage] Test error (context: context) (source: source)");
    }

    #[test]
    fn test_attempt_error_becomes_invalid_input() {
        let error: PlanError = AttemptError::NonPositiveWeight(0.0).into();
        assert!(error.is_invalid_input());
        assert_eq!(error.stage, "record_attempt");
        assert!(error.message.contains("positive"));
    }

    #[test]
    fn test_anyhow_error_keeps_context_chain() {
        let err = anyhow::anyhow!("disk gone").context("Failed to read catalog.json");
        let error: PlanError = err.into();
        assert_eq!(error.kind, ErrorKind::DataSource);
        assert!(error.message.contains("Failed to read catalog.json"));
        assert!(error.message.contains("disk gone"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: PlanError = err.into();
        assert_eq!(error.kind, ErrorKind::Serialization);
        assert_eq!(error.source.as_deref(), Some("serde_json"));
    }

    #[test]
    fn test_error_serializes_kind_in_snake_case() {
        let error = PlanError::new(ErrorKind::MissingPrerequisite, "no prefs", "plan");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "missing_prerequisite");
    }
}
