#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::SchedulerConfig;
    use crate::error::ErrorKind;
    use crate::resources::ActivityType;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.review.min_due_items, 5);
        assert_eq!(config.review.max_items, 20);
        assert_eq!(config.selection.long_unused_bonus, 100.0);
        assert_eq!(config.sequencing.review_min_minutes, 5);
        assert_eq!(config.sequencing.input_min_minutes, 8);
        assert_eq!(config.generation.plan_ttl_hours, 24);
        assert_eq!(
            config.sequencing.activity_minutes.for_activity(ActivityType::VocabularyReview),
            None
        );
        assert_eq!(
            config.sequencing.activity_minutes.for_activity(ActivityType::VocabularyGame),
            Some(5)
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SchedulerConfig::from_toml_str(
            r#"
            [review]
            max_items = 12

            [sequencing.activity_minutes]
            reading = 15

            [generation]
            data_dir = "/tmp/studyplan"
            "#,
        )
        .unwrap();

        assert_eq!(config.review.max_items, 12);
        assert_eq!(config.review.min_due_items, 5);
        assert_eq!(config.sequencing.activity_minutes.reading, 15);
        assert_eq!(config.sequencing.activity_minutes.writing, 12);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/studyplan"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SchedulerConfig::from_toml_str("[review\nmax_items = ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }
}
