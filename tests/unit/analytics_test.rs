#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::analytics::{
        activity_type_counts, activity_types_on, vocabulary_counts, yesterday_activity_types,
    };
    use crate::resources::{ActivityType, CompletionRecord};
    use crate::vocab::LearningContext;

    fn completion(day: u32, activity_type: ActivityType) -> CompletionRecord {
        CompletionRecord {
            completed_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            activity_type,
            resource_id: Some("r1".to_string()),
            skill_id: None,
            minutes_spent: 10,
        }
    }

    fn context(word: &str, resource: Option<&str>) -> LearningContext {
        LearningContext {
            word_id: word.to_string(),
            user_id: "u1".to_string(),
            activity: "Reading".to_string(),
            resource_id: resource.map(str::to_string),
            skill_id: None,
            was_correct: true,
            recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_yesterday_types() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let completions = vec![
            completion(9, ActivityType::Reading),
            completion(9, ActivityType::Cloze),
            completion(8, ActivityType::Writing),
            completion(10, ActivityType::Listening),
        ];

        let types = yesterday_activity_types(&completions, today);
        assert_eq!(types.len(), 2);
        assert!(types.contains(&ActivityType::Reading));
        assert!(types.contains(&ActivityType::Cloze));

        let on_eighth = activity_types_on(&completions, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert!(on_eighth.contains(&ActivityType::Writing));
    }

    #[test]
    fn test_type_counts_respect_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let completions = vec![
            completion(15, ActivityType::Reading),
            completion(14, ActivityType::Reading),
            completion(9, ActivityType::Cloze),
            // exactly window_days ago: outside
            completion(8, ActivityType::Cloze),
            completion(1, ActivityType::Writing),
        ];

        let counts = activity_type_counts(&completions, today, 7);
        assert_eq!(counts.get(&ActivityType::Reading), Some(&2));
        assert_eq!(counts.get(&ActivityType::Cloze), Some(&1));
        assert_eq!(counts.get(&ActivityType::Writing), None);
    }

    #[test]
    fn test_vocabulary_counts_union_links_and_contexts() {
        let mut links = HashMap::new();
        links.insert("r1".to_string(), vec!["a".to_string(), "b".to_string(), "b".to_string()]);
        links.insert("r2".to_string(), vec![]);

        let contexts = vec![
            context("b", Some("r1")),
            context("c", Some("r1")),
            context("d", Some("r3")),
            context("e", None),
        ];

        let counts = vocabulary_counts(&links, &contexts);
        assert_eq!(counts.get("r1"), Some(&3));
        assert_eq!(counts.get("r2"), Some(&0));
        assert_eq!(counts.get("r3"), Some(&1));
        assert_eq!(counts.len(), 3);
    }
}
