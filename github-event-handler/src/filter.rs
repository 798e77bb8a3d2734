//! Emission filter (§4.8): glob-style match between a configured pattern list
//! and an event name of the form `eventType` or `eventType:action`.

/// A pattern matches an event name iff the pattern equals the event, equals
/// the event's unqualified prefix (the part before `:`), or is `*`.
pub fn matches(pattern: &str, event_name: &str) -> bool {
    if pattern == "*" || pattern == event_name {
        return true;
    }
    match event_name.split_once(':') {
        Some((prefix, _)) => pattern == prefix,
        None => false,
    }
}

/// Whether `event_name` is admitted by any pattern in `emitted_events`.
pub fn is_emitted(emitted_events: &[String], event_name: &str) -> bool {
    emitted_events.iter().any(|p| matches(p, event_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table_from_spec() {
        let cases = [
            ("*", "issue_comment", true),
            ("*", "issue_comment:created", true),
            ("issue_comment", "issue_comment", true),
            ("issue_comment:created", "issue_comment", false),
            ("issue_comment", "issue_comment:created", true),
            ("issue_comment:created", "issue_comment:created", true),
        ];
        for (pattern, event_name, expect) in cases {
            assert_eq!(
                matches(pattern, event_name),
                expect,
                "pattern {pattern:?} vs event {event_name:?}"
            );
        }
    }

    #[test]
    fn is_emitted_checks_every_pattern() {
        let patterns = vec!["push".to_string(), "pull_request:opened".to_string()];
        assert!(is_emitted(&patterns, "push"));
        assert!(is_emitted(&patterns, "pull_request:opened"));
        assert!(!is_emitted(&patterns, "pull_request:closed"));
        assert!(!is_emitted(&patterns, "pull_request"));
    }
}
