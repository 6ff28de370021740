use serde::Deserialize;

pub type AnalysisResult = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Running,
    Succeeded,
    Failed,
}

impl OperationStatus {
    /// Anything other than "succeeded" or "failed" (any case) counts as still running,
    /// including a missing status.
    pub fn parse(status: &str) -> OperationStatus {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed,
            _ => OperationStatus::Running,
        }
    }

    pub fn of(result: &AnalysisResult) -> OperationStatus {
        #[derive(Deserialize)]
        struct StatusMsg {
            #[serde(default)]
            status: Option<serde_json::Value>,
        }

        let status = StatusMsg::deserialize(result)
            .ok()
            .and_then(|msg| msg.status)
            .and_then(|s| s.as_str().map(String::from))
            .unwrap_or_default();
        OperationStatus::parse(&status)
    }
}

/// Last path segment of an operation URL, without the query string.
pub fn operation_id(operation_location: &str) -> &str {
    let without_query = operation_location
        .split_once('?')
        .map_or(operation_location, |(path, _)| path);
    without_query.rsplit('/').next().unwrap_or(without_query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_is_case_insensitive() {
        assert_eq!(OperationStatus::parse("Succeeded"), OperationStatus::Succeeded);
        assert_eq!(OperationStatus::parse("FAILED"), OperationStatus::Failed);
        assert_eq!(OperationStatus::parse("Running"), OperationStatus::Running);
        assert_eq!(OperationStatus::parse("NotStarted"), OperationStatus::Running);
    }

    #[test]
    fn missing_or_odd_status_is_running() {
        assert_eq!(OperationStatus::of(&json!({})), OperationStatus::Running);
        assert_eq!(OperationStatus::of(&json!({"status": 3})), OperationStatus::Running);
        assert_eq!(OperationStatus::of(&json!([1, 2])), OperationStatus::Running);
        assert_eq!(
            OperationStatus::of(&json!({"status": "succeeded", "result": {}})),
            OperationStatus::Succeeded
        );
    }

    #[test]
    fn operation_id_strips_query() {
        assert_eq!(
            operation_id(
                "https://x.cognitiveservices.azure.com/contentunderstanding/analyzerResults/abc-123?api-version=2025-05-01-preview"
            ),
            "abc-123"
        );
        assert_eq!(operation_id("abc"), "abc");
    }
}
