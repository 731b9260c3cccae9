use serde::{Deserialize, Serialize};

/// One stage of the course roadmap (e.g. A1, A2, B1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumStage {
    pub stage: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub sample_topics: Vec<String>,
    #[serde(default)]
    pub checkpoint_lesson_ids: Vec<String>,
}

/// How many of a stage's checkpoint lessons have been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointStatus {
    pub cleared: usize,
    pub total: usize,
}

impl CheckpointStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cleared == self.total
    }
}

impl CurriculumStage {
    #[must_use]
    pub fn checkpoint_status(&self, is_completed: impl Fn(&str) -> bool) -> CheckpointStatus {
        let cleared = self
            .checkpoint_lesson_ids
            .iter()
            .filter(|id| is_completed(id.as_str()))
            .count();
        CheckpointStatus {
            cleared,
            total: self.checkpoint_lesson_ids.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_cleared_checkpoints() {
        let stage = CurriculumStage {
            stage: "A1".into(),
            goals: Vec::new(),
            sample_topics: Vec::new(),
            checkpoint_lesson_ids: vec!["a1-1".into(), "a1-5".into()],
        };

        let status = stage.checkpoint_status(|id| id == "a1-1");
        assert_eq!(status, CheckpointStatus { cleared: 1, total: 2 });
        assert!(!status.is_complete());
        assert!(stage.checkpoint_status(|_| true).is_complete());
    }
}
