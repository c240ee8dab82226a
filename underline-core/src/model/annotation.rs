use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tree::MarkerData;

/// A stored underline annotation.
///
/// Created in two steps: the quick form submits the offset range with an
/// empty comment, the comment form fills the comment in afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: Uuid,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            comment: String::new(),
            created_at: Utc::now(),
        }
    }

    /// The payload its in-tree marker carries.
    pub fn marker_data(&self) -> MarkerData {
        let comment = if self.comment.is_empty() {
            None
        } else {
            Some(self.comment.clone())
        };
        MarkerData::new(self.start, self.end, comment)
    }
}

/// The annotations attached to one document. Append-only in this design:
/// there is no deletion path short of whole-document teardown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub annotations: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, annotation: Annotation) -> Uuid {
        let id = annotation.id;
        self.annotations.push(annotation);
        id
    }

    /// Attach a comment to an existing annotation. Returns false when the
    /// id is unknown.
    pub fn set_comment(&mut self, id: Uuid, comment: &str) -> bool {
        match self.annotations.iter_mut().find(|a| a.id == id) {
            Some(annotation) => {
                annotation.comment = comment.to_string();
                true
            }
            None => false,
        }
    }

    /// Annotations sorted by start offset.
    pub fn sorted(&self) -> Vec<&Annotation> {
        let mut sorted: Vec<_> = self.annotations.iter().collect();
        sorted.sort_by_key(|a| a.start);
        sorted
    }

    /// The annotation whose range contains `offset`, if any.
    pub fn at_offset(&self, offset: usize) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| offset >= a.start && offset < a.end)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_is_attached_by_id() {
        let mut set = AnnotationSet::new();
        let id = set.add(Annotation::new(6, 11));
        assert!(set.set_comment(id, "nice"));
        assert_eq!(set.annotations[0].comment, "nice");
        assert!(!set.set_comment(Uuid::new_v4(), "lost"));
    }

    #[test]
    fn sorted_orders_by_start() {
        let mut set = AnnotationSet::new();
        set.add(Annotation::new(20, 25));
        set.add(Annotation::new(3, 9));
        let starts: Vec<_> = set.sorted().iter().map(|a| a.start).collect();
        assert_eq!(starts, vec![3, 20]);
    }

    #[test]
    fn marker_data_drops_empty_comment() {
        let mut ann = Annotation::new(1, 4);
        assert_eq!(ann.marker_data().comment, None);
        ann.comment = "hm".to_string();
        assert_eq!(ann.marker_data().comment, Some("hm".to_string()));
    }

    #[test]
    fn json_round_trip() {
        let mut set = AnnotationSet::new();
        let id = set.add(Annotation::new(6, 11));
        set.set_comment(id, "nice");

        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"createdAt\""));
        let back: AnnotationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.annotations[0].id, id);
        assert_eq!(back.annotations[0].comment, "nice");
    }
}
