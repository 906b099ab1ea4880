use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a training-video unit in the content catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u64);

/// A training-video unit with its ordered step annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    /// Path of the video relative to the object-storage base URI
    pub video_uri: String,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A described time range within a content video, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub description: String,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
}

impl Step {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id: StepId(id),
            description: description.into(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_range(mut self, start_time: Option<f64>, end_time: Option<f64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Half-open containment: `start <= position < end`, missing bounds are unbounded
    pub fn contains(&self, position: f64) -> bool {
        self.start_time.map_or(true, |start| start <= position)
            && self.end_time.map_or(true, |end| position < end)
    }

    /// Where selecting this step seeks to
    pub fn seek_target(&self) -> f64 {
        self.start_time.unwrap_or(0.0)
    }
}

/// Media file produced by a capture session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaArtifact {
    pub uri: String,
}

/// A captured artifact bound to the content it was recorded against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedVideo {
    pub uri: String,
    pub content_id: ContentId,
}

impl RecordedVideo {
    pub fn from_artifact(artifact: MediaArtifact, content_id: ContentId) -> Self {
        Self {
            uri: artifact.uri,
            content_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalSize {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

/// Metadata reported by the player once a source has loaded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,
    pub natural_size: NaturalSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl NaturalSize {
    /// Scale to fit `max_dim`, preserving aspect ratio.
    /// Portrait video pins the height to `max_dim`, landscape pins the width.
    pub fn fit_within(&self, max_dim: u32) -> DisplaySize {
        let max = max_dim as f64;
        if self.width <= 0.0 || self.height <= 0.0 {
            return DisplaySize {
                width: max_dim,
                height: max_dim,
            };
        }

        match self.orientation {
            Orientation::Portrait => DisplaySize {
                width: (self.width * max / self.height).round() as u32,
                height: max_dim,
            },
            Orientation::Landscape => DisplaySize {
                width: max_dim,
                height: (self.height * max / self.width).round() as u32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_contains_is_half_open() {
        let step = Step::new(1, "Front kick").with_range(Some(10.0), Some(20.0));
        assert!(!step.contains(9.0));
        assert!(step.contains(10.0));
        assert!(step.contains(19.0));
        assert!(!step.contains(20.0));
    }

    #[test]
    fn test_step_open_bounds() {
        let open = Step::new(1, "Bow");
        assert!(open.contains(-5.0));
        assert!(open.contains(1_000.0));

        let tail = Step::new(2, "Finish").with_range(Some(40.0), None);
        assert!(tail.contains(4_000.0));
        assert_eq!(tail.seek_target(), 40.0);
        assert_eq!(open.seek_target(), 0.0);
    }

    #[test]
    fn test_fit_within_landscape_and_portrait() {
        let landscape = NaturalSize {
            width: 1920.0,
            height: 1080.0,
            orientation: Orientation::Landscape,
        };
        assert_eq!(
            landscape.fit_within(300),
            DisplaySize {
                width: 300,
                height: 169
            }
        );

        let portrait = NaturalSize {
            width: 1080.0,
            height: 1920.0,
            orientation: Orientation::Portrait,
        };
        assert_eq!(
            portrait.fit_within(300),
            DisplaySize {
                width: 169,
                height: 300
            }
        );
    }

    #[test]
    fn test_content_deserializes_with_optional_fields() {
        let json = r#"{
            "id": 7,
            "title": "Palgwe Il Jang",
            "video_uri": "forms/palgwe 1.mp4",
            "steps": [{"id": 1, "description": "Ready stance", "end_time": 4.0}]
        }"#;

        let content: Content = serde_json::from_str(json).unwrap();
        assert_eq!(content.id, ContentId(7));
        assert_eq!(content.thumbnail_path, None);
        assert_eq!(content.steps[0].start_time, None);
        assert_eq!(content.steps[0].end_time, Some(4.0));
    }
}
