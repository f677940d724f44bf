/// Completion report: the result record handed to whoever collects scores.
///
/// Built from a `LevelCompleted` event plus the player identity from
/// config. Delivery is the caller's business; the host prints the JSON once
/// the terminal is restored.

use serde::{Deserialize, Serialize};

use crate::config::PlayerIdentity;
use crate::sim::event::GameEvent;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub student_name: String,
    pub class_name: String,
    pub level_name: String,
    /// Seconds from level start to the end zone.
    pub time_elapsed: f32,
    pub checkpoint_time: Option<f32>,
    pub reached_checkpoint: bool,
    pub coins: u32,
    pub stars: u8,
}

impl LevelReport {
    /// `None` for anything but `LevelCompleted`.
    pub fn from_event(event: &GameEvent, who: &PlayerIdentity, level_name: &str) -> Option<Self> {
        let GameEvent::LevelCompleted { elapsed, checkpoint_time, coins, stars } = *event else {
            return None;
        };
        Some(LevelReport {
            student_name: who.student_name.clone(),
            class_name: who.class_name.clone(),
            level_name: level_name.to_string(),
            time_elapsed: elapsed,
            checkpoint_time,
            reached_checkpoint: checkpoint_time.is_some(),
            coins,
            stars,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who() -> PlayerIdentity {
        PlayerIdentity { student_name: "Ana".into(), class_name: "3B".into() }
    }

    #[test]
    fn built_from_completion() {
        let event = GameEvent::LevelCompleted {
            elapsed: 12.5,
            checkpoint_time: Some(4.25),
            coins: 3,
            stars: 3,
        };
        let report = LevelReport::from_event(&event, &who(), "level-1").unwrap();
        assert_eq!(report.student_name, "Ana");
        assert_eq!(report.level_name, "level-1");
        assert!(report.reached_checkpoint);
        assert_eq!(report.checkpoint_time, Some(4.25));
        assert_eq!(report.stars, 3);
    }

    #[test]
    fn other_events_give_nothing() {
        assert!(LevelReport::from_event(&GameEvent::Jumped, &who(), "x").is_none());
        assert!(LevelReport::from_event(&GameEvent::GameOver { coins: 2 }, &who(), "x").is_none());
    }

    #[test]
    fn json_field_names() {
        let event = GameEvent::LevelCompleted {
            elapsed: 31.0,
            checkpoint_time: None,
            coins: 0,
            stars: 1,
        };
        let report = LevelReport::from_event(&event, &who(), "level-1").unwrap();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["student_name"], "Ana");
        assert_eq!(value["class_name"], "3B");
        assert_eq!(value["time_elapsed"], 31.0);
        assert!(value["checkpoint_time"].is_null());
        assert_eq!(value["reached_checkpoint"], false);
        assert_eq!(value["stars"], 1);

        let back: LevelReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
