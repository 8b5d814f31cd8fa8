use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Image references are provider URLs
pub type ImageUrl = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattlePhase {
    Ready,
    Prompting,
    Generating,
    Selecting,
    Finished,
}

/// One of the two player slots. Serialized as the integer 1 or 2; anything
/// else is rejected at parse time so handlers never see an invalid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn id(self) -> u8 {
        match self {
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}", self.id())
    }
}

impl Serialize for PlayerSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for PlayerSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(PlayerSlot::One),
            2 => Ok(PlayerSlot::Two),
            other => Err(de::Error::custom(format!(
                "player slot must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

/// Canonical game state, broadcast in full after every mutation.
///
/// Field names are the wire format the front-end consumes; `selected1`/
/// `selected2` serialize as `null` while unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleState {
    pub status: BattlePhase,
    pub timer: u32,
    pub prompt1: String,
    pub prompt2: String,
    pub images1: Vec<ImageUrl>,
    pub images2: Vec<ImageUrl>,
    pub selected1: Option<ImageUrl>,
    pub selected2: Option<ImageUrl>,
}

impl BattleState {
    /// The READY baseline: everything cleared, countdown at full duration.
    pub fn ready(prompt_seconds: u32) -> Self {
        Self {
            status: BattlePhase::Ready,
            timer: prompt_seconds,
            prompt1: String::new(),
            prompt2: String::new(),
            images1: Vec::new(),
            images2: Vec::new(),
            selected1: None,
            selected2: None,
        }
    }

    pub fn prompt(&self, slot: PlayerSlot) -> &str {
        match slot {
            PlayerSlot::One => &self.prompt1,
            PlayerSlot::Two => &self.prompt2,
        }
    }

    pub fn prompt_mut(&mut self, slot: PlayerSlot) -> &mut String {
        match slot {
            PlayerSlot::One => &mut self.prompt1,
            PlayerSlot::Two => &mut self.prompt2,
        }
    }

    pub fn images_mut(&mut self, slot: PlayerSlot) -> &mut Vec<ImageUrl> {
        match slot {
            PlayerSlot::One => &mut self.images1,
            PlayerSlot::Two => &mut self.images2,
        }
    }

    pub fn selected_mut(&mut self, slot: PlayerSlot) -> &mut Option<ImageUrl> {
        match slot {
            PlayerSlot::One => &mut self.selected1,
            PlayerSlot::Two => &mut self.selected2,
        }
    }

    pub fn both_selected(&self) -> bool {
        self.selected1.is_some() && self.selected2.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_baseline() {
        let state = BattleState::ready(60);
        assert_eq!(state.status, BattlePhase::Ready);
        assert_eq!(state.timer, 60);
        assert!(state.prompt1.is_empty() && state.prompt2.is_empty());
        assert!(state.images1.is_empty() && state.images2.is_empty());
        assert!(state.selected1.is_none() && state.selected2.is_none());
        assert!(!state.both_selected());
    }

    #[test]
    fn test_phase_wire_spelling() {
        let json = serde_json::to_string(&BattlePhase::Generating).unwrap();
        assert_eq!(json, "\"GENERATING\"");

        let phase: BattlePhase = serde_json::from_str("\"SELECTING\"").unwrap();
        assert_eq!(phase, BattlePhase::Selecting);
    }

    #[test]
    fn test_state_wire_fields() {
        let mut state = BattleState::ready(60);
        state.selected1 = Some("https://example.com/a.png".to_string());

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"status\":\"READY\""));
        assert!(json.contains("\"timer\":60"));
        assert!(json.contains("\"prompt1\":\"\""));
        assert!(json.contains("\"images2\":[]"));
        assert!(json.contains("\"selected1\":\"https://example.com/a.png\""));
        // Unset selections go out as the null sentinel
        assert!(json.contains("\"selected2\":null"));
    }

    #[test]
    fn test_player_slot_parsing() {
        assert_eq!(
            serde_json::from_str::<PlayerSlot>("1").unwrap(),
            PlayerSlot::One
        );
        assert_eq!(
            serde_json::from_str::<PlayerSlot>("2").unwrap(),
            PlayerSlot::Two
        );
        assert!(serde_json::from_str::<PlayerSlot>("0").is_err());
        assert!(serde_json::from_str::<PlayerSlot>("3").is_err());
    }

    #[test]
    fn test_slot_accessors() {
        let mut state = BattleState::ready(10);
        *state.prompt_mut(PlayerSlot::Two) = "a dog".to_string();
        assert_eq!(state.prompt(PlayerSlot::Two), "a dog");
        assert_eq!(state.prompt(PlayerSlot::One), "");

        state.images_mut(PlayerSlot::One).push("url".to_string());
        assert_eq!(state.images1.len(), 1);
        assert!(state.images2.is_empty());
    }
}
