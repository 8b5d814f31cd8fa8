use crate::types::{BattleState, ImageUrl, PlayerSlot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    StartGame,
    ResetGame,
    UpdatePrompt {
        player_id: PlayerSlot,
        prompt: String,
    },
    SelectImage {
        player_id: PlayerSlot,
        image_id: ImageUrl,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full snapshot of the canonical state, sent on connect and after every
    /// accepted mutation. This is the only channel clients learn state from.
    StateUpdate { state: BattleState },
    /// Sent only when an inbound frame cannot be parsed; never for game-level
    /// outcomes, which are expressed as state.
    Error { code: String, msg: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BattlePhase;

    #[test]
    fn test_client_event_names() {
        let msg: ClientMessage = serde_json::from_str(r#"{"t":"startGame"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame));

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"resetGame"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::ResetGame));
    }

    #[test]
    fn test_update_prompt_payload() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"updatePrompt","playerId":1,"prompt":"a cat"}"#).unwrap();
        match msg {
            ClientMessage::UpdatePrompt { player_id, prompt } => {
                assert_eq!(player_id, PlayerSlot::One);
                assert_eq!(prompt, "a cat");
            }
            other => panic!("expected UpdatePrompt, got {:?}", other),
        }
    }

    #[test]
    fn test_select_image_payload() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"selectImage","playerId":2,"imageId":"https://x/1.png"}"#)
                .unwrap();
        match msg {
            ClientMessage::SelectImage {
                player_id,
                image_id,
            } => {
                assert_eq!(player_id, PlayerSlot::Two);
                assert_eq!(image_id, "https://x/1.png");
            }
            other => panic!("expected SelectImage, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_slot_is_parse_error() {
        let result = serde_json::from_str::<ClientMessage>(
            r#"{"t":"updatePrompt","playerId":7,"prompt":"x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_state_update_wire_shape() {
        let msg = ServerMessage::StateUpdate {
            state: BattleState::ready(60),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""t":"stateUpdate""#));
        assert!(json.contains(r#""status":"READY""#));

        let parsed: ServerMessage = serde_json::from_str(&json).unwrap();
        match parsed {
            ServerMessage::StateUpdate { state } => assert_eq!(state.status, BattlePhase::Ready),
            other => panic!("expected StateUpdate, got {:?}", other),
        }
    }
}
