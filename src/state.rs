use crate::config::GameConfig;
use crate::imagegen::{ImageProvider, ImageRequest};
use crate::protocol::ServerMessage;
use crate::timer::Countdown;
use crate::types::{BattlePhase, BattleState, ImageUrl, PlayerSlot};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// The one battle a server process runs, plus its bookkeeping.
pub struct Battle {
    /// Canonical state, owned here and handed out only as snapshots
    pub state: BattleState,
    /// Monotonic round id; generation attempts are tagged with it so results
    /// that settle after an intervening reset are discarded
    pub round: u64,
    /// The live countdown, if any. Never more than one.
    pub countdown: Option<Countdown>,
}

/// Shared application state
pub struct AppState {
    pub battle: RwLock<Battle>,
    /// State-changed signal: every committed mutation publishes a full
    /// snapshot here; connection handlers subscribe and fan out
    pub updates: broadcast::Sender<ServerMessage>,
    pub provider: Arc<dyn ImageProvider>,
    pub config: GameConfig,
}

impl AppState {
    pub fn new(config: GameConfig, provider: Arc<dyn ImageProvider>) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            battle: RwLock::new(Battle {
                state: BattleState::ready(config.prompt_seconds),
                round: 0,
                countdown: None,
            }),
            updates: tx,
            provider,
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.updates.subscribe()
    }

    /// Snapshot of the canonical state for late joiners
    pub async fn snapshot(&self) -> BattleState {
        self.battle.read().await.state.clone()
    }

    /// Start a round. No-op unless the battle is READY.
    pub async fn start_game(self: Arc<Self>) {
        let mut battle = self.battle.write().await;
        if battle.state.status != BattlePhase::Ready {
            return;
        }

        if let Some(countdown) = battle.countdown.take() {
            countdown.cancel();
        }

        battle.round += 1;
        let round = battle.round;
        battle.state = BattleState::ready(self.config.prompt_seconds);
        battle.state.status = BattlePhase::Prompting;

        let tick_state = Arc::clone(&self);
        let expire_state = Arc::clone(&self);
        battle.countdown = Some(Countdown::start(
            self.config.prompt_seconds,
            move |remaining| {
                let state = Arc::clone(&tick_state);
                async move { state.on_tick(round, remaining).await }
            },
            move || async move { expire_state.on_prompting_expired(round).await },
        ));

        tracing::info!("Game started, prompting phase begins (round {})", round);
        self.broadcast(&battle.state);
    }

    /// Return to the READY baseline from any phase. Idempotent.
    pub async fn reset_game(&self) {
        let mut battle = self.battle.write().await;

        if let Some(countdown) = battle.countdown.take() {
            countdown.cancel();
        }

        battle.state = BattleState::ready(self.config.prompt_seconds);

        tracing::info!("Game reset");
        self.broadcast(&battle.state);
    }

    /// Overwrite a player's prompt. No-op outside PROMPTING.
    pub async fn update_prompt(&self, slot: PlayerSlot, prompt: String) {
        let mut battle = self.battle.write().await;
        if battle.state.status != BattlePhase::Prompting {
            tracing::debug!("Ignoring prompt update from {} outside PROMPTING", slot);
            return;
        }

        *battle.state.prompt_mut(slot) = prompt;
        self.broadcast(&battle.state);
    }

    /// Record a player's pick. No-op outside SELECTING. The image reference
    /// is taken at the caller's word; once both players have picked, the
    /// battle is FINISHED and a second broadcast announces it.
    pub async fn select_image(&self, slot: PlayerSlot, image: ImageUrl) {
        let mut battle = self.battle.write().await;
        if battle.state.status != BattlePhase::Selecting {
            tracing::debug!("Ignoring selection from {} outside SELECTING", slot);
            return;
        }

        *battle.state.selected_mut(slot) = Some(image);
        self.broadcast(&battle.state);

        if battle.state.both_selected() {
            battle.state.status = BattlePhase::Finished;
            tracing::info!("Both players have chosen, battle finished");
            self.broadcast(&battle.state);
        }
    }

    /// Timer callback: one tick of the prompting countdown. Guarded on the
    /// round id so a countdown orphaned by a reset can never touch a newer
    /// round's state.
    pub async fn on_tick(&self, round: u64, remaining: u32) {
        let mut battle = self.battle.write().await;
        if battle.round != round || battle.state.status != BattlePhase::Prompting {
            return;
        }

        battle.state.timer = remaining;
        self.broadcast(&battle.state);
    }

    /// Timer callback: the prompting countdown reached zero. Flips to
    /// GENERATING and launches both players' provider calls.
    pub async fn on_prompting_expired(self: Arc<Self>, round: u64) {
        let (prompt1, prompt2) = {
            let mut battle = self.battle.write().await;
            if battle.round != round || battle.state.status != BattlePhase::Prompting {
                return;
            }

            // The countdown task is completing on its own; just drop the handle.
            battle.countdown = None;
            battle.state.status = BattlePhase::Generating;
            self.broadcast(&battle.state);

            (battle.state.prompt1.clone(), battle.state.prompt2.clone())
        };

        tracing::info!("Prompting phase over, generating images");

        tokio::spawn(async move {
            self.run_generation(round, prompt1, prompt2).await;
        });
    }

    /// Issue both generation requests concurrently and settle the round.
    /// Results are applied only if the battle is still in this round's
    /// GENERATING phase when they arrive.
    async fn run_generation(&self, round: u64, prompt1: String, prompt2: String) {
        let request = |prompt: String| ImageRequest {
            prompt,
            count: self.config.images_per_player,
            image_size: self.config.image_size,
            safety_checker: self.config.safety_checker,
        };

        let (result1, result2) = tokio::join!(
            self.provider.generate(request(prompt1)),
            self.provider.generate(request(prompt2)),
        );

        let mut battle = self.battle.write().await;
        if battle.round != round || battle.state.status != BattlePhase::Generating {
            tracing::info!("Discarding generation results for superseded round {}", round);
            return;
        }

        match (result1, result2) {
            (Ok(images1), Ok(images2)) => {
                battle.state.images1 = images1;
                battle.state.images2 = images2;
                battle.state.status = BattlePhase::Selecting;
                battle.state.timer = 0;
                tracing::info!("Images generated, selection phase begins");
                self.broadcast(&battle.state);
            }
            (Err(e), _) | (_, Err(e)) => {
                // A failed generation must never leave the game stuck in
                // GENERATING; the whole round falls back.
                tracing::error!("Image generation failed, resetting round: {}", e);
                battle.state = BattleState::ready(self.config.prompt_seconds);
                self.broadcast(&battle.state);
            }
        }
    }

    fn broadcast(&self, state: &BattleState) {
        // No receivers connected is fine
        let _ = self.updates.send(ServerMessage::StateUpdate {
            state: state.clone(),
        });
    }
}
