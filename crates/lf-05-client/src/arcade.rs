//! Typed calls for the arcade family.

use crate::errors::{ClientError, TransportError};
use crate::ports::transport::Transport;
use crate::service::{FamilyClient, Receipt};
use lf_04_arcade::{ArcadeFamily, Game, Hand, CREATE, HAND, NAME, PLAYERS, SHOOT};
use shared_types::{FieldValue, UpdateRecord};

pub type ArcadeClient<T> = FamilyClient<ArcadeFamily, T>;

impl<T: Transport> FamilyClient<ArcadeFamily, T> {
    /// Open a game. Players are signing addresses.
    pub async fn create(&self, name: &str, players: &[String]) -> Result<Receipt, ClientError> {
        let list = players.iter().cloned().map(FieldValue::String).collect();
        let provided = UpdateRecord::new()
            .field(NAME, name)
            .field(PLAYERS, FieldValue::Array(list));
        self.send(CREATE, provided).await
    }

    /// Play this client's hand in `name`.
    pub async fn shoot(&self, name: &str, hand: Hand) -> Result<Receipt, ClientError> {
        let provided = UpdateRecord::new()
            .field(NAME, name)
            .field(HAND, hand.as_str());
        self.send(SHOOT, provided).await
    }

    pub async fn show_game(&self, name: &str) -> Result<Option<Game>, ClientError> {
        let Some(raw) = self.store_snapshot().await?.remove(name) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ClientError::Transport(TransportError::Decode(format!("game {name}: {e}"))))
    }
}
