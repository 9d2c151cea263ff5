//! # Arcade Transaction

use super::game::{Game, GameState, Hand};
use lf_02_family_core::{
    FamilyTransaction, KeyValueStore, StoreError, TransactionMeta, ValidationError,
};
use shared_types::{FieldValue, UpdateRecord, ACTION_FIELD};
use std::collections::BTreeSet;
use tracing::{debug, error};

pub const CREATE: &str = "CREATE";
pub const SHOOT: &str = "SHOOT";
pub const ACTIONS: &[&str] = &[CREATE, SHOOT];

pub const NAME: &str = "Name";
pub const PLAYERS: &str = "Players";
pub const HAND: &str = "Hand";
pub const FIELDS: &[&str] = &[ACTION_FIELD, NAME, PLAYERS, HAND];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArcadePayload {
    Create {
        name: Option<String>,
        players: Option<Vec<String>>,
    },
    Shoot {
        name: Option<String>,
        hand: Option<String>,
    },
    Unset,
    Unknown(String),
}

impl ArcadePayload {
    pub fn decode(update: &UpdateRecord) -> Self {
        let action = update.get_str(ACTION_FIELD).unwrap_or_default();
        match action.as_str() {
            "" => Self::Unset,
            CREATE => Self::Create {
                name: update.get_str(NAME),
                players: decode_players(update.get_value(PLAYERS)),
            },
            SHOOT => Self::Shoot {
                name: update.get_str(NAME),
                hand: update.get_str(HAND),
            },
            _ => Self::Unknown(action),
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Create { .. } => Some(CREATE),
            Self::Shoot { .. } => Some(SHOOT),
            Self::Unset => None,
            Self::Unknown(action) => Some(action),
        }
    }
}

/// A JSON array of players; anything else counts as unset.
fn decode_players(value: Option<FieldValue>) -> Option<Vec<String>> {
    match value? {
        FieldValue::Array(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    FieldValue::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcadeTransaction {
    payload: ArcadePayload,
    meta: TransactionMeta,
}

impl ArcadeTransaction {
    pub fn new(payload: ArcadePayload, meta: TransactionMeta) -> Self {
        Self { payload, meta }
    }

    pub fn payload(&self) -> &ArcadePayload {
        &self.payload
    }

    fn load_game(store: &dyn KeyValueStore, name: &str) -> Result<Option<Game>, StoreError> {
        let Some(raw) = store.get(name)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupted {
                key: name.to_string(),
                reason: e.to_string(),
            })
    }

    fn save_game(store: &dyn KeyValueStore, name: &str, game: &Game) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(game).map_err(|e| StoreError::Encoding(e.to_string()))?;
        store.set(name, encoded)
    }

    fn validate_create(
        &self,
        store: &dyn KeyValueStore,
        name: Option<&str>,
        players: Option<&[String]>,
    ) -> Result<(), ValidationError> {
        let name = non_empty(name, "game name is not set")?;
        let players = match players {
            Some(p) if !p.is_empty() => p,
            _ => return Err(ValidationError::new("players are not set")),
        };

        let distinct: BTreeSet<String> = players.iter().map(|p| p.to_ascii_lowercase()).collect();
        if players.iter().any(String::is_empty) || distinct.len() < 2 || distinct.len() != players.len() {
            return Err(ValidationError::new("at least two distinct players are required"));
        }

        if store_fault(store.contains(name))? {
            return Err(ValidationError::new("game already exists"));
        }
        Ok(())
    }

    fn validate_shoot(
        &self,
        store: &dyn KeyValueStore,
        name: Option<&str>,
        hand: Option<&str>,
    ) -> Result<(), ValidationError> {
        let name = non_empty(name, "game name is not set")?;
        let hand = non_empty(hand, "hand is not set")?;
        if hand.parse::<Hand>().is_err() {
            return Err(ValidationError::new("invalid hand"));
        }

        let game = store_fault(Self::load_game(store, name))?
            .ok_or_else(|| ValidationError::new("no such game"))?;
        if game.state != GameState::Open {
            return Err(ValidationError::new("game is not open"));
        }

        let originator = self.meta.originator_hex();
        let player = game
            .player_for(&originator)
            .ok_or_else(|| ValidationError::new("not a player in this game"))?;
        if game.hands.contains_key(player) {
            return Err(ValidationError::new("player already shot"));
        }
        Ok(())
    }
}

impl FamilyTransaction for ArcadeTransaction {
    fn meta(&self) -> &TransactionMeta {
        &self.meta
    }

    fn action_name(&self) -> Option<&str> {
        self.payload.action()
    }

    fn validate(&self, store: &dyn KeyValueStore) -> Result<(), ValidationError> {
        debug!(identity = %self.identity(), "Checking arcade transaction");

        match &self.payload {
            ArcadePayload::Unset => Err(ValidationError::new("action not set")),
            ArcadePayload::Create { name, players } => {
                self.validate_create(store, name.as_deref(), players.as_deref())
            }
            ArcadePayload::Shoot { name, hand } => {
                self.validate_shoot(store, name.as_deref(), hand.as_deref())
            }
            ArcadePayload::Unknown(_) => Err(ValidationError::new("invalid action")),
        }
    }

    fn apply(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        debug!(identity = %self.identity(), "Applying arcade transaction");

        match &self.payload {
            ArcadePayload::Create {
                name: Some(name),
                players: Some(players),
            } => Self::save_game(store, name, &Game::open(players.clone())),
            ArcadePayload::Shoot {
                name: Some(name),
                hand: Some(hand),
            } => {
                let (Some(mut game), Ok(hand)) = (Self::load_game(store, name)?, hand.parse::<Hand>())
                else {
                    return Ok(());
                };
                let originator = self.meta.originator_hex();
                let Some(player) = game.player_for(&originator).map(str::to_string) else {
                    return Ok(());
                };
                game.record(&player, hand);
                if game.state == GameState::Complete {
                    debug!(game = %name, results = ?game.results, "Game complete");
                }
                Self::save_game(store, name, &game)
            }
            _ => Ok(()),
        }
    }

    fn serialize(&self) -> UpdateRecord {
        let mut record = match self.payload.action() {
            Some(action) => UpdateRecord::with_action(action),
            None => UpdateRecord::new(),
        };
        match &self.payload {
            ArcadePayload::Create { name, players } => {
                if let Some(name) = name {
                    record.insert(NAME, FieldValue::String(name.clone()));
                }
                if let Some(players) = players {
                    let list = players.iter().cloned().map(FieldValue::String).collect();
                    record.insert(PLAYERS, FieldValue::Array(list));
                }
            }
            ArcadePayload::Shoot { name, hand } => {
                if let Some(name) = name {
                    record.insert(NAME, FieldValue::String(name.clone()));
                }
                if let Some(hand) = hand {
                    record.insert(HAND, FieldValue::String(hand.clone()));
                }
            }
            ArcadePayload::Unset | ArcadePayload::Unknown(_) => {}
        }
        record
    }

    fn identity(&self) -> String {
        let name = match &self.payload {
            ArcadePayload::Create { name, .. } | ArcadePayload::Shoot { name, .. } => {
                name.as_deref()
            }
            ArcadePayload::Unset | ArcadePayload::Unknown(_) => None,
        };
        format!(
            "({} {} {})",
            self.meta.originator_hex(),
            self.payload.action().unwrap_or("-"),
            name.unwrap_or("-")
        )
    }
}

fn non_empty<'a>(value: Option<&'a str>, reason: &str) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::new(reason)),
    }
}

/// A store that cannot be read rejects rather than crashing validation.
fn store_fault<T>(result: Result<T, StoreError>) -> Result<T, ValidationError> {
    result.map_err(|e| {
        error!(error = %e, "Store fault during validation");
        ValidationError::new(format!("store fault: {e}"))
    })
}
