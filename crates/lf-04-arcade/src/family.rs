//! # Arcade Family

use crate::domain::transaction::{ArcadePayload, ArcadeTransaction, ACTIONS, FIELDS};
use lf_02_family_core::{FamilyTags, TransactionFamily, TransactionMeta};
use shared_types::UpdateRecord;

pub const TAGS: FamilyTags = FamilyTags {
    name: "arcade",
    message_type: "/RPS/Transaction",
    transaction_type: "/RPSTransaction",
    store_name: "RPSTransaction",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArcadeFamily;

impl TransactionFamily for ArcadeFamily {
    type Transaction = ArcadeTransaction;

    fn tags(&self) -> FamilyTags {
        TAGS
    }

    fn actions(&self) -> &'static [&'static str] {
        ACTIONS
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn decode(&self, update: &UpdateRecord, meta: TransactionMeta) -> ArcadeTransaction {
        ArcadeTransaction::new(ArcadePayload::decode(update), meta)
    }
}
