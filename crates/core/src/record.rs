//! Entity-tagged record used wherever a walk spans several collections.

use serde::Serialize;
use serde_json::Value;

use crate::entity::Entity;
use crate::error::CoreError;
use crate::models::{
    Buyer, ChatMessage, ChatThread, EntityRecord, Image, Product, Seller, WoodType,
    WoodTypePrice, WoodenBoard,
};

/// One record from any collection. Serializes as the bare model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Buyer(Buyer),
    Seller(Seller),
    Product(Product),
    WoodType(WoodType),
    WoodTypePrice(WoodTypePrice),
    WoodenBoard(WoodenBoard),
    Image(Image),
    ChatThread(ChatThread),
    ChatMessage(ChatMessage),
}

impl Record {
    /// Decode a normalized JSON object served by `entity`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidRecord` if the object doesn't match the model.
    pub fn decode(entity: Entity, value: Value) -> Result<Self, CoreError> {
        let invalid = |source| CoreError::InvalidRecord { entity: entity.to_string(), source };
        Ok(match entity {
            Entity::Buyers => Self::Buyer(serde_json::from_value(value).map_err(invalid)?),
            Entity::Sellers => Self::Seller(serde_json::from_value(value).map_err(invalid)?),
            Entity::Products => Self::Product(serde_json::from_value(value).map_err(invalid)?),
            Entity::WoodTypes => Self::WoodType(serde_json::from_value(value).map_err(invalid)?),
            Entity::WoodTypePrices => {
                Self::WoodTypePrice(serde_json::from_value(value).map_err(invalid)?)
            },
            Entity::WoodenBoards => {
                Self::WoodenBoard(serde_json::from_value(value).map_err(invalid)?)
            },
            Entity::Images => Self::Image(serde_json::from_value(value).map_err(invalid)?),
            Entity::ChatThreads => {
                Self::ChatThread(serde_json::from_value(value).map_err(invalid)?)
            },
            Entity::ChatMessages => {
                Self::ChatMessage(serde_json::from_value(value).map_err(invalid)?)
            },
        })
    }

    #[must_use]
    pub const fn entity(&self) -> Entity {
        match *self {
            Self::Buyer(_) => Entity::Buyers,
            Self::Seller(_) => Entity::Sellers,
            Self::Product(_) => Entity::Products,
            Self::WoodType(_) => Entity::WoodTypes,
            Self::WoodTypePrice(_) => Entity::WoodTypePrices,
            Self::WoodenBoard(_) => Entity::WoodenBoards,
            Self::Image(_) => Entity::Images,
            Self::ChatThread(_) => Entity::ChatThreads,
            Self::ChatMessage(_) => Entity::ChatMessages,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Buyer(r) => r.id(),
            Self::Seller(r) => r.id(),
            Self::Product(r) => r.id(),
            Self::WoodType(r) => r.id(),
            Self::WoodTypePrice(r) => r.id(),
            Self::WoodenBoard(r) => r.id(),
            Self::Image(r) => r.id(),
            Self::ChatThread(r) => r.id(),
            Self::ChatMessage(r) => r.id(),
        }
    }

    /// # Errors
    /// Returns an error if a flattened extra field fails to serialize.
    pub fn to_json(&self) -> Result<Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Whether this is a buyer or seller flagged online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        match self {
            Self::Buyer(b) => b.is_online,
            Self::Seller(s) => s.is_online,
            _ => false,
        }
    }
}

macro_rules! record_from {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Record {
                fn from(value: $ty) -> Self {
                    Self::$ty(value)
                }
            }
        )*
    };
}

record_from!(
    Buyer,
    Seller,
    Product,
    WoodType,
    WoodTypePrice,
    WoodenBoard,
    Image,
    ChatThread,
    ChatMessage,
);
