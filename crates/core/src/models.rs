//! Marketplace records with clean field names.
//!
//! Wire-level spelling quirks are translated before these types see the JSON;
//! see the client crate's `wire` module. Fields the admin tools don't inspect
//! stay in `extra` so exports keep every column the server sent.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Entity;

/// Server-side fields that have no dedicated struct member.
pub type ExtraFields = Map<String, Value>;

/// Binds a model type to the collection it is served from.
pub trait EntityRecord:
    Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static
{
    const ENTITY: Entity;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_online: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_online: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Cubic metres offered.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoodType {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoodTypePrice {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub wood_type_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_m3: f64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoodenBoard {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub product_id: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub product_id: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

macro_rules! entity_record {
    ($($ty:ty => $entity:expr),* $(,)?) => {
        $(
            impl EntityRecord for $ty {
                const ENTITY: Entity = $entity;

                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

entity_record! {
    Buyer => Entity::Buyers,
    Seller => Entity::Sellers,
    Product => Entity::Products,
    WoodType => Entity::WoodTypes,
    WoodTypePrice => Entity::WoodTypePrices,
    WoodenBoard => Entity::WoodenBoards,
    Image => Entity::Images,
    ChatThread => Entity::ChatThreads,
    ChatMessage => Entity::ChatMessages,
}

/// Ids arrive as UUID strings on most endpoints and as integers on a few.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or integer id, got {other}"))),
    }
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("expected string or integer id, got {other}"))),
    }
}

/// Decimal columns are serialized as strings by the backend (`"100.00"`).
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(|| de::Error::custom("number out of range")),
        Value::String(s) => {
            s.trim().parse::<f64>().map_err(|e| de::Error::custom(format!("invalid number {s:?}: {e}")))
        },
        other => Err(de::Error::custom(format!("expected number, got {other}"))),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().is_some_and(|v| v != 0)),
        Value::String(s) => Ok(matches!(s.to_lowercase().as_str(), "true" | "1")),
        other => Err(de::Error::custom(format!("expected boolean, got {other}"))),
    }
}
