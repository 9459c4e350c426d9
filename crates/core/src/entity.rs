//! Backend collections addressable under `/api/v1/{entity}/`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::API_PREFIX;
use crate::error::CoreError;

/// A REST collection exposed by the marketplace backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Buyers,
    Sellers,
    Products,
    WoodTypes,
    WoodTypePrices,
    WoodenBoards,
    Images,
    ChatThreads,
    ChatMessages,
}

impl Entity {
    pub const ALL_VARIANTS_STR: &'static str = "buyers|sellers|products|wood-types|wood-type-prices|wooden-boards|images|chat-threads|chat-messages";

    /// Every collection, in the order the stats aggregator walks them.
    pub const ALL: &'static [Entity] = &[
        Entity::Buyers,
        Entity::Sellers,
        Entity::Products,
        Entity::WoodTypes,
        Entity::WoodTypePrices,
        Entity::WoodenBoards,
        Entity::Images,
        Entity::ChatThreads,
        Entity::ChatMessages,
    ];

    /// URL path segment of the collection.
    #[must_use]
    pub const fn path_segment(&self) -> &'static str {
        match *self {
            Self::Buyers => "buyers",
            Self::Sellers => "sellers",
            Self::Products => "products",
            Self::WoodTypes => "wood-types",
            Self::WoodTypePrices => "wood-type-prices",
            Self::WoodenBoards => "wooden-boards",
            Self::Images => "images",
            Self::ChatThreads => "chat-threads",
            Self::ChatMessages => "chat-messages",
        }
    }

    /// Collection path with trailing slash, e.g. `/api/v1/buyers/`.
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("{API_PREFIX}/{}/", self.path_segment())
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Entity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.path_segment() == wanted)
            .ok_or_else(|| CoreError::UnknownEntity(s.to_owned()))
    }
}
