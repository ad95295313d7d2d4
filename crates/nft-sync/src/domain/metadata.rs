//! # Token Metadata
//!
//! The fixed descriptive document served for every token id. Only the name
//! varies, with the id.

use serde::{Deserialize, Serialize};
use shared_types::TokenId;

/// Collection description.
pub const METADATA_DESCRIPTION: &str = "DAppNode NFT";

/// Collection homepage.
pub const METADATA_EXTERNAL_URL: &str = "https://dappnode.io";

/// Artwork shared by every token.
pub const METADATA_IMAGE: &str =
    "https://gateway.pinata.cloud/ipfs/QmV6PZ2AiJGJK7PSf1HLcKpjb5oCHCKWU3TZHQwwb813L2";

/// ERC-721 metadata JSON document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Collection description.
    pub description: String,
    /// Homepage.
    pub external_url: String,
    /// Image URL.
    pub image: String,
    /// Display name, `Nodler ID <id>`.
    pub name: String,
}

impl TokenMetadata {
    /// Document for `token_id`.
    #[must_use]
    pub fn for_token(token_id: TokenId) -> Self {
        Self {
            description: METADATA_DESCRIPTION.to_string(),
            external_url: METADATA_EXTERNAL_URL.to_string(),
            image: METADATA_IMAGE.to_string(),
            name: format!("Nodler ID {token_id}"),
        }
    }
}
