//! Resource types for the Up banking API
//!
//! The API follows JSON:API conventions: every resource carries `type`, `id`,
//! `attributes` and `relationships`, and list endpoints wrap a `data` array
//! together with pagination `links`.

use crate::pagination::PageLinks;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Timestamp as returned by the API (RFC 3339 with offset)
pub type Timestamp = DateTime<FixedOffset>;

// ============================================================================
// HTTP Types
// ============================================================================

/// Backoff strategy between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Same delay for every attempt
    Constant,
    /// Delay grows linearly with the attempt number
    Linear,
    /// Delay doubles every attempt
    #[default]
    Exponential,
}

// ============================================================================
// Common Objects
// ============================================================================

/// A monetary amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyObject {
    /// ISO 4217 currency code
    pub currency_code: String,
    /// Amount formatted as a string, e.g. `"-10.56"`
    pub value: String,
    /// Amount in the smallest denomination (cents). Negative for money out.
    pub value_in_base_units: i64,
}

/// Reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Links to the resource itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLink {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Link to a related collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub related: String,
}

/// A to-one relationship that may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalRelationship {
    #[serde(default)]
    pub data: Option<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelatedLink>,
}

/// A to-many relationship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManyRelationship {
    #[serde(default)]
    pub data: Vec<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<SelfLink>,
}

/// Envelope for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
}

/// Envelope for single-resource endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleResponse<T> {
    pub data: T,
}

// ============================================================================
// Accounts
// ============================================================================

/// Kind of bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Saver,
    Transactional,
    HomeLoan,
}

impl AccountType {
    /// Value used in `filter[accountType]`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saver => "SAVER",
            Self::Transactional => "TRANSACTIONAL",
            Self::HomeLoan => "HOME_LOAN",
        }
    }
}

/// Whether an account is held by one or more customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipType {
    Individual,
    Joint,
}

impl OwnershipType {
    /// Value used in `filter[ownershipType]`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::Joint => "JOINT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributes {
    pub display_name: String,
    pub account_type: AccountType,
    pub ownership_type: OwnershipType,
    pub balance: MoneyObject,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRelationships {
    #[serde(default)]
    pub transactions: RelatedCollection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelatedLink>,
}

/// A bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: AccountAttributes,
    #[serde(default)]
    pub relationships: AccountRelationships,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<SelfLink>,
}

// ============================================================================
// Transactions
// ============================================================================

/// Settlement status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Held,
    Settled,
}

impl TransactionStatus {
    /// Value used in `filter[status]`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "HELD",
            Self::Settled => "SETTLED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldInfo {
    pub amount: MoneyObject,
    #[serde(default)]
    pub foreign_amount: Option<MoneyObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUp {
    pub amount: MoneyObject,
    #[serde(default)]
    pub boost_portion: Option<MoneyObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashback {
    pub description: String,
    pub amount: MoneyObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPurchaseMethod {
    pub method: String,
    #[serde(default)]
    pub card_number_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub status: TransactionStatus,
    #[serde(default)]
    pub raw_text: Option<String>,
    pub description: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_categorizable: bool,
    #[serde(default)]
    pub hold_info: Option<HoldInfo>,
    #[serde(default)]
    pub round_up: Option<RoundUp>,
    #[serde(default)]
    pub cashback: Option<Cashback>,
    pub amount: MoneyObject,
    #[serde(default)]
    pub foreign_amount: Option<MoneyObject>,
    #[serde(default)]
    pub card_purchase_method: Option<CardPurchaseMethod>,
    #[serde(default)]
    pub settled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default, rename = "deepLinkURL")]
    pub deep_link_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRelationships {
    #[serde(default)]
    pub account: OptionalRelationship,
    #[serde(default)]
    pub transfer_account: OptionalRelationship,
    #[serde(default)]
    pub category: OptionalRelationship,
    #[serde(default)]
    pub parent_category: OptionalRelationship,
    #[serde(default)]
    pub tags: ManyRelationship,
}

/// A single transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: TransactionAttributes,
    #[serde(default)]
    pub relationships: TransactionRelationships,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<SelfLink>,
}

impl TransactionResource {
    /// Category id, if the transaction has been categorised
    pub fn category_id(&self) -> Option<&str> {
        self.relationships
            .category
            .data
            .as_ref()
            .map(|c| c.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Signed amount in base units
    pub fn value_in_base_units(&self) -> i64 {
        self.attributes.amount.value_in_base_units
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAttributes {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRelationships {
    #[serde(default)]
    pub parent: OptionalRelationship,
    #[serde(default)]
    pub children: ManyRelationship,
}

/// A spending category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: CategoryAttributes,
    #[serde(default)]
    pub relationships: CategoryRelationships,
}

// ============================================================================
// Utility
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingMeta {
    pub id: String,
    pub status_emoji: String,
}

/// Response of `GET /util/ping`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub meta: PingMeta,
}

/// One entry of an API error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    pub detail: String,
    #[serde(default)]
    pub source: Option<JsonValue>,
}

/// Body returned by the API on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorObject>,
}
