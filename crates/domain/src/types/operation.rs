//! Pending operation metadata
//!
//! A [`PendingOperation`] is owned by exactly one queue from the moment it is
//! stamped until the server acknowledges its [`OperationId`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payload::OperationPayload;
use crate::constants::{
    ENDPOINT_MEAL_PLAN_UPDATE, ENDPOINT_RECIPES_UPDATE, ENDPOINT_SHOPPING_LISTS_UPDATE,
};
use crate::errors::SyncError;

/// Globally unique operation identifier; the only key used to match
/// acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// Fresh random identifier (32 lowercase hex characters).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OperationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OperationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-queue sequence number, strictly increasing in issue order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct LogicalTimestamp(pub u64);

impl LogicalTimestamp {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifier of the signed-in user, stamped on every operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity family the server routes an operation to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OperationClass {
    #[default]
    Undefined,
    Store,
    StoreFilter,
    ListCategory,
    ListCategoryGroup,
    ListCategorizationRule,
}

impl From<OperationClass> for u8 {
    fn from(value: OperationClass) -> Self {
        match value {
            OperationClass::Undefined => 0,
            OperationClass::Store => 1,
            OperationClass::StoreFilter => 2,
            OperationClass::ListCategory => 3,
            OperationClass::ListCategoryGroup => 4,
            OperationClass::ListCategorizationRule => 5,
        }
    }
}

impl TryFrom<u8> for OperationClass {
    type Error = SyncError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Undefined),
            1 => Ok(Self::Store),
            2 => Ok(Self::StoreFilter),
            3 => Ok(Self::ListCategory),
            4 => Ok(Self::ListCategoryGroup),
            5 => Ok(Self::ListCategorizationRule),
            other => Err(SyncError::Codec(format!("unknown operation class {other}"))),
        }
    }
}

/// Data family with its own queue and update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDomain {
    ShoppingLists,
    Recipes,
    MealPlan,
}

impl SyncDomain {
    pub const ALL: [Self; 3] = [Self::ShoppingLists, Self::Recipes, Self::MealPlan];

    /// Batch update endpoint, relative to the API base URL.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::ShoppingLists => ENDPOINT_SHOPPING_LISTS_UPDATE,
            Self::Recipes => ENDPOINT_RECIPES_UPDATE,
            Self::MealPlan => ENDPOINT_MEAL_PLAN_UPDATE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShoppingLists => "shopping_lists",
            Self::Recipes => "recipes",
            Self::MealPlan => "meal_plan",
        }
    }
}

impl fmt::Display for SyncDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata stamped by the queue when an operation is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// Client-generated; the server echoes it back on acknowledgement.
    pub operation_id: OperationId,
    /// Server-side handler name, e.g. `new-shopping-list-item`.
    pub handler_id: String,
    pub user_id: UserId,
    pub operation_class: OperationClass,
    pub created_at: DateTime<Utc>,
    /// Strictly increasing within one queue.
    pub logical_timestamp: LogicalTimestamp,
}

/// An operation awaiting server acknowledgement.
///
/// Resent verbatim on every retry; metadata is never reissued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub metadata: OperationMetadata,
    pub payload: OperationPayload,
}

impl PendingOperation {
    /// Shorthand for `metadata.operation_id`.
    pub const fn id(&self) -> &OperationId {
        &self.metadata.operation_id
    }

    pub const fn logical_timestamp(&self) -> LogicalTimestamp {
        self.metadata.logical_timestamp
    }
}
