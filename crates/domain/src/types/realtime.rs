//! Push channel state and signals

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the persistent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// Server-pushed invalidation signal.
///
/// Each named variant tells the collaborator which slice of data to
/// re-fetch. Anything unrecognised arrives as [`SyncEvent::Other`] with the
/// raw frame text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncEvent {
    RefreshShoppingLists,
    RefreshCategorizedItems,
    RefreshListFolders,
    RefreshListSettings,
    RefreshStarterLists,
    RefreshOrderedStarterListIds,
    RefreshStarterListSettings,
    RefreshMobileAppSettings,
    RefreshUserCategories,
    RefreshUserRecipeData,
    RefreshMealPlanCalendar,
    RefreshAccountInfo,
    RefreshSubscriptionInfo,
    DidDeleteAccount,
    Other(String),
}

impl SyncEvent {
    /// Parse a text frame. Never fails; unknown text is passed through.
    pub fn parse(frame: &str) -> Self {
        match frame {
            "refresh-shopping-lists" => Self::RefreshShoppingLists,
            "refresh-categorized-items" => Self::RefreshCategorizedItems,
            "refresh-list-folders" => Self::RefreshListFolders,
            "refresh-list-settings" => Self::RefreshListSettings,
            "refresh-starter-lists" => Self::RefreshStarterLists,
            "refresh-ordered-starter-list-ids" => Self::RefreshOrderedStarterListIds,
            "refresh-starter-list-settings" => Self::RefreshStarterListSettings,
            "refresh-mobile-app-settings" => Self::RefreshMobileAppSettings,
            "refresh-user-categories" => Self::RefreshUserCategories,
            "refresh-user-recipe-data" => Self::RefreshUserRecipeData,
            "refresh-meal-plan-calendar" => Self::RefreshMealPlanCalendar,
            "refresh-account-info" => Self::RefreshAccountInfo,
            "refresh-subscription-info" => Self::RefreshSubscriptionInfo,
            "did-delete-account" => Self::DidDeleteAccount,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the event asks for shopping list state to be re-fetched.
    pub const fn affects_shopping_lists(&self) -> bool {
        matches!(
            self,
            Self::RefreshShoppingLists
                | Self::RefreshCategorizedItems
                | Self::RefreshListFolders
                | Self::RefreshListSettings
                | Self::RefreshUserCategories
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_signals() {
        assert_eq!(SyncEvent::parse("refresh-shopping-lists"), SyncEvent::RefreshShoppingLists);
        assert_eq!(SyncEvent::parse("refresh-user-recipe-data"), SyncEvent::RefreshUserRecipeData);
        assert_eq!(SyncEvent::parse("did-delete-account"), SyncEvent::DidDeleteAccount);
    }

    #[test]
    fn unknown_text_passes_through_unparsed() {
        let raw = r#"{"kind":"something-new"}"#;
        assert_eq!(SyncEvent::parse(raw), SyncEvent::Other(raw.to_string()));
    }

    #[test]
    fn shopping_list_scope() {
        assert!(SyncEvent::RefreshShoppingLists.affects_shopping_lists());
        assert!(!SyncEvent::RefreshMealPlanCalendar.affects_shopping_lists());
    }
}
