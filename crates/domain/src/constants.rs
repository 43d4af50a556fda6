//! Protocol constants
//!
//! Centralized location for header names, endpoints, control frames and
//! timing defaults shared by the core engine and its adapters.

// Request headers

/// Carries `Bearer <access token>`.
pub const HEADER_AUTHORIZATION: &str = "Authorization";
/// Protocol revision expected by the server; see [`API_VERSION`].
pub const HEADER_API_VERSION: &str = "X-API-Version";
/// Per-installation UUID, stable across restarts.
pub const HEADER_CLIENT_IDENTIFIER: &str = "X-Client-Identifier";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Value sent in [`HEADER_API_VERSION`] unless overridden in config.
pub const API_VERSION: &str = "3";

// Endpoints (relative to the API base URL)

/// Exchanges a refresh token for a new credential pair.
pub const ENDPOINT_TOKEN_REFRESH: &str = "auth/token/refresh";
/// Batch endpoint for the shopping-list queue.
pub const ENDPOINT_SHOPPING_LISTS_UPDATE: &str = "data/shopping-lists/update-v2";
/// Batch endpoint for recipes and collections.
pub const ENDPOINT_RECIPES_UPDATE: &str = "data/user-recipe-data/update";
/// Batch endpoint for meal-plan events.
pub const ENDPOINT_MEAL_PLAN_UPDATE: &str = "data/meal-planning-calendar/update";
/// Direct call, not queued.
pub const ENDPOINT_SHARE_LIST: &str = "data/shopping-lists/share-list";

/// Hosted service root for the HTTP API.
pub const DEFAULT_BASE_URL: &str = "https://www.anylist.com";

// Push channel

/// WebSocket listener; the access token is appended as a query parameter.
pub const DEFAULT_REALTIME_URL: &str = "wss://www.anylist.com/data/add-user-listener";
/// Text frame the server sends on every heartbeat tick. Never a push signal.
pub const HEARTBEAT_FRAME: &str = "--heartbeat--";
/// Close code the server uses when the access token in the URI expired.
pub const CLOSE_CODE_TOKEN_EXPIRED: u16 = 4010;

// Timing defaults. Milliseconds unless the name says otherwise.

pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;
/// Consecutive silent intervals before the socket is treated as dead.
pub const DEFAULT_MAX_MISSED_HEARTBEATS: u32 = 3;
/// First reconnect delay; doubles up to [`DEFAULT_MAX_RETRY_DELAY_MS`].
pub const DEFAULT_INITIAL_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 120_000;
/// Fixed wait between failed queue cycles.
pub const DEFAULT_QUEUE_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Requests in flight at once across every queue and direct call.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
