//! Adapter session context and bid request parameter builder.
//!
//! [`AdapterContext`] is the explicit session object for one page load: it
//! owns the injected state store, the loaded settings, the opt-out flag
//! and the request counter that drives the `init` to `refresh` bid-type
//! transition. It is created once per page load and reset only via
//! explicit teardown.

use chrono::Utc;

use crate::constants::{
    ADAPTER_VERSION, BID_TYPE_INIT, BID_TYPE_REFRESH, COOKIE_LAST_PAGEVIEW_ID,
    COOKIE_LAST_PAGEVIEW_TIME, COOKIE_PAGEVIEW_DEPTH, COOKIE_SESSION_BLOCKED, COOKIE_SESSION_ID,
    COOKIE_URL_PREFIX, COOKIE_USER_ID, PARAM_ADAPTER_LOADED, PARAM_ADAPTER_VERSION,
    PARAM_BID_REQUEST_TIME, PARAM_BID_TYPE, PARAM_LANGUAGE, PARAM_LAST_PAGEVIEW_ID,
    PARAM_LAST_PAGEVIEW_TIME, PARAM_LOCATION, PARAM_NAVIGATION_START, PARAM_NAVIGATOR_PLATFORM,
    PARAM_PAGEVIEW_DEPTH, PARAM_PAGEVIEW_ID, PARAM_REFERRER, PARAM_SCREEN_DIMENSIONS,
    PARAM_SESSION_ID, PARAM_SLOT_NAME, PARAM_SLOT_SIZE, PARAM_TERMINATOR, PARAM_TIMEZONE_OFFSET,
    PARAM_USER_AGENT, PARAM_USER_ID, REQUEST_API_VERSION, SESSION_TTL_MS, USER_ID_TTL_MS,
};
use crate::correlation;
use crate::ids;
use crate::models::{BidRequest, PageEnvironment, ServerRequest};
use crate::settings::Settings;
use crate::store::{Expiry, Scope, StateStore};

/// Session/context object for the adapter, one per page load.
#[derive(Debug)]
pub struct AdapterContext<S: StateStore> {
    settings: Settings,
    store: S,
    opt_out: bool,
    bid_request_count: u64,
    loaded_at_ms: i64,
}

impl<S: StateStore> AdapterContext<S> {
    pub fn new(settings: Settings, store: S) -> Self {
        Self {
            settings,
            store,
            opt_out: false,
            bid_request_count: 0,
            loaded_at_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// User-level opt-out. While set, no requests are built and no
    /// responses are interpreted.
    pub fn set_opt_out(&mut self, opt_out: bool) {
        self.opt_out = opt_out;
    }

    pub fn is_opt_out(&self) -> bool {
        self.opt_out
    }

    fn set_state(&mut self, key: &str, value: &str, expiry: Expiry) {
        let scope = Scope {
            path: self.settings.bidder.cookie_path.as_str(),
            domain: Some(self.settings.bidder.cookie_domain.as_str()),
        };
        self.store.set(key, value, expiry, scope);
    }

    fn get_or_create_id(&mut self, key: &str, ttl_ms: u64) -> String {
        let id = self.store.get(key).unwrap_or_else(ids::new_id);
        // Re-set on every access so the TTL is extended for active users.
        self.set_state(key, &id, Expiry::AfterMs(ttl_ms));
        id
    }

    /// Durable first-party user id, created lazily and refreshed on every
    /// access.
    pub fn user_id(&mut self) -> String {
        self.get_or_create_id(COOKIE_USER_ID, USER_ID_TTL_MS)
    }

    /// Session id with the short session TTL, created lazily and refreshed
    /// on every access.
    pub fn session_id(&mut self) -> String {
        self.get_or_create_id(COOKIE_SESSION_ID, SESSION_TTL_MS)
    }

    /// True when the server has flagged this session as blocked. A stored
    /// numeric value with a non-zero integer part means blocked; anything
    /// non-numeric reads as not blocked.
    pub fn is_session_blocked(&self) -> bool {
        self.store
            .get(COOKIE_SESSION_BLOCKED)
            .and_then(|value| value.parse::<f64>().ok())
            .map(|number| number.trunc() != 0.0)
            .unwrap_or(false)
    }

    pub fn set_session_blocked(&mut self, blocked: bool) {
        let value = if blocked { "1" } else { "0" };
        self.set_state(COOKIE_SESSION_BLOCKED, value, Expiry::AfterMs(SESSION_TTL_MS));
    }

    /// Stored edge-server URL prefix, or the configured default.
    pub fn url_prefix(&self) -> String {
        self.store
            .get(COOKIE_URL_PREFIX)
            .unwrap_or_else(|| self.settings.bidder.url_prefix.clone())
    }

    /// Persist a server-set URL prefix for subsequent rounds.
    pub fn set_url_prefix(&mut self, prefix: &str) {
        self.set_state(COOKIE_URL_PREFIX, prefix, Expiry::AfterMs(SESSION_TTL_MS));
    }

    fn next_pageview_depth(&mut self) -> u64 {
        let depth = self
            .store
            .get(COOKIE_PAGEVIEW_DEPTH)
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        self.set_state(
            COOKIE_PAGEVIEW_DEPTH,
            &depth.to_string(),
            Expiry::AfterMs(SESSION_TTL_MS),
        );
        depth
    }

    fn last_pageview_id(&self) -> String {
        self.store.get(COOKIE_LAST_PAGEVIEW_ID).unwrap_or_default()
    }

    fn last_pageview_time(&self) -> i64 {
        self.store
            .get(COOKIE_LAST_PAGEVIEW_TIME)
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0)
    }

    /// Build the outbound request descriptor for one auction round.
    ///
    /// Returns an empty list when opted out or session-blocked. Otherwise
    /// exactly one GET descriptor is produced, even when no bid request
    /// carries a usable slot/size (the request still reports identity and
    /// session telemetry with empty slot strings).
    pub fn build_requests(
        &mut self,
        bid_requests: &[BidRequest],
        env: &PageEnvironment,
    ) -> Vec<ServerRequest> {
        if self.opt_out || self.is_session_blocked() {
            log::info!(
                "bid request suppressed: opt_out={} session_blocked={}",
                self.opt_out,
                self.is_session_blocked()
            );
            return Vec::new();
        }

        let now_ms = Utc::now().timestamp_millis();
        let bid_type = if self.bid_request_count == 0 {
            BID_TYPE_INIT
        } else {
            BID_TYPE_REFRESH
        };

        let user_id = self.user_id();
        let session_id = self.session_id();
        let pageview_depth = self.next_pageview_depth();
        let last_pageview_id = self.last_pageview_id();
        let last_pageview_time = self.last_pageview_time();
        let since_last_pageview_ms = if last_pageview_time > 0 {
            now_ms - last_pageview_time
        } else {
            0
        };

        let pageview_id = ids::new_id();
        let slot_params = correlation::build(&pageview_id, bid_requests);

        // Roll the pageview markers for the next round.
        self.set_state(
            COOKIE_LAST_PAGEVIEW_ID,
            &pageview_id,
            Expiry::AfterMs(SESSION_TTL_MS),
        );
        self.set_state(
            COOKIE_LAST_PAGEVIEW_TIME,
            &now_ms.to_string(),
            Expiry::AfterMs(SESSION_TTL_MS),
        );

        let data: Vec<(&'static str, String)> = vec![
            (PARAM_ADAPTER_VERSION, ADAPTER_VERSION.to_string()),
            (PARAM_USER_ID, user_id),
            (PARAM_SESSION_ID, session_id),
            (PARAM_PAGEVIEW_ID, pageview_id),
            (PARAM_PAGEVIEW_DEPTH, pageview_depth.to_string()),
            (PARAM_LAST_PAGEVIEW_ID, last_pageview_id),
            (PARAM_LAST_PAGEVIEW_TIME, since_last_pageview_ms.to_string()),
            (PARAM_BID_TYPE, bid_type.to_string()),
            (PARAM_SLOT_NAME, slot_params.names.clone()),
            (PARAM_SLOT_SIZE, slot_params.sizes.clone()),
            (PARAM_LOCATION, env.location.clone()),
            (PARAM_REFERRER, env.referrer.clone()),
            (
                PARAM_SCREEN_DIMENSIONS,
                format!("{}x{}", env.screen_width, env.screen_height),
            ),
            (
                PARAM_TIMEZONE_OFFSET,
                format_timezone_offset(env.timezone_offset_minutes),
            ),
            (PARAM_LANGUAGE, env.language.clone()),
            (PARAM_NAVIGATOR_PLATFORM, env.platform.clone()),
            (PARAM_USER_AGENT, env.user_agent.clone()),
            (PARAM_NAVIGATION_START, env.navigation_start_ms.to_string()),
            (PARAM_ADAPTER_LOADED, self.loaded_at_ms.to_string()),
            (PARAM_BID_REQUEST_TIME, now_ms.to_string()),
            (PARAM_TERMINATOR, String::new()),
        ];

        let url = format!(
            "{}{}/{}/{}",
            self.url_prefix(),
            slot_params.psn.as_deref().unwrap_or_default(),
            REQUEST_API_VERSION,
            bid_type
        );

        self.bid_request_count += 1;
        log::debug!(
            "built bid request: bt={} slots={} url={}",
            bid_type,
            slot_params.names,
            url
        );

        vec![ServerRequest {
            method: "GET",
            url,
            data,
            slot_params,
        }]
    }

    /// Teardown: invalidate every entry this subsystem owns.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

fn format_timezone_offset(minutes: i32) -> String {
    if minutes % 60 == 0 {
        (minutes / 60).to_string()
    } else {
        format!("{}", f64::from(minutes) / 60.0)
    }
}
