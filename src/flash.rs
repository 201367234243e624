//! One-shot notices that survive a redirect.
//!
//! A handler that redirects stores an [Alert] in a private (encrypted and
//! signed) cookie. The next page that is rendered takes the alert out of the
//! cookie jar, displays it, and removes the cookie so the notice is only shown
//! once.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;

use crate::alert::Alert;

pub(crate) const COOKIE_FLASH: &str = "flash";

/// How long a notice waits to be displayed before the browser discards it.
pub(crate) const FLASH_COOKIE_DURATION: Duration = Duration::minutes(1);

/// Add `alert` to the cookie jar so that it is shown on the next rendered page.
pub(crate) fn set_flash(jar: PrivateCookieJar, alert: &Alert) -> PrivateCookieJar {
    let value = match serde_json::to_string(alert) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("could not serialize flash message {alert:?}: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .path("/")
            .max_age(FLASH_COOKIE_DURATION)
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Remove the pending notice, if any, from the cookie jar and return it.
///
/// The returned jar must be included in the response for the removal to take
/// effect on the client.
pub(crate) fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let alert = serde_json::from_str::<Alert>(cookie.value_trimmed())
        .inspect_err(|error| tracing::warn!("discarding malformed flash cookie: {error}"))
        .ok();

    let jar = jar.remove(Cookie::build(COOKIE_FLASH).path("/"));

    (jar, alert)
}
