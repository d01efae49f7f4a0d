use super::bridge::CookieBridge;
use super::cookies::{CookieOptions, CookieStore, PROVIDER_COOKIES, is_provider_cookie};

/// Expire every provider cookie: the known names unconditionally, then any
/// request cookie matching the provider naming convention.
///
/// Deletions use `Path=/` and no domain, the same attributes the gate writes
/// with. Running the sweep again leaves the same pending state.
pub fn logout_sweep(bridge: &mut CookieBridge<'_>, store_names: &[String]) -> usize {
    let options = CookieOptions::default();
    let mut removed = 0;

    for name in PROVIDER_COOKIES {
        bridge.remove(name, &options);
        removed += 1;
    }

    for name in store_names {
        if PROVIDER_COOKIES.contains(&name.as_str()) || !is_provider_cookie(name) {
            continue;
        }
        bridge.remove(name, &options);
        removed += 1;
    }

    removed
}

/// Names of the request cookies the sweep has to consider.
#[must_use]
pub fn request_cookie_names(store: &CookieStore) -> Vec<String> {
    store
        .request_names()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}
