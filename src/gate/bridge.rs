use super::config::Environment;
use super::cookies::{
    BASE64_PREFIX, CookieOptions, CookieStore, SameSite, SetCookie, is_provider_cookie,
};
use tracing::debug;

/// Largest cookie value written in one piece; browsers drop cookies over
/// 4096 bytes including name and attributes.
pub const MAX_CHUNK_SIZE: usize = 3180;

/// Highest number of `.N` chunks read or expired for one cookie.
pub const MAX_CHUNKS: usize = 16;

/// Provider-facing get/set/remove over a request's [`CookieStore`].
///
/// `SameSite=Lax`, `HttpOnly` and the production-only `Secure` flag are
/// applied to every write, whatever the caller asked for.
pub struct CookieBridge<'a> {
    store: &'a mut CookieStore,
    environment: Environment,
}

impl<'a> CookieBridge<'a> {
    pub fn new(store: &'a mut CookieStore, environment: Environment) -> Self {
        Self { store, environment }
    }

    /// Read a cookie by exact name.
    ///
    /// A leading `base64-` marker is stripped but the payload is not base64
    /// decoded; that is left to the caller. The rest is URL-decoded, falling
    /// back to the raw string when decoding fails.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let raw = self.store.get_raw(name)?;
        let payload = raw.strip_prefix(BASE64_PREFIX).unwrap_or(raw);
        match urlencoding::decode(payload) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(err) => {
                debug!(cookie = %name, "Cookie value is not valid URL encoding: {err}");
                Some(payload.to_string())
            }
        }
    }

    /// Queue a cookie write.
    ///
    /// Provider cookies get the `base64-` marker once; values already
    /// carrying it are left alone. Other cookies whose value happens to
    /// start with `base64-` have its first byte percent-encoded so [`get`]
    /// does not mistake it for the marker.
    ///
    /// [`get`]: Self::get
    pub fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let wire = Self::encode(name, value);
        let cookie = self.build(name, wire, options, options.max_age);
        self.store.push(cookie);
    }

    /// Queue a write that may be split across `<name>.0`, `<name>.1`, ...
    ///
    /// Values longer than [`MAX_CHUNK_SIZE`] on the wire are chunked the way
    /// the provider SDK reads them back: only the first chunk carries the
    /// marker. Whole or chunked copies left over from the request are
    /// expired so a reader never sees both shapes.
    pub fn set_chunked(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let wire = Self::encode(name, value);
        let chunks = split_chunks(&wire, MAX_CHUNK_SIZE);

        let mut stale = Vec::new();
        if chunks.len() > 1 && self.store.get_raw(name).is_some() {
            stale.push(name.to_string());
        }
        let first_stale = if chunks.len() > 1 { chunks.len() } else { 0 };
        for index in first_stale..MAX_CHUNKS {
            let chunk_name = format!("{name}.{index}");
            if self.store.get_raw(&chunk_name).is_none() {
                break;
            }
            stale.push(chunk_name);
        }

        if let [whole] = chunks.as_slice() {
            let cookie = self.build(name, (*whole).to_string(), options, options.max_age);
            self.store.push(cookie);
        } else {
            debug!(cookie = %name, chunks = chunks.len(), "Splitting oversized cookie");
            for (index, chunk) in chunks.iter().enumerate() {
                let cookie = self.build(
                    &format!("{name}.{index}"),
                    (*chunk).to_string(),
                    options,
                    options.max_age,
                );
                self.store.push(cookie);
            }
        }

        for stale_name in stale {
            self.remove(&stale_name, options);
        }
    }

    fn encode(name: &str, value: &str) -> String {
        if is_provider_cookie(name) {
            let payload = value.strip_prefix(BASE64_PREFIX).unwrap_or(value);
            format!("{BASE64_PREFIX}{}", urlencoding::encode(payload))
        } else {
            let encoded = urlencoding::encode(value);
            match encoded.strip_prefix(BASE64_PREFIX) {
                // 'b' is 0x62
                Some(rest) => format!("%62{}{rest}", &BASE64_PREFIX[1..]),
                None => encoded.into_owned(),
            }
        }
    }

    /// Expire a cookie. The path and domain must match the ones used when
    /// it was written or the browser keeps it.
    pub fn remove(&mut self, name: &str, options: &CookieOptions) {
        let cookie = self.build(name, String::new(), options, Some(0));
        self.store.push(cookie);
    }

    fn build(
        &self,
        name: &str,
        value: String,
        options: &CookieOptions,
        max_age: Option<i64>,
    ) -> SetCookie {
        let secure = self.environment.is_production();
        if options.same_site.is_some_and(|s| s != SameSite::Lax)
            || options.http_only == Some(false)
            || options.secure.is_some_and(|s| s != secure)
        {
            debug!(cookie = %name, "Overriding caller-supplied cookie security flags");
        }

        SetCookie {
            name: name.to_string(),
            value,
            path: options.path.clone().unwrap_or_else(|| "/".to_string()),
            domain: options.domain.clone(),
            max_age,
            same_site: SameSite::Lax,
            http_only: true,
            secure,
        }
    }
}

// `wire` is URL-encoded ASCII; a cut never lands inside a `%XX` escape.
fn split_chunks(wire: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = wire;
    while rest.len() > size {
        let mut end = size;
        if let Some(pos) = rest[..end].rfind('%') {
            if pos + 3 > end && pos > 0 {
                end = pos;
            }
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}
