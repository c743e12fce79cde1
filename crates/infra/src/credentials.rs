//! Credential lookup from the process environment
//!
//! - `vercel`: `VERCEL_TOKEN`
//! - `netlify`: `NETLIFY_TOKEN`
//! - `cloudflare-pages`: `CLOUDFLARE_TOKEN`, then `CLOUDFLARE_API_TOKEN`

use std::sync::Arc;

use deploywatch_core::CredentialSource;
use deploywatch_domain::constants::{
    PLATFORM_CLOUDFLARE_PAGES, PLATFORM_NETLIFY, PLATFORM_VERCEL,
};

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variables consulted for `platform`, in order
pub fn credential_vars(platform: &str) -> &'static [&'static str] {
    match platform {
        PLATFORM_VERCEL => &["VERCEL_TOKEN"],
        PLATFORM_NETLIFY => &["NETLIFY_TOKEN"],
        PLATFORM_CLOUDFLARE_PAGES => &["CLOUDFLARE_TOKEN", "CLOUDFLARE_API_TOKEN"],
        _ => &[],
    }
}

/// Reads platform tokens from environment variables
#[derive(Clone)]
pub struct EnvCredentials {
    lookup: Lookup,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvCredentials {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// Read through a custom lookup
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self { lookup: Arc::new(lookup) }
    }
}

impl CredentialSource for EnvCredentials {
    fn credential(&self, platform: &str) -> Option<String> {
        credential_vars(platform)
            .iter()
            .filter_map(|var| (self.lookup)(var))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

impl std::fmt::Debug for EnvCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCredentials").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &'static [(&'static str, &'static str)]) -> EnvCredentials {
        EnvCredentials::with_lookup(move |key| {
            pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_platform_tokens() {
        let creds = source(&[("VERCEL_TOKEN", "vc"), ("NETLIFY_TOKEN", " nf ")]);

        assert_eq!(creds.credential("vercel").as_deref(), Some("vc"));
        assert_eq!(creds.credential("netlify").as_deref(), Some("nf"));
        assert_eq!(creds.credential("cloudflare-pages"), None);
        assert_eq!(creds.credential("heroku"), None);
    }

    #[test]
    fn test_cloudflare_falls_back_to_api_token() {
        let fallback = source(&[("CLOUDFLARE_TOKEN", ""), ("CLOUDFLARE_API_TOKEN", "acc:tok")]);
        assert_eq!(fallback.credential("cloudflare-pages").as_deref(), Some("acc:tok"));

        let primary = source(&[("CLOUDFLARE_TOKEN", "first"), ("CLOUDFLARE_API_TOKEN", "second")]);
        assert_eq!(primary.credential("cloudflare-pages").as_deref(), Some("first"));
    }
}
