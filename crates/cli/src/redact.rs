//! Secret masking for log dumps

use dk_core::{KvStore, KvStoreExt};

const MASK: &str = "***************************";

/// Store location of the inline bot token
const TOKEN_OWNER: &str = "inline";
const TOKEN_KEY: &str = "bot_token";

/// Masked form of a secret: `123:ABC` becomes `123:****...`
pub fn mask(secret: &str) -> String {
    match secret.split_once(':') {
        Some((head, _)) => format!("{}:{}", head, MASK),
        None => MASK.to_string(),
    }
}

/// Replace every occurrence of each secret with its masked form
pub fn redact(text: &str, secrets: &[String]) -> String {
    secrets
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret, &mask(secret)))
}

/// Configured secrets plus the ones held in the store
pub fn collect_secrets(configured: &[String], store: &dyn KvStore) -> Vec<String> {
    let mut secrets = configured.to_vec();
    if let Some(token) = store.get_as::<String>(TOKEN_OWNER, TOKEN_KEY) {
        secrets.push(token);
    }
    secrets
}
