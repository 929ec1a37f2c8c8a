use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Id given to users that only ever appeared as a wallet address.
    pub fn wallet_user_id(wallet_address: &str) -> String {
        format!("wallet_{}", wallet_address.to_lowercase())
    }

    pub fn from_wallet(wallet_address: &str) -> Self {
        User {
            id: Self::wallet_user_id(wallet_address),
            email: None,
            wallet_address: Some(wallet_address.to_string()),
            created_at: Utc::now(),
        }
    }

    /// Email if known, else a shortened wallet (`0x1234...abcd`), else the id.
    pub fn display_name(&self) -> String {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            return email.to_string();
        }
        if let Some(wallet) = self.wallet_address.as_deref().filter(|w| !w.is_empty()) {
            return shorten_wallet(wallet);
        }
        self.id.clone()
    }

    /// Identifier used as the actor of activity entries.
    pub fn actor(&self) -> String {
        self.wallet_address
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

pub fn shorten_wallet(wallet: &str) -> String {
    let chars: Vec<char> = wallet.chars().collect();
    if chars.len() <= 10 {
        return wallet.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn display_name_or_unknown(user: Option<&User>) -> String {
    user.map(User::display_name).unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: Option<&str>, wallet: Option<&str>) -> User {
        User {
            id: "u1".to_string(),
            email: email.map(String::from),
            wallet_address: wallet.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_prefers_email_then_wallet_then_id() {
        let wallet = "0x1234567890abcdef1234567890abcdef12345678";
        assert_eq!(user(Some("a@b.io"), Some(wallet)).display_name(), "a@b.io");
        assert_eq!(user(None, Some(wallet)).display_name(), "0x1234...5678");
        assert_eq!(user(None, None).display_name(), "u1");
        assert_eq!(display_name_or_unknown(None), "unknown");
    }

    #[test]
    fn wallet_user_id_is_lowercased() {
        assert_eq!(User::wallet_user_id("0xABCdef"), "wallet_0xabcdef");
    }
}
