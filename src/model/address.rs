//! Email addresses as stored on Outlook items.

/// A display name and address pair.
///
/// # Examples
/// - `"Juan García" <juan@ejemplo.com>` → `display_name = "Juan García"`, `address = "juan@ejemplo.com"`
/// - `user@example.com` → `display_name = ""`, `address = "user@example.com"`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EmailAddress {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare email address (`user@domain`). May be empty for
    /// recipients that only carry a display name.
    pub address: String,
}

impl EmailAddress {
    /// Build an address, trimming surrounding whitespace from both parts.
    pub fn new(display_name: impl AsRef<str>, address: impl AsRef<str>) -> Self {
        Self {
            display_name: display_name.as_ref().trim().to_string(),
            address: address.as_ref().trim().to_string(),
        }
    }

    /// `true` if there is no address part.
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }

    /// Format for display: `"Display Name <address>"` or just `"address"`.
    pub fn display(&self) -> String {
        if self.display_name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.display_name, self.address)
        }
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims() {
        let addr = EmailAddress::new("  Alice ", " alice@example.com\t");
        assert_eq!(addr.display_name, "Alice");
        assert_eq!(addr.address, "alice@example.com");
    }

    #[test]
    fn test_display_with_name() {
        let addr = EmailAddress::new("Alice", "alice@example.com");
        assert_eq!(addr.display(), "Alice <alice@example.com>");
    }

    #[test]
    fn test_display_without_name() {
        let addr = EmailAddress::new("", "alice@example.com");
        assert_eq!(addr.display(), "alice@example.com");
    }

    #[test]
    fn test_has_address() {
        assert!(!EmailAddress::new("Only Name", "").has_address());
        assert!(EmailAddress::new("", "a@b.com").has_address());
    }
}
