//! Role-based access control for the relayer contract

use ethers::types::{Address, H256};
use ethers::utils::keccak256;
use std::collections::{HashMap, HashSet};

/// Administers every role, itself included
pub const DEFAULT_ADMIN_ROLE: H256 = H256([0u8; 32]);

/// Operator role required by every update entry point
pub fn bot_role() -> H256 {
    H256::from(keccak256("BOT_ROLE"))
}

/// Role membership table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControl {
    members: HashMap<H256, HashSet<Address>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_role(&self, role: H256, account: Address) -> bool {
        self.members
            .get(&role)
            .map(|m| m.contains(&account))
            .unwrap_or(false)
    }

    /// Returns false if `account` already held the role
    pub fn grant(&mut self, role: H256, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Returns false if `account` did not hold the role
    pub fn revoke(&mut self, role: H256, account: Address) -> bool {
        self.members
            .get_mut(&role)
            .map(|m| m.remove(&account))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_role_hash() {
        assert_eq!(
            format!("{:#x}", bot_role()),
            "0x6d5c9827c1f410bbb61d3b2a0a34b6b30492d9a1fd38588edca7ec4562ab9c9b"
        );
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut access = AccessControl::new();
        let bot = Address::repeat_byte(0xb0);

        assert!(!access.has_role(bot_role(), bot));
        assert!(access.grant(bot_role(), bot));
        assert!(!access.grant(bot_role(), bot));
        assert!(access.has_role(bot_role(), bot));
        assert!(!access.has_role(DEFAULT_ADMIN_ROLE, bot));

        assert!(access.revoke(bot_role(), bot));
        assert!(!access.revoke(bot_role(), bot));
        assert!(!access.has_role(bot_role(), bot));
    }

    #[test]
    fn test_roles_are_independent() {
        let mut access = AccessControl::new();
        let admin = Address::repeat_byte(0xad);

        access.grant(DEFAULT_ADMIN_ROLE, admin);
        assert!(access.has_role(DEFAULT_ADMIN_ROLE, admin));
        assert!(!access.has_role(bot_role(), admin));
        assert_eq!(DEFAULT_ADMIN_ROLE, H256::zero());
    }
}
