//! Demo accounts offered on the login screen for quick access to each role.

use crate::session::{role::Role, types::Credentials};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoAccount {
    pub role: Role,
    pub email: &'static str,
    pub password: &'static str,
    pub description: &'static str,
}

pub const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        role: Role::Operator,
        email: "laura.operaria@logistica.com",
        password: "password",
        description: "Full access to shipment management",
    },
    DemoAccount {
        role: Role::Messenger,
        email: "pedro.mensajero@logistica.com",
        password: "password",
        description: "Manage deliveries and update their status",
    },
    DemoAccount {
        role: Role::Client,
        email: "juan@example.com",
        password: "password",
        description: "Shipment tracking and history",
    },
];

impl DemoAccount {
    /// Login form pre-filled with this account; any previous token is cleared.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email, self.password)
    }
}

#[must_use]
pub const fn demo_accounts() -> &'static [DemoAccount] {
    &DEMO_ACCOUNTS
}

/// Finds a demo account by role.
#[must_use]
pub fn demo_account(role: Role) -> Option<&'static DemoAccount> {
    demo_accounts().iter().find(|account| account.role == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_account_per_non_admin_role() {
        assert!(demo_account(Role::Operator).is_some());
        assert!(demo_account(Role::Messenger).is_some());
        assert!(demo_account(Role::Client).is_some());
        assert!(demo_account(Role::Admin).is_none());
    }

    #[test]
    fn credentials_have_no_token() {
        let account = demo_account(Role::Client).expect("client demo account");
        let credentials = account.credentials();
        assert_eq!(credentials.email(), "juan@example.com");
        assert_eq!(credentials.token(), None);
        assert!(credentials.validate().is_ok());
    }
}
