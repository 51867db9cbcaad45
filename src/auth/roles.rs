// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles known to the catalog backend.
///
/// Credentials carry the role as a plain string; role checks compare the
/// exact, case-sensitive string form (`"Admin"`, not `"admin"`).
///
/// - `Admin` - Catalog, order, category and settings management
/// - `Staff` - Order handling
/// - `Customer` - Storefront account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    /// Const tags for [`RequireRole`](super::extractor::RequireRole).
    pub const ADMIN_TAG: u8 = 0;
    pub const STAFF_TAG: u8 = 1;
    pub const CUSTOMER_TAG: u8 = 2;

    /// The string carried in the `role` claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Staff => "Staff",
            Role::Customer => "Customer",
        }
    }

    /// Map a const tag back to its role.
    pub const fn from_tag(tag: u8) -> Role {
        match tag {
            Role::STAFF_TAG => Role::Staff,
            Role::CUSTOMER_TAG => Role::Customer,
            // Unknown tags demand the strictest role
            _ => Role::Admin,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
