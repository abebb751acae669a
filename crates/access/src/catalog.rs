//! Role and permission catalogs.
//!
//! Both catalogs are **closed**: the set of roles and the set of permissions
//! a build knows about is fixed at release time. Administration edits what a
//! role or user *maps to*, never the catalog itself. Unknown identifiers are
//! rejected at parse boundaries instead of flowing through as opaque strings.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parse failure for catalog identifiers arriving over the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown role identifier: {0}")]
    UnknownRole(String),

    #[error("unknown permission identifier: {0}")]
    UnknownPermission(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

/// Staff role. Determines the base permission set a user starts from.
///
/// `SuperAdmin` and `BusinessOwner` are superuser roles: they hold every
/// permission unconditionally and their policies are not editable.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    BusinessOwner,
    BusinessManager,
    ShopManager,
    SalesRep,
}

impl Role {
    /// Every role, in catalog order.
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::BusinessOwner,
        Role::BusinessManager,
        Role::ShopManager,
        Role::SalesRep,
    ];

    /// Whether administration may edit this role's permission set.
    ///
    /// Non-editable roles resolve to the full permission universe and never
    /// appear in the policy store.
    pub const fn is_editable(self) -> bool {
        !matches!(self, Role::SuperAdmin | Role::BusinessOwner)
    }

    /// Stable wire identifier (matches the serde form).
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::BusinessOwner => "BUSINESS_OWNER",
            Role::BusinessManager => "BUSINESS_MANAGER",
            Role::ShopManager => "SHOP_MANAGER",
            Role::SalesRep => "SALES_REP",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownRole(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

/// Functional grouping of permissions, used by administration UIs.
///
/// The mapping lives in [`Permission::category`] as a declared, exhaustive
/// match. It is never inferred from the identifier text.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Products,
    Stock,
    Suppliers,
    Sales,
    Expenses,
    PaymentMethods,
    Reports,
    Shops,
    Staff,
    Settings,
}

impl PermissionCategory {
    /// Human-readable label for admin screens.
    pub const fn label(self) -> &'static str {
        match self {
            PermissionCategory::Products => "Products",
            PermissionCategory::Stock => "Stock",
            PermissionCategory::Suppliers => "Suppliers",
            PermissionCategory::Sales => "Sales",
            PermissionCategory::Expenses => "Expenses",
            PermissionCategory::PaymentMethods => "Payment Methods",
            PermissionCategory::Reports => "Reports",
            PermissionCategory::Shops => "Shops",
            PermissionCategory::Staff => "Staff",
            PermissionCategory::Settings => "Settings",
        }
    }
}

/// A capability a principal may hold.
///
/// Variant order is catalog order; `Ord` follows it, so permission sets
/// iterate grouped by category.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // Products
    ViewProducts,
    ManageProducts,
    // Stock
    ViewStock,
    ManageStock,
    TransferStock,
    // Suppliers
    ViewSuppliers,
    ManageSuppliers,
    // Sales
    ViewSales,
    CreateSales,
    VoidSales,
    // Expenses
    ViewExpenses,
    ManageExpenses,
    // Payment methods
    ViewPaymentMethods,
    ManagePaymentMethods,
    // Reports
    ViewReports,
    ExportReports,
    // Shops
    ViewShops,
    ManageShops,
    // Staff
    ViewStaff,
    ManageStaff,
    ManageUserPermissions,
    // Settings
    ViewBusinessSettings,
    ManageBusinessSettings,
}

impl Permission {
    /// Every permission, in catalog order.
    pub const ALL: [Permission; 23] = [
        Permission::ViewProducts,
        Permission::ManageProducts,
        Permission::ViewStock,
        Permission::ManageStock,
        Permission::TransferStock,
        Permission::ViewSuppliers,
        Permission::ManageSuppliers,
        Permission::ViewSales,
        Permission::CreateSales,
        Permission::VoidSales,
        Permission::ViewExpenses,
        Permission::ManageExpenses,
        Permission::ViewPaymentMethods,
        Permission::ManagePaymentMethods,
        Permission::ViewReports,
        Permission::ExportReports,
        Permission::ViewShops,
        Permission::ManageShops,
        Permission::ViewStaff,
        Permission::ManageStaff,
        Permission::ManageUserPermissions,
        Permission::ViewBusinessSettings,
        Permission::ManageBusinessSettings,
    ];

    /// The full permission universe as a set.
    pub fn universe() -> BTreeSet<Permission> {
        Permission::ALL.into_iter().collect()
    }

    /// The declared functional group of this permission.
    pub const fn category(self) -> PermissionCategory {
        match self {
            Permission::ViewProducts | Permission::ManageProducts => {
                PermissionCategory::Products
            }
            Permission::ViewStock | Permission::ManageStock | Permission::TransferStock => {
                PermissionCategory::Stock
            }
            Permission::ViewSuppliers | Permission::ManageSuppliers => {
                PermissionCategory::Suppliers
            }
            Permission::ViewSales | Permission::CreateSales | Permission::VoidSales => {
                PermissionCategory::Sales
            }
            Permission::ViewExpenses | Permission::ManageExpenses => {
                PermissionCategory::Expenses
            }
            Permission::ViewPaymentMethods | Permission::ManagePaymentMethods => {
                PermissionCategory::PaymentMethods
            }
            Permission::ViewReports | Permission::ExportReports => {
                PermissionCategory::Reports
            }
            Permission::ViewShops | Permission::ManageShops => PermissionCategory::Shops,
            Permission::ViewStaff
            | Permission::ManageStaff
            | Permission::ManageUserPermissions => PermissionCategory::Staff,
            Permission::ViewBusinessSettings | Permission::ManageBusinessSettings => {
                PermissionCategory::Settings
            }
        }
    }

    /// Stable wire identifier (matches the serde form).
    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::ViewProducts => "VIEW_PRODUCTS",
            Permission::ManageProducts => "MANAGE_PRODUCTS",
            Permission::ViewStock => "VIEW_STOCK",
            Permission::ManageStock => "MANAGE_STOCK",
            Permission::TransferStock => "TRANSFER_STOCK",
            Permission::ViewSuppliers => "VIEW_SUPPLIERS",
            Permission::ManageSuppliers => "MANAGE_SUPPLIERS",
            Permission::ViewSales => "VIEW_SALES",
            Permission::CreateSales => "CREATE_SALES",
            Permission::VoidSales => "VOID_SALES",
            Permission::ViewExpenses => "VIEW_EXPENSES",
            Permission::ManageExpenses => "MANAGE_EXPENSES",
            Permission::ViewPaymentMethods => "VIEW_PAYMENT_METHODS",
            Permission::ManagePaymentMethods => "MANAGE_PAYMENT_METHODS",
            Permission::ViewReports => "VIEW_REPORTS",
            Permission::ExportReports => "EXPORT_REPORTS",
            Permission::ViewShops => "VIEW_SHOPS",
            Permission::ManageShops => "MANAGE_SHOPS",
            Permission::ViewStaff => "VIEW_STAFF",
            Permission::ManageStaff => "MANAGE_STAFF",
            Permission::ManageUserPermissions => "MANAGE_USER_PERMISSIONS",
            Permission::ViewBusinessSettings => "VIEW_BUSINESS_SETTINGS",
            Permission::ManageBusinessSettings => "MANAGE_BUSINESS_SETTINGS",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownPermission(s.to_string()))
    }
}
