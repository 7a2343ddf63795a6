//! # ekos-rbac: Role-based access control for `EKOS`
//!
//! Three roles, from most to least privileged:
//!
//! | Role        | Read reports | Write reports | Manage catalog |
//! |-------------|:------------:|:-------------:|:--------------:|
//! | `Admin`     | yes          | yes           | yes            |
//! | `Inspector` | yes          | yes           |                |
//! | `Viewer`    | yes          |               |                |
//!
//! The catalog is the set of projects and equipment categories reports
//! are filed under.
//!
//! A viewer may additionally be bound to a company, in which case every
//! report listing is restricted to that company.

mod principal;
mod roles;

pub use principal::{AccessError, Principal};
pub use roles::{Permission, Role};

#[cfg(test)]
mod tests;
