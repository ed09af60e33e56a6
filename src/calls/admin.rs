//! `admin` module: role assertions against the access-control object.

use anyhow::{anyhow, Result};

use crate::calls::functions::{self, FunctionDescriptor};
use crate::calls::transaction::{Argument, ObjectInput, TransactionBuilder};

pub const MODULE: &str = "admin";

const ROLE_PARAMETERS: &[&str] = &["access_control", "admin"];

macro_rules! roles {
    ($($role:ident),* $(,)?) => {
        pub const ROLES: &[&str] = &[$(stringify!($role)),*];

        const ASSERT_FUNCTIONS: &[FunctionDescriptor] = &[$(
            FunctionDescriptor {
                module: MODULE,
                name: concat!("assert_", stringify!($role), "_role"),
                type_params: 0,
                parameters: ROLE_PARAMETERS,
            }
        ),*];
    };
}

roles!(accolades, avatar_settings, genesis_minter, profile_pictures, reputation, upgrades);

pub fn functions() -> impl Iterator<Item = &'static FunctionDescriptor> {
    ASSERT_FUNCTIONS.iter()
}

/// `assert_<role>_role`: aborts the transaction unless `admin` holds `role`.
pub fn assert_role(
    tx: &mut TransactionBuilder,
    package: &str,
    role: &str,
    access_control: impl Into<ObjectInput>,
    admin: impl Into<ObjectInput>,
) -> Result<Argument> {
    let name = format!("assert_{}_role", role);
    let function = functions::lookup(functions(), &name)
        .ok_or_else(|| anyhow!("unknown role `{}`, expected one of: {}", role, ROLES.join(", ")))?;

    let arguments = vec![tx.obj(access_control)?, tx.obj(admin)?];
    tx.move_call(package, function, vec![], arguments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_genesis_minter_role() {
        let mut tx = TransactionBuilder::new();
        assert_role(&mut tx, "0x42", "genesis_minter", "0x11", "0x12").unwrap();

        let call = &tx.commands()[0];
        assert_eq!(call.module, "admin");
        assert_eq!(call.function, "assert_genesis_minter_role");
        assert_eq!(call.arguments, vec![Argument::Input(0), Argument::Input(1)]);
    }

    #[test]
    fn test_unknown_role() {
        let mut tx = TransactionBuilder::new();
        assert!(assert_role(&mut tx, "0x42", "janitor", "0x11", "0x12").is_err());
        assert!(tx.inputs().is_empty());
    }
}
