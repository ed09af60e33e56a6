//! Call wrappers for the `genesis_shop` module.
//!
//! Minting goes through a `Builder`: an `add_<slot>` call creates one for an
//! equipment slot, `new_item` mints from it, and the builder is either
//! returned to the shop with `keep` or consumed with `destroy_builder`.

use anyhow::{anyhow, Result};

use crate::calls::functions::{self, FunctionDescriptor};
use crate::calls::transaction::{Argument, ObjectInput, TransactionBuilder};

pub const MODULE: &str = "genesis_shop";

const ADD_PARAMETERS: &[&str] = &["genesis_shop", "access_control", "admin"];

pub const NEW_ITEM: FunctionDescriptor = FunctionDescriptor {
    module: MODULE,
    name: "new_item",
    type_params: 0,
    parameters: &["genesis_shop", "builder"],
};

pub const KEEP: FunctionDescriptor = FunctionDescriptor {
    module: MODULE,
    name: "keep",
    type_params: 0,
    parameters: &["builder"],
};

pub const DESTROY_BUILDER: FunctionDescriptor = FunctionDescriptor {
    module: MODULE,
    name: "destroy_builder",
    type_params: 0,
    parameters: &["builder"],
};

macro_rules! slots {
    ($($slot:ident),* $(,)?) => {
        /// Equipment slots, each with its own `add_<slot>` constructor.
        pub const SLOTS: &[&str] = &[$(stringify!($slot)),*];

        const ADD_FUNCTIONS: &[FunctionDescriptor] = &[$(
            FunctionDescriptor {
                module: MODULE,
                name: concat!("add_", stringify!($slot)),
                type_params: 0,
                parameters: ADD_PARAMETERS,
            }
        ),*];
    };
}

slots!(
    accessory,
    helm,
    upper_torso,
    chestpiece,
    left_arm,
    right_arm,
    left_bracer,
    right_bracer,
    left_glove,
    right_glove,
    left_pauldron,
    right_pauldron,
    legs,
    shins,
    boots,
    primary,
    secondary,
    tertiary,
);

const BUILDER_FUNCTIONS: &[FunctionDescriptor] = &[NEW_ITEM, KEEP, DESTROY_BUILDER];

/// Every entry point of the module, `add_<slot>` constructors included.
pub fn functions() -> impl Iterator<Item = &'static FunctionDescriptor> {
    ADD_FUNCTIONS.iter().chain(BUILDER_FUNCTIONS)
}

/// Shared objects every builder constructor needs.
#[derive(Debug, Clone)]
pub struct AddSlotArgs {
    pub genesis_shop: ObjectInput,
    pub access_control: ObjectInput,
    pub admin: ObjectInput,
}

/// `add_<slot>`: create a builder for `slot`. Returns the builder handle.
pub fn add_slot(tx: &mut TransactionBuilder, package: &str, slot: &str, args: AddSlotArgs) -> Result<Argument> {
    let name = format!("add_{}", slot);
    let function = functions::lookup(functions(), &name)
        .ok_or_else(|| anyhow!("unknown slot `{}`, expected one of: {}", slot, SLOTS.join(", ")))?;

    let arguments = vec![
        tx.obj(args.genesis_shop)?,
        tx.obj(args.access_control)?,
        tx.obj(args.admin)?,
    ];
    tx.move_call(package, function, vec![], arguments)
}

pub fn new_item(
    tx: &mut TransactionBuilder,
    package: &str,
    genesis_shop: impl Into<ObjectInput>,
    builder: impl Into<ObjectInput>,
) -> Result<Argument> {
    let arguments = vec![tx.obj(genesis_shop)?, tx.obj(builder)?];
    tx.move_call(package, &NEW_ITEM, vec![], arguments)
}

pub fn keep(tx: &mut TransactionBuilder, package: &str, builder: impl Into<ObjectInput>) -> Result<Argument> {
    let arguments = vec![tx.obj(builder)?];
    tx.move_call(package, &KEEP, vec![], arguments)
}

pub fn destroy_builder(tx: &mut TransactionBuilder, package: &str, builder: impl Into<ObjectInput>) -> Result<Argument> {
    let arguments = vec![tx.obj(builder)?];
    tx.move_call(package, &DESTROY_BUILDER, vec![], arguments)
}
