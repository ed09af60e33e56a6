//! Call wrappers for the `avatar` module.
//!
//! Strings and addresses are passed as pure inputs; avatars, registries and
//! admin objects as object inputs.

use anyhow::Result;

use crate::calls::functions::FunctionDescriptor;
use crate::calls::transaction::{Argument, ObjectInput, TransactionBuilder};

pub const MODULE: &str = "avatar";

macro_rules! function {
    ($name:ident, $($param:literal),*) => {
        FunctionDescriptor {
            module: MODULE,
            name: stringify!($name),
            type_params: 0,
            parameters: &[$($param),*],
        }
    };
}

pub const NEW: FunctionDescriptor = function!(new, "registry", "image_url");
pub const TRANSFER: FunctionDescriptor = function!(transfer, "self", "recipient");
pub const KEEP: FunctionDescriptor = function!(keep, "avatar");
pub const UPGRADE: FunctionDescriptor = function!(upgrade, "self", "access_control", "admin", "url");
pub const ASSERT_NO_AVATAR: FunctionDescriptor = function!(assert_no_avatar, "self", "addr");
pub const ASSERT_HAS_AVATAR: FunctionDescriptor = function!(assert_has_avatar, "self", "addr");
pub const HAS_WEAPON: FunctionDescriptor = function!(has_weapon, "self", "slot");
pub const HAS_COSMETIC: FunctionDescriptor = function!(has_cosmetic, "self", "type");
pub const SET_EDITION: FunctionDescriptor = function!(set_edition, "self", "edition");
pub const EQUIP_MINTED_WEAPON: FunctionDescriptor = function!(equip_minted_weapon, "self", "weapon");
pub const EQUIP_MINTED_COSMETIC: FunctionDescriptor = function!(equip_minted_cosmetic, "self", "cosmetic");
pub const UPGRADE_EQUIPPED_WEAPON: FunctionDescriptor =
    function!(upgrade_equipped_weapon, "self", "access_control", "admin", "slot", "url");
pub const UPGRADE_EQUIPPED_COSMETIC: FunctionDescriptor =
    function!(upgrade_equipped_cosmetic, "self", "access_control", "admin", "type", "url");

const FUNCTIONS: &[FunctionDescriptor] = &[
    NEW,
    TRANSFER,
    KEEP,
    UPGRADE,
    ASSERT_NO_AVATAR,
    ASSERT_HAS_AVATAR,
    HAS_WEAPON,
    HAS_COSMETIC,
    SET_EDITION,
    EQUIP_MINTED_WEAPON,
    EQUIP_MINTED_COSMETIC,
    UPGRADE_EQUIPPED_WEAPON,
    UPGRADE_EQUIPPED_COSMETIC,
];

pub fn functions() -> impl Iterator<Item = &'static FunctionDescriptor> {
    FUNCTIONS.iter()
}

/// Avatar plus the admin objects an upgrade is authorised by.
#[derive(Debug, Clone)]
pub struct UpgradeArgs {
    pub avatar: ObjectInput,
    pub access_control: ObjectInput,
    pub admin: ObjectInput,
}

impl UpgradeArgs {
    fn objects(self, tx: &mut TransactionBuilder) -> Result<Vec<Argument>> {
        Ok(vec![tx.obj(self.avatar)?, tx.obj(self.access_control)?, tx.obj(self.admin)?])
    }
}

/// `new`: mint an avatar from the registry. Returns the avatar handle.
pub fn new(
    tx: &mut TransactionBuilder,
    package: &str,
    registry: impl Into<ObjectInput>,
    image_url: &str,
) -> Result<Argument> {
    let arguments = vec![tx.obj(registry)?, tx.pure_string(image_url)?];
    tx.move_call(package, &NEW, vec![], arguments)
}

pub fn transfer(
    tx: &mut TransactionBuilder,
    package: &str,
    avatar: impl Into<ObjectInput>,
    recipient: &str,
) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?, tx.pure_address(recipient)?];
    tx.move_call(package, &TRANSFER, vec![], arguments)
}

pub fn keep(tx: &mut TransactionBuilder, package: &str, avatar: impl Into<ObjectInput>) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?];
    tx.move_call(package, &KEEP, vec![], arguments)
}

pub fn upgrade(tx: &mut TransactionBuilder, package: &str, args: UpgradeArgs, url: &str) -> Result<Argument> {
    let mut arguments = args.objects(tx)?;
    arguments.push(tx.pure_string(url)?);
    tx.move_call(package, &UPGRADE, vec![], arguments)
}

/// Aborts unless `addr` has no avatar registered.
pub fn assert_no_avatar(
    tx: &mut TransactionBuilder,
    package: &str,
    registry: impl Into<ObjectInput>,
    addr: &str,
) -> Result<Argument> {
    let arguments = vec![tx.obj(registry)?, tx.pure_address(addr)?];
    tx.move_call(package, &ASSERT_NO_AVATAR, vec![], arguments)
}

/// Aborts unless `addr` has an avatar registered.
pub fn assert_has_avatar(
    tx: &mut TransactionBuilder,
    package: &str,
    registry: impl Into<ObjectInput>,
    addr: &str,
) -> Result<Argument> {
    let arguments = vec![tx.obj(registry)?, tx.pure_address(addr)?];
    tx.move_call(package, &ASSERT_HAS_AVATAR, vec![], arguments)
}

pub fn has_weapon(
    tx: &mut TransactionBuilder,
    package: &str,
    avatar: impl Into<ObjectInput>,
    slot: &str,
) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?, tx.pure_string(slot)?];
    tx.move_call(package, &HAS_WEAPON, vec![], arguments)
}

pub fn has_cosmetic(
    tx: &mut TransactionBuilder,
    package: &str,
    avatar: impl Into<ObjectInput>,
    cosmetic_type: &str,
) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?, tx.pure_string(cosmetic_type)?];
    tx.move_call(package, &HAS_COSMETIC, vec![], arguments)
}

pub fn set_edition(
    tx: &mut TransactionBuilder,
    package: &str,
    avatar: impl Into<ObjectInput>,
    edition: &[u8],
) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?, tx.pure_bytes(edition)?];
    tx.move_call(package, &SET_EDITION, vec![], arguments)
}

pub fn equip_minted_weapon(
    tx: &mut TransactionBuilder,
    package: &str,
    avatar: impl Into<ObjectInput>,
    weapon: impl Into<ObjectInput>,
) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?, tx.obj(weapon)?];
    tx.move_call(package, &EQUIP_MINTED_WEAPON, vec![], arguments)
}

pub fn equip_minted_cosmetic(
    tx: &mut TransactionBuilder,
    package: &str,
    avatar: impl Into<ObjectInput>,
    cosmetic: impl Into<ObjectInput>,
) -> Result<Argument> {
    let arguments = vec![tx.obj(avatar)?, tx.obj(cosmetic)?];
    tx.move_call(package, &EQUIP_MINTED_COSMETIC, vec![], arguments)
}

pub fn upgrade_equipped_weapon(
    tx: &mut TransactionBuilder,
    package: &str,
    args: UpgradeArgs,
    slot: &str,
    url: &str,
) -> Result<Argument> {
    let mut arguments = args.objects(tx)?;
    arguments.push(tx.pure_string(slot)?);
    arguments.push(tx.pure_string(url)?);
    tx.move_call(package, &UPGRADE_EQUIPPED_WEAPON, vec![], arguments)
}

pub fn upgrade_equipped_cosmetic(
    tx: &mut TransactionBuilder,
    package: &str,
    args: UpgradeArgs,
    cosmetic_type: &str,
    url: &str,
) -> Result<Argument> {
    let mut arguments = args.objects(tx)?;
    arguments.push(tx.pure_string(cosmetic_type)?);
    arguments.push(tx.pure_string(url)?);
    tx.move_call(package, &UPGRADE_EQUIPPED_COSMETIC, vec![], arguments)
}
