//! Move stdlib and Sui framework structs every package schema builds on.

use crate::schema::descriptor::StructDefinition;

pub fn framework_definitions() -> Vec<StructDefinition> {
    vec![
        StructDefinition::new("0x1::string::String", &[], &[("bytes", "vector<u8>")]),
        StructDefinition::new("0x1::ascii::String", &[], &[("bytes", "vector<u8>")]),
        StructDefinition::new("0x1::option::Option", &[("Element", false)], &[("vec", "vector<Element>")]),
        StructDefinition::new("0x1::type_name::TypeName", &[], &[("name", "0x1::ascii::String")]),
        StructDefinition::new("0x2::object::ID", &[], &[("bytes", "address")]),
        StructDefinition::new("0x2::object::UID", &[], &[("id", "0x2::object::ID")]),
        StructDefinition::new("0x2::url::Url", &[], &[("url", "0x1::ascii::String")]),
        StructDefinition::new("0x2::balance::Balance", &[("T", true)], &[("value", "u64")]),
        StructDefinition::new("0x2::balance::Supply", &[("T", true)], &[("value", "u64")]),
        StructDefinition::new(
            "0x2::coin::Coin",
            &[("T", true)],
            &[("id", "0x2::object::UID"), ("balance", "0x2::balance::Balance<T>")],
        ),
        StructDefinition::new(
            "0x2::table::Table",
            &[("K", true), ("V", true)],
            &[("id", "0x2::object::UID"), ("size", "u64")],
        ),
        StructDefinition::new("0x2::bag::Bag", &[], &[("id", "0x2::object::UID"), ("size", "u64")]),
        StructDefinition::new(
            "0x2::vec_map::Entry",
            &[("K", false), ("V", false)],
            &[("key", "K"), ("value", "V")],
        ),
        StructDefinition::new(
            "0x2::vec_map::VecMap",
            &[("K", false), ("V", false)],
            &[("contents", "vector<0x2::vec_map::Entry<K, V>>")],
        ),
        StructDefinition::new("0x2::vec_set::VecSet", &[("K", false)], &[("contents", "vector<K>")]),
    ]
}
