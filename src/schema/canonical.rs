use std::collections::HashMap;
use tracing::debug;

use crate::config::CanonicalizationConfig;
use crate::error::{ReifiedError, Result};
use crate::models::{long_address, parse_address, short_address, StructName, SuiAddress, TypeTag};

/// Framework packages whose short forms are always recognised.
const FRAMEWORK_ADDRESSES: [u8; 5] = [0x1, 0x2, 0x3, 0x5, 0x6];

/// Renders type strings in the deployment's canonical form.
///
/// Type-string equality is only meaningful after both sides went through the
/// same `Canonicalizer`: the input is parsed and re-rendered, every address
/// is mapped through the alias table (or compressed by dropping leading
/// zeros), and type arguments are joined with `", "`.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    aliases: HashMap<SuiAddress, String>,
    strip_leading_zeros: bool,
}

impl Canonicalizer {
    pub fn new(aliases: &HashMap<String, String>, strip_leading_zeros: bool) -> Result<Self> {
        let mut table = HashMap::with_capacity(aliases.len());
        for (long, short) in aliases {
            let key = parse_address(long)
                .map_err(|e| ReifiedError::schema(format!("alias key `{}`: {}", long, e)))?;
            parse_address(short)
                .map_err(|e| ReifiedError::schema(format!("alias target `{}`: {}", short, e)))?;
            table.insert(key, short.to_lowercase());
        }

        // Targets must render as themselves, otherwise canonicalizing twice
        // would rewrite them again.
        let targets: Vec<String> = table.values().cloned().collect();
        for short in targets {
            let target = parse_address(&short)?;
            match table.get(&target) {
                Some(next) if *next != short => {
                    return Err(ReifiedError::schema(format!(
                        "alias target `{}` is itself aliased to `{}`",
                        short, next
                    )));
                }
                Some(_) => {}
                None => {
                    table.insert(target, short);
                }
            }
        }

        debug!("Canonicalizer built with {} address aliases", table.len());
        Ok(Self {
            aliases: table,
            strip_leading_zeros,
        })
    }

    pub fn from_config(config: &CanonicalizationConfig) -> Result<Self> {
        Self::new(&config.address_aliases, config.strip_leading_zeros)
    }

    /// Alias table mapping the 64-digit framework addresses to `0x1`, `0x2`, ...
    pub fn framework_aliases() -> HashMap<String, String> {
        FRAMEWORK_ADDRESSES
            .iter()
            .map(|a| (format!("0x{:064x}", a), format!("0x{:x}", a)))
            .collect()
    }

    pub fn address(&self, address: &SuiAddress) -> String {
        if let Some(alias) = self.aliases.get(address) {
            return alias.clone();
        }
        if self.strip_leading_zeros {
            short_address(address)
        } else {
            long_address(address)
        }
    }

    pub fn render(&self, tag: &TypeTag) -> String {
        tag.render(&|a| self.address(a))
    }

    pub fn render_name(&self, name: &StructName) -> String {
        name.render(&|a| self.address(a))
    }

    /// Canonical form of an arbitrary type string.
    pub fn canonicalize(&self, type_string: &str) -> Result<String> {
        let tag: TypeTag = type_string.parse()?;
        Ok(self.render(&tag))
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        let aliases = Self::framework_aliases()
            .into_iter()
            .filter_map(|(long, short)| parse_address(&long).ok().map(|key| (key, short)))
            .collect();
        Self {
            aliases,
            strip_leading_zeros: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG_LONG: &str = "0xbd8fc1947cf119350184107a3087e2dc27efefa0dd82e25a1f699069fe81a585";

    #[test]
    fn test_compresses_framework_addresses() {
        let canon = Canonicalizer::default();
        let long = format!("0x{:064x}::coin::Coin<0x{:064x}::sui::SUI>", 2, 2);
        assert_eq!(canon.canonicalize(&long).unwrap(), "0x2::coin::Coin<0x2::sui::SUI>");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let canon = Canonicalizer::default();
        let inputs = [
            "0x2::coin::Coin<0x2::sui::SUI>".to_string(),
            format!("{}::witness_rule::Rule<{}::avatar::Witness>", PKG_LONG, PKG_LONG),
            "vector<0x0002::table::Table<address,  u64>>".to_string(),
        ];
        for input in inputs.iter() {
            let once = canon.canonicalize(input).unwrap();
            let twice = canon.canonicalize(&once).unwrap();
            assert_eq!(once, twice, "canonicalization of {} is not idempotent", input);
        }
    }

    #[test]
    fn test_without_stripping_keeps_long_form_except_aliases() {
        let canon = Canonicalizer::new(&Canonicalizer::framework_aliases(), false).unwrap();
        let rendered = canon
            .canonicalize(&format!("0x2::dynamic_field::Field<{}::shop::Key, u64>", "0xabc"))
            .unwrap();
        assert_eq!(
            rendered,
            format!("0x2::dynamic_field::Field<0x{:0>64}::shop::Key, u64>", "abc")
        );
    }

    #[test]
    fn test_package_alias_maps_upgraded_id() {
        let mut aliases = HashMap::new();
        aliases.insert("0xaaaa".to_string(), "0xbbbb".to_string());
        let canon = Canonicalizer::new(&aliases, true).unwrap();
        assert_eq!(canon.canonicalize("0xaaaa::m::S").unwrap(), "0xbbbb::m::S");
        assert_eq!(canon.canonicalize("0xbbbb::m::S").unwrap(), "0xbbbb::m::S");
    }

    #[test]
    fn test_rejects_chained_aliases() {
        let mut aliases = HashMap::new();
        aliases.insert("0xa".to_string(), "0xb".to_string());
        aliases.insert("0xb".to_string(), "0xc".to_string());
        assert!(Canonicalizer::new(&aliases, true).is_err());
    }
}
