use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{ReifiedError, Result};
use crate::models::{compose, StructTag, TypeTag};
use crate::schema::canonical::Canonicalizer;
use crate::schema::descriptor::TypeDescriptor;

/// A [`TypeDescriptor`] instantiated with concrete type arguments.
///
/// Equality and hashing only look at the canonical fully-qualified name.
#[derive(Debug, Clone)]
pub struct ReifiedType {
    descriptor: Arc<TypeDescriptor>,
    type_name: String,
    type_args: Vec<TypeTag>,
    type_arg_strings: Vec<String>,
    full_type_name: String,
    field_types: Vec<TypeTag>,
}

/// Instantiate `descriptor` with `type_args`.
pub fn reify(
    descriptor: &Arc<TypeDescriptor>,
    type_args: Vec<TypeTag>,
    canonicalizer: &Canonicalizer,
) -> Result<ReifiedType> {
    if type_args.len() != descriptor.arity() {
        return Err(ReifiedError::schema(format!(
            "{} expects {} type argument(s), got {}",
            canonicalizer.render_name(&descriptor.name),
            descriptor.arity(),
            type_args.len()
        )));
    }

    let type_name = canonicalizer.render_name(&descriptor.name);
    let type_arg_strings: Vec<String> = type_args.iter().map(|t| canonicalizer.render(t)).collect();
    let full_type_name = compose(type_name.clone(), type_arg_strings.iter().cloned());

    let field_types = descriptor
        .fields
        .iter()
        .map(|field| field.ty.substitute(&type_args))
        .collect::<Result<Vec<_>>>()?;

    Ok(ReifiedType {
        descriptor: descriptor.clone(),
        type_name,
        type_args,
        type_arg_strings,
        full_type_name,
        field_types,
    })
}

impl ReifiedType {
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Canonical base name, e.g. `0x2::coin::Coin`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Canonical name with arguments, e.g. `0x2::coin::Coin<0x2::sui::SUI>`.
    pub fn full_type_name(&self) -> &str {
        &self.full_type_name
    }

    pub fn type_args(&self) -> &[TypeTag] {
        &self.type_args
    }

    pub fn type_arg_strings(&self) -> Vec<String> {
        self.type_arg_strings.clone()
    }

    /// Field names paired with their resolved types, in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&crate::schema::FieldDescriptor, &TypeTag)> {
        self.descriptor.fields.iter().zip(self.field_types.iter())
    }

    pub fn to_type_tag(&self) -> TypeTag {
        TypeTag::Struct(Box::new(StructTag {
            name: self.descriptor.name.clone(),
            type_params: self.type_args.clone(),
        }))
    }
}

impl PartialEq for ReifiedType {
    fn eq(&self, other: &Self) -> bool {
        self.full_type_name == other.full_type_name
    }
}

impl Eq for ReifiedType {}

impl Hash for ReifiedType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_type_name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StructDefinition;

    fn rule_descriptor() -> Arc<TypeDescriptor> {
        Arc::new(
            StructDefinition::new("0xbd8f::witness_rule::Rule", &[("Proof", true)], &[("dummy_field", "bool")])
                .to_descriptor()
                .unwrap(),
        )
    }

    #[test]
    fn test_full_type_name() {
        let canon = Canonicalizer::default();
        let witness: TypeTag = "0x00abc::avatar::Witness".parse().unwrap();
        let reified = reify(&rule_descriptor(), vec![witness], &canon).unwrap();
        assert_eq!(reified.type_name(), "0xbd8f::witness_rule::Rule");
        assert_eq!(reified.full_type_name(), "0xbd8f::witness_rule::Rule<0xabc::avatar::Witness>");
        assert_eq!(reified.type_arg_strings(), vec!["0xabc::avatar::Witness".to_string()]);
    }

    #[test]
    fn test_arity_mismatch_is_schema_error() {
        let canon = Canonicalizer::default();
        let err = reify(&rule_descriptor(), vec![], &canon).unwrap_err();
        assert!(matches!(err, ReifiedError::SchemaMismatch(_)));
    }

    #[test]
    fn test_reify_is_deterministic() {
        let canon = Canonicalizer::default();
        let arg: TypeTag = "0xabc::avatar::Witness".parse().unwrap();
        let a = reify(&rule_descriptor(), vec![arg.clone()], &canon).unwrap();
        let b = reify(&rule_descriptor(), vec![arg], &canon).unwrap();
        assert_eq!(a.full_type_name(), b.full_type_name());
        assert_eq!(a, b);
    }

    #[test]
    fn test_field_types_are_resolved() {
        let canon = Canonicalizer::default();
        let descriptor = Arc::new(
            StructDefinition::new("0x2::vec_map::Entry", &[("K", false), ("V", false)], &[("key", "K"), ("value", "V")])
                .to_descriptor()
                .unwrap(),
        );
        let reified = reify(&descriptor, vec![TypeTag::Address, TypeTag::U64], &canon).unwrap();
        let types: Vec<&TypeTag> = reified.fields().map(|(_, ty)| ty).collect();
        assert_eq!(types, vec![&TypeTag::Address, &TypeTag::U64]);
    }
}
