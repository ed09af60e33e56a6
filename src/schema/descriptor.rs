use serde::{Deserialize, Serialize};

use crate::error::{ReifiedError, Result};
use crate::models::{parse_signature, FieldType, StructName};

/// Generic parameter of a struct; phantom parameters never reach the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub phantom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Move field name (`dummy_field`).
    pub name: String,
    /// Key used in the canonical JSON projection (`dummyField`).
    pub json_name: String,
    pub ty: FieldType,
}

/// Layout of one on-chain struct, fixed at schema load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: StructName,
    pub type_params: Vec<TypeParam>,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_phantom(&self, index: usize) -> bool {
        self.type_params.get(index).map_or(false, |p| p.phantom)
    }
}

/// Struct definition as it appears in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDefinition {
    /// `0xADDR::module::Name`
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl StructDefinition {
    pub fn new(name: &str, type_params: &[(&str, bool)], fields: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            type_params: type_params
                .iter()
                .map(|(name, phantom)| TypeParam {
                    name: name.to_string(),
                    phantom: *phantom,
                })
                .collect(),
            fields: fields
                .iter()
                .map(|(name, ty)| FieldDefinition {
                    name: name.to_string(),
                    ty: ty.to_string(),
                })
                .collect(),
        }
    }

    /// Resolve names and field signatures into a descriptor.
    pub fn to_descriptor(&self) -> Result<TypeDescriptor> {
        let name = StructName::parse(&self.name)?;
        let param_names: Vec<String> = self.type_params.iter().map(|p| p.name.clone()).collect();

        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if fields.iter().any(|f| f.name == field.name) {
                return Err(ReifiedError::schema(format!("{}: duplicate field `{}`", self.name, field.name)));
            }
            let ty = parse_signature(&field.ty, &param_names)
                .map_err(|e| ReifiedError::schema(format!("{}.{}: {}", self.name, field.name, e)))?;

            for (index, param) in self.type_params.iter().enumerate() {
                if param.phantom && ty.stores_param(index) {
                    return Err(ReifiedError::schema(format!(
                        "{}.{}: phantom parameter `{}` used as a field type",
                        self.name, field.name, param.name
                    )));
                }
            }

            fields.push(FieldDescriptor {
                name: field.name.clone(),
                json_name: to_camel_case(&field.name),
                ty,
            });
        }

        Ok(TypeDescriptor {
            name,
            type_params: self.type_params.clone(),
            fields,
        })
    }
}

/// `dummy_field` -> `dummyField`
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' && i > 0 {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
