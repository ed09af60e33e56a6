use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ReifiedError, Result};
use crate::models::{FieldType, StructName, StructTag, TypeTag};
use crate::schema::builtin::framework_definitions;
use crate::schema::canonical::Canonicalizer;
use crate::schema::descriptor::{StructDefinition, TypeDescriptor};
use crate::schema::reified::{reify, ReifiedType};

/// Schema file: a list of package struct definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaFile {
    pub structs: Vec<StructDefinition>,
}

/// Collects definitions before the registry is frozen.
pub struct RegistryBuilder {
    canonicalizer: Canonicalizer,
    definitions: Vec<StructDefinition>,
}

impl RegistryBuilder {
    /// Starts with the Move stdlib / Sui framework structs.
    pub fn new(canonicalizer: Canonicalizer) -> Self {
        Self {
            canonicalizer,
            definitions: framework_definitions(),
        }
    }

    pub fn with_definition(mut self, definition: StructDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_definitions(mut self, definitions: impl IntoIterator<Item = StructDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    pub fn load_schema_file(self, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file {}", path.display()))?;
        let schema: SchemaFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse schema file {}", path.display()))?;
        info!("📦 Loaded {} struct definitions from {}", schema.structs.len(), path.display());
        Ok(self.with_definitions(schema.structs))
    }

    /// Resolve every definition and check cross-references.
    pub fn build(self) -> Result<DescriptorRegistry> {
        let mut descriptors: HashMap<String, Arc<TypeDescriptor>> = HashMap::new();
        for definition in &self.definitions {
            let descriptor = definition.to_descriptor()?;
            let key = self.canonicalizer.render_name(&descriptor.name);
            if descriptors.insert(key.clone(), Arc::new(descriptor)).is_some() {
                return Err(ReifiedError::schema(format!("struct {} is defined twice", key)));
            }
        }

        let registry = DescriptorRegistry {
            descriptors,
            canonicalizer: self.canonicalizer,
        };
        for descriptor in registry.descriptors.values() {
            for field in &descriptor.fields {
                registry.check_references(&field.ty).map_err(|e| {
                    ReifiedError::schema(format!(
                        "{}.{}: {}",
                        registry.canonicalizer.render_name(&descriptor.name),
                        field.name,
                        e
                    ))
                })?;
            }
        }

        registry.check_acyclic()?;

        debug!("Descriptor registry built with {} structs", registry.descriptors.len());
        Ok(registry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// Every struct named anywhere inside `ty`, type arguments included.
fn struct_names<'a>(ty: &'a FieldType, out: &mut Vec<&'a StructName>) {
    match ty {
        FieldType::Vector(inner) => struct_names(inner, out),
        FieldType::Struct { name, type_args } => {
            out.push(name);
            for arg in type_args {
                struct_names(arg, out);
            }
        }
        _ => {}
    }
}

/// Read-only map from canonical struct name to layout.
#[derive(Debug, Clone)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, Arc<TypeDescriptor>>,
    canonicalizer: Canonicalizer,
}

impl DescriptorRegistry {
    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, name: &StructName) -> Option<&Arc<TypeDescriptor>> {
        self.descriptors.get(&self.canonicalizer.render_name(name))
    }

    pub fn get_by_name(&self, name: &str) -> Result<&Arc<TypeDescriptor>> {
        let parsed = StructName::parse(name)?;
        self.get(&parsed)
            .ok_or_else(|| ReifiedError::schema(format!("struct {} is not in the schema", name)))
    }

    pub fn reify(&self, name: &str, type_args: Vec<TypeTag>) -> Result<ReifiedType> {
        reify(self.get_by_name(name)?, type_args, &self.canonicalizer)
    }

    pub fn reify_tag(&self, tag: &StructTag) -> Result<ReifiedType> {
        let descriptor = self.get(&tag.name).ok_or_else(|| {
            ReifiedError::schema(format!(
                "struct {} is not in the schema",
                self.canonicalizer.render_name(&tag.name)
            ))
        })?;
        reify(descriptor, tag.type_params.clone(), &self.canonicalizer)
    }

    /// Reify a full type string such as `0x2::coin::Coin<0x2::sui::SUI>`.
    pub fn reify_str(&self, type_string: &str) -> Result<ReifiedType> {
        match type_string.parse::<TypeTag>()? {
            TypeTag::Struct(tag) => self.reify_tag(&tag),
            other => Err(ReifiedError::schema(format!("`{}` is not a struct type", other))),
        }
    }

    /// True when `type_string` is some instantiation of the struct `name`.
    pub fn is_type(&self, name: &str, type_string: &str) -> bool {
        let expected = match StructName::parse(name) {
            Ok(parsed) => self.canonicalizer.render_name(&parsed),
            Err(_) => return false,
        };
        match type_string.parse::<TypeTag>() {
            Ok(TypeTag::Struct(tag)) => self.canonicalizer.render_name(&tag.name) == expected,
            _ => false,
        }
    }

    /// Rejects structs that contain themselves, directly or through other
    /// structs, vectors or type arguments.
    fn check_acyclic(&self) -> Result<()> {
        let mut keys: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for key in keys {
            self.visit(key, &mut marks, &mut path)?;
        }
        Ok(())
    }

    fn visit<'a>(&'a self, key: &'a str, marks: &mut HashMap<&'a str, Visit>, path: &mut Vec<&'a str>) -> Result<()> {
        match marks.get(key) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::Active) => {
                let start = path.iter().position(|k| *k == key).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(key);
                return Err(ReifiedError::schema(format!("recursive struct: {}", cycle.join(" -> "))));
            }
            None => {}
        }
        let descriptor = match self.descriptors.get(key) {
            Some(descriptor) => descriptor,
            None => return Ok(()),
        };

        marks.insert(key, Visit::Active);
        path.push(key);
        let mut referenced = Vec::new();
        for field in &descriptor.fields {
            struct_names(&field.ty, &mut referenced);
        }
        for name in referenced {
            let rendered = self.canonicalizer.render_name(name);
            if let Some((next, _)) = self.descriptors.get_key_value(&rendered) {
                self.visit(next, marks, path)?;
            }
        }
        path.pop();
        marks.insert(key, Visit::Done);
        Ok(())
    }

    fn check_references(&self, ty: &FieldType) -> Result<()> {
        match ty {
            FieldType::Vector(inner) => self.check_references(inner),
            FieldType::Struct { name, type_args } => {
                let descriptor = self.get(name).ok_or_else(|| {
                    ReifiedError::schema(format!(
                        "references unknown struct {}",
                        self.canonicalizer.render_name(name)
                    ))
                })?;
                if descriptor.arity() != type_args.len() {
                    return Err(ReifiedError::schema(format!(
                        "{} takes {} type argument(s), {} given",
                        self.canonicalizer.render_name(name),
                        descriptor.arity(),
                        type_args.len()
                    )));
                }
                type_args.iter().try_for_each(|arg| self.check_references(arg))
            }
            _ => Ok(()),
        }
    }
}
