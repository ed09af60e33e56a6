//! Move type signatures as written in a struct schema.
//!
//! A signature is a type that may still reference the declaring struct's
//! type parameters by name (`vector<T>`, `0x2::balance::Balance<T>`). Parsing
//! resolves those names to positional [`FieldType::Param`] indices; reifying
//! substitutes concrete [`TypeTag`]s for them.

use crate::error::{ReifiedError, Result};
use crate::models::type_tag::{parse_address, StructName, StructTag, TypeTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<FieldType>),
    Struct { name: StructName, type_args: Vec<FieldType> },
    Param(usize),
}

impl FieldType {
    /// Replace type parameters with concrete arguments.
    pub fn substitute(&self, args: &[TypeTag]) -> Result<TypeTag> {
        Ok(match self {
            FieldType::Bool => TypeTag::Bool,
            FieldType::U8 => TypeTag::U8,
            FieldType::U16 => TypeTag::U16,
            FieldType::U32 => TypeTag::U32,
            FieldType::U64 => TypeTag::U64,
            FieldType::U128 => TypeTag::U128,
            FieldType::U256 => TypeTag::U256,
            FieldType::Address => TypeTag::Address,
            FieldType::Signer => TypeTag::Signer,
            FieldType::Vector(inner) => TypeTag::Vector(Box::new(inner.substitute(args)?)),
            FieldType::Struct { name, type_args } => TypeTag::Struct(Box::new(StructTag {
                name: name.clone(),
                type_params: type_args
                    .iter()
                    .map(|arg| arg.substitute(args))
                    .collect::<Result<Vec<_>>>()?,
            })),
            FieldType::Param(index) => args
                .get(*index)
                .cloned()
                .ok_or_else(|| ReifiedError::schema(format!("type parameter {} is not bound", index)))?,
        })
    }

    /// True when parameter `index` is stored in the runtime layout at this
    /// position, i.e. appears bare or as a vector element rather than only as
    /// a struct type argument.
    pub fn stores_param(&self, index: usize) -> bool {
        match self {
            FieldType::Param(i) => *i == index,
            FieldType::Vector(inner) => inner.stores_param(index),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    PathSep,
    Lt,
    Gt,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '<' => {
                chars.next();
                tokens.push(Token::Lt);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Gt);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            ':' => {
                chars.next();
                if chars.next() != Some(':') {
                    return Err(invalid(input, "single `:`"));
                }
                tokens.push(Token::PathSep);
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(invalid(input, &format!("unexpected character `{}`", other))),
        }
    }

    Ok(tokens)
}

/// Deepest nesting of `vector<..>` and type arguments a signature may use.
pub const MAX_TYPE_DEPTH: usize = 128;

/// Longest prefix of the input quoted back in an error.
const QUOTED_INPUT_LIMIT: usize = 120;

fn invalid(input: &str, reason: &str) -> ReifiedError {
    if input.len() <= QUOTED_INPUT_LIMIT {
        return ReifiedError::schema(format!("invalid type `{}`: {}", input, reason));
    }
    let mut end = QUOTED_INPUT_LIMIT;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    ReifiedError::schema(format!("invalid type `{}...`: {}", &input[..end], reason))
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    params: &'a [String],
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.next() {
            Some(ref token) if *token == expected => Ok(()),
            other => Err(invalid(self.input, &format!("expected {:?}, found {:?}", expected, other))),
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Ident(ident)) => Ok(ident),
            other => Err(invalid(self.input, &format!("expected identifier, found {:?}", other))),
        }
    }

    fn type_args(&mut self) -> Result<Vec<FieldType>> {
        let mut args = Vec::new();
        if self.peek() != Some(&Token::Lt) {
            return Ok(args);
        }
        self.next();
        loop {
            args.push(self.parse_type()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::Gt) => break,
                other => return Err(invalid(self.input, &format!("expected `,` or `>`, found {:?}", other))),
            }
        }
        Ok(args)
    }

    fn parse_type(&mut self) -> Result<FieldType> {
        if self.depth >= MAX_TYPE_DEPTH {
            return Err(invalid(self.input, &format!("nesting deeper than {}", MAX_TYPE_DEPTH)));
        }
        self.depth += 1;
        let ty = self.parse_path_or_primitive();
        self.depth -= 1;
        ty
    }

    fn parse_path_or_primitive(&mut self) -> Result<FieldType> {
        let mut path = vec![self.ident()?];
        while self.peek() == Some(&Token::PathSep) {
            self.next();
            path.push(self.ident()?);
        }

        match path.len() {
            1 => {
                let ident = path.remove(0);
                if ident == "vector" {
                    self.expect(Token::Lt)?;
                    let inner = self.parse_type()?;
                    self.expect(Token::Gt)?;
                    return Ok(FieldType::Vector(Box::new(inner)));
                }
                let ty = match ident.as_str() {
                    "bool" => FieldType::Bool,
                    "u8" => FieldType::U8,
                    "u16" => FieldType::U16,
                    "u32" => FieldType::U32,
                    "u64" => FieldType::U64,
                    "u128" => FieldType::U128,
                    "u256" => FieldType::U256,
                    "address" => FieldType::Address,
                    "signer" => FieldType::Signer,
                    name => match self.params.iter().position(|p| p == name) {
                        Some(index) => FieldType::Param(index),
                        None => return Err(invalid(self.input, &format!("unknown type `{}`", name))),
                    },
                };
                if self.peek() == Some(&Token::Lt) {
                    return Err(invalid(self.input, &format!("`{}` takes no type arguments", ident)));
                }
                Ok(ty)
            }
            3 => {
                let address = parse_address(&path[0])
                    .map_err(|_| invalid(self.input, &format!("`{}` is not an address", path[0])))?;
                let name = StructName::new(address, path[1].clone(), path[2].clone());
                let type_args = self.type_args()?;
                Ok(FieldType::Struct { name, type_args })
            }
            _ => Err(invalid(self.input, &format!("`{}` is not a type path", path.join("::")))),
        }
    }
}

/// Parse a signature, resolving bare identifiers against `params` by position.
pub fn parse_signature(input: &str, params: &[String]) -> Result<FieldType> {
    let mut parser = Parser {
        input,
        tokens: tokenize(input)?,
        pos: 0,
        params,
        depth: 0,
    };
    let ty = parser.parse_type()?;
    if parser.pos != parser.tokens.len() {
        return Err(invalid(input, "trailing tokens"));
    }
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_primitives_and_vectors() {
        assert_eq!(parse_signature("u64", &[]).unwrap(), FieldType::U64);
        assert_eq!(
            parse_signature("vector<vector<u8>>", &[]).unwrap(),
            FieldType::Vector(Box::new(FieldType::Vector(Box::new(FieldType::U8))))
        );
    }

    #[test]
    fn test_parse_struct_with_params() {
        let ty = parse_signature("0x2::balance::Balance<T>", &params(&["T"])).unwrap();
        match ty {
            FieldType::Struct { name, type_args } => {
                assert!(name.is(2, "balance", "Balance"));
                assert_eq!(type_args, vec![FieldType::Param(0)]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let a = parse_signature("0x2::kiosk::Item< u64 ,bool >", &[]).unwrap();
        let b = parse_signature("0x2::kiosk::Item<u64, bool>", &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_malformed_types() {
        assert!(parse_signature("vector<u8", &[]).is_err());
        assert!(parse_signature("u8<u8>", &[]).is_err());
        assert!(parse_signature("Unknown", &[]).is_err());
        assert!(parse_signature("0x2::coin", &[]).is_err());
        assert!(parse_signature("u64 u64", &[]).is_err());
        assert!(parse_signature("pkg::module::Witness", &[]).is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected_without_overflow() {
        let n = 200_000;
        let input = format!("{}u8{}", "vector<".repeat(n), ">".repeat(n));
        match parse_signature(&input, &[]) {
            Err(ReifiedError::SchemaMismatch(msg)) => {
                assert!(msg.contains("nesting"), "{}", msg);
                assert!(msg.len() < 400);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }

        let input = format!("{}u8{}", "0x2::m::S<".repeat(n), ">".repeat(n));
        assert!(matches!(parse_signature(&input, &[]), Err(ReifiedError::SchemaMismatch(_))));
    }

    #[test]
    fn test_nesting_up_to_the_limit_parses() {
        let depth = MAX_TYPE_DEPTH - 1;
        let input = format!("{}u8{}", "vector<".repeat(depth), ">".repeat(depth));
        assert!(parse_signature(&input, &[]).is_ok());

        let input = format!("vector<{}>", input);
        assert!(parse_signature(&input, &[]).is_err());
    }

    #[test]
    fn test_substitute_unbound_param_fails() {
        let ty = parse_signature("vector<T>", &params(&["T"])).unwrap();
        assert!(ty.substitute(&[]).is_err());
        assert_eq!(
            ty.substitute(&[TypeTag::Bool]).unwrap(),
            TypeTag::Vector(Box::new(TypeTag::Bool))
        );
    }

    #[test]
    fn test_stores_param() {
        let p = params(&["T"]);
        assert!(parse_signature("vector<T>", &p).unwrap().stores_param(0));
        assert!(!parse_signature("0x2::balance::Balance<T>", &p).unwrap().stores_param(0));
    }
}
