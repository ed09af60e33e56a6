use anyhow::{bail, Result};

/// Shape of a Move entry point: enough to reject malformed calls before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub module: &'static str,
    pub name: &'static str,
    pub type_params: usize,
    /// Parameter names, in call order. `TxContext` is implicit and not listed.
    pub parameters: &'static [&'static str],
}

impl FunctionDescriptor {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn check(&self, type_arguments: usize, arguments: usize) -> Result<()> {
        if type_arguments != self.type_params {
            bail!(
                "{}::{} takes {} type arguments, got {}",
                self.module,
                self.name,
                self.type_params,
                type_arguments
            );
        }
        if arguments != self.arity() {
            bail!(
                "{}::{} takes {} arguments ({}), got {}",
                self.module,
                self.name,
                self.arity(),
                self.parameters.join(", "),
                arguments
            );
        }
        Ok(())
    }
}

/// Find a descriptor by function name.
pub fn lookup<'a>(
    table: impl IntoIterator<Item = &'a FunctionDescriptor>,
    name: &str,
) -> Option<&'a FunctionDescriptor> {
    table.into_iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[FunctionDescriptor] = &[
        FunctionDescriptor {
            module: "m",
            name: "one",
            type_params: 0,
            parameters: &["a"],
        },
        FunctionDescriptor {
            module: "m",
            name: "generic",
            type_params: 1,
            parameters: &["a", "b"],
        },
    ];

    #[test]
    fn test_check_counts() {
        let generic = lookup(TABLE, "generic").unwrap();
        assert!(generic.check(1, 2).is_ok());
        assert!(generic.check(0, 2).is_err());

        let err = generic.check(1, 1).unwrap_err().to_string();
        assert!(err.contains("takes 2 arguments (a, b), got 1"), "{}", err);
    }

    #[test]
    fn test_lookup_missing() {
        assert!(lookup(TABLE, "two").is_none());
        assert_eq!(lookup(TABLE, "one").unwrap().arity(), 1);
    }
}
