use anyhow::{bail, Result};
use std::fmt;

use crate::calls::functions::FunctionDescriptor;
use crate::decoder::value_to_bcs;
use crate::models::{long_address, parse_address, MoveValue, SuiAddress, TypeTag};

/// Transaction input, referenced by [`Argument::Input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// Owned or shared object, by id. Versions are resolved at submission.
    Object(SuiAddress),
    /// BCS-encoded pure value.
    Pure(Vec<u8>),
}

/// Handle to a value inside a programmable transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    GasCoin,
    Input(u16),
    /// Result of the command at this index.
    Result(u16),
    NestedResult(u16, u16),
}

/// Either an object id still to be registered as an input, or an existing handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectInput {
    Id(String),
    Argument(Argument),
}

impl From<&str> for ObjectInput {
    fn from(id: &str) -> Self {
        ObjectInput::Id(id.to_string())
    }
}

impl From<String> for ObjectInput {
    fn from(id: String) -> Self {
        ObjectInput::Id(id)
    }
}

impl From<Argument> for ObjectInput {
    fn from(argument: Argument) -> Self {
        ObjectInput::Argument(argument)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub package: SuiAddress,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    /// `0x..::module::function`, with the package in long form.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", long_address(&self.package), self.module, self.function)
    }
}

impl fmt::Display for MoveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target())?;
        if !self.type_arguments.is_empty() {
            let args: Vec<String> = self.type_arguments.iter().map(|t| t.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        write!(f, "({} args)", self.arguments.len())
    }
}

/// A finished programmable transaction, ready for a [`TransactionExecutor`](crate::calls::TransactionExecutor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<MoveCall>,
    pub gas_budget: Option<u64>,
}

/// Collects inputs and Move calls into a [`ProgrammableTransaction`].
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<MoveCall>,
    gas_budget: Option<u64>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    /// Register an object input. The same object is only registered once.
    pub fn object(&mut self, id: &str) -> Result<Argument> {
        let address = parse_address(id)?;
        let existing = self
            .inputs
            .iter()
            .position(|input| matches!(input, CallArg::Object(a) if *a == address));
        match existing {
            Some(idx) => Ok(Argument::Input(idx as u16)),
            None => self.push_input(CallArg::Object(address)),
        }
    }

    /// Resolve an [`ObjectInput`] into an argument handle.
    pub fn obj(&mut self, input: impl Into<ObjectInput>) -> Result<Argument> {
        match input.into() {
            ObjectInput::Id(id) => self.object(&id),
            ObjectInput::Argument(argument) => Ok(argument),
        }
    }

    /// Register a pure input holding the BCS encoding of `value`.
    pub fn pure(&mut self, value: &MoveValue) -> Result<Argument> {
        self.push_input(CallArg::Pure(value_to_bcs(value)?))
    }

    /// Pure `0x1::string::String`: BCS of its UTF-8 bytes.
    pub fn pure_string(&mut self, value: &str) -> Result<Argument> {
        self.pure_bytes(value.as_bytes())
    }

    /// Pure `vector<u8>`.
    pub fn pure_bytes(&mut self, bytes: &[u8]) -> Result<Argument> {
        self.pure(&MoveValue::Vector(bytes.iter().copied().map(MoveValue::U8).collect()))
    }

    /// Pure `address`, accepted in short or long form.
    pub fn pure_address(&mut self, address: &str) -> Result<Argument> {
        let address = parse_address(address)?;
        self.pure(&MoveValue::Address(address))
    }

    fn push_input(&mut self, input: CallArg) -> Result<Argument> {
        if self.inputs.len() >= u16::MAX as usize {
            bail!("transaction has too many inputs");
        }
        self.inputs.push(input);
        Ok(Argument::Input((self.inputs.len() - 1) as u16))
    }

    /// Append a Move call checked against `function`, returning its result handle.
    pub fn move_call(
        &mut self,
        package: &str,
        function: &FunctionDescriptor,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<Argument> {
        function.check(type_arguments.len(), arguments.len())?;
        for argument in &arguments {
            self.check_argument(argument)?;
        }
        if self.commands.len() >= u16::MAX as usize {
            bail!("transaction has too many commands");
        }

        self.commands.push(MoveCall {
            package: parse_address(package)?,
            module: function.module.to_string(),
            function: function.name.to_string(),
            type_arguments,
            arguments,
        });
        Ok(Argument::Result((self.commands.len() - 1) as u16))
    }

    fn check_argument(&self, argument: &Argument) -> Result<()> {
        match *argument {
            Argument::Input(idx) if idx as usize >= self.inputs.len() => {
                bail!("argument refers to missing input {}", idx)
            }
            Argument::Result(idx) | Argument::NestedResult(idx, _) if idx as usize >= self.commands.len() => {
                bail!("argument refers to command {} which has not been added", idx)
            }
            _ => Ok(()),
        }
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[MoveCall] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn finish(self) -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
            gas_budget: self.gas_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: FunctionDescriptor = FunctionDescriptor {
        module: "genesis_shop",
        name: "keep",
        type_params: 0,
        parameters: &["builder"],
    };

    #[test]
    fn test_objects_are_deduplicated() {
        let mut tx = TransactionBuilder::new();
        let a = tx.object("0x5").unwrap();
        let b = tx.object(&format!("0x{:064x}", 5)).unwrap();
        let c = tx.object("0x6").unwrap();
        assert_eq!(a, Argument::Input(0));
        assert_eq!(a, b);
        assert_eq!(c, Argument::Input(1));
        assert_eq!(tx.inputs().len(), 2);
    }

    #[test]
    fn test_pure_values_are_bcs_encoded() {
        let mut tx = TransactionBuilder::new();
        let arg = tx.pure(&MoveValue::U64(500)).unwrap();
        assert_eq!(arg, Argument::Input(0));
        assert_eq!(tx.inputs()[0], CallArg::Pure(500u64.to_le_bytes().to_vec()));
    }

    #[test]
    fn test_pure_string_and_address() {
        let mut tx = TransactionBuilder::new();
        assert_eq!(tx.pure_string("helm").unwrap(), Argument::Input(0));
        assert_eq!(tx.pure_address("0x5").unwrap(), Argument::Input(1));
        // Pure inputs are never shared.
        assert_eq!(tx.pure_string("helm").unwrap(), Argument::Input(2));

        assert_eq!(tx.inputs()[0], CallArg::Pure(vec![4, b'h', b'e', b'l', b'm']));
        let mut address = vec![0u8; 32];
        address[31] = 5;
        assert_eq!(tx.inputs()[1], CallArg::Pure(address));
        assert!(tx.pure_address("0xzz").is_err());
    }

    #[test]
    fn test_move_call_returns_result_handle() {
        let mut tx = TransactionBuilder::new();
        tx.set_gas_budget(1_000);
        let builder = tx.object("0xc538").unwrap();
        let result = tx.move_call("0x42", &TARGET, vec![], vec![builder]).unwrap();
        assert_eq!(result, Argument::Result(0));

        let ptb = tx.finish();
        assert_eq!(ptb.gas_budget, Some(1_000));
        assert_eq!(ptb.commands[0].target(), format!("0x{:064x}::genesis_shop::keep", 0x42));
    }

    #[test]
    fn test_move_call_rejects_bad_arguments() {
        let mut tx = TransactionBuilder::new();
        assert!(tx.move_call("0x42", &TARGET, vec![], vec![]).is_err());
        assert!(tx.move_call("0x42", &TARGET, vec![], vec![Argument::Input(3)]).is_err());
        assert!(tx.move_call("0x42", &TARGET, vec![], vec![Argument::Result(0)]).is_err());
        assert!(tx.move_call("0x42", &TARGET, vec![TypeTag::U8], vec![Argument::GasCoin]).is_err());
        assert!(tx.move_call("not-a-package", &TARGET, vec![], vec![Argument::GasCoin]).is_err());
        assert!(tx.is_empty());
    }
}
