#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Contract interface descriptions.
//!
//! Only the parts of an ABI the session needs are modelled: function names,
//! parameter types and state mutability. Events, constructors and fallback
//! entries are skipped. Methods are keyed by name, so overloaded functions
//! are rejected when the interface is loaded.

use crate::types::{Address, Wei};
use crate::{Result, SessionError};
use alloy_primitives::{hex, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl Mutability {
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Pure | Self::View)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_kind")]
    kind: String,
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    state_mutability: Option<Mutability>,
    constant: Option<bool>,
    payable: Option<bool>,
}

fn default_entry_kind() -> String {
    "function".to_string()
}

impl AbiEntry {
    /// Older compilers only emit `constant`/`payable` flags.
    fn mutability(&self) -> Mutability {
        self.state_mutability.unwrap_or(match (self.constant, self.payable) {
            (Some(true), _) => Mutability::View,
            (_, Some(true)) => Mutability::Payable,
            _ => Mutability::Nonpayable,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    name: String,
    inputs: Vec<AbiParam>,
    outputs: Vec<AbiParam>,
    mutability: Mutability,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<AbiParam>,
        outputs: Vec<AbiParam>,
        mutability: Mutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            mutability,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn inputs(&self) -> &[AbiParam] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[AbiParam] {
        &self.outputs
    }

    #[must_use]
    pub const fn mutability(&self) -> Mutability {
        self.mutability
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.mutability.is_read_only()
    }

    #[must_use]
    pub const fn is_payable(&self) -> bool {
        matches!(self.mutability, Mutability::Payable)
    }

    /// Checks argument count and the JSON shape of each argument against
    /// the declared input types.
    ///
    /// # Errors
    /// Returns `InvalidInvocation` naming the first mismatching parameter.
    pub fn validate_args(&self, args: &[Value]) -> Result<()> {
        if args.len() != self.inputs.len() {
            return Err(SessionError::InvalidInvocation(format!(
                "{} expects {} argument(s), got {}",
                self.name,
                self.inputs.len(),
                args.len()
            )));
        }

        self.inputs
            .iter()
            .zip(args)
            .enumerate()
            .find_map(|(index, (param, arg))| {
                check_value(&param.kind, arg).err().map(|reason| {
                    let label = if param.name.is_empty() {
                        format!("#{index}")
                    } else {
                        param.name.clone()
                    };
                    SessionError::InvalidInvocation(format!(
                        "{} argument {label} ({}): {reason}",
                        self.name, param.kind
                    ))
                })
            })
            .map_or(Ok(()), Err)
    }
}

fn check_value(kind: &str, value: &Value) -> std::result::Result<(), String> {
    if let Some(element) = kind.strip_suffix("[]") {
        return value
            .as_array()
            .ok_or_else(|| format!("expected array, got {value}"))?
            .iter()
            .try_for_each(|item| check_value(element, item));
    }

    match kind {
        "address" => value
            .as_str()
            .ok_or_else(|| format!("expected address string, got {value}"))?
            .parse::<Address>()
            .map(|_| ()),
        "bool" => value
            .is_boolean()
            .then_some(())
            .ok_or_else(|| format!("expected bool, got {value}")),
        "string" => value
            .is_string()
            .then_some(())
            .ok_or_else(|| format!("expected string, got {value}")),
        k if k.starts_with("uint") => is_unsigned(value)
            .then_some(())
            .ok_or_else(|| format!("expected unsigned integer, got {value}")),
        k if k.starts_with("int") => is_signed(value)
            .then_some(())
            .ok_or_else(|| format!("expected integer, got {value}")),
        k if k.starts_with("bytes") => value
            .as_str()
            .filter(|s| s.starts_with("0x") && hex::decode(s).is_ok())
            .map(|_| ())
            .ok_or_else(|| format!("expected 0x-prefixed hex, got {value}")),
        _ => Ok(()),
    }
}

fn is_unsigned(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.is_u64(),
        Value::String(text) => {
            !text.is_empty()
                && text.chars().all(|c| c.is_ascii_digit())
                && U256::from_str_radix(text, 10).is_ok()
        }
        _ => false,
    }
}

fn is_signed(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.is_i64() || number.is_u64(),
        Value::String(text) => {
            let digits = text.strip_prefix('-').unwrap_or(text);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractInterface {
    methods: BTreeMap<String, MethodDescriptor>,
}

impl ContractInterface {
    /// Builds an interface from a parsed ABI array.
    ///
    /// # Errors
    /// Returns `ConfigError` if the ABI is not an array of entries, a
    /// function has no name, or a name is declared twice.
    pub fn from_abi(abi: &Value) -> Result<Self> {
        let entries: Vec<AbiEntry> = serde_json::from_value(abi.clone())
            .map_err(|e| SessionError::ConfigError(format!("malformed ABI: {e}")))?;

        entries
            .into_iter()
            .filter(|entry| entry.kind == "function")
            .try_fold(Self::default(), |mut interface, entry| {
                let mutability = entry.mutability();
                let name = entry.name.ok_or_else(|| {
                    SessionError::ConfigError("ABI function entry without a name".to_string())
                })?;
                if interface.methods.contains_key(&name) {
                    return Err(SessionError::ConfigError(format!(
                        "overloaded method '{name}' is not supported"
                    )));
                }
                interface.methods.insert(
                    name.clone(),
                    MethodDescriptor::new(name, entry.inputs, entry.outputs, mutability),
                );
                Ok(interface)
            })
    }

    /// # Errors
    /// Returns `SerializationError` for invalid JSON, otherwise see [`Self::from_abi`].
    pub fn from_abi_json(json: &str) -> Result<Self> {
        let abi: Value = serde_json::from_str(json)?;
        Self::from_abi(&abi)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Resolves a method for a read-only call.
    ///
    /// # Errors
    /// Returns `InvalidInvocation` for unknown or state-changing methods and
    /// argument mismatches.
    pub fn prepare_call(&self, method: &str, args: &[Value]) -> Result<&MethodDescriptor> {
        let descriptor = self.lookup(method)?;
        if !descriptor.is_read_only() {
            return Err(SessionError::InvalidInvocation(format!(
                "{method} changes contract state and must be sent as a transaction"
            )));
        }
        descriptor.validate_args(args)?;
        Ok(descriptor)
    }

    /// Resolves a method for a transaction.
    ///
    /// # Errors
    /// Returns `InvalidInvocation` for unknown or read-only methods, a
    /// payment attached to a non-payable method, and argument mismatches.
    pub fn prepare_send(
        &self,
        method: &str,
        args: &[Value],
        value: Option<Wei>,
    ) -> Result<&MethodDescriptor> {
        let descriptor = self.lookup(method)?;
        if descriptor.is_read_only() {
            return Err(SessionError::InvalidInvocation(format!(
                "{method} is read-only and must be called, not sent"
            )));
        }
        if value.is_some_and(|amount| !amount.is_zero()) && !descriptor.is_payable() {
            return Err(SessionError::InvalidInvocation(format!(
                "{method} is not payable but a value was attached"
            )));
        }
        descriptor.validate_args(args)?;
        Ok(descriptor)
    }

    fn lookup(&self, method: &str) -> Result<&MethodDescriptor> {
        self.methods.get(method).ok_or_else(|| {
            SessionError::InvalidInvocation(format!("contract has no method named '{method}'"))
        })
    }
}
