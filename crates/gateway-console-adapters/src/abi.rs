use std::str::FromStr;

use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{Address, Bytes, FixedBytes, I256, U256};
use serde_json::Value;

use gateway_console_core::{AbiPort, ContractBinding, MethodCall, PortError};

#[derive(Debug, Clone, Copy, Default)]
pub struct AbiAdapter;

impl AbiPort for AbiAdapter {
    fn encode_call(
        &self,
        contract: &ContractBinding,
        method: &str,
        args: &[String],
    ) -> Result<MethodCall, PortError> {
        let function = select_function(contract, method)?;
        if function.inputs.len() != args.len() {
            return Err(PortError::Validation(format!(
                "argument count mismatch: expected {}, got {}",
                function.inputs.len(),
                args.len()
            )));
        }

        let mut dyn_args = Vec::with_capacity(args.len());
        for (input, arg) in function.inputs.iter().zip(args.iter()) {
            let ty: DynSolType = input.ty.parse().map_err(|e| {
                PortError::Validation(format!("unsupported type '{}': {e}", input.ty))
            })?;
            let value = parse_dyn_value(&arg_literal(arg, &ty), &ty).map_err(|e| {
                PortError::Validation(format!("arg '{}' parse failed: {e}", input.name))
            })?;
            dyn_args.push(value);
        }

        let encoded = function
            .abi_encode_input(&dyn_args)
            .map_err(|e| PortError::Validation(format!("abi encoding failed: {e}")))?;
        Ok(MethodCall {
            to: contract.address,
            method: function.name.clone(),
            args: args.to_vec(),
            data: Bytes::from(encoded),
        })
    }

    fn decode_output(
        &self,
        contract: &ContractBinding,
        method: &str,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, PortError> {
        select_function(contract, method)?
            .abi_decode_output(data, true)
            .map_err(|e| PortError::Validation(format!("abi decoding failed: {e}")))
    }
}

/// Accepts a bare name (first overload wins) or a full `name(types)`
/// signature.
fn select_function<'a>(contract: &'a ContractBinding, method: &str) -> Result<&'a Function, PortError> {
    let (method_name, full_sig) = match method.split_once('(') {
        Some((name, _)) => (name, Some(method)),
        None => (method, None),
    };

    let candidates = contract.abi.function(method_name).ok_or_else(|| {
        PortError::Validation(format!("method not found on {}: {method_name}", contract.name))
    })?;

    if let Some(full_sig) = full_sig {
        return candidates
            .iter()
            .find(|f| f.signature() == full_sig)
            .ok_or_else(|| PortError::Validation(format!("method signature not found: {full_sig}")));
    }

    candidates
        .first()
        .ok_or_else(|| PortError::Validation(format!("method has no overloads: {method_name}")))
}

/// Scalar arguments are taken verbatim; only array and tuple arguments are
/// read as JSON.
fn arg_literal(arg: &str, ty: &DynSolType) -> Value {
    match ty {
        DynSolType::Array(_) | DynSolType::FixedArray(..) | DynSolType::Tuple(_) => {
            serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_owned()))
        }
        _ => Value::String(arg.to_owned()),
    }
}

fn parse_dyn_value(value: &Value, ty: &DynSolType) -> Result<DynSolValue, String> {
    match ty {
        DynSolType::Bool => match value {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            Value::String(s) if s == "true" || s == "false" => Ok(DynSolValue::Bool(s == "true")),
            _ => Err("expected bool".to_owned()),
        },
        DynSolType::Uint(bits) => match value {
            Value::String(s) => U256::from_str(s)
                .map(|x| DynSolValue::Uint(x, *bits))
                .map_err(|e| format!("invalid uint: {e}")),
            Value::Number(n) => U256::from_str(&n.to_string())
                .map(|x| DynSolValue::Uint(x, *bits))
                .map_err(|e| format!("invalid uint: {e}")),
            _ => Err("expected uint string/number".to_owned()),
        },
        DynSolType::Int(bits) => match value {
            Value::String(s) => I256::from_str(s)
                .map(|x| DynSolValue::Int(x, *bits))
                .map_err(|e| format!("invalid int: {e}")),
            Value::Number(n) => I256::from_str(&n.to_string())
                .map(|x| DynSolValue::Int(x, *bits))
                .map_err(|e| format!("invalid int: {e}")),
            _ => Err("expected int string/number".to_owned()),
        },
        DynSolType::Address => value
            .as_str()
            .ok_or_else(|| "expected address string".to_owned())
            .and_then(|s| {
                Address::from_str(s)
                    .map(DynSolValue::Address)
                    .map_err(|e| format!("invalid address: {e}"))
            }),
        DynSolType::FixedBytes(size) => value
            .as_str()
            .ok_or_else(|| "expected fixed bytes string".to_owned())
            .and_then(|s| {
                let raw = Bytes::from_str(s).map_err(|e| format!("invalid fixed bytes: {e}"))?;
                if raw.len() != *size {
                    return Err(format!("expected {size} bytes, got {}", raw.len()));
                }
                let mut word = FixedBytes::<32>::ZERO;
                word.0[..*size].copy_from_slice(&raw);
                Ok(DynSolValue::FixedBytes(word, *size))
            }),
        DynSolType::Bytes => value
            .as_str()
            .ok_or_else(|| "expected bytes string".to_owned())
            .and_then(|s| {
                Bytes::from_str(s)
                    .map(|x| DynSolValue::Bytes(x.into()))
                    .map_err(|e| format!("invalid bytes: {e}"))
            }),
        DynSolType::String => match value {
            Value::String(s) => Ok(DynSolValue::String(s.clone())),
            other => Ok(DynSolValue::String(other.to_string())),
        },
        DynSolType::Array(inner) => {
            let arr = value
                .as_array()
                .ok_or_else(|| "expected array for dynamic array".to_owned())?;
            arr.iter()
                .map(|val| parse_dyn_value(val, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Array)
        }
        DynSolType::FixedArray(inner, size) => {
            let arr = value
                .as_array()
                .ok_or_else(|| "expected array for fixed array".to_owned())?;
            if arr.len() != *size {
                return Err(format!(
                    "fixed array length mismatch: expected {}, got {}",
                    size,
                    arr.len()
                ));
            }
            arr.iter()
                .map(|val| parse_dyn_value(val, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }
        DynSolType::Tuple(inner) => {
            let arr = value
                .as_array()
                .ok_or_else(|| "expected tuple array".to_owned())?;
            if arr.len() != inner.len() {
                return Err(format!(
                    "tuple length mismatch: expected {}, got {}",
                    inner.len(),
                    arr.len()
                ));
            }
            arr.iter()
                .zip(inner.iter())
                .map(|(val, inner_ty)| parse_dyn_value(val, inner_ty))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }
        _ => Err("type not supported by the method form".to_owned()),
    }
}
