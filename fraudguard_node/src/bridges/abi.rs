//! TransactionContract ABI loading

use super::RelayError;
use ethers::abi::{Abi, ParamType};
use log::{info, warn};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Parse an ABI from JSON text.
///
/// Accepts a bare ABI array or a compiler artifact with an `abi` field.
pub fn parse_abi(json: &str) -> Result<Abi, RelayError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| RelayError::Abi(format!("invalid JSON: {}", e)))?;

    let abi_value = match value {
        Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| RelayError::Abi("artifact has no `abi` field".to_string()))?,
        other => other,
    };

    serde_json::from_value(abi_value).map_err(|e| RelayError::Abi(e.to_string()))
}

/// Load the ABI at `path`; `Ok(None)` when the file does not exist
pub fn load_abi(path: impl AsRef<Path>) -> Result<Option<Abi>, RelayError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(json) => {
            let abi = parse_abi(&json)?;
            info!("Loaded TransactionContract ABI from {}", path.display());
            Ok(Some(abi))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "TransactionContract ABI file {} not found. On-chain calls are disabled.",
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(RelayError::Abi(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Check that `name` is a function taking `(address, uint256, uint256)`
pub fn ensure_record_function(abi: &Abi, name: &str) -> Result<(), RelayError> {
    let function = abi
        .function(name)
        .map_err(|_| RelayError::Abi(format!("ABI has no function `{}`", name)))?;

    let kinds: Vec<ParamType> = function.inputs.iter().map(|p| p.kind.clone()).collect();
    let expected = [ParamType::Address, ParamType::Uint(256), ParamType::Uint(256)];

    if kinds != expected {
        return Err(RelayError::Abi(format!(
            "`{}` must take (address, uint256, uint256), found ({})",
            name,
            kinds
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI_JSON: &str = include_str!("../../abi/TransactionContractABI.json");

    #[test]
    fn test_parse_bare_abi() {
        let abi = parse_abi(ABI_JSON).unwrap();
        assert!(ensure_record_function(&abi, "recordTransaction").is_ok());
    }

    #[test]
    fn test_parse_artifact() {
        let artifact = format!(r#"{{"contractName":"TransactionContract","abi":{}}}"#, ABI_JSON);
        let abi = parse_abi(&artifact).unwrap();
        assert!(abi.function("recordTransaction").is_ok());
    }

    #[test]
    fn test_rejects_wrong_signature() {
        let abi = parse_abi(ABI_JSON).unwrap();
        assert!(ensure_record_function(&abi, "transactionCount").is_err());
        assert!(ensure_record_function(&abi, "missing").is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_abi("{not json").is_err());
        assert!(parse_abi(r#"{"bytecode":"0x00"}"#).is_err());
    }

    #[test]
    fn test_missing_file_disables_relay() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_abi(dir.path().join("absent.json")).unwrap().is_none());

        let path = dir.path().join("abi.json");
        std::fs::write(&path, ABI_JSON).unwrap();
        assert!(load_abi(&path).unwrap().is_some());
    }
}
