//! The decode boundary.
//!
//! Chain-family decoders (EVM ABI, TON cells, Solana instructions, ...)
//! implement `CallDecoder` and are registered under a `"<Type> <Version>"`
//! key. `ProposalDecoder` drives them over a whole proposal and converts
//! every failure into data, so one bad call never aborts its siblings.

use crate::context::{FieldContext, TypeAndVersion};
use crate::decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal};
use crate::error::{DecodeError, RegistryError};
use crate::proposal::{ProposalInput, Transaction};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Decodes one raw call for a specific contract interface.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; a registry is shared by every
/// describe run.
pub trait CallDecoder: Send + Sync {
    fn decode(
        &self,
        chain_selector: u64,
        address: &str,
        data: &[u8],
        additional_fields: &serde_json::Value,
    ) -> Result<DecodedCall, DecodeError>;
}

/// Blanket impl so closures can be used as decoders.
impl<F> CallDecoder for F
where
    F: Fn(u64, &str, &[u8], &serde_json::Value) -> Result<DecodedCall, DecodeError> + Send + Sync,
{
    fn decode(
        &self,
        chain_selector: u64,
        address: &str,
        data: &[u8],
        additional_fields: &serde_json::Value,
    ) -> Result<DecodedCall, DecodeError> {
        self(chain_selector, address, data, additional_fields)
    }
}

/// Decoders keyed by `"<Type> <Version>"`.
///
/// Meant to be filled during setup and only read afterwards; the lock makes
/// a late registration safe but it is not the expected usage.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: RwLock<BTreeMap<String, Arc<dyn CallDecoder>>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoder. Fails if the key is already taken.
    pub fn register(
        &self,
        tv: &TypeAndVersion,
        decoder: Arc<dyn CallDecoder>,
    ) -> Result<(), RegistryError> {
        let key = tv.to_string();
        let mut decoders = self.decoders.write().unwrap_or_else(PoisonError::into_inner);
        if decoders.contains_key(&key) {
            return Err(RegistryError::AlreadyExists { key });
        }
        debug!(interface = %key, "registered call decoder");
        decoders.insert(key, decoder);
        Ok(())
    }

    pub fn get(&self, tv: &TypeAndVersion) -> Option<Arc<dyn CallDecoder>> {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tv.to_string())
            .cloned()
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.decoders.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes proposals call by call, never failing as a whole.
#[derive(Clone)]
pub struct ProposalDecoder {
    registry: Arc<DecoderRegistry>,
}

impl ProposalDecoder {
    pub fn new(registry: Arc<DecoderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Decode one transaction. Errors become a failed `DecodedCall`.
    pub fn decode_call(
        &self,
        chain_selector: u64,
        tx: &Transaction,
        fields: &FieldContext,
    ) -> DecodedCall {
        match self.try_decode_call(chain_selector, tx, fields) {
            Ok(mut call) => {
                if call.address.is_empty() {
                    call.address = tx.to.clone();
                }
                call
            }
            Err(err) => {
                warn!(chain_selector, address = %tx.to, error = %err, "call decode failed");
                DecodedCall::failed(&tx.to, err)
            }
        }
    }

    fn try_decode_call(
        &self,
        chain_selector: u64,
        tx: &Transaction,
        fields: &FieldContext,
    ) -> Result<DecodedCall, DecodeError> {
        let tv = self.resolve_interface(chain_selector, tx, fields)?;
        let decoder = self.registry.get(&tv).ok_or_else(|| DecodeError::AbiNotFound {
            type_and_version: tv.to_string(),
        })?;
        decoder.decode(chain_selector, &tx.to, &tx.data, &tx.additional_fields)
    }

    /// The address book wins; a transaction's own `contractType` is used only
    /// when it carries a version (`"<Type> <Version>"`).
    fn resolve_interface(
        &self,
        chain_selector: u64,
        tx: &Transaction,
        fields: &FieldContext,
    ) -> Result<TypeAndVersion, DecodeError> {
        if let Some(tv) = fields.get(chain_selector, &tx.to) {
            return Ok(tv.clone());
        }
        if let Ok(tv) = tx.contract_type.parse::<TypeAndVersion>() {
            return Ok(tv);
        }
        let contract = if tx.contract_type.is_empty() {
            tx.to.clone()
        } else {
            tx.contract_type.clone()
        };
        Err(DecodeError::UnknownContractInterface { contract })
    }

    /// Decode N transactions into exactly N calls, in input order.
    pub fn decode_batch(
        &self,
        chain_selector: u64,
        txs: &[&Transaction],
        fields: &FieldContext,
    ) -> Vec<DecodedCall> {
        txs.iter()
            .map(|tx| self.decode_call(chain_selector, tx, fields))
            .collect()
    }

    /// Decode every batch of a proposal.
    pub fn decode_proposal<P>(&self, proposal: &P, fields: &FieldContext) -> DecodedProposal
    where
        P: ProposalInput + ?Sized,
    {
        let header = proposal.header();
        let batch_operations = proposal
            .batches()
            .into_iter()
            .map(|batch| DecodedBatchOperation {
                chain_selector: batch.chain_selector,
                calls: self.decode_batch(batch.chain_selector, &batch.transactions, fields),
            })
            .collect();
        DecodedProposal {
            kind: header.kind,
            version: header.version,
            description: header.description,
            valid_until: header.valid_until,
            chain_metadata: header.chain_metadata,
            batch_operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{NamedValue, Value};

    const CHAIN: u64 = 16448340667252469081;

    /// Stand-in for a cell decoder: the payload is `queryID,role,account`.
    fn grant_role_decoder(
        _chain: u64,
        address: &str,
        data: &[u8],
        _extra: &serde_json::Value,
    ) -> Result<DecodedCall, DecodeError> {
        let text = std::str::from_utf8(data).map_err(|_| DecodeError::InvalidCallData {
            reason: "invalid cell BOC data".into(),
        })?;
        let parts: Vec<&str> = text.split(',').collect();
        let [query_id, role, account] = parts.as_slice() else {
            return Err(DecodeError::InvalidCallData {
                reason: "invalid cell BOC data".into(),
            });
        };
        Ok(DecodedCall::new(
            address,
            "RBACTimelock::GrantRole(queryID, role, account)",
            vec![
                NamedValue::new("QueryID", Value::simple(*query_id)),
                NamedValue::new("Role", Value::simple(*role)),
                NamedValue::new("Account", Value::address(*account)),
            ],
            vec![],
        ))
    }

    fn setup() -> (ProposalDecoder, FieldContext) {
        let registry = Arc::new(DecoderRegistry::new());
        registry
            .register(&TypeAndVersion::new("RBACTimelock", "1.0.0"), Arc::new(grant_role_decoder))
            .unwrap();
        let mut fields = FieldContext::new();
        fields.insert(CHAIN, "EQtimelock", TypeAndVersion::new("RBACTimelock", "1.0.0"));
        fields.insert(CHAIN, "EQunregistered", TypeAndVersion::new("Router", "9.9.9"));
        (ProposalDecoder::new(registry), fields)
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = DecoderRegistry::new();
        let tv = TypeAndVersion::new("MCMS", "1.0.0");
        registry.register(&tv, Arc::new(grant_role_decoder)).unwrap();
        let err = registry.register(&tv, Arc::new(grant_role_decoder)).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyExists { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn grant_role_decodes() {
        let (decoder, fields) = setup();
        let tx = Transaction::new("EQtimelock", b"1,R,EQaccount".to_vec());
        let call = decoder.decode_call(CHAIN, &tx, &fields);
        assert!(!call.decode_failed);
        assert_eq!(call.address, "EQtimelock");
        assert!(call.method.starts_with("RBACTimelock::GrantRole"));
        assert_eq!(call.inputs[0], NamedValue::new("QueryID", Value::simple("1")));
        assert_eq!(call.inputs[2], NamedValue::new("Account", Value::address("EQaccount")));
    }

    #[test]
    fn batch_keeps_length_and_order_when_some_calls_fail() {
        let (decoder, fields) = setup();
        let txs = vec![
            Transaction::new("EQtimelock", vec![0xff, 0xfe]),
            Transaction::new("EQtimelock", b"2,R,EQa".to_vec()),
            Transaction::new("EQunregistered", b"3,R,EQb".to_vec()),
            Transaction::new("EQnobody", b"4,R,EQc".to_vec()),
            Transaction::new("EQtimelock", b"5,R,EQd".to_vec()),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let calls = decoder.decode_batch(CHAIN, &refs, &fields);

        assert_eq!(calls.len(), 5);
        for (call, tx) in calls.iter().zip(&txs) {
            assert_eq!(call.address, tx.to);
        }
        assert!(calls[0].decode_failed);
        assert!(calls[0].method.contains("invalid cell BOC data"));
        assert!(calls[0].inputs.is_empty());

        assert!(!calls[1].decode_failed);
        assert_eq!(calls[1].inputs[0].value, Value::simple("2"));

        assert!(calls[2].method.contains("ABI not found for type and version Router 9.9.9"));
        assert!(calls[3].method.contains("unknown contract interface: EQnobody"));
        assert!(!calls[4].decode_failed);
    }

    #[test]
    fn contract_type_with_version_is_used_when_address_unknown() {
        let (decoder, fields) = setup();
        let tx = Transaction::new("EQelsewhere", b"1,R,EQa".to_vec())
            .with_contract_type("RBACTimelock 1.0.0");
        let call = decoder.decode_call(CHAIN, &tx, &fields);
        assert!(!call.decode_failed);

        let tx = Transaction::new("EQelsewhere", vec![]).with_contract_type("RBACTimelock");
        let call = decoder.decode_call(CHAIN, &tx, &fields);
        assert_eq!(call.method, "unknown contract interface: RBACTimelock");
    }
}
