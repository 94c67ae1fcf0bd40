//! Witness bundle: the JSON handed to a verifier
//!
//! Carries the contract image (so the verifier knows which owners and
//! origin to bind), the Borsh-encoded outer transaction and the witness.

use anyhow::{bail, Context, Result};
use delegation::{
    derive_address, AuthorizationWitness, ContractImage, DelegatingTransaction, Signature,
    Transaction,
};
use serde::{Deserialize, Serialize};

use crate::session::SignedOuter;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WitnessBundle {
    pub image: String,
    pub sender: String,
    pub transaction: String,
    pub transaction_id: String,
    pub delegation: String,
    pub delegation_signature: String,
    pub session_signature: String,
}

/// Bundle contents after decoding
#[derive(Debug)]
pub struct DecodedBundle {
    pub image: ContractImage,
    pub transaction: Transaction,
    pub witness: AuthorizationWitness,
}

fn signature(field: &str, value: &str) -> Result<Signature> {
    let bytes = hex::decode(value).with_context(|| format!("Invalid {} encoding", field))?;
    Signature::from_slice(&bytes).with_context(|| format!("Invalid {} length", field))
}

impl WitnessBundle {
    pub fn new(image: &ContractImage, signed: &SignedOuter) -> Result<Self> {
        Ok(Self {
            image: hex::encode(image.as_bytes()),
            sender: signed.transaction.sender.to_string(),
            transaction: hex::encode(signed.transaction.to_wire()?),
            transaction_id: signed.transaction.id().to_string(),
            delegation: hex::encode(signed.witness.delegation.to_wire()?),
            delegation_signature: hex::encode(signed.witness.delegation_signature.to_bytes()),
            session_signature: hex::encode(signed.witness.session_signature.to_bytes()),
        })
    }

    /// Decode every field. The informational `sender` and `transaction_id`
    /// fields are ignored; they are recomputed from the transaction.
    pub fn decode(&self) -> Result<DecodedBundle> {
        let image_bytes = hex::decode(&self.image).context("Invalid image encoding")?;
        let image = ContractImage::from_bytes(&image_bytes).context("Invalid contract image")?;

        let tx_bytes = hex::decode(&self.transaction).context("Invalid transaction encoding")?;
        let transaction = Transaction::from_wire(&tx_bytes).context("Invalid transaction")?;

        let delegation_bytes =
            hex::decode(&self.delegation).context("Invalid delegation encoding")?;
        let delegation =
            DelegatingTransaction::from_wire(&delegation_bytes).context("Invalid delegation")?;

        Ok(DecodedBundle {
            image,
            transaction,
            witness: AuthorizationWitness {
                delegation,
                delegation_signature: signature("delegation signature", &self.delegation_signature)?,
                session_signature: signature("session signature", &self.session_signature)?,
            },
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse witness bundle")
    }
}

impl DecodedBundle {
    /// The ledger only runs an image's predicate for transactions sent
    /// from that image's address
    pub fn check_routing(&self) -> Result<()> {
        let expected = derive_address(&self.image);
        if self.transaction.sender != expected {
            bail!(
                "Transaction sender {} is not the contract address {}",
                self.transaction.sender,
                expected
            );
        }
        Ok(())
    }
}
