use serde::{Deserialize, Serialize};

/// How a collection proves minting authority.
///
/// Both schemes are the same authority-distribution idea: the simplest
/// collections gate minting on package provenance, collections that
/// delegate administration gate it on a freely transferable admin
/// token. The scheme is chosen once, at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintScheme {
    /// Minting requires the collection's publisher proof
    Publisher,
    /// Minting requires possession of the collection's admin token
    AdminCap,
}

/// How a collection gates the transfer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPolicy {
    /// Plain ledger ownership is sufficient; no capability check
    OwnerOnly,
    /// The holder of the transfer token may move any instance of the
    /// collection, regardless of who currently owns it
    CapabilityGated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_round_trips_through_bincode() {
        let scheme = MintScheme::AdminCap;
        let bytes = bincode::serialize(&scheme).expect("serialize");
        let back: MintScheme = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(scheme, back);

        let policy = TransferPolicy::CapabilityGated;
        let bytes = bincode::serialize(&policy).expect("serialize");
        let back: TransferPolicy = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(policy, back);
    }
}
