//! Integration tests for the ledger client
//!
//! Runs the client against an in-memory ledger and against a counting stub
//! that records every call it receives.

use std::cell::Cell;

use privacy_shield_claims::claims::{ClaimEncoder, ClaimInput, ClaimType, EncodedSubmission};
use privacy_shield_claims::ledger::{
    Claim, ClaimId, ClaimsLedger, ClientError, ContractStats, LedgerClient, LedgerError, Signed,
    Signer, SqliteLedger, SubmitClaim,
};
use privacy_shield_claims::types::{keccak256, Address};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Ledger stub that counts calls and fails every one of them
#[derive(Default)]
struct CountingLedger {
    calls: Cell<usize>,
}

impl CountingLedger {
    fn hit(&self) -> LedgerError {
        self.calls.set(self.calls.get() + 1);
        LedgerError::InvalidData("stub".to_string())
    }
}

impl ClaimsLedger for CountingLedger {
    async fn submit_encrypted_claim(&self, _tx: &Signed<SubmitClaim>) -> Result<ClaimId, LedgerError> {
        Err(self.hit())
    }

    async fn get_claim_metadata(&self, _claim_id: ClaimId) -> Result<Claim, LedgerError> {
        Err(self.hit())
    }

    async fn get_user_claims(&self, _user: &Address) -> Result<Vec<ClaimId>, LedgerError> {
        Err(self.hit())
    }

    async fn get_contract_stats(&self) -> Result<ContractStats, LedgerError> {
        Err(self.hit())
    }
}

fn encode(amount: &str, claim_type: &str, description: &str) -> EncodedSubmission {
    ClaimEncoder::default()
        .encode(&ClaimInput {
            amount: amount.to_string(),
            claim_type: claim_type.to_string(),
            description: description.to_string(),
            metadata: None,
        })
        .expect("Encoding should succeed")
        .submission
}

#[tokio::test]
async fn test_submit_without_identity_fails_before_any_ledger_call() {
    init_logging();

    let ledger = CountingLedger::default();
    let client = LedgerClient::new(&ledger);
    assert!(!client.is_connected());

    let result = client
        .submit(&encode("10", "Medical", "Lost medication"))
        .await;

    assert!(matches!(result, Err(ClientError::NotConnected)));
    assert_eq!(ledger.calls.get(), 0, "No ledger call may be made");
}

#[tokio::test]
async fn test_transport_failures_surface_without_retry() {
    let ledger = CountingLedger::default();
    let client = LedgerClient::new(&ledger).with_signer(Signer::generate());

    let result = client.get_stats().await;
    assert!(matches!(result, Err(ClientError::NetworkFailure(_))));
    assert_eq!(ledger.calls.get(), 1, "Failures must not be retried");

    let result = client
        .submit(&encode("10", "Medical", "Lost medication"))
        .await;
    assert!(matches!(result, Err(ClientError::NetworkFailure(_))));
    assert_eq!(ledger.calls.get(), 2);
}

#[tokio::test]
async fn test_medical_claim_scenario_round_trips_through_ledger() {
    init_logging();

    let owner = Signer::generate();
    let claimant = Signer::generate();
    let ledger = SqliteLedger::open_in_memory(owner.address()).unwrap();
    let client = LedgerClient::new(&ledger).with_signer(claimant.clone());

    let submission = encode("1200.50", "Medical", "Lost medication");
    assert_eq!(submission.content_hash, keccak256(b"Lost medication"));

    let pending = client.submit(&submission).await.expect("Submit should succeed");
    assert!(pending.claim_id > 0, "Claim ids are positive");

    let claim = client.get_claim(pending.claim_id).await.unwrap();
    assert_eq!(claim.claim_id, pending.claim_id);
    assert_eq!(claim.claimant, claimant.address());
    assert!(!claim.is_processed);
    assert!(!claim.is_approved);
    assert_eq!(claim.public_amount, 0);

    let fields = ledger.get_encrypted_fields(pending.claim_id).unwrap();
    assert_eq!(fields.amount_code, submission.amount_code);
    assert_eq!(
        ClaimType::from_type_code(&fields.type_code),
        Some(ClaimType::Medical)
    );
}

#[tokio::test]
async fn test_unknown_claim_id_is_not_found() {
    let ledger = SqliteLedger::open_in_memory(Address::ZERO).unwrap();
    let client = LedgerClient::new(&ledger);

    let result = client.get_claim(999).await;
    assert!(matches!(result, Err(ClientError::NotFound(999))));
}

#[tokio::test]
async fn test_ids_beyond_sqlite_range_are_not_found() {
    let ledger = SqliteLedger::open_in_memory(Address::ZERO).unwrap();
    let client = LedgerClient::new(&ledger);

    for claim_id in [i64::MAX as u64 + 1, u64::MAX] {
        let result = client.get_claim(claim_id).await;
        assert!(
            matches!(result, Err(ClientError::NotFound(id)) if id == claim_id),
            "claim {} should be NotFound, got {:?}",
            claim_id,
            result
        );
    }
}

#[tokio::test]
async fn test_address_without_claims_lists_nothing() {
    let ledger = SqliteLedger::open_in_memory(Address::ZERO).unwrap();
    let client = LedgerClient::new(&ledger);

    let claims = client
        .list_user_claims(&Signer::generate().address())
        .await
        .unwrap();
    assert!(claims.is_empty());
}

#[tokio::test]
async fn test_duplicate_submissions_are_independent_claims() {
    let ledger = SqliteLedger::open_in_memory(Address::ZERO).unwrap();
    let signer = Signer::generate();
    let client = LedgerClient::new(&ledger).with_signer(signer.clone());

    let submission = encode("50", "Other", "Scratched bumper in parking lot");
    let first = client.submit(&submission).await.unwrap();
    let second = client.submit(&submission).await.unwrap();

    assert_ne!(first.claim_id, second.claim_id);
    assert_ne!(first.tx_hash, second.tx_hash);
    assert_eq!(second.claim_id, first.claim_id + 1);

    let ids = client.list_user_claims(&signer.address()).await.unwrap();
    assert_eq!(ids, vec![first.claim_id, second.claim_id]);
}

#[tokio::test]
async fn test_claims_are_listed_per_claimant_in_order() {
    let ledger = SqliteLedger::open_in_memory(Address::ZERO).unwrap();
    let alice = Signer::generate();
    let bob = Signer::generate();

    let alice_client = LedgerClient::new(&ledger).with_signer(alice.clone());
    let bob_client = LedgerClient::new(&ledger).with_signer(bob.clone());

    let a1 = alice_client
        .submit(&encode("1", "Medical", "First alice claim"))
        .await
        .unwrap();
    let b1 = bob_client
        .submit(&encode("2", "Fire Damage", "Kitchen fire damage"))
        .await
        .unwrap();
    let a2 = alice_client
        .submit(&encode("3", "Other", "Second alice claim"))
        .await
        .unwrap();

    let alice_ids = alice_client.list_user_claims(&alice.address()).await.unwrap();
    let bob_ids = alice_client.list_user_claims(&bob.address()).await.unwrap();

    assert_eq!(alice_ids, vec![a1.claim_id, a2.claim_id]);
    assert_eq!(bob_ids, vec![b1.claim_id]);

    let stats = bob_client.get_stats().await.unwrap();
    assert_eq!(
        stats,
        ContractStats {
            total_claims: 3,
            processed_claims: 0,
            approved_claims: 0,
        }
    );
}

#[tokio::test]
async fn test_disconnect_drops_signing_identity() {
    let ledger = SqliteLedger::open_in_memory(Address::ZERO).unwrap();
    let signer = Signer::generate();
    let mut client = LedgerClient::new(&ledger).with_signer(signer.clone());

    assert_eq!(client.address(), Some(signer.address()));

    client.disconnect();
    assert_eq!(client.address(), None);

    let result = client
        .submit(&encode("10", "Medical", "Lost medication"))
        .await;
    assert!(matches!(result, Err(ClientError::NotConnected)));
    assert_eq!(ledger.get_contract_stats().await.unwrap().total_claims, 0);
}
