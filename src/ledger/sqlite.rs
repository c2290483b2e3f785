//! Local claims ledger backed by SQLite
//!
//! One database file is one deployed ledger instance. The instance enforces
//! the contract rules itself: sequential claim identifiers starting at 1,
//! signature-authenticated claimants, replay rejection, and one-shot
//! processing by the owner.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::ledger::{
    Claim, ClaimId, ClaimsLedger, ContractStats, LedgerError, ProcessClaim, Signed, SubmitClaim,
};
use crate::types::Address;

/// Opaque submission fields as stored by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFields {
    pub amount_code: [u8; 32],
    pub type_code: [u8; 32],
    pub content_hash: [u8; 32],
    pub metadata: Option<Vec<u8>>,
}

/// SQLite-backed ledger instance
pub struct SqliteLedger {
    conn: Mutex<Connection>,
    address: Address,
    owner: Address,
    path: Option<PathBuf>,
}

impl SqliteLedger {
    /// Initialise a fresh ledger at `path`
    ///
    /// Fails with [`LedgerError::AlreadyDeployed`] if the file exists.
    pub fn create<P: AsRef<Path>>(
        path: P,
        owner: Address,
        address: Address,
    ) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(LedgerError::AlreadyDeployed(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        log::info!("Creating ledger database: {}", path.display());

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        conn.execute(
            "INSERT INTO ledger_info (id, address, owner, deployed_at) VALUES (1, ?1, ?2, ?3)",
            params![address.to_string(), owner.to_string(), now_secs()],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            address,
            owner,
            path: Some(path.to_path_buf()),
        })
    }

    /// Reopen a ledger created earlier with [`SqliteLedger::create`]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LedgerError::NotDeployed(path.to_path_buf()));
        }

        log::debug!("Opening ledger database: {}", path.display());

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        let (address, owner): (String, String) = conn
            .query_row(
                "SELECT address, owner FROM ledger_info WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| LedgerError::NotDeployed(path.to_path_buf()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            address: address.parse::<Address>().map_err(LedgerError::InvalidData)?,
            owner: owner.parse::<Address>().map_err(LedgerError::InvalidData)?,
            path: Some(path.to_path_buf()),
        })
    }

    /// Throwaway in-memory ledger (address is the zero address)
    pub fn open_in_memory(owner: Address) -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        conn.execute(
            "INSERT INTO ledger_info (id, address, owner, deployed_at) VALUES (1, ?1, ?2, ?3)",
            params![Address::ZERO.to_string(), owner.to_string(), now_secs()],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            address: Address::ZERO,
            owner,
            path: None,
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), LedgerError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS ledger_info (
                id INTEGER PRIMARY KEY CHECK(id = 1),
                address TEXT NOT NULL,
                owner TEXT NOT NULL,
                deployed_at INTEGER NOT NULL
            )",
            [],
        )?;

        // AUTOINCREMENT keeps identifiers strictly increasing from 1
        conn.execute(
            "CREATE TABLE IF NOT EXISTS claims (
                claim_id INTEGER PRIMARY KEY AUTOINCREMENT,
                claimant TEXT NOT NULL,
                encrypted_amount BLOB NOT NULL,
                encrypted_type BLOB NOT NULL,
                data_hash BLOB NOT NULL,
                metadata BLOB,
                submission_time INTEGER NOT NULL,
                is_processed BOOLEAN NOT NULL DEFAULT 0,
                is_approved BOOLEAN NOT NULL DEFAULT 0,
                public_amount TEXT NOT NULL DEFAULT '0',
                tx_hash TEXT NOT NULL UNIQUE
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_claims_claimant ON claims(claimant)",
            [],
        )?;

        log::debug!("Ledger schema initialized");

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LedgerError> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::InvalidData("ledger connection poisoned".to_string()))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Database file backing this instance (None when in memory)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Identifier the next accepted claim will receive
    pub fn next_claim_id(&self) -> Result<ClaimId, LedgerError> {
        let conn = self.lock()?;
        let seq: Option<i64> = conn
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = 'claims'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(seq.unwrap_or(0) as ClaimId + 1)
    }

    /// Opaque fields recorded for a claim
    pub fn get_encrypted_fields(&self, claim_id: ClaimId) -> Result<RecordedFields, LedgerError> {
        let id = row_id(claim_id)?;
        let conn = self.lock()?;
        let row: Option<(Vec<u8>, Vec<u8>, Vec<u8>, Option<Vec<u8>>)> = conn
            .query_row(
                "SELECT encrypted_amount, encrypted_type, data_hash, metadata
                 FROM claims WHERE claim_id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let (amount, claim_type, hash, metadata) =
            row.ok_or(LedgerError::ClaimNotFound(claim_id))?;

        Ok(RecordedFields {
            amount_code: to_word(amount)?,
            type_code: to_word(claim_type)?,
            content_hash: to_word(hash)?,
            metadata,
        })
    }

    /// Owner-only: mark a claim processed, with its approval and public amount
    ///
    /// Each claim can be processed once.
    pub async fn process_claim(&self, tx: &Signed<ProcessClaim>) -> Result<Claim, LedgerError> {
        let caller = tx.verify()?;
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(caller));
        }

        let order = &tx.payload;
        let id = row_id(order.claim_id)?;
        let mut conn = self.lock()?;
        let db_tx = conn.transaction()?;

        let claim = query_claim(&db_tx, order.claim_id)?
            .ok_or(LedgerError::ClaimNotFound(order.claim_id))?;
        if claim.is_processed {
            return Err(LedgerError::AlreadyProcessed(order.claim_id));
        }

        db_tx.execute(
            "UPDATE claims SET is_processed = 1, is_approved = ?1, public_amount = ?2
             WHERE claim_id = ?3",
            params![
                order.approved,
                order.public_amount.to_string(),
                id
            ],
        )?;
        db_tx.commit()?;

        log::info!(
            "Claim {} processed (approved={})",
            order.claim_id,
            order.approved
        );

        Ok(Claim {
            is_processed: true,
            is_approved: order.approved,
            public_amount: order.public_amount,
            ..claim
        })
    }
}

impl ClaimsLedger for SqliteLedger {
    async fn submit_encrypted_claim(
        &self,
        tx: &Signed<SubmitClaim>,
    ) -> Result<ClaimId, LedgerError> {
        let claimant = tx.verify()?;
        let tx_hash = tx.tx_hash()?.to_string();
        let submission = &tx.payload.submission;

        let mut conn = self.lock()?;
        let db_tx = conn.transaction()?;

        let seen: Option<i64> = db_tx
            .query_row(
                "SELECT claim_id FROM claims WHERE tx_hash = ?1",
                params![tx_hash],
                |row| row.get(0),
            )
            .optional()?;
        if seen.is_some() {
            return Err(LedgerError::DuplicateTransaction(tx_hash));
        }

        db_tx.execute(
            "INSERT INTO claims (claimant, encrypted_amount, encrypted_type, data_hash,
             metadata, submission_time, tx_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                claimant.to_string(),
                &submission.amount_code[..],
                &submission.type_code[..],
                &submission.content_hash[..],
                submission.metadata.as_deref(),
                now_secs(),
                tx_hash,
            ],
        )?;
        let claim_id = db_tx.last_insert_rowid() as ClaimId;
        db_tx.commit()?;

        log::info!("Claim {} recorded for {} (tx {})", claim_id, claimant, tx_hash);

        Ok(claim_id)
    }

    async fn get_claim_metadata(&self, claim_id: ClaimId) -> Result<Claim, LedgerError> {
        let conn = self.lock()?;
        query_claim(&conn, claim_id)?.ok_or(LedgerError::ClaimNotFound(claim_id))
    }

    async fn get_user_claims(&self, user: &Address) -> Result<Vec<ClaimId>, LedgerError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT claim_id FROM claims WHERE claimant = ?1 ORDER BY claim_id")?;
        let ids = stmt.query_map(params![user.to_string()], |row| row.get::<_, u64>(0))?;

        let result: Result<Vec<_>, _> = ids.collect();
        Ok(result?)
    }

    async fn get_contract_stats(&self) -> Result<ContractStats, LedgerError> {
        let conn = self.lock()?;
        let (total, processed, approved): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_processed), 0), COALESCE(SUM(is_approved), 0)
             FROM claims",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(ContractStats {
            total_claims: total as u64,
            processed_claims: processed as u64,
            approved_claims: approved as u64,
        })
    }
}

fn query_claim(conn: &Connection, claim_id: ClaimId) -> Result<Option<Claim>, LedgerError> {
    let id = row_id(claim_id)?;
    let claim = conn
        .query_row(
            "SELECT claim_id, claimant, submission_time, is_processed, is_approved, public_amount
             FROM claims WHERE claim_id = ?1",
            params![id],
            |row| {
                let claimant: String = row.get(1)?;
                let public_amount: String = row.get(5)?;
                Ok(Claim {
                    claim_id: row.get(0)?,
                    claimant: claimant
                        .parse::<Address>()
                        .map_err(|e| conversion_error(1, e))?,
                    submission_time: row.get(2)?,
                    is_processed: row.get(3)?,
                    is_approved: row.get(4)?,
                    public_amount: public_amount
                        .parse::<u128>()
                        .map_err(|e| conversion_error(5, e.to_string()))?,
                })
            },
        )
        .optional()?;

    Ok(claim)
}

/// SQLite rowids are signed; ids beyond `i64::MAX` are never issued
fn row_id(claim_id: ClaimId) -> Result<i64, LedgerError> {
    i64::try_from(claim_id).map_err(|_| LedgerError::ClaimNotFound(claim_id))
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(message),
    )
}

fn to_word(bytes: Vec<u8>) -> Result<[u8; 32], LedgerError> {
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| {
            LedgerError::InvalidData(format!("expected 32 bytes, got {}", v.len()))
        })
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
