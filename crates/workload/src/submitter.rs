//! Builds signed batches for key actions and hands them to a connection.

use crate::{Connection, WorkloadError};
use intkey_types::{
    create_batch, create_intkey_transaction, BatchId, BatchList, IntKeyVerb, KeyPair,
    TransactionId,
};

/// What to do to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction<'a> {
    /// Set a fresh key to 0, with no dependencies.
    Start { name: &'a str },
    /// Increment an existing key by 1 after `dependency`.
    Increment {
        name: &'a str,
        dependency: TransactionId,
    },
}

impl KeyAction<'_> {
    pub fn name(&self) -> &str {
        match self {
            KeyAction::Start { name } | KeyAction::Increment { name, .. } => name,
        }
    }
}

/// Ids produced by one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub batch_id: BatchId,
    /// Id of the single transaction in the batch; the key's next dependency.
    pub transaction_id: TransactionId,
}

/// Signs one-transaction batches with the workload's key.
#[derive(Debug)]
pub struct BatchSubmitter {
    signer: KeyPair,
}

impl BatchSubmitter {
    pub fn new(signer: KeyPair) -> Self {
        Self { signer }
    }

    /// Build the batch for `action` without sending it.
    pub fn prepare(
        &self,
        action: &KeyAction<'_>,
    ) -> Result<(Submission, BatchList), WorkloadError> {
        let (verb, value, dependencies) = match *action {
            KeyAction::Start { .. } => (IntKeyVerb::Set, 0, Vec::new()),
            KeyAction::Increment { dependency, .. } => (IntKeyVerb::Inc, 1, vec![dependency]),
        };

        let txn =
            create_intkey_transaction(verb, action.name(), value, dependencies, &self.signer)?;
        let transaction_id = txn.id();
        let batch = create_batch(vec![txn], &self.signer)?;
        let submission = Submission {
            batch_id: batch.id(),
            transaction_id,
        };

        Ok((submission, BatchList::single(batch)))
    }

    /// Build the batch for `action` and send it on `connection`.
    pub fn submit(
        &self,
        action: &KeyAction<'_>,
        connection: &dyn Connection,
    ) -> Result<Submission, WorkloadError> {
        let (submission, batches) = self.prepare(action)?;
        connection
            .send(&batches)
            .map_err(|source| WorkloadError::Send {
                url: connection.url().to_string(),
                source,
            })?;
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingConnection;
    use intkey_types::test_utils::test_keypair;
    use intkey_types::IntKeyPayload;

    #[test]
    fn test_start_sends_set_zero() {
        let submitter = BatchSubmitter::new(test_keypair());
        let conn = RecordingConnection::new("tcp://a");

        let submission = submitter
            .submit(&KeyAction::Start { name: "k" }, &conn)
            .unwrap();

        let sent = conn.sent();
        assert_eq!(sent.len(), 1);
        let batch = &sent[0].batches[0];
        assert!(batch.verify());
        assert_eq!(batch.id(), submission.batch_id);
        assert_eq!(batch.transactions[0].id(), submission.transaction_id);
        assert!(batch.transactions[0].header.dependencies.is_empty());
        assert_eq!(
            batch.transactions[0].intkey_payload().unwrap(),
            IntKeyPayload::new(IntKeyVerb::Set, "k", 0)
        );
    }

    #[test]
    fn test_increment_depends_on_previous() {
        let submitter = BatchSubmitter::new(test_keypair());
        let conn = RecordingConnection::new("tcp://a");

        let first = submitter
            .submit(&KeyAction::Start { name: "k" }, &conn)
            .unwrap();
        submitter
            .submit(
                &KeyAction::Increment {
                    name: "k",
                    dependency: first.transaction_id,
                },
                &conn,
            )
            .unwrap();

        let txn = &conn.sent()[1].batches[0].transactions[0];
        assert_eq!(txn.header.dependencies, vec![first.transaction_id]);
        assert_eq!(
            txn.intkey_payload().unwrap(),
            IntKeyPayload::new(IntKeyVerb::Inc, "k", 1)
        );
    }

    #[test]
    fn test_send_failure_is_reported() {
        let submitter = BatchSubmitter::new(test_keypair());
        let conn = RecordingConnection::new("tcp://a");
        conn.set_failing(true);

        let err = submitter
            .submit(&KeyAction::Start { name: "k" }, &conn)
            .unwrap_err();

        assert!(matches!(err, WorkloadError::Send { url, .. } if url == "tcp://a"));
    }
}
