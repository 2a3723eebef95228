// 📬 Filing queue worker
//
// Consumes {"filing": {"id": N}} messages one at a time:
//
//   load filing -> skip if COMPLETED -> dispatch on type -> process
//   -> save_incorporation (one transaction) -> best-effort side effects
//
// Side-effect failures go to the Monitor and never fail the message. The
// database lock is only ever taken inside synchronous blocks, never across
// an outbound call.

use crate::db::{
    find_bootstrap_by_identifier, find_business_by_id, find_filing_by_id, save_incorporation,
    update_filing_status,
};
use crate::entities::{FilingStatus, INCORPORATION_APPLICATION};
use crate::error::QueueError;
use crate::filing_processors::incorporation;
use crate::services::Services;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRef {
    pub id: i64,
}

/// Queue message announcing a filing ready to be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingMessage {
    pub filing: FilingRef,
}

impl FilingMessage {
    pub fn new(filing_id: i64) -> Self {
        FilingMessage {
            filing: FilingRef { id: filing_id },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Filing was already COMPLETED (redelivery)
    AlreadyCompleted,
    Incorporated { identifier: String },
}

#[derive(Clone)]
pub struct FilingWorker {
    db: Arc<Mutex<Connection>>,
    services: Services,
}

impl FilingWorker {
    pub fn new(db: Arc<Mutex<Connection>>, services: Services) -> Self {
        FilingWorker { db, services }
    }

    fn with_db<T>(&self, f: impl FnOnce(&mut Connection) -> anyhow::Result<T>) -> Result<T, QueueError> {
        let mut conn = self.db.lock().map_err(|_| QueueError::LockPoisoned)?;
        Ok(f(&mut conn)?)
    }

    /// Decode a raw queue payload and process it
    pub async fn handle_message(&self, payload: &str) -> Result<ProcessOutcome, QueueError> {
        let message: FilingMessage = serde_json::from_str(payload)?;
        self.process_filing(&message).await
    }

    pub async fn process_filing(&self, message: &FilingMessage) -> Result<ProcessOutcome, QueueError> {
        let filing_id = message.filing.id;

        let filing = self
            .with_db(|conn| find_filing_by_id(conn, filing_id))?
            .ok_or(QueueError::FilingNotFound(filing_id))?;

        if filing.is_completed() {
            tracing::info!(filing_id, "Filing already completed, skipping");
            return Ok(ProcessOutcome::AlreadyCompleted);
        }

        let business = match filing.business_id {
            Some(business_id) => self.with_db(|conn| find_business_by_id(conn, business_id))?,
            None => None,
        };

        if filing.filing_type != INCORPORATION_APPLICATION {
            tracing::warn!(filing_id, filing_type = %filing.filing_type, "No processor for filing type");
            return Err(QueueError::UnsupportedFiling(filing.filing_type));
        }

        let filing_section = filing.filing_json().get("filing").cloned().unwrap_or(Value::Null);

        let processed = incorporation::process(&*self.services.allocator, business, &filing_section, filing).await;
        let (mut business, filing) = match processed {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(filing_id, error = %e, "Filing processing failed");
                self.with_db(|conn| update_filing_status(conn, filing_id, FilingStatus::Error))?;
                return Err(e);
            }
        };

        let business_id = match self.with_db(|conn| save_incorporation(conn, &business, &filing)) {
            Ok(business_id) => business_id,
            Err(e) => {
                tracing::error!(filing_id, identifier = %business.identifier, error = %e, "Saving incorporation failed");
                self.with_db(|conn| update_filing_status(conn, filing_id, FilingStatus::Error))?;
                return Err(e);
            }
        };
        business.id = Some(business_id);
        tracing::info!(filing_id, identifier = %business.identifier, "Incorporation saved");

        let bootstrap = match filing.temp_reg.as_deref() {
            Some(temp_reg) => self.with_db(|conn| find_bootstrap_by_identifier(conn, temp_reg))?,
            None => None,
        };

        // best effort from here on
        let monitor = &self.services.monitor;
        if let Err(failure) =
            incorporation::update_affiliation(&*self.services.accounts, &business, &filing, bootstrap.as_ref()).await
        {
            monitor.capture_failure(&failure);
        }

        if let Err(failure) = incorporation::consume_nr(
            &*self.services.accounts,
            &*self.services.namex,
            &business,
            &filing,
            bootstrap.as_ref(),
        )
        .await
        {
            monitor.capture_failure(&failure);
        }

        if let Err(failure) =
            incorporation::post_process(&*self.services.business_profile, &business, &filing).await
        {
            monitor.capture_failure(&failure);
        }

        Ok(ProcessOutcome::Incorporated {
            identifier: business.identifier,
        })
    }
}

/// Drain `receiver` sequentially until every sender is dropped.
/// Failed messages are logged and dropped, not retried.
pub async fn run_worker(worker: FilingWorker, mut receiver: mpsc::Receiver<FilingMessage>) {
    tracing::info!("Filing worker started");

    while let Some(message) = receiver.recv().await {
        match worker.process_filing(&message).await {
            Ok(outcome) => tracing::debug!(filing_id = message.filing.id, ?outcome, "Message done"),
            Err(e) => tracing::error!(filing_id = message.filing.id, error = %e, "Message failed"),
        }
    }

    tracing::info!("Filing queue closed, worker stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_businesses, find_business_by_identifier, insert_bootstrap, insert_filing, setup_database};
    use crate::entities::{Filing, RegistrationBootstrap};
    use crate::test_support::{
        incorporation_filing_json, AccountCall, FakeAccounts, FakeAllocator, FakeServices, ACCOUNT, TEMP_REG,
    };
    use chrono::Utc;
    use reqwest::StatusCode;
    use serde_json::json;

    /// In-memory database holding the bootstrap and one pending filing
    fn seeded_db(filing_json: Value) -> (Arc<Mutex<Connection>>, i64) {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        insert_bootstrap(
            &conn,
            &RegistrationBootstrap {
                identifier: TEMP_REG.to_string(),
                account: ACCOUNT.to_string(),
                last_modified: Utc::now(),
            },
        )
        .unwrap();

        let mut filing = Filing::new(Some(TEMP_REG.to_string()), filing_json);
        filing.status = FilingStatus::Pending;
        let filing_id = insert_filing(&conn, &filing).unwrap();

        (Arc::new(Mutex::new(conn)), filing_id)
    }

    fn filing_status(db: &Arc<Mutex<Connection>>, filing_id: i64) -> FilingStatus {
        let conn = db.lock().unwrap();
        find_filing_by_id(&conn, filing_id).unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_incorporation_applied_end_to_end() {
        let (db, filing_id) = seeded_db(incorporation_filing_json());
        let fakes = FakeServices::new(FakeAllocator::returning(42), FakeAccounts::default());
        let worker = FilingWorker::new(db.clone(), fakes.services());

        let outcome = worker.process_filing(&FilingMessage::new(filing_id)).await.unwrap();

        assert_eq!(
            outcome,
            ProcessOutcome::Incorporated {
                identifier: "BC0000042".to_string()
            }
        );
        assert_eq!(filing_status(&db, filing_id), FilingStatus::Completed);

        {
            let conn = db.lock().unwrap();
            let business = find_business_by_identifier(&conn, "BC0000042").unwrap().unwrap();
            assert_eq!(business.offices().len(), 1);
            assert_eq!(business.party_roles().len(), 1);
            assert_eq!(business.share_classes().len(), 1);

            let filing = find_filing_by_id(&conn, filing_id).unwrap().unwrap();
            assert_eq!(filing.business_id, business.id);
            assert_eq!(filing.filing_json()["filing"]["business"]["identifier"], "BC0000042");
        }

        assert_eq!(fakes.accounts.creates().len(), 2);
        assert_eq!(fakes.accounts.deletes(), vec![(ACCOUNT.to_string(), TEMP_REG.to_string())]);
        assert_eq!(fakes.namex.call_count(), 0);
        assert_eq!(fakes.profile.calls.lock().unwrap().len(), 1);
        assert!(fakes.monitor.messages().is_empty());
    }

    #[tokio::test]
    async fn test_redelivery_is_a_no_op() {
        let (db, filing_id) = seeded_db(incorporation_filing_json());
        let fakes = FakeServices::new(FakeAllocator::returning(42), FakeAccounts::default());
        let worker = FilingWorker::new(db.clone(), fakes.services());
        let message = FilingMessage::new(filing_id);

        worker.process_filing(&message).await.unwrap();
        let second = worker.process_filing(&message).await.unwrap();

        assert_eq!(second, ProcessOutcome::AlreadyCompleted);
        assert_eq!(fakes.allocator.call_count(), 1);
        assert_eq!(count_businesses(&db.lock().unwrap()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fatal_error_marks_filing_error() {
        let (db, filing_id) = seeded_db(incorporation_filing_json());
        let fakes = FakeServices::new(FakeAllocator::failing(), FakeAccounts::default());
        let worker = FilingWorker::new(db.clone(), fakes.services());

        let err = worker.process_filing(&FilingMessage::new(filing_id)).await.unwrap_err();

        assert!(matches!(err, QueueError::Processing(_)));
        assert_eq!(filing_status(&db, filing_id), FilingStatus::Error);
        assert_eq!(count_businesses(&db.lock().unwrap()).unwrap(), 0);
        assert!(fakes.accounts.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_marks_filing_error() {
        let (db, first_id) = seeded_db(incorporation_filing_json());
        let second_id = {
            let conn = db.lock().unwrap();
            let mut filing = Filing::new(Some(TEMP_REG.to_string()), incorporation_filing_json());
            filing.status = FilingStatus::Pending;
            insert_filing(&conn, &filing).unwrap()
        };
        // both filings are handed the same corp number
        let fakes = FakeServices::new(FakeAllocator::returning(42), FakeAccounts::default());
        let worker = FilingWorker::new(db.clone(), fakes.services());

        worker.process_filing(&FilingMessage::new(first_id)).await.unwrap();
        let err = worker.process_filing(&FilingMessage::new(second_id)).await.unwrap_err();

        assert!(matches!(err, QueueError::Storage(_)));
        assert_eq!(filing_status(&db, first_id), FilingStatus::Completed);
        assert_eq!(filing_status(&db, second_id), FilingStatus::Error);
        assert_eq!(count_businesses(&db.lock().unwrap()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_affiliation_failure_is_monitored_not_fatal() {
        let (db, filing_id) = seeded_db(incorporation_filing_json());
        let accounts = FakeAccounts::default().with_create_statuses(vec![StatusCode::BAD_REQUEST]);
        let fakes = FakeServices::new(FakeAllocator::returning(42), accounts);
        let worker = FilingWorker::new(db.clone(), fakes.services());

        let outcome = worker.process_filing(&FilingMessage::new(filing_id)).await;

        assert!(outcome.is_ok());
        assert_eq!(filing_status(&db, filing_id), FilingStatus::Completed);

        let messages = fakes.monitor.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(&format!("Queue Error: Affiliation error for filing:{filing_id}")));
        assert_eq!(
            fakes.accounts.deletes(),
            vec![(ACCOUNT.to_string(), "BC0000042".to_string())]
        );
        // post-processing still ran
        assert_eq!(fakes.profile.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_nr_consumed_after_incorporation() {
        let mut filing_json = incorporation_filing_json();
        filing_json["filing"]["incorporationApplication"]["nameRequest"]["nrNumber"] = json!("NR 1234567");
        let (db, filing_id) = seeded_db(filing_json);
        let fakes = FakeServices::new(FakeAllocator::returning(42), FakeAccounts::default());
        let worker = FilingWorker::new(db, fakes.services());

        worker.process_filing(&FilingMessage::new(filing_id)).await.unwrap();

        assert_eq!(fakes.namex.call_count(), 1);
        assert!(fakes.accounts.calls().contains(&AccountCall::Token));
        assert!(fakes
            .accounts
            .deletes()
            .contains(&(ACCOUNT.to_string(), "NR 1234567".to_string())));
    }

    #[tokio::test]
    async fn test_unknown_filing_and_bad_payloads() {
        let (db, _) = seeded_db(incorporation_filing_json());
        let fakes = FakeServices::new(FakeAllocator::returning(42), FakeAccounts::default());
        let worker = FilingWorker::new(db.clone(), fakes.services());

        let missing = worker.handle_message(r#"{"filing": {"id": 999}}"#).await;
        assert!(matches!(missing, Err(QueueError::FilingNotFound(999))));

        let garbage = worker.handle_message("not json").await;
        assert!(matches!(garbage, Err(QueueError::InvalidMessage(_))));

        let other_type = {
            let conn = db.lock().unwrap();
            let filing = Filing::new(None, json!({"filing": {"header": {"name": "annualReport"}}}));
            insert_filing(&conn, &filing).unwrap()
        };
        let unsupported = worker.process_filing(&FilingMessage::new(other_type)).await;
        assert!(matches!(unsupported, Err(QueueError::UnsupportedFiling(t)) if t == "annualReport"));
    }

    #[tokio::test]
    async fn test_run_worker_drains_queue() {
        let (db, filing_id) = seeded_db(incorporation_filing_json());
        let fakes = FakeServices::new(FakeAllocator::returning(42), FakeAccounts::default());
        let worker = FilingWorker::new(db.clone(), fakes.services());

        let (sender, receiver) = mpsc::channel(4);
        sender.send(FilingMessage::new(filing_id)).await.unwrap();
        sender.send(FilingMessage::new(filing_id)).await.unwrap();
        sender.send(FilingMessage::new(12345)).await.unwrap();
        drop(sender);

        run_worker(worker, receiver).await;

        assert_eq!(filing_status(&db, filing_id), FilingStatus::Completed);
        assert_eq!(fakes.allocator.call_count(), 1);
    }

    #[test]
    fn test_message_wire_format() {
        let message: FilingMessage = serde_json::from_str(r#"{"filing": {"id": 7}}"#).unwrap();
        assert_eq!(message, FilingMessage::new(7));
        assert_eq!(serde_json::to_value(message).unwrap(), json!({"filing": {"id": 7}}));
    }
}
