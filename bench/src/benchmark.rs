use crate::client::PingClient;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

/// One successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub index: usize,
    pub elapsed: Duration,
    pub reply: String,
}

/// Exactly one slot per launched call, `None` when the call failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    slots: Vec<Option<CallRecord>>,
}

impl ResultTable {
    pub fn with_slots(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
        }
    }

    pub fn from_slots(slots: Vec<Option<CallRecord>>) -> Self {
        Self { slots }
    }

    /// Stores `record` in the slot of its call index. Returns `false`, leaving
    /// the table unchanged, when the index has no slot.
    pub fn fill(&mut self, record: CallRecord) -> bool {
        match self.slots.get_mut(record.index) {
            Some(slot) => {
                *slot = Some(record);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<CallRecord>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&CallRecord> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn records(&self) -> impl Iterator<Item = &CallRecord> {
        self.slots.iter().flatten()
    }

    pub fn succeeded(&self) -> usize {
        self.records().count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkOutcome {
    pub table: ResultTable,
    /// Wall clock time of the whole batch, not the sum of call latencies.
    pub total_elapsed: Duration,
}

pub struct BenchmarkDriver {
    client: Arc<dyn PingClient>,
    concurrent_calls: usize,
    message_prefix: String,
}

impl BenchmarkDriver {
    pub fn new(client: Arc<dyn PingClient>, concurrent_calls: usize, message_prefix: &str) -> Self {
        Self {
            client,
            concurrent_calls,
            message_prefix: message_prefix.to_owned(),
        }
    }

    pub fn message_for(&self, index: usize) -> String {
        format!("{}{index}", self.message_prefix)
    }

    /// Issues all calls at once and waits for every one of them to finish.
    /// A failed call is logged and leaves its slot empty, the batch carries on.
    pub async fn run(&self) -> BenchmarkOutcome {
        let calls = self.concurrent_calls;
        info!("Starting {calls} concurrent calls...");
        let mut table = ResultTable::with_slots(calls);
        let started_at = Instant::now();
        let tasks = (0..calls)
            .map(|index| {
                let client = self.client.clone();
                let message = self.message_for(index);
                tokio::spawn(async move {
                    let call_started_at = Instant::now();
                    let result = client.ping(message).await;
                    let elapsed = call_started_at.elapsed();
                    match result {
                        Ok(response) => {
                            info!("[#{index}] Reply: {} | Time: {elapsed:?}", response.reply);
                            Some(CallRecord {
                                index,
                                elapsed,
                                reply: response.reply,
                            })
                        }
                        Err(error) => {
                            error!("[#{index}] Call has failed after {elapsed:?}: {error}");
                            None
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        let results = join_all(tasks).await;
        let total_elapsed = started_at.elapsed();

        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(Some(record)) => {
                    table.fill(record);
                }
                Ok(None) => {}
                Err(error) => error!("[#{index}] Call task has failed: {error}"),
            }
        }

        info!("Total: {total_elapsed:?} for {calls} calls");
        BenchmarkOutcome {
            table,
            total_elapsed,
        }
    }
}
