use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus};

/// facts produced while sweeping a loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PenaltyApplied {
        loan_id: LoanId,
        penalty_id: Uuid,
        amount: Money,
        due_date: NaiveDate,
        days_overdue: u32,
        timestamp: DateTime<Utc>,
    },
    /// penalty due but left for a human because auto-apply is off
    PenaltyProposed {
        loan_id: LoanId,
        amount: Money,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    ScheduleUnavailable {
        loan_id: LoanId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    SweepCompleted {
        as_of: NaiveDate,
        evaluated: usize,
        applied: usize,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
