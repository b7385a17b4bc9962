use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::NaiveDate;
use log::debug;

use crate::errors::Result;
use crate::loan::Loan;
use crate::reconcile::{reconcile_loan, ReconciledSchedule};
use crate::schedule::ScheduleGenerator;
use crate::types::LoanId;

/// cache key; a new payment or a new day yields a new key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub loan_id: LoanId,
    pub payments_len: usize,
    pub as_of: NaiveDate,
}

impl CacheKey {
    pub fn for_loan(loan: &Loan, as_of: NaiveDate) -> Self {
        Self {
            loan_id: loan.id.clone(),
            payments_len: loan.payments.len(),
            as_of,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// memoizes reconciled schedules so several views of the same loan share one
/// computation
///
/// Term edits that leave the payment count unchanged are not visible in the
/// key; callers must `invalidate` the loan when its record changes.
#[derive(Debug, Default)]
pub struct ReconciliationCache {
    generator: ScheduleGenerator,
    entries: HashMap<CacheKey, ReconciledSchedule>,
    hits: u64,
    misses: u64,
}

impl ReconciliationCache {
    pub fn new(generator: ScheduleGenerator) -> Self {
        Self {
            generator,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// cached reconciliation, computing it on a miss
    ///
    /// Errors are not cached: a loan with invalid terms is retried on the
    /// next call.
    pub fn get_or_reconcile(&mut self, loan: &Loan, as_of: NaiveDate) -> Result<&ReconciledSchedule> {
        match self.entries.entry(CacheKey::for_loan(loan, as_of)) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let reconciled = reconcile_loan(&self.generator, loan, as_of)?;
                debug!("cached reconciliation for loan {} as of {}", loan.id, as_of);
                Ok(entry.insert(reconciled))
            }
        }
    }

    /// drop every entry of a loan after its loan or payment record changed
    pub fn invalidate(&mut self, loan_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.loan_id != loan_id);
        before - self.entries.len()
    }

    /// drop entries computed for days before `as_of`
    pub fn evict_before(&mut self, as_of: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.as_of >= as_of);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
