use serde::{Deserialize, Serialize};

/// backend identifier for a loan
pub type LoanId = String;

/// backend identifier for the originating shopkeeper
pub type ShopkeeperId = String;

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// application submitted by the shopkeeper
    Pending,
    /// KYC checked by a verifier
    Verified,
    /// approved by an admin, not yet disbursed
    Approved,
    /// disbursed and performing
    Active,
    /// at least one installment past due
    Overdue,
    /// every installment settled
    Paid,
    /// written off after recovery failed
    Defaulted,
    Rejected,
}

impl LoanStatus {
    /// whether the lifecycle permits moving from `self` to `next`
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        use LoanStatus::*;

        matches!(
            (self, next),
            (Pending, Verified)
                | (Pending, Rejected)
                | (Verified, Approved)
                | (Verified, Rejected)
                | (Approved, Active)
                | (Active, Overdue)
                | (Active, Paid)
                | (Active, Defaulted)
                | (Overdue, Active)
                | (Overdue, Paid)
                | (Overdue, Defaulted)
        )
    }

    /// loans whose installments are still being collected
    pub fn is_collectible(self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Overdue)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Paid | LoanStatus::Defaulted | LoanStatus::Rejected)
    }
}

/// installment status relative to an as-of date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallmentStatus {
    Paid,
    PendingDueToday,
    Upcoming,
    Overdue,
}

impl InstallmentStatus {
    pub fn is_unpaid(self) -> bool {
        !matches!(self, InstallmentStatus::Paid)
    }
}

/// how a payment was collected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    #[serde(alias = "UPI")]
    Upi,
    #[serde(alias = "online")]
    BankTransfer,
    Cheque,
    #[serde(other)]
    Other,
}

/// late-fee calculation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyCalculationType {
    /// flat amount per missed due date
    #[default]
    Fixed,
    /// percentage of the loan's EMI
    Percentage,
}
