use serde::{Deserialize, Serialize};

/// Local view of a transfer's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Maps the payments API `confirmationStatus` label to a [`PaymentStatus`].
///
/// Unknown labels are treated as failed.
pub fn deduce_status(confirmation_status: &str) -> PaymentStatus {
    match confirmation_status {
        "not-started-by-sender" | "wait-for-payment-details" | "confirmed-but-settle-later" => {
            PaymentStatus::Pending
        }
        "payment-confirmed-by-sender" | "payment-confirmed-by-admin" => PaymentStatus::Completed,
        _ => PaymentStatus::Failed,
    }
}
