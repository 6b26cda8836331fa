use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Insertable, Serialize, Clone, PartialEq, Debug)]
#[diesel(table_name = crate::schema::payment_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentCode {
    pub id: String,
    pub amount: f64,
    pub payout_address: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "externalTransactionId")]
    pub external_transaction_id: Option<String>,
}

impl PaymentCode {
    /// Transaction id of a code that can be paid, `None` while it is not payable.
    pub fn payable_transaction(&self) -> Option<&str> {
        self.external_transaction_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}
