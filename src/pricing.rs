use crate::status::{PaymentStatus, deduce_status};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use normie_rs::{LiquidityProvider, ZelleDetails};
use serde::Serialize;

/// Share of the non-uniqueness amount reported as fees.
pub const FEE_RATE: f64 = 0.95;

/// Processing fee the checkout forwards to the payer.
pub const CHECKOUT_FEE_RATE: f64 = 0.05;

/// How long a payment stays payable after the transaction was created.
pub const PAYMENT_TTL: TimeDelta = TimeDelta::hours(12);

pub fn fees(amount: f64, uniqueness_amount: f64) -> f64 {
    (amount - uniqueness_amount) * FEE_RATE
}

/// Plain duration arithmetic, so the offset of `created_at` never shifts the instant.
pub fn expires_at<Tz: TimeZone>(created_at: DateTime<Tz>) -> DateTime<Tz> {
    created_at + PAYMENT_TTL
}

/// Rounds a fiat amount to cents.
pub fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Amount in the smallest fiat unit, as the checkout API expects it.
pub fn checkout_amount(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Preview of what the payer is charged for a code of `amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutQuote {
    pub amount: f64,
    pub fees: f64,
    pub total: f64,
}

impl CheckoutQuote {
    pub fn new(amount: f64) -> Self {
        let fees = amount * CHECKOUT_FEE_RATE;
        Self {
            amount,
            fees,
            total: amount + fees,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub name: String,
    pub zelle_id: String,
    pub is_business: bool,
}

/// Payment instructions derived from the upstream transaction, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// External transaction id.
    pub id: String,
    pub code: String,
    pub amount: f64,
    pub fees: f64,
    pub total: f64,
    pub recipient: Recipient,
    pub status: PaymentStatus,
    pub expires_at: DateTime<Utc>,
}

impl Payment {
    /// Combines the Zelle details of a transaction with its liquidity provider.
    ///
    /// Returns `None` when the details carry no amount. A missing uniqueness
    /// amount counts as zero.
    pub fn derive(
        code: &str,
        details: &ZelleDetails,
        provider: &LiquidityProvider,
    ) -> Option<Self> {
        let amount = details.amount?;
        let uniqueness_amount = details.uniqueness_amount.unwrap_or(0.0);

        let zelle_id = provider
            .zelle_id
            .clone()
            .or_else(|| details.payout_details.clone())
            .unwrap_or_default();

        Some(Self {
            id: details.transaction_id.clone(),
            code: code.to_string(),
            amount,
            fees: fees(amount, uniqueness_amount),
            total: amount,
            recipient: Recipient {
                name: provider.zelle_name.clone().unwrap_or_default(),
                zelle_id,
                is_business: provider.is_business_zelle.unwrap_or(false),
            },
            status: deduce_status(&details.confirmation_status),
            expires_at: expires_at(details.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};
    use chrono_tz::America::New_York;

    fn details(amount: Option<f64>, uniqueness_amount: Option<f64>) -> ZelleDetails {
        ZelleDetails {
            id: Some("d1".to_string()),
            transaction_id: "tx_1".to_string(),
            confirmation_status: "payment-confirmed-by-admin".to_string(),
            payout_details: Some("lp@zelle.example".to_string()),
            amount,
            uniqueness_amount,
            created_at: "2025-06-01T10:00:00Z".parse().unwrap(),
            updated_at: None,
        }
    }

    fn provider() -> LiquidityProvider {
        LiquidityProvider {
            id: Some("lp1".to_string()),
            wallet_address: Some("0x1".to_string()),
            email: None,
            zelle_id: Some("lp@zelle.example".to_string()),
            zelle_name: Some("Acme LLC".to_string()),
            is_business_zelle: Some(true),
        }
    }

    #[test]
    fn test_fees() {
        assert_eq!(fees(100.0, 20.0), 76.0);
        assert_eq!(fees(100.37, 0.37), 95.0);
        assert_eq!(fees(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_negative_inputs_propagate() {
        assert_eq!(fees(10.0, 20.0), -9.5);
    }

    #[test]
    fn test_expires_at() {
        let created: DateTime<Utc> = "2025-06-01T10:00:00Z".parse().unwrap();
        let expected: DateTime<Utc> = "2025-06-01T22:00:00Z".parse().unwrap();
        assert_eq!(expires_at(created), expected);
    }

    #[test]
    fn test_expires_at_across_dst_boundary() {
        // US clocks jump from 02:00 EST to 03:00 EDT during these 12 hours
        let created = New_York.with_ymd_and_hms(2025, 3, 9, 1, 30, 0).unwrap();

        let expiry = expires_at(created);

        assert_eq!(expiry - created, TimeDelta::hours(12));
        assert_eq!(expiry.offset().fix().local_minus_utc(), -4 * 3600);
        assert_eq!(expiry.hour(), 14);
        assert_eq!(expiry.minute(), 30);
        assert_eq!(
            expiry.with_timezone(&Utc),
            "2025-03-09T18:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_amount_rounding() {
        assert_eq!(round_amount(19.994), 19.99);
        assert_eq!(round_amount(20.0), 20.0);
        assert_eq!(checkout_amount(19.99), 1999);
        assert_eq!(checkout_amount(250.0), 25000);
    }

    #[test]
    fn test_quote() {
        let quote = CheckoutQuote::new(100.0);
        assert_eq!(quote.fees, 5.0);
        assert_eq!(quote.total, 105.0);
    }

    #[test]
    fn test_derive_payment() {
        let payment =
            Payment::derive("AB12C", &details(Some(100.0), Some(20.0)), &provider()).unwrap();

        assert_eq!(payment.id, "tx_1");
        assert_eq!(payment.code, "AB12C");
        assert_eq!(payment.fees, 76.0);
        assert_eq!(payment.total, 100.0);
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(
            payment.recipient,
            Recipient {
                name: "Acme LLC".to_string(),
                zelle_id: "lp@zelle.example".to_string(),
                is_business: true,
            }
        );
        assert_eq!(
            payment.expires_at,
            "2025-06-01T22:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_derive_payment_without_uniqueness_amount() {
        let payment = Payment::derive("AB12C", &details(Some(40.0), None), &provider()).unwrap();
        assert_eq!(payment.fees, 38.0);
    }

    #[test]
    fn test_derive_payment_without_amount() {
        assert!(Payment::derive("AB12C", &details(None, Some(1.0)), &provider()).is_none());
    }

    #[test]
    fn test_derive_payment_with_sparse_provider() {
        let provider = LiquidityProvider {
            zelle_name: Some("Jane Doe".to_string()),
            ..Default::default()
        };

        let payment = Payment::derive("AB12C", &details(Some(40.0), None), &provider).unwrap();

        assert_eq!(payment.recipient.zelle_id, "lp@zelle.example");
        assert!(!payment.recipient.is_business);
    }

    #[test]
    fn test_payment_serialization() {
        let payment =
            Payment::derive("AB12C", &details(Some(100.0), Some(20.0)), &provider()).unwrap();

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["recipient"]["zelleId"], "lp@zelle.example");
        assert_eq!(json["recipient"]["isBusiness"], true);
        assert_eq!(json["expiresAt"], "2025-06-01T22:00:00Z");
    }
}
