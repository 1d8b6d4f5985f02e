//! Simulated payment gateway.
//!
//! Each method has a declared success rate and a charge succeeds with exactly
//! that probability. The RNG can be seeded so tests and demos are
//! reproducible.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Money, Timestamp};

/// Rate used for methods without a dedicated entry.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.80;

pub const CURRENCY: &str = "NPR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Esewa,
    Khalti,
    CreditCard,
    BankTransfer,
    MobileBanking,
    Cash,
    QrPayment,
    Cheque,
}

pub const VALID_PAYMENT_METHODS: &[&str] = &[
    "esewa",
    "khalti",
    "credit_card",
    "bank_transfer",
    "mobile_banking",
    "cash",
    "qr_payment",
    "cheque",
];

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Esewa => "esewa",
            PaymentMethod::Khalti => "khalti",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::MobileBanking => "mobile_banking",
            PaymentMethod::Cash => "cash",
            PaymentMethod::QrPayment => "qr_payment",
            PaymentMethod::Cheque => "cheque",
        }
    }

    pub fn success_rate(self) -> f64 {
        match self {
            PaymentMethod::Esewa => 0.95,
            PaymentMethod::Khalti => 0.93,
            PaymentMethod::CreditCard => 0.90,
            PaymentMethod::BankTransfer => 0.85,
            PaymentMethod::MobileBanking => 0.88,
            PaymentMethod::Cash => 1.0,
            PaymentMethod::QrPayment | PaymentMethod::Cheque => DEFAULT_SUCCESS_RATE,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s {
            "esewa" => PaymentMethod::Esewa,
            "khalti" => PaymentMethod::Khalti,
            "credit_card" => PaymentMethod::CreditCard,
            "bank_transfer" => PaymentMethod::BankTransfer,
            "mobile_banking" => PaymentMethod::MobileBanking,
            "cash" => PaymentMethod::Cash,
            "qr_payment" => PaymentMethod::QrPayment,
            "cheque" => PaymentMethod::Cheque,
            other => {
                return Err(CoreError::Validation(format!(
                    "Invalid payment method '{other}'. Must be one of: {}",
                    VALID_PAYMENT_METHODS.join(", ")
                )))
            }
        };
        Ok(method)
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

fn short_hex(len: usize) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    hex[..len].to_string()
}

/// Gateway transaction id, e.g. `PAY_3F9A0C1B`.
pub fn new_payment_id() -> String {
    format!("PAY_{}", short_hex(8))
}

/// Gateway reference, e.g. `REF_A1B2C3`.
pub fn new_reference() -> String {
    format!("REF_{}", short_hex(6))
}

/// Id for listings granted by an administrator without payment.
pub fn new_admin_payment_id() -> String {
    format!("ADMIN_{}", short_hex(8))
}

/// Id for listings created by the bulk admin action.
pub fn bulk_payment_id(property_id: DbId, now: Timestamp) -> String {
    format!("BULK_{}_{property_id}", now.format("%Y%m%d%H%M%S"))
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Result of a simulated charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Approved {
        payment_id: String,
        reference: String,
        details: serde_json::Value,
    },
    Declined {
        payment_id: String,
        error: String,
    },
}

impl PaymentOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentOutcome::Approved { .. })
    }

    pub fn payment_id(&self) -> &str {
        match self {
            PaymentOutcome::Approved { payment_id, .. } => payment_id,
            PaymentOutcome::Declined { payment_id, .. } => payment_id,
        }
    }
}

/// Bernoulli-by-rate payment simulator.
pub struct SimulatedGateway {
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    /// Seeded gateways make the same decisions for the same call sequence.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Draw one success/failure for `method` at its declared rate.
    fn draw(&self, method: PaymentMethod) -> bool {
        let rate = method.success_rate().clamp(0.0, 1.0);
        match self.rng.lock() {
            Ok(mut rng) => rng.random_bool(rate),
            Err(poisoned) => poisoned.into_inner().random_bool(rate),
        }
    }

    /// Simulate charging `amount` via `method`.
    pub fn charge(&self, method: PaymentMethod, amount: Money, now: Timestamp) -> PaymentOutcome {
        let payment_id = new_payment_id();

        if self.draw(method) {
            PaymentOutcome::Approved {
                payment_id,
                reference: new_reference(),
                details: serde_json::json!({
                    "method": method.as_str(),
                    "amount": amount.to_string(),
                    "currency": CURRENCY,
                    "processed_at": now.to_rfc3339(),
                    "status": "completed",
                }),
            }
        } else {
            PaymentOutcome::Declined {
                payment_id,
                error: format!(
                    "{} payment failed. Please try again or use a different payment method.",
                    method.as_str().to_ascii_uppercase()
                ),
            }
        }
    }
}

impl fmt::Debug for SimulatedGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedGateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn method_parse_and_rates() {
        assert_eq!("esewa".parse::<PaymentMethod>().unwrap().success_rate(), 0.95);
        assert_eq!("cheque".parse::<PaymentMethod>().unwrap().success_rate(), DEFAULT_SUCCESS_RATE);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn cash_always_succeeds() {
        let gateway = SimulatedGateway::new(Some(1));
        for _ in 0..200 {
            assert!(gateway
                .charge(PaymentMethod::Cash, Money::from(500), Utc::now())
                .is_approved());
        }
    }

    #[test]
    fn same_seed_same_decisions() {
        let a = SimulatedGateway::new(Some(42));
        let b = SimulatedGateway::new(Some(42));
        let now = Utc::now();
        let run = |g: &SimulatedGateway| {
            (0..50)
                .map(|_| g.charge(PaymentMethod::BankTransfer, Money::from(500), now).is_approved())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(&a), run(&b));
    }

    #[test]
    fn observed_rate_tracks_declared_rate() {
        let gateway = SimulatedGateway::new(Some(7));
        let now = Utc::now();
        let trials = 4_000;
        let ok = (0..trials)
            .filter(|_| {
                gateway
                    .charge(PaymentMethod::BankTransfer, Money::from(2000), now)
                    .is_approved()
            })
            .count();
        let observed = ok as f64 / trials as f64;
        assert!((observed - 0.85).abs() < 0.05, "observed {observed}");
    }

    #[test]
    fn outcome_ids_have_prefixes() {
        let gateway = SimulatedGateway::new(Some(3));
        match gateway.charge(PaymentMethod::Cash, Money::from(500), Utc::now()) {
            PaymentOutcome::Approved {
                payment_id,
                reference,
                details,
            } => {
                assert!(payment_id.starts_with("PAY_"));
                assert_eq!(payment_id.len(), 12);
                assert!(reference.starts_with("REF_"));
                assert_eq!(details["currency"], "NPR");
            }
            other => panic!("cash must be approved, got {other:?}"),
        }
        assert!(new_admin_payment_id().starts_with("ADMIN_"));
    }
}
