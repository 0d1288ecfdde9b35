use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicops_core::{CaseId, ClinicId, DomainError, DomainResult, InvoiceId};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// An invoice raised against a treatment case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub clinic_id: ClinicId,
    #[serde(default)]
    pub case_id: Option<CaseId>,
    /// Invoiced amount in the clinic's currency.
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Issue a new unpaid invoice.
    pub fn issue(
        id: InvoiceId,
        clinic_id: ClinicId,
        case_id: CaseId,
        amount: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(DomainError::validation("amount must be a positive number"));
        }
        Ok(Self {
            id,
            clinic_id,
            case_id: Some(case_id),
            amount,
            paid: false,
            created_at: Some(now),
        })
    }

    pub fn mark_paid(&mut self) {
        self.paid = true;
    }

    /// Whole days elapsed since the invoice was raised, rounded down.
    ///
    /// Invoices without a creation time report 0.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        match self.created_at {
            Some(created) => now
                .signed_duration_since(created)
                .num_seconds()
                .div_euclid(SECONDS_PER_DAY),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invoice(amount: f64, created_at: Option<DateTime<Utc>>) -> Invoice {
        Invoice {
            id: InvoiceId::new("inv-1"),
            clinic_id: ClinicId::new("c1"),
            case_id: None,
            amount,
            paid: false,
            created_at,
        }
    }

    #[test]
    fn issue_rejects_non_positive_amounts() {
        let now = Utc::now();
        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let res = Invoice::issue(
                InvoiceId::new("inv-1"),
                ClinicId::new("c1"),
                CaseId::new("case-1"),
                bad,
                now,
            );
            assert!(matches!(res, Err(DomainError::Validation(_))), "amount {bad}");
        }
    }

    #[test]
    fn days_overdue_floors_partial_days() {
        let now = Utc::now();
        assert_eq!(invoice(10.0, Some(now - Duration::hours(47))).days_overdue(now), 1);
        assert_eq!(invoice(10.0, Some(now - Duration::days(3))).days_overdue(now), 3);
        assert_eq!(invoice(10.0, Some(now)).days_overdue(now), 0);
        // Clock skew: a creation time slightly in the future floors to -1.
        assert_eq!(invoice(10.0, Some(now + Duration::hours(1))).days_overdue(now), -1);
        assert_eq!(invoice(10.0, None).days_overdue(now), 0);
    }

    #[test]
    fn mark_paid_flips_flag() {
        let mut inv = invoice(10.0, None);
        inv.mark_paid();
        assert!(inv.paid);
    }

    #[test]
    fn sparse_records_take_defaults() {
        let inv: Invoice = serde_json::from_value(serde_json::json!({
            "id": "inv-9",
            "clinicId": "c1",
        }))
        .unwrap();
        assert_eq!(inv.amount, 0.0);
        assert!(!inv.paid);
        assert_eq!(inv.case_id, None);
        assert_eq!(inv.created_at, None);
    }

    proptest::proptest! {
        #[test]
        fn days_overdue_counts_whole_days(hours in 0i64..24 * 365) {
            let now = Utc::now();
            let inv = invoice(1.0, Some(now - Duration::hours(hours)));
            proptest::prop_assert_eq!(inv.days_overdue(now), hours / 24);
        }
    }
}
