// Test file - these are expected patterns in test code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Edge Case Tests for the Rebilling Workflow
//!
//! Boundary conditions around:
//! - Reschedule generation capping
//! - Zero and negative amounts
//! - Tranche arithmetic on fractional amounts
//! - Result message rendering

#[cfg(test)]
mod generation_cap_tests {
    use rust_decimal_macros::dec;

    use crate::workflow::test_support::{RecordingLedger, RecordingScheduler, ScriptedGateway};
    use crate::workflow::{RebillingWorkflow, MAX_SCHEDULED_REBILLS};

    // =========================================================================
    // Generation just below the cap - reschedule still issued, at the cap
    // =========================================================================
    #[tokio::test]
    async fn test_last_generation_before_cap_still_reschedules() {
        let gateway = ScriptedGateway::new(&["insufficient_funds"]);
        let ledger = RecordingLedger::new();
        let scheduler = RecordingScheduler::new();

        let report = RebillingWorkflow::new(&gateway, &ledger, &scheduler)
            .run("sub_cap", dec!(40), MAX_SCHEDULED_REBILLS - 1)
            .await
            .unwrap();

        assert_eq!(
            scheduler.scheduled(),
            vec![("sub_cap".to_string(), dec!(40), MAX_SCHEDULED_REBILLS)]
        );
        assert_eq!(report.rescheduled, Some(dec!(40)));
    }

    // =========================================================================
    // Generation past the cap - still no reschedule, balance silently dropped
    // =========================================================================
    #[tokio::test]
    async fn test_generation_beyond_cap_never_reschedules() {
        let gateway = ScriptedGateway::new(&["insufficient_funds"]);
        let ledger = RecordingLedger::new();
        let scheduler = RecordingScheduler::new();

        let report = RebillingWorkflow::new(&gateway, &ledger, &scheduler)
            .run("sub_cap", dec!(40), MAX_SCHEDULED_REBILLS + 1)
            .await
            .unwrap();

        assert!(scheduler.scheduled().is_empty());
        assert_eq!(report.rescheduled, None);
        // The four attempts are still recorded under that generation.
        assert!(ledger
            .attempts()
            .iter()
            .all(|a| a.scheduled_count == MAX_SCHEDULED_REBILLS + 1));
    }
}

#[cfg(test)]
mod amount_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::workflow::test_support::{RecordingLedger, RecordingScheduler, ScriptedGateway};
    use crate::workflow::RebillingWorkflow;

    // =========================================================================
    // Negative amount behaves like zero: no calls, no rows, no reschedule
    // =========================================================================
    #[tokio::test]
    async fn test_negative_amount_attempts_nothing() {
        let gateway = ScriptedGateway::new(&["success"]);
        let ledger = RecordingLedger::new();
        let scheduler = RecordingScheduler::new();

        let report = RebillingWorkflow::new(&gateway, &ledger, &scheduler)
            .run("sub_neg", dec!(-5), 0)
            .await
            .unwrap();

        assert_eq!(gateway.call_count(), 0);
        assert!(ledger.attempts().is_empty());
        assert!(scheduler.scheduled().is_empty());
        assert_eq!(report.message(), "");
    }

    // =========================================================================
    // Fractional original amount: tranches stay exact decimals
    // =========================================================================
    #[tokio::test]
    async fn test_fractional_amount_tranches_are_exact() {
        let gateway = ScriptedGateway::new(&["insufficient_funds"]);
        let ledger = RecordingLedger::new();
        let scheduler = RecordingScheduler::new();

        RebillingWorkflow::new(&gateway, &ledger, &scheduler)
            .run("sub_frac", dec!(10.50), 0)
            .await
            .unwrap();

        let amounts: Vec<Decimal> = ledger.attempts().iter().map(|a| a.amount).collect();
        assert_eq!(
            amounts,
            vec![dec!(10.50), dec!(7.875), dec!(5.25), dec!(2.625)]
        );
    }

    // =========================================================================
    // Success on a deep tranche: remainder is original minus that tranche
    // =========================================================================
    #[tokio::test]
    async fn test_remainder_after_deep_tranche_success() {
        let gateway = ScriptedGateway::new(&[
            "insufficient_funds",
            "insufficient_funds",
            "insufficient_funds",
            "success",
        ]);
        let ledger = RecordingLedger::new();
        let scheduler = RecordingScheduler::new();

        let report = RebillingWorkflow::new(&gateway, &ledger, &scheduler)
            .run("sub_deep", dec!(100), 0)
            .await
            .unwrap();

        // 25% tranche succeeded; 75 remains and is rescheduled.
        assert_eq!(report.rescheduled, Some(dec!(75)));
        assert_eq!(
            scheduler.scheduled(),
            vec![("sub_deep".to_string(), dec!(75), 1)]
        );
    }
}

#[cfg(test)]
mod message_tests {
    use rust_decimal_macros::dec;

    use crate::workflow::{ChargeOutcome, RebillReport};

    #[test]
    fn test_success_message_has_one_fractional_digit() {
        let report = RebillReport {
            outcome: Some(ChargeOutcome::Succeeded { amount: dec!(75) }),
            rescheduled: None,
        };
        assert_eq!(report.message(), "Success. Charged amount: 75.0.");
    }

    #[test]
    fn test_fractional_amounts_keep_their_digits() {
        let report = RebillReport {
            outcome: Some(ChargeOutcome::Succeeded {
                amount: dec!(7.875),
            }),
            rescheduled: Some(dec!(2.625)),
        };
        assert_eq!(
            report.message(),
            "Success. Charged amount: 7.875. Rescheduled rebilling with amount: 2.625"
        );
    }

    #[test]
    fn test_trailing_zeros_are_trimmed_to_one_digit() {
        let report = RebillReport {
            outcome: Some(ChargeOutcome::Succeeded {
                amount: dec!(75.00),
            }),
            rescheduled: None,
        };
        assert_eq!(report.message(), "Success. Charged amount: 75.0.");
    }

    #[test]
    fn test_insufficient_funds_message() {
        let report = RebillReport {
            outcome: Some(ChargeOutcome::InsufficientFunds),
            rescheduled: None,
        };
        assert_eq!(report.message(), "Insufficient Funds.");
    }

    #[test]
    fn test_empty_report_renders_empty_string() {
        let report = RebillReport {
            outcome: None,
            rescheduled: None,
        };
        assert_eq!(report.message(), "");
    }
}
