//! Integration tests: in-memory store → agents → triggers.
//!
//! Verifies:
//! - The booking chain stores the appointment and runs the agents in order
//! - Scheduled sweeps keep going past a clinic whose run fails
//! - Command-center "run all agents" writes nothing, while the real run-all does

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use chrono::{TimeZone, Utc};

    use clinicops_agents::{
        AgentContext, AgentKind, AgentReport, AgentSet, ClinicRepository, FixedClock,
        RecordingNotifier, RepositoryError, SequentialIdGenerator,
    };
    use clinicops_clinic::{Appointment, Case, Clinic};
    use clinicops_core::{ClinicId, InvoiceId, Sku};
    use clinicops_inventory::InventoryItem;
    use clinicops_invoicing::Invoice;
    use clinicops_purchasing::PurchaseOrder;

    use crate::booking::{BookingChain, BookingRequest};
    use crate::read_model::{InMemoryClinicStore, Restock};
    use crate::runner::{DailyAgentRunner, InMemoryAgentReportSink, sweep};

    fn clinic_id() -> ClinicId {
        ClinicId::new("clinic-1")
    }

    struct Setup {
        store: Arc<InMemoryClinicStore>,
        notifier: Arc<RecordingNotifier>,
        agents: Arc<AgentSet<InMemoryClinicStore>>,
    }

    fn setup() -> Setup {
        let store = Arc::new(InMemoryClinicStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let ctx = AgentContext::new(store.clone())
            .with_clock(Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap(),
            )))
            .with_ids(Arc::new(SequentialIdGenerator::new()))
            .with_notifier(notifier.clone());
        Setup {
            store,
            notifier,
            agents: Arc::new(AgentSet::new(ctx)),
        }
    }

    fn restock(sku: &str, quantity: u64) -> Restock {
        Restock {
            sku: Sku::new(sku),
            quantity,
            name: Some(sku.to_string()),
            unit_price: Some(1.0),
        }
    }

    #[test]
    fn booking_stores_appointment_and_runs_chain() {
        let s = setup();
        s.store
            .upsert_clinic(Clinic::new(clinic_id()).with_whatsapp("+15550100"))
            .unwrap();
        s.store.add_inventory(&clinic_id(), restock("gloves", 2)).unwrap();

        let chain = BookingChain::new(s.store.clone(), s.agents.clone());
        let outcome = chain
            .book(BookingRequest {
                clinic_id: clinic_id(),
                patient: "Ada".into(),
                scheduled_at: Some("2025-06-03T09:00:00Z".into()),
            })
            .unwrap();

        assert!(outcome.appointment_id.as_str().starts_with("appt-"));
        assert!(outcome.appointment.is_completed());
        assert!(outcome.case.is_completed());
        assert!(outcome.inventory.is_completed());
        assert!(outcome.revenue.is_completed());

        let appts = s.store.appointments_by_clinic(&clinic_id()).unwrap();
        assert_eq!(appts.len(), 1);
        assert_eq!(appts[0].patient.as_deref(), Some("Ada"));

        let cases = s.store.cases_by_clinic(&clinic_id()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].appointment_id.as_ref(), Some(&outcome.appointment_id));
        assert_eq!(s.store.purchase_orders_by_clinic(&clinic_id()).unwrap().len(), 1);

        let sent = s.notifier.sent();
        assert_eq!(
            sent.last().map(|(_, m)| m.as_str()),
            Some("Appointment confirmed for Ada")
        );
    }

    #[test]
    fn command_run_all_is_inert_but_real_run_all_writes() {
        let s = setup();
        s.store
            .add_appointment(Appointment::booked(
                clinicops_core::AppointmentId::new("a1"),
                clinic_id(),
                "p1",
            ))
            .unwrap();
        s.store.add_inventory(&clinic_id(), restock("masks", 0)).unwrap();

        s.agents
            .command_center()
            .execute(&clinic_id(), "run all agents")
            .unwrap();
        assert!(s.store.cases_by_clinic(&clinic_id()).unwrap().is_empty());
        assert!(s.store.purchase_orders_by_clinic(&clinic_id()).unwrap().is_empty());

        let all = s.agents.run_all(&clinic_id());
        assert!(all.case.is_completed());
        assert_eq!(s.store.cases_by_clinic(&clinic_id()).unwrap().len(), 1);
        assert_eq!(s.store.purchase_orders_by_clinic(&clinic_id()).unwrap().len(), 1);
    }

    #[test]
    fn revenue_reflects_payments() {
        let s = setup();
        for (id, amount) in [("inv-1", 100.0), ("inv-2", 300.0)] {
            s.store
                .add_invoice(Invoice {
                    id: InvoiceId::new(id),
                    clinic_id: clinic_id(),
                    case_id: None,
                    amount,
                    paid: false,
                    created_at: None,
                })
                .unwrap();
        }
        s.store.mark_invoice_paid(&InvoiceId::new("inv-2")).unwrap();

        let report = s.agents.run(AgentKind::Revenue, &clinic_id()).unwrap();
        let AgentReport::Revenue(report) = report else {
            panic!("expected a revenue report");
        };
        assert_eq!(report.analysis.collection_rate, "75.00%");
        assert_eq!(report.notified.len(), 1);
    }

    /// Store wrapper whose reads fail for selected clinics.
    struct FlakyStore {
        inner: InMemoryClinicStore,
        failing: HashSet<ClinicId>,
    }

    impl FlakyStore {
        fn check(&self, clinic_id: &ClinicId) -> Result<(), RepositoryError> {
            if self.failing.contains(clinic_id) {
                Err(RepositoryError::Unavailable(format!("{clinic_id} offline")))
            } else {
                Ok(())
            }
        }
    }

    impl ClinicRepository for FlakyStore {
        fn get_clinic(&self, clinic_id: &ClinicId) -> Result<Option<Clinic>, RepositoryError> {
            self.check(clinic_id)?;
            self.inner.get_clinic(clinic_id)
        }

        fn list_clinics(&self) -> Result<Vec<Clinic>, RepositoryError> {
            self.inner.list_clinics()
        }

        fn appointments_by_clinic(
            &self,
            clinic_id: &ClinicId,
        ) -> Result<Vec<Appointment>, RepositoryError> {
            self.check(clinic_id)?;
            self.inner.appointments_by_clinic(clinic_id)
        }

        fn cases_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Case>, RepositoryError> {
            self.check(clinic_id)?;
            self.inner.cases_by_clinic(clinic_id)
        }

        fn invoices_by_clinic(
            &self,
            clinic_id: &ClinicId,
        ) -> Result<Vec<Invoice>, RepositoryError> {
            self.check(clinic_id)?;
            self.inner.invoices_by_clinic(clinic_id)
        }

        fn inventory_by_clinic(
            &self,
            clinic_id: &ClinicId,
        ) -> Result<Vec<InventoryItem>, RepositoryError> {
            self.check(clinic_id)?;
            self.inner.inventory_by_clinic(clinic_id)
        }

        fn add_case(&self, case: Case) -> Result<(), RepositoryError> {
            self.inner.add_case(case)
        }

        fn add_purchase_order(&self, order: PurchaseOrder) -> Result<(), RepositoryError> {
            self.inner.add_purchase_order(order)
        }
    }

    #[test]
    fn sweep_continues_past_failing_clinic() {
        let inner = InMemoryClinicStore::new();
        for id in ["a", "b", "c"] {
            inner.upsert_clinic(Clinic::new(ClinicId::new(id))).unwrap();
        }
        let store = Arc::new(FlakyStore {
            inner,
            failing: HashSet::from([ClinicId::new("b")]),
        });
        let agents = AgentSet::new(AgentContext::new(store));
        let sink = InMemoryAgentReportSink::new();

        let summary = sweep(&agents, &sink, AgentKind::Inventory);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let clinics: Vec<_> = sink.all().into_iter().map(|(c, _)| c.to_string()).collect();
        assert_eq!(clinics, ["a", "c"]);
    }

    #[test]
    fn booked_clinic_is_picked_up_by_the_sweep() {
        let s = setup();
        let booked = ClinicId::new("c-booked");
        BookingChain::new(s.store.clone(), s.agents.clone())
            .book(BookingRequest {
                clinic_id: booked.clone(),
                patient: "Ada".into(),
                scheduled_at: None,
            })
            .unwrap();

        let sink = InMemoryAgentReportSink::new();
        let summary = sweep(&s.agents, &sink, AgentKind::Case);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(sink.all()[0].0, booked);
    }

    #[test]
    fn triggered_runner_sweeps_every_window() {
        let s = setup();
        s.store.upsert_clinic(Clinic::new(clinic_id())).unwrap();
        let sink = Arc::new(InMemoryAgentReportSink::new());

        let runner = DailyAgentRunner {
            tick: Duration::from_millis(10),
            ..DailyAgentRunner::default()
        };
        let handle = runner
            .spawn("daily-agents-test", s.agents.clone(), sink.clone())
            .unwrap();
        handle.trigger();

        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.all().len() < 4 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        handle.shutdown();

        let kinds: Vec<_> = sink.all().iter().map(|(_, r)| r.kind()).collect();
        assert_eq!(&kinds[..4], &AgentKind::ALL);
    }
}
