//! Scenario tests for the simulator
//!
//! These walk through full admission traces using the public Simulator API

#[cfg(test)]
mod integration {
    use crate::config::SimulatorConfig;
    use crate::error::AllocationError;
    use crate::memory::{
        AllocationMode, Classification, PageSelector, RandomPageSelector, Request, RequestId,
        SequentialPageSelector, Simulator, SlotRange,
    };

    fn simulator(
        mode: AllocationMode,
        total_slots: usize,
        selector: Box<dyn PageSelector>,
    ) -> Simulator {
        let config = SimulatorConfig {
            total_slots,
            unit_size: 8,
            page_size: 2,
            mode,
            seed: None,
        };
        Simulator::with_selector(config, selector).expect("valid config")
    }

    #[test]
    fn test_paged_eviction_scenario() {
        let mut sim = simulator(AllocationMode::Paged, 8, Box::new(SequentialPageSelector));

        let r1 = sim.admit(Request::new("R1", 3)).unwrap();
        assert_eq!(r1.allocated_slots, vec![SlotRange::new(0, 4)]);
        assert_eq!(sim.report().waste_slots, 1);

        let r2 = sim.admit(Request::new("R2", 5)).unwrap();
        assert_eq!(r2.evicted_request_ids, vec![RequestId::new("R1")]);
        assert_eq!(r2.attempts, 2);

        let report = sim.report();
        assert_eq!(report.occupied_slots, 6);
        assert_eq!(report.actual_data_slots, 5);
        assert_eq!(report.waste_slots, 1);
        assert_eq!(report.live_requests, 1);
    }

    #[test]
    fn test_paged_eviction_scenario_random_placement() {
        let mut sim = simulator(AllocationMode::Paged, 8, Box::new(RandomPageSelector::new()));

        sim.admit(Request::new("R1", 3)).unwrap();
        let outcome = sim.admit(Request::new("R2", 5)).unwrap();
        assert_eq!(outcome.evicted_request_ids, vec![RequestId::new("R1")]);

        let record = sim.allocation(&RequestId::new("R2")).unwrap();
        assert_eq!(record.slots.len(), 6);
        assert!(record.slots.chunks(2).all(|page| page[0] % 2 == 0 && page[1] == page[0] + 1));
    }

    #[test]
    fn test_standard_eviction_scenario() {
        let mut sim = simulator(AllocationMode::Standard, 16, Box::new(SequentialPageSelector));

        let r1 = sim.admit(Request::new("R1", 5).with_units(1)).unwrap();
        assert_eq!(r1.allocated_slots, vec![SlotRange::new(0, 8)]);
        assert_eq!(sim.report().waste_slots, 3);

        let r2 = sim.admit(Request::new("R2", 10).with_units(2)).unwrap();
        assert_eq!(r2.allocated_slots, vec![SlotRange::new(0, 16)]);
        assert_eq!(r2.evicted_request_ids, vec![RequestId::new("R1")]);

        let report = sim.report();
        assert_eq!(report.waste_slots, 6);
        assert_eq!(report.occupancy_pct, 100);
        assert_eq!(report.waste_rate_pct, 38); // 6 / 16 = 37.5%
        assert_eq!(report.efficiency_score, 62);
    }

    #[test]
    fn test_release_unknown_leaves_state_unchanged() {
        let mut sim = simulator(AllocationMode::Paged, 16, Box::new(SequentialPageSelector));
        sim.admit(Request::new("R1", 3)).unwrap();
        let before = sim.snapshot();

        let err = sim.release(&RequestId::new("R9")).unwrap_err();
        assert_eq!(err, AllocationError::NotFound(RequestId::new("R9")));
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_standard_wastes_more_than_paged() {
        let lens = [5, 6, 4, 3, 5, 4, 3, 2];

        let mut standard = simulator(AllocationMode::Standard, 64, Box::new(SequentialPageSelector));
        let mut paged = simulator(AllocationMode::Paged, 64, Box::new(SequentialPageSelector));
        for (i, &len) in lens.iter().enumerate() {
            standard.admit(Request::new(format!("TK-{}", 1001 + i), len)).unwrap();
            paged.admit(Request::new(format!("TK-{}", 1001 + i), len)).unwrap();
        }

        let standard = standard.report();
        let paged = paged.report();
        assert_eq!(standard.actual_data_slots, paged.actual_data_slots);
        assert_eq!(standard.occupied_slots, 64);
        assert_eq!(standard.waste_slots, 64 - 32);
        assert_eq!(paged.waste_slots, 4); // one reserved slot per odd length
        assert!(paged.waste_rate_pct < standard.waste_rate_pct);
    }

    #[test]
    fn test_classification_layout_in_snapshot() {
        let mut sim = simulator(AllocationMode::Standard, 16, Box::new(SequentialPageSelector));
        sim.admit(Request::new("R1", 5)).unwrap();

        let snapshot = sim.snapshot();
        let classes: Vec<_> = snapshot.slots[..8]
            .iter()
            .map(|s| s.classification())
            .collect();
        assert_eq!(&classes[..5], &[Some(Classification::Data); 5]);
        assert_eq!(&classes[5..], &[Some(Classification::Waste); 3]);
        assert!(snapshot.slots[8..].iter().all(|s| s.is_free()));
    }
}
