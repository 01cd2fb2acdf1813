use csr_eventmanager::hdl::Fragment;
use csr_eventmanager::sim::Simulator;
use csr_eventmanager::{
    render_manager, EventCsrBank, EventError, EventKind, EventManager, EventSource, SharedIrq,
};

/// uart_rx (pulse), dma_slot (level), dma_done (process), created in that order.
fn soc_sources() -> [EventSource; 3] {
    [
        EventSource::pulse(Some("uart_rx")),
        EventSource::level(Some("dma_slot")),
        EventSource::process(Some("dma_done")),
    ]
}

#[test]
fn three_source_controller() {
    let [uart_rx, dma_slot, dma_done] = soc_sources();
    let mut ev = EventManager::new();
    ev.attach(dma_done.clone()).unwrap();
    ev.attach(uart_rx.clone()).unwrap();
    ev.attach(dma_slot.clone()).unwrap();
    ev.finalize().unwrap();

    let status = ev.status().unwrap();
    assert_eq!(status.width(), 3);
    assert_eq!(ev.field_names_in_order().unwrap(), ["uart_rx", "dma_slot", "dma_done"]);
    let kinds: Vec<EventKind> = ev.sources().map(|s| s.kind()).collect();
    assert_eq!(kinds, [EventKind::Pulse, EventKind::Level, EventKind::Process]);

    let mut bank = EventCsrBank::new(&ev).unwrap();

    // Status: pulse reads 0, level and process follow their triggers.
    for src in [&uart_rx, &dma_slot, &dma_done] {
        bank.sim_mut().set(src.trigger(), true);
    }
    bank.sim_mut().settle();
    assert_eq!(bank.handle_read(bank.status_offset()), Ok(0b110));

    // One-cycle pulse on uart_rx latches bit 0.
    bank.sim_mut().tick();
    bank.sim_mut().set(uart_rx.trigger(), false);
    bank.sim_mut().tick();
    assert!(bank.event_pending(0).unwrap());

    // Write 1 to pending bit 0 clears the latch.
    bank.clear_event(0).unwrap();
    assert!(!bank.event_pending(0).unwrap());

    // Enable bits 1 and 2 with dma_slot high: irq asserted.
    assert!(!bank.irq());
    bank.handle_write(bank.enable_offset(), 0b110).unwrap();
    assert!(bank.irq());
    assert_eq!(bank.next_asserted(), Some(1));

    // Dropping dma_slot clears its level; dma_done falls and latches.
    bank.sim_mut().set(dma_slot.trigger(), false);
    bank.sim_mut().set(dma_done.trigger(), false);
    bank.sim_mut().settle();
    assert!(!bank.irq());
    bank.sim_mut().tick();
    assert!(bank.irq());
    assert_eq!(bank.next_asserted(), Some(2));
    bank.clear_event(2).unwrap();
    assert!(!bank.irq());
}

#[test]
fn bit_order_ignores_attach_order() {
    for order in [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]] {
        // Sources are owned by one manager only, so each run creates its own set.
        let run = soc_sources();
        let mut ev = EventManager::new();
        for i in order {
            ev.attach(run[i].clone()).unwrap();
        }
        ev.finalize().unwrap();
        for (bit, src) in run.iter().enumerate() {
            assert_eq!(ev.bit_of(src), Ok(Some(bit)), "attach order {order:?}");
        }
        assert_eq!(ev.field_names_in_order().unwrap(), ["uart_rx", "dma_slot", "dma_done"]);
    }
}

#[test]
fn unnamed_sources_get_positional_names() {
    let run: Vec<EventSource> = (0..4)
        .map(|i| match i % 3 {
            0 => EventSource::pulse(None),
            1 => EventSource::level(None),
            _ => EventSource::process(None),
        })
        .collect();
    let mut ev = EventManager::new();
    for src in run.iter().rev() {
        ev.attach(src.clone()).unwrap();
    }
    ev.finalize().unwrap();
    assert_eq!(ev.field_names_in_order().unwrap(), ["event0", "event1", "event2", "event3"]);
    let kinds: Vec<EventKind> = ev.sources().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        [EventKind::Pulse, EventKind::Level, EventKind::Process, EventKind::Pulse]
    );
}

#[test]
fn lifecycle_errors() {
    let mut ev = EventManager::new();
    let src = EventSource::pulse(Some("rx"));
    ev.attach(src.clone()).unwrap();
    assert!(matches!(ev.attach(src), Err(EventError::DuplicateSource(_))));
    ev.finalize().unwrap();
    assert_eq!(ev.finalize(), Err(EventError::AlreadyFinalized));
    assert!(matches!(
        ev.attach(EventSource::level(None)),
        Err(EventError::AlreadyFinalized)
    ));
}

#[test]
fn shared_irq_over_finalized_managers() {
    let a_src = EventSource::level(Some("a"));
    let b_src = EventSource::level(Some("b"));
    let mut a = EventManager::new();
    let mut b = EventManager::new();
    a.attach(a_src.clone()).unwrap();
    b.attach(b_src.clone()).unwrap();
    a.finalize().unwrap();
    b.finalize().unwrap();
    let shared = SharedIrq::new(&[&a, &b]).unwrap();

    let mut logic = Fragment::new();
    logic.extend(a.fragment().unwrap().clone());
    logic.extend(b.fragment().unwrap().clone());
    logic.extend(shared.fragment().clone());
    let mut sim = Simulator::new(logic);

    // Enable bit 0 of both managers directly through their storage strobes.
    for ev in [&a, &b] {
        let enable = ev.enable().unwrap();
        sim.set(&enable.written_bits()[0], true);
        sim.set(enable.re(), true);
    }
    sim.tick();
    for ev in [&a, &b] {
        sim.set(ev.enable().unwrap().re(), false);
    }

    sim.set(a_src.trigger(), true);
    sim.settle();
    assert!(sim.get(a.irq()));
    assert!(!sim.get(b.irq()));
    assert!(sim.get(shared.irq()));

    sim.set(a_src.trigger(), false);
    sim.settle();
    assert!(!sim.get(shared.irq()));

    sim.set(b_src.trigger(), true);
    sim.settle();
    assert!(sim.get(shared.irq()));
}

#[test]
fn rendered_docs_follow_bit_order() {
    let [uart_rx, dma_slot, dma_done] = soc_sources();
    let mut ev = EventManager::new();
    ev.attach(dma_done.with_description("DMA transfer finished.")).unwrap();
    ev.attach(dma_slot).unwrap();
    ev.attach(uart_rx).unwrap();
    ev.finalize().unwrap();

    let text = render_manager(&ev).unwrap();
    let rx = text.find("bit 0: uart_rx").unwrap();
    let slot = text.find("bit 1: dma_slot").unwrap();
    assert!(rx < slot);
    assert!(text.contains("bit 2: dma_done: DMA transfer finished."));
    assert!(text.contains("`1` if a `uart_rx` event occurred. This Event is triggered on a **rising** edge."));
}
