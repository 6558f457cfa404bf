//! Property-based tests for cithrus-core wiring and handoff.
//!
//! Covers the format gate, single binding, whole-chain arity validation and
//! tear-free double buffering using proptest for randomized inputs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use cithrus_core::{
    Accepts, Component, DoubleBuffer, Format, InputPort, OutputPort, Pipeline, PipelineError,
    Result, boxed,
};
use proptest::prelude::*;

const FORMATS: [Format; 6] = [
    Format::RGBA,
    Format::BGRA,
    Format::YUV420,
    Format::HEVC,
    Format::GRAY32F,
    Format::BINARY,
];

fn accepts_from(mask: u8) -> Accepts {
    if mask == 0 {
        Accepts::Any
    } else {
        Accepts::any_of(
            FORMATS
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, f)| f.clone()),
        )
    }
}

/// A stage whose port counts are chosen at runtime.
struct Stage {
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl Stage {
    fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs: (0..inputs)
                .map(|i| InputPort::accepting(i, "Stage", Accepts::Any))
                .collect(),
            outputs: (0..outputs)
                .map(|i| OutputPort::declared(i, "Stage", Format::BINARY))
                .collect(),
        }
    }
}

impl Component for Stage {
    fn process(&mut self) -> Result<()> {
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// `connect` succeeds iff the output format is accepted, and a failed
    /// connect leaves both ports as they were.
    #[test]
    fn format_gate(format_idx in 0usize..6, mask in 0u8..64) {
        let format = FORMATS[format_idx].clone();
        let accepts = accepts_from(mask);
        let expected = accepts.accepts(&format);

        let out = OutputPort::declared(0, "Up", format);
        let mut input = InputPort::accepting(0, "Down", accepts);
        let result = input.connect(&out.handle());

        prop_assert_eq!(result.is_ok(), expected);
        prop_assert_eq!(input.is_connected(), expected);
        prop_assert_eq!(out.is_connected(), expected);
        if let Err(err) = result {
            prop_assert!(
                matches!(err, PipelineError::FormatMismatch { .. }),
                "unexpected error {}",
                err
            );
        }
    }

    /// After one successful bind, every further bind fails and the original
    /// binding is kept.
    #[test]
    fn single_binding(attempts in 1usize..8) {
        let first = OutputPort::declared(0, "First", Format::RGBA);
        let mut input = InputPort::accepting(0, "Down", Accepts::Any);
        input.connect(&first.handle()).unwrap();

        for i in 0..attempts {
            let other = OutputPort::declared(i, "Other", Format::RGBA);
            let result = input.connect(&other.handle());
            prop_assert!(
                matches!(result, Err(PipelineError::AlreadyConnected { .. })),
                "second bind was not rejected"
            );
            prop_assert!(!other.is_connected());
        }
        prop_assert!(input.connected_output().unwrap().same_port(&first.handle()));
    }

    /// A chain builds iff every adjacent pair agrees on its port count.
    #[test]
    fn arity_invariant(widths in prop::collection::vec(1usize..4, 1..5)) {
        // Source -> filters -> sink, where the k-th boundary has widths[k] ports
        // on the upstream side and widths[k] or widths[k] + 1 downstream.
        let mut components = Vec::new();
        let mut matched = true;
        let mut prev = widths[0];
        components.push(boxed(Stage::new(0, prev)));
        for (k, &w) in widths.iter().enumerate().skip(1) {
            let inputs = if k % 2 == 0 { prev } else { prev.max(w) };
            matched &= inputs == prev;
            components.push(boxed(Stage::new(inputs, w)));
            prev = w;
        }
        components.push(boxed(Stage::new(prev, 0)));

        let result = Pipeline::from_components(components);
        prop_assert_eq!(result.is_ok(), matched);
        if let Err(err) = result {
            prop_assert!(
                matches!(err, PipelineError::ArityMismatch { .. }),
                "unexpected error {}",
                err
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Under a concurrent producer, every frame the consumer swaps in is
    /// uniform (never partially written) and frames never go backwards.
    #[test]
    fn double_buffer_never_tears(len in 1usize..8192, frames in 50u32..400) {
        let mut cell = DoubleBuffer::new();
        let publisher = cell.publisher();
        let done = Arc::new(AtomicBool::new(false));

        let producer = {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for k in 1..=frames {
                    let value = (k % 251) as u8 + 1;
                    publisher.publish(|buf| buf.resize(len, value));
                }
                done.store(true, Ordering::Release);
            })
        };

        let mut delivered = 0u64;
        loop {
            let finished = done.load(Ordering::Acquire);
            if let Some(view) = cell.take() {
                let bytes = view.as_bytes();
                prop_assert_eq!(bytes.len(), len);
                prop_assert!(bytes.iter().all(|&b| b == bytes[0]), "torn frame");
                delivered += 1;
            }
            if finished && !cell.is_dirty() {
                break;
            }
        }
        producer.join().unwrap();

        let stats = cell.stats();
        prop_assert_eq!(stats.published, u64::from(frames));
        prop_assert_eq!(stats.delivered, delivered);
        prop_assert_eq!(stats.delivered + stats.overwritten, stats.published);
    }
}
