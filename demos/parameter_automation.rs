//! Parameter Automation Walkthrough
//!
//! Shows click-free parameter handling: a wet-mix glide spread across
//! several render blocks, a rate glide that carries every oscillator with
//! it, and the snap-to-target a rendering stop performs. Kernel events are
//! collected in an [`EventLog`] and printed as JSON at the end.
//!
//! Run with: cargo run --example parameter_automation

use chorale::prelude::*;

const BLOCK: usize = 128;

fn render_dc_block(kernel: &mut ChorusKernel) {
    let input = vec![vec![0.5_f32; BLOCK]; 2];
    let mut output = vec![vec![0.0_f32; BLOCK]; 2];
    let input_refs: Vec<&[f32]> = input.iter().map(|ch| ch.as_slice()).collect();
    let mut output_refs: Vec<&mut [f32]> =
        output.iter_mut().map(|ch| ch.as_mut_slice()).collect();
    kernel.render(0, &input_refs, &mut output_refs, BLOCK as u32);
}

fn main() {
    let log = EventLog::new();
    let mut kernel = ChorusKernel::new();
    kernel.set_event_sink(Some(Box::new(log.clone())));
    kernel
        .configure(KernelConfig {
            channels: 2,
            sample_rate: 48_000.0,
            max_frames_per_render: BLOCK as u32,
            max_delay_ms: 25.0,
            voices: 6,
        })
        .unwrap();
    kernel.set_rendering(true);

    // Glide the wet mix up over three blocks' worth of frames.
    kernel.set_parameter(ParameterId::WetMix, 1.0, 3 * BLOCK as u32);
    println!("Wet mix glide over {} frames:", 3 * BLOCK);
    for block in 0..4 {
        render_dc_block(&mut kernel);
        println!(
            "  after block {}: wet = {:.3}, ramping = {}",
            block,
            kernel.get_parameter(ParameterId::WetMix),
            kernel.is_ramping()
        );
    }

    // A rate change glides every oscillator, not just the visible value.
    kernel.set_parameter(ParameterId::Rate, 8.0, 2 * BLOCK as u32);
    println!("\nRate glide toward 8 Hz:");
    for block in 0..3 {
        render_dc_block(&mut kernel);
        println!(
            "  after block {}: rate = {:.3} Hz, voice 0 = {:.3} Hz",
            block,
            kernel.get_parameter(ParameterId::Rate),
            kernel.ensemble().lfos()[0].frequency()
        );
    }

    // Stopping mid-ramp abandons the trajectory and lands on the target.
    kernel.set_parameter(ParameterId::Depth, 1.0, 100_000);
    render_dc_block(&mut kernel);
    println!(
        "\nDepth mid-ramp: {:.4}",
        kernel.get_parameter(ParameterId::Depth)
    );
    kernel.set_rendering(false);
    println!(
        "Depth after rendering stop: {:.4}",
        kernel.get_parameter(ParameterId::Depth)
    );

    println!("\nEvent log:");
    for event in log.drain() {
        println!("  {}", serde_json::to_string(&event).unwrap());
    }
}
