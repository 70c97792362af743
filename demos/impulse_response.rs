//! Impulse Response Walkthrough
//!
//! Feeds a single impulse through the kernel, first as a plain integer
//! delay and then with staggered modulated voices, and prints where the
//! energy re-emerges.
//!
//! Run with: cargo run --example impulse_response

use chorale::prelude::*;

fn render_impulse(kernel: &mut ChorusKernel, frames: usize) -> Vec<f32> {
    let mut input = vec![0.0_f32; frames];
    input[0] = 1.0;
    let mut output = vec![0.0_f32; frames];
    let input_refs: Vec<&[f32]> = vec![&input];
    let mut output_refs: Vec<&mut [f32]> = vec![&mut output];
    kernel.render(0, &input_refs, &mut output_refs, frames as u32);
    output
}

fn main() {
    let mut kernel = ChorusKernel::new();
    kernel
        .configure(KernelConfig {
            channels: 1,
            sample_rate: 48_000.0,
            max_frames_per_render: 1024,
            max_delay_ms: 20.0,
            voices: 1,
        })
        .unwrap();

    // Wet-only with no modulation: the impulse must come back as one clean
    // echo, 10ms behind the input.
    kernel.set_parameter(ParameterId::Depth, 0.0, 0);
    kernel.set_parameter(ParameterId::Delay, 10.0, 0);
    kernel.set_parameter(ParameterId::WetMix, 1.0, 0);
    kernel.set_parameter(ParameterId::DryMix, 0.0, 0);

    let output = render_impulse(&mut kernel, 1024);
    let echo = output
        .iter()
        .position(|&s| s.abs() > 1e-6)
        .expect("echo missing");
    println!("Unmodulated 10ms tap at 48kHz:");
    println!("  echo at frame {} with amplitude {:.3}", echo, output[echo]);

    // Four staggered voices at depth 0.5: each voice reads its own tap, so
    // the single impulse fans out into a cluster of quarter-height echoes.
    kernel
        .configure(KernelConfig {
            voices: 4,
            ..*kernel.config()
        })
        .unwrap();
    kernel.set_parameter(ParameterId::Depth, 0.5, 0);

    println!("\nFour voices, depth 0.5:");
    for (index, lfo) in kernel.ensemble().lfos().iter().enumerate() {
        println!("  voice {} starts at phase {:.2}", index, lfo.phase());
    }

    let output = render_impulse(&mut kernel, 1024);
    println!("  energy above -60dB:");
    for (frame, &sample) in output.iter().enumerate() {
        if sample.abs() > 1e-3 {
            println!("    frame {:4}: {:+.3}", frame, sample);
        }
    }
}
