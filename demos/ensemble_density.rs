//! Ensemble Density Survey
//!
//! Processes one second of a sine through the chorus at several voice
//! counts and reports the wet signal's RMS and peak, then demonstrates
//! the quadrature stereo widener by measuring inter-channel correlation
//! with the odd-90 switch off and on.
//!
//! Run with: cargo run --example ensemble_density

use chorale::prelude::*;

const SAMPLE_RATE: f64 = 48_000.0;
const BLOCK: usize = 512;

/// Push a multi-channel buffer through the kernel in block-sized chunks.
fn process(kernel: &mut ChorusKernel, input: &[Vec<f32>], block: usize) -> Vec<Vec<f32>> {
    let frames = input[0].len();
    let mut output = vec![vec![0.0_f32; frames]; input.len()];
    let mut start = 0;
    while start < frames {
        let len = block.min(frames - start);
        let input_refs: Vec<&[f32]> = input.iter().map(|ch| &ch[start..start + len]).collect();
        let mut output_refs: Vec<&mut [f32]> = output
            .iter_mut()
            .map(|ch| &mut ch[start..start + len])
            .collect();
        kernel.render(0, &input_refs, &mut output_refs, len as u32);
        start += len;
    }
    output
}

fn correlation(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len() as f32;
    let mean_a = a.iter().sum::<f32>() / n;
    let mean_b = b.iter().sum::<f32>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

fn chorus_at(voices: usize, odd90: f32) -> ChorusKernel {
    let mut kernel = ChorusKernel::new();
    kernel
        .configure(KernelConfig {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            max_frames_per_render: BLOCK as u32,
            max_delay_ms: 30.0,
            voices,
        })
        .unwrap();
    kernel.set_parameter(ParameterId::WetMix, 1.0, 0);
    kernel.set_parameter(ParameterId::DryMix, 0.0, 0);
    kernel.set_parameter(ParameterId::Depth, 0.4, 0);
    kernel.set_parameter(ParameterId::Rate, 2.0, 0);
    kernel.set_parameter(ParameterId::Delay, 12.0, 0);
    kernel.set_parameter(ParameterId::Odd90, odd90, 0);
    kernel
}

fn main() {
    // One second of a 220 Hz sine, duplicated onto both channels.
    let signal: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|n| {
            0.7 * (2.0 * std::f32::consts::PI * 220.0 * n as f32 / SAMPLE_RATE as f32).sin()
        })
        .collect();
    let input = vec![signal.clone(), signal];

    println!("Voice density sweep (wet-only, depth 0.4, rate 2 Hz):");
    println!("  voices     rms    peak");
    for &voices in &[1_usize, 2, 5, 10, 25] {
        let mut kernel = chorus_at(voices, 0.0);
        let output = process(&mut kernel, &input, BLOCK);
        let left = &output[0];
        let rms = (left.iter().map(|&s| s * s).sum::<f32>() / left.len() as f32).sqrt();
        let peak = left.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()));
        println!("  {:>6}  {:.4}  {:.4}", voices, rms, peak);
    }

    println!("\nStereo widening at 10 voices (identical input on both channels):");
    for &(label, odd90) in &[("odd90 off", 0.0_f32), ("odd90 on ", 1.0)] {
        let mut kernel = chorus_at(10, odd90);
        let output = process(&mut kernel, &input, BLOCK);
        println!(
            "  {}: inter-channel correlation = {:.3}",
            label,
            correlation(&output[0], &output[1])
        );
    }
}
