//! The module's own CV and gate outputs.

use crate::io::CvGateOutputs;

/// The most CV outputs any module has.
pub const MAX_CV_OUTPUTS: usize = 4;

/// The most gate outputs any module has.
pub const MAX_GATE_OUTPUTS: usize = 8;

/// Sets CV output `output` to `value`. Ignored if the hardware has no such output.
pub fn set_cv<O: CvGateOutputs>(outputs: &mut O, output: usize, value: i16) {
    if output >= outputs.cv_output_count().min(MAX_CV_OUTPUTS) {
        debug!("no CV output {}", output);
        return;
    }
    outputs.write_cv(output, value);
}

/// Sets gate output `output`. Ignored if the hardware has no such output.
pub fn set_gate<O: CvGateOutputs>(outputs: &mut O, output: usize, high: bool) {
    if output >= outputs.gate_output_count().min(MAX_GATE_OUTPUTS) {
        debug!("no gate output {}", output);
        return;
    }
    outputs.write_gate(output, high);
}

/// Sets the pitch of `output`, then opens its gate.
pub fn note_on<O: CvGateOutputs>(outputs: &mut O, output: usize, pitch: i16) {
    set_cv(outputs, output, pitch);
    set_gate(outputs, output, true);
}

/// Closes the gate of `output`; the CV is left where it was so releases keep their pitch.
pub fn note_off<O: CvGateOutputs>(outputs: &mut O, output: usize) {
    set_gate(outputs, output, false);
}

/// Zeroes every CV output and closes every gate.
pub fn reset<O: CvGateOutputs>(outputs: &mut O) {
    for output in 0..outputs.cv_output_count().min(MAX_CV_OUTPUTS) {
        outputs.write_cv(output, 0);
    }
    for output in 0..outputs.gate_output_count().min(MAX_GATE_OUTPUTS) {
        outputs.write_gate(output, false);
    }
}
