//! The seam between the engine and the module's own CV and gate outputs.

/// The module's directly-driven outputs, implemented once per hardware target.
///
/// Counts may differ between CV and gates, and may be lower than
/// [`DeviceFamily::CvGate`](crate::devices::DeviceFamily::CvGate)'s output count. The engine checks indices against
/// these counts before writing, so implementations may assume they are in range.
pub trait CvGateOutputs {
    /// The number of CV outputs present.
    fn cv_output_count(&self) -> usize;

    /// The number of gate outputs present.
    fn gate_output_count(&self) -> usize;

    /// Sets CV output `output` to `value` (a pitch or level, see [`crate::pitch`]).
    fn write_cv(&mut self, output: usize, value: i16);

    /// Sets gate output `output` high or low.
    fn write_gate(&mut self, output: usize, high: bool);
}
