//! Test doubles for the hardware seams.

use std::collections::VecDeque;

use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::io::CvGateOutputs;

/// The error [`RecordingI2c`] reports when told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestBusError;

impl i2c::Error for TestBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
    }
}

/// An I2C peripheral which records every write and answers reads from a queue.
#[derive(Debug, Default)]
pub struct RecordingI2c {
    /// Every write as (address, bytes), in order.
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Responses handed out to reads, front first. Reads past the end see zeros.
    pub reads: VecDeque<Vec<u8>>,
    /// When set, every transaction fails without being recorded.
    pub fail: bool,
}

impl ErrorType for RecordingI2c {
    type Error = TestBusError;
}

impl I2c for RecordingI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(TestBusError);
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buffer) => {
                    let response = self.reads.pop_front().unwrap_or_default();
                    for (i, byte) in buffer.iter_mut().enumerate() {
                        *byte = response.get(i).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}

/// A write to the module's own outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputWrite {
    Cv(usize, i16),
    Gate(usize, bool),
}

/// CV/gate outputs which record every write.
#[derive(Debug)]
pub struct RecordingOutputs {
    pub cv_count: usize,
    pub gate_count: usize,
    pub writes: Vec<OutputWrite>,
}

impl RecordingOutputs {
    pub fn new(cv_count: usize, gate_count: usize) -> Self {
        Self {
            cv_count,
            gate_count,
            writes: Vec::new(),
        }
    }
}

impl Default for RecordingOutputs {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl CvGateOutputs for RecordingOutputs {
    fn cv_output_count(&self) -> usize {
        self.cv_count
    }

    fn gate_output_count(&self) -> usize {
        self.gate_count
    }

    fn write_cv(&mut self, output: usize, value: i16) {
        self.writes.push(OutputWrite::Cv(output, value));
    }

    fn write_gate(&mut self, output: usize, high: bool) {
        self.writes.push(OutputWrite::Gate(output, high));
    }
}
