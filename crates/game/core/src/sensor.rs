//! Contact queries consumed from the host.

use arrayvec::ArrayVec;

use crate::geometry::{BodyId, Probe};

/// Number of contacts a single query can report.
///
/// Queries write into a caller-owned [`QueryBuffer`] that lives as long as the
/// actor, so sensing never allocates.
pub const QUERY_CAPACITY: usize = 5;

/// Fixed-size, reusable output buffer for overlap queries.
pub type QueryBuffer = ArrayVec<BodyId, QUERY_CAPACITY>;

/// Overlap queries answered by whatever owns the colliders.
pub trait Sensor {
    /// Clears `out`, then fills it with bodies on `probe.mask` overlapping
    /// `probe`, stopping once the buffer is full.
    fn query_overlap(&self, probe: &Probe, out: &mut QueryBuffer);
}

/// Returns `true` if `probe` touches any body other than `me`.
pub fn touches_other(
    sensor: &(impl Sensor + ?Sized),
    probe: &Probe,
    me: BodyId,
    buffer: &mut QueryBuffer,
) -> bool {
    sensor.query_overlap(probe, buffer);
    buffer.iter().any(|&body| body != me)
}

/// Sensor that never reports contacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nothing;

impl Sensor for Nothing {
    fn query_overlap(&self, _probe: &Probe, out: &mut QueryBuffer) {
        out.clear();
    }
}
