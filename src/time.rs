use std::time::Duration;

/// A measurement of a monotonically nondecreasing clock, handed to every
/// `Renderable` once per frame by the render-loop driver.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimePoint(u64);

impl TimePoint {
    #[inline]
    pub fn from_millis(millis: u64) -> TimePoint {
        TimePoint(millis)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl std::ops::Sub for TimePoint {
    type Output = Duration;

    fn sub(self, rhs: TimePoint) -> Self::Output {
        Duration::from_millis(self.0 - rhs.0)
    }
}
