use std::cmp::Ordering;

/// Labels generated by a factory reset and by the first seed.
pub const DEFAULT_TIME_SLOTS: [&str; 6] = [
    "7:00-9:00",
    "10:00-12:00",
    "13:00-15:00",
    "16:00-18:00",
    "19:00-21:00",
    "22:00-24:00",
];

/// A free-text time slot label such as `"7:00-9:00"`.
///
/// The label is both what is displayed and what is sorted on: the part
/// before the first `-` is read as `H:MM` and converted to minutes since
/// midnight. Labels that do not parse rank as minute 0.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeSlot(String);

impl TimeSlot {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn start_minutes(&self) -> i64 {
        parse_start_minutes(&self.0).unwrap_or(0)
    }
}

fn parse_start_minutes(label: &str) -> Option<i64> {
    let start = label.split('-').next()?;
    let mut parts = start.split(':');
    let hours = parts.next()?.trim().parse::<i64>().ok()?;
    let minutes = parts.next()?.trim().parse::<i64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    hours.checked_mul(60)?.checked_add(minutes)
}

impl Ord for TimeSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_minutes()
            .cmp(&other.start_minutes())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TimeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Deduplicates and orders raw labels.
pub fn sorted_time_slots<I, S>(labels: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut slots = labels.into_iter().map(TimeSlot::new).collect::<Vec<_>>();
    slots.sort();
    slots.dedup();
    slots
}
