use crate::model::task::Task;

/// Mean task progress, rounded half-up. Empty lists average to 0.
pub fn average_progress(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let n = tasks.len() as u64;
    let sum: u64 = tasks.iter().map(|t| u64::from(t.progress)).sum();
    // (sum / n) rounded half-up, in integers
    ((2 * sum + n) / (2 * n)) as u8
}
