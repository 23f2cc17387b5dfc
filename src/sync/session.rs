/// Whether the user has changed anything since the session started.
///
/// The transition is one-way: once `Dirty`, the session stays dirty until
/// the process ends. A late remote snapshot is only allowed to replace the
/// local state while the session is still `Clean`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Clean,
    Dirty,
}

impl SessionPhase {
    pub fn mark_dirty(&mut self) {
        *self = SessionPhase::Dirty;
    }

    pub fn is_dirty(self) -> bool {
        self == SessionPhase::Dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean_and_never_returns() {
        let mut phase = SessionPhase::default();
        assert!(!phase.is_dirty());
        phase.mark_dirty();
        assert!(phase.is_dirty());
        phase.mark_dirty();
        assert_eq!(phase, SessionPhase::Dirty);
    }
}
