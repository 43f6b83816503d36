//! Settlement harness.
//!
//! Will replay final scores through recorded wagers to credit winning
//! payouts and flip `settled`.
//!
//! TODO (Phase 2): implement settlement once a results feed is wired up.

#[cfg(test)]
mod tests {
    #[test]
    fn test_placeholder() {
        // Settlement test scaffold, populated in Phase 2
        assert!(true);
    }
}
