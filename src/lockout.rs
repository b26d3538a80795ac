/// Failed-attempt lockout policy and setup-mode passphrase validation.
///
/// The unlock modal runs the state machine
/// `Idle → Verifying → {Unlocked, Locked}`; a failed attempt returns to
/// `Idle` for a retry until the threshold is reached, at which point
/// `Locked` is terminal for the session and the caller must tear the
/// identity session down.

/// Consecutive-failure counter scoped to one locked vault session.
#[derive(Debug, Clone, Copy)]
pub struct AttemptCounter {
    count: u32,
    max: u32,
}

impl AttemptCounter {
    pub fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.count)
    }

    fn increment(&mut self) -> bool {
        self.count += 1;
        self.count >= self.max
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    Idle,
    Verifying,
    Unlocked,
    Locked,
}

/// Outcome of registering one failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Retry allowed; `remaining` attempts left before lockout.
    Retry { remaining: u32 },
    /// Threshold reached. Terminal for this session.
    LockedOut,
}

/// The per-session lockout state machine.
#[derive(Debug)]
pub struct LockoutGate {
    state: UnlockState,
    attempts: AttemptCounter,
}

impl LockoutGate {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: UnlockState::Idle,
            attempts: AttemptCounter::new(max_attempts),
        }
    }

    pub fn state(&self) -> UnlockState {
        self.state
    }

    pub fn attempts(&self) -> &AttemptCounter {
        &self.attempts
    }

    pub fn is_locked_out(&self) -> bool {
        self.state == UnlockState::Locked && self.attempts.remaining() == 0
    }

    /// A verification has been submitted. Once locked out the gate no
    /// longer leaves `Locked`: the state is terminal for this session.
    pub fn begin_attempt(&mut self) {
        if self.is_locked_out() {
            return;
        }
        self.state = UnlockState::Verifying;
    }

    /// The passphrase verified; the counter resets.
    pub fn record_success(&mut self) {
        self.attempts.reset();
        self.state = UnlockState::Unlocked;
    }

    /// The passphrase did not verify. Returns to `Idle` for a retry
    /// unless the threshold is now reached.
    pub fn record_failure(&mut self) -> FailureOutcome {
        if self.attempts.increment() {
            self.state = UnlockState::Locked;
            FailureOutcome::LockedOut
        } else {
            self.state = UnlockState::Idle;
            FailureOutcome::Retry {
                remaining: self.attempts.remaining(),
            }
        }
    }
}

/// Per-predicate result of setup-mode passphrase validation. All four
/// must hold before the KDF is ever invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassphraseChecks {
    /// At least 3 words (tokens of length >= 2 containing an
    /// alphanumeric) and overall length within 12–40 characters.
    pub length_ok: bool,
    /// At least one character that is neither alphanumeric nor whitespace.
    pub has_special_char: bool,
    /// At least one whitespace character.
    pub has_space: bool,
    /// Both an uppercase and a lowercase letter present.
    pub has_mixed_case: bool,
}

impl PassphraseChecks {
    pub fn all_ok(&self) -> bool {
        self.length_ok && self.has_special_char && self.has_space && self.has_mixed_case
    }
}

/// Evaluate the setup-mode predicates for a candidate passphrase.
pub fn validate_passphrase(passphrase: &str) -> PassphraseChecks {
    let words = passphrase
        .trim()
        .split_whitespace()
        .filter(|word| word.len() >= 2 && word.chars().any(|c| c.is_ascii_alphanumeric()))
        .count();
    let len = passphrase.chars().count();

    PassphraseChecks {
        length_ok: words >= 3 && (12..=40).contains(&len),
        has_special_char: passphrase
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace()),
        has_space: passphrase.chars().any(|c| c.is_whitespace()),
        has_mixed_case: passphrase.chars().any(|c| c.is_ascii_lowercase())
            && passphrase.chars().any(|c| c.is_ascii_uppercase()),
    }
}
