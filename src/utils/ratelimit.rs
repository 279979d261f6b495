use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

const COOLDOWN_SECONDS: u64 = 5;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<Cooldowns> = Mutex::new(Cooldowns::new(COOLDOWN_SECONDS));
}

/// Outcome of a cooldown check that did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownActive {
    pub remaining_secs: u64,
    /// True only for the first blocked attempt in a cooldown period
    pub should_warn: bool,
}

/// Per-(user, command) cooldown table
pub struct Cooldowns {
    period: u64,
    /// Last accepted use, in unix seconds
    last_used: HashMap<(UserId, String), u64>,
    /// Last warning sent, in unix seconds
    last_warned: HashMap<(UserId, String), u64>,
}

impl Cooldowns {
    pub fn new(period: u64) -> Self {
        Self {
            period,
            last_used: HashMap::new(),
            last_warned: HashMap::new(),
        }
    }

    /// Forget entries whose cooldown period ended before `now`
    fn prune(&mut self, now: u64) {
        let period = self.period;
        self.last_used.retain(|_, &mut used| now.saturating_sub(used) < period);
        self.last_warned.retain(|_, &mut warned| now.saturating_sub(warned) < period);
    }

    /// Record a use at `now` if the cooldown has elapsed
    pub fn check(&mut self, user_id: UserId, command: &str, now: u64) -> Result<(), CooldownActive> {
        self.prune(now);
        let key = (user_id, command.to_string());

        if let Some(&last_time) = self.last_used.get(&key) {
            let elapsed = now.saturating_sub(last_time);
            if elapsed < self.period {
                let should_warn = self
                    .last_warned
                    .get(&key)
                    .map_or(true, |&warned| warned < last_time);
                if should_warn {
                    self.last_warned.insert(key, now);
                }
                return Err(CooldownActive {
                    remaining_secs: self.period - elapsed,
                    should_warn,
                });
            }
        }

        self.last_used.insert(key, now);
        Ok(())
    }
}

/// Check the shared cooldown table for a user's command
pub async fn check_cooldown(user_id: UserId, command: &str) -> Result<(), CooldownActive> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    COMMAND_COOLDOWNS.lock().await.check(user_id, command, now)
}

pub fn get_cooldown_seconds() -> u64 {
    COOLDOWN_SECONDS
}
