//! Nullable stake token: an in-memory balance sheet for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tribunal_stake::{StakeToken, TokenError};
use tribunal_types::{Address, StakeAmount};

#[derive(Default)]
struct Balances {
    wallets: HashMap<Address, StakeAmount>,
    custody: StakeAmount,
}

/// A stake token with scripted balances.
///
/// `pull` moves tokens from a wallet into court custody and `push` moves them
/// back out. The service can be taken offline with [`NullToken::set_offline`].
#[derive(Default)]
pub struct NullToken {
    balances: Mutex<Balances>,
    offline: AtomicBool,
}

impl NullToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given wallet balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, StakeAmount)>) -> Self {
        let token = Self::new();
        for (owner, amount) in balances {
            token.mint(&owner, amount);
        }
        token
    }

    /// Credit `amount` to `owner`'s wallet.
    pub fn mint(&self, owner: &Address, amount: StakeAmount) {
        if let Ok(mut balances) = self.balances.lock() {
            let wallet = balances.wallets.entry(owner.clone()).or_insert(0);
            *wallet = wallet.saturating_add(amount);
        }
    }

    /// Tokens currently held by the court.
    pub fn custody(&self) -> StakeAmount {
        self.balances.lock().map_or(0, |b| b.custody)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Balances>, TokenError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TokenError::Unavailable("null token offline".into()));
        }
        self.balances
            .lock()
            .map_err(|_| TokenError::Unavailable("null token lock poisoned".into()))
    }
}

impl StakeToken for NullToken {
    fn pull(&self, from: &Address, amount: StakeAmount) -> Result<(), TokenError> {
        let mut balances = self.lock()?;
        let available = balances.wallets.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        balances.wallets.insert(from.clone(), available - amount);
        balances.custody += amount;
        Ok(())
    }

    fn push(&self, to: &Address, amount: StakeAmount) -> Result<(), TokenError> {
        let mut balances = self.lock()?;
        if balances.custody < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available: balances.custody,
            });
        }
        balances.custody -= amount;
        let wallet = balances.wallets.entry(to.clone()).or_insert(0);
        *wallet = wallet.saturating_add(amount);
        Ok(())
    }

    fn balance_of(&self, owner: &Address) -> Result<StakeAmount, TokenError> {
        Ok(self.lock()?.wallets.get(owner).copied().unwrap_or(0))
    }
}
